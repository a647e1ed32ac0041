//! Journal entry reduction for general ledger exports
//!
//! Ledger lines are filtered with a condition, grown to the full journal entries
//! they belong to and reduced to one entry per transaction pattern. See
//! [`pipeline`] for the stages and [`filter`] for the condition language.
extern crate pest;
#[macro_use]
extern crate pest_derive;

mod app;
mod commands;
mod error;
pub mod filter;
pub mod loader;
pub mod models;
pub mod parser;
pub mod pipeline;
mod repl;
pub mod report;
pub mod store;

pub use app::{run_app, AggregateOpts, CommonOpts, RunOpts, DEFAULT_ENTRY_COLUMN, DEFAULT_HASH_COLUMN};
pub use error::{ColumnRole, Error, LoadError, PipelineError, ReportError};
pub use filter::{filter, Condition};
pub use models::{Row, Table, Value};
pub use pipeline::{deduplicate, expand, run, Pipeline, Reduction};
pub use store::{MemoryStore, TabularStore};
