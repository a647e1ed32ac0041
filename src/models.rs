//! Ledger data as the reduction pipeline sees it
//!
//! A [`Table`] is an ordered list of [`Row`]s sharing a column list. Cells are
//! untyped text; a [`Value`] is what a cell or a literal becomes while a
//! condition is evaluated.

pub use table::{Row, Table};
pub use value::{format_amount, format_plain, parse_date, parse_number, Value};

mod table;
mod value;
