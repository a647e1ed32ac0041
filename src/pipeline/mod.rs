//! The journal entry reduction pipeline
//!
//! `table → filter → expand → deduplicate → result`
//!
//! 1. [`filter`](crate::filter::filter) keeps the lines a condition holds for.
//! 2. [`expand`] grows the matching lines to the full journal entries they belong to.
//! 3. [`deduplicate`] keeps a single entry for every transaction pattern hash.
//!
//! Every stage can be called on its own. None of them keeps state: they read the
//! tables they are given and return fresh ones.

use log::debug;

use crate::filter::filter;
use crate::models::Table;
use crate::store::TabularStore;
use crate::{ColumnRole, PipelineError};

mod dedup;
mod expand;

pub use dedup::{deduplicate, representatives, Representative};
pub use expand::expand;

/// What to run, and with which columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    /// Step 1 condition; `None` or blank keeps every line
    pub condition: Option<String>,
    /// Step 2: grow matches to their full journal entries
    pub expand: bool,
    pub entry_id_column: Option<String>,
    /// Step 3: one representative entry per pattern hash
    pub dedup: bool,
    pub hash_column: Option<String>,
}

/// A pipeline result, with the number of rows after each stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub table: Table,
    pub filtered_rows: usize,
    pub expanded_rows: usize,
}

impl Pipeline {
    /// Runs the three stages over a table that is already in memory
    ///
    /// The selected columns are checked before the condition is looked at.
    pub fn reduce(&self, table: &Table) -> Result<Reduction, PipelineError> {
        self.check_columns(table.columns())?;
        let filtered = filter(table, self.condition.as_deref())?;
        let expanded = expand(
            table,
            &filtered,
            self.entry_id_column.as_deref(),
            self.expand,
        )?;
        self.finish(filtered.len(), expanded)
    }

    /// Runs the three stages through a store
    ///
    /// The selected columns are checked against the store's schema before any
    /// query is issued. The condition is handed to the store as its query, and
    /// the whole table is fetched only when expansion needs it. The outcome is
    /// the same as [`Pipeline::reduce`] over the store's table.
    pub fn reduce_store<S>(&self, store: &S) -> Result<Reduction, PipelineError>
    where
        S: TabularStore + ?Sized,
    {
        self.check_columns(&store.schema())?;
        let filtered = store.query(self.condition.as_deref().unwrap_or(""))?;
        let expanded = if self.expand && !filtered.is_empty() {
            let table = store.query("")?;
            expand(&table, &filtered, self.entry_id_column.as_deref(), true)?
        } else {
            filtered.clone()
        };
        self.finish(filtered.len(), expanded)
    }

    /// The columns the enabled stages need have to be selected and present
    fn check_columns(&self, columns: &[String]) -> Result<(), PipelineError> {
        if self.expand || self.dedup {
            resolve_column(columns, self.entry_id_column.as_deref(), ColumnRole::EntryId)?;
        }
        if self.dedup {
            resolve_column(columns, self.hash_column.as_deref(), ColumnRole::PatternHash)?;
        }
        Ok(())
    }

    fn finish(&self, filtered_rows: usize, expanded: Table) -> Result<Reduction, PipelineError> {
        let expanded_rows = expanded.len();
        let table = deduplicate(
            &expanded,
            self.entry_id_column.as_deref(),
            self.hash_column.as_deref(),
            self.dedup,
        )?;
        debug!(
            "pipeline: {} matched, {} after expansion, {} kept",
            filtered_rows,
            expanded_rows,
            table.len()
        );
        Ok(Reduction {
            table,
            filtered_rows,
            expanded_rows,
        })
    }
}

/// Runs the whole pipeline and returns the resulting table
pub fn run(
    table: &Table,
    condition: Option<&str>,
    expand_enabled: bool,
    entry_id_column: Option<&str>,
    dedup_enabled: bool,
    hash_column: Option<&str>,
) -> Result<Table, PipelineError> {
    let pipeline = Pipeline {
        condition: condition.map(String::from),
        expand: expand_enabled,
        entry_id_column: entry_id_column.map(String::from),
        dedup: dedup_enabled,
        hash_column: hash_column.map(String::from),
    };
    Ok(pipeline.reduce(table)?.table)
}

/// Finds a selected column, failing when it was not selected or does not exist
pub(crate) fn resolve_column(
    columns: &[String],
    selected: Option<&str>,
    role: ColumnRole,
) -> Result<usize, PipelineError> {
    match selected.map(str::trim).filter(|name| !name.is_empty()) {
        None => Err(PipelineError::MissingColumnSelection { role, column: None }),
        Some(name) => columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::MissingColumnSelection {
                role,
                column: Some(name.to_string()),
            }),
    }
}
