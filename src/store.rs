//! Where ledger tables come from
use std::path::Path;

use crate::filter::filter;
use crate::loader;
use crate::models::Table;
use crate::{LoadError, PipelineError};

/// A source of ledger rows that answers queries
///
/// A query is a condition in the language of [`crate::filter`]; a blank query
/// returns every row. Rows come back in the store's delivery order with their
/// ingestion sequence numbers.
pub trait TabularStore {
    /// The column names, in order
    fn schema(&self) -> Vec<String>;
    fn query(&self, query: &str) -> Result<Table, PipelineError>;
}

/// A store holding one table in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    table: Table,
}

impl MemoryStore {
    pub fn new(table: Table) -> Self {
        MemoryStore { table }
    }

    /// Loads CSV files, directories of them or glob patterns into a single table
    pub fn load<P: AsRef<Path>>(inputs: &[P]) -> Result<Self, LoadError> {
        Ok(MemoryStore::new(loader::load_files(inputs)?))
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

impl From<Table> for MemoryStore {
    fn from(table: Table) -> Self {
        MemoryStore::new(table)
    }
}

impl TabularStore for MemoryStore {
    fn schema(&self) -> Vec<String> {
        self.table.columns().to_vec()
    }

    fn query(&self, query: &str) -> Result<Table, PipelineError> {
        filter(&self.table, Some(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_are_conditions() {
        let store: MemoryStore =
            Table::from_str_rows(&["je_id", "amount"], &[&["1", "10"], &["2", "20"]]).into();
        assert_eq!(store.schema(), vec!["je_id".to_string(), "amount".to_string()]);
        assert_eq!(store.query("").unwrap(), *store.table());
        assert_eq!(store.query("amount > 15").unwrap().len(), 1);
        assert!(store.query("amount >>").is_err());
    }
}
