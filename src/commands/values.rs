use colored::Colorize;

use crate::report::distinct_values;
use crate::store::MemoryStore;
use crate::Error;

/// Distinct values of a column, handy when writing conditions
pub fn execute(store: &MemoryStore, column: &str, limit: usize) -> Result<(), Error> {
    let values = distinct_values(store.table(), column, limit)?;
    if values.is_empty() {
        println!("{}", format!("{} has no values", column).yellow());
    }
    for value in values {
        println!("{}", value);
    }
    Ok(())
}
