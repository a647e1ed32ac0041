use crate::report::statistics;
use crate::store::MemoryStore;
use crate::{CommonOpts, Error};

/// Statistics command
///
/// Prints row, journal entry and transaction pattern counts
pub fn execute(store: &MemoryStore, options: &CommonOpts) -> Result<(), Error> {
    let stats = statistics(
        store.table(),
        Some(options.entry_column.as_str()),
        Some(options.hash_column.as_str()),
    );
    println!("{} rows", stats.rows);
    println!("{} columns", stats.columns);
    match (stats.entries, stats.rows_without_entry) {
        (Some(entries), Some(orphans)) => {
            println!("{} journal entries", entries);
            println!("{} rows without an entry", orphans);
        }
        _ => println!("No entry column {:?}", options.entry_column),
    }
    match (stats.patterns, stats.rows_without_pattern) {
        (Some(patterns), Some(unhashed)) => {
            println!("{} transaction patterns", patterns);
            println!("{} rows without a pattern", unhashed);
        }
        _ => println!("No pattern hash column {:?}", options.hash_column),
    }
    Ok(())
}
