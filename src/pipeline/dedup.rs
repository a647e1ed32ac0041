use log::debug;
use std::collections::{HashMap, HashSet};

use super::resolve_column;
use crate::models::{Row, Table};
use crate::{ColumnRole, PipelineError};

/// The entry kept for one pattern hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representative {
    pub hash: String,
    /// `None` when the first line seen for the hash has no entry identifier
    pub entry_id: Option<String>,
    /// Sequence number of that first line
    pub seq: usize,
}

/// How lines are tied together into entries. A line without an identifier is an
/// entry of its own, known by its sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EntryKey<'a> {
    Id(&'a str),
    Line(usize),
}

fn entry_key(row: &Row, entry_index: usize) -> EntryKey<'_> {
    match row.get(entry_index) {
        Some(id) => EntryKey::Id(id),
        None => EntryKey::Line(row.seq),
    }
}

/// For every distinct pattern hash, the entry of the first line carrying it
///
/// "First" is the lowest sequence number, i.e. ingestion order, whatever order
/// the rows are in. The result is sorted by that sequence number.
pub fn representatives(
    table: &Table,
    entry_id_column: Option<&str>,
    hash_column: Option<&str>,
) -> Result<Vec<Representative>, PipelineError> {
    let entry_index = resolve_column(table.columns(), entry_id_column, ColumnRole::EntryId)?;
    let hash_index = resolve_column(table.columns(), hash_column, ColumnRole::PatternHash)?;
    let mut representatives: Vec<Representative> = first_rows(table, hash_index)
        .into_iter()
        .map(|(hash, row)| Representative {
            hash: hash.to_string(),
            entry_id: row.get(entry_index).map(String::from),
            seq: row.seq,
        })
        .collect();
    representatives.sort_by_key(|r| r.seq);
    Ok(representatives)
}

fn first_rows(table: &Table, hash_index: usize) -> HashMap<&str, &Row> {
    let mut first: HashMap<&str, &Row> = HashMap::new();
    for row in table.rows() {
        if let Some(hash) = row.get(hash_index) {
            let current = first.entry(hash).or_insert(row);
            if row.seq < current.seq {
                *current = row;
            }
        }
    }
    first
}

/// Step 3: one journal entry per transaction pattern
///
/// Lines are grouped by `hash_column`. For every hash the entry of its first line
/// is the representative, and all of that entry's lines are kept, whatever hash
/// they carry. Lines without a hash are always kept. The output keeps the input
/// order and never repeats a line.
///
/// Lines without an entry identifier are not pooled into one shared entry: each
/// is an entry of its own, so a hash first seen on such a line keeps only that
/// line, and later identifier-less lines with the same hash are dropped.
///
/// When `enabled` is false the table comes back as it is. Otherwise both columns
/// have to exist, which is checked before anything else.
pub fn deduplicate(
    table: &Table,
    entry_id_column: Option<&str>,
    hash_column: Option<&str>,
    enabled: bool,
) -> Result<Table, PipelineError> {
    if !enabled {
        return Ok(table.clone());
    }
    let entry_index = resolve_column(table.columns(), entry_id_column, ColumnRole::EntryId)?;
    let hash_index = resolve_column(table.columns(), hash_column, ColumnRole::PatternHash)?;
    if table.is_empty() {
        return Ok(table.clone());
    }

    let first = first_rows(table, hash_index);
    let kept_entries: HashSet<EntryKey> = first
        .values()
        .map(|row| entry_key(row, entry_index))
        .collect();
    let reduced = table.select(|row| match row.get(hash_index) {
        None => true,
        Some(_) => kept_entries.contains(&entry_key(row, entry_index)),
    });
    debug!(
        "deduplicate: {} rows with {} patterns -> {} rows",
        table.len(),
        first.len(),
        reduced.len()
    );
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seqs(table: &Table) -> Vec<usize> {
        table.rows().iter().map(|r| r.seq).collect()
    }

    fn reduce(table: &Table) -> Table {
        deduplicate(table, Some("id"), Some("hash"), true).unwrap()
    }

    #[test]
    fn first_entry_wins_whole() {
        let table = Table::from_str_rows(
            &["id", "hash"],
            &[&["1", "x"], &["1", "x"], &["2", "x"], &["3", "y"]],
        );
        assert_eq!(seqs(&reduce(&table)), vec![0, 1, 3]);
    }

    #[test]
    fn representative_lines_with_other_hashes_stay() {
        // Entry 1 comes first for both "x" and "z"; entry 2 only keeps its unhashed line
        let table = Table::from_str_rows(
            &["id", "hash"],
            &[&["1", "x"], &["1", "z"], &["2", "z"], &["2", ""]],
        );
        assert_eq!(seqs(&reduce(&table)), vec![0, 1, 3]);
    }

    #[test]
    fn first_is_ingestion_order_not_row_order() {
        let table = Table::from_str_rows(&["id", "hash"], &[&["1", "x"], &["2", "x"]]);
        let mut rows = table.clone().into_rows();
        rows.reverse();
        let reversed = Table::from_rows(table.columns().to_vec(), rows);
        assert_eq!(seqs(&reduce(&reversed)), vec![0]);

        let reps = representatives(&reversed, Some("id"), Some("hash")).unwrap();
        assert_eq!(
            reps,
            vec![Representative {
                hash: "x".to_string(),
                entry_id: Some("1".to_string()),
                seq: 0,
            }]
        );
    }

    #[test]
    fn lines_without_entry_are_their_own_entry() {
        let table = Table::from_str_rows(
            &["id", "hash"],
            &[&["", "x"], &["", "x"], &["1", "x"], &["", ""]],
        );
        assert_eq!(seqs(&reduce(&table)), vec![0, 3]);
    }

    #[test]
    fn disabled_and_empty() {
        let table = Table::from_str_rows(&["id", "hash"], &[&["1", "x"], &["2", "x"]]);
        assert_eq!(deduplicate(&table, None, None, false).unwrap(), table);
        let empty = table.select(|_| false);
        assert_eq!(reduce(&empty), empty);
        assert!(deduplicate(&empty, Some("id"), None, true).is_err());
        assert!(deduplicate(&empty, None, Some("hash"), true).is_err());
    }
}
