use num::{BigRational, Zero};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use crate::models::{parse_number, Table};
use crate::ReportError;

/// Sum of a numeric column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTotal {
    pub column: String,
    pub sum: BigRational,
    /// Non-null cells
    pub count: usize,
}

/// Totals of the numeric columns, in column order
///
/// A column is numeric when it has at least one non-null cell and every
/// non-null cell parses as a number.
pub fn numeric_totals(table: &Table) -> Vec<ColumnTotal> {
    let mut totals = vec![];
    'columns: for (index, column) in table.columns().iter().enumerate() {
        let mut sum = BigRational::zero();
        let mut count = 0;
        for cell in table.column_values(index).flatten() {
            match parse_number(cell) {
                Some(n) => sum += n,
                None => continue 'columns,
            }
            count += 1;
        }
        if count > 0 {
            totals.push(ColumnTotal {
                column: column.clone(),
                sum,
                count,
            });
        }
    }
    totals
}

/// The distinct non-null values of a column, sorted, at most `limit` of them
///
/// Numbers come first in numeric order, then the other values in text order.
pub fn distinct_values(table: &Table, column: &str, limit: usize) -> Result<Vec<String>, ReportError> {
    let index = table
        .column_index(column)
        .ok_or_else(|| ReportError::UnknownColumn(column.to_string()))?;
    let unique: HashSet<&str> = table.column_values(index).flatten().collect();
    let mut values: Vec<&str> = unique.into_iter().collect();
    values.sort_by(|a, b| compare_cells(a, b));
    Ok(values.into_iter().take(limit).map(String::from).collect())
}

/// A total order on cells: numbers before text, numbers by value, text (and
/// equal numbers written differently) by their characters
pub(super) fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.cmp(b))
}

/// An overview of a ledger table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    pub rows: usize,
    pub columns: usize,
    /// Distinct non-null entry identifiers, when the column exists
    pub entries: Option<usize>,
    pub rows_without_entry: Option<usize>,
    /// Distinct non-null pattern hashes, when the column exists
    pub patterns: Option<usize>,
    pub rows_without_pattern: Option<usize>,
}

pub fn statistics(table: &Table, entry_id_column: Option<&str>, hash_column: Option<&str>) -> Statistics {
    let count = |column: Option<&str>| -> (Option<usize>, Option<usize>) {
        match column.and_then(|c| table.column_index(c)) {
            None => (None, None),
            Some(index) => {
                let distinct: BTreeSet<&str> = table.column_values(index).flatten().collect();
                let nulls = table.column_values(index).filter(|v| v.is_none()).count();
                (Some(distinct.len()), Some(nulls))
            }
        }
    };
    let (entries, rows_without_entry) = count(entry_id_column);
    let (patterns, rows_without_pattern) = count(hash_column);
    Statistics {
        rows: table.len(),
        columns: table.columns().len(),
        entries,
        rows_without_entry,
        patterns,
        rows_without_pattern,
    }
}
