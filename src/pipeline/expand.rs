use log::debug;
use std::collections::HashSet;

use super::resolve_column;
use crate::models::Table;
use crate::{ColumnRole, PipelineError};

/// Step 2: every line of every journal entry that has a line in `subset`
///
/// Entries are found through `entry_id_column`. The result is drawn from
/// `table`, in table order. Lines without an entry identifier cannot be tied to
/// an entry and are left out, so the result contains `subset` as long as every
/// line of it has an identifier.
///
/// When `enabled` is false `subset` comes back as it is. Otherwise the column has
/// to exist in both tables, which is checked before anything else.
pub fn expand(
    table: &Table,
    subset: &Table,
    entry_id_column: Option<&str>,
    enabled: bool,
) -> Result<Table, PipelineError> {
    if !enabled {
        return Ok(subset.clone());
    }
    let table_index = resolve_column(table.columns(), entry_id_column, ColumnRole::EntryId)?;
    let subset_index = resolve_column(subset.columns(), entry_id_column, ColumnRole::EntryId)?;
    if subset.is_empty() {
        return Ok(subset.clone());
    }

    let entries: HashSet<&str> = subset.column_values(subset_index).flatten().collect();
    let expanded = table.select(|row| match row.get(table_index) {
        Some(id) => entries.contains(id),
        None => false,
    });
    debug!(
        "expand: {} rows in {} entries -> {} rows",
        subset.len(),
        entries.len(),
        expanded.len()
    );
    Ok(expanded)
}
