use colored::Colorize;

use super::table_view;
use crate::app::AggregateOpts;
use crate::report::{aggregate, AggregateSpec};
use crate::store::MemoryStore;
use crate::Error;

/// Group by report
pub fn execute(store: &MemoryStore, options: &AggregateOpts) -> Result<(), Error> {
    let spec = AggregateSpec {
        group_by: options.group_by.clone(),
        aggregations: options.aggregations.clone(),
        condition: options.condition.clone(),
        having: options.having.clone(),
    };
    let result = aggregate(store.table(), &spec)?;
    if result.is_empty() {
        println!("{}", "No groups".yellow());
        return Ok(());
    }
    table_view::print(&result, result.len())?;
    println!("{}", format!("{} groups", result.len()).green());
    Ok(())
}
