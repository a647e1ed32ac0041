use colored::Colorize;

use super::table_view;
use crate::app::RunOpts;
use crate::loader::export_csv;
use crate::models::format_amount;
use crate::pipeline::Pipeline;
use crate::report::numeric_totals;
use crate::store::MemoryStore;
use crate::Error;

/// Reduction command
///
/// Runs filter, expansion and deduplication, prints the result and a summary
/// of how many rows each stage left.
pub fn execute(options: &RunOpts, store: &MemoryStore) -> Result<(), Error> {
    let pipeline = Pipeline {
        condition: options.condition(),
        expand: options.expand,
        entry_id_column: Some(options.common.entry_column.clone()),
        dedup: options.unique,
        hash_column: Some(options.common.hash_column.clone()),
    };
    let reduction = pipeline.reduce_store(store)?;
    let result = &reduction.table;

    if result.is_empty() {
        println!("{}", "No rows match the condition".yellow());
    } else {
        table_view::print(result, options.limit)?;
    }

    if options.totals && !result.is_empty() {
        let totals = numeric_totals(result);
        if totals.is_empty() {
            println!("No numeric columns to total");
        }
        for total in totals {
            println!(
                "{:>20}  {} ({} rows)",
                format_amount(&total.sum),
                total.column.bold(),
                total.count
            );
        }
    }

    let mut summary = format!("{} matched", reduction.filtered_rows);
    if options.expand {
        summary.push_str(&format!(" -> {} expanded", reduction.expanded_rows));
    }
    if options.unique {
        summary.push_str(&format!(" -> {} kept", result.len()));
    }
    println!("{}", summary.green());

    if let Some(path) = &options.output {
        export_csv(result, path)?;
        println!("{} rows written to {}", result.len(), path.display());
    }
    Ok(())
}
