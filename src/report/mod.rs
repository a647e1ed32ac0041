//! Reports over ledger tables: column totals, distinct values, statistics and
//! group by aggregation

mod aggregate;
mod totals;

pub use aggregate::{aggregate, AggregateFunction, AggregateSpec, Aggregation};
pub use totals::{distinct_values, numeric_totals, statistics, ColumnTotal, Statistics};
