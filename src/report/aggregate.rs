use num::{BigInt, BigRational, Zero};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use super::totals::compare_cells;
use crate::filter::filter;
use crate::models::{format_plain, parse_number, Row, Table};
use crate::ReportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl FromStr for AggregateFunction {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SUM" => Ok(AggregateFunction::Sum),
            "COUNT" => Ok(AggregateFunction::Count),
            "AVG" | "MEAN" => Ok(AggregateFunction::Avg),
            "MIN" => Ok(AggregateFunction::Min),
            "MAX" => Ok(AggregateFunction::Max),
            _ => Err(ReportError::UnknownAggregate(s.trim().to_string())),
        }
    }
}

impl Display for AggregateFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        };
        write!(f, "{}", name)
    }
}

impl AggregateFunction {
    /// Applies the function to the cells of one group
    ///
    /// `COUNT` counts non-null cells. The others only see the cells that are
    /// numbers and are null when there are none.
    fn apply<'a, I>(&self, cells: I) -> Option<String>
    where
        I: Iterator<Item = Option<&'a str>>,
    {
        let present: Vec<&str> = cells.flatten().collect();
        if let AggregateFunction::Count = self {
            return Some(present.len().to_string());
        }
        let numbers: Vec<BigRational> = present.into_iter().filter_map(parse_number).collect();
        if numbers.is_empty() {
            return None;
        }
        let result = match self {
            AggregateFunction::Sum => sum(&numbers),
            AggregateFunction::Avg => {
                sum(&numbers) / BigRational::from_integer(BigInt::from(numbers.len()))
            }
            AggregateFunction::Min => numbers.iter().min()?.clone(),
            AggregateFunction::Max => numbers.iter().max()?.clone(),
            AggregateFunction::Count => return None,
        };
        Some(format_plain(&result))
    }
}

fn sum(numbers: &[BigRational]) -> BigRational {
    numbers.iter().fold(BigRational::zero(), |acc, n| acc + n)
}

/// One column and the functions to apply to it, written `COLUMN:FUNC[,FUNC]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub column: String,
    pub functions: Vec<AggregateFunction>,
}

impl FromStr for Aggregation {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ReportError::MalformedAggregate(s.to_string());
        let (column, functions) = s.rsplit_once(':').ok_or_else(malformed)?;
        let column = column.trim();
        if column.is_empty() {
            return Err(malformed());
        }
        let functions = functions
            .split(',')
            .filter(|f| !f.trim().is_empty())
            .map(AggregateFunction::from_str)
            .collect::<Result<Vec<AggregateFunction>, ReportError>>()?;
        if functions.is_empty() {
            return Err(malformed());
        }
        Ok(Aggregation {
            column: column.to_string(),
            functions,
        })
    }
}

/// A group by report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSpec {
    pub group_by: Vec<String>,
    pub aggregations: Vec<Aggregation>,
    /// Rows taken into account
    pub condition: Option<String>,
    /// Groups kept, evaluated on the output columns
    pub having: Option<String>,
}

/// Groups the rows and aggregates them
///
/// The output has the group by columns followed by one `{column}_{FUNC}` column
/// per aggregate, one row per group, groups sorted by their values with nulls
/// last. Without group by columns the whole table is a single group.
pub fn aggregate(table: &Table, spec: &AggregateSpec) -> Result<Table, ReportError> {
    if spec.aggregations.iter().all(|a| a.functions.is_empty()) {
        return Err(ReportError::NothingToAggregate);
    }
    let having = spec.having.as_deref().filter(|h| !h.trim().is_empty());
    if having.is_some() && spec.group_by.is_empty() {
        return Err(ReportError::HavingWithoutGroupBy);
    }
    let index = |column: &String| {
        table
            .column_index(column)
            .ok_or_else(|| ReportError::UnknownColumn(column.clone()))
    };
    let keys = spec.group_by.iter().map(|c| index(c)).collect::<Result<Vec<usize>, _>>()?;
    let targets = spec
        .aggregations
        .iter()
        .map(|a| index(&a.column))
        .collect::<Result<Vec<usize>, _>>()?;

    let rows = filter(table, spec.condition.as_deref())?;
    let mut groups: HashMap<Vec<Option<&str>>, Vec<&Row>> = HashMap::new();
    for row in rows.rows() {
        let key = keys.iter().map(|i| row.get(*i)).collect();
        groups.entry(key).or_insert_with(Vec::new).push(row);
    }
    if keys.is_empty() && groups.is_empty() {
        groups.insert(vec![], vec![]);
    }
    let mut groups: Vec<(Vec<Option<&str>>, Vec<&Row>)> = groups.into_iter().collect();
    groups.sort_by(|(a, _), (b, _)| compare_keys(a, b));

    let mut columns = spec.group_by.clone();
    for aggregation in spec.aggregations.iter() {
        for function in aggregation.functions.iter() {
            columns.push(format!("{}_{}", aggregation.column, function));
        }
    }
    let mut result = Table::new(columns);
    for (key, members) in groups {
        let mut cells: Vec<Option<String>> = key.iter().map(|k| k.map(String::from)).collect();
        for (aggregation, target) in spec.aggregations.iter().zip(targets.iter()) {
            for function in aggregation.functions.iter() {
                cells.push(function.apply(members.iter().map(|row| row.get(*target))));
            }
        }
        result.push_cells(cells);
    }

    match having {
        Some(condition) => Ok(filter(&result, Some(condition))?),
        None => Ok(result),
    }
}

fn compare_keys(a: &[Option<&str>], b: &[Option<&str>]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ordering = match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => compare_cells(x, y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
