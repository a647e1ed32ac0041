//! Step 1 of the reduction: keep the ledger lines a condition holds for
use log::debug;
use num::{BigInt, BigRational, Signed, Zero};
use std::cmp::Ordering;

use crate::models::{Row, Table, Value};
use crate::parser::{parse_condition, Binary, Function, Node, Unary};
use crate::PipelineError;

/// A condition compiled for the columns of one table
#[derive(Debug, Clone)]
pub struct Condition {
    text: String,
    root: Node,
}

impl Condition {
    /// Parses `text` and resolves its columns against `columns`
    ///
    /// Anything that stops the condition from being evaluated on every row is
    /// reported here, so evaluation itself cannot fail.
    pub fn compile(text: &str, columns: &[String]) -> Result<Self, PipelineError> {
        let invalid = |reason: String| PipelineError::InvalidCondition {
            condition: text.to_string(),
            reason,
        };
        let root = parse_condition(text, columns).map_err(invalid)?;
        if !root.is_predicate() {
            return Err(invalid(
                "the condition should be a comparison or another true/false test".to_string(),
            ));
        }
        Ok(Condition {
            text: text.to_string(),
            root,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the condition holds. Unknown (null) results do not match.
    pub fn matches(&self, row: &Row) -> bool {
        eval(&self.root, row).as_truth() == Some(true)
    }
}

/// Filters a table with a condition
///
/// A missing or blank condition keeps every row. Rows come back in table order.
pub fn filter(table: &Table, condition: Option<&str>) -> Result<Table, PipelineError> {
    let text = match condition {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Ok(table.clone()),
    };
    let condition = Condition::compile(text, table.columns())?;
    let filtered = table.select(|row| condition.matches(row));
    debug!(
        "filter {:?}: {} rows -> {} rows",
        condition.text(),
        table.len(),
        filtered.len()
    );
    Ok(filtered)
}

/// Evaluates a node against a row
pub fn eval(node: &Node, row: &Row) -> Value {
    match node {
        Node::Column(index) => Value::from_cell(row.get(*index)),
        Node::Literal(value) => value.clone(),
        Node::UnaryExpr { op, child } => {
            let value = eval(child, row);
            match op {
                Unary::Not => truth(value.as_truth().map(|b| !b)),
                Unary::Neg => number(value.as_number().map(|n| -n)),
            }
        }
        Node::BinaryExpr { op, lhs, rhs } => match op {
            Binary::And => {
                let left = eval(lhs, row).as_truth();
                if left == Some(false) {
                    return Value::Boolean(false);
                }
                match (left, eval(rhs, row).as_truth()) {
                    (_, Some(false)) => Value::Boolean(false),
                    (Some(true), Some(true)) => Value::Boolean(true),
                    _ => Value::Null,
                }
            }
            Binary::Or => {
                let left = eval(lhs, row).as_truth();
                if left == Some(true) {
                    return Value::Boolean(true);
                }
                match (left, eval(rhs, row).as_truth()) {
                    (_, Some(true)) => Value::Boolean(true),
                    (Some(false), Some(false)) => Value::Boolean(false),
                    _ => Value::Null,
                }
            }
            Binary::Add | Binary::Subtract | Binary::Mult | Binary::Div => {
                let left = eval(lhs, row).as_number();
                let right = eval(rhs, row).as_number();
                match (left, right) {
                    (Some(l), Some(r)) => match op {
                        Binary::Add => Value::Number(l + r),
                        Binary::Subtract => Value::Number(l - r),
                        Binary::Mult => Value::Number(l * r),
                        _ if r.is_zero() => Value::Null,
                        _ => Value::Number(l / r),
                    },
                    _ => Value::Null,
                }
            }
            comparison => {
                let ordering = eval(lhs, row).compare(&eval(rhs, row));
                truth(ordering.map(|o| holds(*comparison, o)))
            }
        },
        Node::Between {
            negated,
            value,
            low,
            high,
        } => {
            let value = eval(value, row);
            let above = value.compare(&eval(low, row)).map(|o| o != Ordering::Less);
            let below = value.compare(&eval(high, row)).map(|o| o != Ordering::Greater);
            let inside = match (above, below) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            };
            truth(negate(inside, *negated))
        }
        Node::InList {
            negated,
            value,
            list,
        } => {
            let value = eval(value, row);
            let mut found = Some(false);
            for item in list {
                match value.compare(&eval(item, row)) {
                    Some(Ordering::Equal) => {
                        found = Some(true);
                        break;
                    }
                    Some(_) => {}
                    None => found = None,
                }
            }
            truth(negate(found, *negated))
        }
        Node::IsNull { negated, value } => {
            Value::Boolean(eval(value, row).is_null() != *negated)
        }
        Node::Matches {
            negated,
            value,
            regex,
        } => {
            let matched = eval(value, row).as_text().map(|t| regex.is_match(&t));
            truth(negate(matched, *negated))
        }
        Node::Function { function, args } => {
            let arg = match args.first() {
                Some(arg) => eval(arg, row),
                None => Value::Null,
            };
            call(*function, arg)
        }
    }
}

fn call(function: Function, arg: Value) -> Value {
    match function {
        Function::IsNull => Value::Boolean(arg.is_null()),
        Function::NotNull => Value::Boolean(!arg.is_null()),
        Function::Abs => number(arg.as_number().map(|n| n.abs())),
        Function::ToDate => match arg.as_date() {
            Some(date) => Value::Date(date),
            None => Value::Null,
        },
        Function::Lower | Function::Upper | Function::Trim | Function::Length => {
            match arg.as_text() {
                None => Value::Null,
                Some(text) => match function {
                    Function::Lower => Value::Text(text.to_lowercase()),
                    Function::Upper => Value::Text(text.to_uppercase()),
                    Function::Trim => Value::Text(text.trim().to_string()),
                    _ => Value::Number(BigRational::from_integer(BigInt::from(text.chars().count()))),
                },
            }
        }
    }
}

fn holds(comparison: Binary, ordering: Ordering) -> bool {
    match comparison {
        Binary::Eq => ordering == Ordering::Equal,
        Binary::Ne => ordering != Ordering::Equal,
        Binary::Lt => ordering == Ordering::Less,
        Binary::Gt => ordering == Ordering::Greater,
        Binary::Le => ordering != Ordering::Greater,
        Binary::Ge => ordering != Ordering::Less,
        _ => false,
    }
}

fn negate(result: Option<bool>, negated: bool) -> Option<bool> {
    result.map(|b| b != negated)
}

fn truth(result: Option<bool>) -> Value {
    match result {
        Some(b) => Value::Boolean(b),
        None => Value::Null,
    }
}

fn number(result: Option<BigRational>) -> Value {
    match result {
        Some(n) => Value::Number(n),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Table {
        Table::from_str_rows(
            &["je_id", "account", "amount", "memo", "date"],
            &[
                &["1", "10100", "50", "cash", "2025-01-10"],
                &["1", "40100", "-50", "", "2025-01-10"],
                &["2", "10100", "150", "Bonus paid", "2025-01-20"],
                &["3", "20100", "1,200.50", "O'Connor", "2025-02-01"],
                &["4", "", "abc", "", "2025-02-15"],
            ],
        )
    }

    fn ids(table: &Table) -> Vec<usize> {
        table.rows().iter().map(|r| r.seq).collect()
    }

    fn run(condition: &str) -> Vec<usize> {
        ids(&filter(&ledger(), Some(condition)).unwrap())
    }

    #[test]
    fn blank_condition_is_identity() {
        let table = ledger();
        assert_eq!(filter(&table, None).unwrap(), table);
        assert_eq!(filter(&table, Some("   ")).unwrap(), table);
    }

    #[test]
    fn comparisons() {
        assert_eq!(run("amount > 100"), vec![2, 3]);
        assert_eq!(run("amount <= -50"), vec![1]);
        assert_eq!(run("account = '10100'"), vec![0, 2]);
        assert_eq!(run("account <> '10100'"), vec![1, 3]);
        assert_eq!(run("memo = 'O''Connor'"), vec![3]);
        assert_eq!(run("date >= to_date('2025-02-01')"), vec![3, 4]);
    }

    #[test]
    fn logic_is_three_valued() {
        // Rows 1 and 4 have no memo: unknown is never a match, negated or not
        assert_eq!(run("memo = 'cash'"), vec![0]);
        assert_eq!(run("not memo = 'cash'"), vec![2, 3]);
        assert_eq!(run("memo = 'cash' or amount < 0"), vec![0, 1]);
        assert_eq!(run("memo is null and je_id = 4"), vec![4]);
    }

    #[test]
    fn membership_ranges_and_patterns() {
        assert_eq!(run("account IN ('20100', '40100')"), vec![1, 3]);
        assert_eq!(run("account NOT IN ('10100')"), vec![1, 3]);
        assert_eq!(run("amount BETWEEN 50 AND 150"), vec![0, 2]);
        assert_eq!(run("amount NOT BETWEEN 50 AND 150"), vec![1, 3]);
        assert_eq!(run("memo ILIKE '%bonus%'"), vec![2]);
        assert_eq!(run("memo LIKE '%bonus%'"), Vec::<usize>::new());
        assert_eq!(run("account =~ '^[12]0'"), vec![0, 2, 3]);
        assert_eq!(run("isnull(account)"), vec![4]);
        assert_eq!(run("notna(memo) && length(memo) > 4"), vec![2, 3]);
    }

    #[test]
    fn arithmetic() {
        assert_eq!(run("abs(amount) = 50"), vec![0, 1]);
        assert_eq!(run("amount * 2 > 2000"), vec![3]);
        assert_eq!(run("amount / 0 = 1"), Vec::<usize>::new());
        assert_eq!(run("-amount > 0"), vec![1]);
    }

    #[test]
    fn invalid_conditions_keep_the_text() {
        match filter(&ledger(), Some("foo > 1")) {
            Err(PipelineError::InvalidCondition { condition, reason }) => {
                assert_eq!(condition, "foo > 1");
                assert!(reason.contains("foo"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(filter(&ledger(), Some("amount >")).is_err());
        assert!(filter(&ledger(), Some("amount + 1")).is_err());
    }
}
