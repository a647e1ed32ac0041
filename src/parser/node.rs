use pest::iterators::{Pair, Pairs};
use regex::Regex;

use super::utils::{like_to_regex, unquote};
use super::Rule;
use crate::models::{parse_number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unary {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binary {
    And,
    Or,
    Add,
    Subtract,
    Mult,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Binary {
    fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Binary::Add | Binary::Subtract | Binary::Mult | Binary::Div
        )
    }
}

/// Functions available in conditions. They all take one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Lower,
    Upper,
    Trim,
    Length,
    ToDate,
    IsNull,
    NotNull,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "abs" => Some(Function::Abs),
            "lower" => Some(Function::Lower),
            "upper" => Some(Function::Upper),
            "trim" => Some(Function::Trim),
            "length" | "len" => Some(Function::Length),
            "to_date" | "date" => Some(Function::ToDate),
            "isnull" | "isna" => Some(Function::IsNull),
            "notnull" | "notna" => Some(Function::NotNull),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Node {
    /// Index of a column of the table the condition was built for
    Column(usize),
    Literal(Value),
    UnaryExpr {
        op: Unary,
        child: Box<Node>,
    },
    BinaryExpr {
        op: Binary,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Between {
        negated: bool,
        value: Box<Node>,
        low: Box<Node>,
        high: Box<Node>,
    },
    InList {
        negated: bool,
        value: Box<Node>,
        list: Vec<Node>,
    },
    IsNull {
        negated: bool,
        value: Box<Node>,
    },
    /// `LIKE`, `ILIKE` and `=~`, all compiled to a regular expression
    Matches {
        negated: bool,
        value: Box<Node>,
        regex: Regex,
    },
    Function {
        function: Function,
        args: Vec<Node>,
    },
}

impl Node {
    /// Whether the node yields a truth value rather than a plain value
    pub fn is_predicate(&self) -> bool {
        match self {
            Node::Literal(Value::Boolean(_)) => true,
            Node::UnaryExpr { op, .. } => *op == Unary::Not,
            Node::BinaryExpr { op, .. } => !op.is_arithmetic(),
            Node::Between { .. } | Node::InList { .. } | Node::IsNull { .. } => true,
            Node::Matches { .. } => true,
            Node::Function { function, .. } => {
                matches!(function, Function::IsNull | Function::NotNull)
            }
            Node::Column(_) | Node::Literal(_) => false,
        }
    }
}

/// Build an abstract syntax tree from a parsed condition
pub(super) fn build_ast_from_expr(pair: Pair<Rule>, columns: &[String]) -> Result<Node, String> {
    let rule = pair.as_rule();
    match rule {
        Rule::expr | Rule::primary => build_ast_from_expr(next(&mut pair.into_inner())?, columns),
        Rule::or_expr | Rule::and_expr | Rule::additive | Rule::multiplicative => {
            let mut inner = pair.into_inner();
            let mut lhs = build_ast_from_expr(next(&mut inner)?, columns)?;
            while let Some(operator) = inner.next() {
                let op = match rule {
                    Rule::or_expr => Binary::Or,
                    Rule::and_expr => Binary::And,
                    _ => binary_operator(operator.as_str())?,
                };
                let rhs = build_ast_from_expr(next(&mut inner)?, columns)?;
                lhs = parse_binary_expr(op, lhs, rhs);
            }
            Ok(lhs)
        }
        Rule::not_expr | Rule::unary => {
            let mut prefixes = 0;
            let mut operand = None;
            for part in pair.into_inner() {
                match part.as_rule() {
                    Rule::not_op | Rule::neg_op => prefixes += 1,
                    _ => operand = Some(build_ast_from_expr(part, columns)?),
                }
            }
            let op = if rule == Rule::not_expr {
                Unary::Not
            } else {
                Unary::Neg
            };
            let mut node = operand.ok_or_else(incomplete)?;
            for _ in 0..prefixes {
                node = parse_unary_expr(op, node);
            }
            Ok(node)
        }
        Rule::predicate => {
            let mut inner = pair.into_inner();
            let value = build_ast_from_expr(next(&mut inner)?, columns)?;
            match inner.next() {
                None => Ok(value),
                Some(test) => build_test(value, test, columns),
            }
        }
        Rule::function => {
            let mut inner = pair.into_inner();
            let name = next(&mut inner)?.as_str();
            let function =
                Function::from_name(name).ok_or_else(|| format!("unknown function {:?}", name))?;
            let mut args = vec![];
            for part in inner {
                args.push(build_ast_from_expr(part, columns)?);
            }
            if args.len() != 1 {
                return Err(format!(
                    "{}() takes one argument, {} given",
                    name,
                    args.len()
                ));
            }
            Ok(Node::Function { function, args })
        }
        Rule::column => {
            let token = next(&mut pair.into_inner())?;
            let name = match token.as_rule() {
                Rule::quoted_identifier => unquote(token.as_str(), '"'),
                Rule::backtick_identifier => unquote(token.as_str(), '`'),
                _ => token.as_str().to_string(),
            };
            match columns.iter().position(|c| c == &name) {
                Some(index) => Ok(Node::Column(index)),
                None => Err(format!("unknown column {:?}", name)),
            }
        }
        Rule::number => match parse_number(pair.as_str()) {
            Some(n) => Ok(Node::Literal(Value::Number(n))),
            None => Err(format!("invalid number {}", pair.as_str())),
        },
        Rule::string => Ok(Node::Literal(Value::Text(unquote(pair.as_str(), '\'')))),
        Rule::boolean => Ok(Node::Literal(Value::Boolean(
            pair.as_str().eq_ignore_ascii_case("true"),
        ))),
        Rule::null_kw => Ok(Node::Literal(Value::Null)),
        unknown => Err(format!("unexpected {:?} in condition", unknown)),
    }
}

/// The test following a value: comparison, BETWEEN, IN, LIKE or IS NULL
fn build_test(value: Node, test: Pair<Rule>, columns: &[String]) -> Result<Node, String> {
    let rule = test.as_rule();
    let mut negated = false;
    let mut operator = String::new();
    let mut operands = vec![];
    for part in test.into_inner() {
        match part.as_rule() {
            Rule::not_op => negated = true,
            Rule::comparison_op | Rule::like_op => operator = part.as_str().to_lowercase(),
            Rule::between_kw | Rule::in_kw | Rule::is_kw | Rule::null_kw | Rule::and_op => {}
            _ => operands.push(build_ast_from_expr(part, columns)?),
        }
    }
    let value = Box::new(value);
    match rule {
        Rule::null_test => Ok(Node::IsNull { negated, value }),
        Rule::in_test => Ok(Node::InList {
            negated,
            value,
            list: operands,
        }),
        Rule::between_test => {
            let mut bounds = operands.into_iter();
            match (bounds.next(), bounds.next()) {
                (Some(low), Some(high)) => Ok(Node::Between {
                    negated,
                    value,
                    low: Box::new(low),
                    high: Box::new(high),
                }),
                _ => Err(incomplete()),
            }
        }
        Rule::like_test => {
            let pattern = pattern_text(operands.pop(), operator.to_uppercase().as_str())?;
            let regex = like_to_regex(&pattern, operator == "ilike")
                .map_err(|e| format!("bad pattern {:?}: {}", pattern, e))?;
            Ok(Node::Matches {
                negated,
                value,
                regex,
            })
        }
        Rule::comparison if operator == "=~" => {
            let pattern = pattern_text(operands.pop(), "=~")?;
            let regex = Regex::new(&pattern)
                .map_err(|e| format!("bad regular expression {:?}: {}", pattern, e))?;
            Ok(Node::Matches {
                negated: false,
                value,
                regex,
            })
        }
        Rule::comparison => {
            let rhs = operands.pop().ok_or_else(incomplete)?;
            Ok(parse_binary_expr(binary_operator(&operator)?, *value, rhs))
        }
        unknown => Err(format!("unexpected {:?} in condition", unknown)),
    }
}

fn binary_operator(operator: &str) -> Result<Binary, String> {
    match operator {
        "+" => Ok(Binary::Add),
        "-" => Ok(Binary::Subtract),
        "*" => Ok(Binary::Mult),
        "/" => Ok(Binary::Div),
        "=" | "==" => Ok(Binary::Eq),
        "!=" | "<>" => Ok(Binary::Ne),
        "<" => Ok(Binary::Lt),
        ">" => Ok(Binary::Gt),
        "<=" => Ok(Binary::Le),
        ">=" => Ok(Binary::Ge),
        x => Err(format!("unknown operator {}", x)),
    }
}

/// Patterns have to be written as quoted strings
fn pattern_text(node: Option<Node>, operator: &str) -> Result<String, String> {
    match node {
        Some(Node::Literal(Value::Text(pattern))) => Ok(pattern),
        _ => Err(format!("{} needs a quoted pattern", operator)),
    }
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>) -> Result<Pair<'i, Rule>, String> {
    pairs.next().ok_or_else(incomplete)
}

fn incomplete() -> String {
    "incomplete condition".to_string()
}

fn parse_binary_expr(operation: Binary, lhs: Node, rhs: Node) -> Node {
    Node::BinaryExpr {
        op: operation,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn parse_unary_expr(operation: Unary, child: Node) -> Node {
    Node::UnaryExpr {
        op: operation,
        child: Box::new(child),
    }
}
