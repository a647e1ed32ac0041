//! Parser module
//!
//! Conditions are parsed with the grammar in `grammar/condition.pest` and turned into
//! an abstract syntax tree whose column references are already resolved against the
//! columns of the table they will run on. Evaluation lives in [`crate::filter`].

use pest::Parser;

mod node;
mod utils;

pub use node::{Binary, Function, Node, Unary};

#[derive(Parser)]
#[grammar = "grammar/condition.pest"]
pub struct ConditionParser;

/// Builds the abstract syntax tree of a condition
///
/// On failure the error is a human readable reason: the pest report for syntax
/// errors, or a sentence naming the unknown column, function or bad pattern.
pub fn parse_condition(text: &str, columns: &[String]) -> Result<Node, String> {
    let mut parsed = ConditionParser::parse(Rule::condition, text)
        .map_err(|e| format!("syntax error\n{}", e.renamed_rules(rule_name)))?;
    let condition = parsed.next().ok_or("empty condition")?;
    let expr = condition.into_inner().next().ok_or("empty condition")?;
    node::build_ast_from_expr(expr, columns)
}

fn rule_name(rule: &Rule) -> String {
    match rule {
        Rule::comparison_op => "a comparison (=, !=, <, >, <=, >=, =~)",
        Rule::and_op => "AND",
        Rule::or_op => "OR",
        Rule::not_op => "NOT",
        Rule::like_op => "LIKE",
        Rule::is_kw => "IS",
        Rule::in_kw => "IN",
        Rule::between_kw => "BETWEEN",
        Rule::add_op | Rule::mul_op => "an arithmetic operator",
        Rule::column | Rule::identifier | Rule::quoted_identifier | Rule::backtick_identifier => {
            "a column"
        }
        Rule::number => "a number",
        Rule::string => "a quoted string",
        Rule::EOI => "end of condition",
        _ => "a value",
    }
    .to_string()
}
