//! This module contains auxiliary parsers

use regex::Regex;

/// Strips the surrounding quotes of a token, undoing doubled quotes inside
pub(super) fn unquote(token: &str, quote: char) -> String {
    let inner = token
        .strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .unwrap_or(token);
    let doubled: String = [quote, quote].iter().collect();
    inner.replace(doubled.as_str(), &quote.to_string())
}

/// Translates a SQL `LIKE` pattern: `%` is any run of characters, `_` any one
pub(super) fn like_to_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
    let mut expression = String::from(if case_insensitive { "(?is)^" } else { "(?s)^" });
    for c in pattern.chars() {
        match c {
            '%' => expression.push_str(".*"),
            '_' => expression.push('.'),
            c => expression.push_str(&regex::escape(&c.to_string())),
        }
    }
    expression.push('$');
    Regex::new(&expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes() {
        assert_eq!(unquote("'O''Connor'", '\''), "O'Connor");
        assert_eq!(unquote("\"Account \"\"A\"\"\"", '"'), "Account \"A\"");
        assert_eq!(unquote("`전표 번호`", '`'), "전표 번호");
    }

    #[test]
    fn like_patterns() {
        let bonus = like_to_regex("%bonus%", true).unwrap();
        assert!(bonus.is_match("Year-end BONUS payout"));
        assert!(!bonus.is_match("salary"));

        let code = like_to_regex("1_1%", false).unwrap();
        assert!(code.is_match("10100"));
        assert!(!code.is_match("20100"));

        let literal = like_to_regex("a.b", false).unwrap();
        assert!(!literal.is_match("axb"));
    }
}
