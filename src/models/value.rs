use chrono::NaiveDate;
use lazy_static::lazy_static;
use num::{BigInt, BigRational, Signed, Zero};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The result of evaluating part of a condition against a row
///
/// Ledger cells carry no type of their own: a `Cell` takes the type of whatever
/// it is compared with. Literals typed in the condition are `Text`, `Number`,
/// `Date` or `Boolean`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Cell(String),
    Text(String),
    Number(BigRational),
    Date(NaiveDate),
    Boolean(bool),
}

impl Value {
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell {
            Some(content) => Value::Cell(content.to_string()),
            None => Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<BigRational> {
        match self {
            Value::Number(n) => Some(n.clone()),
            Value::Cell(s) | Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Cell(s) | Value::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Truth value in three-valued logic, `None` being unknown
    pub fn as_truth(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Cell(s) | Value::Text(s) => parse_boolean(s),
            Value::Number(n) => Some(!n.is_zero()),
            _ => None,
        }
    }

    /// The value as text, nulls having none
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            x => Some(x.to_string()),
        }
    }

    /// Compares two values the way a condition does
    ///
    /// Anything compared with null is unknown. Untyped cells and text literals are
    /// converted to the type of the other side; when the conversion fails the
    /// comparison is unknown rather than an error. Two cells compare numerically
    /// when both hold numbers, as text otherwise. A text literal against a cell
    /// compares as text, so `code = '0100'` does not match a cell holding `100`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Number(_), _) | (_, Value::Number(_)) => {
                Some(self.as_number()?.cmp(&other.as_number()?))
            }
            (Value::Date(_), _) | (_, Value::Date(_)) => {
                Some(self.as_date()?.cmp(&other.as_date()?))
            }
            (Value::Boolean(_), _) | (_, Value::Boolean(_)) => {
                Some(self.as_truth()?.cmp(&other.as_truth()?))
            }
            (Value::Cell(left), Value::Cell(right)) => match (parse_number(left), parse_number(right)) {
                (Some(l), Some(r)) => Some(l.cmp(&r)),
                _ => Some(left.cmp(right)),
            },
            (Value::Cell(left), Value::Text(right))
            | (Value::Text(left), Value::Cell(right))
            | (Value::Text(left), Value::Text(right)) => Some(left.cmp(right)),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Cell(s) | Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", format_plain(n)),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

lazy_static! {
    static ref RE_NUMBER: Regex =
        Regex::new(r"^([+-])?(\d{1,3}(?:,\d{3})+|\d+)?(?:\.(\d+))?$").unwrap();
    static ref RE_DATE: Regex = Regex::new(r"^(\d{4})[/.-](\d\d?)[/.-](\d\d?)$").unwrap();
    static ref RE_COMPACT_DATE: Regex = Regex::new(r"^(\d{4})(\d\d)(\d\d)$").unwrap();
}

/// Parses a decimal number exactly
///
/// Accepts an optional sign, thousands separators and a fractional part, so
/// spreadsheet exports like `-1,250,000.50` are numbers.
pub fn parse_number(text: &str) -> Option<BigRational> {
    let captures = RE_NUMBER.captures(text.trim())?;
    let integer = captures.get(2).map_or("", |m| m.as_str());
    let fraction = captures.get(3).map_or("", |m| m.as_str());
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    let mut digits: String = integer.chars().filter(|c| *c != ',').collect();
    digits.push_str(fraction);
    let numerator = BigInt::from_str(digits.as_str()).ok()?;
    let denominator = num::pow(BigInt::from(10), fraction.len());
    let number = BigRational::new(numerator, denominator);
    match captures.get(1).map(|m| m.as_str()) {
        Some("-") => Some(-number),
        _ => Some(number),
    }
}

/// Parses `2025-01-31`, `2025/01/31`, `2025.01.31` or `20250131`
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let captures = RE_DATE
        .captures(text)
        .or_else(|| RE_COMPACT_DATE.captures(text))?;
    NaiveDate::from_ymd_opt(
        captures.get(1)?.as_str().parse::<i32>().ok()?,
        captures.get(2)?.as_str().parse::<u32>().ok()?,
        captures.get(3)?.as_str().parse::<u32>().ok()?,
    )
}

fn parse_boolean(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Writes a number without grouping, with at most six decimals
///
/// This is the form aggregated values are stored in, so they can be read back
/// by [`parse_number`].
pub fn format_plain(number: &BigRational) -> String {
    if number.is_integer() {
        return number.to_integer().to_string();
    }
    let formatted = format_decimal(number, 6);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Writes a number for people: thousands separators, two decimals unless integer
pub fn format_amount(number: &BigRational) -> String {
    let formatted = if number.is_integer() {
        number.to_integer().to_string()
    } else {
        format_decimal(number, 2)
    };
    group_thousands(&formatted)
}

fn format_decimal(number: &BigRational, decimals: usize) -> String {
    let scale = BigRational::from_integer(num::pow(BigInt::from(10), decimals));
    let scaled = (number.clone() * scale).round().to_integer();
    let sign = if scaled.is_negative() { "-" } else { "" };
    let digits = format!("{:0>width$}", scaled.abs().to_string(), width = decimals + 1);
    let (integer, fraction) = digits.split_at(digits.len() - decimals);
    if decimals == 0 {
        format!("{}{}", sign, integer)
    } else {
        format!("{}{}.{}", sign, integer, fraction)
    }
}

fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (integer, fraction) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };
    let mut grouped = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}{}", sign, grouped, fraction)
}
