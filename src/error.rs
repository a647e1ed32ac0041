use colored::{ColoredString, Colorize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use thiserror::Error;

/// The structural part a caller-selected column plays in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    EntryId,
    PatternHash,
}

impl Display for ColumnRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::EntryId => write!(f, "entry identifier"),
            ColumnRole::PatternHash => write!(f, "pattern hash"),
        }
    }
}

/// Failures of the reduction pipeline. All of them come from the caller's input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("invalid condition `{condition}`: {reason}")]
    InvalidCondition { condition: String, reason: String },

    #[error("{role} column {}", describe_selection(.column))]
    MissingColumnSelection {
        role: ColumnRole,
        column: Option<String>,
    },
}

fn describe_selection(column: &Option<String>) -> String {
    match column {
        Some(name) => format!("{:?} does not exist", name),
        None => "was not selected".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("invalid file pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("no CSV files found for {0:?}")]
    NoFiles(String),
    #[error("{} has no header row", .0.display())]
    MissingHeader(PathBuf),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
    #[error("unknown aggregate function {0:?}, expected SUM, COUNT, AVG, MIN or MAX")]
    UnknownAggregate(String),
    #[error("aggregate {0:?} should look like COLUMN:FUNC[,FUNC]")]
    MalformedAggregate(String),
    #[error("nothing to aggregate, add at least one COLUMN:FUNC")]
    NothingToAggregate,
    #[error("a having condition needs at least one group by column")]
    HavingWithoutGroupBy,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// An error on its way to the terminal
#[derive(Debug)]
pub struct Error {
    pub message: Vec<ColoredString>,
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ColoredStrings(&self.message))
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error {
            message: vec![message.red().bold()],
        }
    }
}

impl From<PipelineError> for Error {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::InvalidCondition { condition, reason } => Error {
                message: vec![
                    "Invalid condition ".normal(),
                    condition.red().bold(),
                    format!("\n{}", reason).normal(),
                ],
            },
            other => Error::from(other.to_string().as_str()),
        }
    }
}

impl From<LoadError> for Error {
    fn from(error: LoadError) -> Self {
        Error::from(error.to_string().as_str())
    }
}

impl From<ReportError> for Error {
    fn from(error: ReportError) -> Self {
        match error {
            ReportError::Pipeline(e) => Error::from(e),
            other => Error::from(other.to_string().as_str()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::from(error.to_string().as_str())
    }
}

impl From<rustyline::error::ReadlineError> for Error {
    fn from(error: rustyline::error::ReadlineError) -> Self {
        Error::from(error.to_string().as_str())
    }
}

// https://medium.com/apolitical-engineering/how-do-you-impl-display-for-vec-b8dbb21d814f
struct ColoredStrings<'a>(pub &'a Vec<ColoredString>);

impl<'a> fmt::Display for ColoredStrings<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.iter().fold(Ok(()), |result, partial| {
            result.and_then(|_| write!(f, "{}", partial))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_messages() {
        let unselected = PipelineError::MissingColumnSelection {
            role: ColumnRole::EntryId,
            column: None,
        };
        assert_eq!(unselected.to_string(), "entry identifier column was not selected");

        let unknown = PipelineError::MissingColumnSelection {
            role: ColumnRole::PatternHash,
            column: Some("hash".to_string()),
        };
        assert_eq!(unknown.to_string(), "pattern hash column \"hash\" does not exist");
    }

    #[test]
    fn invalid_condition_keeps_the_text() {
        colored::control::set_override(false);
        let error: Error = PipelineError::InvalidCondition {
            condition: "foo > 1".to_string(),
            reason: "unknown column \"foo\"".to_string(),
        }
        .into();
        let message = error.to_string();
        assert!(message.contains("foo > 1"));
        assert!(message.contains("unknown column"));
    }
}
