//! Document the command line interface
use colored::Colorize;
use log::debug;
use std::collections::HashMap;
use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use structopt::clap::ErrorKind;
use structopt::StructOpt;

use crate::commands::{aggregate, columns, run, statistics, values};
use crate::report::Aggregation;
use crate::store::MemoryStore;
use crate::{repl, Error};

/// Column grouping the lines of a journal entry in the general ledger export
pub const DEFAULT_ENTRY_COLUMN: &str = "전표번호";
/// Column holding the transaction type group hash in the general ledger export
pub const DEFAULT_HASH_COLUMN: &str = "거래유형그룹_해시값";

#[derive(Debug, StructOpt)]
pub(crate) enum Command {
    /// Filter lines, expand them to journal entries and keep one entry per pattern
    #[structopt(alias = "reduce")]
    Run(RunOpts),
    /// List the columns
    Columns(CommonOpts),
    /// List the distinct values of a column
    Values {
        #[structopt(flatten)]
        options: CommonOpts,
        /// The column
        #[structopt(name = "COLUMN")]
        column: String,
        /// Maximum number of values
        #[structopt(long = "limit", default_value = "100")]
        limit: usize,
    },
    /// Row, entry and pattern counts
    #[structopt(alias = "stats")]
    Statistics(CommonOpts),
    /// Group by report
    #[structopt(alias = "agg")]
    Aggregate(AggregateOpts),
    /// Interactive session over the loaded files
    Repl(CommonOpts),
}

impl Command {
    pub(crate) fn options(&self) -> &CommonOpts {
        match self {
            Command::Run(run) => &run.common,
            Command::Columns(options) => options,
            Command::Values { options, .. } => options,
            Command::Statistics(options) => options,
            Command::Aggregate(aggregate) => &aggregate.common,
            Command::Repl(options) => options,
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(about = "Journal entry reduction for general ledger exports",
version = env ! ("CARGO_PKG_VERSION"),
author = env ! ("CARGO_PKG_AUTHORS"),
name = "jereduce"
)]
pub(crate) struct Opt {
    #[structopt(subcommand)]
    pub(crate) cmd: Command,
}

/// Command line options
#[derive(Debug, StructOpt, Clone)]
pub struct CommonOpts {
    /// Input CSV file, directory or glob pattern. Can be repeated.
    #[structopt(
        name = "FILE",
        short = "f",
        long = "file",
        parse(from_os_str),
        number_of_values = 1
    )]
    pub input_files: Vec<PathBuf>,

    /// Ignore init file if it exists
    #[structopt(long = "args-only")]
    args_only: bool,

    /// Init file
    #[structopt(long = "init-file", parse(from_os_str))]
    init_file: Option<PathBuf>,

    /// Column identifying the journal entry a line belongs to
    #[structopt(long = "entry-column", default_value = DEFAULT_ENTRY_COLUMN)]
    pub entry_column: String,

    /// Column holding the transaction pattern hash
    #[structopt(long = "hash-column", default_value = DEFAULT_HASH_COLUMN)]
    pub hash_column: String,

    #[structopt(long = "force-color")]
    pub force_color: bool,
}

#[derive(Debug, StructOpt, Clone)]
pub struct RunOpts {
    #[structopt(flatten)]
    pub common: CommonOpts,

    /// The condition, every line when empty
    #[structopt(multiple = true, takes_value = true)]
    pub query: Vec<String>,

    /// Include every line of the journal entries with a matching line
    #[structopt(long = "expand")]
    pub expand: bool,

    /// Keep a single journal entry per transaction pattern
    #[structopt(long = "unique")]
    pub unique: bool,

    /// Maximum number of rows displayed
    #[structopt(long = "limit", default_value = "50000")]
    pub limit: usize,

    /// Write the whole result to a CSV file
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    pub output: Option<PathBuf>,

    /// Show the totals of the numeric columns
    #[structopt(long = "totals")]
    pub totals: bool,
}

impl RunOpts {
    /// The condition words joined back together
    pub fn condition(&self) -> Option<String> {
        let condition = self.query.join(" ");
        match condition.trim().is_empty() {
            true => None,
            false => Some(condition),
        }
    }
}

#[derive(Debug, StructOpt, Clone)]
pub struct AggregateOpts {
    #[structopt(flatten)]
    pub common: CommonOpts,

    /// Column to group by. Can be repeated.
    #[structopt(long = "group-by", number_of_values = 1)]
    pub group_by: Vec<String>,

    /// COLUMN:FUNC[,FUNC] with SUM, COUNT, AVG, MIN or MAX. Can be repeated.
    #[structopt(long = "agg", number_of_values = 1)]
    pub aggregations: Vec<Aggregation>,

    /// Only aggregate the lines meeting this condition
    #[structopt(long = "where")]
    pub condition: Option<String>,

    /// Only keep the groups meeting this condition, e.g. "차변금액_SUM > 1000000"
    #[structopt(long = "having")]
    pub having: Option<String>,
}

const INIT_FILE_FLAG: &str = "--init-file";
const NO_INIT_FILE_FLAG: &str = "--args-only";
const INIT_PATH_UNDER_HOME: &str = "~/.jereducerc";
const INIT_PATH: &str = ".jereducerc";

/// Where to look for an init file, in order. `Err` when an explicit one is missing.
fn init_paths(args: &[String]) -> Result<Vec<PathBuf>, Error> {
    if args.iter().any(|x| x == NO_INIT_FILE_FLAG) {
        return Ok(vec![]);
    }
    if let Some(i) = args.iter().position(|x| x == INIT_FILE_FLAG) {
        let path = match args.get(i + 1) {
            Some(path) => PathBuf::from(shellexpand::tilde(path).to_string()),
            None => return Err(Error::from("--init-file needs a path")),
        };
        if !path.exists() {
            return Err(Error {
                message: vec![
                    "Init file ".normal(),
                    format!("{}", path.display()).red().bold(),
                    " does not exist".normal(),
                ],
            });
        }
        return Ok(vec![path]);
    }
    Ok(vec![
        PathBuf::from(shellexpand::tilde(INIT_PATH_UNDER_HOME).to_string()),
        PathBuf::from(INIT_PATH),
    ])
}

/// Adds the options of an init file to the arguments, unless they were given
fn merge_init_file(file: &Path, args: &mut Vec<String>) -> Result<(), Error> {
    let mut aliases = HashMap::new();
    aliases.insert("-f".to_string(), "--file".to_string());
    let contents = read_to_string(file)?;
    let bad_line = |line: &str| Error {
        message: vec![
            format!("Bad config file {:?}\n", file).normal(),
            line.red().bold(),
        ],
    };
    for line in contents.lines() {
        let option = line.trim();
        match option.chars().next() {
            None => (),
            Some(';') | Some('#') | Some('!') | Some('%') => (), // a comment
            Some('-') => {
                if !option.starts_with("--") {
                    return Err(bad_line(line));
                }
                let mut iter = option.split_whitespace();
                let flag = match iter.next() {
                    Some(flag) => flag,
                    None => return Err(bad_line(line)),
                };
                let given = args.iter().any(|x| {
                    (x == flag) | (aliases.get(x).map(String::as_str) == Some(flag))
                });
                if !given {
                    args.push(flag.to_string());
                    let rest: Vec<&str> = iter.collect();
                    if !rest.is_empty() {
                        args.push(rest.join(" "));
                    }
                }
            }
            Some(_) => return Err(bad_line(line)),
        }
    }
    debug!("arguments after {}: {:?}", file.display(), args);
    Ok(())
}

/// Entry point for the command line app
///
/// Load the options from the init file, add them to the supplied command line
/// options and call the command accordingly.
pub fn run_app(mut args: Vec<String>) -> Result<(), Error> {
    if let Some(file) = init_paths(&args)?.into_iter().find(|p| p.is_file()) {
        merge_init_file(&file, &mut args)?;
    }

    let opt = match Opt::from_iter_safe(args.iter()) {
        Ok(opt) => opt,
        Err(e) => match e.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => {
                println!("{}", e.message);
                return Ok(());
            }
            _ => {
                return Err(Error {
                    message: vec![e.message.normal()],
                })
            }
        },
    };
    execute(opt.cmd, None)
}

/// Runs a command, over `loaded` when there is one or over the files in its options
pub(crate) fn execute(command: Command, loaded: Option<&MemoryStore>) -> Result<(), Error> {
    if command.options().force_color {
        env::set_var("CLICOLOR_FORCE", "1");
    }
    let owned;
    let store = match (loaded, &command) {
        (Some(store), _) => store,
        (None, Command::Repl(options)) => return repl::execute(options),
        (None, _) => {
            owned = load(command.options())?;
            &owned
        }
    };

    match command {
        Command::Run(options) => run::execute(&options, store),
        Command::Columns(_) => columns::execute(store),
        Command::Values { column, limit, .. } => values::execute(store, &column, limit),
        Command::Statistics(options) => statistics::execute(store, &options),
        Command::Aggregate(options) => aggregate::execute(store, &options),
        Command::Repl(_) => Err(Error::from("Already in an interactive session")),
    }
}

pub(crate) fn load(options: &CommonOpts) -> Result<MemoryStore, Error> {
    if options.input_files.is_empty() {
        return Err(Error::from("No input files, use -f FILE"));
    }
    Ok(MemoryStore::load(&options.input_files)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn init_file_fills_missing_options() {
        let mut given = args(&["testing", "run", "--entry-column", "je_id"]);
        merge_init_file(Path::new("tests/example_files/example_jereducerc"), &mut given).unwrap();
        assert_eq!(
            given,
            args(&[
                "testing",
                "run",
                "--entry-column",
                "je_id",
                "--hash-column",
                DEFAULT_HASH_COLUMN
            ])
        );
    }

    #[test]
    fn bad_init_files_are_errors() {
        colored::control::set_override(false);
        for (file, line) in &[
            (
                "tests/example_files/example_bad_jereducerc",
                "This line should be a comment but isn't, it is bad on purpose.",
            ),
            (
                "tests/example_files/example_bad_jereducerc2",
                "- This does not parse either. And it shouldn't.",
            ),
        ] {
            let mut given = args(&["testing", "stats"]);
            let error = merge_init_file(Path::new(file), &mut given).unwrap_err();
            let message = error.to_string();
            assert!(message.starts_with("Bad config file"), "{}", message);
            assert!(message.ends_with(line), "{}", message);
        }
    }

    #[test]
    fn init_paths_follow_flags() {
        assert!(init_paths(&args(&["testing", "stats", "--args-only"]))
            .unwrap()
            .is_empty());
        let explicit = init_paths(&args(&[
            "testing",
            "stats",
            "--init-file",
            "tests/example_files/example_jereducerc",
        ]))
        .unwrap();
        assert_eq!(explicit.len(), 1);
        assert!(init_paths(&args(&["testing", "stats", "--init-file", "nope.rc"])).is_err());
        assert_eq!(init_paths(&args(&["testing", "stats"])).unwrap().len(), 2);
    }

    #[test]
    fn condition_words_are_joined() {
        let opt = Opt::from_iter_safe(args(&[
            "testing", "run", "-f", "a.csv", "-f", "b.csv", "차변금액", ">", "100", "--expand",
        ]))
        .unwrap();
        match opt.cmd {
            Command::Run(run) => {
                assert_eq!(run.condition(), Some("차변금액 > 100".to_string()));
                assert_eq!(run.common.input_files.len(), 2);
                assert_eq!(run.common.entry_column, DEFAULT_ENTRY_COLUMN);
                assert!(run.expand);
                assert!(!run.unique);
                assert_eq!(run.limit, 50000);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_files_are_reported() {
        assert!(run_app(args(&["testing", "stats", "--args-only"])).is_err());
        assert!(run_app(args(&[
            "testing",
            "stats",
            "--args-only",
            "-f",
            "this_file_does_not_exist.csv"
        ]))
        .is_err());
    }
}
