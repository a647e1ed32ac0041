//! Interactive session
//!
//! The files are loaded once; every line is then a subcommand run against them.
use rustyline::error::ReadlineError;
use rustyline::Editor;
use structopt::clap::ErrorKind;
use structopt::StructOpt;

use crate::app::{self, CommonOpts, Opt};
use crate::store::{MemoryStore, TabularStore};
use crate::Error;

const PROMPT: &str = ">> ";

const HELP: &str = "Commands run against the loaded files, -f is not needed:
    run [CONDITION] [--expand] [--unique] [--limit N] [--output FILE] [--totals]
    columns
    values COLUMN [--limit N]
    stats
    aggregate [--group-by COLUMN]... --agg COLUMN:FUNC[,FUNC]... [--where CONDITION] [--having CONDITION]
    help
    exit | quit
Entry and pattern columns default to the ones the session was started with.";

pub fn execute(options: &CommonOpts) -> Result<(), Error> {
    let store = app::load(options)?;
    println!(
        "{} rows with {} columns loaded. Type help for the commands.",
        store.table().len(),
        store.schema().len()
    );
    let mut rl = Editor::<()>::new();
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                rl.add_history_entry(line.as_str());
                match execute_line(&line, options, &store) {
                    Ok(true) => (),
                    Ok(false) => break,
                    Err(err) => eprintln!("{}", err),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Runs one line of the session. `Ok(false)` ends it.
pub(crate) fn execute_line(line: &str, options: &CommonOpts, store: &MemoryStore) -> Result<bool, Error> {
    let words = shlex::split(line).ok_or_else(|| Error::from("Unbalanced quotes"))?;
    match words.first().map(String::as_str) {
        None => return Ok(true),
        Some("exit") | Some("quit") => return Ok(false),
        Some("help") => {
            println!("{}", HELP);
            return Ok(true);
        }
        Some(_) => (),
    }

    let mut args = vec!["jereduce".to_string()];
    args.extend(words);
    let inherited = [
        ("--entry-column", options.entry_column.as_str()),
        ("--hash-column", options.hash_column.as_str()),
    ];
    for (flag, value) in inherited.iter() {
        if !args.iter().any(|x| x == flag) {
            args.push(flag.to_string());
            args.push(value.to_string());
        }
    }

    let opt = match Opt::from_iter_safe(args.iter()) {
        Ok(opt) => opt,
        Err(e) if e.kind == ErrorKind::HelpDisplayed => {
            println!("{}", e.message);
            return Ok(true);
        }
        Err(e) => return Err(Error::from(e.message.as_str())),
    };
    app::execute(opt.cmd, Some(store))?;
    Ok(true)
}
