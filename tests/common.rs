use jereduce::loader::load_csv;
use jereduce::{run_app, Table};

pub const LEDGER: &str = "tests/example_files/ledger.csv";

pub fn test_args(args: &[&str]) {
    let mut function_args: Vec<&str> = vec!["testing"];
    for arg in args {
        function_args.push(arg);
    }
    let res = run_app(function_args.iter().map(|x| x.to_string()).collect());
    assert!(res.is_ok(), "{:?}", res);
}

pub fn test_err(args: &[&str]) {
    let mut function_args: Vec<&str> = vec!["testing"];
    for arg in args {
        function_args.push(arg);
    }
    let res = run_app(function_args.iter().map(|x| x.to_string()).collect());
    assert!(res.is_err());
}

pub fn ledger() -> Table {
    load_csv(LEDGER).unwrap()
}

pub fn seqs(table: &Table) -> Vec<usize> {
    table.rows().iter().map(|r| r.seq).collect()
}
