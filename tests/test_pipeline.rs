use std::collections::{HashMap, HashSet};

use jereduce::pipeline::representatives;
use jereduce::{
    deduplicate, expand, filter, run, ColumnRole, MemoryStore, Pipeline, PipelineError, Table,
};
mod common;
use common::{ledger, seqs};

const ENTRY: &str = "전표번호";
const HASH: &str = "거래유형그룹_해시값";

fn pipeline(condition: &str, expand: bool, dedup: bool) -> Pipeline {
    Pipeline {
        condition: Some(condition.to_string()),
        expand,
        entry_id_column: Some(ENTRY.to_string()),
        dedup,
        hash_column: Some(HASH.to_string()),
    }
}

#[test]
fn one_entry_per_pattern() {
    let table = Table::from_str_rows(
        &["id", "hash"],
        &[&["1", "x"], &["1", "x"], &["2", "x"], &["3", "y"]],
    );
    let reduced = deduplicate(&table, Some("id"), Some("hash"), true).unwrap();
    let ids: Vec<&str> = reduced.rows().iter().filter_map(|r| r.get(0)).collect();
    assert_eq!(ids, vec!["1", "1", "3"]);
}

#[test]
fn filter_by_amount() {
    let table = Table::from_str_rows(&["amount"], &[&["50"], &["150"], &["200"]]);
    let filtered = filter(&table, Some("amount > 100")).unwrap();
    assert_eq!(seqs(&filtered), vec![1, 2]);
}

#[test]
fn expansion_brings_the_whole_entry() {
    let table = Table::from_str_rows(
        &["je_id", "amount"],
        &[&["7", "10"], &["8", "10"], &["7", "-4"], &["7", "-6"]],
    );
    let subset = filter(&table, Some("amount = -4")).unwrap();
    assert_eq!(subset.len(), 1);
    let expanded = expand(&table, &subset, Some("je_id"), true).unwrap();
    assert_eq!(seqs(&expanded), vec![0, 2, 3]);
}

#[test]
fn unknown_columns_in_conditions() {
    match filter(&ledger(), Some("foo > 1")) {
        Err(PipelineError::InvalidCondition { condition, reason }) => {
            assert_eq!(condition, "foo > 1");
            assert!(reason.contains("foo"), "{}", reason);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn empty_results_propagate() {
    let table = ledger();
    let subset = filter(&table, Some("차변금액 > 999999999")).unwrap();
    assert!(subset.is_empty());
    let expanded = expand(&table, &subset, Some(ENTRY), true).unwrap();
    assert!(expanded.is_empty());
    let reduced = deduplicate(&expanded, Some(ENTRY), Some(HASH), true).unwrap();
    assert!(reduced.is_empty());
    assert_eq!(reduced.columns(), table.columns());

    let reduction = pipeline("차변금액 > 999999999", true, true)
        .reduce(&table)
        .unwrap();
    assert_eq!(reduction.filtered_rows, 0);
    assert!(reduction.table.is_empty());
}

#[test]
fn payroll_entries_reduce_to_the_first() {
    let table = ledger();
    let reduction = pipeline("차변금액 > 1000000", true, true)
        .reduce(&table)
        .unwrap();
    assert_eq!(reduction.filtered_rows, 2);
    assert_eq!(reduction.expanded_rows, 6);
    assert_eq!(seqs(&reduction.table), vec![4, 5, 6]);

    let store = MemoryStore::new(table.clone());
    let stored = pipeline("차변금액 > 1000000", true, true)
        .reduce_store(&store)
        .unwrap();
    assert_eq!(stored, reduction);
}

#[test]
fn cash_lines_without_expansion() {
    let table = ledger();
    let result = run(
        &table,
        Some("계정코드 = 10100"),
        false,
        Some(ENTRY),
        true,
        Some(HASH),
    )
    .unwrap();
    // JE001 and JE003 represent their patterns; lines without a hash stay
    assert_eq!(seqs(&result), vec![0, 6, 11, 13]);

    let expanded = run(
        &table,
        Some("계정코드 = 10100"),
        true,
        Some(ENTRY),
        true,
        Some(HASH),
    )
    .unwrap();
    assert_eq!(seqs(&expanded), vec![0, 1, 4, 5, 6, 10, 11, 12, 13]);
}

#[test]
fn expansion_is_a_superset() {
    let table = ledger();
    for condition in &[
        "차변금액 > 0",
        "계정코드 IN (21100, 53100)",
        "적요 LIKE '%급여%'",
        "회계월 = '2025-02'",
    ] {
        let subset = filter(&table, Some(condition)).unwrap();
        let expanded = expand(&table, &subset, Some(ENTRY), true).unwrap();
        let kept: HashSet<usize> = seqs(&expanded).into_iter().collect();
        for row in subset.rows() {
            if row.get(1).is_some() {
                assert!(kept.contains(&row.seq), "{} lost line {}", condition, row.seq);
            }
        }
    }
}

#[test]
fn lines_without_hash_pass_through() {
    let table = ledger();
    let reduced = deduplicate(&table, Some(ENTRY), Some(HASH), true).unwrap();
    let kept: HashSet<usize> = seqs(&reduced).into_iter().collect();
    let hash = table.column_index(HASH).unwrap();
    for row in table.rows() {
        if row.get(hash).is_none() {
            assert!(kept.contains(&row.seq));
        }
    }
}

#[test]
fn one_entry_survives_per_hash() {
    let table = ledger();
    let reduced = deduplicate(&table, Some(ENTRY), Some(HASH), true).unwrap();
    let entry = table.column_index(ENTRY).unwrap();
    let hash = table.column_index(HASH).unwrap();
    let mut entries: HashMap<&str, HashSet<Option<&str>>> = HashMap::new();
    for row in reduced.rows() {
        if let Some(h) = row.get(hash) {
            entries.entry(h).or_default().insert(row.get(entry));
        }
    }
    assert_eq!(entries.len(), 3);
    for (h, ids) in entries.iter() {
        assert_eq!(ids.len(), 1, "{} kept {:?}", h, ids);
    }

    let reps = representatives(&table, Some(ENTRY), Some(HASH)).unwrap();
    let ids: Vec<Option<&str>> = reps.iter().map(|r| r.entry_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("JE001"), Some("JE003"), Some("JE005")]);
}

#[test]
fn first_seen_does_not_depend_on_row_order() {
    let table = ledger();
    let mut rows = table.clone().into_rows();
    rows.reverse();
    let reversed = Table::from_rows(table.columns().to_vec(), rows);

    let forward = deduplicate(&table, Some(ENTRY), Some(HASH), true).unwrap();
    let backward = deduplicate(&reversed, Some(ENTRY), Some(HASH), true).unwrap();
    let mut backward_seqs = seqs(&backward);
    backward_seqs.sort_unstable();
    assert_eq!(seqs(&forward), backward_seqs);
    assert_eq!(deduplicate(&table, Some(ENTRY), Some(HASH), true).unwrap(), forward);
}

#[test]
fn disabled_stages_are_identities() {
    let table = ledger();
    let subset = filter(&table, Some("차변금액 > 100000")).unwrap();
    assert_eq!(expand(&table, &subset, None, false).unwrap(), subset);
    assert_eq!(deduplicate(&subset, None, None, false).unwrap(), subset);
    let reduction = pipeline("차변금액 > 100000", false, false)
        .reduce(&table)
        .unwrap();
    assert_eq!(reduction.table, subset);
}

#[test]
fn columns_are_checked_before_anything_runs() {
    let table = ledger();
    let mut missing_hash = pipeline("차변금액 > 999999999", true, true);
    missing_hash.hash_column = Some("hash".to_string());
    assert_eq!(
        missing_hash.reduce(&table),
        Err(PipelineError::MissingColumnSelection {
            role: ColumnRole::PatternHash,
            column: Some("hash".to_string()),
        })
    );

    let mut no_entry = pipeline("", true, false);
    no_entry.entry_id_column = None;
    assert_eq!(
        no_entry.reduce(&table),
        Err(PipelineError::MissingColumnSelection {
            role: ColumnRole::EntryId,
            column: None,
        })
    );
}
