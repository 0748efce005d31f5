use std::sync::Arc;

use sqlstress::config::{parse_extra_options, OptionValue};
use sqlstress::sink::LogSink;
use sqlstress::worker::WorkerStats;
use sqlstress::workload::{load_replay_file, replay_execution_plan, WorkloadSource};

#[test]
fn replay_file_skips_blank_lines_and_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.sql");
    std::fs::write(&path, "SELECT 1;\n\nSELECT 2;\n").unwrap();

    let statements = load_replay_file(&path).unwrap();
    assert_eq!(
        statements,
        vec!["SELECT 1;".to_string(), "SELECT 2;".to_string()]
    );

    // Order preservation forces one worker with the whole script as quota.
    let (threads, quota) = replay_execution_plan(statements.len(), 8, 1_000, true);
    assert_eq!(threads, 1);
    assert_eq!(quota, 2);
}

#[test]
fn replay_file_keeps_relative_order_with_interleaved_blanks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.sql");
    std::fs::write(&path, "\nA;\n\n\nB;\nC;\n\nD;\n").unwrap();

    let statements = load_replay_file(&path).unwrap();
    assert_eq!(statements, vec!["A;", "B;", "C;", "D;"]);
}

#[test]
fn replay_file_missing_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_replay_file(&dir.path().join("absent.sql")).is_err());
}

#[test]
fn sequential_feed_walks_script_once_in_order() {
    let source = WorkloadSource::Replay {
        statements: Arc::new(vec!["SELECT 1;".to_string(), "SELECT 2;".to_string()]),
        shuffle: false,
        seed: 0,
    };
    let mut feed = source.feed_for_worker(0);
    assert_eq!(feed.next_statement().unwrap().sql, "SELECT 1;");
    assert_eq!(feed.next_statement().unwrap().sql, "SELECT 2;");
    assert!(feed.next_statement().is_none());
}

#[test]
fn shuffled_feed_only_serves_script_statements() {
    let script: Vec<String> = vec![
        "SELECT 1;".to_string(),
        "SELECT 2;".to_string(),
        "SELECT 3;".to_string(),
    ];
    let source = WorkloadSource::Replay {
        statements: Arc::new(script.clone()),
        shuffle: true,
        seed: 7,
    };
    let mut feed = source.feed_for_worker(3);
    for _ in 0..50 {
        let statement = feed.next_statement().unwrap();
        assert!(script.contains(&statement.sql));
        assert!(statement.category.is_none());
    }
}

#[test]
fn aggregate_is_an_exact_sum_over_workers() {
    // T workers x Q quota each: the final aggregate must be exact
    // arithmetic over per-worker counters, never an approximation.
    let mut totals = WorkerStats::default();
    for _ in 0..4 {
        let stats = WorkerStats {
            queries_executed: 250,
            queries_failed: 3,
            per_category: Default::default(),
        };
        totals.merge(&stats);
    }
    assert_eq!(totals.queries_executed, 1_000);
    assert_eq!(totals.queries_failed, 12);
}

#[test]
fn log_sink_writes_banner_then_appended_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node_general.log");

    let sink = LogSink::create(&path).unwrap();
    sink.append("- hello");
    sink.flush();

    let contents = std::fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with("- sqlstress v"));
    assert_eq!(lines.next().unwrap(), "- hello");
}

#[test]
fn log_sink_truncates_a_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node_general.log");
    std::fs::write(&path, "stale contents from an earlier run\n").unwrap();

    let sink = LogSink::create(&path).unwrap();
    sink.flush();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("stale contents"));
}

#[test]
fn log_sink_fails_when_directory_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("node_general.log");
    assert!(LogSink::create(&path).is_err());
}

#[test]
fn extra_options_parse_into_typed_values() {
    let extra = parse_extra_options(&[
        "verbose=true".to_string(),
        "retries=3".to_string(),
        "label=smoke".to_string(),
    ])
    .unwrap();
    assert_eq!(extra.get("verbose"), Some(&OptionValue::Bool(true)));
    assert_eq!(extra.get("retries"), Some(&OptionValue::Int(3)));
    assert_eq!(
        extra.get("label"),
        Some(&OptionValue::Str("smoke".to_string()))
    );
}

#[test]
fn malformed_extra_options_are_rejected() {
    assert!(parse_extra_options(&["malformed".to_string()]).is_err());
    assert!(parse_extra_options(&["=value".to_string()]).is_err());
}
