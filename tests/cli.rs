use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn moneytrail(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("moneytrail").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// Writes the demo case into a fresh temp dir and returns (home, data dir).
fn demo_case() -> (tempfile::TempDir, String) {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("case").to_string_lossy().to_string();
    moneytrail(home.path())
        .args(["demo", "--output", &data])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    (home, data)
}

#[test]
fn demo_writes_both_files() {
    let (_home, data) = demo_case();
    assert!(Path::new(&data).join("transactions.csv").exists());
    assert!(Path::new(&data).join("accounts.csv").exists());
}

#[test]
fn tree_shows_both_directions() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "tree", "ACC-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Harbor Imports LLC"))
        .stdout(predicate::str::contains("sent"))
        .stdout(predicate::str::contains("received"))
        .stdout(predicate::str::contains("Meridian Trading Co"));
}

#[test]
fn tree_json_respects_depth_override() {
    let (home, data) = demo_case();
    let output = moneytrail(home.path())
        .args(["--data", &data, "--json", "tree", "ACC-001", "--max-depth", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["root"]["account"], "ACC-001");
    for branch in tree["root"]["children"].as_array().unwrap() {
        for child in branch["children"].as_array().unwrap() {
            assert_eq!(child["depth"], 1);
            assert!(child["children"].as_array().unwrap().is_empty());
        }
    }
}

#[test]
fn flag_toggle_highlights_tree() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "--flag", "T0001", "tree", "ACC-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[flagged"));
}

#[test]
fn tree_node_limit_is_reported() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "tree", "ACC-001", "--max-nodes", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stopped at 3 nodes"));
}

#[test]
fn tree_json_stays_within_node_limit() {
    let (home, data) = demo_case();
    let output = moneytrail(home.path())
        .args(["--data", &data, "--json", "tree", "ACC-001", "--max-nodes", "10"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    fn count(node: &serde_json::Value) -> usize {
        1 + node["children"].as_array().unwrap().iter().map(count).sum::<usize>()
    }
    assert!(count(&tree["root"]) <= 10);
    assert_eq!(tree["truncated"], true);
}

#[test]
fn tree_warns_about_unknown_accounts() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "tree", "ACC-001"])
        .assert()
        .success()
        .stderr(predicate::str::contains("account EXT-77 is not in the account directory"));
}

#[test]
fn summary_warns_about_store_notices() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "summary"])
        .assert()
        .success()
        .stderr(predicate::str::contains("EXT-77 is not in the account directory"))
        .stderr(predicate::str::contains("has an unparsable date"));
}

#[test]
fn unknown_flag_target_fails() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "--flag", "NOPE", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn flow_prints_bands_and_balances() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "flow", "--from", "2024-03-01", "--to", "2024-03-07"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Flows"))
        .stdout(predicate::str::contains("Balances"));
}

#[test]
fn flow_account_history() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "flow", "--account-history", "ACC-900"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Balance history: Offshore Vault Ltd"));
}

#[test]
fn flow_rejects_bad_date() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "flow", "--from", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--from expects a date"));
}

#[test]
fn list_with_impossible_range_reports_empty_result() {
    let (home, data) = demo_case();
    moneytrail(home.path())
        .args(["--data", &data, "--min-amount", "1000000000", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no transactions match"));
}

#[test]
fn summary_json_reports_notices() {
    let (home, data) = demo_case();
    let output = moneytrail(home.path())
        .args(["--data", &data, "--json", "summary"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["flagged"], 1);
    let kinds: Vec<&str> = summary["notices"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"malformed_date"));
    assert!(kinds.contains(&"unknown_account"));
}

#[test]
fn missing_data_dir_fails() {
    let home = tempfile::tempdir().unwrap();
    moneytrail(home.path())
        .args(["--data", "/nonexistent/moneytrail-case", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn config_rejects_zero_fan_out() {
    let home = tempfile::tempdir().unwrap();
    moneytrail(home.path())
        .args(["config", "--max-children", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_children_per_node"));
    assert!(!home.path().join(".config/moneytrail/settings.json").exists());
}

#[test]
fn config_persists_updates() {
    let home = tempfile::tempdir().unwrap();
    moneytrail(home.path())
        .args(["config", "--max-depth", "3", "--tie-break", "transaction-count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));
    let saved = std::fs::read_to_string(home.path().join(".config/moneytrail/settings.json")).unwrap();
    assert!(saved.contains("\"max_depth\": 3"));
    assert!(saved.contains("transaction_count"));
}
