//! Binary dispatch tests for the offline subcommands.

use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_fraywatch")
}

#[test]
fn missing_command_prints_usage_and_exits_two() {
    let output = Command::new(bin()).output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: fraywatch <battle|guild|brawl|chests|serve>"));
}

#[test]
fn unknown_command_exits_two() {
    let output = Command::new(bin()).arg("frobnicate").output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn battle_without_bqid_prints_usage() {
    let output = Command::new(bin()).arg("battle").output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: fraywatch battle"));
}

#[test]
fn brawl_requires_both_ids() {
    let output =
        Command::new(bin()).args(["brawl", "g-1"]).output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: fraywatch brawl <guild_id> <brawl_id>"));
}

#[test]
fn chests_command_emits_expected_value_json() {
    let output = Command::new(bin())
        .args(["chests", "minor", "1"])
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("chests should emit json");
    assert_eq!(payload["tier"], "minor");
    assert_eq!(payload["batch"], 1);
    assert_eq!(payload["cost"], 200.0);
    assert!(payload["average_draw"]["merits"].as_f64().is_some());
}

#[test]
fn chests_batch_scales_the_cost() {
    let output = Command::new(bin())
        .args(["chests", "ultimate", "2"])
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout))
            .expect("chests should emit json");
    assert_eq!(payload["cost"], 6750.0);
}

#[test]
fn chests_rejects_unknown_tiers() {
    let output = Command::new(bin())
        .args(["chests", "mythic"])
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: fraywatch chests"));
}
