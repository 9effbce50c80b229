//! Envelope parsing tests: metadata derivation, name resolution, invalid
//! envelopes, and the on-disk record fixture.

mod common;

use std::collections::BTreeSet;
use std::path::Path;

use common::{battle_from, battle_record_value, catalog, initial_rows};
use fraywatch::battle::{Battle, BattleEnvelope, BattleRecord, RenderMode, TeamColor};
use fraywatch::cards::CardCatalog;
use serde_json::json;

fn envelope_from(value: serde_json::Value) -> BattleEnvelope {
    BattleEnvelope::from_value("bq-1", Some(value), &catalog()).expect("catalog covers fixture")
}

#[test]
fn null_format_defaults_to_wild() {
    let envelope = envelope_from(battle_record_value(json!([]), json!([])));
    assert!(envelope.markdown_summary().contains("Format | Wild\n"));
}

#[test]
fn brawl_sub_format_overrides_the_raw_format() {
    let mut record = battle_record_value(json!([]), json!([]));
    record["format"] = json!("modern");
    record["tournament"] = json!({"sub_format": "brawl"});
    let envelope = envelope_from(record);
    assert!(envelope.markdown_summary().contains("Format | Brawl\n"));
}

#[test]
fn present_format_is_capitalized() {
    let mut record = battle_record_value(json!([]), json!([]));
    record["format"] = json!("modern");
    let envelope = envelope_from(record);
    assert!(envelope.markdown_summary().contains("Format | Modern\n"));
}

#[test]
fn active_elements_are_the_complement_of_the_inactive_list() {
    let record: BattleRecord =
        serde_json::from_value(battle_record_value(json!([]), json!([]))).expect("record");
    let battle = Battle::from_record(&record, &catalog()).expect("battle");
    assert_eq!(battle.inactive, vec!["Gold", "Black"]);
    assert_eq!(battle.active, vec!["Red", "Blue", "Green", "White"]);
    assert!(battle.markdown_summary().contains("Elements | Red, Blue, Green, White\n"));
}

#[test]
fn missing_data_produces_an_invalid_envelope() {
    let envelope =
        BattleEnvelope::from_value("bq-404", None, &catalog()).expect("no lookup needed");
    let message = "Could not fetch battle data for id: bq-404";
    assert_eq!(envelope.markdown_summary(), message);
    assert_eq!(envelope.log_text(RenderMode::Fixed).expect("short-circuit"), message);
    assert_eq!(envelope.log_text(RenderMode::Markdown).expect("short-circuit"), message);
    assert!(envelope.battle().is_none());
}

#[test]
fn string_payload_is_stored_verbatim() {
    let envelope =
        BattleEnvelope::from_value("bq-1", Some(json!("battle purged")), &catalog())
            .expect("no lookup needed");
    assert_eq!(envelope.markdown_summary(), "battle purged");
}

#[test]
fn malformed_record_becomes_an_invalid_envelope() {
    let envelope = BattleEnvelope::from_value("bq-1", Some(json!({"nope": 1})), &catalog())
        .expect("no lookup needed");
    assert!(envelope.battle().is_none());
    assert!(envelope.markdown_summary().contains("bq-1"));
}

#[test]
fn missing_card_id_propagates_as_a_lookup_error() {
    let tiny_catalog = CardCatalog::from_cards(vec![common::card(27, "Flame Summoner")]);
    let err = BattleEnvelope::from_value(
        "bq-1",
        Some(battle_record_value(json!([]), json!([]))),
        &tiny_catalog,
    )
    .expect_err("monster cards are missing from the catalog");
    assert_eq!(err.card_id, 100);
}

#[test]
fn name_map_covers_every_unit_with_distinct_names() {
    let battle = battle_from(json!([]), json!([]));
    let names = battle.names();
    assert_eq!(names.len(), battle.team1.unit_count() + battle.team2.unit_count());
    let distinct: BTreeSet<&String> = names.values().collect();
    assert_eq!(distinct.len(), names.len());
    assert_eq!(names.get("M1").map(String::as_str), Some("Goblin Brute (blue)"));
    assert_eq!(names.get("E1").map(String::as_str), Some("Sea Serpent (red)"));
}

#[test]
fn duplicate_base_names_stay_unique_across_teams() {
    let mut record = battle_record_value(json!([]), json!([]));
    // Give red the same card blue already runs.
    let mut details: serde_json::Value =
        serde_json::from_str(record["details"].as_str().expect("details string"))
            .expect("details");
    details["team2"]["monsters"][0]["card_detail_id"] = json!(100);
    record["details"] = json!(details.to_string());

    let parsed: BattleRecord = serde_json::from_value(record).expect("record");
    let battle = Battle::from_record(&parsed, &catalog()).expect("battle");
    let names = battle.names();
    assert_eq!(names.get("M1").map(String::as_str), Some("Goblin Brute (blue)"));
    assert_eq!(names.get("E1").map(String::as_str), Some("Goblin Brute (red)"));
    let distinct: BTreeSet<&String> = names.values().collect();
    assert_eq!(distinct.len(), names.len());
}

#[test]
fn summary_lists_players_rules_and_winner() {
    let battle = battle_from(json!([]), json!([]));
    let summary = battle.markdown_summary();
    assert!(summary.starts_with("[alice vs. bob]("));
    assert!(summary.contains("Type | Ranked\n"));
    assert!(summary.contains("Mana | 24\n"));
    assert!(summary.contains("Rules | Standard\n"));
    assert!(summary.contains("Winner | alice\n"));
}

#[test]
fn sample_battle_fixture_reconstructs_end_to_end() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("battles")
        .join("sample_battle.json");
    let raw = std::fs::read_to_string(&path).expect("read fixture");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("fixture json");

    let envelope = BattleEnvelope::from_value("bq-fixture-1", Some(value), &catalog())
        .expect("catalog covers fixture");
    let battle = envelope.battle().expect("fixture battle is valid");
    assert_eq!(battle.format, "Wild");
    assert_eq!(battle.ruleset, vec!["Standard", "Silenced Summoners"]);

    let log = battle.log(RenderMode::Fixed).expect("log");
    // 2 pre-battle actions + 3 actions in round 1 + 2 in round 2.
    assert_eq!(initial_rows(&log.text).len(), 7);

    let tally = |uid: &str| *log.tracker.tally(uid).expect("tracked");
    assert_eq!(tally("M1").damage_done, 3);
    assert_eq!(tally("E1").damage_taken, 3);
    assert_eq!(tally("E1").damage_done, 4);
    assert_eq!(tally("E1").units_killed, 1);
    assert_eq!(tally("M2").damage_taken, 4);
    assert_eq!(tally("E2").healing_done, 2);

    let tracker_table = log.tracker.markdown_table(battle.team(TeamColor::Red), battle.names());
    assert!(tracker_table.contains("Sea Serpent (red) | 4 | 3 | 0 | 0 | 1"));
}
