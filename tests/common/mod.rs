//! Shared builders for battle fixtures used across the integration tests.

#![allow(dead_code)]

use fraywatch::battle::{Battle, BattleRecord};
use fraywatch::cards::{Card, CardCatalog};
use serde_json::{json, Value};

pub fn card(id: u32, name: &str) -> Card {
    Card {
        id,
        name: name.to_string(),
        editions: "7".to_string(),
        tier: None,
    }
}

/// Catalog covering every card id the fixture teams reference.
pub fn catalog() -> CardCatalog {
    CardCatalog::from_cards(vec![
        card(27, "Flame Summoner"),
        card(100, "Goblin Brute"),
        card(101, "Fire Imp"),
        card(102, "Lava Golem"),
        card(200, "Tide Summoner"),
        card(201, "Sea Serpent"),
        card(202, "Mermaid Healer"),
    ])
}

pub fn unit(uid: &str, card_id: u32, stats: [i64; 6], abilities: &[&str]) -> Value {
    json!({
        "card_detail_id": card_id,
        "level": 1,
        "uid": uid,
        "state": {"stats": stats.to_vec(), "abilities": abilities}
    })
}

/// Two fixed teams: blue runs S1 + M1/M2/M3, red runs S2 + E1/E2.
pub fn teams() -> (Value, Value) {
    let team1 = json!({
        "summoner": unit("S1", 27, [0, 0, 0, 0, 0, 0], &[]),
        "monsters": [
            unit("M1", 100, [2, 0, 0, 1, 5, 3], &[]),
            unit("M2", 101, [1, 0, 0, 0, 4, 2], &[]),
            unit("M3", 102, [0, 0, 2, 2, 6, 1], &[]),
        ]
    });
    let team2 = json!({
        "summoner": unit("S2", 200, [0, 0, 0, 0, 0, 0], &[]),
        "monsters": [
            unit("E1", 201, [3, 0, 0, 2, 7, 4], &[]),
            unit("E2", 202, [0, 0, 1, 0, 4, 2], &["Tank Heal"]),
        ]
    });
    (team1, team2)
}

pub fn battle_record_value(pre_battle: Value, rounds: Value) -> Value {
    let (team1, team2) = teams();
    let details = json!({
        "winner": "alice",
        "team1": team1,
        "team2": team2,
        "pre_battle": pre_battle,
        "rounds": rounds,
    });
    json!({
        "battle_queue_id_1": "bq-1",
        "battle_queue_id_2": "bq-2",
        "player_1": "alice",
        "player_2": "bob",
        "details": details.to_string(),
        "match_type": "Ranked",
        "format": null,
        "inactive": "Gold,Black",
        "ruleset": "Standard",
        "mana_cap": 24,
    })
}

pub fn battle_from(pre_battle: Value, rounds: Value) -> Battle {
    let record: BattleRecord = serde_json::from_value(battle_record_value(pre_battle, rounds))
        .expect("record fixture should deserialize");
    Battle::from_record(&record, &catalog()).expect("battle fixture should parse")
}

/// Rows that open a logical entry carry a round-position in the first
/// column; continuation rows and headers do not.
pub fn initial_rows(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| {
            let Some(first) = line.split(" | ").next() else {
                return false;
            };
            let first = first.trim();
            first.contains('-')
                && first.chars().next().is_some_and(|c| c.is_ascii_digit())
        })
        .collect()
}
