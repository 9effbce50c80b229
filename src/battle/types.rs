//! Raw wire shapes for battle records as returned by the battles endpoint.
//! Field names are normative; everything optional is `#[serde(default)]` so
//! that partially populated action records deserialize without loss.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Indices into a unit's `state.stats` array.
pub const STAT_ATTACK: usize = 0;
pub const STAT_RANGED: usize = 1;
pub const STAT_MAGIC: usize = 2;
pub const STAT_ARMOR: usize = 3;
pub const STAT_HEALTH: usize = 4;
pub const STAT_SPEED: usize = 5;

/// Top-level battle record. `details` is a JSON-encoded string decoded into
/// [`BattleDetails`] by the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleRecord {
    pub battle_queue_id_1: String,
    pub battle_queue_id_2: String,
    pub player_1: String,
    pub player_2: String,
    pub details: String,
    pub match_type: String,
    #[serde(default)]
    pub format: Option<String>,
    /// Comma-separated inactive element colors.
    #[serde(default)]
    pub inactive: String,
    /// Pipe-separated ruleset names.
    #[serde(default)]
    pub ruleset: String,
    pub mana_cap: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament: Option<TournamentInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentInfo {
    #[serde(default)]
    pub sub_format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleDetails {
    pub winner: String,
    pub team1: RawTeam,
    pub team2: RawTeam,
    #[serde(default)]
    pub pre_battle: Vec<RawAction>,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTeam {
    pub summoner: RawUnit,
    #[serde(default)]
    pub monsters: Vec<RawUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUnit {
    pub card_detail_id: u32,
    pub level: u32,
    pub uid: String,
    #[serde(default)]
    pub state: UnitState,
}

/// Stat snapshot carried by roster units and by resolved actions.
/// `stats` order is attack, ranged, magic, armor, health, speed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitState {
    #[serde(default)]
    pub stats: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<String>,
    /// Heterogeneous `[tag, payload]` pairs, e.g. `["Trained", {...}]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<Value>,
}

impl UnitState {
    pub fn stat(&self, index: usize) -> i64 {
        self.stats.get(index).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub num: i32,
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

/// One event in the combat timeline. Which optional fields are present
/// determines the action's shape; see [`crate::battle::log::classify`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ActionDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_state: Option<Vec<GroupStateEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_chance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_val: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<UnitState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stat deltas for summoner-wide buffs, signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<BTreeMap<String, i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<String>,
}

/// Per-unit sub-record of a fan-out action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStateEntry {
    pub monster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<UnitState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dmg: Option<i64>,
}
