//! Battle envelope: metadata, teams, unit name resolution, and the entry
//! points for log reconstruction and team stat summaries.

pub mod log;
pub mod rows;
pub mod stats;
pub mod tracker;
pub mod types;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

pub use self::log::{classify, ActionShape, BattleLog, LogError, LogReconstructor};
pub use rows::{Cell, RenderMode};
pub use stats::TeamStats;
pub use tracker::{CombatTracker, UnitTally};
pub use types::{
    ActionDetails, BattleDetails, BattleRecord, GroupStateEntry, RawAction, RawTeam, RawUnit,
    RoundRecord, UnitState, STAT_ARMOR, STAT_ATTACK, STAT_HEALTH, STAT_MAGIC, STAT_RANGED,
    STAT_SPEED,
};

use crate::cards::CardCatalog;

/// The fixed element wheel; a battle's active elements are this set minus
/// the record's inactive list.
pub const ALL_ELEMENTS: [&str; 6] = ["Red", "Blue", "Green", "White", "Black", "Gold"];

/// Public battle replay link prefix.
pub const BATTLE_LINK_URL: &str = "https://splinterlands.com/?p=battle&id=";

/// Unit id to display name, for every unit on both teams.
pub type NameMap = BTreeMap<String, String>;

/// First team plays blue, second team plays red.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamColor {
    Blue,
    Red,
}

impl TeamColor {
    pub const fn label(self) -> &'static str {
        match self {
            TeamColor::Blue => "blue",
            TeamColor::Red => "red",
        }
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            TeamColor::Blue => " (blue)",
            TeamColor::Red => " (red)",
        }
    }

    pub fn from_label(label: &str) -> Option<TeamColor> {
        match label.to_lowercase().as_str() {
            "blue" => Some(TeamColor::Blue),
            "red" => Some(TeamColor::Red),
            _ => None,
        }
    }
}

/// One combatant with its identity fixed for the whole battle.
#[derive(Debug, Clone)]
pub struct Unit {
    pub uid: String,
    pub card_id: u32,
    pub level: u32,
    pub stats: Vec<i64>,
    pub abilities: Vec<String>,
}

impl Unit {
    fn from_raw(raw: &RawUnit) -> Unit {
        Unit {
            uid: raw.uid.clone(),
            card_id: raw.card_detail_id,
            level: raw.level,
            stats: raw.state.stats.clone(),
            abilities: raw.state.abilities.clone(),
        }
    }

    pub fn stat(&self, index: usize) -> i64 {
        self.stats.get(index).copied().unwrap_or(0)
    }
}

/// One summoner plus its monsters, in play order.
#[derive(Debug, Clone)]
pub struct Team {
    pub color: TeamColor,
    pub summoner: Unit,
    pub monsters: Vec<Unit>,
}

impl Team {
    pub fn from_raw(raw: &RawTeam, color: TeamColor) -> Team {
        Team {
            color,
            summoner: Unit::from_raw(&raw.summoner),
            monsters: raw.monsters.iter().map(Unit::from_raw).collect(),
        }
    }

    /// Summoner first, then monsters in play order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        std::iter::once(&self.summoner).chain(self.monsters.iter())
    }

    pub fn unit_count(&self) -> usize {
        1 + self.monsters.len()
    }

    pub fn contains_uid(&self, uid: &str) -> bool {
        self.units().any(|u| u.uid == uid)
    }
}

/// A card id referenced by a team is missing from the supplied catalog.
/// Always an externally supplied dependency error, never a core defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLookupError {
    pub card_id: u32,
}

impl fmt::Display for CardLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card id {} missing from catalog", self.card_id)
    }
}

impl std::error::Error for CardLookupError {}

/// Map every unit on both teams to `"<card name> (blue|red)"`.
/// The color suffix keeps names globally unique even when both players run
/// the same card.
pub fn build_name_map(
    team1: &Team,
    team2: &Team,
    catalog: &CardCatalog,
) -> Result<NameMap, CardLookupError> {
    let mut names = NameMap::new();
    for team in [team1, team2] {
        for unit in team.units() {
            let card_name = catalog
                .name_of(unit.card_id)
                .ok_or(CardLookupError { card_id: unit.card_id })?;
            names.insert(unit.uid.clone(), format!("{card_name}{}", team.color.suffix()));
        }
    }
    Ok(names)
}

/// Fully parsed battle: metadata, both teams, the action timeline and the
/// unified name map.
#[derive(Debug, Clone)]
pub struct Battle {
    pub battle_queue_id: String,
    pub battle_queue_id_2: String,
    pub player_1: String,
    pub player_2: String,
    pub match_type: String,
    pub format: String,
    pub active: Vec<String>,
    pub inactive: Vec<String>,
    pub ruleset: Vec<String>,
    pub mana_cap: u32,
    pub winner: String,
    pub team1: Team,
    pub team2: Team,
    pub pre_battle: Vec<RawAction>,
    pub rounds: Vec<RoundRecord>,
    names: NameMap,
}

#[derive(Debug)]
pub enum BattleParseError {
    /// The `details` string did not decode into a battle details record.
    Details(serde_json::Error),
    CardLookup(CardLookupError),
}

impl fmt::Display for BattleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Details(err) => write!(f, "battle details did not decode: {err}"),
            Self::CardLookup(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BattleParseError {}

impl Battle {
    pub fn from_record(
        record: &BattleRecord,
        catalog: &CardCatalog,
    ) -> Result<Battle, BattleParseError> {
        let details: BattleDetails =
            serde_json::from_str(&record.details).map_err(BattleParseError::Details)?;

        let mut format = record.format.clone().unwrap_or_else(|| "Wild".to_string());
        if record
            .tournament
            .as_ref()
            .and_then(|t| t.sub_format.as_deref())
            == Some("brawl")
        {
            format = "Brawl".to_string();
        }

        let inactive: Vec<String> = record
            .inactive
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let active = ALL_ELEMENTS
            .iter()
            .filter(|c| !inactive.iter().any(|i| i == *c))
            .map(|c| c.to_string())
            .collect();
        let ruleset = record
            .ruleset
            .split('|')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let team1 = Team::from_raw(&details.team1, TeamColor::Blue);
        let team2 = Team::from_raw(&details.team2, TeamColor::Red);
        let names =
            build_name_map(&team1, &team2, catalog).map_err(BattleParseError::CardLookup)?;

        Ok(Battle {
            battle_queue_id: record.battle_queue_id_1.clone(),
            battle_queue_id_2: record.battle_queue_id_2.clone(),
            player_1: record.player_1.clone(),
            player_2: record.player_2.clone(),
            match_type: record.match_type.clone(),
            format,
            active,
            inactive,
            ruleset,
            mana_cap: record.mana_cap,
            winner: details.winner.clone(),
            team1,
            team2,
            pre_battle: details.pre_battle,
            rounds: details.rounds,
            names,
        })
    }

    pub fn names(&self) -> &NameMap {
        &self.names
    }

    pub fn url(&self) -> String {
        format!("{BATTLE_LINK_URL}{}", self.battle_queue_id)
    }

    pub fn team(&self, color: TeamColor) -> &Team {
        match color {
            TeamColor::Blue => &self.team1,
            TeamColor::Red => &self.team2,
        }
    }

    /// Reconstruct the full combat log and per-unit tracker.
    pub fn log(&self, mode: RenderMode) -> Result<BattleLog, LogError> {
        LogReconstructor::new(self, mode).reconstruct()
    }

    /// Aggregate stats and advisory text for one team.
    pub fn team_summary(&self, color: TeamColor) -> String {
        stats::render_summary(self.team(color), &self.pre_battle)
    }

    pub fn markdown_summary(&self) -> String {
        let mut out = format!(
            "[{} vs. {}]({})||\n-|-\n",
            self.player_1,
            self.player_2,
            self.url()
        );
        out.push_str(&format!("Type | {}\n", self.match_type));
        out.push_str(&format!("Format | {}\n", capitalize(&self.format)));
        out.push_str(&format!("Mana | {}\n", self.mana_cap));
        out.push_str(&format!("Elements | {}\n", self.active.join(", ")));
        out.push_str(&format!("Rules | {}\n", self.ruleset.join(", ")));
        out.push_str(&format!("Winner | {}\n", self.winner));
        out
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// A battle either parsed fully or reduced to an error message. Every
/// rendering entry point on an invalid envelope returns the stored message
/// verbatim.
#[derive(Debug, Clone)]
pub enum BattleEnvelope {
    Valid(Box<Battle>),
    Invalid { message: String },
}

impl BattleEnvelope {
    pub fn invalid(message: impl Into<String>) -> BattleEnvelope {
        BattleEnvelope::Invalid { message: message.into() }
    }

    /// Build from a fetched payload. `None` and string payloads become
    /// invalid envelopes, as do records that fail to decode; a missing card
    /// id is propagated since the catalog is an external dependency.
    pub fn from_value(
        bqid: &str,
        data: Option<Value>,
        catalog: &CardCatalog,
    ) -> Result<BattleEnvelope, CardLookupError> {
        let value = match data {
            None => {
                return Ok(BattleEnvelope::invalid(format!(
                    "Could not fetch battle data for id: {bqid}"
                )))
            }
            Some(Value::String(message)) => return Ok(BattleEnvelope::invalid(message)),
            Some(value) => value,
        };

        let record: BattleRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(err) => {
                return Ok(BattleEnvelope::invalid(format!(
                    "Malformed battle record for id {bqid}: {err}"
                )))
            }
        };

        match Battle::from_record(&record, catalog) {
            Ok(battle) => Ok(BattleEnvelope::Valid(Box::new(battle))),
            Err(BattleParseError::Details(err)) => Ok(BattleEnvelope::invalid(format!(
                "Malformed battle details for id {bqid}: {err}"
            ))),
            Err(BattleParseError::CardLookup(err)) => Err(err),
        }
    }

    pub fn battle(&self) -> Option<&Battle> {
        match self {
            BattleEnvelope::Valid(battle) => Some(battle),
            BattleEnvelope::Invalid { .. } => None,
        }
    }

    pub fn markdown_summary(&self) -> String {
        match self {
            BattleEnvelope::Valid(battle) => battle.markdown_summary(),
            BattleEnvelope::Invalid { message } => message.clone(),
        }
    }

    pub fn log_text(&self, mode: RenderMode) -> Result<String, LogError> {
        match self {
            BattleEnvelope::Valid(battle) => battle.log(mode).map(|log| log.text),
            BattleEnvelope::Invalid { message } => Ok(message.clone()),
        }
    }
}
