//! Battle log reconstruction: replays the pre-battle phase and every combat
//! round into a seven-column text log while folding per-unit combat
//! statistics into a [`CombatTracker`].
//!
//! Action records are classified by field presence into a closed set of
//! shapes; rendering is then exhaustive over those shapes. Records that fit
//! no shape produce a diagnostic marker line and are skipped for tracker
//! purposes.

use std::fmt;

use crate::battle::rows::{construct_row, header_row, position_cell, separator, Cell, RenderMode};
use crate::battle::tracker::CombatTracker;
use crate::battle::types::{
    ActionDetails, GroupStateEntry, RawAction, RoundRecord, STAT_HEALTH,
};
use crate::battle::{Battle, Team};

/// Action types whose damage counts toward damage done/taken.
pub const DAMAGE_TYPES: [&str; 7] = [
    "melee attack",
    "ranged attack",
    "magic attack",
    "blast",
    "execute",
    "retaliate",
    "spite",
];

/// Subset credited when the action has no initiator.
pub const BASIC_ATTACK_TYPES: [&str; 3] = ["melee attack", "ranged attack", "magic attack"];

const HEAL_TYPES: [&str; 3] = ["tank heal", "heal", "triage"];
const REPAIR_TYPE: &str = "repair";
const SKIPPED_SUMMONER_ABILITIES: [&str; 2] = ["Resurrect", "Cleanse"];
/// Environmental types that still render a bare row when nothing was hit.
const BARE_ENVIRONMENT_TYPES: [&str; 2] = ["zapped", "corrosive"];
/// `remove_buff` action labels are cut to this length, prefix included.
const REMOVE_LABEL_MAX: usize = 16;

/// Shape of one action record, decided by which fields are present.
/// `target` is checked before `group_state`; `initiator` gates between the
/// target-based and group-based pairs.
#[derive(Debug, Clone, Copy)]
pub enum ActionShape<'a> {
    /// Named ability invocation between two units, no numeric payload.
    Ability {
        initiator: &'a str,
        target: &'a str,
        details: &'a ActionDetails,
    },
    /// Resolved combat/status action between two units.
    Resolved { initiator: &'a str, target: &'a str },
    /// One initiator fanning out to several units.
    Group {
        initiator: &'a str,
        group: &'a [GroupStateEntry],
    },
    /// Environmental fan-out with no named initiator.
    Environment { group: &'a [GroupStateEntry] },
    /// Environmental effect on a single unit.
    TargetOnly { target: &'a str },
    /// No initiator, target or group state: not a supported shape.
    Unhandled,
}

pub fn classify(action: &RawAction) -> ActionShape<'_> {
    if let Some(target) = action.target.as_deref() {
        return match (action.initiator.as_deref(), action.details.as_ref()) {
            (Some(initiator), Some(details)) => ActionShape::Ability { initiator, target, details },
            (Some(initiator), None) => ActionShape::Resolved { initiator, target },
            (None, _) => ActionShape::TargetOnly { target },
        };
    }
    if let Some(group) = action.group_state.as_deref() {
        return match action.initiator.as_deref() {
            Some(initiator) => ActionShape::Group { initiator, group },
            None => ActionShape::Environment { group },
        };
    }
    ActionShape::Unhandled
}

/// A unit id appeared in an action but not in either team's roster: the
/// battle record is internally inconsistent, so reconstruction aborts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    UnknownUnit { uid: String },
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUnit { uid } => {
                write!(f, "unit id '{uid}' does not resolve to any roster unit")
            }
        }
    }
}

impl std::error::Error for LogError {}

/// Reconstructed log text plus the per-unit tracker built alongside it.
#[derive(Debug, Clone)]
pub struct BattleLog {
    pub text: String,
    pub tracker: CombatTracker,
}

/// Single forward pass over (pre-battle, round 1..N); no backward
/// transitions, no retries.
pub struct LogReconstructor<'a> {
    battle: &'a Battle,
    mode: RenderMode,
    text: String,
    tracker: CombatTracker,
    column_header: String,
    round: i32,
    seq: usize,
}

impl<'a> LogReconstructor<'a> {
    pub fn new(battle: &'a Battle, mode: RenderMode) -> LogReconstructor<'a> {
        LogReconstructor {
            battle,
            mode,
            text: String::new(),
            tracker: CombatTracker::for_teams(&battle.team1, &battle.team2),
            column_header: header_row(mode),
            round: 0,
            seq: 0,
        }
    }

    pub fn reconstruct(mut self) -> Result<BattleLog, LogError> {
        let battle = self.battle;
        self.add_battle_header();
        self.add_pre_battle()?;
        for round in &battle.rounds {
            self.text.push('\n');
            self.add_column_header();
            self.add_round(round)?;
        }
        Ok(BattleLog { text: self.text, tracker: self.tracker })
    }

    fn add_battle_header(&mut self) {
        let battle = self.battle;
        let header = format!(
            "### {} vs {}\nBattle {}\nMana: {}\nRules: {}\nActive elements: {}\n",
            battle.player_1,
            battle.player_2,
            battle.url(),
            battle.mana_cap,
            battle.ruleset.join(", "),
            battle.active.join(", "),
        );
        if self.mode == RenderMode::Markdown {
            self.text.push_str(&header.replace('\n', "\n\n"));
        } else {
            self.text.push_str(&header);
        }
        self.add_column_header();
    }

    fn add_column_header(&mut self) {
        if self.mode == RenderMode::Fixed {
            self.text.push_str(&separator());
        }
        self.text.push_str(&self.column_header);
        if self.mode == RenderMode::Fixed {
            self.text.push_str(&separator());
        }
    }

    /// Pre-battle is the synthetic round 0; its sequence numbers are
    /// 1-based, round sequence numbers are 0-based.
    fn add_pre_battle(&mut self) -> Result<(), LogError> {
        let battle = self.battle;
        self.round = 0;
        for (index, action) in battle.pre_battle.iter().enumerate() {
            self.seq = index + 1;
            self.add_action(action)?;
        }
        Ok(())
    }

    fn add_round(&mut self, round: &RoundRecord) -> Result<(), LogError> {
        self.round = round.num;
        for (index, action) in round.actions.iter().enumerate() {
            self.seq = index;
            self.add_action(action)?;
        }
        Ok(())
    }

    fn add_action(&mut self, action: &RawAction) -> Result<(), LogError> {
        match classify(action) {
            ActionShape::Ability { initiator, target, details } => {
                self.action_ability(action, initiator, target, details)
            }
            ActionShape::Resolved { initiator, target } => {
                self.action_resolved(action, initiator, target)
            }
            ActionShape::TargetOnly { target } => self.action_target_only(action, target),
            ActionShape::Group { initiator, group } => {
                self.action_group(action, initiator, group)
            }
            ActionShape::Environment { group } => self.action_environment(action, group),
            ActionShape::Unhandled => {
                self.unhandled(action);
                Ok(())
            }
        }
    }

    fn name(&self, uid: &str) -> Result<String, LogError> {
        self.battle
            .names()
            .get(uid)
            .cloned()
            .ok_or_else(|| LogError::UnknownUnit { uid: uid.to_string() })
    }

    fn push_row(&mut self, cells: &[Cell; 7]) {
        self.text.push_str(&construct_row(cells, self.mode));
    }

    /// Continuation row of a fan-out: only the target (and optionally the
    /// value) column is filled.
    fn push_continuation(&mut self, target: String, value: Option<i64>) {
        let cells = [
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Text(target),
            value.map(Cell::Int).unwrap_or(Cell::Empty),
            Cell::Empty,
            Cell::Empty,
        ];
        self.push_row(&cells);
    }

    fn unhandled(&mut self, action: &RawAction) {
        log::warn!("unhandled action shape: type='{}'", action.action_type);
        let rendered = serde_json::to_string(action)
            .unwrap_or_else(|_| format!("<{}>", action.action_type));
        self.text.push_str(&format!("Unhandled: {rendered}\n"));
    }

    fn action_ability(
        &mut self,
        action: &RawAction,
        initiator: &str,
        target: &str,
        details: &ActionDetails,
    ) -> Result<(), LogError> {
        let Some(ability_name) = details.name.clone() else {
            self.unhandled(action);
            return Ok(());
        };
        let cells = [
            position_cell(self.round, self.seq),
            Cell::Text(self.name(initiator)?),
            Cell::Text(ability_name),
            Cell::Text(self.name(target)?),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ];
        self.push_row(&cells);
        Ok(())
    }

    fn action_resolved(
        &mut self,
        action: &RawAction,
        initiator: &str,
        target: &str,
    ) -> Result<(), LogError> {
        let initiator_name = self.name(initiator)?;
        let target_name = self.name(target)?;
        let mut cells = [
            position_cell(self.round, self.seq),
            Cell::Text(initiator_name),
            Cell::Text(action.action_type.clone()),
            Cell::Text(target_name),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ];

        if let Some(damage) = action.damage {
            cells[4] = Cell::Int(damage);
            if let Some(hit_chance) = action.hit_chance {
                cells[5] = Cell::Text(format!("{hit_chance:.2}"));
                cells[6] = action.hit_val.map(Cell::Num).unwrap_or(Cell::Empty);
            }

            let action_type = action.action_type.as_str();
            let lowered = action_type.to_lowercase();
            if DAMAGE_TYPES.contains(&action_type) {
                self.tracker.add_damage_taken(target, damage);
                self.tracker.add_damage_done(initiator, damage);
            } else if HEAL_TYPES.contains(&lowered.as_str()) {
                self.tracker.add_healing_done(initiator, damage);
            } else if lowered == REPAIR_TYPE {
                self.tracker.add_armor_repaired(initiator, damage);
            }

            // A resolved snapshot at zero health is a death, credited once
            // to the initiator.
            if let Some(state) = &action.state {
                if state.stats.len() > STAT_HEALTH && state.stat(STAT_HEALTH) == 0 {
                    self.tracker.add_kill(initiator);
                }
            }
        }

        self.push_row(&cells);
        Ok(())
    }

    fn action_target_only(&mut self, action: &RawAction, target: &str) -> Result<(), LogError> {
        let target_name = self.name(target)?;
        let mut cells = [
            position_cell(self.round, self.seq),
            Cell::Empty,
            Cell::Text(action.action_type.clone()),
            Cell::Text(target_name),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ];
        if let Some(damage) = action.damage {
            cells[4] = Cell::Int(damage);
            if BASIC_ATTACK_TYPES.contains(&action.action_type.as_str()) {
                self.tracker.add_damage_taken(target, damage);
            }
        }
        self.push_row(&cells);
        Ok(())
    }

    fn action_group(
        &mut self,
        action: &RawAction,
        initiator: &str,
        group: &[GroupStateEntry],
    ) -> Result<(), LogError> {
        let Some(details) = action.details.as_ref() else {
            self.unhandled(action);
            return Ok(());
        };

        if details.name.as_deref() == Some("Summoner") {
            return self.action_summoner(initiator, details);
        }

        match action.action_type.as_str() {
            "buff" | "halving" => {
                let Some(label) = details.name.clone() else {
                    self.unhandled(action);
                    return Ok(());
                };
                let mut targets = Vec::with_capacity(group.len());
                for entry in group {
                    targets.push(self.name(&entry.monster)?);
                }
                self.emit_fanout(self.name(initiator)?, label, targets);
                Ok(())
            }
            "remove_buff" => {
                let label: String = format!("remove {}", details.name.as_deref().unwrap_or(""))
                    .chars()
                    .take(REMOVE_LABEL_MAX)
                    .collect();
                let cells = [
                    position_cell(self.round, self.seq),
                    Cell::Text(self.name(initiator)?),
                    Cell::Text(label),
                    Cell::Empty,
                    Cell::Empty,
                    Cell::Empty,
                    Cell::Empty,
                ];
                self.push_row(&cells);
                Ok(())
            }
            _ => {
                self.unhandled(action);
                Ok(())
            }
        }
    }

    /// Summoner-wide effects: a signed stat delta fanning out over one side
    /// (own side for buffs, opposing side for debuffs), or a granted
    /// ability fanning out over the caster's own side.
    fn action_summoner(
        &mut self,
        initiator: &str,
        details: &ActionDetails,
    ) -> Result<(), LogError> {
        if let Some(stats) = details.stats.as_ref() {
            if let Some((stat_name, value)) = stats.iter().next() {
                let label = format!("{value:+} {stat_name}");
                let targets = self.summoner_fanout_targets(initiator, *value >= 0)?;
                self.emit_fanout(self.name(initiator)?, label, targets);
            }
        }
        if let Some(ability) = details.ability.as_deref() {
            if SKIPPED_SUMMONER_ABILITIES.contains(&ability) {
                return Ok(());
            }
            let targets = self.summoner_fanout_targets(initiator, true)?;
            self.emit_fanout(self.name(initiator)?, ability.to_string(), targets);
        }
        Ok(())
    }

    /// Monsters of the caster's own side, or of the opposing side for
    /// negative deltas.
    fn summoner_fanout_targets(
        &self,
        initiator: &str,
        own_side: bool,
    ) -> Result<Vec<String>, LogError> {
        let casts_for_team1 = initiator == self.battle.team1.summoner.uid;
        let team: &Team = if casts_for_team1 == own_side {
            &self.battle.team1
        } else {
            &self.battle.team2
        };
        team.monsters.iter().map(|m| self.name(&m.uid)).collect()
    }

    fn emit_fanout(&mut self, initiator_name: String, label: String, targets: Vec<String>) {
        let mut targets = targets.into_iter();
        let first = targets.next().map(Cell::Text).unwrap_or(Cell::Empty);
        let cells = [
            position_cell(self.round, self.seq),
            Cell::Text(initiator_name),
            Cell::Text(label),
            first,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ];
        self.push_row(&cells);
        for target in targets {
            self.push_continuation(target, None);
        }
    }

    fn action_environment(
        &mut self,
        action: &RawAction,
        group: &[GroupStateEntry],
    ) -> Result<(), LogError> {
        if group.is_empty() {
            // A tick that hit nobody still shows up for a couple of types.
            if BARE_ENVIRONMENT_TYPES.contains(&action.action_type.as_str()) {
                let cells = [
                    position_cell(self.round, self.seq),
                    Cell::Empty,
                    Cell::Text(action.action_type.clone()),
                    Cell::Empty,
                    Cell::Empty,
                    Cell::Empty,
                    Cell::Empty,
                ];
                self.push_row(&cells);
            }
            return Ok(());
        }

        if group[0].dmg.is_none() {
            self.unhandled(action);
            return Ok(());
        }

        for (index, entry) in group.iter().enumerate() {
            let target_name = self.name(&entry.monster)?;
            if entry.dmg.is_none() {
                log::warn!(
                    "group entry for '{}' lacks dmg in '{}' action",
                    entry.monster,
                    action.action_type
                );
                self.text.push_str(&format!(
                    "Unhandled: {}\n",
                    serde_json::to_string(entry)
                        .unwrap_or_else(|_| format!("<{}>", entry.monster))
                ));
                continue;
            }
            if index == 0 {
                let cells = [
                    position_cell(self.round, self.seq),
                    Cell::Empty,
                    Cell::Text(action.action_type.clone()),
                    Cell::Text(target_name),
                    entry.dmg.map(Cell::Int).unwrap_or(Cell::Empty),
                    Cell::Empty,
                    Cell::Empty,
                ];
                self.push_row(&cells);
            } else {
                self.push_continuation(target_name, entry.dmg);
            }
        }
        Ok(())
    }
}
