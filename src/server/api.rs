//! Payload builders behind the routes. Pure except for the per-request
//! battle fetches through the registry's client.

use std::fmt;

use crate::battle::{RenderMode, TeamColor};
use crate::rewards::{ChestConfig, ChestTier};
use crate::server::CardRegistry;

#[derive(Debug)]
pub enum PayloadError {
    MissingParam(&'static str),
    BadParam(String),
    Upstream(String),
    Internal(String),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParam(name) => write!(f, "missing query parameter '{name}'"),
            Self::BadParam(message) | Self::Upstream(message) | Self::Internal(message) => {
                write!(f, "{message}")
            }
        }
    }
}

impl std::error::Error for PayloadError {}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "fraywatch-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key && !v.is_empty()).then(|| v.to_string())
    })
}

fn fetch_envelope(
    registry: &CardRegistry,
    query: &str,
) -> Result<crate::battle::BattleEnvelope, PayloadError> {
    let bqid = query_param(query, "id").ok_or(PayloadError::MissingParam("id"))?;
    registry
        .client
        .battle_envelope(&bqid, &registry.catalog)
        .map_err(|err| PayloadError::Upstream(err.to_string()))
}

/// Reconstructed log text; an invalid envelope yields its stored message.
pub fn battle_log_payload(registry: &CardRegistry, query: &str) -> Result<String, PayloadError> {
    let mode = match query_param(query, "mode").as_deref() {
        Some("markdown") => RenderMode::Markdown,
        _ => RenderMode::Fixed,
    };
    let envelope = fetch_envelope(registry, query)?;
    envelope.log_text(mode).map_err(|err| PayloadError::Internal(err.to_string()))
}

pub fn battle_summary_payload(
    registry: &CardRegistry,
    query: &str,
) -> Result<String, PayloadError> {
    let envelope = fetch_envelope(registry, query)?;
    Ok(envelope.markdown_summary())
}

pub fn battle_tracker_payload(
    registry: &CardRegistry,
    query: &str,
) -> Result<String, PayloadError> {
    let team = query_param(query, "team").unwrap_or_else(|| "red".to_string());
    let color = TeamColor::from_label(&team)
        .ok_or_else(|| PayloadError::BadParam(format!("invalid team '{team}'")))?;
    let envelope = fetch_envelope(registry, query)?;
    let Some(battle) = envelope.battle() else {
        return Ok(envelope.markdown_summary());
    };
    let log = battle
        .log(RenderMode::Fixed)
        .map_err(|err| PayloadError::Internal(err.to_string()))?;
    Ok(log.tracker.markdown_table(battle.team(color), battle.names()))
}

pub fn chest_payload(tier: &str, query: &str) -> Result<String, PayloadError> {
    let tier = ChestTier::from_name(tier)
        .ok_or_else(|| PayloadError::BadParam(format!("unknown chest tier '{tier}'")))?;
    let batch = match query_param(query, "batch") {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|b| *b >= 1)
            .ok_or_else(|| PayloadError::BadParam(format!("invalid batch '{raw}'")))?,
        None => 1,
    };
    let chest = ChestConfig::new(tier, batch, true, true);
    serde_json::to_string_pretty(&serde_json::json!({
        "tier": tier.label(),
        "batch": batch,
        "cost": chest.cost(),
        "average_draw": chest.average_draw(),
    }))
    .map_err(|err| PayloadError::Internal(err.to_string()))
}
