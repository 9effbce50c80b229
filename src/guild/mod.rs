//! Guild and brawl summaries built from the guilds/tournaments endpoints.
//! Everything here is a plain fetch-then-render collaborator; no combat
//! state is involved.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub motto: String,
    pub num_members: u32,
    /// Active members only.
    pub members: Vec<String>,
    pub rating: i64,
    pub rank: i64,
}

impl Guild {
    pub fn fetch(client: &ApiClient, guild_id: &str) -> Result<Guild, ApiError> {
        let find = client.guild_find(guild_id)?;
        let members = client.guild_members(guild_id)?;
        Guild::from_parts(guild_id, &find, &members)
            .map_err(|err| ApiError::Decode(serde::de::Error::custom(err)))
    }

    pub fn from_parts(guild_id: &str, find: &Value, members: &Value) -> Result<Guild, String> {
        let name = string_field(find, "name")?;
        let motto = find.get("motto").and_then(Value::as_str).unwrap_or("").to_string();
        let num_members = find
            .get("num_members")
            .and_then(Value::as_u64)
            .ok_or("guild payload lacks num_members")? as u32;
        let rating = numeric_field(find, "rating")?;
        let rank = numeric_field(find, "rank")?;

        let members = members
            .as_array()
            .ok_or("members payload is not an array")?
            .iter()
            .filter(|m| m.get("status").and_then(Value::as_str) == Some("active"))
            .filter_map(|m| m.get("player").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        Ok(Guild {
            id: guild_id.to_string(),
            name,
            motto,
            num_members,
            members,
            rating,
            rank,
        })
    }
}

impl fmt::Display for Guild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Rank: {}, Members: {}", self.name, self.rank, self.members.len())
    }
}

/// One player's results in a brawl.
#[derive(Debug, Clone, Deserialize)]
pub struct BrawlerResults {
    pub player: String,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub auto_wins: u32,
    pub total_battles: u32,
    pub entered_battles: u32,
    pub fray_index: u32,
}

impl fmt::Display for BrawlerResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, fray {}: {} W, {} L, {} AW.",
            self.player, self.fray_index, self.wins, self.losses, self.auto_wins
        )
    }
}

/// One guild's standing within a brawl.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildStanding {
    pub id: String,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub auto_wins: u32,
    /// Crowns.
    #[serde(default)]
    pub total_payout: f64,
    #[serde(default)]
    pub member_sps_payout: f64,
    #[serde(default)]
    pub member_merits_payout: f64,
}

/// One brawl as seen from a specific guild: that guild's players plus every
/// participating guild's standing.
#[derive(Debug, Clone)]
pub struct Brawl {
    pub guild_id: String,
    pub brawl_id: String,
    pub guild_name: String,
    pub tier: u32,
    pub player_results: Vec<BrawlerResults>,
    pub standings: Vec<GuildStanding>,
    pub opponents: Vec<String>,
    pub start_date: Option<DateTime<FixedOffset>>,
}

impl Brawl {
    pub fn fetch(client: &ApiClient, guild_id: &str, brawl_id: &str) -> Result<Brawl, ApiError> {
        let data = client.find_brawl(brawl_id, guild_id)?;
        Brawl::from_value(guild_id, brawl_id, &data)
            .map_err(|err| ApiError::Decode(serde::de::Error::custom(err)))
    }

    pub fn from_value(guild_id: &str, brawl_id: &str, data: &Value) -> Result<Brawl, String> {
        let challenge_level = data
            .get("data")
            .and_then(|d| d.get("challenge_level"))
            .and_then(Value::as_u64)
            .ok_or("brawl payload lacks data.challenge_level")?;

        let player_results: Vec<BrawlerResults> = data
            .get("players")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| e.to_string())?
            .unwrap_or_default();

        let standings: Vec<GuildStanding> = data
            .get("guilds")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| e.to_string())?
            .unwrap_or_default();

        let guild_name = standings
            .iter()
            .find(|g| g.id == guild_id)
            .map(|g| g.name.clone())
            .ok_or_else(|| format!("guild {guild_id} not among brawl participants"))?;
        let opponents = standings
            .iter()
            .filter(|g| g.id != guild_id)
            .map(|g| g.name.clone())
            .collect();

        let start_date = data
            .get("data")
            .and_then(|d| d.get("start_date"))
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok());

        Ok(Brawl {
            guild_id: guild_id.to_string(),
            brawl_id: brawl_id.to_string(),
            guild_name,
            tier: challenge_level as u32 + 1,
            player_results,
            standings,
            opponents,
            start_date,
        })
    }

    /// Markdown table of every guild's results and payouts; auto-wins show
    /// as a `+N` suffix on the win column.
    pub fn markdown_results(&self) -> String {
        let mut out = String::from("Guild | Wins | Losses | Crowns | SPS | Merits\n--|--|--|--|--|--\n");
        for standing in &self.standings {
            let auto = if standing.auto_wins > 0 {
                format!("+{}", standing.auto_wins)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "{} | {}{} | {} | {} | {} | {}\n",
                standing.name,
                standing.wins,
                auto,
                standing.losses,
                standing.total_payout,
                standing.member_sps_payout,
                standing.member_merits_payout,
            ));
        }
        out
    }
}

impl fmt::Display for Brawl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Brawl({}, {})", self.guild_id, self.brawl_id)?;
        writeln!(f, "    Guild: {}", self.guild_name)?;
        writeln!(f, "    Tier: {}", self.tier)?;
        let players: Vec<&str> = self.player_results.iter().map(|p| p.player.as_str()).collect();
        writeln!(f, "    Players: {players:?}")?;
        write!(f, "    Opponents: {:?}", self.opponents)
    }
}

fn string_field(value: &Value, key: &str) -> Result<String, String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("payload lacks string field '{key}'"))
}

/// Ratings/ranks arrive either as numbers or as numeric strings.
fn numeric_field(value: &Value, key: &str) -> Result<i64, String> {
    let field = value.get(key).ok_or_else(|| format!("payload lacks field '{key}'"))?;
    if let Some(number) = field.as_i64() {
        return Ok(number);
    }
    field
        .as_str()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| format!("field '{key}' is not numeric"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn guild_parses_active_members_and_string_ratings() {
        let find = json!({"name": "Order", "motto": "hold", "num_members": 3, "rating": "1200", "rank": 5});
        let members = json!([
            {"player": "alpha", "status": "active"},
            {"player": "beta", "status": "inactive"},
            {"player": "gamma", "status": "active"},
        ]);
        let guild = Guild::from_parts("g-1", &find, &members).expect("parse");
        assert_eq!(guild.members, vec!["alpha", "gamma"]);
        assert_eq!(guild.rating, 1200);
        assert_eq!(guild.to_string(), "Order, Rank: 5, Members: 2");
    }

    #[test]
    fn brawl_separates_own_guild_from_opponents() {
        let data = json!({
            "data": {"challenge_level": 2},
            "players": [
                {"player": "alpha", "wins": 4, "losses": 1, "total_battles": 5,
                 "entered_battles": 5, "fray_index": 3}
            ],
            "guilds": [
                {"id": "g-1", "name": "Order", "wins": 10, "losses": 5,
                 "auto_wins": 2, "total_payout": 30.0,
                 "member_sps_payout": 12.5, "member_merits_payout": 800.0},
                {"id": "g-2", "name": "Chaos", "wins": 8, "losses": 7,
                 "total_payout": 20.0, "member_sps_payout": 9.0,
                 "member_merits_payout": 600.0}
            ]
        });
        let brawl = Brawl::from_value("g-1", "b-9", &data).expect("parse");
        assert_eq!(brawl.guild_name, "Order");
        assert_eq!(brawl.tier, 3);
        assert_eq!(brawl.opponents, vec!["Chaos"]);
        assert_eq!(brawl.player_results[0].to_string(), "alpha, fray 3: 4 W, 1 L, 0 AW.");

        let table = brawl.markdown_results();
        assert!(table.contains("Order | 10+2 | 5 | 30 | 12.5 | 800\n"));
        assert!(table.contains("Chaos | 8 | 7 | 20 | 9 | 600\n"));
    }

    #[test]
    fn brawl_requires_own_guild_in_participants() {
        let data = json!({"data": {"challenge_level": 0}, "players": [], "guilds": []});
        assert!(Brawl::from_value("g-1", "b-9", &data).is_err());
    }
}
