//! HTTP collaborators: battle, card catalog, guild, brawl and settings
//! fetches against the public game API, plus an optional on-disk battle
//! cache. The battle core never touches this module; it consumes
//! pre-fetched decoded values.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::battle::{BattleEnvelope, CardLookupError};
use crate::cards::CardCatalog;

pub const BASE_URL: &str = "https://api2.splinterlands.com";

/// Battle records cached under this directory are reused instead of fetched.
pub const CACHE_DIR_ENV: &str = "FRAYWATCH_CACHE_DIR";

const USER_AGENT: &str = concat!("fraywatch/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum ApiError {
    Http(reqwest::Error),
    Status { url: String, status: u16 },
    Decode(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "request failed: {err}"),
            Self::Status { url, status } => write!(f, "'{url}' returned status {status}"),
            Self::Decode(err) => write!(f, "response did not decode: {err}"),
            Self::Io(err) => write!(f, "cache i/o failed: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> ApiError {
        ApiError::Http(err)
    }
}

impl From<io::Error> for ApiError {
    fn from(err: io::Error) -> ApiError {
        ApiError::Io(err)
    }
}

/// Blocking client over the public API endpoints.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    cache_dir: Option<PathBuf>,
}

impl ApiClient {
    pub fn new() -> Result<ApiClient, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(ApiClient { http, base_url: BASE_URL.to_string(), cache_dir: None })
    }

    /// Client configured from the environment (`FRAYWATCH_CACHE_DIR`).
    pub fn from_env() -> Result<ApiClient, ApiError> {
        let mut client = ApiClient::new()?;
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            if !dir.is_empty() {
                client.cache_dir = Some(PathBuf::from(dir));
            }
        }
        Ok(client)
    }

    /// Point at a different API host (tests, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> ApiClient {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> ApiClient {
        self.cache_dir = Some(dir.into());
        self
    }

    fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url: url.to_string(), status: status.as_u16() });
        }
        let body = response.text()?;
        serde_json::from_str(&body).map_err(ApiError::Decode)
    }

    /// Raw battle record by battle queue id. A cache hit short-circuits the
    /// fetch; a miss writes the payload back for next time.
    pub fn battle(&self, bqid: &str) -> Result<Value, ApiError> {
        if let Some(dir) = &self.cache_dir {
            let path = dir.join(format!("{bqid}.json"));
            if path.is_file() {
                let raw = fs::read_to_string(&path)?;
                return serde_json::from_str(&raw).map_err(ApiError::Decode);
            }
            log::debug!("battle cache miss for {bqid}");
        }
        let value = self.get_json(&format!("{}/battle/result?id={bqid}", self.base_url))?;
        if let Some(dir) = &self.cache_dir {
            self.write_battle_cache(dir, bqid, &value);
        }
        Ok(value)
    }

    /// Best effort: a failed cache write only costs the next fetch.
    fn write_battle_cache(&self, dir: &Path, bqid: &str, value: &Value) {
        if let Err(err) = fs::create_dir_all(dir) {
            log::warn!("could not create cache dir '{}': {err}", dir.display());
            return;
        }
        match serde_json::to_string(value) {
            Ok(raw) => {
                if let Err(err) = fs::write(dir.join(format!("{bqid}.json")), raw) {
                    log::warn!("could not cache battle {bqid}: {err}");
                    return;
                }
            }
            Err(err) => {
                log::warn!("could not serialize battle {bqid} for caching: {err}");
                return;
            }
        }
        let meta = serde_json::json!({
            "bqid": bqid,
            "fetched_at": chrono::Utc::now().to_rfc3339(),
        });
        if let Err(err) = fs::write(dir.join(format!("{bqid}.meta.json")), meta.to_string()) {
            log::debug!("could not stamp cache meta for {bqid}: {err}");
        }
    }

    /// Fetch and parse in one step; fetch failures become invalid envelopes,
    /// a missing card id propagates as the dependency error it is.
    pub fn battle_envelope(
        &self,
        bqid: &str,
        catalog: &CardCatalog,
    ) -> Result<BattleEnvelope, CardLookupError> {
        match self.battle(bqid) {
            Ok(value) => BattleEnvelope::from_value(bqid, Some(value), catalog),
            Err(err) => {
                log::warn!("battle fetch failed for {bqid}: {err}");
                Ok(BattleEnvelope::invalid(format!(
                    "Could not fetch battle data for id: {bqid}"
                )))
            }
        }
    }

    /// Full card catalog, Soulkeep entries dropped.
    pub fn card_catalog(&self) -> Result<CardCatalog, ApiError> {
        let value = self.get_json(&format!("{}/cards/get_details", self.base_url))?;
        CardCatalog::from_value(value).map_err(ApiError::Decode)
    }

    pub fn settings(&self) -> Result<Value, ApiError> {
        self.get_json(&format!("{}/settings", self.base_url))
    }

    pub fn guild_find(&self, guild_id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("{}/guilds/find?id={guild_id}", self.base_url))
    }

    pub fn guild_members(&self, guild_id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("{}/guilds/members?guild_id={guild_id}", self.base_url))
    }

    pub fn guild_list(&self) -> Result<Value, ApiError> {
        self.get_json(&format!("{}/guilds/list", self.base_url))
    }

    pub fn brawl_records(&self, guild_id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("{}/guilds/brawl_records?guild_id={guild_id}", self.base_url))
    }

    pub fn find_brawl(&self, brawl_id: &str, guild_id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!(
            "{}/tournaments/find_brawl?id={brawl_id}&guild_id={guild_id}",
            self.base_url
        ))
    }

    /// Current guild name for a player, `"-"` when guildless.
    pub fn player_guild_name(&self, player: &str) -> Result<String, ApiError> {
        let value = self.get_json(&format!("{}/players/details?name={player}", self.base_url))?;
        Ok(value
            .get("guild")
            .and_then(|g| g.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("-")
            .to_string())
    }
}
