//! Card catalog lookup and set membership classification.
//! The catalog is fetched once (see [`crate::api::ApiClient::card_catalog`])
//! and shared read-only by everything that needs id -> name resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Card ids at or above this belong to the Soulkeep spin-off and are
/// discarded when building the catalog.
pub const SOULKEEP_MIN_ID: u32 = 10001;

/// One card from the public catalog. Fields beyond these exist upstream but
/// are not needed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: u32,
    pub name: String,
    /// Comma-separated edition ids; multi-valued for the alpha/beta core set.
    #[serde(default)]
    pub editions: String,
    #[serde(default)]
    pub tier: Option<i64>,
}

/// Print editions of the game, as encoded in the `editions` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edition {
    Alpha = 0,
    Beta = 1,
    Promo = 2,
    Rewards = 3,
    Untamed = 4,
    Dice = 5,
    Gladius = 6,
    Chaos = 7,
    Rift = 8,
    Soulbound = 10,
    Rebellion = 12,
    SoulboundRb = 13,
}

/// Competitive card sets. Editions map onto sets through the rule table in
/// [`in_set`]; the numeric ids match the edition that anchors each set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSet {
    Alpha = 0,
    Beta = 1,
    Untamed = 4,
    Gladius = 6,
    Chaos = 7,
    Rebellion = 12,
}

pub const VALID_SET_NAMES: [&str; 6] =
    ["alpha", "beta", "untamed", "gladius", "chaos", "rebellion"];

impl CardSet {
    /// Case-insensitive lookup by set name. Lists the valid names on failure.
    pub fn from_name(name: &str) -> Result<CardSet, String> {
        match name.to_lowercase().as_str() {
            "alpha" => Ok(CardSet::Alpha),
            "beta" => Ok(CardSet::Beta),
            "untamed" => Ok(CardSet::Untamed),
            "gladius" => Ok(CardSet::Gladius),
            "chaos" => Ok(CardSet::Chaos),
            "rebellion" => Ok(CardSet::Rebellion),
            _ => Err(format!("valid set names are {VALID_SET_NAMES:?}")),
        }
    }

    pub const fn id(self) -> i64 {
        self as i64
    }
}

/// Whether a card belongs to a competitive set.
///
/// Most cards carry the set's own edition id. The remainder are promo and
/// reward cards whose membership is decided by `(edition, tier)` pairs, plus
/// the alpha/beta core cards that list both editions at once.
pub fn in_set(card: &Card, set: CardSet) -> bool {
    let set_id = set.id();

    // Alpha/beta core cards list every edition they were printed in.
    if card.editions.contains(',') {
        return card
            .editions
            .split(',')
            .filter_map(|e| e.trim().parse::<i64>().ok())
            .any(|e| e == set_id);
    }

    let Ok(edition) = card.editions.trim().parse::<i64>() else {
        return false;
    };
    if edition == set_id {
        return true;
    }

    let tier = card.tier;
    match set {
        // Alpha promos stop at card id 78.
        CardSet::Alpha => edition == Edition::Promo as i64 && card.id <= 78,
        CardSet::Beta => {
            (edition == Edition::Promo as i64 && tier.is_none() && card.id > 78)
                || (edition == Edition::Rewards as i64 && tier.is_none())
        }
        CardSet::Untamed => {
            edition == Edition::Dice as i64
                || (edition == Edition::Promo as i64 && matches!(tier, Some(3) | Some(4)))
                || (edition == Edition::Rewards as i64 && tier == Some(4))
        }
        CardSet::Chaos => {
            edition == Edition::Rift as i64
                || ((edition == Edition::Promo as i64 || edition == Edition::Rewards as i64)
                    && tier == Some(7))
                || edition == Edition::Soulbound as i64
        }
        CardSet::Rebellion => {
            (edition == Edition::Promo as i64 && tier == Some(12))
                || edition == Edition::SoulboundRb as i64
        }
        CardSet::Gladius => false,
    }
}

/// Id-keyed card catalog. Soulkeep entries are dropped at construction.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    by_id: BTreeMap<u32, Card>,
}

impl CardCatalog {
    pub fn from_cards(cards: Vec<Card>) -> CardCatalog {
        let by_id = cards
            .into_iter()
            .filter(|c| c.id < SOULKEEP_MIN_ID)
            .map(|c| (c.id, c))
            .collect();
        CardCatalog { by_id }
    }

    /// Build from the raw `cards/get_details` payload (a JSON array).
    pub fn from_value(value: Value) -> Result<CardCatalog, serde_json::Error> {
        let cards: Vec<Card> = serde_json::from_value(value)?;
        Ok(CardCatalog::from_cards(cards))
    }

    pub fn get(&self, id: u32) -> Option<&Card> {
        self.by_id.get(&id)
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.by_id.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: u32, editions: &str, tier: Option<i64>) -> Card {
        Card {
            id,
            name: format!("card-{id}"),
            editions: editions.to_string(),
            tier,
        }
    }

    #[test]
    fn core_cards_list_both_editions() {
        let c = card(4, "0,1", None);
        assert!(in_set(&c, CardSet::Alpha));
        assert!(in_set(&c, CardSet::Beta));
        assert!(!in_set(&c, CardSet::Untamed));
    }

    #[test]
    fn alpha_promos_stop_at_id_78() {
        assert!(in_set(&card(60, "2", None), CardSet::Alpha));
        assert!(!in_set(&card(79, "2", None), CardSet::Alpha));
        assert!(in_set(&card(79, "2", None), CardSet::Beta));
    }

    #[test]
    fn untamed_takes_dice_and_tiered_promos() {
        assert!(in_set(&card(300, "5", None), CardSet::Untamed));
        assert!(in_set(&card(301, "2", Some(3)), CardSet::Untamed));
        assert!(in_set(&card(302, "3", Some(4)), CardSet::Untamed));
        assert!(!in_set(&card(303, "3", Some(7)), CardSet::Untamed));
    }

    #[test]
    fn chaos_takes_rift_and_soulbound() {
        assert!(in_set(&card(400, "8", None), CardSet::Chaos));
        assert!(in_set(&card(401, "10", None), CardSet::Chaos));
        assert!(in_set(&card(402, "2", Some(7)), CardSet::Chaos));
        assert!(!in_set(&card(403, "2", Some(12)), CardSet::Chaos));
    }

    #[test]
    fn gladius_has_no_promo_rule() {
        assert!(in_set(&card(500, "6", None), CardSet::Gladius));
        assert!(!in_set(&card(501, "2", Some(7)), CardSet::Gladius));
    }

    #[test]
    fn set_names_resolve_case_insensitively() {
        assert_eq!(CardSet::from_name("Chaos"), Ok(CardSet::Chaos));
        assert!(CardSet::from_name("modern").is_err());
    }

    #[test]
    fn catalog_drops_soulkeep_ids() {
        let catalog =
            CardCatalog::from_cards(vec![card(1, "0", None), card(SOULKEEP_MIN_ID, "0", None)]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.name_of(1), Some("card-1"));
        assert!(catalog.get(SOULKEEP_MIN_ID).is_none());
    }

    #[test]
    fn malformed_editions_never_match() {
        assert!(!in_set(&card(600, "", None), CardSet::Chaos));
        assert!(!in_set(&card(601, "n/a", None), CardSet::Alpha));
    }
}
