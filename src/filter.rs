//! Legality and color-identity filtering of the candidate pool.

use std::collections::HashSet;

use log::{debug, info};

use crate::card::{Card, Commander};
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    /// Fewer legal non-land candidates than this is fatal.
    pub min_non_lands: usize,
    /// Set codes whose cards are never eligible (case-insensitive).
    pub excluded_sets: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_non_lands: 60,
            excluded_sets: ["unh", "ugl", "ust", "und", "unf"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl FilterOptions {
    fn is_excluded_set(&self, set_code: Option<&str>) -> bool {
        set_code.is_some_and(|code| {
            self.excluded_sets
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(code))
        })
    }
}

#[derive(Debug, Default)]
struct Rejections {
    commander: usize,
    basic: usize,
    illegal: usize,
    excluded_set: usize,
    off_identity: usize,
    duplicate: usize,
}

/// Returns the cards that may appear under `commander`: format-legal, not
/// from an excluded set, identity within the commander's, not the
/// commander itself and not a basic land. Names are deduplicated keeping
/// the first occurrence. Non-basic lands are kept for the manabase.
pub fn filter_candidates(
    pool: &[Card],
    commander: &Commander,
    options: &FilterOptions,
) -> Result<Vec<Card>> {
    let identity = commander.color_identity();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut rejected = Rejections::default();
    let mut kept = Vec::new();

    for card in pool {
        if card.name == commander.name() || card.id == commander.card().id {
            rejected.commander += 1;
        } else if card.is_basic_land() {
            rejected.basic += 1;
        } else if !card.legality.is_legal() {
            rejected.illegal += 1;
        } else if options.is_excluded_set(card.set_code.as_deref()) {
            rejected.excluded_set += 1;
        } else if !identity.contains_all(card.color_identity) {
            rejected.off_identity += 1;
        } else if !seen.insert(card.name.as_str()) {
            rejected.duplicate += 1;
        } else {
            kept.push(card.clone());
        }
    }

    let non_lands = kept.iter().filter(|c| !c.is_land()).count();
    debug!(
        target: "deckgen::filter",
        "filter.rejected commander={} basic={} illegal={} excluded_set={} off_identity={} duplicate={}",
        rejected.commander,
        rejected.basic,
        rejected.illegal,
        rejected.excluded_set,
        rejected.off_identity,
        rejected.duplicate
    );
    info!(
        target: "deckgen::filter",
        "filter.done identity={} pool={} kept={} non_lands={}",
        identity,
        pool.len(),
        kept.len(),
        non_lands
    );

    if non_lands < options.min_non_lands {
        return Err(EngineError::InsufficientPool {
            found: non_lands,
            required: options.min_non_lands,
        });
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{BasicLand, CardBuilder, Legality};
    use crate::color::ColorSet;

    fn card(name: &str, type_line: &str, identity: &str) -> Card {
        CardBuilder::new(name, name)
            .type_line(type_line)
            .color_identity(ColorSet::from_letters(identity))
            .build()
            .unwrap()
    }

    fn golgari_commander() -> Commander {
        Commander::new(card("Meren of Clan Nel Toth", "Legendary Creature — Human Shaman", "BG"))
            .unwrap()
    }

    fn options(min: usize) -> FilterOptions {
        FilterOptions {
            min_non_lands: min,
            ..FilterOptions::default()
        }
    }

    #[test]
    fn test_filter_excludes_off_identity_and_commander() {
        let commander = golgari_commander();
        let pool = vec![
            commander.card().clone(),
            card("Sakura-Tribe Elder", "Creature — Snake Shaman", "G"),
            card("Counterspell", "Instant", "U"),
            card("Sol Ring", "Artifact", ""),
            card("Overgrown Tomb", "Land — Swamp Forest", "BG"),
            Card::basic_land(BasicLand::Forest),
        ];
        let kept = filter_candidates(&pool, &commander, &options(2)).unwrap();
        let names: Vec<&str> = kept.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Sakura-Tribe Elder", "Sol Ring", "Overgrown Tomb"]);
    }

    #[test]
    fn test_filter_excludes_illegal_and_excluded_sets() {
        let commander = golgari_commander();
        let mut banned = card("Golos, Tireless Pilgrim", "Legendary Artifact Creature", "");
        banned.legality = Legality::Banned;
        let mut silver = card("Zombie Fanboy", "Creature — Zombie", "B");
        silver.set_code = Some("UNH".into());
        let fine = card("Eternal Witness", "Creature — Human Shaman", "G");

        let kept = filter_candidates(&[banned, silver, fine], &commander, &options(1)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Eternal Witness");
    }

    #[test]
    fn test_filter_dedupes_names() {
        let commander = golgari_commander();
        let pool = vec![
            card("Cultivate", "Sorcery", "G"),
            card("Cultivate", "Sorcery", "G"),
        ];
        let kept = filter_candidates(&pool, &commander, &options(1)).unwrap();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_filter_insufficient_pool_is_fatal() {
        let commander = golgari_commander();
        let pool = vec![
            card("Cultivate", "Sorcery", "G"),
            card("Overgrown Tomb", "Land — Swamp Forest", "BG"),
        ];
        let err = filter_candidates(&pool, &commander, &FilterOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientPool {
                found: 1,
                required: 60
            }
        ));
    }
}
