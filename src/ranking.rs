//! Deterministic candidate ordering shared by every selection stage.
//!
//! Criteria, each consulted only when all previous ones tie:
//! 1. total score (synergy + tag bonus), descending
//! 2. fit against the commander archetype's ideal mana curve, descending
//! 3. power estimate, descending
//! 4. popularity rank, ascending (unranked cards last)
//! 5. name, ascending
//!
//! Floating-point criteria are quantized to `SCORE_EPSILON` so that values
//! closer than the tolerance tie while the ordering stays total.

use std::cmp::Ordering;

use crate::card::ScoredCard;

/// Scores closer than this are treated as equal.
pub const SCORE_EPSILON: f64 = 1e-6;

/// Broad commander strategy; selects an ideal curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    Aggro,
    Midrange,
    Control,
    Ramp,
}

impl Archetype {
    /// Fallback when the request names no archetype.
    pub fn for_commander_mana_value(mana_value: u32) -> Self {
        match mana_value {
            0..=3 => Archetype::Aggro,
            4..=5 => Archetype::Midrange,
            _ => Archetype::Ramp,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "aggro" => Some(Archetype::Aggro),
            "midrange" => Some(Archetype::Midrange),
            "control" => Some(Archetype::Control),
            "ramp" | "big" => Some(Archetype::Ramp),
            _ => None,
        }
    }
}

/// Ideal share of non-land cards per mana value bucket 0, 1, 2, 3, 4, 5, 6+.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveProfile {
    shares: [f64; 7],
}

impl CurveProfile {
    pub fn for_archetype(archetype: Archetype) -> Self {
        let shares = match archetype {
            Archetype::Aggro => [0.02, 0.18, 0.30, 0.25, 0.15, 0.07, 0.03],
            Archetype::Midrange => [0.02, 0.12, 0.25, 0.25, 0.18, 0.10, 0.08],
            Archetype::Control => [0.03, 0.12, 0.25, 0.22, 0.18, 0.10, 0.10],
            Archetype::Ramp => [0.02, 0.10, 0.20, 0.20, 0.18, 0.14, 0.16],
        };
        Self { shares }
    }

    pub fn bucket(mana_value: u32) -> usize {
        (mana_value as usize).min(6)
    }

    /// How well a mana value fits the ideal curve.
    pub fn fit(&self, mana_value: u32) -> f64 {
        self.shares[Self::bucket(mana_value)]
    }
}

impl Default for CurveProfile {
    fn default() -> Self {
        Self::for_archetype(Archetype::Midrange)
    }
}

fn quantize(value: f64) -> i64 {
    (value / SCORE_EPSILON).round() as i64
}

fn descending(a: f64, b: f64) -> Ordering {
    quantize(b).cmp(&quantize(a))
}

/// Total order used wherever "best first" is needed.
pub fn compare(a: &ScoredCard, b: &ScoredCard, curve: &CurveProfile) -> Ordering {
    descending(a.total_score(), b.total_score())
        .then_with(|| descending(curve.fit(a.card.mana_value), curve.fit(b.card.mana_value)))
        .then_with(|| descending(a.power_estimate(), b.power_estimate()))
        .then_with(|| {
            let rank = |c: &ScoredCard| c.card.popularity_rank.unwrap_or(u32::MAX);
            rank(a).cmp(&rank(b))
        })
        .then_with(|| a.name().cmp(b.name()))
}

/// Sorts best-first in place.
pub fn rank(cards: &mut [ScoredCard], curve: &CurveProfile) {
    cards.sort_by(|a, b| compare(a, b, curve));
}
