//! Engine configuration and power-level policies.
//!
//! Every field has a default; callers normally start from
//! `EngineConfig::default()` and override what they need. With the
//! `serialization` feature the same structure can be read from JSON
//! (see `io::load_config`).

use std::time::Duration;

use crate::card::Role;
use crate::error::{EngineError, Result};
use crate::filter::FilterOptions;

/// Cards in a finished deck besides the commander.
pub const DECK_SIZE: usize = 99;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Non-commander card count. Fixed at 99 outside of tests.
    pub deck_size: usize,
    pub filter: FilterOptions,
    /// Cards over the per-card price cap are kept when no substitute exists
    /// and their total score exceeds this threshold.
    pub keep_threshold: f64,
    /// Cards priced concurrently before the next batch starts.
    pub price_batch_size: usize,
    /// Minimum spacing between rate-limited requests.
    pub request_delay: Duration,
    /// First backoff after a throttled response; doubles per retry.
    pub base_backoff: Duration,
    pub max_retries: u32,
    /// Non-basic land slots by commander color count (index 0 = colorless,
    /// index 5 = five colors).
    pub nonbasic_slots: [usize; 6],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deck_size: DECK_SIZE,
            filter: FilterOptions::default(),
            keep_threshold: 9.0,
            price_batch_size: 16,
            request_delay: Duration::from_millis(100),
            base_backoff: Duration::from_millis(250),
            max_retries: 4,
            nonbasic_slots: [8, 6, 12, 16, 18, 18],
        }
    }
}

impl EngineConfig {
    pub fn nonbasic_slots_for(&self, color_count: u32) -> usize {
        let index = (color_count as usize).min(self.nonbasic_slots.len() - 1);
        self.nonbasic_slots[index]
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.deck_size == 0 {
            return Err(EngineError::Config("deck_size must be positive".into()));
        }
        if self.price_batch_size == 0 {
            return Err(EngineError::Config(
                "price_batch_size must be positive".into(),
            ));
        }
        if !self.keep_threshold.is_finite() {
            return Err(EngineError::Config("keep_threshold must be finite".into()));
        }
        Ok(())
    }
}

/// Preset role targets for a power level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub power_level: u8,
    /// Initial land estimate; fixes the first non-land slot budget.
    pub lands: usize,
    pub ramp: usize,
    pub draw: usize,
    pub removal: usize,
    pub tutors: usize,
    pub protection: usize,
}

impl Policy {
    /// 1-3 casual, 4-6 focused, 7-8 optimized, 9-10 competitive.
    pub fn for_power_level(level: u8) -> Result<Policy> {
        let (lands, ramp, draw, removal, tutors, protection) = match level {
            1..=3 => (38, 8, 8, 6, 0, 2),
            4..=6 => (37, 10, 10, 8, 2, 3),
            7..=8 => (35, 12, 12, 10, 4, 4),
            9..=10 => (32, 14, 14, 10, 8, 5),
            _ => return Err(EngineError::InvalidPowerLevel(level)),
        };
        Ok(Policy {
            power_level: level,
            lands,
            ramp,
            draw,
            removal,
            tutors,
            protection,
        })
    }

    /// Target count for a role. Cantrips count toward draw.
    pub fn role_target(&self, role: Role) -> usize {
        match role {
            Role::Ramp => self.ramp,
            Role::Draw => self.draw,
            Role::Cantrip => 0,
            Role::Tutor => self.tutors,
            Role::Removal => self.removal,
            Role::Protection => self.protection,
        }
    }
}
