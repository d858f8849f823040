use thiserror::Error;

use crate::pipeline::Stage;

/// Crate-wide error type for deck generation.
///
/// `InsufficientPool` is the only fatal condition the pipeline itself
/// raises; degraded outcomes are reported as warnings on the result.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The commander identifier did not resolve to a card.
    #[error("commander '{0}' not found")]
    CommanderNotFound(String),

    /// The resolved card cannot lead a deck.
    #[error("'{name}' cannot be a commander: {reason}")]
    NotACommander { name: String, reason: String },

    /// Too few legal non-land candidates remain after filtering.
    #[error("only {found} legal non-land candidates found; at least {required} are required")]
    InsufficientPool { found: usize, required: usize },

    /// A category weight outside 0..=10.
    #[error("weight {value} for {category} is outside 0..=10")]
    InvalidWeight { category: String, value: u8 },

    /// A power level outside 1..=10.
    #[error("power level {0} is outside 1..=10")]
    InvalidPowerLevel(u8),

    /// Every proportional category has weight 0.
    #[error("at least one category needs a non-zero weight to fill {budget} slots")]
    NoWeightedCategories { budget: usize },

    /// The caller cancelled the run between stages.
    #[error("generation cancelled after {after}")]
    Cancelled { after: Stage },

    /// Invalid configuration or input record.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[cfg(feature = "serialization")]
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serialization")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
