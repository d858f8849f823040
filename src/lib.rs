//! Commander deck assembly.
//!
//! A `DeckGenerator` turns a commander, six category weights and a power
//! level into a 99-card deck: legality filter, quota allocation, ranked
//! selection, exact-size normalization, manabase and an optional budget
//! pass. Card data and scoring come from `CardRepository` and
//! `SynergyScorer` implementations.

pub mod budget;
pub mod card;
pub mod collaborators;
pub mod color;
pub mod config;
pub mod deck;
pub mod error;
pub mod filter;
pub mod ids;
#[cfg(feature = "serialization")]
pub mod io;
pub mod mana;
pub mod manabase;
pub mod normalizer;
pub mod pipeline;
pub mod pricing;
pub mod quota;
pub mod ranking;
pub mod selector;
pub mod types;

pub use budget::{BudgetPolicy, Reconciled, Substitution};
pub use card::{BasicLand, Card, CardBuilder, Commander, Legality, Role, ScoredCard};
pub use collaborators::{CardRepository, InMemoryRepository, Score, SynergyScorer, TableScorer};
pub use color::{Color, ColorSet};
pub use config::{DECK_SIZE, EngineConfig, Policy};
pub use deck::{DeckSlate, GeneratedDeck};
pub use error::{EngineError, Result};
pub use filter::{FilterOptions, filter_candidates};
pub use ids::CardId;
pub use mana::{ManaCost, ManaSymbol};
pub use manabase::{Manabase, ManabaseConstraints, build_manabase, land_count};
pub use normalizer::{Normalized, normalize};
pub use pipeline::{CancelToken, DeckGenerator, GenerationRequest, ProgressFn, Stage};
pub use pricing::{PriceBook, PriceLookupError, PriceQuote, PriceSource, RequestGate, fetch_prices};
pub use quota::{CategoryCounts, CategoryWeights, Quota, QuotaOptions, QuotaPlan, allocate};
pub use ranking::{Archetype, CurveProfile};
pub use selector::{Selection, Shortfall, select};
pub use types::{CardType, Category, Supertype};
