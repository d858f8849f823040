//! The generation orchestrator.
//!
//! Stages run strictly in sequence, each consuming the previous stage's
//! output:
//!
//! resolve → filter → score → price → allocate → select → normalize →
//! manabase → budget → assemble
//!
//! The generator keeps no state between calls, so one instance can serve
//! concurrent requests. Cancellation is checked between stages only.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::budget::{BudgetContext, BudgetPolicy, reconcile};
use crate::card::{Card, Commander, Role, ScoredCard};
use crate::collaborators::{CardRepository, SynergyScorer};
use crate::config::{EngineConfig, Policy};
use crate::deck::{DeckSlate, GeneratedDeck};
use crate::error::{EngineError, Result};
use crate::filter::filter_candidates;
use crate::manabase::{ManabaseConstraints, build_manabase, land_count};
use crate::normalizer::{Normalized, category_counts, normalize};
use crate::pricing::{PriceBook, RequestGate, fetch_prices};
use crate::quota::{CategoryWeights, QuotaOptions, QuotaPlan, allocate};
use crate::ranking::{Archetype, CurveProfile};
use crate::selector::select;
use crate::types::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Resolve,
    Filter,
    Score,
    Price,
    Allocate,
    Select,
    Normalize,
    Manabase,
    Budget,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Resolve,
        Stage::Filter,
        Stage::Score,
        Stage::Price,
        Stage::Allocate,
        Stage::Select,
        Stage::Normalize,
        Stage::Manabase,
        Stage::Budget,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Resolve => "resolve",
            Stage::Filter => "filter",
            Stage::Score => "score",
            Stage::Price => "price",
            Stage::Allocate => "allocate",
            Stage::Select => "select",
            Stage::Normalize => "normalize",
            Stage::Manabase => "manabase",
            Stage::Budget => "budget",
        })
    }
}

/// Cooperative cancellation flag shared with the caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn checkpoint(&self, after: Stage) -> Result<()> {
        if self.is_cancelled() {
            warn!(target: "deckgen::pipeline", "pipeline.cancelled after={after}");
            return Err(EngineError::Cancelled { after });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Commander name or id.
    pub commander: String,
    pub weights: CategoryWeights,
    /// 1..=10, selects the role `Policy`.
    pub power_level: u8,
    pub per_card_cap: Option<f64>,
    pub total_cap: Option<f64>,
    /// Free-text theme keywords passed to the scorer.
    pub themes: Vec<String>,
    /// Category whose weight is a card count rather than a proportion.
    pub absolute_category: Option<Category>,
    /// Overrides the archetype derived from the commander's mana value.
    pub archetype: Option<Archetype>,
}

impl GenerationRequest {
    pub fn new(commander: impl Into<String>, weights: CategoryWeights) -> Self {
        Self {
            commander: commander.into(),
            weights,
            power_level: 5,
            per_card_cap: None,
            total_cap: None,
            themes: Vec::new(),
            absolute_category: None,
            archetype: None,
        }
    }
}

/// Called with each stage as it completes, before the cancellation check.
pub type ProgressFn<'a> = &'a (dyn Fn(Stage) + Sync);

pub struct DeckGenerator<'a, R: ?Sized, S: ?Sized> {
    repository: &'a R,
    scorer: &'a S,
    config: EngineConfig,
    progress: Option<ProgressFn<'a>>,
}

impl<'a, R, S> DeckGenerator<'a, R, S>
where
    R: CardRepository + ?Sized,
    S: SynergyScorer + ?Sized,
{
    pub fn new(repository: &'a R, scorer: &'a S) -> Self {
        Self::with_config(repository, scorer, EngineConfig::default())
    }

    pub fn with_config(repository: &'a R, scorer: &'a S, config: EngineConfig) -> Self {
        Self {
            repository,
            scorer,
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn finish_stage(&self, stage: Stage, cancel: &CancelToken) -> Result<()> {
        if let Some(progress) = self.progress {
            progress(stage);
        }
        cancel.checkpoint(stage)
    }

    /// Builds one deck. `InsufficientPool` is the only failure caused by
    /// the card data itself; everything degraded is returned as warnings.
    pub fn generate(&self, request: &GenerationRequest, cancel: &CancelToken) -> Result<GeneratedDeck> {
        self.config.validate()?;
        let policy = Policy::for_power_level(request.power_level)?;
        let deck_size = self.config.deck_size;
        let mut warnings: Vec<String> = Vec::new();
        let mut notes: Vec<String> = Vec::new();

        let commander = self
            .repository
            .find_commander(&request.commander)
            .ok_or_else(|| EngineError::CommanderNotFound(request.commander.clone()))
            .and_then(Commander::new)?;
        let identity = commander.color_identity();
        let archetype = request
            .archetype
            .unwrap_or_else(|| Archetype::for_commander_mana_value(commander.card().mana_value));
        let curve = CurveProfile::for_archetype(archetype);
        info!(
            target: "deckgen::pipeline",
            "pipeline.start commander={:?} identity={} power={} archetype={:?}",
            commander.name(),
            identity,
            request.power_level,
            archetype
        );
        notes.push(format!(
            "{} ({identity}), power level {}, {archetype:?} curve",
            commander.name(),
            request.power_level
        ));
        self.finish_stage(Stage::Resolve, cancel)?;

        let candidates = self.repository.legal_candidates(identity);
        let legal = filter_candidates(&candidates, &commander, &self.config.filter)?;
        notes.push(format!(
            "{} of {} candidates are legal for this commander",
            legal.len(),
            candidates.len()
        ));
        self.finish_stage(Stage::Filter, cancel)?;

        let scored = self.score_all(&legal, &commander, &request.themes);
        let (land_pool, spell_pool): (Vec<ScoredCard>, Vec<ScoredCard>) =
            scored.into_iter().partition(|c| c.card.is_land());
        self.finish_stage(Stage::Score, cancel)?;

        let budget = BudgetPolicy {
            per_card_cap: request.per_card_cap,
            total_cap: request.total_cap,
            keep_threshold: self.config.keep_threshold,
        };
        let prices = if budget.is_active() {
            // Cards from zero-weight categories can never enter the deck.
            let priceable: Vec<Card> = legal
                .iter()
                .filter(|c| c.is_land() || request.weights.get(c.category) > 0)
                .cloned()
                .collect();
            let gate = RequestGate::from_config(&self.config);
            fetch_prices(&priceable, self.repository, &gate, self.config.price_batch_size)
        } else {
            PriceBook::from_estimates(&legal)
        };
        warnings.extend(prices.warnings().iter().cloned());
        self.finish_stage(Stage::Price, cancel)?;

        let options = QuotaOptions {
            absolute: request.absolute_category,
            availability: Some(category_counts(&spell_pool)),
        };
        let initial_budget = deck_size.saturating_sub(policy.lands);
        let plan = allocate(&request.weights, initial_budget, &options)?;
        warnings.extend(plan.warnings().iter().cloned());
        self.finish_stage(Stage::Allocate, cancel)?;

        let selection = select(&spell_pool, &plan, &curve);
        warnings.extend(selection.shortfalls.iter().map(|s| s.message()));
        self.finish_stage(Stage::Select, cancel)?;

        let first = normalize(&selection.cards, &spell_pool, &plan, initial_budget, &curve);
        let (lands_wanted, plan, normalized) =
            self.settle_land_count(&first.cards, &spell_pool, &request.weights, &options, &curve)?;
        let non_land_target = deck_size - lands_wanted;
        warnings.extend(normalized.warnings.iter().cloned());
        notes.push(format!(
            "{} non-land cards for {} slots after setting {} lands",
            normalized.cards.len(),
            non_land_target,
            lands_wanted
        ));
        self.finish_stage(Stage::Normalize, cancel)?;

        let constraints = ManabaseConstraints {
            land_count: lands_wanted,
            nonbasic_slots: self.config.nonbasic_slots_for(identity.count()),
            curve,
        };
        let manabase = build_manabase(&commander, &normalized.cards, &land_pool, &constraints);
        notes.push(format!(
            "{} lands: {} non-basic, {} basic",
            manabase.lands.len(),
            manabase.nonbasic_count(),
            manabase.basic_count()
        ));
        self.finish_stage(Stage::Manabase, cancel)?;

        let slate = DeckSlate::new(normalized.cards, manabase.lands);
        let (slate, total_price) = if budget.is_active() {
            let context = BudgetContext {
                pool: &spell_pool,
                prices: &prices,
                plan: &plan,
                identity,
                demand: manabase.demand,
                non_land_target,
                curve: &curve,
            };
            let reconciled = reconcile(slate, &budget, &context);
            warnings.extend(reconciled.warnings);
            if !reconciled.substitutions.is_empty() {
                notes.push(format!(
                    "{} budget substitutions",
                    reconciled.substitutions.len()
                ));
            }
            (reconciled.slate, reconciled.total_price)
        } else {
            let total = prices.total(slate.cards());
            (slate, total)
        };
        self.finish_stage(Stage::Budget, cancel)?;

        warnings.extend(role_coverage_warnings(&slate.non_lands, &policy));
        debug_check_invariants(&slate, &commander, &request.weights);

        info!(
            target: "deckgen::pipeline",
            "pipeline.done cards={} non_lands={} lands={} total={:.2} warnings={}",
            slate.len(),
            slate.non_lands.len(),
            slate.lands.len(),
            total_price,
            warnings.len()
        );
        notes.push(format!("total price {total_price:.2}"));
        Ok(GeneratedDeck::new(
            commander,
            slate,
            total_price,
            warnings,
            notes,
            prices.source_counts(),
        ))
    }

    /// Picks the land count from the non-land set it produces. Every pass
    /// re-targets `first`, so the result depends only on the land count
    /// tried. A cycle settles on its largest member.
    fn settle_land_count(
        &self,
        first: &[ScoredCard],
        spell_pool: &[ScoredCard],
        weights: &CategoryWeights,
        options: &QuotaOptions,
        curve: &CurveProfile,
    ) -> Result<(usize, QuotaPlan, Normalized)> {
        let deck_size = self.config.deck_size;
        let pass = |lands: usize| -> Result<(QuotaPlan, Normalized)> {
            let target = deck_size - lands;
            let plan = allocate(weights, target, options)?;
            let normalized = normalize(first, spell_pool, &plan, target, curve);
            Ok((plan, normalized))
        };

        let mut tried: Vec<usize> = Vec::new();
        let mut lands = land_count(first).min(deck_size);
        loop {
            let (plan, normalized) = pass(lands)?;
            let settled = land_count(&normalized.cards).min(deck_size);
            tried.push(lands);
            if settled == lands {
                return Ok((lands, plan, normalized));
            }
            if let Some(start) = tried.iter().position(|l| *l == settled) {
                let largest = tried[start..].iter().copied().max().unwrap_or(lands);
                debug!(
                    target: "deckgen::pipeline",
                    "pipeline.land_cycle tried={:?} chosen={}",
                    tried,
                    largest
                );
                if largest == lands {
                    return Ok((lands, plan, normalized));
                }
                let (plan, normalized) = pass(largest)?;
                return Ok((largest, plan, normalized));
            }
            lands = settled;
        }
    }

    fn score_all(&self, cards: &[Card], commander: &Commander, themes: &[String]) -> Vec<ScoredCard> {
        let scored: Vec<ScoredCard> = cards
            .iter()
            .map(|card| {
                let score = self.scorer.score(card, commander, themes);
                ScoredCard::new(card.clone(), score.value)
                    .with_tag_bonus(score.tag_bonus)
                    .with_roles(score.roles)
            })
            .collect();
        debug!(
            target: "deckgen::pipeline",
            "pipeline.scored cards={} themes={}",
            scored.len(),
            themes.len()
        );
        scored
    }
}

/// One warning per role below the power level's recommendation. Cantrips
/// count toward draw.
fn role_coverage_warnings(non_lands: &[ScoredCard], policy: &Policy) -> Vec<String> {
    let mut warnings = Vec::new();
    for role in [Role::Ramp, Role::Draw, Role::Removal, Role::Tutor, Role::Protection] {
        let wanted = policy.role_target(role);
        let have = non_lands
            .iter()
            .filter(|c| c.has_role(role) || (role == Role::Draw && c.has_role(Role::Cantrip)))
            .count();
        if have < wanted {
            warnings.push(format!(
                "{role}: {have} of {wanted} recommended for power level {}",
                policy.power_level
            ));
        }
    }
    warnings
}

fn debug_check_invariants(slate: &DeckSlate, commander: &Commander, weights: &CategoryWeights) {
    if cfg!(debug_assertions) {
        debug_assert!(
            slate.duplicate_names().is_empty(),
            "duplicate cards: {:?}",
            slate.duplicate_names()
        );
        debug_assert!(
            slate
                .cards()
                .all(|c| commander.color_identity().contains_all(c.color_identity)),
            "card outside the commander's color identity"
        );
        debug_assert!(
            slate.non_lands.iter().all(|c| weights.get(c.category()) > 0),
            "card from an excluded category"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardBuilder;
    use crate::collaborators::{InMemoryRepository, Score, TableScorer};
    use crate::color::ColorSet;
    use crate::pricing::{PriceLookupError, PriceQuote};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn card(name: &str, type_line: &str, identity: &str, mana_value: u32) -> Card {
        CardBuilder::new(name, name)
            .type_line(type_line)
            .color_identity(ColorSet::from_letters(identity))
            .mana_value(mana_value)
            .price(1.0)
            .build()
            .unwrap()
    }

    fn repository() -> InMemoryRepository {
        let mut cards = vec![card("Titania", "Legendary Creature — Elemental", "G", 5)];
        for i in 0..70 {
            cards.push(card(&format!("Creature {i:02}"), "Creature — Elf", "G", 1 + i % 5));
        }
        for i in 0..30 {
            cards.push(card(&format!("Sorcery {i:02}"), "Sorcery", "G", 2 + i % 3));
        }
        for i in 0..10 {
            cards.push(card(&format!("Land {i:02}"), "Land", "", 0));
        }
        InMemoryRepository::new(cards)
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("Titania", CategoryWeights::new([7, 0, 0, 0, 3, 0]).unwrap())
    }

    fn fast_config() -> EngineConfig {
        EngineConfig {
            request_delay: Duration::ZERO,
            base_backoff: Duration::ZERO,
            ..EngineConfig::default()
        }
    }

    /// Counts price lookups and optionally cancels on the first one.
    struct CountingRepository {
        inner: InMemoryRepository,
        lookups: AtomicUsize,
        cancel_on_lookup: Option<CancelToken>,
    }

    impl CountingRepository {
        fn new(inner: InMemoryRepository) -> Self {
            Self {
                inner,
                lookups: AtomicUsize::new(0),
                cancel_on_lookup: None,
            }
        }
    }

    impl CardRepository for CountingRepository {
        fn find_commander(&self, ident: &str) -> Option<Card> {
            self.inner.find_commander(ident)
        }

        fn legal_candidates(&self, identity: ColorSet) -> Vec<Card> {
            self.inner.legal_candidates(identity)
        }

        fn price_of(&self, card: &Card) -> std::result::Result<PriceQuote, PriceLookupError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if let Some(cancel) = &self.cancel_on_lookup {
                cancel.cancel();
            }
            self.inner.price_of(card)
        }
    }

    struct CancellingScorer(CancelToken);

    impl SynergyScorer for CancellingScorer {
        fn score(&self, _card: &Card, _commander: &Commander, _themes: &[String]) -> Score {
            self.0.cancel();
            Score::new(1.0)
        }
    }

    /// Titania plus 40 high-scoring creatures and 60 weaker ones, all
    /// creatures so only the land count moves the non-land target.
    fn two_tier_creatures(
        strong_mv: u32,
        weak_mv: u32,
        weak_role: Option<Role>,
    ) -> (InMemoryRepository, TableScorer) {
        let mut cards = vec![card("Titania", "Legendary Creature — Elemental", "G", 5)];
        let mut scorer = TableScorer::new();
        for i in 0..40 {
            let name = format!("Strong {i:02}");
            scorer.insert(name.clone(), Score::new(10.0));
            cards.push(card(&name, "Creature — Elf", "G", strong_mv));
        }
        for i in 0..60 {
            let name = format!("Weak {i:02}");
            let score = match weak_role {
                Some(role) => Score::new(1.0).with_roles([role]),
                None => Score::new(1.0),
            };
            scorer.insert(name.clone(), score);
            cards.push(card(&name, "Creature — Elf", "G", weak_mv));
        }
        (InMemoryRepository::new(cards), scorer)
    }

    fn creatures_only() -> GenerationRequest {
        GenerationRequest::new("Titania", CategoryWeights::new([10, 0, 0, 0, 0, 0]).unwrap())
    }

    #[test]
    fn test_generate_fills_ninety_nine() {
        let repo = repository();
        let mut scorer = TableScorer::new().with_default_score(1.0);
        scorer.insert("Creature 00", Score::new(5.0).with_roles([Role::Ramp]));
        let generator = DeckGenerator::new(&repo, &scorer);

        let deck = generator.generate(&request(), &CancelToken::new()).unwrap();
        assert_eq!(deck.card_count(), 99);
        assert!(deck.slate().duplicate_names().is_empty());
        assert!(deck.non_lands().iter().any(|c| c.name() == "Creature 00"));
        assert!(
            deck.non_lands()
                .iter()
                .all(|c| matches!(c.category(), Category::Creature | Category::Sorcery))
        );
        assert!(!deck.notes().is_empty());
    }

    #[test]
    fn test_unknown_commander() {
        let repo = repository();
        let scorer = TableScorer::new();
        let generator = DeckGenerator::new(&repo, &scorer);
        let mut req = request();
        req.commander = "Nobody".into();
        assert!(matches!(
            generator.generate(&req, &CancelToken::new()),
            Err(EngineError::CommanderNotFound(name)) if name == "Nobody"
        ));
    }

    #[test]
    fn test_cancelled_before_filter_completes() {
        let repo = repository();
        let scorer = TableScorer::new();
        let generator = DeckGenerator::new(&repo, &scorer);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(matches!(
            generator.generate(&request(), &cancel),
            Err(EngineError::Cancelled {
                after: Stage::Resolve
            })
        ));
    }

    #[test]
    fn test_cancel_after_each_stage() {
        let repo = repository();
        let scorer = TableScorer::new().with_default_score(1.0);
        let mut req = request();
        req.per_card_cap = Some(100.0);

        for stage in Stage::ALL {
            let cancel = CancelToken::new();
            let completed = Mutex::new(Vec::new());
            let progress = |done: Stage| {
                completed.lock().unwrap().push(done);
                if done == stage {
                    cancel.cancel();
                }
            };
            let generator =
                DeckGenerator::with_config(&repo, &scorer, fast_config()).with_progress(&progress);

            let result = generator.generate(&req, &cancel);
            assert!(
                matches!(result, Err(EngineError::Cancelled { after }) if after == stage),
                "cancelled at {stage}"
            );
            let completed = completed.lock().unwrap().clone();
            let expected: Vec<Stage> = Stage::ALL
                .into_iter()
                .take_while(|s| *s != stage)
                .chain([stage])
                .collect();
            assert_eq!(completed, expected);
        }
    }

    #[test]
    fn test_progress_sees_every_stage_once() {
        let repo = repository();
        let scorer = TableScorer::new().with_default_score(1.0);
        let completed = Mutex::new(Vec::new());
        let progress = |done: Stage| completed.lock().unwrap().push(done);
        let generator = DeckGenerator::new(&repo, &scorer).with_progress(&progress);

        let deck = generator.generate(&request(), &CancelToken::new()).unwrap();
        assert_eq!(deck.card_count(), 99);
        assert_eq!(completed.lock().unwrap().as_slice(), Stage::ALL.as_slice());
    }

    #[test]
    fn test_scorer_cancelling_mid_run_stops_after_score() {
        let repo = repository();
        let cancel = CancelToken::new();
        let scorer = CancellingScorer(cancel.clone());
        let generator = DeckGenerator::new(&repo, &scorer);
        assert!(matches!(
            generator.generate(&request(), &cancel),
            Err(EngineError::Cancelled { after: Stage::Score })
        ));
    }

    #[test]
    fn test_price_lookup_cancelling_stops_after_price() {
        let cancel = CancelToken::new();
        let mut repo = CountingRepository::new(repository());
        repo.cancel_on_lookup = Some(cancel.clone());
        let scorer = TableScorer::new().with_default_score(1.0);
        let generator = DeckGenerator::with_config(&repo, &scorer, fast_config());
        let mut req = request();
        req.total_cap = Some(500.0);
        assert!(matches!(
            generator.generate(&req, &cancel),
            Err(EngineError::Cancelled { after: Stage::Price })
        ));
    }

    #[test]
    fn test_budget_prices_only_cards_that_can_enter_the_deck() {
        let mut cards = repository().cards().to_vec();
        for i in 0..5 {
            cards.push(card(&format!("Artifact {i:02}"), "Artifact", "", 2));
        }
        let repo = CountingRepository::new(InMemoryRepository::new(cards));
        let scorer = TableScorer::new().with_default_score(1.0);
        let generator = DeckGenerator::with_config(&repo, &scorer, fast_config());
        let mut req = request();
        req.per_card_cap = Some(100.0);

        let deck = generator.generate(&req, &CancelToken::new()).unwrap();
        assert_eq!(deck.card_count(), 99);
        // 70 creatures, 30 sorceries and 10 lands; artifacts have weight 0.
        assert_eq!(repo.lookups.load(Ordering::SeqCst), 110);
    }

    #[test]
    fn test_no_lookups_without_budget() {
        let repo = CountingRepository::new(repository());
        let scorer = TableScorer::new().with_default_score(1.0);
        let generator = DeckGenerator::with_config(&repo, &scorer, fast_config());
        generator.generate(&request(), &CancelToken::new()).unwrap();
        assert_eq!(repo.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_land_count_follows_final_non_lands() {
        // First pass: 40 strong + 22 ramp -> 35 lands; at 64 non-lands the
        // formula says 34, and 65 non-lands (25 ramp) confirm 34.
        let (repo, scorer) = two_tier_creatures(3, 3, Some(Role::Ramp));
        let generator = DeckGenerator::new(&repo, &scorer);

        let deck = generator.generate(&creatures_only(), &CancelToken::new()).unwrap();
        assert_eq!(deck.lands().len(), 34);
        assert_eq!(deck.non_lands().len(), 65);
        assert_eq!(land_count(deck.non_lands()), 34);
    }

    #[test]
    fn test_land_count_cycle_takes_larger_count() {
        // 57 non-lands ask for 41 lands, 58 non-lands ask for 42.
        let (repo, scorer) = two_tier_creatures(2, 6, None);
        let generator = DeckGenerator::new(&repo, &scorer);

        let deck = generator.generate(&creatures_only(), &CancelToken::new()).unwrap();
        assert_eq!(deck.lands().len(), 42);
        assert_eq!(deck.non_lands().len(), 57);
        assert_eq!(deck.card_count(), 99);
    }

    #[test]
    fn test_invalid_power_level() {
        let repo = repository();
        let scorer = TableScorer::new();
        let generator = DeckGenerator::new(&repo, &scorer);
        let mut req = request();
        req.power_level = 11;
        assert!(matches!(
            generator.generate(&req, &CancelToken::new()),
            Err(EngineError::InvalidPowerLevel(11))
        ));
    }

    #[test]
    fn test_role_coverage_warning() {
        let policy = Policy::for_power_level(5).unwrap();
        let warnings = role_coverage_warnings(&[], &policy);
        assert_eq!(warnings.len(), 5);
        assert_eq!(warnings[0], "ramp: 0 of 10 recommended for power level 5");
    }
}
