//! Price lookups: the rate-limit gate and the batched parallel fetch.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::card::Card;
use crate::collaborators::CardRepository;
use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriceSource {
    /// Quoted by the repository.
    Repository,
    /// The card record's own estimate, used after a failed lookup.
    Estimate,
    /// No price anywhere; counted as free.
    Missing,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PriceSource::Repository => "repository",
            PriceSource::Estimate => "estimate",
            PriceSource::Missing => "missing",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub amount: f64,
    pub source: PriceSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceLookupError {
    /// Rate limited; retried with backoff.
    #[error("price lookup throttled")]
    Throttled,
    #[error("no price available for '{0}'")]
    Unavailable(String),
}

/// Price per card name for one generation run.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    quotes: HashMap<String, PriceQuote>,
    warnings: Vec<String>,
}

impl PriceBook {
    /// Prices taken straight from the card records, no lookups.
    pub fn from_estimates<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut book = Self::default();
        for card in cards {
            let quote = match card.price_estimate {
                Some(amount) => PriceQuote {
                    amount,
                    source: PriceSource::Estimate,
                },
                None => PriceQuote {
                    amount: 0.0,
                    source: PriceSource::Missing,
                },
            };
            book.quotes.insert(card.name.clone(), quote);
        }
        book
    }

    pub fn insert(&mut self, name: impl Into<String>, quote: PriceQuote) {
        self.quotes.insert(name.into(), quote);
    }

    pub fn quote(&self, name: &str) -> Option<&PriceQuote> {
        self.quotes.get(name)
    }

    /// Book price, else the card's estimate, else zero.
    pub fn price_of(&self, card: &Card) -> f64 {
        self.quotes
            .get(&card.name)
            .map(|q| q.amount)
            .or(card.price_estimate)
            .unwrap_or(0.0)
    }

    pub fn total<'a>(&self, cards: impl IntoIterator<Item = &'a Card>) -> f64 {
        cards.into_iter().map(|c| self.price_of(c)).sum()
    }

    /// Number of quotes per source.
    pub fn source_counts(&self) -> BTreeMap<PriceSource, usize> {
        let mut counts = BTreeMap::new();
        for quote in self.quotes.values() {
            *counts.entry(quote.source).or_default() += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Serializes rate-limited requests across every worker of one run.
///
/// Request starts are spaced at least `delay` apart. A throttled response
/// is retried after `base_backoff * 2^attempt`, at most `max_retries` times.
#[derive(Debug)]
pub struct RequestGate {
    last_start: Mutex<Option<Instant>>,
    delay: Duration,
    base_backoff: Duration,
    max_retries: u32,
}

impl RequestGate {
    pub fn new(delay: Duration, base_backoff: Duration, max_retries: u32) -> Self {
        Self {
            last_start: Mutex::new(None),
            delay,
            base_backoff,
            max_retries,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.request_delay, config.base_backoff, config.max_retries)
    }

    /// Blocks until this caller may start a request.
    fn wait_turn(&self) {
        let mut last = self.last_start.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                // Sleep under the lock so waiters queue behind us.
                thread::sleep(self.delay - elapsed);
            }
        }
        *last = Some(Instant::now());
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(1u32 << attempt.min(16))
    }

    /// Runs `request` through the gate, retrying throttled attempts.
    pub fn call<T>(
        &self,
        mut request: impl FnMut() -> Result<T, PriceLookupError>,
    ) -> Result<T, PriceLookupError> {
        let mut attempt = 0;
        loop {
            self.wait_turn();
            match request() {
                Err(PriceLookupError::Throttled) if attempt < self.max_retries => {
                    let wait = self.backoff(attempt);
                    debug!(
                        target: "deckgen::pricing",
                        "pricing.throttled attempt={} backoff_ms={}",
                        attempt + 1,
                        wait.as_millis()
                    );
                    thread::sleep(wait);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Prices `cards` in batches of `batch_size`, each batch fanned out on the
/// rayon pool and finished before the next starts. Failed lookups fall
/// back to the card's estimate.
pub fn fetch_prices<R>(cards: &[Card], repo: &R, gate: &RequestGate, batch_size: usize) -> PriceBook
where
    R: CardRepository + ?Sized,
{
    let mut book = PriceBook::default();
    let mut failures = 0usize;

    for (index, batch) in cards.chunks(batch_size.max(1)).enumerate() {
        let results: Vec<(&Card, Result<PriceQuote, PriceLookupError>)> = batch
            .par_iter()
            .map(|card| (card, gate.call(|| repo.price_of(card))))
            .collect();
        debug!(
            target: "deckgen::pricing",
            "pricing.batch index={} size={}",
            index,
            results.len()
        );

        for (card, result) in results {
            let quote = match result {
                Ok(quote) => quote,
                Err(err) => {
                    failures += 1;
                    match card.price_estimate {
                        Some(amount) => PriceQuote {
                            amount,
                            source: PriceSource::Estimate,
                        },
                        None => {
                            warn!(
                                target: "deckgen::pricing",
                                "pricing.missing card={:?} error={}",
                                card.name,
                                err
                            );
                            book.warnings
                                .push(format!("no price for {}; counted as 0.00", card.name));
                            PriceQuote {
                                amount: 0.0,
                                source: PriceSource::Missing,
                            }
                        }
                    }
                }
            };
            book.quotes.insert(card.name.clone(), quote);
        }
    }

    info!(
        target: "deckgen::pricing",
        "pricing.done cards={} failures={}",
        book.len(),
        failures
    );
    book
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardBuilder;
    use crate::color::ColorSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ThrottlingRepo {
        throttle_first: usize,
        calls: AtomicUsize,
    }

    impl CardRepository for ThrottlingRepo {
        fn find_commander(&self, _ident: &str) -> Option<Card> {
            None
        }

        fn legal_candidates(&self, _identity: ColorSet) -> Vec<Card> {
            Vec::new()
        }

        fn price_of(&self, card: &Card) -> Result<PriceQuote, PriceLookupError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.throttle_first {
                return Err(PriceLookupError::Throttled);
            }
            if card.name.starts_with("unpriced") {
                return Err(PriceLookupError::Unavailable(card.name.clone()));
            }
            Ok(PriceQuote {
                amount: 2.0,
                source: PriceSource::Repository,
            })
        }
    }

    fn card(name: &str, estimate: Option<f64>) -> Card {
        let mut card = CardBuilder::new(name, name).type_line("Artifact").build().unwrap();
        card.price_estimate = estimate;
        card
    }

    fn fast_gate(max_retries: u32) -> RequestGate {
        RequestGate::new(Duration::ZERO, Duration::from_millis(1), max_retries)
    }

    #[test]
    fn test_throttled_requests_are_retried() {
        let repo = ThrottlingRepo {
            throttle_first: 2,
            calls: AtomicUsize::new(0),
        };
        let gate = fast_gate(4);
        let quote = gate.call(|| repo.price_of(&card("Sol Ring", None))).unwrap();
        assert_eq!(quote.amount, 2.0);
        assert_eq!(repo.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_retries_are_bounded() {
        let repo = ThrottlingRepo {
            throttle_first: usize::MAX,
            calls: AtomicUsize::new(0),
        };
        let gate = fast_gate(2);
        let result = gate.call(|| repo.price_of(&card("Sol Ring", None)));
        assert_eq!(result, Err(PriceLookupError::Throttled));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_gate_spaces_request_starts() {
        let gate = RequestGate::new(Duration::from_millis(20), Duration::ZERO, 0);
        let started = Instant::now();
        for _ in 0..3 {
            gate.call(|| Ok::<_, PriceLookupError>(())).unwrap();
        }
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_fetch_falls_back_to_estimates() {
        let repo = ThrottlingRepo {
            throttle_first: 0,
            calls: AtomicUsize::new(0),
        };
        let cards = vec![
            card("Sol Ring", Some(1.0)),
            card("unpriced relic", Some(7.5)),
            card("unpriced trinket", None),
        ];
        let book = fetch_prices(&cards, &repo, &fast_gate(0), 2);

        assert_eq!(book.len(), 3);
        assert_eq!(book.quote("Sol Ring").map(|q| q.source), Some(PriceSource::Repository));
        assert_eq!(book.price_of(&cards[0]), 2.0);
        assert_eq!(book.quote("unpriced relic").map(|q| q.amount), Some(7.5));
        assert_eq!(
            book.quote("unpriced trinket").map(|q| q.source),
            Some(PriceSource::Missing)
        );
        assert_eq!(book.warnings().len(), 1);
        assert_eq!(book.total(&cards), 9.5);
    }
}
