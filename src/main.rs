//! deckgen - Commander deck generator
//!
//! ## Usage
//!
//! ```text
//! deckgen --cards cards.json --request request.json [OPTIONS]
//!
//! Options:
//!   --config <path>   Engine settings (JSON, every field optional)
//!   --out <path>      Write the deck report here instead of stdout
//!   --verbose         Log stage detail to stderr (or set DECKGEN_LOG)
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use deckgen::io::{DeckReport, build_catalog, load_card_records, load_config, load_request};
use deckgen::{CancelToken, DeckGenerator, EngineConfig};
use log::{LevelFilter, Log, Metadata, Record};

struct Args {
    cards: PathBuf,
    request: PathBuf,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
    verbose: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut cards = None;
    let mut request = None;
    let mut config = None;
    let mut out = None;
    let mut verbose = false;

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--cards" => {
                cards = Some(
                    iter.next()
                        .ok_or_else(|| "--cards requires a path".to_string())?,
                );
            }
            "--request" => {
                request = Some(
                    iter.next()
                        .ok_or_else(|| "--request requires a path".to_string())?,
                );
            }
            "--config" => {
                config = Some(
                    iter.next()
                        .ok_or_else(|| "--config requires a path".to_string())?,
                );
            }
            "--out" => {
                out = Some(
                    iter.next()
                        .ok_or_else(|| "--out requires a path".to_string())?,
                );
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            _ => {
                return Err(format!(
                    "unknown argument '{arg}'. supported: --cards <path> --request <path> --config <path> --out <path> --verbose"
                ));
            }
        }
    }

    Ok(Args {
        cards: cards
            .map(PathBuf::from)
            .ok_or_else(|| "--cards is required".to_string())?,
        request: request
            .map(PathBuf::from)
            .ok_or_else(|| "--request is required".to_string())?,
        config: config.map(PathBuf::from),
        out: out.map(PathBuf::from),
        verbose,
    })
}

/// Plain stderr logger; one line per event. Filtering follows
/// `log::max_level()`.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && metadata.target().starts_with("deckgen")
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: bool) {
    let level = env::var("DECKGEN_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        });
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn run(args: &Args) -> deckgen::Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let records = load_card_records(&args.cards)?;
    let (repository, scorer) = build_catalog(&records)?;
    let request = load_request(&args.request)?;
    log::info!(
        target: "deckgen::cli",
        "cli.loaded cards={} commander={:?}",
        repository.len(),
        request.commander
    );

    let generator = DeckGenerator::with_config(&repository, &scorer, config);
    let deck = generator.generate(&request, &CancelToken::new())?;
    for warning in deck.warnings() {
        log::warn!(target: "deckgen::cli", "{warning}");
    }

    let json = DeckReport::from_deck(&deck).to_json()?;
    match &args.out {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(2);
        }
    };
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
