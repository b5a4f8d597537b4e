#![allow(clippy::collapsible_if)]

// Core modules
pub mod aggregator;
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod portfolio;
pub mod simulation;
pub mod utils;

// Re-export commonly used types
pub use aggregator::{AggregatorError, CandleAggregator, ClosedCandle, IngestOutcome};
pub use analysis::{annotate_all, classify};
pub use data::MarketSnapshot;
pub use domain::{Candle, PatternKind, PatternSet, PatternTag, Polarity, Tick};
pub use engine::{AggregatorHandle, MarketEngine, MarketEvent};

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use itertools::Itertools;

use crate::config::{AGGREGATOR, AggregatorConfig, MARKET, PORTFOLIO, SIMULATION};
use crate::portfolio::Portfolio;
use crate::simulation::RandomWalk;
use crate::utils::{TimeUtils, epoch_ms_to_utc, now_timestamp_ms};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of simulator periods to run
    #[arg(long, default_value_t = 100)]
    pub ticks: usize,

    /// Candle width in seconds
    #[arg(long, default_value_t = AGGREGATOR.interval_width_secs)]
    pub interval_secs: u32,

    /// Seed for both the price walk and the backfill (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Comma separated symbols (whole watchlist when omitted)
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Also recognise the multi-candle reversal shapes
    #[arg(long, default_value_t = false)]
    pub extended_patterns: bool,

    /// Snapshot file to resume from and write back to
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Sleep one tick period between steps instead of running flat out
    #[arg(long, default_value_t = false)]
    pub realtime: bool,
}

impl Cli {
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            interval_width_secs: self.interval_secs,
            pattern_set: if self.extended_patterns {
                PatternSet::Extended
            } else {
                PatternSet::Core
            },
            ..AGGREGATOR
        }
    }

    pub fn watchlist(&self) -> Vec<String> {
        if self.symbols.is_empty() {
            MARKET.all_symbols().into_iter().map(str::to_string).collect()
        } else {
            self.symbols.iter().map(|s| s.trim().to_uppercase()).collect()
        }
    }
}

/// Run the simulated market described by `cli`, then persist a snapshot.
pub fn run_simulation(cli: &Cli) -> Result<()> {
    let config = cli.aggregator_config();
    let (aggregator, walk) = match cli.seed {
        Some(seed) => (
            CandleAggregator::with_rng_seed(config, seed)?,
            RandomWalk::seeded(SIMULATION, seed)?,
        ),
        None => (CandleAggregator::new(config)?, RandomWalk::from_entropy(SIMULATION)?),
    };
    let interval_ms = aggregator.interval_ms();

    let snapshot_path = cli
        .snapshot
        .clone()
        .unwrap_or_else(|| MarketSnapshot::default_path(interval_ms));
    let resume = if snapshot_path.exists() {
        match MarketSnapshot::load_from_path(&snapshot_path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("Ignoring snapshot: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let mut engine = MarketEngine::new(aggregator, walk, Portfolio::new(&PORTFOLIO), cli.watchlist());
    let start_ms = now_timestamp_ms();
    engine.seed_all(start_ms, resume.as_ref())?;
    log::info!(
        "{} market: {} symbols, {} candles, starting {}",
        MARKET.exchange,
        engine.symbols().len(),
        TimeUtils::interval_to_string(interval_ms),
        epoch_ms_to_utc(start_ms)
    );

    let mut tag_counts: HashMap<PatternKind, usize> = HashMap::new();
    let mut rejected = 0usize;
    for step in 0..cli.ticks {
        let now_ms = start_ms + step as i64 * SIMULATION.tick_period_ms;
        for event in engine.step(now_ms) {
            match event {
                MarketEvent::CandleClosed { closed, .. } => {
                    if let Some(tag) = closed.tag {
                        *tag_counts.entry(tag.kind).or_default() += 1;
                    }
                }
                MarketEvent::TickRejected { .. } => rejected += 1,
                MarketEvent::ClockRegression { .. } | MarketEvent::SessionChanged(_) => {}
            }
        }
        if cli.realtime {
            std::thread::sleep(Duration::from_millis(SIMULATION.tick_period_ms as u64));
        }
    }

    for (kind, count) in tag_counts.iter().sorted_by(|a, b| b.1.cmp(a.1)) {
        log::info!("{:>14}: {}", kind.to_string(), count);
    }
    if rejected > 0 {
        log::warn!("{} ticks rejected", rejected);
    }
    if let Some(q) = engine.top_gainer() {
        log::info!("Top gainer: {} {:.2} ({:+.2}%)", q.symbol, q.ltp, q.change_pct());
    }

    let snapshot = engine.snapshot();
    let histories: HashMap<String, Vec<Candle>> = snapshot.histories.clone().into_iter().collect();
    let annotated = annotate_all(&histories, config.pattern_set);
    log::info!(
        "{} of {} symbols carry at least one pattern in their history",
        annotated.len(),
        snapshot.histories.len()
    );

    snapshot.save_to_path(&snapshot_path)?;
    snapshot.export_json(&snapshot_path.with_extension("json"))?;
    log::info!("Snapshot written to {}", snapshot_path.display());
    Ok(())
}
