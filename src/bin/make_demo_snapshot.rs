use anyhow::{Context, Result};
use nexora::config::{AGGREGATOR, MARKET, PORTFOLIO, SIMULATION};
use nexora::data::MarketSnapshot;
use nexora::portfolio::Portfolio;
use nexora::simulation::RandomWalk;
use nexora::utils::now_timestamp_ms;
use nexora::{CandleAggregator, MarketEngine};

const DEMO_SEED: u64 = 2082;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    build_demo_snapshot()
}

fn build_demo_snapshot() -> Result<()> {
    let aggregator = CandleAggregator::with_rng_seed(AGGREGATOR, DEMO_SEED)
        .context("Failed to build aggregator")?;
    let walk =
        RandomWalk::seeded(SIMULATION, DEMO_SEED).context("Failed to build price walk")?;
    let symbols: Vec<String> = MARKET.all_symbols().into_iter().map(str::to_string).collect();

    let mut engine = MarketEngine::new(aggregator, walk, Portfolio::new(&PORTFOLIO), symbols);
    engine
        .seed_all(now_timestamp_ms(), None)
        .context("Failed to seed watchlist")?;

    let snapshot = engine.snapshot();
    let output_path = MarketSnapshot::default_path(AGGREGATOR.interval_ms());
    let demo_path = output_path.with_file_name(format!(
        "demo_{}",
        output_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("snapshot.bin")
    ));
    snapshot.save_to_path(&demo_path)?;

    println!(
        "✅ Demo snapshot written to {:?} with {} symbols.",
        demo_path,
        snapshot.histories.len()
    );
    Ok(())
}
