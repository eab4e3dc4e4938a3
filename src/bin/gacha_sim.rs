//! Gacha draw simulator CLI.
//!
//! Loads the client and detail tables, runs draws on one pool and prints a
//! rarity summary.
//!
//! Examples:
//!   cargo run --bin gacha_sim -- --pool NORM_1 -n 100 --seed 42
//!   cargo run --bin gacha_sim -- --pool SINGLE_45_0_7 --ten -n 30 --dump progress.json

use anyhow::Context;
use clap::Parser;
use gacha::build_info::VERSION_LINE;
use gacha::{DrawContext, DrawReport, EngineConfig, GachaEngine, GachaTables, PlayerSession};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gacha_sim")]
#[command(version = VERSION_LINE, about = "Run gacha draws against pool tables", long_about = None)]
struct Cli {
    /// Pool to draw on
    #[arg(short, long)]
    pool: String,

    /// Number of draws (rounded up to whole ten-draws with --ten)
    #[arg(short = 'n', long, default_value_t = 10)]
    draws: u32,

    /// Resolve draws as ten-draw requests
    #[arg(long)]
    ten: bool,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Client pool table
    #[arg(long, default_value = "gacha_table.json")]
    client_table: PathBuf,

    /// Server detail table
    #[arg(long, default_value = "gacha_detail_table.json")]
    detail_table: PathBuf,

    /// Engine configuration JSON (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resume from a saved progress file
    #[arg(long)]
    session: Option<PathBuf>,

    /// Write the final progress here
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Print every drawn item
    #[arg(short, long)]
    verbose: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gacha=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let tables = GachaTables::load(&cli.client_table, &cli.detail_table)
        .context("Failed to load gacha tables")?;
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = GachaEngine::new(tables, config);

    let mut session = match &cli.session {
        Some(path) => PlayerSession::load(path)
            .with_context(|| format!("Failed to load progress from {}", path.display()))?,
        None => engine.new_session(),
    };

    let mut rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let ctx = DrawContext::default();
    let mut report = DrawReport::new(&cli.pool);
    if cli.ten {
        for _ in 0..cli.draws.div_ceil(10) {
            let items = engine.resolve_ten_draws(&mut session, &cli.pool, &ctx, &mut rng)?;
            if cli.verbose {
                for item in &items {
                    println!("{:>3}★ {}", item.rarity + 1, item.id);
                }
            }
            report.record_all(&items);
        }
    } else {
        for _ in 0..cli.draws {
            let item = engine.resolve_single_draw(&mut session, &cli.pool, &ctx, &mut rng)?;
            if cli.verbose {
                println!("{:>3}★ {}", item.rarity + 1, item.id);
            }
            report.record(&item);
        }
    }

    if cli.json {
        println!("{}", report.to_json());
    } else {
        println!("{}", report.to_text());
    }

    if let Some(path) = &cli.dump {
        session
            .save(path)
            .with_context(|| format!("Failed to write progress to {}", path.display()))?;
        println!("Progress saved to: {}", path.display());
    }
    Ok(())
}
