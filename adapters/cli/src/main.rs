#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Aegis Defence headlessly.

mod autoplay;

use std::{fs, path::Path};

use aegis_defence_core::{GameConfig, WELCOME_BANNER};
use aegis_defence_session::Session;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use autoplay::AutoplaySettings;

#[derive(Debug, Parser)]
#[command(
    name = "aegis-defence",
    about = "Runs an Aegis Defence session with a simple autopilot"
)]
struct Cli {
    /// TOML file with optional `[game]` and `[autoplay]` tables.
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,
    /// Overrides the session seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of waves to clear before stopping.
    #[arg(long)]
    waves: Option<u32>,
    /// Simulates at double speed.
    #[arg(long)]
    fast_forward: bool,
    /// Paces the simulation against the system clock instead of stepping as fast as possible.
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    game: GameConfig,
    autoplay: AutoplaySettings,
}

fn load_config(path: &Path) -> Result<ConfigFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

/// Entry point for the Aegis Defence command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let mut file = match &cli.config {
        Some(path) => load_config(path)?,
        None => ConfigFile::default(),
    };
    if let Some(seed) = cli.seed {
        file.game.seed = seed;
    }
    if let Some(waves) = cli.waves {
        file.autoplay.waves = waves;
    }
    file.autoplay.fast_forward |= cli.fast_forward;
    file.autoplay.realtime |= cli.realtime;

    info!(
        seed = file.game.seed,
        waves = file.autoplay.waves,
        fast_forward = file.autoplay.fast_forward,
        realtime = file.autoplay.realtime,
        "starting autoplay"
    );
    let mut session = Session::new(file.game.clone()).context("invalid game configuration")?;
    println!("{WELCOME_BANNER}");

    let summary = autoplay::run(&mut session, &file.autoplay);
    println!(
        "Waves cleared: {} | phase: {:?} | wave: {} | lives: {} | base hp: {:.0}/{:.0} | credits: {}",
        summary.waves_cleared,
        session.phase(),
        session.wave(),
        session.lives(),
        session.base().hp,
        session.base().max_hp,
        session.credits(),
    );
    println!(
        "Towers built: {} | upgrades: {} | shots: {} | kills: {} | breaches: {} | simulated: {:.1}s",
        summary.towers_built,
        summary.upgrades,
        summary.shots,
        summary.kills,
        summary.breaches,
        session.elapsed().as_secs_f32(),
    );
    Ok(())
}
