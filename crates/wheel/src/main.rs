mod gui;
mod sys;

use anyhow::Context;
use clap::Parser;
use cycles::{InteractionController, PhaseTable, config};
use gui::app::{AppInit, AppModel};
use relm4::prelude::*;
use sys::runtime;

/// Interactive cycle wheel.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Cycle length to start with, overriding the config file
    #[arg(short, long)]
    duration: Option<u32>,

    /// Day to put under the handle at startup
    #[arg(long)]
    day: Option<u32>,

    /// Multiplier applied to every configured length
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Write the default config file if missing, print its path and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.write_config {
        let path = config::write_default_config().context("Failed to write default config")?;
        println!("{}", path.display());
        return Ok(());
    }

    let loaded = config::load_or_default();
    let mut config = loaded.clone();
    if let Some(duration) = cli.duration {
        config.style.duration = duration;
    }
    config.style.validate()?;

    let table = PhaseTable::new();
    if let Err(e) = config.apply_phases(&table) {
        log::error!("Ignoring phase table: {}", e);
    }
    let snapshot = table.snapshot();
    if !snapshot.contains(config.style.duration)
        && let Some(first) = snapshot.durations().first().copied()
    {
        log::warn!(
            "Duration {} is not in the phase table, starting with {}",
            config.style.duration,
            first
        );
        config.style.duration = first;
    }

    let (tx, rx) = async_channel::unbounded();

    // Start Background Services
    let rt = runtime::start_background_services(loaded, tx.clone())?;

    let controller =
        InteractionController::new(table, &config.style, cli.scale, rt.handle().clone(), tx)?;
    if let Some(day) = cli.day {
        controller.set_day(day)?;
    }

    let app = RelmApp::new("org.reyst.cycles").with_args(Vec::new());
    app.run::<AppModel>(AppInit {
        controller,
        style: config.style,
        scale_factor: cli.scale,
        rx,
    });

    Ok(())
}
