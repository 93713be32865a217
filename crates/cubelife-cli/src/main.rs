//! Headless driver for the cubelife simulation.

mod telemetry;

use anyhow::{anyhow, Result};
use clap::Parser;
use cubelife_core::{Ratios, SimulationConfig, StateChange, Stats};
use cubelife_world::{SimulationEngine, TickReport};
use serde::Serialize;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cubelife", version, about = "Run a 3D game of life without a front-end")]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells along the X axis
    #[arg(short = 'x', long, allow_negative_numbers = true)]
    size_x: Option<i32>,

    /// Cells along the Y axis
    #[arg(short = 'y', long, allow_negative_numbers = true)]
    size_y: Option<i32>,

    /// Cells along the Z axis
    #[arg(short = 'z', long, allow_negative_numbers = true)]
    size_z: Option<i32>,

    /// Chance that each cell starts alive
    #[arg(short, long)]
    probability: Option<f32>,

    /// Random seed for a reproducible board
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to play
    #[arg(short, long)]
    ticks: Option<u32>,

    /// Seconds to wait between ticks
    #[arg(long)]
    tick_duration: Option<f32>,

    /// Print one JSON object per tick on stdout and log as JSON
    #[arg(long)]
    json: bool,

    /// Include every state change in JSON output
    #[arg(long, requires = "json")]
    changes: bool,
}

impl Args {
    fn load_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };

        let board = &mut config.board;
        if let Some(v) = self.size_x {
            board.size_x = v;
        }
        if let Some(v) = self.size_y {
            board.size_y = v;
        }
        if let Some(v) = self.size_z {
            board.size_z = v;
        }
        if let Some(v) = self.probability {
            board.spawn_probability = v;
        }
        if self.seed.is_some() {
            board.seed = self.seed;
        }

        let playback = &mut config.playback;
        if let Some(v) = self.ticks {
            playback.tick_count = v;
        }
        if let Some(v) = self.tick_duration {
            playback.tick_duration_secs = v;
        }
        playback.tick_duration()?;

        Ok(config)
    }
}

/// One line of JSON output
#[derive(Serialize)]
struct TickLine<'a> {
    tick: u64,
    remaining: u64,
    change_count: usize,
    stats: &'a Stats,
    empty: u64,
    ratios: Ratios,
    #[serde(skip_serializing_if = "Option::is_none")]
    changes: Option<&'a [StateChange]>,
}

impl<'a> TickLine<'a> {
    fn new(report: &'a TickReport, with_changes: bool) -> Self {
        Self {
            tick: report.tick,
            remaining: report.remaining,
            change_count: report.changes.len(),
            stats: &report.stats,
            empty: report.stats.empty_count(),
            ratios: report.stats.ratios(),
            changes: with_changes.then_some(report.changes.as_slice()),
        }
    }
}

fn log_stats(tick: u64, remaining: u64, stats: &Stats) {
    let alive = stats.alive_fraction() * 100.0;
    info!(
        tick,
        remaining,
        survivors = stats.survivors,
        reproductions = stats.reproductions,
        underpopulations = stats.underpopulations,
        overpopulations = stats.overpopulations,
        empty = stats.empty_count(),
        "{:.1}% alive - {:.1}% dead",
        alive,
        100.0 - alive
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.json)?;

    let config = args.load_config()?;
    let dimensions = config.board.dimensions();
    if dimensions.exceeds_cell_hint() {
        warn!(
            cells = dimensions.cell_count(),
            "Large board, ticks may be slow to render"
        );
    }

    let engine = SimulationEngine::new();
    let initial = engine
        .generate(&config.board)
        .ok_or_else(|| anyhow!("engine busy, board not generated"))?;

    let initial_report = TickReport {
        tick: 0,
        remaining: u64::from(config.playback.tick_count),
        changes: Vec::new(),
        stats: initial,
    };
    emit(&initial_report, &args)?;

    let mut handle = engine
        .play(&config.playback)?
        .ok_or_else(|| anyhow!("engine busy, playback not started"))?;

    let stopper = engine.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        stopper.stop().await;
    });

    while let Some(report) = handle.next_report().await {
        emit(&report, &args)?;
    }

    let summary = handle.finish().await?;
    info!(
        run_id = %summary.run_id,
        completed = summary.completed_ticks,
        requested = summary.requested_ticks,
        cancelled = summary.cancelled,
        "Run finished"
    );

    Ok(())
}

fn emit(report: &TickReport, args: &Args) -> Result<()> {
    if args.json {
        let line = serde_json::to_string(&TickLine::new(report, args.changes))?;
        println!("{}", line);
    } else {
        log_stats(report.tick, report.remaining, &report.stats);
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping after the current tick");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "cubelife", "-x", "4", "--size-y", "-2", "-p", "0.5", "--seed", "9", "-t", "3",
        ]);
        let config = args.load_config().unwrap();
        assert_eq!(config.board.size_x, 4);
        assert_eq!(config.board.size_y, -2);
        assert_eq!(config.board.size_z, 10);
        assert_eq!(config.board.seed, Some(9));
        assert_eq!(config.playback.tick_count, 3);
        assert_eq!(config.board.dimensions().cell_count(), 40);
    }

    #[test]
    fn test_bad_tick_duration() {
        let args = Args::parse_from(["cubelife", "--tick-duration", "0"]);
        assert!(args.load_config().is_err());
    }

    #[test]
    fn test_changes_requires_json() {
        assert!(Args::try_parse_from(["cubelife", "--changes"]).is_err());
        assert!(Args::try_parse_from(["cubelife", "--json", "--changes"]).is_ok());
    }

    #[test]
    fn test_tick_line_json() {
        let mut stats = Stats::new(4);
        stats.survivors = 1;
        let report = TickReport {
            tick: 2,
            remaining: 1,
            changes: vec![StateChange::new(
                cubelife_core::Coord::new(0, 0, 0),
                cubelife_core::CellState::Survivor,
            )],
            stats,
        };

        let value = serde_json::to_value(TickLine::new(&report, false)).unwrap();
        assert_eq!(value["change_count"], 1);
        assert_eq!(value["empty"], 3);
        assert_eq!(value["ratios"]["alive"], 0.25);
        assert!(value.get("changes").is_none());

        let value = serde_json::to_value(TickLine::new(&report, true)).unwrap();
        assert_eq!(value["changes"][0]["new_state"], "Survivor");
    }
}
