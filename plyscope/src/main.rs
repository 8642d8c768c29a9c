//! plyscope: step through a chess game while a UCI engine analyses the
//! position on screen.
//!
//! The binary wires three pieces together:
//! - a [`GameTimeline`] seeded from `--fen` / `--moves`,
//! - an optional engine process (Stockfish or any UCI engine) driven through
//!   [`analysis::PositionSync`],
//! - a session actor that owns both, with a stdin front end on top.
//!
//! Without an engine the timeline still works; analysis is reported as
//! unavailable.

mod config;
mod frontend;
mod session;

use std::path::PathBuf;
use std::time::Duration;

use analysis::SyncConfig;
use anyhow::Context;
use chess::GameTimeline;
use clap::Parser;
use engine::{EngineConfig, EngineEvent, StockfishEngine};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use frontend::OutputMode;
use session::SessionOptions;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "plyscope",
    version,
    about = "Step through a chess game with live multi-line engine analysis"
)]
struct Cli {
    /// Start position as FEN (default: standard starting position).
    #[arg(long)]
    fen: Option<String>,

    /// Moves to load, space separated, in UCI or SAN (e.g. "e4 e5 Nf3").
    #[arg(long)]
    moves: Option<String>,

    /// Number of ranked engine lines.
    #[arg(long, default_value_t = analysis::sync::DEFAULT_LINE_COUNT,
          value_parser = clap::value_parser!(u8).range(1..=10))]
    lines: u8,

    /// Search depth for each position.
    #[arg(long, default_value_t = analysis::sync::DEFAULT_TARGET_DEPTH,
          value_parser = clap::value_parser!(u8).range(1..=99))]
    depth: u8,

    /// Minimum time between engine restarts, in milliseconds.
    #[arg(long)]
    throttle_ms: Option<u64>,

    /// Number of positions whose analysis is kept in memory.
    #[arg(long, default_value_t = analysis::cache::DEFAULT_CAPACITY)]
    cache_size: usize,

    /// Path to the UCI engine binary.
    #[arg(long)]
    engine_path: Option<PathBuf>,

    /// Run without an engine.
    #[arg(long)]
    no_engine: bool,

    /// Engine search threads.
    #[arg(long)]
    threads: Option<u32>,

    /// Engine hash table size in MB.
    #[arg(long)]
    hash_mb: Option<u32>,

    /// Print snapshots and engine updates as JSON lines.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing()?;

    tracing::info!("plyscope starting up");

    let mut timeline = match cli.fen.as_deref() {
        Some(fen) => GameTimeline::from_fen(fen).context("invalid --fen")?,
        None => GameTimeline::new(),
    };
    if let Some(moves) = cli.moves.as_deref() {
        let moves: Vec<&str> = moves.split_whitespace().collect();
        timeline
            .load_from_move_list(&moves[..])
            .context("could not load --moves")?;
    }

    let (engine, engine_events) = if cli.no_engine {
        (None, None)
    } else {
        spawn_engine(&cli).await
    };

    let options = SessionOptions {
        engine,
        engine_events,
        sync: SyncConfig {
            line_count: cli.lines,
            target_depth: cli.depth,
            min_restart_interval: Duration::from_millis(
                cli.throttle_ms.unwrap_or_else(config::get_throttle_ms),
            ),
        },
        cache_size: cli.cache_size,
    };
    let (handle, actor) = session::spawn_session(timeline, options);

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let result = frontend::run(&handle, mode).await;

    handle.shutdown().await;
    match actor.await {
        Ok(Some(engine)) => engine.shutdown().await,
        Ok(None) => {}
        Err(e) => tracing::error!("Session actor panicked: {}", e),
    }

    tracing::info!("plyscope shutting down");
    result
}

/// Start the engine. Failure is not fatal: the session runs without
/// analysis.
async fn spawn_engine(
    cli: &Cli,
) -> (Option<StockfishEngine>, Option<mpsc::Receiver<EngineEvent>>) {
    let config = EngineConfig {
        path: cli.engine_path.clone().or_else(config::get_engine_path),
        threads: cli.threads,
        hash_mb: cli.hash_mb,
    };

    match StockfishEngine::spawn_with_config(config).await {
        Ok((engine, events)) => (Some(engine), Some(events)),
        Err(e) => {
            tracing::warn!("Engine unavailable: {}", e);
            eprintln!("Engine unavailable ({}); continuing without analysis", e);
            (None, None)
        }
    }
}

/// Log to `PLYSCOPE_LOG_PATH` when set, otherwise to stderr.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for the whole run.
fn init_tracing() -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = config::get_log_path() else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("could not create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["plyscope"]);
        assert_eq!(cli.lines, 3);
        assert_eq!(cli.depth, 20);
        assert_eq!(cli.cache_size, 64);
        assert!(cli.throttle_ms.is_none());
        assert!(!cli.no_engine);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "plyscope",
            "--moves",
            "e4 e5 Nf3",
            "--lines",
            "5",
            "--throttle-ms",
            "100",
            "--no-engine",
            "--json",
        ]);
        assert_eq!(cli.moves.as_deref(), Some("e4 e5 Nf3"));
        assert_eq!(cli.lines, 5);
        assert_eq!(cli.throttle_ms, Some(100));
        assert!(cli.no_engine);
        assert!(cli.json);
    }

    #[test]
    fn test_cli_rejects_zero_lines() {
        assert!(Cli::try_parse_from(["plyscope", "--lines", "0"]).is_err());
    }
}
