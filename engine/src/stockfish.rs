use crate::channel::{EngineChannel, EngineError};
use crate::uci::{parse_uci_message, UciMessage};
use crate::{EngineCommand, EngineEvent};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const EVENT_BUFFER: usize = 256;

/// A UCI engine running as a child process.
///
/// Commands go out through an unbounded queue so [`EngineChannel::send`]
/// never blocks the caller; output lines come back on the event receiver
/// returned from [`StockfishEngine::spawn_with_config`].
pub struct StockfishEngine {
    process: Child,
    command_tx: mpsc::UnboundedSender<EngineCommand>,
}

/// Configuration for engine process and performance tuning.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Explicit binary path. Common install locations are searched otherwise.
    pub path: Option<PathBuf>,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
}

impl StockfishEngine {
    /// Spawn the engine, complete the `uci`/`uciok` handshake and apply
    /// performance options.
    #[tracing::instrument(level = "info")]
    pub async fn spawn_with_config(
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let path = find_stockfish_path(config.path.as_deref()).ok_or(EngineError::NotFound)?;
        tracing::info!("Found engine at: {:?}", path);

        let mut process = tokio::process::Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::error!("Failed to spawn engine: {}", e);
                EngineError::Spawn(e.to_string())
            })?;

        let mut stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("no stdin".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("no stdout".to_string()))?;

        let (reader_tx, mut event_rx) = mpsc::channel::<EngineEvent>(EVENT_BUFFER);

        // Spawn output reader task
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        tracing::warn!("Engine stdout EOF - engine closed");
                        let _ = reader_tx
                            .send(EngineEvent::Error("engine closed".to_string()))
                            .await;
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        tracing::trace!("UCI << {}", trimmed);

                        if matches!(
                            parse_uci_message(trimmed),
                            Ok(UciMessage::UciOk | UciMessage::ReadyOk)
                        ) && reader_tx.send(EngineEvent::Ready).await.is_err()
                        {
                            break;
                        }

                        let event = EngineEvent::Output(trimmed.to_string());
                        if reader_tx.send(event).await.is_err() {
                            tracing::debug!("Event receiver dropped");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Error reading from engine stdout: {}", e);
                        let _ = reader_tx.send(EngineEvent::Error(e.to_string())).await;
                        break;
                    }
                }
            }
            tracing::info!("Output reader task exiting");
        });

        write_line(&mut stdin, &EngineCommand::Uci).await?;

        // Wait for uciok
        let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            while let Some(event) = event_rx.recv().await {
                match event {
                    EngineEvent::Ready => return Ok(()),
                    EngineEvent::Error(e) => return Err(e),
                    EngineEvent::Output(_) => {}
                }
            }
            Err("engine closed before sending uciok".to_string())
        })
        .await;

        match handshake {
            Ok(Ok(())) => tracing::debug!("Received uciok, engine ready"),
            Ok(Err(e)) => {
                tracing::error!("Engine initialization failed: {}", e);
                return Err(EngineError::Handshake(e));
            }
            Err(_) => {
                tracing::error!("Timeout waiting for uciok");
                return Err(EngineError::Handshake(
                    "timeout waiting for uciok".to_string(),
                ));
            }
        }

        if let Some(threads) = config.threads {
            let threads = threads.clamp(1, 16);
            tracing::info!("Setting Threads to {}", threads);
            write_line(
                &mut stdin,
                &EngineCommand::SetOption {
                    name: "Threads".to_string(),
                    value: Some(threads.to_string()),
                },
            )
            .await?;
        }

        if let Some(hash_mb) = config.hash_mb {
            let hash_mb = hash_mb.clamp(1, 2048);
            tracing::info!("Setting Hash to {} MB", hash_mb);
            write_line(
                &mut stdin,
                &EngineCommand::SetOption {
                    name: "Hash".to_string(),
                    value: Some(hash_mb.to_string()),
                },
            )
            .await?;
        }

        // Spawn stdin writer task
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<EngineCommand>();
        tokio::spawn(async move {
            while let Some(cmd) = command_rx.recv().await {
                let is_quit = cmd == EngineCommand::Quit;
                tracing::trace!("UCI >> {}", cmd);

                if let Err(e) = write_line(&mut stdin, &cmd).await {
                    tracing::error!("Failed to write to engine: {}", e);
                    break;
                }
                if is_quit {
                    break;
                }
            }
            tracing::info!("Stdin writer task exiting");
        });

        tracing::info!("Engine spawned and initialized successfully");
        Ok((
            Self {
                process,
                command_tx,
            },
            event_rx,
        ))
    }

    /// Ask the engine to quit, then make sure the process is gone.
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(EngineCommand::Quit);
        let _ = tokio::time::timeout(Duration::from_secs(1), self.process.wait()).await;
        let _ = self.process.kill().await;
    }
}

impl EngineChannel for StockfishEngine {
    fn send(&mut self, cmd: EngineCommand) -> Result<(), EngineError> {
        tracing::debug!("Queueing command: {}", cmd);
        self.command_tx.send(cmd).map_err(|_| {
            tracing::warn!("Engine command queue closed");
            EngineError::ChannelClosed
        })
    }
}

async fn write_line(
    stdin: &mut tokio::process::ChildStdin,
    cmd: &EngineCommand,
) -> Result<(), EngineError> {
    let line = format!("{}\n", cmd.to_uci());
    stdin
        .write_all(line.as_bytes())
        .await
        .map_err(|_| EngineError::ChannelClosed)?;
    stdin.flush().await.map_err(|_| EngineError::ChannelClosed)
}

/// Find the engine executable: the explicit path if it exists, otherwise
/// common install locations.
fn find_stockfish_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let paths = [
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/opt/homebrew/bin/stockfish",
        "/usr/games/stockfish",
    ];

    for path_str in paths {
        let path = Path::new(path_str);
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // Fall back to PATH lookup
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join("stockfish"))
            .find(|candidate| candidate.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_path_is_not_found() {
        let path = Path::new("/definitely/not/here/stockfish");
        assert_eq!(find_stockfish_path(Some(path)), None);
    }

    #[tokio::test]
    async fn test_spawn_missing_engine_reports_not_found() {
        let config = EngineConfig {
            path: Some(PathBuf::from("/definitely/not/here/stockfish")),
            ..Default::default()
        };
        let result = StockfishEngine::spawn_with_config(config).await;
        assert!(matches!(result, Err(EngineError::NotFound)));
    }
}
