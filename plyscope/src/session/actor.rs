use analysis::IngestOutcome;
use engine::{EngineChannel, EngineEvent};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Instant};
use tracing::Instrument;

use super::commands::*;
use super::events::SessionEvent;
use super::state::SessionState;

/// The main session actor loop.
/// Owns all mutable state. Processes commands, engine output and the
/// deferred restart timer sequentially. Returns the engine channel on exit
/// so the caller can shut the engine down.
pub(crate) async fn run_session_actor<C: EngineChannel>(
    state: SessionState<C>,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) -> Option<C> {
    run_session_actor_inner(state, cmd_rx, event_tx)
        .instrument(tracing::info_span!("session"))
        .await
}

async fn run_session_actor_inner<C: EngineChannel>(
    mut state: SessionState<C>,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) -> Option<C> {
    tracing::info!("Session actor started");

    if state.sync.initialize() {
        state.sync_position(Instant::now());
    }

    loop {
        let deadline = state.sync.deadline();

        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::info!("Session actor shutting down");
                        break;
                    }
                    Some(cmd) => handle_command(&mut state, cmd, &event_tx),
                }
            }

            Some(engine_event) = state.next_engine_event() => {
                handle_engine_event(&mut state, engine_event, &event_tx);
            }

            _ = sleep_until(deadline), if deadline.is_some() => {
                if let Some(outcome) = state.sync.poll(Instant::now()) {
                    tracing::trace!(?outcome, "Deferred restart fired");
                }
            }
        }
    }

    tracing::info!("Session actor exited");
    state.sync.take_channel()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn handle_command<C: EngineChannel>(
    state: &mut SessionState<C>,
    cmd: SessionCommand,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    match cmd {
        SessionCommand::Navigate { nav, reply } => {
            let result = state.navigate(nav);
            reply_with_change(state, result, reply, event_tx);
        }
        SessionCommand::MakeMove { notation, reply } => {
            let result = state.make_move(&notation);
            reply_with_change(state, result, reply, event_tx);
        }
        SessionCommand::LoadMoves { moves, reply } => {
            let result = state.load_moves(&moves);
            reply_with_change(state, result, reply, event_tx);
        }
        SessionCommand::Reset { fen, reply } => {
            let result = state.reset(fen.as_deref());
            reply_with_change(state, result, reply, event_tx);
        }
        SessionCommand::SetLineCount { count, reply } => {
            state.set_line_count(count, Instant::now());
            let snapshot = state.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            let _ = reply.send(Ok(snapshot));
        }
        SessionCommand::SetAnalysis { enabled, reply } => {
            let result = state
                .set_analysis(enabled, Instant::now())
                .map(|()| state.snapshot());
            if let Ok(ref snapshot) = result {
                let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
            }
            let _ = reply.send(result);
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::Subscribe { reply } => {
            let snapshot = state.snapshot();
            let rx = event_tx.subscribe();
            let _ = reply.send((snapshot, rx));
        }
        SessionCommand::Shutdown => unreachable!(),
    }
}

/// Finish a timeline mutation: resync analysis if the position moved,
/// broadcast and reply.
fn reply_with_change<C: EngineChannel>(
    state: &mut SessionState<C>,
    result: Result<(), SessionError>,
    reply: SnapshotReply,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    if result.is_ok() {
        state.sync_position(Instant::now());
    }
    let result = result.map(|()| state.snapshot());
    if let Ok(ref snapshot) = result {
        let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));
    }
    let _ = reply.send(result);
}

fn handle_engine_event<C: EngineChannel>(
    state: &mut SessionState<C>,
    event: EngineEvent,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    match event {
        EngineEvent::Output(line) => match state.ingest(&line) {
            IngestOutcome::Updated { .. } if state.analysing_current() => {
                let view = state.analysis_view();
                let _ = event_tx.send(SessionEvent::LinesUpdated {
                    fen: state.current_position().fingerprint().to_string(),
                    depth: view.depth,
                    lines: view.lines,
                });
            }
            IngestOutcome::Completed if state.analysing_current() => {
                let view = state.analysis_view();
                let _ = event_tx.send(SessionEvent::AnalysisComplete {
                    fen: state.current_position().fingerprint().to_string(),
                    depth: view.depth,
                });
            }
            _ => {}
        },
        EngineEvent::Ready => {
            tracing::debug!("Engine ready");
        }
        EngineEvent::Error(err) => {
            tracing::error!("Engine error: {}", err);
            // The process is gone; drop the channel so restarts become no-ops
            drop(state.sync.take_channel());
            state.engine_rx = None;
            let _ = event_tx.send(SessionEvent::Error {
                message: format!("Engine error: {}", err),
            });
            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
        }
    }
}
