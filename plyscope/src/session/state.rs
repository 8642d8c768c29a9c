use analysis::{IngestOutcome, PositionSync};
use chess::{GameTimeline, Position};
use engine::{EngineChannel, EngineEvent};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::commands::{Navigation, SessionError};
use super::snapshot::{AnalysisView, SessionSnapshot};

/// Internal mutable state, owned entirely by the session actor. No locks.
pub(crate) struct SessionState<C> {
    pub timeline: GameTimeline,
    pub sync: PositionSync<C>,
    pub engine_rx: Option<mpsc::Receiver<EngineEvent>>,
}

impl<C: EngineChannel> SessionState<C> {
    pub fn new(
        timeline: GameTimeline,
        sync: PositionSync<C>,
        engine_rx: Option<mpsc::Receiver<EngineEvent>>,
    ) -> Self {
        Self {
            timeline,
            sync,
            engine_rx,
        }
    }

    /// Wait for the next engine event. Never resolves once the engine is gone.
    pub async fn next_engine_event(&mut self) -> Option<EngineEvent> {
        let Some(rx) = self.engine_rx.as_mut() else {
            return std::future::pending().await;
        };
        match rx.recv().await {
            Some(event) => Some(event),
            None => {
                tracing::debug!("Engine event stream closed");
                self.engine_rx = None;
                std::future::pending().await
            }
        }
    }

    pub fn current_position(&self) -> &Position {
        self.timeline.current_position()
    }

    pub fn navigate(&mut self, nav: Navigation) -> Result<(), SessionError> {
        match nav {
            Navigation::Forward => {
                if !self.timeline.step_forward() {
                    return Err(SessionError::AtEnd);
                }
            }
            Navigation::Backward => {
                if !self.timeline.step_backward() {
                    return Err(SessionError::AtStart);
                }
            }
            Navigation::Start => self.timeline.jump_to_start(),
            Navigation::End => self.timeline.jump_to_end(),
            Navigation::Jump(index) => self.timeline.jump_to(index),
        }
        Ok(())
    }

    pub fn make_move(&mut self, notation: &str) -> Result<(), SessionError> {
        let played = self.timeline.apply_move(notation)?;
        tracing::debug!(ply = played.ply, san = %played.san, "Move played");
        Ok(())
    }

    pub fn load_moves(&mut self, moves: &[String]) -> Result<(), SessionError> {
        self.timeline.load_from_move_list(moves)?;
        Ok(())
    }

    pub fn reset(&mut self, fen: Option<&str>) -> Result<(), SessionError> {
        match fen {
            Some(fen) => {
                self.timeline = GameTimeline::from_fen(fen)
                    .map_err(|e| SessionError::InvalidFen(e.to_string()))?;
            }
            None => self.timeline.reset(),
        }
        Ok(())
    }

    /// Tell the analysis side that the viewed position may have changed.
    pub fn sync_position(&mut self, now: Instant) {
        let position = self.timeline.current_position().clone();
        let outcome = self.sync.position_changed(&position, now);
        tracing::trace!(?outcome, fen = %position, "Position synced");
    }

    pub fn set_analysis(&mut self, enabled: bool, now: Instant) -> Result<(), SessionError> {
        if enabled && !self.sync.is_available() {
            return Err(SessionError::EngineUnavailable);
        }
        let position = self.timeline.current_position().clone();
        self.sync.set_enabled(enabled, &position, now);
        Ok(())
    }

    pub fn set_line_count(&mut self, count: u8, now: Instant) {
        let position = self.timeline.current_position().clone();
        self.sync.set_line_count(count, &position, now);
    }

    pub fn ingest(&mut self, line: &str) -> IngestOutcome {
        self.sync.ingest(line)
    }

    /// True when engine output currently describes the viewed position.
    pub fn analysing_current(&self) -> bool {
        self.sync.adapter().active_fingerprint()
            == Some(self.timeline.current_position().fingerprint())
    }

    pub fn analysis_view(&self) -> AnalysisView {
        let fen = self.timeline.current_position().fingerprint();
        let record = self.sync.adapter().record(fen);
        AnalysisView {
            enabled: self.sync.is_enabled(),
            engine_available: self.sync.is_available(),
            line_count: self.sync.config().line_count,
            depth: record.map(|r| r.depth).unwrap_or(0),
            complete: record.is_some_and(|r| r.complete),
            lines: self.sync.current_lines(fen),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            timeline: self.timeline.snapshot(),
            analysis: self.analysis_view(),
        }
    }
}
