use analysis::AnalysisLine;
use serde::Serialize;

use super::snapshot::SessionSnapshot;

/// Events broadcast from the session actor to all subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[allow(clippy::large_enum_variant)]
pub enum SessionEvent {
    /// Full state snapshot after any mutation.
    StateChanged(SessionSnapshot),
    /// New engine lines for the position being viewed.
    LinesUpdated {
        fen: String,
        depth: u32,
        lines: Vec<AnalysisLine>,
    },
    /// The engine reached its target for the position being viewed.
    AnalysisComplete { fen: String, depth: u32 },
    /// Error notification.
    Error { message: String },
}
