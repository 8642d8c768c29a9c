use analysis::AnalysisLine;
use chess::TimelineSnapshot;
use serde::Serialize;

/// Complete, immutable snapshot of session state.
/// Sent to clients on every state change and on subscribe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub timeline: TimelineSnapshot,
    pub analysis: AnalysisView,
}

/// Analysis state of the current position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    pub enabled: bool,
    pub engine_available: bool,
    pub line_count: u8,
    pub depth: u32,
    pub complete: bool,
    pub lines: Vec<AnalysisLine>,
}
