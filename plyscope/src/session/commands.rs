use chess::{LoadError, RejectedMove};
use tokio::sync::{broadcast, oneshot};

use super::events::SessionEvent;
use super::snapshot::SessionSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    IllegalMove(#[from] RejectedMove),
    #[error("Move {} could not be played: {}", .index + 1, .reason)]
    LoadFailed { index: usize, reason: RejectedMove },
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
    #[error("Already at the initial position")]
    AtStart,
    #[error("Already at the last move")]
    AtEnd,
    #[error("No engine available")]
    EngineUnavailable,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LoadError> for SessionError {
    fn from(e: LoadError) -> Self {
        Self::LoadFailed {
            index: e.index,
            reason: e.reason,
        }
    }
}

/// Cursor movements over the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Forward,
    Backward,
    Start,
    End,
    /// Cursor index: -1 is the initial position.
    Jump(isize),
}

pub type SnapshotReply = oneshot::Sender<Result<SessionSnapshot, SessionError>>;

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
pub enum SessionCommand {
    Navigate {
        nav: Navigation,
        reply: SnapshotReply,
    },
    MakeMove {
        notation: String,
        reply: SnapshotReply,
    },
    LoadMoves {
        moves: Vec<String>,
        reply: SnapshotReply,
    },
    Reset {
        fen: Option<String>,
        reply: SnapshotReply,
    },
    SetLineCount {
        count: u8,
        reply: SnapshotReply,
    },
    SetAnalysis {
        enabled: bool,
        reply: SnapshotReply,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
