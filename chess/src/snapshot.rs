//! Read-only view of a timeline for external rendering.

use serde::{Deserialize, Serialize};

use crate::types::Side;

/// One played move as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 0-based; white's first move is ply 0.
    pub ply: usize,
    pub san: String,
    pub uci: String,
    pub fen_after: String,
}

/// Full timeline state: every move (including future moves kept for redo),
/// the cursor and the current position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub start_fen: String,
    pub moves: Vec<MoveRecord>,
    /// -1 is the initial position, otherwise the index of the last applied move.
    pub cursor: isize,
    pub fen: String,
    pub side_to_move: Side,
}

impl TimelineSnapshot {
    /// The move that produced the current position, if any.
    pub fn last_move(&self) -> Option<&MoveRecord> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|i| self.moves.get(i))
    }
}
