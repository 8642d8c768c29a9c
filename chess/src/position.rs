use cozy_chess::Board;

use crate::fen::{format_fen, parse_fen, FenError};
use crate::types::Side;

/// An immutable board position identified by its FEN fingerprint.
///
/// Two positions are equal exactly when their fingerprints are equal.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
    fingerprint: String,
}

impl Position {
    /// The standard starting position.
    pub fn startpos() -> Self {
        Self::from_board(Board::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_board(parse_fen(fen)?))
    }

    pub(crate) fn from_board(board: Board) -> Self {
        let fingerprint = format_fen(&board);
        Self { board, fingerprint }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Canonical FEN of this position.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn side_to_move(&self) -> Side {
        Side::from(self.board.side_to_move())
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for Position {}

impl std::hash::Hash for Position {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.fingerprint.hash(state);
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fingerprint)
    }
}
