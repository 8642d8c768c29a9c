//! The rules seam: legality, move application and position identity.
//!
//! Everything else in the workspace asks a [`RulesEngine`] whether a move is
//! legal and what position it produces; nothing replays moves on a raw
//! board itself.

use cozy_chess::{Move, Piece, Square};

use crate::fen::FenError;
use crate::position::Position;
use crate::san::{format_san, parse_san, SanError};
use crate::uci::{convert_uci_castling_to_cozy, to_uci_string};
use crate::{format_uci_move, parse_uci_move};

/// A move as supplied by a caller: a square triple (drag-and-drop, engine PV)
/// or a notation string (UCI or SAN).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveSpec {
    Squares {
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    },
    Notation(String),
}

impl MoveSpec {
    pub fn notation(s: impl Into<String>) -> Self {
        Self::Notation(s.into())
    }
}

impl From<Move> for MoveSpec {
    fn from(mv: Move) -> Self {
        Self::Squares {
            from: mv.from,
            to: mv.to,
            promotion: mv.promotion,
        }
    }
}

impl From<&str> for MoveSpec {
    fn from(s: &str) -> Self {
        Self::Notation(s.to_string())
    }
}

impl From<String> for MoveSpec {
    fn from(s: String) -> Self {
        Self::Notation(s)
    }
}

impl std::fmt::Display for MoveSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squares {
                from,
                to,
                promotion,
            } => f.write_str(&format_uci_move(Move {
                from: *from,
                to: *to,
                promotion: *promotion,
            })),
            Self::Notation(s) => f.write_str(s),
        }
    }
}

/// Result of successfully applying a move.
#[derive(Debug, Clone)]
pub struct AppliedMove {
    /// The move in cozy-chess encoding (castling as king-takes-rook).
    pub mv: Move,
    /// Standard UCI text (castling as king-two-squares).
    pub uci: String,
    pub san: String,
    pub position: Position,
}

/// A move that the rules refused. The position it was tried against is
/// never modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectedMove {
    #[error("Illegal move: {0}")]
    Illegal(String),
    #[error("Unrecognised move notation: {0}")]
    Unrecognised(String),
    #[error("Ambiguous move: {0}")]
    Ambiguous(String),
}

impl From<SanError> for RejectedMove {
    fn from(e: SanError) -> Self {
        match e {
            SanError::NoLegalMove(s) => Self::Illegal(s),
            SanError::AmbiguousMove(s) => Self::Ambiguous(s),
            SanError::InvalidFormat(s) => Self::Unrecognised(s),
        }
    }
}

/// Authority on chess legality and position identity.
pub trait RulesEngine {
    fn start_position(&self) -> Position;

    fn position_from_fen(&self, fen: &str) -> Result<Position, FenError>;

    fn legal_moves(&self, position: &Position) -> Vec<Move>;

    fn apply_move(
        &self,
        position: &Position,
        spec: &MoveSpec,
    ) -> Result<AppliedMove, RejectedMove>;

    fn fingerprint(&self, position: &Position) -> String {
        position.fingerprint().to_string()
    }
}

/// [`RulesEngine`] backed by cozy-chess.
#[derive(Debug, Clone, Copy, Default)]
pub struct CozyRules;

impl CozyRules {
    fn resolve(&self, position: &Position, spec: &MoveSpec) -> Result<Move, RejectedMove> {
        let legal = self.legal_moves(position);

        let candidate = match spec {
            MoveSpec::Squares {
                from,
                to,
                promotion,
            } => Move {
                from: *from,
                to: *to,
                promotion: *promotion,
            },
            MoveSpec::Notation(text) => match parse_uci_move(text.trim()) {
                Some(mv) => mv,
                None => return Ok(parse_san(position.board(), text)?),
            },
        };

        if legal.contains(&candidate) {
            return Ok(candidate);
        }

        let converted = convert_uci_castling_to_cozy(candidate, &legal);
        if legal.contains(&converted) {
            return Ok(converted);
        }

        Err(RejectedMove::Illegal(spec.to_string()))
    }
}

impl RulesEngine for CozyRules {
    fn start_position(&self) -> Position {
        Position::startpos()
    }

    fn position_from_fen(&self, fen: &str) -> Result<Position, FenError> {
        Position::from_fen(fen)
    }

    fn legal_moves(&self, position: &Position) -> Vec<Move> {
        let mut moves = Vec::new();
        position.board().generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    fn apply_move(
        &self,
        position: &Position,
        spec: &MoveSpec,
    ) -> Result<AppliedMove, RejectedMove> {
        let mv = self.resolve(position, spec)?;
        let board = position.board();

        let san = format_san(board, mv);
        let uci = to_uci_string(mv, board);

        let mut next = board.clone();
        next.play_unchecked(mv);

        Ok(AppliedMove {
            mv,
            uci,
            san,
            position: Position::from_board(next),
        })
    }
}
