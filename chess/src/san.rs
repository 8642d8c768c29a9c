//! Standard Algebraic Notation for legal moves.

use cozy_chess::{Board, GameStatus, Move, Piece};

use crate::converters::{file_to_char, format_piece_upper, format_square, rank_to_char};

/// Format a legal move of `board` as SAN, including check and mate suffixes.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = format_san_body(board, mv);

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if after.status() == GameStatus::Won {
            '#'
        } else {
            '+'
        });
    }

    san
}

/// SAN without the check suffix.
fn format_san_body(board: &Board, mv: Move) -> String {
    let side = board.side_to_move();
    let Some(piece) = board.piece_on(mv.from) else {
        return format_square(mv.from) + &format_square(mv.to);
    };

    // cozy-chess encodes castling as the king capturing its own rook
    if piece == Piece::King && board.color_on(mv.to) == Some(side) {
        return if mv.to.file() as u8 > mv.from.file() as u8 {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let is_capture = board.piece_on(mv.to).is_some()
        || (piece == Piece::Pawn && mv.from.file() != mv.to.file());
    let mut san = String::new();

    if piece == Piece::Pawn {
        if is_capture {
            san.push(file_to_char(mv.from.file()));
        }
    } else {
        san.push(format_piece_upper(piece));
        san.push_str(&disambiguation(board, mv, piece));
    }

    if is_capture {
        san.push('x');
    }
    san.push_str(&format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(format_piece_upper(promo));
    }

    san
}

/// File, rank, or full square needed to tell `mv` apart from other moves
/// of the same piece type landing on the same square.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let mut rivals = Vec::new();
    board.generate_moves(|mvs| {
        if mvs.piece == piece {
            rivals.extend(mvs.into_iter().filter(|m| m.to == mv.to && m.from != mv.from));
        }
        false
    });

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|m| m.from.file() != mv.from.file()) {
        return file_to_char(mv.from.file()).to_string();
    }
    if rivals.iter().all(|m| m.from.rank() != mv.from.rank()) {
        return rank_to_char(mv.from.rank()).to_string();
    }
    format_square(mv.from)
}

/// Parse a SAN move against the legal moves of `board`.
///
/// Check/mate suffixes and annotation glyphs are ignored; `0-0` is accepted
/// for castling and the `=` before a promotion piece is optional.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let wanted = normalize(san);
    if wanted.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let mut matches = Vec::new();
    board.generate_moves(|mvs| {
        for mv in mvs {
            if normalize(&format_san_body(board, mv)) == wanted {
                matches.push(mv);
            }
        }
        false
    });

    match matches.as_slice() {
        [mv] => Ok(*mv),
        [] => Err(SanError::NoLegalMove(san.to_string())),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

fn normalize(san: &str) -> String {
    san.trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .replace('0', "O")
        .replace('=', "")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
