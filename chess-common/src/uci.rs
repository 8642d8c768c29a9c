//! Compact UCI move encoding (file+rank+file+rank[+promotion]).
//!
//! These helpers only deal with text. Castling is encoded here exactly as it
//! appears on the wire; translating between the UCI king-two-squares form and
//! cozy-chess's king-takes-rook form needs a board and lives in `chess::uci`.

use cozy_chess::{Move, Piece};

use crate::converters::{format_piece, format_square, parse_piece, parse_square};

/// Parse a compact UCI move ("e2e4", "e7e8q").
pub fn parse_uci_move(s: &str) -> Option<Move> {
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return None;
    }

    let from = parse_square(&s[0..2])?;
    let to = parse_square(&s[2..4])?;

    let promotion = match s[4..].chars().next() {
        Some(c) => match parse_piece(c)? {
            piece @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen) => Some(piece),
            _ => return None,
        },
        None => None,
    };

    Some(Move {
        from,
        to,
        promotion,
    })
}

/// Format a move in compact UCI notation.
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::{File, Rank, Square};

    #[test]
    fn test_parse_plain_move() {
        let mv = parse_uci_move("e2e4").unwrap();
        assert_eq!(mv.from, Square::new(File::E, Rank::Second));
        assert_eq!(mv.to, Square::new(File::E, Rank::Fourth));
        assert_eq!(mv.promotion, None);
    }

    #[test]
    fn test_parse_promotion() {
        let mv = parse_uci_move("e7e8q").unwrap();
        assert_eq!(mv.promotion, Some(Piece::Queen));
        assert_eq!(format_uci_move(mv), "e7e8q");
    }

    #[test]
    fn test_parse_rejects_bad_tokens() {
        assert!(parse_uci_move("e2").is_none());
        assert!(parse_uci_move("e7e8k").is_none());
        assert!(parse_uci_move("e2e4e5").is_none());
        assert!(parse_uci_move("(none)").is_none());
        assert!(parse_uci_move("é2e4").is_none());
    }
}
