//! UCI (Universal Chess Interface) castling conversions

use cozy_chess::{Board, File, Move, Rank, Square};

use crate::format_uci_move;

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// The converted move is only returned if it appears in `legal_moves`;
/// otherwise the input is returned unchanged.
pub fn convert_uci_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_back_rank = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let is_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_back_rank && is_e_file && is_g_or_c_file && mv.promotion.is_none() {
        let rook_file = match mv.to.file() {
            File::G => File::H,
            _ => File::A,
        };
        let converted = Move {
            from: mv.from,
            to: Square::new(rook_file, mv.from.rank()),
            promotion: None,
        };

        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Convert a cozy_chess castling move (king takes own rook) back to the
/// king-two-squares form engines and humans expect.
///
/// `board` is the position *before* the move. Non-castling moves are returned
/// unchanged.
pub fn convert_cozy_castling_to_uci(mv: Move, board: &Board) -> Move {
    let side = board.side_to_move();
    let is_castle = board.king(side) == mv.from && board.color_on(mv.to) == Some(side);
    if !is_castle {
        return mv;
    }

    let king_file = if mv.to.file() as u8 > mv.from.file() as u8 {
        File::G
    } else {
        File::C
    };
    Move {
        from: mv.from,
        to: Square::new(king_file, mv.from.rank()),
        promotion: None,
    }
}

/// Format a legal move of `board` in standard UCI text.
pub fn to_uci_string(mv: Move, board: &Board) -> String {
    format_uci_move(convert_cozy_castling_to_uci(mv, board))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASTLE_READY: &str = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";

    fn legal(board: &Board) -> Vec<Move> {
        let mut moves = Vec::new();
        board.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    fn mv(from: (File, Rank), to: (File, Rank)) -> Move {
        Move {
            from: Square::new(from.0, from.1),
            to: Square::new(to.0, to.1),
            promotion: None,
        }
    }

    #[test]
    fn test_uci_kingside_castle_converts() {
        let board: Board = CASTLE_READY.parse().unwrap();
        let uci = mv((File::E, Rank::First), (File::G, Rank::First));
        let cozy = convert_uci_castling_to_cozy(uci, &legal(&board));
        assert_eq!(cozy, mv((File::E, Rank::First), (File::H, Rank::First)));
    }

    #[test]
    fn test_cozy_castle_formats_as_uci() {
        let board: Board = CASTLE_READY.parse().unwrap();
        let cozy = mv((File::E, Rank::First), (File::A, Rank::First));
        assert_eq!(to_uci_string(cozy, &board), "e1c1");
    }

    #[test]
    fn test_plain_king_move_untouched() {
        let board: Board = CASTLE_READY.parse().unwrap();
        let step = mv((File::E, Rank::First), (File::F, Rank::First));
        assert_eq!(convert_cozy_castling_to_uci(step, &board), step);
        assert_eq!(convert_uci_castling_to_cozy(step, &legal(&board)), step);
    }
}
