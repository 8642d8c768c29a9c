use crate::{EngineInfo, Score, UciError};
use cozy_chess::Move;

/// Incoming message from UCI engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciMessage {
    Id { name: String, value: String },
    UciOk,
    ReadyOk,
    /// `mv` is `None` for `bestmove (none)`, sent when the position has no
    /// legal moves.
    BestMove { mv: Option<Move>, ponder: Option<Move> },
    Info(EngineInfo),
}

/// Parse a UCI message line
pub fn parse_uci_message(line: &str) -> Result<UciMessage, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        Some(&"uciok") => Ok(UciMessage::UciOk),
        Some(&"readyok") => Ok(UciMessage::ReadyOk),

        Some(&"id") => {
            if tokens.len() < 3 {
                return Err(UciError::MalformedMessage(line.to_string()));
            }
            let name = tokens[1].to_string();
            let value = tokens[2..].join(" ");
            Ok(UciMessage::Id { name, value })
        }

        Some(&"bestmove") => {
            let Some(&token) = tokens.get(1) else {
                return Err(UciError::MalformedMessage(line.to_string()));
            };
            let mv = match token {
                "(none)" | "0000" => None,
                _ => Some(parse_uci_move(token)?),
            };
            let ponder = if tokens.len() >= 4 && tokens[2] == "ponder" {
                parse_uci_move(tokens[3]).ok()
            } else {
                None
            };
            Ok(UciMessage::BestMove { mv, ponder })
        }

        Some(&"info") => Ok(UciMessage::Info(parse_info_line(line, &tokens[1..])?)),

        _ => Err(UciError::UnknownMessage(line.to_string())),
    }
}

/// Parse an "info" line from the engine
fn parse_info_line(line: &str, tokens: &[&str]) -> Result<EngineInfo, UciError> {
    let mut info = EngineInfo::default();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                info.depth = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "score" => {
                // cp and mate are mutually exclusive within one report
                if info.score.is_some() {
                    return Err(UciError::MalformedMessage(line.to_string()));
                }
                i += 1;
                if let Some(&score_type) = tokens.get(i) {
                    i += 1;
                    if let Some(value_str) = tokens.get(i) {
                        info.score = match score_type {
                            "cp" => value_str.parse().ok().map(Score::Centipawns),
                            "mate" => value_str.parse().ok().map(Score::Mate),
                            _ => None,
                        };
                    }
                }
            }
            "pv" => {
                // Collect moves until the next keyword. A token that is not a
                // move ends the variation; anything after it is unusable.
                i += 1;
                let mut valid = true;
                while i < tokens.len() && !is_keyword(tokens[i]) {
                    if valid {
                        match parse_uci_move(tokens[i]) {
                            Ok(mv) => info.pv.push(mv),
                            Err(_) => valid = false,
                        }
                    }
                    i += 1;
                }
                continue; // Don't increment i again
            }
            "multipv" => {
                i += 1;
                info.multipv = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "string" => {
                // Free text runs to the end of the line
                break;
            }
            _ => {
                // Statistics, bound markers and their values are not used
            }
        }
        i += 1;
    }

    Ok(info)
}

fn is_keyword(token: &str) -> bool {
    matches!(
        token,
        "depth"
            | "seldepth"
            | "time"
            | "nodes"
            | "score"
            | "pv"
            | "multipv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "nps"
            | "tbhits"
            | "sbhits"
            | "cpuload"
            | "string"
            | "refutation"
            | "currline"
            | "lowerbound"
            | "upperbound"
            | "wdl"
    )
}

/// Parse UCI move format (e2e4, e7e8q)
pub fn parse_uci_move(s: &str) -> Result<Move, UciError> {
    chess_common::parse_uci_move(s).ok_or_else(|| UciError::InvalidMove(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_common::format_uci_move;

    fn info(line: &str) -> EngineInfo {
        match parse_uci_message(line).unwrap() {
            UciMessage::Info(info) => info,
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_parse_bestmove() {
        let msg = parse_uci_message("bestmove e2e4 ponder e7e5").unwrap();
        match msg {
            UciMessage::BestMove { mv, ponder } => {
                assert_eq!(format_uci_move(mv.unwrap()), "e2e4");
                assert_eq!(format_uci_move(ponder.unwrap()), "e7e5");
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_parse_bestmove_none() {
        let msg = parse_uci_message("bestmove (none)").unwrap();
        assert_eq!(
            msg,
            UciMessage::BestMove {
                mv: None,
                ponder: None
            }
        );
    }

    #[test]
    fn test_parse_info() {
        let info = info("info depth 12 score cp 35 nodes 15234 pv e2e4 e7e5");
        assert_eq!(info.depth, Some(12));
        assert_eq!(info.score, Some(Score::Centipawns(35)));
        assert_eq!(info.multipv, None);
        assert_eq!(info.pv.len(), 2);
    }

    #[test]
    fn test_parse_multipv_info_any_order() {
        let info = info(
            "info multipv 2 score mate -3 depth 18 seldepth 24 nps 900000 pv g1f3 d7d5 time 40",
        );
        assert_eq!(info.multipv, Some(2));
        assert_eq!(info.depth, Some(18));
        assert_eq!(info.score, Some(Score::Mate(-3)));
        assert_eq!(info.pv.len(), 2);
    }

    #[test]
    fn test_pv_stops_at_garbage() {
        let info = info("info depth 5 multipv 1 score cp 10 pv e2e4 e7e5 zz9 g1f3");
        let pv: Vec<String> = info.pv.iter().map(|m| format_uci_move(*m)).collect();
        assert_eq!(pv, vec!["e2e4", "e7e5"]);
    }

    #[test]
    fn test_bound_markers_are_skipped() {
        let info = info("info depth 20 multipv 1 score cp 18 upperbound nodes 10 pv d2d4");
        assert_eq!(info.score, Some(Score::Centipawns(18)));
        assert_eq!(info.pv.len(), 1);
    }

    #[test]
    fn test_extreme_score_values_parse() {
        let info = info("info depth 5 multipv 1 score cp -2147483648 pv c7c5");
        assert_eq!(info.score, Some(Score::Centipawns(i32::MIN)));
        let info = self::info("info depth 5 multipv 1 score cp 99999999999 pv c7c5");
        assert_eq!(info.score, None);
    }

    #[test]
    fn test_two_scores_is_malformed() {
        assert!(matches!(
            parse_uci_message("info depth 3 score cp 10 score mate 2 pv e2e4"),
            Err(UciError::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_info_string_is_free_text() {
        let info = info("info string NNUE evaluation using nn-abc.nnue depth 99");
        assert_eq!(info.depth, None);
    }

    #[test]
    fn test_unknown_lines() {
        assert!(matches!(
            parse_uci_message("Stockfish 16 by the Stockfish developers"),
            Err(UciError::UnknownMessage(_))
        ));
        assert!(parse_uci_message("").is_err());
        assert_eq!(parse_uci_message("readyok").unwrap(), UciMessage::ReadyOk);
    }
}
