//! Engine evaluation scores oriented to the white player.

use chess::Side;
use engine::Score;
use serde::{Deserialize, Serialize};

/// Engine evaluation score, always from white's point of view.
///
/// Centipawns: positive = white is better.
/// Mate: positive N = white mates in N moves,
/// negative N = black mates in N moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AnalysisScore {
    #[serde(rename = "cp")]
    Centipawns(i32),
    Mate(i32),
}

impl AnalysisScore {
    /// Re-orient a wire score (side-to-move relative) so that positive
    /// favours white. `None` when the value has no white-relative form.
    pub fn from_wire(score: Score, mover: Side) -> Option<Self> {
        let relative = match score {
            Score::Centipawns(cp) => Self::Centipawns(cp),
            Score::Mate(m) => Self::Mate(m),
        };
        match mover {
            Side::White => Some(relative),
            Side::Black => relative.negate(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Centipawns(cp) => format!("{:+.2}", *cp as f64 / 100.0),
            Self::Mate(m) => {
                if *m >= 0 {
                    format!("+M{}", m)
                } else {
                    format!("-M{}", m.unsigned_abs())
                }
            }
        }
    }

    /// Flip perspective. `None` if the value cannot be negated.
    pub fn negate(&self) -> Option<Self> {
        match self {
            Self::Centipawns(cp) => cp.checked_neg().map(Self::Centipawns),
            Self::Mate(m) => m.checked_neg().map(Self::Mate),
        }
    }
}

impl std::fmt::Display for AnalysisScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
