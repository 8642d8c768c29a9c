use serde::{Deserialize, Serialize};

use crate::score::AnalysisScore;

/// One ranked candidate continuation for a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisLine {
    /// 0 = best.
    pub rank: usize,
    pub score: AnalysisScore,
    /// Validated principal variation in UCI encoding.
    pub moves: Vec<String>,
    /// The same variation in SAN, move for move.
    pub san: Vec<String>,
    /// Depth of the report that last wrote this line.
    pub depth: u32,
}

/// Everything known about one position's analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub fingerprint: String,
    /// Always a gap-free run starting at rank 0.
    lines: Vec<AnalysisLine>,
    /// Deepest report seen for this position, across all ranks.
    pub depth: u32,
    /// Set once the engine reported `bestmove` for a search of this position.
    pub complete: bool,
}

impl AnalysisRecord {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            lines: Vec::new(),
            depth: 0,
            complete: false,
        }
    }

    /// Ranked lines, best first, contiguous from rank 0.
    pub fn lines(&self) -> &[AnalysisLine] {
        &self.lines
    }

    /// Store `line` at its rank and raise the record depth.
    ///
    /// A line whose rank would leave a hole below it is dropped (returns
    /// false); it will be written again by a later report once the ranks
    /// above it exist.
    pub fn write(&mut self, line: AnalysisLine) -> bool {
        self.depth = self.depth.max(line.depth);

        let rank = line.rank;
        match rank.cmp(&self.lines.len()) {
            std::cmp::Ordering::Less => {
                self.lines[rank] = line;
                true
            }
            std::cmp::Ordering::Equal => {
                self.lines.push(line);
                true
            }
            std::cmp::Ordering::Greater => false,
        }
    }

    /// Drop ranks at or beyond `line_count`.
    pub fn truncate(&mut self, line_count: usize) {
        self.lines.truncate(line_count);
    }

    pub fn best(&self) -> Option<&AnalysisLine> {
        self.lines.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(rank: usize, depth: u32, cp: i32) -> AnalysisLine {
        AnalysisLine {
            rank,
            score: AnalysisScore::Centipawns(cp),
            moves: vec!["e2e4".to_string()],
            san: vec!["e4".to_string()],
            depth,
        }
    }

    #[test]
    fn test_in_order_ranks_fill() {
        let mut record = AnalysisRecord::new("fen");
        assert!(record.write(line(0, 5, 20)));
        assert!(record.write(line(1, 5, 10)));
        assert_eq!(record.lines().len(), 2);
        assert_eq!(record.best().unwrap().score, AnalysisScore::Centipawns(20));
    }

    #[test]
    fn test_gap_is_never_stored() {
        let mut record = AnalysisRecord::new("fen");
        assert!(!record.write(line(2, 7, 0)));
        assert!(record.lines().is_empty());
        // The dropped report still counts toward depth
        assert_eq!(record.depth, 7);

        record.write(line(0, 8, 0));
        assert!(!record.write(line(2, 8, 0)));
        assert_eq!(record.lines().len(), 1);
    }

    #[test]
    fn test_overwrite_keeps_max_depth() {
        let mut record = AnalysisRecord::new("fen");
        record.write(line(0, 12, 30));
        record.write(line(0, 9, 40));
        assert_eq!(record.lines()[0].depth, 9);
        assert_eq!(record.lines()[0].score, AnalysisScore::Centipawns(40));
        assert_eq!(record.depth, 12);
    }
}
