//! Turns engine report lines into ranked analysis for the active position.

use chess::{CozyRules, MoveSpec, Position, RulesEngine};
use engine::{parse_uci_message, EngineInfo, UciMessage};

use crate::cache::AnalysisCache;
use crate::record::{AnalysisLine, AnalysisRecord};
use crate::score::AnalysisScore;

/// What a single ingested line did to the analysis state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A ranked line of the active position was written.
    Updated { rank: usize },
    /// The engine finished searching the active position.
    Completed,
    /// Nothing changed.
    Ignored,
}

#[derive(Debug, Clone)]
struct ActiveSearch {
    position: Position,
    line_count: u8,
    target_depth: u8,
    /// `bestmove` already received, so stopping owes nothing.
    finished: bool,
}

/// Maintains multi-PV rankings keyed by position fingerprint.
///
/// Only the position marked active by [`begin_search`](Self::begin_search)
/// accepts reports. Everything the engine says about any other position is
/// dropped, since the engine keeps talking for a while after `stop`.
#[derive(Debug)]
pub struct AnalysisAdapter<R = CozyRules> {
    rules: R,
    cache: AnalysisCache,
    active: Option<ActiveSearch>,
    /// `bestmove` lines still owed by stopped searches.
    stale_bestmoves: usize,
}

impl AnalysisAdapter<CozyRules> {
    pub fn new(cache_capacity: usize) -> Self {
        Self::with_rules(CozyRules, cache_capacity)
    }
}

impl Default for AnalysisAdapter<CozyRules> {
    fn default() -> Self {
        Self::with_rules(CozyRules, crate::cache::DEFAULT_CAPACITY)
    }
}

impl<R: RulesEngine> AnalysisAdapter<R> {
    pub fn with_rules(rules: R, cache_capacity: usize) -> Self {
        Self {
            rules,
            cache: AnalysisCache::new(cache_capacity),
            active: None,
            stale_bestmoves: 0,
        }
    }

    /// Mark `position` as the one under search. Sends nothing.
    ///
    /// A still-running search is cancelled first.
    pub fn begin_search(&mut self, position: Position, line_count: u8, target_depth: u8) {
        if self.active.is_some() {
            self.cancel_search();
        }

        let line_count = line_count.max(1);
        let fen = position.fingerprint().to_string();
        let record = self.cache.get_or_insert(&fen);
        record.complete = false;
        record.truncate(line_count as usize);
        self.cache.touch(&fen);
        self.cache.evict(Some(&fen));

        tracing::debug!(fen = %fen, line_count, target_depth, "Search started");
        self.active = Some(ActiveSearch {
            position,
            line_count,
            target_depth,
            finished: false,
        });
    }

    /// Forget the active position. Later reports are ignored until the
    /// next [`begin_search`](Self::begin_search).
    pub fn cancel_search(&mut self) {
        if let Some(active) = self.active.take() {
            if !active.finished {
                self.stale_bestmoves += 1;
            }
            tracing::debug!(fen = %active.position.fingerprint(), "Search cancelled");
        }
    }

    /// Feed one raw line from the engine.
    pub fn ingest(&mut self, raw: &str) -> IngestOutcome {
        let message = match parse_uci_message(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::trace!("Dropping engine line: {}", e);
                return IngestOutcome::Ignored;
            }
        };

        match message {
            UciMessage::Info(info) => self.ingest_info(info),
            UciMessage::BestMove { .. } => self.ingest_bestmove(),
            _ => IngestOutcome::Ignored,
        }
    }

    fn ingest_bestmove(&mut self) -> IngestOutcome {
        if self.stale_bestmoves > 0 {
            self.stale_bestmoves -= 1;
            tracing::trace!("Swallowed bestmove of a stopped search");
            return IngestOutcome::Ignored;
        }

        let Some(active) = self.active.as_mut() else {
            return IngestOutcome::Ignored;
        };
        if active.finished {
            return IngestOutcome::Ignored;
        }
        active.finished = true;

        let fen = active.position.fingerprint().to_string();
        self.cache.get_or_insert(&fen).complete = true;
        tracing::debug!(fen = %fen, "Search complete");
        IngestOutcome::Completed
    }

    fn ingest_info(&mut self, info: EngineInfo) -> IngestOutcome {
        let Some(active) = self.active.as_ref() else {
            return IngestOutcome::Ignored;
        };

        // Wire ranks are 1-based
        let Some(rank) = info.multipv.and_then(|r| (r as usize).checked_sub(1)) else {
            return IngestOutcome::Ignored;
        };
        if rank >= active.line_count as usize {
            tracing::trace!(rank, "Dropping rank beyond line count");
            return IngestOutcome::Ignored;
        }
        let Some(depth) = info.depth else {
            return IngestOutcome::Ignored;
        };
        let Some(score) = info.score else {
            return IngestOutcome::Ignored;
        };
        let Some(score) = AnalysisScore::from_wire(score, active.position.side_to_move()) else {
            tracing::trace!(rank, "Dropping score out of range");
            return IngestOutcome::Ignored;
        };

        let mut moves = Vec::with_capacity(info.pv.len());
        let mut san = Vec::with_capacity(info.pv.len());
        let mut position = active.position.clone();
        for mv in info.pv {
            match self.rules.apply_move(&position, &MoveSpec::from(mv)) {
                Ok(applied) => {
                    moves.push(applied.uci);
                    san.push(applied.san);
                    position = applied.position;
                }
                Err(e) => {
                    tracing::trace!(rank, "Truncating variation: {}", e);
                    break;
                }
            }
        }
        if moves.is_empty() {
            return IngestOutcome::Ignored;
        }

        let fen = active.position.fingerprint().to_string();
        let record = self.cache.get_or_insert(&fen);
        let written = record.write(AnalysisLine {
            rank,
            score,
            moves,
            san,
            depth: depth as u32,
        });

        if written {
            IngestOutcome::Updated { rank }
        } else {
            tracing::trace!(rank, "Dropping rank that would leave a gap");
            IngestOutcome::Ignored
        }
    }

    /// Ranked lines known for `fingerprint`, best first. Empty if unknown.
    pub fn current_lines(&self, fingerprint: &str) -> Vec<AnalysisLine> {
        self.cache
            .get(fingerprint)
            .map(|record| record.lines().to_vec())
            .unwrap_or_default()
    }

    pub fn record(&self, fingerprint: &str) -> Option<&AnalysisRecord> {
        self.cache.get(fingerprint)
    }

    pub fn active_fingerprint(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.position.fingerprint())
    }

    /// Depth the active search was asked to reach.
    pub fn target_depth(&self) -> Option<u8> {
        self.active.as_ref().map(|a| a.target_depth)
    }

    pub fn is_searching(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.finished)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
