//! The authoritative game timeline and its cursor.

use cozy_chess::Move;

use crate::fen::FenError;
use crate::position::Position;
use crate::rules::{AppliedMove, CozyRules, MoveSpec, RejectedMove, RulesEngine};
use crate::snapshot::{MoveRecord, TimelineSnapshot};

/// A half-move that has been played into the timeline.
#[derive(Debug, Clone)]
pub struct TimelineMove {
    pub ply: usize,
    pub mv: Move,
    pub uci: String,
    pub san: String,
    /// Position after this move.
    pub position: Position,
}

impl TimelineMove {
    fn new(ply: usize, applied: AppliedMove) -> Self {
        Self {
            ply,
            mv: applied.mv,
            uci: applied.uci,
            san: applied.san,
            position: applied.position,
        }
    }

    pub fn fingerprint(&self) -> &str {
        self.position.fingerprint()
    }

    fn to_record(&self) -> MoveRecord {
        MoveRecord {
            ply: self.ply,
            san: self.san.clone(),
            uci: self.uci.clone(),
            fen_after: self.position.fingerprint().to_string(),
        }
    }
}

/// An externally supplied move list failed to replay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Move {index} could not be replayed: {reason}")]
pub struct LoadError {
    pub index: usize,
    pub reason: RejectedMove,
}

/// Linear sequence of played moves plus a cursor into it.
///
/// The cursor is exposed as `-1` for the initial position and `i` for "move
/// `i` is the last one applied". Internally it is stored as the number of
/// applied moves, so `0 <= applied <= moves.len()` always holds. Moves past
/// the cursor are kept for redo until a new move is played mid-history.
#[derive(Debug, Clone)]
pub struct GameTimeline<R = CozyRules> {
    rules: R,
    initial: Position,
    moves: Vec<TimelineMove>,
    applied: usize,
}

impl GameTimeline<CozyRules> {
    /// Timeline from the standard starting position.
    pub fn new() -> Self {
        Self::with_rules(CozyRules)
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::from_fen_with_rules(CozyRules, fen)
    }
}

impl Default for GameTimeline<CozyRules> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RulesEngine> GameTimeline<R> {
    pub fn with_rules(rules: R) -> Self {
        let initial = rules.start_position();
        Self {
            rules,
            initial,
            moves: Vec::new(),
            applied: 0,
        }
    }

    pub fn from_fen_with_rules(rules: R, fen: &str) -> Result<Self, FenError> {
        let initial = rules.position_from_fen(fen)?;
        Ok(Self {
            rules,
            initial,
            moves: Vec::new(),
            applied: 0,
        })
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn initial_position(&self) -> &Position {
        &self.initial
    }

    pub fn current_position(&self) -> &Position {
        match self.applied.checked_sub(1) {
            Some(i) => &self.moves[i].position,
            None => &self.initial,
        }
    }

    /// -1 for the initial position, otherwise the index of the last applied move.
    pub fn cursor(&self) -> isize {
        self.applied as isize - 1
    }

    pub fn moves(&self) -> &[TimelineMove] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Play a move from the current position.
    ///
    /// Any future moves past the cursor are discarded before the new move is
    /// appended. On rejection nothing changes.
    pub fn apply_move(
        &mut self,
        spec: impl Into<MoveSpec>,
    ) -> Result<&TimelineMove, RejectedMove> {
        let spec = spec.into();
        let applied = self.rules.apply_move(self.current_position(), &spec)?;

        if self.applied < self.moves.len() {
            tracing::debug!(
                discarded = self.moves.len() - self.applied,
                "Truncating future moves"
            );
            self.moves.truncate(self.applied);
        }

        let ply = self.moves.len();
        self.moves.push(TimelineMove::new(ply, applied));
        self.applied = self.moves.len();

        Ok(&self.moves[ply])
    }

    /// Move the cursor one ply back. Returns false at the initial position.
    pub fn step_backward(&mut self) -> bool {
        if self.applied == 0 {
            return false;
        }
        self.applied -= 1;
        true
    }

    /// Move the cursor one ply forward. Returns false at the last move.
    pub fn step_forward(&mut self) -> bool {
        if self.applied == self.moves.len() {
            return false;
        }
        self.applied += 1;
        true
    }

    /// Put the cursor at `index`, clamped to `[-1, len - 1]`.
    ///
    /// Positions up to the target are recomputed through the rules rather
    /// than read from the cache, so a corrupted cached position heals here.
    /// If a stored move no longer replays, the timeline is cut before it.
    pub fn jump_to(&mut self, index: isize) {
        let target = index.clamp(-1, self.moves.len() as isize - 1);
        let applied = (target + 1) as usize;

        let mut position = self.initial.clone();
        for i in 0..applied {
            let spec = MoveSpec::from(self.moves[i].mv);
            match self.rules.apply_move(&position, &spec) {
                Ok(replayed) => {
                    let cached = &mut self.moves[i];
                    if cached.position != replayed.position {
                        tracing::warn!(
                            ply = i,
                            cached = %cached.position,
                            replayed = %replayed.position,
                            "Cached position diverged from replay, repairing"
                        );
                        *cached = TimelineMove::new(i, replayed);
                    }
                    position = cached.position.clone();
                }
                Err(e) => {
                    tracing::warn!(ply = i, error = %e, "Stored move failed to replay, truncating");
                    self.moves.truncate(i);
                    self.applied = i;
                    return;
                }
            }
        }

        self.applied = applied;
    }

    pub fn jump_to_start(&mut self) {
        self.jump_to(-1);
    }

    pub fn jump_to_end(&mut self) {
        self.jump_to(self.moves.len() as isize - 1);
    }

    /// Replace the timeline with `moves`, replayed from the initial position.
    ///
    /// Either every move replays and the cursor ends on the last one, or the
    /// timeline is left exactly as it was.
    pub fn load_from_move_list<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<(), LoadError> {
        let mut replayed = Vec::with_capacity(moves.len());
        let mut position = self.initial.clone();

        for (index, text) in moves.iter().enumerate() {
            let spec = MoveSpec::notation(text.as_ref());
            let applied = self
                .rules
                .apply_move(&position, &spec)
                .map_err(|reason| LoadError { index, reason })?;
            position = applied.position.clone();
            replayed.push(TimelineMove::new(index, applied));
        }

        tracing::info!(moves = replayed.len(), "Loaded move list");
        self.moves = replayed;
        self.applied = self.moves.len();
        Ok(())
    }

    /// Drop every move and return to the initial position.
    pub fn reset(&mut self) {
        self.moves.clear();
        self.applied = 0;
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        let current = self.current_position();
        TimelineSnapshot {
            start_fen: self.initial.fingerprint().to_string(),
            moves: self.moves.iter().map(TimelineMove::to_record).collect(),
            cursor: self.cursor(),
            fen: current.fingerprint().to_string(),
            side_to_move: current.side_to_move(),
        }
    }
}
