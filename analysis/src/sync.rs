//! Keeps exactly one engine search pointed at the position being viewed.

use std::time::Duration;

use chess::{CozyRules, Position, RulesEngine};
use engine::{EngineChannel, EngineCommand};
use tokio::time::Instant;

use crate::adapter::{AnalysisAdapter, IngestOutcome};
use crate::record::AnalysisLine;

pub const DEFAULT_LINE_COUNT: u8 = 3;
pub const DEFAULT_TARGET_DEPTH: u8 = 20;
pub const DEFAULT_MIN_RESTART_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Number of ranked lines requested from the engine (MultiPV).
    pub line_count: u8,
    /// `go depth` sent with every restart.
    pub target_depth: u8,
    /// Restarts closer together than this are deferred.
    pub min_restart_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            line_count: DEFAULT_LINE_COUNT,
            target_depth: DEFAULT_TARGET_DEPTH,
            min_restart_interval: DEFAULT_MIN_RESTART_INTERVAL,
        }
    }
}

/// Result of asking for analysis of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// stop/position/go were sent.
    Restarted,
    /// A restart will fire at `due`, replacing any earlier pending one.
    Deferred { due: Instant },
    /// The position is already under search.
    AlreadyActive,
    /// Analysis is switched off.
    Suppressed,
    /// No engine to talk to.
    Unavailable,
}

/// Coordinates engine restarts with timeline navigation.
///
/// Owns the engine channel and the [`AnalysisAdapter`]. Time is passed in
/// by the caller so the throttle can be driven by a paused clock.
pub struct PositionSync<C, R = CozyRules> {
    channel: Option<C>,
    adapter: AnalysisAdapter<R>,
    config: SyncConfig,
    enabled: bool,
    last_restart: Option<Instant>,
    pending: Option<(Position, Instant)>,
    /// MultiPV changed since it was last sent.
    line_count_dirty: bool,
}

impl<C: EngineChannel, R: RulesEngine> PositionSync<C, R> {
    pub fn new(channel: Option<C>, adapter: AnalysisAdapter<R>, config: SyncConfig) -> Self {
        Self {
            channel,
            adapter,
            config,
            enabled: true,
            last_restart: None,
            pending: None,
            line_count_dirty: true,
        }
    }

    /// Configure a freshly connected engine.
    pub fn initialize(&mut self) -> bool {
        let ok = self.send(EngineCommand::set_line_count(self.config.line_count))
            && self.send(EngineCommand::UciNewGame)
            && self.send(EngineCommand::IsReady);
        if ok {
            self.line_count_dirty = false;
        }
        ok
    }

    /// The current position changed to `position`.
    pub fn position_changed(&mut self, position: &Position, now: Instant) -> SyncOutcome {
        if !self.enabled {
            return SyncOutcome::Suppressed;
        }
        if self.channel.is_none() {
            self.pending = None;
            self.adapter.cancel_search();
            return SyncOutcome::Unavailable;
        }
        if self.adapter.active_fingerprint() == Some(position.fingerprint()) {
            self.pending = None;
            return SyncOutcome::AlreadyActive;
        }

        if let Some(last) = self.last_restart {
            let due = last + self.config.min_restart_interval;
            if now < due {
                tracing::trace!(fen = %position.fingerprint(), "Deferring restart");
                self.pending = Some((position.clone(), due));
                return SyncOutcome::Deferred { due };
            }
        }

        self.restart(position, now)
    }

    /// When the pending restart is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Fire the pending restart if it is due.
    pub fn poll(&mut self, now: Instant) -> Option<SyncOutcome> {
        match &self.pending {
            Some((_, due)) if *due <= now => {}
            _ => return None,
        }
        let (position, _) = self.pending.take()?;
        Some(self.restart(&position, now))
    }

    /// Switch analysis on or off. Switching on restarts for `current`
    /// straight away, ignoring the throttle.
    pub fn set_enabled(&mut self, enabled: bool, current: &Position, now: Instant) -> SyncOutcome {
        if enabled == self.enabled {
            return if enabled {
                SyncOutcome::AlreadyActive
            } else {
                SyncOutcome::Suppressed
            };
        }

        self.enabled = enabled;
        if enabled {
            tracing::info!("Analysis enabled");
            self.restart(current, now)
        } else {
            tracing::info!("Analysis disabled");
            self.pending = None;
            if self.adapter.is_searching() {
                self.send(EngineCommand::Stop);
            }
            self.adapter.cancel_search();
            SyncOutcome::Suppressed
        }
    }

    /// Change the number of ranked lines and restart for `current`.
    pub fn set_line_count(&mut self, line_count: u8, current: &Position, now: Instant) -> SyncOutcome {
        let line_count = line_count.max(1);
        if line_count == self.config.line_count {
            return SyncOutcome::AlreadyActive;
        }
        self.config.line_count = line_count;
        self.line_count_dirty = true;

        if !self.enabled {
            return SyncOutcome::Suppressed;
        }
        self.restart(current, now)
    }

    fn restart(&mut self, position: &Position, now: Instant) -> SyncOutcome {
        self.pending = None;

        if !self.send(EngineCommand::Stop) {
            self.adapter.cancel_search();
            return SyncOutcome::Unavailable;
        }
        self.adapter.cancel_search();

        if self.line_count_dirty {
            if !self.send(EngineCommand::set_line_count(self.config.line_count)) {
                return SyncOutcome::Unavailable;
            }
            self.line_count_dirty = false;
        }

        let sent = self.send(EngineCommand::position(position.fingerprint()))
            && self.send(EngineCommand::go_depth(self.config.target_depth));
        if !sent {
            return SyncOutcome::Unavailable;
        }

        self.adapter.begin_search(
            position.clone(),
            self.config.line_count,
            self.config.target_depth,
        );
        self.last_restart = Some(now);
        tracing::debug!(fen = %position.fingerprint(), "Analysis restarted");
        SyncOutcome::Restarted
    }

    /// Send one command, dropping the channel on failure.
    fn send(&mut self, cmd: EngineCommand) -> bool {
        let Some(channel) = self.channel.as_mut() else {
            return false;
        };
        match channel.send(cmd) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Engine unavailable, analysis off: {}", e);
                self.channel = None;
                self.pending = None;
                self.adapter.cancel_search();
                false
            }
        }
    }

    /// Feed one raw engine line to the adapter.
    pub fn ingest(&mut self, raw: &str) -> IngestOutcome {
        self.adapter.ingest(raw)
    }

    pub fn current_lines(&self, fingerprint: &str) -> Vec<AnalysisLine> {
        self.adapter.current_lines(fingerprint)
    }

    pub fn adapter(&self) -> &AnalysisAdapter<R> {
        &self.adapter
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_available(&self) -> bool {
        self.channel.is_some()
    }

    pub fn channel(&self) -> Option<&C> {
        self.channel.as_ref()
    }

    /// Detach the engine channel, e.g. for shutdown.
    pub fn take_channel(&mut self) -> Option<C> {
        self.pending = None;
        self.adapter.cancel_search();
        self.channel.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::EngineError;

    #[derive(Default)]
    struct RecordingChannel {
        sent: Vec<String>,
        fail: bool,
    }

    impl RecordingChannel {
        fn failing() -> Self {
            Self {
                sent: Vec::new(),
                fail: true,
            }
        }
    }

    impl EngineChannel for RecordingChannel {
        fn send(&mut self, cmd: EngineCommand) -> Result<(), EngineError> {
            if self.fail {
                return Err(EngineError::ChannelClosed);
            }
            self.sent.push(cmd.to_uci());
            Ok(())
        }
    }

    fn sync() -> PositionSync<RecordingChannel> {
        PositionSync::new(
            Some(RecordingChannel::default()),
            AnalysisAdapter::default(),
            SyncConfig::default(),
        )
    }

    fn sent(sync: &PositionSync<RecordingChannel>) -> Vec<String> {
        sync.channel().map(|c| c.sent.clone()).unwrap_or_default()
    }

    fn positions() -> (Position, Position, Position) {
        (
            Position::startpos(),
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
                .unwrap(),
            Position::from_fen("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap(),
        )
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_initialize_configures_engine() {
        let mut sync = sync();
        assert!(sync.initialize());
        assert_eq!(
            sent(&sync),
            vec!["setoption name MultiPV value 3", "ucinewgame", "isready"]
        );
    }

    #[test]
    fn test_restart_sequence() {
        let (p0, _, _) = positions();
        let mut sync = sync();
        sync.initialize();
        let t0 = Instant::now();

        assert_eq!(sync.position_changed(&p0, t0), SyncOutcome::Restarted);
        assert_eq!(
            sent(&sync)[3..],
            [
                "stop".to_string(),
                format!("position fen {}", p0.fingerprint()),
                "go depth 20".to_string(),
            ]
        );
        assert_eq!(sync.adapter().active_fingerprint(), Some(p0.fingerprint()));
    }

    #[test]
    fn test_throttled_requests_collapse_to_latest() {
        let (p0, p1, p2) = positions();
        let mut sync = sync();
        sync.initialize();
        let t0 = Instant::now();
        sync.position_changed(&p0, t0);
        let before = sent(&sync).len();

        let due = t0 + ms(300);
        assert_eq!(
            sync.position_changed(&p1, t0 + ms(100)),
            SyncOutcome::Deferred { due }
        );
        assert_eq!(
            sync.position_changed(&p2, t0 + ms(200)),
            SyncOutcome::Deferred { due }
        );
        assert_eq!(sync.deadline(), Some(due));
        assert_eq!(sent(&sync).len(), before);

        assert_eq!(sync.poll(t0 + ms(250)), None);
        assert_eq!(sync.poll(due), Some(SyncOutcome::Restarted));
        assert_eq!(sync.deadline(), None);

        assert_eq!(
            sent(&sync)[before..],
            [
                "stop".to_string(),
                format!("position fen {}", p2.fingerprint()),
                "go depth 20".to_string(),
            ]
        );
        assert_eq!(sync.adapter().active_fingerprint(), Some(p2.fingerprint()));
    }

    #[test]
    fn test_restart_after_interval_is_immediate() {
        let (p0, p1, _) = positions();
        let mut sync = sync();
        let t0 = Instant::now();
        sync.position_changed(&p0, t0);

        assert_eq!(sync.position_changed(&p1, t0 + ms(300)), SyncOutcome::Restarted);
        assert_eq!(sync.deadline(), None);
    }

    #[test]
    fn test_returning_to_active_position_cancels_pending() {
        let (p0, p1, _) = positions();
        let mut sync = sync();
        let t0 = Instant::now();
        sync.position_changed(&p0, t0);
        sync.position_changed(&p1, t0 + ms(50));

        assert_eq!(sync.position_changed(&p0, t0 + ms(80)), SyncOutcome::AlreadyActive);
        assert_eq!(sync.deadline(), None);
    }

    #[test]
    fn test_disabled_suppresses_restarts() {
        let (p0, p1, _) = positions();
        let mut sync = sync();
        let t0 = Instant::now();
        sync.position_changed(&p0, t0);

        assert_eq!(sync.set_enabled(false, &p0, t0), SyncOutcome::Suppressed);
        assert_eq!(sent(&sync).last().map(String::as_str), Some("stop"));
        assert!(sync.adapter().active_fingerprint().is_none());

        let before = sent(&sync).len();
        assert_eq!(sync.position_changed(&p1, t0 + ms(1000)), SyncOutcome::Suppressed);
        assert_eq!(sent(&sync).len(), before);
    }

    #[test]
    fn test_enabling_bypasses_throttle() {
        let (p0, p1, _) = positions();
        let mut sync = sync();
        let t0 = Instant::now();
        sync.position_changed(&p0, t0);
        sync.set_enabled(false, &p0, t0);

        assert_eq!(sync.set_enabled(true, &p1, t0 + ms(10)), SyncOutcome::Restarted);
        assert_eq!(sync.adapter().active_fingerprint(), Some(p1.fingerprint()));
    }

    #[test]
    fn test_disabling_drops_pending_restart() {
        let (p0, p1, _) = positions();
        let mut sync = sync();
        let t0 = Instant::now();
        sync.position_changed(&p0, t0);
        sync.position_changed(&p1, t0 + ms(10));
        sync.set_enabled(false, &p1, t0 + ms(20));

        assert_eq!(sync.deadline(), None);
        assert_eq!(sync.poll(t0 + ms(1000)), None);
    }

    #[test]
    fn test_line_count_change_resends_multipv() {
        let (p0, _, _) = positions();
        let mut sync = sync();
        sync.initialize();
        let t0 = Instant::now();
        sync.position_changed(&p0, t0);
        let before = sent(&sync).len();

        assert_eq!(sync.set_line_count(1, &p0, t0 + ms(10)), SyncOutcome::Restarted);
        assert_eq!(
            sent(&sync)[before..],
            [
                "stop".to_string(),
                "setoption name MultiPV value 1".to_string(),
                format!("position fen {}", p0.fingerprint()),
                "go depth 20".to_string(),
            ]
        );
        assert_eq!(sync.config().line_count, 1);
    }

    #[test]
    fn test_without_channel_restarts_are_noops() {
        let (p0, _, _) = positions();
        let mut sync: PositionSync<RecordingChannel> =
            PositionSync::new(None, AnalysisAdapter::default(), SyncConfig::default());

        assert!(!sync.initialize());
        assert_eq!(sync.position_changed(&p0, Instant::now()), SyncOutcome::Unavailable);
        assert!(sync.adapter().active_fingerprint().is_none());
        assert!(!sync.is_available());
    }

    #[test]
    fn test_send_failure_drops_channel() {
        let (p0, p1, _) = positions();
        let mut sync = PositionSync::new(
            Some(RecordingChannel::failing()),
            AnalysisAdapter::default(),
            SyncConfig::default(),
        );
        let t0 = Instant::now();

        assert_eq!(sync.position_changed(&p0, t0), SyncOutcome::Unavailable);
        assert!(!sync.is_available());
        assert_eq!(sync.position_changed(&p1, t0 + ms(500)), SyncOutcome::Unavailable);
        assert!(sync.adapter().active_fingerprint().is_none());
    }

    #[test]
    fn test_engine_lines_reach_current_position() {
        let (p0, p1, _) = positions();
        let mut sync = sync();
        let t0 = Instant::now();
        sync.position_changed(&p0, t0);

        sync.ingest("info depth 10 multipv 1 score cp 35 pv e2e4 e7e5");
        assert_eq!(sync.current_lines(p0.fingerprint()).len(), 1);

        sync.position_changed(&p1, t0 + ms(400));
        // Late report from the search of p0
        sync.ingest("info depth 11 multipv 2 score cp 30 pv d2d4");
        assert_eq!(sync.current_lines(p0.fingerprint()).len(), 1);
        assert!(sync.current_lines(p1.fingerprint()).is_empty());
    }
}
