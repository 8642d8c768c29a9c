//! The session actor: single owner of the timeline and analysis state.

pub mod actor;
pub mod commands;
pub mod events;
pub mod handle;
pub mod snapshot;
pub mod state;

use analysis::{AnalysisAdapter, PositionSync, SyncConfig};
use chess::GameTimeline;
use engine::{EngineChannel, EngineEvent};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use actor::run_session_actor;
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use snapshot::SessionSnapshot;
use state::SessionState;

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 100;

/// Everything a session needs besides the timeline.
pub struct SessionOptions<C> {
    pub engine: Option<C>,
    pub engine_events: Option<mpsc::Receiver<EngineEvent>>,
    pub sync: SyncConfig,
    pub cache_size: usize,
}

/// Spawn the actor task. Awaiting the join handle yields the engine
/// channel back once the session has shut down.
pub fn spawn_session<C>(
    timeline: GameTimeline,
    options: SessionOptions<C>,
) -> (SessionHandle, JoinHandle<Option<C>>)
where
    C: EngineChannel + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

    let sync = PositionSync::new(
        options.engine,
        AnalysisAdapter::new(options.cache_size),
        options.sync,
    );
    let state = SessionState::new(timeline, sync, options.engine_events);
    let task = tokio::spawn(run_session_actor(state, cmd_rx, event_tx));

    (SessionHandle::new(cmd_tx), task)
}
