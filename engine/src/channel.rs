//! Outbound half of the engine connection.

use crate::EngineCommand;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Engine not found")]
    NotFound,
    #[error("Failed to spawn engine: {0}")]
    Spawn(String),
    #[error("Engine initialization failed: {0}")]
    Handshake(String),
    #[error("Engine channel closed")]
    ChannelClosed,
}

/// Fire-and-forget command sink to an analysis engine.
///
/// Replies are never correlated to a command; they arrive separately as
/// [`crate::EngineEvent`]s and are attributed by whoever issued the last
/// `position` command.
pub trait EngineChannel {
    fn send(&mut self, cmd: EngineCommand) -> Result<(), EngineError>;
}

impl<C: EngineChannel + ?Sized> EngineChannel for Box<C> {
    fn send(&mut self, cmd: EngineCommand) -> Result<(), EngineError> {
        (**self).send(cmd)
    }
}
