pub mod channel;
pub mod stockfish;
pub mod uci;

pub use channel::{EngineChannel, EngineError};
pub use stockfish::{EngineConfig, StockfishEngine};
pub use uci::{parse_uci_message, UciError, UciMessage};

use cozy_chess::Move;

/// Commands sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Uci,
    IsReady,
    UciNewGame,
    SetPosition { fen: String },
    SetOption { name: String, value: Option<String> },
    /// `go depth <depth>`
    Go { depth: u8 },
    Stop,
    Quit,
}

impl EngineCommand {
    /// `setoption name MultiPV value <n>`
    pub fn set_line_count(lines: u8) -> Self {
        Self::SetOption {
            name: "MultiPV".to_string(),
            value: Some(lines.max(1).to_string()),
        }
    }

    /// `position fen <fen>`
    pub fn position(fen: impl Into<String>) -> Self {
        Self::SetPosition { fen: fen.into() }
    }

    pub fn go_depth(depth: u8) -> Self {
        Self::Go { depth }
    }

    /// Wire form of the command, without the trailing newline.
    pub fn to_uci(&self) -> String {
        match self {
            Self::Uci => "uci".to_string(),
            Self::IsReady => "isready".to_string(),
            Self::UciNewGame => "ucinewgame".to_string(),
            Self::SetPosition { fen } => format!("position fen {}", fen),
            Self::SetOption { name, value } => match value {
                Some(val) => format!("setoption name {} value {}", name, val),
                None => format!("setoption name {}", name),
            },
            Self::Go { depth } => format!("go depth {}", depth),
            Self::Stop => "stop".to_string(),
            Self::Quit => "quit".to_string(),
        }
    }
}

impl std::fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// Events received from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// `uciok` or `readyok` arrived
    Ready,
    /// One line of engine output, trimmed
    Output(String),
    Error(String),
}

/// Engine analysis information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineInfo {
    pub depth: Option<u8>,
    pub score: Option<Score>,
    pub pv: Vec<Move>, // Principal variation
    pub multipv: Option<u8>,
}

/// Score as reported on the wire: always from the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    Mate(i32), // Negative for being mated
}
