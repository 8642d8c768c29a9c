pub mod fen;
pub mod position;
pub mod rules;
pub mod san;
pub mod snapshot;
pub mod timeline;
pub mod types;
pub mod uci;

pub use chess_common::*;
pub use fen::FenError;
pub use position::Position;
pub use rules::{AppliedMove, CozyRules, MoveSpec, RejectedMove, RulesEngine};
pub use snapshot::{MoveRecord, TimelineSnapshot};
pub use timeline::{GameTimeline, LoadError, TimelineMove};
pub use types::Side;
pub use uci::{convert_cozy_castling_to_uci, convert_uci_castling_to_cozy, to_uci_string};
