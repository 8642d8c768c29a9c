//! Multi-PV engine analysis keyed by position.
//!
//! [`AnalysisAdapter`] turns raw engine report lines into ranked
//! [`AnalysisLine`]s for the position under search, and [`PositionSync`]
//! keeps the engine pointed at whatever position the user is looking at.

pub mod adapter;
pub mod cache;
pub mod record;
pub mod score;
pub mod sync;

pub use adapter::{AnalysisAdapter, IngestOutcome};
pub use cache::AnalysisCache;
pub use record::{AnalysisLine, AnalysisRecord};
pub use score::AnalysisScore;
pub use sync::{PositionSync, SyncConfig, SyncOutcome};
