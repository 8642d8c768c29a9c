//! Common utilities for plyscope
//!
//! This crate provides shared text converters and UCI move helpers
//! used across the rules, engine, and analysis components.

pub mod converters;
pub mod uci;

// Re-export commonly used items
pub use converters::*;
pub use uci::*;
