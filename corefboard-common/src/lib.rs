//! Shared library for the corefboard coreference evaluation leaderboard.
//!
//! Holds the pieces used by both the web module and its tests: error
//! types, data root resolution, database initialization + row models,
//! and the metric score types produced by the scorer output parser.

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;

pub use error::{Error, Result};
