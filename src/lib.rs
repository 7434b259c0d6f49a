//! # Delve
//!
//! Procedural dungeon layout generation for grid-based roguelikes.
//!
//! ## Architecture Overview
//!
//! Delve produces a grid of wall/floor cells plus a list of rectangular rooms,
//! then hands both to a [`MapBuilder`] that turns them into whatever map type
//! the game uses. The engine never decides what goes inside a room.
//!
//! - **Geometry**: integer coordinates and the four cardinal sides
//! - **Randomness**: every draw goes through an injectable [`RandomSource`]
//! - **Generation**: the shared [`Excavation`] primitives and three strategies
//!   ([`ArenaGenerator`], [`UniformGenerator`], [`DiggerGenerator`])
//! - **Layout**: a reference builder producing a serializable, printable layout
//!
//! ## Reentrancy
//!
//! Generators only hold configuration. All per-call state (grid, rooms, wall
//! queues) lives inside the `generate` call, so one generator can serve many
//! callers at once.

pub mod generation;
pub mod geometry;
pub mod layout;
pub mod rng;

pub use generation::*;
pub use geometry::*;
pub use layout::*;
pub use rng::*;

/// Core error type for the Delve generation engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration cannot produce a layout
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal bookkeeping reached a state it should never reach
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Weighted feature table named a feature the digger cannot build
    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),

    /// Generation gave up after exhausting its retry budget
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// The map builder rejected the layout
    #[error("Builder error: {0}")]
    Builder(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation defaults shared by the library and the command line tool.
pub mod config {
    /// Default level width in cells
    pub const DEFAULT_WIDTH: u32 = 60;

    /// Default level height in cells
    pub const DEFAULT_HEIGHT: u32 = 20;

    /// Cells reserved as solid wall around the whole grid
    pub const MARGIN: i32 = 1;

    /// Default level identifier handed to the builder
    pub const DEFAULT_LEVEL_ID: &str = "level";
}
