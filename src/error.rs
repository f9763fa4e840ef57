//! Engine error taxonomy
//!
//! Only failures the host must act on surface as errors. Invalid intents are
//! silently dropped and unreadable high scores fall back to zero, so neither
//! appears here.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The drawing surface the session expects does not exist
    #[error("no drawing surface available for session {session}")]
    SurfaceMissing { session: String },

    /// The surface exists but has no drawable area
    #[error("drawing surface is {width}x{height}, need a non-empty area")]
    SurfaceTooSmall { width: u32, height: u32 },

    /// Host asked for a game that does not exist
    #[error("unknown game variant '{0}' (available: snake, dino, memory, village)")]
    UnknownVariant(String),

    /// Durable write failed (quota, private mode, storage disabled)
    #[error("storage write failed: {0}")]
    Storage(String),
}
