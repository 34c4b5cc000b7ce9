//! Centralized error types for the engine.
//!
//! Absence of a component is never an error; it is expressed with `Option`. The types here cover backend
//! failures, invariant violations in the render path, audio and configuration problems.

use std::io;

use crate::entity::EntityId;

/// Main error type for the engine.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("SDL error: {0}")]
    Sdl(String),
}

/// Errors raised while drawing a frame. All of them are unrecoverable for the frame loop.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("No camera assigned to the render system")]
    NoCamera,

    #[error("Entity {entity} is rendered as geometry but has no rectangle component")]
    MissingGeometry { entity: EntityId },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failures reported by a graphics or font backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Renderer could not be created: {0}")]
    RendererCreation(String),

    #[error("Unable to create texture: {0}")]
    TextureCreation(String),

    #[error("Failed to render text: {0}")]
    TextRendering(String),

    #[error("Draw call failed: {0}")]
    Draw(String),
}

/// Errors from loading or playing sounds. These are logged and returned, never fatal.
#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to load audio: {0}")]
    Load(String),

    #[error("Failed to play audio: {0}")]
    Playback(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
