use std::io;

use macaw::entity::EntityId;
use macaw::error::{AudioError, BackendError, EngineError, RenderError};
use pretty_assertions::assert_eq;

#[test]
fn test_render_errors_wrap_into_engine_error() {
    let error: EngineError = RenderError::NoCamera.into();
    assert_eq!(error.to_string(), "Render error: No camera assigned to the render system");

    let error: EngineError = RenderError::MissingGeometry { entity: EntityId(3) }.into();
    assert_eq!(
        error.to_string(),
        "Render error: Entity #3 is rendered as geometry but has no rectangle component"
    );
}

#[test]
fn test_backend_errors_pass_through_render_errors() {
    let error = RenderError::from(BackendError::Draw("lost device".to_string()));
    assert_eq!(error.to_string(), "Draw call failed: lost device");
}

#[test]
fn test_audio_io_error() {
    let error = AudioError::from(io::Error::new(io::ErrorKind::NotFound, "bounce.wav"));
    assert!(matches!(error, AudioError::Io(_)));

    let error: EngineError = error.into();
    assert_eq!(error.to_string(), "Audio error: IO error: bounce.wav");
}
