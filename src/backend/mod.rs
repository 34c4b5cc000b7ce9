//! The narrow interface the render system draws through.
//!
//! The core never owns window, renderer, texture or font objects. It only holds opaque handles and asks a
//! [`Graphics`] implementation to act on them.

use glam::{IVec2, UVec2};

use crate::error::BackendError;
use crate::geometry::{Color, Flip, Rect};

#[cfg(feature = "sdl")]
pub mod sdl;

/// Opaque handle to a texture owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Opaque handle to a loaded font owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// A texture produced by the backend together with its pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedTexture {
    pub texture: TextureId,
    pub size: UVec2,
}

/// Drawing primitives required by [`RenderSystem`](crate::systems::render::RenderSystem).
///
/// Errors returned from these calls are treated as fatal by the render system: rendering cannot continue
/// without the renderer or a texture.
pub trait Graphics {
    fn set_draw_color(&mut self, color: Color);

    /// Clears the frame buffer with the current draw color.
    fn clear(&mut self);

    /// Shows everything drawn since the last clear.
    fn present(&mut self);

    fn draw_rect(&mut self, rect: Rect) -> Result<(), BackendError>;

    fn fill_rect(&mut self, rect: Rect) -> Result<(), BackendError>;

    /// Copies `src` out of `texture` into `dst`, rotated by `angle` degrees around `center`
    /// (the center of `dst` when `None`).
    fn copy_ex(
        &mut self,
        texture: TextureId,
        src: Rect,
        dst: Rect,
        angle: f64,
        center: Option<IVec2>,
        flip: Flip,
    ) -> Result<(), BackendError>;

    /// Rasterizes UTF-8 `text` with `font` and uploads it as a new texture.
    fn render_text(&mut self, font: FontId, text: &str, color: Color) -> Result<GeneratedTexture, BackendError>;

    /// Releases a texture previously produced by the backend. Unknown handles are ignored.
    fn destroy_texture(&mut self, texture: TextureId);

    /// Size of the drawable area in pixels.
    fn output_size(&self) -> UVec2;
}
