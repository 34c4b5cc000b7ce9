//! [`Graphics`] implementation on top of an SDL2 window canvas and SDL2_ttf.

use std::path::Path;

use glam::{IVec2, UVec2};
use sdl2::pixels::{self, PixelFormatEnum};
use sdl2::rect::{Point, Rect as SdlRect};
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::surface::Surface;
use sdl2::ttf::{Font as TtfFont, Sdl2TtfContext};
use sdl2::video::{Window, WindowContext};
use tracing::debug;

use crate::backend::{FontId, GeneratedTexture, Graphics, TextureId};
use crate::error::BackendError;
use crate::geometry::{Color, Flip, Rect};

fn sdl_rect(rect: Rect) -> SdlRect {
    SdlRect::new(rect.x, rect.y, rect.w, rect.h)
}

fn sdl_color(color: Color) -> pixels::Color {
    pixels::Color::RGBA(color.r, color.g, color.b, color.a)
}

/// Owns the renderer, every texture handed out as a [`TextureId`], and every font loaded as a [`FontId`].
pub struct SdlGraphics {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    ttf: &'static Sdl2TtfContext,
    textures: Vec<Option<Texture>>,
    fonts: Vec<TtfFont<'static, 'static>>,
}

impl SdlGraphics {
    /// Creates an accelerated renderer bound to `window`.
    pub fn new(window: Window) -> Result<Self, BackendError> {
        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|e| BackendError::RendererCreation(e.to_string()))?;
        let texture_creator = canvas.texture_creator();

        // Fonts borrow the TTF context; it lives as long as the process, so it is leaked once here.
        let ttf: &'static Sdl2TtfContext =
            Box::leak(Box::new(sdl2::ttf::init().map_err(|e| BackendError::RendererCreation(e.to_string()))?));

        debug!(renderer = canvas.info().name, "Created renderer");
        Ok(Self {
            canvas,
            texture_creator,
            ttf,
            textures: Vec::new(),
            fonts: Vec::new(),
        })
    }

    pub fn load_font(&mut self, path: &Path, point_size: u16) -> Result<FontId, BackendError> {
        let font = self
            .ttf
            .load_font(path, point_size)
            .map_err(|e| BackendError::TextRendering(format!("{}: {e}", path.display())))?;
        self.fonts.push(font);
        Ok(FontId(self.fonts.len() as u32 - 1))
    }

    /// Creates a texture filled with a single color. Handy for placeholder sprites.
    pub fn solid_texture(&mut self, size: UVec2, color: Color) -> Result<TextureId, BackendError> {
        let mut surface = Surface::new(size.x, size.y, PixelFormatEnum::RGBA8888)
            .map_err(|e| BackendError::TextureCreation(e.to_string()))?;
        surface
            .fill_rect(None::<SdlRect>, sdl_color(color))
            .map_err(|e| BackendError::TextureCreation(e.to_string()))?;
        self.upload(&surface)
    }

    fn upload(&mut self, surface: &Surface) -> Result<TextureId, BackendError> {
        let texture = self
            .texture_creator
            .create_texture_from_surface(surface)
            .map_err(|e| BackendError::TextureCreation(e.to_string()))?;

        let slot = self.textures.iter().position(Option::is_none);
        let index = match slot {
            Some(index) => {
                self.textures[index] = Some(texture);
                index
            }
            None => {
                self.textures.push(Some(texture));
                self.textures.len() - 1
            }
        };
        Ok(TextureId(index as u32))
    }
}

impl Graphics for SdlGraphics {
    fn set_draw_color(&mut self, color: Color) {
        self.canvas.set_draw_color(sdl_color(color));
    }

    fn clear(&mut self) {
        self.canvas.clear();
    }

    fn present(&mut self) {
        self.canvas.present();
    }

    fn draw_rect(&mut self, rect: Rect) -> Result<(), BackendError> {
        self.canvas.draw_rect(sdl_rect(rect)).map_err(BackendError::Draw)
    }

    fn fill_rect(&mut self, rect: Rect) -> Result<(), BackendError> {
        self.canvas.fill_rect(sdl_rect(rect)).map_err(BackendError::Draw)
    }

    fn copy_ex(
        &mut self,
        id: TextureId,
        src: Rect,
        dst: Rect,
        angle: f64,
        center: Option<IVec2>,
        flip: Flip,
    ) -> Result<(), BackendError> {
        let texture = self
            .textures
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| BackendError::Draw(format!("unknown texture {}", id.0)))?;
        self.canvas
            .copy_ex(
                texture,
                sdl_rect(src),
                sdl_rect(dst),
                angle,
                center.map(|center| Point::new(center.x, center.y)),
                flip.contains(Flip::HORIZONTAL),
                flip.contains(Flip::VERTICAL),
            )
            .map_err(BackendError::Draw)
    }

    fn render_text(&mut self, font: FontId, text: &str, color: Color) -> Result<GeneratedTexture, BackendError> {
        let font = self
            .fonts
            .get(font.0 as usize)
            .ok_or_else(|| BackendError::TextRendering(format!("unknown font {}", font.0)))?;
        let surface = font
            .render(text)
            .solid(sdl_color(color))
            .map_err(|e| BackendError::TextRendering(e.to_string()))?;
        let size = UVec2::new(surface.width(), surface.height());
        let texture = self.upload(&surface)?;
        Ok(GeneratedTexture { texture, size })
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if let Some(texture) = self.textures.get_mut(texture.0 as usize).and_then(Option::take) {
            // SAFETY: the renderer that created the texture is still alive, and the slot no longer refers to it.
            unsafe { texture.destroy() };
        }
    }

    fn output_size(&self) -> UVec2 {
        let (width, height) = self
            .canvas
            .output_size()
            .unwrap_or_else(|_| self.canvas.window().size());
        UVec2::new(width, height)
    }
}
