#![allow(dead_code)]

use glam::{IVec2, UVec2};
use macaw::backend::{FontId, GeneratedTexture, Graphics, TextureId};
use macaw::config::Config;
use macaw::entity::{Camera, EntityId, EntityManager, Position};
use macaw::error::BackendError;
use macaw::geometry::{Color, Flip, Rect};
use macaw::systems::RenderSystem;

/// Every call a [`RecordingGraphics`] received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    SetDrawColor(Color),
    Clear,
    Present,
    DrawRect(Rect),
    FillRect(Rect),
    Copy {
        texture: TextureId,
        src: Rect,
        dst: Rect,
        angle: f64,
        flip: Flip,
    },
    RenderText {
        font: FontId,
        text: String,
        color: Color,
    },
    DestroyTexture(TextureId),
}

/// Graphics backend that draws nothing and records every call.
///
/// Text renders to a texture 8 pixels wide per character and 16 pixels high.
pub struct RecordingGraphics {
    pub calls: Vec<DrawCall>,
    pub output: UVec2,
    pub fail_draws: bool,
    next_texture: u32,
}

impl RecordingGraphics {
    pub fn new(output: UVec2) -> Self {
        Self {
            calls: Vec::new(),
            output,
            fail_draws: false,
            next_texture: 1000,
        }
    }

    /// Destination rectangles of every texture copy.
    pub fn copies(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Copy { dst, .. } => Some(*dst),
                _ => None,
            })
            .collect()
    }

    pub fn outlines(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::DrawRect(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn fills(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillRect(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }
}

impl Default for RecordingGraphics {
    fn default() -> Self {
        Self::new(UVec2::new(800, 600))
    }
}

impl Graphics for RecordingGraphics {
    fn set_draw_color(&mut self, color: Color) {
        self.calls.push(DrawCall::SetDrawColor(color));
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn present(&mut self) {
        self.calls.push(DrawCall::Present);
    }

    fn draw_rect(&mut self, rect: Rect) -> Result<(), BackendError> {
        if self.fail_draws {
            return Err(BackendError::Draw("refused".to_string()));
        }
        self.calls.push(DrawCall::DrawRect(rect));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect) -> Result<(), BackendError> {
        if self.fail_draws {
            return Err(BackendError::Draw("refused".to_string()));
        }
        self.calls.push(DrawCall::FillRect(rect));
        Ok(())
    }

    fn copy_ex(
        &mut self,
        texture: TextureId,
        src: Rect,
        dst: Rect,
        angle: f64,
        _center: Option<IVec2>,
        flip: Flip,
    ) -> Result<(), BackendError> {
        if self.fail_draws {
            return Err(BackendError::Draw("refused".to_string()));
        }
        self.calls.push(DrawCall::Copy {
            texture,
            src,
            dst,
            angle,
            flip,
        });
        Ok(())
    }

    fn render_text(&mut self, font: FontId, text: &str, color: Color) -> Result<GeneratedTexture, BackendError> {
        self.calls.push(DrawCall::RenderText {
            font,
            text: text.to_string(),
            color,
        });
        let texture = TextureId(self.next_texture);
        self.next_texture += 1;
        Ok(GeneratedTexture {
            texture,
            size: UVec2::new(8 * text.chars().count() as u32, 16),
        })
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.calls.push(DrawCall::DestroyTexture(texture));
    }

    fn output_size(&self) -> UVec2 {
        self.output
    }
}

/// Adds a camera entity at `pos` with a `viewport`-sized view.
pub fn spawn_camera(manager: &mut EntityManager, pos: IVec2, viewport: UVec2) -> EntityId {
    manager
        .create("camera")
        .add(Position { pos, z: 0.0 })
        .add(Camera {
            viewport,
            world: UVec2::new(800, 600),
            active: true,
        })
        .id()
}

/// A render system with default configuration looking through a fresh 800x600 camera at the origin.
pub fn render_setup() -> (EntityManager, RenderSystem, EntityId) {
    let mut manager = EntityManager::new();
    let camera = spawn_camera(&mut manager, IVec2::ZERO, UVec2::new(800, 600));
    let mut render = RenderSystem::new(&Config::default());
    render.set_camera(camera);
    (manager, render, camera)
}
