use glam::{IVec2, Vec2};
use tracing::{debug, trace, warn};

use crate::backend::Graphics;
use crate::config::{Config, UnpredictedPosition};
use crate::entity::{
    Animation, Camera, ComponentSet, Entity, EntityId, EntityManager, FilterCursor, Font, Grid, Physics, Position,
    Rectangle, Render, RenderKind,
};
use crate::error::{BackendError, RenderError};
use crate::geometry::{Color, Rect};

/// Components an entity needs to be drawn.
pub const RENDERABLE: ComponentSet = ComponentSet::RENDER.union(ComponentSet::POSITION);

/// The camera's window into the world, resolved once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraView {
    pub viewport: Rect,
}

impl CameraView {
    /// Resolves the view of `camera`. `None` if it lacks a [`Position`] or a [`Camera`], or if the camera
    /// is not active.
    pub fn of(manager: &EntityManager, camera: EntityId) -> Option<Self> {
        let entity = manager.get(camera)?;
        let position = entity.get::<Position>()?;
        let camera = entity.get::<Camera>().filter(|camera| camera.active)?;
        Some(Self {
            viewport: Rect::new(position.pos.x, position.pos.y, camera.viewport.x, camera.viewport.y),
        })
    }

    /// Returns `true` if a `size`-sized rectangle at world position `pos` overlaps the viewport.
    pub fn sees(&self, pos: IVec2, size: Rect) -> bool {
        self.viewport.has_intersection(&Rect::new(pos.x, pos.y, size.w, size.h))
    }

    /// Converts a world position into a screen position.
    pub fn to_screen(&self, pos: IVec2) -> IVec2 {
        pos - self.viewport.origin()
    }
}

/// Linear interpolation between two positions, rounded to the nearest pixel.
pub fn lerp(from: IVec2, to: IVec2, alpha: f32) -> IVec2 {
    (to.as_vec2() * alpha + from.as_vec2() * (1.0 - alpha)).round().as_ivec2()
}

/// Advances `animation` by however many frames fit in the time since its last advance and returns the
/// crop rectangle of the resulting frame. Returns `crop` untouched if no whole frame has elapsed.
pub fn next_animation_frame(now: u32, animation: &mut Animation, crop: Rect) -> Rect {
    let elapsed = now.wrapping_sub(animation.last_advance) as u64;
    let advances = (elapsed * animation.fps as u64 / 1000) as usize;
    if advances < 1 || animation.frames == 0 {
        return crop;
    }
    animation.current = (animation.current + advances) % animation.frames;
    animation.last_advance = now;
    frame_crop(animation, crop)
}

/// Crop rectangle of the animation's current frame. Frames are laid out row by row from `origin`, each the
/// size of `crop`.
pub fn frame_crop(animation: &Animation, crop: Rect) -> Rect {
    let per_row = animation.frames_per_row.max(1);
    let column = (animation.current % per_row) as i32;
    let row = (animation.current / per_row) as i32;
    Rect::new(
        column * crop.w as i32 + animation.origin.x,
        row * crop.h as i32 + animation.origin.y,
        crop.w,
        crop.h,
    )
}

/// Destination rectangle on screen. A non-zero `z` shrinks position and size by `z + 1` to fake depth.
pub fn perspective(screen: IVec2, crop: Rect, z: f32) -> Rect {
    if z == 0.0 {
        return Rect::new(screen.x, screen.y, crop.w, crop.h);
    }
    let divisor = z + 1.0;
    let pos = screen.as_vec2() / divisor;
    let size = Vec2::new(crop.w as f32, crop.h as f32) / divisor;
    Rect::new(pos.x as i32, pos.y as i32, size.x as u32, size.y as u32)
}

/// Draws every entity with a [`Render`] and a [`Position`] as seen through the active camera.
///
/// The frame loop feeds it the leftover tick time (for interpolation) and the clock (for animations) before
/// each [`update`](Self::update).
#[derive(Debug)]
pub struct RenderSystem {
    camera: Option<EntityId>,
    accumulator: u32,
    time: u32,
    tick_length: u32,
    background: Color,
    unpredicted: UnpredictedPosition,
}

impl RenderSystem {
    pub fn new(config: &Config) -> Self {
        Self {
            camera: None,
            accumulator: 0,
            time: 0,
            tick_length: config.timing.tick_length_ms.max(1),
            background: config.render.background,
            unpredicted: config.render.unpredicted,
        }
    }

    /// Sets the entity whose [`Camera`] and [`Position`] control what gets drawn.
    pub fn set_camera(&mut self, camera: EntityId) {
        debug!(%camera, "Camera assigned");
        self.camera = Some(camera);
    }

    pub fn camera(&self) -> Option<EntityId> {
        self.camera
    }

    /// Time (ms) accumulated since the last fixed tick.
    pub fn update_accumulator(&mut self, accumulator: u32) {
        self.accumulator = accumulator;
    }

    /// Current clock (ms), used to advance animations.
    pub fn update_time(&mut self, time: u32) {
        self.time = time;
    }

    /// Interpolation factor between the current and the predicted positions.
    pub fn alpha(&self) -> f32 {
        self.accumulator as f32 / self.tick_length as f32
    }

    /// Returns `true` if a `size`-sized rectangle at world position `pos` is visible through the camera.
    ///
    /// Nothing is visible without a camera, through an inactive one, or through one lacking a [`Position`] or
    /// [`Camera`] component.
    pub fn is_renderable(&self, manager: &EntityManager, pos: IVec2, size: Rect) -> bool {
        self.camera
            .and_then(|camera| CameraView::of(manager, camera))
            .is_some_and(|view| view.sees(pos, size))
    }

    /// Where an entity is shown this frame.
    ///
    /// The prediction is rounded the same way [`physics_system`](crate::systems::physics_system) commits it, so
    /// the position shown at `alpha == 1` is the one the next tick lands on.
    pub fn displayed_position(&self, position: &Position, physics: Option<&Physics>, alpha: f32) -> IVec2 {
        match physics.map(|physics| physics.predicted) {
            None => position.pos,
            Some(Some(predicted)) => lerp(position.pos, predicted.round().as_ivec2(), alpha),
            Some(None) => match self.unpredicted {
                UnpredictedPosition::Hold => position.pos,
                UnpredictedPosition::SnapToOrigin => IVec2::ZERO,
            },
        }
    }

    /// Draws one frame.
    ///
    /// Fails without a camera, when a geometry entity has no [`Rectangle`], and on any backend failure.
    /// None of these are recoverable.
    pub fn update<G: Graphics + ?Sized>(&mut self, manager: &mut EntityManager, gfx: &mut G) -> Result<(), RenderError> {
        let camera = self.camera.ok_or(RenderError::NoCamera)?;
        let view = CameraView::of(manager, camera);
        if view.is_none() {
            trace!(%camera, "Camera is missing a position or camera component, nothing is visible");
        }

        gfx.set_draw_color(self.background);
        gfx.clear();

        let alpha = self.alpha();
        let mut cursor = FilterCursor::new(RENDERABLE, None);
        while let Some(id) = cursor.next(manager) {
            if let Some(entity) = manager.get_mut(id) {
                self.draw_entity(entity, view, alpha, gfx)?;
            }
        }

        gfx.present();
        Ok(())
    }

    fn draw_entity<G: Graphics + ?Sized>(
        &self,
        entity: &mut Entity,
        view: Option<CameraView>,
        alpha: f32,
        gfx: &mut G,
    ) -> Result<(), RenderError> {
        let (Some(position), Some(kind)) = (entity.get::<Position>().copied(), entity.get::<Render>().map(|r| r.kind))
        else {
            return Ok(());
        };
        let pos = self.displayed_position(&position, entity.get::<Physics>(), alpha);

        match kind {
            RenderKind::Sprite => {
                if let Some((animation, render)) = entity.get_pair_mut::<Animation, Render>() {
                    render.crop = next_animation_frame(self.time, animation, render.crop);
                }
            }
            RenderKind::Font => {
                if let Some((font, render)) = entity.get_pair_mut::<Font, Render>() {
                    if font.dirty {
                        regenerate_text(gfx, font, render)?;
                    }
                }
            }
            RenderKind::Geometry => {
                let rectangle = entity
                    .get::<Rectangle>()
                    .copied()
                    .ok_or(RenderError::MissingGeometry { entity: entity.id() })?;
                return draw_geometry(gfx, view, pos, &rectangle);
            }
            RenderKind::Grid => {
                if let Some(grid) = entity.get::<Grid>() {
                    return draw_grid(gfx, grid);
                }
            }
        }

        let Some(render) = entity.get::<Render>() else {
            return Ok(());
        };
        let Some(texture) = render.texture else {
            trace!(entity = %entity.id(), "No texture to draw");
            return Ok(());
        };
        let Some(view) = view.filter(|view| view.sees(pos, render.crop)) else {
            return Ok(());
        };

        let dst = perspective(view.to_screen(pos), render.crop, position.z);
        gfx.copy_ex(texture, render.crop, dst, render.angle, render.center, render.flip)?;
        Ok(())
    }
}

/// Re-rasterizes a font entity's text into a fresh texture, releasing the previous one.
fn regenerate_text<G: Graphics + ?Sized>(gfx: &mut G, font: &mut Font, render: &mut Render) -> Result<(), BackendError> {
    let color = font.color.unwrap_or(Color::BLACK);
    let generated = gfx.render_text(font.font, &font.text, color)?;
    if let Some(previous) = render.texture.replace(generated.texture) {
        gfx.destroy_texture(previous);
    }
    render.crop = Rect::new(0, 0, generated.size.x, generated.size.y);
    font.dirty = false;
    debug!(text = %font.text, width = generated.size.x, height = generated.size.y, "Regenerated text texture");
    Ok(())
}

fn draw_geometry<G: Graphics + ?Sized>(
    gfx: &mut G,
    view: Option<CameraView>,
    pos: IVec2,
    rectangle: &Rectangle,
) -> Result<(), RenderError> {
    let size = Rect::new(0, 0, rectangle.size.x, rectangle.size.y);
    let Some(view) = view.filter(|view| view.sees(pos, size)) else {
        return Ok(());
    };
    let screen = view.to_screen(pos);
    let rect = Rect::new(screen.x, screen.y, rectangle.size.x, rectangle.size.y);

    gfx.set_draw_color(rectangle.color);
    if rectangle.filled {
        gfx.fill_rect(rect)?;
    } else {
        gfx.draw_rect(rect)?;
    }
    Ok(())
}

/// Tiles grid cells over the whole output, ignoring the camera.
fn draw_grid<G: Graphics + ?Sized>(gfx: &mut G, grid: &Grid) -> Result<(), RenderError> {
    if grid.cell.x == 0 || grid.cell.y == 0 {
        warn!(cell = ?grid.cell, "Grid cell size must be non-zero, skipping grid");
        return Ok(());
    }
    let area = gfx.output_size();
    gfx.set_draw_color(grid.color.unwrap_or(Color::BLACK));

    let columns = area.x / grid.cell.x;
    let rows = area.y / grid.cell.y;
    for column in 0..columns {
        for row in 0..rows {
            let rect = Rect::new(
                (column * grid.cell.x) as i32,
                (row * grid.cell.y) as i32,
                grid.cell.x,
                grid.cell.y,
            );
            gfx.draw_rect(rect)?;
        }
    }
    Ok(())
}
