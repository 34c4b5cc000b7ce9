//! Component records and the closed set of component kinds.
//!
//! Every component is plain data. Behavior lives in the systems that query for them.

use std::collections::HashMap;

use bitflags::bitflags;
use glam::{IVec2, UVec2, Vec2};
use smallvec::SmallVec;
use strum_macros::{EnumCount, EnumDiscriminants, EnumIter};

use crate::backend::{FontId, TextureId};
use crate::geometry::{Color, Flip, Rect};

/// Spatial placement. `z` gates collisions (same plane only) and scales rendering for a cheap perspective.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub pos: IVec2,
    pub z: f32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { pos: IVec2::new(x, y), z: 0.0 }
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }
}

/// Motion state. `predicted` is the position expected at the next fixed tick; the render system blends
/// towards it and it stays `None` until the physics step has run once.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Physics {
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub predicted: Option<Vec2>,
}

impl Physics {
    pub fn with_velocity(velocity: Vec2) -> Self {
        Self {
            velocity,
            ..Default::default()
        }
    }
}

/// How an entity with a [`Render`] component gets drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderKind {
    /// A texture, optionally animated through an [`Animation`] component.
    #[default]
    Sprite,
    /// A texture generated from a [`Font`] component whenever its text changes.
    Font,
    /// A [`Rectangle`] drawn directly with the renderer.
    Geometry,
    /// A [`Grid`] debug overlay, drawn in window space.
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Render {
    pub texture: Option<TextureId>,
    /// Part of the texture to display. Its size is also the on-screen size.
    pub crop: Rect,
    pub kind: RenderKind,
    pub angle: f64,
    pub center: Option<IVec2>,
    pub flip: Flip,
}

impl Render {
    pub fn sprite(texture: TextureId, crop: Rect) -> Self {
        Self {
            texture: Some(texture),
            crop,
            ..Default::default()
        }
    }

    pub fn of_kind(kind: RenderKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

/// Defines the visible window into the world. Only meaningful on an entity that also has a [`Position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Camera {
    pub viewport: UVec2,
    /// Size of the world the camera looks into. Informational; culling only uses the viewport.
    pub world: UVec2,
    /// An inactive camera sees nothing.
    pub active: bool,
}

/// Sprite sheet playback state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Animation {
    /// Top-left corner of the first frame in the sheet.
    pub origin: IVec2,
    pub fps: u32,
    /// Clock value (ms) of the last frame advance.
    pub last_advance: u32,
    pub current: usize,
    pub frames: usize,
    pub frames_per_row: usize,
    /// Named starting frames, e.g. `"walk" -> 4`.
    pub named: HashMap<String, usize>,
}

impl Animation {
    pub fn new(origin: IVec2, fps: u32, frames: usize, frames_per_row: usize) -> Self {
        Self {
            origin,
            fps,
            frames,
            frames_per_row,
            ..Default::default()
        }
    }

    /// Moves playback to a named frame. Returns `false` when the name is unknown.
    pub fn jump_to(&mut self, name: &str) -> bool {
        match self.named.get(name) {
            Some(&frame) if frame < self.frames => {
                self.current = frame;
                true
            }
            _ => false,
        }
    }
}

/// Text rendered lazily into the entity's texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub font: FontId,
    pub text: String,
    /// Set when the texture no longer matches `text`/`color`.
    pub dirty: bool,
    pub color: Option<Color>,
}

impl Font {
    pub fn new(font: FontId, text: impl Into<String>) -> Self {
        Self {
            font,
            text: text.into(),
            dirty: true,
            color: None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub size: UVec2,
    pub color: Color,
    pub filled: bool,
}

/// Hitbox made of rectangles relative to the entity's origin.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Collision {
    pub areas: SmallVec<[Rect; 4]>,
}

impl Collision {
    /// A single area of `w` x `h` anchored at the entity's origin.
    pub fn single(w: u32, h: u32) -> Self {
        Self::from_areas([Rect::new(0, 0, w, h)])
    }

    pub fn from_areas(areas: impl IntoIterator<Item = Rect>) -> Self {
        Self {
            areas: areas.into_iter().collect(),
        }
    }
}

/// Debug grid overlay, drawn across the whole window regardless of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub cell: UVec2,
    pub color: Option<Color>,
}

/// Any component value. The discriminant doubles as the key in an entity's component store.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(ComponentKind), derive(Hash, EnumCount, EnumIter))]
pub enum Component {
    Position(Position),
    Physics(Physics),
    Render(Render),
    Camera(Camera),
    Animation(Animation),
    Font(Font),
    Rectangle(Rectangle),
    Collision(Collision),
    Grid(Grid),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        self.into()
    }
}

impl ComponentKind {
    /// Slot of this kind in a component table.
    pub fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// A set of component kinds, used as the required set of a filtered query.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ComponentSet: u16 {
        const POSITION = 1 << 0;
        const PHYSICS = 1 << 1;
        const RENDER = 1 << 2;
        const CAMERA = 1 << 3;
        const ANIMATION = 1 << 4;
        const FONT = 1 << 5;
        const RECTANGLE = 1 << 6;
        const COLLISION = 1 << 7;
        const GRID = 1 << 8;
    }
}

impl From<ComponentKind> for ComponentSet {
    fn from(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Position => ComponentSet::POSITION,
            ComponentKind::Physics => ComponentSet::PHYSICS,
            ComponentKind::Render => ComponentSet::RENDER,
            ComponentKind::Camera => ComponentSet::CAMERA,
            ComponentKind::Animation => ComponentSet::ANIMATION,
            ComponentKind::Font => ComponentSet::FONT,
            ComponentKind::Rectangle => ComponentSet::RECTANGLE,
            ComponentKind::Collision => ComponentSet::COLLISION,
            ComponentKind::Grid => ComponentSet::GRID,
        }
    }
}

impl FromIterator<ComponentKind> for ComponentSet {
    fn from_iter<I: IntoIterator<Item = ComponentKind>>(iter: I) -> Self {
        iter.into_iter().fold(ComponentSet::empty(), |set, kind| set | kind.into())
    }
}

/// Typed access to one variant of [`Component`].
pub trait ComponentData: Into<Component> {
    const KIND: ComponentKind;

    fn from_component(component: &Component) -> Option<&Self>;

    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;

    fn from_owned(component: Component) -> Option<Self>
    where
        Self: Sized;
}

macro_rules! component_data {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Component {
                fn from(value: $variant) -> Self {
                    Component::$variant(value)
                }
            }

            impl ComponentData for $variant {
                const KIND: ComponentKind = ComponentKind::$variant;

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_owned(component: Component) -> Option<Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

component_data!(Position, Physics, Render, Camera, Animation, Font, Rectangle, Collision, Grid);

#[cfg(test)]
mod tests {
    use strum::{EnumCount, IntoEnumIterator};

    use super::*;

    #[test]
    fn test_component_set_covers_every_kind_once() {
        let all: ComponentSet = ComponentKind::iter().collect();
        assert_eq!(all, ComponentSet::all());
        assert_eq!(all.bits().count_ones() as usize, ComponentKind::COUNT);
    }

    #[test]
    fn test_kind_of_variant() {
        let component: Component = Position::new(1, 2).into();
        assert_eq!(component.kind(), ComponentKind::Position);
        assert_eq!(<Grid as ComponentData>::KIND, ComponentKind::Grid);
    }

    #[test]
    fn test_jump_to_named_frame() {
        let mut animation = Animation::new(IVec2::ZERO, 10, 6, 3);
        animation.named.insert("walk".to_string(), 4);
        animation.named.insert("broken".to_string(), 9);

        assert!(animation.jump_to("walk"));
        assert_eq!(animation.current, 4);
        assert!(!animation.jump_to("broken"));
        assert!(!animation.jump_to("missing"));
        assert_eq!(animation.current, 4);
    }

    #[test]
    fn test_font_set_text_marks_dirty() {
        let mut font = Font::new(FontId(0), "a");
        font.dirty = false;
        font.set_text("b");
        assert!(font.dirty);
        assert_eq!(font.text, "b");
    }
}
