use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use glam::{IVec2, UVec2, Vec2};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::{AudioSubsystem, EventPump, Sdl};
use tracing::{debug, info, trace, warn};

use crate::audio::Audio;
use crate::backend::sdl::SdlGraphics;
use crate::backend::FontId;
use crate::config::Config;
use crate::constants::LOOP_TIME;
use crate::entity::{Camera, Collision, EntityId, EntityManager, Font, Grid, Physics, Position, Rectangle, Render, RenderKind};
use crate::error::{EngineError, EngineResult};
use crate::formatter;
use crate::geometry::{Color, Rect};
use crate::systems::{invert_velocity, physics_system, reflect_from_border, CollisionSystem, RenderSystem};
use crate::timing::FixedTimestep;

const BALL_SIZE: u32 = 24;

/// Starting position, velocity and color of each demo ball.
const BALLS: [(IVec2, Vec2, Color); 6] = [
    (IVec2::new(60, 80), Vec2::new(3.0, 2.0), Color::RED),
    (IVec2::new(200, 300), Vec2::new(-2.0, 3.0), Color::GREEN),
    (IVec2::new(520, 120), Vec2::new(4.0, -1.0), Color::BLUE),
    (IVec2::new(640, 420), Vec2::new(-3.0, -3.0), Color::rgb(0xFF, 0xA5, 0x00)),
    (IVec2::new(120, 480), Vec2::new(2.0, -4.0), Color::rgb(0x80, 0x00, 0x80)),
    (IVec2::new(300, 60), Vec2::new(-1.0, 2.0), Color::rgb(0x00, 0x80, 0x80)),
];

/// Owns SDL, the entity manager and every system, and drives the fixed-timestep frame loop.
pub struct App {
    config: Config,
    manager: EntityManager,
    graphics: SdlGraphics,
    collision: CollisionSystem,
    render: RenderSystem,
    timestep: FixedTimestep,
    audio: Option<Audio>,
    event_pump: EventPump,
    label: Option<EntityId>,
    bounces: Rc<Cell<u32>>,
    shown_bounces: u32,
    paused: bool,
    started: Instant,
    last_frame: Instant,
    // Keep SDL alive for the app lifetime so subsystems are not shut down
    _sdl_context: Sdl,
    _audio_subsystem: AudioSubsystem,
}

impl App {
    /// Initializes SDL, opens the window described by `config` and seeds the demo scene.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Sdl` if an SDL subsystem fails, or `EngineError::Backend` if the renderer or a
    /// texture cannot be created. Audio failures only disable sound.
    pub fn new(config: Config) -> EngineResult<Self> {
        info!("Initializing SDL2 application");
        let sdl_context = sdl2::init().map_err(EngineError::Sdl)?;
        let video_subsystem = sdl_context.video().map_err(EngineError::Sdl)?;
        let event_pump = sdl_context.event_pump().map_err(EngineError::Sdl)?;

        trace!(
            width = config.window.width,
            height = config.window.height,
            "Creating window"
        );
        let window = video_subsystem
            .window(&config.window.title, config.window.width, config.window.height)
            .position_centered()
            .build()
            .map_err(|e| EngineError::Sdl(e.to_string()))?;
        let mut graphics = SdlGraphics::new(window)?;

        let audio_subsystem = sdl_context.audio().map_err(EngineError::Sdl)?;
        let audio = match Audio::new() {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!("Failed to initialize audio: {e}. Audio will be disabled.");
                None
            }
        };

        let font = match &config.assets.font {
            Some(path) => match graphics.load_font(path, config.assets.font_size) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!(error = %e, "Font unavailable, the label is disabled");
                    None
                }
            },
            None => None,
        };

        let mut app = Self {
            manager: EntityManager::new(),
            graphics,
            collision: CollisionSystem::new(config.world),
            render: RenderSystem::new(&config),
            timestep: FixedTimestep::from_config(&config.timing),
            audio,
            event_pump,
            label: None,
            bounces: Rc::new(Cell::new(0)),
            shown_bounces: 0,
            paused: false,
            started: Instant::now(),
            last_frame: Instant::now(),
            _sdl_context: sdl_context,
            _audio_subsystem: audio_subsystem,
            config,
        };
        app.seed_scene(font)?;

        if let (Some(audio), Some(music)) = (app.audio.as_mut(), app.config.assets.music.as_deref()) {
            let _ = audio.play_music(music);
        }

        info!(entities = app.manager.len(), "Application initialization completed successfully");
        Ok(app)
    }

    fn seed_scene(&mut self, font: Option<FontId>) -> EngineResult<()> {
        let world = self.config.world;
        let window = UVec2::new(self.config.window.width, self.config.window.height);

        let camera = self
            .manager
            .create("camera")
            .add(Position::new(0, 0))
            .add(Camera {
                viewport: window,
                world: UVec2::new(world.width, world.height),
                active: true,
            })
            .id();
        self.render.set_camera(camera);

        self.manager
            .create("grid")
            .add(Position::new(0, 0))
            .add(Render::of_kind(RenderKind::Grid))
            .add(Grid {
                cell: UVec2::splat(50),
                color: Some(Color::rgb(0xDD, 0xDD, 0xDD)),
            });

        let wall = UVec2::new(20, world.height / 3);
        self.manager
            .create("wall")
            .add(Position::new((world.width / 2) as i32, (world.height / 3) as i32))
            .add(Render::of_kind(RenderKind::Geometry))
            .add(Rectangle {
                size: wall,
                color: Color::BLACK,
                filled: true,
            })
            .add(Collision::single(wall.x, wall.y));

        for (pos, velocity, color) in BALLS {
            let texture = self.graphics.solid_texture(UVec2::splat(BALL_SIZE), color)?;
            self.manager
                .create("ball")
                .add(Position { pos, z: 0.0 })
                .add(Physics::with_velocity(velocity))
                .add(Render::sprite(texture, Rect::new(0, 0, BALL_SIZE, BALL_SIZE)))
                .add(Collision::single(BALL_SIZE, BALL_SIZE));
        }

        if let Some(font) = font {
            let label = self
                .manager
                .create("label")
                .add(Position::new(10, 10))
                .add(Render::of_kind(RenderKind::Font))
                .add(Font::new(font, bounce_text(0)))
                .id();
            self.label = Some(label);
        }

        self.collision.on_collision(invert_velocity);
        let bounces = Rc::clone(&self.bounces);
        self.collision.on_collision(move |_, _| bounces.set(bounces.get() + 1));
        self.collision.on_border(reflect_from_border);

        debug!(entities = self.manager.len(), "Demo scene seeded");
        Ok(())
    }

    /// Runs a single frame: input, the fixed ticks that fit into the elapsed time, then rendering.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the app should keep running, `Ok(false)` on quit. A render failure is fatal and returned.
    pub fn run(&mut self) -> EngineResult<bool> {
        let start = Instant::now();
        let frame_ms = start.duration_since(self.last_frame).as_millis() as u32;
        self.last_frame = start;

        if !self.handle_input() {
            return Ok(false);
        }

        if !self.paused {
            let ticks = self.timestep.advance(frame_ms);
            for _ in 0..ticks {
                physics_system(&mut self.manager);
                self.collision.update(&mut self.manager);
            }
        }
        self.on_bounces();

        self.render.update_accumulator(self.timestep.accumulator());
        self.render.update_time(self.started.elapsed().as_millis() as u32);
        self.render.update(&mut self.manager, &mut self.graphics)?;
        formatter::increment_frame();

        if start.elapsed() < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                spin_sleep::sleep(time);
            }
        }

        Ok(true)
    }

    fn handle_input(&mut self) -> bool {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape | Keycode::Q),
                    ..
                } => {
                    info!("Exit requested");
                    return false;
                }
                Event::KeyDown {
                    keycode: Some(Keycode::P),
                    repeat: false,
                    ..
                } => {
                    self.paused = !self.paused;
                    info!(paused = self.paused, "Pause toggled");
                }
                _ => {}
            }
        }
        true
    }

    /// Plays the bounce sound and refreshes the label when collisions happened since the last frame.
    fn on_bounces(&mut self) {
        let bounces = self.bounces.get();
        if bounces == self.shown_bounces {
            return;
        }
        self.shown_bounces = bounces;

        if let (Some(audio), Some(sound)) = (self.audio.as_mut(), self.config.assets.bounce_sound.as_deref()) {
            let _ = audio.play_sound(sound);
        }
        if let Some(font) = self.label.and_then(|label| self.manager.get_mut(label)).and_then(|e| e.get_mut::<Font>()) {
            font.set_text(bounce_text(bounces));
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(audio) = self.audio.as_mut() {
            audio.stop_music();
        }
    }
}

fn bounce_text(bounces: u32) -> String {
    format!("collisions: {bounces}")
}
