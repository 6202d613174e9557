use std::f64::consts::FRAC_PI_2;
use std::time::{Duration, Instant};

use rayon::ThreadPool;

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::framebuffer::FrameBuffer;
use crate::renderer::{self, ColumnHit, RayHit, SpriteParams};
use crate::texture::TextureSet;
use crate::vector::Vec2;
use crate::world::WorldMap;

/// Wall-clock cost of each pass of the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameTimings {
    pub walls: Duration,
    pub floor_ceiling: Duration,
    pub sprites: Duration,
    pub total: Duration,
}

/// Owns the camera, the map, the textures, the frame and depth buffers and
/// the render thread pool. Call the movement methods, then [`tick`], then
/// read [`pixels`].
///
/// [`tick`]: RaycastEngine::tick
/// [`pixels`]: RaycastEngine::pixels
pub struct RaycastEngine {
    config: EngineConfig,
    camera: Camera,
    map: WorldMap,
    textures: TextureSet,
    frame: FrameBuffer,
    columns: Vec<ColumnHit>,
    pool: Option<ThreadPool>,
    frame_count: u64,
}

impl RaycastEngine {
    /// Build an engine rendering `width` x `height` pixels. Every wall
    /// material and sprite kind the map uses must have a texture.
    pub fn new(
        width: usize,
        height: usize,
        map: WorldMap,
        textures: TextureSet,
        config: EngineConfig,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "viewport {width}x{height} is empty"
            )));
        }
        config.validate()?;

        for material in map.materials() {
            if textures.wall(material).is_none() {
                return Err(EngineError::MissingWallTexture(material));
            }
        }
        for (_, kind) in map.sprites() {
            if textures.sprite(kind).is_none() {
                return Err(EngineError::MissingSpriteTexture(kind));
            }
        }

        let pool = if config.multithreaded {
            let threads = config.worker_threads();
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("wolfcast-render-{i}"))
                .build()?;
            Some(pool)
        } else {
            None
        };

        let (sx, sy) = map.player_start();
        let camera = Camera::new(
            Vec2::new(sx as f64 + 0.5, sy as f64 + 0.5),
            FRAC_PI_2,
            config.field_of_view,
            config.black_distance,
        )?;

        tracing::info!(
            width,
            height,
            map_width = map.width(),
            map_height = map.height(),
            sprites = map.sprite_count(),
            threads = pool.as_ref().map_or(1, |p| p.current_num_threads()),
            "raycast engine ready"
        );

        Ok(Self {
            camera,
            map,
            textures,
            frame: FrameBuffer::new(width, height),
            columns: Vec::with_capacity(width),
            pool,
            frame_count: 0,
            config,
        })
    }

    /// Render one complete frame into the pixel buffer. `elapsed` is the
    /// host's monotonic clock and only feeds diagnostics.
    pub fn tick(&mut self, elapsed: Duration) -> FrameTimings {
        let span = tracing::trace_span!("tick", frame = self.frame_count, ?elapsed);
        let _enter = span.enter();

        let started = Instant::now();
        let pool = self.pool.as_ref();
        let (width, height) = (self.frame.width(), self.frame.height());

        self.frame.clear();

        renderer::cast_columns(&self.map, &self.camera, width, height, pool, &mut self.columns);
        renderer::draw_walls(&mut self.frame, &self.columns, &self.textures, pool);
        let walls_done = Instant::now();

        renderer::draw_floor_and_ceiling(
            &mut self.frame,
            &self.columns,
            &self.camera,
            &self.textures,
            self.config.floor_distance_offset,
            pool,
        );
        let floor_done = Instant::now();

        let params = SpriteParams {
            width,
            height,
            near_clip: self.config.sprite_near_clip,
        };
        let billboards = renderer::project_sprites(&self.map, &self.camera, &self.textures, &params, pool);
        renderer::draw_sprites(
            &mut self.frame,
            &billboards,
            self.config.sprite_alpha_threshold,
            pool,
        );
        let sprites_done = Instant::now();

        self.frame_count += 1;
        let timings = FrameTimings {
            walls: walls_done - started,
            floor_ceiling: floor_done - walls_done,
            sprites: sprites_done - floor_done,
            total: sprites_done - started,
        };
        tracing::trace!(
            walls_us = timings.walls.as_micros() as u64,
            floor_ceiling_us = timings.floor_ceiling.as_micros() as u64,
            sprites_us = timings.sprites.as_micros() as u64,
            visible_sprites = billboards.len(),
            "frame rendered"
        );
        timings
    }

    /// Cast the ray for one screen column against the current camera.
    pub fn cast_ray(&self, column: usize) -> Option<RayHit> {
        renderer::cast_ray(&self.map, &self.camera, column, self.frame.width())
    }

    pub fn rotate(&mut self, delta: f64) {
        self.camera.rotate(delta);
    }

    pub fn rotate_to(&mut self, angle: f64) {
        self.camera.rotate_to(angle);
    }

    pub fn set_field_of_view(&mut self, fov: f64) -> Result<()> {
        self.camera.set_field_of_view(fov)?;
        self.config.field_of_view = fov;
        Ok(())
    }

    pub fn set_black_distance(&mut self, distance: f64) -> Result<()> {
        self.camera.set_black_distance(distance)?;
        self.config.black_distance = distance;
        Ok(())
    }

    pub fn move_forward_or_back(&mut self, amount: f64) {
        self.camera.move_forward_or_back(&self.map, amount, self.config.wall_margin);
    }

    pub fn move_left_or_right(&mut self, amount: f64) {
        self.camera.move_left_or_right(&self.map, amount, self.config.wall_margin);
    }

    /// Place the camera directly, e.g. at a spawn point. No collision check.
    pub fn teleport(&mut self, position: Vec2) {
        self.camera.set_position(position);
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    /// Mutable map access between frames, for moving or removing sprites.
    #[inline]
    pub fn map_mut(&mut self) -> &mut WorldMap {
        &mut self.map
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// ARGB pixels of the last frame, row-major, top row first.
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        self.frame.pixels()
    }

    #[inline]
    pub fn depth(&self) -> &[f64] {
        self.frame.depth()
    }

    #[inline]
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
