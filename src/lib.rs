//! Software raycasting renderer for tile maps: textured walls found by grid
//! traversal, projected floor and ceiling, depth-tested sprite billboards,
//! all rendered on a rayon worker pool.

pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod framebuffer;
pub mod renderer;
pub mod scaler;
pub mod texture;
pub mod vector;
pub mod world;

pub use camera::Camera;
pub use config::EngineConfig;
pub use engine::{FrameTimings, RaycastEngine};
pub use error::EngineError;
pub use framebuffer::FrameBuffer;
pub use renderer::{RayHit, Side};
pub use texture::{TEXTURE_SIZE, Texture, TextureSet};
pub use vector::Vec2;
pub use world::{SOLID_BORDER, SpriteKind, WorldMap};
