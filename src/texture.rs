use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::world::SpriteKind;

/// Edge length of every texture. Must be a power of two.
pub const TEXTURE_SIZE: usize = 64;
const TEXTURE_MASK: usize = TEXTURE_SIZE - 1;

const _: () = assert!(TEXTURE_SIZE.is_power_of_two());

/// Square ARGB texture (`0xAARRGGBB`), row-major, read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pixels: Box<[u32]>,
}

impl Texture {
    /// Wrap decoded pixels. Fails unless the image is exactly
    /// `TEXTURE_SIZE` x `TEXTURE_SIZE`.
    pub fn from_argb(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self> {
        if width != TEXTURE_SIZE || height != TEXTURE_SIZE {
            return Err(EngineError::TextureSize { width, height });
        }
        if pixels.len() != width * height {
            return Err(EngineError::PixelCount {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels: pixels.into_boxed_slice(),
        })
    }

    /// Build a texture procedurally; `f(x, y)` yields the ARGB texel.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> u32) -> Self {
        let mut pixels = Vec::with_capacity(TEXTURE_SIZE * TEXTURE_SIZE);
        for y in 0..TEXTURE_SIZE {
            for x in 0..TEXTURE_SIZE {
                pixels.push(f(x, y));
            }
        }
        Self {
            pixels: pixels.into_boxed_slice(),
        }
    }

    pub fn solid(argb: u32) -> Self {
        Self::from_fn(|_, _| argb)
    }

    /// Sample at arbitrary `(u, v)`; both wrap into `[0, 1)` so negative
    /// coordinates land at the high end of the texture.
    #[inline]
    pub fn sample(&self, u: f64, v: f64) -> u32 {
        let x = texel_index(u);
        let y = texel_index(v);
        self.pixels[y * TEXTURE_SIZE + x]
    }

    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> u32 {
        self.pixels[(y & TEXTURE_MASK) * TEXTURE_SIZE + (x & TEXTURE_MASK)]
    }
}

#[inline]
fn texel_index(coord: f64) -> usize {
    // rem_euclid may round up to exactly 1.0 for tiny negatives; the mask folds it back to 0
    (coord.rem_euclid(1.0) * TEXTURE_SIZE as f64) as usize & TEXTURE_MASK
}

/// Every surface the engine can draw: floor, ceiling, one texture per wall
/// material and one per sprite kind.
#[derive(Debug, Clone)]
pub struct TextureSet {
    pub floor: Texture,
    pub ceiling: Texture,
    /// Indexed directly by material id.
    walls: Vec<Option<Texture>>,
    sprites: BTreeMap<SpriteKind, Texture>,
}

impl TextureSet {
    pub fn new(floor: Texture, ceiling: Texture) -> Self {
        Self {
            floor,
            ceiling,
            walls: vec![None; 256],
            sprites: BTreeMap::new(),
        }
    }

    pub fn with_wall(mut self, material: u8, texture: Texture) -> Self {
        self.walls[material as usize] = Some(texture);
        self
    }

    pub fn with_sprite(mut self, kind: SpriteKind, texture: Texture) -> Self {
        self.sprites.insert(kind, texture);
        self
    }

    #[inline]
    pub fn wall(&self, material: u8) -> Option<&Texture> {
        self.walls[material as usize].as_ref()
    }

    pub fn sprite(&self, kind: SpriteKind) -> Option<&Texture> {
        self.sprites.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Texture {
        Texture::from_fn(|x, y| 0xFF00_0000 | ((x as u32) << 8) | y as u32)
    }

    #[test]
    fn rejects_wrong_size() {
        let err = Texture::from_argb(32, 32, vec![0; 32 * 32]).unwrap_err();
        assert!(matches!(err, EngineError::TextureSize { width: 32, height: 32 }));

        let err = Texture::from_argb(64, 32, vec![0; 64 * 32]).unwrap_err();
        assert!(matches!(err, EngineError::TextureSize { .. }));
    }

    #[test]
    fn rejects_short_pixel_data() {
        let err = Texture::from_argb(64, 64, vec![0; 100]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::PixelCount {
                expected: 4096,
                actual: 100
            }
        ));
    }

    #[test]
    fn sample_maps_unit_square_to_texels() {
        let tex = gradient();
        assert_eq!(tex.sample(0.0, 0.0), tex.texel(0, 0));
        assert_eq!(tex.sample(0.5, 0.25), tex.texel(32, 16));
        assert_eq!(tex.sample(0.999_999, 0.999_999), tex.texel(63, 63));
    }

    #[test]
    fn negative_coordinates_wrap_to_high_end() {
        let tex = gradient();
        assert_eq!(tex.sample(-0.01, 0.0), tex.texel(63, 0));
        assert_eq!(tex.sample(0.0, -0.5), tex.texel(0, 32));
        assert_eq!(tex.sample(-1e-20, -1e-20), tex.texel(0, 0));
    }

    #[test]
    fn sample_is_periodic() {
        let tex = gradient();
        for (u, v) in [(0.1, 0.7), (0.33, 0.0), (0.9, 0.45)] {
            assert_eq!(tex.sample(u, v), tex.sample(u + 1.0, v));
            assert_eq!(tex.sample(u, v), tex.sample(u, v + 3.0));
            assert_eq!(tex.sample(u, v), tex.sample(u - 2.0, v - 1.0));
        }
    }

    #[test]
    fn texture_set_lookups() {
        let set = TextureSet::new(Texture::solid(1), Texture::solid(2))
            .with_wall(1, Texture::solid(3))
            .with_sprite(SpriteKind::Treasure, Texture::solid(4));
        assert_eq!(set.wall(1).map(|t| t.texel(0, 0)), Some(3));
        assert!(set.wall(2).is_none());
        assert!(set.sprite(SpriteKind::Treasure).is_some());
        assert!(set.sprite(SpriteKind::Hero).is_none());
    }

    #[test]
    fn wall_lookup_covers_every_material_id() {
        let set = TextureSet::new(Texture::solid(0), Texture::solid(0))
            .with_wall(0, Texture::solid(10))
            .with_wall(255, Texture::solid(20))
            .with_wall(7, Texture::solid(30))
            .with_wall(7, Texture::solid(40));
        assert_eq!(set.wall(0).map(|t| t.texel(0, 0)), Some(10));
        assert_eq!(set.wall(255).map(|t| t.texel(0, 0)), Some(20));
        // a later texture for the same material replaces the earlier one
        assert_eq!(set.wall(7).map(|t| t.texel(0, 0)), Some(40));
        assert_eq!((1..=254u8).filter(|&m| set.wall(m).is_some()).count(), 1);
    }
}
