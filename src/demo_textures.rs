//! Procedural stand-ins for the demo's texture files.

use wolfcast::{SpriteKind, TEXTURE_SIZE, Texture, TextureSet};

const TRANSPARENT: u32 = 0x0000_0000;

#[inline]
fn argb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

fn bricks() -> Texture {
    Texture::from_fn(|x, y| {
        let row = y / 8;
        let offset = if row % 2 == 0 { 0 } else { 8 };
        if y % 8 == 7 || (x + offset) % 16 == 15 {
            argb(180, 180, 170)
        } else {
            let shade = 140 + ((x * 7 + y * 13) % 30) as u8;
            argb(shade, 60, 40)
        }
    })
}

fn stone() -> Texture {
    Texture::from_fn(|x, y| {
        let edge = x % 32 == 0 || y % 32 == 0;
        let n = ((x * 31 + y * 17) ^ (x * y)) % 40;
        if edge { argb(60, 60, 70) } else { argb(110 + n as u8, 110 + n as u8, 120 + n as u8) }
    })
}

fn checker(a: u32, b: u32) -> Texture {
    Texture::from_fn(|x, y| if (x / 8 + y / 8) % 2 == 0 { a } else { b })
}

/// Round blob of `color` on a transparent background, filling `fill` of
/// the texture width and resting on the bottom edge.
fn blob(color: u32, eye: u32, fill: f64) -> Texture {
    let size = TEXTURE_SIZE as f64;
    let radius = 0.5 * fill * size;
    let (cx, cy) = (0.5 * size, size - radius);
    Texture::from_fn(|x, y| {
        let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
        if dx * dx + dy * dy > radius * radius {
            return TRANSPARENT;
        }
        let eye_y = cy - 0.3 * radius;
        let near_eye = |ex: f64| (x as f64 - ex).abs() < 3.0 && (y as f64 - eye_y).abs() < 3.0;
        if near_eye(cx - 0.35 * radius) || near_eye(cx + 0.35 * radius) { eye } else { color }
    })
}

pub fn build() -> TextureSet {
    TextureSet::new(checker(argb(90, 90, 80), argb(70, 70, 60)), checker(argb(40, 60, 110), argb(30, 45, 90)))
        .with_wall(1, bricks())
        .with_wall(2, stone())
        .with_sprite(SpriteKind::Gargoyle, blob(argb(90, 110, 90), argb(255, 40, 40), 1.0))
        .with_sprite(SpriteKind::Hero, blob(argb(230, 200, 30), argb(20, 20, 20), 0.9))
        .with_sprite(SpriteKind::Treasure, blob(argb(240, 190, 40), argb(255, 255, 200), 0.7))
}
