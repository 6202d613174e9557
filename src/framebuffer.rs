use rayon::ThreadPool;
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;

/// Opaque black, `0xAARRGGBB`.
pub const BLACK: u32 = 0xFF00_0000;

/// Row-major ARGB pixels plus a per-pixel depth buffer of the same shape.
///
/// All writes go through the depth-tested composite ([`Row::set`] /
/// [`FrameBuffer::set_pixel`]): a sample lands only if it is nearer than
/// what the pixel already holds.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    depth: Vec<f64>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BLACK; width * height],
            depth: vec![f64::INFINITY; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    /// Reset depth to +inf and pixels to black.
    pub fn clear(&mut self) {
        self.depth.fill(f64::INFINITY);
        self.pixels.fill(BLACK);
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn depth_at(&self, x: usize, y: usize) -> f64 {
        self.depth[y * self.width + x]
    }

    /// Depth-tested write of a single pixel.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, depth: f64, brightness: f64, color: u32) -> bool {
        self.row_mut(y).set(x, depth, brightness, color)
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> Row<'_> {
        let span = y * self.width..(y + 1) * self.width;
        Row {
            pixels: &mut self.pixels[span.clone()],
            depth: &mut self.depth[span],
        }
    }

    /// Run `f` once per row. With a pool, rows are handed out in parallel;
    /// each task owns its row exclusively.
    pub(crate) fn for_each_row<F>(&mut self, pool: Option<&ThreadPool>, f: F)
    where
        F: Fn(usize, Row<'_>) + Send + Sync,
    {
        let w = self.width;
        let pixels = &mut self.pixels;
        let depth = &mut self.depth;
        match pool {
            Some(pool) => pool.install(|| {
                pixels
                    .par_chunks_mut(w)
                    .zip(depth.par_chunks_mut(w))
                    .enumerate()
                    .for_each(|(y, (p, d))| f(y, Row { pixels: p, depth: d }));
            }),
            None => pixels
                .chunks_mut(w)
                .zip(depth.chunks_mut(w))
                .enumerate()
                .for_each(|(y, (p, d))| f(y, Row { pixels: p, depth: d })),
        }
    }

    /// Run `f(y, row y, row height-1-y)` for `y` in `0..rows` (capped at
    /// half the height). Each task owns both mirrored rows.
    pub(crate) fn for_each_mirrored_pair<F>(&mut self, rows: usize, pool: Option<&ThreadPool>, f: F)
    where
        F: Fn(usize, Row<'_>, Row<'_>) + Send + Sync,
    {
        let w = self.width;
        let half = self.height / 2;
        let rows = rows.min(half);
        let middle = (self.height - 2 * half) * w;

        let (top_px, rest_px) = self.pixels.split_at_mut(half * w);
        let bottom_px = &mut rest_px[middle..];
        let (top_z, rest_z) = self.depth.split_at_mut(half * w);
        let bottom_z = &mut rest_z[middle..];

        match pool {
            Some(pool) => pool.install(|| {
                top_px
                    .par_chunks_mut(w)
                    .zip(top_z.par_chunks_mut(w))
                    .zip(bottom_px.par_chunks_mut(w).rev().zip(bottom_z.par_chunks_mut(w).rev()))
                    .take(rows)
                    .enumerate()
                    .for_each(|(y, ((tp, tz), (bp, bz)))| {
                        f(y, Row { pixels: tp, depth: tz }, Row { pixels: bp, depth: bz })
                    });
            }),
            None => top_px
                .chunks_mut(w)
                .zip(top_z.chunks_mut(w))
                .zip(bottom_px.chunks_mut(w).rev().zip(bottom_z.chunks_mut(w).rev()))
                .take(rows)
                .enumerate()
                .for_each(|(y, ((tp, tz), (bp, bz)))| {
                    f(y, Row { pixels: tp, depth: tz }, Row { pixels: bp, depth: bz })
                }),
        }
    }
}

/// Exclusive view of one scanline of a [`FrameBuffer`].
pub struct Row<'a> {
    pixels: &'a mut [u32],
    depth: &'a mut [f64],
}

impl Row<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn depth_at(&self, x: usize) -> f64 {
        self.depth[x]
    }

    /// If `depth` is nearer than the stored depth, store it and write
    /// `color` shaded by `brightness`. Returns whether the pixel changed.
    #[inline]
    pub fn set(&mut self, x: usize, depth: f64, brightness: f64, color: u32) -> bool {
        if depth < self.depth[x] {
            self.depth[x] = depth;
            self.pixels[x] = shade(color, brightness);
            true
        } else {
            false
        }
    }
}

/// Scale the RGB channels of an ARGB color by `brightness` in `[0, 1]`.
/// Alpha is kept.
#[inline]
pub fn shade(color: u32, brightness: f64) -> u32 {
    if brightness >= 1.0 {
        return color;
    }
    let scale = |shift: u32| ((((color >> shift) & 0xFF) as f64 * brightness) as u32) << shift;
    (color & 0xFF00_0000) | scale(16) | scale(8) | scale(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shade_scales_rgb_only() {
        assert_eq!(shade(0x80FF_8040, 1.0), 0x80FF_8040);
        assert_eq!(shade(0x80FF_8040, 0.5), 0x807F_4020);
        assert_eq!(shade(0xFFFF_FFFF, 0.0), 0xFF00_0000);
    }

    #[test]
    fn nearer_sample_wins() {
        let mut fb = FrameBuffer::new(4, 3);
        assert!(fb.set_pixel(1, 2, 3.0, 1.0, 0xFF11_1111));
        assert!(!fb.set_pixel(1, 2, 4.0, 1.0, 0xFF22_2222));
        assert!(!fb.set_pixel(1, 2, 3.0, 1.0, 0xFF33_3333));
        assert!(fb.set_pixel(1, 2, 2.0, 1.0, 0xFF44_4444));
        assert_eq!(fb.pixel(1, 2), 0xFF44_4444);
        assert_eq!(fb.depth_at(1, 2), 2.0);
        assert_eq!(fb.pixel(0, 0), BLACK);
    }

    #[test]
    fn clear_resets_depth() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.set_pixel(0, 0, 1.0, 1.0, 0xFFFF_FFFF);
        fb.clear();
        assert!(fb.depth().iter().all(|d| d.is_infinite()));
        assert!(fb.pixels().iter().all(|&p| p == BLACK));
    }

    #[test]
    fn rows_serial_and_parallel_agree() {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        let paint = |y: usize, mut row: Row<'_>| {
            for x in 0..row.len() {
                row.set(x, 1.0, 1.0, (y * 100 + x) as u32);
            }
        };
        let mut a = FrameBuffer::new(7, 5);
        let mut b = FrameBuffer::new(7, 5);
        a.for_each_row(None, paint);
        b.for_each_row(Some(&pool), paint);
        assert_eq!(a.pixels(), b.pixels());
        assert_eq!(a.pixel(3, 4), 403);
    }

    #[test]
    fn mirrored_pairs_cover_top_and_bottom() {
        for height in [6, 7] {
            let mut fb = FrameBuffer::new(3, height);
            fb.for_each_mirrored_pair(usize::MAX, None, |y, mut top, mut bottom| {
                top.set(0, 1.0, 1.0, y as u32);
                bottom.set(0, 1.0, 1.0, 100 + y as u32);
            });
            for y in 0..height / 2 {
                assert_eq!(fb.pixel(0, y), y as u32);
                assert_eq!(fb.pixel(0, height - 1 - y), 100 + y as u32);
            }
            if height % 2 == 1 {
                assert_eq!(fb.pixel(0, height / 2), BLACK);
            }
        }
    }

    #[test]
    fn mirrored_pairs_respect_row_limit() {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let mut fb = FrameBuffer::new(2, 10);
        fb.for_each_mirrored_pair(2, Some(&pool), |_, mut top, mut bottom| {
            top.set(1, 1.0, 1.0, 7);
            bottom.set(1, 1.0, 1.0, 7);
        });
        let written: Vec<usize> = (0..10).filter(|&y| fb.pixel(1, y) == 7).collect();
        assert_eq!(written, vec![0, 1, 8, 9]);
    }
}
