use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source column/row for every destination pixel.
#[derive(Debug, Clone, Default)]
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn dst_width(&self) -> usize {
        self.src_x.len()
    }

    pub fn dst_height(&self) -> usize {
        self.src_y.len()
    }
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    let axis = |dst: usize, src: usize| -> Vec<usize> {
        (0..dst)
            .map(|d| (d * src / dst.max(1)).min(src.saturating_sub(1)))
            .collect()
    };
    ScaleLut {
        src_x: axis(dst_w, src_w),
        src_y: axis(dst_h, src_h),
    }
}

/// Parallel nearest-neighbour stretch of ARGB `src` into 0RGB `dst`, the
/// layout softbuffer expects. Rows are processed in parallel.
pub fn blit_nearest(dst: &mut [u32], dw: usize, src: &[u32], sw: usize, lut: &ScaleLut) {
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let Some(&sy) = lut.src_y.get(y) else {
            return;
        };
        let src_row = &src[sy * sw..(sy + 1) * sw];
        for (d, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
            *d = src_row[sx] & 0x00FF_FFFF;
        }
    });
}
