use rayon::ThreadPool;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::camera::Camera;
use crate::framebuffer::{BLACK, FrameBuffer};
use crate::texture::{Texture, TextureSet};
use crate::vector::Vec2;
use crate::world::{SpriteKind, WorldMap};

/// Which kind of grid line the ray crossed on its final step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Crossed a vertical grid line (constant x): an east or west face.
    EastWest,
    /// Crossed a horizontal grid line (constant y): a north or south face.
    NorthSouth,
}

/// Result of casting one ray through the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub material: u8,
    pub side: Side,
    /// Perpendicular distance from the camera plane, not the ray length.
    pub distance: f64,
    /// Position along the wall face, in `[0, 1)`.
    pub texture_u: f64,
    pub cell: (i32, i32),
}

/// Per-column output of the wall pass, consumed by the floor/ceiling pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnHit {
    pub hit: Option<RayHit>,
    pub ray: Vec2,
    pub depth: f64,
    pub brightness: f64,
    /// Rows of open space above the wall top. Negative when the wall
    /// overflows the screen.
    pub ceiling: i32,
}

/// Screen rows above a wall seen at `distance` (similar triangles).
/// Clamped so a wall or sprite right at the eye stays a few screens tall
/// instead of overflowing the row arithmetic.
#[inline]
fn ceiling_size(height: usize, screen_distance: f64, distance: f64) -> i32 {
    let h = height as f64;
    (h * (1.0 - screen_distance / distance) / 2.0).clamp(-4.0 * h, h / 2.0) as i32
}

/// Walk the grid from the camera along the ray for `column` until a
/// non-empty cell. Returns `None` when nothing is hit within the
/// camera's black distance.
pub fn cast_ray(map: &WorldMap, camera: &Camera, column: usize, width: usize) -> Option<RayHit> {
    let ray = camera.ray_direction(column, width);
    cast(map, camera, ray)
}

fn cast(map: &WorldMap, camera: &Camera, ray: Vec2) -> Option<RayHit> {
    let pos = camera.position();
    let max = camera.black_distance();

    let mut map_x = pos.x.floor() as i32;
    let mut map_y = pos.y.floor() as i32;

    // ray parameter between successive x (resp. y) grid lines
    let delta_x = if ray.x == 0.0 { f64::INFINITY } else { (1.0 / ray.x).abs() };
    let delta_y = if ray.y == 0.0 { f64::INFINITY } else { (1.0 / ray.y).abs() };

    let (step_x, mut side_x) = if ray.x < 0.0 {
        (-1, (pos.x - map_x as f64) * delta_x)
    } else {
        (1, (map_x as f64 + 1.0 - pos.x) * delta_x)
    };
    let (step_y, mut side_y) = if ray.y < 0.0 {
        (-1, (pos.y - map_y as f64) * delta_y)
    } else {
        (1, (map_y as f64 + 1.0 - pos.y) * delta_y)
    };

    let (material, side) = loop {
        // everything past here is beyond black distance
        if side_x.min(side_y) > max {
            return None;
        }
        let side = if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            Side::EastWest
        } else {
            side_y += delta_y;
            map_y += step_y;
            Side::NorthSouth
        };
        let material = map.cell(map_x, map_y);
        if material != 0 {
            break (material, side);
        }
    };

    let distance = match side {
        Side::EastWest => (map_x as f64 - pos.x + (1 - step_x) as f64 / 2.0) / ray.x,
        Side::NorthSouth => (map_y as f64 - pos.y + (1 - step_y) as f64 / 2.0) / ray.y,
    };
    if !(distance > 0.0 && distance <= max) {
        return None;
    }

    let along = match side {
        Side::EastWest => pos.y + distance * ray.y,
        Side::NorthSouth => pos.x + distance * ray.x,
    };
    Some(RayHit {
        material,
        side,
        distance,
        texture_u: along - along.floor(),
        cell: (map_x, map_y),
    })
}

/// Cast one ray per column into `out`, in parallel over column ranges.
pub(crate) fn cast_columns(
    map: &WorldMap,
    camera: &Camera,
    width: usize,
    height: usize,
    pool: Option<&ThreadPool>,
    out: &mut Vec<ColumnHit>,
) {
    let screen_distance = camera.screen_distance(width, height);
    let column = |x: usize| {
        let ray = camera.ray_direction(x, width);
        let hit = cast(map, camera, ray);
        let (depth, brightness) = match hit {
            Some(h) => (h.distance, camera.brightness(h.distance)),
            // void column: opaque black at the fade distance
            None => (camera.black_distance(), 1.0),
        };
        ColumnHit {
            hit,
            ray,
            depth,
            brightness,
            ceiling: ceiling_size(height, screen_distance, depth),
        }
    };
    match pool {
        Some(pool) => pool.install(|| (0..width).into_par_iter().map(column).collect_into_vec(out)),
        None => {
            out.clear();
            out.extend((0..width).map(column));
        }
    }
}

/// Textured wall spans, one per column, rasterized row by row.
pub(crate) fn draw_walls(
    fb: &mut FrameBuffer,
    columns: &[ColumnHit],
    textures: &TextureSet,
    pool: Option<&ThreadPool>,
) {
    let height = fb.height() as i32;
    fb.for_each_row(pool, |y, mut row| {
        let y = y as i32;
        for (x, col) in columns.iter().enumerate() {
            let top = col.ceiling.max(0);
            if y < top || y >= height - top {
                continue;
            }
            let color = match col.hit.and_then(|h| textures.wall(h.material).map(|t| (h, t))) {
                Some((hit, texture)) => {
                    let wall_height = (height - 2 * col.ceiling) as f64;
                    texture.sample(hit.texture_u, (y - col.ceiling) as f64 / wall_height)
                }
                None => BLACK,
            };
            row.set(x, col.depth, col.brightness, color);
        }
    });
}

/// Floor and ceiling, one mirrored row pair per task. Rows at or past the
/// tallest column ceiling cannot show any floor, so they are skipped.
pub(crate) fn draw_floor_and_ceiling(
    fb: &mut FrameBuffer,
    columns: &[ColumnHit],
    camera: &Camera,
    textures: &TextureSet,
    distance_offset: f64,
    pool: Option<&ThreadPool>,
) {
    let max_ceiling = columns.iter().map(|c| c.ceiling).max().unwrap_or(0);
    if max_ceiling <= 0 {
        return;
    }
    let (width, height) = (fb.width(), fb.height());
    let screen_distance = camera.screen_distance(width, height);
    let fade_rows = ceiling_size(height, screen_distance, camera.black_distance()).max(0);
    let rows = max_ceiling.min(fade_rows) as usize;
    let pos = camera.position();

    fb.for_each_mirrored_pair(rows, pool, |y, mut ceiling_row, mut floor_row| {
        let screen_y = 0.5 - y as f64 / height as f64;
        let ground = 0.5 * screen_distance / screen_y + distance_offset;
        let brightness = camera.brightness(ground);
        for (x, col) in columns.iter().enumerate() {
            if y as i32 >= col.ceiling || ground >= ceiling_row.depth_at(x) {
                continue;
            }
            // floor and ceiling mirror each other around the horizon
            let p = pos + col.ray * ground;
            ceiling_row.set(x, ground, brightness, textures.ceiling.sample(p.x, p.y));
            floor_row.set(x, ground, brightness, textures.floor.sample(p.x, p.y));
        }
    });
}

/// Screen-space footprint of one sprite.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Billboard<'a> {
    pub texture: &'a Texture,
    pub depth: f64,
    pub brightness: f64,
    pub center: f64,
    pub x0: usize,
    pub x1: usize,
    pub top: usize,
    pub rows: usize,
    pub texture_row_offset: usize,
    pub size: usize,
}

pub(crate) struct SpriteParams {
    pub width: usize,
    pub height: usize,
    pub near_clip: f64,
}

/// Project a sprite standing in `cell` to a square billboard, or `None`
/// if it is behind the camera, out of view, too near or too far.
pub(crate) fn project_sprite<'a>(
    camera: &Camera,
    cell: (i32, i32),
    kind: SpriteKind,
    texture: &'a Texture,
    params: &SpriteParams,
) -> Option<Billboard<'a>> {
    let (w, h) = (params.width as i32, params.height as i32);
    let center = Vec2::new(cell.0 as f64 + 0.5, cell.1 as f64 + 0.5);
    let distance = (center - camera.position()).magnitude();
    let view_angle = camera.view_angle_to(center);
    let fov = camera.field_of_view();
    // a little wider than the view so sprites at the edge still show partly
    if distance >= camera.black_distance() || view_angle.abs() >= fov / 1.4 {
        return None;
    }
    let perpendicular = camera.world_to_camera(center).y;
    if perpendicular < params.near_clip {
        return None;
    }

    let middle = ((0.5 + 0.5 * view_angle.tan() / (0.5 * fov).tan()) * w as f64) as i32;
    let screen_distance = camera.screen_distance(params.width, params.height);
    let ceiling = ceiling_size(params.height, screen_distance, perpendicular);
    let column_height = h - 2 * ceiling;
    let size_factor = kind.size_factor();

    // stand on the floor: leave the top (1 - size) of the column empty
    let mut top = ((1.0 - size_factor) * column_height as f64) as i32 + ceiling;
    let mut texture_row_offset = 0;
    if top < 0 {
        texture_row_offset = -top;
        top = 0;
    }
    let size = (size_factor * column_height as f64) as i32;
    let half = size as f64 / 2.0;
    let x0 = ((middle as f64 - half) as i32).max(0);
    let x1 = ((middle as f64 + half) as i32).min(w);
    let rows = size.min(h - top);
    if size <= 0 || rows <= 0 || x0 >= x1 {
        return None;
    }

    Some(Billboard {
        texture,
        depth: perpendicular,
        brightness: camera.brightness(perpendicular),
        center: middle as f64,
        x0: x0 as usize,
        x1: x1 as usize,
        top: top as usize,
        rows: rows as usize,
        texture_row_offset: texture_row_offset as usize,
        size: size as usize,
    })
}

/// Project every sprite of the map, one task per sprite. Order follows the
/// map's cell order regardless of threading.
pub(crate) fn project_sprites<'a>(
    map: &WorldMap,
    camera: &Camera,
    textures: &'a TextureSet,
    params: &SpriteParams,
    pool: Option<&ThreadPool>,
) -> Vec<Billboard<'a>> {
    let sprites: Vec<_> = map.sprites().collect();
    let project = |&(cell, kind): &((i32, i32), SpriteKind)| {
        let Some(texture) = textures.sprite(kind) else {
            tracing::warn!(?kind, x = cell.0, y = cell.1, "skipping sprite without texture");
            return None;
        };
        project_sprite(camera, cell, kind, texture, params)
    };
    match pool {
        Some(pool) => pool.install(|| sprites.par_iter().filter_map(project).collect()),
        None => sprites.iter().filter_map(project).collect(),
    }
}

/// Composite billboards through the depth test, alpha as a cutout mask.
/// Each row task walks every billboard crossing it, so writes never race.
pub(crate) fn draw_sprites(
    fb: &mut FrameBuffer,
    billboards: &[Billboard<'_>],
    alpha_threshold: u8,
    pool: Option<&ThreadPool>,
) {
    if billboards.is_empty() {
        return;
    }
    fb.for_each_row(pool, |y, mut row| {
        for b in billboards {
            if y < b.top || y >= b.top + b.rows {
                continue;
            }
            let v = (y - b.top + b.texture_row_offset) as f64 / b.size as f64;
            for x in b.x0..b.x1 {
                let u = (x as f64 - b.center) / b.size as f64 + 0.5;
                let texel = b.texture.sample(u, v);
                if texel >> 24 > alpha_threshold as u32 {
                    row.set(x, b.depth, b.brightness, texel);
                }
            }
        }
    });
}
