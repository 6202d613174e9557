use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::config::{check_black_distance, check_field_of_view};
use crate::error::Result;
use crate::vector::Vec2;
use crate::world::WorldMap;

/// Viewer state. `plane` is always perpendicular to `direction` and scaled
/// by `tan(fov / 2)`; every mutator that touches one recomputes both.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec2,
    direction: Vec2, // unit length
    plane: Vec2,     // points to the right of `direction`
    field_of_view: f64,
    black_distance: f64,
}

impl Camera {
    pub fn new(position: Vec2, facing: f64, field_of_view: f64, black_distance: f64) -> Result<Self> {
        check_field_of_view(field_of_view)?;
        check_black_distance(black_distance)?;
        let mut camera = Self {
            position,
            direction: Vec2::new(0.0, 1.0),
            plane: Vec2::ZERO,
            field_of_view,
            black_distance,
        };
        camera.rotate_to(facing);
        Ok(camera)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    #[inline]
    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    #[inline]
    pub fn black_distance(&self) -> f64 {
        self.black_distance
    }

    /// Place the camera without any collision check.
    #[inline]
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn rotate(&mut self, delta: f64) {
        self.rotate_to(self.direction.angle() + delta);
    }

    pub fn rotate_to(&mut self, angle: f64) {
        self.direction = Vec2::from_angle(angle);
        self.plane = Vec2::from_angle(angle - FRAC_PI_2) * (0.5 * self.field_of_view).tan();
    }

    pub fn set_field_of_view(&mut self, fov: f64) -> Result<()> {
        check_field_of_view(fov)?;
        self.field_of_view = fov;
        self.rotate(0.0);
        Ok(())
    }

    pub fn set_black_distance(&mut self, distance: f64) -> Result<()> {
        check_black_distance(distance)?;
        self.black_distance = distance;
        Ok(())
    }

    /// Distance from the eye to a virtual screen of unit height, for a
    /// `width` x `height` viewport.
    #[inline]
    pub fn screen_distance(&self, width: usize, height: usize) -> f64 {
        0.5 / ((0.5 * self.field_of_view).tan() * height as f64 / width as f64)
    }

    /// Ray through screen column `column`. Not normalized: its component
    /// along `direction` is always 1, so ray parameters are perpendicular
    /// distances.
    #[inline]
    pub fn ray_direction(&self, column: usize, width: usize) -> Vec2 {
        let camera_x = 2.0 * column as f64 / width as f64 - 1.0;
        self.direction + self.plane * camera_x
    }

    /// Map-space point to camera space: `x` to the right, `y` forward.
    #[inline]
    pub fn world_to_camera(&self, p: Vec2) -> Vec2 {
        let mut v = p - self.position;
        v.rotate(FRAC_PI_2 - self.direction.angle());
        v
    }

    /// Signed angle from the view direction to `p`, in `[-pi, pi]`.
    /// Positive means right of center.
    pub fn view_angle_to(&self, p: Vec2) -> f64 {
        let mut angle = self.direction.angle() - (p - self.position).angle();
        if angle < -PI {
            angle += TAU;
        } else if angle > PI {
            angle -= TAU;
        }
        angle
    }

    /// Distance fade: 1 at the eye, 0 at and beyond `black_distance`.
    #[inline]
    pub fn brightness(&self, distance: f64) -> f64 {
        (1.0 - distance / self.black_distance).max(0.0)
    }

    pub fn move_forward_or_back(&mut self, map: &WorldMap, amount: f64, margin: f64) {
        let candidate = self.position + self.direction.normalized() * amount;
        self.move_to(map, candidate, margin);
    }

    /// Positive `amount` strafes right.
    pub fn move_left_or_right(&mut self, map: &WorldMap, amount: f64, margin: f64) {
        let d = self.direction.normalized();
        let candidate = self.position + Vec2::new(d.y, -d.x) * amount;
        self.move_to(map, candidate, margin);
    }

    /// Move to `candidate` unless it is inside a wall; on each axis, keep
    /// at least `margin` between the camera and a neighbouring wall.
    fn move_to(&mut self, map: &WorldMap, candidate: Vec2, margin: f64) -> bool {
        let (mut x, mut y) = (candidate.x, candidate.y);
        if map.map_square(x, y) != 0 {
            return false;
        }
        if map.map_square(x + margin, y) != 0 {
            x = x.floor() + 1.0 - margin;
        }
        if map.map_square(x - margin, y) != 0 {
            x = x.floor() + margin;
        }
        if map.map_square(x, y + margin) != 0 {
            y = y.floor() + 1.0 - margin;
        }
        if map.map_square(x, y - margin) != 0 {
            y = y.floor() + margin;
        }
        self.position = Vec2::new(x, y);
        true
    }
}
