use crate::error::{EngineError, Result};

/// Tunables for a [`crate::RaycastEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Horizontal field of view, radians.
    pub field_of_view: f64,
    /// Distance at which everything fades to black and rays give up.
    pub black_distance: f64,
    /// Worker count. `None` picks half the available cores, at least one.
    pub threads: Option<usize>,
    /// `false` renders every pass on the calling thread. Output is identical.
    pub multithreaded: bool,
    /// Sprites nearer than this are not drawn.
    pub sprite_near_clip: f64,
    /// Minimum distance kept between the camera and any wall.
    pub wall_margin: f64,
    /// Added to the projected floor/ceiling distance. Visual calibration only.
    pub floor_distance_offset: f64,
    /// Sprite texels with alpha at or below this are transparent.
    pub sprite_alpha_threshold: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            field_of_view: 80f64.to_radians(),
            black_distance: 4.5,
            threads: None,
            multithreaded: true,
            sprite_near_clip: 0.2,
            wall_margin: 0.1,
            floor_distance_offset: 0.0,
            sprite_alpha_threshold: 200,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `WOLFCAST_THREADS` (0 = single threaded) and
    /// `WOLFCAST_FOV_DEGREES`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("WOLFCAST_THREADS") {
            match raw.trim().parse::<usize>() {
                Ok(0) => self.multithreaded = false,
                Ok(n) => self.threads = Some(n),
                Err(_) => tracing::warn!(value = %raw, "ignoring unparsable WOLFCAST_THREADS"),
            }
        }
        if let Some(raw) = lookup("WOLFCAST_FOV_DEGREES") {
            match raw.trim().parse::<f64>() {
                Ok(deg) => self.field_of_view = deg.to_radians(),
                Err(_) => tracing::warn!(value = %raw, "ignoring unparsable WOLFCAST_FOV_DEGREES"),
            }
        }
        self
    }

    pub fn with_field_of_view_degrees(mut self, degrees: f64) -> Self {
        self.field_of_view = degrees.to_radians();
        self
    }

    pub fn with_black_distance(mut self, distance: f64) -> Self {
        self.black_distance = distance;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn single_threaded(mut self) -> Self {
        self.multithreaded = false;
        self
    }

    /// Resolved worker count for the render pool.
    pub fn worker_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
            (cores / 2).max(1)
        })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_field_of_view(self.field_of_view)?;
        check_black_distance(self.black_distance)?;
        if self.threads == Some(0) {
            return Err(EngineError::InvalidConfig(
                "thread count must be at least 1".into(),
            ));
        }
        if !(self.wall_margin > 0.0 && self.wall_margin < 0.5) {
            return Err(EngineError::InvalidConfig(format!(
                "wall margin {} outside (0, 0.5)",
                self.wall_margin
            )));
        }
        if !(self.sprite_near_clip > 0.0 && self.sprite_near_clip.is_finite()) {
            return Err(EngineError::InvalidConfig(format!(
                "sprite near clip {} must be positive and finite",
                self.sprite_near_clip
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_field_of_view(fov: f64) -> Result<()> {
    if fov > 0.0 && fov < std::f64::consts::PI {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "field of view {fov} rad outside (0, pi)"
        )))
    }
}

pub(crate) fn check_black_distance(distance: f64) -> Result<()> {
    if distance > 0.0 && distance.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "black distance {distance} must be positive and finite"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.worker_threads() >= 1);
        assert!((cfg.field_of_view.to_degrees() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(EngineConfig::default().with_field_of_view_degrees(180.0).validate().is_err());
        assert!(EngineConfig::default().with_field_of_view_degrees(0.0).validate().is_err());
        assert!(EngineConfig::default().with_black_distance(-1.0).validate().is_err());
        assert!(EngineConfig::default().with_black_distance(f64::INFINITY).validate().is_err());
        assert!(EngineConfig::default().with_threads(0).validate().is_err());
    }

    #[test]
    fn margins_must_be_positive() {
        let flush = EngineConfig {
            wall_margin: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(flush.validate(), Err(EngineError::InvalidConfig(_))));
        let wide = EngineConfig {
            wall_margin: 0.5,
            ..EngineConfig::default()
        };
        assert!(wide.validate().is_err());
        for clip in [0.0, -0.2, f64::NAN] {
            let cfg = EngineConfig {
                sprite_near_clip: clip,
                ..EngineConfig::default()
            };
            assert!(cfg.validate().is_err(), "near clip {clip}");
        }
    }

    #[test]
    fn env_overrides() {
        let cfg = EngineConfig::default().with_overrides(|key| match key {
            "WOLFCAST_THREADS" => Some("3".into()),
            "WOLFCAST_FOV_DEGREES" => Some(" 66 ".into()),
            _ => None,
        });
        assert_eq!(cfg.threads, Some(3));
        assert!(cfg.multithreaded);
        assert!((cfg.field_of_view.to_degrees() - 66.0).abs() < 1e-9);

        let cfg = EngineConfig::default().with_overrides(|key| {
            (key == "WOLFCAST_THREADS").then(|| "0".to_string())
        });
        assert!(!cfg.multithreaded);

        let cfg = EngineConfig::default().with_overrides(|_| Some("lots".into()));
        assert_eq!(cfg, EngineConfig::default());
    }
}
