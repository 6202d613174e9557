use std::fmt;

use crate::texture::TEXTURE_SIZE;
use crate::world::SpriteKind;

/// Errors raised while building textures, maps or the engine.
///
/// Nothing inside `tick()` returns an error; everything that could fail is
/// checked up front.
#[derive(Debug)]
pub enum EngineError {
    /// A texture is not `TEXTURE_SIZE` x `TEXTURE_SIZE`.
    TextureSize { width: usize, height: usize },
    /// Pixel slice length does not match the declared dimensions.
    PixelCount { expected: usize, actual: usize },
    /// The map definition has no rows, or its rows are empty.
    EmptyMap,
    /// A map row differs in length from the first row.
    RaggedMap {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// The map uses a wall material that has no texture.
    MissingWallTexture(u8),
    /// The map places a sprite kind that has no texture.
    MissingSpriteTexture(SpriteKind),
    InvalidConfig(String),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextureSize { width, height } => write!(
                f,
                "texture is {width}x{height}, expected {TEXTURE_SIZE}x{TEXTURE_SIZE}"
            ),
            Self::PixelCount { expected, actual } => {
                write!(f, "expected {expected} pixels, got {actual}")
            }
            Self::EmptyMap => write!(f, "map definition is empty"),
            Self::RaggedMap {
                row,
                expected,
                actual,
            } => write!(
                f,
                "map row {row} has length {actual}, expected {expected}"
            ),
            Self::MissingWallTexture(id) => write!(f, "no texture for wall material {id}"),
            Self::MissingSpriteTexture(kind) => write!(f, "no texture for sprite kind {kind:?}"),
            Self::InvalidConfig(msg) => write!(f, "invalid engine configuration: {msg}"),
            Self::ThreadPool(err) => write!(f, "could not build render thread pool: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ThreadPool(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for EngineError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = EngineError::TextureSize {
            width: 32,
            height: 64,
        };
        assert_eq!(err.to_string(), "texture is 32x64, expected 64x64");

        let err = EngineError::RaggedMap {
            row: 3,
            expected: 10,
            actual: 9,
        };
        assert_eq!(err.to_string(), "map row 3 has length 9, expected 10");

        let err = EngineError::MissingSpriteTexture(SpriteKind::Hero);
        assert_eq!(err.to_string(), "no texture for sprite kind Hero");
    }
}
