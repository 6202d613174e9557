use std::collections::BTreeMap;

use crate::error::{EngineError, Result};

/// Material reported for any cell outside the map. Makes the border an
/// implicit wall so rays and movement always stop there.
pub const SOLID_BORDER: u8 = 255;

/// Billboard objects a map can place. Resolved from map letters at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpriteKind {
    Gargoyle,
    Hero,
    Treasure,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 3] = [SpriteKind::Gargoyle, SpriteKind::Hero, SpriteKind::Treasure];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'g' => Some(Self::Gargoyle),
            'h' => Some(Self::Hero),
            't' => Some(Self::Treasure),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Gargoyle => 'g',
            Self::Hero => 'h',
            Self::Treasure => 't',
        }
    }

    /// Billboard height as a fraction of a full wall column.
    pub fn size_factor(self) -> f64 {
        match self {
            Self::Gargoyle => 0.8,
            Self::Hero => 0.7,
            Self::Treasure => 0.6,
        }
    }
}

/// Tile map. Row 0 of `cells` is the southernmost row: the textual
/// definition is flipped on load so +Y points north.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldMap {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    sprites: BTreeMap<(i32, i32), SpriteKind>,
    player_start: (i32, i32),
}

impl WorldMap {
    /// Parse rows of equal length. Digits are wall materials (0 = open),
    /// `s` marks the player start, `g`/`h`/`t` place sprites, anything
    /// else is open floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        if width == 0 {
            return Err(EngineError::EmptyMap);
        }
        let height = rows.len();

        let mut cells = Vec::with_capacity(width * height);
        let mut sprites = BTreeMap::new();
        let mut player_start = (1, 1);

        for (y, line) in rows.iter().rev().enumerate() {
            let line = line.as_ref();
            let len = line.chars().count();
            if len != width {
                return Err(EngineError::RaggedMap {
                    row: height - 1 - y,
                    expected: width,
                    actual: len,
                });
            }
            for (x, c) in line.chars().enumerate() {
                let cell = (x as i32, y as i32);
                if c == 's' {
                    player_start = cell;
                } else if let Some(kind) = SpriteKind::from_char(c) {
                    sprites.insert(cell, kind);
                }
                cells.push(c.to_digit(10).map_or(0, |d| d as u8));
            }
        }

        Ok(Self {
            width,
            height,
            cells,
            sprites,
            player_start,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn player_start(&self) -> (i32, i32) {
        self.player_start
    }

    /// Material at an in-bounds cell. Callers bounds-check; see [`Self::map_square`].
    #[inline]
    pub fn get_wall(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    /// Material at an integer cell, or [`SOLID_BORDER`] outside the map.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return SOLID_BORDER;
        }
        self.get_wall(x as usize, y as usize)
    }

    /// Material of the cell containing map-space point `(x, y)`.
    #[inline]
    pub fn map_square(&self, x: f64, y: f64) -> u8 {
        self.cell(x.floor() as i32, y.floor() as i32)
    }

    /// Sprites in cell order (by x, then y).
    pub fn sprites(&self) -> impl ExactSizeIterator<Item = ((i32, i32), SpriteKind)> + '_ {
        self.sprites.iter().map(|(&cell, &kind)| (cell, kind))
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Put a sprite in a cell, replacing any sprite already there.
    pub fn place_sprite(&mut self, cell: (i32, i32), kind: SpriteKind) -> Option<SpriteKind> {
        self.sprites.insert(cell, kind)
    }

    pub fn remove_sprite(&mut self, cell: (i32, i32)) -> Option<SpriteKind> {
        self.sprites.remove(&cell)
    }

    /// Distinct non-zero wall materials used by the map, ascending.
    pub fn materials(&self) -> Vec<u8> {
        let mut seen = [false; 256];
        for &c in &self.cells {
            seen[c as usize] = true;
        }
        (1..=255u8).filter(|&m| seen[m as usize]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> WorldMap {
        WorldMap::from_rows(&[
            "11111",
            "1g.t1",
            "1.2x1",
            "1s..1",
            "11911",
        ])
        .unwrap()
    }

    #[test]
    fn y_axis_is_flipped() {
        let map = sample_map();
        assert_eq!((map.width(), map.height()), (5, 5));
        // bottom text row becomes row 0
        assert_eq!(map.get_wall(2, 0), 9);
        assert_eq!(map.get_wall(2, 2), 2);
        assert_eq!(map.get_wall(1, 4), 1);
    }

    #[test]
    fn letters_become_open_floor() {
        let map = sample_map();
        assert_eq!(map.player_start(), (1, 1));
        assert_eq!(map.get_wall(1, 1), 0);
        assert_eq!(map.get_wall(1, 3), 0);
        // unrecognised character
        assert_eq!(map.get_wall(3, 2), 0);
    }

    #[test]
    fn sprites_are_recorded_in_cell_order() {
        let map = sample_map();
        let sprites: Vec<_> = map.sprites().collect();
        assert_eq!(
            sprites,
            vec![((1, 3), SpriteKind::Gargoyle), ((3, 3), SpriteKind::Treasure)]
        );
    }

    #[test]
    fn out_of_bounds_is_solid() {
        let map = sample_map();
        assert_eq!(map.cell(-1, 0), SOLID_BORDER);
        assert_eq!(map.cell(0, 5), SOLID_BORDER);
        assert_eq!(map.map_square(-0.01, 2.5), SOLID_BORDER);
        assert_eq!(map.map_square(1.5, 1.5), 0);
        assert_eq!(map.map_square(2.99, 2.01), 2);
    }

    #[test]
    fn materials_lists_distinct_walls() {
        assert_eq!(sample_map().materials(), vec![1, 2, 9]);
    }

    #[test]
    fn sprite_set_can_change_between_frames() {
        let mut map = sample_map();
        assert_eq!(map.remove_sprite((1, 3)), Some(SpriteKind::Gargoyle));
        assert_eq!(map.place_sprite((2, 1), SpriteKind::Hero), None);
        assert_eq!(map.sprite_count(), 2);
    }

    #[test]
    fn rejects_empty_and_ragged_maps() {
        let empty: [&str; 0] = [];
        assert!(matches!(WorldMap::from_rows(&empty), Err(EngineError::EmptyMap)));
        assert!(matches!(WorldMap::from_rows(&[""]), Err(EngineError::EmptyMap)));
        assert!(matches!(
            WorldMap::from_rows(&["111", "11", "111"]),
            Err(EngineError::RaggedMap {
                row: 1,
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn sprite_kind_table() {
        for kind in SpriteKind::ALL {
            assert_eq!(SpriteKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(SpriteKind::from_char('x'), None);
        assert_eq!(SpriteKind::Gargoyle.size_factor(), 0.8);
    }
}
