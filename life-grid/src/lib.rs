#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod board;
mod pattern;

pub use board::{Board, BoardError, Neighborhood, life_rule};
pub use pattern::{Pattern, PatternError};

use rand::SeedableRng;
use rand::prelude::*;
use rand::rngs::SmallRng;
use std::fmt;

pub type Rgba = [u8; 4];

/// Something the animation loop can draw and step once per tick.
pub trait World {
    fn draw(&self, canvas: &mut impl Canvas);
    fn update(&mut self);
}

/// Drawing surface in pixel coordinates, origin at the top left.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba);
    fn draw_line(&mut self, from: (u32, u32), to: (u32, u32), color: Rgba);
}

/// Board dimensions. `x` runs over `rows`, `y` over `cols`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub rows: u32,
    pub cols: u32,
}

impl GridSize {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// `None` if the cell count doesn't fit in `usize`.
    pub fn num_cells(&self) -> Option<usize> {
        (self.rows as usize).checked_mul(self.cols as usize)
    }

    /// Inverse of [`Loc::grid_index`].
    fn loc(&self, index: usize) -> Loc {
        let cols = self.cols as usize;
        Loc::new((index / cols) as i32, (index % cols) as i32)
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Loc {
    pub x: i32,
    pub y: i32,
}

impl Loc {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Option<Loc> {
        Some(Loc::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    pub fn grid_index(&self, size: GridSize) -> Option<usize> {
        if self.x >= 0 && (self.x as u32) < size.rows && self.y >= 0 && (self.y as u32) < size.cols
        {
            Some(self.x as usize * size.cols as usize + self.y as usize)
        } else {
            None
        }
    }
}

impl From<(i32, i32)> for Loc {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[derive(Debug)]
pub struct Random {
    rng: SmallRng,
}

impl Random {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn next_bool(&mut self, p: f64) -> bool {
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}
