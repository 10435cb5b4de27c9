use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index of a region inside the world's region list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u32);

impl RegionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One grid cell. `region` is set once when a region claims the tile and
/// never changes afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Tile {
    pub region: Option<RegionId>,
    pub pos: Point,
}

impl Tile {
    pub fn is_free(&self) -> bool {
        self.region.is_none()
    }
}

/// Errors produced by world generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("invalid {name}: {value} (must be positive)")]
    InvalidDimension { name: &'static str, value: usize },
    #[error("{width}x{height} grid exceeds {limit} tiles")]
    TooManyTiles {
        width: usize,
        height: usize,
        limit: usize,
    },
    #[error("no free tile found after {attempts} attempts")]
    NoFreeCellFound { attempts: usize },
}
