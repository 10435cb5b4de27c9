use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::tilemap::Tilemap;

use super::types::{Point, RegionId, Tile, WorldError};

/// Largest grid accepted. Keeps region ids and image dimensions within `u32`.
pub const MAX_TILES: usize = u32::MAX as usize;

/// Number of tiles in a `width` x `height` grid, rejecting empty and
/// oversized grids.
pub fn tile_count(width: usize, height: usize) -> Result<usize, WorldError> {
    if width == 0 {
        return Err(WorldError::InvalidDimension { name: "width", value: width });
    }
    if height == 0 {
        return Err(WorldError::InvalidDimension { name: "height", value: height });
    }
    match width.checked_mul(height) {
        Some(count) if count <= MAX_TILES => Ok(count),
        _ => Err(WorldError::TooManyTiles {
            width,
            height,
            limit: MAX_TILES,
        }),
    }
}

/// The cells of a world, each claimed by at most one region.
#[derive(Clone, Debug)]
pub struct TileGrid {
    tiles: Tilemap<Tile>,
    free: usize,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Result<Self, WorldError> {
        let free = tile_count(width, height)?;
        let tiles = Tilemap::from_fn(width, height, |x, y| Tile {
            region: None,
            pos: Point::new(x, y),
        });

        Ok(Self {
            tiles,
            free,
        })
    }

    pub fn width(&self) -> usize {
        self.tiles.width
    }

    pub fn height(&self) -> usize {
        self.tiles.height
    }

    /// Total number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of tiles no region has claimed yet.
    pub fn free_count(&self) -> usize {
        self.free
    }

    pub fn tile_at(&self, x: usize, y: usize) -> &Tile {
        self.tiles.get(x, y)
    }

    /// Tile at wrapped coordinates; `None` above the first or below the last row.
    pub fn wrapped_tile_at(&self, x: isize, y: isize) -> Option<&Tile> {
        self.tiles.get_wrapped(x, y)
    }

    pub fn region_at(&self, x: usize, y: usize) -> Option<RegionId> {
        self.tiles.get(x, y).region
    }

    /// Claim a tile for `region`. Returns false if it was already taken.
    pub fn claim(&mut self, pos: Point, region: RegionId) -> bool {
        let tile = self.tiles.get_mut(pos.x, pos.y);
        if tile.region.is_some() {
            return false;
        }
        tile.region = Some(region);
        self.free -= 1;
        true
    }

    /// Draw random coordinates until an unclaimed tile turns up.
    ///
    /// `max_tries = None` keeps drawing as long as free tiles exist. There is
    /// no scan fallback: a bounded search can miss free tiles.
    pub fn find_free_tile(
        &self,
        max_tries: Option<usize>,
        rng: &mut ChaCha8Rng,
    ) -> Result<Point, WorldError> {
        let mut attempts = 0;
        loop {
            if self.free == 0 || max_tries.is_some_and(|max| attempts >= max) {
                return Err(WorldError::NoFreeCellFound { attempts });
            }

            let x = rng.gen_range(0..self.width());
            let y = rng.gen_range(0..self.height());
            let tile = self.tiles.get(x, y);
            if tile.is_free() {
                return Ok(tile.pos);
            }
            attempts += 1;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().map(|(_, _, tile)| tile)
    }
}
