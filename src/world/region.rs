use image::Rgba;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::biomes::{BiomeId, BiomePalette};
use crate::tilemap::NEIGHBOR_OFFSETS;

use super::grid::TileGrid;
use super::types::{Point, RegionId};

/// A region grown outward from a single seed tile.
#[derive(Clone, Debug)]
pub struct Region {
    pub id: RegionId,
    /// Seed tile. Informational only, growth never looks at it.
    pub origin: Point,
    pub biome: BiomeId,
    /// Per-region display color. Rendering uses the biome color instead.
    pub color: Rgba<u8>,
    /// Claimed tiles that have not been expanded yet.
    frontier: Vec<Point>,
    tiles: usize,
}

impl Region {
    pub fn new(id: RegionId, origin: Point, biome: BiomeId, color: Rgba<u8>) -> Self {
        Self {
            id,
            origin,
            biome,
            color,
            frontier: Vec::new(),
            tiles: 0,
        }
    }

    /// Region with a random display color and a random biome from `palette`.
    pub fn random(
        id: RegionId,
        origin: Point,
        palette: &BiomePalette,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let color = random_color(rng);
        let biome = palette.random(rng);
        Self::new(id, origin, biome, color)
    }

    /// Claim the seed tile and put it on the frontier.
    /// The tile must be free.
    pub fn claim_seed(&mut self, grid: &mut TileGrid, pos: Point) {
        let claimed = self.claim(grid, pos);
        debug_assert!(claimed, "seed tile {:?} already claimed", pos);
    }

    fn claim(&mut self, grid: &mut TileGrid, pos: Point) -> bool {
        if grid.claim(pos, self.id) {
            self.frontier.push(pos);
            self.tiles += 1;
            true
        } else {
            false
        }
    }

    /// Expand one random frontier tile into its free 8-neighbors.
    ///
    /// Returns false once the frontier is empty, true otherwise (even if no
    /// neighbor could be claimed).
    pub fn expand_once(&mut self, grid: &mut TileGrid, rng: &mut ChaCha8Rng) -> bool {
        if self.frontier.is_empty() {
            return false;
        }

        let i = rng.gen_range(0..self.frontier.len());
        let pos = self.frontier.swap_remove(i);

        for &(dx, dy) in NEIGHBOR_OFFSETS.iter() {
            let neighbor = grid
                .wrapped_tile_at(pos.x as isize + dx, pos.y as isize + dy)
                .filter(|tile| tile.is_free())
                .map(|tile| tile.pos);
            if let Some(neighbor) = neighbor {
                self.claim(grid, neighbor);
            }
        }

        true
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// True once no frontier tile is left to expand.
    pub fn is_exhausted(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Number of tiles this region has claimed.
    pub fn tile_count(&self) -> usize {
        self.tiles
    }
}

/// Opaque color with each RGB channel in `[0, 255)`.
pub fn random_color(rng: &mut ChaCha8Rng) -> Rgba<u8> {
    Rgba([
        rng.gen_range(0..0xFF),
        rng.gen_range(0..0xFF),
        rng.gen_range(0..0xFF),
        0xFF,
    ])
}
