use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::biomes::{Biome, BiomePalette};
use crate::timing::Timed;

use super::grid::{self, TileGrid};
use super::region::Region;
use super::types::{Point, RegionId, WorldError};

/// Smallest burst cap used by the expansion loop. Bursts are drawn from
/// `[0, cap)`, so a cap below 2 would never expand anything.
const MIN_BURST_CAP: usize = 2;

/// Parameters for one generation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Width (x-axis) in tiles, one tile per pixel
    pub width: usize,
    /// Height (y-axis) in tiles
    pub height: usize,
    /// Number of regions to seed
    pub regions: usize,
    /// RNG seed; identical configs produce identical worlds
    pub seed: u64,
}

impl WorldConfig {
    pub fn new(width: usize, height: usize, regions: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            regions,
            seed,
        }
    }

    pub fn with_seed(&self, seed: u64) -> Self {
        Self { seed, ..self.clone() }
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        grid::tile_count(self.width, self.height)?;
        if self.regions == 0 {
            return Err(WorldError::InvalidDimension {
                name: "region count",
                value: self.regions,
            });
        }
        Ok(())
    }

    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(2048, 1024, 250, chrono::Utc::now().timestamp() as u64)
    }
}

/// A grid partitioned into randomly grown regions.
#[derive(Clone, Debug)]
pub struct World {
    grid: TileGrid,
    palette: BiomePalette,
    regions: Vec<Region>,
    /// Regions that may still have room to grow.
    expanders: Vec<RegionId>,
    requested_regions: usize,
    max_expansions: usize,
}

impl World {
    /// Generate a complete world from `config`.
    pub fn generate(config: &WorldConfig) -> Result<Self, WorldError> {
        let mut rng = config.rng();
        Self::generate_with_rng(config.width, config.height, config.regions, &mut rng)
    }

    /// Seed `region_count` regions and grow them until none can expand.
    pub fn generate_with_rng(
        width: usize,
        height: usize,
        region_count: usize,
        rng: &mut ChaCha8Rng,
    ) -> Result<Self, WorldError> {
        let mut world = Self::with_regions(width, height, region_count, rng)?;
        world.expand_regions(None, None, rng);

        log::info!(
            "Generated {}x{} world: {} of {} regions, {} tiles unclaimed",
            width,
            height,
            world.regions.len(),
            region_count,
            world.grid.free_count()
        );
        Ok(world)
    }

    /// Build the grid and seed the regions, each with its initial burst,
    /// without running the global expansion loop.
    pub fn with_regions(
        width: usize,
        height: usize,
        region_count: usize,
        rng: &mut ChaCha8Rng,
    ) -> Result<Self, WorldError> {
        WorldConfig::new(width, height, region_count, 0).validate()?;
        let mut world = Self::with_tiles(width, height)?;
        world.requested_regions = region_count;
        world.max_expansions = world.grid.len() / region_count.saturating_add(1);

        // Every realized region owns at least one tile.
        let realizable = region_count.min(world.grid.len());
        world.regions.reserve(realizable);
        world.expanders.reserve(realizable);

        world.initialize_regions(region_count, rng);
        Ok(world)
    }

    /// A world with all tiles unclaimed and no regions.
    pub fn with_tiles(width: usize, height: usize) -> Result<Self, WorldError> {
        let grid = TileGrid::new(width, height)?;
        let max_expansions = grid.len();
        Ok(Self {
            grid,
            palette: BiomePalette::default_palette(),
            regions: Vec::new(),
            expanders: Vec::new(),
            requested_regions: 0,
            max_expansions,
        })
    }

    fn initialize_regions(&mut self, count: usize, rng: &mut ChaCha8Rng) {
        let _t = Timed::debug("Seeding regions");
        for slot in 0..count {
            // A full grid draws nothing, so the remaining slots can be
            // skipped in one go.
            if self.grid.free_count() == 0 {
                log::warn!(
                    "Grid full after {} regions, skipping {} remaining slots",
                    self.regions.len(),
                    count - slot
                );
                break;
            }
            match self.grid.find_free_tile(None, rng) {
                Ok(origin) => {
                    self.add_region(origin, rng);
                }
                Err(e) => log::warn!("Skipping region slot {}: {}", slot, e),
            }
        }
        log::debug!(
            "Seeded {} regions, {} tiles still free",
            self.regions.len(),
            self.grid.free_count()
        );
    }

    fn add_region(&mut self, origin: Point, rng: &mut ChaCha8Rng) -> RegionId {
        // Fits: each region owns a tile and grids hold at most `u32::MAX` tiles.
        let id = RegionId(self.regions.len() as u32);
        let mut region = Region::random(id, origin, &self.palette, rng);
        region.claim_seed(&mut self.grid, origin);

        for _ in 0..self.max_expansions {
            if !region.expand_once(&mut self.grid, rng) {
                break;
            }
        }

        self.regions.push(region);
        self.expanders.push(id);
        id
    }

    /// Repeatedly let a random active region claim a random burst of tiles.
    ///
    /// `iterations = None` runs until no region can grow. `max_per_region`
    /// of `None` or `Some(0)` uses [`World::max_expansions_per_region`].
    /// Returns the number of expansions performed.
    pub fn expand_regions(
        &mut self,
        iterations: Option<usize>,
        max_per_region: Option<usize>,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let cap = max_per_region
            .filter(|&max| max > 0)
            .unwrap_or(self.max_expansions)
            .max(MIN_BURST_CAP);

        let mut remaining = iterations;
        let mut performed = 0;

        while remaining != Some(0) && !self.expanders.is_empty() {
            let ri = rng.gen_range(0..self.expanders.len());
            let region = &mut self.regions[self.expanders[ri].index()];

            let mut n = rng.gen_range(0..cap);
            if let Some(left) = remaining {
                n = n.min(left);
            }

            for _ in 0..n {
                if !region.expand_once(&mut self.grid, rng) {
                    self.expanders.swap_remove(ri);
                    break;
                }
                performed += 1;
                if let Some(left) = remaining.as_mut() {
                    *left -= 1;
                }
            }
        }

        performed
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn palette(&self) -> &BiomePalette {
        &self.palette
    }

    /// Regions that were actually created; may be fewer than requested.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    /// Regions still eligible for the expansion loop.
    pub fn active_regions(&self) -> &[RegionId] {
        &self.expanders
    }

    pub fn requested_regions(&self) -> usize {
        self.requested_regions
    }

    /// Burst cap: `tiles / (1 + requested regions)`, fixed for the run.
    pub fn max_expansions_per_region(&self) -> usize {
        self.max_expansions
    }

    pub fn unclaimed_count(&self) -> usize {
        self.grid.free_count()
    }

    pub fn is_fully_claimed(&self) -> bool {
        self.grid.free_count() == 0
    }

    /// Biome of the region owning the tile, if any.
    pub fn biome_at(&self, x: usize, y: usize) -> Option<&Biome> {
        self.grid
            .region_at(x, y)
            .map(|id| self.palette.get(self.region(id).biome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn assignment(world: &World) -> Vec<Option<RegionId>> {
        world.grid().iter().map(|tile| tile.region).collect()
    }

    #[test]
    fn test_single_region_claims_everything() {
        let world = World::generate(&WorldConfig::new(10, 10, 1, 1234)).unwrap();

        assert_eq!(world.regions().len(), 1);
        assert_eq!(world.regions()[0].tile_count(), 100);
        assert!(world.is_fully_claimed());
        assert!(world.active_regions().is_empty());
    }

    #[test]
    fn test_one_region_per_tile() {
        let world = World::generate(&WorldConfig::new(4, 4, 16, 99)).unwrap();

        assert_eq!(world.max_expansions_per_region(), 0);
        assert_eq!(world.regions().len(), 16);
        for region in world.regions() {
            assert_eq!(region.tile_count(), 1);
            assert!(region.is_exhausted());
        }
        let claimed: usize = world.regions().iter().map(|r| r.tile_count()).sum();
        assert_eq!(claimed, world.grid().len() - world.unclaimed_count());
    }

    #[test]
    fn test_more_regions_than_tiles_skips_slots() {
        let world = World::generate(&WorldConfig::new(2, 2, 10, 5)).unwrap();

        assert_eq!(world.requested_regions(), 10);
        assert_eq!(world.regions().len(), 4);
        assert!(world.is_fully_claimed());
    }

    #[test]
    fn test_huge_region_counts_stop_at_full_grid() {
        let reference = World::generate(&WorldConfig::new(2, 2, 10, 5)).unwrap();

        for count in [usize::MAX, usize::MAX / 2, 1_000_000_000] {
            let world = World::generate(&WorldConfig::new(2, 2, count, 5)).unwrap();
            assert_eq!(world.requested_regions(), count);
            assert_eq!(world.max_expansions_per_region(), 0);
            assert_eq!(world.regions().len(), 4);

            // Slots past a full grid draw nothing from the RNG.
            assert_eq!(assignment(&world), assignment(&reference));
            for (a, b) in world.regions().iter().zip(reference.regions()) {
                assert_eq!((a.origin, a.biome, a.color), (b.origin, b.biome, b.color));
            }
        }
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let config = WorldConfig::new(1 << 33, 1 << 32, 1, 1);
        assert!(matches!(config.validate(), Err(WorldError::TooManyTiles { .. })));
        assert!(matches!(
            World::generate(&config),
            Err(WorldError::TooManyTiles { .. })
        ));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            World::generate(&WorldConfig::new(10, 10, 0, 1)).unwrap_err(),
            WorldError::InvalidDimension { name: "region count", value: 0 }
        );
        assert!(World::generate(&WorldConfig::new(0, 10, 3, 1)).is_err());
        assert!(World::generate(&WorldConfig::new(10, 0, 3, 1)).is_err());
    }

    #[test]
    fn test_with_tiles_is_blank() {
        let world = World::with_tiles(10, 10).unwrap();
        assert_eq!(world.grid().len(), 100);
        assert_eq!(world.unclaimed_count(), 100);
        assert!(world.regions().is_empty());
        assert_eq!(world.grid().tile_at(9, 0).pos, Point::new(9, 0));
    }

    #[test]
    fn test_default_max_expansions() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let world = World::with_regions(100, 50, 9, &mut rng).unwrap();
        assert_eq!(world.max_expansions_per_region(), 500);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let config = WorldConfig::new(64, 32, 12, 2024);
        let a = World::generate(&config).unwrap();
        let b = World::generate(&config).unwrap();

        assert_eq!(assignment(&a), assignment(&b));
        for (ra, rb) in a.regions().iter().zip(b.regions()) {
            assert_eq!(ra.origin, rb.origin);
            assert_eq!(ra.biome, rb.biome);
            assert_eq!(ra.color, rb.color);
        }
    }

    #[test]
    fn test_regions_partition_grid() {
        let world = World::generate(&WorldConfig::new(80, 40, 25, 77)).unwrap();

        let mut counts = vec![0usize; world.regions().len()];
        for tile in world.grid().iter() {
            let id = tile.region.expect("every tile claimed");
            counts[id.index()] += 1;
        }
        for (region, &count) in world.regions().iter().zip(&counts) {
            assert_eq!(region.tile_count(), count);
        }
        assert_eq!(counts.iter().sum::<usize>(), 80 * 40);
    }

    #[test]
    fn test_claims_never_change() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let mut world = World::with_regions(50, 30, 6, &mut rng).unwrap();
        let before = assignment(&world);

        world.expand_regions(Some(40), None, &mut rng);
        let middle = assignment(&world);
        world.expand_regions(None, None, &mut rng);
        let after = assignment(&world);

        for i in 0..before.len() {
            if before[i].is_some() {
                assert_eq!(before[i], middle[i]);
            }
            if middle[i].is_some() {
                assert_eq!(middle[i], after[i]);
            }
        }
    }

    #[test]
    fn test_bounded_iterations() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut world = World::with_regions(120, 60, 10, &mut rng).unwrap();

        let performed = world.expand_regions(Some(5), Some(3), &mut rng);
        assert!(performed <= 5);
        assert!(performed == 5 || world.active_regions().is_empty());
    }

    #[test]
    fn test_exhausted_regions_leave_active_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mut world = World::with_regions(30, 20, 5, &mut rng).unwrap();
        world.expand_regions(None, None, &mut rng);

        assert!(world.active_regions().is_empty());
        assert!(world.regions().iter().all(|r| r.is_exhausted()));

        // Nothing left to select, so further calls are no-ops.
        assert_eq!(world.expand_regions(None, None, &mut rng), 0);
    }

    #[test]
    fn test_partition_and_eviction_hold_between_steps() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut world = World::with_regions(40, 20, 8, &mut rng).unwrap();
        let mut evicted: HashMap<RegionId, usize> = HashMap::new();

        loop {
            let claimed: usize = world.regions().iter().map(|r| r.tile_count()).sum();
            assert_eq!(claimed, world.grid().len() - world.unclaimed_count());

            for region in world.regions() {
                let active = world.active_regions().contains(&region.id);
                match evicted.get(&region.id) {
                    Some(&frozen) => {
                        assert!(!active, "region {:?} came back", region.id);
                        assert_eq!(region.tile_count(), frozen);
                    }
                    None if !active => {
                        evicted.insert(region.id, region.tile_count());
                    }
                    None => {}
                }
            }

            if world.active_regions().is_empty() {
                break;
            }
            world.expand_regions(Some(3), None, &mut rng);
        }

        assert_eq!(evicted.len(), world.regions().len());
        assert!(world.is_fully_claimed());
    }

    #[test]
    fn test_no_free_tile_borders_a_claimed_one() {
        let world = World::generate(&WorldConfig::new(40, 25, 7, 4)).unwrap();
        let grid = world.grid();

        for tile in grid.iter().filter(|t| t.is_free()) {
            let (x, y) = (tile.pos.x as isize, tile.pos.y as isize);
            for (dx, dy) in crate::tilemap::NEIGHBOR_OFFSETS {
                if let Some(neighbor) = grid.wrapped_tile_at(x + dx, y + dy) {
                    assert!(neighbor.is_free(), "free tile {:?} next to a claimed one", tile.pos);
                }
            }
        }
        assert!(world.is_fully_claimed());
    }

    #[test]
    fn test_biome_at() {
        let world = World::generate(&WorldConfig::new(16, 8, 3, 10)).unwrap();
        let id = world.grid().region_at(0, 0).unwrap();
        let expected = world.palette().get(world.region(id).biome);
        assert_eq!(world.biome_at(0, 0), Some(expected));
    }
}
