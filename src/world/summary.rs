use serde::{Deserialize, Serialize};

use crate::biomes::{BiomeId, BiomeKind};

use super::generation::{World, WorldConfig};
use super::types::{Point, RegionId};

/// Per-region statistics of a finished world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub id: RegionId,
    pub origin: Point,
    pub biome: BiomeId,
    pub biome_kind: BiomeKind,
    pub display_color: [u8; 4],
    pub tiles: usize,
}

/// Serializable description of a generation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSummary {
    pub config: WorldConfig,
    pub requested_regions: usize,
    pub realized_regions: usize,
    pub unclaimed_tiles: usize,
    pub regions: Vec<RegionSummary>,
}

impl WorldSummary {
    pub fn new(world: &World, config: &WorldConfig) -> Self {
        let regions = world
            .regions()
            .iter()
            .map(|region| RegionSummary {
                id: region.id,
                origin: region.origin,
                biome: region.biome,
                biome_kind: world.palette().get(region.biome).kind,
                display_color: region.color.0,
                tiles: region.tile_count(),
            })
            .collect();

        Self {
            config: config.clone(),
            requested_regions: world.requested_regions(),
            realized_regions: world.regions().len(),
            unclaimed_tiles: world.unclaimed_count(),
            regions,
        }
    }

    /// Fraction of tiles owned by regions of the given kind.
    pub fn coverage(&self, kind: BiomeKind) -> f64 {
        let total = self.config.width * self.config.height;
        if total == 0 {
            return 0.0;
        }
        let tiles: usize = self
            .regions
            .iter()
            .filter(|r| r.biome_kind == kind)
            .map(|r| r.tiles)
            .sum();
        tiles as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let config = WorldConfig::new(40, 20, 8, 321);
        let world = World::generate(&config).unwrap();
        let summary = WorldSummary::new(&world, &config);

        assert_eq!(summary.requested_regions, 8);
        assert_eq!(summary.realized_regions, 8);
        assert_eq!(summary.unclaimed_tiles, 0);
        assert_eq!(summary.regions.iter().map(|r| r.tiles).sum::<usize>(), 800);

        let total: f64 = [BiomeKind::Water, BiomeKind::Land, BiomeKind::Highland]
            .iter()
            .map(|&k| summary.coverage(k))
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_json() {
        let config = WorldConfig::new(10, 10, 2, 1);
        let world = World::generate(&config).unwrap();
        let summary = WorldSummary::new(&world, &config);

        let json = serde_json::to_string_pretty(&summary).unwrap();
        assert!(json.contains("\"realized_regions\": 2"));
        let back: WorldSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
