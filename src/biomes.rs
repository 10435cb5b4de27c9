//! Biome palette
//!
//! Regions draw one biome each at creation time. Biomes are immutable and live
//! in a palette owned by the world; regions only keep a `BiomeId`.

use image::Rgba;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Index of a biome inside its palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BiomeId(pub u8);

/// Broad category of a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiomeKind {
    Water,
    Land,
    Highland,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Biome {
    pub id: BiomeId,
    pub name: &'static str,
    pub kind: BiomeKind,
    pub color: Rgba<u8>,
}

/// Fixed set of biomes a world draws from.
#[derive(Clone, Debug)]
pub struct BiomePalette {
    biomes: Vec<Biome>,
}

const WATER: Rgba<u8> = Rgba([0x00, 0x00, 0xFF, 0xFF]);
const LAND: Rgba<u8> = Rgba([0x00, 0xFF, 0x00, 0xFF]);
const HIGHLAND: Rgba<u8> = Rgba([0xFF, 0xFF, 0x00, 0xFF]);

impl BiomePalette {
    /// Three water entries, one land and one highland, so about 60% of
    /// regions come out as water.
    pub fn default_palette() -> Self {
        let entries = [
            ("deep_ocean", BiomeKind::Water, WATER),
            ("ocean", BiomeKind::Water, WATER),
            ("shallows", BiomeKind::Water, WATER),
            ("lowland", BiomeKind::Land, LAND),
            ("highland", BiomeKind::Highland, HIGHLAND),
        ];

        // Five entries, so indices fit in a u8.
        let biomes = entries
            .iter()
            .enumerate()
            .map(|(i, &(name, kind, color))| Biome {
                id: BiomeId(i as u8),
                name,
                kind,
                color,
            })
            .collect();

        Self { biomes }
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    pub fn get(&self, id: BiomeId) -> &Biome {
        &self.biomes[id.0 as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Biome> {
        self.biomes.iter()
    }

    /// Uniformly random biome handle.
    pub fn random(&self, rng: &mut ChaCha8Rng) -> BiomeId {
        BiomeId(rng.gen_range(0..self.biomes.len()) as u8)
    }
}

impl Default for BiomePalette {
    fn default() -> Self {
        Self::default_palette()
    }
}
