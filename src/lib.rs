//! Region world generation library
//!
//! Partitions a horizontally wrapping grid into randomly grown regions,
//! assigns each a biome and renders the result as an image.

pub mod biomes;
pub mod export;
pub mod server;
pub mod tilemap;
pub mod timing;
pub mod world;
