//! Region growth engine
//!
//! A world is a horizontally wrapping grid split into regions. Each region
//! starts at a random free tile and grows by expanding random frontier tiles
//! into their free 8-neighbors until the grid runs out.

pub mod batch;
pub mod generation;
pub mod grid;
pub mod region;
pub mod summary;
pub mod types;

pub use batch::generate_batch;
pub use generation::{World, WorldConfig};
pub use grid::TileGrid;
pub use region::Region;
pub use summary::{RegionSummary, WorldSummary};
pub use types::{Point, RegionId, Tile, WorldError};
