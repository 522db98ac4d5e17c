//! The curved photo wall for the selected city.
//!
//! Tiles are added one by one as photo loads land; a rebuild clears them all
//! synchronously before the next batch starts. The wall group itself carries
//! the drop-in offset (tweened) and a slow sway.

use crate::constants::{WALL_SWAY_AMPLITUDE, WALL_SWAY_RATE};
use crate::layout::{tile_jitter, tile_placement, TileJitter, TilePlacement, WallConfig};
use rand::Rng;

#[derive(Clone, Debug)]
pub struct Tile {
    /// Slot index from the load batch; also keys the shell's texture map.
    pub slot: usize,
    pub placement: TilePlacement,
    pub jitter: TileJitter,
}

#[derive(Clone, Debug)]
pub struct ImageWall {
    pub tiles: Vec<Tile>,
    pub config: WallConfig,
    /// Tweened from the entry height down to 0 during the transition.
    pub offset_y: f32,
    /// Yaw applied to the whole group, driven by stage time.
    pub sway: f32,
    pub visible: bool,
}

impl Default for ImageWall {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWall {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            config: WallConfig::default(),
            offset_y: 0.0,
            sway: 0.0,
            visible: false,
        }
    }

    /// Drop every tile. The shell releases the matching textures.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    pub fn add_tile(&mut self, slot: usize, rng: &mut impl Rng) {
        self.tiles.push(Tile {
            slot,
            placement: tile_placement(slot, &self.config),
            jitter: tile_jitter(rng),
        });
    }

    pub fn advance(&mut self, t_sec: f32) {
        self.sway = (t_sec * WALL_SWAY_RATE).sin() * WALL_SWAY_AMPLITUDE;
    }
}
