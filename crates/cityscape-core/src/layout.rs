//! Image wall placement math.
//!
//! Tiles sit on a partial cylindrical arc facing the camera: columns fan
//! across the arc, rows stack vertically, and the whole surface is pulled
//! back so the arc's center column sits at z = 0. Placement is a pure
//! function of the slot index; only the per-tile jitter draws randomness.

use crate::constants::{
    TILE_ROT_JITTER, TILE_SCALE_MIN, TILE_SCALE_SPAN, WALL_ARC, WALL_COLS, WALL_RADIUS, WALL_ROWS,
    WALL_SPACING,
};
use glam::Vec3;
use rand::Rng;

#[derive(Clone, Copy, Debug)]
pub struct WallConfig {
    pub rows: usize,
    pub cols: usize,
    pub spacing: f32,
    pub radius: f32,
    pub arc: f32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            rows: WALL_ROWS,
            cols: WALL_COLS,
            spacing: WALL_SPACING,
            radius: WALL_RADIUS,
            arc: WALL_ARC,
        }
    }
}

impl WallConfig {
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePlacement {
    pub position: Vec3,
    /// Yaw turning the tile to face the arc's center of curvature.
    pub yaw: f32,
}

/// Where slot `index` sits on the wall. Indices past `rows * cols` continue
/// onto rows above the top; the vertical centering still uses `rows`.
pub fn tile_placement(index: usize, cfg: &WallConfig) -> TilePlacement {
    let row = index / cfg.cols;
    let col = index % cfg.cols;
    let angle = if cfg.cols > 1 {
        (col as f32 / (cfg.cols - 1) as f32) * cfg.arc - cfg.arc / 2.0
    } else {
        0.0
    };
    let x = angle.sin() * cfg.radius;
    let z = angle.cos() * cfg.radius - cfg.radius;
    let y = (row as f32 - (cfg.rows as f32 - 1.0) / 2.0) * cfg.spacing;
    TilePlacement {
        position: Vec3::new(x, y, z),
        yaw: -angle,
    }
}

/// Small random pitch/roll and scale wobble so the wall reads hand-placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileJitter {
    pub pitch: f32,
    pub roll: f32,
    pub scale: f32,
}

pub fn tile_jitter(rng: &mut impl Rng) -> TileJitter {
    TileJitter {
        pitch: (rng.gen::<f32>() - 0.5) * TILE_ROT_JITTER,
        roll: (rng.gen::<f32>() - 0.5) * TILE_ROT_JITTER,
        scale: TILE_SCALE_MIN + rng.gen::<f32>() * TILE_SCALE_SPAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn placement_is_deterministic_per_index() {
        let cfg = WallConfig::default();
        for i in 0..cfg.capacity() {
            assert_eq!(tile_placement(i, &cfg), tile_placement(i, &cfg));
        }
    }

    #[test]
    fn columns_span_the_arc_symmetrically() {
        let cfg = WallConfig::default();
        let first = tile_placement(0, &cfg);
        let last = tile_placement(cfg.cols - 1, &cfg);
        assert!((first.position.x + last.position.x).abs() < 1e-4);
        assert!((first.position.z - last.position.z).abs() < 1e-4);
        assert!((first.yaw + last.yaw).abs() < 1e-6);

        // Center column sits on the chord at the origin.
        let mid = tile_placement(cfg.cols / 2, &cfg);
        assert!(mid.position.x.abs() < 1e-4);
        assert!(mid.position.z.abs() < 1e-4);
        assert!(mid.yaw.abs() < 1e-6);
    }

    #[test]
    fn rows_stack_at_even_spacing_around_center() {
        let cfg = WallConfig::default();
        let bottom = tile_placement(0, &cfg);
        let top = tile_placement((cfg.rows - 1) * cfg.cols, &cfg);
        assert!((bottom.position.y + top.position.y).abs() < 1e-4);
        let next_row = tile_placement(cfg.cols, &cfg);
        assert!((next_row.position.y - bottom.position.y - cfg.spacing).abs() < 1e-4);
    }

    #[test]
    fn edge_tiles_turn_toward_the_center() {
        let cfg = WallConfig::default();
        let left = tile_placement(0, &cfg);
        assert!(left.position.x < 0.0);
        assert!(left.yaw > 0.0);
        assert!(left.position.z < 0.0, "edges curve away from the camera");
    }

    #[test]
    fn single_column_wall_is_centered() {
        let cfg = WallConfig {
            cols: 1,
            ..WallConfig::default()
        };
        let p = tile_placement(0, &cfg);
        assert_eq!(p.position.x, 0.0);
        assert_eq!(p.yaw, 0.0);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let j = tile_jitter(&mut rng);
            assert!(j.pitch.abs() <= TILE_ROT_JITTER / 2.0);
            assert!(j.roll.abs() <= TILE_ROT_JITTER / 2.0);
            assert!(j.scale >= TILE_SCALE_MIN && j.scale <= TILE_SCALE_MIN + TILE_SCALE_SPAN);
        }
    }
}
