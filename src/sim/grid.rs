//! Hex-offset grid layout generation
//!
//! Tiles are laid out row-major on the XZ plane, centered at the origin.
//! Rows are packed at 3/4 of the tile depth and every odd row shifts half a
//! tile to the right, which tiles a hexagonal footprint using translation
//! only (no per-instance rotation).

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Invalid grid construction input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid dimensions must be positive (got {rows}x{cols})")]
    EmptyGrid { rows: u32, cols: u32 },
    #[error("tile footprint must be positive and finite")]
    BadFootprint,
    #[error("gutter must be non-negative and finite")]
    BadGutter,
}

/// Grid construction parameters. Immutable once the grid is built; changing
/// them means rebuilding the whole layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    /// Tile extents in world units: width (x), thickness (y), depth (z)
    pub footprint: Vec3,
    /// Spacing between adjacent tiles
    pub gutter: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            footprint: Vec3::new(TILE_WIDTH, TILE_THICKNESS, TILE_DEPTH),
            gutter: TILE_GUTTER,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !self.footprint.is_finite() || self.footprint.cmple(Vec3::ZERO).any() {
            return Err(ConfigError::BadFootprint);
        }
        if !self.gutter.is_finite() || self.gutter < 0.0 {
            return Err(ConfigError::BadGutter);
        }
        Ok(())
    }

    /// Total instance count
    #[inline]
    pub fn count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Column and row pitch: full tile width across, 3/4 tile depth down
    #[inline]
    pub fn pitch(&self) -> (f32, f32) {
        (
            self.footprint.x + self.gutter,
            self.footprint.z * 0.75 + self.gutter,
        )
    }
}

/// One placed tile. Created at grid build time, immutable afterward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileInstance {
    /// Row-major index, unique within the grid
    pub index: u32,
    pub position: Vec3,
    /// Uniform in [-1, 1]; scales the idle jitter per instance
    pub seed: f32,
    /// Uniform in [-0.5, 0.5]; idle jitter angular speed
    pub speed: f32,
}

/// Generated instance buffer plus the pitch it was built with
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub config: GridConfig,
    pub instances: Vec<TileInstance>,
    pub hex_width: f32,
    pub hex_height: f32,
}

impl GridLayout {
    /// Build the full instance buffer. Seeds and speeds are drawn fresh from
    /// `rng`; layout positions depend only on the config (plus a small
    /// vertical drop per tile so the floor reads as organic).
    pub fn generate(config: &GridConfig, rng: &mut impl Rng) -> Result<Self, ConfigError> {
        config.validate()?;

        let (hex_width, hex_height) = config.pitch();
        let half_span_x = config.cols as f32 * hex_width / 2.0;
        let half_span_z = config.rows as f32 * hex_height / 2.0;

        let mut instances = Vec::with_capacity(config.count());

        for row in 0..config.rows {
            // Odd rows interleave with the rows above and below
            let x_offset = if row % 2 == 1 {
                config.footprint.x / 2.0 + config.gutter / 2.0
            } else {
                0.0
            };

            for col in 0..config.cols {
                let index = row * config.cols + col;

                let x = col as f32 * hex_width + x_offset - half_span_x;
                let y = rng.random::<f32>() * 0.02 - 0.04;
                let z = row as f32 * hex_height - half_span_z;

                instances.push(TileInstance {
                    index,
                    position: Vec3::new(x, y, z),
                    seed: rng.random::<f32>() * 2.0 - 1.0,
                    speed: (rng.random::<f32>() * 2.0 - 1.0) * 0.5,
                });
            }
        }

        Ok(Self {
            config: *config,
            instances,
            hex_width,
            hex_height,
        })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn config(rows: u32, cols: u32) -> GridConfig {
        GridConfig {
            rows,
            cols,
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_empty_grid() {
        let mut rng = Pcg32::seed_from_u64(1);
        let bad = config(0, 10);
        assert_eq!(
            GridLayout::generate(&bad, &mut rng).unwrap_err(),
            ConfigError::EmptyGrid { rows: 0, cols: 10 }
        );
        let bad = config(10, 0);
        assert!(GridLayout::generate(&bad, &mut rng).is_err());
    }

    #[test]
    fn test_rejects_bad_footprint() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut cfg = config(3, 3);
        cfg.footprint = Vec3::new(0.0, 0.02, 0.1);
        assert_eq!(
            GridLayout::generate(&cfg, &mut rng).unwrap_err(),
            ConfigError::BadFootprint
        );
        cfg.footprint = Vec3::new(f32::NAN, 0.02, 0.1);
        assert!(GridLayout::generate(&cfg, &mut rng).is_err());
    }

    #[test]
    fn test_rejects_negative_gutter() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut cfg = config(3, 3);
        cfg.gutter = -0.01;
        assert_eq!(
            GridLayout::generate(&cfg, &mut rng).unwrap_err(),
            ConfigError::BadGutter
        );
    }

    #[test]
    fn test_odd_row_offset() {
        // Unit footprint, zero gutter: odd rows shift exactly half a tile
        let cfg = GridConfig {
            rows: 3,
            cols: 3,
            footprint: Vec3::new(1.0, 0.02, 1.0),
            gutter: 0.0,
        };
        let mut rng = Pcg32::seed_from_u64(7);
        let layout = GridLayout::generate(&cfg, &mut rng).unwrap();

        assert_eq!(layout.count(), 9);
        let row0_col0 = layout.instances[0].position;
        let row1_col0 = layout.instances[3].position;
        assert!((row1_col0.x - row0_col0.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_field_centered_at_origin() {
        let cfg = GridConfig {
            rows: 4,
            cols: 4,
            footprint: Vec3::new(1.0, 0.02, 1.0),
            gutter: 0.0,
        };
        let mut rng = Pcg32::seed_from_u64(7);
        let layout = GridLayout::generate(&cfg, &mut rng).unwrap();

        // Even-row x positions span [-span/2, span/2 - pitch]
        let min_x = layout
            .instances
            .iter()
            .map(|t| t.position.x)
            .fold(f32::INFINITY, f32::min);
        let max_x = layout
            .instances
            .iter()
            .map(|t| t.position.x)
            .fold(f32::NEG_INFINITY, f32::max);
        assert!((min_x + 2.0).abs() < 1e-6);
        assert!((max_x - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_row_pitch_is_three_quarter_depth() {
        let cfg = GridConfig {
            rows: 2,
            cols: 1,
            footprint: Vec3::new(1.0, 0.02, 1.0),
            gutter: 0.0,
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let layout = GridLayout::generate(&cfg, &mut rng).unwrap();
        let dz = layout.instances[1].position.z - layout.instances[0].position.z;
        assert!((dz - 0.75).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_count_and_unique_indices(rows in 1u32..24, cols in 1u32..24, seed in any::<u64>()) {
            let cfg = config(rows, cols);
            let mut rng = Pcg32::seed_from_u64(seed);
            let layout = GridLayout::generate(&cfg, &mut rng).unwrap();

            prop_assert_eq!(layout.count(), (rows * cols) as usize);
            for (i, tile) in layout.instances.iter().enumerate() {
                prop_assert_eq!(tile.index as usize, i);
            }
        }

        #[test]
        fn prop_seed_and_speed_ranges(rows in 1u32..12, cols in 1u32..12, seed in any::<u64>()) {
            let cfg = config(rows, cols);
            let mut rng = Pcg32::seed_from_u64(seed);
            let layout = GridLayout::generate(&cfg, &mut rng).unwrap();

            for tile in &layout.instances {
                prop_assert!((-1.0..=1.0).contains(&tile.seed));
                prop_assert!((-0.5..=0.5).contains(&tile.speed));
                prop_assert!((-0.04..=-0.02).contains(&tile.position.y));
            }
        }
    }
}
