//! Tuning parameters and preferences
//!
//! Everything the parameter panel is allowed to touch: colors, interaction
//! ceilings, grid density. Only `max` values and visual constants live
//! here - eased `current` values and the contact point are owned by the
//! simulation and never persisted.
//!
//! Persisted in LocalStorage on web.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::GridConfig;

/// Grid density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GridPreset {
    Low,
    Medium,
    #[default]
    Full,
}

impl GridPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridPreset::Low => "Low",
            GridPreset::Medium => "Medium",
            GridPreset::Full => "Full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(GridPreset::Low),
            "medium" | "med" => Some(GridPreset::Medium),
            "full" => Some(GridPreset::Full),
            _ => None,
        }
    }

    /// Rows and columns for this preset
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            GridPreset::Low => (60, 60),
            GridPreset::Medium => (100, 100),
            GridPreset::Full => (GRID_ROWS, GRID_COLS),
        }
    }
}

/// Operator-facing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Grid density preset
    pub grid: GridPreset,

    // === Tile material ===
    pub tile_color: [f32; 3],
    pub tile_specular: [f32; 3],
    pub tile_shininess: f32,

    // === Floor ===
    pub floor_color: [f32; 3],
    pub highlight_color: [f32; 3],

    // === Interaction ceilings ===
    pub displacement_height_max: f32,
    pub displacement_radius_max: f32,
    pub highlight_radius_max: f32,

    // === HUD ===
    pub show_fps: bool,

    // === Accessibility ===
    /// Suppress the idle tile wobble
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: GridPreset::Full,

            // 0x121013 with 0x222222 specular, as the scene was graded
            tile_color: [0.070, 0.063, 0.075],
            tile_specular: [0.133, 0.133, 0.133],
            tile_shininess: 20.0,

            floor_color: [0.070, 0.063, 0.075],
            // 0x4338ca indigo
            highlight_color: [0.263, 0.220, 0.792],

            displacement_height_max: DISPLACEMENT_HEIGHT_MAX,
            displacement_radius_max: DISPLACEMENT_RADIUS_MAX,
            highlight_radius_max: HIGHLIGHT_RADIUS_MAX,

            show_fps: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Grid configuration for the selected preset
    pub fn grid_config(&self) -> GridConfig {
        let (rows, cols) = self.grid.dimensions();
        GridConfig {
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Effective idle jitter amplitude (respects reduced_motion)
    pub fn effective_jitter(&self) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            IDLE_JITTER_AMPLITUDE
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "hexfloor_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
