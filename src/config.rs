// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine configuration.
//!
//! All tunables live here and are passed explicitly into the components
//! that use them. Persistent storage uses TOML via confy, so a dashboard
//! can keep user-adjusted thresholds across sessions.

use serde::{Deserialize, Serialize};

use crate::zones::CongestionLevel;

/// An RGB color triple.
pub type Rgb = (u8, u8, u8);

/// Spatial clustering parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Link distance threshold in nautical miles.
    #[serde(default = "default_cluster_threshold")]
    pub threshold_nm: f64,

    /// Minimum radius for synthesized circle buffers, in nautical miles.
    #[serde(default = "default_circle_min_radius")]
    pub circle_min_radius_nm: f64,

    /// Vertex count for synthesized circle buffers.
    #[serde(default = "default_circle_vertices")]
    pub circle_vertices: usize,
}

/// Zone display parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Maximum number of zones handed to the rendering layer.
    #[serde(default = "default_max_display")]
    pub max_display: usize,

    /// Side length in degrees of the square synthesized for zones that
    /// arrive without a polygon.
    #[serde(default = "default_grid_cell_deg")]
    pub grid_cell_deg: f64,

    /// Cluster event count at or above which a cluster renders as critical.
    #[serde(default = "default_count_critical")]
    pub count_critical: u64,

    /// Cluster event count at or above which a cluster renders as high.
    #[serde(default = "default_count_high")]
    pub count_high: u64,

    /// Cluster event count at or above which a cluster renders as moderate.
    #[serde(default = "default_count_moderate")]
    pub count_moderate: u64,
}

/// Flight-path prediction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    /// Maximum distance from an aircraft to a learned route's start point
    /// for the route to be a match candidate, in nautical miles.
    #[serde(default = "default_route_match_radius")]
    pub route_match_radius_nm: f64,

    /// How far ahead of the aircraft to project along its heading when no
    /// historical track is available, in nautical miles.
    #[serde(default = "default_heading_projection")]
    pub heading_projection_nm: f64,

    /// Prediction horizon in minutes.
    #[serde(default = "default_horizon")]
    pub horizon_minutes: f64,
}

/// Simulation clock and proximity parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Lower clamp on the simulation duration, in minutes.
    #[serde(default = "default_min_duration")]
    pub min_duration_min: f64,

    /// Upper clamp on the simulation duration, in minutes.
    #[serde(default = "default_max_duration")]
    pub max_duration_min: f64,

    /// Lateral separation below which a conflict is critical, in nautical miles.
    #[serde(default = "default_critical_lateral")]
    pub critical_lateral_nm: f64,

    /// Altitude difference below which a conflict is critical, in feet.
    #[serde(default = "default_critical_alt_diff")]
    pub critical_alt_diff_ft: f64,

    /// Lateral separation below which a conflict is a warning, in nautical miles.
    #[serde(default = "default_warning_lateral")]
    pub warning_lateral_nm: f64,

    /// Altitude difference below which a conflict is a warning, in feet.
    #[serde(default = "default_warning_alt_diff")]
    pub warning_alt_diff_ft: f64,
}

/// Colors handed to the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Critical severity fill.
    #[serde(default = "default_critical_color")]
    pub critical: Rgb,

    /// High severity fill.
    #[serde(default = "default_high_color")]
    pub high: Rgb,

    /// Moderate severity fill.
    #[serde(default = "default_moderate_color")]
    pub moderate: Rgb,

    /// Low severity fill.
    #[serde(default = "default_low_color")]
    pub low: Rgb,

    /// Color of the planned flight.
    #[serde(default = "default_planned_color")]
    pub planned: Rgb,

    /// Rotation of colors for simulated traffic.
    #[serde(default = "default_traffic_colors")]
    pub traffic: Vec<Rgb>,
}

impl ColorPalette {
    /// Fill color for a congestion level.
    #[must_use]
    pub fn for_level(&self, level: CongestionLevel) -> Rgb {
        match level {
            CongestionLevel::Critical => self.critical,
            CongestionLevel::High => self.high,
            CongestionLevel::Moderate => self.moderate,
            CongestionLevel::Low => self.low,
        }
    }

    /// Traffic color for the flight at the given index, cycling through the
    /// rotation. Falls back to the planned color for an empty rotation.
    #[must_use]
    pub fn traffic_color(&self, index: usize) -> Rgb {
        if self.traffic.is_empty() {
            self.planned
        } else {
            self.traffic[index % self.traffic.len()]
        }
    }
}

/// Top-level engine configuration stored in TOML format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub zones: ZoneConfig,

    #[serde(default)]
    pub predict: PredictConfig,

    #[serde(default)]
    pub sim: SimConfig,

    #[serde(default)]
    pub palette: ColorPalette,
}

// Default value functions for serde
fn default_cluster_threshold() -> f64 {
    10.0
}

fn default_circle_min_radius() -> f64 {
    8.0
}

fn default_circle_vertices() -> usize {
    16
}

fn default_max_display() -> usize {
    12
}

fn default_grid_cell_deg() -> f64 {
    0.25
}

fn default_count_critical() -> u64 {
    50
}

fn default_count_high() -> u64 {
    20
}

fn default_count_moderate() -> u64 {
    8
}

fn default_route_match_radius() -> f64 {
    50.0
}

fn default_heading_projection() -> f64 {
    100.0
}

fn default_horizon() -> f64 {
    60.0
}

fn default_min_duration() -> f64 {
    60.0
}

fn default_max_duration() -> f64 {
    120.0
}

fn default_critical_lateral() -> f64 {
    5.0
}

fn default_critical_alt_diff() -> f64 {
    1000.0
}

fn default_warning_lateral() -> f64 {
    10.0
}

fn default_warning_alt_diff() -> f64 {
    2000.0
}

fn default_critical_color() -> Rgb {
    (220, 50, 50)
}

fn default_high_color() -> Rgb {
    (240, 140, 40)
}

fn default_moderate_color() -> Rgb {
    (240, 200, 60)
}

fn default_low_color() -> Rgb {
    (110, 190, 110)
}

fn default_planned_color() -> Rgb {
    (80, 160, 255)
}

fn default_traffic_colors() -> Vec<Rgb> {
    vec![
        (255, 120, 120),
        (120, 220, 160),
        (200, 140, 255),
        (255, 190, 90),
        (120, 200, 240),
        (230, 130, 200),
    ]
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            threshold_nm: default_cluster_threshold(),
            circle_min_radius_nm: default_circle_min_radius(),
            circle_vertices: default_circle_vertices(),
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            max_display: default_max_display(),
            grid_cell_deg: default_grid_cell_deg(),
            count_critical: default_count_critical(),
            count_high: default_count_high(),
            count_moderate: default_count_moderate(),
        }
    }
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            route_match_radius_nm: default_route_match_radius(),
            heading_projection_nm: default_heading_projection(),
            horizon_minutes: default_horizon(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            min_duration_min: default_min_duration(),
            max_duration_min: default_max_duration(),
            critical_lateral_nm: default_critical_lateral(),
            critical_alt_diff_ft: default_critical_alt_diff(),
            warning_lateral_nm: default_warning_lateral(),
            warning_alt_diff_ft: default_warning_alt_diff(),
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            critical: default_critical_color(),
            high: default_high_color(),
            moderate: default_moderate_color(),
            low: default_low_color(),
            planned: default_planned_color(),
            traffic: default_traffic_colors(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from disk, creating the file with defaults if it
    /// does not exist yet.
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("skytrace", "engine")
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store("skytrace", "engine", self)
    }

    /// Get the config file path for display to the user.
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path("skytrace", "engine")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_matches_defaults() {
        // An empty document must deserialize to the same values as Default,
        // otherwise a hand-edited config would shift behavior.
        let from_empty: EngineConfig = serde_json::from_str("{}").unwrap();
        let from_default = EngineConfig::default();

        assert!((from_empty.cluster.threshold_nm - from_default.cluster.threshold_nm).abs() < 1e-9);
        assert_eq!(from_empty.zones.max_display, from_default.zones.max_display);
        assert!(
            (from_empty.sim.critical_lateral_nm - from_default.sim.critical_lateral_nm).abs()
                < 1e-9
        );
        assert_eq!(from_empty.palette.critical, from_default.palette.critical);
    }

    #[test]
    fn test_traffic_color_cycles() {
        let palette = ColorPalette::default();
        let n = palette.traffic.len();
        assert_eq!(palette.traffic_color(0), palette.traffic_color(n));
    }

    #[test]
    fn test_empty_traffic_rotation_falls_back_to_planned() {
        let palette = ColorPalette {
            traffic: Vec::new(),
            ..ColorPalette::default()
        };
        assert_eq!(palette.traffic_color(3), palette.planned);
    }
}
