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

//! Adaptation of congestion zones and clusters into renderable records.
//!
//! A pure mapping step between the clustering core and the map layer:
//! severity tiers, fill colors from an injected palette, label text, ranking
//! and truncation to the display cap. Nothing here owns business logic
//! beyond thresholding, sorting and capping.

use serde::{Deserialize, Serialize};

use crate::cluster::{Cluster, LonLat};
use crate::config::{ColorPalette, Rgb, ZoneConfig};

/// Congestion severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl CongestionLevel {
    /// Tier for a density score: above 50 critical, above 30 high, above 15
    /// moderate, low otherwise.
    #[must_use]
    pub fn from_density(score: f64) -> Self {
        if score > 50.0 {
            Self::Critical
        } else if score > 30.0 {
            Self::High
        } else if score > 15.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// An airspace congestion zone aggregated by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CongestionZone {
    /// Zone center latitude in degrees.
    pub lat: f64,
    /// Zone center longitude in degrees.
    pub lon: f64,
    /// Density score driving the severity tier.
    pub density_score: f64,
    /// Number of flights observed in the zone.
    pub flight_count: u32,
    /// Number of flights in holding patterns.
    pub holding_count: u32,
    /// Mean altitude across the zone in feet.
    pub avg_altitude_ft: f64,
    /// Observed traffic rate.
    pub flights_per_hour: f64,
    /// Severity tier as reported by the backend. The adapter re-derives the
    /// tier from `density_score`, so a stale value here never reaches the
    /// display records.
    pub congestion_level: CongestionLevel,
    /// Zone outline as `[lon, lat]` pairs; a grid-cell square is
    /// synthesized when absent.
    #[serde(default)]
    pub polygon: Option<Vec<LonLat>>,
}

/// A renderable zone descriptor handed to the map layer.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneDisplay {
    /// Closed outline ring as `[lon, lat]` pairs.
    pub polygon: Vec<LonLat>,
    /// Marker position as `[lon, lat]`.
    pub marker: LonLat,
    /// Marker label text.
    pub label: String,
    /// Severity tier.
    pub level: CongestionLevel,
    /// Fill color.
    pub color: Rgb,
    /// Score used for ranking, larger renders first.
    pub score: f64,
}

/// Maps congestion zones and clusters into display records.
#[derive(Debug, Clone, Default)]
pub struct ZoneAdapter {
    config: ZoneConfig,
    palette: ColorPalette,
}

impl ZoneAdapter {
    /// Create an adapter with the given display parameters and palette.
    #[must_use]
    pub fn new(config: ZoneConfig, palette: ColorPalette) -> Self {
        Self { config, palette }
    }

    /// Map congestion zones to display records, ranked by density score and
    /// truncated to the display cap.
    ///
    /// The severity tier is always derived from the density score, which
    /// keeps tier and score consistent even when the backend disagrees.
    #[must_use]
    pub fn adapt_zones(&self, zones: &[CongestionZone]) -> Vec<ZoneDisplay> {
        let mut displays: Vec<ZoneDisplay> = zones
            .iter()
            .map(|zone| {
                let level = CongestionLevel::from_density(zone.density_score);
                let polygon = match &zone.polygon {
                    Some(ring) if ring.len() >= 3 => ring.clone(),
                    _ => self.grid_cell_ring(zone.lat, zone.lon),
                };
                ZoneDisplay {
                    polygon,
                    marker: [zone.lon, zone.lat],
                    label: format!(
                        "{} congestion: {} flights, {:.0}/h",
                        level.label(),
                        zone.flight_count,
                        zone.flights_per_hour
                    ),
                    level,
                    color: self.palette.for_level(level),
                    score: zone.density_score,
                }
            })
            .collect();

        displays.sort_by(|a, b| b.score.total_cmp(&a.score));
        displays.truncate(self.config.max_display);
        displays
    }

    /// Map event clusters to display records, tiered by total event count,
    /// ranked and truncated like zones.
    #[must_use]
    pub fn adapt_clusters(&self, clusters: &[Cluster]) -> Vec<ZoneDisplay> {
        let mut displays: Vec<ZoneDisplay> = clusters
            .iter()
            .map(|cluster| {
                let level = self.cluster_level(cluster.total_count);
                ZoneDisplay {
                    polygon: cluster.polygon.clone(),
                    marker: cluster.centroid,
                    label: format!("{} events", cluster.total_count),
                    level,
                    color: self.palette.for_level(level),
                    score: cluster.total_count as f64,
                }
            })
            .collect();

        displays.sort_by(|a, b| b.score.total_cmp(&a.score));
        displays.truncate(self.config.max_display);
        displays
    }

    fn cluster_level(&self, total_count: u64) -> CongestionLevel {
        if total_count >= self.config.count_critical {
            CongestionLevel::Critical
        } else if total_count >= self.config.count_high {
            CongestionLevel::High
        } else if total_count >= self.config.count_moderate {
            CongestionLevel::Moderate
        } else {
            CongestionLevel::Low
        }
    }

    /// Closed square ring of one grid cell centered on the zone.
    fn grid_cell_ring(&self, lat: f64, lon: f64) -> Vec<LonLat> {
        let half = self.config.grid_cell_deg / 2.0;
        vec![
            [lon - half, lat - half],
            [lon + half, lat - half],
            [lon + half, lat + half],
            [lon - half, lat + half],
            [lon - half, lat - half],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(density: f64) -> CongestionZone {
        CongestionZone {
            lat: 32.0,
            lon: 34.9,
            density_score: density,
            flight_count: 18,
            holding_count: 2,
            avg_altitude_ft: 21_000.0,
            flights_per_hour: 36.0,
            congestion_level: CongestionLevel::Low,
            polygon: None,
        }
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(CongestionLevel::from_density(51.0), CongestionLevel::Critical);
        assert_eq!(CongestionLevel::from_density(50.0), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_density(30.5), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_density(30.0), CongestionLevel::Moderate);
        assert_eq!(CongestionLevel::from_density(16.0), CongestionLevel::Moderate);
        assert_eq!(CongestionLevel::from_density(15.0), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_density(0.0), CongestionLevel::Low);
    }

    #[test]
    fn test_level_derived_from_score_overrides_backend_value() {
        let adapter = ZoneAdapter::default();
        // Backend says Low but the score is critical-range
        let displays = adapter.adapt_zones(&[zone(72.0)]);
        assert_eq!(displays[0].level, CongestionLevel::Critical);
    }

    #[test]
    fn test_missing_polygon_gets_grid_cell_square() {
        let adapter = ZoneAdapter::default();
        let displays = adapter.adapt_zones(&[zone(5.0)]);

        let ring = &displays[0].polygon;
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        // Cell is centered on the zone
        assert!((ring[0][0] - (34.9 - 0.125)).abs() < 1e-9);
        assert!((ring[0][1] - (32.0 - 0.125)).abs() < 1e-9);
    }

    #[test]
    fn test_delivered_polygon_is_kept() {
        let adapter = ZoneAdapter::default();
        let ring = vec![[34.8, 31.9], [35.0, 31.9], [34.9, 32.1], [34.8, 31.9]];
        let mut z = zone(20.0);
        z.polygon = Some(ring.clone());

        let displays = adapter.adapt_zones(&[z]);
        assert_eq!(displays[0].polygon, ring);
    }

    #[test]
    fn test_sort_and_cap() {
        let config = ZoneConfig {
            max_display: 2,
            ..ZoneConfig::default()
        };
        let adapter = ZoneAdapter::new(config, ColorPalette::default());

        let displays = adapter.adapt_zones(&[zone(10.0), zone(60.0), zone(35.0)]);
        assert_eq!(displays.len(), 2);
        assert!((displays[0].score - 60.0).abs() < 1e-9);
        assert!((displays[1].score - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let adapter = ZoneAdapter::default();
        assert!(adapter.adapt_zones(&[]).is_empty());
        assert!(adapter.adapt_clusters(&[]).is_empty());
    }

    #[test]
    fn test_cluster_tiers_use_count_thresholds() {
        let adapter = ZoneAdapter::default();
        let cluster = Cluster {
            points: Vec::new(),
            centroid: [34.9, 32.0],
            total_count: 55,
            polygon: vec![[34.8, 31.9], [35.0, 31.9], [34.9, 32.1], [34.8, 31.9]],
        };

        let displays = adapter.adapt_clusters(&[cluster]);
        assert_eq!(displays[0].level, CongestionLevel::Critical);
        assert_eq!(displays[0].label, "55 events");
    }

    #[test]
    fn test_zone_wire_format() {
        let json = r#"{
            "lat": 32.0, "lon": 34.9,
            "density_score": 42.0,
            "flight_count": 31, "holding_count": 4,
            "avg_altitude_ft": 18000.0, "flights_per_hour": 62.0,
            "congestion_level": "high"
        }"#;
        let zone: CongestionZone = serde_json::from_str(json).unwrap();
        assert_eq!(zone.congestion_level, CongestionLevel::High);
        assert!(zone.polygon.is_none());
    }
}
