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

//! Synthetic traffic for the simulation modal.
//!
//! Spawns a deterministic fan of simulated aircraft around a region
//! center: positions, headings, speeds and altitudes vary by slot index,
//! so repeated spawns with the same parameters produce the same sky.

use uuid::Uuid;

use crate::geo::destination_point;
use crate::predict::TrackedAircraft;

/// Phonetic slot names for simulated callsigns.
const CALLSIGN_NAMES: [&str; 8] = [
    "ALPHA", "BRAVO", "CHARLIE", "DELTA", "ECHO", "FOXTROT", "GOLF", "HOTEL",
];

/// Parameters for spawning simulated traffic.
#[derive(Debug, Clone)]
pub struct TrafficConfig {
    /// Region center latitude in degrees.
    pub center_lat: f64,
    /// Region center longitude in degrees.
    pub center_lon: f64,
    /// Number of aircraft to spawn.
    pub count: usize,
    /// Spawn ring radius in nautical miles.
    pub radius_nm: f64,
    /// Base cruise altitude in feet; slots stagger above this.
    pub base_altitude_ft: f64,
    /// Base ground speed in knots; slots stagger above this.
    pub base_speed_kts: f64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            center_lat: 32.0114,
            center_lon: 34.8867,
            count: 6,
            radius_nm: 80.0,
            base_altitude_ft: 24_000.0,
            base_speed_kts: 380.0,
        }
    }
}

/// Spawn simulated aircraft spread evenly around the region center, each
/// headed inbound with a per-slot offset.
#[must_use]
pub fn spawn_traffic(config: &TrafficConfig) -> Vec<TrackedAircraft> {
    (0..config.count)
        .map(|slot| {
            let bearing = 360.0 * slot as f64 / config.count.max(1) as f64;
            // Stagger spawn distance so the ring is not perfectly circular
            let distance = config.radius_nm * (0.6 + 0.4 * (slot % 3) as f64 / 2.0);
            let (lat, lon) =
                destination_point(config.center_lat, config.center_lon, bearing, distance);

            let name = CALLSIGN_NAMES[slot % CALLSIGN_NAMES.len()];
            let inbound = (bearing + 180.0 + 10.0 * (slot % 5) as f64).rem_euclid(360.0);

            TrackedAircraft {
                id: Uuid::new_v4().to_string(),
                callsign: Some(format!("SIM-{}{}", name, slot + 1)),
                lat,
                lon,
                altitude_ft: config.base_altitude_ft + 1_000.0 * (slot % 7) as f64,
                heading_deg: inbound,
                speed_kts: config.base_speed_kts + 15.0 * (slot % 4) as f64,
                is_simulated: true,
                track_history: Vec::new(),
            }
        })
        .collect()
}
