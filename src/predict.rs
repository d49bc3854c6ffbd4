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

//! Flight-path prediction.
//!
//! For each tracked aircraft the predictor resolves a destination airport,
//! then builds a timestamped sequence of future positions. When a learned
//! route centerline starts near the aircraft and ends near the destination,
//! the path follows the centerline at the aircraft's ground speed.
//! Otherwise the path is a great-circle extrapolation toward the
//! destination with a simple cruise-then-descend altitude profile.
//!
//! Prediction is a pure function of its inputs; it can be re-run on every
//! batch refresh without retained state.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::airports::{Airport, AirportDirectory};
use crate::config::PredictConfig;
use crate::geo::{destination_point, haversine_distance_nm, initial_bearing_deg};

/// A point on a learned route centerline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in feet, when the route carries a vertical profile.
    #[serde(default)]
    pub alt_ft: Option<f64>,
}

/// A recorded position sample from an aircraft's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in feet.
    pub alt_ft: Option<f64>,
    /// Sample time.
    pub timestamp: DateTime<Utc>,
}

/// Current kinematic state of a tracked aircraft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedAircraft {
    /// Stable identifier, ICAO address or a generated id for simulated
    /// traffic.
    pub id: String,
    /// Callsign, when known.
    pub callsign: Option<String>,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in feet.
    pub altitude_ft: f64,
    /// Heading in degrees, north = 0.
    pub heading_deg: f64,
    /// Ground speed in knots.
    pub speed_kts: f64,
    /// True for aircraft generated by the traffic simulator.
    pub is_simulated: bool,
    /// Recorded position history, oldest first. May be empty.
    #[serde(default)]
    pub track_history: Vec<HistoryPoint>,
}

/// A representative path between two areas, learned from historical
/// traffic. Read-only reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedRoute {
    /// Ordered centerline points from route start to route end.
    pub centerline: Vec<TrackPoint>,
}

/// One point of a predicted path.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PathPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in feet.
    pub alt_ft: f64,
    /// Minutes from the prediction start, non-decreasing along the path.
    pub time_offset_min: f64,
}

/// Minutes to fly the distance at the given ground speed, or `None` when
/// the speed is zero or negative. Absence stays absent, it is never
/// coerced to zero.
#[must_use]
pub fn eta_minutes(aircraft: &TrackedAircraft, dest_lat: f64, dest_lon: f64) -> Option<f64> {
    if aircraft.speed_kts > 0.0 {
        let distance = haversine_distance_nm(aircraft.lat, aircraft.lon, dest_lat, dest_lon);
        Some(distance / aircraft.speed_kts * 60.0)
    } else {
        None
    }
}

/// Flight-path predictor over a set of learned routes and a reference
/// airport table.
#[derive(Debug, Clone)]
pub struct FlightPathPredictor {
    config: PredictConfig,
    airports: AirportDirectory,
}

impl FlightPathPredictor {
    /// Create a predictor with the given parameters and airport table.
    #[must_use]
    pub fn new(config: PredictConfig, airports: AirportDirectory) -> Self {
        Self { config, airports }
    }

    /// The injected airport table.
    #[must_use]
    pub fn airports(&self) -> &AirportDirectory {
        &self.airports
    }

    /// Resolve the most plausible destination airport for an aircraft.
    ///
    /// Prefers the nearest airport to the last recorded track point. With
    /// no history, projects the aircraft ahead along its current heading
    /// and takes the nearest airport to that point.
    #[must_use]
    pub fn resolve_destination(&self, aircraft: &TrackedAircraft) -> Option<&Airport> {
        let (lat, lon) = match aircraft.track_history.last() {
            Some(last) => (last.lat, last.lon),
            None => destination_point(
                aircraft.lat,
                aircraft.lon,
                aircraft.heading_deg,
                self.config.heading_projection_nm,
            ),
        };
        self.airports.nearest(lat, lon).map(|(airport, _)| airport)
    }

    /// Find the learned route that best connects the aircraft to the
    /// destination.
    ///
    /// A route is a candidate when its start point lies within the match
    /// radius of the aircraft. Candidates are scored by the sum of the
    /// aircraft-to-start and end-to-destination distances; the smallest
    /// score wins. Routes with an empty centerline never match.
    #[must_use]
    pub fn match_route<'r>(
        &self,
        aircraft: &TrackedAircraft,
        dest_lat: f64,
        dest_lon: f64,
        routes: &'r [LearnedRoute],
    ) -> Option<&'r LearnedRoute> {
        let mut best: Option<(&LearnedRoute, f64)> = None;

        for route in routes {
            let (Some(start), Some(end)) = (route.centerline.first(), route.centerline.last())
            else {
                continue;
            };

            let to_start = haversine_distance_nm(aircraft.lat, aircraft.lon, start.lat, start.lon);
            if to_start > self.config.route_match_radius_nm {
                continue;
            }

            let score = to_start + haversine_distance_nm(end.lat, end.lon, dest_lat, dest_lon);
            match best {
                Some((_, best_score)) if best_score <= score => {}
                _ => best = Some((route, score)),
            }
        }

        best.map(|(route, _)| route)
    }

    /// Predict the aircraft's future positions out to the horizon.
    ///
    /// The result is ordered by non-decreasing time offset and always
    /// contains at least one point. An aircraft without usable speed
    /// cannot move, so its path is its current position at time zero.
    #[must_use]
    pub fn predict_path(
        &self,
        aircraft: &TrackedAircraft,
        dest_lat: f64,
        dest_lon: f64,
        routes: &[LearnedRoute],
        horizon_minutes: f64,
    ) -> Vec<PathPoint> {
        if aircraft.speed_kts <= 0.0 {
            return vec![PathPoint {
                lat: aircraft.lat,
                lon: aircraft.lon,
                alt_ft: aircraft.altitude_ft,
                time_offset_min: 0.0,
            }];
        }

        if let Some(route) = self.match_route(aircraft, dest_lat, dest_lon, routes) {
            debug!(
                "Aircraft {} follows learned route ({} centerline points)",
                aircraft.id,
                route.centerline.len()
            );
            self.follow_centerline(aircraft, route, horizon_minutes)
        } else {
            self.extrapolate(aircraft, dest_lat, dest_lon, horizon_minutes)
        }
    }

    /// Walk forward along a matched centerline from the point closest to
    /// the aircraft, accumulating elapsed time per segment, until the
    /// horizon is exhausted or the centerline ends.
    fn follow_centerline(
        &self,
        aircraft: &TrackedAircraft,
        route: &LearnedRoute,
        horizon_minutes: f64,
    ) -> Vec<PathPoint> {
        let centerline = &route.centerline;
        let start_index = centerline
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = haversine_distance_nm(aircraft.lat, aircraft.lon, a.lat, a.lon);
                let db = haversine_distance_nm(aircraft.lat, aircraft.lon, b.lat, b.lon);
                da.total_cmp(&db)
            })
            .map_or(0, |(i, _)| i);

        let mut path = Vec::with_capacity(centerline.len() - start_index);
        let mut elapsed = 0.0;
        let mut previous = centerline[start_index];
        path.push(PathPoint {
            lat: previous.lat,
            lon: previous.lon,
            alt_ft: previous.alt_ft.unwrap_or(aircraft.altitude_ft),
            time_offset_min: 0.0,
        });

        for point in &centerline[start_index + 1..] {
            let segment = haversine_distance_nm(previous.lat, previous.lon, point.lat, point.lon);
            elapsed += segment / aircraft.speed_kts * 60.0;
            if elapsed > horizon_minutes {
                break;
            }
            path.push(PathPoint {
                lat: point.lat,
                lon: point.lon,
                alt_ft: point.alt_ft.unwrap_or(aircraft.altitude_ft),
                time_offset_min: elapsed,
            });
            previous = *point;
        }

        path
    }

    /// Great-circle extrapolation toward the destination at constant speed,
    /// sampled at evenly spaced times. Cruise altitude is held for the
    /// first 80% of the distance and descends linearly to zero over the
    /// final 20%. Reaching the destination emits the landing point and
    /// stops.
    fn extrapolate(
        &self,
        aircraft: &TrackedAircraft,
        dest_lat: f64,
        dest_lon: f64,
        horizon_minutes: f64,
    ) -> Vec<PathPoint> {
        let total = haversine_distance_nm(aircraft.lat, aircraft.lon, dest_lat, dest_lon);
        if total <= f64::EPSILON {
            return vec![PathPoint {
                lat: dest_lat,
                lon: dest_lon,
                alt_ft: 0.0,
                time_offset_min: 0.0,
            }];
        }

        let samples = ((horizon_minutes / 5.0).ceil() as usize).clamp(1, 20);
        let bearing = initial_bearing_deg(aircraft.lat, aircraft.lon, dest_lat, dest_lon);
        let cruise = aircraft.altitude_ft;

        let mut path = Vec::with_capacity(samples + 1);
        path.push(PathPoint {
            lat: aircraft.lat,
            lon: aircraft.lon,
            alt_ft: cruise,
            time_offset_min: 0.0,
        });

        for i in 1..=samples {
            let t = horizon_minutes * i as f64 / samples as f64;
            let travelled = aircraft.speed_kts * t / 60.0;

            if travelled >= total {
                path.push(PathPoint {
                    lat: dest_lat,
                    lon: dest_lon,
                    alt_ft: 0.0,
                    time_offset_min: total / aircraft.speed_kts * 60.0,
                });
                break;
            }

            let (lat, lon) = destination_point(aircraft.lat, aircraft.lon, bearing, travelled);
            let fraction = travelled / total;
            let alt_ft = if fraction < 0.8 {
                cruise
            } else {
                (cruise * (1.0 - (fraction - 0.8) / 0.2)).max(0.0)
            };

            path.push(PathPoint {
                lat,
                lon,
                alt_ft,
                time_offset_min: t,
            });
        }

        path
    }
}
