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

//! Traffic simulation: virtual clock, position interpolation, and
//! proximity warnings.
//!
//! A single virtual-time value in minutes drives every flight. The clock is
//! an explicit state machine, independent of any rendering framework: a
//! display loop calls [`SimulationClock::tick`] with its wall-clock delta,
//! and a test harness can drive it synchronously the same way. Advancing
//! the clock is the only mutation in the module; interpolation and
//! proximity detection are pure reads recomputed on every tick.

pub mod traffic;

use log::warn;
use serde::Serialize;

use crate::config::{Rgb, SimConfig};
use crate::geo::haversine_distance_nm;
use crate::predict::{PathPoint, TrackedAircraft};

/// Allowed simulation speed multipliers.
pub const SPEED_MULTIPLIERS: [f64; 5] = [1.0, 5.0, 10.0, 30.0, 60.0];

/// Virtual-time clock for one simulation run.
///
/// State machine: stopped ⇄ running, plus an independently settable scrub
/// position. Reaching the end of the run auto-stops and clamps.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    current_time_min: f64,
    max_time_min: f64,
    speed_multiplier: f64,
    playing: bool,
}

impl SimulationClock {
    /// Create a stopped clock at time zero running out to `max_time_min`.
    #[must_use]
    pub fn new(max_time_min: f64) -> Self {
        Self {
            current_time_min: 0.0,
            max_time_min,
            speed_multiplier: 1.0,
            playing: false,
        }
    }

    /// Derive the run length from flight ETAs: the largest known ETA,
    /// clamped to the configured duration window.
    #[must_use]
    pub fn for_etas<I>(etas: I, config: &SimConfig) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let longest = etas
            .into_iter()
            .flatten()
            .fold(0.0_f64, f64::max)
            .clamp(config.min_duration_min, config.max_duration_min);
        Self::new(longest)
    }

    /// Current virtual time in minutes.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.current_time_min
    }

    /// End of the run in minutes.
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.max_time_min
    }

    /// Whether the clock is advancing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current speed multiplier.
    #[must_use]
    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Start advancing. Restarting a finished run rewinds to zero.
    pub fn play(&mut self) {
        if self.current_time_min >= self.max_time_min {
            self.current_time_min = 0.0;
        }
        self.playing = true;
    }

    /// Stop advancing without moving the scrub position.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Set the scrub position, clamped to the run window. Works while
    /// stopped or running.
    pub fn seek(&mut self, time_min: f64) {
        self.current_time_min = time_min.clamp(0.0, self.max_time_min);
    }

    /// Set the speed multiplier. Values outside [`SPEED_MULTIPLIERS`] are
    /// ignored.
    pub fn set_speed(&mut self, multiplier: f64) {
        if SPEED_MULTIPLIERS.contains(&multiplier) {
            self.speed_multiplier = multiplier;
        } else {
            warn!("Ignoring unsupported speed multiplier {multiplier}");
        }
    }

    /// Advance by a wall-clock delta. Returns true while the run is still
    /// going; reaching the end clamps to the end and auto-stops.
    pub fn tick(&mut self, delta_seconds: f64) -> bool {
        if !self.playing {
            return false;
        }

        self.current_time_min += delta_seconds / 60.0 * self.speed_multiplier;
        if self.current_time_min >= self.max_time_min {
            self.current_time_min = self.max_time_min;
            self.playing = false;
        }
        self.playing
    }
}

/// Severity of a proximity warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximitySeverity {
    Warning,
    Critical,
}

/// A pairwise conflict between the planned flight and another flight.
///
/// Derived transiently at each tick, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ProximityWarning {
    /// Id of the conflicting flight.
    pub other_flight_id: String,
    /// Lateral separation in nautical miles.
    pub lateral_distance_nm: f64,
    /// Absolute altitude difference in feet.
    pub altitude_diff_ft: f64,
    /// Conflict severity.
    pub severity: ProximitySeverity,
}

/// Interpolated state of one flight at a point in virtual time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FlightPosition {
    pub lat: f64,
    pub lon: f64,
    pub alt_ft: f64,
    /// True once the flight has reached its ETA; a landed flight is not
    /// rendered as airborne.
    pub landed: bool,
}

/// A flight participating in a simulation run.
#[derive(Debug, Clone)]
pub struct SimulatedFlight {
    /// The underlying aircraft state at prediction time.
    pub aircraft: TrackedAircraft,
    /// Predicted future positions, ordered by time offset.
    pub path: Vec<PathPoint>,
    /// Minutes to destination, when the speed allows an estimate.
    pub eta_minutes: Option<f64>,
    /// Display color.
    pub color: Rgb,
    /// True for the user's planned flight. At most one flight in a run may
    /// carry this flag.
    pub is_planned: bool,
}

impl SimulatedFlight {
    /// Interpolate the flight's position at a virtual time.
    ///
    /// Past the ETA the position snaps to the destination at altitude zero.
    /// Between path points, latitude, longitude and altitude interpolate
    /// linearly by the fractional progress between the bracketing pair.
    /// Returns `None` for an empty path.
    #[must_use]
    pub fn position_at(&self, time_min: f64) -> Option<FlightPosition> {
        let last = self.path.last()?;

        if let Some(eta) = self.eta_minutes {
            if time_min >= eta {
                return Some(FlightPosition {
                    lat: last.lat,
                    lon: last.lon,
                    alt_ft: 0.0,
                    landed: true,
                });
            }
        }

        let first = self.path[0];
        if time_min <= first.time_offset_min {
            return Some(FlightPosition {
                lat: first.lat,
                lon: first.lon,
                alt_ft: first.alt_ft,
                landed: false,
            });
        }
        if time_min >= last.time_offset_min {
            return Some(FlightPosition {
                lat: last.lat,
                lon: last.lon,
                alt_ft: last.alt_ft,
                landed: false,
            });
        }

        // The path is time-ordered and short, a linear scan for the
        // bracketing pair is plenty
        let mut index = 0;
        for (i, point) in self.path.iter().enumerate() {
            if point.time_offset_min > time_min {
                break;
            }
            index = i;
        }
        let a = self.path[index];
        let b = self.path[index + 1];

        let span = b.time_offset_min - a.time_offset_min;
        let progress = if span > 0.0 {
            ((time_min - a.time_offset_min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Some(FlightPosition {
            lat: a.lat + (b.lat - a.lat) * progress,
            lon: a.lon + (b.lon - a.lon) * progress,
            alt_ft: a.alt_ft + (b.alt_ft - a.alt_ft) * progress,
            landed: false,
        })
    }
}

/// One simulation run: a clock plus the participating flights.
///
/// Single-owner and explicitly stateful, unlike the pure clustering and
/// prediction stages: one active run per view.
#[derive(Debug, Clone)]
pub struct TrafficSimulation {
    clock: SimulationClock,
    flights: Vec<SimulatedFlight>,
    config: SimConfig,
}

impl TrafficSimulation {
    /// Create a run over the given flights. The run length comes from the
    /// largest flight ETA, clamped to the configured window.
    #[must_use]
    pub fn new(config: SimConfig, flights: Vec<SimulatedFlight>) -> Self {
        let clock = SimulationClock::for_etas(flights.iter().map(|f| f.eta_minutes), &config);
        Self {
            clock,
            flights,
            config,
        }
    }

    /// The simulation clock.
    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Mutable access to the clock for play/pause/seek/speed control.
    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    /// The participating flights.
    #[must_use]
    pub fn flights(&self) -> &[SimulatedFlight] {
        &self.flights
    }

    /// Flag one flight as the planned flight, clearing the flag from every
    /// other flight. Returns false when no flight has the given id.
    pub fn set_planned(&mut self, id: &str) -> bool {
        let found = self.flights.iter().any(|f| f.aircraft.id == id);
        if found {
            for flight in &mut self.flights {
                flight.is_planned = flight.aircraft.id == id;
            }
        }
        found
    }

    /// The planned flight, when one is flagged.
    #[must_use]
    pub fn planned(&self) -> Option<&SimulatedFlight> {
        self.flights.iter().find(|f| f.is_planned)
    }

    /// Advance the clock by a wall-clock delta.
    pub fn tick(&mut self, delta_seconds: f64) -> bool {
        self.clock.tick(delta_seconds)
    }

    /// Interpolated position of every flight at the current virtual time.
    #[must_use]
    pub fn positions(&self) -> Vec<(&str, FlightPosition)> {
        let now = self.clock.current_time_min;
        self.flights
            .iter()
            .filter_map(|f| f.position_at(now).map(|p| (f.aircraft.id.as_str(), p)))
            .collect()
    }

    /// Proximity warnings for the planned flight against every other
    /// airborne flight at the current virtual time.
    ///
    /// Recomputed from scratch on every call, sorted by ascending lateral
    /// distance. No planned flight means no warnings.
    #[must_use]
    pub fn proximity_warnings(&self) -> Vec<ProximityWarning> {
        let now = self.clock.current_time_min;

        let Some(ego) = self.planned() else {
            return Vec::new();
        };
        let Some(ego_pos) = ego.position_at(now) else {
            return Vec::new();
        };
        if ego_pos.landed {
            return Vec::new();
        }

        let mut warnings = Vec::new();
        for flight in &self.flights {
            if flight.is_planned {
                continue;
            }
            let Some(pos) = flight.position_at(now) else {
                continue;
            };
            if pos.landed {
                continue;
            }

            let lateral = haversine_distance_nm(ego_pos.lat, ego_pos.lon, pos.lat, pos.lon);
            let alt_diff = (ego_pos.alt_ft - pos.alt_ft).abs();

            let severity = if lateral < self.config.critical_lateral_nm
                && alt_diff < self.config.critical_alt_diff_ft
            {
                Some(ProximitySeverity::Critical)
            } else if lateral < self.config.warning_lateral_nm
                && alt_diff < self.config.warning_alt_diff_ft
            {
                Some(ProximitySeverity::Warning)
            } else {
                None
            };

            if let Some(severity) = severity {
                warnings.push(ProximityWarning {
                    other_flight_id: flight.aircraft.id.clone(),
                    lateral_distance_nm: lateral,
                    altitude_diff_ft: alt_diff,
                    severity,
                });
            }
        }

        warnings.sort_by(|a, b| a.lateral_distance_nm.total_cmp(&b.lateral_distance_nm));
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorPalette;

    fn aircraft(id: &str, lat: f64, lon: f64) -> TrackedAircraft {
        TrackedAircraft {
            id: id.to_string(),
            callsign: None,
            lat,
            lon,
            altitude_ft: 30_000.0,
            heading_deg: 90.0,
            speed_kts: 420.0,
            is_simulated: true,
            track_history: Vec::new(),
        }
    }

    fn point(lat: f64, lon: f64, alt: f64, t: f64) -> PathPoint {
        PathPoint {
            lat,
            lon,
            alt_ft: alt,
            time_offset_min: t,
        }
    }

    fn flight(id: &str, path: Vec<PathPoint>, eta: Option<f64>) -> SimulatedFlight {
        let (lat, lon) = path.first().map_or((0.0, 0.0), |p| (p.lat, p.lon));
        SimulatedFlight {
            aircraft: aircraft(id, lat, lon),
            path,
            eta_minutes: eta,
            color: ColorPalette::default().traffic_color(0),
            is_planned: false,
        }
    }

    #[test]
    fn test_clock_tick_scales_by_multiplier() {
        let mut clock = SimulationClock::new(90.0);
        clock.play();
        clock.set_speed(10.0);
        clock.tick(60.0);
        assert!((clock.current_time() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_auto_stops_at_end() {
        let mut clock = SimulationClock::new(60.0);
        clock.play();
        clock.set_speed(60.0);

        // 70 wall seconds at 60x is 70 virtual minutes, past the end
        let still_running = clock.tick(70.0);
        assert!(!still_running);
        assert!(!clock.is_playing());
        assert!((clock.current_time() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_ignores_tick_while_paused() {
        let mut clock = SimulationClock::new(60.0);
        clock.tick(30.0);
        assert!((clock.current_time()).abs() < 1e-9);
    }

    #[test]
    fn test_clock_seek_clamps() {
        let mut clock = SimulationClock::new(60.0);
        clock.seek(200.0);
        assert!((clock.current_time() - 60.0).abs() < 1e-9);
        clock.seek(-5.0);
        assert!((clock.current_time()).abs() < 1e-9);
    }

    #[test]
    fn test_clock_rejects_unsupported_speed() {
        let mut clock = SimulationClock::new(60.0);
        clock.set_speed(7.0);
        assert!((clock.speed_multiplier() - 1.0).abs() < 1e-9);
        clock.set_speed(30.0);
        assert!((clock.speed_multiplier() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_replay_after_finish_rewinds() {
        let mut clock = SimulationClock::new(60.0);
        clock.play();
        clock.set_speed(60.0);
        clock.tick(61.0);
        assert!((clock.current_time() - 60.0).abs() < 1e-9);

        clock.play();
        assert!((clock.current_time()).abs() < 1e-9);
        assert!(clock.is_playing());
    }

    #[test]
    fn test_max_time_clamped_to_window() {
        let config = SimConfig::default();
        let short = SimulationClock::for_etas([Some(12.0)], &config);
        assert!((short.max_time() - 60.0).abs() < 1e-9);

        let long = SimulationClock::for_etas([Some(400.0), None], &config);
        assert!((long.max_time() - 120.0).abs() < 1e-9);

        let none = SimulationClock::for_etas([None, None], &config);
        assert!((none.max_time() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_at_time_zero_is_start() {
        let f = flight(
            "A",
            vec![point(32.0, 34.9, 30_000.0, 0.0), point(33.0, 34.4, 30_000.0, 20.0)],
            Some(40.0),
        );
        let pos = f.position_at(0.0).unwrap();
        assert!((pos.lat - 32.0).abs() < 1e-9);
        assert!((pos.lon - 34.9).abs() < 1e-9);
        assert!(!pos.landed);
    }

    #[test]
    fn test_position_interpolates_between_points() {
        let f = flight(
            "A",
            vec![point(32.0, 34.0, 20_000.0, 0.0), point(34.0, 36.0, 30_000.0, 10.0)],
            Some(60.0),
        );
        let pos = f.position_at(5.0).unwrap();
        assert!((pos.lat - 33.0).abs() < 1e-9);
        assert!((pos.lon - 35.0).abs() < 1e-9);
        assert!((pos.alt_ft - 25_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_past_eta_is_landed() {
        let f = flight(
            "A",
            vec![point(32.0, 34.9, 30_000.0, 0.0), point(34.8751, 33.6249, 0.0, 26.0)],
            Some(26.0),
        );
        let pos = f.position_at(30.0).unwrap();
        assert!(pos.landed);
        assert!((pos.alt_ft).abs() < 1e-9);
        assert!((pos.lat - 34.8751).abs() < 1e-9);
    }

    #[test]
    fn test_position_empty_path() {
        let f = flight("A", Vec::new(), None);
        assert!(f.position_at(5.0).is_none());
    }

    #[test]
    fn test_identical_positions_raise_critical() {
        let mut sim = TrafficSimulation::new(
            SimConfig::default(),
            vec![
                flight("EGO", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
                flight("OTHER", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
            ],
        );
        assert!(sim.set_planned("EGO"));

        let warnings = sim.proximity_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, ProximitySeverity::Critical);
        assert_eq!(warnings[0].other_flight_id, "OTHER");
    }

    #[test]
    fn test_distant_flights_raise_nothing() {
        let mut sim = TrafficSimulation::new(
            SimConfig::default(),
            vec![
                flight("EGO", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
                // ~50 nm north
                flight("OTHER", vec![point(32.83, 34.9, 30_000.0, 0.0)], None),
            ],
        );
        sim.set_planned("EGO");
        assert!(sim.proximity_warnings().is_empty());
    }

    #[test]
    fn test_vertical_separation_downgrades_severity() {
        let mut sim = TrafficSimulation::new(
            SimConfig::default(),
            vec![
                flight("EGO", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
                // Overhead but 1,500 ft above: inside warning band, outside
                // critical
                flight("OTHER", vec![point(32.0, 34.9, 31_500.0, 0.0)], None),
            ],
        );
        sim.set_planned("EGO");

        let warnings = sim.proximity_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, ProximitySeverity::Warning);
    }

    #[test]
    fn test_warnings_sorted_by_distance() {
        let mut sim = TrafficSimulation::new(
            SimConfig::default(),
            vec![
                flight("EGO", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
                // ~8 nm away
                flight("FAR", vec![point(32.133, 34.9, 30_000.0, 0.0)], None),
                // ~2 nm away
                flight("NEAR", vec![point(32.033, 34.9, 30_000.0, 0.0)], None),
            ],
        );
        sim.set_planned("EGO");

        let warnings = sim.proximity_warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].other_flight_id, "NEAR");
        assert_eq!(warnings[1].other_flight_id, "FAR");
    }

    #[test]
    fn test_no_planned_flight_no_warnings() {
        let sim = TrafficSimulation::new(
            SimConfig::default(),
            vec![
                flight("A", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
                flight("B", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
            ],
        );
        assert!(sim.proximity_warnings().is_empty());
    }

    #[test]
    fn test_landed_flights_raise_nothing() {
        let mut sim = TrafficSimulation::new(
            SimConfig::default(),
            vec![
                flight("EGO", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
                flight("DOWN", vec![point(32.0, 34.9, 0.0, 0.0)], Some(0.0)),
            ],
        );
        sim.set_planned("EGO");
        // DOWN is past its ETA from the start, so it never conflicts
        assert!(sim.proximity_warnings().is_empty());
    }

    #[test]
    fn test_set_planned_is_exclusive() {
        let mut sim = TrafficSimulation::new(
            SimConfig::default(),
            vec![
                flight("A", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
                flight("B", vec![point(32.1, 34.9, 30_000.0, 0.0)], None),
            ],
        );
        assert!(sim.set_planned("A"));
        assert!(sim.set_planned("B"));
        let planned: Vec<&str> = sim
            .flights()
            .iter()
            .filter(|f| f.is_planned)
            .map(|f| f.aircraft.id.as_str())
            .collect();
        assert_eq!(planned, vec!["B"]);

        assert!(!sim.set_planned("MISSING"));
        assert_eq!(sim.planned().unwrap().aircraft.id, "B");
    }

    #[test]
    fn test_positions_reports_every_flight() {
        let sim = TrafficSimulation::new(
            SimConfig::default(),
            vec![
                flight("A", vec![point(32.0, 34.9, 30_000.0, 0.0)], None),
                flight("B", vec![point(33.0, 35.0, 28_000.0, 0.0)], None),
            ],
        );
        let positions = sim.positions();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].0, "A");
    }
}
