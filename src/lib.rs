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

//! Geospatial clustering and flight-path simulation engine for flight
//! tracking analytics.
//!
//! This library is the computational core behind a flight-tracking
//! dashboard: it turns pre-aggregated event and aircraft batches into the
//! geometry and time-indexed positions the map layer renders. Fetching,
//! charting and all other presentation concerns live outside this crate;
//! everything here is synchronous and side-effect-free apart from the
//! explicitly stateful simulation clock. The layers can be used
//! independently or composed together:
//!
//! - **Geo layer**: great-circle distance, bearing and projection math,
//!   plus an injectable reference airport table
//! - **Clustering layer**: single-linkage grouping of located events with
//!   hull and circle-buffer outline synthesis, and adoption of
//!   backend-precomputed clusters
//! - **Zone layer**: adaptation of congestion zones and clusters into
//!   ranked, colored, renderable descriptors
//! - **Prediction layer**: learned-route matching and kinematic
//!   extrapolation into timestamped future paths
//! - **Simulation layer**: a virtual-time clock, per-flight position
//!   interpolation, and pairwise proximity warnings
//!
//! # Clustering Events
//!
//! ```
//! use skytrace::cluster::{LocatedEvent, SpatialClusterer};
//! use skytrace::config::ClusterConfig;
//!
//! let events = vec![
//!     LocatedEvent { lat: 32.0, lon: 34.9, count: 5, avg_duration_secs: 40.0 },
//!     LocatedEvent { lat: 32.05, lon: 34.95, count: 3, avg_duration_secs: 25.0 },
//! ];
//!
//! let clusterer = SpatialClusterer::new(ClusterConfig::default());
//! let clusters = clusterer.cluster(&events);
//!
//! assert_eq!(clusters.len(), 1);
//! assert_eq!(clusters[0].total_count, 8);
//! ```
//!
//! # Running a Simulation
//!
//! ```
//! use skytrace::airports::AirportDirectory;
//! use skytrace::config::{ColorPalette, EngineConfig};
//! use skytrace::predict::{eta_minutes, FlightPathPredictor};
//! use skytrace::sim::traffic::{spawn_traffic, TrafficConfig};
//! use skytrace::sim::{SimulatedFlight, TrafficSimulation};
//!
//! let config = EngineConfig::default();
//! let predictor = FlightPathPredictor::new(config.predict.clone(), AirportDirectory::builtin());
//! let palette = ColorPalette::default();
//!
//! let flights: Vec<SimulatedFlight> = spawn_traffic(&TrafficConfig::default())
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, aircraft)| {
//!         let dest = predictor.resolve_destination(&aircraft).expect("builtin table");
//!         let (dest_lat, dest_lon) = (dest.latitude, dest.longitude);
//!         let path =
//!             predictor.predict_path(&aircraft, dest_lat, dest_lon, &[], config.predict.horizon_minutes);
//!         let eta = eta_minutes(&aircraft, dest_lat, dest_lon);
//!         SimulatedFlight {
//!             aircraft,
//!             path,
//!             eta_minutes: eta,
//!             color: palette.traffic_color(i),
//!             is_planned: false,
//!         }
//!     })
//!     .collect();
//!
//! let mut sim = TrafficSimulation::new(config.sim.clone(), flights);
//! sim.clock_mut().play();
//! sim.tick(1.0);
//! assert!(sim.clock().current_time() > 0.0);
//! ```

pub mod airports;
pub mod cluster;
pub mod config;
pub mod geo;
pub mod predict;
pub mod sim;
pub mod zones;

pub use airports::{Airport, AirportDirectory, DataError};
pub use cluster::{BackendCluster, BackendSingleton, Cluster, LocatedEvent, SpatialClusterer};
pub use config::{ColorPalette, EngineConfig, Rgb};
pub use predict::{
    eta_minutes, FlightPathPredictor, HistoryPoint, LearnedRoute, PathPoint, TrackPoint,
    TrackedAircraft,
};
pub use sim::{
    FlightPosition, ProximitySeverity, ProximityWarning, SimulatedFlight, SimulationClock,
    TrafficSimulation,
};
pub use zones::{CongestionLevel, CongestionZone, ZoneAdapter, ZoneDisplay};
