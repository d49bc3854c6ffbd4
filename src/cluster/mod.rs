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

//! Spatial clustering of located events.
//!
//! Groups signal-loss and anomaly observations into single-linkage clusters:
//! two events share a cluster exactly when they are connected through a
//! chain of pairwise distances each within the link threshold. Each cluster
//! gets an outline polygon for the map layer:
//!
//! - 3 or more members: convex hull of the member positions
//! - 1 or 2 members: a synthesized circle buffer around the centroid
//! - backend-precomputed clusters: the delivered polygon, passed through
//!   unchanged
//!
//! That order is a strict priority: a backend polygon is never recomputed
//! locally, and circle buffers are only synthesized where no hull can exist.
//!
//! Clustering is a fresh, pure computation on every call. The greedy growth
//! is O(n^3) worst case, which is fine for the tens of events a batch
//! carries; past that scale this wants a spatial grid and union-find.

mod hull;

pub use hull::{circle_ring, convex_hull_ring, LonLat};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ClusterConfig;
use crate::geo::haversine_distance_nm;

/// A point-aggregated observation, such as a signal-coverage gap.
///
/// Produced by the upstream aggregation service and consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedEvent {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Number of raw observations aggregated at this point.
    pub count: u64,
    /// Mean duration of the aggregated observations in seconds.
    #[serde(rename = "avg_duration_seconds", default)]
    pub avg_duration_secs: f64,
}

/// A group of located events with derived geometry.
///
/// Rebuilt from scratch on every input change, never mutated in place. The
/// polygon is a closed `[lon, lat]` ring.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    /// The member events.
    pub points: Vec<LocatedEvent>,
    /// Arithmetic mean of the member positions as `[lon, lat]`.
    pub centroid: LonLat,
    /// Sum of the member event counts.
    pub total_count: u64,
    /// Closed outline ring.
    pub polygon: Vec<LonLat>,
}

/// A precomputed cluster delivered by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendCluster {
    /// Cluster centroid as `[lon, lat]`.
    pub centroid: LonLat,
    /// Outline ring as delivered; may be empty.
    #[serde(default)]
    pub polygon: Vec<LonLat>,
    /// Member events, when the backend includes them.
    #[serde(default)]
    pub points: Vec<LocatedEvent>,
    /// Total event count across the cluster.
    pub total_events: u64,
}

/// A lone event the backend reports outside of any cluster.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSingleton {
    pub lat: f64,
    pub lon: f64,
    pub event_count: u64,
}

/// Single-linkage clusterer over located events.
#[derive(Debug, Clone, Default)]
pub struct SpatialClusterer {
    config: ClusterConfig,
}

impl SpatialClusterer {
    /// Create a clusterer with the given parameters.
    #[must_use]
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// The configured link threshold in nautical miles.
    #[must_use]
    pub fn threshold_nm(&self) -> f64 {
        self.config.threshold_nm
    }

    /// Partition events into single-linkage clusters and synthesize their
    /// outline polygons.
    ///
    /// Empty input yields empty output. Clusters whose hull degenerates to
    /// fewer than 3 distinct vertices are dropped from the result.
    #[must_use]
    pub fn cluster(&self, events: &[LocatedEvent]) -> Vec<Cluster> {
        let mut clusters = Vec::new();
        for members in self.link_groups(events) {
            let points: Vec<LocatedEvent> = members.iter().map(|&i| events[i].clone()).collect();
            if let Some(cluster) = self.build_cluster(points) {
                clusters.push(cluster);
            }
        }
        debug!(
            "Clustered {} events into {} clusters at {:.1} nm",
            events.len(),
            clusters.len(),
            self.config.threshold_nm
        );
        clusters
    }

    /// Adopt precomputed backend clusters and singletons.
    ///
    /// Delivered polygons are passed through unchanged; geometry is only
    /// synthesized for clusters that arrive without one and for singleton
    /// events.
    #[must_use]
    pub fn adopt_backend(
        &self,
        clusters: &[BackendCluster],
        singletons: &[BackendSingleton],
    ) -> Vec<Cluster> {
        let mut adopted = Vec::with_capacity(clusters.len() + singletons.len());

        for bc in clusters {
            let polygon = if bc.polygon.len() >= 3 {
                bc.polygon.clone()
            } else {
                self.circle_buffer(bc.centroid)
            };
            adopted.push(Cluster {
                points: bc.points.clone(),
                centroid: bc.centroid,
                total_count: bc.total_events,
                polygon,
            });
        }

        for s in singletons {
            let centroid = [s.lon, s.lat];
            adopted.push(Cluster {
                points: vec![LocatedEvent {
                    lat: s.lat,
                    lon: s.lon,
                    count: s.event_count,
                    avg_duration_secs: 0.0,
                }],
                centroid,
                total_count: s.event_count,
                polygon: self.circle_buffer(centroid),
            });
        }

        adopted
    }

    /// Greedy single-linkage growth: each cluster repeatedly absorbs any
    /// unvisited event within the threshold of any current member, until a
    /// full pass absorbs nothing.
    fn link_groups(&self, events: &[LocatedEvent]) -> Vec<Vec<usize>> {
        let threshold = self.config.threshold_nm;
        let mut visited = vec![false; events.len()];
        let mut groups = Vec::new();

        for seed in 0..events.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            let mut members = vec![seed];

            loop {
                let mut absorbed = false;
                for i in 0..events.len() {
                    if visited[i] {
                        continue;
                    }
                    let linked = members.iter().any(|&m| {
                        haversine_distance_nm(events[m].lat, events[m].lon, events[i].lat, events[i].lon)
                            <= threshold
                    });
                    if linked {
                        visited[i] = true;
                        members.push(i);
                        absorbed = true;
                    }
                }
                if !absorbed {
                    break;
                }
            }

            groups.push(members);
        }

        groups
    }

    fn build_cluster(&self, points: Vec<LocatedEvent>) -> Option<Cluster> {
        let n = points.len() as f64;
        let centroid = [
            points.iter().map(|p| p.lon).sum::<f64>() / n,
            points.iter().map(|p| p.lat).sum::<f64>() / n,
        ];
        let total_count = points.iter().map(|p| p.count).sum();

        let polygon = if points.len() >= 3 {
            let coords: Vec<LonLat> = points.iter().map(|p| [p.lon, p.lat]).collect();
            match convex_hull_ring(&coords) {
                Some(ring) => ring,
                None => {
                    debug!(
                        "Dropping degenerate cluster of {} events at [{:.3}, {:.3}]",
                        points.len(),
                        centroid[0],
                        centroid[1]
                    );
                    return None;
                }
            }
        } else {
            self.circle_buffer(centroid)
        };

        Some(Cluster {
            points,
            centroid,
            total_count,
            polygon,
        })
    }

    fn circle_buffer(&self, centroid: LonLat) -> Vec<LonLat> {
        let radius = self
            .config
            .circle_min_radius_nm
            .max(self.config.threshold_nm / 3.0);
        circle_ring(centroid, radius, self.config.circle_vertices)
    }
}
