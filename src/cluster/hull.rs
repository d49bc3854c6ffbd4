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

//! Cluster outline geometry.
//!
//! Polygons are `[lon, lat]` rings, closed so the first and last vertex are
//! equal. Hulls are computed in plain coordinate space; at regional scale
//! the curvature error is well below the rendering resolution.

use crate::geo::{nm_to_lat_degrees, nm_to_lon_degrees};

/// A `[lon, lat]` coordinate pair.
pub type LonLat = [f64; 2];

/// Cross product of `oa` x `ob`. Positive when `b` lies counterclockwise of
/// the line from `o` through `a`.
fn cross(o: LonLat, a: LonLat, b: LonLat) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

fn squared_span(a: LonLat, b: LonLat) -> f64 {
    (b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)
}

/// Compute the convex hull of a point set by gift wrapping and return it as
/// a closed ring.
///
/// Returns `None` when fewer than 3 distinct vertices remain, which covers
/// duplicate-heavy and collinear point sets. Collinear candidates during the
/// wrap are tie-broken by taking the farthest one, so a fully collinear set
/// degenerates to a 2-vertex walk instead of looping.
#[must_use]
pub fn convex_hull_ring(points: &[LonLat]) -> Option<Vec<LonLat>> {
    let mut distinct: Vec<LonLat> = Vec::with_capacity(points.len());
    for p in points {
        if !distinct.iter().any(|q| q == p) {
            distinct.push(*p);
        }
    }
    if distinct.len() < 3 {
        return None;
    }

    // Start from the leftmost vertex, lowest latitude on ties. It is always
    // on the hull.
    let start = distinct
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a[0], a[1]).partial_cmp(&(b[0], b[1])).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)?;

    let mut hull: Vec<LonLat> = Vec::new();
    let mut current = start;

    loop {
        hull.push(distinct[current]);
        if hull.len() > distinct.len() {
            // Should be unreachable with the farthest tie-break, kept as a
            // hard stop against pathological floating point input.
            return None;
        }

        let mut candidate = if current == 0 { 1 } else { 0 };
        for i in 0..distinct.len() {
            if i == current || i == candidate {
                continue;
            }
            let turn = cross(distinct[current], distinct[candidate], distinct[i]);
            if turn > 0.0 {
                candidate = i;
            } else if turn == 0.0
                && squared_span(distinct[current], distinct[i])
                    > squared_span(distinct[current], distinct[candidate])
            {
                candidate = i;
            }
        }

        current = candidate;
        if current == start {
            break;
        }
    }

    if hull.len() < 3 {
        return None;
    }

    hull.push(hull[0]);
    Some(hull)
}

/// Synthesize a closed regular polygon approximating a circle of
/// `radius_nm` around a centroid. Used for clusters too small to form a
/// hull.
#[must_use]
pub fn circle_ring(center: LonLat, radius_nm: f64, vertices: usize) -> Vec<LonLat> {
    let vertices = vertices.max(3);
    let dlat = nm_to_lat_degrees(radius_nm);
    let dlon = nm_to_lon_degrees(radius_nm, center[1]);

    let mut ring = Vec::with_capacity(vertices + 1);
    for i in 0..vertices {
        let theta = std::f64::consts::TAU * i as f64 / vertices as f64;
        ring.push([center[0] + dlon * theta.cos(), center[1] + dlat * theta.sin()]);
    }
    ring.push(ring[0]);
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_of_square_with_interior_point() {
        let points = vec![
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 2.0],
            [0.0, 2.0],
            [1.0, 1.0], // interior
        ];
        let ring = convex_hull_ring(&points).unwrap();

        // Closed ring over the 4 corners
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert!(!ring[..4].iter().any(|v| *v == [1.0, 1.0]));
    }

    #[test]
    fn test_hull_ring_is_closed() {
        let points = vec![[34.8, 32.0], [34.95, 32.1], [35.0, 31.9], [34.7, 31.95]];
        let ring = convex_hull_ring(&points).unwrap();
        assert_eq!(ring.first(), ring.last());
        assert!(ring.len() >= 4);
    }

    #[test]
    fn test_hull_rejects_collinear_points() {
        let points = vec![[34.0, 32.0], [34.1, 32.0], [34.2, 32.0], [34.3, 32.0]];
        assert!(convex_hull_ring(&points).is_none());
    }

    #[test]
    fn test_hull_rejects_duplicates() {
        let points = vec![[34.0, 32.0], [34.0, 32.0], [34.1, 32.1]];
        assert!(convex_hull_ring(&points).is_none());
    }

    #[test]
    fn test_hull_collinear_edge_keeps_wrapping() {
        // Three points on the bottom edge are collinear; the wrap must skip
        // the midpoint and still close the triangle.
        let points = vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [1.0, 1.5]];
        let ring = convex_hull_ring(&points).unwrap();
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), 4);
        assert!(!ring[..3].iter().any(|v| *v == [1.0, 0.0]));
    }

    #[test]
    fn test_circle_ring_shape() {
        let ring = circle_ring([34.9, 32.0], 8.0, 16);
        assert_eq!(ring.len(), 17);
        assert_eq!(ring.first(), ring.last());

        // Every vertex sits within the lat/lon radius box
        let dlat = nm_to_lat_degrees(8.0);
        let dlon = nm_to_lon_degrees(8.0, 32.0);
        for v in &ring {
            assert!((v[0] - 34.9).abs() <= dlon + 1e-9);
            assert!((v[1] - 32.0).abs() <= dlat + 1e-9);
        }
    }
}
