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

//! Great-circle math on a spherical Earth.
//!
//! All distances are in nautical miles, all angles in degrees. These are
//! pure functions with no validation: NaN or out-of-range coordinates
//! propagate to the result, callers are responsible for well-formed input.

/// Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Nautical miles per degree of latitude.
pub const NM_PER_DEGREE_LAT: f64 = 60.0;

/// Calculate distance in nautical miles between two lat/lon points using
/// the Haversine formula.
#[must_use]
pub fn haversine_distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_NM * c
}

/// Initial bearing from the first point toward the second, normalized to
/// `[0, 360)` degrees (north = 0, east = 90).
#[must_use]
pub fn initial_bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let y = delta_lon.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Project a point along a bearing for a given distance on a spherical
/// Earth. Returns `(lat, lon)` with longitude normalized to `[-180, 180]`.
#[must_use]
pub fn destination_point(lat: f64, lon: f64, bearing_deg: f64, distance_nm: f64) -> (f64, f64) {
    let lat_rad = lat.to_radians();
    let lon_rad = lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular = distance_nm / EARTH_RADIUS_NM;

    let dest_lat = (lat_rad.sin() * angular.cos()
        + lat_rad.cos() * angular.sin() * bearing_rad.cos())
    .asin();
    let dest_lon = lon_rad
        + (bearing_rad.sin() * angular.sin() * lat_rad.cos())
            .atan2(angular.cos() - lat_rad.sin() * dest_lat.sin());

    let lon_deg = (dest_lon.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    (dest_lat.to_degrees(), lon_deg)
}

/// Convert a nautical-mile offset to degrees of latitude.
#[must_use]
pub fn nm_to_lat_degrees(distance_nm: f64) -> f64 {
    distance_nm / NM_PER_DEGREE_LAT
}

/// Convert a nautical-mile offset to degrees of longitude at the given
/// latitude. Meaningless at the poles where the cosine vanishes.
#[must_use]
pub fn nm_to_lon_degrees(distance_nm: f64, at_lat: f64) -> f64 {
    distance_nm / (NM_PER_DEGREE_LAT * at_lat.to_radians().cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // LAX to JFK is approximately 2,151 nautical miles
        let distance = haversine_distance_nm(33.9425, -118.4081, 40.6413, -73.7781);
        assert!((distance - 2151.0).abs() < 10.0);
    }

    #[test]
    fn test_haversine_symmetry() {
        let d1 = haversine_distance_nm(32.0114, 34.8867, 34.8751, 33.6249);
        let d2 = haversine_distance_nm(34.8751, 33.6249, 32.0114, 34.8867);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_zero_distance() {
        let d = haversine_distance_nm(32.0114, 34.8867, 32.0114, 34.8867);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // One degree of latitude on the sphere is just over 60 nm
        let d = haversine_distance_nm(0.0, 0.0, 1.0, 0.0);
        assert!((d - 60.04).abs() < 0.1);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let north = initial_bearing_deg(0.0, 0.0, 1.0, 0.0);
        let east = initial_bearing_deg(0.0, 0.0, 0.0, 1.0);
        let south = initial_bearing_deg(1.0, 0.0, 0.0, 0.0);
        let west = initial_bearing_deg(0.0, 1.0, 0.0, 0.0);

        assert!((north - 0.0).abs() < 1e-6);
        assert!((east - 90.0).abs() < 1e-6);
        assert!((south - 180.0).abs() < 1e-6);
        assert!((west - 270.0).abs() < 1e-6);
    }

    #[test]
    fn test_bearing_range() {
        let b = initial_bearing_deg(40.0, 20.0, 35.0, 10.0);
        assert!((0.0..360.0).contains(&b));
    }

    #[test]
    fn test_destination_point_round_trip() {
        let (lat, lon) = destination_point(32.0114, 34.8867, 45.0, 100.0);
        let back = haversine_distance_nm(32.0114, 34.8867, lat, lon);
        assert!((back - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_destination_point_due_north() {
        let (lat, lon) = destination_point(10.0, 20.0, 0.0, 120.0);
        assert!((lon - 20.0).abs() < 1e-6);
        assert!((lat - 12.0).abs() < 0.01);
    }

    #[test]
    fn test_lon_degrees_widen_with_latitude() {
        // The same offset spans more longitude degrees away from the equator
        let at_equator = nm_to_lon_degrees(60.0, 0.0);
        let at_60_north = nm_to_lon_degrees(60.0, 60.0);
        assert!((at_equator - 1.0).abs() < 1e-9);
        assert!((at_60_north - 2.0).abs() < 1e-6);
    }
}
