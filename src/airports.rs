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

//! Reference airport data and nearest-airport lookup.
//!
//! Destination resolution and landing detection work against a small table
//! of reference airports. The table is an explicit value passed into the
//! components that need it, never a hidden module-level default. A built-in
//! regional table is provided for convenience, and larger tables can be
//! loaded from OurAirports-format CSV files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::haversine_distance_nm;

/// Errors that can occur while loading reference data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read reference data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse reference data: {0}")]
    Csv(#[from] csv::Error),
}

/// A reference airport used for destination resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airport {
    /// ICAO identifier (e.g. "LLBG").
    #[serde(rename = "ident")]
    pub ident: String,

    /// Airport name.
    #[serde(rename = "name")]
    pub name: String,

    /// Latitude in degrees.
    #[serde(rename = "latitude_deg")]
    pub latitude: f64,

    /// Longitude in degrees.
    #[serde(rename = "longitude_deg")]
    pub longitude: f64,

    /// Field elevation in feet.
    #[serde(rename = "elevation_ft")]
    pub elevation_ft: Option<i32>,
}

/// An injectable table of reference airports.
///
/// Lookup is a linear scan, which is fine for the intended table size of a
/// few dozen entries.
#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    airports: Vec<Airport>,
}

impl AirportDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory from an existing list of airports.
    #[must_use]
    pub fn from_airports(airports: Vec<Airport>) -> Self {
        Self { airports }
    }

    /// Built-in eastern-Mediterranean reference table.
    #[must_use]
    pub fn builtin() -> Self {
        let airports = [
            ("LLBG", "Ben Gurion International Airport", 32.0114, 34.8867, 135),
            ("LLHA", "Haifa Airport", 32.8094, 35.0431, 28),
            ("LLER", "Ramon International Airport", 29.7272, 35.0137, 288),
            ("LLIB", "Rosh Pina Airport", 32.9810, 35.5719, 922),
            ("LCLK", "Larnaca International Airport", 34.8751, 33.6249, 8),
            ("LCPH", "Paphos International Airport", 34.7180, 32.4857, 41),
            ("LCEN", "Ercan International Airport", 35.1547, 33.4961, 404),
            ("OLBA", "Beirut Rafic Hariri International Airport", 33.8209, 35.4884, 87),
            ("OSDI", "Damascus International Airport", 33.4115, 36.5156, 2020),
            ("OJAI", "Queen Alia International Airport", 31.7226, 35.9932, 2395),
            ("OJAM", "Amman Civil Airport", 31.9727, 35.9916, 2555),
            ("HECA", "Cairo International Airport", 30.1219, 31.4056, 382),
            ("HEAX", "Borg El Arab International Airport", 30.9177, 29.6964, 177),
            ("HESH", "Sharm El Sheikh International Airport", 27.9773, 34.3950, 143),
            ("HEGN", "Hurghada International Airport", 27.1783, 33.7994, 52),
            ("LTFM", "Istanbul Airport", 41.2753, 28.7519, 325),
            ("LTAI", "Antalya International Airport", 36.8987, 30.8005, 177),
            ("LGAV", "Athens Eleftherios Venizelos Airport", 37.9364, 23.9445, 308),
            ("LGIR", "Heraklion International Airport", 35.3397, 25.1803, 115),
            ("LGRP", "Rhodes Diagoras Airport", 36.4054, 28.0862, 17),
        ];

        Self {
            airports: airports
                .into_iter()
                .map(|(ident, name, latitude, longitude, elevation)| Airport {
                    ident: ident.to_string(),
                    name: name.to_string(),
                    latitude,
                    longitude,
                    elevation_ft: Some(elevation),
                })
                .collect(),
        }
    }

    /// Load airports from an OurAirports-format CSV file.
    ///
    /// Columns beyond the ones mapped by [`Airport`] are ignored, so the
    /// unmodified upstream `airports.csv` can be used directly.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Load airports from any OurAirports-format CSV reader.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let mut airports = Vec::new();
        for result in csv_reader.deserialize() {
            let airport: Airport = result?;
            airports.push(airport);
        }

        info!("Loaded {} reference airports", airports.len());
        Ok(Self { airports })
    }

    /// Find the reference airport closest to a point, and the distance to it
    /// in nautical miles. Returns `None` for an empty directory.
    #[must_use]
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<(&Airport, f64)> {
        let mut best: Option<(&Airport, f64)> = None;
        for airport in &self.airports {
            let d = haversine_distance_nm(lat, lon, airport.latitude, airport.longitude);
            match best {
                Some((_, best_d)) if best_d <= d => {}
                _ => best = Some((airport, d)),
            }
        }
        best
    }

    /// Look up an airport by ICAO identifier.
    #[must_use]
    pub fn get(&self, ident: &str) -> Option<&Airport> {
        self.airports.iter().find(|a| a.ident == ident)
    }

    /// All airports in the directory.
    #[must_use]
    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    /// Number of airports in the directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    /// Check whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_from_tel_aviv() {
        let directory = AirportDirectory::builtin();
        // Just offshore of Tel Aviv
        let (airport, distance) = directory.nearest(32.08, 34.77).unwrap();
        assert_eq!(airport.ident, "LLBG");
        assert!(distance < 10.0);
    }

    #[test]
    fn test_nearest_empty_directory() {
        let directory = AirportDirectory::new();
        assert!(directory.nearest(32.0, 34.9).is_none());
    }

    #[test]
    fn test_get_by_ident() {
        let directory = AirportDirectory::builtin();
        let airport = directory.get("LCLK").unwrap();
        assert_eq!(airport.name, "Larnaca International Airport");
    }

    #[test]
    fn test_from_csv_reader() {
        let csv_data = "\
ident,type,name,latitude_deg,longitude_deg,elevation_ft,scheduled_service
LLBG,large_airport,Ben Gurion International Airport,32.0114,34.8867,135,yes
LCLK,large_airport,Larnaca International Airport,34.8751,33.6249,8,yes
";
        let directory = AirportDirectory::from_csv_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.get("LLBG").unwrap().elevation_ft, Some(135));
    }
}
