#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Taxi zone geometry loading and congestion zone classification.
//!
//! Loads zone polygons from a `GeoJSON` `FeatureCollection`, reprojects
//! them to WGS84 lon/lat when the file declares a projected coordinate
//! reference, and derives the set of zone ids inside the priced area.

pub mod zones;

use thiserror::Error;

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Reading the zone file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Geometry cannot be brought into WGS84 lon/lat.
    #[error("Malformed geometry: {message}")]
    MalformedGeometry {
        /// Description of what went wrong.
        message: String,
    },
}
