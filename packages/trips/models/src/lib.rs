#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical taxi trip record types.
//!
//! Raw trip data arrives in two schema variants that differ only in their
//! pickup/dropoff timestamp column names and a fixed tag value. The schema
//! unifier resolves the variant once at the ingestion boundary; everything
//! downstream consumes [`TripRecord`] and never branches on the source
//! variant again.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The two raw trip schema variants.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TaxiType {
    /// Yellow medallion cabs (`tpep_*` timestamp columns).
    #[default]
    Yellow,
    /// Green boro cabs (`lpep_*` timestamp columns).
    Green,
}

impl TaxiType {
    /// All known variants, in canonical order.
    pub const ALL: &[Self] = &[Self::Yellow, Self::Green];

    /// Raw column name holding the pickup timestamp for this variant.
    #[must_use]
    pub const fn pickup_column(self) -> &'static str {
        match self {
            Self::Yellow => "tpep_pickup_datetime",
            Self::Green => "lpep_pickup_datetime",
        }
    }

    /// Raw column name holding the dropoff timestamp for this variant.
    #[must_use]
    pub const fn dropoff_column(self) -> &'static str {
        match self {
            Self::Yellow => "tpep_dropoff_datetime",
            Self::Green => "lpep_dropoff_datetime",
        }
    }

    /// Filename prefix used by the raw monthly parquet drops.
    #[must_use]
    pub const fn file_prefix(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

impl std::fmt::Display for TaxiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yellow => write!(f, "Yellow"),
            Self::Green => write!(f, "Green"),
        }
    }
}

/// One completed trip in canonical form.
///
/// Immutable once constructed; lives for a single analytics run. Optional
/// economic fields stay `None` when the raw value is missing — absence is
/// distinct from an explicit zero, and the leakage analyzer tests both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    /// Meter vendor identifier (1 = Creative Mobile, 2 = Verifone).
    pub vendor_id: Option<i32>,
    /// Trip start time.
    pub pickup_datetime: NaiveDateTime,
    /// Trip end time.
    pub dropoff_datetime: NaiveDateTime,
    /// Metered distance in miles.
    pub trip_distance: f64,
    /// Base fare in dollars.
    pub fare_amount: f64,
    /// Total charged, including tip and surcharges.
    pub total_amount: f64,
    /// Tip in dollars, when recorded.
    pub tip_amount: Option<f64>,
    /// Congestion surcharge in dollars, when recorded.
    pub congestion_surcharge: Option<f64>,
    /// Pickup taxi zone id.
    pub pickup_zone: Option<i32>,
    /// Dropoff taxi zone id.
    pub dropoff_zone: Option<i32>,
    /// Which raw schema variant this record came from.
    pub taxi_type: TaxiType,
}

impl TripRecord {
    /// Trip duration in whole seconds. Negative when the dropoff precedes
    /// the pickup (raw data contains such rows).
    #[must_use]
    pub fn duration_seconds(&self) -> i64 {
        (self.dropoff_datetime - self.pickup_datetime).num_seconds()
    }

    /// Average speed in miles per hour, or `0` when the duration is not
    /// positive.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn speed_mph(&self) -> f64 {
        let secs = self.duration_seconds();
        if secs > 0 {
            self.trip_distance / (secs as f64 / 3600.0)
        } else {
            0.0
        }
    }
}
