#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result row types for the audit analytics.
//!
//! One struct per artifact row. Each output is rebuilt wholesale on every
//! run, so these carry no identity beyond their natural keys. They stay
//! flat (no nesting) so the CSV writers can serialize them directly.

use chrono::NaiveDateTime;
use congestion_audit_trip_models::TaxiType;
use serde::{Deserialize, Serialize};

/// Ghost-trip classification, in strict priority order. A record matching
/// several rules is reported under the earliest one only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditStatus {
    /// Positive distance covered faster than 65 mph.
    #[serde(rename = "Impossible Speed")]
    ImpossibleSpeed,
    /// Under a minute on the meter but more than $20 charged.
    Teleporter,
    /// Zero distance with a positive fare.
    Stationary,
    /// None of the anomaly rules matched.
    #[default]
    Valid,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImpossibleSpeed => write!(f, "Impossible Speed"),
            Self::Teleporter => write!(f, "Teleporter"),
            Self::Stationary => write!(f, "Stationary"),
            Self::Valid => write!(f, "Valid"),
        }
    }
}

/// One row of the ghost-trip audit table: the original trip fields plus
/// the derived scalars and the classification.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostTrip {
    /// Meter vendor identifier.
    pub vendor_id: Option<i32>,
    /// Trip start time.
    pub pickup_datetime: NaiveDateTime,
    /// Trip end time.
    pub dropoff_datetime: NaiveDateTime,
    /// Metered distance in miles.
    pub trip_distance: f64,
    /// Base fare in dollars.
    pub fare_amount: f64,
    /// Total charged.
    pub total_amount: f64,
    /// Tip in dollars, when recorded.
    pub tip_amount: Option<f64>,
    /// Congestion surcharge, when recorded.
    pub congestion_surcharge: Option<f64>,
    /// Pickup taxi zone id.
    pub pickup_zone: Option<i32>,
    /// Dropoff taxi zone id.
    pub dropoff_zone: Option<i32>,
    /// Source schema variant.
    pub taxi_type: TaxiType,
    /// Derived trip duration in seconds.
    pub duration_seconds: i64,
    /// Derived average speed (0 when duration is not positive).
    pub speed_mph: f64,
    /// Which anomaly rule matched.
    pub audit_status: AuditStatus,
}

/// Ghost-trip count for one vendor.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorGhostCount {
    /// Meter vendor identifier.
    pub vendor_id: Option<i32>,
    /// Number of non-valid trips attributed to this vendor.
    pub ghost_trip_count: u64,
}

/// A pickup zone ranked by missing-surcharge trips.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakageLocation {
    /// Pickup taxi zone id.
    pub pickup_zone: i32,
    /// Eligible trips from this zone with no surcharge collected.
    pub missing_surcharge_trips: u64,
}

/// Aggregate surcharge-leakage finding over the audit period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakageFinding {
    /// Eligible trips with an absent or zero surcharge.
    pub leakage_count: u64,
    /// Leakage count as a percentage of all post-policy trips (not just
    /// eligible ones — preserved source behavior).
    pub leakage_pct: f64,
    /// Top pickup zones by leakage count.
    pub top_locations: Vec<LeakageLocation>,
}

/// Surcharge compliance over eligible trips.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceStats {
    /// Eligible trips with a positive surcharge.
    pub paid_trips: u64,
    /// All eligible trips in the period.
    pub total_eligible_trips: u64,
    /// Paid share in percent; `None` when no trip was eligible.
    pub compliance_rate: Option<f64>,
}

/// Trip volume into the priced area for one (period, taxi type) group.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRow {
    /// Period label, e.g. `"2024 Q1"`.
    pub period: String,
    /// Source schema variant.
    pub taxi_type: TaxiType,
    /// Trips whose dropoff zone is in the priced area.
    pub trip_count: u64,
}

/// Average in-zone speed for one (period, day-of-week, hour) group.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityRow {
    /// Period label, e.g. `"2025 Q1"`.
    pub period: String,
    /// Day of week, 0 = Sunday.
    pub day_of_week: u32,
    /// Hour of day, 0-23.
    pub hour_of_day: u32,
    /// Mean speed of plausible in-zone trips, mph.
    pub avg_speed_mph: f64,
}

/// Dropoff volume change for one zone between the two periods.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderRow {
    /// Dropoff taxi zone id.
    pub dropoff_zone: i32,
    /// Q1 dropoff count in the baseline year.
    pub baseline_count: u64,
    /// Q1 dropoff count in the audit year.
    pub audit_count: u64,
    /// Percent change; `0` by convention when the baseline count is zero.
    pub pct_change: f64,
}

/// Monthly surcharge/tip economics.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicMonthSummary {
    /// Calendar year of the pickups.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Sum of recorded surcharges.
    pub total_surcharge: f64,
    /// Mean surcharge over trips that recorded one; `None` when no trip
    /// in the month did.
    pub avg_surcharge: Option<f64>,
    /// Mean base fare.
    pub avg_fare: f64,
    /// Mean tip percentage over trips where it is defined; a trip with
    /// `total == tip` contributes nothing rather than dividing by zero.
    pub avg_tip_pct: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_status_display_matches_report_wording() {
        assert_eq!(AuditStatus::ImpossibleSpeed.to_string(), "Impossible Speed");
        assert_eq!(AuditStatus::Teleporter.to_string(), "Teleporter");
        assert_eq!(AuditStatus::Stationary.to_string(), "Stationary");
        assert_eq!(AuditStatus::Valid.to_string(), "Valid");
    }
}
