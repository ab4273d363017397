//! Ghost-trip detection.
//!
//! Classifies each trip against physically-implausible patterns and
//! ranks vendors by how many of their trips were flagged.

use std::collections::HashMap;

use congestion_audit_analytics_models::{AuditStatus, GhostTrip, VendorGhostCount};
use congestion_audit_trip_models::TripRecord;

/// Fastest believable average speed for a street trip, mph.
pub const MAX_PLAUSIBLE_SPEED_MPH: f64 = 65.0;

/// A trip shorter than this many seconds with a fare above
/// [`TELEPORTER_MIN_FARE`] cannot have happened on the meter.
pub const TELEPORTER_MAX_SECONDS: i64 = 60;

/// Fare threshold for the teleporter rule, dollars.
pub const TELEPORTER_MIN_FARE: f64 = 20.0;

/// Vendors reported in the suspicious-vendor ranking.
pub const TOP_VENDOR_COUNT: usize = 5;

/// Classifies one trip. Rules are checked in strict priority order and
/// the first match wins, so a record satisfying several rules is always
/// reported under the earliest one.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn classify(trip: &TripRecord) -> AuditStatus {
    if trip.trip_distance > 0.0 && trip.speed_mph() > MAX_PLAUSIBLE_SPEED_MPH {
        AuditStatus::ImpossibleSpeed
    } else if trip.duration_seconds() < TELEPORTER_MAX_SECONDS
        && trip.fare_amount > TELEPORTER_MIN_FARE
    {
        AuditStatus::Teleporter
    } else if trip.trip_distance == 0.0 && trip.fare_amount > 0.0 {
        AuditStatus::Stationary
    } else {
        AuditStatus::Valid
    }
}

/// Builds the ghost-trip audit table: only non-valid records, each
/// carrying its original fields plus the derived scalars.
#[must_use]
pub fn ghost_trip_report(trips: &[TripRecord]) -> Vec<GhostTrip> {
    let report: Vec<GhostTrip> = trips
        .iter()
        .filter_map(|trip| {
            let status = classify(trip);
            (status != AuditStatus::Valid).then(|| GhostTrip {
                vendor_id: trip.vendor_id,
                pickup_datetime: trip.pickup_datetime,
                dropoff_datetime: trip.dropoff_datetime,
                trip_distance: trip.trip_distance,
                fare_amount: trip.fare_amount,
                total_amount: trip.total_amount,
                tip_amount: trip.tip_amount,
                congestion_surcharge: trip.congestion_surcharge,
                pickup_zone: trip.pickup_zone,
                dropoff_zone: trip.dropoff_zone,
                taxi_type: trip.taxi_type,
                duration_seconds: trip.duration_seconds(),
                speed_mph: trip.speed_mph(),
                audit_status: status,
            })
        })
        .collect();

    log::info!(
        "Ghost trip audit flagged {} of {} trips",
        report.len(),
        trips.len()
    );
    report
}

/// Ranks vendors by ghost-trip count, descending, top
/// [`TOP_VENDOR_COUNT`]. Ties break by ascending vendor id, with an
/// absent vendor id ordered before any present one.
#[must_use]
pub fn suspicious_vendors(report: &[GhostTrip]) -> Vec<VendorGhostCount> {
    let mut counts: HashMap<Option<i32>, u64> = HashMap::new();
    for row in report {
        *counts.entry(row.vendor_id).or_default() += 1;
    }

    let mut ranked: Vec<VendorGhostCount> = counts
        .into_iter()
        .map(|(vendor_id, ghost_trip_count)| VendorGhostCount {
            vendor_id,
            ghost_trip_count,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.ghost_trip_count
            .cmp(&a.ghost_trip_count)
            .then(a.vendor_id.cmp(&b.vendor_id))
    });
    ranked.truncate(TOP_VENDOR_COUNT);
    ranked
}
