//! Monthly surcharge and tip economics.
//!
//! Groups the audit-year stream by calendar month and reports surcharge
//! revenue alongside tipping behavior, plus the correlation between the
//! two monthly series that the report layer consumes.

use std::collections::BTreeMap;

use chrono::Datelike;
use congestion_audit_analytics_models::EconomicMonthSummary;
use congestion_audit_trip_models::TripRecord;

#[derive(Default)]
struct MonthAccum {
    trips: u64,
    fare_sum: f64,
    surcharge_sum: f64,
    surcharge_trips: u64,
    tip_ratio_sum: f64,
    tip_ratio_trips: u64,
}

/// Aggregates per (year, month): average surcharge, average fare, average
/// tip percentage, and total surcharge.
///
/// Absent surcharges and tips are excluded from their averages rather
/// than counted as zero. A trip where `total == tip` has an undefined tip
/// percentage and contributes nothing to that average.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn monthly_economics(trips: &[TripRecord]) -> Vec<EconomicMonthSummary> {
    let mut months: BTreeMap<(i32, u32), MonthAccum> = BTreeMap::new();

    for trip in trips {
        let key = (trip.pickup_datetime.year(), trip.pickup_datetime.month());
        let accum = months.entry(key).or_default();

        accum.trips += 1;
        accum.fare_sum += trip.fare_amount;

        if let Some(surcharge) = trip.congestion_surcharge {
            accum.surcharge_sum += surcharge;
            accum.surcharge_trips += 1;
        }

        if let Some(tip) = trip.tip_amount {
            let base = trip.total_amount - tip;
            if base != 0.0 {
                accum.tip_ratio_sum += tip / base;
                accum.tip_ratio_trips += 1;
            }
        }
    }

    months
        .into_iter()
        .map(|((year, month), accum)| EconomicMonthSummary {
            year,
            month,
            total_surcharge: accum.surcharge_sum,
            avg_surcharge: (accum.surcharge_trips > 0)
                .then(|| accum.surcharge_sum / accum.surcharge_trips as f64),
            avg_fare: accum.fare_sum / accum.trips as f64,
            avg_tip_pct: (accum.tip_ratio_trips > 0)
                .then(|| accum.tip_ratio_sum / accum.tip_ratio_trips as f64 * 100.0),
        })
        .collect()
}

/// Total surcharge revenue across all reported months.
#[must_use]
pub fn total_annual_surcharge(months: &[EconomicMonthSummary]) -> f64 {
    months.iter().map(|m| m.total_surcharge).sum()
}

/// Pearson correlation between the monthly average surcharge and average
/// tip percentage.
///
/// Months missing either series are skipped. Returns `None` with fewer
/// than two complete months or when either series has zero variance.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn surcharge_tip_correlation(months: &[EconomicMonthSummary]) -> Option<f64> {
    let points: Vec<(f64, f64)> = months
        .iter()
        .filter_map(|m| Some((m.avg_surcharge?, m.avg_tip_pct?)))
        .collect();

    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in &points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x == 0.0 || variance_y == 0.0 {
        return None;
    }

    Some(covariance / (variance_x.sqrt() * variance_y.sqrt()))
}
