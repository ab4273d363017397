#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Audit orchestration: builds the run context, sequences the analyses,
//! and writes the output artifacts.
//!
//! Zone classification must succeed before anything that depends on zone
//! membership; a missing baseline year only skips the comparative
//! analyses. Independent analyses never abort one another, and every
//! artifact is written wholesale — re-running against an unchanged
//! snapshot produces byte-identical outputs.

pub mod artifacts;

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use congestion_audit_analytics::{anomaly, comparative, economics, leakage};
use congestion_audit_geography::zones;
use congestion_audit_geography_models::CongestionZoneSet;
use congestion_audit_trip_models::TripRecord;
use congestion_audit_trips::TripError;
use thiserror::Error;

/// Errors that can abort an audit run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Zone geometry could not be loaded or classified.
    #[error("Geography error: {0}")]
    Geo(#[from] congestion_audit_geography::GeoError),

    /// Trip data could not be unified.
    #[error("Trip data error: {0}")]
    Trips(#[from] TripError),

    /// An artifact could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for one audit run.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Directory holding the raw monthly parquet drops.
    pub raw_dir: PathBuf,
    /// Path to the taxi zone `GeoJSON` file.
    pub zones_path: PathBuf,
    /// Directory the artifacts are written into.
    pub output_dir: PathBuf,
    /// Year of the pre-policy comparison window.
    pub baseline_year: i32,
    /// Year under audit.
    pub audit_year: i32,
    /// Moment the road-pricing policy took effect.
    pub policy_start: NaiveDateTime,
}

impl AuditConfig {
    /// The morning the congestion pricing program went live.
    #[must_use]
    pub fn default_policy_start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap_or_default()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
    }
}

/// The immutable inputs every analysis reads: the canonical record
/// snapshots and the static congestion zone set. Analyses share this
/// context but never mutate it or each other's state.
pub struct AuditContext {
    /// Canonical records for the year under audit.
    pub audit_trips: Vec<TripRecord>,
    /// Canonical records for the baseline year; `None` when its raw data
    /// is unavailable.
    pub baseline_trips: Option<Vec<TripRecord>>,
    /// Zone ids inside the priced area.
    pub zone_set: CongestionZoneSet,
}

/// Loads zones and trip data into an [`AuditContext`].
///
/// Zone classification and the audit-year load are required; a missing
/// baseline year is downgraded to a warning so the remaining analyses
/// can still run.
///
/// # Errors
///
/// Returns [`PipelineError`] if zone geometry is malformed, the audit
/// year has no data, or a scan fails.
pub fn build_context(config: &AuditConfig) -> Result<AuditContext, PipelineError> {
    let zone_list = zones::load_zones(&config.zones_path)?;
    let zone_set = zones::congestion_zone_set(&zone_list);

    let conn = congestion_audit_trips::open_connection()?;
    let audit_trips =
        congestion_audit_trips::load_year(&conn, &config.raw_dir, config.audit_year)?;

    let baseline_trips =
        match congestion_audit_trips::load_year(&conn, &config.raw_dir, config.baseline_year) {
            Ok(trips) => Some(trips),
            Err(TripError::DataUnavailable { message }) => {
                log::warn!("Baseline data unavailable ({message}); comparative analyses will be skipped");
                None
            }
            Err(e) => return Err(e.into()),
        };

    Ok(AuditContext {
        audit_trips,
        baseline_trips,
        zone_set,
    })
}

/// Runs the full audit and writes all artifacts under
/// `config.output_dir`.
///
/// # Errors
///
/// Returns [`PipelineError`] if the context cannot be built or an
/// artifact cannot be written. Analyses degraded by missing optional
/// inputs (baseline year, empty zone set) are skipped with a warning
/// instead of failing the run.
pub fn run(config: &AuditConfig) -> Result<(), PipelineError> {
    std::fs::create_dir_all(&config.output_dir)?;
    let ctx = build_context(config)?;
    let out = &config.output_dir;

    log::info!("Running ghost trip audit...");
    let ghost_report = anomaly::ghost_trip_report(&ctx.audit_trips);
    artifacts::write_csv(&out.join("audit_ghost_trips.csv"), &ghost_report)?;
    artifacts::write_csv(
        &out.join("suspicious_vendors.csv"),
        &anomaly::suspicious_vendors(&ghost_report),
    )?;

    if ctx.zone_set.is_empty() {
        log::warn!("No congestion zones found; skipping leakage audit");
    } else {
        log::info!("Running leakage audit...");
        let finding =
            leakage::leakage_finding(&ctx.audit_trips, &ctx.zone_set, config.policy_start);
        artifacts::write_csv(&out.join("leakage_top_locations.csv"), &finding.top_locations)?;

        let stats = leakage::compliance_stats(&ctx.audit_trips, &ctx.zone_set, config.policy_start);
        artifacts::write_csv(&out.join("compliance_stats.csv"), std::slice::from_ref(&stats))?;
    }

    if let Some(baseline) = &ctx.baseline_trips {
        log::info!("Running comparative analyses...");
        artifacts::write_csv(
            &out.join("volume_comparison.csv"),
            &comparative::volume_comparison(
                baseline,
                &ctx.audit_trips,
                config.baseline_year,
                config.audit_year,
                &ctx.zone_set,
            ),
        )?;
        artifacts::write_csv(
            &out.join("velocity_metrics.csv"),
            &comparative::velocity_metrics(
                baseline,
                &ctx.audit_trips,
                config.baseline_year,
                config.audit_year,
                &ctx.zone_set,
            ),
        )?;
        artifacts::write_csv(
            &out.join("border_analysis.csv"),
            &comparative::border_analysis(
                baseline,
                &ctx.audit_trips,
                config.baseline_year,
                config.audit_year,
            ),
        )?;
    }

    log::info!("Running economics metrics...");
    let months = economics::monthly_economics(&ctx.audit_trips);
    artifacts::write_csv(&out.join("economics_metrics.csv"), &months)?;

    if let Some(r) = economics::surcharge_tip_correlation(&months) {
        log::info!("Monthly surcharge/tip correlation: {r:.3}");
    }

    let total_revenue = economics::total_annual_surcharge(&months);
    artifacts::write_scalar(&out.join("total_revenue.txt"), total_revenue)?;
    log::info!("Total annual surcharge revenue: {total_revenue:.2}");

    Ok(())
}
