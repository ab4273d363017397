#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the congestion pricing trip audit.

use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use congestion_audit_geography::zones;
use congestion_audit_pipeline::AuditConfig;

#[derive(Parser)]
#[command(name = "congestion-audit", about = "Congestion pricing trip audit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full audit and write all artifacts
    Run {
        /// Directory holding the raw monthly trip parquet drops
        #[arg(long, default_value = "data/raw")]
        raw_dir: PathBuf,
        /// Taxi zone GeoJSON file
        #[arg(long, default_value = "data/taxi_zones.geojson")]
        zones: PathBuf,
        /// Directory the artifacts are written into
        #[arg(long, default_value = "data/outputs")]
        out_dir: PathBuf,
        /// Pre-policy comparison year
        #[arg(long, default_value = "2024")]
        baseline_year: i32,
        /// Year under audit
        #[arg(long, default_value = "2025")]
        audit_year: i32,
        /// Policy start date, YYYY-MM-DD (defaults to 2025-01-05)
        #[arg(long)]
        policy_start: Option<String>,
    },
    /// Print the congestion zone ids derived from the zone file
    Zones {
        /// Taxi zone GeoJSON file
        #[arg(long, default_value = "data/taxi_zones.geojson")]
        zones: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            raw_dir,
            zones,
            out_dir,
            baseline_year,
            audit_year,
            policy_start,
        } => {
            let policy_start = match policy_start {
                Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| format!("Invalid policy start date '{s}': {e}"))?
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or_default(),
                None => AuditConfig::default_policy_start(),
            };

            let config = AuditConfig {
                raw_dir,
                zones_path: zones,
                output_dir: out_dir,
                baseline_year,
                audit_year,
                policy_start,
            };

            let start = Instant::now();
            congestion_audit_pipeline::run(&config)?;
            log::info!("Audit complete in {:.1}s", start.elapsed().as_secs_f64());
            println!("Artifacts written to {}", config.output_dir.display());
        }
        Commands::Zones { zones } => {
            let zone_list = zones::load_zones(&zones)?;
            let set = zones::congestion_zone_set(&zone_list);
            println!("Congestion zone ids ({} zones):", set.len());
            for id in set.iter() {
                println!("{id}");
            }
        }
    }

    Ok(())
}
