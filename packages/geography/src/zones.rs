//! Zone geometry loading and the congestion-area predicate.
//!
//! The priced area is approximated as "Manhattan zones whose centroid lies
//! south of 60th St", using a fixed latitude cutoff rather than a true
//! polygon intersection against a boundary line. The cutoff is part of the
//! policy boundary definition and must not be "improved" independently.

use std::path::Path;

use congestion_audit_geography_models::CongestionZoneSet;
use geo::{Centroid, MapCoords, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use proj4rs::Proj;

use crate::GeoError;

/// Borough whose zones are candidates for the priced area.
pub const MANHATTAN_BOROUGH: &str = "Manhattan";

/// Approximate latitude of 60th St in Manhattan. Zones with a centroid
/// south of this line are inside the priced area.
pub const CONGESTION_LAT_THRESHOLD: f64 = 40.764;

/// PROJ definition for NAD83 / New York Long Island (ftUS), the CRS the
/// city publishes its taxi zone shapefile in.
const NY_LONG_ISLAND_FT: &str = "+proj=lcc +lat_1=41.03333333333333 \
     +lat_2=40.66666666666666 +lat_0=40.16666666666666 +lon_0=-74 \
     +x_0=300000.0000000001 +y_0=0 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 \
     +units=us-ft +no_defs";

/// PROJ definition for WGS84 geographic lon/lat.
const WGS84: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

/// A taxi zone with its polygon geometry in WGS84 lon/lat.
#[derive(Debug, Clone)]
pub struct Zone {
    /// Taxi zone id (`LocationID` in the source data).
    pub location_id: i32,
    /// Borough name.
    pub borough: String,
    /// Zone polygon(s), reprojected to lon/lat if needed.
    pub geometry: MultiPolygon<f64>,
}

/// Loads taxi zones from a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`GeoError`] if the file cannot be read or parsed, or if it
/// declares a coordinate reference that cannot be reprojected to lon/lat.
pub fn load_zones(path: &Path) -> Result<Vec<Zone>, GeoError> {
    let text = std::fs::read_to_string(path)?;
    parse_zones(&text)
}

/// Parses taxi zones from `GeoJSON` text.
///
/// The `FeatureCollection` may carry a legacy `crs` member; when it names
/// a projected reference, every geometry is reprojected to WGS84 lon/lat
/// before anything else happens. A missing `crs` member means lon/lat,
/// per the `GeoJSON` RFC. Features with unusable geometry or missing
/// properties are skipped with a warning.
///
/// # Errors
///
/// Returns [`GeoError::MalformedGeometry`] if the declared coordinate
/// reference is unknown or a geometry cannot be reprojected.
pub fn parse_zones(text: &str) -> Result<Vec<Zone>, GeoError> {
    let geojson: GeoJson = text.parse()?;
    let GeoJson::FeatureCollection(fc) = geojson else {
        return Err(GeoError::MalformedGeometry {
            message: "zone file is not a FeatureCollection".to_string(),
        });
    };

    let crs = declared_crs(&fc);
    let reprojection = build_reprojection(&crs)?;
    if reprojection.is_some() {
        log::info!("Reprojecting zone geometry from {crs} to WGS84");
    }

    let mut zones = Vec::new();

    for feature in fc.features {
        let location_id = feature
            .property("LocationID")
            .and_then(serde_json::Value::as_i64)
            .and_then(|v| i32::try_from(v).ok());
        let borough = feature
            .property("borough")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string);

        let (Some(location_id), Some(borough)) = (location_id, borough) else {
            log::warn!("Skipping zone feature with missing LocationID or borough");
            continue;
        };

        let Some(geometry) = feature.geometry else {
            log::warn!("Zone {location_id} has no geometry; skipping");
            continue;
        };

        let geo_geometry: geo::Geometry<f64> = match geometry.try_into() {
            Ok(g) => g,
            Err(e) => {
                log::warn!("Failed to parse geometry for zone {location_id}: {e}");
                continue;
            }
        };

        let multi_polygon = match geo_geometry {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
            _ => {
                log::warn!("Zone {location_id} has non-polygon geometry; skipping");
                continue;
            }
        };

        let multi_polygon = match &reprojection {
            Some((from, to)) => reproject(multi_polygon, from, to)?,
            None => multi_polygon,
        };

        zones.push(Zone {
            location_id,
            borough,
            geometry: multi_polygon,
        });
    }

    log::info!("Loaded {} taxi zones", zones.len());
    Ok(zones)
}

/// Derives the set of zone ids inside the priced area.
///
/// Membership: `borough == "Manhattan"` and centroid latitude below
/// [`CONGESTION_LAT_THRESHOLD`]. Deterministic for identical geometry.
#[must_use]
pub fn congestion_zone_set(zones: &[Zone]) -> CongestionZoneSet {
    let mut ids = Vec::new();

    for zone in zones {
        if zone.borough != MANHATTAN_BOROUGH {
            continue;
        }
        let Some(centroid) = zone.geometry.centroid() else {
            log::warn!(
                "Zone {} has no computable centroid; skipping",
                zone.location_id
            );
            continue;
        };
        if centroid.y() < CONGESTION_LAT_THRESHOLD {
            ids.push(zone.location_id);
        }
    }

    let set: CongestionZoneSet = ids.into_iter().collect();
    log::info!("Congestion zone set contains {} zones", set.len());
    set
}

/// Reads the legacy `crs` member of a `FeatureCollection`. Absent means
/// lon/lat per RFC 7946.
fn declared_crs(fc: &FeatureCollection) -> String {
    fc.foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| "EPSG:4326".to_string(), normalize_crs)
}

/// Normalizes CRS names like `urn:ogc:def:crs:EPSG::2263` or `CRS84` to
/// the `EPSG:<code>` form.
fn normalize_crs(name: &str) -> String {
    let name = name.trim();
    if name.eq_ignore_ascii_case("urn:ogc:def:crs:OGC:1.3:CRS84")
        || name.eq_ignore_ascii_case("CRS84")
    {
        return "EPSG:4326".to_string();
    }
    match name.rsplit(':').next() {
        Some(code) if code.chars().all(|c| c.is_ascii_digit()) && !code.is_empty() => {
            format!("EPSG:{code}")
        }
        _ => name.to_uppercase(),
    }
}

/// Builds the (source, target) projections for a declared CRS, or `None`
/// when the data is already geographic.
fn build_reprojection(crs: &str) -> Result<Option<(Proj, Proj)>, GeoError> {
    if crs == "EPSG:4326" {
        return Ok(None);
    }

    let Some(definition) = projected_crs_definition(crs) else {
        return Err(GeoError::MalformedGeometry {
            message: format!("unsupported coordinate reference {crs}"),
        });
    };

    let from = parse_proj(definition)?;
    let to = parse_proj(WGS84)?;
    Ok(Some((from, to)))
}

fn parse_proj(definition: &str) -> Result<Proj, GeoError> {
    Proj::from_proj_string(definition).map_err(|e| GeoError::MalformedGeometry {
        message: format!("invalid projection definition: {e}"),
    })
}

/// Known projected coordinate references this engine can bring back to
/// lon/lat. 2263 is what the city ships; 102718 is the same state plane
/// under its ESRI code.
fn projected_crs_definition(crs: &str) -> Option<&'static str> {
    match crs {
        "EPSG:2263" | "EPSG:102718" | "ESRI:102718" => Some(NY_LONG_ISLAND_FT),
        _ => None,
    }
}

fn reproject(
    mp: MultiPolygon<f64>,
    from: &Proj,
    to: &Proj,
) -> Result<MultiPolygon<f64>, GeoError> {
    mp.try_map_coords(|coord| {
        let mut point = (coord.x, coord.y, 0.0);
        proj4rs::transform::transform(from, to, &mut point).map_err(|e| {
            GeoError::MalformedGeometry {
                message: format!("reprojection failed at ({}, {}): {e}", coord.x, coord.y),
            }
        })?;
        // longlat output is in radians
        Ok(geo::Coord {
            x: point.0.to_degrees(),
            y: point.1.to_degrees(),
        })
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn square(lon: f64, lat: f64) -> String {
        let (w, s, e, n) = (lon - 0.01, lat - 0.01, lon + 0.01, lat + 0.01);
        format!(
            r#"{{"type":"Polygon","coordinates":[[[{w},{s}],[{e},{s}],[{e},{n}],[{w},{n}],[{w},{s}]]]}}"#
        )
    }

    fn feature(id: i32, borough: &str, geometry: &str) -> String {
        format!(
            r#"{{"type":"Feature","properties":{{"LocationID":{id},"borough":"{borough}"}},"geometry":{geometry}}}"#
        )
    }

    fn collection(features: &[String]) -> String {
        format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        )
    }

    #[test]
    fn classifies_manhattan_zones_below_the_cutoff() {
        let text = collection(&[
            feature(4, "Manhattan", &square(-73.98, 40.75)),
            feature(42, "Manhattan", &square(-73.95, 40.80)),
            feature(7, "Brooklyn", &square(-73.95, 40.68)),
        ]);
        let zones = parse_zones(&text).unwrap();
        let set = congestion_zone_set(&zones);

        assert!(set.contains(4));
        assert!(!set.contains(42), "north of the cutoff");
        assert!(!set.contains(7), "wrong borough");
    }

    #[test]
    fn classification_is_deterministic() {
        let text = collection(&[
            feature(4, "Manhattan", &square(-73.98, 40.75)),
            feature(13, "Manhattan", &square(-74.01, 40.70)),
        ]);
        let zones = parse_zones(&text).unwrap();
        let first = congestion_zone_set(&zones);
        let second = congestion_zone_set(&parse_zones(&text).unwrap());
        assert_eq!(first, second);
        assert_eq!(first.iter().collect::<Vec<_>>(), vec![4, 13]);
    }

    #[test]
    fn skips_features_missing_properties() {
        let text = format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature","properties":{{}},"geometry":{}}},
                {}
            ]}}"#,
            square(-73.98, 40.75),
            feature(4, "Manhattan", &square(-73.98, 40.75)),
        );
        let zones = parse_zones(&text).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].location_id, 4);
    }

    #[test]
    fn unknown_crs_is_malformed_geometry() {
        let text = format!(
            r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"EPSG:999999"}}}},"features":[{}]}}"#,
            feature(4, "Manhattan", &square(-73.98, 40.75)),
        );
        let err = parse_zones(&text).unwrap_err();
        assert!(matches!(err, GeoError::MalformedGeometry { .. }));
    }

    #[test]
    fn crs84_passes_through_without_reprojection() {
        let text = format!(
            r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:OGC:1.3:CRS84"}}}},"features":[{}]}}"#,
            feature(4, "Manhattan", &square(-73.98, 40.75)),
        );
        let zones = parse_zones(&text).unwrap();
        let centroid = zones[0].geometry.centroid().unwrap();
        assert!((centroid.x() - -73.98).abs() < 1e-9);
        assert!((centroid.y() - 40.75).abs() < 1e-9);
    }

    #[test]
    fn state_plane_feet_reproject_into_nyc_lon_lat() {
        // Roughly midtown Manhattan in EPSG:2263 feet.
        let geometry = r#"{"type":"Polygon","coordinates":[[[986000,214000],[988000,214000],[988000,216000],[986000,216000],[986000,214000]]]}"#;
        let text = format!(
            r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::2263"}}}},"features":[{}]}}"#,
            feature(100, "Manhattan", geometry),
        );
        let zones = parse_zones(&text).unwrap();
        let centroid = zones[0].geometry.centroid().unwrap();
        assert!(
            (-74.5..-73.5).contains(&centroid.x()),
            "longitude out of range: {}",
            centroid.x()
        );
        assert!(
            (40.4..41.1).contains(&centroid.y()),
            "latitude out of range: {}",
            centroid.y()
        );
    }

    #[test]
    fn loads_zones_from_a_file() {
        let text = collection(&[feature(4, "Manhattan", &square(-73.98, 40.75))]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let zones = load_zones(file.path()).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].borough, "Manhattan");
    }
}
