use std::f64::consts::{FRAC_PI_4, PI};

use serde::Deserialize;

use crate::error::DataError;

/// Mercator blows up at the poles; clamp latitude to the usual web-map cutoff.
const MAX_LATITUDE_DEG: f64 = 85.0511;

/// A country boundary: one or more lon/lat rings (holes included), keyed by
/// the boundary file's country id when present.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub id: Option<String>,
    pub rings: Vec<Vec<[f64; 2]>>,
}

#[derive(Deserialize)]
struct RawCollection {
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Decode a GeoJSON feature collection of country polygons.
///
/// Features without polygon geometry are skipped. Numeric ids are normalized
/// to zero-padded 3-digit strings, matching the dataset's country codes.
pub fn parse_world(text: &str) -> Result<Vec<GeoFeature>, DataError> {
    let collection: RawCollection = serde_json::from_str(text)?;

    let mut features = Vec::with_capacity(collection.features.len());
    for raw in collection.features {
        let rings = match raw.geometry {
            Some(RawGeometry::Polygon { coordinates }) => coordinates,
            Some(RawGeometry::MultiPolygon { coordinates }) => {
                coordinates.into_iter().flatten().collect()
            }
            _ => continue,
        };
        if rings.iter().all(|ring| ring.len() < 3) {
            continue;
        }
        features.push(GeoFeature {
            id: raw.id.as_ref().and_then(normalize_id),
            rings,
        });
    }

    if features.is_empty() {
        return Err(DataError::EmptyWorld);
    }
    Ok(features)
}

fn normalize_id(id: &serde_json::Value) -> Option<String> {
    match id {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => n.as_i64().map(|v| format!("{v:03}")),
        _ => None,
    }
}

/// Spherical Mercator projection with a fixed reference scale, matching the
/// chart's framing: scale 110 at a 960px-wide canvas,
/// translated to (w/2, h/1.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    scale: f64,
    translate_x: f64,
    translate_y: f64,
}

impl Mercator {
    const REFERENCE_SCALE: f64 = 110.0;
    const REFERENCE_WIDTH: f64 = 960.0;

    pub fn fit(width: f64, height: f64) -> Self {
        Self {
            scale: Self::REFERENCE_SCALE * width / Self::REFERENCE_WIDTH,
            translate_x: width / 2.0,
            translate_y: height / 1.4,
        }
    }

    /// Project (lon, lat) degrees to canvas coordinates.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lambda = lon.to_radians();
        let phi = lat.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG).to_radians();
        let x = self.translate_x + self.scale * lambda;
        let y = self.translate_y - self.scale * (FRAC_PI_4 + phi / 2.0).tan().ln();
        (x, y)
    }

    /// Project every ring of a feature.
    pub fn project_rings(&self, feature: &GeoFeature) -> Vec<Vec<(f64, f64)>> {
        feature
            .rings
            .iter()
            .map(|ring| {
                ring.iter()
                    .map(|&[lon, lat]| self.project(lon, lat))
                    .collect()
            })
            .collect()
    }
}

/// Even-odd point-in-polygon test over a set of rings. A point inside a hole
/// ring toggles back to outside.
pub fn point_in_rings(x: f64, y: f64, rings: &[Vec<(f64, f64)>]) -> bool {
    let mut inside = false;
    for ring in rings {
        if point_in_ring(x, y, ring) {
            inside = !inside;
        }
    }
    inside
}

fn point_in_ring(x: f64, y: f64, ring: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": 4, "properties": {},
             "geometry": {"type": "Polygon",
                          "coordinates": [[[0.0,0.0],[10.0,0.0],[10.0,10.0],[0.0,10.0],[0.0,0.0]]]}},
            {"type": "Feature", "id": "250", "properties": {},
             "geometry": {"type": "MultiPolygon",
                          "coordinates": [[[[20.0,0.0],[30.0,0.0],[25.0,8.0],[20.0,0.0]]],
                                          [[[40.0,0.0],[50.0,0.0],[45.0,8.0],[40.0,0.0]]]]}},
            {"type": "Feature", "id": "900", "properties": {}, "geometry": null}
        ]
    }"#;

    #[test]
    fn parse_world_decodes_polygons_and_multipolygons() {
        let features = parse_world(WORLD).expect("world should decode");
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].rings.len(), 1);
        assert_eq!(features[1].rings.len(), 2);
    }

    #[test]
    fn numeric_ids_are_zero_padded_to_match_country_codes() {
        let features = parse_world(WORLD).expect("world should decode");
        assert_eq!(features[0].id.as_deref(), Some("004"));
        assert_eq!(features[1].id.as_deref(), Some("250"));
    }

    #[test]
    fn featureless_world_is_an_error() {
        let empty = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(matches!(parse_world(empty), Err(DataError::EmptyWorld)));
    }

    #[test]
    fn mercator_centers_the_origin() {
        let projection = Mercator::fit(960.0, 600.0);
        let (x, y) = projection.project(0.0, 0.0);
        assert!((x - 480.0).abs() < 1e-9);
        assert!((y - 600.0 / 1.4).abs() < 1e-9);
    }

    #[test]
    fn mercator_x_is_linear_in_longitude() {
        let projection = Mercator::fit(960.0, 600.0);
        let (x_west, _) = projection.project(-90.0, 0.0);
        let (x_mid, _) = projection.project(0.0, 0.0);
        let (x_east, _) = projection.project(90.0, 0.0);
        assert!((x_mid - x_west - (x_east - x_mid)).abs() < 1e-9);
        assert!(x_west < x_mid && x_mid < x_east);
    }

    #[test]
    fn mercator_clamps_polar_latitudes() {
        let projection = Mercator::fit(960.0, 600.0);
        let (_, y_pole) = projection.project(0.0, 90.0);
        assert!(y_pole.is_finite());
    }

    #[test]
    fn point_in_ring_detects_inside_and_outside() {
        let square = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(point_in_rings(5.0, 5.0, &[square.clone()]));
        assert!(!point_in_rings(15.0, 5.0, &[square]));
    }

    #[test]
    fn hole_rings_toggle_back_to_outside() {
        let outer = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let hole = vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)];
        let rings = [outer, hole];
        assert!(!point_in_rings(5.0, 5.0, &rings));
        assert!(point_in_rings(2.0, 2.0, &rings));
    }
}
