//! GeoProjector: geometry ingestion, projection to screen paths, and the name join that
//! binds record values to features.

use std::f64::consts::PI;
use std::fmt::Write as _;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, DataIssue, IngestReport};
use crate::records::Record;

/// `[longitude, latitude, ...]` in degrees; extra ordinates are ignored.
pub type Position = Vec<f64>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// Every ring of every polygon, outer rings first within each polygon.
    pub fn rings(&self) -> Vec<&[Position]> {
        match self {
            Self::Polygon(rings) => rings.iter().map(|r| r.as_slice()).collect(),
            Self::MultiPolygon(polys) => polys
                .iter()
                .flat_map(|rings| rings.iter().map(|r| r.as_slice()))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: FeatureProperties,
    pub geometry: Option<Geometry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn from_json(text: &str) -> Result<Self, ChartError> {
        serde_json::from_str(text).map_err(|e| ChartError::load("geometry", e.to_string()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionKind {
    NaturalEarth1,
    Equirectangular,
}

/// Fixed projection parameters. `center` (degrees) lands on `translate` (screen units).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub kind: ProjectionKind,
    pub scale: f64,
    pub translate: [f64; 2],
    pub center: [f64; 2],
}

impl Projection {
    /// Natural Earth framing for a `width` × `height` map.
    pub fn natural_earth(width: f64, height: f64) -> Self {
        Self {
            kind: ProjectionKind::NaturalEarth1,
            scale: 180.0,
            translate: [width / 2.0 - 50.0, height / 2.0],
            center: [0.0, 0.0],
        }
    }

    fn raw(&self, lambda: f64, phi: f64) -> [f64; 2] {
        match self.kind {
            ProjectionKind::Equirectangular => [lambda, phi],
            ProjectionKind::NaturalEarth1 => {
                let phi2 = phi * phi;
                let phi4 = phi2 * phi2;
                [
                    lambda
                        * (0.8707 - 0.131979 * phi2
                            + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))),
                    phi * (1.007226
                        + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4))),
                ]
            }
        }
    }

    /// Screen coordinates of `[longitude, latitude]`; y grows downward.
    pub fn project_point(&self, lon: f64, lat: f64) -> [f32; 2] {
        let rad = PI / 180.0;
        let [x, y] = self.raw(lon * rad, lat * rad);
        let [cx, cy] = self.raw(self.center[0] * rad, self.center[1] * rad);
        [
            (self.translate[0] + self.scale * (x - cx)) as f32,
            (self.translate[1] - self.scale * (y - cy)) as f32,
        ]
    }
}

/// Projected outline: closed rings in screen space.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPath {
    pub rings: Vec<Vec<[f32; 2]>>,
}

impl ScreenPath {
    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(|r| r.is_empty())
    }

    /// `[min_x, min_y, max_x, max_y]`, or None for an empty path.
    pub fn bounds(&self) -> Option<[f32; 4]> {
        self.rings.iter().flatten().fold(None, |acc, [x, y]| match acc {
            None => Some([*x, *y, *x, *y]),
            Some([x0, y0, x1, y1]) => Some([x0.min(*x), y0.min(*y), x1.max(*x), y1.max(*y)]),
        })
    }

    /// SVG path data, one closed subpath per ring.
    pub fn to_svg_d(&self) -> String {
        let mut d = String::new();
        for ring in self.rings.iter().filter(|r| !r.is_empty()) {
            for (i, [x, y]) in ring.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{cmd}{x},{y}");
            }
            d.push('Z');
        }
        d
    }
}

/// Project every ring of `geometry`. Positions with fewer than two ordinates are skipped.
pub fn project(geometry: &Geometry, projection: &Projection) -> ScreenPath {
    let rings = geometry
        .rings()
        .into_iter()
        .map(|ring| {
            ring.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| projection.project_point(p[0], p[1]))
                .collect()
        })
        .collect();
    ScreenPath { rings }
}

/// A feature joined to its record value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoFeature {
    pub name: String,
    pub geometry: Option<Geometry>,
    /// Matched value × multiplier; 0 when unmatched or unusable.
    pub bound_value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BindOutcome {
    pub features: Vec<GeoFeature>,
    pub report: IngestReport,
}

impl BindOutcome {
    pub fn max_bound(&self) -> f64 {
        self.features.iter().map(|f| f.bound_value).fold(0.0, f64::max)
    }
}

/// Join features to records by exact, case-sensitive name = entity. The first record for an
/// entity wins. Misses and unusable values bind to 0 and are reported.
pub fn bind<'a, R>(features: &[Feature], records: R, field: &str, multiplier: f64) -> BindOutcome
where
    R: IntoIterator<Item = &'a Record>,
{
    let mut index: HashMap<&str, &Record> = HashMap::new();
    for record in records {
        index.entry(record.entity.as_str()).or_insert(record);
    }

    let mut report = IngestReport::default();
    let features = features
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            let name = &feature.properties.name;
            let bound_value = match index.get(name.as_str()) {
                Some(record) => match record.value(field) {
                    Some(v) => v * multiplier,
                    None => {
                        report.push(DataIssue::Unusable {
                            row: i,
                            entity: Some(name.clone()),
                            field: field.to_string(),
                            raw: None,
                        });
                        0.0
                    }
                },
                None => {
                    report.push(DataIssue::JoinMiss {
                        feature: name.clone(),
                    });
                    0.0
                }
            };
            GeoFeature {
                name: name.clone(),
                geometry: feature.geometry.clone(),
                bound_value,
            }
        })
        .collect();
    report.rows_read = index.len();

    BindOutcome { features, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn origin_lands_on_translate() {
        let p = Projection::natural_earth(960.0, 600.0);
        let [x, y] = p.project_point(0.0, 0.0);
        approx(x, 430.0, 1e-4);
        approx(y, 300.0, 1e-4);
    }

    #[test]
    fn natural_earth_orientation() {
        let p = Projection::natural_earth(960.0, 600.0);
        let east = p.project_point(90.0, 0.0);
        let north = p.project_point(0.0, 45.0);
        assert!(east[0] > 430.0);
        assert!(north[1] < 300.0);
        // λ = π/2 at the equator scales by 0.8707.
        approx(east[0], 430.0 + (180.0 * 0.8707 * PI / 2.0) as f32, 1e-3);
    }

    #[test]
    fn parses_polygons_and_multipolygons() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Square"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
            {"type":"Feature","properties":{"name":"Pair"},
             "geometry":{"type":"MultiPolygon","coordinates":[[[[0,0,5],[1,0],[1,1]]],[[[2,2],[3,2],[3,3]]]]}}
        ]}"#;
        let fc = FeatureCollection::from_json(text).unwrap();
        assert_eq!(fc.features.len(), 2);
        let geom = fc.features[1].geometry.as_ref().unwrap();
        assert_eq!(geom.rings().len(), 2);

        let proj = Projection {
            kind: ProjectionKind::Equirectangular,
            scale: 1.0,
            translate: [0.0, 0.0],
            center: [0.0, 0.0],
        };
        let path = project(fc.features[0].geometry.as_ref().unwrap(), &proj);
        let [x0, y0, x1, y1] = path.bounds().unwrap();
        approx(x0, 0.0, 1e-6);
        approx(x1, (10.0 * PI / 180.0) as f32, 1e-6);
        assert!(y0 < y1);
        assert!(path.to_svg_d().starts_with("M0,"));
        assert!(path.to_svg_d().ends_with('Z'));
    }
}
