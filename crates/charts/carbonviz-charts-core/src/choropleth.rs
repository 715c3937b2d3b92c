//! Choropleth: features colored by their bound per-capita emissions.

use carbonviz_engine::{Attrs, ChartId, Collapse, Config, DiffResult, Presence, SequentialScale, SequentialScheme, Timing};

use crate::chart::{ChartRuntime, Datum, Layout, Mark, Viewport};
use crate::config::ChartConfig;
use crate::error::{ChartError, IngestReport};
use crate::geo::{bind, project, Feature, Projection};
use crate::records::Dataset;

pub const MAP_VIEWPORT: Viewport = Viewport::new(960.0, 600.0);

/// Selection and projection for one choropleth render.
#[derive(Clone, Debug, PartialEq)]
pub struct ChoroplethSpec<'a> {
    pub field: &'a str,
    /// Records year; defaults to the latest year with usable values.
    pub year: Option<i32>,
    pub value_multiplier: f64,
    pub projection: Projection,
}

impl<'a> ChoroplethSpec<'a> {
    /// Selection for the configured year and multiplier.
    pub fn from_config(cfg: &ChartConfig, field: &'a str, projection: Projection) -> Self {
        Self {
            field,
            year: Some(cfg.year),
            value_multiplier: cfg.value_multiplier,
            projection,
        }
    }
}

/// Build the map layout. Every feature renders, matched or not; unmatched ones take the
/// bottom of the color ramp.
pub fn choropleth_layout(
    features: &[Feature],
    dataset: &Dataset,
    spec: &ChoroplethSpec<'_>,
) -> Result<(Layout, IngestReport), ChartError> {
    if features.is_empty() {
        return Err(ChartError::empty("choropleth: no geometry features"));
    }
    let year = spec.year.or_else(|| dataset.latest_year(spec.field));
    let records: Vec<_> = match year {
        Some(y) => dataset.for_year(y).collect(),
        None => Vec::new(),
    };
    let outcome = bind(features, records, spec.field, spec.value_multiplier);
    let color = SequentialScale::from_domain([0.0, outcome.max_bound()], SequentialScheme::YlOrRd);

    let mut layout = Layout::default();
    for (i, feature) in outcome.features.iter().enumerate() {
        let path = feature
            .geometry
            .as_ref()
            .map(|g| project(g, &spec.projection))
            .unwrap_or_default();
        let [x0, y0, x1, y1] = path.bounds().unwrap_or([0.0; 4]);
        // Feature names are not guaranteed unique; later duplicates get an index suffix.
        let key = if layout.data.contains_key(&feature.name) {
            format!("{}#{i}", feature.name)
        } else {
            feature.name.clone()
        };
        let attrs = Attrs::rect(x0, y0, x1 - x0, y1 - y0).with_color(color.apply(feature.bound_value));
        let datum = Datum::rect(
            key,
            feature.bound_value,
            feature.name.clone(),
            format!("CO2 Emissions: {}", feature.bound_value),
        )
        .with_mark(Mark::Area(path));
        layout.insert(attrs, datum);
    }
    Ok((layout, outcome.report))
}

/// Mounted choropleth; fades regions in and out when the selection changes.
#[derive(Debug)]
pub struct ChoroplethChart {
    runtime: ChartRuntime,
    timing: Timing,
}

impl ChoroplethChart {
    pub fn new(id: ChartId, timing: Timing) -> Self {
        Self {
            runtime: ChartRuntime::new(id, Presence::uniform(Collapse::Opacity), Config::default()),
            timing,
        }
    }

    pub fn runtime(&self) -> &ChartRuntime {
        &self.runtime
    }

    pub fn render(
        &mut self,
        features: &[Feature],
        dataset: &Dataset,
        spec: &ChoroplethSpec<'_>,
    ) -> Result<(DiffResult, IngestReport), ChartError> {
        let (layout, report) = choropleth_layout(features, dataset, spec)?;
        let misses = report.join_misses().count();
        if misses > 0 {
            log::debug!("choropleth: {misses} features without a matching record");
        }
        let diff = self.runtime.render(layout, self.timing)?;
        Ok((diff, report))
    }

    pub fn update(&mut self, dt_ms: f64) {
        self.runtime.update(dt_ms);
    }

    pub fn unmount(&mut self) {
        self.runtime.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{FeatureProperties, Geometry};
    use crate::records::{Record, PER_CAPITA_FIELD};
    use carbonviz_engine::color::to_css_hex;

    fn square(name: &str, lon: f64) -> Feature {
        Feature {
            properties: FeatureProperties { name: name.into() },
            geometry: Some(Geometry::Polygon(vec![vec![
                vec![lon, 0.0],
                vec![lon + 5.0, 0.0],
                vec![lon + 5.0, 5.0],
                vec![lon, 5.0],
                vec![lon, 0.0],
            ]])),
        }
    }

    fn record(entity: &str, year: i32, v: f64) -> Record {
        Record {
            entity: entity.into(),
            year,
            values: [(PER_CAPITA_FIELD.to_string(), Some(v))].into_iter().collect(),
        }
    }

    #[test]
    fn unmatched_features_take_the_minimum_color() {
        let ds = Dataset::new(vec![
            record("Qatar", 2018, 30.0),
            record("Qatar", 2019, 35.6),
            record("Chad", 2019, 0.1),
        ]);
        let features = vec![square("Qatar", 50.0), square("Atlantis", -30.0)];
        let spec = ChoroplethSpec {
            field: PER_CAPITA_FIELD,
            year: None,
            value_multiplier: 1.0,
            projection: Projection::natural_earth(960.0, 600.0),
        };
        let (layout, report) = choropleth_layout(&features, &ds, &spec).unwrap();
        assert_eq!(layout.len(), 2);
        let (_, qatar) = layout.get("Qatar").unwrap();
        assert_eq!(qatar.value, 35.6);
        let (atlantis_attrs, atlantis) = layout.get("Atlantis").unwrap();
        assert_eq!(atlantis.value, 0.0);
        assert_eq!(to_css_hex(atlantis_attrs.color), "#ffffcc");
        assert_eq!(report.join_misses().collect::<Vec<_>>(), vec!["Atlantis"]);
    }

    #[test]
    fn no_features_is_empty() {
        let spec = ChoroplethSpec {
            field: PER_CAPITA_FIELD,
            year: Some(2019),
            value_multiplier: 100.0,
            projection: Projection::natural_earth(960.0, 600.0),
        };
        assert!(matches!(
            choropleth_layout(&[], &Dataset::default(), &spec),
            Err(ChartError::EmptyDataset { .. })
        ));
    }
}
