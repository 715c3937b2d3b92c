use carbonviz_charts::records::PER_CAPITA_FIELD;
use carbonviz_charts::{
    bind, choropleth_layout, project, ChartConfig, ChoroplethChart, ChoroplethSpec, Dataset, FeatureCollection,
    Mark, Projection, MAP_VIEWPORT,
};
use carbonviz_engine::color::to_css_hex;
use carbonviz_engine::{ChartId, Timing};

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn countries() -> FeatureCollection {
    let json = carbonviz_test_fixtures::geometry::json("countries").expect("load countries fixture");
    FeatureCollection::from_json(&json).expect("parse countries")
}

fn per_capita() -> Dataset {
    let json = carbonviz_test_fixtures::records::json("per-capita").expect("load per-capita fixture");
    Dataset::from_json(&json, &[PER_CAPITA_FIELD]).expect("parse rows").0
}

fn map_spec(multiplier: f64) -> ChoroplethSpec<'static> {
    ChoroplethSpec {
        field: PER_CAPITA_FIELD,
        year: Some(2019),
        value_multiplier: multiplier,
        projection: Projection::natural_earth(MAP_VIEWPORT.width as f64, MAP_VIEWPORT.height as f64),
    }
}

/// it should bind matched features to their record value and misses to zero
#[test]
fn qatar_binds_atlantis_misses() {
    let fc = countries();
    let ds = per_capita();
    let outcome = bind(&fc.features, ds.for_year(2019), PER_CAPITA_FIELD, 1.0);

    let by_name = |name: &str| {
        outcome
            .features
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.bound_value)
            .expect("feature present")
    };
    assert_eq!(by_name("Qatar"), 35.6);
    assert_eq!(by_name("Atlantis"), 0.0);
    assert_eq!(outcome.report.join_misses().collect::<Vec<_>>(), vec!["Atlantis"]);
}

/// it should match names exactly and case-sensitively
#[test]
fn join_is_case_sensitive() {
    let fc = FeatureCollection::from_json(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"qatar"},"geometry":null}
        ]}"#,
    )
    .expect("parse");
    let ds = per_capita();
    let outcome = bind(&fc.features, ds.for_year(2019), PER_CAPITA_FIELD, 1.0);
    assert_eq!(outcome.features[0].bound_value, 0.0);
    assert_eq!(outcome.report.join_misses().count(), 1);
}

/// it should scale bound values and color the map from the bottom of the ramp
#[test]
fn choropleth_scales_and_colors() {
    let fc = countries();
    let ds = per_capita();
    let (layout, report) = choropleth_layout(&fc.features, &ds, &map_spec(100.0)).expect("layout");
    assert_eq!(layout.len(), fc.features.len());
    assert_eq!(report.join_misses().collect::<Vec<_>>(), vec!["Atlantis"]);

    let (qatar_attrs, qatar) = layout.get("Qatar").expect("Qatar");
    approx(qatar.value, 3560.0, 1e-6);
    // Qatar holds the maximum, so it takes the top of the ramp.
    assert_eq!(to_css_hex(qatar_attrs.color), "#800026");
    assert_eq!(qatar.tooltip.heading, "Qatar");

    let (atlantis_attrs, _) = layout.get("Atlantis").expect("Atlantis");
    assert_eq!(to_css_hex(atlantis_attrs.color), "#ffffcc");

    let Mark::Area(path) = &qatar.mark else {
        panic!("expected an area mark");
    };
    let expected = project(fc.features[0].geometry.as_ref().expect("geometry"), &map_spec(1.0).projection);
    assert_eq!(path, &expected);
    // East of the prime meridian and north of the equator.
    assert!(qatar_attrs.x > 430.0);
    assert!(qatar_attrs.y + qatar_attrs.height < 300.0);
}

/// it should default to the latest year with usable values
#[test]
fn latest_year_by_default() {
    let fc = countries();
    let ds = per_capita();
    let spec = ChoroplethSpec {
        year: None,
        ..map_spec(1.0)
    };
    let (layout, _) = choropleth_layout(&fc.features, &ds, &spec).expect("layout");
    let (_, qatar) = layout.get("Qatar").expect("Qatar");
    assert_eq!(qatar.value, 34.1);
}

/// it should fade regions in on first render and settle at full opacity
#[test]
fn choropleth_chart_fades_in() {
    let fc = countries();
    let ds = per_capita();
    let mut chart = ChoroplethChart::new(ChartId(9), Timing::new(200.0, 0.0));
    let (diff, _) = chart.render(&fc.features, &ds, &map_spec(1.0)).expect("render");
    assert_eq!(diff.entering.len(), 5);
    assert_eq!(chart.runtime().stage().get("France").expect("France").attrs.opacity, 0.0);
    chart.update(100.0);
    approx(chart.runtime().stage().get("France").expect("France").attrs.opacity as f64, 0.5, 1e-6);
    chart.update(100.0);
    assert_eq!(chart.runtime().stage().get("France").expect("France").attrs.opacity, 1.0);

    chart.unmount();
    assert!(chart.runtime().stage().is_empty());
}

/// it should take the map year and multiplier from chart configuration
#[test]
fn configured_multiplier_reaches_binding() {
    let fc = countries();
    let ds = per_capita();
    let projection = Projection::natural_earth(MAP_VIEWPORT.width as f64, MAP_VIEWPORT.height as f64);

    let plain = ChoroplethSpec::from_config(&ChartConfig::default(), PER_CAPITA_FIELD, projection);
    let (layout, _) = choropleth_layout(&fc.features, &ds, &plain).expect("layout");
    assert_eq!(layout.get("Qatar").expect("Qatar").1.value, 35.6);

    let cfg = ChartConfig::from_json(r#"{ "year": 2020, "valueMultiplier": 100 }"#).expect("config");
    let scaled = ChoroplethSpec::from_config(&cfg, PER_CAPITA_FIELD, projection);
    assert_eq!(scaled.year, Some(2020));
    let (layout, _) = choropleth_layout(&fc.features, &ds, &scaled).expect("layout");
    approx(layout.get("Qatar").expect("Qatar").1.value, 3410.0, 1e-6);
}
