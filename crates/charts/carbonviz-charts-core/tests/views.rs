use carbonviz_charts::records::{FOSSIL_FIELD, LAND_USE_FIELD, PER_CAPITA_FIELD};
use carbonviz_charts::views::{
    country_series, heatmap_layout, line_timing, multi_line_layout, sankey_layout, top_n_bars, SankeyInput,
    SankeyOptions, BAR_VIEWPORT, HEATMAP_VIEWPORT, LINES_VIEWPORT, SERIES_VIEWPORT,
};
use carbonviz_charts::{
    choropleth_layout, ChartConfig, ChartRuntime, ChartView, ChoroplethSpec, Dataset, FeatureCollection,
    Projection, ViewStatus,
};
use carbonviz_engine::color::to_css_hex;
use carbonviz_engine::{ChartId, Collapse, Config, Presence};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn dataset(name: &str) -> Dataset {
    let json = carbonviz_test_fixtures::records::json(name).expect("load records fixture");
    let fields = carbonviz_test_fixtures::records::fields(name).expect("fixture fields");
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    Dataset::from_json(&json, &fields).expect("parse rows").0
}

/// it should lay out the top emitters by combined fossil and land-use emissions
#[test]
fn heatmap_from_fixture() {
    let ds = dataset("fossil-land-use");
    assert!(ds.records()[0].value(FOSSIL_FIELD).is_some());
    assert!(ds.records()[0].value(LAND_USE_FIELD).is_some());

    let layout = heatmap_layout(&ds, 2019, 10, &HEATMAP_VIEWPORT).expect("heatmap");
    // Chad has no land-use value and is left out.
    assert_eq!(layout.len(), 12);
    assert!(layout.keys().all(|k| !k.starts_with("Chad/")));
    assert_eq!(layout.keys().next(), Some("China/Fossil Fuel Emissions"));

    let (hottest, _) = layout.get("China/Fossil Fuel Emissions").expect("cell");
    assert_eq!(to_css_hex(hottest.color), "#7f0000");
    let (brazil_land, _) = layout.get("Brazil/Land-Use Change Emissions").expect("cell");
    let (brazil_fossil, _) = layout.get("Brazil/Fossil Fuel Emissions").expect("cell");
    approx(brazil_land.y, brazil_fossil.y, 1e-4);
    assert!(brazil_land.x > brazil_fossil.x);
}

/// it should lay out the shared four-stage flow fixture
#[test]
fn sankey_from_fixture() {
    let json = carbonviz_test_fixtures::flows::json("stages").expect("load flows fixture");
    let input = SankeyInput::from_json(&json).expect("parse flows");
    let out = sankey_layout(&input, &SankeyOptions::default()).expect("sankey");
    assert_eq!(out.nodes.len(), 4);
    assert_eq!(out.links.len(), 4);
    approx(out.nodes[3].x0, 580.0, 1e-4);
    for node in &out.nodes {
        assert!(node.y0 >= 0.0 && node.y1 <= 400.0 + 1e-3, "{node:?} outside extent");
    }
    // A node's outgoing links together span its height.
    let a = &out.nodes[0];
    let spanned: f32 = out.links.iter().filter(|l| l.source == 0).map(|l| l.width).sum();
    approx(spanned, a.y1 - a.y0, 1e-3);
}

/// it should draw one faded-in line per configured country with data
#[test]
fn european_lines() {
    let ds = dataset("per-capita");
    let cfg = ChartConfig::default();
    let layout = multi_line_layout(&ds, PER_CAPITA_FIELD, &cfg.entities, &LINES_VIEWPORT).expect("lines");
    assert_eq!(layout.keys().collect::<Vec<_>>(), vec!["Germany", "France", "Spain"]);

    let mut rt = ChartRuntime::new(ChartId(0), Presence::uniform(Collapse::Opacity), Config::default());
    let timing = line_timing(&layout);
    rt.render_with(layout, timing).expect("render");
    assert_eq!(rt.stage().get("France").expect("France").attrs.opacity, 0.0);
    rt.update(2000.0);
    for el in rt.stage().iter() {
        assert_eq!(el.attrs.opacity, 1.0, "{} not faded in", el.key);
    }
}

/// it should keep a failing chart to its own placeholder
#[test]
fn failures_stay_isolated() {
    let ds = dataset("per-capita");
    let bars = ChartView::from_result(
        "Top emitters",
        top_n_bars(&ds, PER_CAPITA_FIELD, &ChartConfig::default(), &BAR_VIEWPORT),
    );
    let series_cfg = ChartConfig {
        country: "Atlantis".into(),
        ..ChartConfig::default()
    };
    let series = ChartView::from_result(
        "Atlantis",
        country_series(&ds, PER_CAPITA_FIELD, &series_cfg, &SERIES_VIEWPORT),
    );
    let map = ChartView::from_result(
        "World",
        FeatureCollection::from_json("{ not geojson").and_then(|fc| {
            let spec = ChoroplethSpec {
                field: PER_CAPITA_FIELD,
                year: None,
                value_multiplier: 100.0,
                projection: Projection::natural_earth(960.0, 600.0),
            };
            choropleth_layout(&fc.features, &ds, &spec).map(|(layout, _)| layout)
        }),
    );

    assert!(bars.is_ready());
    assert_eq!(bars.layout.len(), 6);
    assert!(matches!(series.status, ViewStatus::Empty { .. }));
    assert!(series.layout.is_empty());
    assert!(matches!(&map.status, ViewStatus::Failed { category, .. } if category == "load"));
}

/// it should read partial camelCase configuration over the defaults
#[test]
fn config_from_json() {
    let cfg = ChartConfig::from_json(r#"{ "year": 2020, "topN": 3, "tooltip": { "fadeOutMs": 500 } }"#)
        .expect("config");
    assert_eq!(cfg.year, 2020);
    assert_eq!(cfg.top_n, 3);
    assert_eq!(cfg.tooltip.fade_out_ms, 500.0);
    assert_eq!(cfg.tooltip.fade_in_ms, 50.0);
    assert_eq!(cfg.year_range, [2012, 2022]);
}
