use carbonviz_engine::color::from_hex;
use carbonviz_engine::{Attrs, ScaleFactory};

use crate::chart::{Datum, Layout, Viewport};
use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::records::Dataset;

pub const SERIES_VIEWPORT: Viewport = Viewport::new(890.0, 460.0).with_margin(20.0, 30.0, 40.0, 60.0);

const SERIES_BLUE: u32 = 0x4285f4;

/// One bar per year of `cfg.country` within `cfg.year_range`, oldest first.
pub fn country_series(
    dataset: &Dataset,
    field: &str,
    cfg: &ChartConfig,
    viewport: &Viewport,
) -> Result<Layout, ChartError> {
    let [from, to] = cfg.year_range;
    let mut points: Vec<(i32, f64)> = dataset
        .for_entity(&cfg.country)
        .filter(|r| (from..=to).contains(&r.year))
        .filter_map(|r| Some((r.year, r.value(field)?)))
        .collect();
    points.sort_by_key(|(year, _)| *year);
    points.dedup_by_key(|(year, _)| *year);
    if points.is_empty() {
        return Err(ChartError::empty(format!("{} {from}-{to}", cfg.country)));
    }

    let factory = ScaleFactory::new();
    let x = factory.band(points.iter().map(|(y, _)| y.to_string()), viewport.x_range(), cfg.bar_padding)?;
    let [top, bottom] = viewport.y_range();
    let max = points.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let y = factory.linear([0.0, max], [bottom, top], false);

    let mut layout = Layout::default();
    for (year, value) in points {
        let key = year.to_string();
        let left = x.apply(&key).unwrap_or(viewport.margin.left);
        let y_top = y.apply(value);
        let attrs = Attrs::rect(left, y_top, x.bandwidth(), bottom - y_top).with_color(from_hex(SERIES_BLUE));
        let detail = format!("{} {year}", cfg.country);
        layout.insert(attrs, Datum::rect(key, value, format!("{value:.2}"), detail));
    }
    Ok(layout)
}
