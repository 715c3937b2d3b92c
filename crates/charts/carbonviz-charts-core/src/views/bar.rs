use carbonviz_engine::color::from_hex;
use carbonviz_engine::{Attrs, ScaleFactory};

use crate::chart::{Datum, Layout, Viewport};
use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::frame::Frame;
use crate::records::Dataset;

pub const BAR_VIEWPORT: Viewport = Viewport::new(800.0, 400.0).with_margin(20.0, 30.0, 40.0, 60.0);

const STEELBLUE: u32 = 0x4682b4;

/// Vertical bars for the top `cfg.top_n` entities of `cfg.year`, tallest first.
pub fn top_n_bars(
    dataset: &Dataset,
    field: &str,
    cfg: &ChartConfig,
    viewport: &Viewport,
) -> Result<Layout, ChartError> {
    let frame = Frame::from_dataset(dataset, cfg.year, field, cfg.top_n);
    if frame.is_empty() {
        return Err(ChartError::empty(format!("{field} in {}", cfg.year)));
    }

    let factory = ScaleFactory::new();
    let x = factory.band(frame.keys(), viewport.x_range(), cfg.bar_padding)?;
    let [top, bottom] = viewport.y_range();
    let y = factory.linear([0.0, frame.max_value()], [bottom, top], true);

    let mut layout = Layout::default();
    for entry in &frame.entries {
        let left = x.apply(&entry.key).unwrap_or(viewport.margin.left);
        let y_top = y.apply(entry.value);
        let attrs = Attrs::rect(left, y_top, x.bandwidth(), bottom - y_top).with_color(from_hex(STEELBLUE));
        layout.insert(
            attrs,
            Datum::rect(
                entry.key.as_str(),
                entry.value,
                entry.value.to_string(),
                entry.key.clone(),
            ),
        );
    }
    Ok(layout)
}
