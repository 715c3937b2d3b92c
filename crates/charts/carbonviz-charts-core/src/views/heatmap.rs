use carbonviz_engine::{Attrs, ScaleFactory, SequentialScale, SequentialScheme};

use crate::chart::{Datum, Layout, Viewport};
use crate::error::ChartError;
use crate::frame::Frame;
use crate::records::{Dataset, FOSSIL_FIELD, LAND_USE_FIELD};

pub const HEATMAP_VIEWPORT: Viewport = Viewport::new(730.0, 490.0).with_margin(50.0, 30.0, 40.0, 100.0);

const CELL_PADDING: f32 = 0.05;

/// Column label per source field.
const COLUMNS: [(&str, &str); 2] = [
    (FOSSIL_FIELD, "Fossil Fuel Emissions"),
    (LAND_USE_FIELD, "Land-Use Change Emissions"),
];

/// Two cells per entity (fossil, land-use) for the top `top_n` entities of `year` by
/// their combined emissions. Entities missing either field are left out.
pub fn heatmap_layout(dataset: &Dataset, year: i32, top_n: usize, viewport: &Viewport) -> Result<Layout, ChartError> {
    let totals = dataset.for_year(year).map(|r| {
        let total = match (r.value(FOSSIL_FIELD), r.value(LAND_USE_FIELD)) {
            (Some(f), Some(l)) => Some(f + l),
            _ => None,
        };
        (r.entity.as_str(), total)
    });
    let frame = Frame::top_n(totals, top_n);
    if frame.is_empty() {
        return Err(ChartError::empty(format!("fossil and land-use emissions in {year}")));
    }

    let mut cells = Vec::with_capacity(frame.len() * COLUMNS.len());
    for entity in frame.keys() {
        let Some(record) = dataset
            .for_year(year)
            .find(|r| r.entity == entity && r.value(FOSSIL_FIELD).is_some() && r.value(LAND_USE_FIELD).is_some())
        else {
            continue;
        };
        for (field, label) in COLUMNS {
            cells.push((entity, label, record.value(field).unwrap_or(0.0)));
        }
    }

    let factory = ScaleFactory::new();
    let x = factory.band(COLUMNS.iter().map(|(_, label)| *label), viewport.x_range(), CELL_PADDING)?;
    let y = factory.band(frame.keys(), viewport.y_range(), CELL_PADDING)?;
    let max = cells.iter().map(|(_, _, v)| *v).fold(0.0, f64::max);
    let color = SequentialScale::from_domain([0.0, max], SequentialScheme::OrRd);

    let mut layout = Layout::default();
    for (entity, label, value) in cells {
        let (Some(left), Some(top)) = (x.apply(label), y.apply(entity)) else {
            continue;
        };
        let attrs = Attrs::rect(left, top, x.bandwidth(), y.bandwidth()).with_color(color.apply(value));
        layout.insert(
            attrs,
            Datum::rect(format!("{entity}/{label}"), value, format!("{value:.0}"), format!("{entity}: {label}")),
        );
    }
    Ok(layout)
}
