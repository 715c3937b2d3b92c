use indexmap::IndexMap;

use carbonviz_engine::{AttrChange, Attrs, Palette, ScaleFactory, Timing};

use crate::chart::{Datum, Layout, Mark, Viewport};
use crate::error::ChartError;
use crate::records::Dataset;

pub const LINES_VIEWPORT: Viewport = Viewport::new(920.0, 570.0).with_margin(20.0, 50.0, 50.0, 70.0);

pub const LINE_FADE_MS: f64 = 1000.0;

/// One polyline per entity in `entities` order, points in year order. Entities without
/// usable values are left out.
pub fn multi_line_layout(
    dataset: &Dataset,
    field: &str,
    entities: &[String],
    viewport: &Viewport,
) -> Result<Layout, ChartError> {
    let mut series: IndexMap<&str, Vec<(i32, f64)>> = IndexMap::new();
    for entity in entities {
        let mut points: Vec<(i32, f64)> = dataset
            .for_entity(entity)
            .filter_map(|r| Some((r.year, r.value(field)?)))
            .collect();
        if points.is_empty() {
            continue;
        }
        points.sort_by_key(|(year, _)| *year);
        series.insert(entity.as_str(), points);
    }
    if series.is_empty() {
        return Err(ChartError::empty(format!("{field} for {} entities", entities.len())));
    }

    let factory = ScaleFactory::new();
    let all = || series.values().flatten();
    let x = factory.linear(all().map(|(y, _)| *y as f64), viewport.x_range(), false);
    let [top, bottom] = viewport.y_range();
    let max = all().map(|(_, v)| *v).fold(0.0, f64::max);
    let y = factory.linear([0.0, max], [bottom, top], true);
    let colors = factory.ordinal(series.keys().copied(), Palette::Category10);

    let mut layout = Layout::default();
    for (entity, points) in &series {
        let projected: Vec<[f32; 2]> = points.iter().map(|(yr, v)| [x.apply(*yr as f64), y.apply(*v)]).collect();
        let [x0, y0, x1, y1] = projected.iter().fold(
            [f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY],
            |[x0, y0, x1, y1], [px, py]| [x0.min(*px), y0.min(*py), x1.max(*px), y1.max(*py)],
        );
        let last = points.last().map(|(_, v)| *v).unwrap_or(0.0);
        let attrs = Attrs::rect(x0, y0, x1 - x0, y1 - y0).with_color(colors.apply(entity));
        let datum = Datum::rect(*entity, last, entity.to_string(), format!("{} years", points.len()))
            .with_mark(Mark::Line(projected));
        layout.insert(attrs, datum);
    }
    Ok(layout)
}

/// Fade timing for the line chart: every line fades over one second, entering lines
/// staggered evenly across `[0, 1000)` ms by their position in `layout`.
pub fn line_timing(layout: &Layout) -> impl FnMut(&AttrChange) -> Timing {
    let n = layout.len().max(1) as f64;
    let slots: IndexMap<String, usize> = layout.keys().enumerate().map(|(i, k)| (k.to_string(), i)).collect();
    move |change: &AttrChange| {
        let delay = slots
            .get(&change.key)
            .map(|i| LINE_FADE_MS * *i as f64 / n)
            .unwrap_or(0.0);
        Timing::new(LINE_FADE_MS, delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Record, PER_CAPITA_FIELD};
    use carbonviz_engine::ChangeKind;

    fn dataset() -> Dataset {
        let rows = [
            ("France", 2001, 6.0),
            ("France", 2000, 6.5),
            ("Spain", 2000, 7.0),
            ("Spain", 2001, 7.5),
            ("Chad", 2000, 0.1),
        ];
        Dataset::new(
            rows.iter()
                .map(|(e, y, v)| Record {
                    entity: e.to_string(),
                    year: *y,
                    values: [(PER_CAPITA_FIELD.to_string(), Some(*v))].into_iter().collect(),
                })
                .collect(),
        )
    }

    #[test]
    fn lines_follow_entity_list() {
        let entities = vec!["Spain".to_string(), "France".to_string(), "Norway".to_string()];
        let layout = multi_line_layout(&dataset(), PER_CAPITA_FIELD, &entities, &LINES_VIEWPORT).unwrap();
        assert_eq!(layout.keys().collect::<Vec<_>>(), vec!["Spain", "France"]);
        let (_, france) = layout.get("France").unwrap();
        let Mark::Line(points) = &france.mark else {
            panic!("expected a line mark");
        };
        // 2000 at the left edge, 2001 at the right edge.
        assert_eq!(points[0][0], 70.0);
        assert_eq!(points[1][0], 870.0);
    }

    #[test]
    fn stagger_is_deterministic_and_bounded() {
        let entities = vec!["Spain".to_string(), "France".to_string()];
        let layout = multi_line_layout(&dataset(), PER_CAPITA_FIELD, &entities, &LINES_VIEWPORT).unwrap();
        let mut timing = line_timing(&layout);
        let change = |key: &str| AttrChange {
            key: key.into(),
            kind: ChangeKind::Enter,
            from: Attrs::default(),
            to: Attrs::default(),
        };
        assert_eq!(timing(&change("Spain")), Timing::new(1000.0, 0.0));
        assert_eq!(timing(&change("France")), Timing::new(1000.0, 500.0));
        assert_eq!(timing(&change("France")), Timing::new(1000.0, 500.0));
        assert_eq!(timing(&change("gone")).delay_ms, 0.0);
    }
}
