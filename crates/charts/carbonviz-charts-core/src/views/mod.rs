//! One-shot chart views. Each builds a [`Layout`](crate::chart::Layout) from a dataset
//! selection; mount it on a [`ChartRuntime`](crate::chart::ChartRuntime) to animate it, or
//! wrap the result in a [`ChartView`](crate::chart::ChartView) to contain failures.

pub mod alluvial;
pub mod bar;
pub mod heatmap;
pub mod lines;
pub mod series;

pub use alluvial::{sankey_layout, SankeyInput, SankeyLayout, SankeyLinkSpec, SankeyNodeSpec, SankeyOptions};
pub use bar::{top_n_bars, BAR_VIEWPORT};
pub use heatmap::{heatmap_layout, HEATMAP_VIEWPORT};
pub use lines::{line_timing, multi_line_layout, LINES_VIEWPORT};
pub use series::{country_series, SERIES_VIEWPORT};
