//! carbonviz charts: emissions visualizations on top of the reconciliation engine.
//!
//! - [`records`]: typed rows and the [`Dataset`] every chart queries
//! - [`anim_loop`] and [`race`]: the periodic top-N ranking chart
//! - [`geo`] and [`choropleth`]: geometry join, projection and the emissions map
//! - [`interaction`]: the single shared hover tooltip
//! - [`views`]: one-shot bar, series, line, heatmap and alluvial layouts
//!
//! Each chart owns its own [`ChartRuntime`]; a failing chart degrades to a placeholder
//! [`ChartView`] and never touches its siblings.

pub mod anim_loop;
pub mod cancel;
pub mod chart;
pub mod choropleth;
pub mod config;
pub mod error;
pub mod frame;
pub mod geo;
pub mod interaction;
pub mod race;
pub mod records;
pub mod views;

pub use anim_loop::{AnimationLoop, LoopState};
pub use cancel::CancellationToken;
pub use chart::{ChartRuntime, ChartView, Datum, Layout, Margin, Mark, TooltipContent, ViewStatus, Viewport};
pub use choropleth::{choropleth_layout, ChoroplethChart, ChoroplethSpec, MAP_VIEWPORT};
pub use config::{ChartConfig, TooltipConfig, EUROPEAN_COUNTRIES};
pub use error::{ChartError, DataIssue, IngestReport};
pub use frame::{Frame, RankedEntry};
pub use geo::{bind, project, BindOutcome, Feature, FeatureCollection, GeoFeature, Geometry, Projection, ProjectionKind, ScreenPath};
pub use interaction::{HoverState, InteractionLayer, Tooltip};
pub use race::{race_layout, RaceChart, RACE_VIEWPORT};
pub use records::{Dataset, Record, Row};
