//! Chart runtime shared by every chart: one reconciler, one scheduler and one stage per
//! mounted chart, plus the placeholder view a failed chart falls back to.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use carbonviz_engine::{
    AttrChange, Attrs, ChartId, Config, DiffResult, KeyedAttrs, KeyedReconciler, Outputs, Presence,
    Stage, Timing, TransitionScheduler,
};

use crate::error::ChartError;
use crate::geo::ScreenPath;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Outer drawing size and the margins kept free for axes.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub margin: Margin,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            margin: Margin {
                top: 0.0,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            },
        }
    }

    pub const fn with_margin(mut self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        self.margin = Margin {
            top,
            right,
            bottom,
            left,
        };
        self
    }

    /// Horizontal plot extent `[left, right]`.
    pub fn x_range(&self) -> [f32; 2] {
        [self.margin.left, self.width - self.margin.right]
    }

    /// Vertical plot extent `[top, bottom]`.
    pub fn y_range(&self) -> [f32; 2] {
        [self.margin.top, self.height - self.margin.bottom]
    }

    pub fn inner_width(&self) -> f32 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f32 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }
}

/// Shape drawn for an element; rectangles use the element's attributes directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Mark {
    Rect,
    Area(ScreenPath),
    Line(Vec<[f32; 2]>),
}

/// What a tooltip shows for an element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipContent {
    pub heading: String,
    pub detail: String,
}

/// Data bound to one rendered element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    pub key: String,
    pub value: f64,
    pub tooltip: TooltipContent,
    pub mark: Mark,
}

impl Datum {
    pub fn rect(key: impl Into<String>, value: f64, heading: String, detail: String) -> Self {
        Self {
            key: key.into(),
            value,
            tooltip: TooltipContent { heading, detail },
            mark: Mark::Rect,
        }
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.mark = mark;
        self
    }
}

/// Target attributes and bound data for one render, in render order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    pub targets: KeyedAttrs,
    pub data: IndexMap<String, Datum>,
}

impl Layout {
    /// Add an element. A key already present keeps its first position and is replaced.
    pub fn insert(&mut self, attrs: Attrs, datum: Datum) {
        self.targets.insert(datum.key.clone(), attrs);
        self.data.insert(datum.key.clone(), datum);
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(|k| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<(&Attrs, &Datum)> {
        Some((self.targets.get(key)?, self.data.get(key)?))
    }
}

/// One mounted chart.
#[derive(Debug)]
pub struct ChartRuntime {
    id: ChartId,
    reconciler: KeyedReconciler,
    scheduler: TransitionScheduler,
    stage: Stage<Datum>,
}

impl ChartRuntime {
    pub fn new(id: ChartId, presence: Presence, cfg: Config) -> Self {
        Self {
            id,
            reconciler: KeyedReconciler::new(presence),
            scheduler: TransitionScheduler::new(cfg),
            stage: Stage::new(),
        }
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn stage(&self) -> &Stage<Datum> {
        &self.stage
    }

    pub fn scheduler(&self) -> &TransitionScheduler {
        &self.scheduler
    }

    /// Targets of the last render.
    pub fn targets(&self) -> &KeyedAttrs {
        self.reconciler.prev()
    }

    /// Render with one timing for every change.
    pub fn render(&mut self, layout: Layout, timing: Timing) -> Result<DiffResult, ChartError> {
        self.render_with(layout, |_| timing)
    }

    /// Reconcile `layout` against the last render and start its transitions.
    ///
    /// Timings are validated before anything is applied, so a rejected render leaves the
    /// chart exactly as it was.
    pub fn render_with<F>(&mut self, layout: Layout, mut timing_for: F) -> Result<DiffResult, ChartError>
    where
        F: FnMut(&AttrChange) -> Timing,
    {
        let Layout { targets, data } = layout;
        let rec = self.reconciler.plan(&targets);

        let timings: Vec<Timing> = rec.changes.iter().map(&mut timing_for).collect();
        for timing in &timings {
            timing.validate()?;
        }

        let mut timings = timings.into_iter();
        self.scheduler
            .apply_with(&rec, |_| timings.next().unwrap_or_default())?;
        self.stage.apply_reconciliation(&rec, &data);
        self.reconciler.commit(targets);

        log::trace!(
            "chart {:?} render: {} entering, {} updating, {} exiting",
            self.id,
            rec.diff.entering.len(),
            rec.diff.updating.len(),
            rec.diff.exiting.len()
        );
        Ok(rec.diff)
    }

    /// Advance transitions by `dt_ms` and move the stage along.
    pub fn update(&mut self, dt_ms: f64) -> &Outputs {
        let out = self.scheduler.update(dt_ms);
        self.stage.apply_outputs(out);
        out
    }

    /// No transition in flight.
    pub fn is_settled(&self) -> bool {
        self.scheduler.active_len() == 0
    }

    /// Cancel every transition and release every element. Nothing fires afterwards.
    pub fn unmount(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.stage.clear();
        self.reconciler.reset();
        log::debug!("chart {:?} unmounted, {cancelled} transitions cancelled", self.id);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewStatus {
    Ready,
    /// Empty axes: the selection has no usable data.
    Empty { reason: String },
    /// Placeholder: the chart could not be built.
    Failed { category: String, message: String },
}

/// A one-shot chart result, or the placeholder standing in for it.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartView {
    pub title: String,
    pub status: ViewStatus,
    pub layout: Layout,
}

impl ChartView {
    /// Contain a chart failure so it never reaches sibling charts.
    pub fn from_result(title: impl Into<String>, result: Result<Layout, ChartError>) -> Self {
        let title = title.into();
        match result {
            Ok(layout) => Self {
                title,
                status: ViewStatus::Ready,
                layout,
            },
            Err(ChartError::EmptyDataset { context }) => {
                log::debug!("{title}: empty ({context})");
                Self {
                    title,
                    status: ViewStatus::Empty { reason: context },
                    layout: Layout::default(),
                }
            }
            Err(err) => {
                log::warn!("{title}: rendering placeholder after {} error: {err}", err.category());
                Self {
                    title,
                    status: ViewStatus::Failed {
                        category: err.category().to_string(),
                        message: err.to_string(),
                    },
                    layout: Layout::default(),
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ViewStatus::Ready
    }
}
