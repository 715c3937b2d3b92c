//! Race chart: the top-N ranking re-keyed every tick and animated between years.

use carbonviz_engine::{
    Attrs, ChartId, Collapse, Config, DiffResult, LinearScale, OrdinalScale, Palette, Presence,
    ScaleFactory, Timing,
};

use crate::anim_loop::{AnimationLoop, LoopState};
use crate::cancel::CancellationToken;
use crate::chart::{ChartRuntime, Datum, Layout, Viewport};
use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::frame::Frame;
use crate::records::Dataset;

pub const RACE_VIEWPORT: Viewport = Viewport::new(960.0, 540.0).with_margin(30.0, 10.0, 10.0, 50.0);

/// Horizontal bars: x from 0 to the frame maximum, one band per ranked key.
pub fn race_layout(
    frame: &Frame,
    colors: &OrdinalScale,
    viewport: &Viewport,
    padding: f32,
) -> Result<Layout, ChartError> {
    let [left, right] = viewport.x_range();
    let x = LinearScale::from_domain([0.0, frame.max_value()], [0.0, right - left]);
    let y = ScaleFactory::new().band(frame.keys(), viewport.y_range(), padding)?;

    let mut layout = Layout::default();
    for entry in &frame.entries {
        let top = y.apply(&entry.key).unwrap_or(viewport.margin.top);
        let attrs = Attrs::rect(left, top, x.apply(entry.value), y.bandwidth())
            .with_color(colors.apply(&entry.key));
        layout.insert(
            attrs,
            Datum::rect(
                entry.key.as_str(),
                entry.value,
                format!("{:.2}", entry.value),
                entry.key.clone(),
            ),
        );
    }
    Ok(layout)
}

#[derive(Debug)]
pub struct RaceChart {
    anim: AnimationLoop,
    runtime: ChartRuntime,
    colors: OrdinalScale,
    viewport: Viewport,
    padding: f32,
    timing: Timing,
}

impl RaceChart {
    pub fn new(id: ChartId, dataset: &Dataset, field: &str, cfg: &ChartConfig) -> Result<Self, ChartError> {
        cfg.validate()?;
        // Colors are fixed per entity across every year.
        let colors = ScaleFactory::new().ordinal(dataset.entities(), Palette::Tableau10);
        Ok(Self {
            anim: AnimationLoop::new(dataset, field, cfg.top_n, cfg.tick_period_ms),
            runtime: ChartRuntime::new(id, Presence::uniform(Collapse::Width), Config::default()),
            colors,
            viewport: RACE_VIEWPORT,
            padding: cfg.bar_padding,
            timing: Timing::new(cfg.transition_ms, 0.0),
        })
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn runtime(&self) -> &ChartRuntime {
        &self.runtime
    }

    pub fn current_year(&self) -> Option<i32> {
        self.anim.current_year()
    }

    pub fn state(&self) -> LoopState {
        self.anim.state()
    }

    fn show(&mut self, frame: &Frame) -> Result<DiffResult, ChartError> {
        let layout = race_layout(frame, &self.colors, &self.viewport, self.padding)?;
        self.runtime.render(layout, self.timing)
    }

    /// Start the loop and render the first year.
    pub fn mount(&mut self, token: CancellationToken) -> Result<DiffResult, ChartError> {
        let frame = self.anim.start(token)?;
        self.show(&frame)
    }

    /// Render the next year now.
    pub fn tick(&mut self) -> Result<Option<DiffResult>, ChartError> {
        match self.anim.tick() {
            Some(frame) => self.show(&frame).map(Some),
            None => Ok(None),
        }
    }

    /// Advance host time: render every frame that came due, then move transitions.
    pub fn advance(&mut self, dt_ms: f64) -> Result<usize, ChartError> {
        let frames = self.anim.advance(dt_ms);
        for frame in &frames {
            self.show(frame)?;
        }
        self.runtime.update(dt_ms);
        Ok(frames.len())
    }

    pub fn stop(&mut self) {
        self.anim.stop();
    }

    /// Stop the loop and release every element.
    pub fn unmount(&mut self) {
        self.anim.stop();
        self.runtime.unmount();
    }
}
