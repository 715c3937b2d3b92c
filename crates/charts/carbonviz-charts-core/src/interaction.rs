//! InteractionLayer: the single hover tooltip shared by every chart on a page.
//!
//! State machine `Idle -> Hover(owner, key) -> Idle`. Entering any element replaces the
//! current hover at once, so at most one tooltip exists. Leaving starts a fade; the
//! tooltip is dropped when the fade completes unless a new hover took it over.

use serde::{Deserialize, Serialize};

use carbonviz_engine::interp::functions::{lerp_f32, progress};
use carbonviz_engine::{ChartId, EngineError};

use crate::chart::{ChartRuntime, TooltipContent};
use crate::config::TooltipConfig;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoverState {
    #[default]
    Idle,
    Hover { owner: ChartId, key: String },
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f64,
    duration: f64,
}

impl Fade {
    fn value(&self) -> f32 {
        if self.done() {
            return self.to;
        }
        let t = progress(0.0, 0.0, self.duration, self.elapsed);
        lerp_f32(self.from, self.to, t)
    }

    fn done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub owner: ChartId,
    pub key: String,
    pub content: TooltipContent,
    /// Screen position: pointer plus the configured offset.
    pub position: [f32; 2],
    pub opacity: f32,
}

#[derive(Debug, Default)]
pub struct InteractionLayer {
    cfg: TooltipConfig,
    state: HoverState,
    tooltip: Option<Tooltip>,
    fade: Option<Fade>,
}

impl InteractionLayer {
    pub fn new(cfg: TooltipConfig) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn visible_tooltips(&self) -> usize {
        usize::from(self.tooltip.is_some())
    }

    /// Hovered element and its emphasis scale, if any.
    pub fn emphasized(&self) -> Option<(ChartId, &str, f32)> {
        match &self.state {
            HoverState::Hover { owner, key } => Some((*owner, key.as_str(), self.cfg.emphasis)),
            HoverState::Idle => None,
        }
    }

    /// Hover `key` on `chart` at `pointer`. Content comes from the element's bound datum;
    /// a key not on the chart's stage is rejected and leaves the state unchanged.
    pub fn pointer_enter(
        &mut self,
        chart: &ChartRuntime,
        key: &str,
        pointer: [f32; 2],
    ) -> Result<(), EngineError> {
        let element = chart.stage().get(key).ok_or_else(|| EngineError::UnknownKey {
            key: key.to_string(),
        })?;

        // Ownership moves in one step; the new tooltip fades in from whatever is showing.
        let from = self.tooltip.as_ref().map(|t| t.opacity).unwrap_or(0.0);
        self.state = HoverState::Hover {
            owner: chart.id(),
            key: key.to_string(),
        };
        self.fade = Some(Fade {
            from,
            to: 1.0,
            elapsed: 0.0,
            duration: self.cfg.fade_in_ms,
        });
        self.tooltip = Some(Tooltip {
            owner: chart.id(),
            key: key.to_string(),
            content: element.datum.tooltip.clone(),
            position: [pointer[0] + self.cfg.offset[0], pointer[1] + self.cfg.offset[1]],
            opacity: from,
        });
        self.settle_fade();
        Ok(())
    }

    /// Track the pointer while hovering.
    pub fn pointer_move(&mut self, owner: ChartId, key: &str, pointer: [f32; 2]) {
        if let Some(t) = self.tooltip.as_mut().filter(|t| t.owner == owner && t.key == key) {
            t.position = [pointer[0] + self.cfg.offset[0], pointer[1] + self.cfg.offset[1]];
        }
    }

    /// Leave `key`. Ignored unless it is the current hover; a stale leave after another
    /// element took over must not hide the new tooltip.
    pub fn pointer_leave(&mut self, owner: ChartId, key: &str) {
        let current = matches!(&self.state, HoverState::Hover { owner: o, key: k } if *o == owner && k == key);
        if !current {
            return;
        }
        self.state = HoverState::Idle;
        let from = self.tooltip.as_ref().map(|t| t.opacity).unwrap_or(0.0);
        self.fade = Some(Fade {
            from,
            to: 0.0,
            elapsed: 0.0,
            duration: self.cfg.fade_out_ms,
        });
        self.settle_fade();
    }

    /// Advance fades by `dt_ms`.
    pub fn update(&mut self, dt_ms: f64) {
        if let Some(fade) = self.fade.as_mut() {
            if dt_ms.is_finite() && dt_ms > 0.0 {
                fade.elapsed += dt_ms;
            }
        }
        self.settle_fade();
    }

    fn settle_fade(&mut self) {
        let Some(fade) = self.fade else {
            return;
        };
        if let Some(t) = self.tooltip.as_mut() {
            t.opacity = fade.value();
        }
        if fade.done() {
            self.fade = None;
            if self.state == HoverState::Idle {
                self.tooltip = None;
            }
        }
    }

    /// Drop anything owned by `owner` immediately, e.g. when that chart unmounts.
    pub fn release(&mut self, owner: ChartId) {
        if self.tooltip.as_ref().is_some_and(|t| t.owner == owner) {
            self.tooltip = None;
            self.fade = None;
        }
        if matches!(&self.state, HoverState::Hover { owner: o, .. } if *o == owner) {
            self.state = HoverState::Idle;
        }
    }
}
