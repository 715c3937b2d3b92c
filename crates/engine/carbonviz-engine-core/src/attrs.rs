//! Visual attributes of a rendered element and the neutral states used when an
//! element enters or leaves.

use serde::{Deserialize, Serialize};

use crate::interp::functions::{lerp_f32, lerp_rgba};

/// RGBA color, each channel in [0, 1].
pub type Rgba = [f32; 4];

/// The animatable attribute set of one element.
///
/// `x`/`y` locate the element's top-left corner in screen space; `width`/`height` are its
/// extent. Non-rectangular marks (lines, map regions) use the box as their bounds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attrs {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Rgba,
    pub opacity: f32,
}

impl Default for Attrs {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            color: [0.0, 0.0, 0.0, 1.0],
            opacity: 1.0,
        }
    }
}

impl Attrs {
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Component-wise linear blend; `t` is clamped to [0, 1] so callers never overshoot.
    pub fn lerp(&self, to: &Attrs, t: f32) -> Attrs {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 {
            return *self;
        }
        if t == 1.0 {
            return *to;
        }
        Attrs {
            x: lerp_f32(self.x, to.x, t),
            y: lerp_f32(self.y, to.y, t),
            width: lerp_f32(self.width, to.width, t),
            height: lerp_f32(self.height, to.height, t),
            color: lerp_rgba(self.color, to.color, t),
            opacity: lerp_f32(self.opacity, to.opacity, t),
        }
    }

    /// The neutral counterpart of `self` under the given collapse style.
    pub fn collapsed(&self, collapse: Collapse) -> Attrs {
        let mut out = *self;
        match collapse {
            Collapse::Width => out.width = 0.0,
            Collapse::Height => {
                // Keep the bottom edge so vertical bars grow up from their baseline.
                out.y = self.y + self.height;
                out.height = 0.0;
            }
            Collapse::Size => {
                out.width = 0.0;
                out.height = 0.0;
            }
            Collapse::Opacity => out.opacity = 0.0,
        }
        out
    }
}

/// How an element looks while absent: what an entering element grows from and what an
/// exiting element shrinks to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collapse {
    /// Zero width at the same position (horizontal bars).
    #[default]
    Width,
    /// Zero height on the bottom edge (vertical bars).
    Height,
    /// Zero width and height.
    Size,
    /// Fully transparent, geometry untouched (lines, map regions).
    Opacity,
}

/// Enter/exit collapse styles for a chart.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub enter: Collapse,
    pub exit: Collapse,
}

impl Presence {
    pub fn uniform(collapse: Collapse) -> Self {
        Self {
            enter: collapse,
            exit: collapse,
        }
    }
}
