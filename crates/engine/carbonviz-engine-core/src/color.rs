//! Fixed color tables for the color scales.
//!
//! Sequential schemes are 9-class ramps interpolated piecewise-linearly in RGB;
//! ordinal palettes are categorical lookup tables.

use serde::{Deserialize, Serialize};

use crate::attrs::Rgba;
use crate::interp::functions::lerp_rgba;

const YL_OR_RD: [u32; 9] = [
    0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026, 0x800026,
];

const OR_RD: [u32; 9] = [
    0xfff7ec, 0xfee8c8, 0xfdd49e, 0xfdbb84, 0xfc8d59, 0xef6548, 0xd7301f, 0xb30000, 0x7f0000,
];

const TABLEAU10: [u32; 10] = [
    0x4e79a7, 0xf28e2c, 0xe15759, 0x76b7b2, 0x59a14f, 0xedc949, 0xaf7aa1, 0xff9da7, 0x9c755f,
    0xbab0ab,
];

const CATEGORY10: [u32; 10] = [
    0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x7f7f7f, 0xbcbd22,
    0x17becf,
];

/// Opaque color from a packed `0xRRGGBB` value.
#[inline]
pub fn from_hex(rgb: u32) -> Rgba {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// `#rrggbb` form of a color; alpha is dropped.
pub fn to_css_hex(color: Rgba) -> String {
    let ch = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", ch(color[0]), ch(color[1]), ch(color[2]))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequentialScheme {
    YlOrRd,
    OrRd,
}

impl SequentialScheme {
    fn stops(&self) -> &'static [u32] {
        match self {
            Self::YlOrRd => &YL_OR_RD,
            Self::OrRd => &OR_RD,
        }
    }

    /// Color at `t` ∈ [0, 1]; out-of-range and NaN inputs clamp to the ends.
    pub fn interpolate(&self, t: f64) -> Rgba {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let span = (stops.len() - 1) as f64;
        let pos = t * span;
        let i = (pos.floor() as usize).min(stops.len() - 2);
        let local = (pos - i as f64) as f32;
        lerp_rgba(from_hex(stops[i]), from_hex(stops[i + 1]), local)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Palette {
    Tableau10,
    Category10,
}

impl Palette {
    pub fn len(&self) -> usize {
        self.colors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors().is_empty()
    }

    fn colors(&self) -> &'static [u32] {
        match self {
            Self::Tableau10 => &TABLEAU10,
            Self::Category10 => &CATEGORY10,
        }
    }

    /// Palette entry for an ordinal index, cycling when the domain outgrows the table.
    pub fn color(&self, index: usize) -> Rgba {
        let colors = self.colors();
        from_hex(colors[index % colors.len()])
    }
}
