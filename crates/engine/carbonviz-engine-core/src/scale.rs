//! Scales: pure mappings from a data domain to a visual range.
//!
//! Every chart builds its scales through [`ScaleFactory`], keyed by [`ScaleKind`]:
//! - `Linear`: numeric extent (optionally niced) → coordinate, clamped at the ends
//! - `Band`: ordered keys → evenly spaced bands with uniform padding
//! - `SequentialColor`: numeric extent → color ramp
//! - `OrdinalColor`: ordered keys → categorical palette
//!
//! A scale built from an empty domain maps every input to its range minimum.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::attrs::Rgba;
use crate::color::{Palette, SequentialScheme};
use crate::error::EngineError;

/// Tick count used when extending a linear domain to round numbers.
const NICE_TICKS: usize = 10;
const NICE_MAX_ITER: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleKind {
    Linear,
    Band,
    SequentialColor,
    OrdinalColor,
}

impl ScaleKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Band => "band",
            Self::SequentialColor => "sequential-color",
            Self::OrdinalColor => "ordinal-color",
        }
    }
}

/// Raw data a domain is computed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DomainData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

/// Visual range of a scale: a coordinate extent or a fixed color table.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RangeSpec {
    Extent([f32; 2]),
    Scheme(SequentialScheme),
    Palette(Palette),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleOptions {
    /// Extend linear domains to round numbers.
    pub nice: bool,
    /// Band padding fraction, 0 <= padding < 1.
    pub padding: f32,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            nice: true,
            padding: 0.0,
        }
    }
}

#[inline]
fn range_min(range: [f32; 2]) -> f32 {
    range[0].min(range[1])
}

/// [min, max] over the finite values, or None when there are none.
fn extent(values: impl IntoIterator<Item = f64>) -> Option<[f64; 2]> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}

/// Signed tick increment: positive steps are multiples of 1/2/5 × 10^k (k >= 0); for
/// sub-unit steps the inverse is returned negated to keep integer arithmetic exact.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power) / factor)
    }
}

fn nice_domain(domain: [f64; 2], count: usize) -> [f64; 2] {
    let [mut start, mut stop] = domain;
    let reversed = stop < start;
    if reversed {
        std::mem::swap(&mut start, &mut stop);
    }
    let mut prestep = 0.0;
    for _ in 0..NICE_MAX_ITER {
        let step = tick_increment(start, stop, count);
        if step == prestep || !step.is_finite() || step == 0.0 {
            break;
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else {
            let inv = -step;
            start = (start * inv).floor() / inv;
            stop = (stop * inv).ceil() / inv;
        }
        prestep = step;
    }
    if reversed {
        [stop, start]
    } else {
        [start, stop]
    }
}

/// Continuous numeric → coordinate mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain: Option<[f64; 2]>,
    range: [f32; 2],
}

impl LinearScale {
    /// Domain is the [min, max] of the finite inputs.
    pub fn new(values: impl IntoIterator<Item = f64>, range: [f32; 2]) -> Self {
        Self {
            domain: extent(values),
            range,
        }
    }

    pub fn from_domain(domain: [f64; 2], range: [f32; 2]) -> Self {
        let domain = if domain[0].is_finite() && domain[1].is_finite() {
            Some(domain)
        } else {
            None
        };
        Self { domain, range }
    }

    /// Extend the domain outward to round tick boundaries.
    pub fn nice(mut self) -> Self {
        self.domain = self.domain.map(|d| nice_domain(d, NICE_TICKS));
        self
    }

    pub fn domain(&self) -> Option<[f64; 2]> {
        self.domain
    }

    pub fn range(&self) -> [f32; 2] {
        self.range
    }

    /// Map a value into the range. Inputs outside the domain clamp to the nearest range
    /// endpoint; NaN, an empty domain and a zero-width domain give the range minimum.
    pub fn apply(&self, value: f64) -> f32 {
        let Some([d0, d1]) = self.domain else {
            return range_min(self.range);
        };
        if d0 == d1 || value.is_nan() {
            return range_min(self.range);
        }
        let t = ((value - d0) / (d1 - d0)).clamp(0.0, 1.0) as f32;
        self.range[0] + (self.range[1] - self.range[0]) * t
    }
}

/// Discrete key → band start mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    keys: Vec<String>,
    index: HashMap<String, usize>,
    range: [f32; 2],
    padding: f32,
    step: f32,
    bandwidth: f32,
    start: f32,
    reverse: bool,
}

impl BandScale {
    /// Duplicate keys keep their first position.
    pub fn new<I, K>(keys: I, range: [f32; 2], padding: f32) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        if !(0.0..1.0).contains(&padding) {
            return Err(EngineError::InvalidPadding { padding });
        }
        let mut ordered = Vec::new();
        let mut index = HashMap::new();
        for key in keys {
            let key: String = key.into();
            if !index.contains_key(&key) {
                index.insert(key.clone(), ordered.len());
                ordered.push(key);
            }
        }

        let reverse = range[1] < range[0];
        let (r0, r1) = if reverse {
            (range[1], range[0])
        } else {
            (range[0], range[1])
        };
        let n = ordered.len() as f32;
        let (step, bandwidth, start) = if ordered.is_empty() {
            (0.0, 0.0, r0)
        } else {
            let step = (r1 - r0) / (n - padding + 2.0 * padding).max(1.0);
            let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
            (step, step * (1.0 - padding), start)
        };

        Ok(Self {
            keys: ordered,
            index,
            range,
            padding,
            step,
            bandwidth,
            start,
            reverse,
        })
    }

    pub fn domain(&self) -> &[String] {
        &self.keys
    }

    pub fn bandwidth(&self) -> f32 {
        self.bandwidth
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Start coordinate of the key's band; None for a key outside a non-empty domain.
    pub fn apply(&self, key: &str) -> Option<f32> {
        if self.keys.is_empty() {
            return Some(range_min(self.range));
        }
        let i = *self.index.get(key)?;
        let slot = if self.reverse {
            self.keys.len() - 1 - i
        } else {
            i
        };
        Some(self.start + self.step * slot as f32)
    }
}

/// Numeric → color ramp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequentialScale {
    domain: Option<[f64; 2]>,
    scheme: SequentialScheme,
}

impl SequentialScale {
    pub fn new(values: impl IntoIterator<Item = f64>, scheme: SequentialScheme) -> Self {
        Self {
            domain: extent(values),
            scheme,
        }
    }

    pub fn from_domain(domain: [f64; 2], scheme: SequentialScheme) -> Self {
        let domain = if domain[0].is_finite() && domain[1].is_finite() {
            Some(domain)
        } else {
            None
        };
        Self { domain, scheme }
    }

    pub fn domain(&self) -> Option<[f64; 2]> {
        self.domain
    }

    pub fn apply(&self, value: f64) -> Rgba {
        match self.domain {
            Some([d0, d1]) if d0 != d1 => self.scheme.interpolate((value - d0) / (d1 - d0)),
            _ => self.scheme.interpolate(0.0),
        }
    }
}

/// Categorical key → palette color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrdinalScale {
    index: HashMap<String, usize>,
    len: usize,
    palette: Palette,
}

impl OrdinalScale {
    pub fn new<I, K>(keys: I, palette: Palette) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut index = HashMap::new();
        for key in keys {
            let next = index.len();
            index.entry(key.into()).or_insert(next);
        }
        Self {
            len: index.len(),
            index,
            palette,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Keys outside the domain get the palette's first color.
    pub fn apply(&self, key: &str) -> Rgba {
        self.palette.color(self.index.get(key).copied().unwrap_or(0))
    }
}

/// One value fed into a [`Scale`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ScaleInput<'a> {
    Number(f64),
    Key(&'a str),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScaleOutput {
    Coord(f32),
    Color(Rgba),
}

/// Any scale the factory can build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Scale {
    Linear(LinearScale),
    Band(BandScale),
    SequentialColor(SequentialScale),
    OrdinalColor(OrdinalScale),
}

impl Scale {
    pub fn kind(&self) -> ScaleKind {
        match self {
            Self::Linear(_) => ScaleKind::Linear,
            Self::Band(_) => ScaleKind::Band,
            Self::SequentialColor(_) => ScaleKind::SequentialColor,
            Self::OrdinalColor(_) => ScaleKind::OrdinalColor,
        }
    }

    /// Map one input. None when the input shape does not fit the scale (a key into a
    /// linear scale) or a band key is unknown.
    pub fn map(&self, input: ScaleInput<'_>) -> Option<ScaleOutput> {
        match (self, input) {
            (Self::Linear(s), ScaleInput::Number(v)) => Some(ScaleOutput::Coord(s.apply(v))),
            (Self::Band(s), ScaleInput::Key(k)) => s.apply(k).map(ScaleOutput::Coord),
            (Self::SequentialColor(s), ScaleInput::Number(v)) => {
                Some(ScaleOutput::Color(s.apply(v)))
            }
            (Self::OrdinalColor(s), ScaleInput::Key(k)) => Some(ScaleOutput::Color(s.apply(k))),
            _ => None,
        }
    }
}

/// Shared constructor for every scale kind.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScaleFactory;

impl ScaleFactory {
    pub fn new() -> Self {
        Self
    }

    /// Build a scale of `kind` from raw domain data and a range.
    pub fn build(
        &self,
        kind: ScaleKind,
        domain: DomainData,
        range: RangeSpec,
        options: ScaleOptions,
    ) -> Result<Scale, EngineError> {
        let mismatch = |reason: &str| EngineError::ScaleMismatch {
            kind: kind.name().to_string(),
            reason: reason.to_string(),
        };
        match (kind, domain, range) {
            (ScaleKind::Linear, DomainData::Numeric(values), RangeSpec::Extent(r)) => {
                Ok(Scale::Linear(self.linear(values, r, options.nice)))
            }
            (ScaleKind::Band, DomainData::Categorical(keys), RangeSpec::Extent(r)) => {
                Ok(Scale::Band(self.band(keys, r, options.padding)?))
            }
            (ScaleKind::SequentialColor, DomainData::Numeric(values), RangeSpec::Scheme(s)) => {
                Ok(Scale::SequentialColor(self.sequential(values, s)))
            }
            (ScaleKind::OrdinalColor, DomainData::Categorical(keys), RangeSpec::Palette(p)) => {
                Ok(Scale::OrdinalColor(self.ordinal(keys, p)))
            }
            (ScaleKind::Linear | ScaleKind::SequentialColor, DomainData::Categorical(_), _) => {
                Err(mismatch("expected a numeric domain"))
            }
            (ScaleKind::Band | ScaleKind::OrdinalColor, DomainData::Numeric(_), _) => {
                Err(mismatch("expected a categorical domain"))
            }
            (ScaleKind::Linear | ScaleKind::Band, _, _) => {
                Err(mismatch("expected a coordinate extent range"))
            }
            (ScaleKind::SequentialColor, _, _) => Err(mismatch("expected a sequential scheme")),
            (ScaleKind::OrdinalColor, _, _) => Err(mismatch("expected a palette")),
        }
    }

    pub fn linear(
        &self,
        values: impl IntoIterator<Item = f64>,
        range: [f32; 2],
        nice: bool,
    ) -> LinearScale {
        let scale = LinearScale::new(values, range);
        if nice {
            scale.nice()
        } else {
            scale
        }
    }

    pub fn band<I, K>(&self, keys: I, range: [f32; 2], padding: f32) -> Result<BandScale, EngineError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        BandScale::new(keys, range, padding)
    }

    pub fn sequential(
        &self,
        values: impl IntoIterator<Item = f64>,
        scheme: SequentialScheme,
    ) -> SequentialScale {
        SequentialScale::new(values, scheme)
    }

    pub fn ordinal<I, K>(&self, keys: I, palette: Palette) -> OrdinalScale
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        OrdinalScale::new(keys, palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-4, "left={a} right={b}");
    }

    #[test]
    fn nice_extends_to_round_numbers() {
        assert_eq!(nice_domain([0.0, 35.6], 10), [0.0, 40.0]);
        assert_eq!(nice_domain([0.13, 0.87], 10), [0.1, 0.9]);
        assert_eq!(nice_domain([3.0, 3.0], 10), [3.0, 3.0]);
    }

    #[test]
    fn linear_clamps_outside_domain() {
        let s = LinearScale::from_domain([0.0, 10.0], [0.0, 100.0]);
        approx(s.apply(5.0), 50.0);
        approx(s.apply(-4.0), 0.0);
        approx(s.apply(25.0), 100.0);
    }

    #[test]
    fn linear_reversed_range() {
        let s = LinearScale::from_domain([0.0, 10.0], [400.0, 0.0]);
        approx(s.apply(0.0), 400.0);
        approx(s.apply(10.0), 0.0);
        approx(s.apply(2.5), 300.0);
    }

    #[test]
    fn band_positions_with_padding() {
        let s = BandScale::new(["A", "B"], [0.0, 100.0], 0.1).unwrap();
        approx(s.step(), 100.0 / 2.1);
        approx(s.bandwidth(), 100.0 / 2.1 * 0.9);
        approx(s.apply("A").unwrap(), (100.0 - 1.9 * 100.0 / 2.1) / 2.0);
        approx(s.apply("B").unwrap() - s.apply("A").unwrap(), s.step());
        assert!(s.apply("C").is_none());
    }

    #[test]
    fn band_rejects_bad_padding() {
        assert!(matches!(
            BandScale::new(["A"], [0.0, 1.0], 1.0),
            Err(EngineError::InvalidPadding { .. })
        ));
    }

    #[test]
    fn factory_reports_mismatches() {
        let f = ScaleFactory::new();
        let err = f
            .build(
                ScaleKind::Band,
                DomainData::Numeric(vec![1.0]),
                RangeSpec::Extent([0.0, 1.0]),
                ScaleOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.category(), "scale");
    }
}
