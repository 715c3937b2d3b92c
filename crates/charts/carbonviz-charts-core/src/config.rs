//! Chart component configuration.

use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// Countries drawn by the multi-country line chart unless configured otherwise.
pub const EUROPEAN_COUNTRIES: [&str; 18] = [
    "Germany",
    "France",
    "United Kingdom",
    "Italy",
    "Spain",
    "Netherlands",
    "Poland",
    "Sweden",
    "Norway",
    "Finland",
    "Denmark",
    "Portugal",
    "Greece",
    "Ireland",
    "Austria",
    "Belgium",
    "Switzerland",
    "Czechia",
];

/// Tooltip placement and fade timings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipConfig {
    /// Offset from the pointer, in screen units.
    pub offset: [f32; 2],
    pub fade_in_ms: f64,
    pub fade_out_ms: f64,
    /// Scale applied to the hovered element.
    pub emphasis: f32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset: [10.0, -15.0],
            fade_in_ms: 50.0,
            fade_out_ms: 100.0,
            emphasis: 1.02,
        }
    }
}

/// Configuration shared by every chart component. Unset fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    /// Year shown by the one-shot top-N and heatmap charts.
    pub year: i32,
    /// Entity shown by the single-country series.
    pub country: String,
    pub top_n: usize,
    pub tick_period_ms: f64,
    pub transition_ms: f64,
    pub bar_padding: f32,
    /// Factor applied to bound values before coloring the choropleth.
    pub value_multiplier: f64,
    /// Inclusive year span of the single-country series.
    pub year_range: [i32; 2],
    /// Entities drawn by the multi-country line chart.
    pub entities: Vec<String>,
    pub tooltip: TooltipConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            year: 2019,
            country: "United States".to_string(),
            top_n: 10,
            tick_period_ms: 1000.0,
            transition_ms: 500.0,
            bar_padding: 0.1,
            value_multiplier: 1.0,
            year_range: [2012, 2022],
            entities: EUROPEAN_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            tooltip: TooltipConfig::default(),
        }
    }
}

impl ChartConfig {
    pub fn from_json(text: &str) -> Result<Self, ChartError> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| ChartError::load("config", e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if self.top_n == 0 {
            return Err(ChartError::config("topN must be at least 1"));
        }
        if !(self.tick_period_ms.is_finite() && self.tick_period_ms > 0.0) {
            return Err(ChartError::config(format!(
                "tickPeriodMs must be positive, got {}",
                self.tick_period_ms
            )));
        }
        if !(self.transition_ms.is_finite() && self.transition_ms >= 0.0) {
            return Err(ChartError::config(format!(
                "transitionMs must be non-negative, got {}",
                self.transition_ms
            )));
        }
        if !(0.0..1.0).contains(&self.bar_padding) {
            return Err(ChartError::config(format!(
                "barPadding must be in [0, 1), got {}",
                self.bar_padding
            )));
        }
        if !self.value_multiplier.is_finite() {
            return Err(ChartError::config("valueMultiplier must be finite"));
        }
        if self.year_range[0] > self.year_range[1] {
            return Err(ChartError::config(format!(
                "yearRange is reversed: {:?}",
                self.year_range
            )));
        }
        for (name, v) in [
            ("fadeInMs", self.tooltip.fade_in_ms),
            ("fadeOutMs", self.tooltip.fade_out_ms),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ChartError::config(format!("tooltip.{name} must be non-negative")));
            }
        }
        Ok(())
    }
}
