//! AnimationLoop: the fixed-period year driver behind the race chart.
//!
//! The loop owns no timer. The host calls [`AnimationLoop::advance`] with elapsed time and
//! receives the frames whose ticks fell inside that span, in order. Stopping is
//! synchronous: after [`AnimationLoop::stop`] returns (or the start token is cancelled)
//! no further frame is produced.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::ChartError;
use crate::frame::Frame;
use crate::records::Dataset;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopState {
    Stopped,
    Running,
}

#[derive(Debug)]
pub struct AnimationLoop {
    frames: IndexMap<i32, Frame>,
    period_ms: f64,
    state: LoopState,
    token: Option<CancellationToken>,
    cursor: usize,
    current: Option<i32>,
    accumulated: f64,
}

impl AnimationLoop {
    /// Precompute one top-`top_n` frame per usable year of `field`.
    pub fn new(dataset: &Dataset, field: &str, top_n: usize, period_ms: f64) -> Self {
        let frames = dataset
            .usable_years(field)
            .into_iter()
            .map(|year| (year, Frame::from_dataset(dataset, year, field, top_n)))
            .collect();
        Self {
            frames,
            period_ms,
            state: LoopState::Stopped,
            token: None,
            cursor: 0,
            current: None,
            accumulated: 0.0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn years(&self) -> Vec<i32> {
        self.frames.keys().copied().collect()
    }

    /// Year of the last emitted frame.
    pub fn current_year(&self) -> Option<i32> {
        self.current
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Enter `Running` and emit the first year's frame. With no usable year the loop stays
    /// stopped and reports an empty dataset.
    pub fn start(&mut self, token: CancellationToken) -> Result<Frame, ChartError> {
        if self.frames.is_empty() {
            return Err(ChartError::empty("animation loop: no usable years"));
        }
        if !(self.period_ms.is_finite() && self.period_ms > 0.0) {
            return Err(ChartError::config(format!(
                "tick period must be positive, got {}",
                self.period_ms
            )));
        }
        if token.is_cancelled() {
            return Err(ChartError::config("animation loop started with a cancelled token"));
        }
        self.token = Some(token);
        self.state = LoopState::Running;
        self.cursor = 0;
        self.accumulated = 0.0;
        log::info!(
            "animation loop started over {} years, period {}ms",
            self.frames.len(),
            self.period_ms
        );
        Ok(self.emit())
    }

    fn emit(&mut self) -> Frame {
        let len = self.frames.len();
        let (year, frame) = self
            .frames
            .get_index(self.cursor % len)
            .map(|(y, f)| (*y, f.clone()))
            .unwrap_or_default();
        self.current = Some(year);
        self.cursor = (self.cursor + 1) % len;
        frame
    }

    fn observe_token(&mut self) -> bool {
        if self.state == LoopState::Running && self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            self.halt();
        }
        self.state == LoopState::Running
    }

    /// Emit the next year's frame immediately, wrapping to the first year after the last.
    pub fn tick(&mut self) -> Option<Frame> {
        if !self.observe_token() {
            return None;
        }
        let frame = self.emit();
        log::trace!("animation loop tick: year {:?}", self.current);
        Some(frame)
    }

    /// Accumulate `dt_ms` and emit one frame per elapsed period.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<Frame> {
        let mut out = Vec::new();
        if !self.observe_token() || !(dt_ms.is_finite() && dt_ms > 0.0) {
            return out;
        }
        self.accumulated += dt_ms;
        while self.accumulated >= self.period_ms {
            self.accumulated -= self.period_ms;
            if let Some(frame) = self.tick() {
                out.push(frame);
            }
        }
        out
    }

    fn halt(&mut self) {
        self.state = LoopState::Stopped;
        self.accumulated = 0.0;
        log::info!("animation loop stopped at year {:?}", self.current);
    }

    /// Stop now; cancels the start token so every clone observes the stop.
    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        if self.state == LoopState::Running {
            self.halt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Record, PER_CAPITA_FIELD};

    fn dataset(rows: &[(&str, i32, f64)]) -> Dataset {
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
    fn advance_emits_one_frame_per_period() {
        let ds = dataset(&[("A", 2000, 1.0), ("A", 2001, 2.0)]);
        let mut l = AnimationLoop::new(&ds, PER_CAPITA_FIELD, 5, 1000.0);
        let first = l.start(CancellationToken::new()).unwrap();
        assert_eq!(first.year, Some(2000));
        assert!(l.advance(999.0).is_empty());
        let frames = l.advance(2001.0);
        assert_eq!(
            frames.iter().map(|f| f.year).collect::<Vec<_>>(),
            vec![Some(2001), Some(2000), Some(2001)]
        );
    }

    #[test]
    fn cancelled_token_stops_the_loop() {
        let ds = dataset(&[("A", 2000, 1.0)]);
        let mut l = AnimationLoop::new(&ds, PER_CAPITA_FIELD, 5, 100.0);
        let token = CancellationToken::new();
        l.start(token.clone()).unwrap();
        token.cancel();
        assert!(l.advance(1000.0).is_empty());
        assert_eq!(l.state(), LoopState::Stopped);
    }
}
