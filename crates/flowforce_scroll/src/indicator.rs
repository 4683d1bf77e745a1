// SPDX-License-Identifier: MIT OR Apache-2.0
//! Page-progress readouts: the scroll timer and the circular indicator.

use crate::engine::{ObserverId, ScrollEngine};
use std::cell::Cell;
use std::f32::consts::TAU;
use std::rc::Rc;

/// Fraction of the page scrolled
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollProgress(f32);

impl ScrollProgress {
    /// Wrap a progress value, clamped to `[0, 1]`
    pub fn new(progress: f32) -> Self {
        if progress.is_nan() {
            return Self(0.0);
        }
        Self(progress.clamp(0.0, 1.0))
    }

    /// Progress of `offset` over a scroll limit
    pub fn from_offset(offset: f32, limit: f32) -> Self {
        if limit <= 0.0 {
            return Self(0.0);
        }
        Self::new(offset / limit)
    }

    /// Raw fraction
    pub fn value(&self) -> f32 {
        self.0
    }

    /// `MM:SS` readout where the whole page spans 100 seconds
    pub fn timer_label(&self) -> String {
        let elapsed = (self.0 * 100.0).floor() as u32;
        format!("{:02}:{:02}", elapsed / 60, elapsed % 60)
    }

    /// Stroke dash offset for a circle of `radius`; the full circumference
    /// at the top of the page, zero at the bottom
    pub fn dash_offset(&self, radius: f32) -> f32 {
        let circumference = TAU * radius;
        circumference - self.0 * circumference
    }
}

/// Keeps the latest progress from an engine's scroll events
pub struct ScrollIndicator {
    progress: Rc<Cell<f32>>,
    observer: Option<ObserverId>,
}

impl ScrollIndicator {
    /// Subscribe to an engine
    pub fn attach(engine: &mut ScrollEngine) -> Self {
        let progress = Rc::new(Cell::new(0.0));
        let sink = progress.clone();
        let observer = engine.subscribe(move |event| sink.set(event.progress));
        Self {
            progress,
            observer: Some(observer),
        }
    }

    /// Latest progress
    pub fn progress(&self) -> ScrollProgress {
        ScrollProgress::new(self.progress.get())
    }

    /// Stop listening
    pub fn detach(&mut self, engine: &mut ScrollEngine) {
        if let Some(id) = self.observer.take() {
            engine.unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ScrollConfig, ScrollToOptions};
    use crate::test_support::RecordingHost;

    #[test]
    fn test_timer_label() {
        assert_eq!(ScrollProgress::new(0.0).timer_label(), "00:00");
        assert_eq!(ScrollProgress::new(0.459).timer_label(), "00:45");
        assert_eq!(ScrollProgress::new(0.75).timer_label(), "01:15");
        assert_eq!(ScrollProgress::new(1.0).timer_label(), "01:40");
        assert_eq!(ScrollProgress::new(3.0).timer_label(), "01:40");
    }

    #[test]
    fn test_dash_offset() {
        let radius = 200.0;
        assert!((ScrollProgress::new(0.0).dash_offset(radius) - TAU * radius).abs() < 1e-3);
        assert!((ScrollProgress::new(0.5).dash_offset(radius) - TAU * radius / 2.0).abs() < 1e-3);
        assert_eq!(ScrollProgress::new(1.0).dash_offset(radius), 0.0);
    }

    #[test]
    fn test_degenerate_limits() {
        assert_eq!(ScrollProgress::from_offset(100.0, 0.0).value(), 0.0);
        assert_eq!(ScrollProgress::new(f32::NAN).value(), 0.0);
    }

    #[test]
    fn test_indicator_follows_engine() {
        let host = Rc::new(RecordingHost::browser(1440.0, 1000.0, 3000.0));
        let mut engine = ScrollEngine::initialize(ScrollConfig::default(), host).unwrap();
        let mut indicator = ScrollIndicator::attach(&mut engine);

        engine.scroll_to(1000.0, ScrollToOptions::immediate());
        engine.tick(0.0);
        assert_eq!(indicator.progress().value(), 0.5);
        assert_eq!(indicator.progress().timer_label(), "00:50");

        indicator.detach(&mut engine);
        engine.scroll_to(2000.0, ScrollToOptions::immediate());
        engine.tick(16.0);
        assert_eq!(indicator.progress().value(), 0.5);
    }
}
