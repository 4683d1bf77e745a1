// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pinned horizontal-scroll section.
//!
//! While the section is pinned, vertical scroll is converted into a
//! horizontal translation of its panel row. The pin engages when the
//! section's top reaches the viewport top and releases after
//! `total_panel_width - viewport_width` of additional scroll.

use crate::host::Layout;
use crate::trigger::{progress_at, ScrollTriggers, TriggerId, TriggerPoint, TriggerSpec};
use flowforce_motion::{ElementId, Easing, TriggerAnchor};

/// Where the scroll position is relative to the pinned range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPhase {
    /// Section has not reached the viewport top
    Before,
    /// Section is held in place while panels move
    Pinned,
    /// All panels have passed; the page scrolls normally
    After,
}

/// Style state for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinFrame {
    /// Current phase
    pub phase: PinPhase,
    /// Progress through the pinned range
    pub progress: f32,
    /// Panel row translation in percent of one panel width
    pub x_percent: f32,
    /// Panel row translation in pixels
    pub translate_x: f32,
    /// How far the section is held below its natural position
    pub pin_offset: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct PanelMeasure {
    panels: Vec<ElementId>,
    total_width: f32,
    travel: f32,
}

fn measure(panels: &[ElementId], layout: &dyn Layout) -> Option<PanelMeasure> {
    let mut present = Vec::with_capacity(panels.len());
    let mut total_width = 0.0;
    for panel in panels {
        match layout.bounds(*panel) {
            Some(bounds) => {
                present.push(*panel);
                total_width += bounds.width;
            }
            None => tracing::debug!("Horizontal panel {:?} is not laid out", panel),
        }
    }
    if present.len() < 2 {
        return None;
    }
    let travel = (total_width - layout.viewport().width).max(0.0);
    Some(PanelMeasure {
        panels: present,
        total_width,
        travel,
    })
}

/// Horizontal pin controller bound to one trigger
#[derive(Debug)]
pub struct HorizontalPin {
    section: ElementId,
    requested: Vec<ElementId>,
    measure: PanelMeasure,
    trigger: TriggerId,
    start: f32,
}

impl HorizontalPin {
    /// Measure panels and register the pin trigger.
    ///
    /// Returns `None` when the section is missing or fewer than two panels
    /// are laid out.
    pub fn setup(
        section: ElementId,
        panels: &[ElementId],
        layout: &dyn Layout,
        triggers: &mut ScrollTriggers,
    ) -> Option<Self> {
        let Some(measure) = measure(panels, layout) else {
            tracing::debug!("Horizontal scroll skipped: fewer than two panels");
            return None;
        };
        let (trigger, start) = register(section, measure.travel, layout, triggers)?;

        tracing::debug!(
            "Horizontal pin on {:?}: {} panels, travel {}",
            section,
            measure.panels.len(),
            measure.travel
        );
        Some(Self {
            section,
            requested: panels.to_vec(),
            measure,
            trigger,
            start,
        })
    }

    /// Re-measure after a layout change. Returns false when the pin can no
    /// longer run; its trigger is then removed.
    pub fn refresh(&mut self, layout: &dyn Layout, triggers: &mut ScrollTriggers) -> bool {
        triggers.unregister(self.trigger);
        let Some(measure) = measure(&self.requested, layout) else {
            tracing::debug!("Horizontal pin disabled after refresh");
            return false;
        };
        let Some((trigger, start)) = register(self.section, measure.travel, layout, triggers) else {
            return false;
        };
        self.measure = measure;
        self.trigger = trigger;
        self.start = start;
        true
    }

    /// Compute the frame for an offset, reading progress from the trigger registry
    pub fn update(&self, offset: f32, triggers: &ScrollTriggers) -> PinFrame {
        let end = self.end();
        let progress = triggers
            .progress(self.trigger)
            .unwrap_or_else(|| progress_at(offset, self.start, end));

        let phase = if offset < self.start {
            PinPhase::Before
        } else if offset > end || (offset == end && self.measure.travel > 0.0) {
            PinPhase::After
        } else {
            PinPhase::Pinned
        };

        let steps = (self.measure.panels.len() - 1) as f32;
        PinFrame {
            phase,
            progress,
            x_percent: -100.0 * progress * steps,
            translate_x: -progress * self.measure.travel,
            pin_offset: (offset - self.start).clamp(0.0, self.measure.travel),
        }
    }

    /// Remove the trigger
    pub fn teardown(&self, triggers: &mut ScrollTriggers) {
        triggers.unregister(self.trigger);
    }

    /// Trigger driving the pin
    pub fn trigger(&self) -> TriggerId {
        self.trigger
    }

    /// Offset at which the pin engages
    pub fn start(&self) -> f32 {
        self.start
    }

    /// Offset at which the pin releases
    pub fn end(&self) -> f32 {
        self.start + self.measure.travel
    }

    /// Scroll distance consumed while pinned
    pub fn travel(&self) -> f32 {
        self.measure.travel
    }

    /// Sum of panel widths
    pub fn total_width(&self) -> f32 {
        self.measure.total_width
    }

    /// Number of measured panels
    pub fn panel_count(&self) -> usize {
        self.measure.panels.len()
    }
}

fn register(
    section: ElementId,
    travel: f32,
    layout: &dyn Layout,
    triggers: &mut ScrollTriggers,
) -> Option<(TriggerId, f32)> {
    let spec = TriggerSpec::new(section, TriggerAnchor::TOP_TOP, TriggerAnchor::TOP_TOP)
        .with_end(TriggerPoint::After(travel))
        .with_scrub(1.0);
    match triggers.register(spec, None, layout) {
        Ok(id) => {
            let start = triggers.bounds(id).map(|(start, _)| start).unwrap_or_default();
            Some((id, start))
        }
        Err(err) => {
            tracing::warn!("Horizontal pin trigger rejected: {err}");
            None
        }
    }
}

/// A scroll target produced by [`PinSnap`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    /// Offset to scroll to
    pub offset: f32,
    /// Animation duration in seconds
    pub duration: f32,
    /// Animation easing
    pub easing: Easing,
}

/// Snaps a resting pin to the nearest panel boundary
#[derive(Debug, Clone)]
pub struct PinSnap {
    increment: f32,
    min_duration: f32,
    max_duration: f32,
    easing: Easing,
    idle_ms: f64,
    last_input: Option<f64>,
    armed: bool,
}

impl PinSnap {
    /// Snap for a pin with `panel_count` panels; `None` below two panels
    pub fn new(panel_count: usize) -> Option<Self> {
        if panel_count < 2 {
            return None;
        }
        Some(Self {
            increment: 1.0 / (panel_count - 1) as f32,
            min_duration: 0.2,
            max_duration: 0.6,
            easing: Easing::Power1InOut,
            idle_ms: 150.0,
            last_input: None,
            armed: false,
        })
    }

    /// Override how long input must be quiet before snapping
    pub fn with_idle_delay(mut self, idle_ms: f64) -> Self {
        self.idle_ms = idle_ms.max(0.0);
        self
    }

    /// Record user scroll input
    pub fn notify_input(&mut self, now_ms: f64) {
        self.last_input = Some(now_ms);
        self.armed = true;
    }

    /// Progress step between panels
    pub fn increment(&self) -> f32 {
        self.increment
    }

    /// Snap target once scrubbing has stopped inside the pinned range.
    /// Fires at most once per burst of input.
    pub fn poll(
        &mut self,
        now_ms: f64,
        frame: &PinFrame,
        pin: &HorizontalPin,
        engine_animating: bool,
    ) -> Option<SnapTarget> {
        if !self.armed || engine_animating || frame.phase != PinPhase::Pinned {
            return None;
        }
        let last_input = self.last_input?;
        if now_ms - last_input < self.idle_ms {
            return None;
        }
        self.armed = false;

        let snapped = ((frame.progress / self.increment).round() * self.increment).clamp(0.0, 1.0);
        let distance = (snapped - frame.progress).abs();
        if distance < 1e-4 {
            return None;
        }
        let duration = (self.max_duration * distance / self.increment)
            .clamp(self.min_duration, self.max_duration);
        Some(SnapTarget {
            offset: pin.start() + snapped * pin.travel(),
            duration,
            easing: self.easing,
        })
    }
}
