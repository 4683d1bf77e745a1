// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll-linked trigger regions.
//!
//! Every registered trigger maps the current scroll offset to a progress in
//! `[0, 1]` between its start and end offsets and reports boundary crossings.
//!
//! Direction convention:
//! - `Enter`: progress leaves 0 while scrolling forward
//! - `Leave`: progress reaches 1 while scrolling forward (past the end)
//! - `EnterBack`: progress drops below 1 while scrolling backward
//! - `LeaveBack`: progress returns to 0 while scrolling backward (past the start)
//!
//! Within one update the order is always enter, update, leave.

use crate::host::Layout;
use flowforce_motion::{ElementId, TriggerAnchor, TriggerPreset};
use indexmap::IndexMap;

/// Registered trigger handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(pub u64);

/// A start or end line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerPoint {
    /// Element edge meets viewport line
    Anchor(TriggerAnchor),
    /// Fixed scroll offset
    Absolute(f32),
    /// Distance past the resolved start (end only)
    After(f32),
}

/// What to register
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerSpec {
    /// Element the anchors are measured against
    pub element: ElementId,
    /// Start line
    pub start: TriggerPoint,
    /// End line
    pub end: TriggerPoint,
    /// Scrub factor; `Some` makes the trigger report every progress change
    pub scrub: Option<f32>,
}

impl TriggerSpec {
    /// Toggle trigger between two anchors
    pub fn new(element: ElementId, start: TriggerAnchor, end: TriggerAnchor) -> Self {
        Self {
            element,
            start: TriggerPoint::Anchor(start),
            end: TriggerPoint::Anchor(end),
            scrub: None,
        }
    }

    /// Toggle trigger between two fixed offsets
    pub fn between(element: ElementId, start: f32, end: f32) -> Self {
        Self {
            element,
            start: TriggerPoint::Absolute(start),
            end: TriggerPoint::Absolute(end),
            scrub: None,
        }
    }

    /// Trigger using a preset range
    pub fn from_preset(element: ElementId, preset: &TriggerPreset) -> Self {
        Self {
            scrub: preset.scrub,
            ..Self::new(element, preset.start, preset.end)
        }
    }

    /// Set the end line
    pub fn with_end(mut self, end: TriggerPoint) -> Self {
        self.end = end;
        self
    }

    /// Make this a scrub trigger
    pub fn with_scrub(mut self, factor: f32) -> Self {
        self.scrub = Some(factor);
        self
    }

    /// Whether progress changes are reported continuously
    pub fn is_scrub(&self) -> bool {
        self.scrub.is_some()
    }
}

/// Callbacks for one trigger. Every method defaults to doing nothing.
pub trait TriggerHandler {
    /// Scrolled forward into the range
    fn on_enter(&mut self, _id: TriggerId) {}
    /// Scrolled forward past the end
    fn on_leave(&mut self, _id: TriggerId) {}
    /// Scrolled backward into the range from past the end
    fn on_enter_back(&mut self, _id: TriggerId) {}
    /// Scrolled backward past the start
    fn on_leave_back(&mut self, _id: TriggerId) {}
    /// Progress changed
    fn on_update(&mut self, _id: TriggerId, _progress: f32) {}
}

/// Kind of trigger event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerEventKind {
    /// See [`TriggerHandler::on_enter`]
    Enter,
    /// See [`TriggerHandler::on_leave`]
    Leave,
    /// See [`TriggerHandler::on_enter_back`]
    EnterBack,
    /// See [`TriggerHandler::on_leave_back`]
    LeaveBack,
    /// See [`TriggerHandler::on_update`]
    Update(f32),
}

/// Event produced by an update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    /// Source trigger
    pub trigger: TriggerId,
    /// What happened
    pub kind: TriggerEventKind,
}

/// Registration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TriggerError {
    /// The element is not laid out
    #[error("Trigger element {0:?} is not in the layout")]
    MissingElement(ElementId),

    /// `After` used as a start line
    #[error("A trigger start cannot be relative")]
    RelativeStart,

    /// A line resolved to NaN or infinity
    #[error("Trigger bounds for {0:?} are not finite")]
    NonFinite(ElementId),
}

struct Registration {
    spec: TriggerSpec,
    handler: Option<Box<dyn TriggerHandler>>,
    start: f32,
    end: f32,
    progress: f32,
}

/// Registry of trigger regions, updated once per scroll event
#[derive(Default)]
pub struct ScrollTriggers {
    triggers: IndexMap<TriggerId, Registration>,
    next_id: u64,
    frame_events: Vec<TriggerEvent>,
    pending: Vec<TriggerEvent>,
    last_offset: Option<f32>,
}

impl ScrollTriggers {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve bounds against the current layout and register
    pub fn register(
        &mut self,
        spec: TriggerSpec,
        handler: Option<Box<dyn TriggerHandler>>,
        layout: &dyn Layout,
    ) -> Result<TriggerId, TriggerError> {
        let (start, end) = resolve_bounds(&spec, layout)?;
        let id = TriggerId(self.next_id);
        self.next_id += 1;
        tracing::debug!(
            "Registered trigger {:?} on {:?}: {start}..{end}{}",
            id,
            spec.element,
            if spec.is_scrub() { " (scrub)" } else { "" }
        );
        self.triggers.insert(
            id,
            Registration {
                spec,
                handler,
                start,
                end,
                progress: 0.0,
            },
        );
        Ok(id)
    }

    /// Remove a trigger
    pub fn unregister(&mut self, id: TriggerId) -> bool {
        self.triggers.shift_remove(&id).is_some()
    }

    /// Recompute every trigger's bounds; triggers that no longer resolve are dropped
    pub fn refresh(&mut self, layout: &dyn Layout) {
        self.triggers.retain(|id, registration| match resolve_bounds(&registration.spec, layout) {
            Ok((start, end)) => {
                registration.start = start;
                registration.end = end;
                true
            }
            Err(err) => {
                tracing::debug!("Dropping trigger {:?} on refresh: {err}", id);
                false
            }
        });
    }

    /// Recompute progress for a new offset and dispatch crossings
    pub fn update(&mut self, offset: f32, layout: &dyn Layout) -> &[TriggerEvent] {
        self.frame_events.clear();

        self.triggers.retain(|id, registration| {
            let present = layout.contains(registration.spec.element);
            if !present {
                tracing::debug!("Trigger {:?} element removed, unregistering", id);
            }
            present
        });

        // document order along the scroll direction; nearest trigger fires last
        let backward = self.last_offset.is_some_and(|last| offset < last);
        self.last_offset = Some(offset);
        let mut order: Vec<usize> = (0..self.triggers.len()).collect();
        order.sort_by(|&a, &b| {
            let start = |i: usize| self.triggers.get_index(i).map_or(0.0, |(_, r)| r.start);
            if backward {
                start(b).total_cmp(&start(a))
            } else {
                start(a).total_cmp(&start(b))
            }
        });

        for index in order {
            let Some((id, registration)) = self.triggers.get_index_mut(index) else {
                continue;
            };
            let before = registration.progress;
            let after = progress_at(offset, registration.start, registration.end);
            if after == before {
                continue;
            }
            registration.progress = after;

            let kinds = transitions(before, after, registration.spec.is_scrub());
            for kind in kinds {
                if let Some(handler) = registration.handler.as_mut() {
                    dispatch(handler.as_mut(), *id, kind);
                }
                self.frame_events.push(TriggerEvent { trigger: *id, kind });
            }
        }

        self.pending.extend_from_slice(&self.frame_events);
        &self.frame_events
    }

    /// Drain every event produced since the last call
    pub fn take_events(&mut self) -> Vec<TriggerEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Current progress of a trigger
    pub fn progress(&self, id: TriggerId) -> Option<f32> {
        self.triggers.get(&id).map(|r| r.progress)
    }

    /// Resolved `(start, end)` offsets of a trigger
    pub fn bounds(&self, id: TriggerId) -> Option<(f32, f32)> {
        self.triggers.get(&id).map(|r| (r.start, r.end))
    }

    /// Whether a trigger is registered
    pub fn contains(&self, id: TriggerId) -> bool {
        self.triggers.contains_key(&id)
    }

    /// Number of registered triggers
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Remove every trigger and queued event
    pub fn clear(&mut self) {
        self.triggers.clear();
        self.frame_events.clear();
        self.pending.clear();
        self.last_offset = None;
    }
}

fn resolve_bounds(spec: &TriggerSpec, layout: &dyn Layout) -> Result<(f32, f32), TriggerError> {
    let bounds = layout
        .bounds(spec.element)
        .ok_or(TriggerError::MissingElement(spec.element))?;
    let viewport_height = layout.viewport().height;

    let start = match spec.start {
        TriggerPoint::Anchor(anchor) => anchor.resolve(bounds.top, bounds.height, viewport_height),
        TriggerPoint::Absolute(offset) => offset,
        TriggerPoint::After(_) => return Err(TriggerError::RelativeStart),
    };
    let end = match spec.end {
        TriggerPoint::Anchor(anchor) => anchor.resolve(bounds.top, bounds.height, viewport_height),
        TriggerPoint::Absolute(offset) => offset,
        TriggerPoint::After(distance) => start + distance,
    };

    if !start.is_finite() || !end.is_finite() {
        return Err(TriggerError::NonFinite(spec.element));
    }
    Ok((start, end))
}

/// Clamped progress of `offset` through `[start, end]`
pub fn progress_at(offset: f32, start: f32, end: f32) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return if offset >= start { 1.0 } else { 0.0 };
    }
    ((offset - start) / span).clamp(0.0, 1.0)
}

fn transitions(before: f32, after: f32, scrub: bool) -> Vec<TriggerEventKind> {
    let mut kinds = Vec::with_capacity(3);
    if after > before {
        if before <= 0.0 && after > 0.0 {
            kinds.push(TriggerEventKind::Enter);
        }
        let crossed_end = before < 1.0 && after >= 1.0;
        if scrub || crossed_end {
            kinds.push(TriggerEventKind::Update(after));
        }
        if crossed_end {
            kinds.push(TriggerEventKind::Leave);
        }
    } else {
        if before >= 1.0 && after < 1.0 {
            kinds.push(TriggerEventKind::EnterBack);
        }
        if scrub {
            kinds.push(TriggerEventKind::Update(after));
        }
        if before > 0.0 && after <= 0.0 {
            kinds.push(TriggerEventKind::LeaveBack);
        }
    }
    kinds
}

fn dispatch(handler: &mut dyn TriggerHandler, id: TriggerId, kind: TriggerEventKind) {
    match kind {
        TriggerEventKind::Enter => handler.on_enter(id),
        TriggerEventKind::Leave => handler.on_leave(id),
        TriggerEventKind::EnterBack => handler.on_enter_back(id),
        TriggerEventKind::LeaveBack => handler.on_leave_back(id),
        TriggerEventKind::Update(progress) => handler.on_update(id, progress),
    }
}
