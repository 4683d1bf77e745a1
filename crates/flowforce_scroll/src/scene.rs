// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-frame orchestration of the scroll subsystems.
//!
//! One [`ScrollScene::frame`] call runs, in order: resize refresh, engine
//! tick, trigger update, timeline bindings, pin frame and snap. Triggers and
//! bindings therefore always see the offset produced in the same frame.

use crate::engine::{ScrollEngine, ScrollEvent, ScrollToOptions};
use crate::host::{Host, InputEvent, Key, Layout, ListenerKind, Subscriptions};
use crate::pin::{HorizontalPin, PinFrame, PinSnap, SnapTarget};
use crate::trigger::{
    ScrollTriggers, TriggerError, TriggerEvent, TriggerEventKind, TriggerHandler, TriggerId,
    TriggerSpec,
};
use flowforce_motion::{ElementId, ResizeDebounce, StyleFrame, Timeline, TimelinePlayer};
use std::rc::Rc;

/// Viewports narrower than this get no arrow-key navigation
pub const KEYBOARD_MIN_WIDTH: f32 = 768.0;

/// Duration of one arrow-key page jump
pub const KEYBOARD_SCROLL_DURATION: f32 = 1.2;

/// How a timeline follows its trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Playhead is a pure function of trigger progress
    Scrub,
    /// Plays on enter, reverses on leave-back
    Toggle,
}

struct Binding {
    trigger: TriggerId,
    timeline: Timeline,
    mode: BindingMode,
    player: TimelinePlayer,
}

impl Binding {
    fn apply(&mut self, events: &[TriggerEvent], progress: f32, delta: f32) -> StyleFrame {
        match self.mode {
            BindingMode::Scrub => self.timeline.sample_progress(progress),
            BindingMode::Toggle => {
                for event in events.iter().filter(|e| e.trigger == self.trigger) {
                    match event.kind {
                        TriggerEventKind::Enter | TriggerEventKind::EnterBack => self.player.play(),
                        TriggerEventKind::LeaveBack => self.player.reverse(),
                        TriggerEventKind::Leave | TriggerEventKind::Update(_) => {}
                    }
                }
                self.player.update(delta, &self.timeline);
                self.player.frame(&self.timeline)
            }
        }
    }
}

/// Everything produced by one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Engine scroll event, when the offset moved
    pub scroll: Option<ScrollEvent>,
    /// Trigger events in dispatch order
    pub events: Vec<TriggerEvent>,
    /// Styles from every bound timeline
    pub styles: StyleFrame,
    /// Horizontal pin state
    pub pin: Option<PinFrame>,
    /// Snap started this frame
    pub snapped: Option<SnapTarget>,
}

/// Owns the engine, the trigger registry and everything bound to them
pub struct ScrollScene {
    engine: ScrollEngine,
    triggers: ScrollTriggers,
    bindings: Vec<Binding>,
    pin: Option<HorizontalPin>,
    snap: Option<PinSnap>,
    resize: ResizeDebounce,
    subscriptions: Subscriptions,
    keyboard_enabled: bool,
    last_frame: Option<f64>,
}

impl ScrollScene {
    /// Build a scene around an initialized engine
    pub fn new(engine: ScrollEngine, host: Rc<dyn Host>) -> Self {
        let mut subscriptions = Subscriptions::new(host);
        if engine.is_active() {
            subscriptions.listen(ListenerKind::Keydown);
        }
        let keyboard_enabled = engine.viewport().width >= KEYBOARD_MIN_WIDTH;
        Self {
            engine,
            triggers: ScrollTriggers::new(),
            bindings: Vec::new(),
            pin: None,
            snap: None,
            resize: ResizeDebounce::default(),
            subscriptions,
            keyboard_enabled,
            last_frame: None,
        }
    }

    /// Bind a timeline whose playhead tracks trigger progress
    pub fn bind_scrub(
        &mut self,
        spec: TriggerSpec,
        timeline: Timeline,
        layout: &dyn Layout,
    ) -> Result<TriggerId, TriggerError> {
        let spec = spec.with_scrub(spec.scrub.unwrap_or(1.0));
        self.bind(spec, timeline, BindingMode::Scrub, layout)
    }

    /// Bind a timeline played on enter and reversed on leave-back
    pub fn bind_toggle(
        &mut self,
        spec: TriggerSpec,
        timeline: Timeline,
        layout: &dyn Layout,
    ) -> Result<TriggerId, TriggerError> {
        let spec = TriggerSpec { scrub: None, ..spec };
        self.bind(spec, timeline, BindingMode::Toggle, layout)
    }

    fn bind(
        &mut self,
        spec: TriggerSpec,
        timeline: Timeline,
        mode: BindingMode,
        layout: &dyn Layout,
    ) -> Result<TriggerId, TriggerError> {
        let trigger = self.triggers.register(spec, None, layout)?;
        self.bindings.push(Binding {
            trigger,
            timeline,
            mode,
            player: TimelinePlayer::new(),
        });
        Ok(trigger)
    }

    /// Register a trigger with its own callbacks
    pub fn add_trigger(
        &mut self,
        spec: TriggerSpec,
        handler: Box<dyn TriggerHandler>,
        layout: &dyn Layout,
    ) -> Result<TriggerId, TriggerError> {
        self.triggers.register(spec, Some(handler), layout)
    }

    /// Set up the pinned horizontal section and its snap. Returns false when
    /// the section cannot be pinned.
    pub fn setup_horizontal(
        &mut self,
        section: ElementId,
        panels: &[ElementId],
        layout: &dyn Layout,
    ) -> bool {
        if let Some(old) = self.pin.take() {
            old.teardown(&mut self.triggers);
        }
        self.pin = HorizontalPin::setup(section, panels, layout, &mut self.triggers);
        self.snap = self
            .pin
            .as_ref()
            .and_then(|pin| PinSnap::new(pin.panel_count()));
        self.pin.is_some()
    }

    /// Route native input. Returns true when it was consumed.
    pub fn handle_input(&mut self, event: &InputEvent, now_ms: f64) -> bool {
        match event {
            InputEvent::Key(key) => self.handle_key(*key),
            InputEvent::Resize(surface) => {
                self.engine.handle_input(event);
                self.keyboard_enabled = surface.viewport.width >= KEYBOARD_MIN_WIDTH;
                self.resize.notify(now_ms);
                false
            }
            InputEvent::Wheel { .. } | InputEvent::Touch { .. } => {
                let consumed = self.engine.handle_input(event);
                if consumed {
                    if let Some(snap) = self.snap.as_mut() {
                        snap.notify_input(now_ms);
                    }
                }
                consumed
            }
        }
    }

    fn handle_key(&mut self, key: Key) -> bool {
        if !self.keyboard_enabled || !self.engine.is_active() {
            return false;
        }
        let page = self.engine.viewport().height;
        let offset = self.engine.state().virtual_offset;
        let target = match key {
            Key::ArrowRight => offset + page,
            Key::ArrowLeft => offset - page,
            _ => return false,
        };
        self.engine
            .scroll_to(target, ScrollToOptions::with_duration(KEYBOARD_SCROLL_DURATION));
        true
    }

    /// Run one frame
    pub fn frame(&mut self, now_ms: f64, layout: &dyn Layout) -> FrameReport {
        let delta = self
            .last_frame
            .map(|last| ((now_ms - last).max(0.0) / 1000.0) as f32)
            .unwrap_or(0.0);
        self.last_frame = Some(self.last_frame.map_or(now_ms, |last| last.max(now_ms)));

        if self.resize.poll(now_ms) {
            self.refresh(layout);
        }

        let scroll = self.engine.tick(now_ms);
        let offset = self.engine.state().virtual_offset;

        self.triggers.update(offset, layout);
        let events = self.triggers.take_events();

        let triggers = &self.triggers;
        self.bindings.retain(|b| triggers.contains(b.trigger));
        let mut styles = StyleFrame::new();
        for binding in &mut self.bindings {
            let progress = triggers.progress(binding.trigger).unwrap_or_default();
            styles.merge(binding.apply(&events, progress, delta));
        }

        let pin = self.pin.as_ref().map(|pin| pin.update(offset, &self.triggers));

        let mut snapped = None;
        if let (Some(snap), Some(pin), Some(frame)) =
            (self.snap.as_mut(), self.pin.as_ref(), pin.as_ref())
        {
            if let Some(target) = snap.poll(now_ms, frame, pin, self.engine.state().is_animating) {
                self.engine.scroll_to(
                    target.offset,
                    ScrollToOptions {
                        duration: Some(target.duration),
                        easing: Some(target.easing),
                        immediate: false,
                    },
                );
                snapped = Some(target);
            }
        }

        FrameReport {
            scroll,
            events,
            styles,
            pin,
            snapped,
        }
    }

    /// Recompute trigger bounds and pin measurements
    pub fn refresh(&mut self, layout: &dyn Layout) {
        self.triggers.refresh(layout);
        if let Some(pin) = self.pin.as_mut() {
            if !pin.refresh(layout, &mut self.triggers) {
                self.pin = None;
                self.snap = None;
            }
        }
        tracing::debug!("Scroll scene refreshed: {} triggers", self.triggers.len());
    }

    /// Release every registration and stop the engine
    pub fn teardown(&mut self) {
        self.engine.destroy();
        self.triggers.clear();
        self.bindings.clear();
        self.pin = None;
        self.snap = None;
        self.subscriptions.release();
    }

    /// The engine
    pub fn engine(&self) -> &ScrollEngine {
        &self.engine
    }

    /// The engine, mutably
    pub fn engine_mut(&mut self) -> &mut ScrollEngine {
        &mut self.engine
    }

    /// The trigger registry
    pub fn triggers(&self) -> &ScrollTriggers {
        &self.triggers
    }

    /// The trigger registry, mutably
    pub fn triggers_mut(&mut self) -> &mut ScrollTriggers {
        &mut self.triggers
    }

    /// The horizontal pin, if set up
    pub fn pin(&self) -> Option<&HorizontalPin> {
        self.pin.as_ref()
    }

    /// Whether arrow keys scroll the page
    pub fn keyboard_enabled(&self) -> bool {
        self.keyboard_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScrollConfig;
    use crate::host::{Bounds, Surface, Viewport};
    use crate::test_support::{RecordingHost, TestLayout};
    use flowforce_motion::{presets, Property, RevealParams, TriggerAnchor};

    const HERO: ElementId = ElementId(1);
    const CARD: ElementId = ElementId(2);
    const SECTION: ElementId = ElementId(10);

    fn scene(host: &Rc<RecordingHost>) -> ScrollScene {
        let engine = ScrollEngine::initialize(ScrollConfig::default(), host.clone()).unwrap();
        ScrollScene::new(engine, host.clone())
    }

    fn layout() -> TestLayout {
        TestLayout::new(1440.0, 900.0)
            .with(HERO, Bounds::new(0.0, 1000.0, 1440.0, 900.0))
            .with(CARD, Bounds::new(0.0, 2000.0, 600.0, 400.0))
    }

    #[test]
    fn test_scrub_binding_is_pure_function_of_offset() {
        let host = Rc::new(RecordingHost::browser(1440.0, 900.0, 6000.0));
        let mut scene = scene(&host);
        let layout = layout();
        let fade = presets::fade_in(&[HERO], &RevealParams::default());
        scene.bind_scrub(TriggerSpec::between(HERO, 0.0, 1000.0), fade, &layout).unwrap();

        scene.engine_mut().scroll_to(500.0, ScrollToOptions::immediate());
        let forward = scene.frame(0.0, &layout);
        let half = forward.styles.get(HERO, Property::Opacity).unwrap();
        assert!(half > 0.0 && half < 1.0);

        scene.engine_mut().scroll_to(1000.0, ScrollToOptions::immediate());
        scene.frame(16.0, &layout);
        scene.engine_mut().scroll_to(500.0, ScrollToOptions::immediate());
        let back = scene.frame(32.0, &layout);
        assert_eq!(back.styles.get(HERO, Property::Opacity), Some(half));
    }

    #[test]
    fn test_toggle_binding_plays_and_reverses() {
        let host = Rc::new(RecordingHost::browser(1440.0, 900.0, 6000.0));
        let mut scene = scene(&host);
        let layout = layout();
        let reveal = presets::slide_up(&[CARD], 50.0, &RevealParams::default());
        scene.bind_toggle(TriggerSpec::between(CARD, 100.0, 2000.0), reveal, &layout).unwrap();

        let idle = scene.frame(0.0, &layout);
        assert_eq!(idle.styles.get(CARD, Property::Opacity), Some(0.0));

        scene.engine_mut().scroll_to(500.0, ScrollToOptions::immediate());
        let entered = scene.frame(16.0, &layout);
        assert!(entered.events.iter().any(|e| e.kind == TriggerEventKind::Enter));
        let shown = scene.frame(2000.0, &layout);
        assert_eq!(shown.styles.get(CARD, Property::Opacity), Some(1.0));

        scene.engine_mut().scroll_to(0.0, ScrollToOptions::immediate());
        let left = scene.frame(2016.0, &layout);
        assert!(left.events.iter().any(|e| e.kind == TriggerEventKind::LeaveBack));
        let hidden = scene.frame(4000.0, &layout);
        assert_eq!(hidden.styles.get(CARD, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_arrow_keys_page_through() {
        let host = Rc::new(RecordingHost::browser(1440.0, 900.0, 6000.0));
        let mut scene = scene(&host);
        assert!(host.has_listener(ListenerKind::Keydown));

        assert!(scene.handle_input(&InputEvent::Key(Key::ArrowRight), 0.0));
        assert_eq!(scene.engine().state().target_offset, 900.0);
        assert!(!scene.handle_input(&InputEvent::Key(Key::Other), 0.0));

        let layout = layout();
        scene.frame(0.0, &layout);
        scene.frame(1300.0, &layout);
        assert_eq!(scene.engine().state().virtual_offset, 900.0);

        assert!(scene.handle_input(&InputEvent::Key(Key::ArrowLeft), 1300.0));
        assert_eq!(scene.engine().state().target_offset, 0.0);
    }

    #[test]
    fn test_keyboard_disabled_on_narrow_viewports() {
        let host = Rc::new(RecordingHost::browser(700.0, 900.0, 6000.0));
        let mut scene = scene(&host);
        assert!(!scene.keyboard_enabled());
        assert!(!scene.handle_input(&InputEvent::Key(Key::ArrowRight), 0.0));
        assert_eq!(scene.engine().state().target_offset, 0.0);
    }

    #[test]
    fn test_horizontal_pin_snaps_after_scrubbing_stops() {
        let host = Rc::new(RecordingHost::browser(1440.0, 900.0, 10_000.0));
        let mut scene = scene(&host);
        let mut layout =
            TestLayout::new(1440.0, 900.0).with(SECTION, Bounds::new(0.0, 1000.0, 1440.0, 900.0));
        for i in 0..3 {
            layout = layout.with(
                ElementId(100 + i),
                Bounds::new(i as f32 * 1440.0, 1000.0, 1440.0, 900.0),
            );
        }
        let panels: Vec<_> = (0..3).map(|i| ElementId(100 + i)).collect();
        assert!(scene.setup_horizontal(SECTION, &panels, &layout));

        // scroll 40% into the pinned range
        let target_delta = 1000.0 + 0.4 * 2880.0;
        scene.frame(0.0, &layout);
        scene.handle_input(
            &InputEvent::Wheel {
                delta_x: 0.0,
                delta_y: target_delta,
            },
            0.0,
        );

        let mut snapped = None;
        let mut now = 0.0;
        while now < 4000.0 && snapped.is_none() {
            now += 16.0;
            let report = scene.frame(now, &layout);
            if report.snapped.is_some() {
                assert_eq!(report.pin.map(|p| p.phase), Some(crate::pin::PinPhase::Pinned));
            }
            snapped = report.snapped;
        }
        let snap = snapped.unwrap();
        assert!((snap.offset - (1000.0 + 0.5 * 2880.0)).abs() < 1.0);

        while now < 6000.0 {
            now += 16.0;
            let report = scene.frame(now, &layout);
            assert!(report.snapped.is_none());
        }
        let pin = scene.frame(now + 16.0, &layout).pin.unwrap();
        assert!((pin.progress - 0.5).abs() < 1e-3);
        assert!((pin.x_percent + 100.0).abs() < 0.5);
    }

    #[test]
    fn test_resize_refresh_is_debounced() {
        let host = Rc::new(RecordingHost::browser(1440.0, 900.0, 6000.0));
        let mut scene = scene(&host);
        let mut layout = layout();
        let id = scene
            .bind_scrub(
                TriggerSpec::new(HERO, TriggerAnchor::TOP_TOP, TriggerAnchor::BOTTOM_TOP),
                Timeline::new("hero"),
                &layout,
            )
            .unwrap();
        assert_eq!(scene.triggers().bounds(id), Some((1000.0, 1900.0)));

        layout.elements.insert(HERO, Bounds::new(0.0, 1500.0, 1440.0, 900.0));
        let surface = Surface {
            viewport: Viewport::new(1440.0, 900.0),
            content_width: 1440.0,
            content_height: 6500.0,
        };
        scene.handle_input(&InputEvent::Resize(surface), 0.0);
        scene.frame(100.0, &layout);
        assert_eq!(scene.triggers().bounds(id), Some((1000.0, 1900.0)));
        scene.frame(300.0, &layout);
        assert_eq!(scene.triggers().bounds(id), Some((1500.0, 2400.0)));
        assert_eq!(scene.engine().limit(), 5600.0);
    }

    #[test]
    fn test_teardown_releases_all_listeners() {
        let host = Rc::new(RecordingHost::browser(1440.0, 900.0, 6000.0));
        let mut scene = scene(&host);
        let layout = layout();
        scene
            .bind_scrub(TriggerSpec::between(HERO, 0.0, 100.0), Timeline::new("x"), &layout)
            .unwrap();
        assert_eq!(host.listener_count(), 4);

        scene.teardown();
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.frame_callback_count(), 0);
        assert!(scene.triggers().is_empty());
        assert!(scene.frame(16.0, &layout).scroll.is_none());
    }

    #[test]
    fn test_server_scene_is_inert() {
        let host = Rc::new(RecordingHost::server());
        let mut scene = scene(&host);
        assert_eq!(host.listener_count(), 0);
        assert!(!scene.handle_input(&InputEvent::Key(Key::ArrowRight), 0.0));
        let report = scene.frame(16.0, &TestLayout::new(0.0, 0.0));
        assert!(report.scroll.is_none());
        assert!(report.events.is_empty());
    }
}
