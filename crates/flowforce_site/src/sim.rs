// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless simulation: an in-memory host and a scripted visit of the home
//! page at a fixed frame rate.

use crate::config::SiteConfig;
use crate::pages::elements::OVERLAY;
use crate::pages::{HomePage, PageEnvironment, PageLayout};
use flowforce_motion::Property;
use flowforce_scroll::{
    Backdrop, ContentVisibility, FrameCallbackId, Host, InputEvent, IntroEvent, IntroPhase, Key,
    ListenerId, ListenerKind, ResourceKind, ResourceOutcome, ScrollError, SessionFlags, Surface,
    Viewport,
};
use flowforce_scroll::scene::KEYBOARD_SCROLL_DURATION;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

/// In-memory host recording live registrations and content visibility
pub struct SimHost {
    surface: Option<Surface>,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<u64, ListenerKind>>,
    frames: RefCell<HashSet<u64>>,
    content_visible: Cell<bool>,
}

impl SimHost {
    /// Host with a rendering surface sized for a page layout
    pub fn browser(layout: &PageLayout) -> Self {
        Self::with_surface(Some(layout.surface()))
    }

    /// Host without a rendering surface
    pub fn server() -> Self {
        Self::with_surface(None)
    }

    fn with_surface(surface: Option<Surface>) -> Self {
        Self {
            surface,
            next_id: Cell::new(1),
            listeners: RefCell::new(HashMap::new()),
            frames: RefCell::new(HashSet::new()),
            content_visible: Cell::new(true),
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Live listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Live frame callbacks
    pub fn frame_callback_count(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Whether the page content is shown
    pub fn content_visible(&self) -> bool {
        self.content_visible.get()
    }
}

impl Host for SimHost {
    fn surface(&self) -> Option<Surface> {
        self.surface
    }

    fn add_listener(&self, kind: ListenerKind) -> ListenerId {
        let id = self.next_id();
        self.listeners.borrow_mut().insert(id, kind);
        ListenerId(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(&id.0);
    }

    fn add_frame_callback(&self) -> FrameCallbackId {
        let id = self.next_id();
        self.frames.borrow_mut().insert(id);
        FrameCallbackId(id)
    }

    fn remove_frame_callback(&self, id: FrameCallbackId) {
        self.frames.borrow_mut().remove(&id.0);
    }
}

impl ContentVisibility for SimHost {
    fn set_content_visible(&self, visible: bool) {
        self.content_visible.set(visible);
    }
}

/// Script of a simulated visit
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Route being visited
    pub route: String,
    /// Viewport; `None` simulates a render without a surface
    pub viewport: Option<Viewport>,
    /// Reduced-motion preference
    pub reduced_motion: bool,
    /// The intro already played in this session
    pub returning_visitor: bool,
    /// Simulated time
    pub duration_ms: f64,
    /// Frame interval
    pub frame_ms: f64,
    /// Gap between settled intro resources
    pub resource_interval_ms: f64,
    /// Every intro resource fails to load
    pub failing_resources: bool,
    /// Wheel delta per notch
    pub wheel_delta: f32,
    /// Gap between wheel notches
    pub wheel_interval_ms: f64,
    /// Page with the arrow keys instead of the wheel
    pub keyboard: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            route: "/".to_string(),
            viewport: Some(Viewport::new(1440.0, 900.0)),
            reduced_motion: false,
            returning_visitor: false,
            duration_ms: 20_000.0,
            frame_ms: 16.0,
            resource_interval_ms: 150.0,
            failing_resources: false,
            wheel_delta: 120.0,
            wheel_interval_ms: 100.0,
            keyboard: false,
        }
    }
}

/// Outcome of a simulated visit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Frames run
    pub frames: u64,
    /// The intro ran on this visit
    pub intro_played: bool,
    /// When the intro finished
    pub intro_completed_at: Option<f64>,
    /// Content visible at the end
    pub content_visible: bool,
    /// Final scroll offset
    pub final_offset: f32,
    /// Scroll limit
    pub limit: f32,
    /// `MM:SS` readout at the end
    pub timer: String,
    /// Backdrop at the end
    pub backdrop: Backdrop,
    /// Preloader overlay opacity at the end, while the intro drives it
    pub overlay_opacity: Option<f32>,
    /// Clip strips installed for the hero slat reveal
    pub slat_strips: usize,
    /// Trigger events dispatched
    pub trigger_events: usize,
    /// Snaps started by the horizontal section
    pub snaps: usize,
    /// Host registrations left after unmounting
    pub leaked_registrations: usize,
}

/// Drive the home page through a scripted visit
pub fn run(config: &SiteConfig, options: &SimulationOptions) -> Result<SimulationReport, ScrollError> {
    let host = Rc::new(match options.viewport {
        Some(viewport) => SimHost::browser(&PageLayout::new(viewport)),
        None => SimHost::server(),
    });
    let flags = SessionFlags::in_memory();
    if options.returning_visitor {
        flags.set(config.intro.flag);
    }
    let env = PageEnvironment {
        host: host.clone(),
        visibility: host.clone(),
        flags,
        reduced_motion: options.reduced_motion,
    };
    let mut page = HomePage::mount(config, &options.route, env, 0.0)?;

    let intro_played = page.intro().phase() == IntroPhase::Loading;
    let outcome = if options.failing_resources {
        ResourceOutcome::Failed
    } else {
        ResourceOutcome::Loaded
    };
    let mut resources: VecDeque<ResourceKind> = page.intro().resources().iter().cloned().collect();
    let mut next_resource_at = options.resource_interval_ms;
    let mut next_input_at = (!intro_played).then_some(0.0);
    let input_interval = if options.keyboard {
        f64::from(KEYBOARD_SCROLL_DURATION) * 1000.0
    } else {
        options.wheel_interval_ms
    };

    let mut report = SimulationReport {
        frames: 0,
        intro_played,
        intro_completed_at: None,
        content_visible: false,
        final_offset: 0.0,
        limit: page.scene().engine().limit(),
        timer: String::new(),
        backdrop: Backdrop::default(),
        overlay_opacity: None,
        slat_strips: page.slat_clips().iter().map(|clip| clip.rects.len()).sum(),
        trigger_events: 0,
        snaps: 0,
        leaked_registrations: 0,
    };

    let frame_ms = options.frame_ms.max(1.0);
    let mut now = 0.0;
    while now <= options.duration_ms {
        if now >= next_resource_at {
            if let Some(kind) = resources.pop_front() {
                page.resource_settled(&kind, outcome, now);
                next_resource_at += options.resource_interval_ms;
            }
        }

        if let Some(at) = next_input_at.filter(|at| now >= *at) {
            let state = page.scene().engine().state();
            if state.target_offset < report.limit {
                let input = if options.keyboard {
                    InputEvent::Key(Key::ArrowRight)
                } else {
                    InputEvent::Wheel {
                        delta_x: 0.0,
                        delta_y: options.wheel_delta,
                    }
                };
                page.handle_input(&input, now);
                next_input_at = Some(at + input_interval);
            }
        }

        let frame = page.frame(now);
        if frame.intro == Some(IntroEvent::Completed) {
            tracing::debug!("Intro completed at {now}ms");
            report.intro_completed_at = Some(now);
            next_input_at.get_or_insert(now);
        }
        report.trigger_events += frame.scroll.events.len();
        report.snaps += usize::from(frame.scroll.snapped.is_some());
        report.backdrop = frame.backdrop;
        report.overlay_opacity = frame.overlay.get(OVERLAY, Property::Opacity);
        report.timer = frame.progress.timer_label();
        report.frames += 1;
        now += frame_ms;
    }

    report.final_offset = page.scene().engine().state().virtual_offset;
    report.content_visible = host.content_visible();
    page.teardown();
    report.leaked_registrations = host.listener_count() + host.frame_callback_count();
    tracing::info!(
        "Simulated {} frames, offset {} of {}",
        report.frames,
        report.final_offset,
        report.limit
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowforce_scroll::IntroConfig;

    #[test]
    fn test_host_tracks_registrations() {
        let host = SimHost::browser(&PageLayout::new(Viewport::new(1440.0, 900.0)));
        let wheel = host.add_listener(ListenerKind::Wheel);
        let frame = host.add_frame_callback();
        assert_eq!(host.listener_count(), 1);
        assert_eq!(host.frame_callback_count(), 1);

        host.remove_listener(wheel);
        host.remove_frame_callback(frame);
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.frame_callback_count(), 0);
        assert_eq!(host.surface().map(|s| s.content_height), Some(900.0 + 4.0 * 1440.0));
    }

    #[test]
    fn test_first_visit_plays_intro_then_scrolls_to_the_end() {
        let report = run(&SiteConfig::default(), &SimulationOptions::default()).unwrap();
        assert!(report.intro_played);
        let completed = report.intro_completed_at.unwrap();
        // four resources 150ms apart, 300ms settle, 600ms fade
        assert!((1450.0..=1550.0).contains(&completed));
        assert!(report.content_visible);
        assert_eq!(report.limit, 4.0 * 1440.0);
        assert_eq!(report.final_offset, report.limit);
        assert_eq!(report.timer, "01:40");
        assert_eq!(report.backdrop, Backdrop::Neutral);
        assert_eq!(report.overlay_opacity, Some(0.0));
        assert_eq!(report.slat_strips, 20);
        assert!(report.trigger_events > 0);
        assert_eq!(report.leaked_registrations, 0);
    }

    #[test]
    fn test_returning_visitor_skips_intro() {
        let options = SimulationOptions {
            returning_visitor: true,
            duration_ms: 500.0,
            ..SimulationOptions::default()
        };
        let report = run(&SiteConfig::default(), &options).unwrap();
        assert!(!report.intro_played);
        assert!(report.intro_completed_at.is_none());
        assert!(report.content_visible);
        assert!(report.final_offset > 0.0);
    }

    #[test]
    fn test_fallback_timeout_reveals_content() {
        let options = SimulationOptions {
            resource_interval_ms: 10_000.0,
            duration_ms: 5000.0,
            ..SimulationOptions::default()
        };
        let report = run(&SiteConfig::default(), &options).unwrap();
        let completed = report.intro_completed_at.unwrap();
        // 3000ms fallback plus the fade
        assert!((3550.0..=3700.0).contains(&completed));
        assert!(report.content_visible);
    }

    #[test]
    fn test_failed_resources_still_complete() {
        let options = SimulationOptions {
            failing_resources: true,
            duration_ms: 2000.0,
            ..SimulationOptions::default()
        };
        let report = run(&SiteConfig::default(), &options).unwrap();
        assert!(report.intro_completed_at.is_some_and(|t| t < 1600.0));
    }

    #[test]
    fn test_unusable_intro_timings_still_reveal_content() {
        let mut config = SiteConfig::default();
        config.intro.fallback_timeout_ms = f64::NAN;
        config.intro.settle_delay_ms = f64::NAN;
        let report = run(&config, &SimulationOptions::default()).unwrap();
        assert!(report.intro_completed_at.is_some_and(|t| t < 1600.0));
        assert!(report.content_visible);
        assert_eq!(report.final_offset, report.limit);
    }

    #[test]
    fn test_logo_intro() {
        let config = SiteConfig {
            intro: IntroConfig::logo_intro(),
            ..SiteConfig::default()
        };
        let options = SimulationOptions {
            duration_ms: 5000.0,
            ..SimulationOptions::default()
        };
        let report = run(&config, &options).unwrap();
        let completed = report.intro_completed_at.unwrap();
        assert!((3500.0..=3600.0).contains(&completed));
    }

    #[test]
    fn test_keyboard_paging() {
        let options = SimulationOptions {
            returning_visitor: true,
            keyboard: true,
            ..SimulationOptions::default()
        };
        let report = run(&SiteConfig::default(), &options).unwrap();
        assert_eq!(report.final_offset, report.limit);
        assert_eq!(report.backdrop, Backdrop::Neutral);
    }

    #[test]
    fn test_server_render_is_static() {
        let options = SimulationOptions {
            viewport: None,
            duration_ms: 1000.0,
            ..SimulationOptions::default()
        };
        let report = run(&SiteConfig::default(), &options).unwrap();
        assert!(!report.intro_played);
        assert!(report.content_visible);
        assert_eq!(report.slat_strips, 0);
        assert_eq!(report.final_offset, 0.0);
        assert_eq!(report.limit, 0.0);
        assert_eq!(report.trigger_events, 0);
        assert_eq!(report.leaked_registrations, 0);
    }
}
