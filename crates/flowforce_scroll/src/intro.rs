// SPDX-License-Identifier: MIT OR Apache-2.0
//! One-shot intro and preloader sequencing.
//!
//! The sequencer plays a full-screen intro at most once per session, keyed by
//! a flag in an injected [`SessionStore`]. While it runs the page content is
//! hidden; every exit path (completion, skip, fallback timeout, drop) reveals
//! it again.

use crate::host::{ContentVisibility, Viewport};
use flowforce_motion::{
    ElementId, Easing, PlaybackEvent, Position, Property, StyleFrame, Timeline, TimelinePlayer,
    TweenVars,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Session-scoped key-value storage
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value
    fn set(&self, key: &str, value: &str);
    /// Delete a value
    fn remove(&self, key: &str);
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.write().remove(key);
    }
}

/// One-shot flags kept in the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionFlag {
    /// The preloader finished
    PreloaderCompleted,
    /// The logo intro finished
    IntroAnimationPlayed,
}

impl SessionFlag {
    /// Storage key
    pub fn key(&self) -> &'static str {
        match self {
            SessionFlag::PreloaderCompleted => "preloaderCompleted",
            SessionFlag::IntroAnimationPlayed => "introAnimationPlayed",
        }
    }
}

/// Typed access to session flags
#[derive(Clone)]
pub struct SessionFlags {
    store: Arc<dyn SessionStore>,
}

impl SessionFlags {
    /// Wrap a store
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Flags backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Whether a flag is set
    pub fn is_set(&self, flag: SessionFlag) -> bool {
        self.store.get(flag.key()).as_deref() == Some("true")
    }

    /// Set a flag
    pub fn set(&self, flag: SessionFlag) {
        self.store.set(flag.key(), "true");
    }

    /// Clear a flag (a new session)
    pub fn clear(&self, flag: SessionFlag) {
        self.store.remove(flag.key());
    }
}

/// A resource the intro waits for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Web fonts ready
    Fonts,
    /// A critical image by URL
    Image(String),
}

/// How a resource settled. Both count toward readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOutcome {
    /// Loaded
    Loaded,
    /// Failed to load
    Failed,
}

/// Counter of settled resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceReadiness {
    /// Settled so far
    pub loaded: usize,
    /// Needed before the outro starts
    pub required: usize,
}

impl ResourceReadiness {
    /// Loaded fraction in `[0, 1]`; complete when nothing is required
    pub fn fraction(&self) -> f32 {
        if self.required == 0 {
            return 1.0;
        }
        (self.loaded as f32 / self.required as f32).min(1.0)
    }

    /// Every required resource has settled
    pub fn is_complete(&self) -> bool {
        self.loaded >= self.required
    }
}

/// Closing animation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntroOutro {
    /// Fade the overlay out
    #[default]
    Fade,
    /// Scale the logo in, move it to the header, then fade the overlay
    LogoReveal,
}

/// Intro configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntroError {
    /// A timing field is negative or not a number
    #[error("Invalid intro config: {field} must be finite and non-negative, got {value}")]
    InvalidTiming {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f64,
    },
}

/// Intro configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    /// Only navigations to this route play the intro
    pub entry_route: String,
    /// Images that must settle before the outro
    pub critical_images: Vec<String>,
    /// Also wait for web fonts
    pub wait_for_fonts: bool,
    /// Force the outro this long after the start
    pub fallback_timeout_ms: f64,
    /// Pause between readiness and the outro
    pub settle_delay_ms: f64,
    /// Overlay fade duration in seconds
    pub fade_out: f32,
    /// Flag marking completion
    pub flag: SessionFlag,
    /// Closing animation
    pub outro: IntroOutro,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self::preloader()
    }
}

impl IntroConfig {
    /// Resource-gated preloader
    pub fn preloader() -> Self {
        Self {
            entry_route: "/".to_string(),
            // logo, ocean hero, featured design
            critical_images: vec![
                "/logo.svg".to_string(),
                "https://images.unsplash.com/photo-1695990200724-8bb04efe2eab?w=1920&q=80"
                    .to_string(),
                "https://images.unsplash.com/photo-1505142468610-359e7d316be0?w=1920&q=80"
                    .to_string(),
            ],
            wait_for_fonts: true,
            fallback_timeout_ms: 3000.0,
            settle_delay_ms: 300.0,
            fade_out: 0.6,
            flag: SessionFlag::PreloaderCompleted,
            outro: IntroOutro::Fade,
        }
    }

    /// Logo intro played without waiting for resources
    pub fn logo_intro() -> Self {
        Self {
            critical_images: Vec::new(),
            wait_for_fonts: false,
            settle_delay_ms: 0.0,
            flag: SessionFlag::IntroAnimationPlayed,
            outro: IntroOutro::LogoReveal,
            ..Self::preloader()
        }
    }

    /// Reject timings that could keep the overlay up forever
    pub fn validate(&self) -> Result<(), IntroError> {
        for (field, value) in self.timings() {
            if !value.is_finite() || value < 0.0 {
                return Err(IntroError::InvalidTiming { field, value });
            }
        }
        Ok(())
    }

    fn timings(&self) -> [(&'static str, f64); 3] {
        [
            ("fallback_timeout_ms", self.fallback_timeout_ms),
            ("settle_delay_ms", self.settle_delay_ms),
            ("fade_out", f64::from(self.fade_out)),
        ]
    }

    /// Replace unusable timings with the preloader defaults
    fn sanitized(mut self) -> Self {
        if let Err(err) = self.validate() {
            tracing::warn!("{err}, using defaults for bad timings");
            let defaults = Self::preloader();
            let usable = |v: f64| v.is_finite() && v >= 0.0;
            if !usable(self.fallback_timeout_ms) {
                self.fallback_timeout_ms = defaults.fallback_timeout_ms;
            }
            if !usable(self.settle_delay_ms) {
                self.settle_delay_ms = defaults.settle_delay_ms;
            }
            if !usable(f64::from(self.fade_out)) {
                self.fade_out = defaults.fade_out;
            }
        }
        self
    }

    /// Resources to wait for, in a fixed order
    pub fn resources(&self) -> Vec<ResourceKind> {
        let fonts = self.wait_for_fonts.then_some(ResourceKind::Fonts);
        fonts
            .into_iter()
            .chain(self.critical_images.iter().cloned().map(ResourceKind::Image))
            .collect()
    }
}

/// Elements the intro animates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroElements {
    /// Full-screen overlay
    pub overlay: ElementId,
    /// Page content wrapper
    pub content: ElementId,
    /// Logo, required for [`IntroOutro::LogoReveal`]
    pub logo: Option<ElementId>,
}

/// Sequencer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroPhase {
    /// Not started
    Idle,
    /// Decided not to play
    Skipped,
    /// Waiting for resources
    Loading,
    /// Outro timeline running
    FadingOut,
    /// Finished; flag set and content revealed
    Complete,
}

/// Progress notifications
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntroEvent {
    /// Readiness changed
    Progress(f32),
    /// Outro started; `forced` when the fallback timeout fired
    FadeStarted {
        /// Fallback timeout forced the outro
        forced: bool,
    },
    /// Sequence finished
    Completed,
}

/// Single-flight intro sequencer
pub struct IntroSequencer {
    config: IntroConfig,
    flags: SessionFlags,
    visibility: Rc<dyn ContentVisibility>,
    elements: IntroElements,
    viewport: Option<Viewport>,
    phase: IntroPhase,
    outstanding: Vec<ResourceKind>,
    readiness: ResourceReadiness,
    started_at: f64,
    ready_at: Option<f64>,
    outro: Timeline,
    player: TimelinePlayer,
    last_time: f64,
}

impl IntroSequencer {
    /// Create an idle sequencer
    pub fn new(
        config: IntroConfig,
        flags: SessionFlags,
        visibility: Rc<dyn ContentVisibility>,
        elements: IntroElements,
    ) -> Self {
        Self {
            config: config.sanitized(),
            flags,
            visibility,
            elements,
            viewport: None,
            phase: IntroPhase::Idle,
            outstanding: Vec::new(),
            readiness: ResourceReadiness::default(),
            started_at: 0.0,
            ready_at: None,
            outro: Timeline::new("intro-outro"),
            player: TimelinePlayer::new(),
            last_time: 0.0,
        }
    }

    /// Viewport used to place the logo in the header
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// True iff the flag is unset and `route` is the entry route. When it
    /// returns false the content is made visible.
    pub fn should_play(&self, route: &str) -> bool {
        let play = !self.flags.is_set(self.config.flag) && route == self.config.entry_route;
        if !play {
            self.visibility.set_content_visible(true);
        }
        play
    }

    /// Start the sequence. Hides content and begins counting resources.
    /// Returns false when skipped or already started.
    pub fn run(&mut self, route: &str, now_ms: f64) -> bool {
        if self.phase != IntroPhase::Idle {
            return false;
        }
        if !self.should_play(route) {
            tracing::debug!("Intro skipped for route {route}");
            self.phase = IntroPhase::Skipped;
            return false;
        }

        self.visibility.set_content_visible(false);
        self.outstanding = self.config.resources();
        self.readiness = ResourceReadiness {
            loaded: 0,
            required: self.outstanding.len(),
        };
        self.started_at = now_ms;
        self.last_time = now_ms;
        self.ready_at = self.readiness.is_complete().then_some(now_ms);
        self.outro = self.build_outro();
        self.phase = IntroPhase::Loading;
        tracing::debug!(
            "Intro started, waiting for {} resources",
            self.readiness.required
        );
        true
    }

    /// Resources still outstanding
    pub fn resources(&self) -> &[ResourceKind] {
        &self.outstanding
    }

    /// Account for a settled resource. Failures count the same as loads.
    pub fn resource_settled(
        &mut self,
        kind: &ResourceKind,
        outcome: ResourceOutcome,
        now_ms: f64,
    ) -> Option<IntroEvent> {
        if self.phase != IntroPhase::Loading {
            return None;
        }
        let index = self.outstanding.iter().position(|k| k == kind)?;
        self.outstanding.remove(index);
        if outcome == ResourceOutcome::Failed {
            tracing::debug!("Intro resource {kind:?} failed, counting it as settled");
        }
        self.readiness.loaded += 1;
        if self.readiness.is_complete() && self.ready_at.is_none() {
            self.ready_at = Some(now_ms);
        }
        Some(IntroEvent::Progress(self.readiness.fraction()))
    }

    /// Advance timers and the outro
    pub fn tick(&mut self, now_ms: f64) -> Option<IntroEvent> {
        match self.phase {
            IntroPhase::Loading => {
                let fallback_at = self.started_at + self.config.fallback_timeout_ms;
                let settled_at = self.ready_at.map(|t| t + self.config.settle_delay_ms);
                match settled_at {
                    Some(at) if at <= fallback_at && now_ms >= at => Some(self.start_outro(at, false, now_ms)),
                    _ if now_ms >= fallback_at => {
                        tracing::warn!(
                            "Intro fallback timeout with {} of {} resources settled",
                            self.readiness.loaded,
                            self.readiness.required
                        );
                        Some(self.start_outro(fallback_at, true, now_ms))
                    }
                    _ => None,
                }
            }
            IntroPhase::FadingOut => self.advance_outro(now_ms),
            _ => None,
        }
    }

    fn start_outro(&mut self, at: f64, forced: bool, now_ms: f64) -> IntroEvent {
        self.phase = IntroPhase::FadingOut;
        self.last_time = at;
        self.player.restart();
        // time already elapsed since the outro was due
        if let Some(IntroEvent::Completed) = self.advance_outro(now_ms) {
            return IntroEvent::Completed;
        }
        IntroEvent::FadeStarted { forced }
    }

    fn advance_outro(&mut self, now_ms: f64) -> Option<IntroEvent> {
        if now_ms <= self.last_time && self.player.time < self.outro.duration() {
            return None;
        }
        let delta = ((now_ms - self.last_time).max(0.0) / 1000.0) as f32;
        self.last_time = self.last_time.max(now_ms);
        if self.player.update(delta, &self.outro) == Some(PlaybackEvent::Completed) {
            self.complete();
            return Some(IntroEvent::Completed);
        }
        None
    }

    fn complete(&mut self) {
        self.flags.set(self.config.flag);
        self.visibility.set_content_visible(true);
        self.phase = IntroPhase::Complete;
        self.outstanding.clear();
        tracing::debug!("Intro complete");
    }

    fn build_outro(&self) -> Timeline {
        if self.config.outro == IntroOutro::LogoReveal {
            match (self.elements.logo, self.viewport) {
                (Some(logo), Some(viewport)) => {
                    return logo_intro_timeline(viewport, logo, self.elements.overlay, self.elements.content);
                }
                _ => tracing::debug!("Logo reveal needs a logo and a viewport, fading instead"),
            }
        }
        let mut timeline = Timeline::new("intro-fade");
        timeline.to(
            &[self.elements.overlay],
            TweenVars::new(self.config.fade_out)
                .prop(Property::Opacity, 0.0)
                .ease(Easing::Power2Out),
            Position::Append,
        );
        timeline
    }

    /// Overlay styles for the current phase
    pub fn overlay_frame(&self) -> StyleFrame {
        match self.phase {
            IntroPhase::Loading => {
                let mut frame = StyleFrame::new();
                frame.set(self.elements.overlay, Property::Opacity, 1.0);
                frame
            }
            IntroPhase::FadingOut | IntroPhase::Complete => self.player.frame(&self.outro),
            IntroPhase::Idle | IntroPhase::Skipped => StyleFrame::new(),
        }
    }

    /// Latest time at which content is visible, once running
    pub fn deadline(&self) -> Option<f64> {
        match self.phase {
            IntroPhase::Loading | IntroPhase::FadingOut => Some(
                self.started_at
                    + self.config.fallback_timeout_ms
                    + f64::from(self.outro.duration()) * 1000.0,
            ),
            _ => None,
        }
    }

    /// Current phase
    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    /// Current readiness counter
    pub fn readiness(&self) -> ResourceReadiness {
        self.readiness
    }
}

impl Drop for IntroSequencer {
    fn drop(&mut self) {
        if matches!(self.phase, IntroPhase::Loading | IntroPhase::FadingOut) {
            tracing::debug!("Intro dropped mid-flight, revealing content");
            self.visibility.set_content_visible(true);
        }
    }
}

/// Logo intro: the logo scales in, holds, moves to the header corner, then
/// the overlay fades and the content fades in
pub fn logo_intro_timeline(
    viewport: Viewport,
    logo: ElementId,
    overlay: ElementId,
    content: ElementId,
) -> Timeline {
    let mut timeline = Timeline::new("logo-intro");
    timeline
        .from(
            &[logo],
            TweenVars::new(1.0)
                .prop(Property::Scale, 0.0)
                .prop(Property::Opacity, 0.0)
                .ease(Easing::back_out()),
            Position::Append,
        )
        .hold(0.5)
        .to(
            &[logo],
            TweenVars::new(1.0)
                .prop(Property::Scale, 0.3)
                .prop(Property::X, -viewport.width / 2.0 + 100.0)
                .prop(Property::Y, -viewport.height / 2.0 + 50.0)
                .ease(Easing::Power2InOut),
            Position::Append,
        )
        .to(
            &[overlay],
            TweenVars::new(0.5)
                .prop(Property::Opacity, 0.0)
                .ease(Easing::Power2Out),
            Position::Append,
        )
        .from(
            &[content],
            TweenVars::new(0.8)
                .prop(Property::Opacity, 0.0)
                .ease(Easing::Power2Out),
            Position::Offset(-0.3),
        );
    timeline
}
