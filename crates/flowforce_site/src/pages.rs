// SPDX-License-Identifier: MIT OR Apache-2.0
//! Home page composition.
//!
//! The home page is one pinned horizontal section holding five full-width
//! panels. While pinned, vertical scroll distance is converted into
//! horizontal travel, so panel `i` is fully in view at offset `i * width`.
//! [`PageLayout`] reports every element in that scroll space.

use crate::config::SiteConfig;
use flowforce_motion::slat::SlatClip;
use flowforce_motion::{
    presets, responsive, ElementId, Environment, Position, Property, ResponsiveAnimationConfig,
    RevealParams, SlatOptions, SlatReveal, SlatTarget, Stagger, StyleFrame, Timeline,
    TriggerAnchor, TriggerPreset, TweenVars,
};
use flowforce_scroll::{
    Backdrop, BackdropSwitcher, Bounds, ContentVisibility, FrameReport, Host, InputEvent,
    IntroElements, IntroEvent, IntroSequencer, Layout, ResourceKind, ResourceOutcome, ScrollEngine,
    ScrollError, ScrollIndicator, ScrollProgress, ScrollScene, SessionFlags, Surface, TriggerError,
    TriggerId, TriggerSpec, Viewport,
};
use std::rc::Rc;

/// Element handles shared with the renderer
pub mod elements {
    use flowforce_motion::ElementId;

    /// Preloader overlay
    pub const OVERLAY: ElementId = ElementId(1);
    /// Page content wrapper
    pub const CONTENT: ElementId = ElementId(2);
    /// Header logo
    pub const LOGO: ElementId = ElementId(3);
    /// Pinned wrapper around the panels
    pub const HORIZONTAL_SECTION: ElementId = ElementId(10);

    /// Hero panel
    pub const HERO: ElementId = ElementId(20);
    /// Mission panel
    pub const MISSION: ElementId = ElementId(21);
    /// Services panel
    pub const SERVICES: ElementId = ElementId(22);
    /// Featured work panel
    pub const FEATURED_WORK: ElementId = ElementId(23);
    /// Footer panel
    pub const FOOTER: ElementId = ElementId(24);
    /// Panels in scroll order
    pub const PANELS: [ElementId; 5] = [HERO, MISSION, SERVICES, FEATURED_WORK, FOOTER];

    /// Hero headline block
    pub const HERO_HEADLINE: ElementId = ElementId(30);
    /// Hero photograph, revealed through slats
    pub const HERO_IMAGE: ElementId = ElementId(31);
    /// Hero background layer
    pub const HERO_BACKGROUND: ElementId = ElementId(32);
    /// Mission statement
    pub const MISSION_TEXT: ElementId = ElementId(40);
    /// Service cards
    pub const SERVICE_CARDS: [ElementId; 3] = [ElementId(50), ElementId(51), ElementId(52)];
    /// Featured work heading
    pub const WORK_TITLE: ElementId = ElementId(60);
    /// Laptop mockup
    pub const LAPTOP_MOCKUP: ElementId = ElementId(61);
    /// Footer contents
    pub const FOOTER_CONTENT: ElementId = ElementId(70);
}

use elements::*;

/// Backdrop shown while each panel crosses the viewport center
pub const BACKDROPS: [(ElementId, Backdrop); 5] = [
    (HERO, Backdrop::Floral),
    (MISSION, Backdrop::Floral),
    (SERVICES, Backdrop::Concrete),
    (FEATURED_WORK, Backdrop::Neutral),
    (FOOTER, Backdrop::Neutral),
];

/// Home page geometry for a viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    viewport: Viewport,
}

impl PageLayout {
    /// Layout for a viewport
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// Apply a new viewport
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Scrollable height: one screen plus the horizontal travel
    pub fn content_height(&self) -> f32 {
        self.viewport.height + (PANELS.len() - 1) as f32 * self.viewport.width
    }

    /// Surface measurements for this layout
    pub fn surface(&self) -> Surface {
        Surface {
            viewport: self.viewport,
            content_width: self.viewport.width,
            content_height: self.content_height(),
        }
    }

    fn panel(&self, index: usize) -> Bounds {
        let Viewport { width, height } = self.viewport;
        let at = index as f32 * width;
        Bounds::new(at, at, width, height)
    }

    /// Box inside panel `index`, in fractions of the viewport
    fn inside(&self, index: usize, x: f32, y: f32, width: f32, height: f32) -> Bounds {
        let panel = self.panel(index);
        let Viewport {
            width: vw,
            height: vh,
        } = self.viewport;
        Bounds::new(panel.left + x * vw, panel.top + y * vh, width * vw, height * vh)
    }
}

impl Layout for PageLayout {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn bounds(&self, element: ElementId) -> Option<Bounds> {
        if let Some(index) = PANELS.iter().position(|p| *p == element) {
            return Some(self.panel(index));
        }
        if let Some(index) = SERVICE_CARDS.iter().position(|c| *c == element) {
            return Some(self.inside(2, 0.08 + 0.3 * index as f32, 0.3, 0.26, 0.45));
        }
        let bounds = match element {
            OVERLAY => Bounds::new(0.0, 0.0, self.viewport.width, self.viewport.height),
            CONTENT => Bounds::new(0.0, 0.0, self.viewport.width, self.content_height()),
            LOGO => self.inside(0, 0.45, 0.45, 0.1, 0.1),
            HORIZONTAL_SECTION => self.panel(0),
            HERO_HEADLINE => self.inside(0, 0.08, 0.3, 0.45, 0.3),
            HERO_IMAGE => self.inside(0, 0.55, 0.15, 0.38, 0.7),
            HERO_BACKGROUND => self.panel(0),
            MISSION_TEXT => self.inside(1, 0.15, 0.2, 0.7, 0.5),
            WORK_TITLE => self.inside(3, 0.08, 0.1, 0.5, 0.15),
            LAPTOP_MOCKUP => self.inside(3, 0.3, 0.35, 0.6, 0.55),
            FOOTER_CONTENT => self.inside(4, 0.08, 0.2, 0.84, 0.6),
            _ => return None,
        };
        Some(bounds)
    }
}

/// What the page needs from its embedding
#[derive(Clone)]
pub struct PageEnvironment {
    /// Listener and frame scheduling
    pub host: Rc<dyn Host>,
    /// Content wrapper switch
    pub visibility: Rc<dyn ContentVisibility>,
    /// Session flags
    pub flags: SessionFlags,
    /// Reduced-motion preference
    pub reduced_motion: bool,
}

/// Everything the page produced in one frame
#[derive(Debug, Clone)]
pub struct PageFrame {
    /// Scroll scene output
    pub scroll: FrameReport,
    /// Intro notification
    pub intro: Option<IntroEvent>,
    /// Overlay styles from the intro
    pub overlay: StyleFrame,
    /// Backdrop currently shown
    pub backdrop: Backdrop,
    /// Page progress readout
    pub progress: ScrollProgress,
}

/// The mounted home page
pub struct HomePage {
    layout: PageLayout,
    scene: ScrollScene,
    intro: IntroSequencer,
    backdrop: Option<BackdropSwitcher>,
    indicator: Option<ScrollIndicator>,
    slat: Option<SlatReveal>,
}

impl HomePage {
    /// Mount the page for `route`. Without a rendering surface the page
    /// stays static and the content is shown immediately.
    pub fn mount(
        config: &SiteConfig,
        route: &str,
        env: PageEnvironment,
        now_ms: f64,
    ) -> Result<Self, ScrollError> {
        let surface = env.host.surface();
        let viewport = surface.map_or(Viewport::new(0.0, 0.0), |s| s.viewport);
        let layout = PageLayout::new(viewport);
        let environment = match surface {
            Some(surface) => Environment::browser(surface.viewport.width, env.reduced_motion),
            None => Environment::server(),
        };
        let animation = responsive::resolve(&environment);

        let engine = ScrollEngine::initialize(config.scroll.clone(), env.host.clone())?;
        let mut scene = ScrollScene::new(engine, env.host.clone());
        let mut intro = IntroSequencer::new(
            config.intro.clone(),
            env.flags.clone(),
            env.visibility.clone(),
            IntroElements {
                overlay: OVERLAY,
                content: CONTENT,
                logo: Some(LOGO),
            },
        )
        .with_viewport(viewport);

        if !scene.engine().is_active() {
            env.visibility.set_content_visible(true);
            tracing::debug!("Home page mounted without a surface");
            return Ok(Self {
                layout,
                scene,
                intro,
                backdrop: None,
                indicator: None,
                slat: None,
            });
        }

        let intro_plays = intro.should_play(route);
        let slat = bind_sections(&mut scene, &layout, &environment, &animation, !intro_plays);
        let backdrop = BackdropSwitcher::register(scene.triggers_mut(), &BACKDROPS, &layout);
        scene.setup_horizontal(HORIZONTAL_SECTION, &PANELS, &layout);
        let indicator = ScrollIndicator::attach(scene.engine_mut());
        intro.run(route, now_ms);

        tracing::debug!(
            "Home page mounted: {} triggers, {:?} animations",
            scene.triggers().len(),
            environment.device_class()
        );
        Ok(Self {
            layout,
            scene,
            intro,
            backdrop: Some(backdrop),
            indicator: Some(indicator),
            slat,
        })
    }

    /// Route native input
    pub fn handle_input(&mut self, event: &InputEvent, now_ms: f64) -> bool {
        if let InputEvent::Resize(surface) = event {
            self.layout.resize(surface.viewport);
        }
        self.scene.handle_input(event, now_ms)
    }

    /// Report a settled intro resource
    pub fn resource_settled(
        &mut self,
        kind: &ResourceKind,
        outcome: ResourceOutcome,
        now_ms: f64,
    ) -> Option<IntroEvent> {
        self.intro.resource_settled(kind, outcome, now_ms)
    }

    /// Run one frame
    pub fn frame(&mut self, now_ms: f64) -> PageFrame {
        let intro = self.intro.tick(now_ms);
        let scroll = self.scene.frame(now_ms, &self.layout);
        PageFrame {
            scroll,
            intro,
            overlay: self.intro.overlay_frame(),
            backdrop: self.backdrop(),
            progress: self.progress(),
        }
    }

    /// Backdrop currently shown
    pub fn backdrop(&self) -> Backdrop {
        self.backdrop
            .as_ref()
            .map(BackdropSwitcher::active)
            .unwrap_or_default()
    }

    /// Page progress
    pub fn progress(&self) -> ScrollProgress {
        self.indicator
            .as_ref()
            .map(ScrollIndicator::progress)
            .unwrap_or_default()
    }

    /// Clip definitions for the hero slat reveal
    pub fn slat_clips(&self) -> &[SlatClip] {
        self.slat
            .as_ref()
            .map(SlatReveal::clips)
            .unwrap_or_default()
    }

    /// Unmount: detach every listener and trigger
    pub fn teardown(&mut self) {
        if let Some(mut indicator) = self.indicator.take() {
            indicator.detach(self.scene.engine_mut());
        }
        if let Some(mut backdrop) = self.backdrop.take() {
            backdrop.teardown(self.scene.triggers_mut());
        }
        if let Some(slat) = self.slat.as_mut() {
            slat.clear();
        }
        self.scene.teardown();
        tracing::debug!("Home page unmounted");
    }

    /// The scroll scene
    pub fn scene(&self) -> &ScrollScene {
        &self.scene
    }

    /// The intro sequencer
    pub fn intro(&self) -> &IntroSequencer {
        &self.intro
    }
}

fn bind_sections(
    scene: &mut ScrollScene,
    layout: &PageLayout,
    environment: &Environment,
    animation: &ResponsiveAnimationConfig,
    intro_played: bool,
) -> Option<SlatReveal> {
    let scrub = responsive::should_use_scrub(environment);
    let reveal = RevealParams {
        duration: animation.duration,
        easing: animation.easing,
        ..RevealParams::default()
    };

    if !animation.reduced_motion {
        let spec = TriggerSpec::new(HERO, TriggerAnchor::TOP_TOP, TriggerAnchor::BOTTOM_TOP);
        report(scene.bind_scrub(spec, hero_exit(animation), layout), "hero exit");
    }

    if responsive::should_use_parallax(environment) {
        let spec = TriggerSpec::from_preset(HERO_BACKGROUND, &TriggerPreset::passage());
        let timeline = presets::parallax(HERO_BACKGROUND, 30.0, animation.parallax_intensity);
        report(scene.bind_scrub(spec, timeline, layout), "hero parallax");
    }

    let slat = (animation.slat_count > 0).then(|| {
        let options = SlatOptions {
            slats: animation.slat_count,
            duration: animation.duration,
            stagger: animation.stagger_amount,
            easing: animation.easing,
            ..SlatOptions::default()
        };
        let targets = [SlatTarget::new(HERO_IMAGE, "hero-slats")];
        let slat = SlatReveal::build_after_intro(&targets, &options, layout, intro_played);
        let spec = TriggerSpec::from_preset(HERO, &TriggerPreset::passage());
        report(scene.bind_toggle(spec, slat.timeline().clone(), layout), "hero slats");
        slat
    });

    let mission = presets::slide_up(
        &[MISSION_TEXT],
        responsive::responsive_y_offset(environment, 50.0),
        &reveal,
    );
    let mission_range = TriggerPreset {
        start: presets::starts::DEFAULT,
        end: presets::ends::EARLY,
        scrub: Some(1.0),
    };
    let spec = TriggerSpec::from_preset(MISSION_TEXT, &mission_range);
    bind(scene, layout, spec, mission, scrub, "mission");

    let cards = presets::stagger_reveal(
        &SERVICE_CARDS,
        &RevealParams {
            y: responsive::responsive_y_offset(environment, 80.0),
            stagger: Some(Stagger::Each(0.15)),
            delay: responsive::responsive_delay(environment, 0.0),
            ..reveal.clone()
        },
    );
    let cards_range = TriggerPreset {
        start: presets::starts::EARLY,
        end: presets::ends::DEFAULT,
        scrub: Some(1.0),
    };
    let spec = TriggerSpec::from_preset(SERVICE_CARDS[0], &cards_range);
    bind(scene, layout, spec, cards, scrub, "services");

    let title = presets::fade_in(&[WORK_TITLE], &reveal);
    let spec = TriggerSpec::from_preset(WORK_TITLE, &TriggerPreset::fade_in());
    bind(scene, layout, spec, title, scrub, "work title");

    let laptop = presets::slide_up(
        &[LAPTOP_MOCKUP],
        responsive::responsive_y_offset(environment, 100.0),
        &reveal,
    );
    let spec = TriggerSpec::from_preset(LAPTOP_MOCKUP, &TriggerPreset::scrub_early());
    bind(scene, layout, spec, laptop, scrub, "laptop");

    let footer = presets::slide_up(&[FOOTER_CONTENT], presets::translation::MEDIUM, &reveal);
    let spec = TriggerSpec::from_preset(FOOTER_CONTENT, &TriggerPreset::fade_in());
    report(scene.bind_toggle(spec, footer, layout), "footer");

    slat
}

fn bind(
    scene: &mut ScrollScene,
    layout: &PageLayout,
    spec: TriggerSpec,
    timeline: Timeline,
    scrub: bool,
    what: &str,
) {
    let result = if scrub {
        scene.bind_scrub(spec, timeline, layout)
    } else {
        scene.bind_toggle(spec, timeline, layout)
    };
    report(result, what);
}

fn report(result: Result<TriggerId, TriggerError>, what: &str) {
    if let Err(err) = result {
        tracing::debug!("Skipped {what} animation: {err}");
    }
}

/// Headline shrinks and dims as the hero scrolls away
fn hero_exit(animation: &ResponsiveAnimationConfig) -> Timeline {
    let vars = if animation.use_simple_animations {
        TweenVars::new(1.0)
            .prop(Property::Opacity, 0.5)
            .prop(Property::Scale, 0.98)
    } else {
        TweenVars::new(1.0)
            .prop(Property::Opacity, 0.3)
            .prop(Property::Scale, 0.95)
            .prop(Property::Y, -50.0)
    };
    let mut timeline = Timeline::new("hero-exit");
    timeline.to(&[HERO_HEADLINE], vars, Position::Append);
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;
    use flowforce_scroll::{IntroPhase, PinPhase, ScrollToOptions};

    fn environment(host: &Rc<SimHost>, reduced_motion: bool) -> PageEnvironment {
        PageEnvironment {
            host: host.clone(),
            visibility: host.clone(),
            flags: SessionFlags::in_memory(),
            reduced_motion,
        }
    }

    fn desktop() -> Rc<SimHost> {
        Rc::new(SimHost::browser(&PageLayout::new(Viewport::new(1440.0, 900.0))))
    }

    #[test]
    fn test_layout_places_panels_in_scroll_space() {
        let layout = PageLayout::new(Viewport::new(1440.0, 900.0));
        assert_eq!(layout.content_height(), 900.0 + 4.0 * 1440.0);
        assert_eq!(layout.bounds(MISSION), Some(Bounds::new(1440.0, 1440.0, 1440.0, 900.0)));
        assert_eq!(layout.bounds(MISSION_TEXT).map(|b| b.top), Some(1440.0 + 180.0));
        assert!(layout.contains(SERVICE_CARDS[2]));
        assert!(!layout.contains(ElementId(999)));
    }

    #[test]
    fn test_desktop_mount_binds_everything() {
        let host = desktop();
        let page = HomePage::mount(&SiteConfig::default(), "/", environment(&host, false), 0.0).unwrap();

        // 8 section animations, 5 backdrop sections, 1 pin
        assert_eq!(page.scene().triggers().len(), 14);
        assert_eq!(page.scene().pin().map(|p| p.travel()), Some(4.0 * 1440.0));
        assert!(page.scene().keyboard_enabled());
        assert_eq!(page.slat_clips().len(), 1);
        assert_eq!(page.slat_clips()[0].rects.len(), 20);
        assert_eq!(page.intro().phase(), IntroPhase::Loading);
        assert!(!host.content_visible());
    }

    #[test]
    fn test_reduced_motion_drops_optional_effects() {
        let host = desktop();
        let page = HomePage::mount(&SiteConfig::default(), "/", environment(&host, true), 0.0).unwrap();
        assert!(page.slat_clips().is_empty());
        assert_eq!(page.scene().triggers().len(), 11);
    }

    #[test]
    fn test_other_routes_skip_the_intro() {
        let host = desktop();
        let page =
            HomePage::mount(&SiteConfig::default(), "/blog", environment(&host, false), 0.0).unwrap();
        assert_eq!(page.intro().phase(), IntroPhase::Skipped);
        assert!(host.content_visible());
    }

    #[test]
    fn test_server_mount_is_static() {
        let host = Rc::new(SimHost::server());
        let mut page = HomePage::mount(&SiteConfig::default(), "/", environment(&host, false), 0.0).unwrap();
        assert!(host.content_visible());
        assert_eq!(host.listener_count(), 0);
        assert!(page.scene().triggers().is_empty());

        let frame = page.frame(16.0);
        assert!(frame.scroll.scroll.is_none());
        assert_eq!(frame.backdrop, Backdrop::Floral);
        assert_eq!(frame.progress.value(), 0.0);
    }

    #[test]
    fn test_scrolling_through_panels() {
        let host = desktop();
        let mut page = HomePage::mount(&SiteConfig::default(), "/", environment(&host, false), 0.0).unwrap();
        page.frame(0.0);

        let services = 2.0 * 1440.0;
        page.scene.engine_mut().scroll_to(services, ScrollToOptions::immediate());
        let frame = page.frame(16.0);
        assert_eq!(frame.backdrop, Backdrop::Concrete);
        assert_eq!(frame.scroll.pin.map(|p| p.phase), Some(PinPhase::Pinned));
        assert!((frame.progress.value() - 0.5).abs() < 1e-6);
        let card = frame.scroll.styles.get(SERVICE_CARDS[0], Property::Opacity).unwrap();
        assert!(card > 0.99);

        let end = page.scene().engine().limit();
        page.scene.engine_mut().scroll_to(end, ScrollToOptions::immediate());
        let frame = page.frame(32.0);
        assert_eq!(frame.backdrop, Backdrop::Neutral);
        assert_eq!(frame.scroll.pin.map(|p| p.phase), Some(PinPhase::After));
        assert_eq!(frame.progress.timer_label(), "01:40");

        page.scene.engine_mut().scroll_to(0.0, ScrollToOptions::immediate());
        let frame = page.frame(48.0);
        assert_eq!(frame.backdrop, Backdrop::Floral);
        assert_eq!(frame.scroll.styles.get(MISSION_TEXT, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_resize_updates_layout() {
        let host = desktop();
        let mut page = HomePage::mount(&SiteConfig::default(), "/", environment(&host, false), 0.0).unwrap();
        let narrow = PageLayout::new(Viewport::new(700.0, 900.0)).surface();
        page.handle_input(&InputEvent::Resize(narrow), 100.0);
        assert_eq!(page.scene().engine().viewport().width, 700.0);
        assert!(!page.scene().keyboard_enabled());

        page.frame(400.0);
        assert_eq!(page.scene().pin().map(|p| p.travel()), Some(4.0 * 700.0));
    }

    #[test]
    fn test_teardown_releases_host() {
        let host = desktop();
        let mut page = HomePage::mount(&SiteConfig::default(), "/", environment(&host, false), 0.0).unwrap();
        assert_eq!(host.listener_count(), 4);
        assert_eq!(host.frame_callback_count(), 1);

        page.teardown();
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.frame_callback_count(), 0);
        assert!(page.scene().triggers().is_empty());
        assert!(page.slat_clips().is_empty());
    }
}
