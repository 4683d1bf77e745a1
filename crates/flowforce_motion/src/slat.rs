// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slat reveal: an element is uncovered through a row of vertical strips that
//! grow from their left edge one after another.

use crate::easing::Easing;
use crate::layout::Layout;
use crate::presets::{durations, slat_counts};
use crate::timeline::{ElementId, Position, Property, Stagger, Timeline, TweenVars};

/// First handle used for generated clip strips
pub const SLAT_HANDLE_BASE: u32 = 0x1000_0000;

/// An element to reveal
#[derive(Debug, Clone, PartialEq)]
pub struct SlatTarget {
    /// Element to clip
    pub element: ElementId,
    /// Identifier for the clip definition
    pub clip_id: String,
    /// Delay before this element's strips start, in seconds
    pub delay: f32,
}

impl SlatTarget {
    /// Create a target with no delay
    pub fn new(element: ElementId, clip_id: impl Into<String>) -> Self {
        Self {
            element,
            clip_id: clip_id.into(),
            delay: 0.0,
        }
    }

    /// Set the delay
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }
}

/// Slat reveal options
#[derive(Debug, Clone, PartialEq)]
pub struct SlatOptions {
    /// Number of vertical strips
    pub slats: usize,
    /// Duration of each strip's growth
    pub duration: f32,
    /// Total stagger spread across the strips
    pub stagger: f32,
    /// Easing of each strip
    pub easing: Easing,
    /// First handle assigned to generated strips
    pub handle_base: u32,
}

impl Default for SlatOptions {
    fn default() -> Self {
        Self {
            slats: slat_counts::FEW,
            duration: 1.2,
            stagger: 0.8,
            easing: Easing::Power2Out,
            handle_base: SLAT_HANDLE_BASE,
        }
    }
}

/// One strip of a clip path, in object-bounding-box units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    /// Strip handle animated by the timeline
    pub handle: ElementId,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

/// Clip definition applied to one element
#[derive(Debug, Clone, PartialEq)]
pub struct SlatClip {
    /// Clipped element
    pub element: ElementId,
    /// Clip identifier
    pub clip_id: String,
    /// Strips, left to right
    pub rects: Vec<ClipRect>,
}

/// Built slat reveal: clip definitions plus the timeline growing them
#[derive(Debug, Clone)]
pub struct SlatReveal {
    clips: Vec<SlatClip>,
    timeline: Timeline,
}

impl SlatReveal {
    /// Build clips and strip tweens for every target the layout knows about
    pub fn build(targets: &[SlatTarget], options: &SlatOptions, layout: &dyn Layout) -> Self {
        let slats = options.slats.max(1);
        let width = 1.0 / slats as f32;
        let mut next_handle = options.handle_base;
        let mut clips = Vec::new();
        let mut timeline = Timeline::new("slat-reveal");

        for target in targets {
            if !layout.contains(target.element) {
                tracing::debug!("Slat reveal skipped missing element {:?}", target.element);
                continue;
            }

            let rects: Vec<ClipRect> = (0..slats)
                .map(|i| {
                    let handle = ElementId(next_handle);
                    next_handle = next_handle.wrapping_add(1);
                    ClipRect {
                        handle,
                        x: i as f32 * width,
                        y: 0.0,
                        width,
                        height: 1.0,
                    }
                })
                .collect();

            let handles: Vec<ElementId> = rects.iter().map(|r| r.handle).collect();
            timeline.from_to(
                &handles,
                &[(Property::ScaleX, 0.0)],
                TweenVars::new(options.duration)
                    .prop(Property::ScaleX, 1.0)
                    .ease(options.easing)
                    .stagger(Stagger::Amount(options.stagger))
                    .delay(target.delay),
                Position::At(0.0),
            );

            clips.push(SlatClip {
                element: target.element,
                clip_id: target.clip_id.clone(),
                rects,
            });
        }

        Self { clips, timeline }
    }

    /// Build with the intro delay added when the intro has not played yet
    pub fn build_after_intro(
        targets: &[SlatTarget],
        options: &SlatOptions,
        layout: &dyn Layout,
        intro_played: bool,
    ) -> Self {
        let base = if intro_played { 0.0 } else { durations::INTRO };
        let delayed: Vec<SlatTarget> = targets
            .iter()
            .cloned()
            .map(|t| {
                let delay = t.delay + base;
                t.with_delay(delay)
            })
            .collect();
        Self::build(&delayed, options, layout)
    }

    /// Clip definitions to install
    pub fn clips(&self) -> &[SlatClip] {
        &self.clips
    }

    /// Timeline growing the strips
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Remove the clip definitions; the elements render unclipped afterwards
    pub fn clear(&mut self) {
        self.clips.clear();
    }
}
