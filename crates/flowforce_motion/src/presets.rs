// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared animation constants, scroll-trigger presets and reveal builders.

use crate::easing::Easing;
use crate::timeline::{ElementId, Position, Property, Stagger, Timeline, TweenVars};
use serde::{Deserialize, Serialize};

/// Animation durations in seconds
pub mod durations {
    /// Hover effects, quick transitions
    pub const FAST: f32 = 0.3;
    /// Standard transitions
    pub const NORMAL: f32 = 0.8;
    /// Hero animations, dramatic reveals
    pub const SLOW: f32 = 1.5;
    /// Initial page-load intro
    pub const INTRO: f32 = 3.0;
    /// Complex multi-step animations
    pub const EXTRA_SLOW: f32 = 2.5;
}

/// Animation delays in seconds
pub mod delays {
    /// No delay
    pub const NONE: f32 = 0.0;
    /// Between sibling elements
    pub const SHORT: f32 = 0.1;
    /// Between related groups
    pub const MEDIUM: f32 = 0.2;
    /// Between sections of a reveal
    pub const LONG: f32 = 0.3;
    /// Before a closing element
    pub const EXTRA_LONG: f32 = 0.4;
}

/// Stagger values in seconds
pub mod staggers {
    /// Dense lists
    pub const FAST: f32 = 0.05;
    /// Cards and text lines
    pub const NORMAL: f32 = 0.1;
    /// Large blocks
    pub const SLOW: f32 = 0.2;
}

/// Number of slats for reveal animations
pub mod slat_counts {
    /// Smaller sections
    pub const FEW: usize = 8;
    /// Larger, more dramatic reveals
    pub const MANY: usize = 20;
}

/// Opacity values for fades
pub mod opacity {
    /// Fully transparent
    pub const HIDDEN: f32 = 0.0;
    /// Half faded
    pub const DIMMED: f32 = 0.5;
    /// Fully opaque
    pub const VISIBLE: f32 = 1.0;
}

/// Translation distances in pixels
pub mod translation {
    /// Subtle nudges
    pub const SMALL: f32 = 20.0;
    /// Text slides
    pub const MEDIUM: f32 = 30.0;
    /// Card slides
    pub const LARGE: f32 = 50.0;
    /// Headline entrances
    pub const EXTRA_LARGE: f32 = 80.0;
    /// Full-bleed entrances
    pub const HUGE: f32 = 100.0;
}

/// Error returned when a trigger anchor cannot be parsed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid trigger anchor: {0:?}")]
pub struct AnchorParseError(pub String);

/// Point where an element edge meets a viewport line, e.g. `top 80%`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerAnchor {
    /// Position on the element: 0 = top, 0.5 = center, 1 = bottom
    pub element_edge: f32,
    /// Position in the viewport: 0 = top, 1 = bottom
    pub viewport_ratio: f32,
}

impl TriggerAnchor {
    /// Create an anchor
    pub const fn new(element_edge: f32, viewport_ratio: f32) -> Self {
        Self {
            element_edge,
            viewport_ratio,
        }
    }

    /// `top top`
    pub const TOP_TOP: Self = Self::new(0.0, 0.0);
    /// `top bottom`
    pub const TOP_BOTTOM: Self = Self::new(0.0, 1.0);
    /// `bottom top`
    pub const BOTTOM_TOP: Self = Self::new(1.0, 0.0);
    /// `bottom bottom`
    pub const BOTTOM_BOTTOM: Self = Self::new(1.0, 1.0);

    /// Parse `"<element> <viewport>"` where each side is `top`, `center`,
    /// `bottom` or a percentage
    pub fn parse(text: &str) -> Result<Self, AnchorParseError> {
        let mut parts = text.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AnchorParseError(text.to_string()));
        };
        let element_edge = parse_ratio(element).ok_or_else(|| AnchorParseError(text.to_string()))?;
        let viewport_ratio = parse_ratio(viewport).ok_or_else(|| AnchorParseError(text.to_string()))?;
        Ok(Self::new(element_edge, viewport_ratio))
    }

    /// Scroll offset at which this anchor is reached for an element
    pub fn resolve(&self, element_top: f32, element_height: f32, viewport_height: f32) -> f32 {
        element_top + self.element_edge * element_height - self.viewport_ratio * viewport_height
    }
}

fn parse_ratio(word: &str) -> Option<f32> {
    match word {
        "top" | "left" => Some(0.0),
        "center" => Some(0.5),
        "bottom" | "right" => Some(1.0),
        _ => word
            .strip_suffix('%')
            .and_then(|n| n.parse::<f32>().ok())
            .map(|n| n / 100.0),
    }
}

/// Trigger start lines
pub mod starts {
    use super::TriggerAnchor;

    /// `top 80%`
    pub const DEFAULT: TriggerAnchor = TriggerAnchor::new(0.0, 0.8);
    /// `top 70%`
    pub const EARLY: TriggerAnchor = TriggerAnchor::new(0.0, 0.7);
    /// `top 90%`
    pub const LATE: TriggerAnchor = TriggerAnchor::new(0.0, 0.9);
    /// `top center`
    pub const CENTER: TriggerAnchor = TriggerAnchor::new(0.0, 0.5);
    /// `top top`
    pub const TOP: TriggerAnchor = TriggerAnchor::TOP_TOP;
}

/// Trigger end lines
pub mod ends {
    use super::TriggerAnchor;

    /// `top 20%`
    pub const DEFAULT: TriggerAnchor = TriggerAnchor::new(0.0, 0.2);
    /// `top 30%`
    pub const EARLY: TriggerAnchor = TriggerAnchor::new(0.0, 0.3);
    /// `top 40%`
    pub const LATE: TriggerAnchor = TriggerAnchor::new(0.0, 0.4);
    /// `top center`
    pub const CENTER: TriggerAnchor = TriggerAnchor::new(0.0, 0.5);
    /// `bottom bottom`
    pub const BOTTOM: TriggerAnchor = TriggerAnchor::BOTTOM_BOTTOM;
}

/// Reusable scroll-trigger range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerPreset {
    /// Start line
    pub start: TriggerAnchor,
    /// End line
    pub end: TriggerAnchor,
    /// Scrub smoothing factor; `None` for toggle triggers
    pub scrub: Option<f32>,
}

impl TriggerPreset {
    /// Default scrub range, `top 80%` to `top 20%`
    pub const fn scrub() -> Self {
        Self {
            start: starts::DEFAULT,
            end: ends::DEFAULT,
            scrub: Some(1.0),
        }
    }

    /// Early scrub range, `top 70%` to `top 30%`
    pub const fn scrub_early() -> Self {
        Self {
            start: starts::EARLY,
            end: ends::EARLY,
            scrub: Some(1.0),
        }
    }

    /// Fade-in range, `top 80%` to `top 40%`
    pub const fn fade_in() -> Self {
        Self {
            start: starts::DEFAULT,
            end: ends::LATE,
            scrub: Some(1.0),
        }
    }

    /// Whole passage of an element through the viewport
    pub const fn passage() -> Self {
        Self {
            start: TriggerAnchor::TOP_BOTTOM,
            end: TriggerAnchor::BOTTOM_TOP,
            scrub: Some(1.0),
        }
    }
}

/// Parameters for the reveal builders
#[derive(Debug, Clone, PartialEq)]
pub struct RevealParams {
    /// Starting opacity
    pub opacity: f32,
    /// Starting horizontal offset in pixels
    pub x: f32,
    /// Starting vertical offset in pixels
    pub y: f32,
    /// Duration per element
    pub duration: f32,
    /// Easing curve
    pub easing: Easing,
    /// Stagger across elements
    pub stagger: Option<Stagger>,
    /// Delay before the first element
    pub delay: f32,
}

impl Default for RevealParams {
    fn default() -> Self {
        Self {
            opacity: opacity::HIDDEN,
            x: 0.0,
            y: 0.0,
            duration: durations::NORMAL,
            easing: Easing::Power2Out,
            stagger: None,
            delay: delays::NONE,
        }
    }
}

impl RevealParams {
    fn vars(&self) -> TweenVars {
        let mut vars = TweenVars::new(self.duration).ease(self.easing).delay(self.delay);
        vars = vars.prop(Property::Opacity, self.opacity);
        if self.x != 0.0 {
            vars = vars.prop(Property::X, self.x);
        }
        if self.y != 0.0 {
            vars = vars.prop(Property::Y, self.y);
        }
        if let Some(stagger) = self.stagger {
            vars = vars.stagger(stagger);
        }
        vars
    }
}

/// Fade targets in from transparent
pub fn fade_in(targets: &[ElementId], params: &RevealParams) -> Timeline {
    let params = RevealParams {
        x: 0.0,
        y: 0.0,
        ..params.clone()
    };
    reveal("fade-in", targets, &params)
}

/// Fade targets in while rising from below
pub fn slide_up(targets: &[ElementId], distance: f32, params: &RevealParams) -> Timeline {
    let params = RevealParams {
        y: distance,
        ..params.clone()
    };
    reveal("slide-up", targets, &params)
}

/// Fade targets in while sliding horizontally; negative distance enters from the left
pub fn slide_in(targets: &[ElementId], distance: f32, params: &RevealParams) -> Timeline {
    let params = RevealParams {
        x: distance,
        ..params.clone()
    };
    reveal("slide-in", targets, &params)
}

/// Reveal targets one after another
pub fn stagger_reveal(targets: &[ElementId], params: &RevealParams) -> Timeline {
    let params = RevealParams {
        stagger: params.stagger.or(Some(Stagger::Each(staggers::NORMAL))),
        ..params.clone()
    };
    reveal("stagger-reveal", targets, &params)
}

fn reveal(name: &str, targets: &[ElementId], params: &RevealParams) -> Timeline {
    let mut timeline = Timeline::new(name);
    timeline.from(targets, params.vars(), Position::Append);
    timeline
}

/// Background parallax: move the target by `distance` percent of its height
/// over the trigger range, scaled by `intensity`
pub fn parallax(target: ElementId, distance: f32, intensity: f32) -> Timeline {
    let mut timeline = Timeline::new("parallax");
    let intensity = intensity.clamp(0.0, 1.0);
    if intensity > 0.0 {
        timeline.from_to(
            &[target],
            &[(Property::YPercent, 0.0)],
            TweenVars::new(1.0).prop(Property::YPercent, distance * intensity),
            Position::Append,
        );
    }
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_parse() {
        assert_eq!(TriggerAnchor::parse("top 80%"), Ok(starts::DEFAULT));
        assert_eq!(TriggerAnchor::parse("top top"), Ok(TriggerAnchor::TOP_TOP));
        assert_eq!(TriggerAnchor::parse("bottom bottom"), Ok(ends::BOTTOM));
        assert_eq!(TriggerAnchor::parse("center 50%"), Ok(TriggerAnchor::new(0.5, 0.5)));
        assert!(TriggerAnchor::parse("top").is_err());
        assert!(TriggerAnchor::parse("top 80% extra").is_err());
        assert!(TriggerAnchor::parse("middle 10%").is_err());
    }

    #[test]
    fn test_anchor_resolve() {
        // element at 2000px, 600px tall, viewport 1000px
        assert_eq!(starts::DEFAULT.resolve(2000.0, 600.0, 1000.0), 1200.0);
        assert_eq!(TriggerAnchor::BOTTOM_TOP.resolve(2000.0, 600.0, 1000.0), 2600.0);
        assert_eq!(TriggerAnchor::TOP_TOP.resolve(2000.0, 600.0, 1000.0), 2000.0);
    }

    #[test]
    fn test_presets() {
        assert_eq!(TriggerPreset::scrub().scrub, Some(1.0));
        assert_eq!(TriggerPreset::scrub_early().end, ends::EARLY);
        assert_eq!(TriggerPreset::fade_in().end, ends::LATE);
    }

    #[test]
    fn test_slide_up_builds_opacity_and_y() {
        let targets = [ElementId(1), ElementId(2)];
        let params = RevealParams {
            stagger: Some(Stagger::Each(0.2)),
            ..RevealParams::default()
        };
        let timeline = slide_up(&targets, translation::LARGE, &params);

        assert_eq!(timeline.tweens().len(), 4);
        let start = timeline.sample(0.0);
        assert_eq!(start.get(ElementId(1), Property::Opacity), Some(0.0));
        assert_eq!(start.get(ElementId(2), Property::Y), Some(50.0));
        let end = timeline.sample(timeline.duration());
        assert_eq!(end.get(ElementId(2), Property::Y), Some(0.0));
        assert_eq!(end.get(ElementId(2), Property::Opacity), Some(1.0));
    }

    #[test]
    fn test_slide_in_enters_from_the_side() {
        let timeline = slide_in(&[ElementId(7)], -translation::MEDIUM, &RevealParams::default());
        let start = timeline.sample(0.0);
        assert_eq!(start.get(ElementId(7), Property::X), Some(-30.0));
        assert_eq!(start.get(ElementId(7), Property::Y), None);
        let end = timeline.sample(timeline.duration());
        assert_eq!(end.get(ElementId(7), Property::X), Some(0.0));
        assert_eq!(end.get(ElementId(7), Property::Opacity), Some(1.0));
    }

    #[test]
    fn test_stagger_reveal_defaults_to_normal_stagger() {
        let targets = [ElementId(1), ElementId(2), ElementId(3)];
        let timeline = stagger_reveal(&targets, &RevealParams::default());
        let starts: Vec<f32> = timeline.tweens().iter().map(|t| t.start).collect();
        assert!((starts[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_parallax_respects_intensity() {
        assert!(parallax(ElementId(7), 30.0, 0.0).is_empty());
        let half = parallax(ElementId(7), 30.0, 0.5);
        assert_eq!(half.sample_progress(1.0).get(ElementId(7), Property::YPercent), Some(15.0));
    }
}
