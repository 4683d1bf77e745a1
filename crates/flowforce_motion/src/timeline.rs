// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tweens, timelines and time-based playback.
//!
//! A [`Timeline`] is a pure description: sampling it at a time (or at a
//! progress ratio when bound to a scrub trigger) always yields the same
//! [`StyleFrame`]. Time-based playback lives in [`TimelinePlayer`].

use crate::easing::Easing;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle to an element supplied by the host page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Unique identifier for a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Animatable style property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    /// Opacity in [0, 1]
    Opacity,
    /// Horizontal translation in pixels
    X,
    /// Vertical translation in pixels
    Y,
    /// Horizontal translation as a percentage of the element width
    XPercent,
    /// Vertical translation as a percentage of the element height
    YPercent,
    /// Uniform scale
    Scale,
    /// Horizontal scale
    ScaleX,
    /// Rotation in degrees
    Rotation,
}

impl Property {
    /// Resting value when nothing animates the property
    pub fn rest_value(&self) -> f32 {
        match self {
            Property::Opacity | Property::Scale | Property::ScaleX => 1.0,
            _ => 0.0,
        }
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Cubic bezier interpolation
    pub fn bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        p0 * mt3 + 3.0 * p1 * mt2 * t + 3.0 * p2 * mt * t2 + p3 * t3
    }
}

/// One property of one element moving between two values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tween {
    /// Animated element
    pub target: ElementId,
    /// Animated property
    pub property: Property,
    /// Value at the start of the tween
    pub from: f32,
    /// Value at the end of the tween
    pub to: f32,
    /// Start time in seconds, relative to the timeline
    pub start: f32,
    /// Duration in seconds
    pub duration: f32,
    /// Easing curve
    pub easing: Easing,
}

impl Tween {
    /// End time in seconds
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// Value at a timeline time
    pub fn value_at(&self, time: f32) -> f32 {
        if self.duration <= 0.0 {
            return if time >= self.start { self.to } else { self.from };
        }
        let t = (time - self.start) / self.duration;
        if t >= 1.0 {
            return self.to;
        }
        Interpolation::lerp(self.from, self.to, self.easing.apply(t))
    }
}

/// Where a new tween group is placed on a timeline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    /// At the current end of the timeline
    #[default]
    Append,
    /// At an absolute time
    At(f32),
    /// Relative to the current end (negative overlaps the previous group)
    Offset(f32),
}

/// Distribution of start offsets across several targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Stagger {
    /// Fixed delay between consecutive targets
    Each(f32),
    /// Total delay spread evenly from the first to the last target
    Amount(f32),
}

impl Stagger {
    /// Start offset of the target at `index` out of `count`
    pub fn offset(&self, index: usize, count: usize) -> f32 {
        match *self {
            Stagger::Each(each) => each * index as f32,
            Stagger::Amount(amount) => {
                if count <= 1 {
                    0.0
                } else {
                    amount * index as f32 / (count - 1) as f32
                }
            }
        }
    }
}

/// Parameters shared by a group of tweens
#[derive(Debug, Clone, PartialEq)]
pub struct TweenVars {
    /// Property values (destination for `to`, origin for `from`)
    pub props: Vec<(Property, f32)>,
    /// Duration in seconds
    pub duration: f32,
    /// Easing curve
    pub easing: Easing,
    /// Per-target stagger
    pub stagger: Option<Stagger>,
    /// Extra delay added to the resolved position
    pub delay: f32,
}

impl TweenVars {
    /// Create vars with a duration and no properties
    pub fn new(duration: f32) -> Self {
        Self {
            props: Vec::new(),
            duration: duration.max(0.0),
            easing: Easing::Linear,
            stagger: None,
            delay: 0.0,
        }
    }

    /// Add a property value
    pub fn prop(mut self, property: Property, value: f32) -> Self {
        self.props.push((property, value));
        self
    }

    /// Set the easing curve
    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the stagger
    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = Some(stagger);
        self
    }

    /// Set the delay
    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }
}

/// Resolved property values for one instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleFrame {
    values: IndexMap<(ElementId, Property), f32>,
}

impl StyleFrame {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value
    pub fn set(&mut self, target: ElementId, property: Property, value: f32) {
        self.values.insert((target, property), value);
    }

    /// Get a value
    pub fn get(&self, target: ElementId, property: Property) -> Option<f32> {
        self.values.get(&(target, property)).copied()
    }

    /// Overlay another frame on top of this one
    pub fn merge(&mut self, other: StyleFrame) {
        self.values.extend(other.values);
    }

    /// Iterate over all values
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, Property, f32)> + '_ {
        self.values.iter().map(|((t, p), v)| (*t, *p, *v))
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the frame has no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A sequence of tweens positioned in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    /// Unique timeline ID
    pub id: TimelineId,
    /// Timeline name (for logging)
    pub name: String,
    tweens: Vec<Tween>,
    /// End of the last placed group, including holds
    cursor: f32,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TimelineId::new(),
            name: name.into(),
            tweens: Vec::new(),
            cursor: 0.0,
        }
    }

    /// Animate targets from their current values to `vars.props`
    pub fn to(&mut self, targets: &[ElementId], vars: TweenVars, position: Position) -> &mut Self {
        let start = self.resolve(position) + vars.delay;
        for (index, target) in targets.iter().enumerate() {
            let offset = vars.stagger.map(|s| s.offset(index, targets.len())).unwrap_or(0.0);
            for (property, to) in &vars.props {
                let from = self.current_value(*target, *property);
                self.push(*target, *property, from, *to, start + offset, &vars);
            }
        }
        self.advance();
        self
    }

    /// Animate targets from `vars.props` to their current values
    pub fn from(&mut self, targets: &[ElementId], vars: TweenVars, position: Position) -> &mut Self {
        let start = self.resolve(position) + vars.delay;
        for (index, target) in targets.iter().enumerate() {
            let offset = vars.stagger.map(|s| s.offset(index, targets.len())).unwrap_or(0.0);
            for (property, from) in &vars.props {
                let to = self.current_value(*target, *property);
                self.push(*target, *property, *from, to, start + offset, &vars);
            }
        }
        self.advance();
        self
    }

    /// Animate targets between explicit values
    pub fn from_to(
        &mut self,
        targets: &[ElementId],
        from: &[(Property, f32)],
        vars: TweenVars,
        position: Position,
    ) -> &mut Self {
        let start = self.resolve(position) + vars.delay;
        for (index, target) in targets.iter().enumerate() {
            let offset = vars.stagger.map(|s| s.offset(index, targets.len())).unwrap_or(0.0);
            for (property, to) in &vars.props {
                let origin = from
                    .iter()
                    .find(|(p, _)| p == property)
                    .map(|(_, v)| *v)
                    .unwrap_or_else(|| self.current_value(*target, *property));
                self.push(*target, *property, origin, *to, start + offset, &vars);
            }
        }
        self.advance();
        self
    }

    /// Insert an empty gap
    pub fn hold(&mut self, duration: f32) -> &mut Self {
        self.cursor += duration.max(0.0);
        self
    }

    /// All tweens in insertion order
    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// Whether the timeline has no tweens
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Total duration in seconds
    pub fn duration(&self) -> f32 {
        self.tweens.iter().map(Tween::end).fold(self.cursor, f32::max)
    }

    /// Evaluate every animated property at a time
    pub fn sample(&self, time: f32) -> StyleFrame {
        let mut frame = StyleFrame::new();
        let mut channels: IndexMap<(ElementId, Property), Vec<&Tween>> = IndexMap::new();
        for tween in &self.tweens {
            channels.entry((tween.target, tween.property)).or_default().push(tween);
        }

        for ((target, property), tweens) in channels {
            let active = tweens
                .iter()
                .filter(|t| t.start <= time)
                .max_by(|a, b| a.start.total_cmp(&b.start));
            let value = match active {
                Some(tween) => tween.value_at(time),
                None => tweens
                    .iter()
                    .min_by(|a, b| a.start.total_cmp(&b.start))
                    .map(|t| t.from)
                    .unwrap_or_else(|| property.rest_value()),
            };
            frame.set(target, property, value);
        }
        frame
    }

    /// Evaluate at a progress ratio in [0, 1]; used for scrubbing
    pub fn sample_progress(&self, progress: f32) -> StyleFrame {
        self.sample(progress.clamp(0.0, 1.0) * self.duration())
    }

    fn resolve(&self, position: Position) -> f32 {
        let end = self.duration();
        match position {
            Position::Append => end,
            Position::At(time) => time.max(0.0),
            Position::Offset(delta) => (end + delta).max(0.0),
        }
    }

    fn advance(&mut self) {
        self.cursor = self.duration();
    }

    /// Last value written to a channel, or its rest value
    fn current_value(&self, target: ElementId, property: Property) -> f32 {
        self.tweens
            .iter()
            .filter(|t| t.target == target && t.property == property)
            .max_by(|a, b| a.end().total_cmp(&b.end()))
            .map(|t| t.to)
            .unwrap_or_else(|| property.rest_value())
    }

    fn push(&mut self, target: ElementId, property: Property, from: f32, to: f32, start: f32, vars: &TweenVars) {
        self.tweens.push(Tween {
            target,
            property,
            from,
            to,
            start,
            duration: vars.duration,
            easing: vars.easing,
        });
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new("Untitled Timeline")
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
    /// Playing in reverse
    Reverse,
}

/// Reported when playback reaches an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Forward playback reached the end
    Completed,
    /// Reverse playback reached the start
    ReverseCompleted,
}

/// Time-based playback of a timeline
#[derive(Debug, Clone)]
pub struct TimelinePlayer {
    /// Current playhead in seconds
    pub time: f32,
    /// Playback state
    pub state: PlaybackState,
    /// Playback speed multiplier
    pub speed: f32,
}

impl TimelinePlayer {
    /// Create a stopped player at the start
    pub fn new() -> Self {
        Self {
            time: 0.0,
            state: PlaybackState::Stopped,
            speed: 1.0,
        }
    }

    /// Advance by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32, timeline: &Timeline) -> Option<PlaybackEvent> {
        let delta = delta_time.max(0.0) * self.speed;
        match self.state {
            PlaybackState::Playing => {
                self.time += delta;
                let end = timeline.duration();
                if self.time >= end {
                    self.time = end;
                    self.state = PlaybackState::Stopped;
                    return Some(PlaybackEvent::Completed);
                }
            }
            PlaybackState::Reverse => {
                self.time -= delta;
                if self.time <= 0.0 {
                    self.time = 0.0;
                    self.state = PlaybackState::Stopped;
                    return Some(PlaybackEvent::ReverseCompleted);
                }
            }
            PlaybackState::Paused | PlaybackState::Stopped => {}
        }
        None
    }

    /// Play forward from the current position
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Play backward from the current position
    pub fn reverse(&mut self) {
        self.state = PlaybackState::Reverse;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.is_playing() {
            self.state = PlaybackState::Paused;
        }
    }

    /// Jump back to the start and play
    pub fn restart(&mut self) {
        self.time = 0.0;
        self.state = PlaybackState::Playing;
    }

    /// Seek to a time, clamped to the timeline
    pub fn seek(&mut self, time: f32, timeline: &Timeline) {
        self.time = time.clamp(0.0, timeline.duration());
    }

    /// Is currently playing (forward or reverse)
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing | PlaybackState::Reverse)
    }

    /// Evaluate the timeline at the playhead
    pub fn frame(&self, timeline: &Timeline) -> StyleFrame {
        timeline.sample(self.time)
    }
}

impl Default for TimelinePlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ElementId = ElementId(1);
    const B: ElementId = ElementId(2);

    #[test]
    fn test_from_animates_to_rest_value() {
        let mut timeline = Timeline::new("fade");
        timeline.from(&[A], TweenVars::new(1.0).prop(Property::Opacity, 0.0), Position::Append);

        assert_eq!(timeline.sample(0.0).get(A, Property::Opacity), Some(0.0));
        assert_eq!(timeline.sample(0.5).get(A, Property::Opacity), Some(0.5));
        assert_eq!(timeline.sample(2.0).get(A, Property::Opacity), Some(1.0));
    }

    #[test]
    fn test_to_chains_from_previous_value() {
        let mut timeline = Timeline::new("move");
        timeline
            .to(&[A], TweenVars::new(1.0).prop(Property::X, 100.0), Position::Append)
            .to(&[A], TweenVars::new(1.0).prop(Property::X, 50.0), Position::Append);

        let second = &timeline.tweens()[1];
        assert_eq!(second.from, 100.0);
        assert_eq!(second.start, 1.0);
        assert_eq!(timeline.duration(), 2.0);
        assert_eq!(timeline.sample(1.5).get(A, Property::X), Some(75.0));
    }

    #[test]
    fn test_positions_and_hold() {
        let mut timeline = Timeline::new("intro");
        timeline
            .to(&[A], TweenVars::new(1.0).prop(Property::Scale, 2.0), Position::Append)
            .hold(0.5)
            .to(&[B], TweenVars::new(0.5).prop(Property::Opacity, 0.0), Position::Append)
            .from(&[A], TweenVars::new(0.8).prop(Property::Y, 20.0), Position::Offset(-0.3));

        let tweens = timeline.tweens();
        assert_eq!(tweens[1].start, 1.5);
        assert!((tweens[2].start - 1.7).abs() < 1e-6);
        assert!((timeline.duration() - 2.5).abs() < 1e-6);

        let mut at = Timeline::new("at");
        at.to(&[A], TweenVars::new(1.0).prop(Property::X, 1.0), Position::At(3.0));
        assert_eq!(at.tweens()[0].start, 3.0);
    }

    #[test]
    fn test_stagger_amount_spreads_starts() {
        let targets = [ElementId(1), ElementId(2), ElementId(3), ElementId(4), ElementId(5)];
        let mut timeline = Timeline::new("reveal");
        timeline.from(
            &targets,
            TweenVars::new(1.0)
                .prop(Property::Opacity, 0.0)
                .stagger(Stagger::Amount(0.8)),
            Position::Append,
        );

        let starts: Vec<f32> = timeline.tweens().iter().map(|t| t.start).collect();
        for (start, expected) in starts.iter().zip([0.0, 0.2, 0.4, 0.6, 0.8]) {
            assert!((start - expected).abs() < 1e-5);
        }
        assert!((timeline.duration() - 1.8).abs() < 1e-5);
        assert!((Stagger::Each(0.1).offset(3, 10) - 0.3).abs() < 1e-6);
        assert_eq!(Stagger::Amount(0.8).offset(0, 1), 0.0);
    }

    #[test]
    fn test_sample_progress_is_pure() {
        let mut timeline = Timeline::new("scrub");
        timeline.from_to(
            &[A],
            &[(Property::YPercent, 0.0)],
            TweenVars::new(2.0).prop(Property::YPercent, 30.0),
            Position::Append,
        );

        let forward = timeline.sample_progress(0.25);
        let _ = timeline.sample_progress(0.9);
        let again = timeline.sample_progress(0.25);
        assert_eq!(forward, again);
        assert_eq!(forward.get(A, Property::YPercent), Some(7.5));
        assert_eq!(timeline.sample_progress(5.0).get(A, Property::YPercent), Some(30.0));
    }

    #[test]
    fn test_player_completes_once() {
        let mut timeline = Timeline::new("fade");
        timeline.to(&[A], TweenVars::new(0.6).prop(Property::Opacity, 0.0), Position::Append);

        let mut player = TimelinePlayer::new();
        player.play();
        assert_eq!(player.update(0.3, &timeline), None);
        assert_eq!(player.update(0.4, &timeline), Some(PlaybackEvent::Completed));
        assert_eq!(player.update(0.4, &timeline), None);
        assert_eq!(player.frame(&timeline).get(A, Property::Opacity), Some(0.0));

        player.reverse();
        assert_eq!(player.update(1.0, &timeline), Some(PlaybackEvent::ReverseCompleted));
        assert_eq!(player.time, 0.0);
    }
}
