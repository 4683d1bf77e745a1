// SPDX-License-Identifier: MIT OR Apache-2.0
//! Inertia-smoothed virtual scrolling.
//!
//! Wheel and touch input move a target offset; every frame the visible
//! (virtual) offset eases toward the target along the configured curve. The
//! engine is the only writer of the scroll position.

use crate::host::{Host, InputEvent, ListenerKind, Subscriptions, Surface, Viewport};
use flowforce_motion::Easing;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Axis the page scrolls along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Vertical scrolling
    #[default]
    Vertical,
    /// Horizontal scrolling
    Horizontal,
}

/// Gesture axes that drive scrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureOrientation {
    /// Vertical gestures only
    #[default]
    Vertical,
    /// Horizontal gestures only
    Horizontal,
    /// Whichever axis moved more
    Both,
}

/// Smooth-scroll configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Seconds to settle on a new target
    pub duration: f32,
    /// Curve used to approach the target
    pub easing: Easing,
    /// Scroll axis
    pub orientation: Orientation,
    /// Gesture axes
    pub gesture_orientation: GestureOrientation,
    /// Wheel delta multiplier
    pub wheel_multiplier: f32,
    /// Touch delta multiplier
    pub touch_multiplier: f32,
    /// Smooth wheel input
    pub smooth_wheel: bool,
    /// Smooth touch input (native touch scrolling is usually preferred)
    pub smooth_touch: bool,
    /// Wrap around instead of clamping at the ends
    pub infinite: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            duration: 1.2,
            easing: Easing::ExpoOut,
            orientation: Orientation::Vertical,
            gesture_orientation: GestureOrientation::Vertical,
            wheel_multiplier: 1.0,
            touch_multiplier: 2.0,
            smooth_wheel: true,
            smooth_touch: false,
            infinite: false,
        }
    }
}

impl ScrollConfig {
    /// Check that every numeric field is usable
    pub fn validate(&self) -> Result<(), ScrollError> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ScrollError::InvalidConfig(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if !self.wheel_multiplier.is_finite() || !self.touch_multiplier.is_finite() {
            return Err(ScrollError::InvalidConfig(
                "multipliers must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scroll engine errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScrollError {
    /// Configuration rejected
    #[error("Invalid scroll config: {0}")]
    InvalidConfig(String),

    /// Surface measurements unusable
    #[error("Invalid surface measurement: content {content:?}, viewport {viewport:?}")]
    InvalidSurface {
        /// Measured content extent
        content: f32,
        /// Measured viewport
        viewport: Viewport,
    },
}

/// Options for programmatic scrolling
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollToOptions {
    /// Override the configured duration
    pub duration: Option<f32>,
    /// Override the configured easing
    pub easing: Option<Easing>,
    /// Jump without animating
    pub immediate: bool,
}

impl ScrollToOptions {
    /// Animate over a specific duration
    pub fn with_duration(duration: f32) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Jump immediately
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::default()
        }
    }
}

/// Live scroll state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Offset currently shown
    pub virtual_offset: f32,
    /// Change of the virtual offset during the last frame
    pub velocity: f32,
    /// Offset being approached
    pub target_offset: f32,
    /// Whether an animation toward the target is running
    pub is_animating: bool,
}

/// Direction of the last movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Toward the end of the page
    Forward,
    /// Toward the start of the page
    Backward,
    /// No movement
    Idle,
}

/// Emitted once per frame in which the virtual offset changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// New virtual offset
    pub offset: f32,
    /// Change since the previous frame
    pub velocity: f32,
    /// Movement direction
    pub direction: ScrollDirection,
    /// Offset as a fraction of the scroll limit
    pub progress: f32,
    /// Maximum offset
    pub limit: f32,
}

/// Handle to a scroll observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

type Observer = Box<dyn FnMut(&ScrollEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineMode {
    Active,
    /// No rendering surface; every operation is a no-op
    Inert,
    Destroyed,
}

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

/// Smooth scroll engine
pub struct ScrollEngine {
    config: ScrollConfig,
    state: ScrollState,
    viewport: Viewport,
    limit: f32,
    animation: Option<ScrollAnimation>,
    /// A jump happened that has not been emitted yet
    dirty: bool,
    emitted_offset: f32,
    last_time: Option<f64>,
    observers: IndexMap<ObserverId, Observer>,
    next_observer: u64,
    subscriptions: Option<Subscriptions>,
    mode: EngineMode,
}

impl ScrollEngine {
    /// Initialize against a host. Without a surface the engine is inert.
    pub fn initialize(config: ScrollConfig, host: Rc<dyn Host>) -> Result<Self, ScrollError> {
        config.validate()?;

        let Some(surface) = host.surface() else {
            tracing::debug!("No rendering surface, smooth scrolling disabled");
            return Ok(Self::with_mode(
                config,
                EngineMode::Inert,
                None,
                Viewport::new(0.0, 0.0),
                0.0,
            ));
        };

        let mut subscriptions = Subscriptions::new(host);
        subscriptions.listen(ListenerKind::Wheel);
        subscriptions.listen(ListenerKind::Touch);
        subscriptions.listen(ListenerKind::Resize);
        subscriptions.request_frames();

        // Registrations are released by the guard if measuring fails
        let limit = measure_limit(&config, &surface)?;

        tracing::debug!(
            "Smooth scroll initialized: limit {limit}, duration {}s, {:?}",
            config.duration,
            config.orientation
        );
        Ok(Self::with_mode(
            config,
            EngineMode::Active,
            Some(subscriptions),
            surface.viewport,
            limit,
        ))
    }

    fn with_mode(
        config: ScrollConfig,
        mode: EngineMode,
        subscriptions: Option<Subscriptions>,
        viewport: Viewport,
        limit: f32,
    ) -> Self {
        Self {
            config,
            state: ScrollState::default(),
            viewport,
            limit,
            animation: None,
            dirty: false,
            emitted_offset: 0.0,
            last_time: None,
            observers: IndexMap::new(),
            next_observer: 0,
            subscriptions,
            mode,
        }
    }

    /// Advance one frame. Non-increasing timestamps are ignored.
    pub fn tick(&mut self, now_ms: f64) -> Option<ScrollEvent> {
        if self.mode != EngineMode::Active {
            return None;
        }
        let delta_ms = match self.last_time {
            Some(last) if now_ms <= last => return None,
            Some(last) => now_ms - last,
            None => 0.0,
        };
        self.last_time = Some(now_ms);

        if let Some(mut animation) = self.animation.take() {
            animation.elapsed += (delta_ms / 1000.0) as f32;
            let t = (animation.elapsed / animation.duration).clamp(0.0, 1.0);
            let eased = animation.easing.apply(t);
            let low = animation.from.min(animation.to);
            let high = animation.from.max(animation.to);
            let value = (animation.from + (animation.to - animation.from) * eased).clamp(low, high);

            if t >= 1.0 {
                self.state.virtual_offset = animation.to;
                self.state.is_animating = false;
            } else {
                self.state.virtual_offset = value;
                self.animation = Some(animation);
            }
        } else if !self.dirty {
            self.state.velocity = 0.0;
            return None;
        }

        self.dirty = false;
        self.state.velocity = self.state.virtual_offset - self.emitted_offset;
        self.emitted_offset = self.state.virtual_offset;
        let event = self.event();
        for observer in self.observers.values_mut() {
            observer(&event);
        }
        Some(event)
    }

    /// Feed native input. Returns true when the engine consumed it.
    pub fn handle_input(&mut self, input: &InputEvent) -> bool {
        if self.mode != EngineMode::Active {
            return false;
        }
        match *input {
            InputEvent::Wheel { delta_x, delta_y } => {
                let delta = self.gesture_delta(delta_x, delta_y) * self.config.wheel_multiplier;
                if delta == 0.0 || !delta.is_finite() {
                    return false;
                }
                let target = self.state.target_offset + delta;
                if self.config.smooth_wheel {
                    self.animate_to(target, self.config.duration, self.config.easing);
                } else {
                    self.jump_to(target);
                }
                true
            }
            InputEvent::Touch { delta_x, delta_y } => {
                let delta = self.gesture_delta(delta_x, delta_y) * self.config.touch_multiplier;
                if delta == 0.0 || !delta.is_finite() {
                    return false;
                }
                let target = self.state.target_offset + delta;
                if self.config.smooth_touch {
                    self.animate_to(target, self.config.duration, self.config.easing);
                } else {
                    self.jump_to(target);
                }
                true
            }
            InputEvent::Resize(surface) => {
                match measure_limit(&self.config, &surface) {
                    Ok(limit) => {
                        self.viewport = surface.viewport;
                        self.limit = limit;
                        let clamped = self.clamp(self.state.target_offset);
                        if clamped != self.state.target_offset {
                            self.animate_to(clamped, self.config.duration, self.config.easing);
                        }
                    }
                    Err(err) => tracing::warn!("Ignoring resize: {err}"),
                }
                false
            }
            InputEvent::Key(_) => false,
        }
    }

    /// Animate to an offset. A newer call replaces the target of an older one.
    pub fn scroll_to(&mut self, target: f32, options: ScrollToOptions) {
        if self.mode != EngineMode::Active || !target.is_finite() {
            return;
        }
        let duration = options
            .duration
            .filter(|d| d.is_finite())
            .unwrap_or(self.config.duration);
        if options.immediate || duration <= 0.0 {
            self.jump_to(target);
        } else {
            self.animate_to(target, duration, options.easing.unwrap_or(self.config.easing));
        }
    }

    /// Register an observer called with every emitted event
    pub fn subscribe(&mut self, observer: impl FnMut(&ScrollEvent) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.insert(id, Box::new(observer));
        id
    }

    /// Remove an observer
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.shift_remove(&id).is_some()
    }

    /// Release every host registration. The engine never moves again.
    pub fn destroy(&mut self) {
        if let Some(mut subscriptions) = self.subscriptions.take() {
            subscriptions.release();
        }
        if self.mode == EngineMode::Active {
            tracing::debug!("Smooth scroll destroyed at offset {}", self.state.virtual_offset);
        }
        self.observers.clear();
        self.animation = None;
        self.state.is_animating = false;
        self.mode = EngineMode::Destroyed;
    }

    /// Current state
    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Maximum offset
    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Last measured viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Configuration in use
    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Whether the engine drives scrolling (has a surface and is not destroyed)
    pub fn is_active(&self) -> bool {
        self.mode == EngineMode::Active
    }

    /// Whether `destroy` has been called
    pub fn is_destroyed(&self) -> bool {
        self.mode == EngineMode::Destroyed
    }

    fn gesture_delta(&self, delta_x: f32, delta_y: f32) -> f32 {
        match self.config.gesture_orientation {
            GestureOrientation::Vertical => delta_y,
            GestureOrientation::Horizontal => delta_x,
            GestureOrientation::Both => {
                if delta_x.abs() > delta_y.abs() {
                    delta_x
                } else {
                    delta_y
                }
            }
        }
    }

    fn clamp(&self, offset: f32) -> f32 {
        if self.config.infinite {
            offset
        } else {
            offset.clamp(0.0, self.limit)
        }
    }

    fn animate_to(&mut self, target: f32, duration: f32, easing: Easing) {
        if !target.is_finite() {
            return;
        }
        let target = self.clamp(target);
        self.state.target_offset = target;
        if target == self.state.virtual_offset {
            self.animation = None;
            self.state.is_animating = false;
            return;
        }
        self.animation = Some(ScrollAnimation {
            from: self.state.virtual_offset,
            to: target,
            elapsed: 0.0,
            duration,
            easing,
        });
        self.state.is_animating = true;
    }

    fn jump_to(&mut self, target: f32) {
        if !target.is_finite() {
            return;
        }
        let target = self.clamp(target);
        self.animation = None;
        self.state.target_offset = target;
        self.state.is_animating = false;
        if target != self.state.virtual_offset {
            self.state.virtual_offset = target;
            self.dirty = true;
        }
    }

    fn event(&self) -> ScrollEvent {
        let offset = if self.config.infinite && self.limit > 0.0 {
            self.state.virtual_offset.rem_euclid(self.limit)
        } else {
            self.state.virtual_offset
        };
        let direction = if self.state.velocity > 0.0 {
            ScrollDirection::Forward
        } else if self.state.velocity < 0.0 {
            ScrollDirection::Backward
        } else {
            ScrollDirection::Idle
        };
        ScrollEvent {
            offset,
            velocity: self.state.velocity,
            direction,
            progress: if self.limit > 0.0 { (offset / self.limit).clamp(0.0, 1.0) } else { 0.0 },
            limit: self.limit,
        }
    }
}

impl Drop for ScrollEngine {
    fn drop(&mut self) {
        if let Some(mut subscriptions) = self.subscriptions.take() {
            subscriptions.release();
        }
    }
}

fn measure_limit(config: &ScrollConfig, surface: &Surface) -> Result<f32, ScrollError> {
    let (content, visible) = match config.orientation {
        Orientation::Vertical => (surface.content_height, surface.viewport.height),
        Orientation::Horizontal => (surface.content_width, surface.viewport.width),
    };
    if !content.is_finite() || !visible.is_finite() || content < 0.0 {
        return Err(ScrollError::InvalidSurface {
            content,
            viewport: surface.viewport,
        });
    }
    Ok((content - visible).max(0.0))
}
