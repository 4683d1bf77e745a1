// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation building blocks for the FlowForce site.
//!
//! This crate provides:
//! - Easing curves
//! - Tweens and timelines with stagger and overlap positioning
//! - Scroll-trigger presets and reveal builders
//! - Slat reveal clip animations
//! - The responsive animation policy
//!
//! Nothing here touches a rendering surface; timelines are sampled into
//! [`StyleFrame`]s that the host applies.

pub mod easing;
pub mod layout;
pub mod presets;
pub mod responsive;
pub mod slat;
pub mod timeline;

pub use easing::{Easing, EasingParseError};
pub use layout::{Bounds, Layout, Viewport};
pub use presets::{RevealParams, TriggerAnchor, TriggerPreset};
pub use responsive::{DeviceClass, Environment, ResizeDebounce, ResponsiveAnimationConfig};
pub use slat::{SlatOptions, SlatReveal, SlatTarget};
pub use timeline::{
    ElementId, PlaybackEvent, PlaybackState, Position, Property, Stagger, StyleFrame, Timeline,
    TimelineId, TimelinePlayer, Tween, TweenVars,
};
