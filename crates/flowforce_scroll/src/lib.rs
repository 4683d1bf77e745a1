// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll-driven animation core for the FlowForce site.
//!
//! This crate provides:
//! - A smooth scroll engine driven by host frames and input
//! - Scroll-linked trigger regions with enter/leave callbacks
//! - The pinned horizontal-scroll section and its snap
//! - The one-shot intro/preloader sequencer
//! - Scroll progress readouts and the section backdrop switcher
//!
//! ## Architecture
//!
//! Everything is single-threaded and frame-driven. The embedding implements
//! [`Host`], [`Layout`] and [`ContentVisibility`], forwards native input and
//! calls [`ScrollScene::frame`] once per repaint. Within a frame the engine
//! moves first, then triggers recompute progress, then bound timelines run.

pub mod backdrop;
pub mod engine;
pub mod host;
pub mod indicator;
pub mod intro;
pub mod pin;
pub mod scene;
pub mod trigger;

#[cfg(test)]
mod test_support;

pub use backdrop::{Backdrop, BackdropSwitcher};
pub use engine::{
    GestureOrientation, ObserverId, Orientation, ScrollConfig, ScrollDirection, ScrollEngine,
    ScrollError, ScrollEvent, ScrollState, ScrollToOptions,
};
pub use host::{
    Bounds, ContentVisibility, FrameCallbackId, Host, InputEvent, Key, Layout, ListenerId,
    ListenerKind, Subscriptions, Surface, Viewport,
};
pub use indicator::{ScrollIndicator, ScrollProgress};
pub use intro::{
    logo_intro_timeline, IntroConfig, IntroElements, IntroError, IntroEvent, IntroOutro,
    IntroPhase, IntroSequencer, MemorySessionStore, ResourceKind, ResourceOutcome,
    ResourceReadiness, SessionFlag, SessionFlags, SessionStore,
};
pub use pin::{HorizontalPin, PinFrame, PinPhase, PinSnap, SnapTarget};
pub use scene::{BindingMode, FrameReport, ScrollScene};
pub use trigger::{
    ScrollTriggers, TriggerError, TriggerEvent, TriggerEventKind, TriggerHandler, TriggerId,
    TriggerPoint, TriggerSpec,
};
