// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host environment seams.
//!
//! The scroll core never talks to a browser directly. A [`Host`] hands out
//! native listener and frame-callback registrations, [`Layout`] answers
//! measurement queries, and [`ContentVisibility`] toggles the page content.
//! All of them are implemented by the embedding (a browser binding, the
//! simulation binary, or a test double).

pub use flowforce_motion::layout::{Bounds, Layout, Viewport};

use std::rc::Rc;

/// Registration of a native event listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Registration of a per-frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameCallbackId(pub u64);

/// Native event a listener is attached for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Mouse wheel / trackpad
    Wheel,
    /// Touch move
    Touch,
    /// Viewport resize
    Resize,
    /// Key press
    Keydown,
}

/// Rendering surface measurements, available only in a browser
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// Visible viewport
    pub viewport: Viewport,
    /// Full scrollable content width
    pub content_width: f32,
    /// Full scrollable content height
    pub content_height: f32,
}

/// Listener and frame scheduling provided by the embedding
pub trait Host {
    /// Current surface, `None` outside a rendering context
    fn surface(&self) -> Option<Surface>;

    /// Attach a native listener
    fn add_listener(&self, kind: ListenerKind) -> ListenerId;

    /// Detach a native listener
    fn remove_listener(&self, id: ListenerId);

    /// Start receiving a callback before every repaint
    fn add_frame_callback(&self) -> FrameCallbackId;

    /// Stop receiving frame callbacks
    fn remove_frame_callback(&self, id: FrameCallbackId);
}

/// Switch for the page content wrapper
pub trait ContentVisibility {
    /// Show or hide the page content
    fn set_content_visible(&self, visible: bool);
}

/// Owned set of host registrations, released together.
///
/// Released on [`Subscriptions::release`] or on drop, so a setup routine that
/// bails out with `?` after acquiring registrations leaves nothing attached.
pub struct Subscriptions {
    host: Rc<dyn Host>,
    listeners: Vec<ListenerId>,
    frames: Vec<FrameCallbackId>,
}

impl Subscriptions {
    /// Create an empty set bound to a host
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self {
            host,
            listeners: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Attach a listener and remember it
    pub fn listen(&mut self, kind: ListenerKind) -> ListenerId {
        let id = self.host.add_listener(kind);
        self.listeners.push(id);
        id
    }

    /// Request frame callbacks and remember the registration
    pub fn request_frames(&mut self) -> FrameCallbackId {
        let id = self.host.add_frame_callback();
        self.frames.push(id);
        id
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.listeners.len() + self.frames.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Detach everything
    pub fn release(&mut self) {
        for id in self.frames.drain(..) {
            self.host.remove_frame_callback(id);
        }
        for id in self.listeners.drain(..) {
            self.host.remove_listener(id);
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.release();
    }
}

/// Keys the scroll core reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Page back
    ArrowLeft,
    /// Page forward
    ArrowRight,
    /// Up arrow, left to the browser
    ArrowUp,
    /// Down arrow, left to the browser
    ArrowDown,
    /// Any other key
    Other,
}

/// Native input forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Wheel deltas in pixels
    Wheel {
        /// Horizontal delta
        delta_x: f32,
        /// Vertical delta
        delta_y: f32,
    },
    /// Touch-move deltas in pixels (positive = content moves up/left)
    Touch {
        /// Horizontal delta
        delta_x: f32,
        /// Vertical delta
        delta_y: f32,
    },
    /// Key press
    Key(Key),
    /// Viewport or content size changed
    Resize(Surface),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingHost;

    #[test]
    fn test_subscriptions_release_on_drop() {
        let host = Rc::new(RecordingHost::browser(1440.0, 900.0, 5000.0));
        {
            let mut subscriptions = Subscriptions::new(host.clone());
            assert!(subscriptions.is_empty());
            subscriptions.listen(ListenerKind::Wheel);
            subscriptions.listen(ListenerKind::Resize);
            subscriptions.request_frames();
            assert_eq!(subscriptions.len(), 3);
            assert!(host.has_listener(ListenerKind::Wheel));
            assert_eq!(host.frame_callback_count(), 1);
        }
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.frame_callback_count(), 0);
    }

    #[test]
    fn test_release_is_idempotent() {
        let host = Rc::new(RecordingHost::browser(1440.0, 900.0, 5000.0));
        let mut subscriptions = Subscriptions::new(host.clone());
        subscriptions.listen(ListenerKind::Keydown);
        subscriptions.release();
        assert!(subscriptions.is_empty());
        subscriptions.release();
        assert_eq!(host.listener_count(), 0);
    }
}
