// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host and layout doubles shared by the unit tests.

use crate::host::{
    Bounds, ContentVisibility, FrameCallbackId, Host, Layout, ListenerId, ListenerKind, Surface,
    Viewport,
};
use flowforce_motion::ElementId;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Host double counting live registrations
pub struct RecordingHost {
    pub surface: Option<Surface>,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<u64, ListenerKind>>,
    frames: RefCell<Vec<u64>>,
}

impl RecordingHost {
    pub fn browser(width: f32, height: f32, content_height: f32) -> Self {
        Self::with_surface(Some(Surface {
            viewport: Viewport::new(width, height),
            content_width: width,
            content_height,
        }))
    }

    pub fn server() -> Self {
        Self::with_surface(None)
    }

    pub fn with_surface(surface: Option<Surface>) -> Self {
        Self {
            surface,
            next_id: Cell::new(1),
            listeners: RefCell::new(HashMap::new()),
            frames: RefCell::new(Vec::new()),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn frame_callback_count(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn has_listener(&self, kind: ListenerKind) -> bool {
        self.listeners.borrow().values().any(|k| *k == kind)
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl Host for RecordingHost {
    fn surface(&self) -> Option<Surface> {
        self.surface
    }

    fn add_listener(&self, kind: ListenerKind) -> ListenerId {
        let id = self.next();
        self.listeners.borrow_mut().insert(id, kind);
        ListenerId(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(&id.0);
    }

    fn add_frame_callback(&self) -> FrameCallbackId {
        let id = self.next();
        self.frames.borrow_mut().push(id);
        FrameCallbackId(id)
    }

    fn remove_frame_callback(&self, id: FrameCallbackId) {
        self.frames.borrow_mut().retain(|f| *f != id.0);
    }
}

/// Mutable element boxes keyed by handle
pub struct TestLayout {
    pub viewport: Viewport,
    pub elements: HashMap<ElementId, Bounds>,
}

impl TestLayout {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            elements: HashMap::new(),
        }
    }

    pub fn with(mut self, element: ElementId, bounds: Bounds) -> Self {
        self.elements.insert(element, bounds);
        self
    }
}

impl Layout for TestLayout {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn bounds(&self, element: ElementId) -> Option<Bounds> {
        self.elements.get(&element).copied()
    }
}

/// Records every visibility change
#[derive(Default)]
pub struct VisibilityLog {
    pub changes: RefCell<Vec<bool>>,
}

impl VisibilityLog {
    pub fn last(&self) -> Option<bool> {
        self.changes.borrow().last().copied()
    }

    pub fn ever_hidden(&self) -> bool {
        self.changes.borrow().iter().any(|v| !v)
    }
}

impl ContentVisibility for VisibilityLog {
    fn set_content_visible(&self, visible: bool) {
        self.changes.borrow_mut().push(visible);
    }
}
