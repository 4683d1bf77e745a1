// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layout measurements supplied by the host page.

use crate::timeline::ElementId;
use serde::{Deserialize, Serialize};

/// Visible viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Document-relative box of an element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Bounds {
    /// Create bounds
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Read-only view of the current page layout
pub trait Layout {
    /// Current viewport
    fn viewport(&self) -> Viewport;

    /// Box of an element, `None` when it is not (or no longer) laid out
    fn bounds(&self, element: ElementId) -> Option<Bounds>;

    /// Whether an element is currently laid out
    fn contains(&self, element: ElementId) -> bool {
        self.bounds(element).is_some()
    }
}
