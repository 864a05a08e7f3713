//! Pixel geometry shared by gestures, notes and surfaces.
//!
//! All coordinates are integer CSS pixels. Arithmetic saturates instead of
//! wrapping so malformed pointer streams cannot overflow.

use serde::{Deserialize, Serialize};

/// Absolute or surface-relative pixel coordinate.
///
/// Serialized as `{"x": .., "y": ..}` to match the persisted `position` shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cumulative offset from `origin` to `self`.
    pub fn delta_from(self, origin: Point) -> Delta {
        Delta {
            x: self.x.saturating_sub(origin.x),
            y: self.y.saturating_sub(origin.y),
        }
    }

    /// Returns this point shifted by `delta`.
    pub fn offset(self, delta: Delta) -> Point {
        Point {
            x: self.x.saturating_add(delta.x),
            y: self.y.saturating_add(delta.y),
        }
    }
}

/// Relative pointer movement since a gesture's origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Delta {
    pub x: i32,
    pub y: i32,
}

impl Delta {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Grows (or shrinks) by `delta`, clamping each axis at zero.
    pub fn grow(self, delta: Delta) -> Size {
        Size {
            width: grow_axis(self.width, delta.x),
            height: grow_axis(self.height, delta.y),
        }
    }
}

fn grow_axis(value: u32, delta: i32) -> u32 {
    let grown = i64::from(value) + i64::from(delta);
    grown.clamp(0, i64::from(u32::MAX)) as u32
}
