//! Drag-end placement rules.
//!
//! A note must keep at least `PLACEMENT_MARGIN` pixels of itself inside the
//! surface horizontally, its top edge inside the surface, and its top edge at
//! least `PLACEMENT_MARGIN` pixels above the bottom. Resizing has no
//! counterpart check.

use crate::model::geometry::{Point, Size};
use std::time::Duration;

/// Minimum visible band, in pixels.
pub const PLACEMENT_MARGIN: i64 = 50;

/// How long the rejected-move cue stays on the element.
pub const ROLLBACK_DURATION: Duration = Duration::from_millis(320);

/// Returns `true` when a note at `position` with `note_width` would be
/// dragged out of reach on a surface of `surface` size.
pub fn is_out_of_bounds(position: Point, note_width: u32, surface: Size) -> bool {
    let top = i64::from(position.y);
    let left = i64::from(position.x);
    let width = i64::from(note_width);

    top < 0
        || top + PLACEMENT_MARGIN > i64::from(surface.height)
        || left + PLACEMENT_MARGIN > i64::from(surface.width)
        || left + width - PLACEMENT_MARGIN < 0
}

#[cfg(test)]
mod tests {
    use super::is_out_of_bounds;
    use crate::model::geometry::{Point, Size};

    const SURFACE: Size = Size::new(800, 600);

    #[test]
    fn inside_positions_are_accepted() {
        assert!(!is_out_of_bounds(Point::new(0, 0), 200, SURFACE));
        assert!(!is_out_of_bounds(Point::new(750, 550), 200, SURFACE));
        assert!(!is_out_of_bounds(Point::new(-150, 10), 200, SURFACE));
    }

    #[test]
    fn each_edge_rejects() {
        assert!(is_out_of_bounds(Point::new(10, -1), 200, SURFACE));
        assert!(is_out_of_bounds(Point::new(10, 551), 200, SURFACE));
        assert!(is_out_of_bounds(Point::new(751, 10), 200, SURFACE));
        assert!(is_out_of_bounds(Point::new(-151, 10), 200, SURFACE));
    }
}
