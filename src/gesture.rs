//! Translation of drag gestures into category-switch intents.

use crate::models::Category;

/// Horizontal displacement, in logical units, a drag must exceed.
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// Approximate pixel size of one terminal cell, used to express mouse drags
/// in the same logical units as touch displacement.
pub const CELL_WIDTH_UNITS: f32 = 8.0;
pub const CELL_HEIGHT_UNITS: f32 = 16.0;

/// Map a drag vector to the category it asks for.
///
/// Rightward drags lead back to `Popular`, leftward drags move on to
/// `TopRated`. Vertical-dominant drags are left to the scrolling list.
pub fn swipe_intent(dx: f32, dy: f32, current: Category) -> Option<Category> {
    if is_vertical(dx, dy) {
        return None;
    }
    match current {
        Category::TopRated if dx > SWIPE_THRESHOLD => Some(Category::Popular),
        Category::Popular if dx < -SWIPE_THRESHOLD => Some(Category::TopRated),
        _ => None,
    }
}

pub fn is_vertical(dx: f32, dy: f32) -> bool {
    dy.abs() > dx.abs()
}

/// Follows one mouse press/release pair across cells.
#[derive(Debug, Default)]
pub struct DragTracker {
    origin: Option<(u16, u16)>,
}

impl DragTracker {
    pub fn press(&mut self, column: u16, row: u16) {
        self.origin = Some((column, row));
    }

    /// Finish the drag, returning its vector in logical units.
    pub fn release(&mut self, column: u16, row: u16) -> Option<(f32, f32)> {
        let (start_col, start_row) = self.origin.take()?;
        let dx = (column as f32 - start_col as f32) * CELL_WIDTH_UNITS;
        let dy = (row as f32 - start_row as f32) * CELL_HEIGHT_UNITS;
        Some((dx, dy))
    }

    pub fn cancel(&mut self) {
        self.origin = None;
    }
}
