//! Scroll position over a table of rows.
//!
//! `position` is the index of the first visible row and always stays in
//! `0..=max(0, total - visible_rows)` once clamped against the current
//! table size.

use std::ops::Range;

use queuetop_protocol::{FOOTER_ROWS, HEADER_ROWS};

/// Direction of a single-row scroll step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn from_delta(delta: i8) -> Option<Self> {
        match delta.signum() {
            -1 => Some(ScrollDirection::Up),
            1 => Some(ScrollDirection::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    position: usize,
    visible_rows: usize,
}

impl Viewport {
    pub fn new(visible_rows: usize) -> Self {
        Self {
            position: 0,
            visible_rows,
        }
    }

    /// Body rows available on a terminal `height` rows tall.
    pub fn rows_for_height(height: u16) -> usize {
        (height as usize).saturating_sub(HEADER_ROWS + FOOTER_ROWS)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Largest valid position for a table of `total` rows.
    pub fn max_position(&self, total: usize) -> usize {
        total.saturating_sub(self.visible_rows)
    }

    pub fn scroll_up(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    pub fn scroll_down(&mut self, total: usize) {
        self.position = (self.position + 1).min(self.max_position(total));
    }

    pub fn scroll(&mut self, direction: ScrollDirection, total: usize) {
        match direction {
            ScrollDirection::Up => self.scroll_up(),
            ScrollDirection::Down => self.scroll_down(total),
        }
    }

    /// Apply a batch of queued scroll deltas in arrival order. Returns
    /// whether the position moved.
    pub fn apply_deltas<I>(&mut self, deltas: I, total: usize) -> bool
    where
        I: IntoIterator<Item = i8>,
    {
        let before = self.position;
        for direction in deltas.into_iter().filter_map(ScrollDirection::from_delta) {
            self.scroll(direction, total);
        }
        self.position != before
    }

    /// Adopt a new visible height and re-clamp.
    pub fn resize(&mut self, visible_rows: usize, total: usize) {
        self.visible_rows = visible_rows;
        self.clamp(total);
    }

    /// Pull `position` back into range for a table of `total` rows.
    pub fn clamp(&mut self, total: usize) {
        self.position = self.position.min(self.max_position(total));
    }

    /// Indices of the rows currently on screen.
    pub fn visible_range(&self, total: usize) -> Range<usize> {
        let start = self.position.min(total);
        let end = (self.position + self.visible_rows).min(total);
        start..end
    }

    /// One-based index of the last row on screen, or 0 for an empty table.
    pub fn last_visible(&self, total: usize) -> usize {
        self.visible_range(total).end
    }
}
