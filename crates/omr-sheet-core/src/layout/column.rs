//! Horizontal placement of question groups within their columns.
//!
//! A question group is the number label followed by one bubble per option.
//! Each group is centred inside its column when it is narrower than the
//! column. A group wider than its column is not an error: the centring
//! offset is clamped to zero and the group overflows to the right.

use crate::config::PageGeometry;

/// Horizontal placement of one column's question group.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSlot {
    /// Left edge of the number label slot
    pub start_x: f32,
    /// Width of label slot, gap and bubble row together
    pub group_width: f32,
    /// Left edge of each option bubble, in option order
    pub bubble_xs: Vec<f32>,
}

impl ColumnSlot {
    /// Right edge of the number label slot, where labels are right-aligned.
    pub fn label_right(&self, geometry: &PageGeometry) -> f32 {
        self.start_x + geometry.number_width
    }
}

/// Computes column slots from a page geometry.
#[derive(Debug, Clone, Copy)]
pub struct ColumnGeometry<'a> {
    geometry: &'a PageGeometry,
}

impl<'a> ColumnGeometry<'a> {
    pub const fn new(geometry: &'a PageGeometry) -> Self {
        Self { geometry }
    }

    /// Width of the label slot, gap and all bubbles of one question.
    #[allow(clippy::cast_precision_loss)]
    pub fn group_width(&self) -> f32 {
        let g = self.geometry;
        let k = g.option_count() as f32;
        g.number_width + g.label_gap + k * g.bubble_size + (k - 1.0).max(0.0) * g.bubble_gap
    }

    /// Left edge and width of the question group in `column`.
    #[allow(clippy::cast_precision_loss)]
    pub fn column_start(&self, column: usize) -> (f32, f32) {
        let g = self.geometry;
        let column_width = g.column_width();
        let group_width = self.group_width();
        let base = (column as f32).mul_add(column_width, g.margin);
        let centring = ((column_width - group_width) / 2.0).max(0.0);
        (base + centring, group_width)
    }

    /// Horizontal distance between the left edges of neighbouring bubbles.
    pub fn bubble_pitch(&self) -> f32 {
        self.geometry.bubble_size + self.geometry.bubble_gap
    }

    /// Full placement of the question group in `column`.
    #[allow(clippy::cast_precision_loss)]
    pub fn slot(&self, column: usize) -> ColumnSlot {
        let g = self.geometry;
        let (start_x, group_width) = self.column_start(column);
        let first = start_x + g.number_width + g.label_gap;
        let pitch = self.bubble_pitch();
        let bubble_xs = (0..g.option_count())
            .map(|i| (i as f32).mul_add(pitch, first))
            .collect();

        ColumnSlot {
            start_x,
            group_width,
            bubble_xs,
        }
    }
}
