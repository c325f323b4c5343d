//! Splitting a run of questions across capacity-bounded pages.
//!
//! Each page holds at most `max_rows * columns` questions, filled column by
//! column: a column is filled top to bottom before the next one starts.
//! Questions are numbered from 1.

use crate::config::PageGeometry;
use crate::error::{Error, Result};

/// The plan for one rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Page number within the document (0-indexed)
    pub page_index: usize,
    /// Top of the question area, below the page template
    pub start_y: f32,
    /// Question rows that fit between `start_y` and the bottom margin
    pub max_rows: usize,
    /// Columns that actually receive questions on this page
    pub columns_used: usize,
    /// First question on the page (1-based, inclusive)
    pub first_question: usize,
    /// Last question on the page (1-based, inclusive)
    pub last_question: usize,
}

/// Where one question sits on its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSlot {
    /// Question number within the whole document (1-based)
    pub question: usize,
    pub column: usize,
    pub row: usize,
}

impl PageLayout {
    pub const fn question_count(&self) -> usize {
        self.last_question - self.first_question + 1
    }

    /// Slot for each question on the page, in increasing question order.
    pub fn slots(&self) -> impl Iterator<Item = QuestionSlot> + '_ {
        (self.first_question..=self.last_question).map(|question| self.slot_of(question))
    }

    /// Column-major slot of a question that lies on this page.
    pub const fn slot_of(&self, question: usize) -> QuestionSlot {
        let local = question - self.first_question;
        QuestionSlot {
            question,
            column: local / self.max_rows,
            row: local % self.max_rows,
        }
    }
}

/// Number of question rows that fit below `start_y`.
///
/// Fails with [`Error::PageTooSmall`] when not even one row fits.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rows_per_column(geometry: &PageGeometry, start_y: f32) -> Result<usize> {
    let available = geometry.page_height - start_y - geometry.margin;
    let rows = (available / geometry.row_height).floor();

    if !rows.is_finite() || rows < 1.0 {
        return Err(Error::PageTooSmall {
            start_y,
            page_height: geometry.page_height,
            margin: geometry.margin,
            row_height: geometry.row_height,
        });
    }

    // rows >= 1.0 and finite here
    Ok(rows as usize)
}

/// Plan the page starting at `first_question` with `remaining` questions left.
///
/// Returns `Ok(None)` once no questions remain.
pub fn plan_page(
    geometry: &PageGeometry,
    page_index: usize,
    start_y: f32,
    first_question: usize,
    remaining: usize,
) -> Result<Option<PageLayout>> {
    if remaining == 0 {
        return Ok(None);
    }

    let max_rows = rows_per_column(geometry, start_y)?;
    let capacity = max_rows.saturating_mul(geometry.columns);
    let questions_this_page = remaining.min(capacity);
    let columns_used = geometry.columns.min(questions_this_page.div_ceil(max_rows));

    Ok(Some(PageLayout {
        page_index,
        start_y,
        max_rows,
        columns_used,
        first_question,
        last_question: first_question + (questions_this_page - 1),
    }))
}

/// Lazy sequence of page plans covering questions `1..=total`.
///
/// Stops after the last page, or after yielding the first error.
#[derive(Debug, Clone)]
pub struct Pagination<'a> {
    geometry: &'a PageGeometry,
    start_y: f32,
    total: usize,
    /// Questions already handed out to earlier pages
    assigned: usize,
    page_index: usize,
    failed: bool,
}

impl<'a> Pagination<'a> {
    pub const fn new(geometry: &'a PageGeometry, start_y: f32, total: usize) -> Self {
        Self {
            geometry,
            start_y,
            total,
            assigned: 0,
            page_index: 0,
            failed: false,
        }
    }

    /// Questions not yet assigned to a page
    pub const fn remaining(&self) -> usize {
        self.total.saturating_sub(self.assigned)
    }
}

impl Iterator for Pagination<'_> {
    type Item = Result<PageLayout>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match plan_page(
            self.geometry,
            self.page_index,
            self.start_y,
            self.assigned + 1,
            self.remaining(),
        ) {
            Ok(Some(layout)) => {
                self.assigned = layout.last_question;
                self.page_index += 1;
                Some(Ok(layout))
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
