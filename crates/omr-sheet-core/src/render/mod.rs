//! Drawing the sheet against an abstract canvas.
//!
//! # Coordinate System
//!
//! Every renderer in this module works in millimetres with a **top-left
//! origin**: X increases to the right, Y increases downward. Text is
//! positioned by its baseline. Canvases that use a different convention
//! (PDF is bottom-left, in points) convert at their boundary.

pub mod grid;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

use crate::config::Color;
use crate::error::Result;

pub use grid::QuestionGrid;
pub use template::{PageTemplate, TemplateMetrics, TemplateOutcome};

/// How a closed shape is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Outline with the draw colour
    Stroke,
    /// Fill with the fill colour
    Fill,
    /// Fill, then outline
    FillStroke,
}

/// Weight of the standard sans-serif face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// Drawing surface the sheet renderers issue commands against.
///
/// Colour, line width and font are sticky state, like a PDF graphics state.
pub trait Canvas {
    fn set_draw_color(&mut self, color: Color);

    fn set_fill_color(&mut self, color: Color);

    fn set_text_color(&mut self, color: Color);

    fn set_line_width(&mut self, width: f32);

    /// Select the font used by `draw_text` and `measure_text_width`.
    fn set_font(&mut self, style: FontStyle, size_pt: f32);

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint);

    /// Ellipse inscribed in the given box.
    fn draw_ellipse(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint);

    /// Draw `text` with its baseline starting at `(x, y)`.
    fn draw_text(&mut self, x: f32, y: f32, text: &str);

    /// Width of `text` in the current font, in millimetres.
    fn measure_text_width(&self, text: &str) -> f32;

    /// Current font size converted to millimetres.
    fn font_size_mm(&self) -> f32;

    /// Finish the current page and continue on a fresh one.
    fn start_new_page(&mut self);

    /// Place an image with its top-left corner at `(x, y)`.
    ///
    /// When only one of `width` and `height` is given the other follows the
    /// image's aspect ratio. A missing or undecodable file yields
    /// [`Error::ImageLoad`](crate::Error::ImageLoad) and draws nothing.
    fn place_image(
        &mut self,
        path: &Path,
        x: f32,
        y: f32,
        width: Option<f32>,
        height: Option<f32>,
    ) -> Result<()>;

    /// Write the finished document to `path`.
    fn save(&mut self, path: &Path) -> Result<()>;
}

/// Greedy word wrap so no line exceeds `max_width` when measured on `canvas`.
///
/// A single word wider than `max_width` gets a line of its own.
pub fn wrap_text<C: Canvas + ?Sized>(canvas: &C, text: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
            continue;
        }

        let candidate = format!("{current_line} {word}");
        if canvas.measure_text_width(&candidate) <= max_width {
            current_line = candidate;
        } else {
            lines.push(std::mem::replace(&mut current_line, word.to_string()));
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}
