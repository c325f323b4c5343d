//! Page-invariant decoration: border, title ribbon, roll-number block,
//! candidate information block and the optional logo and QR images.
//!
//! The same template is drawn on every page. Its vertical extent only
//! depends on fixed block sizes, so [`TemplateMetrics`] can report where the
//! question grid starts without drawing anything.

use std::path::Path;

use tracing::debug;

use super::{Canvas, FontStyle, Paint, wrap_text};
use crate::config::{DocumentConfig, PageGeometry, Theme};
use crate::error::{AssetKind, AssetWarning};

// =============================================================================
// Layout Constants
// =============================================================================

/// Distance of the page border from the paper edge.
const BORDER_INSET: f32 = 5.0;

/// Diameter of the filled corner dots.
const CROP_MARK_SIZE: f32 = 2.0;

const RIBBON_HEIGHT: f32 = 16.0;

/// Space between the ribbon and the top of the side blocks.
const HEADER_GAP: f32 = 6.0;

/// Space below the taller side block.
const HEADER_PADDING: f32 = 6.0;

/// Extra space between the header and the option letter row.
const GRID_PADDING: f32 = 4.0;

/// Horizontal gap between the roll block and the information block.
const BLOCK_GAP: f32 = 8.0;

const LOGO_HEIGHT: f32 = 14.0;

const QR_SIZE: f32 = 26.0;
const QR_PAD: f32 = 3.0;
const QR_FRAME: f32 = 1.5;

// Roll-number block
const ROLL_BOX_W: f32 = 8.0;
const ROLL_BOX_H: f32 = 8.0;
const ROLL_BOX_GAP: f32 = 1.0;
const ROLL_CIRCLE_D: f32 = 4.2;
const ROLL_ROW_STEP: f32 = 6.0;
const ROLL_LABEL_GAP: f32 = 2.0;
const ROLL_TOP_GAP: f32 = 2.0;
const ROLL_PADDING: f32 = 3.0;
const ROLL_TITLE_H: f32 = 5.0;
const ROLL_DIGITS: [&str; 10] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"];

// Information block
const INFO_FIELD_H: f32 = 8.0;
const INFO_FIELD_GAP: f32 = 2.0;
const INFO_FIELDS: [&str; 3] = ["Name:", "Date:", "Center Code:"];
const SIGNATURE_BOX_H: f32 = INFO_FIELD_H + 8.0;
const SIGNATURE_ADVANCE: f32 = INFO_FIELD_H + 10.0;
const INSTRUCTIONS_H: f32 = 24.0;
const INSTRUCTIONS_LINE_H: f32 = 4.0;
const MIN_INFO_WIDTH: f32 = 40.0;
const INSTRUCTIONS: [&str; 5] = [
    "Instructions:",
    "* Use blue/black pen - fill one bubble only.",
    "* Do not make stray marks / fold sheet.",
    "* Fill Roll No. boxes and darken circles.",
    "* Check that all bubbles are fully filled.",
];

pub const SHEET_SUBTITLE: &str = "OMR ANSWER SHEET";

// =============================================================================
// Sizing
// =============================================================================

/// Sizes of the template blocks, independent of any canvas.
#[derive(Debug, Clone, Copy)]
pub struct TemplateMetrics<'a> {
    geometry: &'a PageGeometry,
}

impl<'a> TemplateMetrics<'a> {
    pub const fn new(geometry: &'a PageGeometry) -> Self {
        Self { geometry }
    }

    /// Top edge of the roll-number and information blocks.
    pub fn header_top(&self) -> f32 {
        self.geometry.margin + RIBBON_HEIGHT + HEADER_GAP
    }

    /// Outer height of the roll-number block, padding included.
    #[allow(clippy::cast_precision_loss)]
    pub fn roll_block_height(&self) -> f32 {
        let grid_height = ROLL_DIGITS.len() as f32 * ROLL_ROW_STEP;
        2.0f32.mul_add(ROLL_PADDING, ROLL_TITLE_H + ROLL_BOX_H + ROLL_TOP_GAP + grid_height)
    }

    /// Outer width of the roll-number block for a digit label of `label_width`.
    #[allow(clippy::cast_precision_loss)]
    pub fn roll_block_width(&self, label_width: f32) -> f32 {
        let digits = self.geometry.roll_digits as f32;
        let boxes_width = digits.mul_add(ROLL_BOX_W + ROLL_BOX_GAP, -ROLL_BOX_GAP);
        let grid_width = label_width + digits.mul_add(ROLL_CIRCLE_D + ROLL_BOX_GAP, -ROLL_BOX_GAP);
        let content_width = (boxes_width + label_width).max(grid_width);
        2.0f32.mul_add(ROLL_PADDING, content_width)
    }

    /// Height of the information and instructions block.
    #[allow(clippy::cast_precision_loss)]
    pub fn info_block_height(&self) -> f32 {
        let fields = INFO_FIELDS.len() as f32 * (INFO_FIELD_H + INFO_FIELD_GAP);
        fields + SIGNATURE_ADVANCE + INSTRUCTIONS_H
    }

    /// Width of the information block to the right of a roll block of `roll_width`.
    pub fn info_block_width(&self, roll_width: f32) -> f32 {
        (self.geometry.inner_width() - roll_width - BLOCK_GAP).max(MIN_INFO_WIDTH)
    }

    /// Y offset where the question grid may begin.
    ///
    /// The grid starts below whichever side block is taller.
    pub fn question_area_top(&self) -> f32 {
        let tallest = self.roll_block_height().max(self.info_block_height());
        self.geometry.margin + RIBBON_HEIGHT + tallest + HEADER_PADDING + GRID_PADDING
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Result of drawing the template on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateOutcome {
    /// Top of the question area
    pub start_y: f32,
    /// Images that could not be placed
    pub warnings: Vec<AssetWarning>,
}

/// Draws the decoration shared by every page of a sheet.
pub struct PageTemplate<'a> {
    geometry: &'a PageGeometry,
    theme: &'a Theme,
    document: &'a DocumentConfig,
}

impl<'a> PageTemplate<'a> {
    pub const fn new(
        geometry: &'a PageGeometry,
        theme: &'a Theme,
        document: &'a DocumentConfig,
    ) -> Self {
        Self {
            geometry,
            theme,
            document,
        }
    }

    pub const fn metrics(&self) -> TemplateMetrics<'a> {
        TemplateMetrics::new(self.geometry)
    }

    /// Draw the template and return where the question grid starts.
    pub fn render(&self, canvas: &mut dyn Canvas) -> TemplateOutcome {
        let mut warnings = Vec::new();

        self.draw_border(canvas);
        self.draw_crop_marks(canvas);
        self.draw_ribbon(canvas, &mut warnings);

        let metrics = self.metrics();
        let left_x = self.geometry.margin;
        let top_y = metrics.header_top();
        let (roll_width, roll_height) = self.draw_roll_grid(canvas, left_x, top_y);

        let info_x = left_x + roll_width + BLOCK_GAP;
        let info_width = metrics.info_block_width(roll_width);
        let info_height = self.draw_info_boxes(canvas, info_x, top_y, info_width);

        self.draw_qr(canvas, &mut warnings);

        let tallest = roll_height.max(info_height);
        let start_y =
            self.geometry.margin + RIBBON_HEIGHT + tallest + HEADER_PADDING + GRID_PADDING;

        TemplateOutcome { start_y, warnings }
    }

    fn apply_theme(&self, canvas: &mut dyn Canvas) {
        canvas.set_draw_color(self.theme.primary);
        canvas.set_text_color(self.theme.primary);
        canvas.set_line_width(self.theme.thin_line_width);
    }

    fn draw_border(&self, canvas: &mut dyn Canvas) {
        let g = self.geometry;
        canvas.set_draw_color(self.theme.primary);
        canvas.set_line_width(self.theme.border_line_width);
        canvas.draw_rect(
            BORDER_INSET,
            BORDER_INSET,
            2.0f32.mul_add(-BORDER_INSET, g.page_width),
            2.0f32.mul_add(-BORDER_INSET, g.page_height),
            Paint::Stroke,
        );
    }

    fn draw_crop_marks(&self, canvas: &mut dyn Canvas) {
        let g = self.geometry;
        let near = BORDER_INSET + CROP_MARK_SIZE;
        let right = g.page_width - BORDER_INSET - CROP_MARK_SIZE;
        let bottom = g.page_height - BORDER_INSET - CROP_MARK_SIZE;

        canvas.set_fill_color(self.theme.primary);
        for (x, y) in [(near, near), (right, near), (near, bottom), (right, bottom)] {
            canvas.draw_ellipse(x, y, CROP_MARK_SIZE, CROP_MARK_SIZE, Paint::Fill);
        }
    }

    fn draw_ribbon(&self, canvas: &mut dyn Canvas, warnings: &mut Vec<AssetWarning>) {
        let g = self.geometry;
        let inner_width = g.inner_width();

        canvas.set_fill_color(self.theme.header_background);
        canvas.draw_rect(g.margin, g.margin - 4.0, inner_width, RIBBON_HEIGHT, Paint::Fill);

        // Logo sits on top of the ribbon background
        if let Some(logo) = &self.document.logo {
            place_optional_image(
                canvas,
                AssetKind::Logo,
                logo,
                (g.margin, g.margin - 3.0),
                (None, Some(LOGO_HEIGHT)),
                warnings,
            );
        }

        canvas.set_font(FontStyle::Bold, 15.0);
        canvas.set_text_color(self.theme.accent);
        let title_y = g.margin - 2.0;
        cell_centered(canvas, g.margin, title_y, inner_width, 7.0, &self.document.institute_name);

        canvas.set_font(FontStyle::Bold, 11.0);
        canvas.set_text_color(self.theme.muted);
        cell_centered(canvas, g.margin, title_y + 7.0, inner_width, 6.0, SHEET_SUBTITLE);

        self.apply_theme(canvas);
    }

    /// Roll-number block with its top-left content corner at `(x, y)`.
    ///
    /// Returns the outer width and height of the block.
    #[allow(clippy::cast_precision_loss)]
    fn draw_roll_grid(&self, canvas: &mut dyn Canvas, x: f32, y: f32) -> (f32, f32) {
        let digits = self.geometry.roll_digits;

        canvas.set_font(FontStyle::Regular, 8.0);
        let label_width = canvas.measure_text_width("0") + ROLL_LABEL_GAP + 2.0;
        let boxes_y = y + ROLL_TITLE_H;

        canvas.set_font(FontStyle::Bold, 9.0);
        canvas.set_draw_color(self.theme.light);
        canvas.set_text_color(self.theme.primary);
        canvas.draw_text(x, y + 3.0, "ROLL NO.");

        // Write-in boxes
        canvas.set_line_width(self.theme.thin_line_width);
        for i in 0..digits {
            let bx = (i as f32).mul_add(ROLL_BOX_W + ROLL_BOX_GAP, x);
            canvas.draw_rect(bx, boxes_y, ROLL_BOX_W, ROLL_BOX_H, Paint::Stroke);
        }

        // One bubble column per digit position
        let grid_top = boxes_y + ROLL_BOX_H + ROLL_TOP_GAP;
        canvas.set_line_width(self.theme.bubble_line_width);
        canvas.set_font(FontStyle::Regular, 8.0);
        for (row, digit) in ROLL_DIGITS.iter().enumerate() {
            let row_top = (row as f32).mul_add(ROLL_ROW_STEP, grid_top);
            canvas.draw_text(x + 2.0, row_top + ROLL_CIRCLE_D / 2.0 + 1.2, digit);
            for column in 0..digits {
                let cx = (column as f32).mul_add(ROLL_CIRCLE_D + ROLL_BOX_GAP, x + label_width);
                canvas.draw_ellipse(cx, row_top, ROLL_CIRCLE_D, ROLL_CIRCLE_D, Paint::Stroke);
            }
        }

        let metrics = self.metrics();
        let block_width = metrics.roll_block_width(label_width);
        let block_height = metrics.roll_block_height();

        canvas.set_draw_color(self.theme.light);
        canvas.set_line_width(self.theme.thin_line_width);
        canvas.draw_rect(
            x - ROLL_PADDING,
            y - ROLL_PADDING,
            block_width,
            block_height,
            Paint::Stroke,
        );

        canvas.set_draw_color(self.theme.primary);
        canvas.set_text_color(self.theme.primary);
        (block_width, block_height)
    }

    /// Candidate fields, signature box and printed instructions.
    ///
    /// Returns the height of the block.
    #[allow(clippy::cast_precision_loss)]
    fn draw_info_boxes(&self, canvas: &mut dyn Canvas, x: f32, y: f32, width: f32) -> f32 {
        canvas.set_line_width(self.theme.thin_line_width);
        canvas.set_font(FontStyle::Regular, 10.0);

        for (i, label) in INFO_FIELDS.iter().enumerate() {
            let field_y = (i as f32).mul_add(INFO_FIELD_H + INFO_FIELD_GAP, y);
            canvas.set_fill_color(self.theme.info_background);
            canvas.draw_rect(x, field_y, width, INFO_FIELD_H, Paint::FillStroke);
            canvas.draw_text(x + 2.0, field_y + INFO_FIELD_H - 2.0, label);
        }

        let signature_y = (INFO_FIELDS.len() as f32).mul_add(INFO_FIELD_H + INFO_FIELD_GAP, y);
        canvas.set_fill_color(self.theme.info_background);
        canvas.draw_rect(x, signature_y, width, SIGNATURE_BOX_H, Paint::FillStroke);
        canvas.draw_text(x + 2.0, signature_y + INFO_FIELD_H - 2.0, "Candidate Signature:");

        let instructions_y = signature_y + SIGNATURE_ADVANCE;
        canvas.set_fill_color(self.theme.instructions_background);
        canvas.draw_rect(x, instructions_y, width, INSTRUCTIONS_H, Paint::FillStroke);

        canvas.set_font(FontStyle::Regular, 9.0);
        let text_width = width - 6.0;
        let mut line_top = instructions_y + 3.0;
        for paragraph in INSTRUCTIONS {
            for line in wrap_text(canvas, paragraph, text_width) {
                let baseline = 0.3f32.mul_add(
                    canvas.font_size_mm(),
                    line_top + INSTRUCTIONS_LINE_H / 2.0,
                );
                canvas.draw_text(x + 3.0, baseline, &line);
                line_top += INSTRUCTIONS_LINE_H;
            }
        }

        self.apply_theme(canvas);
        self.metrics().info_block_height()
    }

    fn draw_qr(&self, canvas: &mut dyn Canvas, warnings: &mut Vec<AssetWarning>) {
        let Some(qr) = &self.document.qr else {
            return;
        };

        let g = self.geometry;
        let qr_x = g.page_width - BORDER_INSET - QR_SIZE - QR_PAD;
        let qr_y = g.page_height - BORDER_INSET - QR_SIZE - QR_PAD;

        let placed = place_optional_image(
            canvas,
            AssetKind::Qr,
            qr,
            (qr_x, qr_y),
            (Some(QR_SIZE), Some(QR_SIZE)),
            warnings,
        );
        if placed {
            canvas.set_draw_color(self.theme.light);
            canvas.set_line_width(self.theme.thin_line_width);
            canvas.draw_rect(
                qr_x - QR_FRAME,
                qr_y - QR_FRAME,
                2.0f32.mul_add(QR_FRAME, QR_SIZE),
                2.0f32.mul_add(QR_FRAME, QR_SIZE),
                Paint::Stroke,
            );
            self.apply_theme(canvas);
        }
    }
}

/// Place an image, downgrading failure to a warning. Returns whether it was drawn.
fn place_optional_image(
    canvas: &mut dyn Canvas,
    kind: AssetKind,
    path: &Path,
    (x, y): (f32, f32),
    (width, height): (Option<f32>, Option<f32>),
    warnings: &mut Vec<AssetWarning>,
) -> bool {
    match canvas.place_image(path, x, y, width, height) {
        Ok(()) => true,
        Err(e) => {
            let warning = AssetWarning::from_error(kind, path, &e);
            debug!("{}", warning);
            warnings.push(warning);
            false
        }
    }
}

/// Draw `text` centred horizontally and vertically in a `w` x `h` cell.
fn cell_centered(canvas: &mut dyn Canvas, x: f32, y: f32, w: f32, h: f32, text: &str) {
    let text_width = canvas.measure_text_width(text);
    let baseline = 0.3f32.mul_add(canvas.font_size_mm(), y + h / 2.0);
    canvas.draw_text(x + (w - text_width) / 2.0, baseline, text);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::render::testing::{Command, RecordingCanvas};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_default_block_heights() {
        let geometry = PageGeometry::default();
        let metrics = TemplateMetrics::new(&geometry);
        assert!(approx(metrics.roll_block_height(), 81.0));
        assert!(approx(metrics.info_block_height(), 72.0));
        // 10 margin + 16 ribbon + 81 roll block + 6 + 4
        assert!(approx(metrics.question_area_top(), 117.0));
    }

    #[test]
    fn test_render_matches_metrics() {
        let geometry = PageGeometry::default();
        let theme = Theme::default();
        let document = DocumentConfig::new(10, "Springfield High");
        let mut canvas = RecordingCanvas::new();

        let outcome = PageTemplate::new(&geometry, &theme, &document).render(&mut canvas);

        assert!(approx(outcome.start_y, TemplateMetrics::new(&geometry).question_area_top()));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_taller_block_sets_grid_top() {
        // With defaults the roll block (81) is taller than the info block (72)
        let geometry = PageGeometry::default();
        let metrics = TemplateMetrics::new(&geometry);
        assert!(metrics.roll_block_height() > metrics.info_block_height());
        let expected = geometry.margin + RIBBON_HEIGHT + metrics.roll_block_height() + 10.0;
        assert!(approx(metrics.question_area_top(), expected));
    }

    #[test]
    fn test_roll_grid_has_bubble_per_digit_and_position() {
        let geometry = PageGeometry {
            roll_digits: 9,
            ..Default::default()
        };
        let theme = Theme::default();
        let document = DocumentConfig::new(1, "Test");
        let mut canvas = RecordingCanvas::new();
        PageTemplate::new(&geometry, &theme, &document).render(&mut canvas);

        let roll_bubbles = canvas
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Ellipse { w, .. } if approx(*w, ROLL_CIRCLE_D)))
            .count();
        assert_eq!(roll_bubbles, 10 * 9);
        // Four corner dots
        let dots = canvas
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Ellipse { paint: Paint::Fill, .. }))
            .count();
        assert_eq!(dots, 4);
    }

    #[test]
    fn test_institute_name_centred_in_ribbon() {
        let geometry = PageGeometry::default();
        let theme = Theme::default();
        let document = DocumentConfig::new(1, "Springfield High");
        let mut canvas = RecordingCanvas::new();
        PageTemplate::new(&geometry, &theme, &document).render(&mut canvas);

        let (_, x, _) = canvas.text_at("Springfield High").unwrap();
        let mut probe = RecordingCanvas::new();
        probe.set_font(FontStyle::Bold, 15.0);
        let width = probe.measure_text_width("Springfield High");
        assert!(approx(x + width / 2.0, geometry.page_width / 2.0));
        assert!(canvas.texts().contains(&SHEET_SUBTITLE));
    }

    #[test]
    fn test_instructions_and_fields_drawn() {
        let geometry = PageGeometry::default();
        let theme = Theme::default();
        let document = DocumentConfig::new(1, "Test");
        let mut canvas = RecordingCanvas::new();
        PageTemplate::new(&geometry, &theme, &document).render(&mut canvas);

        let texts = canvas.texts();
        for expected in ["ROLL NO.", "Name:", "Date:", "Center Code:", "Candidate Signature:"] {
            assert!(texts.contains(&expected), "missing {expected}");
        }
        assert!(texts.contains(&"Instructions:"));
    }

    #[test]
    fn test_missing_images_become_warnings() {
        let geometry = PageGeometry::default();
        let theme = Theme::default();
        let document = DocumentConfig::new(1, "Test")
            .with_logo(Some(PathBuf::from("missing-logo.png")))
            .with_qr(Some(PathBuf::from("missing-qr.png")));
        let mut canvas = RecordingCanvas::new();

        let outcome = PageTemplate::new(&geometry, &theme, &document).render(&mut canvas);

        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(outcome.warnings[0].kind, AssetKind::Logo);
        assert_eq!(outcome.warnings[1].kind, AssetKind::Qr);
        assert!(approx(outcome.start_y, 117.0));
    }

    #[test]
    fn test_qr_placed_bottom_right_with_frame() {
        let geometry = PageGeometry::default();
        let theme = Theme::default();
        let document = DocumentConfig::new(1, "Test").with_qr(Some(PathBuf::from("qr.png")));
        let mut canvas = RecordingCanvas::new().with_image("qr.png");

        let outcome = PageTemplate::new(&geometry, &theme, &document).render(&mut canvas);
        assert!(outcome.warnings.is_empty());

        let image = canvas
            .commands
            .iter()
            .find_map(|c| match c {
                Command::Image { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .unwrap();
        assert!(approx(image.0, 176.0));
        assert!(approx(image.1, 263.0));

        let frame = canvas.commands.iter().any(|c| {
            matches!(c, Command::Rect { x, w, .. } if approx(*x, 174.5) && approx(*w, 29.0))
        });
        assert!(frame);
    }
}
