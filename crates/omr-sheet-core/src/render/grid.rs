//! Question rows: option letters, question numbers and answer bubbles.

use super::{Canvas, FontStyle, Paint};
use crate::config::{PageGeometry, Theme};
use crate::layout::{ColumnGeometry, ColumnSlot, PageLayout};

/// Font size of option headers and question numbers, in points.
const GRID_FONT_SIZE: f32 = 8.0;

/// Distance from the bubble top up to the option header baseline.
const HEADER_RAISE: f32 = 3.0;

/// Nudges the number baseline so it reads centred against the bubble.
const LABEL_BASELINE_TWEAK: f32 = 0.4;

/// Draws the questions of one planned page.
pub struct QuestionGrid<'a> {
    geometry: &'a PageGeometry,
    theme: &'a Theme,
}

impl<'a> QuestionGrid<'a> {
    pub const fn new(geometry: &'a PageGeometry, theme: &'a Theme) -> Self {
        Self { geometry, theme }
    }

    pub fn render(&self, canvas: &mut dyn Canvas, layout: &PageLayout) {
        let columns = ColumnGeometry::new(self.geometry);
        let slots: Vec<ColumnSlot> = (0..layout.columns_used).map(|c| columns.slot(c)).collect();

        self.draw_option_headers(canvas, layout, &slots);

        for question in layout.slots() {
            let Some(slot) = slots.get(question.column) else {
                continue;
            };
            self.draw_question(canvas, layout.start_y, slot, question.question, question.row);
        }
    }

    fn draw_option_headers(&self, canvas: &mut dyn Canvas, layout: &PageLayout, slots: &[ColumnSlot]) {
        let g = self.geometry;
        canvas.set_font(FontStyle::Regular, GRID_FONT_SIZE);
        canvas.set_text_color(self.theme.primary);

        let baseline = layout.start_y + g.bubble_y_offset - HEADER_RAISE;
        for slot in slots {
            for (option, bubble_x) in g.options.iter().zip(&slot.bubble_xs) {
                let center = bubble_x + g.bubble_size / 2.0;
                let width = canvas.measure_text_width(option);
                canvas.draw_text(center - width / 2.0, baseline, option);
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_question(
        &self,
        canvas: &mut dyn Canvas,
        start_y: f32,
        slot: &ColumnSlot,
        number: usize,
        row: usize,
    ) {
        let g = self.geometry;
        let y = (row as f32).mul_add(g.row_height, start_y);
        let bubble_top = y + g.bubble_y_offset;

        canvas.set_font(FontStyle::Regular, GRID_FONT_SIZE);
        canvas.set_text_color(self.theme.primary);
        let label = format!("{number}.");
        let width = canvas.measure_text_width(&label);
        canvas.draw_text(
            slot.label_right(g) - width,
            bubble_top + g.bubble_size / 2.0 + LABEL_BASELINE_TWEAK,
            &label,
        );

        canvas.set_draw_color(self.theme.accent);
        canvas.set_line_width(self.theme.bubble_line_width);
        for &bubble_x in &slot.bubble_xs {
            canvas.draw_ellipse(bubble_x, bubble_top, g.bubble_size, g.bubble_size, Paint::Stroke);
        }

        canvas.set_draw_color(self.theme.primary);
        canvas.set_line_width(self.theme.thin_line_width);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layout::plan_page;
    use crate::render::testing::RecordingCanvas;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn render(total: usize) -> (RecordingCanvas, PageLayout) {
        let geometry = PageGeometry::default();
        let theme = Theme::default();
        let layout = plan_page(&geometry, 0, 117.0, 1, total).unwrap().unwrap();
        let mut canvas = RecordingCanvas::new();
        QuestionGrid::new(&geometry, &theme).render(&mut canvas, &layout);
        (canvas, layout)
    }

    #[test]
    fn test_single_question_position() {
        let (canvas, _) = render(1);

        let bubbles = canvas.ellipses();
        assert_eq!(bubbles.len(), 5);
        let xs: Vec<f32> = bubbles.iter().map(|b| b.1).collect();
        for (x, expected) in xs.iter().zip([19.0, 25.0, 31.0, 37.0, 43.0]) {
            assert!(approx(*x, expected), "{x} != {expected}");
        }
        // start_y + bubble_y_offset
        assert!(bubbles.iter().all(|b| approx(b.2, 119.0)));

        let mut probe = RecordingCanvas::new();
        probe.set_font(FontStyle::Regular, GRID_FONT_SIZE);
        let (_, x, y) = canvas.text_at("1.").unwrap();
        assert!(approx(x + probe.measure_text_width("1."), 17.0));
        assert!(approx(y, 119.0 + 2.0 + 0.4));
    }

    #[test]
    fn test_headers_only_over_used_columns() {
        // 18 rows per column: 20 questions need two columns
        let (canvas, layout) = render(20);
        assert_eq!(layout.columns_used, 2);

        let headers = canvas.texts().iter().filter(|t| **t == "A").count();
        assert_eq!(headers, 2);
        let (_, _, y) = canvas.text_at("A").unwrap();
        assert!(approx(y, 117.0 + 2.0 - 3.0));
    }

    #[test]
    fn test_column_major_fill() {
        let (canvas, _) = render(20);
        let (_, _, y18) = canvas.text_at("18.").unwrap();
        let (_, x19, y19) = canvas.text_at("19.").unwrap();
        let (_, x1, y1) = canvas.text_at("1.").unwrap();

        // 18 is the bottom of column 0, 19 tops column 1
        assert!(approx(y18, 17.0f32.mul_add(9.0, y1)));
        assert!(approx(y19, y1));
        assert!(x19 > x1 + 30.0);
    }

    #[test]
    fn test_every_question_gets_full_bubble_row() {
        let (canvas, layout) = render(90);
        assert_eq!(layout.question_count(), 90);
        assert_eq!(canvas.ellipses().len(), 90 * 5);
        assert!(canvas.text_at("90.").is_some());
        assert!(canvas.text_at("91.").is_none());
    }

    #[test]
    fn test_custom_option_letters() {
        let geometry = PageGeometry {
            options: vec!["T".into(), "F".into()],
            ..Default::default()
        };
        let theme = Theme::default();
        let layout = plan_page(&geometry, 0, 117.0, 1, 3).unwrap().unwrap();
        let mut canvas = RecordingCanvas::new();
        QuestionGrid::new(&geometry, &theme).render(&mut canvas, &layout);

        assert_eq!(canvas.ellipses().len(), 6);
        assert!(canvas.texts().contains(&"T"));
        assert!(canvas.texts().contains(&"F"));
    }
}
