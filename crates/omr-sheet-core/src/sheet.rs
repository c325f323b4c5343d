//! Document driver: template, pagination and grid, page after page.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{AppConfig, DocumentConfig, PageGeometry, Theme};
use crate::error::{AssetWarning, Result};
use crate::layout::{PageLayout, Pagination, plan_page};
use crate::pdf::PdfCanvas;
use crate::render::{Canvas, PageTemplate, QuestionGrid, TemplateMetrics};

/// What a completed generation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// One plan per page, in page order
    pub pages: Vec<PageLayout>,
    /// Distinct image problems; each one is reported once per document
    pub warnings: Vec<AssetWarning>,
}

impl GenerationReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of questions across all pages.
    pub fn question_count(&self) -> usize {
        self.pages.iter().map(PageLayout::question_count).sum()
    }
}

/// Generates a complete answer sheet for one document.
#[derive(Debug, Clone)]
pub struct SheetGenerator {
    geometry: PageGeometry,
    theme: Theme,
    document: DocumentConfig,
}

impl SheetGenerator {
    pub const fn new(geometry: PageGeometry, theme: Theme, document: DocumentConfig) -> Self {
        Self {
            geometry,
            theme,
            document,
        }
    }

    /// Use the geometry and theme of a loaded configuration.
    pub fn from_config(config: &AppConfig, document: DocumentConfig) -> Self {
        Self::new(config.geometry.clone(), config.theme.clone(), document)
    }

    pub const fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub const fn document(&self) -> &DocumentConfig {
        &self.document
    }

    /// Page plans for the whole document, computed without drawing.
    pub fn plan(&self) -> Result<Vec<PageLayout>> {
        self.document.validate()?;
        self.geometry.validate()?;

        let start_y = TemplateMetrics::new(&self.geometry).question_area_top();
        Pagination::new(&self.geometry, start_y, self.document.question_count).collect()
    }

    /// Draw every page onto `canvas`.
    ///
    /// The canvas is left on the last page and is not saved. Nothing is
    /// drawn when the document or geometry is invalid; a page that cannot
    /// hold a single question row fails after its template is drawn.
    pub fn generate<C: Canvas>(&self, canvas: &mut C) -> Result<GenerationReport> {
        self.document.validate()?;
        self.geometry.validate()?;

        let total = self.document.question_count;
        let template = PageTemplate::new(&self.geometry, &self.theme, &self.document);
        let grid = QuestionGrid::new(&self.geometry, &self.theme);

        let mut pages: Vec<PageLayout> = Vec::new();
        let mut warnings: Vec<AssetWarning> = Vec::new();
        let mut assigned = 0;

        while assigned < total {
            let outcome = template.render(&mut *canvas);
            for warning in outcome.warnings {
                if !warnings.contains(&warning) {
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }

            let remaining = total - assigned;
            let Some(layout) =
                plan_page(&self.geometry, pages.len(), outcome.start_y, assigned + 1, remaining)?
            else {
                break;
            };

            debug!(
                "Page {}: questions {}-{} in {} column(s) of {} rows",
                layout.page_index + 1,
                layout.first_question,
                layout.last_question,
                layout.columns_used,
                layout.max_rows
            );

            grid.render(&mut *canvas, &layout);
            assigned = layout.last_question;
            pages.push(layout);

            if assigned < total {
                canvas.start_new_page();
            }
        }

        Ok(GenerationReport { pages, warnings })
    }

    /// Generate into a fresh PDF canvas sized to the page geometry.
    pub fn render_pdf(&self) -> Result<(PdfCanvas, GenerationReport)> {
        let mut canvas = PdfCanvas::new(self.geometry.page_width, self.geometry.page_height)
            .with_title(self.document.institute_name.clone());
        let report = self.generate(&mut canvas)?;
        Ok((canvas, report))
    }

    /// Generate the sheet and write it to `path`.
    ///
    /// The file is only created once every page has been laid out.
    pub fn write_pdf(&self, path: impl AsRef<Path>) -> Result<GenerationReport> {
        let path = path.as_ref();
        info!(
            "Generating {} question(s) for {}",
            self.document.question_count, self.document.institute_name
        );

        let (mut canvas, report) = self.render_pdf()?;
        canvas.save(path)?;

        info!("Wrote {} page(s) to {}", report.page_count(), path.display());
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::{AssetKind, Error};
    use crate::render::testing::RecordingCanvas;

    fn generator(question_count: usize) -> SheetGenerator {
        SheetGenerator::new(
            PageGeometry::default(),
            Theme::default(),
            DocumentConfig::new(question_count, "Test Institute"),
        )
    }

    #[test]
    fn test_zero_questions_draws_nothing() {
        let mut canvas = RecordingCanvas::new();
        let err = generator(0).generate(&mut canvas).unwrap_err();

        assert!(matches!(err, Error::InvalidQuestionCount(0)));
        assert!(canvas.commands.is_empty());
    }

    #[test]
    fn test_default_capacity_is_ninety() {
        let mut canvas = RecordingCanvas::new();
        let report = generator(90).generate(&mut canvas).unwrap();
        assert_eq!(report.page_count(), 1);
        assert_eq!(canvas.page_count(), 1);

        let mut canvas = RecordingCanvas::new();
        let report = generator(91).generate(&mut canvas).unwrap();
        assert_eq!(report.page_count(), 2);
        assert_eq!(canvas.page_count(), 2);
        assert_eq!(report.pages[1].first_question, 91);
        assert_eq!(report.pages[1].columns_used, 1);
        assert_eq!(canvas.text_at("91.").unwrap().0, 1);
    }

    #[test]
    fn test_template_repeated_on_every_page() {
        let mut canvas = RecordingCanvas::new();
        generator(200).generate(&mut canvas).unwrap();

        let ribbons = canvas.texts().iter().filter(|t| **t == "Test Institute").count();
        assert_eq!(ribbons, 3);
    }

    #[test]
    fn test_no_save_during_generate() {
        let mut canvas = RecordingCanvas::new();
        generator(5).generate(&mut canvas).unwrap();
        assert!(canvas.saved.is_none());
    }

    #[test]
    fn test_warnings_reported_once() {
        let document = DocumentConfig::new(200, "Test")
            .with_logo(Some(PathBuf::from("nope.png")));
        let generator = SheetGenerator::new(PageGeometry::default(), Theme::default(), document);
        let mut canvas = RecordingCanvas::new();

        let report = generator.generate(&mut canvas).unwrap();

        assert_eq!(report.page_count(), 3);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, AssetKind::Logo);
    }

    #[test]
    fn test_page_too_small() {
        let geometry = PageGeometry {
            page_height: 120.0,
            ..Default::default()
        };
        let generator =
            SheetGenerator::new(geometry, Theme::default(), DocumentConfig::new(10, "Test"));
        let mut canvas = RecordingCanvas::new();

        let err = generator.generate(&mut canvas).unwrap_err();
        assert!(matches!(err, Error::PageTooSmall { .. }));
        assert!(canvas.saved.is_none());
    }

    #[test]
    fn test_largest_question_count_fails_cleanly_on_small_page() {
        let geometry = PageGeometry {
            page_height: 120.0,
            ..Default::default()
        };
        let generator = SheetGenerator::new(
            geometry,
            Theme::default(),
            DocumentConfig::new(usize::MAX, "Test"),
        );
        let mut canvas = RecordingCanvas::new();

        let err = generator.generate(&mut canvas).unwrap_err();
        assert!(matches!(err, Error::PageTooSmall { .. }));
    }

    #[test]
    fn test_plan_matches_generated_pages() {
        for total in [1, 90, 91, 377] {
            let mut canvas = RecordingCanvas::new();
            let report = generator(total).generate(&mut canvas).unwrap();
            assert_eq!(generator(total).plan().unwrap(), report.pages);
        }
    }

    #[test]
    fn test_plan_rejects_invalid_input() {
        assert!(matches!(generator(0).plan(), Err(Error::InvalidQuestionCount(0))));

        let geometry = PageGeometry {
            page_height: 120.0,
            ..Default::default()
        };
        let generator =
            SheetGenerator::new(geometry, Theme::default(), DocumentConfig::new(10, "Test"));
        assert!(matches!(generator.plan(), Err(Error::PageTooSmall { .. })));
    }

    #[test]
    fn test_report_counts_every_question() {
        let mut canvas = RecordingCanvas::new();
        let report = generator(377).generate(&mut canvas).unwrap();
        assert_eq!(report.question_count(), 377);
        assert_eq!(report.pages.last().unwrap().last_question, 377);
    }
}
