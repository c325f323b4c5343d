//! OMR Answer Sheet Core Library
//!
//! This library lays out printable optical-mark-recognition answer sheets:
//! - Page template with title ribbon, roll-number grid and candidate fields
//! - Column-major pagination of any number of questions
//! - Question grid of option bubbles
//! - PDF output through an abstract drawing canvas
//!
//! ```no_run
//! use omr_sheet_core::{AppConfig, DocumentConfig, SheetGenerator};
//!
//! # fn main() -> omr_sheet_core::Result<()> {
//! let config = AppConfig::load();
//! let document = DocumentConfig::new(120, "Springfield High");
//! let report = SheetGenerator::from_config(&config, document).write_pdf("output.pdf")?;
//! assert_eq!(report.page_count(), 2);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod render;
pub mod sheet;
pub mod util;

pub use config::{
    AppConfig, Color, DEFAULT_INSTITUTE_NAME, DEFAULT_OUTPUT, DocumentConfig, PageGeometry, Theme,
};
pub use error::{AssetKind, AssetWarning, Error, Result};
pub use layout::{ColumnGeometry, PageLayout, Pagination, plan_page};
pub use pdf::PdfCanvas;
pub use render::{Canvas, FontStyle, Paint};
pub use sheet::{GenerationReport, SheetGenerator};
