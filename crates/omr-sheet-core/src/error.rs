use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for omr-sheet-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Configuration problems (question count, page geometry, config files)
/// - Image assets that cannot be read or decoded
/// - PDF assembly and saving
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// The sheet must contain at least one question
    #[error("question count must be positive, got {0}")]
    InvalidQuestionCount(usize),

    /// The space left below the page template cannot hold a single question row
    #[error(
        "page geometry leaves no room for a question row: grid starts at {start_y}mm on a \
         {page_height}mm page with {margin}mm margin and {row_height}mm rows"
    )]
    PageTooSmall {
        start_y: f32,
        page_height: f32,
        margin: f32,
        row_height: f32,
    },

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    // ==========================================================================
    // Asset Errors
    // ==========================================================================
    /// An image could not be read or decoded
    #[error("failed to load image {}: {reason}", path.display())]
    ImageLoad { path: PathBuf, reason: String },

    // ==========================================================================
    // PDF Errors
    // ==========================================================================
    /// Failed to save a PDF
    #[error("failed to save PDF: {0}")]
    PdfSave(String),

    /// Error from the lopdf library
    #[error("lopdf error: {0}")]
    Lopdf(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error comes from invalid input rather than the environment.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuestionCount(_)
                | Self::PageTooSmall { .. }
                | Self::ConfigInvalid { .. }
                | Self::ConfigLoad(_)
        )
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Which optional image a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Logo,
    Qr,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logo => f.write_str("logo"),
            Self::Qr => f.write_str("QR code"),
        }
    }
}

/// A recoverable problem with an optional image.
///
/// The image is left off the page and layout continues unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetWarning {
    pub kind: AssetKind,
    pub path: PathBuf,
    pub reason: String,
}

impl AssetWarning {
    /// Downgrade an image error into a warning for the given asset.
    pub fn from_error(kind: AssetKind, path: impl Into<PathBuf>, error: &Error) -> Self {
        let reason = match error {
            Error::ImageLoad { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        Self {
            kind,
            path: path.into(),
            reason,
        }
    }
}

impl fmt::Display for AssetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {} {}: {}", self.kind, self.path.display(), self.reason)
    }
}
