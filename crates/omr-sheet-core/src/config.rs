use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Institute name printed when none is supplied
pub const DEFAULT_INSTITUTE_NAME: &str = "Your Institute Name";

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "output.pdf";

/// An RGB colour with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn navy() -> Self {
        Self::new(0, 60, 140)
    }

    pub const fn dark_red() -> Self {
        Self::new(160, 0, 0)
    }

    pub const fn dark_green() -> Self {
        Self::new(0, 110, 40)
    }

    pub const fn purple() -> Self {
        Self::new(110, 30, 130)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "navy" => Some(Self::navy()),
            "black" => Some(Self::black()),
            "darkred" | "dark_red" | "dark-red" => Some(Self::dark_red()),
            "darkgreen" | "dark_green" | "dark-green" => Some(Self::dark_green()),
            "purple" => Some(Self::purple()),
            _ => None,
        }
    }

    /// Channels scaled to the 0.0-1.0 range used by PDF colour operators
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

/// Colours and stroke widths used across the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Borders and body text
    pub primary: Color,
    /// Subtitle text
    pub muted: Color,
    /// Block outlines and the QR frame
    pub light: Color,
    /// Institute name and answer bubbles
    pub accent: Color,
    pub header_background: Color,
    pub info_background: Color,
    pub instructions_background: Color,
    pub border_line_width: f32,
    pub thin_line_width: f32,
    pub bubble_line_width: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::black(),
            muted: Color::new(90, 90, 90),
            light: Color::new(170, 170, 170),
            accent: Color::navy(),
            header_background: Color::new(230, 235, 245),
            info_background: Color::new(245, 245, 245),
            instructions_background: Color::new(240, 240, 240),
            border_line_width: 0.6,
            thin_line_width: 0.2,
            bubble_line_width: 0.3,
        }
    }
}

/// Fixed physical layout shared by every page of a sheet.
///
/// All lengths are millimetres measured from the top-left corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Number of question columns per page
    pub columns: usize,
    /// Diameter of an answer bubble
    pub bubble_size: f32,
    /// Horizontal gap between neighbouring bubbles
    pub bubble_gap: f32,
    /// Width of the slot holding the question number
    pub number_width: f32,
    /// Gap between the number slot and the first bubble
    pub label_gap: f32,
    pub row_height: f32,
    /// Vertical padding between the top of a row and its bubbles
    pub bubble_y_offset: f32,
    /// Option labels, one bubble each
    pub options: Vec<String>,
    /// Digit positions in the roll-number block
    pub roll_digits: usize,
}

impl Default for PageGeometry {
    fn default() -> Self {
        let bubble_size = 4.0;
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 10.0,
            columns: 5,
            bubble_size,
            bubble_gap: 2.0,
            number_width: 6.0,
            label_gap: 2.0,
            row_height: bubble_size + 5.0,
            bubble_y_offset: 2.0,
            options: ["A", "B", "C", "D", "E"].map(String::from).to_vec(),
            roll_digits: 7,
        }
    }
}

impl PageGeometry {
    /// Width between the left and right margins
    pub fn inner_width(&self) -> f32 {
        2.0f32.mul_add(-self.margin, self.page_width)
    }

    /// Width of one question column
    #[allow(clippy::cast_precision_loss)] // column counts are tiny
    pub fn column_width(&self) -> f32 {
        self.inner_width() / self.columns as f32
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Check the invariants the layout engine relies on.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("bubble_size", self.bubble_size),
            ("row_height", self.row_height),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::invalid(field, format!("must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("margin", self.margin),
            ("bubble_gap", self.bubble_gap),
            ("number_width", self.number_width),
            ("label_gap", self.label_gap),
            ("bubble_y_offset", self.bubble_y_offset),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::invalid(field, format!("must not be negative, got {value}")));
            }
        }

        if self.columns == 0 {
            return Err(Error::invalid("columns", "must be at least 1"));
        }
        if self.options.is_empty() {
            return Err(Error::invalid("options", "at least one option is required"));
        }
        if self.roll_digits == 0 {
            return Err(Error::invalid("roll_digits", "must be at least 1"));
        }
        if self.inner_width() < 0.0 {
            return Err(Error::invalid(
                "margin",
                format!(
                    "margins of {}mm leave no width on a {}mm page",
                    self.margin, self.page_width
                ),
            ));
        }

        Ok(())
    }
}

/// Per-document input: how many questions and who the sheet is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    pub question_count: usize,
    pub institute_name: String,
    pub logo: Option<PathBuf>,
    pub qr: Option<PathBuf>,
}

impl DocumentConfig {
    pub fn new(question_count: usize, institute_name: impl Into<String>) -> Self {
        let institute_name = institute_name.into();
        let institute_name = if institute_name.trim().is_empty() {
            DEFAULT_INSTITUTE_NAME.to_string()
        } else {
            institute_name
        };
        Self {
            question_count,
            institute_name,
            logo: None,
            qr: None,
        }
    }

    /// Attach a logo; an empty path counts as no logo.
    #[must_use]
    pub fn with_logo(mut self, logo: Option<PathBuf>) -> Self {
        self.logo = logo.filter(|p| !p.as_os_str().is_empty());
        self
    }

    /// Attach a QR image; an empty path counts as no image.
    #[must_use]
    pub fn with_qr(mut self, qr: Option<PathBuf>) -> Self {
        self.qr = qr.filter(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.question_count == 0 {
            return Err(Error::InvalidQuestionCount(self.question_count));
        }
        Ok(())
    }
}

fn default_institute_name() -> String {
    DEFAULT_INSTITUTE_NAME.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Page and bubble geometry
    #[serde(default)]
    pub geometry: PageGeometry,

    /// Colours and line widths
    #[serde(default)]
    pub theme: Theme,

    /// Institute name printed in the title ribbon
    #[serde(default = "default_institute_name")]
    pub institute_name: String,

    /// Where the PDF is written
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            theme: Theme::default(),
            institute_name: default_institute_name(),
            output: default_output(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.geometry.validate()?;
        Ok(config)
    }

    /// Load from default locations (~/.config/omr-sheet/config.toml, ./omr-sheet.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("omr-sheet").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = PathBuf::from("omr-sheet.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./omr-sheet.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./omr-sheet.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}
