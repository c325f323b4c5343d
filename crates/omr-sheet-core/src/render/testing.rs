//! In-memory canvas that records drawing commands for assertions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{Canvas, FontStyle, Paint};
use crate::config::Color;
use crate::error::{Error, Result};
use crate::pdf::StandardFont;
use crate::util::pt_to_mm;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Rect { page: usize, x: f32, y: f32, w: f32, h: f32, paint: Paint },
    Ellipse { page: usize, x: f32, y: f32, w: f32, h: f32, paint: Paint },
    Text { page: usize, x: f32, y: f32, text: String },
    Image { page: usize, path: PathBuf, x: f32, y: f32 },
}

#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<Command>,
    pub page: usize,
    pub saved: Option<PathBuf>,
    /// Paths that `place_image` accepts; everything else fails to load
    pub available_images: HashSet<PathBuf>,
    font: Option<(FontStyle, f32)>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.available_images.insert(path.into());
        self
    }

    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn text_at(&self, text: &str) -> Option<(usize, f32, f32)> {
        self.commands.iter().find_map(|c| match c {
            Command::Text { page, x, y, text: t } if t == text => Some((*page, *x, *y)),
            _ => None,
        })
    }

    pub fn ellipses(&self) -> Vec<(usize, f32, f32, f32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Ellipse { page, x, y, w, .. } => Some((*page, *x, *y, *w)),
                _ => None,
            })
            .collect()
    }

    fn current_font(&self) -> (FontStyle, f32) {
        self.font.unwrap_or((FontStyle::Regular, 12.0))
    }
}

impl Canvas for RecordingCanvas {
    fn set_draw_color(&mut self, _color: Color) {}

    fn set_fill_color(&mut self, _color: Color) {}

    fn set_text_color(&mut self, _color: Color) {}

    fn set_line_width(&mut self, _width: f32) {}

    fn set_font(&mut self, style: FontStyle, size_pt: f32) {
        self.font = Some((style, size_pt));
    }

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint) {
        self.commands.push(Command::Rect { page: self.page, x, y, w, h, paint });
    }

    fn draw_ellipse(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint) {
        self.commands.push(Command::Ellipse { page: self.page, x, y, w, h, paint });
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) {
        self.commands.push(Command::Text {
            page: self.page,
            x,
            y,
            text: text.to_string(),
        });
    }

    fn measure_text_width(&self, text: &str) -> f32 {
        let (style, size) = self.current_font();
        StandardFont::new(style).string_width_mm(text, size)
    }

    fn font_size_mm(&self) -> f32 {
        pt_to_mm(self.current_font().1)
    }

    fn start_new_page(&mut self) {
        self.page += 1;
    }

    fn place_image(
        &mut self,
        path: &Path,
        x: f32,
        y: f32,
        _width: Option<f32>,
        _height: Option<f32>,
    ) -> Result<()> {
        if !self.available_images.contains(path) {
            return Err(Error::ImageLoad {
                path: path.to_path_buf(),
                reason: "No such file or directory".to_string(),
            });
        }
        self.commands.push(Command::Image {
            page: self.page,
            path: path.to_path_buf(),
            x,
            y,
        });
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.saved = Some(path.to_path_buf());
        Ok(())
    }
}
