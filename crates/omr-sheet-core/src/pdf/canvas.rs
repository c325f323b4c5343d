//! A [`Canvas`] that writes a multi-page PDF with lopdf.
//!
//! # Coordinate System
//!
//! Callers draw in millimetres with a **top-left origin** (Y grows
//! downward). PDF uses points with a **bottom-left origin**, so every
//! coordinate is converted at this boundary:
//! ```text
//! pdf_x = mm_to_pt(x)
//! pdf_y = page_height_pt - mm_to_pt(y)
//! ```
//!
//! Pages are assembled one at a time: drawing commands accumulate as content
//! stream operations and are sealed into a page object when the next page
//! starts or the document is saved.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use super::font::{StandardFont, encode_win_ansi, font_resources};
use super::xobject::{ImageXObject, resolve_size};
use crate::config::Color;
use crate::error::{Error, Result};
use crate::render::{Canvas, FontStyle, Paint};
use crate::util::{mm_to_pt, pt_to_mm};

/// Control point distance for approximating a quarter ellipse with a Bezier curve.
const BEZIER_KAPPA: f32 = 0.552_284_8;

/// An image already added to the document.
#[derive(Debug, Clone)]
struct LoadedImage {
    id: ObjectId,
    name: String,
    width_px: u32,
    height_px: u32,
}

/// PDF document builder implementing [`Canvas`].
pub struct PdfCanvas {
    doc: Document,
    pages_id: ObjectId,
    catalog_id: Option<ObjectId>,
    page_ids: Vec<ObjectId>,
    page_width_pt: f32,
    page_height_pt: f32,
    /// Operations of the page currently being drawn
    operations: Vec<Operation>,
    /// XObjects referenced by the current page
    page_images: BTreeMap<String, ObjectId>,
    images: HashMap<PathBuf, LoadedImage>,
    page_open: bool,
    font: StandardFont,
    font_size_pt: f32,
    text_color: Color,
    title: Option<String>,
    /// First page that could not be sealed; serializing reports it
    page_error: Option<String>,
}

impl PdfCanvas {
    /// Create a document whose first page is ready for drawing.
    pub fn new(page_width_mm: f32, page_height_mm: f32) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            catalog_id: None,
            page_ids: Vec::new(),
            page_width_pt: mm_to_pt(page_width_mm),
            page_height_pt: mm_to_pt(page_height_mm),
            operations: Vec::new(),
            page_images: BTreeMap::new(),
            images: HashMap::new(),
            page_open: true,
            font: StandardFont::new(FontStyle::Regular),
            font_size_pt: 12.0,
            text_color: Color::black(),
            title: None,
            page_error: None,
        }
    }

    /// Set the document title stored in the Info dictionary.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Pages finished so far, plus the one being drawn.
    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.page_open)
    }

    fn x(x_mm: f32) -> Object {
        Object::Real(mm_to_pt(x_mm))
    }

    fn y(&self, y_mm: f32) -> Object {
        Object::Real(self.page_height_pt - mm_to_pt(y_mm))
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn paint(&mut self, paint: Paint) {
        let operator = match paint {
            Paint::Stroke => "S",
            Paint::Fill => "f",
            Paint::FillStroke => "B",
        };
        self.op(operator, vec![]);
    }

    fn color_operands(color: Color) -> Vec<Object> {
        let (r, g, b) = color.to_unit();
        vec![Object::Real(r), Object::Real(g), Object::Real(b)]
    }

    /// Seal the current page's operations into a page object.
    fn finish_page(&mut self) -> Result<()> {
        let content = Content {
            operations: std::mem::take(&mut self.operations),
        };
        let encoded = content
            .encode()
            .map_err(|e| Error::Lopdf(format!("Failed to encode content stream: {e}")))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_resources()));
        if !self.page_images.is_empty() {
            let xobjects = std::mem::take(&mut self.page_images)
                .into_iter()
                .map(|(name, id)| (name, Object::Reference(id)))
                .collect::<Dictionary>();
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let page_id = self.doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(self.page_width_pt),
                    Object::Real(self.page_height_pt),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]));

        self.page_ids.push(page_id);
        self.page_open = false;
        debug!("Finished PDF page {}", self.page_ids.len());
        Ok(())
    }

    fn load_image(&mut self, path: &Path) -> Result<LoadedImage> {
        if let Some(loaded) = self.images.get(path) {
            return Ok(loaded.clone());
        }

        let image = ImageXObject::open(path)?;
        let (width_px, height_px) = (image.width_px, image.height_px);
        let id = self.doc.add_object(Object::Stream(image.into_stream()));
        let loaded = LoadedImage {
            id,
            name: format!("Im{}", self.images.len() + 1),
            width_px,
            height_px,
        };
        self.images.insert(path.to_path_buf(), loaded.clone());
        Ok(loaded)
    }

    /// Finish the document and serialize it.
    ///
    /// Fails if any page could not be sealed, so a document with a missing
    /// page is never produced.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        if let Some(reason) = &self.page_error {
            return Err(Error::Lopdf(reason.clone()));
        }
        if self.page_open {
            self.finish_page()?;
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let count = i64::try_from(kids.len())
            .map_err(|e| Error::PdfSave(format!("Too many pages: {e}")))?;
        let pages = Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ]);
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        if self.catalog_id.is_none() {
            let catalog_id = self.doc.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Catalog".to_vec())),
                ("Pages", Object::Reference(self.pages_id)),
            ]));
            self.doc.trailer.set("Root", Object::Reference(catalog_id));

            let mut info = Dictionary::new();
            info.set(
                "Producer",
                Object::String(b"omr-sheet".to_vec(), StringFormat::Literal),
            );
            if let Some(title) = &self.title {
                info.set("Title", Object::String(encode_win_ansi(title), StringFormat::Literal));
            }
            let info_id = self.doc.add_object(Object::Dictionary(info));
            self.doc.trailer.set("Info", Object::Reference(info_id));

            self.catalog_id = Some(catalog_id);
        }

        self.doc.compress();

        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| Error::PdfSave(format!("Failed to save PDF: {e}")))?;

        Ok(output)
    }
}

impl Canvas for PdfCanvas {
    fn set_draw_color(&mut self, color: Color) {
        self.op("RG", Self::color_operands(color));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.op("rg", Self::color_operands(color));
    }

    fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.op("w", vec![Object::Real(mm_to_pt(width))]);
    }

    fn set_font(&mut self, style: FontStyle, size_pt: f32) {
        self.font = StandardFont::new(style);
        self.font_size_pt = size_pt;
    }

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint) {
        let bottom = self.y(y + h);
        self.op(
            "re",
            vec![Self::x(x), bottom, Object::Real(mm_to_pt(w)), Object::Real(mm_to_pt(h))],
        );
        self.paint(paint);
    }

    fn draw_ellipse(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint) {
        let rx = mm_to_pt(w / 2.0);
        let ry = mm_to_pt(h / 2.0);
        let cx = mm_to_pt(x) + rx;
        let cy = self.page_height_pt - mm_to_pt(y) - ry;
        let (kx, ky) = (rx * BEZIER_KAPPA, ry * BEZIER_KAPPA);

        let point = |px: f32, py: f32| [Object::Real(px), Object::Real(py)];
        let curve = |c1: [Object; 2], c2: [Object; 2], end: [Object; 2]| {
            c1.into_iter().chain(c2).chain(end).collect::<Vec<_>>()
        };

        self.op("m", point(cx + rx, cy).to_vec());
        self.op("c", curve(point(cx + rx, cy + ky), point(cx + kx, cy + ry), point(cx, cy + ry)));
        self.op("c", curve(point(cx - kx, cy + ry), point(cx - rx, cy + ky), point(cx - rx, cy)));
        self.op("c", curve(point(cx - rx, cy - ky), point(cx - kx, cy - ry), point(cx, cy - ry)));
        self.op("c", curve(point(cx + kx, cy - ry), point(cx + rx, cy - ky), point(cx + rx, cy)));
        self.op("h", vec![]);
        self.paint(paint);
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) {
        let baseline = self.y(y);
        self.op("q", vec![]);
        self.op("rg", Self::color_operands(self.text_color));
        self.op("BT", vec![]);
        self.op(
            "Tf",
            vec![
                Object::Name(self.font.resource_name().as_bytes().to_vec()),
                Object::Real(self.font_size_pt),
            ],
        );
        self.op("Td", vec![Self::x(x), baseline]);
        self.op(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
        self.op("Q", vec![]);
    }

    fn measure_text_width(&self, text: &str) -> f32 {
        self.font.string_width_mm(text, self.font_size_pt)
    }

    fn font_size_mm(&self) -> f32 {
        pt_to_mm(self.font_size_pt)
    }

    fn start_new_page(&mut self) {
        if self.page_open
            && let Err(e) = self.finish_page()
        {
            let page = self.page_ids.len() + 1;
            tracing::error!("Failed to finish page {}: {}", page, e);
            if self.page_error.is_none() {
                self.page_error = Some(format!("page {page} could not be finished: {e}"));
            }
        }
        self.operations.clear();
        self.page_images.clear();
        self.page_open = true;
    }

    fn place_image(
        &mut self,
        path: &Path,
        x: f32,
        y: f32,
        width: Option<f32>,
        height: Option<f32>,
    ) -> Result<()> {
        let image = self.load_image(path)?;
        let (w, h) = resolve_size(image.width_px, image.height_px, width, height);
        let bottom = self.y(y + h);

        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                Object::Real(mm_to_pt(w)),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(mm_to_pt(h)),
                Self::x(x),
                bottom,
            ],
        );
        self.op("Do", vec![Object::Name(image.name.as_bytes().to_vec())]);
        self.op("Q", vec![]);
        self.page_images.insert(image.name, image.id);
        Ok(())
    }

    /// Serialize and move the finished file into place in one step.
    ///
    /// The bytes go to a temporary file next to `path` first, so a failed
    /// write never leaves a truncated PDF at the destination.
    fn save(&mut self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(&dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        file.persist(path).map_err(|e| {
            Error::PdfSave(format!("Failed to write {}: {}", path.display(), e.error))
        })?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
