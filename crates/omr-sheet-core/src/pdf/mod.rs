mod canvas;
mod font;
mod xobject;

pub use canvas::PdfCanvas;
pub use font::{StandardFont, encode_win_ansi};
pub use xobject::{ImageXObject, resolve_size};
