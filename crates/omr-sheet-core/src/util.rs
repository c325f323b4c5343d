//! Utility functions shared across the crate.

use std::path::PathBuf;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Millimetres per PDF point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Convert a length in millimetres to PDF points.
pub fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

/// Convert a length in PDF points to millimetres.
pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_PT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
        assert!((pt_to_mm(72.0) - 25.4).abs() < 1e-4);
        assert!((mm_to_pt(210.0) - 595.2756).abs() < 1e-2);
    }
}
