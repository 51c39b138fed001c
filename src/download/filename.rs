//! Image URL normalization and filename derivation.
//!
//! Feed URLs sometimes carry garbage after the real extension
//! (`/th/xyz.jpg&ashjg.jpg`); normalization truncates at the first real
//! extension. File names are derived from the image description, not the
//! URL, which makes downloads idempotent across runs by name.

/// Maximum length of the file name stem before the extension is appended.
///
/// Keeps the full name comfortably under the 260-character path limits of
/// common filesystems.
pub const MAX_STEM_LEN: usize = 230;

/// Image extensions the feed can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExt {
    /// `.jpg`
    Jpg,
    /// `.png`
    Png,
}

impl ImageExt {
    /// The extension including the leading dot.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpg => ".jpg",
            Self::Png => ".png",
        }
    }
}

/// Normalizes a raw feed URL: truncates everything after the first `.jpg`
/// or `.png` occurrence.
///
/// Returns the truncated URL and the detected extension, or `None` if the
/// URL contains neither extension (such a URL cannot be fetched and is
/// treated as an immediate failure by the caller, with no network call).
#[must_use]
pub fn normalize_image_url(raw: &str) -> Option<(String, ImageExt)> {
    let (ext, pos) = if let Some(pos) = raw.find(".jpg") {
        (ImageExt::Jpg, pos)
    } else if let Some(pos) = raw.find(".png") {
        (ImageExt::Png, pos)
    } else {
        return None;
    };
    Some((raw[..pos + ext.as_str().len()].to_string(), ext))
}

/// Derives a filesystem-safe file name from an image description.
///
/// Strips non-ASCII characters and characters invalid in file names,
/// truncates the stem to [`MAX_STEM_LEN`] and appends the extension.
/// Idempotent: deriving from the same description always yields the same
/// name.
#[must_use]
pub fn derive_file_name(description: &str, ext: ImageExt) -> String {
    let mut stem: String = description
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    stem.truncate(MAX_STEM_LEN);

    let mut name = stem;
    name.push_str(ext.as_str());
    name
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== URL normalization ====================

    #[test]
    fn test_normalize_truncates_trailing_garbage_after_jpg() {
        let (url, ext) = normalize_image_url("/th/xyz.jpg&ashjg.jpg").unwrap();
        assert_eq!(url, "/th/xyz.jpg");
        assert_eq!(ext, ImageExt::Jpg);
    }

    #[test]
    fn test_normalize_truncates_after_png() {
        let (url, ext) = normalize_image_url("/images/pic.png?w=1920&h=1080").unwrap();
        assert_eq!(url, "/images/pic.png");
        assert_eq!(ext, ImageExt::Png);
    }

    #[test]
    fn test_normalize_clean_url_is_unchanged() {
        let (url, _) = normalize_image_url("/th/clean.jpg").unwrap();
        assert_eq!(url, "/th/clean.jpg");
    }

    #[test]
    fn test_normalize_no_known_extension_is_none() {
        assert!(normalize_image_url("/th?id=notanimage").is_none());
        assert!(normalize_image_url("").is_none());
    }

    #[test]
    fn test_normalize_prefers_jpg_over_later_png() {
        let (url, ext) = normalize_image_url("/a.jpg.png").unwrap();
        assert_eq!(url, "/a.jpg");
        assert_eq!(ext, ImageExt::Jpg);
    }

    // ==================== Filename derivation ====================

    #[test]
    fn test_derive_file_name_appends_extension() {
        assert_eq!(
            derive_file_name("Sunrise over the bay", ImageExt::Jpg),
            "Sunrise over the bay.jpg"
        );
    }

    #[test]
    fn test_derive_file_name_strips_non_ascii() {
        assert_eq!(
            derive_file_name("Fjord (© Photographer)", ImageExt::Jpg),
            "Fjord ( Photographer).jpg"
        );
    }

    #[test]
    fn test_derive_file_name_strips_invalid_filename_chars() {
        let name = derive_file_name(r#"a/b\c:d*e?f"g<h>i|j"#, ImageExt::Png);
        assert_eq!(name, "abcdefghij.png");
    }

    #[test]
    fn test_derive_file_name_truncates_long_descriptions() {
        let long = "x".repeat(500);
        let name = derive_file_name(&long, ImageExt::Jpg);
        assert_eq!(name.len(), MAX_STEM_LEN + 4);
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_derive_file_name_is_idempotent_on_derived_stem() {
        let description = "Mer de Glace, d'épaisseur (© Photo)";
        let first = derive_file_name(description, ImageExt::Jpg);
        let stem = first.trim_end_matches(".jpg");
        let second = derive_file_name(stem, ImageExt::Jpg);
        assert_eq!(first, second);
    }

    #[test]
    fn test_derive_file_name_output_stays_ascii() {
        let name = derive_file_name("日本語の説明 with tail", ImageExt::Png);
        assert!(name.is_ascii());
        assert_eq!(name, " with tail.png");
    }
}
