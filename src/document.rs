//! Input document types.
//!
//! A [`Document`] is a file reference plus what the pipeline knows about it:
//! either an image with its bytes already loaded, or a PDF that the analyzer
//! stage will rasterize later.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Image formats the analyzer accepts directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Extensions recognised as images, lower-case, without the dot.
    pub const EXTENSIONS: [&'static str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

    /// Classify an extension (case-insensitive, no leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True for `.pdf` in any letter case.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// What kind of input a document is.
#[derive(Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Image { format: ImageFormat, bytes: Vec<u8> },
    Pdf,
}

impl fmt::Debug for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Image { format, bytes } => f
                .debug_struct("Image")
                .field("format", format)
                .field("bytes", &bytes.len())
                .finish(),
            DocumentKind::Pdf => f.write_str("Pdf"),
        }
    }
}

/// One input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    pub fn image(path: impl Into<PathBuf>, format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            kind: DocumentKind::Image { format, bytes },
        }
    }

    pub fn pdf(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: DocumentKind::Pdf,
        }
    }

    /// File name for log lines; falls back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A file that discovery passed over, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of enumerating the documents directory.
#[derive(Debug, Clone, Default)]
pub struct DocumentInventory {
    /// Image documents in file-name order, bytes loaded.
    pub images: Vec<Document>,
    /// PDF documents in file-name order (PDF-capable runs only).
    pub pdfs: Vec<Document>,
    /// Files skipped with a warning.
    pub skipped: Vec<SkippedDocument>,
}

impl DocumentInventory {
    /// Number of documents that will reach the analyzer.
    pub fn analyzable(&self) -> usize {
        self.images.len() + self.pdfs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_classification_is_case_insensitive() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("Jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("webp"), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::from_extension("txt"), None);
        assert_eq!(ImageFormat::from_extension("pdf"), None);
    }

    #[test]
    fn every_listed_extension_is_recognised() {
        for ext in ImageFormat::EXTENSIONS {
            assert!(ImageFormat::from_extension(ext).is_some(), "{ext}");
        }
    }

    #[test]
    fn pdf_detection() {
        assert!(is_pdf_path(Path::new("c.PDF")));
        assert!(is_pdf_path(Path::new("/x/y/report.pdf")));
        assert!(!is_pdf_path(Path::new("pdf")));
        assert!(!is_pdf_path(Path::new("a.pdf.txt")));
    }

    #[test]
    fn debug_hides_image_bytes() {
        let doc = Document::image("a.png", ImageFormat::Png, vec![0u8; 4096]);
        let dbg = format!("{doc:?}");
        assert!(dbg.contains("4096"));
        assert!(dbg.len() < 200);
    }

    #[test]
    fn mime_types() {
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Gif.to_string(), "gif");
    }
}
