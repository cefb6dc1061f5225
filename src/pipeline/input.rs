//! Input resolution: user-path expansion and documents-directory discovery.
//!
//! Discovery reads the directory once, classifies each file by extension and
//! loads image bytes up front, so the analyzer stage receives a complete
//! message. Unsupported files are never an error: they are logged with
//! `warn!` and recorded in [`DocumentInventory::skipped`].

use crate::document::{is_pdf_path, Document, DocumentInventory, ImageFormat, SkippedDocument};
use crate::error::AnalyzerError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Expand a leading `~` (alone or followed by a separator) to the invoking
/// user's home directory. Other paths are returned unchanged.
pub fn expand_user(path: &str) -> PathBuf {
    expand_with_home(path, dirs::home_dir().as_deref())
}

/// [`expand_user`] with an explicit home directory; `None` leaves `~` as is.
pub fn expand_with_home(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Enumerate `dir` and classify every regular file.
///
/// * `jpg`/`jpeg`/`png`/`gif`/`webp` (any case): loaded as images.
/// * `pdf` (any case): queued for rasterization when `pdf_support` is on,
///   otherwise skipped like any unsupported file.
/// * anything else: skipped with a warning.
///
/// Entries are processed in file-name order so runs are reproducible.
pub fn discover_documents(dir: &Path, pdf_support: bool) -> Result<DocumentInventory, AnalyzerError> {
    let entries = std::fs::read_dir(dir).map_err(|e| AnalyzerError::DocumentsDirUnreadable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AnalyzerError::DocumentsDirUnreadable {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            debug!("Ignoring subdirectory {}", path.display());
            continue;
        }
        paths.push(path);
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut inventory = DocumentInventory::default();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(format) = ImageFormat::from_path(&path) {
            let bytes = std::fs::read(&path).map_err(|e| AnalyzerError::DocumentRead {
                path: path.clone(),
                source: e,
            })?;
            debug!("Loaded image {} ({}, {} bytes)", name, format, bytes.len());
            inventory.images.push(Document::image(path, format, bytes));
        } else if pdf_support && is_pdf_path(&path) {
            debug!("Queued PDF {}", name);
            inventory.pdfs.push(Document::pdf(path));
        } else {
            let reason = if is_pdf_path(&path) {
                "PDF input is disabled for this run (jpg/jpeg/png/gif/webp only)".to_string()
            } else if pdf_support {
                "not a supported image format (jpg/jpeg/png/gif/webp) or PDF".to_string()
            } else {
                "not a supported image format (jpg/jpeg/png/gif/webp)".to_string()
            };
            warn!("Skipping file {}: {}", name, reason);
            inventory.skipped.push(SkippedDocument { path, reason });
        }
    }

    info!(
        "Discovered {} image(s), {} PDF(s), skipped {} file(s) in {}",
        inventory.images.len(),
        inventory.pdfs.len(),
        inventory.skipped.len(),
        dir.display()
    );
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_to_home() {
        let home = Path::new("/home/ana");
        assert_eq!(
            expand_with_home("~/docs/a.pdf", Some(home)),
            PathBuf::from("/home/ana/docs/a.pdf")
        );
        assert_eq!(expand_with_home("~", Some(home)), PathBuf::from("/home/ana"));
    }

    #[test]
    fn only_leading_tilde_segment_expands() {
        let home = Path::new("/home/ana");
        assert_eq!(
            expand_with_home("/tmp/~/a.pdf", Some(home)),
            PathBuf::from("/tmp/~/a.pdf")
        );
        assert_eq!(expand_with_home("~bob/a.pdf", Some(home)), PathBuf::from("~bob/a.pdf"));
    }

    #[test]
    fn no_home_leaves_path_alone() {
        assert_eq!(expand_with_home("~/a.pdf", None), PathBuf::from("~/a.pdf"));
    }

    #[test]
    fn mixed_directory_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"png-bytes").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"notes").unwrap();
        std::fs::write(dir.path().join("c.PDF"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("d.webp"), b"webp-bytes").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let inv = discover_documents(dir.path(), true).unwrap();
        let images: Vec<_> = inv.images.iter().map(|d| d.display_name()).collect();
        assert_eq!(images, vec!["a.png", "d.webp"]);
        assert_eq!(inv.pdfs.len(), 1);
        assert_eq!(inv.pdfs[0].display_name(), "c.PDF");
        assert_eq!(inv.skipped.len(), 1);
        assert!(inv.skipped[0].path.ends_with("b.txt"));
        assert_eq!(inv.analyzable(), 3);
    }

    #[test]
    fn image_only_variant_skips_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("c.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("a.JPG"), b"jpeg").unwrap();

        let inv = discover_documents(dir.path(), false).unwrap();
        assert_eq!(inv.images.len(), 1);
        assert!(inv.pdfs.is_empty());
        assert_eq!(inv.skipped.len(), 1);
        assert!(inv.skipped[0].reason.contains("disabled"));
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let inv = discover_documents(dir.path(), true).unwrap();
        assert_eq!(inv.analyzable(), 0);
    }

    #[test]
    fn missing_directory_is_fatal() {
        let err = discover_documents(Path::new("/definitely/not/here"), true).unwrap_err();
        assert!(matches!(err, AnalyzerError::DocumentsDirUnreadable { .. }));
    }
}
