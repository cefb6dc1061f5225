//! PDF rasterisation: render a page range to PNG files via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is CPU-bound and not
//! async-aware. [`rasterize`] moves the work onto tokio's blocking pool. The
//! join also catches a panic inside the render thread and reports it as
//! [`RasterError::ConversionFailure`] instead of tearing down the caller.
//!
//! ## Output naming
//!
//! Page `n` of `report.pdf` is written to `<output_dir>/report_page_<n>.png`,
//! where `n` is the absolute 1-based page number. Names are deterministic so
//! re-running a request overwrites the previous files instead of adding new
//! ones, and a retry after a mid-document failure simply replaces whatever
//! was already written.

use crate::config::DEFAULT_DPI;
use crate::error::RasterError;
use crate::pipeline::engine;
use crate::pipeline::input::expand_user;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A request to convert (part of) a PDF into PNG files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Source PDF; `~` is expanded. `None` or blank fails with `MissingArgument`.
    pub pdf_path: Option<String>,
    /// Destination directory; `None` means the source's own directory.
    pub output_dir: Option<String>,
    /// Rendering resolution. Default: 200.
    pub dpi: u32,
    /// First page, 1-based inclusive. Default: 1.
    pub first_page: u32,
    /// Last page, 1-based inclusive; `None` means the final page.
    pub last_page: Option<u32>,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self {
            pdf_path: None,
            output_dir: None,
            dpi: DEFAULT_DPI,
            first_page: 1,
            last_page: None,
        }
    }
}

impl ConversionRequest {
    /// Request for every page of `pdf_path` with default settings.
    pub fn new(pdf_path: impl Into<String>) -> Self {
        Self {
            pdf_path: Some(pdf_path.into()),
            ..Self::default()
        }
    }

    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn pages(mut self, first: u32, last: Option<u32>) -> Self {
        self.first_page = first;
        self.last_page = last;
        self
    }
}

/// Generated page images, in ascending page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub images: Vec<PathBuf>,
}

impl ConversionResult {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// File name for page `page_num` of a document whose stem is `base`.
pub fn page_file_name(base: &str, page_num: u32) -> String {
    format!("{base}_page_{page_num}.png")
}

/// Convert a PDF page range to PNG files on tokio's blocking pool.
pub async fn rasterize(request: ConversionRequest) -> Result<ConversionResult, RasterError> {
    let source = request.pdf_path.clone().unwrap_or_default();
    tokio::task::spawn_blocking(move || rasterize_blocking(&request))
        .await
        .map_err(|e| RasterError::ConversionFailure {
            path: PathBuf::from(source),
            detail: format!("render task panicked: {e}"),
        })?
}

/// Blocking implementation of [`rasterize`].
///
/// Steps, in order: resolve the source (`MissingArgument` / `NotFound`),
/// validate the page range, create the output directory, render and save
/// each page. DPI is passed to the renderer as given; a value it cannot
/// render surfaces as `ConversionFailure`.
pub fn rasterize_blocking(request: &ConversionRequest) -> Result<ConversionResult, RasterError> {
    let raw_path = request
        .pdf_path
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or(RasterError::MissingArgument)?;
    let pdf_path = expand_user(raw_path);
    if !pdf_path.exists() {
        return Err(RasterError::NotFound { path: pdf_path });
    }

    validate_range(request.first_page, request.last_page)?;

    let output_dir = resolve_output_dir(&pdf_path, request.output_dir.as_deref());
    std::fs::create_dir_all(&output_dir).map_err(|e| RasterError::IoFailure {
        path: output_dir.clone(),
        source: e,
    })?;

    let base = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let pdfium = engine::bind_pdfium().map_err(|detail| RasterError::ConversionFailure {
        path: pdf_path.clone(),
        detail,
    })?;
    let document = pdfium
        .load_pdf_from_file(&pdf_path, None)
        .map_err(|e| RasterError::ConversionFailure {
            path: pdf_path.clone(),
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as u32;
    let last_page = request.last_page.map_or(total_pages, |l| l.min(total_pages));
    info!(
        "Rasterizing {} pages {}..={} of {} at {} DPI",
        pdf_path.display(),
        request.first_page,
        last_page,
        total_pages,
        request.dpi
    );

    if request.first_page > last_page {
        debug!(
            "No pages in range: first page {} beyond document end ({} pages)",
            request.first_page, total_pages
        );
        return Ok(ConversionResult::default());
    }

    let render_config = PdfRenderConfig::new().scale_page_by_factor(request.dpi as f32 / 72.0);

    let mut images = Vec::with_capacity((last_page - request.first_page + 1) as usize);
    for page_num in request.first_page..=last_page {
        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| RasterError::ConversionFailure {
                path: pdf_path.clone(),
                detail: format!("page {page_num}: {e:?}"),
            })?;

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RasterError::ConversionFailure {
                path: pdf_path.clone(),
                detail: format!("page {page_num}: {e:?}"),
            })?;
        let image = bitmap.as_image();
        if image.width() == 0 || image.height() == 0 {
            return Err(RasterError::ConversionFailure {
                path: pdf_path.clone(),
                detail: format!("page {page_num}: empty bitmap at {} DPI", request.dpi),
            });
        }

        let image_path = output_dir.join(page_file_name(&base, page_num));
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| RasterError::IoFailure {
                path: image_path.clone(),
                source: into_io_error(e),
            })?;
        debug!(
            "Saved page {} → {} ({}x{} px)",
            page_num,
            image_path.display(),
            image.width(),
            image.height()
        );
        images.push(image_path);
    }

    Ok(ConversionResult { images })
}

fn validate_range(first_page: u32, last_page: Option<u32>) -> Result<(), RasterError> {
    if first_page < 1 {
        return Err(RasterError::InvalidArgument {
            field: "first_page",
            detail: "pages are 1-based; first_page must be ≥ 1".into(),
        });
    }
    if let Some(last) = last_page {
        if last < first_page {
            return Err(RasterError::InvalidArgument {
                field: "last_page",
                detail: format!("last_page {last} is before first_page {first_page}"),
            });
        }
    }
    Ok(())
}

/// Explicit directory (home-expanded), else the source's parent, else `.`.
fn resolve_output_dir(pdf_path: &Path, output_dir: Option<&str>) -> PathBuf {
    match output_dir.filter(|d| !d.is_empty()) {
        Some(dir) => expand_user(dir),
        None => match pdf_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    }
}

fn into_io_error(e: image::ImageError) -> std::io::Error {
    match e {
        image::ImageError::IoError(io) => io,
        other => std::io::Error::other(other.to_string()),
    }
}
