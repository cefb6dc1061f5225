//! Rasterizer integration tests against a real pdfium library.
//!
//! Test PDFs are generated in-test. Every test that renders skips itself
//! (prints `SKIP`) when pdfium cannot be bound; point `PDFIUM_LIB_PATH` at a
//! libpdfium to run them:
//!   PDFIUM_LIB_PATH=/opt/pdfium/lib cargo test --test rasterize -- --nocapture

mod common;

use document_analyzer::tool::{invoke, ToolUse};
use document_analyzer::{rasterize, ConversionRequest, RasterError, ToolResponse};
use serde_json::json;
use std::path::Path;

fn request_for(pdf: &Path, out: &Path) -> ConversionRequest {
    ConversionRequest::new(pdf.to_string_lossy()).output_dir(out.to_string_lossy())
}

#[tokio::test]
async fn renders_every_page_in_order() {
    skip_unless_pdfium!();
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    common::write_pdf(&pdf, 3);
    let out = tmp.path().join("pages");

    let result = rasterize(request_for(&pdf, &out)).await.unwrap();

    let names: Vec<_> = result
        .images
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["doc_page_1.png", "doc_page_2.png", "doc_page_3.png"]);
    for path in &result.images {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"), "{} is not a PNG", path.display());
    }
}

#[tokio::test]
async fn page_range_uses_absolute_page_numbers() {
    skip_unless_pdfium!();
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    common::write_pdf(&pdf, 5);
    let out = tmp.path().join("pages");

    let result = rasterize(request_for(&pdf, &out).pages(2, Some(3)))
        .await
        .unwrap();

    assert_eq!(result.images, vec![out.join("doc_page_2.png"), out.join("doc_page_3.png")]);
    assert_eq!(common::png_files(&out), vec!["doc_page_2.png", "doc_page_3.png"]);
}

#[tokio::test]
async fn last_page_beyond_document_is_clipped() {
    skip_unless_pdfium!();
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    common::write_pdf(&pdf, 2);

    let result = rasterize(request_for(&pdf, tmp.path()).pages(2, Some(10)))
        .await
        .unwrap();

    assert_eq!(result.images, vec![tmp.path().join("doc_page_2.png")]);
}

#[tokio::test]
async fn first_page_beyond_document_is_empty_success() {
    skip_unless_pdfium!();
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    common::write_pdf(&pdf, 2);
    let out = tmp.path().join("pages");

    let result = rasterize(request_for(&pdf, &out).pages(5, None)).await.unwrap();

    assert!(result.is_empty());
    assert!(common::png_files(&out).is_empty());
}

#[tokio::test]
async fn output_defaults_to_source_directory() {
    skip_unless_pdfium!();
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("report.pdf");
    common::write_pdf(&pdf, 1);

    let result = rasterize(ConversionRequest::new(pdf.to_string_lossy()))
        .await
        .unwrap();

    assert_eq!(result.images, vec![tmp.path().join("report_page_1.png")]);
}

#[tokio::test]
async fn rerun_overwrites_instead_of_adding_files() {
    skip_unless_pdfium!();
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    common::write_pdf(&pdf, 2);
    let out = tmp.path().join("pages");

    let first = rasterize(request_for(&pdf, &out)).await.unwrap();
    let second = rasterize(request_for(&pdf, &out)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(common::png_files(&out).len(), 2);
}

#[tokio::test]
async fn dpi_scales_the_rendered_size() {
    skip_unless_pdfium!();
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    // One 72pt (one inch) square page.
    common::write_pdf(&pdf, 1);

    let low = rasterize(request_for(&pdf, &tmp.path().join("low")).dpi(72))
        .await
        .unwrap();
    let high = rasterize(request_for(&pdf, &tmp.path().join("high")).dpi(144))
        .await
        .unwrap();

    let (lw, _) = image::image_dimensions(&low.images[0]).unwrap();
    let (hw, _) = image::image_dimensions(&high.images[0]).unwrap();
    assert!((71..=73).contains(&lw), "72 DPI width was {lw}");
    assert!((143..=145).contains(&hw), "144 DPI width was {hw}");
}

#[tokio::test]
async fn zero_dpi_fails_in_the_renderer() {
    skip_unless_pdfium!();
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    common::write_pdf(&pdf, 1);
    let out = tmp.path().join("pages");

    let err = rasterize(request_for(&pdf, &out).dpi(0)).await.unwrap_err();

    assert!(matches!(err, RasterError::ConversionFailure { .. }), "{err:?}");
    assert!(common::png_files(&out).is_empty());
}

#[tokio::test]
async fn missing_pdf_creates_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("pages");

    let err = rasterize(request_for(&tmp.path().join("absent.pdf"), &out))
        .await
        .unwrap_err();

    assert!(matches!(err, RasterError::NotFound { .. }));
    assert!(!out.exists());
}

#[tokio::test]
async fn tool_reports_success_with_image_list() {
    skip_unless_pdfium!();
    let tmp = tempfile::tempdir().unwrap();
    let pdf = tmp.path().join("doc.pdf");
    common::write_pdf(&pdf, 2);

    let response = invoke(&ToolUse::new(
        Some("call-1".into()),
        json!({
            "pdf_path": pdf.to_string_lossy(),
            "output_dir": tmp.path().join("pages").to_string_lossy(),
            "dpi": "100",
        }),
    ))
    .await;

    match response {
        ToolResponse::Success {
            tool_use_id,
            images,
            message,
        } => {
            assert_eq!(tool_use_id.as_deref(), Some("call-1"));
            assert_eq!(images.len(), 2);
            assert!(images[0].ends_with("doc_page_1.png"));
            assert_eq!(message, "Successfully converted PDF to 2 PNG images");
        }
        other => panic!("expected success, got {other:?}"),
    }
}
