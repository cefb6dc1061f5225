//! Shared helpers for integration tests.
#![allow(dead_code)]

use document_analyzer::pipeline::engine::pdfium_available;
use std::path::Path;

/// Skip the calling test when no pdfium library can be bound.
#[macro_export]
macro_rules! skip_unless_pdfium {
    () => {
        if !common::pdfium_ready() {
            println!("SKIP: pdfium library not available (set PDFIUM_LIB_PATH)");
            return;
        }
    };
}

pub fn pdfium_ready() -> bool {
    pdfium_available()
}

/// A valid PDF with `pages` blank pages, each `size_pt` × `size_pt` points.
pub fn minimal_pdf(pages: usize, size_pt: u32) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", i + 3)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages
    ));
    for _ in 0..pages {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {size_pt} {size_pt}] /Resources << >> >>"
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

/// Write a `pages`-page PDF to `path`.
pub fn write_pdf(path: &Path, pages: usize) {
    std::fs::write(path, minimal_pdf(pages, 72)).expect("write test pdf");
}

/// PNG files in `dir`, sorted by name.
pub fn png_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n.ends_with(".png"))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
