//! PDFium binding.
//!
//! Resolution order (first match wins):
//!
//! 1. `PDFIUM_LIB_PATH`: the library file itself, or a directory holding it.
//! 2. The platform library (`libpdfium.so` / `.dylib` / `pdfium.dll`) in the
//!    current working directory.
//! 3. The system library search path.

use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to a pdfium library, returning a human-readable reason on failure.
pub fn bind_pdfium() -> Result<Pdfium, String> {
    if let Some(path) = env_library_path() {
        return bind_pdfium_from_path(&path);
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    match Pdfium::bind_to_library(&local) {
        Ok(bindings) => {
            debug!("Bound pdfium from {}", local.display());
            Ok(Pdfium::new(bindings))
        }
        Err(local_err) => Pdfium::bind_to_system_library()
            .map(|bindings| {
                debug!("Bound system pdfium library");
                Pdfium::new(bindings)
            })
            .map_err(|e| {
                format!(
                    "pdfium library not found (local: {local_err}; system: {e}). \
                     Set {PDFIUM_LIB_PATH_ENV}=/path/to/libpdfium"
                )
            }),
    }
}

/// Bind to the library at `path`; a directory is searched for the platform name.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, String> {
    let lib = if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    };
    Pdfium::bind_to_library(&lib)
        .map(Pdfium::new)
        .map_err(|e| format!("failed to bind pdfium from '{}': {e}", lib.display()))
}

/// `PDFIUM_LIB_PATH` when set, non-empty and pointing at something that exists.
fn env_library_path() -> Option<PathBuf> {
    std::env::var_os(PDFIUM_LIB_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.exists())
}

/// True when a pdfium library can be bound in this process.
pub fn pdfium_available() -> bool {
    bind_pdfium().is_ok()
}
