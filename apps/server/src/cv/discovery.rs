//! CV auto-discovery: find a likely CV PDF in a configured directory.

use std::path::{Path, PathBuf};

use tracing::debug;

/// File names checked first, in order, before falling back to any PDF.
const WELL_KNOWN_NAMES: [&str; 4] = ["CV.pdf", "cv.pdf", "resume.pdf", "Resume.pdf"];

/// Scans `dir` for a CV. Well-known names win; otherwise the first `*.pdf`
/// in sorted order. Returns `None` when the directory is missing or holds
/// no PDF.
pub fn find_cv_in_dir(dir: &Path) -> Option<PathBuf> {
    for name in WELL_KNOWN_NAMES {
        let candidate = dir.join(name);
        if candidate.is_file() {
            debug!("Discovered CV by well-known name: {}", candidate.display());
            return Some(candidate);
        }
    }

    let entries = std::fs::read_dir(dir).ok()?;
    let mut pdfs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
        })
        .collect();
    pdfs.sort();

    let found = pdfs.into_iter().next();
    if let Some(path) = &found {
        debug!("Discovered CV by extension scan: {}", path.display());
    }
    found
}
