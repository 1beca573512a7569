//! First-run disclosure marker.

use std::path::{Path, PathBuf};

pub const MARKER_FILE: &str = ".did_show_opt_info";

#[must_use]
pub fn marker_path(home: &Path) -> PathBuf {
    home.join(MARKER_FILE)
}

/// Whether the disclosure was shown before on this machine. Marks it as shown either way.
///
/// Check-then-write, not atomic: called at most once per process.
///
/// # Errors
///
/// Returns an error if the marker cannot be written.
pub fn did_show_message(home: &Path) -> std::io::Result<bool> {
    let path = marker_path(home);
    let did_show = path.exists();
    std::fs::write(&path, "1")?;
    Ok(did_show)
}
