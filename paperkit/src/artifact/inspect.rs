//! Archive content checks.

use std::fs::File;
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

/// Manifest files that mark an archive as a loadable plugin.
pub const PLUGIN_MANIFESTS: [&str; 2] = ["plugin.yml", "paper-plugin.yml"];

/// Whether the archive at `path` contains a plugin manifest at its root.
///
/// Blocking; callers on the async runtime go through `spawn_blocking`.
pub fn contains_plugin_manifest(path: &Path) -> Result<bool, ZipError> {
    let archive = ZipArchive::new(File::open(path)?)?;
    let found = archive
        .file_names()
        .any(|name| PLUGIN_MANIFESTS.contains(&name));
    Ok(found)
}
