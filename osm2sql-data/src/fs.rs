//! Ambient-authority path helpers shared by the sink and the CLI.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs::Metadata, fs_utf8};

/// Metadata of the entry at `path`, following symlinks.
///
/// # Errors
/// Returns the I/O error from opening the containing directory or reading the
/// entry; a missing entry yields [`io::ErrorKind::NotFound`].
pub fn metadata(path: &Utf8Path) -> io::Result<Metadata> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "path has no file name"))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?.metadata(name)
}

/// Create every missing directory above `path`.
///
/// # Errors
/// Returns the I/O error from opening the filesystem root or creating the
/// directories.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let (base, relative) = split_root(parent);
    if relative.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(base, ambient_authority())?.create_dir_all(relative)
}

/// Split `path` into an ambient base directory and the remainder under it.
fn split_root(path: &Utf8Path) -> (&'static str, &Utf8Path) {
    match path.strip_prefix("/") {
        Ok(relative) => ("/", relative),
        Err(_) => (".", path),
    }
}
