//! Packing of the build context into the gzip tarball the Docker API expects.

use std::io;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Archives `context_dir` (recursively, relative to its root) as a gzip-compressed tar.
pub fn pack_context(context_dir: &Path) -> io::Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut archive = tar::Builder::new(encoder);
    archive.follow_symlinks(false);
    archive.append_dir_all(".", context_dir)?;
    archive.into_inner()?.finish()
}
