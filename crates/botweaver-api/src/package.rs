//! Zip packaging of generated projects.

use std::io::{Cursor, Write};

use botweaver_codegen::ProjectArtifact;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter, result::ZipResult};

/// Pack every file of `artifact` at the archive root, deflated, keeping the
/// executable bit on scripts.
pub fn zip_project(artifact: &ProjectArtifact) -> ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, contents) in &artifact.files {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(artifact.file_mode(path));
        writer.start_file(path.as_str(), options)?;
        writer.write_all(contents.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

/// `Content-Disposition` value for a download named `<stem><suffix>`.
///
/// Characters that cannot appear in a quoted ASCII header value are replaced.
pub fn attachment(stem: &str, suffix: &str) -> String {
    let mut safe: String = stem
        .trim()
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    if safe.is_empty() {
        safe.push_str("bot");
    }
    format!("attachment; filename=\"{safe}{suffix}\"")
}
