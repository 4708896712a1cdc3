//! Writes rendered exports to disk.

use giftbook_core::ExportDocument;
use log::info;
use std::path::{Path, PathBuf};

/// Writes `document` under `dir`, creating missing directories, and returns
/// the file path. An existing file with the same name is overwritten.
pub fn write_document(document: &ExportDocument, dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&document.file_name);
    std::fs::write(&path, document.content.as_bytes())?;
    info!(
        "event=export_write module=cli status=ok mime={} bytes={}",
        document.mime_type,
        document.content.len()
    );
    Ok(path)
}
