//! Zip export of the active component.

use anyhow::{Context, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const EXPORT_FILE_NAME: &str = "component.zip";
pub const COMPONENT_ENTRY: &str = "component.jsx";
pub const STYLES_ENTRY: &str = "styles.css";

/// Builds an archive holding `component.jsx` and `styles.css`.
pub fn build_archive(jsx_code: &str, css_code: &str) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, contents) in [(COMPONENT_ENTRY, jsx_code), (STYLES_ENTRY, css_code)] {
        writer
            .start_file(name, options)
            .with_context(|| format!("Failed to add {name} to archive"))?;
        writer.write_all(contents.as_bytes())?;
    }

    Ok(writer.finish().context("Failed to finish archive")?.into_inner())
}

/// Writes the archive to `path`, replacing any existing file.
pub fn write_archive(path: &Path, jsx_code: &str, css_code: &str) -> Result<()> {
    let bytes = build_archive(jsx_code, css_code)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Exported component to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
