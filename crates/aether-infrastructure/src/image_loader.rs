//! Reference image loading.
//!
//! Turns an image file into the `data:<mime>;base64,<payload>` URI that is
//! attached to the next prompt.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// Reads `path` and encodes it as a base64 data URI.
///
/// The MIME type is guessed from the extension and must be an image type.
pub async fn load_image_data_uri(path: &Path) -> Result<String> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    anyhow::ensure!(
        mime.type_() == mime_guess::mime::IMAGE,
        "{} is not an image (detected {})",
        path.display(),
        mime
    );

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    anyhow::ensure!(!bytes.is_empty(), "{} is empty", path.display());

    Ok(format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(bytes)))
}
