//! Image upload constraints.

use crate::error::CoreError;

/// Maximum accepted upload size (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted image extensions, lowercase.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Return the lowercase extension of `filename` if it is an accepted image type.
pub fn image_extension(filename: &str) -> Result<String, CoreError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported image type '{filename}'. Allowed: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

/// Validate an uploaded image's name and size.
pub fn validate_image_upload(filename: &str, size: usize) -> Result<String, CoreError> {
    if size == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "Uploaded file exceeds maximum size of {MAX_UPLOAD_BYTES} bytes"
        )));
    }
    image_extension(filename)
}
