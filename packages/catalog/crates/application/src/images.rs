use crate::error::{CatalogError, Result};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Decodes an uploaded image of any supported format and re-encodes it as
/// an RGB JPEG, the only format stored and sent to the models.
pub fn to_jpeg(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(CatalogError::InvalidImage("empty upload".to_string()));
    }

    let decoded =
        image::load_from_memory(bytes).map_err(|e| CatalogError::InvalidImage(e.to_string()))?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| CatalogError::InvalidImage(e.to_string()))?;
    Ok(out.into_inner())
}

/// [`to_jpeg`] off the async runtime.
pub async fn to_jpeg_blocking(bytes: Vec<u8>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || to_jpeg(&bytes))
        .await
        .map_err(|e| CatalogError::InvalidImage(format!("image decoding task failed: {}", e)))?
}

pub fn new_image_key() -> String {
    format!("products/{}.jpg", uuid::Uuid::new_v4())
}
