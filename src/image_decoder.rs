use image::DynamicImage;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("upload is empty")]
    Empty,
    #[error("upload is not a decodable image: {0}")]
    InvalidImage(#[from] image::ImageError),
}

/// Decodes an upload, sniffing the format from its leading bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(image::load_from_memory(bytes)?)
}
