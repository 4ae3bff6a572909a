use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Edge length of stored profile images.
pub const PROFILE_IMAGE_SIZE: u32 = 512;
const PROFILE_IMAGE_QUALITY: u8 = 80;
const MIN_DIMENSION: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ProfileImageError {
    #[error("unsupported or corrupt image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image is too small ({width}x{height}), minimum is 10x10")]
    TooSmall { width: u32, height: u32 },
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
}

/// Normalize an uploaded profile picture.
///
/// Center-crops to a square, resizes to 512x512 and re-encodes as JPEG
/// (quality 80). Alpha is dropped.
pub fn process_profile_image(bytes: &[u8]) -> Result<Vec<u8>, ProfileImageError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(ProfileImageError::TooSmall { width, height });
    }

    let side = width.min(height);
    let square = img.crop_imm((width - side) / 2, (height - side) / 2, side, side);
    let resized = square.resize_exact(PROFILE_IMAGE_SIZE, PROFILE_IMAGE_SIZE, FilterType::Lanczos3);
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, PROFILE_IMAGE_QUALITY)
        .encode_image(&rgb)
        .map_err(ProfileImageError::Encode)?;

    Ok(out.into_inner())
}
