//! Conversion of crop buffers into encoded images.

use std::io::Cursor;

use image::error::{ParameterError, ParameterErrorKind};
use image::{DynamicImage, GrayImage, ImageError, ImageFormat, RgbImage};
use ndarray::Array3;

/// Wrap a height x width x channels buffer (1 or 3 channels) as an image.
pub fn to_dynamic_image(crop: &Array3<u8>) -> Result<DynamicImage, ImageError> {
    let (height, width, channels) = crop.dim();
    let raw: Vec<u8> = crop.as_standard_layout().iter().copied().collect();
    let (width, height) = (width as u32, height as u32);

    let image = match channels {
        3 => RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
        1 => GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8),
        _ => None,
    };
    image.ok_or_else(|| {
        ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        ))
    })
}

/// Encode a crop buffer as JPEG bytes.
pub fn encode_jpeg(crop: &Array3<u8>) -> Result<Vec<u8>, ImageError> {
    let image = to_dynamic_image(crop)?;
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rgb_crop() {
        let crop = Array3::from_elem((16, 24, 3), 200u8);
        let jpeg = encode_jpeg(&crop).unwrap();

        // JPEG SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (24, 16));
    }

    #[test]
    fn test_encode_grayscale_crop() {
        let crop = Array3::from_elem((8, 8, 1), 10u8);
        assert!(encode_jpeg(&crop).is_ok());
    }

    #[test]
    fn test_rejects_unsupported_channels() {
        let crop = Array3::from_elem((8, 8, 2), 10u8);
        assert!(encode_jpeg(&crop).is_err());
    }
}
