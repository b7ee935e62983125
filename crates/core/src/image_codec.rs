//! Turning images into text that can travel inside a JSON request.
//!
//! Images are re-encoded as PNG and then base64 encoded with the standard
//! alphabet, which is what the server expects in the `images` field.

use std::fmt::{self, Display};
use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat};
use little_ollama_model::EncodedImage;

/// Describes an image codec error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageError {
    /// The input could not be read as an image, or as base64 text.
    InvalidInput(String),
    /// The image could not be written as PNG.
    Encoding(String),
}

impl Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::InvalidInput(reason) => {
                write!(f, "Invalid image: {reason}")
            }
            ImageError::Encoding(reason) => {
                write!(f, "Failed to encode image: {reason}")
            }
        }
    }
}

impl std::error::Error for ImageError {}

/// Encodes a decoded image as base64 PNG.
pub fn encode_image(image: &DynamicImage) -> Result<EncodedImage, ImageError> {
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|err| ImageError::Encoding(err.to_string()))?;
    let png = png.into_inner();
    trace!(
        "encoded a {}x{} image into {} bytes of png",
        image.width(),
        image.height(),
        png.len()
    );
    Ok(EncodedImage::from_encoded(STANDARD.encode(png)))
}

/// Decodes an uploaded file (PNG or JPEG) and encodes it as base64 PNG.
pub fn encode_image_bytes(bytes: &[u8]) -> Result<EncodedImage, ImageError> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| ImageError::InvalidInput(err.to_string()))?;
    encode_image(&image)
}

/// Returns the PNG bytes behind an encoded image.
pub fn decode_image(encoded: &EncodedImage) -> Result<Vec<u8>, ImageError> {
    STANDARD
        .decode(encoded.as_str())
        .map_err(|err| ImageError::InvalidInput(err.to_string()))
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn sample_image() -> DynamicImage {
        let image = RgbImage::from_fn(4, 3, |x, y| {
            Rgb([(x * 60) as u8, (y * 80) as u8, 200])
        });
        DynamicImage::ImageRgb8(image)
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png).unwrap();
        png.into_inner()
    }

    #[test]
    fn test_encode_then_decode_gives_png_bytes() {
        let image = sample_image();
        let encoded = encode_image(&image).unwrap();
        // PNG signature in base64.
        assert!(encoded.as_str().starts_with("iVBORw0KGgo"));

        let decoded = decode_image(&encoded).unwrap();
        assert_eq!(decoded, png_bytes(&image));

        let reloaded = image::load_from_memory(&decoded).unwrap();
        assert_eq!(reloaded.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let image = sample_image();
        assert_eq!(encode_image(&image), encode_image(&image));
    }

    #[test]
    fn test_encode_uploaded_bytes() {
        let image = sample_image();
        let encoded = encode_image_bytes(&png_bytes(&image)).unwrap();
        assert_eq!(encoded, encode_image(&image).unwrap());
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            encode_image_bytes(b"definitely not an image"),
            Err(ImageError::InvalidInput(_))
        ));
        assert!(matches!(
            decode_image(&EncodedImage::from_encoded("%%%")),
            Err(ImageError::InvalidInput(_))
        ));
    }
}
