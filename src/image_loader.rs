//! # Logo Loading
//!
//! Loads the optional header logo from a data URI, a file path, or a raw
//! base64 string. JPEG bytes pass straight through to the PDF (DCTDecode);
//! PNG is decoded to RGB with a separate alpha channel for the SMask.
//!
//! Every failure is reported as `DocketError::ResourceUnavailable`. The
//! composer never lets that error escape: it draws a text placeholder instead.

use std::io::Cursor;

use crate::error::{DocketError, Result};

/// A decoded image ready for PDF embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Height / width, used to fit the logo into its box.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width_px == 0 {
            1.0
        } else {
            self.height_px as f64 / self.width_px as f64
        }
    }
}

/// The pixel data in a form the PDF serializer can consume directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes
        rgb: Vec<u8>,
        /// width * height bytes. None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...`
/// - a file path starting with `/`, `./` or `../`
/// - raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage> {
    let raw = read_source_bytes(src)?;
    decode_image_bytes(&raw)
}

fn unavailable(msg: String) -> DocketError {
    DocketError::ResourceUnavailable(msg)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    if src.starts_with("data:image/") {
        let comma = src
            .find(',')
            .ok_or_else(|| unavailable("invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma + 1..]);
    }

    // Only explicit path prefixes; base64 payloads can contain '/'.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        #[cfg(not(target_arch = "wasm32"))]
        {
            return std::fs::read(src)
                .map_err(|e| unavailable(format!("failed to read image file '{}': {}", src, e)));
        }
        #[cfg(target_arch = "wasm32")]
        {
            return Err(unavailable(format!(
                "file path images are not available in WASM: '{}'",
                src
            )));
        }
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| unavailable(format!("base64 decode error: {}", e)))
}

/// Detect the format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage> {
    if data.len() < 4 {
        return Err(unavailable("image data too short".to_string()));
    }
    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(unavailable(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47]
}

fn decode_jpeg(data: &[u8]) -> Result<LoadedImage> {
    let (width, height) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| unavailable(format!("JPEG format detection error: {}", e)))?
        .into_dimensions()
        .map_err(|e| unavailable(format!("failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk JPEG markers to the SOF segment and read its component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> Result<LoadedImage> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| unavailable(format!("PNG format detection error: {}", e)))?
        .decode()
        .map_err(|e| unavailable(format!("failed to decode PNG: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
    }
    let has_transparency = alpha.iter().any(|&a| a != 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: has_transparency.then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(pixel: [u8; 4]) -> Vec<u8> {
        let mut img = image::RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba(pixel));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 1, 1, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    #[test]
    fn test_magic_bytes() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0x89, 0x50]));
    }

    #[test]
    fn test_failures_are_resource_unavailable() {
        for src in ["data:image/png;base64", "!!not base64!!", "./no/such/logo.png"] {
            match load_image(src) {
                Err(DocketError::ResourceUnavailable(_)) => {}
                other => panic!("expected ResourceUnavailable for {:?}, got {:?}", src, other),
            }
        }
    }

    #[test]
    fn test_unsupported_format() {
        assert!(decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]).is_err());
    }

    #[test]
    fn test_decode_opaque_png() {
        let loaded = decode_image_bytes(&png_bytes([255, 0, 0, 255])).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (1, 1));
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[255, 0, 0]);
                assert!(alpha.is_none());
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_decode_png_with_alpha() {
        let loaded = decode_image_bytes(&png_bytes([0, 0, 255, 128])).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Decoded { alpha, .. } => {
                assert_eq!(alpha.as_deref(), Some(&[128u8][..]));
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_jpeg_passes_through() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();

        let loaded = decode_image_bytes(&buf).unwrap();
        assert_eq!(loaded.aspect_ratio(), 1.0);
        match &loaded.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert!(data.starts_with(&[0xFF, 0xD8]));
                assert_eq!(*color_space, JpegColorSpace::DeviceRGB);
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn test_data_uri() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes([0, 255, 0, 255]));
        let loaded = load_image(&format!("data:image/png;base64,{}", b64)).unwrap();
        assert_eq!(loaded.width_px, 1);
    }
}
