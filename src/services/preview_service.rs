use crate::error::AppError;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageReader;
use std::io::Cursor;

const PREVIEW_SIZE: u32 = 192;
const PREVIEW_QUALITY: u8 = 70;

/// Build a bounded JPEG preview of an uploaded image as a data URI.
/// Respects EXIF orientation.
pub fn generate_preview(bytes: &[u8]) -> Result<String, AppError> {
    let orientation = read_orientation(bytes);

    let mut img = decode_image(bytes)?;

    // Nearest-neighbor first when the source is far larger than the preview
    let intermediate_size = PREVIEW_SIZE * 4;
    if img.width() > intermediate_size * 2 || img.height() > intermediate_size * 2 {
        img = img.resize(intermediate_size, intermediate_size, FilterType::Nearest);
    }
    img = img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Triangle);

    if orientation != 1 {
        img = apply_orientation(img, orientation);
    }

    let jpeg = encode_jpeg_preview(&img)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&jpeg);
    Ok(format!("data:image/jpeg;base64,{}", b64))
}

/// Width and height of an encoded image, without a full decode.
pub fn image_dimensions(bytes: &[u8]) -> Option<[u32; 2]> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
        .map(|(w, h)| [w, h])
}

fn decode_image(bytes: &[u8]) -> Result<image::DynamicImage, AppError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError {
            message: format!("Failed to read image header: {}", e),
        })?
        .decode()
        .map_err(|e| AppError {
            message: format!("Failed to decode image: {}", e),
        })
}

fn encode_jpeg_preview(img: &image::DynamicImage) -> Result<Vec<u8>, AppError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, PREVIEW_QUALITY);
    // JPEG has no alpha channel
    image::DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| AppError {
            message: format!("Failed to encode preview: {}", e),
        })?;
    Ok(buffer.into_inner())
}

/// Orientation defaults to 1 if the container has no EXIF block.
fn read_orientation(bytes: &[u8]) -> u32 {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(e) => e,
        Err(_) => return 1,
    };

    match exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        Some(field) => match field.value {
            exif::Value::Short(ref v) => *v.first().unwrap_or(&1) as u32,
            exif::Value::Long(ref v) => *v.first().unwrap_or(&1),
            _ => 1,
        },
        None => 1,
    }
}

fn apply_orientation(img: image::DynamicImage, orientation: u32) -> image::DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}
