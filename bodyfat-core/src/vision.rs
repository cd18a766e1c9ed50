use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use log::debug;

const JPEG_QUALITY: u8 = 85;
const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Raw image bytes with the media type declared by the uploader. The
/// declared type is advisory; decoding works off the bytes themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }
}

/// Builds the `data:` URL attached to image-assisted requests. The URL
/// keeps the declared media type (`image/jpeg` when empty) even after
/// re-encoding.
pub fn to_data_url(payload: &ImagePayload) -> String {
    let media_type = if payload.media_type.is_empty() {
        DEFAULT_MEDIA_TYPE
    } else {
        &payload.media_type
    };
    format!("data:{};base64,{}", media_type, encode_base64(payload))
}

/// Base64 text for one payload. Declared image types are decoded, flattened
/// onto white, and re-encoded as quality-85 JPEG; anything that fails to
/// decode, or is not declared as an image, is passed through unmodified.
/// This step never fails.
pub fn encode_base64(payload: &ImagePayload) -> String {
    if payload.media_type.starts_with("image/") {
        match reencode_jpeg(&payload.bytes) {
            Ok(jpeg) => return STANDARD.encode(jpeg),
            Err(e) => debug!("Image re-encoding failed, passing raw bytes through: {}", e),
        }
    }
    STANDARD.encode(&payload.bytes)
}

fn reencode_jpeg(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let flattened = flatten_onto_white(decoded);

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&flattened)?;
    Ok(out)
}

// JPEG has no transparency, so alpha images are composited onto a white
// background first.
fn flatten_onto_white(decoded: DynamicImage) -> RgbImage {
    if !decoded.color().has_alpha() {
        return decoded.to_rgb8();
    }

    let rgba = decoded.to_rgba8();
    let mut flattened = RgbImage::from_pixel(rgba.width(), rgba.height(), Rgb([255, 255, 255]));
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as f32 / 255.0;
        let blend = |channel: u8| (channel as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        flattened.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    flattened
}
