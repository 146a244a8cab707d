use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::render::backend::FrameRGBA;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// MIME prefix of every data URI produced here.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encode a frame as PNG bytes (straight alpha).
pub fn encode_png(frame: &FrameRGBA) -> TrainreelResult<Vec<u8>> {
    use image::ImageEncoder as _;

    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(TrainreelError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let rgba = frame.to_straight_rgba8();
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            &rgba,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| TrainreelError::render(format!("png encode failed: {e}")))?;
    Ok(out)
}

/// Encode a frame as a `data:image/png;base64,...` URI.
pub fn png_data_uri(frame: &FrameRGBA) -> TrainreelResult<String> {
    let png = encode_png(frame)?;
    let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + png.len() * 4 / 3 + 4);
    uri.push_str(PNG_DATA_URI_PREFIX);
    STANDARD.encode_string(&png, &mut uri);
    Ok(uri)
}

/// Decode the PNG payload of a URI produced by [`png_data_uri`].
pub fn decode_png_data_uri(uri: &str) -> TrainreelResult<Vec<u8>> {
    let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX).ok_or_else(|| {
        TrainreelError::validation("not a base64 PNG data URI")
    })?;
    STANDARD
        .decode(payload)
        .map_err(|e| TrainreelError::validation(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/thumbnail.rs"]
mod tests;
