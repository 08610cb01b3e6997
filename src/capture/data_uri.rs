//! `data:` URI codec for images

use std::io::Cursor;

use anyhow::{Context, bail};
use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, RgbaImage};

const PNG_PREFIX: &str = "data:image/png;base64,";

/// Whether `s` looks like a data URI rather than a path
pub fn is_data_uri(s: &str) -> bool {
    s.trim_start().starts_with("data:")
}

/// Decode the payload of a base64 `data:` URI into raw bytes
pub fn decode(uri: &str) -> anyhow::Result<Vec<u8>> {
    let Some(rest) = uri.trim().strip_prefix("data:") else {
        bail!("not a data URI");
    };
    let Some((meta, payload)) = rest.split_once(',') else {
        bail!("data URI has no payload separator");
    };
    if !meta.ends_with(";base64") {
        bail!("only base64 data URIs are supported (got {meta:?})");
    }
    general_purpose::STANDARD
        .decode(payload.trim())
        .context("decoding base64 payload")
}

/// Decode an image carried by a data URI
pub fn decode_image(uri: &str) -> anyhow::Result<RgbaImage> {
    let bytes = decode(uri)?;
    let img = image::load_from_memory(&bytes).context("decoding image from data URI")?;
    Ok(img.to_rgba8())
}

/// PNG-encode an image as a `data:image/png;base64,` URI
pub fn encode_png(img: &RgbaImage) -> anyhow::Result<String> {
    let mut bytes: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("encoding PNG")?;
    Ok(format!(
        "{PNG_PREFIX}{}",
        general_purpose::STANDARD.encode(&bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_uri_round_trip() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let uri = encode_png(&img).unwrap();
        assert!(uri.starts_with(PNG_PREFIX));
        assert!(is_data_uri(&uri));
        assert_eq!(decode_image(&uri).unwrap(), img);
    }

    #[test]
    fn test_rejects_non_base64_uri() {
        assert!(decode("data:text/plain,hello").is_err());
        assert!(decode("/tmp/x.png").is_err());
        assert!(decode("data:image/png;base64").is_err());
    }
}
