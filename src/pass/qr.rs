//! QR rendering for pass verification links.
//!
//! The payload is always the verification URL carrying the token, never the
//! registrant fields. Output is a square PNG with a quiet zone of `margin`
//! modules, scaled up to at least `width` pixels.

use base64ct::{Base64, Encoding};
use image::{ImageFormat, Rgb, RgbImage};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;
use url::Url;

use super::error::{ConfigError, QrError};

pub const MIN_WIDTH: u32 = 300;
pub const MIN_MARGIN: u32 = 2;
pub const MAX_WIDTH: u32 = 2048;
pub const MAX_MARGIN: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    width: u32,
    margin: u32,
    dark: [u8; 3],
    light: [u8; 3],
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            width: 400,
            margin: MIN_MARGIN,
            dark: [0x00, 0x00, 0x00],
            light: [0xff, 0xff, 0xff],
        }
    }
}

impl QrOptions {
    /// # Errors
    /// Rejects widths outside `MIN_WIDTH..=MAX_WIDTH`, margins outside
    /// `MIN_MARGIN..=MAX_MARGIN` and colors that are not `#rrggbb`.
    pub fn new(width: u32, margin: u32, dark: &str, light: &str) -> Result<Self, ConfigError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            return Err(ConfigError::QrWidth {
                min: MIN_WIDTH,
                max: MAX_WIDTH,
                got: width,
            });
        }
        if !(MIN_MARGIN..=MAX_MARGIN).contains(&margin) {
            return Err(ConfigError::QrMargin {
                min: MIN_MARGIN,
                max: MAX_MARGIN,
                got: margin,
            });
        }
        Ok(Self {
            width,
            margin,
            dark: parse_hex_color(dark)?,
            light: parse_hex_color(light)?,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn margin(&self) -> u32 {
        self.margin
    }
}

/// Parses `#rrggbb` (the leading `#` is optional).
///
/// # Errors
/// Returns `ConfigError::Color` for anything else.
pub fn parse_hex_color(value: &str) -> Result<[u8; 3], ConfigError> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::Color(value.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ConfigError::Color(value.to_string()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Rendered QR image.
#[derive(Debug, Clone)]
pub struct QrImage {
    png: Vec<u8>,
    size: u32,
}

impl QrImage {
    #[must_use]
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    #[must_use]
    pub fn into_png(self) -> Vec<u8> {
        self.png
    }

    /// Side length in pixels.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// `data:image/png;base64,...` for embedding in a page.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", Base64::encode_string(&self.png))
    }
}

/// Builds `<public_url>/verify?token=<token>`, percent-encoding the token.
#[must_use]
pub fn verification_url(public_url: &Url, token: &str) -> Url {
    let mut url = public_url.clone();
    let path = format!("{}/verify", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_fragment(None);
    url.query_pairs_mut().clear().append_pair("token", token);
    url
}

/// Encodes `payload` as a PNG QR code.
///
/// # Errors
/// Returns `QrError::Encode` when the payload exceeds QR capacity and
/// `QrError::Image` if PNG encoding fails.
pub fn encode(payload: &str, options: &QrOptions) -> Result<QrImage, QrError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)?;
    let modules = u32::try_from(code.width()).unwrap_or(u32::MAX);
    let colors = code.to_colors();

    let total = modules.saturating_add(options.margin.saturating_mul(2));
    let scale = (options.width / total).max(1);
    let size = options.width.max(total.saturating_mul(scale));
    let offset = (size - total * scale) / 2;

    let dark = Rgb(options.dark);
    let light = Rgb(options.light);

    let image = RgbImage::from_fn(size, size, |x, y| {
        let module = |p: u32| {
            p.checked_sub(offset)
                .map(|p| p / scale)
                .and_then(|m| m.checked_sub(options.margin))
                .filter(|&m| m < modules)
        };
        match (module(x), module(y)) {
            (Some(mx), Some(my)) => {
                let index = (my * modules + mx) as usize;
                if colors.get(index) == Some(&Color::Dark) {
                    dark
                } else {
                    light
                }
            }
            _ => light,
        }
    });

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(QrImage { png, size })
}
