//! Turning images and figures into PNG uploads.

use crate::error::{Error, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder as _, RgbaImage};

/// First eight bytes of every PNG stream.
pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Longest filename stem kept before the extension is appended.
pub const MAX_FILENAME_LEN: usize = 160;

pub const DEFAULT_FILENAME: &str = "image.png";

const PNG_EXTENSION: &str = ".png";

/// Something that can draw itself once into a raster.
///
/// Rendering consumes the figure; whatever it holds is released afterwards.
pub trait Figure: Send {
    fn render(self: Box<Self>) -> Result<RgbaImage>;
}

/// Anything `post_image` accepts.
pub enum ImageSource {
    /// Already-encoded PNG bytes, uploaded as-is.
    Png(Vec<u8>),
    Image(DynamicImage),
    Figure(Box<dyn Figure>),
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png(bytes) => f.debug_tuple("Png").field(&bytes.len()).finish(),
            Self::Image(img) => f
                .debug_tuple("Image")
                .field(&(img.width(), img.height()))
                .finish(),
            Self::Figure(_) => f.write_str("Figure"),
        }
    }
}

impl ImageSource {
    pub fn figure(figure: impl Figure + 'static) -> Self {
        Self::Figure(Box::new(figure))
    }

    /// Encode to PNG bytes, consuming the source.
    pub fn into_png(self) -> Result<Vec<u8>> {
        match self {
            Self::Png(bytes) if bytes.is_empty() => {
                Err(Error::Encoding("empty image payload".to_string()))
            }
            Self::Png(bytes) => Ok(bytes),
            Self::Image(img) => encode_png(&img),
            Self::Figure(figure) => {
                let raster = figure.render()?;
                encode_png(&DynamicImage::ImageRgba8(raster))
            }
        }
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Png(bytes)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(img: DynamicImage) -> Self {
        Self::Image(img)
    }
}

impl From<RgbaImage> for ImageSource {
    fn from(img: RgbaImage) -> Self {
        Self::Image(DynamicImage::ImageRgba8(img))
    }
}

/// A PNG ready to hand to Slack.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl ImageUpload {
    pub fn new(source: ImageSource, filename: Option<&str>) -> Result<Self> {
        Ok(Self {
            bytes: source.into_png()?,
            filename: sanitize_filename(filename),
        })
    }
}

/// Truncate to [`MAX_FILENAME_LEN`] characters, then make sure the name ends in `.png`.
pub fn sanitize_filename(filename: Option<&str>) -> String {
    let Some(name) = filename else {
        return DEFAULT_FILENAME.to_string();
    };

    let mut name: String = name.chars().take(MAX_FILENAME_LEN).collect();
    if !name.ends_with(PNG_EXTENSION) {
        name.push_str(PNG_EXTENSION);
    }
    name
}

pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_MAGIC)
}

/// Encode an image as PNG, keeping the alpha channel only when present.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Default, FilterType::Adaptive);

    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        encoder.write_image(rgba.as_raw(), w, h, image::ExtendedColorType::Rgba8)?;
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        encoder.write_image(rgb.as_raw(), w, h, image::ExtendedColorType::Rgb8)?;
    }

    Ok(buf)
}
