//! Photo normalization for embedding in the submission document.
//!
//! Each step is an independent function; `NormalizationPipeline` chains them:
//!
//! 1. Validate bytes (size bounds)
//! 2. Decode image
//! 3. Apply EXIF orientation (phone photos store rotation as metadata)
//! 4. Flatten onto the background colour as RGB
//! 5. Pad to the target aspect ratio (never crops)
//! 6. Bound the longest edge
//! 7. Encode JPEG
//!
//! Every step returns a new image; inputs are consumed, never edited in place.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat, Rgb, RgbImage};
use tracing::debug;

use super::NormalizeError;
use crate::config::{ASPECT_EPSILON, JPEG_QUALITY, MAX_EMBED_PX, TARGET_ASPECT_RATIO};

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

/// Canvas colour used for padding and for flattening transparency.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

// ═══════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeQuality {
    /// CatmullRom: sharp, no ringing.
    High,
    /// Triangle (bilinear), fast.
    Fast,
}

impl ResizeQuality {
    fn filter(&self) -> FilterType {
        match self {
            Self::High => FilterType::CatmullRom,
            Self::Fast => FilterType::Triangle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Width / height of every normalized photo.
    pub target_ratio: f64,
    /// Longest edge after bounding.
    pub max_px: u32,
    /// JPEG quality (1-100) for the embedded copy.
    pub jpeg_quality: u8,
    pub background: Rgb<u8>,
    pub resize_quality: ResizeQuality,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            target_ratio: TARGET_ASPECT_RATIO,
            max_px: MAX_EMBED_PX,
            jpeg_quality: JPEG_QUALITY,
            background: WHITE,
            resize_quality: ResizeQuality::High,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Service traits
// ═══════════════════════════════════════════════════════════

/// Fixes image orientation from metadata stored alongside the pixels.
///
/// Phone photos embed rotation in EXIF tag 0x0112. The submission is a
/// compliance record, so a sideways photo is wrong output, not cosmetics.
pub trait OrientationCorrector: Send + Sync {
    /// `raw_bytes`: original file bytes (needed for EXIF reading).
    /// `image`: decoded image (rotation applied here).
    fn correct(&self, raw_bytes: &[u8], image: DynamicImage) -> DynamicImage;
}

/// Turns one uploaded photo into a `NormalizedPhoto`.
///
/// Pure bytes-to-image transform with no I/O.
pub trait PhotoNormalizer: Send + Sync {
    fn normalize(&self, raw_bytes: &[u8]) -> Result<NormalizedPhoto, NormalizeError>;
}

// ═══════════════════════════════════════════════════════════
// Result types
// ═══════════════════════════════════════════════════════════

/// Upright, target-ratio, bounded photo plus its embeddable JPEG encoding.
#[derive(Debug, Clone)]
pub struct NormalizedPhoto {
    pub image: RgbImage,
    /// JPEG bytes of `image`, embedded verbatim in the PDF.
    pub jpeg: Vec<u8>,
    /// Dimensions as decoded, before orientation and padding.
    pub original_width: u32,
    pub original_height: u32,
}

impl NormalizedPhoto {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

// ═══════════════════════════════════════════════════════════
// NormalizationPipeline
// ═══════════════════════════════════════════════════════════

pub struct NormalizationPipeline {
    orientation: Box<dyn OrientationCorrector>,
    config: NormalizeConfig,
}

impl NormalizationPipeline {
    pub fn new(orientation: Box<dyn OrientationCorrector>, config: NormalizeConfig) -> Self {
        Self {
            orientation,
            config,
        }
    }

    /// Production pipeline: EXIF orientation, 4:3, 1400 px, JPEG q85.
    pub fn standard() -> Self {
        Self::new(Box::new(ExifOrientationCorrector), NormalizeConfig::default())
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }
}

impl Default for NormalizationPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl PhotoNormalizer for NormalizationPipeline {
    fn normalize(&self, raw_bytes: &[u8]) -> Result<NormalizedPhoto, NormalizeError> {
        validate_image_bytes(raw_bytes)?;

        let img = image::load_from_memory(raw_bytes)
            .map_err(|e| NormalizeError::Decode(e.to_string()))?;
        let (orig_w, orig_h) = img.dimensions();

        let img = self.orientation.correct(raw_bytes, img);
        let rgb = flatten_to_rgb(&img, self.config.background);
        let padded = pad_to_ratio(rgb, self.config.target_ratio, self.config.background);
        let bounded = bound_resolution(padded, self.config.max_px, self.config.resize_quality);
        let jpeg = encode_jpeg(&bounded, self.config.jpeg_quality)?;

        debug!(
            original = format!("{orig_w}x{orig_h}"),
            output = format!("{}x{}", bounded.width(), bounded.height()),
            jpeg_size = jpeg.len(),
            "Photo normalized"
        );

        Ok(NormalizedPhoto {
            image: bounded,
            jpeg,
            original_width: orig_w,
            original_height: orig_h,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Orientation
// ═══════════════════════════════════════════════════════════

/// EXIF-based orientation correction for phone photos.
///
/// EXIF orientation values:
/// 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
pub struct ExifOrientationCorrector;

impl OrientationCorrector for ExifOrientationCorrector {
    fn correct(&self, raw_bytes: &[u8], image: DynamicImage) -> DynamicImage {
        normalize_orientation(raw_bytes, image)
    }
}

/// For already-upright sources (e.g. rendered images without EXIF).
pub struct NoOpOrientationCorrector;

impl OrientationCorrector for NoOpOrientationCorrector {
    fn correct(&self, _raw_bytes: &[u8], image: DynamicImage) -> DynamicImage {
        image
    }
}

/// Apply the EXIF orientation stored in `raw_bytes` to `image`.
/// No-op when the file carries no orientation tag.
pub fn normalize_orientation(raw_bytes: &[u8], image: DynamicImage) -> DynamicImage {
    let orientation = read_exif_orientation(raw_bytes);
    if orientation != 1 {
        debug!(orientation, "Applying EXIF orientation");
    }
    apply_orientation(image, orientation)
}

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply EXIF orientation transform to a `DynamicImage`.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        1 => img,
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

// ═══════════════════════════════════════════════════════════
// Geometry
// ═══════════════════════════════════════════════════════════

/// Convert to RGB, compositing any transparency over `background`.
pub fn flatten_to_rgb(img: &DynamicImage, background: Rgb<u8>) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let blend = |c: u8, bg: u8| (c as f32 * alpha + bg as f32 * (1.0 - alpha)).round() as u8;
        rgb.put_pixel(
            x,
            y,
            Rgb([
                blend(r, background[0]),
                blend(g, background[1]),
                blend(b, background[2]),
            ]),
        );
    }
    rgb
}

/// Canvas size that brings `width x height` to `target_ratio` by growing
/// the deficient side. Returns the input size when already on ratio.
pub fn padded_dimensions(width: u32, height: u32, target_ratio: f64) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let current = width as f64 / height as f64;
    if (current - target_ratio).abs() < ASPECT_EPSILON {
        return (width, height);
    }

    if current > target_ratio {
        // Relatively wide: grow height.
        let new_h = (width as f64 / target_ratio).round() as u32;
        (width, new_h.max(height))
    } else {
        let new_w = (height as f64 * target_ratio).round() as u32;
        (new_w.max(width), height)
    }
}

/// Pad `image` onto a `background` canvas of `target_ratio`, centred.
///
/// No source pixel is discarded; both output dimensions are >= the input's.
pub fn pad_to_ratio(image: RgbImage, target_ratio: f64, background: Rgb<u8>) -> RgbImage {
    let (w, h) = image.dimensions();
    let (new_w, new_h) = padded_dimensions(w, h, target_ratio);
    if (new_w, new_h) == (w, h) {
        return image;
    }

    let mut canvas = RgbImage::from_pixel(new_w, new_h, background);
    let offset_x = (new_w - w) / 2;
    let offset_y = (new_h - h) / 2;
    image::imageops::overlay(&mut canvas, &image, offset_x, offset_y);

    debug!(
        from = format!("{w}x{h}"),
        to = format!("{new_w}x{new_h}"),
        "Padded to target ratio"
    );
    canvas
}

/// Size after scaling so the longest edge is at most `max_px`.
/// The shorter edge is rounded; small images are not upscaled.
pub fn bounded_dimensions(width: u32, height: u32, max_px: u32) -> (u32, u32) {
    let largest = width.max(height);
    if largest <= max_px || largest == 0 {
        return (width, height);
    }

    let scale = max_px as f64 / largest as f64;
    if width >= height {
        let new_h = ((height as f64 * scale).round() as u32).max(1);
        (max_px, new_h)
    } else {
        let new_w = ((width as f64 * scale).round() as u32).max(1);
        (new_w, max_px)
    }
}

/// Downscale so the longest edge equals `max_px`, preserving aspect ratio.
pub fn bound_resolution(image: RgbImage, max_px: u32, quality: ResizeQuality) -> RgbImage {
    let (w, h) = image.dimensions();
    let (new_w, new_h) = bounded_dimensions(w, h, max_px);
    if (new_w, new_h) == (w, h) {
        return image;
    }

    debug!(
        from = format!("{w}x{h}"),
        to = format!("{new_w}x{new_h}"),
        "Downscaling oversized photo"
    );
    image::imageops::resize(&image, new_w, new_h, quality.filter())
}

// ═══════════════════════════════════════════════════════════
// Pure helper functions
// ═══════════════════════════════════════════════════════════

/// Validate image bytes before decoding.
/// Rejects clearly invalid input before decoding.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), NormalizeError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(NormalizeError::Decode(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(NormalizeError::Decode(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Encode an RGB image as baseline JPEG bytes.
/// Same pixels and quality always give the same bytes.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, NormalizeError> {
    let dynamic = DynamicImage::ImageRgb8(img.clone());
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Jpeg(quality))
        .map_err(|e| NormalizeError::Encode(e.to_string()))?;
    Ok(cursor.into_inner())
}
