//! Image primitives and utilities.
//!
//! The project uses a lightweight owned RGB image type (`OwnedImage`) for
//! screen captures and borrows views (`Image<'a>`) into it when cropping the
//! HP/mana regions, so a capture is never copied more than once per read.

use anyhow::{Context, Result};

/// Owned RGB image (no alpha).
#[derive(Clone, Debug)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    /// Build an `OwnedImage` from RGBA bytes (alpha is discarded).
    ///
    /// The buffer is expected to be tightly packed: `width * height * 4` bytes.
    pub fn from_rgba(width: usize, bytes: &[u8]) -> Self {
        let height = bytes.len() / width.max(1) / 4;
        let data = bytes
            .chunks_exact(4)
            .take(width * height)
            .map(|v| Color::new(v[0], v[1], v[2]))
            .collect::<Vec<_>>();

        Self {
            width: width as u32,
            height: height as u32,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize this image to the given height (preserving aspect ratio).
    ///
    /// Uses `fast_image_resize` (SIMD-optimized) and keeps output in `Vec<Color>`.
    pub fn resize_h(&mut self, height: u32) {
        if self.height == height || self.width == 0 || self.height == 0 {
            return;
        }

        let height = height.max(1);
        let width = ((self.width as u64 * height as u64 / self.height as u64) as u32).max(1);

        // SAFETY: `Color` is `#[repr(C)]` with 3 x `u8`, so it is layout-compatible
        // with `fast_image_resize::pixels::U8x3` (alignment 1).
        let src_pixels = unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const fast_image_resize::pixels::U8x3,
                self.data.len(),
            )
        };

        let src = match fast_image_resize::images::ImageRef::from_pixels(self.width, self.height, src_pixels) {
            Ok(src) => src,
            Err(err) => {
                tracing::warn!(error = %err, "resize source rejected");
                return;
            }
        };

        let mut dst = fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Interpolation(fast_image_resize::FilterType::CatmullRom),
        );

        if let Err(err) = resizer.resize(&src, &mut dst, &Some(options)) {
            tracing::warn!(error = %err, "resize failed");
            return;
        }

        let bytes: Vec<u8> = dst.into_vec();
        self.data = bytes
            .chunks_exact(3)
            .map(|px| Color::new(px[0], px[1], px[2]))
            .collect();
        self.width = width;
        self.height = height;
    }

    #[inline]
    pub fn resized_h(mut self, height: u32) -> Self {
        self.resize_h(height);
        self
    }

    /// Create a borrowed view of this entire image.
    pub fn as_image(&self) -> Image<'_> {
        Image {
            x1: 0,
            y1: 0,
            x2: self.width,
            y2: self.height,
            true_width: self.width,
            data: &self.data,
        }
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.data[(x + y * self.width) as usize].luma()])
        })
    }

    /// Create an RGB `OwnedImage` from a grayscale image (each pixel repeated into RGB).
    pub fn from_gray_as_rgb(gray: &image::GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let data = gray
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[0], p.0[0]))
            .collect();
        Self {
            width: w,
            height: h,
            data,
        }
    }
}

// ----------

/// Borrowed image view into an `OwnedImage`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    true_width: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> &Color {
        &self.data[(x + y * self.true_width) as usize]
    }

    pub fn to_owned_image(self) -> OwnedImage {
        let mut data = Vec::with_capacity((self.width() * self.height()) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                data.push(*self.pixel(x, y));
            }
        }

        OwnedImage {
            width: self.width(),
            height: self.height(),
            data,
        }
    }

    pub fn get_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width() * self.height() * 3) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                let clr = self.pixel(x, y);
                bytes.extend_from_slice(&[clr.r, clr.g, clr.b]);
            }
        }
        bytes
    }

    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let img = image::RgbImage::from_raw(self.width(), self.height(), self.get_bytes())
            .context("RgbImage::from_raw failed")?;
        img.save_with_format(path, image::ImageFormat::Png)
            .context("save png")?;
        Ok(())
    }

    /// Create an arbitrary subimage (relative coordinates), clamped to this view.
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            x1: self.x1 + x,
            y1: self.y1 + y,
            x2: self.x1 + x + width,
            y2: self.y1 + y + height,
            true_width: self.true_width,
            data: self.data,
        }
    }

    /// Extract a number using OCR.
    ///
    /// Game numbers are bright glyphs on a dark bar. The crop is upscaled, then
    /// binarised two ways (fixed bright threshold and Otsu) with a light
    /// border, and the most digit-like OCR result wins.
    pub(crate) fn get_number_text(&self, ocr: &crate::ocr::Ocr) -> String {
        use imageproc::contrast::{otsu_level, threshold, ThresholdType};

        if self.is_empty() {
            return String::new();
        }

        let base = self.to_owned_image();
        let upscaled = base.clone().resized_h(base.height * UPSCALE);
        let gray = upscaled.to_gray_image();

        let fixed = threshold(&gray, BRIGHT_LEVEL, ThresholdType::Binary);
        let otsu = threshold(&gray, otsu_level(&gray), ThresholdType::Binary);

        let mut best = String::new();
        let mut best_score = i64::MIN;

        for bin in [fixed, otsu] {
            let cand = OwnedImage::from_gray_as_rgb(&pad(ensure_dark_text_on_light(bin), PADDING));
            let text = ocr.get_text(cand.as_image());
            let score = score_number_text(&text);
            if score > best_score {
                best_score = score;
                best = text;
            }
        }

        // Optional debug snapshots.
        if std::env::var("WINDIFY_WRITE_IMAGE").as_deref() == Ok("1") {
            let name = best.chars().filter(|c| c.is_ascii_digit()).take(12).collect::<String>();
            if let Err(err) = self.save_png(format!("./debug_ocr_{name}.png")) {
                tracing::debug!(error = %err, "debug snapshot not written");
            }
        }

        best
    }
}

const UPSCALE: u32 = 4;
const BRIGHT_LEVEL: u8 = 150;
const PADDING: u32 = 15;

fn ensure_dark_text_on_light(mut bin: image::GrayImage) -> image::GrayImage {
    // If the image is mostly black, invert it so background becomes light.
    let white = bin.pixels().filter(|p| p.0[0] > 0).count();
    let black = bin.pixels().len() - white;
    if black > white {
        for p in bin.pixels_mut() {
            p.0[0] = 255u8.saturating_sub(p.0[0]);
        }
    }
    bin
}

/// Surround `img` with a white border of `by` pixels.
fn pad(img: image::GrayImage, by: u32) -> image::GrayImage {
    let (w, h) = img.dimensions();
    let mut out = image::GrayImage::from_pixel(w + by * 2, h + by * 2, image::Luma([255]));
    image::imageops::replace(&mut out, &img, by as i64, by as i64);
    out
}

fn score_number_text(text: &str) -> i64 {
    // Digits are what we want; anything else is noise.
    text.chars()
        .map(|ch| match ch {
            '0'..='9' => 3,
            '/' => 1,
            c if c.is_whitespace() => 0,
            _ => -2,
        })
        .sum()
}

// ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Compute luma (grayscale intensity).
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }
}
