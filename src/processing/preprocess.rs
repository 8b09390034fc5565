use std::io::Cursor;

use image::{imageops, DynamicImage, ImageFormat, RgbaImage};
use log::debug;

use crate::utils::PassportError;

/// Images with both edges under this are upscaled until the smaller edge
/// reaches it; recognition accuracy drops off sharply below ~300 DPI.
pub const MIN_DIMENSION: u32 = 1280;
/// Images with either edge over this are downscaled until the larger edge
/// fits; beyond it recognition gains nothing and slows down.
pub const MAX_DIMENSION: u32 = 2560;
/// Contrast stretch applied around the mid-gray point.
pub const CONTRAST_FACTOR: f32 = 1.5;

/// Toggles for the two optional filter stages. Both default on.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub denoise: bool,
    pub sharpen: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        PreprocessConfig {
            denoise: true,
            sharpen: true,
        }
    }
}

/// RasterPreprocessor conditions an input photo into a recognition-optimized
/// raster. The stage order is fixed: resize, grayscale, contrast, denoise,
/// sharpen. Every stage is deterministic and allocates at most one output
/// buffer; denoise and sharpen each read a snapshot of the prior stage and
/// never feed partial results back into themselves.
pub struct RasterPreprocessor;

impl RasterPreprocessor {
    /// Decode raw image bytes, run the full stage order and re-encode the
    /// result losslessly (PNG) for the external recognizer.
    pub fn process_bytes(
        image_bytes: &[u8],
        config: &PreprocessConfig,
    ) -> Result<Vec<u8>, PassportError> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| PassportError::ImageProcessing(format!("Failed to load image: {}", e)))?;

        let processed = Self::process(image.to_rgba8(), config);

        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        DynamicImage::ImageRgba8(processed)
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| {
                PassportError::ImageProcessing(format!("Failed to encode processed image: {}", e))
            })?;

        Ok(buffer)
    }

    pub fn process(image: RgbaImage, config: &PreprocessConfig) -> RgbaImage {
        let (width, height) = image.dimensions();
        let mut image = Self::resize_to_bounds(image);
        debug!(
            "Preprocessing raster: {}x{} -> {}x{}",
            width,
            height,
            image.width(),
            image.height()
        );

        Self::to_grayscale(&mut image);
        Self::adjust_contrast(&mut image, CONTRAST_FACTOR);

        if config.denoise {
            image = Self::denoise(&image);
        }
        if config.sharpen {
            image = Self::sharpen(&image);
        }

        image
    }

    /// Uniform scaling into the [MIN_DIMENSION, MAX_DIMENSION] band. Both
    /// output dimensions are rounded independently, so a one-pixel aspect
    /// drift is possible and accepted.
    fn resize_to_bounds(image: RgbaImage) -> RgbaImage {
        let (width, height) = image.dimensions();

        let scale = if width < MIN_DIMENSION && height < MIN_DIMENSION {
            MIN_DIMENSION as f32 / width.min(height) as f32
        } else if width > MAX_DIMENSION || height > MAX_DIMENSION {
            MAX_DIMENSION as f32 / width.max(height) as f32
        } else {
            return image;
        };

        let new_width = (width as f32 * scale).round() as u32;
        let new_height = (height as f32 * scale).round() as u32;
        imageops::resize(&image, new_width, new_height, imageops::FilterType::Triangle)
    }

    /// ITU-R BT.601 luma written to all three color channels; alpha untouched.
    fn to_grayscale(image: &mut RgbaImage) {
        for pixel in image.pixels_mut() {
            let [r, g, b, _] = pixel.0;
            let luma =
                (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8;
            pixel.0[0] = luma;
            pixel.0[1] = luma;
            pixel.0[2] = luma;
        }
    }

    fn adjust_contrast(image: &mut RgbaImage, factor: f32) {
        for pixel in image.pixels_mut() {
            for channel in pixel.0.iter_mut().take(3) {
                let adjusted = (*channel as f32 - 128.0) * factor + 128.0;
                *channel = adjusted.clamp(0.0, 255.0).round() as u8;
            }
        }
    }

    /// 3x3 unweighted mean over the pre-filter snapshot. The outermost ring
    /// of pixels is left unmodified. The input is grayscale by this stage,
    /// so one channel stands for all three.
    fn denoise(image: &RgbaImage) -> RgbaImage {
        let (width, height) = image.dimensions();
        let mut output = image.clone();
        if width < 3 || height < 3 {
            return output;
        }

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let mut sum = 0u32;
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let neighbor =
                            image.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32);
                        sum += neighbor.0[0] as u32;
                    }
                }
                let mean = (sum as f32 / 9.0).round() as u8;
                let pixel = output.get_pixel_mut(x, y);
                pixel.0[0] = mean;
                pixel.0[1] = mean;
                pixel.0[2] = mean;
            }
        }

        output
    }

    /// 3x3 sharpen convolution over the denoised snapshot, clamped to
    /// [0, 255]. Border pixels unmodified.
    fn sharpen(image: &RgbaImage) -> RgbaImage {
        const KERNEL: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];

        let (width, height) = image.dimensions();
        let mut output = image.clone();
        if width < 3 || height < 3 {
            return output;
        }

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let mut sum = 0i32;
                for ky in -1i32..=1 {
                    for kx in -1i32..=1 {
                        let neighbor =
                            image.get_pixel((x as i32 + kx) as u32, (y as i32 + ky) as u32);
                        let weight = KERNEL[((ky + 1) * 3 + (kx + 1)) as usize];
                        sum += neighbor.0[0] as i32 * weight;
                    }
                }
                let value = sum.clamp(0, 255) as u8;
                let pixel = output.get_pixel_mut(x, y);
                pixel.0[0] = value;
                pixel.0[1] = value;
                pixel.0[2] = value;
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255]))
    }

    #[test]
    fn test_resize_passes_through_within_bounds() {
        let image = solid(1500, 1600, 128);
        let resized = RasterPreprocessor::resize_to_bounds(image);
        assert_eq!(resized.dimensions(), (1500, 1600));
    }

    #[test]
    fn test_resize_upscales_small_images() {
        let image = solid(640, 480, 128);
        let resized = RasterPreprocessor::resize_to_bounds(image);
        // scale = 1280 / 480, each dimension rounded independently
        assert_eq!(resized.dimensions(), (1707, 1280));
    }

    #[test]
    fn test_resize_downscales_large_images() {
        let image = solid(4000, 3000, 128);
        let resized = RasterPreprocessor::resize_to_bounds(image);
        assert_eq!(resized.dimensions(), (2560, 1920));
    }

    #[test]
    fn test_grayscale_uses_bt601_weights() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([100, 150, 200, 255]));
        RasterPreprocessor::to_grayscale(&mut image);
        // 0.299*100 + 0.587*150 + 0.114*200 = 140.75 -> 141
        assert_eq!(image.get_pixel(0, 0).0, [141, 141, 141, 255]);
    }

    #[test]
    fn test_grayscale_is_idempotent() {
        let mut image = RgbaImage::from_fn(8, 8, |x, y| {
            Rgba([(x * 30) as u8, (y * 25) as u8, ((x + y) * 10) as u8, 255])
        });
        RasterPreprocessor::to_grayscale(&mut image);
        let once = image.clone();
        RasterPreprocessor::to_grayscale(&mut image);
        assert_eq!(image, once);
    }

    #[test]
    fn test_contrast_stretches_around_midpoint() {
        let mut image = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([0, 0, 0, 255]),
            1 => Rgba([128, 128, 128, 255]),
            _ => Rgba([200, 200, 200, 255]),
        });
        RasterPreprocessor::adjust_contrast(&mut image, 1.5);
        assert_eq!(image.get_pixel(0, 0).0[0], 0); // clamped low
        assert_eq!(image.get_pixel(1, 0).0[0], 128); // midpoint fixed
        assert_eq!(image.get_pixel(2, 0).0[0], 236); // (200-128)*1.5+128
    }

    #[test]
    fn test_denoise_averages_interior_and_keeps_borders() {
        let mut image = solid(3, 3, 90);
        image.put_pixel(1, 1, Rgba([180, 180, 180, 255]));
        let denoised = RasterPreprocessor::denoise(&image);
        // interior mean: (8*90 + 180) / 9 = 100
        assert_eq!(denoised.get_pixel(1, 1).0[0], 100);
        // border ring untouched
        assert_eq!(denoised.get_pixel(0, 0).0[0], 90);
        assert_eq!(denoised.get_pixel(2, 2).0[0], 90);
    }

    #[test]
    fn test_sharpen_keeps_uniform_images_unchanged() {
        let image = solid(5, 5, 77);
        let sharpened = RasterPreprocessor::sharpen(&image);
        assert_eq!(sharpened, image);
    }

    #[test]
    fn test_sharpen_leaves_borders_unmodified() {
        let mut image = solid(3, 3, 100);
        image.put_pixel(1, 1, Rgba([200, 200, 200, 255]));
        let sharpened = RasterPreprocessor::sharpen(&image);
        assert_eq!(sharpened.get_pixel(0, 1).0[0], 100);
        // center: 5*200 - 4*100 = 600 -> clamped to 255
        assert_eq!(sharpened.get_pixel(1, 1).0[0], 255);
    }

    #[test]
    fn test_process_bytes_rejects_corrupt_input() {
        let result = RasterPreprocessor::process_bytes(&[0u8; 16], &PreprocessConfig::default());
        assert!(matches!(result, Err(PassportError::ImageProcessing(_))));
    }
}
