//! Image → network input tensor conversion.
//!
//! Images are resized to a square input, converted to RGB, and laid out
//! NCHW (`[3, size, size]` per image) as `f32`.

use image::DynamicImage;
use image::imageops::FilterType;
use pokedex_core::Normalization;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Number of `f32` values one preprocessed image occupies.
pub fn tensor_len(size: u32) -> usize {
    3 * size as usize * size as usize
}

/// Resize and normalize one image into a `[3, size, size]` channel-major buffer.
pub fn preprocess(image: &DynamicImage, size: u32, normalization: Normalization) -> Vec<f32> {
    let mut out = vec![0.0f32; tensor_len(size)];
    write_chw(image, size, normalization, &mut out);
    out
}

/// Preprocess a batch into one contiguous `[n, 3, size, size]` buffer.
pub fn preprocess_batch(
    images: &[DynamicImage],
    size: u32,
    normalization: Normalization,
) -> Vec<f32> {
    let per_image = tensor_len(size);
    let mut out = vec![0.0f32; images.len() * per_image];
    for (image, chunk) in images.iter().zip(out.chunks_exact_mut(per_image)) {
        write_chw(image, size, normalization, chunk);
    }
    out
}

fn write_chw(image: &DynamicImage, size: u32, normalization: Normalization, out: &mut [f32]) {
    let rgb = image.resize_exact(size, size, FilterType::Triangle).to_rgb8();
    let plane = size as usize * size as usize;

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let offset = y as usize * size as usize + x as usize;
        for (c, &value) in pixel.0.iter().enumerate() {
            out[c * plane + offset] = scale(value, c, normalization);
        }
    }
}

fn scale(value: u8, channel: usize, normalization: Normalization) -> f32 {
    let v = value as f32;
    match normalization {
        Normalization::Symmetric => v / 127.5 - 1.0,
        Normalization::ImageNet => (v / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    #[test]
    fn symmetric_maps_to_unit_range() {
        let tensor = preprocess(&solid(5, 3, [255, 0, 128]), 2, Normalization::Symmetric);
        assert_eq!(tensor.len(), 12);

        // Channel-major: 4 reds, then 4 greens, then 4 blues.
        for &v in &tensor[0..4] {
            assert!((v - 1.0).abs() < 0.01, "red {v}");
        }
        for &v in &tensor[4..8] {
            assert!((v + 1.0).abs() < 0.01, "green {v}");
        }
        for &v in &tensor[8..12] {
            assert!(v.abs() < 0.01, "blue {v}");
        }
    }

    #[test]
    fn imagenet_centres_channels() {
        let mean_pixel = [
            (IMAGENET_MEAN[0] * 255.0).round() as u8,
            (IMAGENET_MEAN[1] * 255.0).round() as u8,
            (IMAGENET_MEAN[2] * 255.0).round() as u8,
        ];
        let tensor = preprocess(&solid(4, 4, mean_pixel), 4, Normalization::ImageNet);
        for &v in &tensor {
            assert!(v.abs() < 0.02, "expected ~0, got {v}");
        }
    }

    #[test]
    fn batch_is_contiguous() {
        let images = [solid(3, 3, [255, 255, 255]), solid(3, 3, [0, 0, 0])];
        let tensor = preprocess_batch(&images, 3, Normalization::Symmetric);
        assert_eq!(tensor.len(), 2 * tensor_len(3));
        assert!(tensor[..27].iter().all(|v| (v - 1.0).abs() < 0.01));
        assert!(tensor[27..].iter().all(|v| (v + 1.0).abs() < 0.01));
    }

    #[test]
    fn grayscale_input_becomes_three_channels() {
        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(2, 2, image::Luma([255])));
        let tensor = preprocess(&gray, 2, Normalization::Symmetric);
        assert_eq!(tensor.len(), 12);
        assert!(tensor.iter().all(|v| (v - 1.0).abs() < 0.01));
    }
}
