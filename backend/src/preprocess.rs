use image::{ImageReader, RgbImage};
use std::path::Path;

use crate::classifier::InputTensor;
use crate::config::ImageConfig;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        DecodeError(err.to_string())
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError(err.to_string())
    }
}

/// Opens the persisted upload, converts it to 3-channel RGB and stretches it
/// to the configured size.
pub fn decode_image(path: &Path, config: &ImageConfig) -> Result<RgbImage, DecodeError> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError(format!(
            "image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }

    let resized = img.resize_exact(
        config.width(),
        config.height(),
        config.resize_method.into(),
    );
    Ok(resized.to_rgb8())
}

/// Scales 8-bit channels into `[0, 1]` and adds a leading batch axis.
pub fn to_input_tensor(img: &RgbImage) -> InputTensor {
    let (width, height) = img.dimensions();
    InputTensor::from_shape_fn((1, height as usize, width as usize, 3), |(_, y, x, c)| {
        img.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{encode_image, write_temp};
    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, Rgba, RgbaImage};

    #[test]
    fn rgba_png_is_stretched_to_model_size() {
        let rgba = RgbaImage::from_pixel(300, 200, Rgba([255, 0, 0, 255]));
        let bytes = encode_image(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);
        let (_dir, path) = write_temp("upload.png", &bytes);

        let rgb = decode_image(&path, &ImageConfig::default()).unwrap();
        assert_eq!(rgb.dimensions(), (128, 128));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn gif_is_stretched_without_cropping() {
        let split = RgbaImage::from_fn(300, 100, |x, _| {
            if x < 150 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let bytes = encode_image(DynamicImage::ImageRgba8(split), ImageFormat::Gif);
        let (_dir, path) = write_temp("split.gif", &bytes);

        let rgb = decode_image(&path, &ImageConfig::default()).unwrap();
        assert_eq!(rgb.dimensions(), (128, 128));
        // A crop or letterbox would lose one of the edge colours or pad the rows.
        assert_eq!(rgb.get_pixel(0, 64), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(127, 64), &Rgb([0, 0, 255]));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(127, 127), &Rgb([0, 0, 255]));
    }

    #[test]
    fn grayscale_becomes_three_identical_channels() {
        let gray = GrayImage::from_pixel(40, 90, Luma([51]));
        let bytes = encode_image(DynamicImage::ImageLuma8(gray), ImageFormat::Png);
        let (_dir, path) = write_temp("gray.png", &bytes);

        let rgb = decode_image(&path, &ImageConfig::default()).unwrap();
        let px = rgb.get_pixel(64, 64);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn content_is_sniffed_rather_than_trusting_the_extension() {
        let rgb = RgbImage::from_pixel(16, 16, Rgb([1, 2, 3]));
        let bytes = encode_image(DynamicImage::ImageRgb8(rgb), ImageFormat::Png);
        let (_dir, path) = write_temp("mislabelled.jpg", &bytes);

        assert!(decode_image(&path, &ImageConfig::default()).is_ok());
    }

    #[test]
    fn non_image_bytes_fail_to_decode() {
        let (_dir, path) = write_temp("notes.png", b"definitely not a png");
        let err = decode_image(&path, &ImageConfig::default()).unwrap_err();
        assert!(!err.0.is_empty());
    }

    #[test]
    fn tensor_is_nhwc_and_normalized() {
        let mut img = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
        img.put_pixel(3, 1, Rgb([255, 51, 0]));

        let tensor = to_input_tensor(&img);
        assert_eq!(tensor.shape(), &[1, 2, 4, 3]);
        assert_eq!(tensor[[0, 1, 3, 0]], 1.0);
        assert!((tensor[[0, 1, 3, 1]] - 0.2).abs() < 1e-6);
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
