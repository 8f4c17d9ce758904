use image::imageops::FilterType;
use ndarray::Array4;

use crate::error::AnalysisError;
use crate::inference::ImageTensor;
use crate::inference::config::ModelConfig;

/// Decodes raw upload bytes and normalizes them into the tensor shape the
/// model was trained on.
pub struct ImagePreprocessor {
    width: u32,
    height: u32,
    filter: FilterType,
}

impl ImagePreprocessor {
    pub fn new(config: &ModelConfig, filter: FilterType) -> Self {
        Self {
            width: config.image.size[0],
            height: config.image.size[1],
            filter,
        }
    }

    /// decode -> resize to target -> RGB -> scale by 1/255 -> add batch dim.
    pub fn preprocess(&self, bytes: &[u8]) -> Result<ImageTensor, AnalysisError> {
        let decoded = image::load_from_memory(bytes)?;
        let resized = decoded.resize_exact(self.width, self.height, self.filter);
        let rgb = resized.to_rgb8();
        let pixels: Vec<f32> = rgb.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();
        let tensor = Array4::from_shape_vec(
            (1, self.height as usize, self.width as usize, 3),
            pixels,
        )
        .map_err(|e| AnalysisError::Preprocess(e.to_string()))?;
        Ok(ImageTensor(tensor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, 255])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn preprocessor() -> ImagePreprocessor {
        ImagePreprocessor::new(&ModelConfig::default(), FilterType::CatmullRom)
    }

    #[test]
    fn output_has_fixed_shape_regardless_of_input_size() {
        for (w, h) in [(32, 20), (150, 150), (640, 480)] {
            let tensor = preprocessor().preprocess(&png_bytes(w, h)).unwrap();
            assert_eq!(tensor.0.dim(), (1, 150, 150, 3));
        }
    }

    #[test]
    fn output_values_are_normalized() {
        let tensor = preprocessor().preprocess(&png_bytes(64, 64)).unwrap();
        assert!(tensor.0.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn non_rgb_input_is_converted() {
        // RGBA source; alpha must be dropped, not fed to the model.
        let tensor = preprocessor().preprocess(&png_bytes(10, 10)).unwrap();
        assert_eq!(tensor.0.dim().3, 3);
    }

    #[test]
    fn garbage_bytes_fail_with_decode_error() {
        let err = preprocessor().preprocess(b"not an image").unwrap_err();
        assert!(matches!(err, AnalysisError::Decode(_)));
    }
}
