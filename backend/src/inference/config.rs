use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::ModelLoadError;

/// Preprocessing and model-location contract. The resize method must match
/// whatever was used to prepare the training data, so it is pinned here
/// rather than left implementation-defined.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_path: String,
    pub image: ImageConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageConfig {
    pub size: [u32; 2],
    pub channels: u32,
    pub resize_method: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: "models/skin_lesion.pt".to_string(),
            image: ImageConfig {
                size: [150, 150],
                channels: 3,
                // PIL's Image.resize default, used when the training data
                // was prepared.
                resize_method: "bicubic".to_string(),
            },
        }
    }
}

impl ModelConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = match std::env::var("MODEL_CONFIG") {
            Ok(path) => path,
            Err(_) => {
                let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
                    .map_err(|_| "Failed to get manifest directory")?;
                format!("{}/../config/model.yaml", manifest_dir)
            }
        };
        let config_str = std::fs::read_to_string(config_path)?;
        let config: ModelConfig = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn resize_filter(&self) -> Result<FilterType, ModelLoadError> {
        match self.image.resize_method.as_str() {
            "nearest" => Ok(FilterType::Nearest),
            "bilinear" => Ok(FilterType::Triangle),
            "bicubic" => Ok(FilterType::CatmullRom),
            "lanczos" => Ok(FilterType::Lanczos3),
            other => Err(ModelLoadError::Config(format!(
                "unknown resize method: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_model_contract() {
        let config = ModelConfig::default();
        assert_eq!(config.image.size, [150, 150]);
        assert_eq!(config.image.channels, 3);
        assert!(matches!(
            config.resize_filter(),
            Ok(FilterType::CatmullRom)
        ));
    }

    #[test]
    fn unknown_resize_method_is_rejected() {
        let mut config = ModelConfig::default();
        config.image.resize_method = "area".to_string();
        assert!(config.resize_filter().is_err());
    }
}
