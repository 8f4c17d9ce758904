use std::sync::Arc;

use log::{debug, warn};
use shared::{AnalysisReport, BackendKind, BackendStatus};

use crate::clinical;
use crate::error::AnalysisError;
use crate::inference::backend::InferenceBackend;
use crate::inference::preprocess::ImagePreprocessor;
use crate::inference::{Distribution, ImageTensor, round_percent};

const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

/// Turns one uploaded image into a complete analysis report. Stateless per
/// call; the backends and preprocessor are shared read-only across requests.
pub struct AnalysisPipeline {
    primary: Option<Arc<dyn InferenceBackend>>,
    fallback: Arc<dyn InferenceBackend>,
    preprocessor: ImagePreprocessor,
}

impl AnalysisPipeline {
    pub fn new(
        primary: Option<Arc<dyn InferenceBackend>>,
        fallback: Arc<dyn InferenceBackend>,
        preprocessor: ImagePreprocessor,
    ) -> Self {
        Self {
            primary,
            fallback,
            preprocessor,
        }
    }

    pub fn model_available(&self) -> bool {
        self.primary.is_some()
    }

    pub fn analyze(
        &self,
        filename: &str,
        bytes: &[u8],
        animal_type: &str,
        symptoms: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        if filename.is_empty() || bytes.is_empty() {
            return Err(AnalysisError::InvalidInput("no image file provided".into()));
        }
        if !allowed_file(filename) {
            return Err(AnalysisError::InvalidInput(format!(
                "unsupported file type: {filename}"
            )));
        }
        // Accepted but not consumed by the decision logic.
        debug!("declared animal type: {animal_type}, symptoms: {symptoms}");

        let tensor = self.preprocessor.preprocess(bytes)?;
        let (distribution, model_used, model_status) = self.classify(&tensor)?;

        let (disease, confidence) = distribution.argmax();
        Ok(AnalysisReport {
            disease,
            confidence: round_percent(confidence),
            severity: clinical::severity(disease, confidence),
            description: clinical::description(disease).to_string(),
            symptoms: clinical::symptoms(disease)
                .iter()
                .map(|s| s.to_string())
                .collect(),
            treatment: clinical::treatment(disease),
            urgency: clinical::urgency(disease, confidence).to_string(),
            all_probabilities: distribution.to_probability_set(),
            model_used,
            model_status,
        })
    }

    /// Try the model backend if it loaded at startup; on any per-request
    /// failure substitute the mock for this request only. The availability
    /// decision itself was made once, at startup, and is never revisited.
    fn classify(
        &self,
        tensor: &ImageTensor,
    ) -> Result<(Distribution, BackendKind, BackendStatus), AnalysisError> {
        if let Some(primary) = &self.primary {
            match primary.predict(tensor) {
                Ok(distribution) => {
                    let (class, confidence) = distribution.argmax();
                    debug!("model prediction: {class} ({confidence:.1}% confidence)");
                    return Ok((distribution, primary.kind(), BackendStatus::Active));
                }
                Err(e) => {
                    warn!("model backend failed, falling back to mock predictions: {e}");
                }
            }
        }
        let distribution = self.fallback.predict(tensor)?;
        Ok((distribution, self.fallback.kind(), BackendStatus::Fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictError;
    use crate::inference::backend::MockBackend;
    use crate::inference::config::ModelConfig;
    use image::imageops::FilterType;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use shared::{ClassLabel, SeverityTier};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubBackend {
        result: Option<[f32; 3]>,
        calls: AtomicUsize,
    }

    impl StubBackend {
        fn returning(percents: [f32; 3]) -> Self {
            Self {
                result: Some(percents),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl InferenceBackend for StubBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Model
        }

        fn predict(&self, _input: &ImageTensor) -> Result<Distribution, PredictError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Some(percents) => Ok(Distribution::new(percents)),
                None => Err(PredictError::UnexpectedShape(0)),
            }
        }
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(40, 40, image::Rgb([120, 90, 60]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    fn pipeline_with(primary: Option<Arc<dyn InferenceBackend>>) -> AnalysisPipeline {
        let preprocessor =
            ImagePreprocessor::new(&ModelConfig::default(), FilterType::CatmullRom);
        AnalysisPipeline::new(primary, Arc::new(MockBackend::seeded(11)), preprocessor)
    }

    #[test]
    fn model_prediction_produces_active_report() {
        let pipeline = pipeline_with(Some(Arc::new(StubBackend::returning([10.0, 85.0, 5.0]))));
        let report = pipeline
            .analyze("lesion.jpg", &jpeg_bytes(), "dog", "[]")
            .unwrap();

        assert_eq!(report.disease, ClassLabel::Fungal);
        assert_eq!(report.confidence, 85.0);
        assert_eq!(report.severity, SeverityTier::High);
        assert_eq!(report.model_used, BackendKind::Model);
        assert_eq!(report.model_status, BackendStatus::Active);
        assert!(report.urgency.starts_with("Moderate"));
        assert_eq!(report.all_probabilities.fungal, 85.0);
    }

    #[test]
    fn predict_failure_falls_back_to_mock_without_error() {
        let failing: Arc<StubBackend> = Arc::new(StubBackend::failing());
        let pipeline = pipeline_with(Some(failing.clone()));
        let report = pipeline
            .analyze("lesion.png", &jpeg_bytes(), "cat", "[]")
            .unwrap();

        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.model_used, BackendKind::Mock);
        assert_eq!(report.model_status, BackendStatus::Fallback);
        let total = report.all_probabilities.bacterial
            + report.all_probabilities.fungal
            + report.all_probabilities.healthy;
        assert!((total - 100.0).abs() < 0.2);
    }

    #[test]
    fn missing_model_reports_fallback() {
        let report = pipeline_with(None)
            .analyze("lesion.jpeg", &jpeg_bytes(), "dog", "[]")
            .unwrap();
        assert_eq!(report.model_used, BackendKind::Mock);
        assert_eq!(report.model_status, BackendStatus::Fallback);
    }

    #[test]
    fn disallowed_extension_is_rejected_before_any_backend_call() {
        let stub: Arc<StubBackend> = Arc::new(StubBackend::returning([10.0, 85.0, 5.0]));
        let pipeline = pipeline_with(Some(stub.clone()));

        let err = pipeline
            .analyze("report.pdf", &jpeg_bytes(), "dog", "[]")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_file_is_rejected() {
        let err = pipeline_with(None)
            .analyze("", &[], "dog", "[]")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(allowed_file("photo.JPG"));
        assert!(allowed_file("photo.gif"));
        assert!(!allowed_file("photo.pdf"));
        assert!(!allowed_file("no_extension"));
    }

    #[test]
    fn healthy_prediction_yields_low_severity_report() {
        let pipeline = pipeline_with(Some(Arc::new(StubBackend::returning([5.0, 5.0, 90.0]))));
        let report = pipeline
            .analyze("ok.png", &jpeg_bytes(), "dog", "[]")
            .unwrap();
        assert_eq!(report.disease, ClassLabel::Healthy);
        assert_eq!(report.severity, SeverityTier::Low);
        assert_eq!(report.urgency, "No action needed - Continue regular care");
    }
}
