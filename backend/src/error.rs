use thiserror::Error;

/// Errors a single analysis request can surface to the caller.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to preprocess image: {0}")]
    Preprocess(String),
    /// Only reachable if the fallback backend itself fails.
    #[error("inference backend error: {0}")]
    Backend(#[from] PredictError),
}

impl AnalysisError {
    /// Client-facing errors map to 400, everything else to 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidInput(_)
                | AnalysisError::Decode(_)
                | AnalysisError::Preprocess(_)
        )
    }
}

/// Startup-only failure. Once this is reported the process serves mock
/// predictions for its whole lifetime; it is never revisited per request.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to load TorchScript module: {0}")]
    Load(#[from] tch::TchError),
    #[error("model configuration error: {0}")]
    Config(String),
}

/// Failure during a single predict call. Caught by the pipeline, which
/// substitutes the mock backend for that request only.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model forward pass failed: {0}")]
    Model(#[from] tch::TchError),
    #[error("model returned {0} scores, expected one per class")]
    UnexpectedShape(usize),
    #[error("backend lock poisoned by a previous panic")]
    Poisoned,
}
