use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Disease classes in model output-index order. The order is significant:
/// position 0 of the model's output vector is Bacterial, and so on.
#[derive(Serialize, Deserialize, Display, EnumIter, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassLabel {
    Bacterial,
    Fungal,
    Healthy,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 3] =
        [ClassLabel::Bacterial, ClassLabel::Fungal, ClassLabel::Healthy];
}

#[derive(Serialize, Deserialize, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

/// Which backend produced the distribution for a given request.
#[derive(Serialize, Deserialize, Display, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Model,
    Mock,
}

#[derive(Serialize, Deserialize, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendStatus {
    Active,
    Fallback,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TreatmentPlan {
    pub medication: String,
    pub dosage: String,
    pub topical: String,
    pub additional: Vec<String>,
}

/// Per-class percentages, rounded to one decimal for display.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ProbabilitySet {
    #[serde(rename = "Bacterial")]
    pub bacterial: f32,
    #[serde(rename = "Fungal")]
    pub fungal: f32,
    #[serde(rename = "Healthy")]
    pub healthy: f32,
}

/// The complete result of one analysis request.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AnalysisReport {
    pub disease: ClassLabel,
    pub confidence: f32,
    pub severity: SeverityTier,
    pub description: String,
    pub symptoms: Vec<String>,
    pub treatment: TreatmentPlan,
    pub urgency: String,
    pub all_probabilities: ProbabilitySet,
    pub model_used: BackendKind,
    pub model_status: BackendStatus,
}
