//! Clinical knowledge base: pure lookups from a disease class (and the
//! model's confidence) to triage metadata. Matching is exhaustive over the
//! closed class set, so there is no default-to-unknown branch to reach.

use shared::{ClassLabel, SeverityTier, TreatmentPlan};

pub fn description(class: ClassLabel) -> &'static str {
    match class {
        ClassLabel::Bacterial => {
            "Bacterial skin infection caused by harmful bacteria affecting the skin tissue"
        }
        ClassLabel::Fungal => {
            "Fungal skin infection caused by fungi that can spread on the skin surface"
        }
        ClassLabel::Healthy => {
            "No signs of skin disease detected. The skin appears healthy and normal"
        }
    }
}

/// Symptoms in fixed display order.
pub fn symptoms(class: ClassLabel) -> &'static [&'static str] {
    match class {
        ClassLabel::Bacterial => &["Redness", "Swelling", "Pus formation", "Pain", "Warmth"],
        ClassLabel::Fungal => &[
            "Itching",
            "Scaling",
            "Circular patches",
            "Hair loss",
            "Discoloration",
        ],
        ClassLabel::Healthy => &["Normal skin color", "No irritation", "No unusual patches"],
    }
}

pub fn treatment(class: ClassLabel) -> TreatmentPlan {
    let (medication, dosage, topical, additional): (&str, &str, &str, &[&str]) = match class {
        ClassLabel::Bacterial => (
            "Antibiotic cream or oral antibiotics",
            "As prescribed by veterinarian",
            "Antiseptic wash",
            &[
                "Keep area clean",
                "Prevent licking/scratching",
                "Complete full course of antibiotics",
            ],
        ),
        ClassLabel::Fungal => (
            "Antifungal medication",
            "As prescribed by veterinarian",
            "Antifungal shampoo",
            &[
                "Isolate from other animals",
                "Clean environment",
                "Monitor for spread",
            ],
        ),
        ClassLabel::Healthy => (
            "No medication needed",
            "N/A",
            "Regular grooming",
            &["Maintain good hygiene", "Regular check-ups", "Balanced diet"],
        ),
    };
    TreatmentPlan {
        medication: medication.to_string(),
        dosage: dosage.to_string(),
        topical: topical.to_string(),
        additional: additional.iter().map(|s| s.to_string()).collect(),
    }
}

/// Boundaries are strict: 80.0 is medium, 60.0 is low.
pub fn severity(class: ClassLabel, confidence: f32) -> SeverityTier {
    match class {
        ClassLabel::Healthy => SeverityTier::Low,
        ClassLabel::Bacterial | ClassLabel::Fungal => {
            if confidence > 80.0 {
                SeverityTier::High
            } else if confidence > 60.0 {
                SeverityTier::Medium
            } else {
                SeverityTier::Low
            }
        }
    }
}

/// Boundary is strict: 70.0 confidence stays in the monitoring bucket.
pub fn urgency(class: ClassLabel, confidence: f32) -> &'static str {
    match class {
        ClassLabel::Healthy => "No action needed - Continue regular care",
        ClassLabel::Bacterial if confidence > 70.0 => {
            "High - Schedule vet visit within 24-48 hours"
        }
        ClassLabel::Fungal if confidence > 70.0 => {
            "Moderate - Schedule vet visit within 3-5 days"
        }
        ClassLabel::Bacterial | ClassLabel::Fungal => {
            "Low - Monitor and consult vet if symptoms worsen"
        }
    }
}
