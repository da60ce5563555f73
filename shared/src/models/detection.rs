//! Prediction results and the detection endpoint payloads

use serde::{Deserialize, Serialize};
use std::fmt;

use super::classes::{ClassLabel, CropClass, DiseaseClass};

/// Whether a prediction came from a trained network or the demo fallback
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InferenceMode {
    #[serde(rename = "Real AI")]
    RealAi,
    #[serde(rename = "Demo AI")]
    DemoAi,
}

impl fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceMode::RealAi => write!(f, "Real AI"),
            InferenceMode::DemoAi => write!(f, "Demo AI"),
        }
    }
}

/// A single classifier output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction<C: ClassLabel> {
    pub label: C,
    pub confidence: f32,
    pub mode: InferenceMode,
}

/// Response body of `POST /detect-crop`
///
/// `crop` repeats `label` for clients written against the first API version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropDetectionResponse {
    pub label: CropClass,
    pub crop: CropClass,
    pub confidence: f32,
    pub mode: InferenceMode,
}

impl From<Prediction<CropClass>> for CropDetectionResponse {
    fn from(p: Prediction<CropClass>) -> Self {
        Self {
            label: p.label,
            crop: p.label,
            confidence: p.confidence,
            mode: p.mode,
        }
    }
}

/// Response body of `POST /detect-disease`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseDetectionResponse {
    pub label: DiseaseClass,
    pub disease: DiseaseClass,
    pub confidence: f32,
    pub solution: String,
    pub mode: InferenceMode,
}

impl From<Prediction<DiseaseClass>> for DiseaseDetectionResponse {
    fn from(p: Prediction<DiseaseClass>) -> Self {
        Self {
            label: p.label,
            disease: p.label,
            confidence: p.confidence,
            solution: p.label.solution().to_string(),
            mode: p.mode,
        }
    }
}
