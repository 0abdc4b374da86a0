use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

pub const DEFAULT_THRESHOLD: f32 = 0.5;
pub const DEFAULT_FRAMES: u32 = 50;
pub const MAX_FRAMES: u32 = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("Threshold must be between 0.0 and 1.0, got {0}")]
    Threshold(f32),
    #[error("Frame count must be between 0 and 100, got {0}")]
    FrameCount(u32),
}

/// Pre-trained detector weights the inference service can load.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    strum_macros::Display,
)]
pub enum DetectionModel {
    #[default]
    EfficientNetB4,
    EfficientNetB4ST,
    EfficientNetAutoAttB4,
    EfficientNetAutoAttB4ST,
}

/// Training dataset the selected weights were fitted on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    strum_macros::Display,
)]
pub enum Dataset {
    #[default]
    #[serde(rename = "DFDC")]
    #[strum(serialize = "DFDC")]
    Dfdc,
    #[serde(rename = "FFPP")]
    #[strum(serialize = "FFPP")]
    Ffpp,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Real => "Real",
            Verdict::Fake => "Fake",
        }
    }
}

/// Decision boundary handed to the detector, always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
#[display(fmt = "{:.2}", _0)]
pub struct Threshold(f32);

impl Threshold {
    pub fn new(value: f32) -> Result<Self, ParamError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ParamError::Threshold(value))
        }
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<f32> for Threshold {
    type Error = ParamError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f32 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

/// Number of video frames sampled for analysis, within [0, MAX_FRAMES].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[display(fmt = "{}", _0)]
pub struct FrameCount(u32);

impl FrameCount {
    pub fn new(value: u32) -> Result<Self, ParamError> {
        if value <= MAX_FRAMES {
            Ok(Self(value))
        } else {
            Err(ParamError::FrameCount(value))
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for FrameCount {
    fn default() -> Self {
        Self(DEFAULT_FRAMES)
    }
}

impl TryFrom<u32> for FrameCount {
    type Error = ParamError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FrameCount> for u32 {
    fn from(frames: FrameCount) -> Self {
        frames.0
    }
}

/// Per-request detector settings, passed explicitly instead of living in page state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionParams {
    pub model: DetectionModel,
    pub dataset: Dataset,
    pub threshold: Threshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub verdict: Verdict,
    /// Percentage in [0, 100].
    pub confidence: f32,
}

impl DetectionResult {
    pub fn has_valid_confidence(&self) -> bool {
        (0.0..=100.0).contains(&self.confidence)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} with a probability of {:.2}%",
            self.verdict.label(),
            self.confidence
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub id: Uuid,
    pub verdict: Verdict,
    pub confidence: f32,
    pub summary: String,
    pub simulated: bool,
    pub analyzed_at: String,
}

impl DetectionResponse {
    pub fn new(id: Uuid, result: DetectionResult, simulated: bool, analyzed_at: String) -> Self {
        Self {
            id,
            verdict: result.verdict,
            confidence: result.confidence,
            summary: result.summary(),
            simulated,
            analyzed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionOptions {
    pub models: Vec<DetectionModel>,
    pub datasets: Vec<Dataset>,
    pub defaults: DetectionParams,
    pub default_frames: FrameCount,
    pub max_frames: u32,
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
    pub backend: String,
}

// Wire format of the external inference service.

#[derive(Serialize, Deserialize, Clone)]
pub struct ImageInferenceRequest {
    pub image_data: String,
    pub model: DetectionModel,
    pub dataset: Dataset,
    pub threshold: f32,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct VideoInferenceRequest {
    pub video_path: String,
    pub model: DetectionModel,
    pub dataset: Dataset,
    pub threshold: f32,
    pub frames: u32,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct InferenceResponse {
    pub verdict: Verdict,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn model_names_match_detector_weights() {
        let names: Vec<&str> = DetectionModel::iter().map(|m| m.into()).collect();
        assert_eq!(
            names,
            vec![
                "EfficientNetB4",
                "EfficientNetB4ST",
                "EfficientNetAutoAttB4",
                "EfficientNetAutoAttB4ST"
            ]
        );
        assert_eq!(
            "EfficientNetAutoAttB4ST".parse::<DetectionModel>().unwrap(),
            DetectionModel::EfficientNetAutoAttB4ST
        );
        assert!("ResNet50".parse::<DetectionModel>().is_err());
    }

    #[test]
    fn dataset_uses_upper_case_names() {
        assert_eq!("FFPP".parse::<Dataset>().unwrap(), Dataset::Ffpp);
        assert_eq!(Dataset::Dfdc.to_string(), "DFDC");
        assert_eq!(serde_json::to_string(&Dataset::Ffpp).unwrap(), "\"FFPP\"");
    }

    #[test]
    fn threshold_rejects_out_of_range_values() {
        assert!(Threshold::new(0.0).is_ok());
        assert!(Threshold::new(1.0).is_ok());
        assert_eq!(Threshold::new(1.5), Err(ParamError::Threshold(1.5)));
        assert!(Threshold::new(-0.1).is_err());
        assert!(Threshold::new(f32::NAN).is_err());
        assert!(serde_json::from_str::<Threshold>("2.0").is_err());
    }

    #[test]
    fn frame_count_is_capped() {
        assert_eq!(FrameCount::default().value(), 50);
        assert!(FrameCount::new(0).is_ok());
        assert!(FrameCount::new(100).is_ok());
        assert_eq!(FrameCount::new(101), Err(ParamError::FrameCount(101)));
    }

    #[test]
    fn summary_capitalizes_verdict() {
        let result = DetectionResult {
            verdict: Verdict::Fake,
            confidence: 55.234,
        };
        assert_eq!(result.summary(), "Fake with a probability of 55.23%");

        let result = DetectionResult {
            verdict: Verdict::Real,
            confidence: 90.0,
        };
        assert_eq!(result.summary(), "Real with a probability of 90.00%");
    }

    #[test]
    fn inference_response_parses_lowercase_verdict() {
        let parsed: InferenceResponse =
            serde_json::from_str(r#"{"verdict":"fake","confidence":72.5}"#).unwrap();
        assert_eq!(parsed.verdict, Verdict::Fake);
        let unknown = r#"{"verdict":"maybe","confidence":1}"#;
        assert!(serde_json::from_str::<InferenceResponse>(unknown).is_err());
    }
}
