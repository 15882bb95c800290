use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Image formats accepted by the upload form, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImageExtension {
    Png,
    Jpg,
    Jpeg,
    Gif,
}

impl ImageExtension {
    /// Parses the text after the last `.` of `filename`. The check is purely
    /// syntactic: file contents are never inspected here.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        ext.parse().ok()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictionResponse {
    pub label: String,
    pub class_index: usize,
    pub confidence: f32,
    pub predictions: Vec<f32>,
    pub class_labels: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
