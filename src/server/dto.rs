//! Wire types of the HTTP surface

use serde::{Deserialize, Serialize};

use crate::domain::model::TranscodeResult;

pub const SUCCESS_MESSAGE: &str = "Video processed successfully";

/// Body of a successful `POST /api/process-video`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessVideoResponse {
    pub message: String,
    #[serde(rename = "videoURL")]
    pub video_url: String,
    pub size: u64,
    pub duration: f64,
    pub original_file_type: String,
    pub converted_file_type: String,
    /// Key spelling is part of the published contract
    #[serde(rename = "covertedFileName")]
    pub converted_file_name: String,
}

impl From<TranscodeResult> for ProcessVideoResponse {
    fn from(result: TranscodeResult) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            video_url: result.output_location.locator().to_string(),
            size: result.output_size_bytes,
            duration: result.duration_seconds,
            original_file_type: result.original_mime_type,
            converted_file_type: result.output_mime_type,
            converted_file_name: result.file_name,
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
