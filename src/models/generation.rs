//! Generation request and response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::test_case::TestCaseResponse;

/// Caller-declared shape of the generated array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShapeHint {
    /// Grouped when the first element carries a scenario title, flat otherwise.
    #[default]
    Auto,
    Flat,
    Grouped,
}

/// `POST /generations/text`
#[derive(Debug, Deserialize, ToSchema)]
pub struct TextGenerationRequest {
    pub requirements: String,
    #[serde(default)]
    pub shape: ShapeHint,
}

/// `POST /generations/document`
#[derive(Debug, Deserialize, ToSchema)]
pub struct DocumentGenerationRequest {
    /// Original file name; must end in `.pdf` or `.docx`.
    pub file_name: String,
    /// Text extracted from the document.
    pub extracted_text: String,
    #[serde(default)]
    pub shape: ShapeHint,
}

/// `POST /generations/design`
#[derive(Debug, Deserialize, ToSchema)]
pub struct DesignGenerationRequest {
    /// Design file key the text was exported from.
    pub file_key: String,
    /// Flattened text of the design's frames and components.
    pub extracted_text: String,
    #[serde(default)]
    pub shape: ShapeHint,
}

/// One screenshot for `POST /generations/images`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImageInput {
    pub file_name: String,
    /// `image/png` or `image/jpeg`
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data_base64: String,
}

/// `POST /generations/images`
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImageGenerationRequest {
    pub images: Vec<ImageInput>,
    /// Optional text describing what the screens belong to.
    pub context: Option<String>,
    #[serde(default)]
    pub shape: ShapeHint,
}

/// Result of a generation request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum GenerationResponse {
    /// Structured output was recognized; `batch_id` is null when nothing was produced.
    Records {
        source: String,
        batch_id: Option<Uuid>,
        count: usize,
        records: Vec<TestCaseResponse>,
    },
    /// Structured output was not recognized; nothing was persisted.
    Fallback {
        source: String,
        raw_text: String,
        warning: String,
    },
}

impl GenerationResponse {
    /// True when a batch was written.
    pub fn persisted(&self) -> bool {
        matches!(self, Self::Records { batch_id: Some(_), .. })
    }
}
