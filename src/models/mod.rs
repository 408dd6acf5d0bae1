//! Domain models and API DTOs for the case generation server.

pub mod analysis;
pub mod api_key;
pub mod batch;
pub mod generation;
pub mod project;
pub mod test_case;

// Re-export commonly used types
pub use analysis::{
    AnalysisKind, AnalysisPayload, AnalysisResponse, AutomationAnalysisRequest,
    AutomationCandidate, ChangeImpact, DefectAnalysisRequest, DefectTriage,
    ImpactAnalysisRequest, ListAnalysesQuery,
};
pub use api_key::{ApiKey, ApiKeyCreateResponse, ApiKeyListItem, CreateApiKeyRequest, Principal};
pub use batch::{BatchDetail, BatchSummary, ListBatchesQuery};
pub use generation::{
    DesignGenerationRequest, DocumentGenerationRequest, GenerationResponse, ImageGenerationRequest,
    ImageInput, ShapeHint, TextGenerationRequest,
};
pub use project::{CreateProjectRequest, Project, ProjectStats, SeverityCount};
pub use test_case::{
    Classification, CreateTestCaseRequest, ExampleData, ListTestCasesQuery, NormalizedTestCase,
    TestCaseListResponse, TestCaseResponse, UpdateTestCaseRequest,
};

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: u64 = 20;

/// Upper bound for any page size.
pub const MAX_LIMIT: u64 = 100;

/// Clamp a caller-supplied limit to `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<u64>, default: u64) -> u64 {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}
