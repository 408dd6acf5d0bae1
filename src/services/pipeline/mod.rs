//! Structured extraction and persistence pipeline.
//!
//! raw text -> [`cleaner`] -> [`parser`] -> [`normalizer`] -> store.
//! Generator failures are hard errors. Output that cannot be recognized comes
//! back as a fallback (raw text plus warning) and nothing is written for it.

pub mod cleaner;
pub mod normalizer;
pub mod parser;

use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::db::DbPool;
use crate::db::analyses::AnalysisBody;
use crate::entity::{analysis, project};
use crate::error::{AppError, AppResult};
use crate::models::{
    AnalysisKind, AnalysisPayload, GenerationResponse, NormalizedTestCase, ShapeHint,
    TestCaseResponse,
};
use crate::services::generator::{PromptPart, TextGenerator, generate_with_timeout};

use cleaner::Cleaned;
use parser::Expectation;

/// Runtime knobs shared by every pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub generator_timeout: Duration,
    pub max_input_chars: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            generator_timeout: Duration::from_secs(config.generator.timeout_secs),
            max_input_chars: config.max_input_chars,
        }
    }

    /// Limit for secondary inputs such as logs and change descriptions.
    pub fn half_input_chars(&self) -> usize {
        self.max_input_chars / 2
    }
}

/// Outcome of extracting structure from one raw response.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    Structured(T),
    /// Structure was not recognized; carries the warning for the caller.
    Unrecognized(String),
}

fn cleaned_text(raw: &str) -> AppResult<&str> {
    match cleaner::clean(raw) {
        Cleaned::UpstreamError(message) => Err(AppError::Generation(message.trim().to_string())),
        Cleaned::Text(text) => Ok(text),
    }
}

/// Raw response to normalized test cases.
pub fn extract_test_cases(
    raw: &str,
    shape: ShapeHint,
) -> AppResult<Extracted<Vec<NormalizedTestCase>>> {
    let text = cleaned_text(raw)?;

    let parsed = match parser::parse_structured(text, Expectation::Array) {
        Ok(value) => value,
        Err(err) => {
            return Ok(Extracted::Unrecognized(format!(
                "Could not read test cases from the generator response: {}",
                err
            )));
        }
    };

    Ok(match normalizer::normalize_test_cases(&parsed, shape) {
        Ok(records) => Extracted::Structured(records),
        Err(err) => Extracted::Unrecognized(format!(
            "The generator response does not match a known test case layout: {}",
            err
        )),
    })
}

/// Raw response to a normalized analysis payload.
pub fn extract_analysis(raw: &str, kind: AnalysisKind) -> AppResult<Extracted<AnalysisPayload>> {
    let text = cleaned_text(raw)?;

    let parsed = match parser::parse_structured(text, Expectation::Object) {
        Ok(value) => value,
        Err(err) => {
            return Ok(Extracted::Unrecognized(format!(
                "Could not read the {} result from the generator response: {}",
                kind, err
            )));
        }
    };

    Ok(match normalizer::normalize_analysis(kind, &parsed) {
        Ok(payload) => Extracted::Structured(payload),
        Err(err) => Extracted::Unrecognized(err.to_string()),
    })
}

/// Run one test case generation for an authorized project.
pub async fn generate_test_cases(
    pool: &DbPool,
    generator: &dyn TextGenerator,
    settings: &PipelineSettings,
    project: &project::Model,
    source: &str,
    parts: &[PromptPart],
    shape: ShapeHint,
) -> AppResult<GenerationResponse> {
    info!(project_id = %project.id, source, "Generating test cases");
    let raw = generate_with_timeout(generator, parts, settings.generator_timeout).await?;

    let records = match extract_test_cases(&raw, shape)? {
        Extracted::Structured(records) => records,
        Extracted::Unrecognized(warning) => {
            warn!(project_id = %project.id, source, %warning, "Returning raw generator text");
            return Ok(GenerationResponse::Fallback {
                source: source.to_string(),
                raw_text: raw,
                warning,
            });
        }
    };

    let Some((batch, children)) = pool
        .insert_generation_batch(project.id, source, &records)
        .await?
    else {
        info!(project_id = %project.id, source, "Generator produced no test cases");
        return Ok(GenerationResponse::Records {
            source: source.to_string(),
            batch_id: None,
            count: 0,
            records: Vec::new(),
        });
    };

    info!(
        project_id = %project.id,
        batch_id = %batch.id,
        count = children.len(),
        "Generation batch persisted"
    );

    Ok(GenerationResponse::Records {
        source: source.to_string(),
        batch_id: Some(batch.id),
        count: children.len(),
        records: children.into_iter().map(TestCaseResponse::from).collect(),
    })
}

/// Run one analysis for an authorized project. Exactly one row is written
/// unless the generator itself fails.
pub async fn generate_analysis(
    pool: &DbPool,
    generator: &dyn TextGenerator,
    settings: &PipelineSettings,
    project: &project::Model,
    kind: AnalysisKind,
    source: &str,
    parts: &[PromptPart],
) -> AppResult<analysis::Model> {
    info!(project_id = %project.id, kind = %kind, "Running analysis");
    let raw = generate_with_timeout(generator, parts, settings.generator_timeout).await?;

    let body = match extract_analysis(&raw, kind)? {
        Extracted::Structured(payload) => AnalysisBody::Payload(serde_json::to_value(&payload)?),
        Extracted::Unrecognized(warning) => {
            warn!(project_id = %project.id, kind = %kind, %warning, "Storing raw analysis text");
            AnalysisBody::Fallback {
                raw_text: raw,
                warning,
            }
        }
    };

    pool.insert_analysis(project.id, kind, source, body).await
}
