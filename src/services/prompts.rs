//! Prompt builders for test case generation and analyses.
//!
//! Every prompt ends with an output-format section asking for bare JSON, so the
//! response can go through the structured extraction pipeline.

use std::borrow::Cow;

use tracing::warn;

use crate::models::{AutomationAnalysisRequest, DefectAnalysisRequest, ShapeHint};

const FLAT_FORMAT: &str = r#"Respond with ONLY a JSON array and no other text. Each element is one test case:
[
  {
    "test_case_id": "TC-001",
    "scenario": "Short scenario label",
    "test_case_summary": "One-line summary",
    "precondition": "State required before the test",
    "test_steps": ["Step 1", "Step 2"],
    "test_data": "Example input (string, list or object)",
    "expected_result": "Observable outcome",
    "priority": "High | Medium | Low",
    "severity": "Critical | High | Medium | Low"
  }
]"#;

const GROUPED_FORMAT: &str = r#"Respond with ONLY a JSON array and no other text. Group the test cases by scenario:
[
  {
    "scenario_title": "Scenario name",
    "positive_test_cases": [
      {
        "test_case_id": "TC-001",
        "test_case_summary": "One-line summary",
        "precondition": "State required before the test",
        "test_steps": ["Step 1", "Step 2"],
        "test_data": "Example input (string, list or object)",
        "expected_result": "Observable outcome",
        "priority": "High | Medium | Low",
        "severity": "Critical | High | Medium | Low"
      }
    ],
    "negative_test_cases": []
  }
]"#;

/// Truncate to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            warn!(
                original_chars = text.chars().count(),
                max_chars, "Input text truncated"
            );
            Cow::Owned(text[..byte_index].to_string())
        }
        None => Cow::Borrowed(text),
    }
}

fn output_format(shape: ShapeHint) -> &'static str {
    match shape {
        ShapeHint::Flat => FLAT_FORMAT,
        ShapeHint::Auto | ShapeHint::Grouped => GROUPED_FORMAT,
    }
}

/// Prompt for free-form requirement text.
pub fn requirements_prompt(requirements: &str, shape: ShapeHint) -> String {
    format!(
        "Act as an expert Software Quality Assurance Engineer.\n\
         Analyze the following software requirement text and generate relevant test cases.\n\
         Cover positive scenarios, negative scenarios, boundary values, and potential edge cases \
         based *only* on the provided text.\n\n\
         Requirement Text:\n---\n{requirements}\n---\n\n{format}",
        format = output_format(shape)
    )
}

/// Prompt for text extracted from an uploaded document.
pub fn document_prompt(file_name: &str, extracted_text: &str, shape: ShapeHint) -> String {
    format!(
        "Act as an expert Software Quality Assurance Engineer.\n\
         Analyze the following content extracted from the document '{file_name}' and generate \
         relevant test cases.\n\
         Identify requirements, features, or user actions described. Cover positive/negative \
         scenarios, boundary values, and edge cases based *only* on the text.\n\n\
         Extracted Document Content:\n---\n{extracted_text}\n---\n\n{format}",
        format = output_format(shape)
    )
}

/// Prompt for text flattened from a design file.
pub fn design_prompt(file_key: &str, extracted_text: &str, shape: ShapeHint) -> String {
    format!(
        "Act as an expert Software Quality Assurance Engineer specializing in UI/UX testing.\n\
         Analyze the following content extracted from a Figma design file (File Key: {file_key}). \
         The content includes text from UI elements and structural information like \
         frame/component names (e.g., [FRAME: Login Screen]).\n\
         Based *only* on this extracted design information, identify UI elements, user flows, \
         actions, and display requirements, and generate test cases for the user interface and \
         user experience. Focus on interactions, navigation, and edge cases or missing states \
         suggested by the structure.\n\n\
         Extracted Figma Content:\n---\n{extracted_text}\n---\n\n{format}",
        format = output_format(shape)
    )
}

/// Text segment preceding the screenshots.
pub fn images_prompt(file_names: &[&str], context: Option<&str>, shape: ShapeHint) -> String {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("None");
    format!(
        "Act as an expert Software Quality Assurance Engineer specializing in UI/UX testing.\n\
         The following {count} screenshot(s) show screens of one application ({names}).\n\
         Based *only* on what is visible, identify UI elements, user flows and states, and \
         generate test cases covering positive/negative scenarios and edge cases.\n\n\
         Additional Context: {context}\n\n{format}",
        count = file_names.len(),
        names = file_names.join(", "),
        format = output_format(shape)
    )
}

/// Defect triage prompt; `error_logs` must already be truncated.
pub fn defect_prompt(request: &DefectAnalysisRequest, error_logs: &str) -> String {
    let steps = request
        .steps_reproduced
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Not Provided");
    let context = request
        .context
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("None");

    format!(
        "Act as an expert Software Debugging Analyst.\n\
         Analyze the following defect information from a failed test execution.\n\
         Based *only* on the provided details (especially the error logs), suggest a plausible \
         root cause, a severity (one of: Low, Medium, High, Critical) with a brief justification, \
         and a concise defect summary suitable for a bug report title.\n\n\
         Information Provided:\n---\n\
         Failed Test Case: {failed_test}\n\
         Error Logs:\n{error_logs}\n\
         Steps to Reproduce: {steps}\n\
         Additional Context: {context}\n---\n\n\
         Respond with ONLY a JSON object and no other text:\n\
         {{\"root_cause\": \"...\", \"severity\": \"Low | Medium | High | Critical\", \
         \"severity_justification\": \"...\", \"summary\": \"...\"}}",
        failed_test = request.failed_test.trim(),
    )
}

/// Automation recommendation prompt; `description` must already be truncated.
pub fn automation_prompt(
    request: &AutomationAnalysisRequest,
    description: &str,
    manual_minutes: u32,
) -> String {
    format!(
        "Act as an expert Test Automation Strategist.\n\
         Evaluate the suitability of the following manual test case for automation.\n\
         Consider the return on investment based on frequency, manual effort saved, and feature \
         stability (stable features are better candidates).\n\n\
         Test Case Details:\n---\n\
         Description: {description}\n\
         Execution Frequency: {frequency}\n\
         Feature Stability: {stability}\n\
         Estimated Manual Execution Time (minutes): {manual_minutes}\n---\n\n\
         Respond with ONLY a JSON object and no other text:\n\
         {{\"recommendation\": \"Yes | No | Maybe\", \"justification\": \"...\"}}",
        frequency = request.execution_frequency.trim(),
        stability = request.stability.trim(),
    )
}

/// Change impact prompt; both descriptions must already be truncated.
pub fn impact_prompt(code_change: &str, test_case: &str) -> String {
    format!(
        "Act as an AI assisting with Test Impact Analysis.\n\
         You are given a description of a code change and a description of an existing test \
         case. Based *only* on the semantics and keywords in these two descriptions, estimate \
         the likelihood that the test case needs to be reviewed or updated due to this change.\n\n\
         Code Change Description:\n---\n{code_change}\n---\n\n\
         Test Case Description:\n---\n{test_case}\n---\n\n\
         Respond with ONLY a JSON object and no other text:\n\
         {{\"likelihood\": \"High | Medium | Low | None\", \"reasoning\": \"...\"}}"
    )
}
