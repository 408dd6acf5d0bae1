//! Turns parsed generator output into canonical records.
//!
//! Two array shapes are recognized. Flat: one test case object per element.
//! Grouped: scenario objects carrying `scenario_title` plus `positive_test_cases`
//! and `negative_test_cases` arrays, flattened one record per child case.

use serde_json::{Map, Value as JsonValue};

use crate::models::{
    AnalysisKind, AnalysisPayload, AutomationCandidate, ChangeImpact, Classification, DefectTriage,
    ExampleData, NormalizedTestCase, ShapeHint,
};

const SCENARIO_TITLE: &str = "scenario_title";
const POSITIVE_KEYS: &[&str] = &["positive_test_cases", "positive"];
const NEGATIVE_KEYS: &[&str] = &["negative_test_cases", "negative"];

const CASE_REF_KEYS: &[&str] = &["test_case_id", "id", "case_ref"];
const SCENARIO_KEYS: &[&str] = &["scenario", "scenario_title"];
const SUMMARY_KEYS: &[&str] = &["test_case_summary", "summary"];
const PRECONDITION_KEYS: &[&str] = &["precondition", "preconditions"];
const STEPS_KEYS: &[&str] = &["test_steps", "steps"];
const EXAMPLE_DATA_KEYS: &[&str] = &["test_data", "example_data"];
const EXPECTED_KEYS: &[&str] = &["expected_result", "expected_results"];
const PRIORITY_KEYS: &[&str] = &["priority"];
const SEVERITY_KEYS: &[&str] = &["severity"];

/// Shape actually used to normalize an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Flat,
    Grouped,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Element {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("Scenario {index}: field '{field}' is not an array")]
    NotAnArray { index: usize, field: &'static str },

    #[error("Scenario {scenario}, {classification} case {index} is not a JSON object")]
    ChildNotAnObject {
        scenario: usize,
        classification: Classification,
        index: usize,
    },

    #[error("The {0} result contains none of the expected fields")]
    NoRecognizedFields(AnalysisKind),

    #[error("Expected a JSON {0}")]
    WrongKind(&'static str),
}

/// Decide the shape of `items`. Grouped iff the first element carries a scenario title.
pub fn detect_shape(items: &[JsonValue]) -> Shape {
    match items.first() {
        Some(JsonValue::Object(first)) if first.contains_key(SCENARIO_TITLE) => Shape::Grouped,
        _ => Shape::Flat,
    }
}

/// Resolve the caller's hint against the data.
pub fn resolve_shape(hint: ShapeHint, items: &[JsonValue]) -> Shape {
    match hint {
        ShapeHint::Auto => detect_shape(items),
        ShapeHint::Flat => Shape::Flat,
        ShapeHint::Grouped => Shape::Grouped,
    }
}

/// Normalize a parsed array. Any malformed element rejects the whole array.
pub fn normalize_test_cases(
    value: &JsonValue,
    hint: ShapeHint,
) -> Result<Vec<NormalizedTestCase>, NormalizeError> {
    let items = value.as_array().ok_or(NormalizeError::WrongKind("array"))?;

    match resolve_shape(hint, items) {
        Shape::Flat => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let obj = item
                    .as_object()
                    .ok_or(NormalizeError::NotAnObject { index })?;
                Ok(record_from(obj, None, None))
            })
            .collect(),
        Shape::Grouped => {
            let mut records = Vec::new();
            for (index, item) in items.iter().enumerate() {
                let scenario = item
                    .as_object()
                    .ok_or(NormalizeError::NotAnObject { index })?;
                let title = scenario.get(SCENARIO_TITLE).and_then(text_of);

                for (keys, classification) in [
                    (POSITIVE_KEYS, Classification::Positive),
                    (NEGATIVE_KEYS, Classification::Negative),
                ] {
                    for (child_index, child) in child_cases(scenario, keys, index)?.iter().enumerate() {
                        let obj = child.as_object().ok_or(NormalizeError::ChildNotAnObject {
                            scenario: index,
                            classification,
                            index: child_index,
                        })?;
                        records.push(record_from(obj, title.clone(), Some(classification)));
                    }
                }
            }
            Ok(records)
        }
    }
}

/// Child array of a scenario; a missing field counts as empty.
fn child_cases<'a>(
    scenario: &'a Map<String, JsonValue>,
    keys: &'static [&'static str],
    index: usize,
) -> Result<&'a [JsonValue], NormalizeError> {
    match keys.iter().find_map(|k| scenario.get(*k)) {
        None | Some(JsonValue::Null) => Ok(&[]),
        Some(JsonValue::Array(items)) => Ok(items),
        Some(_) => Err(NormalizeError::NotAnArray {
            index,
            field: keys[0],
        }),
    }
}

fn record_from(
    obj: &Map<String, JsonValue>,
    scenario_title: Option<String>,
    classification: Option<Classification>,
) -> NormalizedTestCase {
    NormalizedTestCase {
        case_ref: text_field(obj, CASE_REF_KEYS),
        scenario: scenario_title.or_else(|| text_field(obj, SCENARIO_KEYS)),
        summary: text_field(obj, SUMMARY_KEYS),
        precondition: text_field(obj, PRECONDITION_KEYS),
        steps: field(obj, STEPS_KEYS).and_then(steps_of),
        example_data: field(obj, EXAMPLE_DATA_KEYS).and_then(ExampleData::from_generated),
        expected_result: text_field(obj, EXPECTED_KEYS),
        priority: text_field(obj, PRIORITY_KEYS),
        severity: text_field(obj, SEVERITY_KEYS),
        classification,
    }
}

/// First present alias.
fn field<'a>(obj: &'a Map<String, JsonValue>, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn text_field(obj: &Map<String, JsonValue>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(text_of)
}

/// Strings verbatim; other scalars and containers as compact JSON; null as none.
fn text_of(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn steps_of(value: &JsonValue) -> Option<Vec<Option<String>>> {
    match value {
        JsonValue::Null => None,
        JsonValue::Array(items) => Some(items.iter().map(text_of).collect()),
        other => text_of(other).map(|step| vec![Some(step)]),
    }
}

/// Normalize a parsed object into the payload for `kind`.
pub fn normalize_analysis(
    kind: AnalysisKind,
    value: &JsonValue,
) -> Result<AnalysisPayload, NormalizeError> {
    let obj = value.as_object().ok_or(NormalizeError::WrongKind("object"))?;

    let payload = match kind {
        AnalysisKind::DefectTriage => {
            let triage = DefectTriage {
                root_cause: text_field(obj, &["root_cause", "potential_root_cause"]),
                severity: text_field(obj, &["severity", "suggested_severity"]),
                severity_justification: text_field(
                    obj,
                    &["severity_justification", "justification"],
                ),
                summary: text_field(obj, &["summary", "defect_summary", "defect_summary_draft"]),
            };
            let empty = triage.root_cause.is_none()
                && triage.severity.is_none()
                && triage.severity_justification.is_none()
                && triage.summary.is_none();
            (!empty).then_some(AnalysisPayload::DefectTriage(triage))
        }
        AnalysisKind::AutomationCandidate => {
            let candidate = AutomationCandidate {
                recommendation: text_field(obj, &["recommendation"]),
                justification: text_field(obj, &["justification", "reasoning"]),
            };
            let empty = candidate.recommendation.is_none() && candidate.justification.is_none();
            (!empty).then_some(AnalysisPayload::AutomationCandidate(candidate))
        }
        AnalysisKind::ChangeImpact => {
            let impact = ChangeImpact {
                likelihood: text_field(obj, &["likelihood", "impact_likelihood"]),
                reasoning: text_field(obj, &["reasoning", "justification"]),
            };
            let empty = impact.likelihood.is_none() && impact.reasoning.is_none();
            (!empty).then_some(AnalysisPayload::ChangeImpact(impact))
        }
    };

    payload.ok_or(NormalizeError::NoRecognizedFields(kind))
}
