//! Normalization of the inference endpoint's response body.
//!
//! The hosted model does not commit to a single response shape. Bodies are
//! classified into a [`ResponseShape`] by trying each rule in order; the first
//! match wins:
//!
//! 1. non-empty array whose first element carries a `label`
//! 2. object carrying a `label`
//! 3. plain JSON string
//!
//! A `label` of `null`, `false`, `0` or `""` counts as missing.
//!
//! Anything else is `Unrecognized` and degrades to the "Unable to determine"
//! sentinel instead of failing the request.

use serde_json::Value;
use survival_core::{PredictionResult, Verdict, SURVIVED_LABEL};

/// Confidence reported for plain-string bodies, which carry no score.
pub const DEFAULT_TEXT_CONFIDENCE: f64 = 0.75;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// `[{"label": "...", "score": 0.9}, ...]`
    LabelList(LabelScore),
    /// `{"label": "...", "score": 0.9}`
    LabelObject(LabelScore),
    /// `"... SURVIVED ..."`
    Text(String),
    Unrecognized,
}

type ShapeRule = fn(&Value) -> Option<ResponseShape>;

/// Priority order matters: an array is never probed as an object.
const SHAPE_RULES: [ShapeRule; 3] = [label_list, label_object, text];

impl ResponseShape {
    pub fn classify(body: &Value) -> Self {
        SHAPE_RULES
            .iter()
            .find_map(|rule| rule(body))
            .unwrap_or(ResponseShape::Unrecognized)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResponseShape::LabelList(_) => "label_list",
            ResponseShape::LabelObject(_) => "label_object",
            ResponseShape::Text(_) => "text",
            ResponseShape::Unrecognized => "unrecognized",
        }
    }

    pub fn into_result(self, options: &NormalizeOptions) -> PredictionResult {
        match self {
            ResponseShape::LabelList(ls) | ResponseShape::LabelObject(ls) => {
                let score = ls.score.unwrap_or_else(|| {
                    tracing::warn!(label = %ls.label, "Inference response label has no numeric score");
                    0.0
                });
                PredictionResult::from_label(&ls.label, score)
            }
            ResponseShape::Text(text) => {
                let prediction = if text.contains(SURVIVED_LABEL) {
                    Verdict::Survived
                } else {
                    Verdict::DidNotSurvive
                };
                PredictionResult {
                    prediction,
                    probability: options.text_confidence,
                }
            }
            ResponseShape::Unrecognized => PredictionResult::undetermined(),
        }
    }
}

fn label_list(body: &Value) -> Option<ResponseShape> {
    let first = body.as_array()?.first()?;
    label_score(first).map(ResponseShape::LabelList)
}

fn label_object(body: &Value) -> Option<ResponseShape> {
    body.as_object()?;
    label_score(body).map(ResponseShape::LabelObject)
}

fn text(body: &Value) -> Option<ResponseShape> {
    body.as_str().map(|s| ResponseShape::Text(s.to_owned()))
}

fn label_score(value: &Value) -> Option<LabelScore> {
    let label = label_text(value.get("label")?)?;

    Some(LabelScore {
        label,
        score: value.get("score").and_then(Value::as_f64),
    })
}

/// A label counts as present unless it is `null`, `false`, zero or `""`.
/// Non-string labels keep their JSON text, which never maps to a survival.
fn label_text(label: &Value) -> Option<String> {
    match label {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    pub text_confidence: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            text_confidence: DEFAULT_TEXT_CONFIDENCE,
        }
    }
}

/// Maps a raw response body onto a prediction. Never fails.
pub fn normalize(body: &Value, options: &NormalizeOptions) -> PredictionResult {
    let shape = ResponseShape::classify(body);
    if shape == ResponseShape::Unrecognized {
        tracing::warn!(body = %body, "Unexpected response format from inference endpoint");
    } else {
        tracing::debug!(shape = shape.kind(), "Classified inference response");
    }
    shape.into_result(options)
}
