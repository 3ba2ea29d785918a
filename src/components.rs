//! Semantic filename components and model response normalization.
//!
//! The model is instructed to answer with a flat JSON object keyed by the
//! six semantic component names. Real model output is unreliable: it may be
//! wrapped in markdown code fences, carry unknown keys, or use the literal
//! string `"null"` for absent values. Everything fragile about that boundary
//! is concentrated in [`parse_model_response`] so it can be tested without a
//! model server.

use crate::error::{Error, Result};
use serde::Deserialize;

/// The semantic keys recognized in a model response, in the priority order
/// used when assembling a filename.
pub const COMPONENT_KEYS: [&str; 6] = [
    "company",
    "brand",
    "project",
    "subject",
    "type",
    "description",
];

/// Named components extracted from a file's content by the model.
///
/// Each field is optional; the literal string `"null"` (any casing) is the
/// model's way of saying a component is absent and is treated as such by
/// consumers. A fresh value is produced per file and consumed once by the
/// formatter; components are never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilenameComponents {
    /// Issuing or owning company.
    #[serde(default)]
    pub company: Option<String>,

    /// Product or brand name.
    #[serde(default)]
    pub brand: Option<String>,

    /// Project the file belongs to.
    #[serde(default)]
    pub project: Option<String>,

    /// Topic or subject matter.
    #[serde(default)]
    pub subject: Option<String>,

    /// Document type (invoice, report, contract, ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Free-form short description.
    #[serde(default)]
    pub description: Option<String>,
}

impl FilenameComponents {
    /// Returns the component values in priority order, paired with their key.
    ///
    /// Absent fields are included as `None` so callers can account for every
    /// key; filtering of `"null"` markers and empty strings is left to the
    /// consumer.
    #[must_use]
    pub fn in_priority_order(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("company", self.company.as_deref()),
            ("brand", self.brand.as_deref()),
            ("project", self.project.as_deref()),
            ("subject", self.subject.as_deref()),
            ("type", self.kind.as_deref()),
            ("description", self.description.as_deref()),
        ]
    }

    /// Returns true if no component carries a usable value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_priority_order()
            .iter()
            .all(|(_, v)| v.is_none_or(|v| v.trim().is_empty() || is_null_marker(v)))
    }
}

/// Returns true if a value is the model's literal `"null"` marker.
#[must_use]
pub fn is_null_marker(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("null")
}

/// Parses a raw model reply into [`FilenameComponents`].
///
/// Normalization happens in one place: known markdown fence markers are
/// stripped, the remainder is trimmed, then parsed as JSON. Unknown keys are
/// ignored; JSON `null` and missing keys both map to `None`.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] when the normalized text is not a
/// JSON object of string values. This is a per-file recoverable condition,
/// never fatal to a run.
pub fn parse_model_response(raw: &str) -> Result<FilenameComponents> {
    let cleaned = strip_code_fences(raw);

    if cleaned.is_empty() {
        return Err(Error::malformed_response("model returned an empty reply"));
    }

    serde_json::from_str(cleaned).map_err(|e| {
        Error::malformed_response(format!(
            "expected a JSON object of components: {e} (reply was: {})",
            preview(cleaned)
        ))
    })
}

/// Strips surrounding markdown code-fence markers from a model reply.
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    }
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Truncated reply text for error messages.
fn preview(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}...")
    }
}
