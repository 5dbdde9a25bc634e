//! Per-locale content stores.
//!
//! Each locale has one JSON document under the content directory:
//!
//! ```text
//! content/
//! ├── en.json   {"steps": {"1": {"title": ..., "description": ...}, ...}}
//! └── de.json
//! ```
//!
//! Required fields (`title`, `description`) must be present and non-blank.
//! Optional fields fall back to [`PLACEHOLDER_TEXT`] or an empty list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use ragwalk_shared::{Locale, PLACEHOLDER_TEXT, StepContent, StepId};

/// Why a step could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadFailureReason {
    /// The locale's store could not be read or parsed.
    #[error("content store unavailable: {detail}")]
    StoreUnavailable { detail: String },

    /// The store has no usable entry for the step.
    #[error("step not in locale{}", missing_suffix(.missing_field))]
    StepNotInLocale { missing_field: Option<&'static str> },
}

/// A failed [`ContentLoader::load`]. Deterministic for the same inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot load step {step} for locale {locale}: {reason}")]
pub struct LoadFailure {
    pub step: StepId,
    pub locale: Locale,
    pub reason: LoadFailureReason,
}

/// On-disk shape of a content store. Other top-level keys are ignored.
#[derive(Debug, Deserialize)]
struct ContentStore {
    steps: HashMap<String, Value>,
}

/// Reads step content from `<content_dir>/<locale>.json`. Read-only, no cache.
#[derive(Debug, Clone)]
pub struct ContentLoader {
    content_dir: PathBuf,
}

impl ContentLoader {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Path of the content store for `locale`.
    pub fn store_path(&self, locale: &Locale) -> PathBuf {
        self.content_dir.join(format!("{locale}.json"))
    }

    /// Load and normalize one step's content.
    ///
    /// No retry: a failure is logged and returned to the caller as is.
    #[instrument(skip_all, fields(step = %step, locale = %locale))]
    pub fn load(&self, step: StepId, locale: &Locale) -> Result<StepContent, LoadFailure> {
        let result = self
            .read_store(locale)
            .and_then(|store| {
                store
                    .steps
                    .get(&step.to_string())
                    .ok_or(LoadFailureReason::StepNotInLocale {
                        missing_field: None,
                    })
                    .and_then(normalize)
            });

        match result {
            Ok(content) => {
                debug!(title = %content.title, challenges = content.challenges.len(), "step content loaded");
                Ok(content)
            }
            Err(reason) => {
                warn!(%reason, "step content unavailable");
                Err(LoadFailure {
                    step,
                    locale: locale.clone(),
                    reason,
                })
            }
        }
    }

    fn read_store(&self, locale: &Locale) -> Result<ContentStore, LoadFailureReason> {
        let path = self.store_path(locale);

        let raw = std::fs::read_to_string(&path).map_err(|e| LoadFailureReason::StoreUnavailable {
            detail: format!("{}: {e}", path.display()),
        })?;

        serde_json::from_str(&raw).map_err(|e| LoadFailureReason::StoreUnavailable {
            detail: format!("{}: {e}", path.display()),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Turn one raw store entry into [`StepContent`].
fn normalize(entry: &Value) -> Result<StepContent, LoadFailureReason> {
    let Some(fields) = entry.as_object() else {
        return Err(LoadFailureReason::StepNotInLocale {
            missing_field: None,
        });
    };

    Ok(StepContent {
        title: required(fields, "title")?,
        description: required(fields, "description")?,
        what_it_does: optional_text(fields, "whatItDoes"),
        why_it_matters: optional_text(fields, "whyItMatters"),
        challenges: challenges(fields),
    })
}

/// Required text: copied verbatim, never synthesized.
fn required(fields: &Map<String, Value>, key: &'static str) -> Result<String, LoadFailureReason> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or(LoadFailureReason::StepNotInLocale {
            missing_field: Some(key),
        })
}

fn optional_text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => PLACEHOLDER_TEXT.to_string(),
        Some(other) => {
            debug!(key, kind = value_kind(other), "non-text optional field, using placeholder");
            PLACEHOLDER_TEXT.to_string()
        }
    }
}

/// `challenges` as a list of strings; anything else becomes empty.
fn challenges(fields: &Map<String, Value>) -> Vec<String> {
    let Some(items) = fields.get("challenges").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_else(|| {
            debug!("challenges contains non-text items, using empty list");
            Vec::new()
        })
}

fn missing_suffix(field: &Option<&'static str>) -> String {
    field.map(|f| format!(" (missing {f})")).unwrap_or_default()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
