//! Core domain types for ragwalk step pages.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RagwalkError, Result};

/// Text substituted for optional content fields a locale does not provide.
///
/// Locale-neutral: the same string is used whatever store was read.
pub const PLACEHOLDER_TEXT: &str = "content not available";

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// A syntactically valid locale code (`en`, `de`, `pt-BR`).
///
/// Membership in the supported set is the locale registry's concern; this
/// type only guarantees the code is well formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Parse a locale code, rejecting anything that is not `xx`, `xxx`,
    /// `xx-YY` or `xxx-YY`.
    pub fn parse(code: &str) -> Result<Self> {
        static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[a-z]{2,3}(-[A-Z]{2})?$").expect("valid regex")
        });

        if CODE_RE.is_match(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(RagwalkError::validation(format!(
                "malformed locale code '{code}'"
            )))
        }
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Locale {
    type Err = RagwalkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = RagwalkError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

// ---------------------------------------------------------------------------
// StepId
// ---------------------------------------------------------------------------

/// Ordinal step identifier (1-based). Orders numerically.
///
/// On the wire and in content stores it is the canonical decimal string:
/// `"3"` parses, `"03"`, `"+3"`, `" 3"` and `"0"` do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StepId(u32);

impl StepId {
    /// Create a step id from its ordinal. Returns `None` for zero.
    pub fn new(ordinal: u32) -> Option<Self> {
        (ordinal > 0).then_some(Self(ordinal))
    }

    /// The numeric ordinal.
    pub fn ordinal(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StepId {
    type Err = RagwalkError;

    fn from_str(s: &str) -> Result<Self> {
        let canonical = !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && !s.starts_with('0');
        if !canonical {
            return Err(RagwalkError::validation(format!("invalid step id '{s}'")));
        }

        s.parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| RagwalkError::validation(format!("step id '{s}' out of range")))
    }
}

impl TryFrom<String> for StepId {
    type Error = RagwalkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<StepId> for String {
    fn from(id: StepId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// DemoHandle
// ---------------------------------------------------------------------------

/// Opaque reference to the interactive demo for one step.
///
/// The core never constructs demos; the presentation layer resolves the key
/// to a widget when it renders the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemoHandle(String);

impl DemoHandle {
    /// Wrap a demo key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key the presentation layer resolves.
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DemoHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Step content and assembled records
// ---------------------------------------------------------------------------

/// Normalized, localized text for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepContent {
    /// Step title (always present).
    pub title: String,
    /// Short description (always present).
    pub description: String,
    /// What the stage does, or [`PLACEHOLDER_TEXT`].
    pub what_it_does: String,
    /// Why the stage matters, or [`PLACEHOLDER_TEXT`].
    pub why_it_matters: String,
    /// Known challenges, in store order. Empty when absent.
    pub challenges: Vec<String>,
}

/// A step joined with its content and demo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStep {
    pub id: StepId,
    pub content: StepContent,
    pub demo: DemoHandle,
}

/// Previous/next neighbors of a step in catalog order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationContext {
    /// Preceding step, `None` on the first step.
    pub previous: Option<StepId>,
    /// Following step, `None` on the last step.
    pub next: Option<StepId>,
}
