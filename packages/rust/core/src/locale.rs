//! Locale registry.
//!
//! Holds the supported locale codes in declaration order and the default.
//! A process-wide registry is installed once at startup and read without
//! synchronization afterwards.

use std::sync::OnceLock;

use tracing::debug;

use ragwalk_shared::{Locale, RagwalkError, Result, SiteConfig};

/// Supported locales plus the default. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
    default: usize,
}

impl LocaleRegistry {
    /// Build a registry from locale codes and the default code.
    ///
    /// Rejects an empty set, malformed or duplicate codes, and a default that
    /// is not one of the supported codes.
    pub fn new<S: AsRef<str>>(codes: &[S], default: &str) -> Result<Self> {
        if codes.is_empty() {
            return Err(RagwalkError::validation("at least one locale is required"));
        }

        let mut locales: Vec<Locale> = Vec::with_capacity(codes.len());
        for code in codes {
            let locale = Locale::parse(code.as_ref())?;
            if locales.contains(&locale) {
                return Err(RagwalkError::validation(format!(
                    "duplicate locale '{locale}'"
                )));
            }
            locales.push(locale);
        }

        let default = locales
            .iter()
            .position(|l| l.as_str() == default)
            .ok_or_else(|| {
                RagwalkError::validation(format!(
                    "default locale '{default}' is not in the supported set"
                ))
            })?;

        Ok(Self { locales, default })
    }

    /// Build a registry from the `[site]` config section.
    pub fn from_config(site: &SiteConfig) -> Result<Self> {
        Self::new(&site.locales, &site.default_locale)
    }

    /// Map an arbitrary path segment to a supported locale.
    ///
    /// Exact matches only; anything else (empty, malformed, unsupported,
    /// different case) yields the default. Never fails.
    pub fn resolve(&self, candidate: &str) -> &Locale {
        match self.locales.iter().find(|l| l.as_str() == candidate) {
            Some(locale) => locale,
            None => {
                debug!(candidate, default = %self.default_locale(), "falling back to default locale");
                self.default_locale()
            }
        }
    }

    /// Supported locales in declaration order.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn default_locale(&self) -> &Locale {
        &self.locales[self.default]
    }

    /// Whether `candidate` is exactly a supported code.
    pub fn contains(&self, candidate: &str) -> bool {
        self.locales.iter().any(|l| l.as_str() == candidate)
    }

    /// Toggle target for a language switcher: the first supported locale
    /// that is not `current`.
    ///
    /// With more than two locales this picks the first other one in
    /// declaration order. With a single locale it returns that locale.
    pub fn other(&self, current: &Locale) -> &Locale {
        self.locales
            .iter()
            .find(|l| *l != current)
            .unwrap_or_else(|| self.default_locale())
    }
}

impl Default for LocaleRegistry {
    /// English default plus German.
    fn default() -> Self {
        Self::from_config(&SiteConfig::default()).expect("built-in locale table is valid")
    }
}

// ---------------------------------------------------------------------------
// Process-wide registry
// ---------------------------------------------------------------------------

static GLOBAL: OnceLock<LocaleRegistry> = OnceLock::new();

/// Install the process-wide registry. Must happen before first [`global`] read.
pub fn install(registry: LocaleRegistry) -> Result<&'static LocaleRegistry> {
    GLOBAL
        .set(registry)
        .map_err(|_| RagwalkError::config("locale registry already initialized"))?;
    Ok(global())
}

/// The process-wide registry; the built-in default if none was installed.
pub fn global() -> &'static LocaleRegistry {
    GLOBAL.get_or_init(LocaleRegistry::default)
}
