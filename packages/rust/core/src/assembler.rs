//! Page assembler.
//!
//! The single entry point for rendering a step: joins catalog membership,
//! localized content, the demo handle and navigation into a [`StepPage`].
//! Every failure collapses to not-found; the reason is only logged.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use ragwalk_shared::{Locale, NavigationContext, ResolvedStep, Result, SiteConfig};

use crate::catalog::StepCatalog;
use crate::content::ContentLoader;
use crate::navigation;
use crate::routes::route_path;

/// Payload handed to the presentation layer for one step page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPage {
    /// Locale the content was loaded for.
    pub locale: Locale,
    pub step: ResolvedStep,
    pub navigation: NavigationContext,
    /// Rendered paths for `navigation`, same locale.
    pub links: NavLinks,
}

/// Previous/next links, `None` at the sequence boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLinks {
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// Payload for the generic not-found page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundPage {
    pub status: u16,
    pub message: String,
}

impl Default for NotFoundPage {
    fn default() -> Self {
        Self {
            status: 404,
            message: "not found".into(),
        }
    }
}

/// Resolves step ids to [`StepPage`]s.
///
/// Stateless apart from the shared read-only catalog, so one assembler can
/// serve any number of concurrent builds.
#[derive(Debug, Clone)]
pub struct PageAssembler {
    catalog: Arc<StepCatalog>,
    loader: ContentLoader,
}

impl PageAssembler {
    pub fn new(catalog: Arc<StepCatalog>, loader: ContentLoader) -> Self {
        Self { catalog, loader }
    }

    /// Build from the `[site]` section; relative content dirs resolve
    /// against `base_dir`.
    pub fn from_config(site: &SiteConfig, base_dir: &Path) -> Result<Self> {
        let catalog = StepCatalog::from_config(site)?;
        let loader = ContentLoader::new(base_dir.join(&site.content_dir));
        Ok(Self::new(Arc::new(catalog), loader))
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn loader(&self) -> &ContentLoader {
        &self.loader
    }

    /// Assemble the page for a raw step id in `locale`.
    ///
    /// Returns `None` (not found) for an unparseable or unknown id and for
    /// any content load failure.
    #[instrument(skip_all, fields(step_id = %step_id, locale = %locale))]
    pub fn assemble(&self, step_id: &str, locale: &Locale) -> Option<StepPage> {
        let Some(step) = self.catalog.lookup(step_id) else {
            debug!(step_id, "unknown step id");
            return None;
        };

        let content = match self.loader.load(step.id(), locale) {
            Ok(content) => content,
            Err(failure) => {
                debug!(reason = %failure.reason, "step resolves to not found");
                return None;
            }
        };

        let navigation = navigation::neighbors(step);
        let links = NavLinks {
            previous: navigation.previous.map(|id| route_path(locale, id)),
            next: navigation.next.map(|id| route_path(locale, id)),
        };

        Some(StepPage {
            locale: locale.clone(),
            step: ResolvedStep {
                id: step.id(),
                content,
                demo: step.demo().clone(),
            },
            navigation,
            links,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ragwalk_shared::{PLACEHOLDER_TEXT, StepId};

    use super::*;
    use crate::catalog::BuiltinDemos;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ragwalk-assembler-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn locale(code: &str) -> Locale {
        Locale::parse(code).unwrap()
    }

    /// English store covering all fifteen steps; German store with partial
    /// translations.
    fn make_assembler(dir: &Path) -> PageAssembler {
        let en_steps: serde_json::Map<String, serde_json::Value> = (1..=15)
            .map(|n| {
                (
                    n.to_string(),
                    serde_json::json!({
                        "title": format!("Step {n}"),
                        "description": format!("About step {n}"),
                        "whatItDoes": "Does things",
                        "whyItMatters": "Matters",
                        "challenges": ["One", "Two"],
                    }),
                )
            })
            .collect();
        std::fs::write(
            dir.join("en.json"),
            serde_json::to_string(&serde_json::json!({ "steps": en_steps })).unwrap(),
        )
        .unwrap();

        std::fs::write(
            dir.join("de.json"),
            r#"{"steps": {
                "3": {"title": "Aufteilen", "description": "Dokumente zerlegen"},
                "4": {"description": "Ohne Titel"}
            }}"#,
        )
        .unwrap();

        let catalog = StepCatalog::from_registry(&BuiltinDemos).unwrap();
        PageAssembler::new(Arc::new(catalog), ContentLoader::new(dir))
    }

    #[test]
    fn assemble_full_page() {
        let tmp = temp_dir();
        let assembler = make_assembler(&tmp);

        let page = assembler.assemble("8", &locale("en")).unwrap();
        assert_eq!(page.step.id, StepId::new(8).unwrap());
        assert_eq!(page.step.content.title, "Step 8");
        assert_eq!(page.step.demo.key(), "query-input");
        assert_eq!(page.navigation.previous, StepId::new(7));
        assert_eq!(page.navigation.next, StepId::new(9));
        assert_eq!(page.links.previous.as_deref(), Some("/en/steps/7"));
        assert_eq!(page.links.next.as_deref(), Some("/en/steps/9"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn partial_translation_uses_placeholders() {
        let tmp = temp_dir();
        let assembler = make_assembler(&tmp);

        let page = assembler.assemble("3", &locale("de")).unwrap();
        assert_eq!(page.step.content.title, "Aufteilen");
        assert_eq!(page.step.content.what_it_does, PLACEHOLDER_TEXT);
        assert!(page.step.content.challenges.is_empty());
        assert_eq!(page.links.next.as_deref(), Some("/de/steps/4"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_title_is_not_found() {
        let tmp = temp_dir();
        let assembler = make_assembler(&tmp);

        assert!(assembler.assemble("4", &locale("de")).is_none());
        assert!(assembler.assemble("5", &locale("de")).is_none());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unknown_or_malformed_ids_are_not_found() {
        let tmp = temp_dir();
        let assembler = make_assembler(&tmp);

        for raw in ["16", "0", "03", "", "abc", "-1"] {
            assert!(assembler.assemble(raw, &locale("en")).is_none(), "{raw:?}");
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_store_is_not_found() {
        let tmp = temp_dir();
        let assembler = make_assembler(&tmp);

        assert!(assembler.assemble("1", &locale("fr")).is_none());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn assemble_is_repeatable() {
        let tmp = temp_dir();
        let assembler = make_assembler(&tmp);

        let first = assembler.assemble("1", &locale("en")).unwrap();
        let second = assembler.assemble("1", &locale("en")).unwrap();
        assert_eq!(
            serde_json::to_vec(&first.step.content).unwrap(),
            serde_json::to_vec(&second.step.content).unwrap()
        );
        assert!(first.navigation.previous.is_none());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn from_config_resolves_content_dir() {
        let tmp = temp_dir();
        let site = SiteConfig {
            content_dir: "content".into(),
            ..SiteConfig::default()
        };

        let assembler = PageAssembler::from_config(&site, &tmp).unwrap();
        assert_eq!(assembler.loader().content_dir(), tmp.join("content"));
        assert_eq!(assembler.catalog().len(), 15);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    // Fixture tests -----------------------------------------------------------

    fn fixture_assembler() -> PageAssembler {
        let catalog = StepCatalog::from_registry(&BuiltinDemos).unwrap();
        PageAssembler::new(Arc::new(catalog), ContentLoader::new("../../../fixtures/content"))
    }

    #[test]
    fn fixture_english_covers_every_step() {
        let assembler = fixture_assembler();
        let en = locale("en");

        for id in assembler.catalog().all_step_ids() {
            let page = assembler
                .assemble(&id.to_string(), &en)
                .unwrap_or_else(|| panic!("step {id} missing from en fixture"));
            assert_ne!(page.step.content.what_it_does, PLACEHOLDER_TEXT);
            assert!(!page.step.content.challenges.is_empty());
        }
        assert!(assembler.assemble("16", &en).is_none());
    }

    #[test]
    fn fixture_german_step_three_is_partial() {
        let assembler = fixture_assembler();

        let page = assembler.assemble("3", &locale("de")).unwrap();
        assert_eq!(page.step.content.title, "Aufteilen in Abschnitte");
        assert_eq!(page.step.content.what_it_does, PLACEHOLDER_TEXT);
        assert_eq!(page.step.content.why_it_matters, PLACEHOLDER_TEXT);
        assert!(page.step.content.challenges.is_empty());
        assert_eq!(page.step.demo.key(), "chunking");
    }
}
