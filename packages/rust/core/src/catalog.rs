//! Step catalog.
//!
//! The single source of truth for which steps exist, their order, and the
//! demo assigned to each. Built once from a [`DemoRegistry`]; step ids are
//! assigned by position, so the catalog is always `1..=N` with no gaps.

use std::collections::HashSet;

use tracing::debug;

use ragwalk_shared::{DemoHandle, RagwalkError, Result, SiteConfig, StepId};

/// Demo keys for the built-in RAG walkthrough, in teaching order.
pub const BUILTIN_DEMO_KEYS: &[&str] = &[
    "document-loading",
    "text-cleaning",
    "chunking",
    "tokenization",
    "embedding",
    "vector-store",
    "indexing",
    "query-input",
    "query-embedding",
    "similarity-search",
    "reranking",
    "context-assembly",
    "prompt-construction",
    "generation",
    "evaluation",
];

/// Source of the step → demo table.
///
/// Implementations list one demo key per step in pedagogical order; the key
/// at position `i` belongs to step `i + 1`.
pub trait DemoRegistry: Send + Sync {
    fn demo_keys(&self) -> Vec<String>;
}

/// The fifteen-stage RAG walkthrough.
pub struct BuiltinDemos;

impl DemoRegistry for BuiltinDemos {
    fn demo_keys(&self) -> Vec<String> {
        BUILTIN_DEMO_KEYS.iter().map(|k| (*k).to_string()).collect()
    }
}

/// An explicit demo table, typically from `[site] demos` in the config.
pub struct ConfiguredDemos(pub Vec<String>);

impl DemoRegistry for ConfiguredDemos {
    fn demo_keys(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Ordered, immutable step → demo mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCatalog {
    entries: Vec<(StepId, DemoHandle)>,
}

impl StepCatalog {
    /// Build the catalog from a demo registry.
    ///
    /// Fails on an empty registry, a blank key, or a key used twice.
    pub fn from_registry(registry: &dyn DemoRegistry) -> Result<Self> {
        let keys = registry.demo_keys();
        if keys.is_empty() {
            return Err(RagwalkError::validation("demo registry lists no steps"));
        }

        let mut seen = HashSet::with_capacity(keys.len());
        let mut entries = Vec::with_capacity(keys.len());

        for (index, key) in keys.into_iter().enumerate() {
            let key = key.trim().to_string();
            if key.is_empty() {
                return Err(RagwalkError::validation(format!(
                    "demo key for step {} is blank",
                    index + 1
                )));
            }
            if !seen.insert(key.clone()) {
                return Err(RagwalkError::validation(format!(
                    "demo '{key}' is assigned to more than one step"
                )));
            }

            let id = u32::try_from(index + 1)
                .ok()
                .and_then(StepId::new)
                .ok_or_else(|| RagwalkError::validation("too many steps"))?;
            entries.push((id, DemoHandle::new(key)));
        }

        debug!(steps = entries.len(), "step catalog built");
        Ok(Self { entries })
    }

    /// Build from `[site] demos`, or the built-in table when that list is empty.
    pub fn from_config(site: &SiteConfig) -> Result<Self> {
        if site.demos.is_empty() {
            Self::from_registry(&BuiltinDemos)
        } else {
            Self::from_registry(&ConfiguredDemos(site.demos.clone()))
        }
    }

    /// All step ids in catalog order.
    pub fn all_step_ids(&self) -> Vec<StepId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    /// The demo assigned to `id`, if the step exists.
    pub fn demo_for(&self, id: StepId) -> Option<&DemoHandle> {
        self.get(id).map(|step| step.demo())
    }

    /// Look up a step, returning a membership token.
    pub fn get(&self, id: StepId) -> Option<CatalogStep<'_>> {
        let index = id.ordinal().checked_sub(1)? as usize;
        self.entries.get(index).map(|_| CatalogStep {
            catalog: self,
            index,
        })
    }

    /// Look up a step by its raw route segment.
    pub fn lookup(&self, raw: &str) -> Option<CatalogStep<'_>> {
        raw.parse::<StepId>().ok().and_then(|id| self.get(id))
    }

    /// Iterate steps in catalog order.
    pub fn steps(&self) -> impl Iterator<Item = CatalogStep<'_>> {
        (0..self.entries.len()).map(move |index| CatalogStep {
            catalog: self,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A step known to be in a [`StepCatalog`].
///
/// Only the catalog hands these out, so holding one proves membership.
#[derive(Debug, Clone, Copy)]
pub struct CatalogStep<'a> {
    catalog: &'a StepCatalog,
    index: usize,
}

impl<'a> CatalogStep<'a> {
    pub fn id(&self) -> StepId {
        self.catalog.entries[self.index].0
    }

    pub fn demo(&self) -> &'a DemoHandle {
        &self.catalog.entries[self.index].1
    }

    /// Zero-based position in catalog order.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn previous(&self) -> Option<CatalogStep<'a>> {
        self.index.checked_sub(1).map(|index| CatalogStep {
            catalog: self.catalog,
            index,
        })
    }

    pub fn next(&self) -> Option<CatalogStep<'a>> {
        let index = self.index + 1;
        (index < self.catalog.entries.len()).then_some(CatalogStep {
            catalog: self.catalog,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> StepId {
        StepId::new(n).unwrap()
    }

    #[test]
    fn builtin_catalog_is_contiguous() {
        let catalog = StepCatalog::from_registry(&BuiltinDemos).unwrap();
        assert_eq!(catalog.len(), 15);

        let ordinals: Vec<u32> = catalog.all_step_ids().iter().map(|id| id.ordinal()).collect();
        assert_eq!(ordinals, (1..=15).collect::<Vec<_>>());
    }

    #[test]
    fn demo_for_known_and_unknown_steps() {
        let catalog = StepCatalog::from_registry(&BuiltinDemos).unwrap();
        assert_eq!(catalog.demo_for(id(1)).unwrap().key(), "document-loading");
        assert_eq!(catalog.demo_for(id(3)).unwrap().key(), "chunking");
        assert_eq!(catalog.demo_for(id(15)).unwrap().key(), "evaluation");
        assert!(catalog.demo_for(id(16)).is_none());
    }

    #[test]
    fn lookup_parses_route_segments() {
        let catalog = StepCatalog::from_registry(&BuiltinDemos).unwrap();
        assert_eq!(catalog.lookup("8").unwrap().id(), id(8));
        assert!(catalog.lookup("08").is_none());
        assert!(catalog.lookup("16").is_none());
        assert!(catalog.lookup("0").is_none());
        assert!(catalog.lookup("intro").is_none());
    }

    #[test]
    fn configured_demos_assign_ids_by_position() {
        let registry = ConfiguredDemos(vec!["a".into(), "b".into(), "c".into()]);
        let catalog = StepCatalog::from_registry(&registry).unwrap();
        assert_eq!(catalog.demo_for(id(2)).unwrap().key(), "b");
        assert_eq!(catalog.steps().map(|s| s.position()).collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    fn from_config_prefers_explicit_demos() {
        let mut site = SiteConfig::default();
        assert_eq!(StepCatalog::from_config(&site).unwrap().len(), 15);

        site.demos = vec!["only".into()];
        let catalog = StepCatalog::from_config(&site).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.demo_for(id(1)).unwrap().key(), "only");
    }

    #[test]
    fn rejects_empty_blank_and_duplicate_keys() {
        assert!(StepCatalog::from_registry(&ConfiguredDemos(vec![])).is_err());
        assert!(StepCatalog::from_registry(&ConfiguredDemos(vec!["a".into(), " ".into()])).is_err());

        let err = StepCatalog::from_registry(&ConfiguredDemos(vec!["a".into(), "a".into()]))
            .unwrap_err();
        assert!(err.to_string().contains("more than one step"));
    }

    #[test]
    fn get_indexes_by_ordinal() {
        let catalog = StepCatalog::from_registry(&ConfiguredDemos(vec!["a".into(), "b".into()])).unwrap();
        assert_eq!(catalog.get(id(1)).unwrap().position(), 0);
        assert_eq!(catalog.get(id(2)).unwrap().demo().key(), "b");
        assert!(catalog.get(id(3)).is_none());
        assert!(catalog.get(id(u32::MAX)).is_none());
    }

    #[test]
    fn catalog_step_walks_neighbors() {
        let catalog = StepCatalog::from_registry(&BuiltinDemos).unwrap();
        let first = catalog.get(id(1)).unwrap();
        assert!(first.previous().is_none());
        assert_eq!(first.next().unwrap().id(), id(2));

        let last = catalog.get(id(15)).unwrap();
        assert!(last.next().is_none());
        assert_eq!(last.previous().unwrap().demo().key(), "generation");
    }
}
