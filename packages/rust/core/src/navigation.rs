//! Previous/next resolution over catalog order.
//!
//! Linear and non-cyclic: the first step has no previous, the last has no
//! next.

use ragwalk_shared::NavigationContext;

use crate::catalog::CatalogStep;

/// Neighbors of a catalog step.
///
/// Takes a [`CatalogStep`] rather than a raw id, so an unknown step cannot
/// reach this function.
pub fn neighbors(step: CatalogStep<'_>) -> NavigationContext {
    NavigationContext {
        previous: step.previous().map(|s| s.id()),
        next: step.next().map(|s| s.id()),
    }
}

#[cfg(test)]
mod tests {
    use ragwalk_shared::StepId;

    use super::*;
    use crate::catalog::{BuiltinDemos, ConfiguredDemos, StepCatalog};

    fn id(n: u32) -> StepId {
        StepId::new(n).unwrap()
    }

    fn nav_of(catalog: &StepCatalog, n: u32) -> NavigationContext {
        neighbors(catalog.get(id(n)).unwrap())
    }

    #[test]
    fn boundaries_and_middle() {
        let catalog = StepCatalog::from_registry(&BuiltinDemos).unwrap();

        assert_eq!(
            nav_of(&catalog, 1),
            NavigationContext {
                previous: None,
                next: Some(id(2))
            }
        );
        assert_eq!(
            nav_of(&catalog, 15),
            NavigationContext {
                previous: Some(id(14)),
                next: None
            }
        );
        assert_eq!(
            nav_of(&catalog, 8),
            NavigationContext {
                previous: Some(id(7)),
                next: Some(id(9))
            }
        );
    }

    #[test]
    fn neighbors_match_catalog_order_for_every_step() {
        let catalog = StepCatalog::from_registry(&BuiltinDemos).unwrap();
        let ids = catalog.all_step_ids();

        for (i, step) in catalog.steps().enumerate() {
            let nav = neighbors(step);
            assert_eq!(nav.previous, i.checked_sub(1).map(|p| ids[p]));
            assert_eq!(nav.next, ids.get(i + 1).copied());
        }
    }

    #[test]
    fn numeric_not_lexical_order() {
        let keys = (1..=12).map(|n| format!("demo-{n}")).collect();
        let catalog = StepCatalog::from_registry(&ConfiguredDemos(keys)).unwrap();
        assert_eq!(nav_of(&catalog, 9).next, Some(id(10)));
        assert_eq!(nav_of(&catalog, 10).previous, Some(id(9)));
    }

    #[test]
    fn single_step_has_no_neighbors() {
        let catalog = StepCatalog::from_registry(&ConfiguredDemos(vec!["solo".into()])).unwrap();
        assert_eq!(nav_of(&catalog, 1), NavigationContext::default());
    }
}
