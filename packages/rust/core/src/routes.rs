//! Static route enumeration.
//!
//! The set of pre-rendered pages is exactly the set of catalog steps: one
//! route per step id, no more, no fewer.

use serde::{Deserialize, Serialize};

use ragwalk_shared::{Locale, StepId};

use crate::catalog::StepCatalog;

/// Route parameters for one statically generated step page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    pub step_id: StepId,
}

/// Every routable step, in catalog order.
pub fn enumerate_routes(catalog: &StepCatalog) -> Vec<RouteParams> {
    catalog
        .all_step_ids()
        .into_iter()
        .map(|step_id| RouteParams { step_id })
        .collect()
}

/// Presentation path of a step page (`/de/steps/3`).
pub fn route_path(locale: &Locale, step: StepId) -> String {
    format!("/{locale}/steps/{step}")
}
