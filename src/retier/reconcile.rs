//! Reconciliation of renamed or merged panels.
//!
//! Panels applied when the variants were originally tiered can carry
//! different catalog identifiers today.  Old names live on in the
//! `relevant_disorders` listing of their successor panels, which is what
//! the reconciliation searches.

use std::collections::BTreeSet;

use crate::case::Case;
use crate::panelapp::PanelProvider;

/// Resolve replacement identifiers for panels referenced by report events
/// but missing from the case's panel mapping.
///
/// The catalog is enumerated in serving order and the first panel whose
/// `relevant_disorders` contain a missing name wins.  Entries already
/// keyed in the case's panel mapping are never touched.
///
/// # Errors
///
/// If the provider fails while listing the catalog or fetching a
/// replacement panel.
pub fn reconcile(provider: &dyn PanelProvider, case: &mut Case) -> Result<(), anyhow::Error> {
    let missing = missing_event_panels(case);
    if missing.is_empty() {
        return Ok(());
    }
    tracing::info!(
        "searching the panel catalog for {} renamed or merged panels",
        missing.len()
    );

    let mut additions: Vec<(String, i64)> = Vec::new();
    for catalog_panel in provider.list_panels()? {
        for name in &missing {
            let already_matched = additions.iter().any(|(n, _)| n == name);
            if !already_matched
                && catalog_panel
                    .relevant_disorders
                    .iter()
                    .any(|disorder| disorder == name)
            {
                additions.push((name.clone(), catalog_panel.id));
            }
        }
    }

    for (name, id) in additions {
        tracing::info!("panel {:?} is now served under identifier {}", &name, id);
        case.update_panel(provider, &name, id)?;
    }
    Ok(())
}

/// Panel names referenced by report events but absent from the case's
/// panel mapping.
fn missing_event_panels(case: &Case) -> BTreeSet<String> {
    case.event_panel_names()
        .filter(|name| !case.panels.contains_key(*name))
        .map(str::to_string)
        .collect()
}
