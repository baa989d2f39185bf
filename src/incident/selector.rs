//! Active-incident selection

use crate::models::Incident;

/// Open incidents of `component_id` sharing the newest `created_at`, in input
/// order. Several entries are returned only on a timestamp collision; the
/// result is empty when the component has nothing open.
pub fn latest_active_incidents(incidents: &[Incident], component_id: u64) -> Vec<&Incident> {
    let active: Vec<&Incident> = incidents
        .iter()
        .filter(|incident| incident.belongs_to(component_id) && incident.is_active())
        .collect();

    let Some(newest) = active.iter().map(|incident| incident.created_at).max() else {
        return Vec::new();
    };

    active
        .into_iter()
        .filter(|incident| incident.created_at == newest)
        .collect()
}

/// The incident lifecycle operations act on: the first of the newest open
/// incidents in input order.
pub fn select_active_incident(incidents: &[Incident], component_id: u64) -> Option<&Incident> {
    latest_active_incidents(incidents, component_id)
        .into_iter()
        .next()
}
