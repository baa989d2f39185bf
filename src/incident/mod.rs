//! Incident lifecycle: selection of the active incident, message templates,
//! and the per-component manager driving the status page.

pub mod manager;
pub mod message;
pub mod selector;

pub use manager::{IncidentManager, DEFAULT_ACK_MESSAGE, RESOLVED_MESSAGE};
pub use message::{render_incident_message, render_incident_title};
pub use selector::{latest_active_incidents, select_active_incident};
