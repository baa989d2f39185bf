// Public exports for data models

pub mod component;
pub mod incident;
mod wire;

pub use component::{Component, ComponentGroup, ComponentStatus};
pub use incident::{Incident, IncidentStatus, IncidentUpdate, NewIncident};
