//! Status page client
//!
//! `StatusPage` is the remote contract the incident manager depends on.
//! `CachetClient` implements it over the Cachet v1 REST API.

pub mod cachet;

use async_trait::async_trait;

use crate::models::{
    Component, ComponentGroup, ComponentStatus, Incident, IncidentStatus, IncidentUpdate,
    NewIncident,
};
use crate::BridgeResult;

pub use cachet::CachetClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusPage: Send + Sync {
    /// `Ok(false)` when the server answers but does not report itself healthy
    async fn ping(&self) -> BridgeResult<bool>;

    async fn get_component(&self, component_id: u64) -> BridgeResult<Component>;

    async fn update_component_status(
        &self,
        component_id: u64,
        status: ComponentStatus,
    ) -> BridgeResult<Component>;

    async fn get_component_group(&self, group_id: u64) -> BridgeResult<ComponentGroup>;

    /// Every incident on the status page, across all result pages
    async fn list_incidents(&self) -> BridgeResult<Vec<Incident>>;

    async fn create_incident(&self, incident: &NewIncident) -> BridgeResult<Incident>;

    async fn create_incident_update(
        &self,
        incident_id: u64,
        status: IncidentStatus,
        message: &str,
    ) -> BridgeResult<IncidentUpdate>;
}
