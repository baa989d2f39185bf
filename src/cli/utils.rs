//! CLI utility functions.

use anyhow::Result;
use tracing::debug;

use crate::client::CachetClient;
use crate::config::{Settings, SettingsSource};
use crate::incident::IncidentManager;

/// Load and validate settings from the resolved configuration file
pub fn load_settings(source: &SettingsSource) -> Result<Settings> {
    let settings = Settings::load(source)?;
    debug!("Using Cachet endpoint {}", settings.endpoint);
    Ok(settings)
}

/// Build the HTTP client and bind an incident manager to the component
pub async fn connect(
    settings: &Settings,
    component_id: u64,
) -> Result<IncidentManager<CachetClient>> {
    let client = CachetClient::new(settings)?;
    let manager = IncidentManager::connect(client, component_id, settings).await?;
    Ok(manager)
}
