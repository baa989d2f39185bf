//! CLI command implementations.

use anyhow::Result;

use crate::config::Settings;
use crate::models::ComponentStatus;

use super::utils::connect;

/// Open an incident for a component
pub async fn create(
    settings: &Settings,
    component_id: u64,
    severity: ComponentStatus,
    subcomponent_name: String,
    subcomponent_group: Option<String>,
) -> Result<()> {
    let manager = connect(settings, component_id).await?;
    let incident = manager
        .create_incident(severity, &subcomponent_name, subcomponent_group.as_deref())
        .await?;

    println!(
        "✓ Created incident #{} on component {} ({})",
        incident.id, component_id, severity
    );
    Ok(())
}

/// Acknowledge the active incident of a component
pub async fn ack(
    settings: &Settings,
    component_id: u64,
    update_message: Option<String>,
) -> Result<()> {
    let manager = connect(settings, component_id).await?;
    let update = manager
        .acknowledge_incident(update_message.as_deref())
        .await?;

    println!(
        "✓ Incident #{} on component {} marked as {}",
        update.incident_id, component_id, update.status
    );
    Ok(())
}

/// Resolve the active incident and restore the component
pub async fn resolve(settings: &Settings, component_id: u64) -> Result<()> {
    let manager = connect(settings, component_id).await?;
    let update = manager.resolve_incident().await?;

    println!(
        "✓ Incident #{} resolved, component {} is operational",
        update.incident_id, component_id
    );
    Ok(())
}
