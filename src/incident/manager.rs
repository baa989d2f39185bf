//! Incident lifecycle for a single status page component.

use tracing::{debug, info, warn};

use super::message::{render_incident_message, render_incident_title};
use super::selector::select_active_incident;
use crate::client::StatusPage;
use crate::config::Settings;
use crate::models::{ComponentStatus, Incident, IncidentStatus, IncidentUpdate, NewIncident};
use crate::{BridgeError, BridgeResult};

pub const DEFAULT_ACK_MESSAGE: &str =
    "We have identified the issue and we are currently working on a fix";
pub const RESOLVED_MESSAGE: &str = "The issue has been resolved";

/// Creates, acknowledges and resolves the incident of one component
pub struct IncidentManager<S> {
    api: S,
    component_id: u64,
}

impl<S: StatusPage> IncidentManager<S> {
    /// Check connectivity and bind to `component_id`.
    ///
    /// A failed ping only logs a warning unless `require_ping` is set.
    pub async fn connect(api: S, component_id: u64, settings: &Settings) -> BridgeResult<Self> {
        debug!("Initializing Cachet component with ID {}", component_id);

        let reachable = match api.ping().await {
            Ok(reachable) => reachable,
            Err(err) => {
                debug!("Ping failed: {}", err);
                false
            }
        };

        if reachable {
            debug!("Cachet is up and running");
        } else if settings.require_ping {
            return Err(BridgeError::Connectivity {
                endpoint: settings.endpoint.clone(),
            });
        } else {
            warn!("Unable to connect to Cachet server at {}", settings.endpoint);
        }

        Ok(Self { api, component_id })
    }

    pub fn component_id(&self) -> u64 {
        self.component_id
    }

    /// Open an investigating incident on the component.
    ///
    /// `subcomponent_group` replaces the component group name in the title
    /// and message when given.
    pub async fn create_incident(
        &self,
        severity: ComponentStatus,
        subcomponent_name: &str,
        subcomponent_group: Option<&str>,
    ) -> BridgeResult<Incident> {
        let component = self.api.get_component(self.component_id).await?;

        let group_name = match (subcomponent_group, component.group()) {
            (Some(group), _) if !group.trim().is_empty() => {
                // group is read even when overridden
                if let Some(group_id) = component.group() {
                    self.api.get_component_group(group_id).await?;
                }
                group.to_string()
            }
            (_, Some(group_id)) => self.api.get_component_group(group_id).await?.name,
            (_, None) => {
                debug!(
                    "Component {} has no group, using its name in the incident",
                    self.component_id
                );
                component.name.clone()
            }
        };

        let incident = NewIncident::investigating(
            self.component_id,
            severity,
            render_incident_title(&group_name, subcomponent_name),
            render_incident_message(&group_name, subcomponent_name, &component.description),
        );

        let created = self.api.create_incident(&incident).await?;
        info!(
            incident_id = created.id,
            component_id = self.component_id,
            severity = %severity,
            "Created incident"
        );
        Ok(created)
    }

    /// Mark the active incident as identified.
    pub async fn acknowledge_incident(
        &self,
        update_message: Option<&str>,
    ) -> BridgeResult<IncidentUpdate> {
        let incident = self.active_incident().await?;
        let message = update_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_ACK_MESSAGE);

        let update = self
            .api
            .create_incident_update(incident.id, IncidentStatus::Identified, message)
            .await?;
        info!(
            incident_id = incident.id,
            component_id = self.component_id,
            "Acknowledged incident"
        );
        Ok(update)
    }

    /// Resolve the active incident, then set the component back to operational.
    ///
    /// The two writes are independent. When the second fails the incident
    /// stays resolved and `ComponentStatusStale` is returned.
    pub async fn resolve_incident(&self) -> BridgeResult<IncidentUpdate> {
        let incident = self.active_incident().await?;

        let update = self
            .api
            .create_incident_update(incident.id, IncidentStatus::Fixed, RESOLVED_MESSAGE)
            .await?;
        info!(
            incident_id = incident.id,
            component_id = self.component_id,
            "Resolved incident"
        );

        if let Err(err) = self
            .api
            .update_component_status(self.component_id, ComponentStatus::Operational)
            .await
        {
            warn!(
                incident_id = incident.id,
                component_id = self.component_id,
                "Component status was not restored: {}",
                err
            );
            return Err(BridgeError::ComponentStatusStale {
                incident_id: incident.id,
                component_id: self.component_id,
                reason: err.to_string(),
            });
        }

        debug!("Component {} is operational again", self.component_id);
        Ok(update)
    }

    async fn active_incident(&self) -> BridgeResult<Incident> {
        let incidents = self.api.list_incidents().await?;
        let incident = select_active_incident(&incidents, self.component_id)
            .cloned()
            .ok_or(BridgeError::NoActiveIncident {
                component_id: self.component_id,
            })?;

        debug!("Active incident for component {}: {}", self.component_id, incident);
        Ok(incident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockStatusPage;
    use crate::models::{Component, ComponentGroup};
    use chrono::NaiveDateTime;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn settings() -> Settings {
        Settings::new("https://status.example.com/api/v1", "token")
    }

    fn incident(id: u64, component_id: u64, status: IncidentStatus, created_at: &str) -> Incident {
        Incident {
            id,
            component_id: Some(component_id),
            name: format!("incident {}", id),
            status,
            created_at: NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S").unwrap(),
        }
    }

    fn update(incident_id: u64, status: IncidentStatus, message: &str) -> IncidentUpdate {
        IncidentUpdate {
            id: 100 + incident_id,
            incident_id,
            status,
            message: message.to_string(),
        }
    }

    fn component(group_id: Option<u64>) -> Component {
        Component {
            id: 3,
            name: "db-primary".to_string(),
            description: "US-East Cluster".to_string(),
            group_id,
            status: ComponentStatus::Operational,
        }
    }

    fn reachable_api() -> MockStatusPage {
        let mut api = MockStatusPage::new();
        api.expect_ping().times(1).returning(|| Ok(true));
        api
    }

    #[tokio::test]
    async fn test_failed_ping_warns_and_continues() {
        let mut api = MockStatusPage::new();
        api.expect_ping().times(1).returning(|| Ok(false));

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        assert_eq!(manager.component_id(), 3);
    }

    #[tokio::test]
    async fn test_ping_error_is_tolerated() {
        let mut api = MockStatusPage::new();
        api.expect_ping()
            .times(1)
            .returning(|| Err(BridgeError::api(502, "Bad Gateway")));

        assert!(IncidentManager::connect(api, 3, &settings()).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_ping_aborts_when_required() {
        let mut api = MockStatusPage::new();
        api.expect_ping().times(1).returning(|| Ok(false));
        let mut strict = settings();
        strict.require_ping = true;

        let result = IncidentManager::connect(api, 3, &strict).await;
        assert!(matches!(result, Err(BridgeError::Connectivity { .. })));
    }

    #[tokio::test]
    async fn test_create_incident_renders_group_and_description() {
        let mut api = reachable_api();
        let mut seq = Sequence::new();
        api.expect_get_component()
            .with(eq(3))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(component(Some(2))));
        api.expect_get_component_group()
            .with(eq(2))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(ComponentGroup {
                    id: 2,
                    name: "Database".to_string(),
                })
            });
        api.expect_create_incident()
            .withf(|new| {
                new.component_id == 3
                    && new.status == IncidentStatus::Investigating
                    && new.component_status == ComponentStatus::PartialOutage
                    && new.name == "Incident affecting Database primary-replica"
                    && new.message.contains(
                        "**Database** component (`primary-replica`) in **US-East Cluster**",
                    )
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(incident(
                    55,
                    3,
                    IncidentStatus::Investigating,
                    "2024-03-01 10:00:00",
                ))
            });

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        let created = manager
            .create_incident(ComponentStatus::PartialOutage, "primary-replica", None)
            .await
            .unwrap();
        assert_eq!(created.id, 55);
    }

    #[tokio::test]
    async fn test_create_incident_with_group_override() {
        let mut api = reachable_api();
        api.expect_get_component()
            .returning(|_| Ok(component(Some(2))));
        api.expect_get_component_group().times(1).returning(|_| {
            Ok(ComponentGroup {
                id: 2,
                name: "Database".to_string(),
            })
        });
        api.expect_create_incident()
            .withf(|new| new.name == "Incident affecting Replicas replica-2")
            .times(1)
            .returning(|_| {
                Ok(incident(
                    56,
                    3,
                    IncidentStatus::Investigating,
                    "2024-03-01 10:00:00",
                ))
            });

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        manager
            .create_incident(ComponentStatus::MajorOutage, "replica-2", Some("Replicas"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_incident_for_ungrouped_component() {
        let mut api = reachable_api();
        api.expect_get_component().returning(|_| Ok(component(None)));
        api.expect_get_component_group().never();
        api.expect_create_incident()
            .withf(|new| new.name == "Incident affecting db-primary disk")
            .times(1)
            .returning(|_| {
                Ok(incident(
                    57,
                    3,
                    IncidentStatus::Investigating,
                    "2024-03-01 10:00:00",
                ))
            });

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        manager
            .create_incident(ComponentStatus::PerformanceIssues, "disk", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_incident_propagates_remote_errors() {
        let mut api = reachable_api();
        api.expect_get_component()
            .returning(|_| Err(BridgeError::api(404, "Resource not found")));
        api.expect_create_incident().never();

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        let result = manager
            .create_incident(ComponentStatus::MajorOutage, "disk", None)
            .await;
        assert!(matches!(result, Err(BridgeError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_acknowledge_uses_default_message_on_latest_incident() {
        let mut api = reachable_api();
        api.expect_list_incidents().times(1).returning(|| {
            Ok(vec![
                incident(1, 3, IncidentStatus::Investigating, "2024-03-01 10:00:00"),
                incident(2, 3, IncidentStatus::Investigating, "2024-03-01 11:00:00"),
                incident(3, 4, IncidentStatus::Investigating, "2024-03-01 12:00:00"),
            ])
        });
        api.expect_create_incident_update()
            .withf(|id, status, message| {
                *id == 2 && *status == IncidentStatus::Identified && message.to_string() == DEFAULT_ACK_MESSAGE
            })
            .times(1)
            .returning(|id, status, message| Ok(update(id, status, message)));

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        let ack = manager.acknowledge_incident(None).await.unwrap();
        assert_eq!(ack.incident_id, 2);
        assert_eq!(ack.status.code(), 2);
    }

    #[tokio::test]
    async fn test_acknowledge_with_empty_message_falls_back_to_default() {
        let mut api = reachable_api();
        api.expect_list_incidents().returning(|| {
            Ok(vec![incident(
                1,
                3,
                IncidentStatus::Investigating,
                "2024-03-01 10:00:00",
            )])
        });
        api.expect_create_incident_update()
            .withf(|_, _, message| message.to_string() == DEFAULT_ACK_MESSAGE)
            .times(1)
            .returning(|id, status, message| Ok(update(id, status, message)));

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        manager.acknowledge_incident(Some("   ")).await.unwrap();
    }

    #[tokio::test]
    async fn test_acknowledge_with_custom_message() {
        let mut api = reachable_api();
        api.expect_list_incidents().returning(|| {
            Ok(vec![incident(
                1,
                3,
                IncidentStatus::Investigating,
                "2024-03-01 10:00:00",
            )])
        });
        api.expect_create_incident_update()
            .withf(|_, _, message| message.to_string() == "Failover in progress")
            .times(1)
            .returning(|id, status, message| Ok(update(id, status, message)));

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        let ack = manager
            .acknowledge_incident(Some("Failover in progress"))
            .await
            .unwrap();
        assert_eq!(ack.message, "Failover in progress");
    }

    #[tokio::test]
    async fn test_acknowledge_posts_message_verbatim() {
        let mut api = reachable_api();
        api.expect_list_incidents().returning(|| {
            Ok(vec![incident(
                1,
                3,
                IncidentStatus::Investigating,
                "2024-03-01 10:00:00",
            )])
        });
        api.expect_create_incident_update()
            .withf(|_, _, message| message.to_string() == "  Failover in progress\n")
            .times(1)
            .returning(|id, status, message| Ok(update(id, status, message)));

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        let ack = manager
            .acknowledge_incident(Some("  Failover in progress\n"))
            .await
            .unwrap();
        assert_eq!(ack.message, "  Failover in progress\n");
    }

    #[tokio::test]
    async fn test_acknowledge_without_active_incident() {
        let mut api = reachable_api();
        api.expect_list_incidents().returning(|| Ok(vec![]));
        api.expect_create_incident_update().never();

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        let result = manager.acknowledge_incident(None).await;
        assert!(matches!(
            result,
            Err(BridgeError::NoActiveIncident { component_id: 3 })
        ));
    }

    #[tokio::test]
    async fn test_resolve_updates_incident_then_component() {
        let mut api = reachable_api();
        let mut seq = Sequence::new();
        api.expect_list_incidents()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| {
                Ok(vec![incident(
                    9,
                    3,
                    IncidentStatus::Identified,
                    "2024-03-01 10:00:00",
                )])
            });
        api.expect_create_incident_update()
            .withf(|id, status, message| {
                *id == 9 && *status == IncidentStatus::Fixed && message.to_string() == RESOLVED_MESSAGE
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, status, message| Ok(update(id, status, message)));
        api.expect_update_component_status()
            .with(eq(3), eq(ComponentStatus::Operational))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, status| {
                let mut restored = component(Some(2));
                restored.status = status;
                Ok(restored)
            });

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        let resolved = manager.resolve_incident().await.unwrap();
        assert_eq!(resolved.status, IncidentStatus::Fixed);
    }

    #[tokio::test]
    async fn test_resolve_with_only_resolved_history() {
        let mut api = reachable_api();
        api.expect_list_incidents().returning(|| {
            Ok(vec![incident(9, 3, IncidentStatus::Fixed, "2024-03-01 10:00:00")])
        });
        api.expect_create_incident_update().never();
        api.expect_update_component_status().never();

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        let result = manager.resolve_incident().await;
        assert!(matches!(
            result,
            Err(BridgeError::NoActiveIncident { component_id: 3 })
        ));
    }

    #[tokio::test]
    async fn test_resolve_surfaces_stale_component_status() {
        let mut api = reachable_api();
        api.expect_list_incidents().returning(|| {
            Ok(vec![incident(
                9,
                3,
                IncidentStatus::Investigating,
                "2024-03-01 10:00:00",
            )])
        });
        api.expect_create_incident_update()
            .times(1)
            .returning(|id, status, message| Ok(update(id, status, message)));
        api.expect_update_component_status()
            .times(1)
            .returning(|_, _| Err(BridgeError::api(500, "Internal Server Error")));

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        match manager.resolve_incident().await {
            Err(BridgeError::ComponentStatusStale {
                incident_id,
                component_id,
                reason,
            }) => {
                assert_eq!(incident_id, 9);
                assert_eq!(component_id, 3);
                assert!(reason.contains("500"));
            }
            other => panic!("Expected ComponentStatusStale, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_stops_when_incident_update_fails() {
        let mut api = reachable_api();
        api.expect_list_incidents().returning(|| {
            Ok(vec![incident(
                9,
                3,
                IncidentStatus::Investigating,
                "2024-03-01 10:00:00",
            )])
        });
        api.expect_create_incident_update()
            .returning(|_, _, _| Err(BridgeError::api(401, "Unauthorized")));
        api.expect_update_component_status().never();

        let manager = IncidentManager::connect(api, 3, &settings()).await.unwrap();
        let result = manager.resolve_incident().await;
        assert!(matches!(result, Err(BridgeError::Api { status: 401, .. })));
    }
}
