//! Cachet v1 REST client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

use super::StatusPage;
use crate::config::Settings;
use crate::models::{
    Component, ComponentGroup, ComponentStatus, Incident, IncidentStatus, IncidentUpdate,
    NewIncident,
};
use crate::{BridgeError, BridgeResult};

const TOKEN_HEADER: &str = "X-Cachet-Token";
const API_PREFIX: &str = "/api/v1";
const INCIDENT_PAGE_SIZE: u32 = 100;

/// Cachet wraps every payload in `{"data": ...}`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    current_page: u32,
    total_pages: u32,
}

#[derive(Debug, Serialize)]
struct ComponentStatusBody {
    status: ComponentStatus,
}

#[derive(Debug, Serialize)]
struct IncidentUpdateBody<'a> {
    status: IncidentStatus,
    message: &'a str,
}

/// HTTP client for one Cachet endpoint
pub struct CachetClient {
    base_url: String,
    api_token: String,
    client: Client,
}

impl CachetClient {
    pub fn new(settings: &Settings) -> BridgeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("zbx-cachet/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: api_base_url(&settings.endpoint),
            api_token: settings.api_token.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> BridgeResult<T> {
        let response = request
            .header(TOKEN_HEADER, &self.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        trace!("Cachet responded {} with {} bytes", status, body.len());

        if !status.is_success() {
            return Err(BridgeError::api(status.as_u16(), error_message(&body)));
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> BridgeResult<T> {
        debug!("GET {}", path);
        let envelope: Envelope<T> = self.send(self.client.get(self.url(path))).await?;
        Ok(envelope.data)
    }
}

/// Accept either the server root or the API base as the endpoint.
fn api_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PREFIX)
    }
}

/// Pull a readable message out of a Cachet error body
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        errors: Vec<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        detail: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let messages: Vec<String> = parsed
            .errors
            .into_iter()
            .filter_map(|e| e.detail.or(e.title))
            .collect();
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    if body.trim().is_empty() {
        "empty response".to_string()
    } else {
        body.trim().to_string()
    }
}

#[async_trait]
impl StatusPage for CachetClient {
    async fn ping(&self) -> BridgeResult<bool> {
        match self.fetch::<String>("/ping").await {
            Ok(pong) => Ok(pong.eq_ignore_ascii_case("pong!")),
            Err(BridgeError::Api { status, .. }) => {
                debug!("Ping answered with HTTP {}", status);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn get_component(&self, component_id: u64) -> BridgeResult<Component> {
        self.fetch(&format!("/components/{}", component_id)).await
    }

    async fn update_component_status(
        &self,
        component_id: u64,
        status: ComponentStatus,
    ) -> BridgeResult<Component> {
        let path = format!("/components/{}", component_id);
        debug!("PUT {} status={}", path, status);

        let envelope: Envelope<Component> = self
            .send(
                self.client
                    .put(self.url(&path))
                    .json(&ComponentStatusBody { status }),
            )
            .await?;
        Ok(envelope.data)
    }

    async fn get_component_group(&self, group_id: u64) -> BridgeResult<ComponentGroup> {
        self.fetch(&format!("/components/groups/{}", group_id)).await
    }

    async fn list_incidents(&self) -> BridgeResult<Vec<Incident>> {
        let mut incidents = Vec::new();
        let mut page = 1u32;
        let mut total_pages = 1u32;

        loop {
            debug!("GET /incidents page {}", page);
            let request = self.client.get(self.url("/incidents")).query(&[
                ("page", page.to_string()),
                ("per_page", INCIDENT_PAGE_SIZE.to_string()),
            ]);
            let batch: Page<Incident> = self.send(request).await?;
            let pagination = batch.meta.and_then(|m| m.pagination);

            if let Some(p) = &pagination {
                if page > 1 && p.current_page != page {
                    debug!(
                        "Asked for page {} but got page {}, stopping",
                        page, p.current_page
                    );
                    break;
                }
                if page == 1 {
                    total_pages = p.total_pages;
                }
            }

            let fetched = batch.data.len();
            incidents.extend(batch.data);

            if pagination.is_none() || fetched == 0 || page >= total_pages {
                break;
            }
            page += 1;
        }

        debug!("Fetched {} incidents", incidents.len());
        Ok(incidents)
    }

    async fn create_incident(&self, incident: &NewIncident) -> BridgeResult<Incident> {
        debug!("POST /incidents for component {}", incident.component_id);
        let envelope: Envelope<Incident> = self
            .send(self.client.post(self.url("/incidents")).json(incident))
            .await?;
        Ok(envelope.data)
    }

    async fn create_incident_update(
        &self,
        incident_id: u64,
        status: IncidentStatus,
        message: &str,
    ) -> BridgeResult<IncidentUpdate> {
        let path = format!("/incidents/{}/updates", incident_id);
        debug!("POST {} status={}", path, status);

        let envelope: Envelope<IncidentUpdate> = self
            .send(
                self.client
                    .post(self.url(&path))
                    .json(&IncidentUpdateBody { status, message }),
            )
            .await?;
        Ok(envelope.data)
    }
}
