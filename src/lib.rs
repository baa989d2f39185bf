//! zbx-cachet
//!
//! Bridges monitoring alert actions to a Cachet status page: each invocation
//! creates, acknowledges or resolves the incident of one component.

pub mod cli;
pub mod client;
pub mod config;
pub mod incident;
pub mod models;

/// Application-wide error types with context preservation
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unable to connect to Cachet server at {endpoint}")]
    Connectivity { endpoint: String },

    #[error("No active incident for component {component_id}")]
    NoActiveIncident { component_id: u64 },

    #[error(
        "Incident {incident_id} was resolved but component {component_id} status was not restored: {reason}"
    )]
    ComponentStatusStale {
        incident_id: u64,
        component_id: u64,
        reason: String,
    },

    #[error("Cachet API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl BridgeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an API error from a response status and body
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Process exit code. The tool only distinguishes success from failure.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            BridgeError::Configuration { message } => {
                format!("[!] {}", message)
            }
            BridgeError::Connectivity { endpoint } => {
                format!("[!] Unable to connect to Cachet server at {}", endpoint)
            }
            BridgeError::NoActiveIncident { component_id } => {
                format!(
                    "[!] No active incident found for component {}",
                    component_id
                )
            }
            BridgeError::ComponentStatusStale {
                incident_id,
                component_id,
                reason,
            } => {
                format!(
                    "[!] Incident {} is resolved, but component {} is still flagged as degraded ({}). Restore its status manually.",
                    incident_id, component_id, reason
                )
            }
            BridgeError::Api { status, message } => {
                format!("[!] Cachet rejected the request ({}): {}", status, message)
            }
            BridgeError::InvalidStatus(value) => {
                format!("[!] Invalid status value: {}", value)
            }
            BridgeError::Http { source } => {
                format!("[!] Communication error: {}", source)
            }
            BridgeError::Serialization { source } => {
                format!("[!] Unexpected response format: {}", source)
            }
        }
    }
}

/// Convenience type alias for Results
pub type BridgeResult<T> = Result<T, BridgeError>;
