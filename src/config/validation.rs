//! Configuration validation for the Cachet connection settings

use tracing::{debug, warn};
use validator::Validate;

use crate::config::settings::Settings;
use crate::{BridgeError, BridgeResult};

/// Collects validation errors and warnings for a settings value
#[derive(Debug, Default)]
pub struct ConfigurationValidator {
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl ConfigurationValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Validate complete configuration. Warnings are logged, errors are fatal.
    pub fn validate_settings(&mut self, settings: &Settings) -> BridgeResult<()> {
        if let Err(validation_errors) = settings.validate() {
            for (field, errors) in validation_errors.field_errors() {
                for error in errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for '{}'", field));
                    self.errors.push(message);
                }
            }
        }

        self.check_endpoint(&settings.endpoint);

        for warning in &self.warnings {
            warn!("Configuration warning: {}", warning);
        }

        if !self.errors.is_empty() {
            return Err(BridgeError::configuration(format!(
                "Configuration validation failed: {}",
                self.errors.join("; ")
            )));
        }

        debug!("Configuration validation passed");
        Ok(())
    }

    fn check_endpoint(&mut self, endpoint: &str) {
        let lowered = endpoint.to_lowercase();
        if lowered.starts_with("http://") {
            self.warnings.push(format!(
                "Endpoint {} is not using TLS; the API token is sent in clear text",
                endpoint
            ));
        } else if !lowered.starts_with("https://") && !lowered.is_empty() {
            self.errors
                .push(format!("Endpoint {} must use http or https", endpoint));
        }
    }
}
