use config::{Config, File, FileFormat, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

use crate::{BridgeError, BridgeResult};

/// INI section holding the Cachet connection settings
pub const SECTION: &str = "CACHET";
pub const CONFIG_FILE_NAME: &str = "config.ini";
pub const CONFIG_PATH_ENV: &str = "ZBX_CACHET_CONFIG";
pub const ENDPOINT_ENV: &str = "CACHET_ENDPOINT";
pub const API_TOKEN_ENV: &str = "CACHET_API_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings loaded once per invocation and passed explicitly to
/// the client and the incident manager.
#[derive(Clone, Validate)]
pub struct Settings {
    /// Base URL of the Cachet API
    #[validate(url(message = "endpoint must be a valid URL"))]
    pub endpoint: String,

    #[validate(length(min = 1, message = "api_token must not be empty"))]
    pub api_token: String,

    /// Abort instead of warning when the ping check fails
    pub require_ping: bool,

    #[validate(range(min = 1, max = 600, message = "timeout_secs must be between 1 and 600"))]
    pub timeout_secs: u64,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"<redacted>")
            .field("require_ping", &self.require_ping)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Settings {
    pub fn new(endpoint: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: api_token.into(),
            require_ping: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Resolve, parse, override from the environment and validate.
    pub fn load(source: &SettingsSource) -> BridgeResult<Self> {
        debug!("Loading configuration from {}", source);

        let mut settings = Self::from_file(source.path())?;
        settings.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(API_TOKEN_ENV).ok(),
        );
        settings.validate_all()?;

        debug!("Successfully loaded config from {}", source.path().display());
        Ok(settings)
    }

    /// Parse the `CACHET` section of an INI file.
    pub fn from_file(path: &Path) -> BridgeResult<Self> {
        if !path.is_file() {
            return Err(BridgeError::configuration(format!(
                "Configuration file {} is missing or invalid",
                path.display()
            )));
        }

        let raw = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Ini).required(true))
            .build()
            .and_then(|cfg| cfg.try_deserialize::<HashMap<String, Value>>())
            .map_err(|e| {
                BridgeError::configuration(format!(
                    "Configuration file {} is missing or invalid: {}",
                    path.display(),
                    e
                ))
            })?;

        let section = find_section(raw, path)?;
        Self::from_section(section)
    }

    fn from_section(mut section: HashMap<String, String>) -> BridgeResult<Self> {
        let endpoint = section.remove("endpoint").ok_or_else(|| {
            BridgeError::configuration("Configuration file is missing Cachet 'endpoint' Config")
        })?;
        let api_token = section.remove("api_token").ok_or_else(|| {
            BridgeError::configuration("Configuration file is missing Cachet 'api_token' Config")
        })?;

        let mut settings = Self::new(endpoint.trim(), api_token.trim());

        if let Some(raw) = section.remove("require_ping") {
            settings.require_ping = parse_bool(&raw).ok_or_else(|| {
                BridgeError::configuration(format!("Invalid 'require_ping' value: {}", raw))
            })?;
        }

        if let Some(raw) = section.remove("timeout_secs") {
            settings.timeout_secs = raw.trim().parse().map_err(|_| {
                BridgeError::configuration(format!("Invalid 'timeout_secs' value: {}", raw))
            })?;
        }

        Ok(settings)
    }

    /// Environment values replace whatever the file provided.
    pub fn apply_overrides(&mut self, endpoint: Option<String>, api_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|v| !v.trim().is_empty()) {
            debug!("Endpoint overridden from {}", ENDPOINT_ENV);
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(token) = api_token.filter(|v| !v.trim().is_empty()) {
            debug!("API token overridden from {}", API_TOKEN_ENV);
            self.api_token = token.trim().to_string();
        }
    }

    pub fn validate_all(&self) -> BridgeResult<()> {
        let mut validator = super::validation::ConfigurationValidator::new();
        validator.validate_settings(self)
    }
}

/// Locate the `CACHET` section, ignoring case since the INI reader may
/// normalise key names.
fn find_section(raw: HashMap<String, Value>, path: &Path) -> BridgeResult<HashMap<String, String>> {
    let missing = || {
        BridgeError::configuration(format!(
            "Configuration file {} is missing or invalid",
            path.display()
        ))
    };

    let table = raw
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(SECTION))
        .map(|(_, value)| value)
        .ok_or_else(missing)?
        .into_table()
        .map_err(|_| missing())?;

    let mut section = HashMap::new();
    for (key, value) in table {
        let value = value.into_string().map_err(|e| {
            BridgeError::configuration(format!("Invalid value for '{}': {}", key, e))
        })?;
        section.insert(key.to_lowercase(), value);
    }
    Ok(section)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Where the configuration file was found, in precedence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    Flag(PathBuf),
    Environment(PathBuf),
    ExecutableDir(PathBuf),
    WorkingDir(PathBuf),
    UserConfigDir(PathBuf),
}

impl SettingsSource {
    pub fn path(&self) -> &Path {
        match self {
            SettingsSource::Flag(p)
            | SettingsSource::Environment(p)
            | SettingsSource::ExecutableDir(p)
            | SettingsSource::WorkingDir(p)
            | SettingsSource::UserConfigDir(p) => p,
        }
    }

    /// Pick the configuration file: an explicit path wins, then
    /// `ZBX_CACHET_CONFIG`, then the first existing default location.
    pub fn resolve(flag: Option<PathBuf>) -> Self {
        Self::resolve_with(flag, std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
    }

    pub fn resolve_with(flag: Option<PathBuf>, env_path: Option<PathBuf>) -> Self {
        if let Some(path) = flag {
            return SettingsSource::Flag(path);
        }
        if let Some(path) = env_path {
            return SettingsSource::Environment(path);
        }

        let candidates = Self::default_candidates();
        let fallback = candidates.first().cloned();

        candidates
            .into_iter()
            .find(|c| c.path().is_file())
            .or(fallback)
            .unwrap_or_else(|| SettingsSource::WorkingDir(PathBuf::from(CONFIG_FILE_NAME)))
    }

    fn default_candidates() -> Vec<Self> {
        let mut candidates = Vec::new();

        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(SettingsSource::ExecutableDir(dir.join(CONFIG_FILE_NAME)));
        }

        candidates.push(SettingsSource::WorkingDir(PathBuf::from(CONFIG_FILE_NAME)));

        if let Some(dir) = dirs::config_dir() {
            candidates.push(SettingsSource::UserConfigDir(
                dir.join("zbx-cachet").join(CONFIG_FILE_NAME),
            ));
        }

        candidates
    }
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match self {
            SettingsSource::Flag(_) => "--config",
            SettingsSource::Environment(_) => CONFIG_PATH_ENV,
            SettingsSource::ExecutableDir(_) => "executable directory",
            SettingsSource::WorkingDir(_) => "working directory",
            SettingsSource::UserConfigDir(_) => "user config directory",
        };
        write!(f, "{} ({})", self.path().display(), origin)
    }
}
