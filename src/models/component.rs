use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::wire::{self, NumericRepr};
use crate::BridgeError;

/// Operational state shown for a component on the status page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NumericRepr", into = "u8")]
pub enum ComponentStatus {
    Operational,
    PerformanceIssues,
    PartialOutage,
    MajorOutage,
}

impl ComponentStatus {
    pub fn code(self) -> u8 {
        match self {
            ComponentStatus::Operational => 1,
            ComponentStatus::PerformanceIssues => 2,
            ComponentStatus::PartialOutage => 3,
            ComponentStatus::MajorOutage => 4,
        }
    }
}

impl TryFrom<u8> for ComponentStatus {
    type Error = BridgeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ComponentStatus::Operational),
            2 => Ok(ComponentStatus::PerformanceIssues),
            3 => Ok(ComponentStatus::PartialOutage),
            4 => Ok(ComponentStatus::MajorOutage),
            other => Err(BridgeError::InvalidStatus(format!(
                "component status {}",
                other
            ))),
        }
    }
}

impl TryFrom<NumericRepr> for ComponentStatus {
    type Error = String;

    fn try_from(raw: NumericRepr) -> Result<Self, Self::Error> {
        let code = u8::try_from(raw).map_err(|v| format!("invalid component status: {}", v))?;
        ComponentStatus::try_from(code).map_err(|e| e.to_string())
    }
}

impl From<ComponentStatus> for u8 {
    fn from(status: ComponentStatus) -> Self {
        status.code()
    }
}

/// Accepts the numeric Cachet code or a name such as `partial-outage`,
/// which is what alert actions pass as severity.
impl FromStr for ComponentStatus {
    type Err = BridgeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase().replace(['_', ' '], "-");
        if let Ok(code) = normalized.parse::<u8>() {
            return ComponentStatus::try_from(code);
        }

        match normalized.as_str() {
            "operational" => Ok(ComponentStatus::Operational),
            "performance-issues" | "performance" => Ok(ComponentStatus::PerformanceIssues),
            "partial-outage" | "partial" => Ok(ComponentStatus::PartialOutage),
            "major-outage" | "major" => Ok(ComponentStatus::MajorOutage),
            _ => Err(BridgeError::InvalidStatus(raw.to_string())),
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentStatus::Operational => write!(f, "operational"),
            ComponentStatus::PerformanceIssues => write!(f, "performance-issues"),
            ComponentStatus::PartialOutage => write!(f, "partial-outage"),
            ComponentStatus::MajorOutage => write!(f, "major-outage"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Component {
    #[serde(deserialize_with = "wire::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub description: String,
    /// Cachet reports ungrouped components with a null or zero group
    #[serde(default, deserialize_with = "wire::optional_id")]
    pub group_id: Option<u64>,
    pub status: ComponentStatus,
}

impl Component {
    pub fn group(&self) -> Option<u64> {
        self.group_id.filter(|id| *id != 0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentGroup {
    #[serde(deserialize_with = "wire::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub name: String,
}
