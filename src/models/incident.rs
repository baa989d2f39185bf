use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::component::ComponentStatus;
use super::wire::{self, NumericRepr};
use crate::BridgeError;

/// Lifecycle state of a Cachet incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NumericRepr", into = "u8")]
pub enum IncidentStatus {
    Scheduled,
    Investigating,
    Identified,
    Watching,
    /// Cachet calls this "fixed"; it is the resolved state.
    Fixed,
}

impl IncidentStatus {
    pub fn code(self) -> u8 {
        match self {
            IncidentStatus::Scheduled => 0,
            IncidentStatus::Investigating => 1,
            IncidentStatus::Identified => 2,
            IncidentStatus::Watching => 3,
            IncidentStatus::Fixed => 4,
        }
    }

    pub fn is_resolved(self) -> bool {
        self == IncidentStatus::Fixed
    }
}

impl TryFrom<u8> for IncidentStatus {
    type Error = BridgeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(IncidentStatus::Scheduled),
            1 => Ok(IncidentStatus::Investigating),
            2 => Ok(IncidentStatus::Identified),
            3 => Ok(IncidentStatus::Watching),
            4 => Ok(IncidentStatus::Fixed),
            other => Err(BridgeError::InvalidStatus(format!(
                "incident status {}",
                other
            ))),
        }
    }
}

impl TryFrom<NumericRepr> for IncidentStatus {
    type Error = String;

    fn try_from(raw: NumericRepr) -> Result<Self, Self::Error> {
        let code = u8::try_from(raw).map_err(|v| format!("invalid incident status: {}", v))?;
        IncidentStatus::try_from(code).map_err(|e| e.to_string())
    }
}

impl From<IncidentStatus> for u8 {
    fn from(status: IncidentStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentStatus::Scheduled => write!(f, "scheduled"),
            IncidentStatus::Investigating => write!(f, "investigating"),
            IncidentStatus::Identified => write!(f, "identified"),
            IncidentStatus::Watching => write!(f, "watching"),
            IncidentStatus::Fixed => write!(f, "fixed"),
        }
    }
}

/// An incident as listed by the status page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Incident {
    #[serde(deserialize_with = "wire::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "wire::optional_id")]
    pub component_id: Option<u64>,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub name: String,
    pub status: IncidentStatus,
    #[serde(deserialize_with = "wire::timestamp")]
    pub created_at: NaiveDateTime,
}

impl Incident {
    pub fn belongs_to(&self, component_id: u64) -> bool {
        self.component_id == Some(component_id)
    }

    /// Open incidents are those not yet fixed
    pub fn is_active(&self) -> bool {
        !self.status.is_resolved()
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}] {}", self.id, self.status, self.name)
    }
}

/// Body of a create-incident request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIncident {
    pub name: String,
    pub message: String,
    pub status: IncidentStatus,
    pub component_id: u64,
    pub component_status: ComponentStatus,
    pub visible: u8,
}

impl NewIncident {
    pub fn investigating(
        component_id: u64,
        component_status: ComponentStatus,
        name: String,
        message: String,
    ) -> Self {
        Self {
            name,
            message,
            status: IncidentStatus::Investigating,
            component_id,
            component_status,
            visible: 1,
        }
    }
}

/// An update appended to an incident
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncidentUpdate {
    #[serde(deserialize_with = "wire::id")]
    pub id: u64,
    #[serde(deserialize_with = "wire::id")]
    pub incident_id: u64,
    pub status: IncidentStatus,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub message: String,
}
