//! The validation record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the compute instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    Running,
    Pending,
    Stopped,
    Terminated,
    #[default]
    Unknown,
}

impl InstanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Running => "running",
            InstanceState::Pending => "pending",
            InstanceState::Stopped => "stopped",
            InstanceState::Terminated => "terminated",
            InstanceState::Unknown => "unknown",
        }
    }

    /// Map an EC2 state name. Transitional states map to the state they are heading to.
    pub fn from_provider_state(name: &str) -> Self {
        match name {
            "running" => InstanceState::Running,
            "pending" => InstanceState::Pending,
            "stopped" | "stopping" => InstanceState::Stopped,
            "terminated" | "shutting-down" => InstanceState::Terminated,
            _ => InstanceState::Unknown,
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a validation pass. Absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub instance_id: String,
    pub instance_state: InstanceState,
    pub public_ip: Option<String>,
    pub load_balancer_dns: Option<String>,
}

impl ValidationRecord {
    /// Record for an instance nothing could be learned about.
    pub fn unresolved(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            instance_state: InstanceState::Unknown,
            public_ip: None,
            load_balancer_dns: None,
        }
    }

    /// Instance running and load balancer found.
    pub fn is_healthy(&self) -> bool {
        self.instance_state == InstanceState::Running && self.load_balancer_dns.is_some()
    }
}
