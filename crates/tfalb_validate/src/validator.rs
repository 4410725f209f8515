//! Post-deploy validation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use tfalb_iac::ResourceIdentifierSet;

use crate::error::{LookupError, LookupResult};
use crate::inspector::CloudInspector;
use crate::record::{InstanceState, ValidationRecord};

/// Default deadline for a single provider lookup.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Checks that deployed resources exist and collects their observable attributes.
pub struct DeploymentValidator {
    inspector: Arc<dyn CloudInspector>,
    call_timeout: Duration,
}

impl DeploymentValidator {
    pub fn new(inspector: Arc<dyn CloudInspector>) -> Self {
        Self {
            inspector,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Query the provider for both resources.
    ///
    /// Never fails: each lookup is independent, and a lookup that errors,
    /// times out or finds nothing leaves its fields unknown / absent.
    pub async fn validate(&self, ids: &ResourceIdentifierSet) -> ValidationRecord {
        info!("Validating deployed resources");

        let (instance_state, public_ip) = self.check_instance(&ids.instance_id).await;
        let load_balancer_dns = self.check_load_balancer(&ids.load_balancer_name).await;

        let record = ValidationRecord {
            instance_id: ids.instance_id.clone(),
            instance_state,
            public_ip,
            load_balancer_dns,
        };

        if record.is_healthy() {
            info!("Validation passed");
        } else {
            warn!(
                "Validation incomplete: instance {}, load balancer {}",
                record.instance_state,
                if record.load_balancer_dns.is_some() { "found" } else { "not found" }
            );
        }
        record
    }

    async fn check_instance(&self, instance_id: &str) -> (InstanceState, Option<String>) {
        let lookup = self.inspector.describe_instance(instance_id);
        match self.bounded(instance_id, lookup).await {
            Ok(Some(info)) => {
                if info.state == InstanceState::Running {
                    info!("EC2 instance {} is running", instance_id);
                    (info.state, info.public_ip)
                } else {
                    warn!(
                        "EC2 instance {} is {}, expected running",
                        instance_id, info.state
                    );
                    // Public address is only reported for a running instance
                    (info.state, None)
                }
            }
            Ok(None) => {
                error!("EC2 instance {} not found", instance_id);
                (InstanceState::Unknown, None)
            }
            Err(e) => {
                error!("Error fetching EC2 instance {}: {}", instance_id, e);
                (InstanceState::Unknown, None)
            }
        }
    }

    async fn check_load_balancer(&self, name: &str) -> Option<String> {
        let lookup = self.inspector.describe_load_balancer(name);
        match self.bounded(name, lookup).await {
            Ok(Some(lb)) => {
                match lb.state.as_deref() {
                    Some("active") | None => info!("Load balancer {} found", name),
                    Some(state) => warn!("Load balancer {} is {}", name, state),
                }
                lb.dns_name
            }
            Ok(None) => {
                error!("Load balancer {} not found", name);
                None
            }
            Err(e) => {
                error!("Error fetching load balancer {}: {}", name, e);
                None
            }
        }
    }

    async fn bounded<T>(
        &self,
        resource: &str,
        lookup: impl Future<Output = LookupResult<T>>,
    ) -> LookupResult<T> {
        match tokio::time::timeout(self.call_timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout {
                resource: resource.to_string(),
                secs: self.call_timeout.as_secs(),
            }),
        }
    }
}
