//! Cloud lookups used by the validator.

use async_trait::async_trait;

use crate::error::LookupResult;
use crate::record::InstanceState;

/// What the provider reports about a compute instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    pub instance_id: String,
    pub state: InstanceState,
    pub public_ip: Option<String>,
}

/// What the provider reports about a load balancer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerInfo {
    pub name: String,
    pub dns_name: Option<String>,
    /// Provider state code, e.g. `active` or `provisioning`
    pub state: Option<String>,
}

/// Read-only view of the cloud provider's resources.
///
/// `Ok(None)` means the resource does not exist (or is not visible yet);
/// `Err` means the lookup itself failed.
#[async_trait]
pub trait CloudInspector: Send + Sync {
    async fn describe_instance(&self, instance_id: &str) -> LookupResult<Option<InstanceInfo>>;

    async fn describe_load_balancer(&self, name: &str) -> LookupResult<Option<LoadBalancerInfo>>;
}
