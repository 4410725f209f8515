//! AWS implementation of [`CloudInspector`].

use std::fmt;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LookupError, LookupResult};
use crate::inspector::{CloudInspector, InstanceInfo, LoadBalancerInfo};
use crate::record::InstanceState;

/// Error codes EC2 returns for an instance id it does not know.
const INSTANCE_NOT_FOUND_CODES: &[&str] = &["InvalidInstanceID.NotFound", "InvalidInstanceID.Malformed"];

/// Where and as whom to talk to AWS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSettings {
    pub region: String,
    /// Named profile from the shared config; default credential chain when unset
    pub profile: Option<String>,
}

impl AwsSettings {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }
}

/// Looks up EC2 instances and ELBv2 load balancers.
pub struct AwsInspector {
    ec2: aws_sdk_ec2::Client,
    elb: aws_sdk_elasticloadbalancingv2::Client,
    region: String,
}

impl fmt::Debug for AwsInspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsInspector")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsInspector {
    /// Load credentials and region from the environment and build both clients.
    pub async fn connect(settings: &AwsSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        debug!(region = %settings.region, profile = ?settings.profile, "Loaded AWS config");
        Self::from_config(&config, &settings.region)
    }

    pub fn from_config(config: &SdkConfig, region: &str) -> Self {
        Self {
            ec2: aws_sdk_ec2::Client::new(config),
            elb: aws_sdk_elasticloadbalancingv2::Client::new(config),
            region: region.to_string(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl CloudInspector for AwsInspector {
    async fn describe_instance(&self, instance_id: &str) -> LookupResult<Option<InstanceInfo>> {
        let response = match self
            .ec2
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.code().is_some_and(|c| INSTANCE_NOT_FOUND_CODES.contains(&c)) => {
                debug!(instance_id = %instance_id, code = ?e.code(), "Instance not found");
                return Ok(None);
            }
            Err(e) => {
                return Err(LookupError::Api {
                    service: "EC2",
                    message: DisplayErrorContext(&e).to_string(),
                })
            }
        };

        let Some(instance) = response
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .find(|i| i.instance_id() == Some(instance_id))
        else {
            return Ok(None);
        };

        let state = instance
            .state()
            .and_then(|s| s.name())
            .map(|name| InstanceState::from_provider_state(name.as_str()))
            .unwrap_or_default();

        Ok(Some(InstanceInfo {
            instance_id: instance_id.to_string(),
            state,
            public_ip: instance.public_ip_address().map(|s| s.to_string()),
        }))
    }

    async fn describe_load_balancer(&self, name: &str) -> LookupResult<Option<LoadBalancerInfo>> {
        let response = match self.elb.describe_load_balancers().names(name).send().await {
            Ok(response) => response,
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_load_balancer_not_found_exception()) =>
            {
                debug!(load_balancer = %name, "Load balancer not found");
                return Ok(None);
            }
            Err(e) => {
                return Err(LookupError::Api {
                    service: "ELBv2",
                    message: DisplayErrorContext(&e).to_string(),
                })
            }
        };

        Ok(response
            .load_balancers()
            .iter()
            .find(|lb| lb.load_balancer_name() == Some(name))
            .map(|lb| LoadBalancerInfo {
                name: name.to_string(),
                dns_name: lb.dns_name().map(|s| s.to_string()),
                state: lb
                    .state()
                    .and_then(|s| s.code())
                    .map(|c| c.as_str().to_string()),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_profile() {
        let settings = AwsSettings::new("us-east-2").with_profile(Some("ops".to_string()));
        assert_eq!(settings.region, "us-east-2");
        assert_eq!(settings.profile.as_deref(), Some("ops"));
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_lookup_unknown_instance_is_absent() {
        let inspector = AwsInspector::connect(&AwsSettings::new("us-east-2")).await;
        let info = inspector
            .describe_instance("i-00000000000000000")
            .await
            .unwrap();
        assert!(info.is_none());
    }
}
