//! Integration tests: validation pass through to the written record.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::tempdir;
use tfalb_iac::ResourceIdentifierSet;
use tfalb_validate::{
    CloudInspector, DeploymentValidator, InstanceInfo, InstanceState, LoadBalancerInfo,
    LookupError, LookupResult, ResultWriter, ValidationRecord,
};

/// Inspector with one instance and one load balancer.
struct StaticInspector {
    instance: Option<InstanceInfo>,
    lb_error: bool,
}

#[async_trait]
impl CloudInspector for StaticInspector {
    async fn describe_instance(&self, instance_id: &str) -> LookupResult<Option<InstanceInfo>> {
        Ok(self
            .instance
            .clone()
            .filter(|i| i.instance_id == instance_id))
    }

    async fn describe_load_balancer(&self, name: &str) -> LookupResult<Option<LoadBalancerInfo>> {
        if self.lb_error {
            return Err(LookupError::Api {
                service: "ELBv2",
                message: "RequestExpired".to_string(),
            });
        }
        Ok(Some(LoadBalancerInfo {
            name: name.to_string(),
            dns_name: Some(format!("{}-123456.us-east-2.elb.amazonaws.com", name)),
            state: Some("active".to_string()),
        }))
    }
}

fn running_instance() -> InstanceInfo {
    InstanceInfo {
        instance_id: "i-0abc12345def67890".to_string(),
        state: InstanceState::Running,
        public_ip: Some("3.91.202.100".to_string()),
    }
}

#[tokio::test]
async fn test_validation_record_written_to_disk() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("aws_validation.json");

    let inspector = StaticInspector {
        instance: Some(running_instance()),
        lb_error: false,
    };
    let validator = DeploymentValidator::new(Arc::new(inspector));
    let ids = ResourceIdentifierSet::new("i-0abc12345def67890", "my-alb");

    let record = validator.validate(&ids).await;
    ResultWriter::write(&record, &path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "instance_id": "i-0abc12345def67890",
            "instance_state": "running",
            "public_ip": "3.91.202.100",
            "load_balancer_dns": "my-alb-123456.us-east-2.elb.amazonaws.com"
        })
    );
}

#[tokio::test]
async fn test_partial_failure_still_writes_record() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("aws_validation.json");

    let inspector = StaticInspector {
        instance: None,
        lb_error: true,
    };
    let ids = ResourceIdentifierSet::new("i-0abc12345def67890", "my-alb");
    let record = DeploymentValidator::new(Arc::new(inspector)).validate(&ids).await;

    ResultWriter::write(&record, &path).unwrap();
    assert_eq!(
        ResultWriter::read(&path).unwrap(),
        ValidationRecord::unresolved("i-0abc12345def67890")
    );
}
