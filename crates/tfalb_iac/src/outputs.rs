//! Terraform outputs and the resource identifiers derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IacError, IacResult};

/// Output holding the EC2 instance id.
pub const INSTANCE_ID_OUTPUT: &str = "instance_id";

/// Output holding the load balancer name.
pub const LOAD_BALANCER_NAME_OUTPUT: &str = "load_balancer_name";

/// Root module outputs, as reported by `terraform output -json`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerraformOutputs {
    values: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct RawOutput {
    value: Value,
}

impl TerraformOutputs {
    /// Parse the `{"name": {"value": ..., "type": ..., "sensitive": ...}}` document.
    ///
    /// Empty input parses to no outputs.
    pub fn parse(json: &str) -> IacResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: BTreeMap<String, RawOutput> = serde_json::from_str(json)
            .map_err(|e| IacError::InvalidOutput(e.to_string()))?;

        Ok(Self {
            values: raw.into_iter().map(|(k, v)| (k, v.value)).collect(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// A non-empty string output.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Identifiers of the resources an apply created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifierSet {
    pub instance_id: String,
    pub load_balancer_name: String,
}

impl ResourceIdentifierSet {
    pub fn new(instance_id: impl Into<String>, load_balancer_name: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            load_balancer_name: load_balancer_name.into(),
        }
    }

    /// Build identifiers from outputs.
    ///
    /// The load balancer name falls back to `expected_lb_name` (the name the
    /// configuration was rendered with) when the output is absent.
    pub fn from_outputs(
        outputs: &TerraformOutputs,
        expected_lb_name: Option<&str>,
    ) -> IacResult<Self> {
        let instance_id = outputs
            .get_str(INSTANCE_ID_OUTPUT)
            .ok_or_else(|| IacError::MissingOutput(INSTANCE_ID_OUTPUT.to_string()))?;

        let load_balancer_name = outputs
            .get_str(LOAD_BALANCER_NAME_OUTPUT)
            .or(expected_lb_name)
            .ok_or_else(|| IacError::MissingOutput(LOAD_BALANCER_NAME_OUTPUT.to_string()))?;

        Ok(Self::new(instance_id, load_balancer_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "instance_id": {"sensitive": false, "type": "string", "value": "i-0abc12345def67890"},
        "instance_public_ip": {"sensitive": false, "type": "string", "value": "3.91.202.100"},
        "load_balancer_name": {"sensitive": false, "type": "string", "value": "my-alb"},
        "load_balancer_dns": {"sensitive": false, "type": "string", "value": "my-alb-123456.elb.amazonaws.com"}
    }"#;

    #[test]
    fn test_parse_outputs() {
        let outputs = TerraformOutputs::parse(SAMPLE).unwrap();
        assert_eq!(outputs.get_str("instance_id"), Some("i-0abc12345def67890"));
        assert_eq!(outputs.names().count(), 4);
        assert!(outputs.get_str("missing").is_none());
    }

    #[test]
    fn test_parse_empty() {
        assert!(TerraformOutputs::parse("").unwrap().is_empty());
        assert!(TerraformOutputs::parse("{}").unwrap().is_empty());
        assert!(TerraformOutputs::parse("not json").is_err());
    }

    #[test]
    fn test_identifiers_from_outputs() {
        let outputs = TerraformOutputs::parse(SAMPLE).unwrap();
        let ids = ResourceIdentifierSet::from_outputs(&outputs, Some("ignored")).unwrap();
        assert_eq!(ids, ResourceIdentifierSet::new("i-0abc12345def67890", "my-alb"));
    }

    #[test]
    fn test_identifiers_fall_back_to_expected_name() {
        let outputs =
            TerraformOutputs::parse(r#"{"instance_id": {"value": "i-1"}}"#).unwrap();
        let ids = ResourceIdentifierSet::from_outputs(&outputs, Some("my-alb")).unwrap();
        assert_eq!(ids.load_balancer_name, "my-alb");

        let err = ResourceIdentifierSet::from_outputs(&outputs, None).unwrap_err();
        assert!(matches!(err, IacError::MissingOutput(ref n) if n == "load_balancer_name"));
    }

    #[test]
    fn test_missing_instance_id() {
        let outputs = TerraformOutputs::parse(r#"{"instance_id": {"value": ""}}"#).unwrap();
        let err = ResourceIdentifierSet::from_outputs(&outputs, Some("my-alb")).unwrap_err();
        assert!(matches!(err, IacError::MissingOutput(ref n) if n == "instance_id"));
    }
}
