//! Deployment parameters collected from the user.
//!
//! Human readable choices are mapped through fixed lookup tables to the
//! provider identifiers that end up in the rendered configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{InputError, InputResult};

/// The only region deployments are accepted for.
pub const ACCEPTED_REGION: &str = "us-east-2";

/// Default value of the `environment` template variable.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Default value of the `owner` template variable.
pub const DEFAULT_OWNER: &str = "DevOps-Team";

const MAX_LB_NAME_LEN: usize = 32;

/// Region names AWS refuses as load balancer names.
const RESERVED_LB_NAMES: &[&str] = &["us-east-1", "us-east-2", "us-west-1", "us-west-2"];

/// Machine image choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmiChoice {
    #[default]
    Ubuntu,
    AmazonLinux,
}

impl AmiChoice {
    pub fn all() -> [Self; 2] {
        [AmiChoice::Ubuntu, AmiChoice::AmazonLinux]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmiChoice::Ubuntu => "ubuntu",
            AmiChoice::AmazonLinux => "amazon_linux",
        }
    }

    /// Name shown in the interactive menu.
    pub fn display_name(&self) -> &'static str {
        match self {
            AmiChoice::Ubuntu => "Ubuntu 24.04 LTS",
            AmiChoice::AmazonLinux => "Amazon Linux 2023",
        }
    }

    /// Provider specific image id for the accepted region.
    pub fn image_id(&self) -> &'static str {
        match self {
            AmiChoice::Ubuntu => "ami-0c995fbcf99222492",
            AmiChoice::AmazonLinux => "ami-0915e09cc7ceee3ab",
        }
    }
}

impl fmt::Display for AmiChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AmiChoice {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "ubuntu" => Ok(AmiChoice::Ubuntu),
            "amazon_linux" | "amazonlinux" | "al2023" => Ok(AmiChoice::AmazonLinux),
            _ => Err(InputError::UnknownAmi(s.to_string())),
        }
    }
}

/// EC2 instance size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InstanceType {
    #[default]
    #[serde(rename = "t3.small")]
    T3Small,
    #[serde(rename = "t3.medium")]
    T3Medium,
}

impl InstanceType {
    pub fn all() -> [Self; 2] {
        [InstanceType::T3Small, InstanceType::T3Medium]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceType::T3Small => "t3.small",
            InstanceType::T3Medium => "t3.medium",
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InstanceType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "t3.small" => Ok(InstanceType::T3Small),
            "t3.medium" => Ok(InstanceType::T3Medium),
            _ => Err(InputError::UnknownInstanceType(s.to_string())),
        }
    }
}

/// Outcome of applying the region policy to user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionChoice {
    pub region: String,
    /// The rejected input, when the region was coerced to [`ACCEPTED_REGION`].
    pub coerced_from: Option<String>,
}

impl RegionChoice {
    /// Accept the single supported region; coerce anything else to it.
    ///
    /// Never fails. A rejected value is logged as a warning and kept in
    /// `coerced_from` so callers can surface it.
    pub fn resolve(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case(ACCEPTED_REGION) {
            return Self {
                region: ACCEPTED_REGION.to_string(),
                coerced_from: None,
            };
        }

        warn!(
            "Region '{}' is not supported, using {} instead",
            trimmed, ACCEPTED_REGION
        );
        Self {
            region: ACCEPTED_REGION.to_string(),
            coerced_from: Some(trimmed.to_string()),
        }
    }

    pub fn was_coerced(&self) -> bool {
        self.coerced_from.is_some()
    }
}

impl Default for RegionChoice {
    fn default() -> Self {
        Self::resolve(ACCEPTED_REGION)
    }
}

/// Check a load balancer name against the AWS naming rules.
pub fn validate_load_balancer_name(name: &str) -> InputResult<()> {
    let invalid = |reason: &str| InputError::InvalidLoadBalancerName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.len() > MAX_LB_NAME_LEN {
        return Err(invalid("must be at most 32 characters"));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(invalid("must not begin or end with a hyphen"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid("may only contain letters, numbers and hyphens"));
    }
    if RESERVED_LB_NAMES.contains(&name.to_lowercase().as_str()) {
        return Err(invalid("must not be an AWS region name"));
    }
    Ok(())
}

/// Validated, immutable deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentParameters {
    ami: AmiChoice,
    instance_type: InstanceType,
    region: RegionChoice,
    alb_name: String,
    environment: String,
    owner: String,
}

impl DeploymentParameters {
    /// Start building parameters from the required choices.
    pub fn builder(
        ami: AmiChoice,
        instance_type: InstanceType,
        alb_name: impl Into<String>,
    ) -> ParametersBuilder {
        ParametersBuilder {
            ami,
            instance_type,
            alb_name: alb_name.into(),
            region: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            owner: DEFAULT_OWNER.to_string(),
        }
    }

    pub fn ami(&self) -> AmiChoice {
        self.ami
    }

    pub fn instance_type(&self) -> InstanceType {
        self.instance_type
    }

    pub fn region(&self) -> &str {
        &self.region.region
    }

    pub fn region_choice(&self) -> &RegionChoice {
        &self.region
    }

    pub fn availability_zone(&self) -> String {
        format!("{}a", self.region.region)
    }

    pub fn alb_name(&self) -> &str {
        &self.alb_name
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Template variables derived from these parameters.
    pub fn to_variables(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("ami".to_string(), self.ami.image_id().to_string());
        vars.insert(
            "instance_type".to_string(),
            self.instance_type.as_str().to_string(),
        );
        vars.insert("region".to_string(), self.region.region.clone());
        vars.insert("availability_zone".to_string(), self.availability_zone());
        vars.insert("load_balancer_name".to_string(), self.alb_name.clone());
        vars.insert("environment".to_string(), self.environment.clone());
        vars.insert("owner".to_string(), self.owner.clone());
        vars
    }
}

/// Builder for [`DeploymentParameters`].
#[derive(Debug, Clone)]
pub struct ParametersBuilder {
    ami: AmiChoice,
    instance_type: InstanceType,
    alb_name: String,
    region: Option<String>,
    environment: String,
    owner: String,
}

impl ParametersBuilder {
    /// Requested region; subject to the region policy at build time.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn build(self) -> InputResult<DeploymentParameters> {
        let alb_name = self.alb_name.trim().to_string();
        validate_load_balancer_name(&alb_name)?;

        let region = match self.region {
            Some(requested) => RegionChoice::resolve(&requested),
            None => RegionChoice::default(),
        };

        debug!(
            "Deployment parameters: ami={}, instance_type={}, region={}, alb={}",
            self.ami, self.instance_type, region.region, alb_name
        );

        Ok(DeploymentParameters {
            ami: self.ami,
            instance_type: self.instance_type,
            region,
            alb_name,
            environment: self.environment,
            owner: self.owner,
        })
    }
}
