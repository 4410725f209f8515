//! Interactive prompts for deployment parameters.

use std::fmt::Display;
use std::str::FromStr;

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use tracing::warn;

use tfalb_templates::{validate_load_balancer_name, AmiChoice, InstanceType, ACCEPTED_REGION};

pub fn select_ami() -> Result<AmiChoice> {
    let options = AmiChoice::all();
    let items: Vec<String> = options
        .iter()
        .map(|ami| format!("{} ({})", ami.display_name(), ami.image_id()))
        .collect();

    let selection = Select::new()
        .with_prompt("Select an AMI")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(options.get(selection).copied().unwrap_or_default())
}

pub fn select_instance_type() -> Result<InstanceType> {
    let options = InstanceType::all();
    let items: Vec<&str> = options.iter().map(|t| t.as_str()).collect();

    let selection = Select::new()
        .with_prompt("Select an instance type")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(options.get(selection).copied().unwrap_or_default())
}

pub fn input_region() -> Result<String> {
    let region: String = Input::new()
        .with_prompt("AWS region")
        .default(ACCEPTED_REGION.to_string())
        .interact_text()?;
    Ok(region)
}

/// Ask for a load balancer name until it passes the naming rules.
pub fn input_alb_name() -> Result<String> {
    let name: String = Input::new()
        .with_prompt("Application Load Balancer name")
        .validate_with(|input: &String| -> Result<(), String> {
            validate_load_balancer_name(input.trim()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    Ok(name.trim().to_string())
}

pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

/// Parse a menu choice given on the command line, falling back to the default option.
pub fn choice_or_default<T>(raw: &str) -> T
where
    T: FromStr + Default + Display,
    T::Err: Display,
{
    match raw.parse() {
        Ok(choice) => choice,
        Err(e) => {
            let fallback = T::default();
            warn!("{}, using {}", e, fallback);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parses_known_values() {
        assert_eq!(choice_or_default::<AmiChoice>("amazon_linux"), AmiChoice::AmazonLinux);
        assert_eq!(choice_or_default::<InstanceType>("t3.medium"), InstanceType::T3Medium);
    }

    #[test]
    fn test_invalid_choice_falls_back_to_first_option() {
        assert_eq!(choice_or_default::<AmiChoice>("windows"), AmiChoice::Ubuntu);
        assert_eq!(choice_or_default::<InstanceType>("m5.large"), InstanceType::T3Small);
        assert_eq!(choice_or_default::<AmiChoice>("3"), AmiChoice::all()[0]);
    }
}
