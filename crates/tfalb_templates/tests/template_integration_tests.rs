//! Integration tests for the bundled Terraform template.

use std::fs;
use std::path::Path;

use tfalb_templates::{
    AmiChoice, DeploymentParameters, InstanceType, TemplateError, TemplateLoader,
    TemplateRenderer, ACCEPTED_REGION,
};
use tempfile::tempdir;

fn get_templates_path() -> String {
    // Try to find templates directory relative to workspace
    let candidates = [
        "templates",
        "../templates",
        "../../templates",
        "../../../templates",
    ];

    for candidate in candidates {
        if Path::new(candidate).join("main.tf.tpl").exists() {
            return candidate.to_string();
        }
    }

    "templates".to_string()
}

fn all_parameter_sets() -> Vec<DeploymentParameters> {
    let mut sets = Vec::new();
    for ami in AmiChoice::all() {
        for instance_type in InstanceType::all() {
            for region in ["us-east-2", "us-west-1", ""] {
                sets.push(
                    DeploymentParameters::builder(ami, instance_type, "my-alb")
                        .region(region)
                        .build()
                        .unwrap(),
                );
            }
        }
    }
    sets
}

#[test]
fn test_bundled_template_renders_completely() {
    let template = TemplateLoader::new(get_templates_path())
        .load("main.tf.tpl")
        .unwrap();
    let renderer = TemplateRenderer::new();

    for params in all_parameter_sets() {
        let rendered = renderer.render(&params, &template).unwrap();
        assert!(!rendered.as_str().contains("{{"), "unresolved placeholder");
        assert!(rendered.as_str().contains(params.ami().image_id()));
        assert!(rendered
            .as_str()
            .contains(&format!("instance_type               = \"{}\"", params.instance_type())));
    }
}

#[test]
fn test_invalid_region_is_coerced_before_rendering() {
    let params = DeploymentParameters::builder(AmiChoice::Ubuntu, InstanceType::T3Small, "my-alb")
        .region("us-west-1")
        .build()
        .unwrap();
    let template = TemplateLoader::new(get_templates_path())
        .load("main.tf.tpl")
        .unwrap();

    let rendered = TemplateRenderer::new().render(&params, &template).unwrap();

    assert!(rendered
        .as_str()
        .contains(&format!("region = \"{}\"", ACCEPTED_REGION)));
    assert!(!rendered.as_str().contains("us-west-1"));
}

#[test]
fn test_bundled_template_only_uses_known_variables() {
    let template = TemplateLoader::new(get_templates_path())
        .load("main.tf.tpl")
        .unwrap();
    let params = DeploymentParameters::builder(AmiChoice::Ubuntu, InstanceType::T3Small, "x")
        .build()
        .unwrap();
    let known = params.to_variables();

    for name in TemplateRenderer::new().placeholders(&template).unwrap() {
        assert!(known.contains_key(&name), "unknown placeholder {}", name);
    }
}

#[test]
fn test_render_and_write() {
    let temp = tempdir().unwrap();
    let params = DeploymentParameters::builder(AmiChoice::AmazonLinux, InstanceType::T3Medium, "web-lb")
        .build()
        .unwrap();
    let template = TemplateLoader::new(get_templates_path())
        .load("main.tf.tpl")
        .unwrap();

    let rendered = TemplateRenderer::new().render(&params, &template).unwrap();
    let path = TemplateRenderer::write_configuration(&rendered, &temp.path().join("generated")).unwrap();

    let written = fs::read_to_string(path).unwrap();
    assert_eq!(written, rendered.as_str());
    assert!(written.contains("name               = \"web-lb\""));
}

#[test]
fn test_custom_template_with_unknown_placeholder_fails() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("main.tf.tpl"),
        "region = \"{{ region }}\"\nkey = \"{{ key_pair }}\"\n",
    )
    .unwrap();
    let params = DeploymentParameters::builder(AmiChoice::Ubuntu, InstanceType::T3Small, "my-alb")
        .build()
        .unwrap();
    let template = TemplateLoader::new(temp.path()).load("main.tf.tpl").unwrap();

    let err = TemplateRenderer::new().render(&params, &template).unwrap_err();
    assert!(matches!(err, TemplateError::MissingVariable(ref name) if name == "key_pair"));
}
