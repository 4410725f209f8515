//! Template rendering and persistence of the rendered configuration.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::error::{TemplateError, TemplateResult};
use crate::params::DeploymentParameters;

/// File name the rendered configuration is written to.
pub const CONFIGURATION_FILE: &str = "main.tf";

/// A template with `{{ name }}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    source: String,
}

impl Template {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Configuration text with every placeholder substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConfiguration(String);

impl RenderedConfiguration {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RenderedConfiguration {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Template renderer.
pub struct TemplateRenderer {
    placeholder: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a new template renderer.
    pub fn new() -> Self {
        Self {
            // Anchored: only ever applied at the position of a `{{`
            placeholder: Regex::new(r"^\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
                .expect("placeholder pattern is valid"),
        }
    }

    /// Render a template with the variables derived from `params`.
    pub fn render(
        &self,
        params: &DeploymentParameters,
        template: &Template,
    ) -> TemplateResult<RenderedConfiguration> {
        let rendered = self.render_with(&params.to_variables(), template)?;
        info!("Rendered template {}", template.name());
        Ok(rendered)
    }

    /// Render a template with an explicit variable set.
    ///
    /// Fails on the first placeholder that is malformed or not in `variables`.
    pub fn render_with(
        &self,
        variables: &BTreeMap<String, String>,
        template: &Template,
    ) -> TemplateResult<RenderedConfiguration> {
        let content = template.source();
        let mut output = String::with_capacity(content.len());
        let mut copied_up_to = 0;

        self.scan(content, |start, end, name| {
            let value = variables
                .get(name)
                .ok_or_else(|| TemplateError::MissingVariable(name.to_string()))?;
            output.push_str(&content[copied_up_to..start]);
            output.push_str(value);
            copied_up_to = end;
            Ok(())
        })?;
        output.push_str(&content[copied_up_to..]);

        Ok(RenderedConfiguration(output))
    }

    /// Names of all placeholders referenced by a template, in order of appearance.
    pub fn placeholders(&self, template: &Template) -> TemplateResult<Vec<String>> {
        let mut names = Vec::new();
        self.scan(template.source(), |_, _, name| {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
            Ok(())
        })?;
        Ok(names)
    }

    /// Walk every `{{` in `content`, calling `visit(start, end, name)` for each placeholder.
    fn scan<F>(&self, content: &str, mut visit: F) -> TemplateResult<()>
    where
        F: FnMut(usize, usize, &str) -> TemplateResult<()>,
    {
        let mut cursor = 0;
        while let Some(offset) = content[cursor..].find("{{") {
            let start = cursor + offset;
            let caps = self.placeholder.captures(&content[start..]).ok_or_else(|| {
                TemplateError::Parse {
                    line: content[..start].matches('\n').count() + 1,
                    message: "expected `{{ name }}` placeholder".to_string(),
                }
            })?;
            let end = start + caps[0].len();
            visit(start, end, &caps[1])?;
            cursor = end;
        }
        Ok(())
    }

    /// Write rendered configuration to `<dir>/main.tf`, replacing any previous file.
    ///
    /// The text goes to a temporary file in `dir` that is flushed and synced
    /// before being renamed into place, so a failed write never leaves a
    /// truncated configuration behind.
    pub fn write_configuration(
        rendered: &RenderedConfiguration,
        dir: &Path,
    ) -> TemplateResult<PathBuf> {
        Self::write_configuration_text(rendered.as_str(), dir)
    }

    /// Same as [`write_configuration`](Self::write_configuration) for text produced elsewhere.
    pub fn write_configuration_text(text: &str, dir: &Path) -> TemplateResult<PathBuf> {
        let target = dir.join(CONFIGURATION_FILE);
        let write_err = |source: std::io::Error| TemplateError::Write {
            path: target.clone(),
            source,
        };

        fs::create_dir_all(dir).map_err(write_err)?;

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        file.write_all(text.as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;
        file.persist(&target).map_err(|e| write_err(e.error))?;

        debug!("Wrote {} bytes", text.len());
        info!("Generated Terraform configuration at {:?}", target);
        Ok(target)
    }
}
