//! Template loading functionality.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{TemplateError, TemplateResult};
use crate::renderer::Template;

/// Loads configuration templates from a directory.
pub struct TemplateLoader {
    templates_path: PathBuf,
}

impl TemplateLoader {
    /// Create a new template loader.
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
        }
    }

    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// Load a single template file by name.
    pub fn load(&self, file_name: &str) -> TemplateResult<Template> {
        let path = self.templates_path.join(file_name);
        if !path.is_file() {
            return Err(TemplateError::NotFound(path));
        }

        debug!("Loading template from {:?}", path);
        let source = fs::read_to_string(&path)?;
        info!("Loaded template: {}", file_name);

        Ok(Template::new(file_name, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_template() {
        let temp = tempdir().unwrap();
        let loader = TemplateLoader::new(temp.path());
        let err = loader.load("main.tf.tpl").unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(p) if p.ends_with("main.tf.tpl")));
    }

    #[test]
    fn test_load_template() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("main.tf.tpl"), "region = \"{{ region }}\"").unwrap();

        let template = TemplateLoader::new(temp.path()).load("main.tf.tpl").unwrap();
        assert_eq!(template.name(), "main.tf.tpl");
        assert!(template.source().contains("{{ region }}"));
    }
}
