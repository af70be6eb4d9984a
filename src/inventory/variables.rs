use crate::inventory::InventoryError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Shared variables available to node address templates.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateVariables {
    values: serde_json::Value,
}

impl TemplateVariables {
    pub fn new(values: serde_json::Value) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self::new(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Load variables from a YAML mapping. A missing file yields an empty
    /// set; templates that need a variable then fail at render time.
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "Template variables file {} not found, rendering without variables",
                    path.display()
                );
                return Ok(Self::empty());
            }
            Err(e) => return Err(e.into()),
        };

        Self::parse(&content).map_err(|reason| InventoryError::InvalidVariables {
            path: path.display().to_string(),
            reason,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let values: Option<serde_json::Value> =
            serde_yaml::from_str(content).map_err(|e| e.to_string())?;

        match values {
            None | Some(serde_json::Value::Null) => Ok(Self::empty()),
            Some(values @ serde_json::Value::Object(_)) => {
                debug!(
                    "Loaded {} template variables",
                    values.as_object().map_or(0, |map| map.len())
                );
                Ok(Self::new(values))
            }
            Some(_) => Err("top level must be a mapping".to_string()),
        }
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let vars = TemplateVariables::load(&dir.path().join("main.yml")).unwrap();
        assert_eq!(vars, TemplateVariables::empty());
    }

    #[test]
    fn sequence_at_top_level_is_rejected() {
        assert!(TemplateVariables::parse("- a\n- b\n").is_err());
    }

    #[test]
    fn nested_values_are_kept() {
        let vars = TemplateVariables::parse("compute_subnet: 10.0.0\nnet:\n  gw: 10.0.0.1\n").unwrap();
        assert_eq!(vars.as_value()["net"]["gw"], "10.0.0.1");
    }
}
