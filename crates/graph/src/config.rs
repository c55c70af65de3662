use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GraphError, Result};

/// Engine configuration, loadable from TOML. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub labels: LabelConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical distance between depth bands
    pub row_height: f64,

    /// Horizontal distance between siblings in a band
    pub spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 150.0,
            spacing: 250.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Synthetic organization root of the general, geographical and business views
    pub root: String,

    /// Virtual root of the organizational view when no level-1 unit exists
    pub virtual_root: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            root: "Organization".to_string(),
            virtual_root: "Organization".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(GraphError::InvalidConfig(format!(
                    "layout.{name} must be a positive number (got {value})"
                )))
            }
        };
        positive("row_height", self.layout.row_height)?;
        positive("spacing", self.layout.spacing)?;

        if self.labels.root.trim().is_empty() {
            return Err(GraphError::InvalidConfig("labels.root must not be empty".into()));
        }
        if self.labels.virtual_root.trim().is_empty() {
            return Err(GraphError::InvalidConfig(
                "labels.virtual_root must not be empty".into(),
            ));
        }
        Ok(())
    }
}
