//! YAML configuration for the validation procedures.

use std::path::Path;

use serde::{Deserialize, Serialize};
use yp_core::errors::YpError;
use yp_core::serde::{from_yaml_slice, read_yaml_file, to_yaml_string};

use crate::negative::NegativeControlOpts;
use crate::sensitivity::SensitivityOpts;

/// Options for the randomized and perturbation procedures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Negative-control options.
    pub negative_control: NegativeControlOpts,
    /// Sensitivity options.
    pub sensitivity: SensitivityOpts,
}

impl ValidationConfig {
    /// Parses a YAML document; missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, YpError> {
        from_yaml_slice(yaml.as_bytes())
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, YpError> {
        to_yaml_string(self)
    }
}

/// Loads a [`ValidationConfig`] from a YAML file.
pub fn load_config(path: &Path) -> Result<ValidationConfig, YpError> {
    read_yaml_file(path)
}
