//! YAML configuration for the interval estimators.

use std::path::Path;

use serde::{Deserialize, Serialize};
use yp_core::errors::YpError;
use yp_core::serde::{from_yaml_slice, read_yaml_file, to_yaml_string};

use crate::bootstrap::BootstrapOpts;
use crate::delta::DeltaOpts;

/// Options for both estimators; missing sections and fields take defaults.
///
/// ```yaml
/// bootstrap:
///   resample_count: 5000
///   seed: 7
///   workers: 4
/// delta:
///   confidence_level: 0.9
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UncertaintyConfig {
    /// Bootstrap options.
    pub bootstrap: BootstrapOpts,
    /// Delta-method options.
    pub delta: DeltaOpts,
}

impl UncertaintyConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, YpError> {
        from_yaml_slice(yaml.as_bytes())
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, YpError> {
        to_yaml_string(self)
    }
}

/// Loads an [`UncertaintyConfig`] from a YAML file.
pub fn load_config(path: &Path) -> Result<UncertaintyConfig, YpError> {
    read_yaml_file(path)
}
