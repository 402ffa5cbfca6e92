//! Configuration loading for omicsloop.
//! Reads omicsloop.toml from the current directory or path in OMICSLOOP_CONFIG env var.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use omicsloop_config::ClosedLoopConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub inputs: InputsConfig,
    #[serde(default)]
    pub analysis: ClosedLoopConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Delimited gene × sample matrices and the clinical table.
/// `.csv` files are comma-separated, anything else is read as TSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    pub expression: String,
    pub clinical: String,
    pub cnv: Option<String>,
    pub methylation: Option<String>,
    pub mutation: Option<String>,
    /// Skip candidate selection and analyse these genes only
    pub target_genes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_report_path")]
    pub report_path: String,
    #[serde(default = "bool_true")]
    pub pretty: bool,
    /// Wall-clock limit for one analysis; none by default
    pub timeout_secs: Option<u64>,
}

fn default_report_path() -> String { "omicsloop_report.json".to_string() }
fn bool_true()           -> bool   { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            pretty: true,
            timeout_secs: None,
        }
    }
}


impl Config {
    /// Config file path: OMICSLOOP_CONFIG env var, else omicsloop.toml in the
    /// current directory.
    pub fn path() -> String {
        std::env::var("OMICSLOOP_CONFIG").unwrap_or_else(|_| "omicsloop.toml".to_string())
    }

    /// Load and validate the config at `path`.
    /// `Ok(None)` when the file does not exist; parse and validation
    /// failures are errors.
    pub fn load_from(path: &str) -> anyhow::Result<Option<Self>> {
        if !Path::new(path).exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {path}"))?;
        let config = Self::from_toml_str(&content).with_context(|| format!("invalid {path}"))?;
        Ok(Some(config))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.analysis.validate()?;
        Ok(config)
    }
}
