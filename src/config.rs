use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::boundary_cond::BcKind;
use crate::errors::Result;

// Time bounds of a model run
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ModelSettings {
    #[serde(default = "default_model_name")]
    pub name: String,
    pub tmin: f64,   // Smallest time the inverse transform is valid for
    pub tmax: f64,   // Largest time the inverse transform is valid for
    #[serde(default)]
    pub tstart: f64, // Global time origin
}

fn default_model_name() -> String {
    "ml".to_string()
}

/// Declared construction fields of one element.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ElementConfig {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_kind")]
    pub kind: BcKind,
    #[serde(default = "default_layers")]
    pub layers: Vec<usize>,
    #[serde(default = "default_nparam")]
    pub nparam: usize,
    #[serde(default)]
    pub nunknowns: usize,
    #[serde(default = "default_tsandbc")]
    pub tsandbc: Vec<Vec<f64>>, // Rows of (time, value)
    #[serde(default = "default_rzero")]
    pub rzero: f64,
}

fn default_kind() -> BcKind {
    BcKind::Zero
}

fn default_layers() -> Vec<usize> {
    vec![0]
}

fn default_nparam() -> usize {
    1
}

fn default_tsandbc() -> Vec<Vec<f64>> {
    vec![vec![0.0, 0.0]]
}

fn default_rzero() -> f64 {
    30.0
}

impl ElementConfig {
    pub fn new(name: &str, kind: BcKind) -> Self {
        ElementConfig {
            name: name.to_string(),
            label: None,
            kind,
            layers: default_layers(),
            nparam: default_nparam(),
            nunknowns: 0,
            tsandbc: default_tsandbc(),
            rzero: default_rzero(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_layers(mut self, layers: Vec<usize>) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_nparam(mut self, nparam: usize, nunknowns: usize) -> Self {
        self.nparam = nparam;
        self.nunknowns = nunknowns;
        self
    }

    pub fn with_tsandbc(mut self, tsandbc: &[(f64, f64)]) -> Self {
        self.tsandbc = tsandbc.iter().map(|&(t, v)| vec![t, v]).collect();
        self
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ModelConfig {
    pub model: ModelSettings,
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
}

impl ModelConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let toml_str = fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str)
    }
}
