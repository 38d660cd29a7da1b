//! Example metadata: names, descriptions and result-page text.
//!
//! The launcher ships a manifest in `assets/manifest.json`; a different one
//! can be supplied at startup.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

const EMBEDDED: &str = include_str!("../assets/manifest.json");

/// Which platform API an example belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiType {
    ESignature,
    Rooms,
    Admin,
}

impl ApiType {
    /// Name used by the manifest.
    pub fn manifest_name(self) -> &'static str {
        match self {
            ApiType::ESignature => "eSignature",
            ApiType::Rooms => "Rooms",
            ApiType::Admin => "Admin",
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_name())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(rename = "APIs")]
    pub apis: Vec<ApiGroup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiGroup {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<ExampleGroup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExampleGroup {
    pub name: String,
    #[serde(default)]
    pub examples: Vec<ExampleInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExampleInfo {
    pub example_number: u32,
    pub example_name: String,
    #[serde(default)]
    pub example_description: String,
    #[serde(default)]
    pub results_page_text: String,
    #[serde(default)]
    pub page_title: Option<String>,
}

impl Manifest {
    /// The manifest compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED).context("embedded manifest is invalid")
    }

    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a manifest from disk, or the embedded one when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read manifest {}", path.display()))?;
                Self::parse(&json)
                    .with_context(|| format!("failed to parse manifest {}", path.display()))
            }
            None => Self::embedded(),
        }
    }

    pub fn get_example_by_number(&self, number: u32, api: ApiType) -> Option<&ExampleInfo> {
        self.apis
            .iter()
            .find(|a| a.name == api.manifest_name())?
            .groups
            .iter()
            .flat_map(|g| g.examples.iter())
            .find(|e| e.example_number == number)
    }
}
