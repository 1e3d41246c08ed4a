use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::OperatingSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    ArtifactGroup,
    ArtifactFiles,
    ClientAction,
    Command,
    Directory,
    File,
    Grep,
    ListFiles,
    Path,
    RegistryKey,
    RegistryValue,
    Wmi,
    /// Catch-all for source kinds this build does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

/// One collection step of an artifact. Attributes are free-form and only
/// meaningful to the collector named by `source_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSource {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub returned_types: Vec<String>,
    #[serde(default)]
    pub supported_os: HashSet<OperatingSystem>,
}

/// Declarative recipe describing what to collect from a client and on
/// which platforms the recipe applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub supported_os: HashSet<OperatingSystem>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub path_dependencies: Vec<String>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub sources: Vec<ArtifactSource>,
}
