// resource.rs — Generic declarative resource envelope.
//
// Every object the control plane manages (Agent, Tool, Guardrail, Pipeline,
// Execution) arrives as the same envelope: apiVersion, kind, metadata, a
// free-form spec block and a status block written by the controller.
//
// The kind is kept as the raw string from the document so that an unknown
// kind surfaces as a validation error rather than a parse failure.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ResourceError;

/// The kinds of resource the control plane understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Agent,
    Tool,
    Guardrail,
    Pipeline,
    Execution,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Agent => "Agent",
            ResourceKind::Tool => "Tool",
            ResourceKind::Guardrail => "Guardrail",
            ResourceKind::Pipeline => "Pipeline",
            ResourceKind::Execution => "Execution",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Agent" => Ok(ResourceKind::Agent),
            "Tool" => Ok(ResourceKind::Tool),
            "Guardrail" => Ok(ResourceKind::Guardrail),
            "Pipeline" => Ok(ResourceKind::Pipeline),
            "Execution" => Ok(ResourceKind::Execution),
            other => Err(ResourceError::UnknownKind(other.to_string())),
        }
    }
}

/// Identifying metadata shared by every resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Observed state, written by the controller and the executor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub health: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: BTreeMap<String, String>,
}

/// A resource as submitted by a user: envelope plus an untyped spec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenericResource {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Map<String, Value>>,
    #[serde(default)]
    pub status: ResourceStatus,
}

impl GenericResource {
    /// Store key: `Kind/namespace/name`.
    pub fn key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.kind, self.metadata.namespace, self.metadata.name
        )
    }

    /// Parse the kind string into a [`ResourceKind`].
    pub fn resource_kind(&self) -> Result<ResourceKind, ResourceError> {
        self.kind.parse()
    }

    /// Convert the untyped spec block into a typed spec (e.g. `GuardrailSpec`).
    pub fn typed_spec<T: DeserializeOwned>(&self) -> Result<T, ResourceError> {
        let spec = self.spec.clone().ok_or_else(|| ResourceError::MissingSpec {
            key: self.key(),
        })?;
        serde_json::from_value(Value::Object(spec)).map_err(|source| {
            ResourceError::InvalidSpec {
                kind: self.kind.clone(),
                source,
            }
        })
    }

    /// Parse a single YAML document into a resource.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ResourceError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Parse every resource in a (possibly multi-document) YAML string.
///
/// Empty documents (e.g. a trailing `---`) are skipped.
pub fn load_resources_str(yaml: &str) -> Result<Vec<GenericResource>, ResourceError> {
    let mut resources = Vec::new();
    for document in serde_yaml::Deserializer::from_str(yaml) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        resources.push(serde_yaml::from_value(value)?);
    }
    Ok(resources)
}

/// Read and parse every resource in a YAML file.
pub fn load_resources_file(path: impl AsRef<Path>) -> Result<Vec<GenericResource>, ResourceError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ResourceError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    load_resources_str(&content)
}
