// validation.rs — Definition-time validation of submitted resources.
//
// Validation never fails fast: every problem found is recorded as a
// field + message pair so a caller (API server, CLI) can show them all at
// once and decide whether to accept or reject the resource.
//
// Checks performed:
//   1. Envelope: apiVersion, kind (known), metadata name/namespace/version.
//   2. Names: lowercase alphanumerics and hyphens, at most 63 characters,
//      no leading or trailing hyphen.
//   3. Spec present.
//   4. Per-kind required spec fields.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::resource::{GenericResource, ResourceKind};
use crate::spec::{EnforcementAction, Phase};

const MAX_NAME_LEN: usize = 63;

/// A single validation problem on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("field '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn required(field: impl Into<String>) -> Self {
        Self::new(field, "required")
    }
}

/// All problems found on one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any error was recorded against `field`.
    pub fn has_error_on(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "valid");
        }
        let joined: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", joined.join("; "))
    }
}

/// Validate a resource envelope and its kind-specific spec.
pub fn validate_resource(resource: &GenericResource) -> ValidationReport {
    let mut errors = Vec::new();

    if resource.api_version.is_empty() {
        errors.push(ValidationError::required("apiVersion"));
    }

    let kind = if resource.kind.is_empty() {
        errors.push(ValidationError::required("kind"));
        None
    } else {
        match resource.resource_kind() {
            Ok(kind) => Some(kind),
            Err(e) => {
                errors.push(ValidationError::new("kind", e.to_string()));
                None
            }
        }
    };

    validate_name("metadata.name", &resource.metadata.name, &mut errors);
    validate_name("metadata.namespace", &resource.metadata.namespace, &mut errors);
    if resource.metadata.version.is_empty() {
        errors.push(ValidationError::required("metadata.version"));
    }

    match &resource.spec {
        None => errors.push(ValidationError::required("spec")),
        Some(spec) => match kind {
            Some(ResourceKind::Agent) => validate_agent_spec(spec, &mut errors),
            Some(ResourceKind::Tool) => validate_tool_spec(spec, &mut errors),
            Some(ResourceKind::Guardrail) => validate_guardrail_spec(spec, &mut errors),
            Some(ResourceKind::Pipeline) => validate_pipeline_spec(spec, &mut errors),
            Some(ResourceKind::Execution) => validate_execution_spec(spec, &mut errors),
            None => {}
        },
    }

    ValidationReport { errors }
}

/// Whether `name` is a DNS-label-like identifier.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    let allowed = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    allowed && !name.starts_with('-') && !name.ends_with('-')
}

fn validate_name(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errors.push(ValidationError::required(field));
    } else if !is_valid_name(value) {
        errors.push(ValidationError::new(
            field,
            "must be lowercase alphanumeric with hyphens, max 63 chars",
        ));
    }
}

/// Record an error unless `spec[field]` is a non-empty string.
/// Returns the string when it is present and valid.
fn require_string<'a>(
    spec: &'a Map<String, Value>,
    field: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a str> {
    let path = format!("spec.{field}");
    match spec.get(field) {
        None => {
            errors.push(ValidationError::required(path));
            None
        }
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        Some(_) => {
            errors.push(ValidationError::new(path, "must be a non-empty string"));
            None
        }
    }
}

fn require_present(spec: &Map<String, Value>, field: &str, errors: &mut Vec<ValidationError>) {
    if !spec.contains_key(field) {
        errors.push(ValidationError::required(format!("spec.{field}")));
    }
}

fn validate_agent_spec(spec: &Map<String, Value>, errors: &mut Vec<ValidationError>) {
    require_string(spec, "runtime", errors);
    require_present(spec, "model", errors);
}

fn validate_tool_spec(spec: &Map<String, Value>, errors: &mut Vec<ValidationError>) {
    require_string(spec, "type", errors);
}

fn validate_guardrail_spec(spec: &Map<String, Value>, errors: &mut Vec<ValidationError>) {
    require_string(spec, "type", errors);

    if let Some(phase) = require_string(spec, "phase", errors) {
        if phase.parse::<Phase>().is_err() {
            errors.push(ValidationError::new(
                "spec.phase",
                "must be 'pre', 'post', or 'both'",
            ));
        }
    }

    if let Some(action) = require_string(spec, "action", errors) {
        if action.parse::<EnforcementAction>().is_err() {
            errors.push(ValidationError::new(
                "spec.action",
                "must be 'block', 'warn', or 'log'",
            ));
        }
    }

    if let Some(priority) = spec.get("priority") {
        if !priority.is_i64() {
            errors.push(ValidationError::new("spec.priority", "must be an integer"));
        }
    }

    if let Some(config) = spec.get("config") {
        if !config.is_object() {
            errors.push(ValidationError::new("spec.config", "must be a mapping"));
        }
    }
}

fn validate_pipeline_spec(spec: &Map<String, Value>, errors: &mut Vec<ValidationError>) {
    require_present(spec, "steps", errors);
}

fn validate_execution_spec(spec: &Map<String, Value>, errors: &mut Vec<ValidationError>) {
    require_string(spec, "agentName", errors);
}
