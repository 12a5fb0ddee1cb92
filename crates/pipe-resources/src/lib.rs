//! # pipe-resources
//!
//! Declarative resource model for the PIPE agent-pipeline control plane.
//!
//! Users submit [`GenericResource`] documents (YAML) of five kinds: Agent,
//! Tool, Guardrail, Pipeline and Execution. This crate parses them, converts
//! spec blocks into typed forms ([`GuardrailSpec`], [`AgentSpec`],
//! [`ToolSpec`]) and performs definition-time validation.
//!
//! ## Key invariants
//!
//! - **Validation collects, never aborts**: [`validate_resource`] returns every
//!   field problem it finds; the caller decides whether to reject.
//! - **Typed vocabulary**: guardrail phases and actions are enums
//!   ([`Phase`], [`EnforcementAction`]) so a typo is reported instead of
//!   silently disabling a guardrail.

pub mod error;
pub mod resource;
pub mod spec;
pub mod validation;

pub use error::ResourceError;
pub use resource::{
    load_resources_file, load_resources_str, GenericResource, Metadata, ResourceKind,
    ResourceStatus,
};
pub use spec::{AgentSpec, EnforcementAction, GuardrailSpec, ModelConfig, Phase, ToolSchema, ToolSpec};
pub use validation::{is_valid_name, validate_resource, ValidationError, ValidationReport};
