// schema_validation.rs — Checks that step output is a JSON object with the
// expected top-level keys. Only key presence is checked, not value types.

use serde_json::{Map, Value};

use pipe_resources::Phase;

use crate::context::EvaluationContext;
use crate::guardrail::Guardrail;
use crate::outcome::CheckOutcome;

pub const ID: &str = "output-schema-validation";

#[derive(Debug, Clone, Default)]
pub struct SchemaValidationGuardrail {
    expected_fields: Vec<String>,
}

impl SchemaValidationGuardrail {
    pub fn new<I, S>(expected_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected_fields: expected_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn expected_fields(&self) -> &[String] {
        &self.expected_fields
    }
}

impl Guardrail for SchemaValidationGuardrail {
    fn id(&self) -> &str {
        ID
    }

    fn phase(&self) -> Phase {
        Phase::Post
    }

    fn priority(&self) -> i32 {
        50
    }

    fn evaluate(&self, ctx: &EvaluationContext) -> CheckOutcome {
        if ctx.output.is_empty() {
            return CheckOutcome::warn(ID, "output is empty");
        }
        if self.expected_fields.is_empty() {
            return CheckOutcome::pass(ID, "no schema to validate");
        }

        let parsed: Map<String, Value> = match serde_json::from_str(&ctx.output) {
            Ok(Value::Object(map)) => map,
            // Arrays and scalars have no fields to look up.
            _ => return CheckOutcome::warn(ID, "output is not valid JSON"),
        };

        match self
            .expected_fields
            .iter()
            .find(|field| !parsed.contains_key(field.as_str()))
        {
            Some(missing) => CheckOutcome::warn(ID, format!("missing required field: {missing}")),
            None => CheckOutcome::pass(ID, "schema valid"),
        }
    }
}
