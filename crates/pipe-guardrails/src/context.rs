// context.rs — Input to a single guardrail evaluation.

use serde::Serialize;
use serde_json::{Map, Value};

/// Everything a check may look at for one agent step.
///
/// Built fresh by the executor for each evaluation. Checks receive it by
/// shared reference and never modify it. `output` is empty before the model
/// or tool has been called.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationContext {
    pub prompt: String,
    pub output: String,
    pub token_count: usize,
    pub agent: String,
    pub execution_id: String,
    pub step_index: usize,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl EvaluationContext {
    pub fn new(agent: impl Into<String>, execution_id: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            execution_id: execution_id.into(),
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_token_count(mut self, token_count: usize) -> Self {
        self.token_count = token_count;
        self
    }

    pub fn with_step(mut self, step_index: usize) -> Self {
        self.step_index = step_index;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
