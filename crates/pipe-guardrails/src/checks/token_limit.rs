// token_limit.rs — Upper bound on prompt size.

use pipe_resources::Phase;

use crate::context::EvaluationContext;
use crate::guardrail::Guardrail;
use crate::outcome::CheckOutcome;

pub const ID: &str = "token-limit";
pub const DEFAULT_MAX_TOKENS: usize = 4096;

#[derive(Debug, Clone, Copy)]
pub struct TokenLimitGuardrail {
    max_tokens: usize,
}

impl TokenLimitGuardrail {
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }
}

impl Default for TokenLimitGuardrail {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS)
    }
}

impl Guardrail for TokenLimitGuardrail {
    fn id(&self) -> &str {
        ID
    }

    fn phase(&self) -> Phase {
        Phase::Pre
    }

    fn priority(&self) -> i32 {
        90
    }

    fn evaluate(&self, ctx: &EvaluationContext) -> CheckOutcome {
        if ctx.token_count > self.max_tokens {
            return CheckOutcome::block(
                ID,
                format!(
                    "token count {} exceeds limit {}",
                    ctx.token_count, self.max_tokens
                ),
            );
        }
        CheckOutcome::pass(ID, "within token limit")
    }
}
