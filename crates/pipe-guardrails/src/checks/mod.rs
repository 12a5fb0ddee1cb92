// checks/mod.rs — Built-in guardrail checks.
//
// | type               | default id               | phase | priority | state            |
// |--------------------|--------------------------|-------|----------|------------------|
// | prompt-injection   | prompt-injection         | pre   | 100      | none             |
// | rate-limiter       | rate-limiter             | pre   | 95       | per-agent window |
// | token-limit        | token-limit              | pre   | 90       | none             |
// | loop-detection     | loop-detection           | both  | 80       | per-execution    |
// | schema-validation  | output-schema-validation | post  | 50       | none             |

pub mod loop_detection;
pub mod prompt_injection;
pub mod rate_limiter;
pub mod schema_validation;
pub mod token_limit;

pub use loop_detection::LoopDetectionGuardrail;
pub use prompt_injection::PromptInjectionGuardrail;
pub use rate_limiter::RateLimiterGuardrail;
pub use schema_validation::SchemaValidationGuardrail;
pub use token_limit::TokenLimitGuardrail;
