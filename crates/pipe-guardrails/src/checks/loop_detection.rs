// loop_detection.rs — Detects an execution repeating the same step content.
//
// Every call increments a counter keyed by (execution id, fingerprint of
// prompt + output). Once the counter exceeds `max_repeats` the step is
// blocked. Counters are never decremented or evicted automatically; the
// executor releases a finished execution with `forget_execution`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pipe_resources::Phase;

use crate::context::EvaluationContext;
use crate::fingerprint::content_fingerprint;
use crate::guardrail::Guardrail;
use crate::outcome::CheckOutcome;

pub const ID: &str = "loop-detection";
pub const DEFAULT_MAX_REPEATS: u32 = 3;

type SeenKey = (String, String);

#[derive(Debug)]
pub struct LoopDetectionGuardrail {
    max_repeats: u32,
    seen: Mutex<HashMap<SeenKey, u32>>,
}

impl LoopDetectionGuardrail {
    pub fn new(max_repeats: u32) -> Self {
        Self {
            max_repeats,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_repeats(&self) -> u32 {
        self.max_repeats
    }

    /// Number of (execution, content) pairs currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    // A panic elsewhere while the lock was held cannot leave a counter
    // half-written, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<SeenKey, u32>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoopDetectionGuardrail {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REPEATS)
    }
}

impl Guardrail for LoopDetectionGuardrail {
    fn id(&self) -> &str {
        ID
    }

    fn phase(&self) -> Phase {
        Phase::Both
    }

    fn priority(&self) -> i32 {
        80
    }

    fn evaluate(&self, ctx: &EvaluationContext) -> CheckOutcome {
        let key = (
            ctx.execution_id.clone(),
            content_fingerprint(&ctx.prompt, &ctx.output),
        );

        let count = {
            let mut seen = self.lock();
            let count = seen.entry(key).or_insert(0);
            *count = count.saturating_add(1);
            *count
        };

        if count > self.max_repeats {
            return CheckOutcome::block(
                ID,
                format!(
                    "loop detected: same content repeated {} times (max {})",
                    count, self.max_repeats
                ),
            );
        }
        CheckOutcome::pass(ID, "no loop detected")
    }

    fn forget_execution(&self, execution_id: &str) -> usize {
        let mut seen = self.lock();
        let before = seen.len();
        seen.retain(|(exec, _), _| exec != execution_id);
        before - seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn step(exec: &str, prompt: &str) -> EvaluationContext {
        EvaluationContext::new("agent", exec).with_prompt(prompt)
    }

    #[test]
    fn blocks_after_max_repeats() {
        let guardrail = LoopDetectionGuardrail::new(3);
        let ctx = step("exec-1", "summarise");

        for _ in 0..3 {
            assert!(guardrail.evaluate(&ctx).passed());
        }
        let fourth = guardrail.evaluate(&ctx);
        assert!(fourth.is_block());
        assert_eq!(
            fourth.message(),
            "loop detected: same content repeated 4 times (max 3)"
        );
        // Keeps blocking; the counter is never reset by a block.
        assert!(guardrail.evaluate(&ctx).is_block());
    }

    #[test]
    fn executions_are_counted_separately() {
        let guardrail = LoopDetectionGuardrail::new(3);
        for _ in 0..4 {
            guardrail.evaluate(&step("exec-1", "summarise"));
        }
        assert!(guardrail.evaluate(&step("exec-2", "summarise")).passed());
        assert_eq!(guardrail.tracked_keys(), 2);
    }

    #[test]
    fn output_is_part_of_the_fingerprint() {
        let guardrail = LoopDetectionGuardrail::new(1);
        let pre = step("exec-1", "p");
        let post = step("exec-1", "p").with_output("answer");
        assert!(guardrail.evaluate(&pre).passed());
        assert!(guardrail.evaluate(&post).passed());
        assert!(guardrail.evaluate(&pre).is_block());
    }

    #[test]
    fn forget_execution_resets_only_that_execution() {
        let guardrail = LoopDetectionGuardrail::new(1);
        guardrail.evaluate(&step("exec-1", "a"));
        guardrail.evaluate(&step("exec-1", "b"));
        guardrail.evaluate(&step("exec-2", "a"));

        assert_eq!(guardrail.forget_execution("exec-1"), 2);
        assert_eq!(guardrail.tracked_keys(), 1);
        assert!(guardrail.evaluate(&step("exec-1", "a")).passed());
        assert!(guardrail.evaluate(&step("exec-2", "a")).is_block());
    }

    #[test]
    fn zero_max_blocks_first_call() {
        let guardrail = LoopDetectionGuardrail::new(0);
        assert!(guardrail.evaluate(&step("e", "x")).is_block());
    }

    #[test]
    fn poisoned_map_keeps_counting() {
        let guardrail = Arc::new(LoopDetectionGuardrail::new(1));
        assert!(guardrail.evaluate(&step("exec-1", "a")).passed());

        let holder = Arc::clone(&guardrail);
        let crashed = thread::spawn(move || {
            let _seen = holder.seen.lock().unwrap();
            panic!("crash while holding the map");
        })
        .join();
        assert!(crashed.is_err());
        assert!(guardrail.seen.is_poisoned());

        assert_eq!(guardrail.tracked_keys(), 1);
        assert!(guardrail.evaluate(&step("exec-1", "a")).is_block());
        assert!(guardrail.evaluate(&step("exec-1", "b")).passed());
        assert_eq!(guardrail.forget_execution("exec-1"), 2);
    }
}
