// rate_limiter.rs — Sliding one-minute request window per agent.
//
// Each agent has its own window of admitted request instants. On every
// call the window is pruned to the trailing minute, compared against the
// limit, and (if admitted) extended, all while holding that agent's entry
// lock in the sharded map. Calls for different agents do not contend.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use pipe_resources::Phase;

use crate::clock::{Clock, SystemClock};
use crate::context::EvaluationContext;
use crate::guardrail::Guardrail;
use crate::outcome::CheckOutcome;

pub const ID: &str = "rate-limiter";
pub const DEFAULT_MAX_PER_MINUTE: usize = 100;
const WINDOW: Duration = Duration::from_secs(60);

pub struct RateLimiterGuardrail {
    max_per_minute: usize,
    clock: Arc<dyn Clock>,
    windows: DashMap<String, VecDeque<Instant>>,
}

impl RateLimiterGuardrail {
    pub fn new(max_per_minute: usize) -> Self {
        Self::with_clock(max_per_minute, Arc::new(SystemClock))
    }

    pub fn with_clock(max_per_minute: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_per_minute,
            clock,
            windows: DashMap::new(),
        }
    }

    pub fn max_per_minute(&self) -> usize {
        self.max_per_minute
    }

    /// Requests currently counted against `agent`, without pruning.
    pub fn in_window(&self, agent: &str) -> usize {
        self.windows.get(agent).map_or(0, |w| w.len())
    }

    /// Drop agents whose window has fully expired. Returns how many were
    /// removed.
    pub fn purge_idle(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            prune(window, now);
            !window.is_empty()
        });
        before - self.windows.len()
    }
}

impl Default for RateLimiterGuardrail {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_MINUTE)
    }
}

/// Remove instants at or before `now - WINDOW`. Instants are appended in
/// clock order, so the expired ones are at the front.
fn prune(window: &mut VecDeque<Instant>, now: Instant) {
    let Some(cutoff) = now.checked_sub(WINDOW) else {
        // The process is younger than the window; nothing can have expired.
        return;
    };
    while window.front().is_some_and(|t| *t <= cutoff) {
        window.pop_front();
    }
}

impl Guardrail for RateLimiterGuardrail {
    fn id(&self) -> &str {
        ID
    }

    fn phase(&self) -> Phase {
        Phase::Pre
    }

    fn priority(&self) -> i32 {
        95
    }

    fn evaluate(&self, ctx: &EvaluationContext) -> CheckOutcome {
        let mut window = self.windows.entry(ctx.agent.clone()).or_default();
        // Read the clock under the entry lock so instants stay ordered.
        let now = self.clock.now();
        prune(&mut window, now);

        if window.len() >= self.max_per_minute {
            return CheckOutcome::block(
                ID,
                format!(
                    "rate limit exceeded: {} requests in last minute (max {})",
                    window.len(),
                    self.max_per_minute
                ),
            );
        }
        window.push_back(now);
        CheckOutcome::pass(ID, "within rate limit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn agent(name: &str) -> EvaluationContext {
        EvaluationContext::new(name, "exec")
    }

    fn limiter(max: usize) -> (RateLimiterGuardrail, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let guardrail = RateLimiterGuardrail::with_clock(max, clock.clone());
        (guardrail, clock)
    }

    #[test]
    fn blocks_at_limit_and_recovers_after_window() {
        let (guardrail, clock) = limiter(2);
        let ctx = agent("a1");

        assert!(guardrail.evaluate(&ctx).passed());
        assert!(guardrail.evaluate(&ctx).passed());
        let third = guardrail.evaluate(&ctx);
        assert!(third.is_block());
        assert_eq!(
            third.message(),
            "rate limit exceeded: 2 requests in last minute (max 2)"
        );

        clock.advance(Duration::from_secs(61));
        assert!(guardrail.evaluate(&ctx).passed());
    }

    #[test]
    fn blocked_calls_are_not_recorded() {
        let (guardrail, _clock) = limiter(1);
        let ctx = agent("a1");
        guardrail.evaluate(&ctx);
        for _ in 0..5 {
            assert!(guardrail.evaluate(&ctx).is_block());
        }
        assert_eq!(guardrail.in_window("a1"), 1);
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let (guardrail, clock) = limiter(1);
        let ctx = agent("a1");
        guardrail.evaluate(&ctx);

        clock.advance(Duration::from_secs(59));
        assert!(guardrail.evaluate(&ctx).is_block());

        // Exactly 60s after the admitted request it no longer counts.
        clock.advance(Duration::from_secs(1));
        assert!(guardrail.evaluate(&ctx).passed());
    }

    #[test]
    fn agents_have_independent_windows() {
        let (guardrail, _clock) = limiter(1);
        assert!(guardrail.evaluate(&agent("a1")).passed());
        assert!(guardrail.evaluate(&agent("a2")).passed());
        assert!(guardrail.evaluate(&agent("a1")).is_block());
    }

    #[test]
    fn zero_limit_blocks_everything() {
        let (guardrail, _clock) = limiter(0);
        assert!(guardrail.evaluate(&agent("a1")).is_block());
    }

    #[test]
    fn purge_idle_drops_expired_agents() {
        let (guardrail, clock) = limiter(5);
        guardrail.evaluate(&agent("old"));
        clock.advance(Duration::from_secs(30));
        guardrail.evaluate(&agent("recent"));
        clock.advance(Duration::from_secs(45));

        assert_eq!(guardrail.purge_idle(), 1);
        assert_eq!(guardrail.in_window("old"), 0);
        assert_eq!(guardrail.in_window("recent"), 1);
    }
}
