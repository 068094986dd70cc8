// ── Reconnect policy ──
//
// Pure retry-or-give-up decision applied on every disconnection. Retries are
// immediate; the budget bounds the count, not the time.

/// Budget value meaning "retry without bound".
pub const UNBOUNDED: u32 = 0;

/// `true` when another connection attempt is allowed.
///
/// A `max_count` of [`UNBOUNDED`] always retries; otherwise retries while
/// `current_count < max_count`.
pub const fn should_retry(current_count: u32, max_count: u32) -> bool {
    max_count == UNBOUNDED || current_count < max_count
}

/// Outcome of applying the policy to one disconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Request a new connection; `attempt` is the reconnect count after
    /// this retry.
    Retry { attempt: u32 },
    GiveUp,
}

/// Reconnect budget fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    max_count: u32,
}

impl ReconnectPolicy {
    pub const fn new(max_count: u32) -> Self {
        Self { max_count }
    }

    pub const fn unbounded() -> Self {
        Self::new(UNBOUNDED)
    }

    pub const fn max_count(&self) -> u32 {
        self.max_count
    }

    pub const fn is_unbounded(&self) -> bool {
        self.max_count == UNBOUNDED
    }

    pub const fn should_retry(&self, current_count: u32) -> bool {
        should_retry(current_count, self.max_count)
    }

    pub const fn decide(&self, current_count: u32) -> Decision {
        if self.should_retry(current_count) {
            Decision::Retry {
                attempt: current_count.saturating_add(1),
            }
        } else {
            Decision::GiveUp
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_always_retries() {
        for n in [0, 1, 2, 100, u32::MAX] {
            assert!(should_retry(n, 0), "should_retry({n}, 0) must be true");
        }
    }

    #[test]
    fn bounded_budget_retries_while_below_max() {
        for max in 1..=5 {
            for n in 0..=7 {
                assert_eq!(should_retry(n, max), n < max, "n={n} max={max}");
            }
        }
    }

    #[test]
    fn decide_reports_next_attempt() {
        let policy = ReconnectPolicy::new(2);
        assert_eq!(policy.decide(0), Decision::Retry { attempt: 1 });
        assert_eq!(policy.decide(1), Decision::Retry { attempt: 2 });
        assert_eq!(policy.decide(2), Decision::GiveUp);
    }

    #[test]
    fn unbounded_attempt_saturates() {
        let policy = ReconnectPolicy::unbounded();
        assert!(policy.is_unbounded());
        assert_eq!(
            policy.decide(u32::MAX),
            Decision::Retry { attempt: u32::MAX }
        );
    }
}
