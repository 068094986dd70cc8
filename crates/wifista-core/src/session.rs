// ── Connection session ──
//
// State for one attempt to reach a network. The controller owns it through
// an `Arc`; the notification sink only holds a `Weak`. `reconnect_count` has
// a single writer, the dispatch context.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

use crate::event::IpInfo;
use crate::policy::{Decision, ReconnectPolicy};
use crate::signal::{Signal, SignalChannel, SignalSet};

/// Session outcome. Leaves `Pending` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Outcome {
    Pending,
    Connected,
    Failed,
}

impl Outcome {
    /// Interpret a snapshot of the signal channel. `Succeeded` wins when
    /// both flags are present.
    pub fn from_signals(observed: SignalSet) -> Self {
        if observed.contains(Signal::Succeeded) {
            Self::Connected
        } else if observed.contains(Signal::Exhausted) {
            Self::Failed
        } else {
            Self::Pending
        }
    }
}

#[derive(Debug)]
pub(crate) struct Session {
    signals: SignalChannel,
    reconnect_count: AtomicU32,
    policy: ReconnectPolicy,
    ip_info: OnceLock<IpInfo>,
    outcome: OnceLock<Outcome>,
}

impl Session {
    pub(crate) fn new(policy: ReconnectPolicy) -> Self {
        Self {
            signals: SignalChannel::new(),
            reconnect_count: AtomicU32::new(0),
            policy,
            ip_info: OnceLock::new(),
            outcome: OnceLock::new(),
        }
    }

    pub(crate) fn signals(&self) -> &SignalChannel {
        &self.signals
    }

    pub(crate) fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub(crate) fn reconnect_count(&self) -> u32 {
        self.reconnect_count.load(Ordering::Relaxed)
    }

    pub(crate) fn ip_info(&self) -> Option<IpInfo> {
        self.ip_info.get().copied()
    }

    pub(crate) fn outcome(&self) -> Outcome {
        self.outcome.get().copied().unwrap_or(Outcome::Pending)
    }

    /// Fix the outcome from what the wait observed. Later calls return the
    /// first resolved value.
    pub(crate) fn resolve(&self, observed: SignalSet) -> Outcome {
        match Outcome::from_signals(observed) {
            Outcome::Pending => self.outcome(),
            resolved => *self.outcome.get_or_init(|| resolved),
        }
    }

    // ── Dispatch-context mutations ───────────────────────────────────

    /// Apply the reconnect policy to one disconnection. On `Retry` the
    /// count has already been incremented; on `GiveUp` the exhaustion flag
    /// is raised and the count is untouched.
    pub(crate) fn on_disconnected(&self, apply_retry: impl FnOnce(u32)) -> Decision {
        let current = self.reconnect_count();
        let decision = self.policy.decide(current);
        match decision {
            Decision::Retry { attempt } => {
                self.reconnect_count.store(attempt, Ordering::Relaxed);
                apply_retry(attempt);
            }
            Decision::GiveUp => {
                self.signals.set(Signal::Exhausted);
            }
        }
        decision
    }

    /// The driver refused a connect request, so no further disconnect will
    /// arrive to drive the policy. Raise `Exhausted` with the count as is.
    pub(crate) fn on_connect_rejected(&self) {
        self.signals.set(Signal::Exhausted);
    }

    /// Record the acquired address, reset the count, raise `Succeeded`.
    pub(crate) fn on_address_acquired(&self, info: IpInfo) {
        let _ = self.ip_info.set(info);
        self.reconnect_count.store(0, Ordering::Relaxed);
        self.signals.set(Signal::Succeeded);
    }
}
