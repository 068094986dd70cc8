// ── Signal channel ──
//
// Monotone set of terminal flags shared between the notification-dispatch
// context (which sets them) and the constructing caller (which waits on
// them). Flags are never cleared; every session gets a fresh channel.

use std::fmt;
use std::ops::BitOr;
use std::time::Duration;

use tokio::sync::watch;

// ── Signal ───────────────────────────────────────────────────────────

/// Terminal outcome raised by the event classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Signal {
    /// An address was acquired.
    Succeeded,
    /// The reconnect budget ran out.
    Exhausted,
}

impl Signal {
    pub const ALL: [Signal; 2] = [Signal::Succeeded, Signal::Exhausted];

    const fn bit(self) -> u8 {
        match self {
            Self::Succeeded => 1 << 0,
            Self::Exhausted => 1 << 1,
        }
    }
}

impl BitOr for Signal {
    type Output = SignalSet;

    fn bitor(self, rhs: Self) -> SignalSet {
        SignalSet(self.bit() | rhs.bit())
    }
}

// ── SignalSet ────────────────────────────────────────────────────────

/// A set of [`Signal`]s. Bit layout is private to this module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SignalSet(u8);

impl SignalSet {
    pub const EMPTY: Self = Self(0);

    /// Every signal that ends a connection wait.
    pub const TERMINAL: Self = Self(Signal::Succeeded.bit() | Signal::Exhausted.bit());

    pub const fn contains(self, signal: Signal) -> bool {
        self.0 & signal.bit() != 0
    }

    /// Add `signal`, returning `true` if it was not already present.
    pub fn insert(&mut self, signal: Signal) -> bool {
        let before = self.0;
        self.0 |= signal.bit();
        before != self.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Signal> {
        Signal::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl From<Signal> for SignalSet {
    fn from(signal: Signal) -> Self {
        Self(signal.bit())
    }
}

impl FromIterator<Signal> for SignalSet {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for signal in iter {
            set.insert(signal);
        }
        set
    }
}

impl fmt::Display for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<String> = self.iter().map(|s| s.to_string()).collect();
        f.write_str(&names.join("|"))
    }
}

// ── SignalChannel ────────────────────────────────────────────────────

/// Thread-safe flag set with a wait that wakes as soon as a requested flag
/// is raised. Backed by a `watch` channel, so there is no polling and a
/// flag set before the wait starts is still observed.
#[derive(Debug)]
pub struct SignalChannel {
    state: watch::Sender<SignalSet>,
}

impl SignalChannel {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SignalSet::EMPTY);
        Self { state }
    }

    /// Raise `signal`. Idempotent; returns `true` only for the call that
    /// actually set it. Callable from any thread or task.
    pub fn set(&self, signal: Signal) -> bool {
        // `send_if_modified` updates even with zero receivers.
        self.state.send_if_modified(|set| set.insert(signal))
    }

    /// Snapshot of the flags currently raised.
    pub fn current(&self) -> SignalSet {
        *self.state.borrow()
    }

    /// Whether any terminal flag has been raised.
    pub fn is_terminal(&self) -> bool {
        self.current().intersects(SignalSet::TERMINAL)
    }

    /// Wait until at least one flag in `wanted` is set, or `timeout`
    /// elapses (`None` waits forever). Returns every flag set at wake-up;
    /// nothing is cleared.
    pub async fn wait_for_any(&self, wanted: SignalSet, timeout: Option<Duration>) -> SignalSet {
        let mut rx = self.state.subscribe();
        let wait = rx.wait_for(|set| set.intersects(wanted));

        match timeout {
            None => {
                let _ = wait.await;
            }
            Some(limit) => {
                let _ = tokio::time::timeout(limit, wait).await;
            }
        }

        self.current()
    }
}

impl Default for SignalChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn set_is_idempotent() {
        let channel = SignalChannel::new();
        assert!(channel.set(Signal::Succeeded));
        assert!(!channel.set(Signal::Succeeded));
        assert_eq!(channel.current(), SignalSet::from(Signal::Succeeded));
    }

    #[test]
    fn flags_accumulate_and_never_clear() {
        let channel = SignalChannel::new();
        channel.set(Signal::Succeeded);
        channel.set(Signal::Exhausted);

        let current = channel.current();
        assert!(current.contains(Signal::Succeeded));
        assert!(current.contains(Signal::Exhausted));
        assert_eq!(current, SignalSet::TERMINAL);
    }

    #[test]
    fn signal_set_display() {
        assert_eq!(SignalSet::EMPTY.to_string(), "none");
        assert_eq!(
            (Signal::Succeeded | Signal::Exhausted).to_string(),
            "succeeded|exhausted"
        );
        let set: SignalSet = [Signal::Exhausted].into_iter().collect();
        assert_eq!(set.to_string(), "exhausted");
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_set() {
        let channel = SignalChannel::new();
        channel.set(Signal::Exhausted);

        let observed = channel.wait_for_any(SignalSet::TERMINAL, None).await;
        assert!(observed.contains(Signal::Exhausted));
        assert!(!observed.contains(Signal::Succeeded));
    }

    #[tokio::test]
    async fn wait_is_woken_from_another_thread() {
        let channel = Arc::new(SignalChannel::new());
        let setter = Arc::clone(&channel);

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            setter.set(Signal::Succeeded);
        });

        let observed = channel.wait_for_any(SignalSet::TERMINAL, None).await;
        assert!(observed.contains(Signal::Succeeded));
        handle.join().expect("setter thread panicked");
    }

    #[tokio::test]
    async fn wait_ignores_flags_outside_the_request() {
        let channel = SignalChannel::new();
        channel.set(Signal::Exhausted);

        let observed = channel
            .wait_for_any(Signal::Succeeded.into(), Some(Duration::from_millis(10)))
            .await;
        // Timed out, but still reports everything that is set.
        assert_eq!(observed, SignalSet::from(Signal::Exhausted));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_with_empty_set() {
        let channel = SignalChannel::new();
        let observed = channel
            .wait_for_any(SignalSet::TERMINAL, Some(Duration::from_secs(30)))
            .await;
        assert!(observed.is_empty());
        assert!(!channel.is_terminal());
    }
}
