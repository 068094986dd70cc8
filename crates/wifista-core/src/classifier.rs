// ── Event classifier ──
//
// Maps each driver notification to one of a fixed set of actions and runs
// that action on the dispatch context. Never fails: unknown notifications
// are ignored so newer drivers can add kinds freely.

use std::sync::Weak;

use tracing::{debug, info, trace, warn};

use crate::driver::{NotificationSink, Radio};
use crate::event::{DisconnectReason, IpEvent, IpInfo, Notification, StationEvent};
use crate::policy::Decision;
use crate::session::Session;

/// What the station does in response to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Station started: issue the first connect request.
    Connect,
    /// Station lost (or never got) its association.
    ApplyReconnectPolicy { reason: DisconnectReason },
    /// DHCP completed: the session succeeded.
    AddressAcquired(IpInfo),
    Ignore,
}

/// Pure classification of a notification.
pub fn classify(notification: &Notification) -> Action {
    match notification {
        Notification::Station(StationEvent::Started) => Action::Connect,
        Notification::Station(StationEvent::Disconnected { reason }) => {
            Action::ApplyReconnectPolicy { reason: *reason }
        }
        Notification::Ip(IpEvent::GotIp(info)) => Action::AddressAcquired(*info),
        _ => Action::Ignore,
    }
}

// ── SessionSink ──────────────────────────────────────────────────────

/// Notification sink bound to one session.
///
/// Holds only weak references: the controller owns the session and the
/// platform, and unregisters this sink before releasing either.
pub(crate) struct SessionSink<R> {
    session: Weak<Session>,
    radio: Weak<R>,
}

impl<R> SessionSink<R>
where
    R: Radio + Send + Sync + 'static,
{
    pub(crate) fn new(session: Weak<Session>, radio: Weak<R>) -> Self {
        Self { session, radio }
    }

    /// Issue a connect request. A request that cannot be delivered ends the
    /// session as failed.
    fn request_connect(&self, session: &Session) {
        let Some(radio) = self.radio.upgrade() else {
            warn!("radio released while session active, giving up");
            session.on_connect_rejected();
            return;
        };
        if let Err(e) = radio.connect() {
            warn!(
                error = %e,
                attempts = session.reconnect_count(),
                "connect request rejected by driver, giving up"
            );
            session.on_connect_rejected();
        }
    }
}

impl<R> NotificationSink for SessionSink<R>
where
    R: Radio + Send + Sync + 'static,
{
    fn on_notification(&self, notification: &Notification) {
        let Some(session) = self.session.upgrade() else {
            trace!(%notification, "session gone, ignoring notification");
            return;
        };

        if session.signals().is_terminal() {
            trace!(%notification, "session resolved, ignoring notification");
            return;
        }

        match classify(notification) {
            Action::Connect => {
                debug!("station started, requesting connection");
                self.request_connect(&session);
            }
            Action::ApplyReconnectPolicy { reason } => {
                let policy = session.policy();
                let decision = session.on_disconnected(|attempt| {
                    info!(
                        attempt,
                        max = policy.max_count(),
                        %reason,
                        "(re)trying to connect to the access point"
                    );
                    self.request_connect(&session);
                });
                if decision == Decision::GiveUp {
                    warn!(
                        attempts = session.reconnect_count(),
                        %reason,
                        "reconnect budget exhausted"
                    );
                }
            }
            Action::AddressAcquired(info) => {
                info!(
                    ip = %info.ip,
                    netmask = %info.netmask,
                    gateway = %info.gateway,
                    "got ip"
                );
                session.on_address_acquired(info);
            }
            Action::Ignore => {
                trace!(%notification, "ignoring notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use super::*;
    use crate::config::{ClientConfiguration, RadioInitConfig};
    use crate::driver::{DriverResult, WifiMode};
    use crate::error::DriverError;
    use crate::policy::ReconnectPolicy;
    use crate::signal::Signal;

    /// Radio that only counts connect requests.
    #[derive(Default)]
    struct CountingRadio {
        connects: AtomicU32,
        reject: AtomicBool,
    }

    impl CountingRadio {
        fn connects(&self) -> u32 {
            self.connects.load(Ordering::SeqCst)
        }
    }

    impl Radio for CountingRadio {
        fn radio_init(&self, _config: &RadioInitConfig) -> DriverResult {
            Ok(())
        }
        fn radio_deinit(&self) -> DriverResult {
            Ok(())
        }
        fn set_mode(&self, _mode: WifiMode) -> DriverResult {
            Ok(())
        }
        fn set_config(&self, _config: &ClientConfiguration) -> DriverResult {
            Ok(())
        }
        fn start(&self) -> DriverResult {
            Ok(())
        }
        fn stop(&self) -> DriverResult {
            Ok(())
        }
        fn connect(&self) -> DriverResult {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.reject.load(Ordering::SeqCst) {
                return Err(DriverError::invalid_state("scan in progress"));
            }
            Ok(())
        }
    }

    fn fixture(max: u32) -> (Arc<Session>, Arc<CountingRadio>, SessionSink<CountingRadio>) {
        let session = Arc::new(Session::new(ReconnectPolicy::new(max)));
        let radio = Arc::new(CountingRadio::default());
        let sink = SessionSink::new(Arc::downgrade(&session), Arc::downgrade(&radio));
        (session, radio, sink)
    }

    fn started() -> Notification {
        Notification::Station(StationEvent::Started)
    }

    fn disconnected() -> Notification {
        Notification::Station(StationEvent::Disconnected {
            reason: DisconnectReason::NO_AP_FOUND,
        })
    }

    fn got_ip() -> Notification {
        Notification::Ip(IpEvent::GotIp(IpInfo::with_default_gateway(Ipv4Addr::new(
            192, 168, 1, 77,
        ))))
    }

    #[test]
    fn classification_table() {
        assert_eq!(classify(&started()), Action::Connect);
        assert_eq!(
            classify(&disconnected()),
            Action::ApplyReconnectPolicy {
                reason: DisconnectReason::NO_AP_FOUND
            }
        );
        assert!(matches!(classify(&got_ip()), Action::AddressAcquired(_)));
    }

    #[test]
    fn everything_else_is_ignored() {
        let others = [
            Notification::Station(StationEvent::Stopped),
            Notification::Station(StationEvent::Connected { channel: 6 }),
            Notification::Station(StationEvent::ScanDone { found: 4 }),
            Notification::Station(StationEvent::AuthModeChanged),
            Notification::Ip(IpEvent::LostIp),
            Notification::Other {
                base: "ETH_EVENT".into(),
                id: 0,
            },
        ];
        for n in &others {
            assert_eq!(classify(n), Action::Ignore, "{n}");
        }
    }

    #[test]
    fn started_requests_connect() {
        let (session, radio, sink) = fixture(1);
        sink.on_notification(&started());
        assert_eq!(radio.connects(), 1);
        assert_eq!(session.reconnect_count(), 0);
        assert!(!session.signals().is_terminal());
    }

    #[test]
    fn disconnect_increments_count_and_reconnects() {
        let (session, radio, sink) = fixture(0);
        sink.on_notification(&started());
        for expected in 1..=5 {
            sink.on_notification(&disconnected());
            assert_eq!(session.reconnect_count(), expected);
        }
        assert_eq!(radio.connects(), 6);
        assert!(!session.signals().is_terminal());
    }

    #[test]
    fn exhaustion_leaves_count_unchanged() {
        let (session, radio, sink) = fixture(2);
        sink.on_notification(&started());
        sink.on_notification(&disconnected());
        sink.on_notification(&disconnected());
        sink.on_notification(&disconnected());

        assert_eq!(session.reconnect_count(), 2);
        assert_eq!(radio.connects(), 3);
        assert!(session.signals().current().contains(Signal::Exhausted));
    }

    #[test]
    fn got_ip_resets_and_signals_success() {
        let (session, radio, sink) = fixture(0);
        sink.on_notification(&started());
        sink.on_notification(&disconnected());
        sink.on_notification(&got_ip());

        assert_eq!(session.reconnect_count(), 0);
        assert_eq!(radio.connects(), 2);
        assert!(session.signals().current().contains(Signal::Succeeded));
        assert_eq!(session.ip_info().map(|i| i.ip), Some(Ipv4Addr::new(192, 168, 1, 77)));
    }

    #[test]
    fn notifications_after_success_do_nothing() {
        let (session, radio, sink) = fixture(0);
        sink.on_notification(&started());
        sink.on_notification(&got_ip());
        let connects = radio.connects();

        sink.on_notification(&disconnected());
        sink.on_notification(&started());

        let signals = session.signals().current();
        assert!(signals.contains(Signal::Succeeded));
        assert!(!signals.contains(Signal::Exhausted));
        assert_eq!(session.reconnect_count(), 0);
        assert_eq!(radio.connects(), connects);
    }

    #[test]
    fn notifications_after_exhaustion_do_nothing() {
        let (session, radio, sink) = fixture(1);
        sink.on_notification(&disconnected());
        sink.on_notification(&disconnected());
        assert!(session.signals().current().contains(Signal::Exhausted));
        let connects = radio.connects();

        sink.on_notification(&got_ip());
        sink.on_notification(&disconnected());

        assert!(!session.signals().current().contains(Signal::Succeeded));
        assert_eq!(session.reconnect_count(), 1);
        assert_eq!(radio.connects(), connects);
    }

    #[test]
    fn dropped_session_is_tolerated() {
        let (session, radio, sink) = fixture(0);
        drop(session);
        sink.on_notification(&started());
        assert_eq!(radio.connects(), 0);
    }

    #[test]
    fn rejected_first_connect_exhausts() {
        let (session, radio, sink) = fixture(0);
        radio.reject.store(true, Ordering::SeqCst);
        sink.on_notification(&started());

        assert_eq!(radio.connects(), 1);
        assert_eq!(session.reconnect_count(), 0);
        assert!(session.signals().current().contains(Signal::Exhausted));
    }

    #[test]
    fn rejected_reconnect_exhausts_with_count_kept() {
        let (session, radio, sink) = fixture(5);
        sink.on_notification(&started());
        sink.on_notification(&disconnected());
        radio.reject.store(true, Ordering::SeqCst);
        sink.on_notification(&disconnected());

        assert_eq!(session.reconnect_count(), 2);
        assert_eq!(radio.connects(), 3);
        assert!(session.signals().current().contains(Signal::Exhausted));

        sink.on_notification(&disconnected());
        assert_eq!(radio.connects(), 3);
    }

    #[test]
    fn released_radio_exhausts() {
        let (session, radio, sink) = fixture(0);
        drop(radio);
        sink.on_notification(&started());
        assert!(session.signals().current().contains(Signal::Exhausted));
    }
}
