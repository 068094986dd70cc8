// ── Station controller ──
//
// Acquires every platform resource in order, registers the session sink,
// starts the radio, and waits for a terminal signal. A `Station` value only
// exists once connected; any failure releases what was acquired.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classifier::SessionSink;
use crate::config::{Ssid, StationConfig};
use crate::driver::{EventFilter, NotificationSink, Platform};
use crate::error::{SetupStage, StationError};
use crate::event::{EventCategory, EventKind, IpInfo};
use crate::guard::{
    EventLoopGuard, NetifGuard, RadioGuard, StartedRadio, StationNetifGuard, SubscriptionGuard,
};
use crate::session::{Outcome, Session};
use crate::signal::SignalSet;

/// A connected wireless station.
///
/// Owns the platform resources for as long as it lives. Dropping it stops
/// the radio, unregisters both sinks, then releases the remaining resources
/// in reverse order of acquisition.
pub struct Station<P: Platform> {
    // Fields drop in declaration order: keep them in reverse acquisition order.
    _started: StartedRadio<P>,
    _ip_events: SubscriptionGuard<P>,
    _station_events: SubscriptionGuard<P>,
    _radio: RadioGuard<P>,
    _sta_netif: StationNetifGuard<P>,
    _event_loop: EventLoopGuard<P>,
    _netif: NetifGuard<P>,
    session: Arc<Session>,
    ssid: Ssid,
}

impl<P: Platform> Station<P> {
    /// Bring the station up and wait until it either acquires an address or
    /// gives up.
    ///
    /// Waits indefinitely unless `config.connect_timeout` is set.
    ///
    /// # Errors
    ///
    /// - [`StationError::ResourceInit`] when a setup step fails
    /// - [`StationError::ConnectionFailed`] when the reconnect budget runs out
    ///   or the driver rejects a connect request
    /// - [`StationError::UnexpectedEvent`] when the wait ends without a
    ///   terminal signal
    pub async fn connect(platform: Arc<P>, config: StationConfig) -> Result<Self, StationError> {
        let ssid = config.credentials.ssid.clone();
        let policy = config.policy();
        info!(
            %ssid,
            max_reconnect = policy.max_count(),
            timeout_secs = config.connect_timeout.map(|t| t.as_secs()),
            "starting wifi station"
        );

        let session = Arc::new(Session::new(policy));

        let netif = NetifGuard::acquire(&platform)?;
        let event_loop = EventLoopGuard::acquire(&platform)?;
        let sta_netif = StationNetifGuard::acquire(&platform);
        let radio = RadioGuard::acquire(&platform, &config.radio)?;

        let sink: Arc<dyn NotificationSink> = Arc::new(SessionSink::new(
            Arc::downgrade(&session),
            Arc::downgrade(&platform),
        ));
        let station_events = SubscriptionGuard::register(
            &platform,
            EventFilter::any(EventCategory::Station),
            Arc::clone(&sink),
            SetupStage::RegisterStationEvents,
        )?;
        let ip_events = SubscriptionGuard::register(
            &platform,
            EventFilter::only(EventCategory::Ip, EventKind::GotIp),
            sink,
            SetupStage::RegisterIpEvents,
        )?;

        let started = StartedRadio::start(&platform, &config.client_configuration())?;
        debug!("station setup complete, waiting for connection");

        let station = Self {
            _started: started,
            _ip_events: ip_events,
            _station_events: station_events,
            _radio: radio,
            _sta_netif: sta_netif,
            _event_loop: event_loop,
            _netif: netif,
            session,
            ssid,
        };

        let observed = station
            .session
            .signals()
            .wait_for_any(SignalSet::TERMINAL, config.connect_timeout)
            .await;

        match station.session.resolve(observed) {
            Outcome::Connected => {
                info!(
                    ssid = %station.ssid,
                    ip = ?station.ip_info().map(|i| i.ip),
                    "connected to access point"
                );
                Ok(station)
            }
            Outcome::Failed => {
                let attempts = station.reconnect_count();
                warn!(ssid = %station.ssid, attempts, "failed to connect");
                Err(StationError::ConnectionFailed {
                    ssid: station.ssid.to_string(),
                    attempts,
                })
            }
            Outcome::Pending => {
                warn!(ssid = %station.ssid, %observed, "connection wait ended without outcome");
                Err(StationError::UnexpectedEvent {
                    observed,
                    timed_out_after: config.connect_timeout,
                })
            }
        }
    }

    pub fn ssid(&self) -> &Ssid {
        &self.ssid
    }

    /// Reconnect attempts since the last acquired address.
    pub fn reconnect_count(&self) -> u32 {
        self.session.reconnect_count()
    }

    pub fn outcome(&self) -> Outcome {
        self.session.outcome()
    }

    /// Address handed out when the station connected.
    pub fn ip_info(&self) -> Option<IpInfo> {
        self.session.ip_info()
    }

    /// Tear the station down now rather than at end of scope.
    pub fn shutdown(self) {
        info!(ssid = %self.ssid, "shutting down wifi station");
    }
}

impl<P: Platform> Drop for Station<P> {
    fn drop(&mut self) {
        debug!(ssid = %self.ssid, "releasing station resources");
    }
}

impl<P: Platform> fmt::Debug for Station<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Station")
            .field("ssid", &self.ssid)
            .field("outcome", &self.outcome())
            .field("reconnect_count", &self.reconnect_count())
            .field("ip_info", &self.ip_info())
            .finish_non_exhaustive()
    }
}
