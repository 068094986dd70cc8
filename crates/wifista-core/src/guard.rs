// ── Resource guards ──
//
// One single-owner value per acquired platform resource. Each guard is
// created only after its acquisition call succeeded and releases the
// resource on drop. Release errors are logged and swallowed.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ClientConfiguration, RadioInitConfig};
use crate::driver::{EventFilter, NetifHandle, NotificationSink, Platform, SubscriptionHandle, WifiMode};
use crate::error::{SetupStage, StationError};

// ── Network interface stack ──────────────────────────────────────────

pub(crate) struct NetifGuard<P: Platform> {
    platform: Arc<P>,
}

impl<P: Platform> NetifGuard<P> {
    pub(crate) fn acquire(platform: &Arc<P>) -> Result<Self, StationError> {
        platform
            .netif_init()
            .map_err(StationError::resource_init(SetupStage::NetifInit))?;
        debug!("netif stack initialized");
        Ok(Self {
            platform: Arc::clone(platform),
        })
    }
}

impl<P: Platform> Drop for NetifGuard<P> {
    fn drop(&mut self) {
        if let Err(e) = self.platform.netif_deinit() {
            warn!(error = %e, "netif deinit failed");
        }
    }
}

// ── Default event loop ───────────────────────────────────────────────

pub(crate) struct EventLoopGuard<P: Platform> {
    platform: Arc<P>,
}

impl<P: Platform> EventLoopGuard<P> {
    pub(crate) fn acquire(platform: &Arc<P>) -> Result<Self, StationError> {
        platform
            .create_default_loop()
            .map_err(StationError::resource_init(SetupStage::EventLoopCreate))?;
        debug!("default event loop created");
        Ok(Self {
            platform: Arc::clone(platform),
        })
    }
}

impl<P: Platform> Drop for EventLoopGuard<P> {
    fn drop(&mut self) {
        if let Err(e) = self.platform.delete_default_loop() {
            warn!(error = %e, "event loop delete failed");
        }
    }
}

// ── Default station interface ────────────────────────────────────────

pub(crate) struct StationNetifGuard<P: Platform> {
    platform: Arc<P>,
    handle: NetifHandle,
}

impl<P: Platform> StationNetifGuard<P> {
    pub(crate) fn acquire(platform: &Arc<P>) -> Self {
        let handle = platform.create_default_station();
        debug!(netif = handle.id(), "default station interface created");
        Self {
            platform: Arc::clone(platform),
            handle,
        }
    }
}

impl<P: Platform> Drop for StationNetifGuard<P> {
    fn drop(&mut self) {
        self.platform.destroy_default_station(self.handle);
    }
}

// ── Radio driver ─────────────────────────────────────────────────────

pub(crate) struct RadioGuard<P: Platform> {
    platform: Arc<P>,
}

impl<P: Platform> RadioGuard<P> {
    pub(crate) fn acquire(platform: &Arc<P>, config: &RadioInitConfig) -> Result<Self, StationError> {
        platform
            .radio_init(config)
            .map_err(StationError::resource_init(SetupStage::RadioInit))?;
        debug!(
            static_rx = config.static_rx_buf_num,
            dynamic_rx = config.dynamic_rx_buf_num,
            dynamic_tx = config.dynamic_tx_buf_num,
            "radio driver initialized"
        );
        Ok(Self {
            platform: Arc::clone(platform),
        })
    }
}

impl<P: Platform> Drop for RadioGuard<P> {
    fn drop(&mut self) {
        if let Err(e) = self.platform.radio_deinit() {
            warn!(error = %e, "radio deinit failed");
        }
    }
}

// ── Notification subscription ────────────────────────────────────────

/// A live sink registration, unregistered with the filter it was
/// registered under.
pub(crate) struct SubscriptionGuard<P: Platform> {
    platform: Arc<P>,
    handle: SubscriptionHandle,
}

impl<P: Platform> SubscriptionGuard<P> {
    pub(crate) fn register(
        platform: &Arc<P>,
        filter: EventFilter,
        sink: Arc<dyn NotificationSink>,
        stage: SetupStage,
    ) -> Result<Self, StationError> {
        let handle = platform
            .register(filter, sink)
            .map_err(StationError::resource_init(stage))?;
        debug!(
            subscription = handle.id(),
            category = %filter.category,
            "notification sink registered"
        );
        Ok(Self {
            platform: Arc::clone(platform),
            handle,
        })
    }
}

impl<P: Platform> Drop for SubscriptionGuard<P> {
    fn drop(&mut self) {
        if let Err(e) = self.platform.unregister(&self.handle) {
            warn!(
                error = %e,
                subscription = self.handle.id(),
                category = %self.handle.filter().category,
                "unregister failed"
            );
        }
    }
}

// ── Started radio ────────────────────────────────────────────────────

/// Radio configured in station mode and started. Dropping stops it.
pub(crate) struct StartedRadio<P: Platform> {
    platform: Arc<P>,
}

impl<P: Platform> StartedRadio<P> {
    pub(crate) fn start(platform: &Arc<P>, client: &ClientConfiguration) -> Result<Self, StationError> {
        platform
            .set_mode(WifiMode::Station)
            .map_err(StationError::resource_init(SetupStage::SetMode))?;
        platform
            .set_config(client)
            .map_err(StationError::resource_init(SetupStage::SetConfig))?;
        platform
            .start()
            .map_err(StationError::resource_init(SetupStage::RadioStart))?;
        debug!(
            ssid = %client.ssid,
            scan = %client.options.scan_method,
            auth_threshold = %client.options.auth_threshold,
            "radio started in station mode"
        );
        Ok(Self {
            platform: Arc::clone(platform),
        })
    }
}

impl<P: Platform> Drop for StartedRadio<P> {
    fn drop(&mut self) {
        if let Err(e) = self.platform.stop() {
            warn!(error = %e, "radio stop failed");
        }
    }
}
