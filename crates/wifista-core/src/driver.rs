// ── Platform collaborator contracts ──
//
// The station controller drives four external collaborators: the network
// interface stack, the default event loop, the radio, and the notification
// registry. A real binding wraps the vendor SDK; `sim::SimPlatform` provides
// an in-process implementation.

use std::sync::Arc;

use crate::config::{ClientConfiguration, RadioInitConfig};
use crate::error::DriverError;
use crate::event::{EventCategory, EventKind, Notification};

pub type DriverResult<T = ()> = Result<T, DriverError>;

// ── Handles ──────────────────────────────────────────────────────────

/// Default station interface allocated by the netif stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetifHandle(u64);

impl NetifHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Which notifications a sink is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindFilter {
    Any,
    Only(EventKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventFilter {
    pub category: EventCategory,
    pub kind: KindFilter,
}

impl EventFilter {
    pub const fn any(category: EventCategory) -> Self {
        Self {
            category,
            kind: KindFilter::Any,
        }
    }

    pub const fn only(category: EventCategory, kind: EventKind) -> Self {
        Self {
            category,
            kind: KindFilter::Only(kind),
        }
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        if notification.category() != self.category {
            return false;
        }
        match self.kind {
            KindFilter::Any => true,
            KindFilter::Only(kind) => notification.kind() == kind,
        }
    }
}

/// Live registration returned by [`NotificationRegistry::register`].
///
/// Carries the filter it was registered with so that unregistration always
/// uses the same category/kind pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: u64,
    filter: EventFilter,
}

impl SubscriptionHandle {
    pub const fn new(id: u64, filter: EventFilter) -> Self {
        Self { id, filter }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn filter(&self) -> EventFilter {
        self.filter
    }
}

/// Radio operating role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum WifiMode {
    Station,
    AccessPoint,
    AccessPointStation,
}

// ── Collaborator traits ──────────────────────────────────────────────

/// Receives notifications on the driver's dispatch context.
///
/// Implementations must be cheap and must not block: the driver delivers
/// notifications one at a time and waits for each call to return.
pub trait NotificationSink: Send + Sync {
    fn on_notification(&self, notification: &Notification);
}

pub trait NetifStack {
    fn netif_init(&self) -> DriverResult;
    fn netif_deinit(&self) -> DriverResult;
    /// Infallible: the vendor SDK aborts the process instead of reporting
    /// a failure here.
    fn create_default_station(&self) -> NetifHandle;
    fn destroy_default_station(&self, handle: NetifHandle);
}

pub trait EventLoop {
    fn create_default_loop(&self) -> DriverResult;
    fn delete_default_loop(&self) -> DriverResult;
}

pub trait Radio {
    fn radio_init(&self, config: &RadioInitConfig) -> DriverResult;
    fn radio_deinit(&self) -> DriverResult;
    fn set_mode(&self, mode: WifiMode) -> DriverResult;
    fn set_config(&self, config: &ClientConfiguration) -> DriverResult;
    fn start(&self) -> DriverResult;
    fn stop(&self) -> DriverResult;
    /// Request an association. The outcome arrives later as a notification.
    fn connect(&self) -> DriverResult;
}

pub trait NotificationRegistry {
    fn register(
        &self,
        filter: EventFilter,
        sink: Arc<dyn NotificationSink>,
    ) -> DriverResult<SubscriptionHandle>;
    fn unregister(&self, handle: &SubscriptionHandle) -> DriverResult;
}

/// Everything a [`Station`](crate::Station) needs from the platform.
pub trait Platform: NetifStack + EventLoop + Radio + NotificationRegistry + Send + Sync + 'static {}

impl<T> Platform for T where
    T: NetifStack + EventLoop + Radio + NotificationRegistry + Send + Sync + 'static
{
}
