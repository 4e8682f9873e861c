//! Domain events and the notification surface.
//!
//! Every state change in the system maps to an [`Event`]. The core
//! library defines the vocabulary and the bus but does not publish on
//! its own: the embedding shell (CLI today, a desktop frontend later)
//! owns the bus, publishes an event after each store call it makes, and
//! wires its views up as listeners. UI layers subscribe through an
//! explicit [`EventBus`]; a [`Subscription`] handle removes its listener
//! when dropped, so listener lifecycle follows component lifecycle
//! instead of accumulating in a global registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::ProtocolKey;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Fire-and-forget user-facing notification. No acknowledgement contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub duration_ms: u64,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            duration_ms: 3000,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            duration_ms: 3000,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            duration_ms: 5000,
        }
    }
}

/// Every state change in the system produces an Event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitLogged {
        habit_id: String,
        date: NaiveDate,
        completed: bool,
        at: DateTime<Utc>,
    },
    WeekRegenerated {
        week_start: NaiveDate,
        slots: usize,
        at: DateTime<Utc>,
    },
    ChallengeRerolled {
        slot: usize,
        protocol: ProtocolKey,
        at: DateTime<Utc>,
    },
    ChallengeCompleted {
        slot: usize,
        at: DateTime<Utc>,
    },
    KrPunted {
        kr_id: String,
        punted: bool,
        at: DateTime<Utc>,
    },
    ObjectiveArchived {
        objective_id: String,
        at: DateTime<Utc>,
    },
    IntentionCommitted {
        date: NaiveDate,
        count: usize,
        at: DateTime<Utc>,
    },
    /// A user-facing notice rode along with a state change.
    Noticed {
        notice: Notice,
        at: DateTime<Utc>,
    },
}

type Listener = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: HashMap<u64, Listener>,
}

/// Explicit publish/subscribe bus for [`Event`]s.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. The listener stays registered until the
    /// returned handle is dropped or `unsubscribe`d.
    pub fn subscribe(&self, listener: impl Fn(&Event) + Send + Sync + 'static) -> Subscription {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Arc::new(listener));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every live listener.
    ///
    /// Listeners run outside the bus lock, so a listener may publish,
    /// subscribe, or drop a [`Subscription`] without deadlocking.
    /// Listeners added or removed during delivery take effect from the
    /// next publish.
    pub fn publish(&self, event: &Event) {
        let listeners: Vec<Listener> = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.listeners.values().cloned().collect()
        };
        for listener in &listeners {
            listener(event);
        }
    }

    /// Convenience: publish a notice event stamped now.
    pub fn notify(&self, notice: Notice) {
        self.publish(&Event::Noticed {
            notice,
            at: Utc::now(),
        });
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .len()
    }
}

/// Handle tying a listener's lifetime to its owner. Dropping it
/// unsubscribes.
pub struct Subscription {
    id: u64,
    bus: std::sync::Weak<Mutex<BusInner>>,
}

impl Subscription {
    /// Remove the listener now instead of at drop.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            let mut inner = bus.lock().unwrap_or_else(|e| e.into_inner());
            inner.listeners.remove(&self.id);
        }
    }
}
