//! The alert store: an append-ordered, persisted list of incident records
//! plus the user preference flags that ride alongside it.
//!
//! One `AlertStore` is constructed per view context over a shared
//! [`LocalStore`] namespace and a shared bus. Appending persists first,
//! then propagates: bus publish, local notification dispatch, and a
//! forward to the background worker's port. Persistence is synchronous
//! and completes before any propagation is attempted; nothing spanning
//! write + publish + notify is atomic.

use std::io;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::bus::{BusHandle, BusMessage, BusSubscription};
use super::model::IncidentRecord;
use super::notify::NotificationDispatcher;
use super::storage::LocalStore;

pub const ALERTS_KEY: &str = "alerts";
pub const FOCUS_KEY: &str = "focusIncident";
pub const DRRM_KEY: &str = "drrm";

pub struct AlertStore {
    kv: LocalStore,
    bus: BusHandle,
    dispatcher: Arc<NotificationDispatcher>,
    worker_port: Option<mpsc::Sender<IncidentRecord>>,
}

impl AlertStore {
    pub fn new(
        kv: LocalStore,
        bus: BusHandle,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            kv,
            bus,
            dispatcher,
            worker_port: None,
        }
    }

    /// Attach the background worker's direct message port. Appends are
    /// forwarded there in addition to the bus publish.
    pub fn with_worker_port(mut self, port: mpsc::Sender<IncidentRecord>) -> Self {
        self.worker_port = Some(port);
        self
    }

    /// Read the full sequence, newest-first.
    ///
    /// Absent or corrupt state degrades to an empty list. Individual
    /// entries that fail validation (unknown type, missing required
    /// fields) are dropped; entries merely missing coordinates are kept.
    pub fn list(&self) -> Vec<IncidentRecord> {
        let raw: Vec<serde_json::Value> = self.kv.get(ALERTS_KEY).unwrap_or_default();
        raw.into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    log::debug!("dropping invalid alert entry: {}", err);
                    None
                }
            })
            .collect()
    }

    /// Look up a record by its creation timestamp.
    pub fn find(&self, time: i64) -> Option<IncidentRecord> {
        self.list().into_iter().find(|record| record.time == time)
    }

    /// Insert a record at the head of the sequence and propagate it.
    ///
    /// The write must succeed before anything is published; a failed
    /// persist leaves the bus and notifier untouched.
    pub fn append(&self, record: IncidentRecord) -> io::Result<()> {
        let mut list = self.list();
        list.insert(0, record.clone());
        self.kv.put(ALERTS_KEY, &list)?;

        log::info!(
            "appended {} alert for {:?} ({} total)",
            record.kind.display_name(),
            record.area,
            list.len()
        );

        self.bus.publish(BusMessage::Alert(record.clone()));
        self.dispatcher.dispatch(&record, self.drrm_enabled());

        if let Some(port) = &self.worker_port {
            if port.try_send(record).is_err() {
                log::debug!("worker port full or closed, alert not forwarded");
            }
        }
        Ok(())
    }

    /// Remove every record and the one-shot focus pointer, then publish a
    /// reset so all open views re-render deterministically.
    pub fn clear(&self) -> io::Result<()> {
        self.kv.remove(ALERTS_KEY)?;
        self.kv.remove(FOCUS_KEY)?;
        log::info!("alert store cleared");
        self.bus.publish(BusMessage::Reset);
        Ok(())
    }

    /// Subscribe this context to changes made by other contexts.
    pub fn subscribe(&self) -> BusSubscription {
        self.bus.subscribe()
    }

    pub fn drrm_enabled(&self) -> bool {
        self.kv.get::<String>(DRRM_KEY).as_deref() == Some("1")
    }

    pub fn set_drrm(&self, enabled: bool) -> io::Result<()> {
        self.kv.put(DRRM_KEY, &if enabled { "1" } else { "0" })
    }

    /// Point the map view at the record with this creation timestamp. The
    /// pointer is consumed by the next [`take_focus`](Self::take_focus).
    pub fn set_focus(&self, time: i64) -> io::Result<()> {
        self.kv.put(FOCUS_KEY, &time.to_string())
    }

    /// Read the focus pointer without consuming it.
    pub fn peek_focus(&self) -> Option<i64> {
        let raw: String = self.kv.get(FOCUS_KEY)?;
        raw.parse().ok()
    }

    /// Drop the focus pointer, if any.
    pub fn clear_focus(&self) {
        if let Err(err) = self.kv.remove(FOCUS_KEY) {
            log::debug!("failed to clear focus pointer: {}", err);
        }
    }

    /// Read and clear the one-shot focus pointer.
    pub fn take_focus(&self) -> Option<i64> {
        let time = self.peek_focus()?;
        self.clear_focus();
        Some(time)
    }
}
