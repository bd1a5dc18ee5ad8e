// Background fan-out worker.
//
// A long-lived task independent of any open view. It hears alerts two
// ways: a direct message port fed by `AlertStore::append`, and its own
// bus subscription. Both paths dispatch through the shared notification
// dispatcher, whose dedupe guard collapses the overlap.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::bus::{BusMessage, BusSubscription};
use super::model::IncidentRecord;
use super::notify::NotificationDispatcher;
use super::storage::LocalStore;
use super::store::DRRM_KEY;

const PORT_CAPACITY: usize = 32;

pub struct AlertWorker {
    port: mpsc::Sender<IncidentRecord>,
    handle: JoinHandle<()>,
}

impl AlertWorker {
    /// Spawn the worker task. It runs until both its port and the bus are
    /// closed.
    pub fn spawn(
        kv: LocalStore,
        dispatcher: Arc<NotificationDispatcher>,
        mut subscription: BusSubscription,
    ) -> Self {
        let (port, mut port_rx) = mpsc::channel(PORT_CAPACITY);

        let handle = tokio::spawn(async move {
            log::debug!("alert worker started");
            let mut port_open = true;
            let mut bus_open = true;

            loop {
                tokio::select! {
                    received = port_rx.recv(), if port_open => match received {
                        Some(record) => handle_alert(&kv, &dispatcher, &record),
                        None => port_open = false,
                    },
                    received = subscription.recv(), if bus_open => match received {
                        Some(BusMessage::Alert(record)) => {
                            handle_alert(&kv, &dispatcher, &record);
                        }
                        Some(BusMessage::Reset) => {
                            log::debug!("worker observed store reset");
                        }
                        None => bus_open = false,
                    },
                    else => break,
                }
            }
            log::debug!("alert worker stopped");
        });

        Self { port, handle }
    }

    /// The direct message port. Stores clone this to forward appends.
    pub fn port(&self) -> mpsc::Sender<IncidentRecord> {
        self.port.clone()
    }

    /// Close this handle's port and wait for the task to finish. The task
    /// only exits once the bus side is gone too.
    pub async fn join(self) {
        drop(self.port);
        let _ = self.handle.await;
    }
}

fn handle_alert(
    kv: &LocalStore,
    dispatcher: &NotificationDispatcher,
    record: &IncidentRecord,
) {
    // The preference can change between alerts; re-read it every time.
    let drrm_enabled = kv.get::<String>(DRRM_KEY).as_deref() == Some("1");
    dispatcher.dispatch(record, drrm_enabled);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bus::AlertBus;
    use crate::core::model::IncidentType;
    use crate::core::notify::{Notification, Notifier};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::tempdir;

    struct CountingNotifier(AtomicUsize);

    impl Notifier for CountingNotifier {
        fn permission_granted(&self) -> bool {
            true
        }

        fn show(&self, _notification: &Notification) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn record(kind: IncidentType, time: i64) -> IncidentRecord {
        IncidentRecord {
            kind,
            area: "Centro".to_string(),
            message: None,
            lat: Some(13.62),
            lng: Some(123.19),
            time,
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_worker_notifies_from_direct_port() {
        let dir = tempdir().unwrap();
        let kv = LocalStore::new(dir.path().to_path_buf());
        let notifier = Arc::new(CountingNotifier(AtomicUsize::new(0)));
        let dispatcher = Arc::new(NotificationDispatcher::new(notifier.clone()));

        let bus = AlertBus::new();
        let worker = AlertWorker::spawn(kv, dispatcher, bus.handle().subscribe());

        worker
            .port()
            .send(record(IncidentType::Earthquake, 1))
            .await
            .unwrap();
        settle().await;
        assert_eq!(notifier.0.load(Ordering::SeqCst), 1);

        drop(bus);
        worker.join().await;
    }

    #[tokio::test]
    async fn test_worker_notifies_from_bus() {
        let dir = tempdir().unwrap();
        let kv = LocalStore::new(dir.path().to_path_buf());
        let notifier = Arc::new(CountingNotifier(AtomicUsize::new(0)));
        let dispatcher = Arc::new(NotificationDispatcher::new(notifier.clone()));

        let bus = AlertBus::new();
        let worker = AlertWorker::spawn(kv, dispatcher, bus.handle().subscribe());

        let publisher = bus.handle();
        publisher.publish(BusMessage::Alert(record(IncidentType::Fire, 2)));
        settle().await;
        assert_eq!(notifier.0.load(Ordering::SeqCst), 1);

        drop(publisher);
        drop(bus);
        worker.join().await;
    }

    #[tokio::test]
    async fn test_worker_respects_drrm_mode() {
        let dir = tempdir().unwrap();
        let kv = LocalStore::new(dir.path().to_path_buf());
        kv.put(DRRM_KEY, &"1").unwrap();

        let notifier = Arc::new(CountingNotifier(AtomicUsize::new(0)));
        let dispatcher = Arc::new(NotificationDispatcher::new(notifier.clone()));

        let bus = AlertBus::new();
        let worker = AlertWorker::spawn(kv, dispatcher, bus.handle().subscribe());

        // Incident-class is filtered, calamity-class goes through.
        worker.port().send(record(IncidentType::Traffic, 3)).await.unwrap();
        worker.port().send(record(IncidentType::Typhoon, 4)).await.unwrap();
        settle().await;
        assert_eq!(notifier.0.load(Ordering::SeqCst), 1);

        drop(bus);
        worker.join().await;
    }

    #[tokio::test]
    async fn test_same_alert_on_both_paths_notifies_once() {
        let dir = tempdir().unwrap();
        let kv = LocalStore::new(dir.path().to_path_buf());
        let notifier = Arc::new(CountingNotifier(AtomicUsize::new(0)));
        let dispatcher = Arc::new(NotificationDispatcher::new(notifier.clone()));

        let bus = AlertBus::new();
        let worker = AlertWorker::spawn(kv, dispatcher, bus.handle().subscribe());

        let alert = record(IncidentType::Landslide, 5);
        let publisher = bus.handle();
        publisher.publish(BusMessage::Alert(alert.clone()));
        worker.port().send(alert).await.unwrap();
        settle().await;
        assert_eq!(notifier.0.load(Ordering::SeqCst), 1);

        drop(publisher);
        drop(bus);
        worker.join().await;
    }
}
