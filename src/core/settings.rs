// Settings view controller: the DRRM toggle, bulk reset, and the
// sample-report tool from the extras page.

use std::io;
use std::sync::Arc;

use chrono::Utc;

use super::map::DEFAULT_CENTER;
use super::model::{IncidentRecord, IncidentType};
use super::notify::{drrm_enabled_notice, NotificationDispatcher};
use super::store::AlertStore;

pub struct SettingsView {
    store: AlertStore,
    dispatcher: Arc<NotificationDispatcher>,
}

impl SettingsView {
    pub fn new(store: AlertStore, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub fn drrm_enabled(&self) -> bool {
        self.store.drrm_enabled()
    }

    /// Persist the DRRM flag. Switching it on raises one informational
    /// notification, independent of any alert.
    pub fn set_drrm(&self, enabled: bool) -> io::Result<()> {
        self.store.set_drrm(enabled)?;
        if enabled {
            self.dispatcher.announce(&drrm_enabled_notice());
        }
        Ok(())
    }

    /// Wipe every record and the focus pointer; other views hear the
    /// reset on the bus.
    pub fn reset_all(&self) -> io::Result<()> {
        self.store.clear()
    }

    /// Append a canned Crash report jittered around the default center.
    /// Handy for demos and for exercising the sync path by hand.
    pub fn submit_sample_report(&self) -> io::Result<IncidentRecord> {
        let time = Utc::now().timestamp_millis();
        let record = IncidentRecord {
            kind: IncidentType::Crash,
            area: "Reported Area".to_string(),
            message: Some("User reported incident".to_string()),
            lat: Some(DEFAULT_CENTER.lat + jitter(time)),
            lng: Some(DEFAULT_CENTER.lng + jitter(time / 3)),
            time,
        };
        self.store.append(record.clone())?;
        Ok(record)
    }
}

/// Deterministic stand-in for random jitter, within ±0.005 degrees.
fn jitter(seed: i64) -> f64 {
    ((seed % 1000) as f64 / 1000.0 - 0.5) * 0.01
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bus::AlertBus;
    use crate::core::notify::{Notification, Notifier};
    use crate::core::storage::LocalStore;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<Notification>>);

    impl Notifier for RecordingNotifier {
        fn permission_granted(&self) -> bool {
            true
        }

        fn show(&self, notification: &Notification) {
            self.0.lock().unwrap().push(notification.clone());
        }
    }

    fn setup(dir: &std::path::Path) -> (SettingsView, Arc<RecordingNotifier>, AlertBus) {
        let bus = AlertBus::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = Arc::new(NotificationDispatcher::new(notifier.clone()));
        let store = AlertStore::new(
            LocalStore::new(dir.to_path_buf()),
            bus.handle(),
            dispatcher.clone(),
        );
        (SettingsView::new(store, dispatcher), notifier, bus)
    }

    #[tokio::test]
    async fn test_enabling_drrm_announces_once() {
        let dir = tempdir().unwrap();
        let (settings, notifier, _bus) = setup(dir.path());

        settings.set_drrm(true).unwrap();
        assert!(settings.drrm_enabled());

        let shown = notifier.0.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "DRRM Mode Enabled");
    }

    #[tokio::test]
    async fn test_disabling_drrm_is_silent() {
        let dir = tempdir().unwrap();
        let (settings, notifier, _bus) = setup(dir.path());

        settings.set_drrm(false).unwrap();
        assert!(!settings.drrm_enabled());
        assert!(notifier.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sample_report_lands_near_default_center() {
        let dir = tempdir().unwrap();
        let (settings, _notifier, _bus) = setup(dir.path());

        let record = settings.submit_sample_report().unwrap();
        assert_eq!(record.kind, IncidentType::Crash);

        let (lat, lng) = record.position().expect("sample is mappable");
        assert!((lat - DEFAULT_CENTER.lat).abs() <= 0.005);
        assert!((lng - DEFAULT_CENTER.lng).abs() <= 0.005);
    }

    #[tokio::test]
    async fn test_reset_all_empties_the_store() {
        let dir = tempdir().unwrap();
        let (settings, _notifier, bus) = setup(dir.path());
        let mut sub = bus.handle().subscribe();

        settings.submit_sample_report().unwrap();
        settings.reset_all().unwrap();

        let check = {
            let dispatcher = Arc::new(NotificationDispatcher::new(
                Arc::new(RecordingNotifier::default()) as Arc<dyn Notifier>,
            ));
            AlertStore::new(LocalStore::new(dir.path().to_path_buf()), bus.handle(), dispatcher)
        };
        assert!(check.list().is_empty());

        // Other views hear the append, then the reset.
        assert!(matches!(sub.recv().await, Some(crate::core::bus::BusMessage::Alert(_))));
        assert!(matches!(sub.recv().await, Some(crate::core::bus::BusMessage::Reset)));
    }
}
