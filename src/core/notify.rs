// Notification policy and dispatch.
//
// The policy is a pure decision function, re-evaluated independently by
// every listener (map view, feed view, background worker) for every alert.
// The dispatcher in front of the platform capability deduplicates by
// (time, type) so an alert heard by several listeners still produces at
// most one user-visible notification per process group.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::model::{IncidentRecord, IncidentType};

/// How many recently-dispatched alert keys to remember for dedupe.
const DEDUPE_WINDOW: usize = 64;

/// A user-visible notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Outcome of evaluating the policy for one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Show(Notification),
    Suppress,
}

/// Decide whether an incoming alert should notify the user.
///
/// Calamity-class alerts always notify. Incident-class alerts notify only
/// while DRRM mode is off.
pub fn decide(record: &IncidentRecord, drrm_enabled: bool) -> Decision {
    let is_calamity = record.kind.is_calamity();
    if drrm_enabled && !is_calamity {
        return Decision::Suppress;
    }

    let title = if is_calamity {
        "CALAMITY ALERT"
    } else {
        "Incident Reported"
    };
    Decision::Show(Notification {
        title: title.to_string(),
        body: format!("{} – {}", record.kind.display_name(), record.area),
    })
}

/// Informational notification raised once when DRRM mode is switched on.
pub fn drrm_enabled_notice() -> Notification {
    Notification {
        title: "DRRM Mode Enabled".to_string(),
        body: "You will now receive calamity alerts".to_string(),
    }
}

/// Platform notification capability.
///
/// Modeled after the browser Notification API: the capability may be
/// missing entirely, and the user may not have granted permission. Either
/// condition silently suppresses.
pub trait Notifier: Send + Sync {
    fn supported(&self) -> bool {
        true
    }
    fn permission_granted(&self) -> bool;
    fn show(&self, notification: &Notification);
}

/// Notifier that writes to the log. Stands in for a real platform surface
/// in the headless binary.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn permission_granted(&self) -> bool {
        true
    }

    fn show(&self, notification: &Notification) {
        log::info!("[notify] {}: {}", notification.title, notification.body);
    }
}

/// Gatekeeper in front of the [`Notifier`].
///
/// Every listener routes its policy decisions through one shared dispatcher,
/// which applies the capability preconditions and drops duplicate
/// dispatches of the same alert.
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    recent: Mutex<VecDeque<(i64, IncidentType)>>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// Evaluate the policy for an alert and show at most one notification.
    /// Returns true if a notification was actually shown.
    pub fn dispatch(&self, record: &IncidentRecord, drrm_enabled: bool) -> bool {
        let notification = match decide(record, drrm_enabled) {
            Decision::Show(notification) => notification,
            Decision::Suppress => return false,
        };

        if !self.notifier.supported() || !self.notifier.permission_granted() {
            return false;
        }

        let key = (record.time, record.kind);
        {
            let mut recent = self.recent.lock().unwrap();
            if recent.contains(&key) {
                return false;
            }
            recent.push_back(key);
            if recent.len() > DEDUPE_WINDOW {
                recent.pop_front();
            }
        }

        self.notifier.show(&notification);
        true
    }

    /// Show an unconditional informational notification (no policy, no
    /// dedupe), still subject to the capability preconditions.
    pub fn announce(&self, notification: &Notification) {
        if !self.notifier.supported() || !self.notifier.permission_granted() {
            return;
        }
        self.notifier.show(notification);
    }
}
