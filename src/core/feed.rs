// Feed view controller.
//
// Headless render model for the notification feed: what the store
// contains, as cards with category styling and a relative-age label.
// The real list UI is a collaborator that draws whatever `render`
// returns.

use std::io;
use std::sync::Arc;

use chrono::Utc;

use super::bus::BusMessage;
use super::notify::NotificationDispatcher;
use super::store::AlertStore;

/// One feed entry, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedCard {
    pub title: &'static str,
    pub area: String,
    pub age_label: String,
    pub color: &'static str,
    pub glyph: &'static str,
    /// Content key for the focus-on-map flow.
    pub time: i64,
}

/// Snapshot of everything the feed UI shows.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRender {
    pub count: usize,
    pub cards: Vec<FeedCard>,
}

impl FeedRender {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

pub struct FeedView {
    store: AlertStore,
    dispatcher: Arc<NotificationDispatcher>,
}

impl FeedView {
    pub fn new(store: AlertStore, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Subscribe this view to changes from other contexts.
    pub fn subscribe(&self) -> crate::core::bus::BusSubscription {
        self.store.subscribe()
    }

    /// Recompute the feed from the store.
    pub fn render(&self) -> FeedRender {
        self.render_at(Utc::now().timestamp_millis())
    }

    /// Render with an explicit "now" for age labels.
    pub fn render_at(&self, now_ms: i64) -> FeedRender {
        let cards: Vec<FeedCard> = self
            .store
            .list()
            .into_iter()
            .map(|record| {
                let style = record.kind.style();
                FeedCard {
                    title: record.kind.display_name(),
                    area: record.area,
                    age_label: age_label(now_ms, record.time),
                    color: style.color,
                    glyph: style.glyph,
                    time: record.time,
                }
            })
            .collect();
        FeedRender {
            count: cards.len(),
            cards,
        }
    }

    /// Hand off to the map view: persist the one-shot focus pointer for
    /// the tapped card's record.
    pub fn open_incident(&self, time: i64) -> io::Result<()> {
        self.store.set_focus(time)
    }

    /// React to a bus message from another context: evaluate the
    /// notification policy for alerts, then re-render either way.
    pub fn on_bus_message(&self, message: &BusMessage) -> FeedRender {
        if let BusMessage::Alert(record) = message {
            self.dispatcher.dispatch(record, self.store.drrm_enabled());
        }
        self.render()
    }
}

/// Relative-age label: "Just now" under a minute, whole minutes after.
fn age_label(now_ms: i64, time_ms: i64) -> String {
    let minutes = (now_ms - time_ms) / 60_000;
    if minutes < 1 {
        "Just now".to_string()
    } else {
        format!("{} min ago", minutes)
    }
}
