// Map view controller.
//
// Headless render model for the map: which markers exist, where the
// camera should move, and the user-submission entry point. The mapping
// SDK itself is a collaborator that draws whatever this produces.

use std::collections::HashSet;
use std::io;
use std::sync::Arc;

use chrono::Utc;

use super::bus::BusMessage;
use super::model::{IncidentRecord, IncidentType};
use super::notify::NotificationDispatcher;
use super::services::{Geolocator, LatLng, PlaceSearch, Route, RoutePlanner};
use super::store::AlertStore;

/// Fallback map center until a geolocation fix arrives (Naga City).
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 13.6218,
    lng: 123.1948,
};

const FOCUS_ZOOM: u8 = 17;

/// One rendered incident marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub position: LatLng,
    pub kind: IncidentType,
    pub area: String,
    pub color: &'static str,
    pub glyph: &'static str,
}

/// Camera movement produced by the focus-from-feed flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusTarget {
    pub center: LatLng,
    pub zoom: u8,
}

pub struct MapView {
    store: AlertStore,
    dispatcher: Arc<NotificationDispatcher>,
    /// Per-type filter toggles; everything is visible by default.
    active_types: HashSet<IncidentType>,
    user_position: Option<LatLng>,
    route: Option<Route>,
}

impl MapView {
    pub fn new(store: AlertStore, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            store,
            dispatcher,
            active_types: IncidentType::all().iter().copied().collect(),
            user_position: None,
            route: None,
        }
    }

    /// Subscribe this view to changes from other contexts.
    pub fn subscribe(&self) -> crate::core::bus::BusSubscription {
        self.store.subscribe()
    }

    /// Recompute markers from the store. Records without both coordinates
    /// and records whose type is toggled off are excluded; they stay in
    /// the store and the feed.
    pub fn markers(&self) -> Vec<MapMarker> {
        self.store
            .list()
            .into_iter()
            .filter(|record| self.active_types.contains(&record.kind))
            .filter_map(|record| {
                let (lat, lng) = record.position()?;
                let style = record.kind.style();
                Some(MapMarker {
                    position: LatLng { lat, lng },
                    kind: record.kind,
                    area: record.area,
                    color: style.color,
                    glyph: style.glyph,
                })
            })
            .collect()
    }

    /// Show or hide one category on the map.
    pub fn toggle_type(&mut self, kind: IncidentType, visible: bool) {
        if visible {
            self.active_types.insert(kind);
        } else {
            self.active_types.remove(&kind);
        }
    }

    /// Consume the one-shot focus pointer written by the feed.
    ///
    /// The pointer is cleared once its record is found; a pointer to a
    /// record that does not exist yet is left in place, and an unmappable
    /// record clears the pointer without moving the camera.
    pub fn consume_focus(&self) -> Option<FocusTarget> {
        let time = self.store.peek_focus()?;
        let record = self.store.find(time)?;
        self.store.clear_focus();

        let (lat, lng) = record.position()?;
        Some(FocusTarget {
            center: LatLng { lat, lng },
            zoom: FOCUS_ZOOM,
        })
    }

    /// Ask the platform for a position fix. A failed fix leaves the view
    /// unchanged.
    pub fn locate_user(&mut self, geolocator: &dyn Geolocator) -> Option<LatLng> {
        if let Some(position) = geolocator.current_position() {
            self.user_position = Some(position);
        }
        self.user_position
    }

    pub fn user_position(&self) -> Option<LatLng> {
        self.user_position
    }

    /// Resolve both endpoints and compute a route. Any step failing means
    /// no route is drawn and any previous route stays.
    pub fn plan_trip(
        &mut self,
        search: &dyn PlaceSearch,
        planner: &dyn RoutePlanner,
        from: &str,
        to: &str,
    ) -> Option<&Route> {
        let origin = search.resolve(from)?;
        let destination = search.resolve(to)?;
        let route = planner.route(origin, destination)?;
        self.route = Some(route);
        self.route.as_ref()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Submit a report at the user's current position. Returns the
    /// appended record, or `None` when no position fix exists yet
    /// ("location not ready").
    pub fn submit_report(
        &self,
        kind: IncidentType,
        note: Option<String>,
    ) -> io::Result<Option<IncidentRecord>> {
        let position = match self.user_position {
            Some(position) => position,
            None => return Ok(None),
        };

        let record = IncidentRecord {
            kind,
            area: "User reported area".to_string(),
            message: note.or_else(|| Some("User report".to_string())),
            lat: Some(position.lat),
            lng: Some(position.lng),
            time: Utc::now().timestamp_millis(),
        };
        self.store.append(record.clone())?;
        Ok(Some(record))
    }

    /// React to a bus message from another context: evaluate the policy
    /// for alerts, pick up any pending focus, and re-render.
    pub fn on_bus_message(&self, message: &BusMessage) -> (Vec<MapMarker>, Option<FocusTarget>) {
        if let BusMessage::Alert(record) = message {
            self.dispatcher.dispatch(record, self.store.drrm_enabled());
        }
        (self.markers(), self.consume_focus())
    }
}
