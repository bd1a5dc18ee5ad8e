// External service collaborators.
//
// The core treats geolocation, place search, and routing as opaque
// capabilities. Each is attempted exactly once per request, has no
// timeout or retry, and reports failure as the absence of a result.

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A computed route between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub origin: LatLng,
    pub destination: LatLng,
    /// Waypoints along the route, origin to destination inclusive.
    pub path: Vec<LatLng>,
}

/// Device location capability. A failed or denied fix is `None`.
pub trait Geolocator: Send + Sync {
    fn current_position(&self) -> Option<LatLng>;
}

/// Place-name resolution capability (autocomplete backend). A query with
/// no usable geometry resolves to `None`.
pub trait PlaceSearch: Send + Sync {
    fn resolve(&self, query: &str) -> Option<LatLng>;
}

/// Directions capability. An unroutable pair is `None`.
pub trait RoutePlanner: Send + Sync {
    fn route(&self, origin: LatLng, destination: LatLng) -> Option<Route>;
}

/// Capability set that reports every request as failed. Used where no
/// platform services are wired up; consumers degrade to "nothing
/// happened".
pub struct UnavailableServices;

impl Geolocator for UnavailableServices {
    fn current_position(&self) -> Option<LatLng> {
        None
    }
}

impl PlaceSearch for UnavailableServices {
    fn resolve(&self, _query: &str) -> Option<LatLng> {
        None
    }
}

impl RoutePlanner for UnavailableServices {
    fn route(&self, _origin: LatLng, _destination: LatLng) -> Option<Route> {
        None
    }
}
