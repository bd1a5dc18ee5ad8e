// Incident model types and static category metadata.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Closed set of incident categories a report can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentType {
    Roadwork,
    Traffic,
    Flood,
    Crash,
    Fire,
    Earthquake,
    Typhoon,
    Landslide,
    Others,
}

impl IncidentType {
    /// Get the display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Roadwork => "Roadwork",
            Self::Traffic => "Traffic",
            Self::Flood => "Flood",
            Self::Crash => "Crash",
            Self::Fire => "Fire",
            Self::Earthquake => "Earthquake",
            Self::Typhoon => "Typhoon",
            Self::Landslide => "Landslide",
            Self::Others => "Others",
        }
    }

    /// Calamity-class categories are subject to the DRRM notification filter;
    /// everything else is incident-class.
    pub fn is_calamity(&self) -> bool {
        matches!(
            self,
            Self::Earthquake | Self::Typhoon | Self::Landslide | Self::Others
        )
    }

    /// Get all categories
    pub fn all() -> &'static [IncidentType] {
        &[
            Self::Roadwork,
            Self::Traffic,
            Self::Flood,
            Self::Crash,
            Self::Fire,
            Self::Earthquake,
            Self::Typhoon,
            Self::Landslide,
            Self::Others,
        ]
    }

    /// Display style for this category. Unknown types never reach here: they
    /// are dropped during store read validation, so every listed record has
    /// a style.
    pub fn style(&self) -> &'static CategoryStyle {
        &CATEGORY_STYLES[self]
    }
}

/// Static per-category display metadata
#[derive(Debug, Clone)]
pub struct CategoryStyle {
    /// Hex display color for markers and feed cards
    pub color: &'static str,
    /// Glyph shown on markers and cards
    pub glyph: &'static str,
}

lazy_static! {
    static ref CATEGORY_STYLES: HashMap<IncidentType, CategoryStyle> = {
        let mut m = HashMap::new();
        m.insert(IncidentType::Roadwork, CategoryStyle { color: "#f9a825", glyph: "🚧" });
        m.insert(IncidentType::Traffic, CategoryStyle { color: "#fbc02d", glyph: "🚦" });
        m.insert(IncidentType::Flood, CategoryStyle { color: "#1976d2", glyph: "🌊" });
        m.insert(IncidentType::Crash, CategoryStyle { color: "#d32f2f", glyph: "🚗" });
        m.insert(IncidentType::Fire, CategoryStyle { color: "#f57c00", glyph: "🔥" });
        m.insert(IncidentType::Earthquake, CategoryStyle { color: "#6d4c41", glyph: "🌏" });
        m.insert(IncidentType::Typhoon, CategoryStyle { color: "#0288d1", glyph: "🌀" });
        m.insert(IncidentType::Landslide, CategoryStyle { color: "#5d4037", glyph: "🪨" });
        m.insert(IncidentType::Others, CategoryStyle { color: "#616161", glyph: "⚠️" });
        m
    };
}

/// One reported hazard event.
///
/// `time` is epoch milliseconds and doubles as the record's stable content
/// key for cross-view references (the store has no explicit id field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    #[serde(rename = "type")]
    pub kind: IncidentType,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub time: i64,
}

impl IncidentRecord {
    /// Coordinates, if the record is mappable. A record missing either
    /// coordinate is persisted and listed but never rendered on the map.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}
