// Marker registry: one marker per place, grouped into per-category layers
use rustc_hash::{FxHashMap, FxHashSet};

use crate::category::Category;
use crate::dataset::{Place, PlaceId};
use crate::dates::{count_visits, dates_summary};

pub const THEATRE_ICON_SIZE: f32 = 22.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerStyle {
    Triangle { size: f32 },
    Circle { radius: f32 },
}

/// Circle radius on a log scale of the number of days spent at a place.
pub fn marker_radius(days: usize) -> f32 {
    match days {
        0 => 5.0,
        1 => 6.0,
        n => {
            let r = (6.0 + 3.0 * (n as f64).log10()).min(16.0);
            ((r * 10.0).round() / 10.0) as f32
        }
    }
}

#[derive(Debug, Clone)]
pub struct Marker {
    pub id: PlaceId,
    pub lat: f64,
    pub lng: f64,
    pub category: Category,
    pub style: MarkerStyle,
}

impl Marker {
    pub fn for_place(place: &Place) -> Self {
        let style = if place.category.is_theatre() {
            MarkerStyle::Triangle { size: THEATRE_ICON_SIZE }
        } else {
            MarkerStyle::Circle { radius: marker_radius(place.day_count()) }
        };
        Self { id: place.id.clone(), lat: place.lat, lng: place.lng, category: place.category, style }
    }
}

/// Membership set of one category plus its attachment to the map.
/// Holds ids only; the markers themselves live in the registry.
#[derive(Debug, Default)]
pub struct LayerGroup {
    members: FxHashSet<PlaceId>,
    on_map: bool,
}

impl LayerGroup {
    pub fn has(&self, id: &PlaceId) -> bool {
        self.members.contains(id)
    }

    pub fn on_map(&self) -> bool {
        self.on_map
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: FxHashMap<PlaceId, Marker>,
    order: Vec<PlaceId>,
    groups: [LayerGroup; Category::COUNT],
    pulses: Vec<PlaceId>,
}

impl MarkerRegistry {
    /// Every marker starts inside its group; no group is on the map yet.
    pub fn build(places: &[Place]) -> Self {
        let mut registry = Self::default();
        for place in places {
            let marker = Marker::for_place(place);
            registry.groups[place.category.index()].members.insert(place.id.clone());
            registry.order.push(place.id.clone());
            registry.markers.insert(place.id.clone(), marker);
        }
        for category in Category::ALL {
            log::debug!("layer {}: {} markers", category, registry.group(category).len());
        }
        registry
    }

    pub fn marker(&self, id: &PlaceId) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn group(&self, category: Category) -> &LayerGroup {
        &self.groups[category.index()]
    }

    /// Marker is in its group and the group is on the map.
    pub fn is_on_map(&self, id: &PlaceId) -> bool {
        self.markers.get(id).is_some_and(|m| {
            let group = &self.groups[m.category.index()];
            group.on_map && group.has(id)
        })
    }

    /// Markers currently drawn, in dataset order.
    pub fn visible(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.order.iter().filter(|id| self.is_on_map(id)).filter_map(|id| self.markers.get(id))
    }

    // Mutators return true only when they changed something.

    pub fn attach_marker(&mut self, id: &PlaceId) -> bool {
        match self.markers.get(id) {
            Some(m) => self.groups[m.category.index()].members.insert(id.clone()),
            None => false,
        }
    }

    pub fn detach_marker(&mut self, id: &PlaceId) -> bool {
        match self.markers.get(id) {
            Some(m) => self.groups[m.category.index()].members.remove(id),
            None => false,
        }
    }

    pub fn attach_layer(&mut self, category: Category) -> bool {
        let group = &mut self.groups[category.index()];
        !std::mem::replace(&mut group.on_map, true)
    }

    pub fn detach_layer(&mut self, category: Category) -> bool {
        let group = &mut self.groups[category.index()];
        std::mem::replace(&mut group.on_map, false)
    }

    pub fn flag_pulse(&mut self, id: &PlaceId) {
        self.pulses.push(id.clone());
    }

    /// Drains the markers flagged for a pulse since the last call.
    pub fn take_pulses(&mut self) -> Vec<PlaceId> {
        std::mem::take(&mut self.pulses)
    }
}

/// Content of the popup shown for a place.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetail {
    pub title: String,
    /// "2" or "2 (3 jours)"; None for undated places.
    pub visits: Option<String>,
    pub dates: Option<String>,
    pub details: Option<String>,
    pub history: Option<String>,
    pub category: Category,
    pub verified: bool,
}

impl PlaceDetail {
    pub fn of(place: &Place) -> Self {
        let visits = count_visits(&place.visit_dates);
        let days = place.day_count();
        let (visits, dates) = if visits > 0 {
            let count = if days > visits {
                format!("{} ({} jours)", visits, days)
            } else {
                visits.to_string()
            };
            (Some(count), Some(dates_summary(&place.visit_dates)))
        } else {
            (None, None)
        };
        Self {
            title: place.name.clone(),
            visits,
            dates,
            details: place.details.clone(),
            history: place.history.clone(),
            category: place.category,
            verified: place.latlng_verified,
        }
    }
}
