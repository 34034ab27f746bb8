// Map panel: walkers tiles plus a plugin drawing the attached markers and the Normandy route
use eframe::egui;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use walkers::{HttpTiles, Map, MapMemory, Plugin, Position, Projector};

use crate::category::Category;
use crate::config::MapConfig;
use crate::dataset::PlaceId;
use crate::explorer::Explorer;
use crate::jump::{AnimationEnd, MapSurface};
use crate::markers::MarkerStyle;
use crate::route::NORMANDIE_ROUTE;

pub const PULSE_DURATION: Duration = Duration::from_millis(900);
const PULSE_GROWTH: f32 = 14.0;
const ROUTE_HIT_DISTANCE: f32 = 6.0;

pub fn category_color(category: Category) -> egui::Color32 {
    let [r, g, b] = category.rgb();
    egui::Color32::from_rgb(r, g, b)
}

/// What the pointer hit on the map this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum MapHit {
    Marker(PlaceId),
    Route,
}

#[derive(Debug, Default)]
pub struct MapFrame {
    pub hit: Option<MapHit>,
    /// Animation-end signals produced by a view change applied this frame
    pub settled: Vec<AnimationEnd>,
}

pub struct MapPanel {
    pub map_memory: MapMemory,
    tiles: Option<HttpTiles>,
    home: Position,
    requested_view: Option<(Position, f64)>,
    pulses: FxHashMap<PlaceId, Instant>,
}

impl MapPanel {
    pub fn new(config: &MapConfig) -> Self {
        let home = walkers::lat_lon(config.center_lat, config.center_lon);
        let mut map_memory = MapMemory::default();
        map_memory.center_at(home);
        if let Err(e) = map_memory.set_zoom(config.zoom) {
            log::warn!("Initial zoom {} rejected: {:?}", config.zoom, e);
        }
        Self { map_memory, tiles: None, home, requested_view: None, pulses: FxHashMap::default() }
    }

    /// Initialize tiles if not already done
    pub fn ensure_tiles(&mut self, ctx: &egui::Context) {
        if self.tiles.is_none() {
            let tiles = HttpTiles::new(walkers::sources::OpenStreetMap, ctx.clone());
            self.tiles = Some(tiles);
        }
    }

    /// Restarts the ring of every pulsed marker.
    pub fn add_pulses(&mut self, ids: Vec<PlaceId>, now: Instant) {
        for id in ids {
            self.pulses.insert(id, now);
        }
    }

    pub fn pulses_active(&self) -> bool {
        !self.pulses.is_empty()
    }

    fn pulse_progress(&self, id: &PlaceId, now: Instant) -> Option<f32> {
        let started = self.pulses.get(id)?;
        Some(now.duration_since(*started).as_secs_f32() / PULSE_DURATION.as_secs_f32())
    }

    pub fn render(&mut self, ui: &mut egui::Ui, explorer: &Explorer, now: Instant) -> MapFrame {
        self.ensure_tiles(ui.ctx());
        self.pulses.retain(|_, started| now.duration_since(*started) < PULSE_DURATION);

        let mut frame = MapFrame::default();
        if let Some((position, zoom)) = self.requested_view.take() {
            self.map_memory.center_at(position);
            if let Err(e) = self.map_memory.set_zoom(zoom) {
                log::warn!("Zoom {} rejected: {:?}", zoom, e);
            }
            // walkers jumps without animating, so both animations end right away
            frame.settled.extend([AnimationEnd::Move, AnimationEnd::Zoom]);
        }

        let mut sprites: Vec<MarkerSprite> = explorer
            .registry()
            .visible()
            .map(|marker| MarkerSprite {
                id: marker.id.clone(),
                position: walkers::lat_lon(marker.lat, marker.lng),
                color: category_color(marker.category),
                style: marker.style,
                pulse: self.pulse_progress(&marker.id, now),
            })
            .collect();
        // theatres above the circles
        sprites.sort_by_key(|s| matches!(s.style, MarkerStyle::Triangle { .. }));

        let route = explorer
            .registry()
            .group(Category::Normandie)
            .on_map()
            .then(|| NORMANDIE_ROUTE.iter().map(|&(lat, lon)| walkers::lat_lon(lat, lon)).collect());

        let hit = Arc::new(Mutex::new(None));
        if let Some(ref mut tiles) = self.tiles {
            let plugin = PlacesPlugin {
                sprites,
                route,
                route_color: category_color(Category::Normandie),
                hit: Arc::clone(&hit),
            };
            let map = Map::new(Some(tiles), &mut self.map_memory, self.home).with_plugin(plugin);
            ui.add(map);
        }
        frame.hit = hit.lock().ok().and_then(|mut slot| slot.take());
        frame
    }
}

impl MapSurface for MapPanel {
    fn set_view(&mut self, lat: f64, lng: f64, zoom: f64) {
        self.requested_view = Some((walkers::lat_lon(lat, lng), zoom));
    }
}

struct MarkerSprite {
    id: PlaceId,
    position: Position,
    color: egui::Color32,
    style: MarkerStyle,
    /// 0..1 while the ring is expanding
    pulse: Option<f32>,
}

impl MarkerSprite {
    fn hit_radius(&self) -> f32 {
        match self.style {
            MarkerStyle::Triangle { size } => size / 2.0 + 2.0,
            MarkerStyle::Circle { radius } => radius + 3.0,
        }
    }

    fn paint(&self, painter: &egui::Painter, center: egui::Pos2) {
        let outline = egui::Color32::from_rgb(0x33, 0x33, 0x33);
        let base = match self.style {
            MarkerStyle::Triangle { size } => {
                let half = size / 2.0;
                let points = vec![
                    egui::pos2(center.x, center.y - half),
                    egui::pos2(center.x + half, center.y + half),
                    egui::pos2(center.x - half, center.y + half),
                ];
                painter.add(egui::Shape::convex_polygon(points, self.color, egui::Stroke::new(1.0, outline)));
                half
            }
            MarkerStyle::Circle { radius } => {
                painter.circle_filled(center, radius, self.color.gamma_multiply(0.85));
                painter.circle_stroke(center, radius, egui::Stroke::new(1.5, outline));
                radius
            }
        };

        if let Some(progress) = self.pulse {
            let progress = progress.clamp(0.0, 1.0);
            let ring = self.color.gamma_multiply(1.0 - progress);
            painter.circle_stroke(center, base + PULSE_GROWTH * progress, egui::Stroke::new(2.5, ring));
        }
    }
}

fn distance_to_segment(p: egui::Pos2, a: egui::Pos2, b: egui::Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Plugin for drawing the attached markers on the map
struct PlacesPlugin {
    sprites: Vec<MarkerSprite>,
    route: Option<Vec<Position>>,
    route_color: egui::Color32,
    hit: Arc<Mutex<Option<MapHit>>>,
}

impl Plugin for PlacesPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter();
        let project = |pos: Position| {
            let screen_vec = projector.project(pos);
            egui::pos2(screen_vec.x, screen_vec.y)
        };

        let route: Vec<egui::Pos2> = self.route.iter().flatten().map(|p| project(*p)).collect();
        if route.len() > 1 {
            painter.extend(egui::Shape::dashed_line(&route, egui::Stroke::new(3.0, self.route_color), 10.0, 6.0));
        }

        let centers: Vec<egui::Pos2> = self.sprites.iter().map(|s| project(s.position)).collect();
        for (sprite, center) in self.sprites.iter().zip(&centers) {
            sprite.paint(painter, *center);
        }

        // topmost first
        let marker_at = |pointer: egui::Pos2| {
            self.sprites
                .iter()
                .zip(&centers)
                .rev()
                .find(|(sprite, center)| pointer.distance(**center) <= sprite.hit_radius())
                .map(|(sprite, _)| sprite.id.clone())
        };
        let on_route = |pointer: egui::Pos2| {
            route.windows(2).any(|w| distance_to_segment(pointer, w[0], w[1]) <= ROUTE_HIT_DISTANCE)
        };

        if let Some(hover) = response.hover_pos()
            && (marker_at(hover).is_some() || on_route(hover))
        {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        if response.clicked()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let hit = marker_at(pointer)
                .map(MapHit::Marker)
                .or_else(|| on_route(pointer).then_some(MapHit::Route));
            if let (Some(hit), Ok(mut slot)) = (hit, self.hit.lock()) {
                *slot = Some(hit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_segment() {
        let a = egui::pos2(0.0, 0.0);
        let b = egui::pos2(10.0, 0.0);
        assert_eq!(distance_to_segment(egui::pos2(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(egui::pos2(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_segment(egui::pos2(1.0, 1.0), a, a), 2f32.sqrt());
    }

    #[test]
    fn test_set_view_applies_on_render_only() {
        let mut panel = MapPanel::new(&MapConfig::default());
        panel.set_view(49.65, -1.63, 12.0);
        assert!(panel.requested_view.is_some());
        assert!(!panel.pulses_active());
    }

    #[test]
    fn test_pulse_progress() {
        let mut panel = MapPanel::new(&MapConfig::default());
        let t0 = Instant::now();
        let id = PlaceId::from("caen");
        panel.add_pulses(vec![id.clone()], t0);
        assert!(panel.pulses_active());
        let half = panel.pulse_progress(&id, t0 + PULSE_DURATION / 2).unwrap();
        assert!((half - 0.5).abs() < 1e-3);
        assert_eq!(panel.pulse_progress(&PlaceId::from("rouen"), t0), None);
    }
}
