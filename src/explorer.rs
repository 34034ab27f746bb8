// Session state: dataset, markers, legend and timeline, recomputed on every change
use std::time::{Duration, Instant};

use crate::category::{Category, LegendGroup};
use crate::dataset::{Dataset, PlaceId};
use crate::dates::DateIndex;
use crate::jump::{AnimationEnd, Jump, JumpPhase, MapSurface};
use crate::legend::LegendController;
use crate::markers::{MarkerRegistry, PlaceDetail};
use crate::search::{self, SearchHit, SearchSettings};
use crate::timeline::{DEFAULT_BASE_INTERVAL, Speed, TimelineController};
use crate::visibility::{self, Recompute};

#[derive(Debug, Clone)]
pub struct ExplorerSettings {
    pub search: SearchSettings,
    pub base_interval: Duration,
    pub focus_zoom: f64,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self { search: SearchSettings::default(), base_interval: DEFAULT_BASE_INTERVAL, focus_zoom: 12.0 }
    }
}

pub struct Explorer {
    dataset: Dataset,
    dates: DateIndex,
    registry: MarkerRegistry,
    legend: LegendController,
    timeline: TimelineController,
    settings: ExplorerSettings,
    jump: Option<Jump>,
}

impl Explorer {
    pub fn new(dataset: Dataset, settings: ExplorerSettings) -> Self {
        let dates = DateIndex::build(dataset.all());
        let registry = MarkerRegistry::build(dataset.all());
        let legend = LegendController::new(dataset.counts());
        let timeline = TimelineController::new(dates.timeline().to_vec(), settings.base_interval);
        log::info!("Timeline spans {} distinct dates", dates.timeline().len());

        let mut explorer = Self { dataset, dates, registry, legend, timeline, settings, jump: None };
        explorer.recompute();
        explorer
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn legend(&self) -> &LegendController {
        &self.legend
    }

    pub fn timeline(&self) -> &TimelineController {
        &self.timeline
    }

    pub fn settings(&self) -> &ExplorerSettings {
        &self.settings
    }

    pub fn detail(&self, id: &PlaceId) -> Option<PlaceDetail> {
        self.dataset.get(id).map(PlaceDetail::of)
    }

    pub fn take_pulses(&mut self) -> Vec<PlaceId> {
        self.registry.take_pulses()
    }

    fn recompute(&mut self) -> Recompute {
        visibility::recompute(
            self.dataset.all(),
            &self.dates,
            self.legend.visibility(),
            self.timeline.filter(),
            &mut self.registry,
        )
    }

    // --- Timeline ---

    pub fn set_timeline_index(&mut self, index: usize) {
        if self.timeline.set_index(index) {
            self.recompute();
        }
    }

    /// Moves one date back or forward; playback keeps running.
    pub fn step_timeline(&mut self, forward: bool) {
        if !self.timeline.enabled() {
            return;
        }
        let index = self.timeline.index();
        let target = if forward { index + 1 } else { index.saturating_sub(1) };
        if target != index {
            self.set_timeline_index(target);
        }
    }

    /// Slider drag: stops playback, then moves.
    pub fn scrub_timeline(&mut self, index: usize) {
        if self.timeline.scrub(index) {
            self.recompute();
        }
    }

    pub fn toggle_play(&mut self, now: Instant) {
        if self.timeline.toggle_play(now) {
            self.recompute();
        }
    }

    pub fn set_speed(&mut self, speed: Speed, now: Instant) {
        self.timeline.set_speed(speed, now);
    }

    pub fn set_timeline_enabled(&mut self, enabled: bool) {
        self.timeline.set_enabled(enabled);
        self.recompute();
    }

    pub fn set_history_mode(&mut self, history: bool) {
        self.timeline.set_history(history);
        self.recompute();
    }

    // --- Legend ---

    pub fn toggle_category(&mut self, category: Category) {
        self.legend.toggle_category(category);
        self.recompute();
    }

    pub fn set_group(&mut self, group: LegendGroup, shown: bool) {
        self.legend.set_group(group, shown);
        self.recompute();
    }

    // --- Search and jump ---

    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        search::search(self.dataset.all(), query, &self.settings.search)
    }

    /// Enter in the search box: jumps to the first match, if any.
    pub fn jump_to_first_match(&mut self, query: &str, surface: &mut impl MapSurface, now: Instant) -> Option<PlaceId> {
        let id = search::first_match(self.dataset.all(), query, &self.settings.search)?.id.clone();
        self.go_to_place(&id, surface, now).then_some(id)
    }

    /// Reveals the marker even if its category is hidden, centers the map on
    /// it and starts waiting for the map to settle before opening its popup.
    pub fn go_to_place(&mut self, id: &PlaceId, surface: &mut impl MapSurface, now: Instant) -> bool {
        let Some(marker) = self.registry.marker(id) else {
            log::warn!("no marker for place '{}'", id);
            return false;
        };
        let (lat, lng, category) = (marker.lat, marker.lng, marker.category);

        self.registry.attach_layer(category);
        self.registry.attach_marker(id);
        surface.set_view(lat, lng, self.settings.focus_zoom);
        if let Some(previous) = self.jump.replace(Jump::start(id.clone(), now)) {
            log::debug!("jump to '{}' replaced by '{}'", previous.target(), id);
        }
        true
    }

    pub fn on_animation_end(&mut self, signal: AnimationEnd, now: Instant) {
        if let Some(jump) = self.jump.as_mut() {
            jump.on_animation_end(signal, now);
        }
    }

    /// Drives playback and the pending jump; called once per frame.
    /// Returns the place whose popup should open now, if any.
    pub fn poll(&mut self, now: Instant) -> Option<PlaceId> {
        if self.timeline.tick(now) {
            self.recompute();
        }

        let jump = self.jump.as_mut()?;
        let registry = &self.registry;
        let open = jump.poll(now, |id| registry.is_on_map(id));
        if jump.phase() != JumpPhase::Pending {
            self.jump = None;
        }
        open
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let jump = self.jump.as_ref().and_then(Jump::next_deadline);
        self.timeline.next_deadline().into_iter().chain(jump).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Place;
    use crate::dates::DateCode;
    use crate::jump::FALLBACK_DELAY;

    #[derive(Default)]
    struct FakeMap {
        views: Vec<(f64, f64, f64)>,
    }

    impl MapSurface for FakeMap {
        fn set_view(&mut self, lat: f64, lng: f64, zoom: f64) {
            self.views.push((lat, lng, zoom));
        }
    }

    fn explorer() -> Explorer {
        let t1 = Place::test_place("T1", Category::Theatres);
        let mut p1 = Place::test_place("P1", Category::Versailles);
        p1.name = "Trianon".to_string();
        p1.visit_dates = vec![DateCode(17860101), DateCode(17860102), DateCode(17860110)];
        let mut c1 = Place::test_place("C1", Category::Chasse);
        c1.visit_dates = vec![DateCode(17860105)];
        let dataset = Dataset::new(vec![t1], vec![p1, c1]).unwrap();
        Explorer::new(dataset, ExplorerSettings::default())
    }

    fn on_map(ex: &Explorer, id: &str) -> bool {
        ex.registry().is_on_map(&PlaceId::from(id))
    }

    #[test]
    fn test_timeline_scenario() {
        let mut ex = explorer();
        assert!(on_map(&ex, "T1") && on_map(&ex, "P1") && on_map(&ex, "C1"));

        ex.set_timeline_enabled(true);
        ex.set_timeline_index(1); // 1786-01-02
        assert!(on_map(&ex, "T1"));
        assert!(on_map(&ex, "P1"));
        assert!(!on_map(&ex, "C1"));

        ex.set_timeline_index(2); // 1786-01-05
        assert!(!on_map(&ex, "P1"));
        assert!(on_map(&ex, "C1"));

        ex.set_history_mode(true);
        assert!(on_map(&ex, "P1"));

        ex.set_timeline_enabled(false);
        assert!(on_map(&ex, "P1") && on_map(&ex, "C1"));
        assert_eq!(ex.timeline().index(), 2);
        ex.step_timeline(true);
        assert_eq!(ex.timeline().index(), 2);
    }

    #[test]
    fn test_step_timeline_clamps() {
        let mut ex = explorer();
        ex.set_timeline_enabled(true);
        ex.step_timeline(false);
        assert_eq!(ex.timeline().index(), 0);
        for _ in 0..10 {
            ex.step_timeline(true);
        }
        assert_eq!(ex.timeline().index(), 3);
        // 1786-01-10
        assert!(on_map(&ex, "P1") && !on_map(&ex, "C1"));
    }

    #[test]
    fn test_group_toggle_scenario() {
        let mut ex = explorer();
        ex.set_group(LegendGroup::Sejours, false);
        assert!(!on_map(&ex, "P1") && !on_map(&ex, "C1"));
        assert!(!ex.registry().group(Category::Versailles).on_map());
        assert!(on_map(&ex, "T1"));

        ex.toggle_category(Category::Chasse);
        assert!(on_map(&ex, "C1"));
        assert!(!ex.legend().group_checked(LegendGroup::Sejours));
    }

    #[test]
    fn test_playback_advances_and_pulses() {
        let mut ex = explorer();
        ex.set_timeline_enabled(true);
        ex.take_pulses();

        let t0 = Instant::now();
        ex.toggle_play(t0);
        assert!(ex.timeline().is_playing());
        assert_eq!(ex.poll(t0 + DEFAULT_BASE_INTERVAL), None);
        assert_eq!(ex.timeline().index(), 1);
        assert_eq!(ex.take_pulses(), vec![PlaceId::from("P1")]);
        assert!(ex.next_deadline().is_some());
    }

    #[test]
    fn test_jump_reveals_hidden_marker_and_opens_once() {
        let mut ex = explorer();
        ex.toggle_category(Category::Chasse);
        assert!(!on_map(&ex, "C1"));

        let mut map = FakeMap::default();
        let t0 = Instant::now();
        assert!(ex.go_to_place(&PlaceId::from("C1"), &mut map, t0));
        assert_eq!(map.views, vec![(48.8, 2.1, 12.0)]);
        assert!(on_map(&ex, "C1"));

        ex.on_animation_end(AnimationEnd::Move, t0);
        ex.on_animation_end(AnimationEnd::Zoom, t0);
        let out = ex.poll(t0 + Duration::from_millis(200));
        assert_eq!(out, Some(PlaceId::from("C1")));
        assert_eq!(ex.poll(t0 + FALLBACK_DELAY), None);
        assert!(ex.jump.is_none());
        assert_eq!(ex.next_deadline(), None);
    }

    #[test]
    fn test_new_jump_replaces_pending_one() {
        let mut ex = explorer();
        let mut map = FakeMap::default();
        let t0 = Instant::now();
        ex.go_to_place(&PlaceId::from("P1"), &mut map, t0);
        let t1 = t0 + Duration::from_millis(100);
        ex.go_to_place(&PlaceId::from("C1"), &mut map, t1);
        assert_eq!(ex.jump.as_ref().map(|j| j.target().clone()), Some(PlaceId::from("C1")));

        // the first jump's fallback is gone
        assert_eq!(ex.poll(t0 + FALLBACK_DELAY), None);
        assert_eq!(ex.poll(t1 + FALLBACK_DELAY), Some(PlaceId::from("C1")));
        assert!(ex.jump.is_none());
    }

    #[test]
    fn test_place_with_only_malformed_dates() {
        let mut a = Place::test_place("A", Category::Versailles);
        a.visit_dates = vec![DateCode(17860301)];
        let mut b = Place::test_place("B", Category::Chasse);
        b.visit_dates = vec![DateCode(17861399)];
        let dataset = Dataset::new(Vec::new(), vec![a, b]).unwrap();
        let mut ex = Explorer::new(dataset, ExplorerSettings::default());

        assert_eq!(ex.timeline().dates().len(), 1);
        assert!(on_map(&ex, "B"));
        ex.set_timeline_enabled(true);
        assert!(on_map(&ex, "A"));
        assert!(!on_map(&ex, "B"));
        ex.set_history_mode(true);
        assert!(!on_map(&ex, "B"));
        assert_eq!(ex.detail(&PlaceId::from("B")).unwrap().visits, None);
    }

    #[test]
    fn test_jump_to_first_match() {
        let mut ex = explorer();
        let mut map = FakeMap::default();
        let now = Instant::now();
        assert_eq!(ex.jump_to_first_match("tria", &mut map, now), Some(PlaceId::from("P1")));
        assert_eq!(ex.jump_to_first_match("17860105", &mut map, now), Some(PlaceId::from("C1")));
        assert_eq!(ex.jump_to_first_match("zz", &mut map, now), None);
        assert_eq!(map.views.len(), 2);
        assert!(!ex.go_to_place(&PlaceId::from("missing"), &mut map, now));
    }

    #[test]
    fn test_detail_lookup() {
        let ex = explorer();
        let detail = ex.detail(&PlaceId::from("P1")).unwrap();
        assert_eq!(detail.title, "Trianon");
        assert!(ex.detail(&PlaceId::from("nope")).is_none());
    }
}
