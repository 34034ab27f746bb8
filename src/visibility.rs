// Decides, for every place, whether its marker is attached to the map
use jiff::civil::Date;

use crate::category::Category;
use crate::dataset::{Place, PlaceId};
use crate::dates::DateIndex;
use crate::markers::MarkerRegistry;

/// Per-category show/hide toggles. Everything starts visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityState {
    shown: [bool; Category::COUNT],
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self { shown: [true; Category::COUNT] }
    }
}

impl VisibilityState {
    pub fn is_shown(&self, category: Category) -> bool {
        self.shown[category.index()]
    }

    pub fn set(&mut self, category: Category, shown: bool) {
        self.shown[category.index()] = shown;
    }

    /// Flips one category and returns its new state.
    pub fn toggle(&mut self, category: Category) -> bool {
        let slot = &mut self.shown[category.index()];
        *slot = !*slot;
        *slot
    }

    pub fn all_shown(&self, categories: &[Category]) -> bool {
        categories.iter().all(|c| self.is_shown(*c))
    }
}

/// Timeline position applied to non-theatre places. `None` when the timeline is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineFilter {
    pub current: Date,
    pub history: bool,
}

/// `dates` must be sorted ascending.
pub fn should_attach(
    category: Category,
    shown: bool,
    filter: Option<TimelineFilter>,
    dates: &[Date],
) -> bool {
    if !shown {
        return false;
    }
    match filter {
        _ if category.is_theatre() => true,
        None => true,
        Some(TimelineFilter { current, history: false }) => dates.binary_search(&current).is_ok(),
        Some(TimelineFilter { current, history: true }) => dates.first().is_some_and(|d| *d <= current),
    }
}

/// A place visited exactly on the current date pulses, whatever the history mode.
pub fn should_pulse(filter: Option<TimelineFilter>, dates: &[Date]) -> bool {
    filter.is_some_and(|f| dates.binary_search(&f.current).is_ok())
}

/// Operations performed by one recompute pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Recompute {
    pub attached: Vec<PlaceId>,
    pub detached: Vec<PlaceId>,
    pub layers_attached: Vec<Category>,
    pub layers_detached: Vec<Category>,
    pub pulsed: Vec<PlaceId>,
}

impl Recompute {
    /// Attach/detach operations; pulses are not counted.
    pub fn operations(&self) -> usize {
        self.attached.len()
            + self.detached.len()
            + self.layers_attached.len()
            + self.layers_detached.len()
    }
}

/// Brings the registry in line with the toggles and the timeline filter.
/// Every mutation is checked first, so a second pass with unchanged inputs does nothing.
pub fn recompute(
    places: &[Place],
    index: &DateIndex,
    visibility: &VisibilityState,
    filter: Option<TimelineFilter>,
    registry: &mut MarkerRegistry,
) -> Recompute {
    let mut out = Recompute::default();

    for category in Category::ALL {
        if visibility.is_shown(category) {
            if registry.attach_layer(category) {
                out.layers_attached.push(category);
            }
        } else if registry.detach_layer(category) {
            out.layers_detached.push(category);
        }
    }

    for place in places {
        let dates = index.dates_of(&place.id);
        let shown = visibility.is_shown(place.category);

        if should_attach(place.category, shown, filter, dates) {
            if registry.attach_marker(&place.id) {
                out.attached.push(place.id.clone());
            }
            if should_pulse(filter, dates) {
                registry.flag_pulse(&place.id);
                out.pulsed.push(place.id.clone());
            }
        } else if registry.detach_marker(&place.id) {
            out.detached.push(place.id.clone());
        }
    }

    if out.operations() > 0 {
        log::debug!(
            "recompute: +{} -{} markers, +{} -{} layers, {} pulses",
            out.attached.len(),
            out.detached.len(),
            out.layers_attached.len(),
            out.layers_detached.len(),
            out.pulsed.len()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::DateCode;
    use jiff::civil::date;
    use proptest::prelude::*;

    fn scenario() -> Vec<Place> {
        let t1 = Place::test_place("T1", Category::Theatres);
        let mut p1 = Place::test_place("P1", Category::Versailles);
        p1.visit_dates = vec![DateCode(17860101), DateCode(17860102), DateCode(17860110)];
        vec![t1, p1]
    }

    fn attached(registry: &MarkerRegistry, id: &str) -> bool {
        registry.is_on_map(&PlaceId::from(id))
    }

    #[test]
    fn test_policy_table() {
        let dates = [date(1786, 1, 1), date(1786, 1, 10)];
        let exact = Some(TimelineFilter { current: date(1786, 1, 5), history: false });
        let history = Some(TimelineFilter { current: date(1786, 1, 5), history: true });

        assert!(should_attach(Category::Theatres, true, exact, &[]));
        assert!(!should_attach(Category::Theatres, false, None, &[]));
        assert!(should_attach(Category::Chasse, true, None, &[]));
        assert!(!should_attach(Category::Chasse, true, exact, &dates));
        assert!(should_attach(Category::Chasse, true, history, &dates));
        assert!(!should_attach(Category::Chasse, false, history, &dates));
        // undated places never pass an enabled timeline
        assert!(!should_attach(Category::Chasse, true, history, &[]));
    }

    #[test]
    fn test_scenario_exact_and_history() {
        let places = scenario();
        let index = DateIndex::build(&places);
        let vis = VisibilityState::default();
        let mut reg = MarkerRegistry::build(&places);

        recompute(&places, &index, &vis, None, &mut reg);
        assert!(attached(&reg, "T1") && attached(&reg, "P1"));

        let on_2nd = Some(TimelineFilter { current: date(1786, 1, 2), history: false });
        let out = recompute(&places, &index, &vis, on_2nd, &mut reg);
        assert!(attached(&reg, "T1") && attached(&reg, "P1"));
        assert_eq!(out.pulsed, vec![PlaceId::from("P1")]);

        let on_5th = Some(TimelineFilter { current: date(1786, 1, 5), history: false });
        let out = recompute(&places, &index, &vis, on_5th, &mut reg);
        assert!(attached(&reg, "T1"));
        assert!(!attached(&reg, "P1"));
        assert!(out.pulsed.is_empty());

        let on_5th_history = Some(TimelineFilter { current: date(1786, 1, 5), history: true });
        recompute(&places, &index, &vis, on_5th_history, &mut reg);
        assert!(attached(&reg, "P1"));
    }

    #[test]
    fn test_hidden_category_detaches_layer() {
        let places = scenario();
        let index = DateIndex::build(&places);
        let mut vis = VisibilityState::default();
        let mut reg = MarkerRegistry::build(&places);
        recompute(&places, &index, &vis, None, &mut reg);

        vis.set(Category::Versailles, false);
        let out = recompute(&places, &index, &vis, None, &mut reg);
        assert_eq!(out.layers_detached, vec![Category::Versailles]);
        assert_eq!(out.detached, vec![PlaceId::from("P1")]);
        assert!(!attached(&reg, "P1"));
        assert!(attached(&reg, "T1"));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let places = scenario();
        let index = DateIndex::build(&places);
        let vis = VisibilityState::default();
        let mut reg = MarkerRegistry::build(&places);
        let filter = Some(TimelineFilter { current: date(1786, 1, 10), history: false });

        let first = recompute(&places, &index, &vis, filter, &mut reg);
        assert!(first.operations() > 0);
        let second = recompute(&places, &index, &vis, filter, &mut reg);
        assert_eq!(second.operations(), 0);
    }

    proptest! {
        #[test]
        fn prop_theatres_follow_toggle_only(
            shown in any::<bool>(),
            enabled in any::<bool>(),
            history in any::<bool>(),
            day in 1i8..=28,
        ) {
            let filter = enabled.then_some(TimelineFilter { current: date(1786, 2, day), history });
            prop_assert_eq!(should_attach(Category::Theatres, shown, filter, &[]), shown);
        }

        #[test]
        fn prop_second_pass_is_noop(
            hidden in proptest::collection::vec(any::<bool>(), Category::COUNT),
            enabled in any::<bool>(),
            history in any::<bool>(),
            day in 1i8..=12,
        ) {
            let places = scenario();
            let index = DateIndex::build(&places);
            let mut vis = VisibilityState::default();
            for (cat, hide) in Category::ALL.iter().zip(&hidden) {
                vis.set(*cat, !hide);
            }
            let filter = enabled.then_some(TimelineFilter { current: date(1786, 1, day), history });
            let mut reg = MarkerRegistry::build(&places);
            recompute(&places, &index, &vis, filter, &mut reg);
            prop_assert_eq!(recompute(&places, &index, &vis, filter, &mut reg).operations(), 0);
        }
    }
}
