// Category legend: per-category and per-group toggles
use crate::category::{Category, LegendGroup};
use crate::visibility::VisibilityState;

#[derive(Debug, Clone)]
pub struct LegendController {
    visibility: VisibilityState,
    counts: [usize; Category::COUNT],
}

impl LegendController {
    pub fn new(counts: [usize; Category::COUNT]) -> Self {
        Self { visibility: VisibilityState::default(), counts }
    }

    pub fn visibility(&self) -> &VisibilityState {
        &self.visibility
    }

    pub fn count(&self, category: Category) -> usize {
        self.counts[category.index()]
    }

    pub fn is_shown(&self, category: Category) -> bool {
        self.visibility.is_shown(category)
    }

    pub fn toggle_category(&mut self, category: Category) -> bool {
        let shown = self.visibility.toggle(category);
        log::debug!("category {} {}", category, if shown { "shown" } else { "hidden" });
        shown
    }

    pub fn set_group(&mut self, group: LegendGroup, shown: bool) {
        for category in group.members() {
            self.visibility.set(*category, shown);
        }
    }

    /// Group checkbox state, recomputed from the members every time.
    pub fn group_checked(&self, group: LegendGroup) -> bool {
        self.visibility.all_shown(group.members())
    }
}
