// Responsive layout: header, footer and legend drawer depending on window width
use std::time::{Duration, Instant};

pub const COMPACT_MAX_WIDTH: f32 = 768.0;
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct LayoutController {
    compact_max_width: f32,
    compact: bool,
    header_collapsed: bool,
    footer_collapsed: bool,
    legend_open: bool,
    legend_tab_visible: bool,
    applied_width: f32,
    pending: Option<(f32, Instant)>,
}

impl LayoutController {
    pub fn new(compact_max_width: f32, width: f32) -> Self {
        let mut layout = Self {
            compact_max_width,
            compact: false,
            header_collapsed: false,
            footer_collapsed: false,
            legend_open: false,
            legend_tab_visible: false,
            applied_width: width,
            pending: None,
        };
        layout.apply(width);
        layout
    }

    fn apply(&mut self, width: f32) {
        self.applied_width = width;
        self.compact = width <= self.compact_max_width;
        if self.compact {
            self.header_collapsed = true;
            self.footer_collapsed = true;
            self.legend_tab_visible = !self.legend_open;
        } else {
            self.header_collapsed = false;
            self.footer_collapsed = false;
            self.legend_open = false;
            self.legend_tab_visible = false;
        }
    }

    /// Records a new width; it is applied once resizing has been quiet for the debounce delay.
    pub fn on_resize(&mut self, width: f32, now: Instant) {
        let latest = self.pending.map(|(w, _)| w).unwrap_or(self.applied_width);
        if (latest - width).abs() < f32::EPSILON {
            return;
        }
        self.pending = Some((width, now + RESIZE_DEBOUNCE));
    }

    /// Applies a pending resize whose debounce has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some((width, due)) if due <= now => {
                self.pending = None;
                self.apply(width);
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, due)| due)
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub fn header_collapsed(&self) -> bool {
        self.header_collapsed
    }

    pub fn footer_collapsed(&self) -> bool {
        self.footer_collapsed
    }

    pub fn legend_tab_visible(&self) -> bool {
        self.legend_tab_visible
    }

    /// The legend is drawn when wide, or when the drawer is open.
    pub fn legend_visible(&self) -> bool {
        !self.compact || self.legend_open
    }

    pub fn toggle_header(&mut self) {
        self.header_collapsed = !self.header_collapsed;
    }

    pub fn toggle_footer(&mut self) {
        self.footer_collapsed = !self.footer_collapsed;
    }

    /// (icon, tooltip) of the footer toggle button.
    pub fn footer_toggle(&self) -> (&'static str, &'static str) {
        if self.footer_collapsed {
            ("ⓘ", "Afficher les sources")
        } else {
            ("✕", "Masquer les sources")
        }
    }

    pub fn open_legend(&mut self) {
        if self.compact {
            self.legend_open = true;
            self.legend_tab_visible = false;
        }
    }

    pub fn close_legend(&mut self) {
        self.legend_open = false;
        self.legend_tab_visible = self.compact;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_modes() {
        let wide = LayoutController::new(COMPACT_MAX_WIDTH, 1280.0);
        assert!(!wide.is_compact());
        assert!(!wide.header_collapsed() && !wide.footer_collapsed());
        assert!(wide.legend_visible());
        assert!(!wide.legend_tab_visible());

        let narrow = LayoutController::new(COMPACT_MAX_WIDTH, 768.0);
        assert!(narrow.is_compact());
        assert!(narrow.header_collapsed() && narrow.footer_collapsed());
        assert!(!narrow.legend_visible());
        assert!(narrow.legend_tab_visible());
    }

    #[test]
    fn test_drawer() {
        let mut layout = LayoutController::new(COMPACT_MAX_WIDTH, 400.0);
        layout.open_legend();
        assert!(layout.legend_visible());
        assert!(!layout.legend_tab_visible());
        layout.close_legend();
        assert!(!layout.legend_visible());
        assert!(layout.legend_tab_visible());

        let mut wide = LayoutController::new(COMPACT_MAX_WIDTH, 1200.0);
        wide.open_legend();
        assert!(!wide.legend_open);
    }

    #[test]
    fn test_resize_is_debounced() {
        let t0 = Instant::now();
        let mut layout = LayoutController::new(COMPACT_MAX_WIDTH, 1200.0);
        layout.open_legend();
        layout.on_resize(500.0, t0);
        assert!(!layout.poll(t0 + Duration::from_millis(100)));
        // a further resize pushes the deadline back
        layout.on_resize(600.0, t0 + Duration::from_millis(200));
        assert!(!layout.poll(t0 + Duration::from_millis(300)));
        assert!(layout.poll(t0 + Duration::from_millis(450)));
        assert!(layout.is_compact());
        assert!(layout.header_collapsed());

        layout.open_legend();
        layout.on_resize(1000.0, t0 + Duration::from_secs(1));
        assert!(layout.poll(t0 + Duration::from_secs(2)));
        assert!(!layout.is_compact());
        assert!(!layout.legend_open);
    }

    #[test]
    fn test_footer_toggle_icon() {
        let mut layout = LayoutController::new(COMPACT_MAX_WIDTH, 1200.0);
        assert_eq!(layout.footer_toggle().0, "✕");
        layout.toggle_footer();
        assert_eq!(layout.footer_toggle().0, "ⓘ");
        layout.toggle_header();
        assert!(layout.header_collapsed());
    }
}
