use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;

use super::APP_TITLE;
use super::map::{MapHit, MapPanel};
use super::panels;
use crate::config::{Config, GuiConfig};
use crate::dataset::PlaceId;
use crate::explorer::Explorer;
use crate::layout::LayoutController;

const OVERLAY_MARGIN: f32 = 10.0;

pub struct GuiApp {
    explorer: Explorer,
    map: MapPanel,
    layout: LayoutController,
    gui_config: GuiConfig,
    config_path: PathBuf,
    search_query: String,
    open_detail: Option<PlaceId>,
    show_route: bool,
    initial_scale_applied: bool,
    last_window_size: Option<(u32, u32)>,
}

impl GuiApp {
    pub fn new(explorer: Explorer, config: &Config, config_path: PathBuf) -> Self {
        let width = config.gui.width.unwrap_or(1280) as f32;
        Self {
            explorer,
            map: MapPanel::new(&config.map),
            layout: LayoutController::new(config.layout.compact_max_width, width),
            gui_config: config.gui.clone(),
            config_path,
            search_query: String::new(),
            open_detail: None,
            show_route: false,
            initial_scale_applied: false,
            last_window_size: None,
        }
    }

    pub fn run(self) -> Result<(), eframe::Error> {
        // Config stores logical points at font_scale 1.0
        let width = self.gui_config.width.unwrap_or(1280) as f32;
        let height = self.gui_config.height.unwrap_or(800) as f32;
        log::debug!("Opening window at {}x{}", width, height);

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([width, height])
                .with_min_inner_size([360.0, 480.0])
                .with_title(APP_TITLE),
            ..Default::default()
        };

        eframe::run_native(APP_TITLE, options, Box::new(move |_cc| Ok(Box::new(self))))
    }

    fn font_scale(&self) -> f32 {
        self.gui_config.font_scale.unwrap_or(1.0)
    }

    fn legend_panel(&mut self, ctx: &egui::Context) {
        if !self.layout.legend_visible() {
            if self.layout.legend_tab_visible() {
                egui::Area::new(egui::Id::new("legend_tab"))
                    .anchor(egui::Align2::RIGHT_TOP, [-OVERLAY_MARGIN, OVERLAY_MARGIN])
                    .show(ctx, |ui| {
                        if ui.button("Catégories").clicked() {
                            self.layout.open_legend();
                        }
                    });
            }
            return;
        }

        if !self.layout.is_compact() {
            egui::SidePanel::right("legend_panel")
                .resizable(true)
                .default_width(280.0)
                .show(ctx, |ui| {
                    ui.heading("Légende");
                    egui::ScrollArea::vertical().show(ui, |ui| panels::legend(ui, &mut self.explorer));
                });
            return;
        }

        let mut open = true;
        egui::Window::new("Catégories")
            .open(&mut open)
            .anchor(egui::Align2::RIGHT_TOP, [-OVERLAY_MARGIN, OVERLAY_MARGIN])
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| panels::legend(ui, &mut self.explorer));
        if !open {
            self.layout.close_legend();
        }
    }

    fn search_window(&mut self, ctx: &egui::Context, now: Instant) {
        egui::Window::new("Rechercher")
            .anchor(egui::Align2::LEFT_TOP, [OVERLAY_MARGIN, OVERLAY_MARGIN])
            .resizable(false)
            .default_width(280.0)
            .show(ctx, |ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.search_query)
                        .hint_text("Lieu ou date...")
                        .desired_width(f32::INFINITY),
                );
                let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let mut jumped = false;
                if submitted {
                    jumped = self.explorer.jump_to_first_match(&self.search_query, &mut self.map, now).is_some();
                } else if let Some(id) = panels::search_results(ui, &self.explorer, &self.search_query) {
                    jumped = self.explorer.go_to_place(&id, &mut self.map, now);
                }
                if jumped {
                    self.search_query.clear();
                    // the requested view is applied by the next map render
                    ui.ctx().request_repaint();
                }
            });
    }

    fn timeline_window(&mut self, ctx: &egui::Context, now: Instant) {
        egui::Window::new("Chronologie")
            .anchor(egui::Align2::LEFT_BOTTOM, [OVERLAY_MARGIN, -OVERLAY_MARGIN])
            .resizable(false)
            .default_width(320.0)
            .show(ctx, |ui| panels::timeline(ui, &mut self.explorer, now));
    }

    fn popups(&mut self, ctx: &egui::Context) {
        if let Some(id) = &self.open_detail {
            let open = match self.explorer.detail(id) {
                Some(detail) => panels::detail_window(ctx, &detail),
                None => false,
            };
            if !open {
                self.open_detail = None;
            }
        }
        if self.show_route && !panels::route_window(ctx) {
            self.show_route = false;
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        if self.map.pulses_active() {
            ctx.request_repaint();
            return;
        }
        let deadline = self.explorer.next_deadline().into_iter().chain(self.layout.next_deadline()).min();
        if let Some(deadline) = deadline {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    // Track window size for saving on exit
    fn track_window_size(&mut self, ctx: &egui::Context) {
        let scale = self.font_scale();
        let size = ctx.input(|i| {
            i.viewport()
                .inner_rect
                .map(|r| ((r.width() * scale) as u32, (r.height() * scale) as u32))
        });
        if let Some(size) = size
            && size.0 > 100
            && size.1 > 100
        {
            self.last_window_size = Some(size);
        }
    }
}

impl eframe::App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if !self.initial_scale_applied {
            ctx.set_pixels_per_point(ctx.pixels_per_point() * self.font_scale());
            self.initial_scale_applied = true;
        }

        if let Some(width) = ctx.input(|i| i.viewport().inner_rect.map(|r| r.width())) {
            self.layout.on_resize(width, now);
        }
        if self.layout.poll(now) {
            log::debug!("Layout switched, compact = {}", self.layout.is_compact());
        }

        // arrow keys step the timeline unless a text field has focus
        if !ctx.wants_keyboard_input() {
            let (back, forward) =
                ctx.input(|i| (i.key_pressed(egui::Key::ArrowLeft), i.key_pressed(egui::Key::ArrowRight)));
            if back || forward {
                self.explorer.step_timeline(forward);
            }
        }

        if let Some(id) = self.explorer.poll(now) {
            self.open_detail = Some(id);
        }
        let pulses = self.explorer.take_pulses();
        if !pulses.is_empty() {
            self.map.add_pulses(pulses, now);
        }

        panels::header(ctx, &mut self.layout, &self.explorer);
        panels::footer(ctx, &mut self.layout);
        self.legend_panel(ctx);

        let map_frame = egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.map.render(ui, &self.explorer, now))
            .inner;
        for signal in map_frame.settled {
            self.explorer.on_animation_end(signal, now);
        }
        match map_frame.hit {
            Some(MapHit::Marker(id)) => self.open_detail = Some(id),
            Some(MapHit::Route) => self.show_route = true,
            None => {}
        }

        self.search_window(ctx, now);
        self.timeline_window(ctx, now);
        self.popups(ctx);

        self.schedule_repaint(ctx, now);
        self.track_window_size(ctx);
    }

    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    fn on_exit(&mut self) {
        let mut gui_config = self.gui_config.clone();
        if let Some((w, h)) = self.last_window_size {
            gui_config.width = Some(w);
            gui_config.height = Some(h);
            log::debug!("Saving window size: {}x{}", w, h);
        } else {
            log::warn!("No window size captured");
        }
        if let Err(e) = Config::save_gui_config(&self.config_path, &gui_config) {
            log::error!("Error saving config: {}", e);
        }
    }
}
