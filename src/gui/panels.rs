use eframe::egui;
use std::time::Instant;

use super::map::category_color;
use crate::category::{Category, LegendGroup};
use crate::dataset::PlaceId;
use crate::explorer::Explorer;
use crate::layout::LayoutController;
use crate::markers::PlaceDetail;
use crate::route::{self, NORMANDIE_ROUTE, NORMANDIE_ROUTE_DATES, NORMANDIE_ROUTE_NOTE, NORMANDIE_ROUTE_TITLE};
use crate::timeline::Speed;

const SUBTITLE: &str = "Théâtres et séjours de la cour de Louis XVI";
const ATTRIBUTION: &str = "Fonds de carte © contributeurs OpenStreetMap.";

pub fn header(ctx: &egui::Context, layout: &mut LayoutController, explorer: &Explorer) {
    egui::TopBottomPanel::top("header").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading(super::APP_TITLE);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let icon = if layout.header_collapsed() { "⏷" } else { "⏶" };
                if ui.button(icon).on_hover_text("Afficher/masquer l'en-tête").clicked() {
                    layout.toggle_header();
                }
            });
        });
        if !layout.header_collapsed() {
            let dataset = explorer.dataset();
            ui.label(SUBTITLE);
            ui.weak(format!(
                "{} théâtres, {} lieux de séjour, {} dates de visite",
                dataset.theatres().len(),
                dataset.others().len(),
                explorer.timeline().dates().len()
            ));
        }
    });
}

pub fn footer(ctx: &egui::Context, layout: &mut LayoutController) {
    egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let (icon, tooltip) = layout.footer_toggle();
            if ui.button(icon).on_hover_text(tooltip).clicked() {
                layout.toggle_footer();
            }
            if layout.footer_collapsed() {
                ui.weak("Crédits");
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.weak(format!("v{} ({})", env!("CARGO_PKG_VERSION"), env!("APP_GIT_HASH")));
            });
        });
        if !layout.footer_collapsed() {
            ui.small(ATTRIBUTION);
        }
    });
}

fn swatch(ui: &mut egui::Ui, category: Category, shown: bool) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
    let color = category_color(category);
    let color = if shown { color } else { color.gamma_multiply(0.3) };
    let painter = ui.painter();
    if category.is_theatre() {
        let points = vec![rect.center_top(), rect.right_bottom(), rect.left_bottom()];
        painter.add(egui::Shape::convex_polygon(points, color, egui::Stroke::NONE));
    } else {
        painter.circle_filled(rect.center(), 6.0, color);
    }
}

pub fn legend(ui: &mut egui::Ui, explorer: &mut Explorer) {
    for group in LegendGroup::ALL {
        let mut checked = explorer.legend().group_checked(group);
        if ui.checkbox(&mut checked, egui::RichText::new(group.title()).strong()).changed() {
            explorer.set_group(group, checked);
        }
        ui.indent(group.title(), |ui| {
            for &category in group.members() {
                let shown = explorer.legend().is_shown(category);
                let count = explorer.legend().count(category);
                ui.horizontal(|ui| {
                    swatch(ui, category, shown);
                    let text = format!("{} ({})", category.legend_label(), count);
                    let text = if shown { egui::RichText::new(text) } else { egui::RichText::new(text).weak() };
                    if ui.selectable_label(false, text).clicked() {
                        explorer.toggle_category(category);
                    }
                });
            }
        });
        ui.add_space(4.0);
    }
    ui.separator();
    ui.weak("Cliquez sur une catégorie pour l'afficher ou la masquer.");
}

pub fn timeline(ui: &mut egui::Ui, explorer: &mut Explorer, now: Instant) {
    let tl = explorer.timeline();
    let (mut enabled, mut history) = (tl.enabled(), tl.history());
    let (index, last_index, playing, speed) = (tl.index(), tl.last_index(), tl.is_playing(), tl.speed());
    let label = tl.label();
    let bounds = tl.bounds_labels();

    if ui.checkbox(&mut enabled, "Activer la chronologie").changed() {
        explorer.set_timeline_enabled(enabled);
    }
    let Some((first, last)) = bounds else {
        ui.weak("Aucune date de visite dans les données.");
        return;
    };

    ui.add_enabled_ui(enabled, |ui| {
        if ui.checkbox(&mut history, "Afficher l'historique").changed() {
            explorer.set_history_mode(history);
        }
        ui.horizontal(|ui| {
            let (icon, tooltip) = if playing { ("⏸", "Pause") } else { ("▶", "Lecture") };
            if ui.button(icon).on_hover_text(tooltip).clicked() {
                explorer.toggle_play(now);
            }
            ui.strong(label);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                for candidate in Speed::ALL.iter().rev() {
                    if ui.selectable_label(speed == *candidate, candidate.label()).clicked() {
                        explorer.set_speed(*candidate, now);
                    }
                }
            });
        });

        let mut selected = index;
        let slider = egui::Slider::new(&mut selected, 0..=last_index).show_value(false);
        if ui.add(slider).changed() {
            explorer.scrub_timeline(selected);
        }
        ui.horizontal(|ui| {
            ui.small(first);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small(last);
            });
        });
    });
}

/// Returns the place chosen from the result list, if any.
pub fn search_results(ui: &mut egui::Ui, explorer: &Explorer, query: &str) -> Option<PlaceId> {
    let hits = explorer.search(query);
    if hits.is_empty() {
        if query.trim().chars().count() >= explorer.settings().search.min_query_len {
            ui.weak("Aucun résultat");
        }
        return None;
    }

    let mut chosen = None;
    egui::ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
        for hit in &hits {
            let response = ui
                .horizontal(|ui| {
                    swatch(ui, hit.place.category, true);
                    ui.vertical(|ui| {
                        let clicked = ui.selectable_label(false, &hit.place.name).clicked();
                        if !hit.summary.is_empty() {
                            ui.small(&hit.summary);
                        }
                        clicked
                    })
                    .inner
                })
                .inner;
            if response {
                chosen = Some(hit.place.id.clone());
            }
        }
    });
    chosen
}

/// Popup of one place. Returns false once the window has been closed.
pub fn detail_window(ctx: &egui::Context, detail: &PlaceDetail) -> bool {
    let mut open = true;
    egui::Window::new(&detail.title)
        .id(egui::Id::new("place_detail"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(category_color(detail.category), detail.category.label());
                if detail.verified {
                    ui.label("✔").on_hover_text("Coordonnées vérifiées");
                }
            });
            if let Some(visits) = &detail.visits {
                ui.label(format!("Visites : {}", visits));
            }
            if let Some(dates) = &detail.dates {
                ui.label(format!("Dates : {}", dates));
            }
            if let Some(details) = &detail.details {
                ui.add_space(4.0);
                ui.label(egui::RichText::new(details).italics());
            }
            if let Some(history) = &detail.history {
                ui.add_space(4.0);
                ui.label(history);
            }
        });
    open
}

pub fn route_window(ctx: &egui::Context) -> bool {
    let mut open = true;
    egui::Window::new(NORMANDIE_ROUTE_TITLE)
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.strong(NORMANDIE_ROUTE_DATES);
            ui.label(NORMANDIE_ROUTE_NOTE);
            ui.label(format!(
                "Distance parcourue : {}",
                route::format_distance(route::route_length(&NORMANDIE_ROUTE))
            ));
        });
    open
}
