//! UI panels for the application
//!
//! This module provides the sidebar (legend, statistics, settings), the
//! help overlay, drag-and-drop handling for replacement feed files, and
//! the sidebar toggle button overlaid on the map.

use egui::{Color32, Pos2, RichText, Stroke, Ui, vec2};

use crate::app::plugin::{CITY_COLOR, depth_color};
use crate::app::state::{AppState, SidebarTab, TilesProvider};
use crate::data::DepthBand;

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());

    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };

    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };

    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    egui::SidePanel::right("main_sidebar")
        .default_width(300.0)
        .min_width(260.0)
        .max_width(450.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(
                    &mut state.ui_settings.active_tab,
                    SidebarTab::Quakes,
                    "🌍 Quakes",
                );
                ui.selectable_value(
                    &mut state.ui_settings.active_tab,
                    SidebarTab::Settings,
                    "⚙ Settings",
                );
            });

            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match state.ui_settings.active_tab {
                    SidebarTab::Quakes => render_quakes_tab(ui, state),
                    SidebarTab::Settings => render_settings_tab(ui, state),
                });
        });
}

fn render_quakes_tab(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("⟳ Reload Feed").clicked() {
            state.reload_feed();
        }
        if ui.button("🎯 Fit to View").clicked() {
            state.pending_fit_view = true;
        }
    });

    ui.add_space(8.0);

    if state.loader.is_busy() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(
                RichText::new("Loading data...")
                    .strong()
                    .color(ui.visuals().warn_fg_color),
            );
        });
        ui.add_space(8.0);
    }

    ui.separator();
    render_legend_section(ui);

    ui.add_space(8.0);
    ui.separator();
    render_stats_section(ui, state);

    // Error list
    if !state.loader.errors.is_empty() {
        ui.add_space(8.0);
        ui.separator();
        ui.label(
            RichText::new(format!("⚠ Errors ({})", state.loader.errors.len()))
                .strong()
                .color(Color32::RED),
        );
        ui.add_space(4.0);
        for (source, error) in &state.loader.errors {
            ui.label(
                RichText::new(format!("• {source}: {error}"))
                    .small()
                    .color(Color32::RED),
            );
        }
        ui.add_space(4.0);
        if ui.button("Clear Errors").clicked() {
            state.loader.errors.clear();
        }
    }

    ui.add_space(8.0);
    ui.separator();
    render_country_counts_section(ui, state);

    ui.add_space(8.0);
    ui.separator();
    render_strongest_section(ui, state);
}

/// The map key: one row per marker kind and depth band
fn render_legend_section(ui: &mut Ui) {
    ui.label(RichText::new("🔑 Legend").strong());
    ui.add_space(4.0);

    legend_row(ui, "City Marker", |painter, center| {
        let size = 5.0;
        painter.add(egui::Shape::convex_polygon(
            vec![
                center + vec2(0.0, -size),
                center + vec2(-size, size),
                center + vec2(size, size),
            ],
            CITY_COLOR,
            Stroke::NONE,
        ));
    });
    legend_row(ui, "Land Quake", |painter, center| {
        painter.circle(center, 6.0, Color32::WHITE, Stroke::new(1.0, Color32::DARK_GRAY));
    });
    legend_row(ui, "Ocean Quake", |painter, center| {
        let outer = egui::Rect::from_center_size(center, vec2(12.0, 12.0));
        painter.rect_filled(outer, 0.0, Color32::DARK_GRAY);
        painter.rect_filled(outer.shrink(1.0), 0.0, Color32::WHITE);
    });

    ui.label(RichText::new("Size ~ Magnitude").small());
    ui.add_space(4.0);

    for band in [DepthBand::Shallow, DepthBand::Intermediate, DepthBand::Deep] {
        legend_row(ui, band.label(), move |painter, center| {
            painter.circle(
                center,
                6.0,
                depth_color(band),
                Stroke::new(1.0, Color32::DARK_GRAY),
            );
        });
    }

    legend_row(ui, "Past Day", |painter, center| {
        painter.circle(center, 6.0, Color32::WHITE, Stroke::new(1.0, Color32::DARK_GRAY));
        let stroke = Stroke::new(2.0, Color32::BLACK);
        painter.line_segment([center + vec2(-6.0, -6.0), center + vec2(6.0, 6.0)], stroke);
        painter.line_segment([center + vec2(-6.0, 6.0), center + vec2(6.0, -6.0)], stroke);
    });
}

/// One legend row: a small painted swatch followed by its label
fn legend_row(ui: &mut Ui, label: &str, draw: impl FnOnce(&egui::Painter, Pos2)) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(18.0, 18.0), egui::Sense::hover());
        draw(ui.painter(), rect.center());
        ui.label(label);
    });
}

fn render_stats_section(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new("📊 Statistics").strong());
    ui.add_space(4.0);

    egui::Grid::new("stats_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Earthquakes:");
            ui.label(RichText::new(format!("{}", state.stats.quake_count)).strong());
            ui.end_row();

            ui.label("On land:");
            ui.label(RichText::new(format!("{}", state.stats.land_quakes)).strong());
            ui.end_row();

            ui.label("In ocean:");
            ui.label(RichText::new(format!("{}", state.stats.ocean_quakes)).strong());
            ui.end_row();

            ui.label("Past day:");
            ui.label(RichText::new(format!("{}", state.stats.recent)).strong());
            ui.end_row();

            ui.label("Cities:");
            ui.label(RichText::new(format!("{}", state.stats.city_count)).strong());
            ui.end_row();
        });
}

/// Land quakes per country, most active first
fn render_country_counts_section(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new("🗺 Quakes by Country").strong());
    ui.add_space(4.0);

    let catalog = state.catalog.read().unwrap();
    let counts = catalog.quakes_by_country();
    if counts.is_empty() && state.stats.ocean_quakes == 0 {
        ui.label(RichText::new("No data loaded yet").small().weak());
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("country_counts_scroll")
        .max_height(140.0)
        .show(ui, |ui| {
            for (country, count) in &counts {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(country).small());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(format!("{count}")).small().strong());
                    });
                });
            }
        });

    ui.add_space(4.0);
    ui.label(
        RichText::new(format!("Ocean quakes: {}", state.stats.ocean_quakes))
            .small()
            .weak(),
    );
}

/// The strongest quakes of the feed, by descending magnitude
fn render_strongest_section(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new("💥 Strongest Quakes").strong());
    ui.add_space(4.0);

    let catalog = state.catalog.read().unwrap();
    for quake in catalog.strongest(6) {
        ui.label(RichText::new(&quake.title).small());
    }
}

/// Render the Settings tab
fn render_settings_tab(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("🎨 Markers").strong());
    ui.add_space(6.0);

    egui::Grid::new("marker_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Marker Scale:");
            ui.add(
                egui::Slider::new(&mut state.ui_settings.marker_scale, 0.5..=3.0)
                    .suffix("×")
                    .step_by(0.25),
            );
            ui.end_row();

            ui.label("Threat Circle:");
            ui.checkbox(
                &mut state.ui_settings.show_threat_circle,
                "Outline around a clicked quake",
            );
            ui.end_row();
        });

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(6.0);

    for provider in TilesProvider::all() {
        let selected = state.ui_settings.tiles_provider == *provider;
        if ui.selectable_label(selected, provider.name()).clicked() {
            state.ui_settings.tiles_provider = *provider;
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(state.ui_settings.tiles_provider.attribution())
            .small()
            .italics()
            .weak(),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("ℹ About").strong());
    ui.add_space(4.0);
    ui.label(RichText::new("Quake Map Viewer").small());
    ui.label(
        RichText::new("Recent earthquakes, the cities they threaten, and their threat circles")
            .small()
            .weak(),
    );
    ui.add_space(4.0);
    ui.label(RichText::new("Interaction:").small());
    ui.label(
        RichText::new("  Hover a marker for details")
            .small()
            .weak(),
    );
    ui.label(
        RichText::new("  Click a marker to isolate its threat relations")
            .small()
            .weak(),
    );
    ui.label(
        RichText::new("  Click again to restore all markers")
            .small()
            .weak(),
    );
    ui.label(RichText::new("  F1 / Ctrl+H - Toggle help").small().weak());
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Quake Map Viewer");
            ui.add_space(8.0);

            ui.label("Recent earthquakes and city markers on a slippy map.");
            ui.add_space(12.0);

            ui.label(RichText::new("Markers").strong());
            ui.label("• Circles are land quakes, squares are ocean quakes");
            ui.label("• Color shows depth: yellow shallow, blue intermediate, red deep");
            ui.label("• An X marks quakes from the past day");
            ui.add_space(8.0);

            ui.label(RichText::new("Interaction").strong());
            ui.label("• Hover a marker to see its details");
            ui.label("• Click a city to keep only the quakes that threaten it");
            ui.label("• Click a quake to keep only the cities inside its threat circle");
            ui.label("• Click anywhere again to restore all markers");
            ui.add_space(8.0);

            ui.label(RichText::new("Data").strong());
            ui.label("• Drag and drop a GeoJSON feed file to load it");
            ui.label("• 'Reload Feed' re-fetches the configured feed");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}

/// Handle drag and drop of replacement quake feed files
pub fn handle_drag_and_drop(ctx: &egui::Context, state: &mut AppState) {
    let hovered_files = ctx.input(|i| !i.raw.hovered_files.is_empty());
    let dropped_files: Vec<_> = ctx.input(|i| i.raw.dropped_files.clone());

    // Show drop preview if files are hovered
    if hovered_files {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drop_preview"),
        ));
        let screen_rect = ctx.content_rect();
        let bg_size = egui::vec2(360.0, 80.0);
        let bg_rect = egui::Rect::from_center_size(screen_rect.center(), bg_size);
        painter.rect_filled(bg_rect, 16.0, egui::Color32::from_black_alpha(180));
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "🌍 Drop a GeoJSON quake feed here",
            egui::FontId::proportional(28.0),
            egui::Color32::WHITE,
        );
    }

    for dropped_file in dropped_files {
        let Some(path) = dropped_file.path else {
            continue;
        };
        let is_geojson = path
            .extension()
            .map(|ext| ext == "json" || ext == "geojson")
            .unwrap_or(false);
        if is_geojson {
            state.load_feed_file(path);
        } else {
            tracing::warn!(file = %path.display(), "Ignoring dropped non-GeoJSON file");
        }
    }
}
