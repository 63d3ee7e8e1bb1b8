//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen slippy map with the marker plugin
//! - Toggleable sidebar with tabs (Quakes and Settings)
//! - Drag-and-drop support for replacement feed files
//! - Asynchronous loading of the three data sources
//! - Persisted UI settings across runs

mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::plugin::QuakeMarkerPlugin;
use crate::app::settings::Settings;
use crate::app::state::{AppState, SidebarTab, TilesProvider};
use eframe::egui;
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17 // OpenTopoMap has max zoom of 17
    }
}

/// Persisted settings (lightweight, no marker data)
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    marker_scale: f32,
    show_threat_circle: bool,
    sidebar_open: bool,
    active_tab: String,
    tiles_provider: String,
}

/// Main application structure
pub struct QuakeMapApp {
    /// Application state (markers, UI settings, loader)
    state: AppState,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Show help overlay
    show_help: bool,

    /// Whether the initial data load has been kicked off
    started_initial_load: bool,
}

impl QuakeMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let mut state = AppState::new(&cli_args);
        if cli_args.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
        } else if let Some(storage) = cc.storage {
            Self::restore_persisted_settings(storage, &mut state);
        }

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        // Start with a whole-world view
        let mut map_memory = MapMemory::default();
        let _ = map_memory.set_zoom(2.0);

        Self {
            state,
            tiles_osm,
            tiles_otm,
            map_memory,
            show_help: false,
            started_initial_load: false,
        }
    }

    /// Restore persisted UI settings from storage (fast, no marker data)
    fn restore_persisted_settings(storage: &dyn eframe::Storage, state: &mut AppState) {
        if let Some(json) = storage.get_string("persisted_settings")
            && !json.is_empty()
            && let Ok(persisted) = serde_json::from_str::<PersistedSettings>(&json)
        {
            state.ui_settings.marker_scale = persisted.marker_scale;
            state.ui_settings.show_threat_circle = persisted.show_threat_circle;
            state.ui_settings.sidebar_open = persisted.sidebar_open;
            state.ui_settings.active_tab = match persisted.active_tab.as_str() {
                "Settings" => SidebarTab::Settings,
                _ => SidebarTab::Quakes,
            };
            state.ui_settings.tiles_provider = match persisted.tiles_provider.as_str() {
                "OpenTopoMap" => TilesProvider::OpenTopoMap,
                _ => TilesProvider::OpenStreetMap,
            };
            tracing::info!("Restored persisted UI settings");
        } else {
            tracing::info!("No persisted settings found, starting fresh");
        }
    }

    /// Fit the map view to the bounding box of all loaded markers
    fn fit_to_view(&mut self) {
        // Use try_read for non-blocking UI polling.
        let catalog = match self.state.catalog.try_read() {
            Ok(guard) => guard,
            Err(_) => return, // Skip if lock is not available
        };

        if let Some(bbox) = catalog.bounding_box() {
            let center = bbox.center();
            let lat_span = bbox.height().abs();
            let lon_span = bbox.width().abs();
            let max_span = lat_span.max(lon_span);

            let zoom = if max_span > 0.0 {
                let zoom_estimate = (4.0 * 360.0 / max_span).log2();
                (zoom_estimate - 0.5).clamp(1.5, 10.0)
            } else {
                2.0
            };

            self.map_memory
                .center_at(walkers::lat_lon(center.y, center.x));
            let _ = self.map_memory.set_zoom(zoom);

            tracing::trace!(
                "Fit view to ({:.2}, {:.2}) - ({:.2}, {:.2}), zoom {:.1}",
                bbox.min().y,
                bbox.min().x,
                bbox.max().y,
                bbox.max().x,
                zoom
            );
        }
    }
}

impl eframe::App for QuakeMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.show_help = !self.show_help;
            }
            if i.key_pressed(egui::Key::H) && i.modifiers.ctrl {
                self.show_help = !self.show_help;
            }
        });

        // Kick off the initial load exactly once
        if !self.started_initial_load {
            self.started_initial_load = true;
            self.state.start_initial_load();
        }

        // Fold finished fetches into the catalog
        if self.state.process_loader_results() {
            ctx.request_repaint();
        }
        if self.state.loader.is_busy() {
            // Poll the loader mailbox again shortly
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        // Fit the view to freshly loaded data if requested
        if self.state.pending_fit_view {
            self.state.pending_fit_view = false;
            self.fit_to_view();
        }

        // Handle drag and drop of feed files
        ui_panels::handle_drag_and_drop(ctx, &mut self.state);

        // Show help overlay if enabled
        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }

        // Render the sidebar
        ui_panels::render_sidebar(ctx, &mut self.state);

        // Capture values we need before the closure
        let catalog = self.state.catalog.clone();
        let selection = self.state.selection.clone();
        let marker_scale = self.state.ui_settings.marker_scale;
        let show_threat_circle = self.state.ui_settings.show_threat_circle;
        let tiles_provider = self.state.ui_settings.tiles_provider;
        let attribution_text = self.state.ui_settings.tiles_provider.attribution();

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let marker_plugin = QuakeMarkerPlugin::new(
                    catalog,
                    selection,
                    marker_scale,
                    show_threat_circle,
                );

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(0.0, 0.0),
                )
                .with_plugin(marker_plugin);

                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let persisted = PersistedSettings {
            marker_scale: self.state.ui_settings.marker_scale,
            show_threat_circle: self.state.ui_settings.show_threat_circle,
            sidebar_open: self.state.ui_settings.sidebar_open,
            active_tab: format!("{:?}", self.state.ui_settings.active_tab),
            tiles_provider: format!("{:?}", self.state.ui_settings.tiles_provider),
        };

        if let Ok(json) = serde_json::to_string(&persisted) {
            storage.set_string("persisted_settings", json);
            tracing::debug!("Saved settings on exit");
        }
    }
}
