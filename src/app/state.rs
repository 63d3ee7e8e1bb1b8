//! Application state management
//!
//! This module manages the application state: the marker catalog behind
//! its lock, the selection state machine, UI settings, and the
//! asynchronous loading of the three data sources.

use crate::app::settings::Settings;
use crate::data::{self, CatalogInfo, MarkerCatalog, Selection, feed};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// The three datasets the app consumes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Countries,
    Cities,
    Quakes,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Countries => "country boundaries",
            Self::Cities => "cities",
            Self::Quakes => "quake feed",
        }
    }
}

/// Where a dataset comes from
#[derive(Clone, Debug)]
pub enum SourceSpec {
    File(PathBuf),
    Url(String),
}

impl SourceSpec {
    /// Interpret a CLI value: anything starting with http(s):// is a URL.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_owned())
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
        }
    }
}

/// Fetch one source to a string, from disk or over HTTP.
async fn load_source_text(spec: &SourceSpec) -> data::Result<String> {
    match spec {
        SourceSpec::Url(url) => Ok(reqwest::get(url).await?.error_for_status()?.text().await?),
        SourceSpec::File(path) => Ok(tokio::fs::read_to_string(path).await?),
    }
}

/// Asynchronous loader for the three data sources
///
/// Each `start` spawns one tokio task per source; tasks push their result
/// into a shared mailbox that the UI thread drains with `poll` between
/// frames.
pub struct DataLoader {
    pub countries: SourceSpec,
    pub cities: SourceSpec,
    pub quakes: SourceSpec,

    /// Load errors shown in the sidebar, as (source, message)
    pub errors: Vec<(String, String)>,

    inflight: usize,
    results: Arc<RwLock<Vec<(SourceKind, Result<String, String>)>>>,
}

impl DataLoader {
    pub fn new(settings: &Settings) -> Self {
        Self {
            countries: SourceSpec::File(settings.countries.clone()),
            cities: SourceSpec::File(settings.cities.clone()),
            quakes: SourceSpec::parse(&settings.quakes),
            errors: Vec::new(),
            inflight: 0,
            results: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn spec_for(&self, kind: SourceKind) -> &SourceSpec {
        match kind {
            SourceKind::Countries => &self.countries,
            SourceKind::Cities => &self.cities,
            SourceKind::Quakes => &self.quakes,
        }
    }

    /// Spawn a fetch task for each requested source.
    pub fn start(&mut self, kinds: &[SourceKind]) {
        for &kind in kinds {
            let spec = self.spec_for(kind).clone();
            let results = self.results.clone();
            self.inflight += 1;
            tracing::info!(source = kind.label(), from = %spec.describe(), "Loading");
            tokio::spawn(async move {
                let outcome = load_source_text(&spec)
                    .await
                    .map_err(|error| error.to_string());
                if let Ok(mut guard) = results.write() {
                    guard.push((kind, outcome));
                }
            });
        }
    }

    /// Drain completed fetches without blocking the UI thread.
    pub fn poll(&mut self) -> Vec<(SourceKind, Result<String, String>)> {
        let Ok(mut guard) = self.results.try_write() else {
            return Vec::new();
        };
        let drained: Vec<_> = guard.drain(..).collect();
        self.inflight -= drained.len();
        drained
    }

    pub fn is_busy(&self) -> bool {
        self.inflight > 0
    }
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    /// Marker size multiplier
    pub marker_scale: f32,

    /// Draw the threat circle around a drilled-down quake
    pub show_threat_circle: bool,

    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Current active tab in sidebar
    pub active_tab: SidebarTab,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            marker_scale: 1.0,
            show_threat_circle: true,
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
            active_tab: SidebarTab::Quakes,
        }
    }
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SidebarTab {
    Quakes,
    Settings,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }
}

/// Main application state
pub struct AppState {
    /// All markers and boundaries
    pub catalog: Arc<RwLock<MarkerCatalog>>,

    /// Hover / drill-down state, shared with the map plugin
    pub selection: Arc<RwLock<Selection>>,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Data source loading state
    pub loader: DataLoader,

    /// Cached statistics about loaded data
    pub stats: CatalogInfo,

    /// Fit the map view to the markers on the next frame
    pub pending_fit_view: bool,
}

impl AppState {
    /// Create new application state from CLI settings
    pub fn new(settings: &Settings) -> Self {
        let ui_settings = UiSettings {
            marker_scale: settings.marker_scale,
            show_threat_circle: settings.show_threat_circle,
            ..Default::default()
        };

        Self {
            catalog: Arc::new(RwLock::new(MarkerCatalog::new())),
            selection: Arc::new(RwLock::new(Selection::default())),
            ui_settings,
            loader: DataLoader::new(settings),
            stats: CatalogInfo::default(),
            pending_fit_view: false,
        }
    }

    /// Kick off the initial load of all three sources.
    pub fn start_initial_load(&mut self) {
        self.loader.start(&[
            SourceKind::Countries,
            SourceKind::Cities,
            SourceKind::Quakes,
        ]);
    }

    /// Re-fetch the quake feed from its current source.
    pub fn reload_feed(&mut self) {
        self.loader.start(&[SourceKind::Quakes]);
    }

    /// Load a dropped file as a replacement quake feed.
    pub fn load_feed_file(&mut self, path: PathBuf) {
        self.loader.quakes = SourceSpec::File(path);
        self.reload_feed();
    }

    /// Drain finished fetches and fold them into the catalog. Returns
    /// true if anything changed (callers request a repaint).
    pub fn process_loader_results(&mut self) -> bool {
        let completed = self.loader.poll();
        if completed.is_empty() {
            return false;
        }

        for (kind, outcome) in completed {
            let text = match outcome {
                Ok(text) => text,
                Err(message) => {
                    self.record_error(kind, message);
                    continue;
                }
            };
            if let Err(error) = self.apply_source(kind, &text) {
                self.record_error(kind, error.to_string());
            }
        }

        self.update_stats();
        true
    }

    /// Parse one fetched source and apply it to the catalog.
    ///
    /// Parsing happens outside the catalog lock; only the swap holds it.
    fn apply_source(&mut self, kind: SourceKind, text: &str) -> data::Result<()> {
        match kind {
            SourceKind::Countries => {
                let boundaries = feed::parse_boundaries(text)?;
                self.catalog.write().unwrap().set_boundaries(boundaries);
            }
            SourceKind::Cities => {
                let cities = feed::parse_cities(text)?;
                self.catalog.write().unwrap().set_cities(cities);
            }
            SourceKind::Quakes => {
                let quakes = feed::parse_quakes(text, chrono::Utc::now())?;
                let mut catalog = self.catalog.write().unwrap();
                catalog.set_quakes(quakes);
                // A new quake set invalidates any drill-down view
                self.selection.write().unwrap().reset(&mut catalog);
                self.pending_fit_view = true;
            }
        }
        Ok(())
    }

    fn record_error(&mut self, kind: SourceKind, message: String) {
        tracing::error!(source = kind.label(), %message, "Failed to load source");
        self.errors_retain_latest(kind);
        self.loader
            .errors
            .push((kind.label().to_string(), message));
    }

    /// Keep at most one error per source so reloads do not pile up rows.
    fn errors_retain_latest(&mut self, kind: SourceKind) {
        self.loader.errors.retain(|(source, _)| source != kind.label());
    }

    /// Update cached statistics from the catalog.
    pub fn update_stats(&mut self) {
        self.stats = self.catalog.read().unwrap().info();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_spec_parse() {
        assert!(matches!(
            SourceSpec::parse("https://example.org/feed.geojson"),
            SourceSpec::Url(_)
        ));
        assert!(matches!(
            SourceSpec::parse("data/quakes.geojson"),
            SourceSpec::File(_)
        ));
    }

    #[test]
    fn test_apply_quake_source_resets_selection_and_requests_fit() {
        let settings = Settings {
            quakes: "unused".into(),
            cities: "unused".into(),
            countries: "unused".into(),
            marker_scale: 1.0,
            show_threat_circle: true,
            ignore_persisted: false,
        };
        let mut state = AppState::new(&settings);

        state
            .apply_source(SourceKind::Countries, feed::COUNTRY_DATA)
            .unwrap();
        state
            .apply_source(SourceKind::Quakes, feed::QUAKE_FEED)
            .unwrap();
        state.update_stats();

        assert_eq!(state.stats.quake_count, 2);
        assert!(state.pending_fit_view);
        assert!(!state.selection.read().unwrap().is_drilled_down());
    }

    #[test]
    fn test_malformed_source_is_recorded_not_fatal() {
        let settings = Settings {
            quakes: "unused".into(),
            cities: "unused".into(),
            countries: "unused".into(),
            marker_scale: 1.0,
            show_threat_circle: true,
            ignore_persisted: false,
        };
        let mut state = AppState::new(&settings);

        let result = state.apply_source(SourceKind::Cities, "not geojson");
        assert!(result.is_err());
        state.record_error(SourceKind::Cities, result.unwrap_err().to_string());
        state.record_error(SourceKind::Cities, "again".to_string());

        // Only the latest error per source is kept
        assert_eq!(state.loader.errors.len(), 1);
        assert_eq!(state.loader.errors[0].0, "cities");
    }
}
