//! Quake Map Viewer - Application Library
//!
//! An interactive map of recent earthquakes: quake and city markers are
//! drawn on a slippy map, hovering reveals details, and clicking a marker
//! drills down to the quakes and cities that threaten each other. The
//! geometric core (country membership, depth banding, threat radii, the
//! selection state machine) lives in [`data`] and is UI-free.

pub mod data;

mod app;

pub use app::QuakeMapApp;

/// Native entry point. Call this from `main` inside a tokio runtime.
pub async fn run_native() {
    // Setup logging
    tracing_subscriber::fmt::init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Quake Map Viewer")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let _ = eframe::run_native(
        "Quake Map Viewer",
        native_options,
        Box::new(|cc| Ok(Box::new(QuakeMapApp::new(cc)))),
    );
}
