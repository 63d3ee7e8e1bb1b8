//! Walkers plugin for drawing quake and city markers on the map view
//!
//! The plugin projects every visible marker to screen space, hit-tests
//! the pointer against them (cities before quakes, matching the selection
//! machine's priority), feeds hover/click into the selection state, and
//! paints the markers: magenta triangles for cities, depth-colored
//! circles for land quakes and squares for ocean quakes, an X overlay on
//! quakes from the past day, the drilled quake's threat circle, and a
//! tooltip for the hovered marker.

use egui::{Color32, Pos2, Stroke, vec2};
use std::sync::{Arc, RwLock};
use walkers::{Plugin, Projector};

use crate::data::{
    DepthBand, Earthquake, MarkerCatalog, MarkerRef, Selection, geometry,
};

/// Half-width of the city triangle in pixels, before user scaling
const CITY_TRI_SIZE: f32 = 5.0;

/// Extra pixels around a marker that still count as a hit
const HIT_SLOP: f32 = 2.0;

/// Gap between a quake marker's edge and its past-day X overlay
const X_OVERLAY_GAP: f32 = 2.0;

pub(crate) fn depth_color(band: DepthBand) -> Color32 {
    match band {
        DepthBand::Shallow => Color32::from_rgb(255, 255, 0),
        DepthBand::Intermediate => Color32::from_rgb(0, 0, 255),
        DepthBand::Deep => Color32::from_rgb(255, 0, 0),
    }
}

pub(crate) const CITY_COLOR: Color32 = Color32::from_rgb(255, 0, 255);

/// Plugin for rendering the marker catalog on the map
pub struct QuakeMarkerPlugin {
    /// Reference to the marker catalog
    catalog: Arc<RwLock<MarkerCatalog>>,
    /// Hover / drill-down state
    selection: Arc<RwLock<Selection>>,
    /// Marker size multiplier
    marker_scale: f32,
    /// Whether to outline the drilled quake's threat circle
    show_threat_circle: bool,
}

impl QuakeMarkerPlugin {
    pub fn new(
        catalog: Arc<RwLock<MarkerCatalog>>,
        selection: Arc<RwLock<Selection>>,
        marker_scale: f32,
        show_threat_circle: bool,
    ) -> Self {
        Self {
            catalog,
            selection,
            marker_scale,
            show_threat_circle,
        }
    }

    fn project(projector: &Projector, location: geo::Point<f64>) -> Pos2 {
        let screen_vec = projector.project(walkers::lat_lon(location.y(), location.x()));
        Pos2::new(screen_vec.x, screen_vec.y)
    }

    fn quake_radius(&self, quake: &Earthquake) -> f32 {
        quake.marker_radius() * self.marker_scale
    }

    /// Topmost visible hits under the pointer, one per marker kind.
    fn hits_at(
        &self,
        catalog: &MarkerCatalog,
        projector: &Projector,
        pointer: Pos2,
    ) -> (Option<usize>, Option<usize>) {
        let city_hit = catalog.cities().iter().position(|city| {
            !city.flags.hidden
                && Self::project(projector, city.location).distance(pointer)
                    <= CITY_TRI_SIZE * self.marker_scale + HIT_SLOP
        });
        let quake_hit = catalog.quakes().iter().position(|quake| {
            !quake.flags.hidden
                && Self::project(projector, quake.location).distance(pointer)
                    <= self.quake_radius(quake) + HIT_SLOP
        });
        (city_hit, quake_hit)
    }

    fn draw_quake(
        &self,
        painter: &egui::Painter,
        quake: &Earthquake,
        pos: Pos2,
    ) {
        let radius = self.quake_radius(quake);
        let color = depth_color(quake.depth_band());

        if quake.on_land {
            painter.circle_filled(pos, radius, color);
        } else {
            let rect = egui::Rect::from_center_size(pos, vec2(2.0 * radius, 2.0 * radius));
            painter.rect_filled(rect, 0.0, color);
        }

        // X overlay on quakes from the past day
        if quake.within_past_day() {
            let reach = radius + X_OVERLAY_GAP;
            let stroke = Stroke::new(2.0, Color32::BLACK);
            painter.line_segment(
                [pos + vec2(-reach, -reach), pos + vec2(reach, reach)],
                stroke,
            );
            painter.line_segment(
                [pos + vec2(-reach, reach), pos + vec2(reach, -reach)],
                stroke,
            );
        }
    }

    fn draw_city(&self, painter: &egui::Painter, pos: Pos2) {
        let size = CITY_TRI_SIZE * self.marker_scale;
        painter.add(egui::Shape::convex_polygon(
            vec![
                pos + vec2(0.0, -size),
                pos + vec2(-size, size),
                pos + vec2(size, size),
            ],
            CITY_COLOR,
            Stroke::NONE,
        ));
    }

    /// Trace the drilled quake's threat circle as a closed polyline of
    /// great-circle destination points.
    fn draw_threat_circle(
        &self,
        painter: &egui::Painter,
        projector: &Projector,
        quake: &Earthquake,
    ) {
        let radius_km = quake.threat_circle_km();
        let points: Vec<Pos2> = (0..72)
            .map(|step| {
                let bearing = step as f64 * 5.0;
                let rim = geometry::destination_point(quake.location, bearing, radius_km);
                Self::project(projector, rim)
            })
            .collect();
        painter.add(egui::Shape::closed_line(
            points,
            Stroke::new(1.5, Color32::from_rgba_unmultiplied(255, 0, 0, 160)),
        ));
    }

    /// Tooltip near the hovered marker: the quake title, or the city
    /// name/country and population.
    fn draw_tooltip(&self, painter: &egui::Painter, anchor: Pos2, lines: &[String]) {
        let font = egui::FontId::proportional(12.0);
        let galleys: Vec<_> = lines
            .iter()
            .map(|line| painter.layout_no_wrap(line.clone(), font.clone(), Color32::BLACK))
            .collect();

        let width = galleys
            .iter()
            .map(|galley| galley.size().x)
            .fold(0.0_f32, f32::max);
        let height: f32 = galleys.iter().map(|galley| galley.size().y).sum();

        let rect = egui::Rect::from_min_size(
            anchor + vec2(0.0, 15.0),
            vec2(width + 6.0, height + 6.0),
        );
        painter.rect_filled(rect, 5.0, Color32::WHITE);

        let mut cursor = rect.min + vec2(3.0, 3.0);
        for galley in galleys {
            let advance = galley.size().y;
            painter.galley(cursor, galley, Color32::BLACK);
            cursor.y += advance;
        }
    }
}

impl Plugin for QuakeMarkerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("QuakeMarkerPlugin::run");

        let painter = ui.painter();
        let mut catalog = self.catalog.write().unwrap();
        let mut selection = self.selection.write().unwrap();

        // Hover and click both resolve against the same pointer position
        let pointer = response.hover_pos();
        let (city_hit, quake_hit) = match pointer {
            Some(pointer) => self.hits_at(&catalog, projector, pointer),
            None => (None, None),
        };
        selection.update_hover(&mut catalog, city_hit, quake_hit);
        if response.clicked() {
            selection.handle_click(&mut catalog, city_hit, quake_hit);
        }

        // Threat circle under everything else
        if self.show_threat_circle
            && let Some(MarkerRef::Quake(index)) = selection.drilled()
            && let Some(quake) = catalog.quakes().get(index)
        {
            self.draw_threat_circle(painter, projector, quake);
        }

        // Cull to the viewport, with margin so clipped shapes still draw
        let visible_rect = response.rect.expand(60.0);

        // Quakes first, cities on top (matching the hit-test priority)
        for quake in catalog.quakes() {
            if quake.flags.hidden {
                continue;
            }
            let pos = Self::project(projector, quake.location);
            if visible_rect.contains(pos) {
                self.draw_quake(painter, quake, pos);
            }
        }
        for city in catalog.cities() {
            if city.flags.hidden {
                continue;
            }
            let pos = Self::project(projector, city.location);
            if visible_rect.contains(pos) {
                self.draw_city(painter, pos);
            }
        }

        // Tooltip for the hovered marker, drawn last
        match selection.hovered() {
            Some(MarkerRef::Quake(index)) => {
                if let Some(quake) = catalog.quakes().get(index) {
                    let pos = Self::project(projector, quake.location);
                    self.draw_tooltip(painter, pos, &[quake.title.clone()]);
                }
            }
            Some(MarkerRef::City(index)) => {
                if let Some(city) = catalog.cities().get(index) {
                    let pos = Self::project(projector, city.location);
                    self.draw_tooltip(painter, pos, &city.tooltip_lines());
                }
            }
            None => {}
        }
    }
}
