//! Hover and drill-down selection state machine
//!
//! Each marker carries two independent display booleans (`hidden`,
//! `selected`). Hovering selects at most one marker; clicking toggles a
//! drill-down view that hides everything outside the clicked marker's
//! threat relationships. The machine itself is pure logic: the UI layer
//! performs screen-space hit-testing over *visible* markers and passes
//! the topmost hit index per marker kind.

use crate::data::MarkerCatalog;

/// Reference to one marker in the catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerRef {
    City(usize),
    Quake(usize),
}

/// The two-state (normal / drilled-down) selection machine
#[derive(Clone, Copy, Debug, Default)]
pub struct Selection {
    hovered: Option<MarkerRef>,
    drilled: Option<MarkerRef>,
}

impl Selection {
    pub fn hovered(&self) -> Option<MarkerRef> {
        self.hovered
    }

    pub fn drilled(&self) -> Option<MarkerRef> {
        self.drilled
    }

    pub fn is_drilled_down(&self) -> bool {
        self.drilled.is_some()
    }

    /// Apply a mouse-move. `city_hit` and `quake_hit` are the topmost
    /// visible hits under the cursor, if any; cities win over quakes.
    /// The previous hover selection is always cleared first.
    pub fn update_hover(
        &mut self,
        catalog: &mut MarkerCatalog,
        city_hit: Option<usize>,
        quake_hit: Option<usize>,
    ) {
        if let Some(previous) = self.hovered.take() {
            set_selected(catalog, previous, false);
        }
        let next = city_hit
            .map(MarkerRef::City)
            .or(quake_hit.map(MarkerRef::Quake));
        if let Some(marker) = next {
            set_selected(catalog, marker, true);
            self.hovered = Some(marker);
        }
    }

    /// Apply a mouse-click. While drilled down, any click restores all
    /// markers; otherwise a hit city (checked first) or quake starts a
    /// drill-down, and a click on empty map does nothing.
    pub fn handle_click(
        &mut self,
        catalog: &mut MarkerCatalog,
        city_hit: Option<usize>,
        quake_hit: Option<usize>,
    ) {
        if self.drilled.take().is_some() {
            catalog.unhide_all();
            return;
        }

        if let Some(index) = city_hit {
            self.drill_into_city(catalog, index);
        } else if let Some(index) = quake_hit {
            self.drill_into_quake(catalog, index);
        }
    }

    /// Forget all selection state and unhide everything. Used when the
    /// underlying data is reloaded.
    pub fn reset(&mut self, catalog: &mut MarkerCatalog) {
        if let Some(previous) = self.hovered.take() {
            set_selected(catalog, previous, false);
        }
        self.drilled = None;
        catalog.unhide_all();
    }

    /// Hide all other cities, and every quake whose own threat circle
    /// does not reach the clicked city.
    fn drill_into_city(&mut self, catalog: &mut MarkerCatalog, index: usize) {
        let Some(city) = catalog.cities().get(index) else {
            return;
        };
        let city_location = city.location;

        for (i, other) in catalog.cities_mut().iter_mut().enumerate() {
            if i != index {
                other.flags.hidden = true;
            }
        }
        for quake in catalog.quakes_mut() {
            if quake.distance_km_to(city_location) > quake.threat_circle_km() {
                quake.flags.hidden = true;
            }
        }
        self.drilled = Some(MarkerRef::City(index));
    }

    /// Hide all other quakes, and every city outside the clicked quake's
    /// threat circle.
    fn drill_into_quake(&mut self, catalog: &mut MarkerCatalog, index: usize) {
        let Some(quake) = catalog.quakes().get(index) else {
            return;
        };
        let epicenter = quake.location;
        let threat_km = quake.threat_circle_km();

        for (i, other) in catalog.quakes_mut().iter_mut().enumerate() {
            if i != index {
                other.flags.hidden = true;
            }
        }
        for city in catalog.cities_mut() {
            if crate::data::geometry::haversine_km(city.location, epicenter) > threat_km {
                city.flags.hidden = true;
            }
        }
        self.drilled = Some(MarkerRef::Quake(index));
    }
}

fn set_selected(catalog: &mut MarkerCatalog, marker: MarkerRef, selected: bool) {
    match marker {
        MarkerRef::City(index) => {
            if let Some(city) = catalog.cities_mut().get_mut(index) {
                city.flags.selected = selected;
            }
        }
        MarkerRef::Quake(index) => {
            if let Some(quake) = catalog.quakes_mut().get_mut(index) {
                quake.flags.selected = selected;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::city::test_city;
    use crate::data::quake::test_quake;

    /// One city at the origin, one far away; one weak quake next to the
    /// origin, one weak quake ~111 km out, one strong quake ~111 km out.
    fn test_catalog() -> MarkerCatalog {
        let mut catalog = MarkerCatalog::new();
        catalog.set_cities(vec![
            test_city(0.0, 0.0, "Origin City"),
            test_city(10.0, 0.0, "Far City"),
        ]);
        catalog.set_quakes(vec![
            test_quake(0.1, 0.0, 2.5, 10.0), // ~11 km from origin, threat 32 km
            test_quake(1.0, 0.0, 2.5, 10.0), // ~111 km from origin, threat 32 km
            test_quake(1.0, 0.0, 6.0, 10.0), // ~111 km from origin, threat ~1959 km
        ]);
        catalog
    }

    #[test]
    fn test_hover_prefers_cities_and_clears_previous() {
        let mut catalog = test_catalog();
        let mut selection = Selection::default();

        selection.update_hover(&mut catalog, None, Some(1));
        assert_eq!(selection.hovered(), Some(MarkerRef::Quake(1)));
        assert!(catalog.quakes()[1].flags.selected);

        // A city under the cursor wins even when a quake is also hit
        selection.update_hover(&mut catalog, Some(0), Some(1));
        assert_eq!(selection.hovered(), Some(MarkerRef::City(0)));
        assert!(catalog.cities()[0].flags.selected);
        assert!(!catalog.quakes()[1].flags.selected, "previous hover cleared");

        // Moving off all markers clears the selection entirely
        selection.update_hover(&mut catalog, None, None);
        assert_eq!(selection.hovered(), None);
        assert!(!catalog.cities()[0].flags.selected);
    }

    #[test]
    fn test_click_city_hides_out_of_threat_quakes() {
        let mut catalog = test_catalog();
        let mut selection = Selection::default();

        selection.handle_click(&mut catalog, Some(0), None);
        assert_eq!(selection.drilled(), Some(MarkerRef::City(0)));

        assert!(!catalog.cities()[0].flags.hidden, "clicked city stays");
        assert!(catalog.cities()[1].flags.hidden, "other cities hide");

        let quakes = catalog.quakes();
        assert!(!quakes[0].flags.hidden, "weak quake nearby reaches the city");
        assert!(quakes[1].flags.hidden, "weak quake too far away");
        assert!(!quakes[2].flags.hidden, "strong quake reaches from afar");
    }

    #[test]
    fn test_click_quake_hides_cities_outside_threat_circle() {
        let mut catalog = test_catalog();
        let mut selection = Selection::default();

        // Weak quake near the origin: only Origin City is in range
        selection.handle_click(&mut catalog, None, Some(0));
        assert_eq!(selection.drilled(), Some(MarkerRef::Quake(0)));

        assert!(!catalog.quakes()[0].flags.hidden);
        assert!(catalog.quakes()[1].flags.hidden);
        assert!(catalog.quakes()[2].flags.hidden);

        assert!(!catalog.cities()[0].flags.hidden);
        assert!(catalog.cities()[1].flags.hidden);
    }

    #[test]
    fn test_second_click_restores_all_markers() {
        let mut catalog = test_catalog();
        let mut selection = Selection::default();

        selection.handle_click(&mut catalog, None, Some(0));
        assert!(selection.is_drilled_down());

        // Any click while drilled down restores, even on empty map
        selection.handle_click(&mut catalog, None, None);
        assert!(!selection.is_drilled_down());
        assert!(catalog.cities().iter().all(|c| !c.flags.hidden));
        assert!(catalog.quakes().iter().all(|q| !q.flags.hidden));
    }

    #[test]
    fn test_click_on_empty_map_is_a_no_op_when_not_drilled() {
        let mut catalog = test_catalog();
        let mut selection = Selection::default();

        selection.handle_click(&mut catalog, None, None);
        assert!(!selection.is_drilled_down());
        assert!(catalog.cities().iter().all(|c| !c.flags.hidden));
    }

    #[test]
    fn test_reset_clears_selection_and_unhides() {
        let mut catalog = test_catalog();
        let mut selection = Selection::default();

        selection.update_hover(&mut catalog, Some(1), None);
        selection.handle_click(&mut catalog, Some(1), None);
        selection.reset(&mut catalog);

        assert_eq!(selection.hovered(), None);
        assert_eq!(selection.drilled(), None);
        assert!(catalog.cities().iter().all(|c| !c.flags.hidden));
        assert!(catalog.quakes().iter().all(|q| !q.flags.hidden));
        assert!(catalog.cities().iter().all(|c| !c.flags.selected));
    }
}
