//! Real Irvine-area addresses for realistic test fixtures.

use trip_planner::Address;

/// A named place with coordinates.
#[derive(Debug, Clone)]
pub struct Place {
    pub text: &'static str,
    pub formatted: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub const fn new(text: &'static str, formatted: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            text,
            formatted,
            lat,
            lng,
        }
    }

    pub fn address(&self) -> Address {
        Address::new(self.formatted, self.lat, self.lng)
    }
}

pub const IRVINE_PLACES: &[Place] = &[
    Place::new(
        "UC Irvine",
        "University+of+California,+Irvine,+Irvine,+CA+92697,+USA",
        33.6405,
        -117.8443,
    ),
    Place::new(
        "Irvine Spectrum",
        "Irvine+Spectrum+Center,+670+Spectrum+Center+Dr,+Irvine,+CA+92618,+USA",
        33.6499,
        -117.7434,
    ),
    Place::new(
        "John Wayne Airport",
        "18601+Airport+Way,+Santa+Ana,+CA+92707,+USA",
        33.6762,
        -117.8675,
    ),
    Place::new(
        "Tustin Market Place",
        "2961+El+Camino+Real,+Tustin,+CA+92782,+USA",
        33.7246,
        -117.8066,
    ),
    Place::new(
        "Fashion Island",
        "401+Newport+Center+Dr,+Newport+Beach,+CA+92660,+USA",
        33.6163,
        -117.8760,
    ),
    Place::new(
        "Great Park",
        "8000+Great+Park+Blvd,+Irvine,+CA+92618,+USA",
        33.6745,
        -117.7337,
    ),
];

pub fn place(text: &str) -> &'static Place {
    IRVINE_PLACES
        .iter()
        .find(|place| place.text == text)
        .unwrap_or_else(|| panic!("unknown fixture place {:?}", text))
}
