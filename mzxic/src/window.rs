//! Mass windows derived from target m/z values and a ppm tolerance
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An inclusive m/z interval centered on a target mass.
///
/// The full width of the window is `mass * ppm / 1e6`, split evenly on either
/// side of `mass`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassWindow {
    pub mass: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl MassWindow {
    pub fn new(mass: f64, lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            mass,
            lower_bound,
            upper_bound,
        }
    }

    /// Build the window for `mass` whose total width is `ppm` parts-per-million
    /// of `mass`.
    pub fn from_ppm(mass: f64, ppm: f64) -> Self {
        let half_width = half_width_ppm(mass, ppm);
        Self::new(mass, mass - half_width, mass + half_width)
    }

    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    #[inline]
    pub fn contains(&self, mz: f64) -> bool {
        self.lower_bound <= mz && mz <= self.upper_bound
    }
}

impl Display for MassWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}, {}]", self.mass, self.lower_bound, self.upper_bound)
    }
}

#[inline]
fn half_width_ppm(mass: f64, ppm: f64) -> f64 {
    0.5 * ppm * mass / 1_000_000.0
}

/// Build one [`MassWindow`] per target mass, preserving input order.
pub fn build_mass_windows(masses: &[f64], ppm: f64) -> Vec<MassWindow> {
    masses
        .iter()
        .map(|mass| MassWindow::from_ppm(*mass, ppm))
        .collect()
}
