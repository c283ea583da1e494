use glam::DVec2;

use crate::error::DiagramError;

/// A weighted generator of an Apollonius diagram.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Site {
    loc: DVec2,
    weight: f64,
}

impl Site {
    pub fn new(loc: DVec2, weight: f64) -> Self {
        Self { loc, weight }
    }

    /// Get the position of this site
    pub fn loc(&self) -> DVec2 {
        self.loc
    }

    /// Get the weight of this site
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The weighted distance from this site to `point`.
    pub fn distance(&self, point: DVec2) -> f64 {
        self.weight * self.loc.distance(point)
    }

    pub(super) fn validate(&self, index: usize) -> Result<(), DiagramError> {
        if !self.loc.is_finite() {
            return Err(DiagramError::InvalidPosition { index });
        }
        if !(self.weight.is_finite() && self.weight > 0.) {
            return Err(DiagramError::InvalidWeight {
                index,
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// Brute-force weighted nearest site lookup.
///
/// Returns the index of the site minimizing `|point - site| * weight`, the
/// lowest index on ties, or `None` if there are no sites.
pub fn closest_site(sites: &[Site], point: DVec2) -> Option<usize> {
    let mut closest = None;
    let mut min_distance = f64::INFINITY;
    for (i, site) in sites.iter().enumerate() {
        let distance = site.distance(point);
        if closest.is_none() || distance < min_distance {
            closest = Some(i);
            min_distance = distance;
        }
    }
    closest
}

/// Whether some site, other than the ones in `exclude`, is strictly closer to
/// `point` than `reference_distance` (up to a relative tolerance).
pub(super) fn is_blocked(
    sites: &[Site],
    point: DVec2,
    reference_distance: f64,
    exclude: &[usize],
) -> bool {
    let threshold = reference_distance * (1. - super::DISTANCE_TOLERANCE);
    sites
        .iter()
        .enumerate()
        .any(|(i, site)| !exclude.contains(&i) && site.distance(point) < threshold)
}
