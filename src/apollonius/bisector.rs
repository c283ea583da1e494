use std::f64::consts::{PI, TAU};

use glam::DVec2;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::site::Site;
use crate::geometry::{solve_quadratic, Circle, Line, Roots, EPSILON};

/// The locus of points at equal weighted distance from two sites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bisector {
    /// Perpendicular bisector of two sites with equal weights.
    Line(Line),
    /// Apollonius circle of two sites with different weights. The circle
    /// encloses the site with the larger weight (`inner`).
    Circle { circle: Circle, inner: usize },
}

impl Bisector {
    /// Construct the bisector of sites `a` and `b`.
    pub fn new(sites: &[Site], a: usize, b: usize) -> Self {
        let (site_a, site_b) = (&sites[a], &sites[b]);
        if (site_a.weight() - site_b.weight()).abs() < EPSILON {
            return Bisector::Line(Line::perpendicular_bisector(site_a.loc(), site_b.loc()));
        }

        // wa² |x - a|² = wb² |x - b|², completed to a square.
        let wa2 = site_a.weight() * site_a.weight();
        let wb2 = site_b.weight() * site_b.weight();
        let denominator = wa2 - wb2;
        let center = site_a.loc() + wb2 / denominator * (site_a.loc() - site_b.loc());
        let radius_squared =
            wa2 * wb2 * site_a.loc().distance_squared(site_b.loc()) / (denominator * denominator);
        let inner = if site_a.weight() > site_b.weight() {
            a
        } else {
            b
        };

        Bisector::Circle {
            circle: Circle::new(center, radius_squared),
            inner,
        }
    }

    pub fn curve(&self) -> Curve {
        match *self {
            Bisector::Line(line) => Curve::Line(line),
            Bisector::Circle { circle, .. } => Curve::Circle(circle),
        }
    }

    /// The part of the bisector of `site` and `partner` where `other` is
    /// strictly closer than `site`, expressed in curve parameters.
    ///
    /// On a line `wo²|x - o|² - ws²|x - s|²` is a quadratic in the line
    /// parameter (linear if the weights are equal). On a circle, the hidden
    /// arc is delimited by the points tied between all three sites.
    pub(super) fn blocked_by(&self, site: &Site, partner: &Site, other: &Site) -> Blocked {
        match self {
            Bisector::Line(line) => {
                let ws2 = site.weight() * site.weight();
                let wo2 = other.weight() * other.weight();
                let d_other = line.origin - other.loc();
                let d_site = line.origin - site.loc();

                if (other.weight() - site.weight()).abs() < EPSILON {
                    let b = 2. * line.direction.dot(site.loc() - other.loc());
                    let c = d_other.length_squared() - d_site.length_squared();
                    if b.abs() <= EPSILON * site.loc().distance(other.loc()) {
                        // `other` is aligned with both sites: either it sits
                        // between them and hides everything, or nothing.
                        return if c < 0. {
                            Blocked::Everything
                        } else {
                            Blocked::Nothing
                        };
                    }
                    let t = -c / b;
                    return if b > 0. {
                        Blocked::Range(f64::NEG_INFINITY, t)
                    } else {
                        Blocked::Range(t, f64::INFINITY)
                    };
                }

                let a = wo2 - ws2;
                let b = 2. * line.direction.dot(wo2 * d_other - ws2 * d_site);
                let c = wo2 * d_other.length_squared() - ws2 * d_site.length_squared();
                match (solve_quadratic(a, b, c), a > 0.) {
                    (Roots::Two(t0, t1), true) => Blocked::Range(t0.min(t1), t0.max(t1)),
                    (_, true) => Blocked::Nothing,
                    (Roots::Two(t0, t1), false) => Blocked::Outside(t0.min(t1), t0.max(t1)),
                    (_, false) => Blocked::Everything,
                }
            }
            Bisector::Circle { circle, .. } => {
                let closer = |theta: f64| {
                    let p = circle.point_at(theta);
                    other.distance(p) < site.distance(p)
                };
                let mut angles = tie_points(site, partner, other)
                    .into_iter()
                    .map(|p| circle.angle_of(p))
                    .collect::<Vec<_>>();
                angles.sort_by(f64::total_cmp);

                match angles[..] {
                    [] => {
                        if closer(0.) {
                            Blocked::Everything
                        } else {
                            Blocked::Nothing
                        }
                    }
                    [theta] => {
                        if closer(theta + PI) {
                            Blocked::Range(theta, theta + TAU)
                        } else {
                            Blocked::Nothing
                        }
                    }
                    [t0, t1, ..] => {
                        let mid = 0.5 * (t0 + t1);
                        match (closer(mid), closer(mid + PI)) {
                            (true, true) => Blocked::Everything,
                            (true, false) => Blocked::Range(t0, t1),
                            (false, true) => Blocked::Range(t1, t0 + TAU),
                            (false, false) => Blocked::Nothing,
                        }
                    }
                }
            }
        }
    }
}

/// `a|x|² + b·x + c`, the difference of the squared weighted distances to two
/// sites, with `x` relative to some origin. It vanishes on their bisector.
#[derive(Clone, Copy, Debug)]
struct TieFunction {
    a: f64,
    b: DVec2,
    c: f64,
}

impl TieFunction {
    fn new(origin: DVec2, s: &Site, t: &Site) -> Self {
        let ws2 = s.weight() * s.weight();
        let wt2 = t.weight() * t.weight();
        let (qs, qt) = (s.loc() - origin, t.loc() - origin);
        Self {
            a: ws2 - wt2,
            b: -2. * (ws2 * qs - wt2 * qt),
            c: ws2 * qs.length_squared() - wt2 * qt.length_squared(),
        }
    }
}

/// The points at equal weighted distance from three sites (at most two).
///
/// Both bisector equations are expanded around the first site instead of
/// going through circle centers and radii, which become huge for nearly
/// equal weights. Eliminating `|x|²` gives a line through the tied points,
/// which is then intersected with one of the bisectors.
pub(super) fn tie_points(first: &Site, second: &Site, third: &Site) -> Vec<DVec2> {
    let origin = first.loc();
    let f = TieFunction::new(origin, first, second);
    let g = TieFunction::new(origin, first, third);

    if f.a == 0. && g.a == 0. {
        // Two straight bisectors: f.b·x = -f.c and g.b·x = -g.c
        let det = f.b.perp_dot(g.b);
        if det.abs() <= EPSILON * f.b.length() * g.b.length() {
            return vec![];
        }
        let x = DVec2::new(g.c * f.b.y - f.c * g.b.y, f.c * g.b.x - g.c * f.b.x) / det;
        return vec![origin + x];
    }

    let normal = g.a * f.b - f.a * g.b;
    let offset = g.a * f.c - f.a * g.c;
    if normal.length() <= EPSILON * (g.a.abs() * f.b.length() + f.a.abs() * g.b.length()) {
        // Concentric circles
        return vec![];
    }
    let foot = -offset / normal.length_squared() * normal;
    let direction = normal.perp() / normal.length();
    let conic = if f.a.abs() >= g.a.abs() { f } else { g };
    // `foot` is orthogonal to `direction`
    solve_quadratic(
        conic.a,
        conic.b.dot(direction),
        conic.a * foot.length_squared() + conic.b.dot(foot) + conic.c,
    )
    .iter()
    .map(|t| origin + foot + t * direction)
    .collect()
}

/// Subset of a bisector hidden by a third site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum Blocked {
    Nothing,
    Everything,
    /// Open parameter interval (or arc, for circles).
    Range(f64, f64),
    /// Everything outside the given open interval (lines only).
    Outside(f64, f64),
}

/// A bisector or wall, as a parametrized curve: lines are parametrized by
/// signed distance along their direction, circles by angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    Line(Line),
    Circle(Circle),
}

impl Curve {
    pub fn is_line(&self) -> bool {
        matches!(self, Curve::Line(_))
    }

    pub fn parameter_of(&self, point: DVec2) -> f64 {
        match self {
            Curve::Line(line) => line.parameter_of(point),
            Curve::Circle(circle) => circle.angle_of(point),
        }
    }

    pub fn point_at(&self, parameter: f64) -> DVec2 {
        match self {
            Curve::Line(line) => line.point_at(parameter),
            Curve::Circle(circle) => circle.point_at(parameter),
        }
    }

    /// Length of the piece of curve spanning `span` in parameter space.
    pub fn length(&self, span: f64) -> f64 {
        match self {
            Curve::Line(_) => span.abs(),
            Curve::Circle(circle) => span.abs() * circle.radius().unwrap_or(0.),
        }
    }

    pub fn intersect(&self, other: &Curve) -> Vec<DVec2> {
        match (self, other) {
            (Curve::Line(l0), Curve::Line(l1)) => l0.intersect_line(l1).into_iter().collect(),
            (Curve::Line(line), Curve::Circle(circle))
            | (Curve::Circle(circle), Curve::Line(line)) => line.intersect_circle(circle),
            (Curve::Circle(c0), Curve::Circle(c1)) => c0.intersect_circle(c1),
        }
    }
}

/// The bisectors of all unordered site pairs.
pub(super) struct BisectorTable {
    bisectors: Vec<Bisector>,
}

impl BisectorTable {
    pub fn build(sites: &[Site]) -> Self {
        let count = sites.len();
        #[cfg(feature = "rayon")]
        let bisectors = (0..count)
            .into_par_iter()
            .flat_map_iter(|j| (0..j).map(move |i| Bisector::new(sites, i, j)))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let bisectors = (0..count)
            .flat_map(|j| (0..j).map(move |i| Bisector::new(sites, i, j)))
            .collect();

        Self { bisectors }
    }

    /// Index of the unordered pair `{i, j}`, `i != j`, in pair order.
    pub fn pair_index(i: usize, j: usize) -> usize {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        hi * (hi - 1) / 2 + lo
    }

    pub fn get(&self, i: usize, j: usize) -> &Bisector {
        &self.bisectors[Self::pair_index(i, j)]
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_equal_weights_give_a_line() {
        let sites = [Site::new(DVec2::ZERO, 2.), Site::new(DVec2::new(10., 0.), 2.)];
        let Bisector::Line(line) = Bisector::new(&sites, 0, 1) else {
            panic!("Expected a line!");
        };
        assert_eq!(line.origin, DVec2::new(5., 0.));
        assert_approx_eq!(f64, line.direction.x, 0.);
    }

    #[test]
    fn test_apollonius_circle() {
        let sites = [Site::new(DVec2::ZERO, 1.), Site::new(DVec2::new(30., 0.), 2.)];
        for (a, b) in [(0, 1), (1, 0)] {
            let Bisector::Circle { circle, inner } = Bisector::new(&sites, a, b) else {
                panic!("Expected a circle!");
            };
            assert_eq!(inner, 1);
            assert_approx_eq!(f64, circle.center.x, 40., epsilon = 1e-12);
            assert_approx_eq!(f64, circle.center.y, 0.);
            assert_approx_eq!(f64, circle.radius_squared, 400., epsilon = 1e-9);
            // every point of the circle is at equal weighted distance
            for i in 0..8 {
                let p = circle.point_at(i as f64);
                assert_approx_eq!(f64, sites[0].distance(p), sites[1].distance(p), epsilon = 1e-9);
            }
            assert!(circle.contains(sites[1].loc()));
            assert!(!circle.contains(sites[0].loc()));
        }
    }

    #[test]
    fn test_pair_index() {
        let mut expected = 0;
        for j in 0..6 {
            for i in 0..j {
                assert_eq!(BisectorTable::pair_index(i, j), expected);
                assert_eq!(BisectorTable::pair_index(j, i), expected);
                expected += 1;
            }
        }
    }

    #[test]
    fn test_collinear_blocking() {
        let sites = [
            Site::new(DVec2::ZERO, 1.),
            Site::new(DVec2::new(10., 0.), 1.),
            Site::new(DVec2::new(4., 0.), 1.),
            Site::new(DVec2::new(-4., 0.), 1.),
        ];
        let bisector = Bisector::new(&sites, 0, 1);
        assert_eq!(bisector.blocked_by(&sites[0], &sites[1], &sites[2]), Blocked::Everything);
        assert_eq!(bisector.blocked_by(&sites[0], &sites[1], &sites[3]), Blocked::Nothing);
    }

    #[test]
    fn test_line_blocking() {
        // Bisector x = 5, oriented along +y.
        let sites = [
            Site::new(DVec2::ZERO, 1.),
            Site::new(DVec2::new(10., 0.), 1.),
            Site::new(DVec2::new(5., 20.), 1.),
            Site::new(DVec2::new(5., -20.), 4.),
            Site::new(DVec2::new(5., -20.), 0.25),
        ];
        let bisector = Bisector::new(&sites, 0, 1);

        // equal weight: everything above y = (400 - 25) / 40
        let Blocked::Range(t0, t1) = bisector.blocked_by(&sites[0], &sites[1], &sites[2]) else {
            panic!("Expected a range!");
        };
        assert_approx_eq!(f64, t0, 9.375, epsilon = 1e-9);
        assert_eq!(t1, f64::INFINITY);

        // heavier: a bounded interval around the site
        let Blocked::Range(t0, t1) = bisector.blocked_by(&sites[0], &sites[1], &sites[3]) else {
            panic!("Expected a range!");
        };
        assert!(t0 < -20. && -20. < t1);
        for t in [t0, t1] {
            let p = DVec2::new(5., t);
            assert_approx_eq!(f64, sites[0].distance(p), sites[3].distance(p), epsilon = 1e-9);
        }

        // lighter: everything but an interval
        let Blocked::Outside(t0, t1) = bisector.blocked_by(&sites[0], &sites[1], &sites[4]) else {
            panic!("Expected the outside of an interval!");
        };
        assert!(t0 < t1);
        assert!(sites[4].distance(DVec2::new(5., 1e3)) < sites[0].distance(DVec2::new(5., 1e3)));
    }

    #[test]
    fn test_circle_blocking() {
        // Circle centered at (40, 0) with radius 20
        let sites = [
            Site::new(DVec2::ZERO, 1.),
            Site::new(DVec2::new(30., 0.), 2.),
            Site::new(DVec2::new(70., 0.), 2.),
            Site::new(DVec2::new(-500., 0.), 1.),
            Site::new(DVec2::new(40., 0.), 8.),
        ];
        let bisector = Bisector::new(&sites, 0, 1);
        let Bisector::Circle { circle, .. } = bisector else {
            panic!("Expected a circle!");
        };

        // A site right of the circle hides an arc around angle 0.
        let Blocked::Range(start, end) = bisector.blocked_by(&sites[0], &sites[1], &sites[2]) else {
            panic!("Expected an arc!");
        };
        assert!(start > std::f64::consts::PI && end > TAU && end < start + TAU);
        let hidden = circle.point_at(0.);
        assert!(sites[2].distance(hidden) < sites[0].distance(hidden));
        for theta in [start, end] {
            let p = circle.point_at(theta);
            assert_approx_eq!(f64, sites[0].distance(p), sites[2].distance(p), epsilon = 1e-9);
        }

        assert_eq!(bisector.blocked_by(&sites[0], &sites[1], &sites[3]), Blocked::Nothing);
        // A heavy site at the center is farther away everywhere on the circle.
        assert_eq!(bisector.blocked_by(&sites[0], &sites[1], &sites[4]), Blocked::Nothing);
    }

    #[test]
    fn test_huge_circle_blocking() {
        // Nearly equal weights: the circle is almost the line x = 5.
        let sites = [
            Site::new(DVec2::ZERO, 1.),
            Site::new(DVec2::new(10., 0.), 1. + 1e-8),
            Site::new(DVec2::new(5., 3.), 1.),
        ];
        let bisector = Bisector::new(&sites, 0, 1);
        let Bisector::Circle { circle, .. } = bisector else {
            panic!("Expected a circle!");
        };
        assert!(circle.radius_squared > 1e16);

        let Blocked::Range(start, end) = bisector.blocked_by(&sites[0], &sites[1], &sites[2]) else {
            panic!("Expected an arc!");
        };
        // One end of the hidden arc is where site 2 takes over, near y = -8 / 3.
        let expected = DVec2::new(5., -8. / 3.);
        assert!([start, end]
            .iter()
            .any(|&theta| circle.point_at(theta).distance(expected) < 1e-5));
        // The piece of the bisector above it is hidden.
        let theta = circle.angle_of(DVec2::new(5., 0.));
        let theta = theta + ((start - theta) / TAU).ceil() * TAU;
        assert!(theta < end);
    }

    #[test]
    fn test_tie_points() {
        // Equal weights: the circumcenter
        let sites = [
            Site::new(DVec2::ZERO, 1.),
            Site::new(DVec2::new(10., 0.), 1.),
            Site::new(DVec2::new(0., 10.), 1.),
        ];
        let points = tie_points(&sites[0], &sites[1], &sites[2]);
        assert_eq!(points.len(), 1);
        assert_approx_eq!(f64, points[0].x, 5., epsilon = 1e-12);
        assert_approx_eq!(f64, points[0].y, 5., epsilon = 1e-12);

        // Two weighted sites on either side of the circle of (0, 1)
        let sites = [
            Site::new(DVec2::ZERO, 1.),
            Site::new(DVec2::new(30., 0.), 2.),
            Site::new(DVec2::new(70., 0.), 2.),
        ];
        let mut points = tie_points(&sites[0], &sites[1], &sites[2]);
        points.sort_by(|a, b| a.y.total_cmp(&b.y));
        assert_eq!(points.len(), 2);
        for (p, y) in points.iter().zip([-300f64.sqrt(), 300f64.sqrt()]) {
            assert_approx_eq!(f64, p.x, 50., epsilon = 1e-9);
            assert_approx_eq!(f64, p.y, y, epsilon = 1e-9);
        }

        // Collinear equal weights never tie
        let sites = [
            Site::new(DVec2::ZERO, 1.),
            Site::new(DVec2::new(1., 1.), 1.),
            Site::new(DVec2::new(2., 2.), 1.),
        ];
        assert!(tie_points(&sites[0], &sites[1], &sites[2]).is_empty());
    }

    #[test]
    fn test_tie_points_nearly_equal_weights() {
        let locs = [DVec2::new(10., 20.), DVec2::new(80., 30.), DVec2::new(40., 90.)];
        let equal = locs.map(|loc| Site::new(loc, 1.));
        let circumcenter = tie_points(&equal[0], &equal[1], &equal[2])[0];

        for spread in [1e-5, 1e-7, 1e-9] {
            let sites = [
                Site::new(locs[0], 1.),
                Site::new(locs[1], 1. + spread),
                Site::new(locs[2], 1. + 2. * spread),
            ];
            // Every permutation finds the same tie close to the circumcenter.
            for (i, j, k) in [(0, 1, 2), (1, 2, 0), (2, 0, 1), (0, 2, 1)] {
                let tie = tie_points(&sites[i], &sites[j], &sites[k])
                    .into_iter()
                    .find(|p| p.distance(circumcenter) < 1.)
                    .expect("The tie near the circumcenter is found!");
                let d = sites[0].distance(tie);
                assert_approx_eq!(f64, sites[1].distance(tie), d, epsilon = 1e-10 * d);
                assert_approx_eq!(f64, sites[2].distance(tie), d, epsilon = 1e-10 * d);
            }
        }
    }
}
