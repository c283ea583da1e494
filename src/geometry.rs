//! A few general-purpose 2D geometry functions and structs,
//! which might also be useful for users of this library.

use std::f64::consts::TAU;

use glam::DVec2;

/// Tolerance used for weight equality and parallelism tests.
pub const EPSILON: f64 = 1e-9;

/// A simple oriented line struct.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    /// Point on the line
    pub origin: DVec2,
    /// Unit direction vector
    pub direction: DVec2,
}

impl Line {
    /// Create a line from a point on the line and a direction.
    ///
    /// The direction is normalized.
    pub fn new(origin: DVec2, direction: DVec2) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// The perpendicular bisector of `a` and `b`: the line through their
    /// midpoint, oriented perpendicular to `b - a`.
    pub fn perpendicular_bisector(a: DVec2, b: DVec2) -> Self {
        Self::new(0.5 * (a + b), (b - a).perp())
    }

    /// The point at parameter `t` (signed distance from the origin).
    pub fn point_at(&self, t: f64) -> DVec2 {
        self.origin + t * self.direction
    }

    /// Signed projection of `point` on this line.
    pub fn parameter_of(&self, point: DVec2) -> f64 {
        (point - self.origin).dot(self.direction)
    }

    /// Project a point onto the line.
    pub fn project_onto(&self, point: DVec2) -> DVec2 {
        self.point_at(self.parameter_of(point))
    }

    /// Whether `point` lies strictly on the left of this line.
    pub fn is_left(&self, point: DVec2) -> bool {
        self.direction.perp_dot(point - self.origin) > 0.
    }

    /// Intersection of two lines, `None` if they are (almost) parallel.
    pub fn intersect_line(&self, other: &Line) -> Option<DVec2> {
        let denominator = self.direction.perp_dot(other.direction);
        if denominator.abs() < EPSILON {
            return None;
        }
        let t = (other.origin - self.origin).perp_dot(other.direction) / denominator;
        Some(self.point_at(t))
    }

    /// Intersections of this line with a circle.
    ///
    /// Since the direction has unit length, this is a quadratic in the line
    /// parameter with leading coefficient 1.
    pub fn intersect_circle(&self, circle: &Circle) -> Vec<DVec2> {
        let d = self.origin - circle.center;
        solve_quadratic(1., 2. * self.direction.dot(d), d.length_squared() - circle.radius_squared)
            .iter()
            .map(|t| self.point_at(t))
            .collect()
    }
}

/// A simple circle struct.
///
/// The radius is stored squared. A negative squared radius signals that the
/// circle does not exist in the real plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius_squared: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius_squared: f64) -> Self {
        Self {
            center,
            radius_squared,
        }
    }

    /// The radius, or `None` for an algebraically invalid circle.
    pub fn radius(&self) -> Option<f64> {
        if self.radius_squared >= 0. {
            Some(self.radius_squared.sqrt())
        } else {
            None
        }
    }

    /// The point at angle `theta` (radians, counterclockwise from the x-axis).
    pub fn point_at(&self, theta: f64) -> DVec2 {
        self.center + self.radius_squared.max(0.).sqrt() * DVec2::from_angle(theta)
    }

    /// The angle of `point` around the center, in `[0, 2π)`.
    pub fn angle_of(&self, point: DVec2) -> f64 {
        let d = point - self.center;
        d.y.atan2(d.x).rem_euclid(TAU)
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.distance_squared(self.center) < self.radius_squared
    }

    /// Intersections of two circles.
    ///
    /// Subtracting both circle equations yields a linear relation between
    /// `x` and `y`. We eliminate the coordinate along the largest component
    /// of the center offset, so that we never divide by a vanishing
    /// coefficient, and solve the remaining quadratic.
    pub fn intersect_circle(&self, other: &Circle) -> Vec<DVec2> {
        let d = other.center - self.center;
        if d.length_squared() < EPSILON * EPSILON * self.radius_squared.abs().max(1.) {
            // Concentric circles either coincide or never meet.
            return vec![];
        }
        // Work relative to our own center: |p|² = r1², |p - d|² = r2²
        // => 2 d·p = r1² - r2² + |d|² =: k
        let k = self.radius_squared - other.radius_squared + d.length_squared();
        let r2 = self.radius_squared;
        let points = if d.x.abs() >= d.y.abs() {
            // x = (k - 2 d.y y) / (2 d.x)
            let m = d.y / d.x;
            let q = k / (2. * d.x);
            let roots = solve_quadratic(1. + m * m, -2. * m * q, q * q - r2);
            roots
                .iter()
                .map(|y| DVec2::new(q - m * y, y))
                .collect::<Vec<_>>()
        } else {
            // y = (k - 2 d.x x) / (2 d.y)
            let m = d.x / d.y;
            let q = k / (2. * d.y);
            let roots = solve_quadratic(1. + m * m, -2. * m * q, q * q - r2);
            roots
                .iter()
                .map(|x| DVec2::new(x, q - m * x))
                .collect::<Vec<_>>()
        };
        points.into_iter().map(|p| p + self.center).collect()
    }
}

/// Real roots of a quadratic equation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Roots {
    None,
    One(f64),
    Two(f64, f64),
}

impl Roots {
    /// Iterate over the roots, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = f64> {
        let (first, second) = match *self {
            Roots::None => (None, None),
            Roots::One(x) => (Some(x), None),
            Roots::Two(x0, x1) => (Some(x0), Some(x1)),
        };
        first.into_iter().chain(second)
    }

    pub fn len(&self) -> usize {
        match self {
            Roots::None => 0,
            Roots::One(_) => 1,
            Roots::Two(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Roots::None)
    }
}

/// Solves `a x² + b x + c = 0` in ℝ.
///
/// A discriminant within rounding noise of zero is treated as a double root
/// (tangency). The noise level is relative to the coefficients, so callers
/// should pass coefficients of moderate size (e.g. by working relative to a
/// nearby origin). If `a` vanishes, the linear equation is solved instead.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0. {
        return Roots::None;
    }
    if a.abs() <= EPSILON * EPSILON * scale {
        return if b.abs() <= EPSILON * EPSILON * scale {
            Roots::None
        } else {
            Roots::One(-c / b)
        };
    }

    let delta = b * b - 4. * a * c;
    let tolerance = 64. * f64::EPSILON * (b * b).max((4. * a * c).abs());
    if delta < -tolerance {
        Roots::None
    } else if delta <= tolerance {
        Roots::One(-b / (2. * a))
    } else {
        // Numerically stable variant, see Numerical Recipes §5.6.
        let q = -0.5 * (b + b.signum() * delta.sqrt());
        if q == 0. {
            // b == 0 and c == 0
            Roots::One(0.)
        } else {
            Roots::Two(q / a, c / q)
        }
    }
}

/// Signed area of a closed polygon (positive if counterclockwise).
pub fn signed_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.;
    }
    0.5 * (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum::<f64>()
}

/// Even-odd point in polygon test.
pub fn polygon_contains(points: &[DVec2], point: DVec2) -> bool {
    let n = points.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (points[i], points[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use glam::DVec2;

    use super::{polygon_contains, signed_area, solve_quadratic, Circle, Line, Roots};

    #[test]
    fn test_quadratic() {
        assert_eq!(solve_quadratic(1., 0., 1.), Roots::None);
        assert_eq!(solve_quadratic(1., -2., 1.), Roots::One(1.));
        let mut roots = solve_quadratic(1., -3., 2.).iter().collect::<Vec<_>>();
        roots.sort_by(f64::total_cmp);
        assert_approx_eq!(f64, roots[0], 1.);
        assert_approx_eq!(f64, roots[1], 2.);
        // degenerate to linear
        assert_eq!(solve_quadratic(0., 2., -4.), Roots::One(2.));
        assert!(solve_quadratic(0., 0., 1.).is_empty());

        // Close but distinct roots are not merged into a tangency.
        let roots = solve_quadratic(1., -2., 1. - 1e-13).iter().collect::<Vec<_>>();
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - roots[1]).abs() > 5e-7);
    }

    #[test]
    fn test_perpendicular_bisector() {
        let line = Line::perpendicular_bisector(DVec2::ZERO, DVec2::new(10., 0.));
        assert_eq!(line.origin, DVec2::new(5., 0.));
        assert_approx_eq!(f64, line.direction.x, 0.);
        assert_approx_eq!(f64, line.direction.y.abs(), 1.);
        // a is on the left of the bisector oriented by perp(b - a)
        assert!(line.is_left(DVec2::ZERO));
        assert!(!line.is_left(DVec2::new(10., 0.)));
    }

    #[test]
    fn test_line_line() {
        let a = Line::new(DVec2::new(1., 0.), DVec2::Y);
        let b = Line::new(DVec2::new(0., 2.), DVec2::X);
        let p = a.intersect_line(&b).unwrap();
        assert_approx_eq!(f64, p.x, 1.);
        assert_approx_eq!(f64, p.y, 2.);

        let c = Line::new(DVec2::new(3., 0.), DVec2::NEG_Y);
        assert!(a.intersect_line(&c).is_none());
    }

    #[test]
    fn test_line_circle() {
        let circle = Circle::new(DVec2::new(1., 1.), 4.);
        let line = Line::new(DVec2::new(1., -5.), DVec2::Y);
        let mut points = line.intersect_circle(&circle);
        points.sort_by(|a, b| a.y.total_cmp(&b.y));
        assert_eq!(points.len(), 2);
        assert_approx_eq!(f64, points[0].y, -1.);
        assert_approx_eq!(f64, points[1].y, 3.);

        // tangent
        let line = Line::new(DVec2::new(3., 0.), DVec2::Y);
        let points = line.intersect_circle(&circle);
        assert_eq!(points.len(), 1);
        assert_approx_eq!(f64, points[0].x, 3.);
        assert_approx_eq!(f64, points[0].y, 1.);

        let line = Line::new(DVec2::new(4., 0.), DVec2::Y);
        assert!(line.intersect_circle(&circle).is_empty());
    }

    #[test]
    fn test_circle_circle() {
        // Both elimination axes
        for offset in [DVec2::new(2., 0.), DVec2::new(0., 2.), DVec2::new(1.5, 1.)] {
            let a = Circle::new(DVec2::new(0.5, -0.25), 4.);
            let b = Circle::new(a.center + offset, 4.);
            let points = a.intersect_circle(&b);
            assert_eq!(points.len(), 2);
            for p in points {
                assert_approx_eq!(f64, p.distance_squared(a.center), 4., epsilon = 1e-9);
                assert_approx_eq!(f64, p.distance_squared(b.center), 4., epsilon = 1e-9);
            }
        }

        // Externally tangent
        let a = Circle::new(DVec2::ZERO, 1.);
        let b = Circle::new(DVec2::new(0., 3.), 4.);
        let points = a.intersect_circle(&b);
        assert_eq!(points.len(), 1);
        assert_approx_eq!(f64, points[0].y, 1., epsilon = 1e-9);

        // Disjoint and concentric
        let c = Circle::new(DVec2::new(10., 0.), 1.);
        assert!(a.intersect_circle(&c).is_empty());
        let d = Circle::new(DVec2::ZERO, 2.);
        assert!(a.intersect_circle(&d).is_empty());
    }

    #[test]
    fn test_circle_angles() {
        let circle = Circle::new(DVec2::new(1., 1.), 9.);
        assert_eq!(circle.radius(), Some(3.));
        assert!(Circle::new(DVec2::ZERO, -1.).radius().is_none());
        let p = circle.point_at(1.25 * std::f64::consts::PI);
        assert_approx_eq!(f64, circle.angle_of(p), 1.25 * std::f64::consts::PI, epsilon = 1e-12);
        assert!(circle.contains(DVec2::new(2., 2.)));
        assert!(!circle.contains(DVec2::new(4.5, 1.)));
    }

    #[test]
    fn test_polygon_helpers() {
        let square = [
            DVec2::ZERO,
            DVec2::new(2., 0.),
            DVec2::new(2., 2.),
            DVec2::new(0., 2.),
        ];
        assert_approx_eq!(f64, signed_area(&square), 4.);
        let reversed = square.iter().rev().copied().collect::<Vec<_>>();
        assert_approx_eq!(f64, signed_area(&reversed), -4.);
        assert!(polygon_contains(&square, DVec2::new(1., 1.5)));
        assert!(!polygon_contains(&square, DVec2::new(3., 1.)));
    }
}
