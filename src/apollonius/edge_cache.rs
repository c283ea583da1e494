use ahash::AHashMap;
use glam::DVec2;

use super::{bisector::Curve, polygon::Segment, vertex::Owner, DiagramOptions};

/// Identifies an edge independently of the cell it is traversed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct EdgeKey {
    start: usize,
    end: usize,
    owners: (Owner, Owner),
}

impl EdgeKey {
    /// The key of `segment` of the cell of `site`, and whether that segment
    /// runs against the orientation of the key.
    fn of(site: usize, segment: &Segment) -> (Self, bool) {
        let owner = Owner::Site(site);
        if owner < segment.other {
            let key = EdgeKey {
                start: segment.start,
                end: segment.end,
                owners: (owner, segment.other),
            };
            (key, false)
        } else {
            let key = EdgeKey {
                start: segment.end,
                end: segment.start,
                owners: (segment.other, owner),
            };
            (key, true)
        }
    }
}

/// Materialized point lists of the edges shared by two cells, so that both
/// cells use exactly the same points for their common boundary.
pub(super) struct EdgeCache {
    edges: AHashMap<EdgeKey, Vec<DVec2>>,
    options: DiagramOptions,
}

impl EdgeCache {
    pub fn new(options: DiagramOptions) -> Self {
        Self {
            edges: AHashMap::new(),
            options,
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Materialize the edge under `segment`, unless it is already known.
    pub fn insert(&mut self, site: usize, segment: &Segment, vertices: &[DVec2]) {
        if segment.is_closed() {
            // Closed arcs belong to a single cell.
            return;
        }
        let (key, reversed) = EdgeKey::of(site, segment);
        let options = self.options;
        self.edges.entry(key).or_insert_with(|| {
            let segment = if reversed {
                segment.reversed()
            } else {
                *segment
            };
            materialize(&segment, vertices, options)
        });
    }

    /// The points of `segment`, from its start to its end (both included).
    pub fn points(&self, site: usize, segment: &Segment, vertices: &[DVec2]) -> Vec<DVec2> {
        let (key, reversed) = EdgeKey::of(site, segment);
        match self.edges.get(&key) {
            Some(points) if reversed => points.iter().rev().copied().collect(),
            Some(points) => points.clone(),
            None => materialize(segment, vertices, self.options),
        }
    }
}

/// Subdivide a segment into points. Line segments are only subdivided if
/// `divide_lines` is set; arcs always are, by arc length.
pub(super) fn materialize(segment: &Segment, vertices: &[DVec2], options: DiagramOptions) -> Vec<DVec2> {
    let start = vertices[segment.start];
    let end = vertices[segment.end];
    let span = segment.to - segment.from;
    let pieces = match segment.curve {
        Curve::Line(_) if !options.divide_lines() => 1,
        Curve::Line(_) => pieces(start.distance(end), options.segment_density()),
        curve => pieces(curve.length(span), options.segment_density()),
    };

    let mut points = Vec::with_capacity(pieces + 1);
    points.push(start);
    for k in 1..pieces {
        let fraction = k as f64 / pieces as f64;
        points.push(match segment.curve {
            Curve::Line(_) => start.lerp(end, fraction),
            curve => curve.point_at(segment.from + fraction * span),
        });
    }
    points.push(end);
    points
}

/// The number of pieces for a curve of given length, at least one.
pub(super) fn pieces(length: f64, density: f64) -> usize {
    ((length * density).ceil() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::geometry::{Circle, Line};

    fn quarter_arc() -> (Segment, Vec<DVec2>) {
        let circle = Circle::new(DVec2::ZERO, 100.);
        let vertices = vec![DVec2::new(10., 0.), DVec2::new(0., 10.)];
        let segment = Segment {
            start: 0,
            end: 1,
            curve: Curve::Circle(circle),
            from: 0.,
            to: FRAC_PI_2,
            other: Owner::Site(1),
        };
        (segment, vertices)
    }

    #[test]
    fn test_materialize_arc() {
        let (segment, vertices) = quarter_arc();
        let points = materialize(&segment, &vertices, DiagramOptions::default());
        // 5π * 0.1 rounds up to 2 pieces
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], vertices[0]);
        assert_eq!(points[2], vertices[1]);
        assert_approx_eq!(f64, points[1].x, points[1].y, epsilon = 1e-12);

        let options = DiagramOptions::default().with_segment_density(1.);
        let points = materialize(&segment, &vertices, options);
        assert_eq!(points.len(), 17);
        assert_eq!(points[0], vertices[0]);
        assert_eq!(points[16], vertices[1]);
        for p in points {
            assert_approx_eq!(f64, p.length(), 10., epsilon = 1e-12);
        }
    }

    #[test]
    fn test_materialize_clockwise_wrapping_arc() {
        let circle = Circle::new(DVec2::ZERO, 1.);
        let vertices = vec![DVec2::new(0., 1.), DVec2::new(0., -1.)];
        // from π/2 down to -π/2 through angle 0
        let segment = Segment {
            start: 0,
            end: 1,
            curve: Curve::Circle(circle),
            from: 0.5 * PI,
            to: -0.5 * PI,
            other: Owner::Site(1),
        };
        let options = DiagramOptions::default().with_segment_density(1.);
        let points = materialize(&segment, &vertices, options);
        assert_eq!(points.len(), 5);
        assert!(points[1..4].iter().all(|p| p.x > 0.));
    }

    #[test]
    fn test_divide_lines() {
        let line = Line::new(DVec2::ZERO, DVec2::X);
        let vertices = vec![DVec2::ZERO, DVec2::new(25., 0.)];
        let segment = Segment {
            start: 0,
            end: 1,
            curve: Curve::Line(line),
            from: 0.,
            to: 25.,
            other: Owner::Site(1),
        };
        let points = materialize(&segment, &vertices, DiagramOptions::default());
        assert_eq!(points.len(), 2);
        let options = DiagramOptions::default().with_divide_lines(true);
        let points = materialize(&segment, &vertices, options);
        assert_eq!(points.len(), 4);
        assert_approx_eq!(f64, points[1].x, 25. / 3.);
    }

    #[test]
    fn test_shared_edge() {
        let (segment, vertices) = quarter_arc();
        let options = DiagramOptions::default().with_segment_density(1.);
        let mut cache = EdgeCache::new(options);
        cache.insert(0, &segment, &vertices);
        // The same edge seen from the other cell
        let mirrored = Segment {
            other: Owner::Site(0),
            ..segment.reversed()
        };
        cache.insert(1, &mirrored, &vertices);
        assert_eq!(cache.len(), 1);

        let forward = cache.points(0, &segment, &vertices);
        let mut backward = cache.points(1, &mirrored, &vertices);
        backward.reverse();
        assert_eq!(forward, backward);
    }
}
