use std::{collections::BTreeMap, f64::consts::TAU};

use ahash::AHashMap;
use glam::DVec2;

use super::{
    bisector::{Bisector, BisectorTable, Curve},
    boundary::Bounds,
    edge_cache::{pieces, EdgeCache},
    neighbours::Neighbours,
    site::{is_blocked, Site},
    vertex::{Owner, Vertex},
    DiagramOptions, BOUNDS_TOLERANCE, CLUSTER_TOLERANCE,
};
use crate::{
    geometry::{polygon_contains, signed_area},
    rtree::cluster,
};

/// A closed polygon bounding (part of) the region of a site.
///
/// The last point is implicitly connected to the first one.
#[derive(Clone, Debug, PartialEq)]
pub struct CellPolygon {
    site: usize,
    points: Vec<DVec2>,
}

impl CellPolygon {
    fn new(site: usize, points: Vec<DVec2>) -> Self {
        Self { site, points }
    }

    /// Index of the site this polygon belongs to.
    pub fn site(&self) -> usize {
        self.site
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn into_points(self) -> Vec<DVec2> {
        self.points
    }

    /// Area enclosed by the polygon.
    pub fn area(&self) -> f64 {
        signed_area(&self.points).abs()
    }

    /// Even-odd inside test.
    pub fn contains(&self, point: DVec2) -> bool {
        polygon_contains(&self.points, point)
    }
}

/// A piece of cell boundary between two (canonical) vertices, running along
/// the curve shared with `other` from parameter `from` to `to`, with the
/// cell on its left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Segment {
    pub start: usize,
    pub end: usize,
    pub curve: Curve,
    pub from: f64,
    pub to: f64,
    pub other: Owner,
}

impl Segment {
    /// Whether this segment is a loop on its own (a closed arc).
    pub fn is_closed(&self) -> bool {
        self.start == self.end
    }

    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            from: self.to,
            to: self.from,
            ..*self
        }
    }
}

/// Assembles the vertices of a diagram into the boundary polygons of the
/// cells.
pub(super) struct PolygonBuilder<'a> {
    sites: &'a [Site],
    bounds: &'a Bounds,
    bisectors: &'a BisectorTable,
    neighbours: &'a Neighbours,
    vertices: &'a [Vertex],
    locs: Vec<DVec2>,
    canonical: Vec<usize>,
    by_site: Vec<Vec<usize>>,
    options: DiagramOptions,
    bounds_tolerance: f64,
    cluster_tolerance: f64,
}

impl<'a> PolygonBuilder<'a> {
    pub fn new(
        sites: &'a [Site],
        bounds: &'a Bounds,
        bisectors: &'a BisectorTable,
        neighbours: &'a Neighbours,
        vertices: &'a [Vertex],
        options: DiagramOptions,
    ) -> Self {
        let locs = vertices.iter().map(Vertex::loc).collect::<Vec<_>>();
        let cluster_tolerance = CLUSTER_TOLERANCE * bounds.scale();
        let canonical = cluster(&locs, cluster_tolerance);

        let mut by_site = vec![vec![]; sites.len()];
        for (idx, vertex) in vertices.iter().enumerate() {
            for site in vertex.owners().iter().filter_map(|owner| owner.site()) {
                by_site[site].push(idx);
            }
        }

        Self {
            sites,
            bounds,
            bisectors,
            neighbours,
            vertices,
            locs,
            canonical,
            by_site,
            options,
            bounds_tolerance: BOUNDS_TOLERANCE * bounds.scale(),
            cluster_tolerance,
        }
    }

    /// Locations of the vertices, indexed like the vertex arena.
    pub fn locs(&self) -> &[DVec2] {
        &self.locs
    }

    /// The number of distinct vertex locations.
    pub fn canonical_count(&self) -> usize {
        self.canonical
            .iter()
            .enumerate()
            .filter(|&(idx, &canonical)| idx == canonical)
            .count()
    }

    /// The oriented boundary segments of the cell of `site`.
    pub fn segments(&self, site: usize) -> Vec<Segment> {
        let owner = Owner::Site(site);
        let mut groups = BTreeMap::<Owner, Vec<usize>>::new();
        for &idx in self.by_site[site].iter() {
            for other in self.vertices[idx].others(owner).into_iter().flatten() {
                groups.entry(other).or_default().push(idx);
            }
        }

        groups
            .into_iter()
            .flat_map(|(other, vertices)| self.segments_along(site, other, &vertices))
            .collect()
    }

    /// The boundary curve between `site` and `other`, and whether the cell of
    /// `site` lies on the left of it when following increasing parameters.
    fn edge_curve(&self, site: usize, other: Owner) -> (Curve, bool) {
        match other {
            Owner::Wall(side) => (Curve::Line(self.bounds.wall(side)), true),
            Owner::Site(other) => match *self.bisectors.get(site, other) {
                Bisector::Line(line) => (Curve::Line(line), line.is_left(self.sites[site].loc())),
                Bisector::Circle { circle, inner } => (Curve::Circle(circle), inner == site),
            },
        }
    }

    fn segments_along(&self, site: usize, other: Owner, vertices: &[usize]) -> Vec<Segment> {
        let (curve, forward) = self.edge_curve(site, other);
        let mut params = vertices
            .iter()
            .map(|&idx| (curve.parameter_of(self.locs[idx]), idx))
            .collect::<Vec<_>>();
        params.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let count = params.len();
        let pairs = match curve {
            Curve::Line(_) => count.saturating_sub(1),
            Curve::Circle(_) => count,
        };
        (0..pairs)
            .filter_map(|k| {
                let (from, start) = params[k];
                let (to, end) = if k + 1 < count {
                    params[k + 1]
                } else {
                    (params[0].0 + TAU, params[0].1)
                };
                let (start, end) = (self.canonical[start], self.canonical[end]);
                if start == end
                    && (curve.is_line() || curve.length(to - from) < self.cluster_tolerance)
                {
                    return None;
                }
                if !self.is_visible(site, other, curve.point_at(0.5 * (from + to))) {
                    return None;
                }
                let segment = Segment {
                    start,
                    end,
                    curve,
                    from,
                    to,
                    other,
                };
                Some(if forward {
                    segment
                } else {
                    segment.reversed()
                })
            })
            .collect()
    }

    /// Whether `point` lies inside the bounds and belongs to the boundary of
    /// the cell of `site` with `other`, i.e. no third site is closer.
    fn is_visible(&self, site: usize, other: Owner, point: DVec2) -> bool {
        if !self.bounds.contains(point, self.bounds_tolerance) {
            return false;
        }
        let exclude = [site, other.site().unwrap_or(site)];
        !is_blocked(self.sites, point, self.sites[site].distance(point), &exclude)
    }

    /// The polygons of the cell of `site`, built from its segments.
    pub fn polygons(&self, site: usize, segments: &[Segment], cache: &EdgeCache) -> Vec<CellPolygon> {
        let mut polygons = self.stitch(site, segments, cache);
        polygons.extend(self.enclosed_circles(site));
        polygons.retain(|polygon| polygon.points.len() >= 3);
        polygons
    }

    /// Connect the segments into closed loops by walking from each segment to
    /// an unused segment starting at its end.
    fn stitch(&self, site: usize, segments: &[Segment], cache: &EdgeCache) -> Vec<CellPolygon> {
        let mut outgoing = AHashMap::<usize, Vec<usize>>::new();
        for (idx, segment) in segments.iter().enumerate() {
            outgoing.entry(segment.start).or_default().push(idx);
        }

        let mut used = vec![false; segments.len()];
        let mut polygons = vec![];
        for first in 0..segments.len() {
            if used[first] {
                continue;
            }
            let loop_start = segments[first].start;
            let mut points = vec![];
            let mut current = first;
            loop {
                used[current] = true;
                let segment = &segments[current];
                let edge = cache.points(site, segment, &self.locs);
                points.extend_from_slice(&edge[..edge.len() - 1]);
                if segment.end == loop_start {
                    break;
                }
                let next = outgoing
                    .get(&segment.end)
                    .and_then(|candidates| candidates.iter().copied().find(|&idx| !used[idx]));
                match next {
                    Some(next) => current = next,
                    None => {
                        log::warn!(
                            "Boundary of site {site} does not close at vertex {}, emitting an open loop.",
                            segment.end
                        );
                        points.push(self.locs[segment.end]);
                        break;
                    }
                }
            }
            polygons.push(CellPolygon::new(site, points));
        }
        polygons
    }

    /// Full circles around `site` that do not meet any other boundary.
    fn enclosed_circles(&self, site: usize) -> Vec<CellPolygon> {
        self.neighbours
            .of(site)
            .iter()
            .filter_map(|&other| match *self.bisectors.get(site, other) {
                Bisector::Circle { circle, inner } if inner == site => Some((other, circle)),
                _ => None,
            })
            .filter(|&(other, circle)| {
                let owner = Owner::Site(other);
                !self.by_site[site]
                    .iter()
                    .any(|&idx| self.vertices[idx].is_owned_by(owner))
                    && self.is_visible(site, owner, circle.point_at(0.))
            })
            .map(|(_, circle)| {
                let radius = circle.radius().unwrap_or(0.);
                let count = pieces(TAU * radius, self.options.segment_density()).max(3);
                let points = (0..count)
                    .map(|k| circle.point_at(TAU * k as f64 / count as f64))
                    .collect();
                CellPolygon::new(site, points)
            })
            .collect()
    }
}
