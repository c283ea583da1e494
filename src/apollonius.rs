use glam::DVec2;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{error::DiagramError, rtree::find_duplicate};

mod bisector;
mod block_manager;
mod boundary;
mod edge_cache;
mod neighbours;
mod options;
mod polygon;
mod site;
mod vertex;


use bisector::BisectorTable;
use edge_cache::EdgeCache;
use neighbours::Neighbours;
use polygon::{PolygonBuilder, Segment};
use vertex::find_vertices;

pub use boundary::{Bounds, Side};
pub use options::DiagramOptions;
pub use polygon::CellPolygon;
pub use site::{closest_site, Site};
pub use vertex::{Owner, Vertex};

/// Relative tolerance on weighted distances: a site is only considered closer
/// than another one if it is closer by more than this fraction.
pub(crate) const DISTANCE_TOLERANCE: f64 = 1e-9;
/// Blocked ranges are shrunk by this amount (relative to the bounds for
/// lines, in radians for arcs) before merging, so that sites touching in a
/// single point remain neighbours.
pub(crate) const NEIGHBOUR_SLACK: f64 = 1e-6;
/// Tolerance of the inside test of the bounds, relative to their size.
pub(crate) const BOUNDS_TOLERANCE: f64 = 1e-9;
/// Vertices closer than this (relative to the size of the bounds) are the
/// same point of the diagram.
pub(crate) const CLUSTER_TOLERANCE: f64 = 1e-7;

/// An Apollonius diagram (multiplicatively weighted Voronoi diagram) clipped
/// to a rectangle.
///
/// Every point of the bounds belongs to the site `s` minimizing
/// `|p - s.loc()| * s.weight()`. Regions of heavier sites are bounded by
/// circular arcs and may be disconnected or enclosed by the region of
/// another site.
#[derive(Clone, Debug)]
pub struct Diagram {
    bounds: Bounds,
    neighbours: Vec<Vec<usize>>,
    vertices: Vec<Vertex>,
    polygons: Vec<CellPolygon>,
}

impl Diagram {
    /// Construct the Apollonius diagram. This method runs in parallel if the `"rayon"` feature is enabled.
    ///
    /// The construction first determines which pairs of sites share a boundary inside `bounds`,
    /// then finds the vertices where three regions (or two regions and a wall) meet and finally
    /// stitches the boundary pieces between those vertices into closed polygons.
    ///
    /// * `bounds` - The rectangle to which the diagram is clipped.
    /// * `sites` - The weighted generators of the regions. Positions must be finite and distinct,
    ///   weights positive and finite.
    /// * `options` - How to subdivide the curved edges into polygon points.
    ///
    /// The polygons are sorted by increasing weight of their site (and by decreasing area for
    /// equal weights), so that drawing them in order produces the correct picture.
    pub fn build(
        bounds: &Bounds,
        sites: &[Site],
        options: &DiagramOptions,
    ) -> Result<Self, DiagramError> {
        bounds.validate()?;
        options.validate()?;
        for (index, site) in sites.iter().enumerate() {
            site.validate(index)?;
        }
        let locs = sites.iter().map(Site::loc).collect::<Vec<_>>();
        if let Some((first, second)) = find_duplicate(&locs) {
            return Err(DiagramError::DuplicateSites { first, second });
        }

        let bisectors = BisectorTable::build(sites);
        let neighbours = Neighbours::build(sites, bounds, &bisectors)?;
        let vertices = find_vertices(sites, bounds, &bisectors, &neighbours);
        let builder = PolygonBuilder::new(sites, bounds, &bisectors, &neighbours, &vertices, *options);

        #[cfg(feature = "rayon")]
        let segments = (0..sites.len())
            .into_par_iter()
            .map(|site| builder.segments(site))
            .collect::<Vec<_>>();
        #[cfg(not(feature = "rayon"))]
        let segments = (0..sites.len())
            .map(|site| builder.segments(site))
            .collect::<Vec<_>>();

        let cache = Self::fill_edge_cache(&segments, builder.locs(), *options);

        #[cfg(feature = "rayon")]
        let polygons = segments
            .par_iter()
            .enumerate()
            .map(|(site, segments)| builder.polygons(site, segments, &cache))
            .collect::<Vec<_>>();
        #[cfg(not(feature = "rayon"))]
        let polygons = segments
            .iter()
            .enumerate()
            .map(|(site, segments)| builder.polygons(site, segments, &cache))
            .collect::<Vec<_>>();

        let polygons = Self::sort_polygons(sites, polygons.into_iter().flatten().collect());

        log::debug!(
            "Built diagram of {} sites: {} neighbour pairs, {} vertices ({} distinct), {} edges, {} polygons.",
            sites.len(),
            neighbours.pair_count(),
            vertices.len(),
            builder.canonical_count(),
            cache.len(),
            polygons.len()
        );

        Ok(Diagram {
            bounds: *bounds,
            neighbours: neighbours.into_lists(),
            vertices,
            polygons,
        })
    }

    fn fill_edge_cache(segments: &[Vec<Segment>], locs: &[DVec2], options: DiagramOptions) -> EdgeCache {
        let mut cache = EdgeCache::new(options);
        for (site, segments) in segments.iter().enumerate() {
            for segment in segments {
                cache.insert(site, segment, locs);
            }
        }
        cache
    }

    /// Sort by increasing weight, then by decreasing area (stable).
    fn sort_polygons(sites: &[Site], polygons: Vec<CellPolygon>) -> Vec<CellPolygon> {
        let mut keyed = polygons
            .into_iter()
            .map(|polygon| (sites[polygon.site()].weight(), polygon.area(), polygon))
            .collect::<Vec<_>>();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(b.1.total_cmp(&a.1)));
        keyed.into_iter().map(|(_, _, polygon)| polygon).collect()
    }

    /// The rectangle to which the diagram is clipped.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The polygons of all cells, in drawing order.
    pub fn polygons(&self) -> &[CellPolygon] {
        &self.polygons
    }

    pub fn into_polygons(self) -> Vec<CellPolygon> {
        self.polygons
    }

    /// The polygons of a single site.
    pub fn site_polygons(&self, site: usize) -> impl Iterator<Item = &CellPolygon> + '_ {
        self.polygons.iter().filter(move |polygon| polygon.site() == site)
    }

    /// The sites sharing a boundary with site `i` inside the bounds, sorted by index.
    pub fn neighbours(&self, i: usize) -> &[usize] {
        &self.neighbours[i]
    }

    pub fn are_neighbours(&self, i: usize, j: usize) -> bool {
        self.neighbours[i].binary_search(&j).is_ok()
    }

    /// All vertices found during construction. Several vertices may share the
    /// same location at degenerate points.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }
}
