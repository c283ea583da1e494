use glam::DVec2;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::{
    bisector::{tie_points, BisectorTable, Curve},
    boundary::{Bounds, Side},
    neighbours::Neighbours,
    site::{closest_site, is_blocked, Site},
    BOUNDS_TOLERANCE,
};

/// The owner of a diagram vertex: a site or a wall of the bounding rectangle.
///
/// Owners are totally ordered, all sites coming before all walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Owner {
    Site(usize),
    Wall(Side),
}

impl Owner {
    /// Flat marker index: sites map to `0..site_count`, the walls to the four
    /// markers following them.
    pub fn marker(self, site_count: usize) -> usize {
        match self {
            Owner::Site(idx) => idx,
            Owner::Wall(side) => site_count + usize::from(u8::from(side)),
        }
    }

    /// Inverse of [`Owner::marker`].
    pub fn from_marker(marker: usize, site_count: usize) -> Option<Self> {
        if marker < site_count {
            return Some(Owner::Site(marker));
        }
        u8::try_from(marker - site_count)
            .ok()
            .and_then(|offset| Side::try_from(offset).ok())
            .map(Owner::Wall)
    }

    pub fn site(self) -> Option<usize> {
        match self {
            Owner::Site(idx) => Some(idx),
            Owner::Wall(_) => None,
        }
    }
}

/// A vertex of the diagram, at equal weighted distance of its three owners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    loc: DVec2,
    owners: [Owner; 3],
}

impl Vertex {
    fn new(loc: DVec2, owners: [Owner; 3]) -> Self {
        Self { loc, owners }
    }

    pub fn loc(&self) -> DVec2 {
        self.loc
    }

    pub fn owners(&self) -> [Owner; 3] {
        self.owners
    }

    pub fn is_owned_by(&self, owner: Owner) -> bool {
        self.owners.contains(&owner)
    }

    /// The two owners other than `owner`, if `owner` owns this vertex.
    pub fn others(&self, owner: Owner) -> Option<[Owner; 2]> {
        let [a, b, c] = self.owners;
        if a == owner {
            Some([b, c])
        } else if b == owner {
            Some([a, c])
        } else if c == owner {
            Some([a, b])
        } else {
            None
        }
    }
}

/// Find all vertices of the diagram: equidistant points of triples of
/// mutual neighbours, crossings of bisectors with the walls and the four
/// corners of the bounds.
pub(super) fn find_vertices(
    sites: &[Site],
    bounds: &Bounds,
    bisectors: &BisectorTable,
    neighbours: &Neighbours,
) -> Vec<Vertex> {
    if sites.is_empty() {
        return vec![];
    }
    let finder = VertexFinder {
        sites,
        bounds,
        bisectors,
        neighbours,
        tolerance: BOUNDS_TOLERANCE * bounds.scale(),
    };

    #[cfg(feature = "rayon")]
    let mut vertices = (0..sites.len())
        .into_par_iter()
        .flat_map_iter(|i| finder.site_vertices(i))
        .collect::<Vec<_>>();
    #[cfg(not(feature = "rayon"))]
    let mut vertices = (0..sites.len())
        .flat_map(|i| finder.site_vertices(i))
        .collect::<Vec<_>>();

    vertices.extend(Side::ALL.iter().filter_map(|&side| finder.corner(side)));
    vertices
}

struct VertexFinder<'a> {
    sites: &'a [Site],
    bounds: &'a Bounds,
    bisectors: &'a BisectorTable,
    neighbours: &'a Neighbours,
    tolerance: f64,
}

impl<'a> VertexFinder<'a> {
    /// The vertices whose lowest site owner is `i`.
    fn site_vertices(&self, i: usize) -> Vec<Vertex> {
        let mut vertices = vec![];
        for &j in self.neighbours.of(i).iter().filter(|&&j| j > i) {
            for &k in self.neighbours.of(j).iter().filter(|&&k| k > j) {
                if !self.neighbours.contains(i, k) {
                    continue;
                }
                for loc in tie_points(&self.sites[i], &self.sites[j], &self.sites[k]) {
                    if self.is_valid(loc, &[i, j, k]) {
                        vertices.push(Vertex::new(
                            loc,
                            [Owner::Site(i), Owner::Site(j), Owner::Site(k)],
                        ));
                    }
                }
            }

            let curve = self.bisectors.get(i, j).curve();
            for side in Side::ALL {
                let wall = Curve::Line(self.bounds.wall(side));
                for loc in curve.intersect(&wall) {
                    if self.is_valid(loc, &[i, j]) {
                        vertices.push(Vertex::new(
                            loc,
                            [Owner::Site(i), Owner::Site(j), Owner::Wall(side)],
                        ));
                    }
                }
            }
        }
        vertices
    }

    /// Inside the bounds and not strictly closer to any non-owner site.
    fn is_valid(&self, loc: DVec2, owners: &[usize]) -> bool {
        if !self.bounds.contains(loc, self.tolerance) {
            return false;
        }
        let reference = owners
            .iter()
            .map(|&owner| self.sites[owner].distance(loc))
            .fold(f64::INFINITY, f64::min);
        !is_blocked(self.sites, loc, reference, owners)
    }

    /// The corner starting wall `side`, owned by its nearest site.
    fn corner(&self, side: Side) -> Option<Vertex> {
        let loc = self.bounds.corner(side);
        closest_site(self.sites, loc).map(|site| {
            Vertex::new(
                loc,
                [Owner::Site(site), Owner::Wall(side.previous()), Owner::Wall(side)],
            )
        })
    }
}
