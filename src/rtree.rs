use glam::DVec2;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A point tagged with its index in the slice the tree was built from.
#[derive(Clone, Copy, Debug)]
struct IndexedPoint {
    loc: DVec2,
    idx: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.loc.to_array())
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(
        &self,
        point: &<Self::Envelope as rstar::Envelope>::Point,
    ) -> <<Self::Envelope as rstar::Envelope>::Point as rstar::Point>::Scalar {
        self.loc.distance_squared(DVec2::from_array(*point))
    }
}

fn build_rtree(points: &[DVec2]) -> RTree<IndexedPoint> {
    RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(idx, &loc)| IndexedPoint { loc, idx })
            .collect(),
    )
}

/// Find two points at exactly the same location.
///
/// Returns the pair `(first, second)` with `first < second` and the smallest
/// `second`, or `None` if all points are distinct.
pub(crate) fn find_duplicate(points: &[DVec2]) -> Option<(usize, usize)> {
    let rtree = build_rtree(points);
    points.iter().enumerate().find_map(|(second, loc)| {
        rtree
            .locate_within_distance(loc.to_array(), 0.)
            .map(|p| p.idx)
            .filter(|&first| first < second)
            .min()
            .map(|first| (first, second))
    })
}

/// Group points that lie within `tolerance` of each other (transitively).
///
/// Every point is mapped to the lowest index in its group, so that the
/// returned indices can be used as canonical representatives.
pub(crate) fn cluster(points: &[DVec2], tolerance: f64) -> Vec<usize> {
    let rtree = build_rtree(points);
    let mut parent = (0..points.len()).collect::<Vec<_>>();
    for (i, loc) in points.iter().enumerate() {
        for other in rtree.locate_within_distance(loc.to_array(), tolerance * tolerance) {
            union(&mut parent, i, other.idx);
        }
    }
    (0..points.len()).map(|i| find(&mut parent, i)).collect()
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Merge two groups, keeping the smallest root.
fn union(parent: &mut [usize], a: usize, b: usize) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a < root_b {
        parent[root_b] = root_a;
    } else if root_b < root_a {
        parent[root_a] = root_b;
    }
}
