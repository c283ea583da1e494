#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::{
    bisector::{Bisector, BisectorTable, Blocked},
    block_manager::{ArcBlocks, BlockManager, LineBlocks, MergeLimitExceeded},
    boundary::Bounds,
    site::Site,
    NEIGHBOUR_SLACK,
};
use crate::{error::DiagramError, geometry::Circle};

/// The symmetric neighbour relation between sites: two sites are neighbours
/// if some part of their bisector inside the bounds is not closer to any
/// other site.
pub(super) struct Neighbours {
    count: usize,
    matrix: Vec<bool>,
    lists: Vec<Vec<usize>>,
}

impl Neighbours {
    pub fn build(
        sites: &[Site],
        bounds: &Bounds,
        bisectors: &BisectorTable,
    ) -> Result<Self, DiagramError> {
        let count = sites.len();
        let pairs = (0..count)
            .flat_map(|j| (0..j).map(move |i| (i, j)))
            .collect::<Vec<_>>();

        #[cfg(feature = "rayon")]
        let flags = pairs
            .par_iter()
            .map(|&(i, j)| is_neighbour(sites, bounds, bisectors.get(i, j), i, j))
            .collect::<Result<Vec<_>, _>>()?;
        #[cfg(not(feature = "rayon"))]
        let flags = pairs
            .iter()
            .map(|&(i, j)| is_neighbour(sites, bounds, bisectors.get(i, j), i, j))
            .collect::<Result<Vec<_>, _>>()?;

        let mut matrix = vec![false; count * count];
        let mut lists = vec![vec![]; count];
        for (&(i, j), _) in pairs.iter().zip(flags).filter(|(_, flag)| *flag) {
            matrix[i * count + j] = true;
            matrix[j * count + i] = true;
            lists[i].push(j);
            lists[j].push(i);
        }
        lists.iter_mut().for_each(|list| list.sort_unstable());

        Ok(Self {
            count,
            matrix,
            lists,
        })
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.matrix[i * self.count + j]
    }

    /// The neighbours of site `i`, sorted by index.
    pub fn of(&self, i: usize) -> &[usize] {
        &self.lists[i]
    }

    pub fn pair_count(&self) -> usize {
        self.lists.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn into_lists(self) -> Vec<Vec<usize>> {
        self.lists
    }
}

/// Whether any part of the bisector of `site` and `other` inside the bounds
/// survives all other sites. Computed in the frame of `site`.
fn is_neighbour(
    sites: &[Site],
    bounds: &Bounds,
    bisector: &Bisector,
    site: usize,
    other: usize,
) -> Result<bool, DiagramError> {
    let to_error = |e: MergeLimitExceeded| DiagramError::BlockMergeLimit {
        site,
        other,
        limit: e.limit,
    };
    let blockers = sites
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != site && i != other)
        .map(|(_, blocker)| bisector.blocked_by(&sites[site], &sites[other], blocker));

    match bisector {
        Bisector::Line(line) => {
            let Some((t0, t1)) = bounds.clip_line(line) else {
                return Ok(false);
            };
            let mut blocks = LineBlocks::new(NEIGHBOUR_SLACK * bounds.scale());
            let outside = [(f64::NEG_INFINITY, t0), (t1, f64::INFINITY)];
            for block in outside {
                if blocks.add_block(block).map_err(to_error)? {
                    return Ok(false);
                }
            }
            for blocked in blockers {
                let full = match blocked {
                    Blocked::Nothing => false,
                    Blocked::Everything => true,
                    Blocked::Range(start, end) => blocks.add_block((start, end)).map_err(to_error)?,
                    Blocked::Outside(start, end) => {
                        blocks.add_block((f64::NEG_INFINITY, start)).map_err(to_error)?
                            || blocks.add_block((end, f64::INFINITY)).map_err(to_error)?
                    }
                };
                if full {
                    return Ok(false);
                }
            }
        }
        Bisector::Circle { circle, .. } => {
            let mut blocks = ArcBlocks::new(arc_slack(bounds, circle));
            for block in bounds.outside_arcs(circle) {
                if blocks.add_block(block).map_err(to_error)? {
                    return Ok(false);
                }
            }
            for blocked in blockers {
                let full = match blocked {
                    Blocked::Nothing => false,
                    Blocked::Everything => true,
                    Blocked::Range(start, end) => blocks.add_block((start, end)).map_err(to_error)?,
                    Blocked::Outside(..) => unreachable!("Circles only block single arcs!"),
                };
                if full {
                    return Ok(false);
                }
            }
        }
    }

    Ok(true)
}

/// Angular slack matching the length slack of lines. Capped, so that small
/// circles do not lose whole arcs.
fn arc_slack(bounds: &Bounds, circle: &Circle) -> f64 {
    match circle.radius() {
        Some(radius) if radius > 0. => {
            (NEIGHBOUR_SLACK * bounds.scale() / radius).min(NEIGHBOUR_SLACK)
        }
        _ => NEIGHBOUR_SLACK,
    }
}
