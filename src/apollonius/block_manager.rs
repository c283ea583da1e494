use std::f64::consts::TAU;

/// Raised when inserting a block keeps merging for more rounds than allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct MergeLimitExceeded {
    pub limit: usize,
}

/// Keeps a set of disjoint open blocks `(start, end)` on a one dimensional
/// domain and reports when they cover it entirely.
pub(super) trait BlockManager {
    fn blocks_mut(&mut self) -> &mut Vec<(f64, f64)>;

    /// Amount by which blocks are shrunk (on both ends) before insertion.
    fn slack(&self) -> f64;

    /// The union of `a` and `b` if they overlap.
    fn try_merge(a: (f64, f64), b: (f64, f64)) -> Option<(f64, f64)>;

    /// Whether a single block covers the whole domain.
    fn covers_all(block: (f64, f64)) -> bool;

    /// Explicit cap on the merge rounds of one insertion.
    fn merge_limit(&self) -> Option<usize>;

    /// Shrink `block` by the slack, `None` if nothing remains of it.
    fn shrink(&self, block: (f64, f64)) -> Option<(f64, f64)> {
        if Self::covers_all(block) {
            return Some(block);
        }
        let slack = self.slack();
        let shrunk = (block.0 + slack, block.1 - slack);
        (shrunk.0 < shrunk.1).then_some(shrunk)
    }

    /// Insert a block, merging it with all blocks it overlaps.
    ///
    /// Returns whether the domain is now fully blocked. Every merge consumes
    /// a stored block, so without an explicit cap the number of stored blocks
    /// bounds the rounds and the error signals a broken `try_merge`.
    fn add_block(&mut self, block: (f64, f64)) -> Result<bool, MergeLimitExceeded> {
        let Some(mut current) = self.shrink(block) else {
            return Ok(false);
        };

        let explicit = self.merge_limit();
        let blocks = self.blocks_mut();
        let limit = explicit.unwrap_or(blocks.len());
        let mut rounds = 0;
        while let Some((i, merged)) = blocks
            .iter()
            .enumerate()
            .find_map(|(i, &other)| Self::try_merge(current, other).map(|merged| (i, merged)))
        {
            rounds += 1;
            if rounds > limit {
                return Err(MergeLimitExceeded { limit });
            }
            blocks.swap_remove(i);
            current = merged;
        }

        let full = Self::covers_all(current);
        blocks.push(current);
        Ok(full)
    }
}

/// Blocked intervals of a line parameter.
#[derive(Default, Debug)]
pub(super) struct LineBlocks {
    blocks: Vec<(f64, f64)>,
    slack: f64,
    merge_limit: Option<usize>,
}

impl LineBlocks {
    pub fn new(slack: f64) -> Self {
        Self {
            blocks: vec![],
            slack,
            merge_limit: None,
        }
    }

    #[cfg(test)]
    pub fn with_merge_limit(mut self, limit: usize) -> Self {
        self.merge_limit = Some(limit);
        self
    }
}

impl BlockManager for LineBlocks {
    fn blocks_mut(&mut self) -> &mut Vec<(f64, f64)> {
        &mut self.blocks
    }

    fn slack(&self) -> f64 {
        self.slack
    }

    fn merge_limit(&self) -> Option<usize> {
        self.merge_limit
    }

    fn try_merge(a: (f64, f64), b: (f64, f64)) -> Option<(f64, f64)> {
        (a.0 < b.1 && a.1 > b.0).then(|| (a.0.min(b.0), a.1.max(b.1)))
    }

    fn covers_all(block: (f64, f64)) -> bool {
        block.0 == f64::NEG_INFINITY && block.1 == f64::INFINITY
    }
}

/// Blocked arcs of a circle, as angle ranges `(start, end)` with
/// `start` in `[0, 2π)` and `end > start`.
#[derive(Default, Debug)]
pub(super) struct ArcBlocks {
    blocks: Vec<(f64, f64)>,
    slack: f64,
    merge_limit: Option<usize>,
}

impl ArcBlocks {
    pub fn new(slack: f64) -> Self {
        Self {
            blocks: vec![],
            slack,
            merge_limit: None,
        }
    }

    #[cfg(test)]
    pub fn with_merge_limit(mut self, limit: usize) -> Self {
        self.merge_limit = Some(limit);
        self
    }

    /// Move `start` into `[0, 2π)`, keeping the span.
    fn normalize(start: f64, end: f64) -> (f64, f64) {
        let normalized = start.rem_euclid(TAU);
        (normalized, end + normalized - start)
    }

    /// The representative of `angle` in `[reference, reference + 2π)`.
    fn shift_above(angle: f64, reference: f64) -> f64 {
        angle + ((reference - angle) / TAU).ceil() * TAU
    }
}

impl BlockManager for ArcBlocks {
    fn blocks_mut(&mut self) -> &mut Vec<(f64, f64)> {
        &mut self.blocks
    }

    fn slack(&self) -> f64 {
        self.slack
    }

    fn merge_limit(&self) -> Option<usize> {
        self.merge_limit
    }

    fn try_merge(a: (f64, f64), b: (f64, f64)) -> Option<(f64, f64)> {
        // Does b start inside a?
        let b0 = Self::shift_above(b.0, a.0);
        if b0 < a.1 {
            let b1 = b.1 + b0 - b.0;
            return Some(Self::normalize(a.0, a.1.max(b1)));
        }
        // Does a start inside b?
        let a0 = Self::shift_above(a.0, b.0);
        if a0 < b.1 {
            let a1 = a.1 + a0 - a.0;
            return Some(Self::normalize(b.0, b.1.max(a1)));
        }
        None
    }

    fn covers_all(block: (f64, f64)) -> bool {
        block.1 - block.0 >= TAU
    }
}
