use crate::error::DiagramError;

/// Controls how the curved (and optionally straight) edges of the diagram
/// are turned into polygon points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiagramOptions {
    segment_density: f64,
    divide_lines: bool,
}

impl Default for DiagramOptions {
    /// A density of `0.1` (one point every ten units of arc length) and
    /// undivided straight edges, which suits pixel-scale coordinates.
    fn default() -> Self {
        Self {
            segment_density: 0.1,
            divide_lines: false,
        }
    }
}

impl DiagramOptions {
    /// * `segment_density` - Number of polygon pieces per unit of edge length.
    /// * `divide_lines` - Whether to also subdivide straight edges.
    pub fn new(segment_density: f64, divide_lines: bool) -> Self {
        Self {
            segment_density,
            divide_lines,
        }
    }

    pub fn with_segment_density(mut self, segment_density: f64) -> Self {
        self.segment_density = segment_density;
        self
    }

    pub fn with_divide_lines(mut self, divide_lines: bool) -> Self {
        self.divide_lines = divide_lines;
        self
    }

    pub fn segment_density(&self) -> f64 {
        self.segment_density
    }

    pub fn divide_lines(&self) -> bool {
        self.divide_lines
    }

    pub(super) fn validate(&self) -> Result<(), DiagramError> {
        if self.segment_density.is_finite() && self.segment_density > 0. {
            Ok(())
        } else {
            Err(DiagramError::InvalidSegmentDensity(self.segment_density))
        }
    }
}
