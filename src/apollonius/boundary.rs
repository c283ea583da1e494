use std::f64::consts::TAU;

use glam::DVec2;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    error::DiagramError,
    geometry::{Circle, Line, EPSILON},
};

/// One of the four walls of the bounding rectangle.
///
/// Walls are oriented counterclockwise (for a y-up frame), so that the
/// inside of the rectangle is always on their left. The discriminant is the
/// offset of the wall marker after the real sites.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum Side {
    Bottom = 0,
    Right = 1,
    Top = 2,
    Left = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Bottom, Side::Right, Side::Top, Side::Left];

    /// The wall ending where this one starts.
    pub fn previous(self) -> Side {
        Side::ALL[(usize::from(u8::from(self)) + 3) % 4]
    }
}

/// An axis aligned bounding rectangle `{x, y, w, h}`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    anchor: DVec2,
    width: DVec2,
}

impl Bounds {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            anchor: DVec2::new(x, y),
            width: DVec2::new(w, h),
        }
    }

    pub(super) fn validate(&self) -> Result<(), DiagramError> {
        if self.anchor.is_finite()
            && self.width.is_finite()
            && self.width.x > 0.
            && self.width.y > 0.
        {
            Ok(())
        } else {
            Err(DiagramError::InvalidBounds {
                x: self.anchor.x,
                y: self.anchor.y,
                w: self.width.x,
                h: self.width.y,
            })
        }
    }

    /// The lower left corner (in a y-up frame).
    pub fn anchor(&self) -> DVec2 {
        self.anchor
    }

    pub fn width(&self) -> DVec2 {
        self.width
    }

    pub fn area(&self) -> f64 {
        self.width.x * self.width.y
    }

    /// Characteristic length used to scale absolute tolerances.
    pub fn scale(&self) -> f64 {
        self.width.max_element()
    }

    /// The corner where wall `side` starts.
    pub fn corner(&self, side: Side) -> DVec2 {
        let min = self.anchor;
        let max = self.anchor + self.width;
        match side {
            Side::Bottom => min,
            Side::Right => DVec2::new(max.x, min.y),
            Side::Top => max,
            Side::Left => DVec2::new(min.x, max.y),
        }
    }

    /// The four corners, counterclockwise, starting at the anchor.
    pub fn corners(&self) -> [DVec2; 4] {
        Side::ALL.map(|side| self.corner(side))
    }

    /// The (infinite) line through a wall, oriented with the inside on its left.
    pub fn wall(&self, side: Side) -> Line {
        let direction = match side {
            Side::Bottom => DVec2::X,
            Side::Right => DVec2::Y,
            Side::Top => DVec2::NEG_X,
            Side::Left => DVec2::NEG_Y,
        };
        Line {
            origin: self.corner(side),
            direction,
        }
    }

    /// Whether `point` lies inside the rectangle, grown by `tolerance`.
    pub fn contains(&self, point: DVec2, tolerance: f64) -> bool {
        let min = self.anchor - tolerance;
        let max = self.anchor + self.width + tolerance;
        point.cmpge(min).all() && point.cmple(max).all()
    }

    /// The parameter range of `line` inside the rectangle (slab clipping).
    pub(super) fn clip_line(&self, line: &Line) -> Option<(f64, f64)> {
        let min = self.anchor;
        let max = self.anchor + self.width;
        let mut t0 = f64::NEG_INFINITY;
        let mut t1 = f64::INFINITY;
        for (o, d, lo, hi) in [
            (line.origin.x, line.direction.x, min.x, max.x),
            (line.origin.y, line.direction.y, min.y, max.y),
        ] {
            if d.abs() < EPSILON {
                if o < lo || o > hi {
                    return None;
                }
            } else {
                let a = (lo - o) / d;
                let b = (hi - o) / d;
                t0 = t0.max(a.min(b));
                t1 = t1.min(a.max(b));
            }
        }
        (t0 <= t1).then_some((t0, t1))
    }

    /// The arcs `(start, end)` of `circle` lying outside the rectangle, with
    /// `start` in `[0, 2π)` and `start < end <= start + 2π`.
    pub(super) fn outside_arcs(&self, circle: &Circle) -> Vec<(f64, f64)> {
        let mut angles = Side::ALL
            .iter()
            .flat_map(|&side| self.wall(side).intersect_circle(circle))
            .map(|p| circle.angle_of(p))
            .collect::<Vec<_>>();
        angles.sort_by(f64::total_cmp);

        if angles.is_empty() {
            return if self.contains(circle.point_at(0.), 0.) {
                vec![]
            } else {
                vec![(0., TAU)]
            };
        }

        let count = angles.len();
        (0..count)
            .filter_map(|i| {
                let start = angles[i];
                let end = if i + 1 < count {
                    angles[i + 1]
                } else {
                    angles[0] + TAU
                };
                if end <= start {
                    return None;
                }
                let mid = circle.point_at(0.5 * (start + end));
                (!self.contains(mid, 0.)).then_some((start, end))
            })
            .collect()
    }
}
