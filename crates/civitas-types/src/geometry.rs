//! Planar geometry primitives.
//!
//! Agents live in continuous space ([`Vec2`]); the walkable grid and all
//! pathfinding work on integer cells ([`GridPos`]). One grid cell is one
//! world unit wide, and a cell's center sits at `(x + 0.5, y + 0.5)`.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A 2D vector in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Construct a vector from components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or zero for a (near) zero vector.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f64::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    /// Scale the vector down so its length does not exceed `max`.
    pub fn clamp_length(self, max: f64) -> Self {
        let len = self.length();
        if len > max && len > f64::EPSILON {
            self * (max / len)
        } else {
            self
        }
    }

    /// Heading in degrees, measured counter-clockwise from +x, in `[0, 360)`.
    pub fn heading_degrees(self) -> f64 {
        let deg = self.y.atan2(self.x).to_degrees();
        if deg < 0.0 { deg + 360.0 } else { deg }
    }

    /// The grid cell containing this point.
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell(self) -> GridPos {
        GridPos::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// An integer cell coordinate on the walkable grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Construct a cell coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this cell by `(dx, dy)`, or `None` on overflow.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// The world-space center of this cell.
    pub fn center(self) -> Vec2 {
        Vec2::new(f64::from(self.x) + 0.5, f64::from(self.y) + 0.5)
    }

    /// Euclidean distance between cell coordinates.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }
}

impl core::fmt::Display for GridPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
