//! Integer grid primitives.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::fraction::Fraction;

/// A grid coordinate. `x` is the column, `y` the row; `+y` points down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos2D {
    pub x: i32,
    pub y: i32,
}

impl Pos2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pos2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Pos2D {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A movement direction. Gameplay only ever uses the five canonical values
/// (`ZERO`, `UP`, `DOWN`, `LEFT`, `RIGHT`), but the comparisons below are
/// exact for any integer vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: i32,
    pub y: i32,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D::new(0, 0);
    pub const UP: Vector2D = Vector2D::new(0, -1);
    pub const DOWN: Vector2D = Vector2D::new(0, 1);
    pub const LEFT: Vector2D = Vector2D::new(-1, 0);
    pub const RIGHT: Vector2D = Vector2D::new(1, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Component ratios `self.x / other.x` and `self.y / other.y`, when both
    /// components of `other` are non-zero.
    fn ratios(&self, other: &Vector2D) -> Option<(Fraction, Fraction)> {
        let rx = Fraction::new(self.x as i64, other.x as i64).ok()?;
        let ry = Fraction::new(self.y as i64, other.y as i64).ok()?;
        Some((rx, ry))
    }

    pub fn is_same_direction_with(
        &self,
        other: &Vector2D,
        zero_vector_consider_as_true: bool,
    ) -> bool {
        if self.is_zero() && other.is_zero() {
            return true;
        }
        if self.is_zero() || other.is_zero() {
            return zero_vector_consider_as_true;
        }
        if self.x == 0 && other.x == 0 {
            return (self.y as i64 * other.y as i64) > 0;
        }
        if self.y == 0 && other.y == 0 {
            return (self.x as i64 * other.x as i64) > 0;
        }
        match self.ratios(other) {
            Some((rx, ry)) => rx.is_positive() && rx == ry,
            None => false,
        }
    }

    /// Whether the two vectors point in exactly opposite directions.
    pub fn is_opposite_direction_with(
        &self,
        other: &Vector2D,
        zero_vector_consider_as_true: bool,
    ) -> bool {
        if self.is_zero() && other.is_zero() {
            return false;
        }
        if self.is_zero() || other.is_zero() {
            return zero_vector_consider_as_true;
        }
        if self.x == 0 && other.x == 0 {
            return (self.y as i64 * other.y as i64) < 0;
        }
        if self.y == 0 && other.y == 0 {
            return (self.x as i64 * other.x as i64) < 0;
        }
        match self.ratios(other) {
            Some((rx, ry)) => rx.is_negative() && rx == ry,
            None => false,
        }
    }

    pub fn is_parallel_with(&self, other: &Vector2D, zero_vector_consider_as_true: bool) -> bool {
        if self.is_zero() && other.is_zero() {
            return true;
        }
        if self.is_zero() || other.is_zero() {
            return zero_vector_consider_as_true;
        }
        if (self.x == 0 && other.x == 0) || (self.y == 0 && other.y == 0) {
            return true;
        }
        match self.ratios(other) {
            Some((rx, ry)) => rx == ry,
            None => false,
        }
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.x, self.y)
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;

    fn neg(self) -> Vector2D {
        Vector2D::new(-self.x, -self.y)
    }
}

impl Add<Vector2D> for Pos2D {
    type Output = Pos2D;

    fn add(self, rhs: Vector2D) -> Pos2D {
        Pos2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pos2D {
    type Output = Vector2D;

    fn sub(self, rhs: Pos2D) -> Vector2D {
        Vector2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width (columns) and height (rows) of a rectangular region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size2D {
    pub width: usize,
    pub height: usize,
}

impl Size2D {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
