//! Exact rational numbers.
//!
//! Only what direction comparisons and frame pacing need: construction,
//! sign tests, ordering and floor.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{GameError, Result};

/// A reduced fraction with a strictly positive denominator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: i64,
    denominator: i64,
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Fraction {
    pub fn new(dividend: i64, divisor: i64) -> Result<Self> {
        if divisor == 0 {
            return Err(GameError::ZeroDivision);
        }
        let sign = if divisor < 0 { -1 } else { 1 };
        let g = gcd(dividend, divisor).max(1);
        Ok(Self {
            numerator: sign * dividend / g,
            denominator: sign * divisor / g,
        })
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn is_positive(&self) -> bool {
        self.numerator > 0
    }

    pub fn is_negative(&self) -> bool {
        self.numerator < 0
    }

    pub fn floor(&self) -> i64 {
        self.numerator.div_euclid(self.denominator)
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // denominators are positive, so cross-multiplying keeps the order
        (self.numerator as i128 * other.denominator as i128)
            .cmp(&(other.numerator as i128 * self.denominator as i128))
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn zero_divisor_is_rejected() {
        let err = Fraction::new(3, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZeroDivision);
    }

    #[test]
    fn reduces_and_normalises_sign() {
        let f = Fraction::new(4, -6).unwrap();
        assert_eq!(f.numerator(), -2);
        assert_eq!(f.denominator(), 3);
        assert_eq!(f, Fraction::new(-2, 3).unwrap());
        assert!(f.is_negative());
    }

    #[test]
    fn ordering_is_exact() {
        let a = Fraction::new(1, 3).unwrap();
        let b = Fraction::new(333_333, 1_000_000).unwrap();
        assert!(b < a);
        assert!(Fraction::new(-1, 2).unwrap() < Fraction::new(0, 5).unwrap());
    }

    #[test]
    fn floor_rounds_toward_negative_infinity() {
        let f = Fraction::new(1000, 60).unwrap();
        assert_eq!(f.floor(), 16);
        let g = Fraction::new(-7, 2).unwrap();
        assert_eq!(g.floor(), -4);
    }
}
