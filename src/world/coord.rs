//! Integer fixed-point 2-D vector.
//!
//! One unit is `1 / PIXEL_SIZE` of a pixel. +Y points down, so a body's
//! `position` is the bottom-centre of its box (its feet).

use bincode::{Decode, Encode};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub const ZERO: Coord = Coord::new(0, 0);

    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Split a box size into `(min, max)` offsets around the feet.
    ///
    /// Odd widths put the spare unit on the left; Y spans `[-h, 0]`.
    pub fn hull(self) -> (Coord, Coord) {
        let max = Coord::new(self.x / 2, 0);
        let min = Coord::new(max.x - self.x, -self.y);
        (min, max)
    }

    /// Snap each component toward −∞ onto a multiple of `step`.
    pub fn floor(self, step: i64) -> Coord {
        Coord::new(
            self.x - self.x.rem_euclid(step),
            self.y - self.y.rem_euclid(step),
        )
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    #[inline]
    pub fn length_squared(self) -> i64 {
        self.x * self.x + self.y * self.y
    }

    /// Per-axis sign.
    #[inline]
    pub fn unit(self) -> Coord {
        Coord::new(self.x.signum(), self.y.signum())
    }

    /// Rescale to length `distance`, truncating toward zero.
    ///
    /// Integer square root keeps the result identical on every platform.
    pub fn scale(self, distance: i64) -> Coord {
        let len_sq = (self.x as i128).pow(2) + (self.y as i128).pow(2);
        let len = (len_sq as u128).isqrt() as i128;
        if len == 0 {
            return Coord::ZERO;
        }
        let d = distance as i128;
        Coord::new(
            (self.x as i128 * d / len) as i64,
            (self.y as i128 * d / len) as i64,
        )
    }
}

impl Add for Coord {
    type Output = Coord;
    #[inline]
    fn add(self, o: Coord) -> Coord {
        Coord::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Coord {
    type Output = Coord;
    #[inline]
    fn sub(self, o: Coord) -> Coord {
        Coord::new(self.x - o.x, self.y - o.y)
    }
}

impl Neg for Coord {
    type Output = Coord;
    #[inline]
    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}

impl Mul<i64> for Coord {
    type Output = Coord;
    #[inline]
    fn mul(self, k: i64) -> Coord {
        Coord::new(self.x * k, self.y * k)
    }
}

/// Truncating division toward zero on both axes.
impl Div<i64> for Coord {
    type Output = Coord;
    #[inline]
    fn div(self, k: i64) -> Coord {
        Coord::new(self.x / k, self.y / k)
    }
}

impl AddAssign for Coord {
    #[inline]
    fn add_assign(&mut self, o: Coord) {
        *self = *self + o;
    }
}

impl SubAssign for Coord {
    #[inline]
    fn sub_assign(&mut self, o: Coord) {
        *self = *self - o;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hull_keeps_odd_unit_on_the_left() {
        let (min, max) = Coord::new(5, 8).hull();
        assert_eq!(max, Coord::new(2, 0));
        assert_eq!(min, Coord::new(-3, -8));
        assert_eq!(max.x - min.x, 5);
    }

    #[test]
    fn floor_rounds_negatives_down() {
        assert_eq!(Coord::new(-1, 17).floor(16), Coord::new(-16, 16));
        assert_eq!(Coord::new(-16, 0).floor(16), Coord::new(-16, 0));
    }

    #[test]
    fn scale_truncates_toward_zero() {
        assert_eq!(Coord::new(3, 4).scale(10), Coord::new(6, 8));
        assert_eq!(Coord::new(-3, 4).scale(7), Coord::new(-4, 5));
        assert_eq!(Coord::ZERO.scale(100), Coord::ZERO);
    }

    #[test]
    fn unit_is_signum() {
        assert_eq!(Coord::new(-40, 0).unit(), Coord::new(-1, 0));
    }
}
