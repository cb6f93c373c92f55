//! Planar value types: scalars, vectors, points and angles.

use crate::float::Float;
use core::ops::{Add, Neg, Sub};

// --------------------------------------------------------------------------
// Scalar<F>: distances
// --------------------------------------------------------------------------

/// A bare scalar measurement (a distance or length).
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scalar<F: Float>(pub F);

impl<F: Float> Add for Scalar<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Scalar(self.0 + rhs.0) }
}

impl<F: Float> Sub for Scalar<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Scalar(self.0 - rhs.0) }
}

impl<F: Float> Neg for Scalar<F> {
    type Output = Self;
    fn neg(self) -> Self { Scalar(-self.0) }
}

// --------------------------------------------------------------------------
// Radians<F>: angles
// --------------------------------------------------------------------------

/// An angle in radians.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Radians<F: Float>(pub F);

impl<F: Float> Radians<F> {
    pub fn from_degrees(degrees: F) -> Self {
        Radians(degrees * F::pi() / F::from_f32(180.0))
    }

    pub fn to_degrees(self) -> F {
        self.0 * F::from_f32(180.0) / F::pi()
    }

    /// Wrap into `[0, τ)`.
    pub fn normalize(self) -> Self {
        let tau = F::tau();
        let r = self.0 % tau;
        let r = if r < F::zero() { r + tau } else { r };
        // A tiny negative remainder rounds up to a full turn.
        if r >= tau { Radians(F::zero()) } else { Radians(r) }
    }

    /// Signed delta from `self` to `other` with the smaller magnitude.
    pub fn shortest_delta(self, other: Self) -> Self {
        let src = self.normalize().0;
        let dst = other.normalize().0;
        let forward = dst - src;
        let backward = if forward > F::zero() { forward - F::tau() } else { forward + F::tau() };
        if forward.abs() <= backward.abs() { Radians(forward) } else { Radians(backward) }
    }
}

impl<F: Float> Add for Radians<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Radians(self.0 + rhs.0) }
}

impl<F: Float> Sub for Radians<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Radians(self.0 - rhs.0) }
}

impl<F: Float> Neg for Radians<F> {
    type Output = Self;
    fn neg(self) -> Self { Radians(-self.0) }
}

// --------------------------------------------------------------------------
// Vec2<F>: displacements
// --------------------------------------------------------------------------

/// 2D vector: a displacement, direction or force.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Vec2<F> {
    /// Create a new 2D vector.
    pub fn new(x: F, y: F) -> Self { Vec2 { x, y } }

    pub fn zero() -> Self { Vec2 { x: F::zero(), y: F::zero() } }

    pub fn unit_x() -> Self { Vec2 { x: F::one(), y: F::zero() } }

    pub fn unit_y() -> Self { Vec2 { x: F::zero(), y: F::one() } }

    /// Unit vector pointing along `angle`, measured counter-clockwise from +X.
    pub fn from_angle(angle: Radians<F>) -> Self {
        Self::unit_x().rotate(angle)
    }

    pub fn dot(self, other: Self) -> F {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (returns scalar): self.x * other.y - self.y * other.x
    pub fn cross(self, other: Self) -> F {
        self.x * other.y - self.y * other.x
    }

    /// Squared length (avoids sqrt).
    pub fn length_sq(self) -> F {
        self.dot(self)
    }

    pub fn length(self) -> F {
        self.length_sq().sqrt()
    }

    pub fn scale(self, s: F) -> Self {
        Vec2 { x: self.x * s, y: self.y * s }
    }

    /// Normalize to unit length. Returns zero vector if length is near zero.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len.is_near_zero(F::from_f32(1e-10)) {
            Self::zero()
        } else {
            self.scale(F::one() / len)
        }
    }

    /// Perpendicular vector (rotated 90 degrees counter-clockwise).
    pub fn r90(self) -> Self {
        Vec2 { x: -self.y, y: self.x }
    }

    pub fn rotate(self, angle: Radians<F>) -> Self {
        let (sin, cos) = (angle.0.sin(), angle.0.cos());
        Vec2 {
            x: cos * self.x - sin * self.y,
            y: sin * self.x + cos * self.y,
        }
    }

    /// Direction of this vector, in `(-π, π]`.
    pub fn angle(self) -> Radians<F> {
        Radians(F::atan2(self.y, self.x))
    }

    /// `self + scale * other`
    pub fn splus(self, scale: F, other: Self) -> Self {
        Vec2 { x: self.x + scale * other.x, y: self.y + scale * other.y }
    }

    /// Projection of `self` onto the line spanned by `axis`.
    ///
    /// A zero `axis` has no direction; the projection is zero.
    pub fn on_axis(self, axis: Self) -> Self {
        let len_sq = axis.length_sq();
        if len_sq.is_near_zero(F::from_f32(1e-20)) {
            return Self::zero();
        }
        axis.scale(self.dot(axis) / len_sq)
    }

    /// Component of `self` perpendicular to `axis`.
    pub fn off_axis(self, axis: Self) -> Self {
        self - self.on_axis(axis)
    }

    pub fn lerp(self, other: Self, t: F) -> Self {
        self + (other - self).scale(t)
    }

    pub fn to_point(self) -> Point2<F> {
        Point2 { x: self.x, y: self.y }
    }
}

impl<F: Float> Add for Vec2<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Vec2 { x: self.x + rhs.x, y: self.y + rhs.y } }
}

impl<F: Float> Sub for Vec2<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Vec2 { x: self.x - rhs.x, y: self.y - rhs.y } }
}

impl<F: Float> Neg for Vec2<F> {
    type Output = Self;
    fn neg(self) -> Self { Vec2 { x: -self.x, y: -self.y } }
}

// --------------------------------------------------------------------------
// Point2<F>: locations
// --------------------------------------------------------------------------

/// 2D point: a location, as opposed to a displacement.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Point2<F> {
    pub fn new(x: F, y: F) -> Self { Point2 { x, y } }

    pub fn origin() -> Self { Point2 { x: F::zero(), y: F::zero() } }

    /// Vector from `self` to `other`.
    pub fn to(self, other: Self) -> Vec2<F> {
        Vec2 { x: other.x - self.x, y: other.y - self.y }
    }

    /// `self + scale * v`
    pub fn splus(self, scale: F, v: Vec2<F>) -> Self {
        Point2 { x: self.x + scale * v.x, y: self.y + scale * v.y }
    }

    pub fn distance(self, other: Self) -> F {
        self.to(other).length()
    }

    pub fn lerp(self, other: Self, t: F) -> Self {
        Point2 { x: self.x.lerp(other.x, t), y: self.y.lerp(other.y, t) }
    }

    pub fn to_vec(self) -> Vec2<F> {
        Vec2 { x: self.x, y: self.y }
    }
}

impl<F: Float> Add<Vec2<F>> for Point2<F> {
    type Output = Self;
    fn add(self, rhs: Vec2<F>) -> Self { Point2 { x: self.x + rhs.x, y: self.y + rhs.y } }
}

impl<F: Float> Sub<Vec2<F>> for Point2<F> {
    type Output = Self;
    fn sub(self, rhs: Vec2<F>) -> Self { Point2 { x: self.x - rhs.x, y: self.y - rhs.y } }
}

impl<F: Float> Sub for Point2<F> {
    type Output = Vec2<F>;
    fn sub(self, rhs: Self) -> Vec2<F> { rhs.to(self) }
}
