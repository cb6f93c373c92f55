//! Floating-point abstraction trait for generic numeric operations.

use core::cmp::PartialOrd;
use core::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Trait abstracting the floating-point operations the solver needs.
///
/// Implemented for `f32` and `f64`. Transcendentals go through `libm` so a frame
/// computes the same bits on every platform.
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Rem<Output = Self>
    + Neg<Output = Self>
    + Default
    + core::fmt::Debug
    + core::fmt::Display
    + 'static
{
    /// The additive identity (0.0).
    fn zero() -> Self;
    /// The multiplicative identity (1.0).
    fn one() -> Self;
    /// Half (0.5).
    fn half() -> Self;
    /// Two (2.0).
    fn two() -> Self;
    /// Pi (~3.14159).
    fn pi() -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Sine.
    fn sin(self) -> Self;
    /// Cosine.
    fn cos(self) -> Self;
    /// Absolute value.
    fn abs(self) -> Self;
    /// Minimum of two values.
    fn min(self, other: Self) -> Self;
    /// Maximum of two values.
    fn max(self, other: Self) -> Self;
    /// Convert from f32 (for constants and configuration).
    fn from_f32(v: f32) -> Self;
    /// Widen to f64 (for labels and error payloads).
    fn to_f64(self) -> f64;
    /// Arctangent of y/x, with correct quadrant.
    fn atan2(y: Self, x: Self) -> Self;
    /// Round half away from zero.
    fn round(self) -> Self;
    /// True unless NaN or infinite.
    fn is_finite(self) -> bool;

    /// A full turn (2π).
    fn tau() -> Self {
        Self::two() * Self::pi()
    }

    /// Clamp self to [min, max].
    fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    /// Linear interpolation: self + (other - self) * t
    fn lerp(self, other: Self, t: Self) -> Self {
        self + (other - self) * t
    }

    /// Check if approximately zero within epsilon.
    fn is_near_zero(self, epsilon: Self) -> bool {
        self.abs() < epsilon
    }
}

macro_rules! libm_float {
    ($t:ident, $pi:expr, $sqrt:ident, $sin:ident, $cos:ident, $abs:ident, $atan2:ident, $round:ident) => {
        impl Float for $t {
            fn zero() -> Self { 0.0 }
            fn one() -> Self { 1.0 }
            fn half() -> Self { 0.5 }
            fn two() -> Self { 2.0 }
            fn pi() -> Self { $pi }
            fn sqrt(self) -> Self { libm::$sqrt(self) }
            fn sin(self) -> Self { libm::$sin(self) }
            fn cos(self) -> Self { libm::$cos(self) }
            fn abs(self) -> Self { libm::$abs(self) }
            fn min(self, other: Self) -> Self { if self < other { self } else { other } }
            fn max(self, other: Self) -> Self { if self > other { self } else { other } }
            fn from_f32(v: f32) -> Self { v as $t }
            fn to_f64(self) -> f64 { self as f64 }
            fn atan2(y: Self, x: Self) -> Self { libm::$atan2(y, x) }
            fn round(self) -> Self { libm::$round(self) }
            fn is_finite(self) -> bool { $t::is_finite(self) }
        }
    };
}

libm_float!(f32, core::f32::consts::PI, sqrtf, sinf, cosf, fabsf, atan2f, roundf);
libm_float!(f64, core::f64::consts::PI, sqrt, sin, cos, fabs, atan2, round);
