//! Geometric values tagged with the space they were measured in.
//!
//! A [`Spaced`] value converts lazily: nothing is transformed until a caller asks
//! for it in another space. Arithmetic goes through [`Spaced::apply`], which brings
//! every argument into the receiver's space first, so mixing a screen-space drag
//! delta with a model-space position cannot silently combine incompatible numbers.

use crate::float::Float;
use crate::frame::Transform;
use crate::space::{SpaceName, SpaceRegistry};
use crate::vec::{Point2, Radians, Scalar, Vec2};

/// A raw geometric quantity that knows how an affine map acts on it.
pub trait Measure: Copy {
    type Scalar: Float;

    fn transform(self, t: &Transform<Self::Scalar>) -> Self;
}

impl<F: Float> Measure for Scalar<F> {
    type Scalar = F;
    fn transform(self, t: &Transform<F>) -> Self { t.distance(self) }
}

impl<F: Float> Measure for Point2<F> {
    type Scalar = F;
    fn transform(self, t: &Transform<F>) -> Self { t.point(self) }
}

impl<F: Float> Measure for Vec2<F> {
    type Scalar = F;
    fn transform(self, t: &Transform<F>) -> Self { t.vec(self) }
}

impl<F: Float> Measure for Radians<F> {
    type Scalar = F;

    // Re-measure a rotated reference axis so reflections and non-uniform scale
    // change the angle the way they change the geometry it describes.
    fn transform(self, t: &Transform<F>) -> Self {
        t.vec(Vec2::from_angle(self)).angle()
    }
}

/// A raw value paired with the space it was measured in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spaced<T> {
    value: T,
    space: SpaceName,
}

pub type Distance<F> = Spaced<Scalar<F>>;
pub type Position<F> = Spaced<Point2<F>>;
pub type Vector<F> = Spaced<Vec2<F>>;
pub type Angle<F> = Spaced<Radians<F>>;

impl<T: Measure> Spaced<T> {
    pub fn new(value: T, space: SpaceName) -> Self {
        Spaced { value, space }
    }

    pub fn space(&self) -> SpaceName {
        self.space
    }

    /// The value in its own space.
    pub fn raw(&self) -> T {
        self.value
    }

    /// The value measured in `space`.
    pub fn get(&self, spaces: &SpaceRegistry<T::Scalar>, space: SpaceName) -> T {
        if space == self.space {
            return self.value;
        }
        let src = spaces.get(self.space);
        let dst = spaces.get(space);
        self.value.transform(&src.unproject).transform(&dst.project)
    }

    /// This value re-tagged in `space`.
    pub fn to(&self, spaces: &SpaceRegistry<T::Scalar>, space: SpaceName) -> Self {
        if space == self.space {
            return *self;
        }
        Spaced::new(self.get(spaces, space), space)
    }

    /// Transform the raw value without leaving this space.
    pub fn map(&self, f: impl FnOnce(T) -> T) -> Self {
        Spaced::new(f(self.value), self.space)
    }

    /// Run `f` on this value and `other`, both in this value's space, and tag the
    /// result with this value's space.
    pub fn apply<U, R>(
        &self,
        spaces: &SpaceRegistry<T::Scalar>,
        other: &Spaced<U>,
        f: impl FnOnce(T, U) -> R,
    ) -> Spaced<R>
    where
        U: Measure<Scalar = T::Scalar>,
    {
        Spaced {
            value: f(self.value, other.get(spaces, self.space)),
            space: self.space,
        }
    }

    /// Two-argument form of [`Spaced::apply`].
    pub fn apply2<U, V, R>(
        &self,
        spaces: &SpaceRegistry<T::Scalar>,
        a: &Spaced<U>,
        b: &Spaced<V>,
        f: impl FnOnce(T, U, V) -> R,
    ) -> Spaced<R>
    where
        U: Measure<Scalar = T::Scalar>,
        V: Measure<Scalar = T::Scalar>,
    {
        Spaced {
            value: f(self.value, a.get(spaces, self.space), b.get(spaces, self.space)),
            space: self.space,
        }
    }
}

impl<R> Spaced<R> {
    /// Drop the tag from a computed result.
    pub fn into_inner(self) -> R {
        self.value
    }
}

// --------------------------------------------------------------------------
// Distance
// --------------------------------------------------------------------------

impl<F: Float> Spaced<Scalar<F>> {
    pub fn of(value: F, space: SpaceName) -> Self {
        Spaced::new(Scalar(value), space)
    }

    pub fn value(&self) -> F {
        self.value.0
    }

    pub fn between(spaces: &SpaceRegistry<F>, a: &Position<F>, b: &Position<F>) -> Self {
        a.apply(spaces, b, |a, b| Scalar(a.distance(b)))
    }

    pub fn plus(&self, spaces: &SpaceRegistry<F>, other: &Distance<F>) -> Self {
        self.apply(spaces, other, |a, b| a + b)
    }

    pub fn minus(&self, spaces: &SpaceRegistry<F>, other: &Distance<F>) -> Self {
        self.apply(spaces, other, |a, b| a - b)
    }

    pub fn scale(&self, factor: F) -> Self {
        self.map(|d| Scalar(d.0 * factor))
    }

    pub fn min(&self, spaces: &SpaceRegistry<F>, other: &Distance<F>) -> Self {
        self.apply(spaces, other, |a, b| if b.0 < a.0 { b } else { a })
    }
}

// --------------------------------------------------------------------------
// Position
// --------------------------------------------------------------------------

impl<F: Float> Spaced<Point2<F>> {
    pub fn of(point: Point2<F>, space: SpaceName) -> Self {
        Spaced::new(point, space)
    }

    pub fn origin(space: SpaceName) -> Self {
        Spaced::new(Point2::origin(), space)
    }

    /// `self + scale * v`
    pub fn splus(&self, spaces: &SpaceRegistry<F>, scale: F, v: &Vector<F>) -> Self {
        self.apply(spaces, v, |p, v| p.splus(scale, v))
    }

    /// `self + distance * v`, with the distance measured in this space.
    pub fn dplus(&self, spaces: &SpaceRegistry<F>, distance: &Distance<F>, v: &Vector<F>) -> Self {
        self.apply2(spaces, distance, v, |p, d, v| p.splus(d.0, v))
    }

    pub fn plus(&self, spaces: &SpaceRegistry<F>, v: &Vector<F>) -> Self {
        self.splus(spaces, F::one(), v)
    }

    pub fn minus(&self, spaces: &SpaceRegistry<F>, v: &Vector<F>) -> Self {
        self.splus(spaces, -F::one(), v)
    }

    pub fn lerp(&self, spaces: &SpaceRegistry<F>, s: F, other: &Position<F>) -> Self {
        self.apply(spaces, other, |a, b| a.lerp(b, s))
    }

    pub fn to_vector(&self) -> Vector<F> {
        Spaced::new(self.value.to_vec(), self.space)
    }
}

// --------------------------------------------------------------------------
// Vector
// --------------------------------------------------------------------------

impl<F: Float> Spaced<Vec2<F>> {
    pub fn of(v: Vec2<F>, space: SpaceName) -> Self {
        Spaced::new(v, space)
    }

    pub fn zero(space: SpaceName) -> Self {
        Spaced::new(Vec2::zero(), space)
    }

    /// Vector from `a` to `b`, in `a`'s space.
    pub fn between(spaces: &SpaceRegistry<F>, a: &Position<F>, b: &Position<F>) -> Self {
        a.apply(spaces, b, |a, b| a.to(b))
    }

    pub fn from_angle(angle: &Angle<F>) -> Self {
        Spaced::new(Vec2::from_angle(angle.value), angle.space)
    }

    pub fn plus(&self, spaces: &SpaceRegistry<F>, other: &Vector<F>) -> Self {
        self.apply(spaces, other, |a, b| a + b)
    }

    pub fn minus(&self, spaces: &SpaceRegistry<F>, other: &Vector<F>) -> Self {
        self.apply(spaces, other, |a, b| a - b)
    }

    pub fn scale(&self, factor: F) -> Self {
        self.map(|v| v.scale(factor))
    }

    pub fn neg(&self) -> Self {
        self.map(|v| -v)
    }

    pub fn unit(&self) -> Self {
        self.map(Vec2::normalize)
    }

    pub fn r90(&self) -> Self {
        self.map(Vec2::r90)
    }

    pub fn rotate(&self, spaces: &SpaceRegistry<F>, angle: &Angle<F>) -> Self {
        self.apply(spaces, angle, |v, a| v.rotate(a))
    }

    pub fn dot(&self, spaces: &SpaceRegistry<F>, other: &Vector<F>) -> F {
        self.apply(spaces, other, |a, b| a.dot(b)).into_inner()
    }

    pub fn on_axis(&self, spaces: &SpaceRegistry<F>, axis: &Vector<F>) -> Self {
        self.apply(spaces, axis, |v, a| v.on_axis(a))
    }

    pub fn off_axis(&self, spaces: &SpaceRegistry<F>, axis: &Vector<F>) -> Self {
        self.apply(spaces, axis, |v, a| v.off_axis(a))
    }

    pub fn mag(&self) -> Distance<F> {
        Spaced::new(Scalar(self.value.length()), self.space)
    }

    pub fn mag2(&self) -> F {
        self.value.length_sq()
    }

    pub fn angle(&self) -> Angle<F> {
        Spaced::new(self.value.angle(), self.space)
    }

    pub fn to_position(&self) -> Position<F> {
        Spaced::new(self.value.to_point(), self.space)
    }
}

// --------------------------------------------------------------------------
// Angle
// --------------------------------------------------------------------------

impl<F: Float> Spaced<Radians<F>> {
    pub fn of(radians: F, space: SpaceName) -> Self {
        Spaced::new(Radians(radians), space)
    }

    pub fn zero(space: SpaceName) -> Self {
        Spaced::new(Radians(F::zero()), space)
    }

    pub fn radians(&self) -> F {
        self.value.0
    }

    pub fn degrees(&self) -> F {
        self.value.to_degrees()
    }

    pub fn from_vector(v: &Vector<F>) -> Self {
        v.angle()
    }

    /// Sum, wrapped into `[0, τ)`.
    pub fn plus(&self, spaces: &SpaceRegistry<F>, other: &Angle<F>) -> Self {
        self.apply(spaces, other, |a, b| (a + b).normalize())
    }

    pub fn minus(&self, spaces: &SpaceRegistry<F>, other: &Angle<F>) -> Self {
        self.apply(spaces, other, |a, b| a - b)
    }

    pub fn scale(&self, factor: F) -> Self {
        self.map(|a| Radians(a.0 * factor))
    }

    pub fn normalize(&self) -> Self {
        self.map(Radians::normalize)
    }

    /// Signed turn from `self` to `other` with the smaller magnitude.
    pub fn shortest_delta(&self, spaces: &SpaceRegistry<F>, other: &Angle<F>) -> Self {
        self.apply(spaces, other, |a, b| a.shortest_delta(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Viewport;

    fn spaces() -> SpaceRegistry<f64> {
        let mut reg = SpaceRegistry::new();
        Viewport::new(1000.0, 500.0).with_radius(20.0).install(&mut reg).unwrap();
        reg
    }

    #[test]
    fn same_space_get_is_untouched() {
        let reg = spaces();
        let p = Position::of(Point2::new(1.5, -2.5), SpaceName::MODEL);
        assert_eq!(p.get(&reg, SpaceName::MODEL), Point2::new(1.5, -2.5));
        assert_eq!(p.to(&reg, SpaceName::MODEL), p);
    }

    #[test]
    fn apply_converts_into_receiver_space() {
        let reg = spaces();
        let p = Position::of(Point2::new(0.0, 0.0), SpaceName::MODEL);
        // 250 px is half the short side: one radius, 20 model units, downwards.
        let drag = Vector::of(Vec2::new(0.0, 250.0), SpaceName::SCREEN);
        let moved = p.plus(&reg, &drag);
        assert_eq!(moved.space(), SpaceName::MODEL);
        let raw = moved.raw();
        assert!(raw.x.abs() < 1e-9);
        assert!((raw.y + 20.0).abs() < 1e-9);
    }

    #[test]
    fn angle_flips_with_screen_reflection() {
        let reg = spaces();
        let a = Angle::of(core::f64::consts::FRAC_PI_4, SpaceName::MODEL);
        let s = a.get(&reg, SpaceName::SCREEN);
        assert!((s.0 + core::f64::consts::FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn distance_between_positions_in_mixed_spaces() {
        let reg = spaces();
        let a = Position::of(Point2::new(0.0, 0.0), SpaceName::MODEL);
        let b = Position::of(Point2::new(500.0 + 125.0, 250.0), SpaceName::SCREEN);
        let d = Distance::between(&reg, &a, &b);
        assert_eq!(d.space(), SpaceName::MODEL);
        assert!((d.value() - 10.0).abs() < 1e-9);
    }
}
