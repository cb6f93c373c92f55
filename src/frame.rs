//! Affine transforms and the frames that produce them.

use crate::error::PlanError;
use crate::float::Float;
use crate::vec::{Point2, Scalar, Vec2};

/// A 2D affine map: `p' = M·p + t`.
///
/// Points take the translation, vectors do not, and distances scale by
/// `sqrt(|det M|)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform<F: Float> {
    /// Column images of the linear part: where +X and +Y land.
    pub i: Vec2<F>,
    pub j: Vec2<F>,
    pub translation: Vec2<F>,
}

impl<F: Float> Transform<F> {
    pub fn identity() -> Self {
        Transform {
            i: Vec2::unit_x(),
            j: Vec2::unit_y(),
            translation: Vec2::zero(),
        }
    }

    pub fn determinant(&self) -> F {
        self.i.cross(self.j)
    }

    pub fn vec(&self, v: Vec2<F>) -> Vec2<F> {
        self.i.scale(v.x) + self.j.scale(v.y)
    }

    pub fn point(&self, p: Point2<F>) -> Point2<F> {
        (self.vec(p.to_vec()) + self.translation).to_point()
    }

    pub fn distance(&self, d: Scalar<F>) -> Scalar<F> {
        Scalar(d.0 * self.determinant().abs().sqrt())
    }

    /// `self` applied after `first`.
    pub fn then(&self, first: &Transform<F>) -> Transform<F> {
        Transform {
            i: self.vec(first.i),
            j: self.vec(first.j),
            translation: self.vec(first.translation) + self.translation,
        }
    }

    /// The inverse map, or `None` when the linear part is singular.
    pub fn inverse(&self) -> Option<Transform<F>> {
        let det = self.determinant();
        if det.is_near_zero(F::from_f32(1e-12)) {
            return None;
        }
        let inv = F::one() / det;
        let i = Vec2::new(self.j.y * inv, -self.i.y * inv);
        let j = Vec2::new(-self.j.x * inv, self.i.x * inv);
        let t = self.translation;
        let translation = -(i.scale(t.x) + j.scale(t.y));
        Some(Transform { i, j, translation })
    }
}

impl<F: Float> Default for Transform<F> {
    fn default() -> Self {
        Self::identity()
    }
}

/// A reference frame: an origin and two axes, expressed in the common
/// representation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame<F: Float> {
    pub origin: Point2<F>,
    pub axis_i: Vec2<F>,
    pub axis_j: Vec2<F>,
}

impl<F: Float> Frame<F> {
    /// Create a frame. Collinear axes cannot be inverted and are rejected.
    pub fn new(origin: Point2<F>, axis_i: Vec2<F>, axis_j: Vec2<F>) -> Result<Self, PlanError> {
        let det = axis_i.cross(axis_j);
        if det.is_near_zero(F::from_f32(1e-12)) || !det.is_finite() {
            return Err(PlanError::DegenerateFrame { det: det.to_f64() });
        }
        Ok(Frame { origin, axis_i, axis_j })
    }

    pub fn identity() -> Self {
        Frame {
            origin: Point2::origin(),
            axis_i: Vec2::unit_x(),
            axis_j: Vec2::unit_y(),
        }
    }

    /// Frame-local coordinates to the common representation.
    pub fn project(&self) -> Transform<F> {
        Transform {
            i: self.axis_i,
            j: self.axis_j,
            translation: self.origin.to_vec(),
        }
    }

    /// The common representation to frame-local coordinates.
    pub fn unproject(&self) -> Transform<F> {
        // Frame::new rejected singular axes, so the inverse exists.
        self.project().inverse().unwrap_or_default()
    }
}
