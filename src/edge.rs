//! Derived edge geometry and the wall edge component.

use core::cell::{OnceCell, RefCell};

use crate::ecs::{Component, EntityId, World};
use crate::error::PlanError;
use crate::float::Float;
use crate::node::PhysNode;
use crate::space::{SpaceName, SpaceRegistry};
use crate::spaced::{Distance, Position, Vector};
use crate::vec::{Point2, Vec2};

/// Where two edges cross: the point plus its parameter along each edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeHit<F: Float> {
    pub point: Point2<F>,
    /// Parameter along the receiver.
    pub s: F,
    /// Parameter along the other edge.
    pub t: F,
}

#[derive(Copy, Clone, Debug)]
struct EdgeGeometry<F: Float> {
    vector: Vec2<F>,
    tangent: Vec2<F>,
    normal: Vec2<F>,
    midpoint: Point2<F>,
    length: F,
}

/// The segment between two points, with its geometry computed once on first use.
#[derive(Clone, Debug)]
pub struct MemoEdge<F: Float> {
    src: Point2<F>,
    dst: Point2<F>,
    space: SpaceName,
    geometry: OnceCell<EdgeGeometry<F>>,
}

impl<F: Float> MemoEdge<F> {
    pub fn new(src: Point2<F>, dst: Point2<F>, space: SpaceName) -> Self {
        MemoEdge {
            src,
            dst,
            space,
            geometry: OnceCell::new(),
        }
    }

    /// The edge between two tagged positions, in `src`'s space.
    pub fn between(spaces: &SpaceRegistry<F>, src: &Position<F>, dst: &Position<F>) -> Self {
        Self::new(src.raw(), dst.get(spaces, src.space()), src.space())
    }

    fn geometry(&self) -> &EdgeGeometry<F> {
        self.geometry.get_or_init(|| {
            let vector = self.src.to(self.dst);
            let tangent = vector.normalize();
            EdgeGeometry {
                vector,
                tangent,
                normal: tangent.r90(),
                midpoint: self.src.lerp(self.dst, F::half()),
                length: vector.length(),
            }
        })
    }

    pub fn space(&self) -> SpaceName {
        self.space
    }

    pub fn src(&self) -> Point2<F> {
        self.src
    }

    pub fn dst(&self) -> Point2<F> {
        self.dst
    }

    pub fn vector(&self) -> Vec2<F> {
        self.geometry().vector
    }

    /// Unit direction from `src` to `dst`; zero for a zero-length edge.
    pub fn tangent(&self) -> Vec2<F> {
        self.geometry().tangent
    }

    /// The tangent turned a quarter counter-clockwise.
    pub fn normal(&self) -> Vec2<F> {
        self.geometry().normal
    }

    pub fn midpoint(&self) -> Point2<F> {
        self.geometry().midpoint
    }

    pub fn length(&self) -> F {
        self.geometry().length
    }

    pub fn tagged_length(&self) -> Distance<F> {
        Distance::of(self.length(), self.space)
    }

    pub fn tagged_tangent(&self) -> Vector<F> {
        Vector::of(self.tangent(), self.space)
    }

    pub fn lerp(&self, s: F) -> Point2<F> {
        self.src.lerp(self.dst, s)
    }

    /// Parameter of the projection of `point` onto the edge's line. Unclamped.
    pub fn unlerp(&self, point: Point2<F>) -> F {
        let vector = self.vector();
        let len_sq = vector.length_sq();
        if len_sq.is_near_zero(F::from_f32(1e-20)) {
            return F::zero();
        }
        self.src.to(point).dot(vector) / len_sq
    }

    pub fn closest_point(&self, point: Point2<F>) -> Point2<F> {
        self.lerp(self.unlerp(point).clamp(F::zero(), F::one()))
    }

    pub fn distance(&self, point: Point2<F>) -> F {
        self.closest_point(point).distance(point)
    }

    /// Where this edge crosses `other`, if the segments actually overlap.
    ///
    /// Both edges are read in their own raw coordinates; callers mixing spaces
    /// should convert first.
    pub fn intersection(&self, other: &MemoEdge<F>) -> Option<EdgeHit<F>> {
        let denominator = self.vector().dot(other.normal());
        if denominator.abs() < F::from_f32(1e-4) {
            return None;
        }
        let s = self.src.to(other.src).dot(other.normal()) / denominator;
        let point = self.lerp(s);
        let t = other.unlerp(point);
        let unit = |x: F| x >= F::zero() && x <= F::one();
        if unit(s) && unit(t) {
            Some(EdgeHit { point, s, t })
        } else {
            None
        }
    }
}

#[derive(Clone, Debug)]
struct CachedEdge<F: Float> {
    generations: (u64, u64),
    edge: MemoEdge<F>,
}

/// Component connecting two node entities.
///
/// The edge geometry is recomputed only when one of the endpoint nodes has been
/// moved since the last read.
#[derive(Debug)]
pub struct PhysEdge<F: Float> {
    pub src: EntityId,
    pub dst: EntityId,
    cache: RefCell<Option<CachedEdge<F>>>,
}

impl<F: Float> Component for PhysEdge<F> {}

impl<F: Float> PhysEdge<F> {
    pub fn new(src: EntityId, dst: EntityId) -> Self {
        PhysEdge {
            src,
            dst,
            cache: RefCell::new(None),
        }
    }

    /// Current model-space geometry of the edge.
    pub fn edge(&self, world: &World) -> Result<MemoEdge<F>, PlanError> {
        let src = world.try_get::<PhysNode<F>>(self.src)?;
        let dst = world.try_get::<PhysNode<F>>(self.dst)?;
        let generations = (src.generation(), dst.generation());
        if let Some(cached) = self.cache.borrow().as_ref() {
            if cached.generations == generations {
                return Ok(cached.edge.clone());
            }
        }
        let edge = MemoEdge::new(src.model_pos(), dst.model_pos(), SpaceName::MODEL);
        *self.cache.borrow_mut() = Some(CachedEdge {
            generations,
            edge: edge.clone(),
        });
        Ok(edge)
    }
}

impl<F: Float> Clone for PhysEdge<F> {
    /// Clones share endpoints but start with a cold cache.
    fn clone(&self) -> Self {
        PhysEdge::new(self.src, self.dst)
    }
}
