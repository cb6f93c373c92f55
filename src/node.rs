//! Point masses integrated with explicit Euler steps and quadratic drag.

use crate::config::SolverConfig;
use crate::ecs::Component;
use crate::error::PlanError;
use crate::float::Float;
use crate::space::{SpaceName, SpaceRegistry};
use crate::spaced::{Position, Vector};
use crate::vec::{Point2, Vec2};

/// A point mass. Positions are stored in model space.
///
/// Every position write bumps [`PhysNode::generation`], which derived geometry
/// uses to know when it is stale.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysNode<F: Float> {
    pos: Point2<F>,
    pub velocity: Vec2<F>,
    pub acceleration: Vec2<F>,
    force: Vec2<F>,
    mass: F,
    drag: F,
    generation: u64,
}

impl<F: Float> Component for PhysNode<F> {}

impl<F: Float> PhysNode<F> {
    /// A node at rest at model-space `pos`, with mass 1 and drag 0.5.
    pub fn new(pos: Point2<F>) -> Self {
        PhysNode {
            pos,
            velocity: Vec2::zero(),
            acceleration: Vec2::zero(),
            force: Vec2::zero(),
            mass: F::one(),
            drag: F::half(),
            generation: 0,
        }
    }

    /// A node at rest at `pos`, given in any space.
    pub fn at(spaces: &SpaceRegistry<F>, pos: &Position<F>) -> Self {
        Self::new(pos.get(spaces, SpaceName::MODEL))
    }

    pub fn with_mass(mut self, mass: F) -> Result<Self, PlanError> {
        self.set_mass(mass)?;
        Ok(self)
    }

    pub fn with_drag(mut self, drag: F) -> Result<Self, PlanError> {
        self.set_drag(drag)?;
        Ok(self)
    }

    pub fn mass(&self) -> F {
        self.mass
    }

    pub fn set_mass(&mut self, mass: F) -> Result<(), PlanError> {
        if !(mass > F::zero()) || !mass.is_finite() {
            return Err(PlanError::InvalidMass(mass.to_f64()));
        }
        self.mass = mass;
        Ok(())
    }

    pub fn drag(&self) -> F {
        self.drag
    }

    pub fn set_drag(&mut self, drag: F) -> Result<(), PlanError> {
        if !(drag >= F::zero()) || !drag.is_finite() {
            return Err(PlanError::InvalidDrag(drag.to_f64()));
        }
        self.drag = drag;
        Ok(())
    }

    pub fn pos(&self) -> Position<F> {
        Position::of(self.pos, SpaceName::MODEL)
    }

    pub fn model_pos(&self) -> Point2<F> {
        self.pos
    }

    pub fn set_pos(&mut self, spaces: &SpaceRegistry<F>, pos: &Position<F>) {
        self.set_model_pos(pos.get(spaces, SpaceName::MODEL));
    }

    pub fn set_model_pos(&mut self, pos: Point2<F>) {
        self.pos = pos;
        self.generation += 1;
    }

    /// Bumped on every position write.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Accumulate a force for the next integration step.
    pub fn add_force(&mut self, spaces: &SpaceRegistry<F>, force: &Vector<F>) {
        self.add_model_force(force.get(spaces, SpaceName::MODEL));
    }

    pub fn add_model_force(&mut self, force: Vec2<F>) {
        self.force = self.force + force;
    }

    pub fn force(&self) -> Vec2<F> {
        self.force
    }

    pub fn clear_force(&mut self) {
        self.force = Vec2::zero();
    }

    /// Advance one step and return the displacement that was applied.
    ///
    /// A node whose accumulated force is below the rest threshold loses its
    /// velocity first, so an unloaded node stays exactly where it is.
    pub fn update(&mut self, dt: F, config: &SolverConfig<F>) -> Vec2<F> {
        if self.force.length() < config.rest_force_threshold {
            self.velocity = Vec2::zero();
        }
        let drag = self.velocity.scale(-self.drag * self.velocity.length());
        let dt_per_mass = dt / self.mass;
        self.velocity = self
            .velocity
            .splus(dt_per_mass, drag)
            .splus(dt, self.acceleration)
            .splus(dt_per_mass, self.force);

        let step = self.velocity.scale(dt);
        let moved = if step.length_sq() > config.displacement_epsilon {
            self.set_model_pos(self.pos + step);
            step
        } else {
            Vec2::zero()
        };
        self.force = Vec2::zero();
        moved
    }
}
