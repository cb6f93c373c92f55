//! Floor plans: wall joints and walls wired to nodes, edges and constraints.
//!
//! A joint entity carries a [`PhysNode`], a [`WallJoint`], an [`AngleConstraint`]
//! on the corner it forms and a [`FixedConstraint`] that can pin it in place. A
//! wall entity carries a [`Wall`], the [`PhysEdge`] between its joints and the
//! length, minimum-length and axis constraints.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;

use tracing::debug;

use crate::config::SolverConfig;
use crate::constraint::{
    self, angle_label, length_label, AngleConstraint, AxisConstraint, Constraint, ConstraintStatus,
    FixedConstraint, LengthConstraint, MinLengthConstraint,
};
use crate::ecs::{Component, EntityId, World};
use crate::edge::{MemoEdge, PhysEdge};
use crate::error::PlanError;
use crate::float::Float;
use crate::node::PhysNode;
use crate::observer::{FrameObserver, NoOpFrameObserver};
use crate::solver::{self, FrameInput};
use crate::space::{SpaceName, SpaceRegistry, Viewport};
use crate::spaced::{Angle, Distance, Position};
use crate::vec::Vec2;

/// A wall running from one joint to another.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Wall {
    pub src: EntityId,
    pub dst: EntityId,
}

impl Component for Wall {}

/// A corner where at most one wall arrives and one wall leaves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WallJoint {
    pub incoming: Option<EntityId>,
    pub outgoing: Option<EntityId>,
}

impl Component for WallJoint {}

impl WallJoint {
    pub fn is_orphan(&self) -> bool {
        self.incoming.is_none() && self.outgoing.is_none()
    }
}

/// The joints and walls of a closed room, in corner order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub joints: Vec<EntityId>,
    pub walls: Vec<EntityId>,
}

/// An editable floor plan.
pub struct FloorPlan<F: Float> {
    world: World,
    _scalar: PhantomData<F>,
}

impl<F: Float> FloorPlan<F> {
    pub fn new(viewport: Viewport<F>) -> Result<Self, PlanError> {
        Self::with_config(viewport, SolverConfig::new())
    }

    pub fn with_config(viewport: Viewport<F>, config: SolverConfig<F>) -> Result<Self, PlanError> {
        let mut world = World::new();
        let mut spaces = SpaceRegistry::new();
        viewport.install(&mut spaces)?;
        world.insert_resource(spaces);
        world.insert_resource(viewport);
        solver::install(&mut world, config);
        Ok(FloorPlan {
            world,
            _scalar: PhantomData,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn spaces(&self) -> SpaceRegistry<F> {
        self.world.resource::<SpaceRegistry<F>>().cloned().unwrap_or_default()
    }

    pub fn config(&self) -> SolverConfig<F> {
        self.world.resource::<SolverConfig<F>>().copied().unwrap_or_default()
    }

    pub fn viewport(&self) -> Option<&Viewport<F>> {
        self.world.resource::<Viewport<F>>()
    }

    /// Rebuild the model and screen spaces for a new pan, zoom or canvas size.
    pub fn set_viewport(&mut self, viewport: Viewport<F>) -> Result<(), PlanError> {
        let mut spaces = self.spaces();
        viewport.install(&mut spaces)?;
        self.world.insert_resource(spaces);
        self.world.insert_resource(viewport);
        Ok(())
    }

    // ---- Construction ----

    pub fn add_joint(&mut self, pos: &Position<F>) -> Result<EntityId, PlanError> {
        let config = self.config();
        let node = PhysNode::at(&self.spaces(), pos)
            .with_mass(config.default_mass)?
            .with_drag(config.default_drag)?;
        let joint = self.world.create_entity().id();
        self.world.add(joint, WallJoint::default())?;
        self.world.add(joint, node)?;
        self.world.add(joint, AngleConstraint::<F>::new(joint))?;
        self.world.add(joint, FixedConstraint::<F>::new(vec![joint]))?;
        Ok(joint)
    }

    /// Connect two joints with a new wall.
    ///
    /// A joint has at most one outgoing and one incoming wall; `src` must have a
    /// free outgoing side and `dst` a free incoming side.
    pub fn add_wall(&mut self, src: EntityId, dst: EntityId) -> Result<EntityId, PlanError> {
        if src == dst {
            return Err(PlanError::SelfLoop(src));
        }
        if let Some(wall) = self.world.try_get::<WallJoint>(src)?.outgoing {
            return Err(PlanError::JointOccupied { joint: src, wall });
        }
        if let Some(wall) = self.world.try_get::<WallJoint>(dst)?.incoming {
            return Err(PlanError::JointOccupied { joint: dst, wall });
        }

        let wall = self
            .world
            .create_entity()
            .with(Wall { src, dst })
            .with(PhysEdge::<F>::new(src, dst))
            .with(LengthConstraint::<F>::new())
            .with(MinLengthConstraint::<F>::new())
            .with(AxisConstraint::<F>::new())
            .id();
        let length = self.wall_edge(wall)?.length();
        self.world.try_get_mut::<LengthConstraint<F>>(wall)?.set_target(length);

        self.world.try_get_mut::<WallJoint>(src)?.outgoing = Some(wall);
        self.world.try_get_mut::<WallJoint>(dst)?.incoming = Some(wall);
        self.refresh_corner(src)?;
        self.refresh_corner(dst)?;
        debug!(%wall, %src, %dst, "wall added");
        Ok(wall)
    }

    /// A closed loop of walls through `corners`.
    pub fn add_room(&mut self, corners: &[Position<F>]) -> Result<Room, PlanError> {
        if corners.len() < 3 {
            return Err(PlanError::InsufficientCorners(corners.len()));
        }
        let joints = corners
            .iter()
            .map(|corner| self.add_joint(corner))
            .collect::<Result<Vec<_>, _>>()?;
        let mut walls = Vec::with_capacity(joints.len());
        for (i, &src) in joints.iter().enumerate() {
            let dst = joints[(i + 1) % joints.len()];
            walls.push(self.add_wall(src, dst)?);
        }
        Ok(Room { joints, walls })
    }

    /// Delete a wall. Joints left without any wall are deleted too.
    pub fn delete_wall(&mut self, wall: EntityId) -> Result<(), PlanError> {
        let Wall { src, dst } = *self.world.try_get::<Wall>(wall)?;
        self.world.delete_entity(wall)?;
        if let Some(joint) = self.world.get_mut::<WallJoint>(src) {
            if joint.outgoing == Some(wall) {
                joint.outgoing = None;
            }
        }
        if let Some(joint) = self.world.get_mut::<WallJoint>(dst) {
            if joint.incoming == Some(wall) {
                joint.incoming = None;
            }
        }
        for joint in [src, dst] {
            let orphan = match self.world.get::<WallJoint>(joint) {
                Some(j) => j.is_orphan() && !self.is_wall_endpoint(joint),
                None => continue,
            };
            if orphan {
                self.world.delete_entity(joint)?;
            } else {
                self.refresh_corner(joint)?;
            }
        }
        Ok(())
    }

    /// Whether any remaining wall starts or ends at `joint`.
    fn is_wall_endpoint(&self, joint: EntityId) -> bool {
        self.world
            .components::<Wall>()
            .any(|(_, wall)| wall.src == joint || wall.dst == joint)
    }

    /// Point the joint's angle constraint at the far ends of its two walls.
    fn refresh_corner(&mut self, joint: EntityId) -> Result<(), PlanError> {
        let WallJoint { incoming, outgoing } = *self.world.try_get::<WallJoint>(joint)?;
        let left = outgoing.and_then(|w| self.world.get::<Wall>(w)).map(|w| w.dst);
        let right = incoming.and_then(|w| self.world.get::<Wall>(w)).map(|w| w.src);
        let angle = self.world.try_get_mut::<AngleConstraint<F>>(joint)?;
        angle.left = left;
        angle.right = right;
        Ok(())
    }

    // ---- Editing ----

    /// Move a joint to `pos`. A locked joint is re-locked at its new position.
    pub fn drag_joint(&mut self, joint: EntityId, pos: &Position<F>) -> Result<(), PlanError> {
        let spaces = self.spaces();
        let node = self.world.try_get_mut::<PhysNode<F>>(joint)?;
        node.set_pos(&spaces, pos);
        node.velocity = Vec2::zero();
        let model = node.model_pos();
        if let Some(fixed) = self.world.get_mut::<FixedConstraint<F>>(joint) {
            let targets = fixed.nodes().iter().map(|_| model).collect();
            fixed.update_targets(targets);
        }
        Ok(())
    }

    pub fn set_length_locked(&mut self, wall: EntityId, locked: bool) -> Result<bool, PlanError> {
        constraint::set_enabled::<LengthConstraint<F>>(&mut self.world, wall, locked)
    }

    pub fn set_target_length(&mut self, wall: EntityId, length: &Distance<F>) -> Result<(), PlanError> {
        let model = length.get(&self.spaces(), SpaceName::MODEL).0;
        self.world.try_get_mut::<LengthConstraint<F>>(wall)?.set_target(model);
        Ok(())
    }

    pub fn set_angle_locked(&mut self, joint: EntityId, locked: bool) -> Result<bool, PlanError> {
        constraint::set_enabled::<AngleConstraint<F>>(&mut self.world, joint, locked)
    }

    pub fn set_target_angle(&mut self, joint: EntityId, angle: Angle<F>) -> Result<(), PlanError> {
        self.world.try_get_mut::<AngleConstraint<F>>(joint)?.set_target(angle);
        Ok(())
    }

    pub fn set_position_locked(&mut self, joint: EntityId, locked: bool) -> Result<bool, PlanError> {
        constraint::set_enabled::<FixedConstraint<F>>(&mut self.world, joint, locked)
    }

    pub fn set_axis_locked(&mut self, wall: EntityId, locked: bool) -> Result<bool, PlanError> {
        constraint::set_enabled::<AxisConstraint<F>>(&mut self.world, wall, locked)
    }

    pub fn set_axis_vertical(&mut self, wall: EntityId, vertical: bool) -> Result<(), PlanError> {
        self.world.try_get_mut::<AxisConstraint<F>>(wall)?.set_vertical(vertical);
        Ok(())
    }

    pub fn set_tension<C: Constraint<Scalar = F>>(&mut self, entity: EntityId, tension: F) -> Result<(), PlanError> {
        constraint::set_tension::<C>(&mut self.world, entity, tension)
    }

    // ---- Frames ----

    pub fn set_kinematics_enabled(&mut self, enabled: bool) {
        if let Some(frame) = self.world.resource_mut::<FrameInput<F>>() {
            frame.kinematics_enabled = enabled;
        }
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        if let Some(frame) = self.world.resource_mut::<FrameInput<F>>() {
            frame.dragging = dragging;
        }
    }

    pub fn tick(&mut self, dt: F) {
        self.tick_observed(dt, &mut NoOpFrameObserver);
    }

    /// Run one frame. `dt` is clamped into the configured range first.
    pub fn tick_observed(&mut self, dt: F, observer: &mut dyn FrameObserver) {
        let dt = self.config().clamp_dt(dt);
        if let Some(frame) = self.world.resource_mut::<FrameInput<F>>() {
            frame.dt = dt;
        }
        self.world.update_observed(observer);
    }

    // ---- Queries ----

    pub fn walls(&self) -> Vec<EntityId> {
        self.world.components::<Wall>().map(|(id, _)| id).collect()
    }

    pub fn joints(&self) -> Vec<EntityId> {
        self.world.components::<WallJoint>().map(|(id, _)| id).collect()
    }

    pub fn wall(&self, wall: EntityId) -> Result<Wall, PlanError> {
        self.world.try_get::<Wall>(wall).copied()
    }

    pub fn joint(&self, joint: EntityId) -> Result<WallJoint, PlanError> {
        self.world.try_get::<WallJoint>(joint).copied()
    }

    pub fn joint_position(&self, joint: EntityId) -> Result<Position<F>, PlanError> {
        Ok(self.world.try_get::<PhysNode<F>>(joint)?.pos())
    }

    pub fn wall_edge(&self, wall: EntityId) -> Result<MemoEdge<F>, PlanError> {
        self.world.try_get::<PhysEdge<F>>(wall)?.edge(&self.world)
    }

    /// How the wall's length compares with its lock, or `None` when unlocked.
    pub fn wall_length_status(&self, wall: EntityId) -> Result<Option<ConstraintStatus<F>>, PlanError> {
        let length = self.world.try_get::<LengthConstraint<F>>(wall)?;
        if !length.state.enabled() {
            return Ok(None);
        }
        let current = self.wall_edge(wall)?.length();
        Ok(Some(length.status(current, self.config().label_tolerance)))
    }

    pub fn wall_length_label(&self, wall: EntityId) -> Result<String, PlanError> {
        let current = self.wall_edge(wall)?.length();
        let length = self.world.try_get::<LengthConstraint<F>>(wall)?;
        let target = length.state.enabled().then(|| length.target());
        Ok(length_label(current, target, self.config().label_tolerance))
    }

    pub fn corner_angle_label(&self, joint: EntityId) -> Result<String, PlanError> {
        let angle = self.world.try_get::<AngleConstraint<F>>(joint)?;
        let current = angle.current(&self.world)?.raw();
        let spaces = self.spaces();
        let target = angle
            .state
            .enabled()
            .then(|| angle.target().get(&spaces, SpaceName::MODEL));
        Ok(angle_label(current, target))
    }
}
