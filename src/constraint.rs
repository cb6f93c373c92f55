//! Geometric constraints: fixed position, minimum length, target length, target
//! angle and axis alignment.
//!
//! Constraints are components. Each one turns the geometry it watches into
//! corrective forces on [`PhysNode`]s (or, for [`FixedConstraint`], direct position
//! writes) for the next integration step. Enabling a constraint snapshots the
//! current geometry as its target, so toggling a lock never makes the plan jump.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use tracing::debug;

use crate::config::SolverConfig;
use crate::ecs::{Component, EntityId, World};
use crate::edge::{MemoEdge, PhysEdge};
use crate::error::PlanError;
use crate::float::Float;
use crate::node::PhysNode;
use crate::space::{SpaceName, SpaceRegistry};
use crate::spaced::{Angle, Position, Vector};
use crate::vec::{Point2, Radians, Vec2};

/// Tag used by the scheduler to dispatch a constraint to its force law.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Fixed,
    MinLength,
    Length,
    Angle,
    Axis,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintKind::Fixed => "fixed",
            ConstraintKind::MinLength => "min-length",
            ConstraintKind::Length => "length",
            ConstraintKind::Angle => "angle",
            ConstraintKind::Axis => "axis",
        })
    }
}

/// State shared by every constraint kind.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintState<F: Float> {
    enabled: bool,
    tension: F,
    /// Enforced in ascending order, so the highest priority has the last word.
    pub priority: i32,
}

impl<F: Float> ConstraintState<F> {
    /// A disabled constraint with tension 0.5 and priority 0.
    pub fn new() -> Self {
        ConstraintState {
            enabled: false,
            tension: F::half(),
            priority: 0,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_tension(mut self, tension: F) -> Result<Self, PlanError> {
        self.set_tension(tension)?;
        Ok(self)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn tension(&self) -> F {
        self.tension
    }

    pub fn set_tension(&mut self, tension: F) -> Result<(), PlanError> {
        if !(tension >= F::zero() && tension <= F::one()) {
            return Err(PlanError::InvalidTension(tension.to_f64()));
        }
        self.tension = tension;
        Ok(())
    }

    /// How strongly the constraint acts this frame: its tension when enabled.
    pub fn influence(&self) -> F {
        if self.enabled { self.tension } else { F::zero() }
    }

    pub fn spring_constant(&self, config: &SolverConfig<F>) -> F {
        self.tension * config.spring_scale
    }

    /// Soft constraints are paused together with the kinematics.
    pub fn is_kinematic(&self) -> bool {
        self.tension < F::one()
    }
}

impl<F: Float> Default for ConstraintState<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a constraint needs from the world besides nodes and edges.
#[derive(Copy, Clone, Debug)]
pub struct EnforceContext<'a, F: Float> {
    pub spaces: &'a SpaceRegistry<F>,
    pub config: &'a SolverConfig<F>,
}

/// A constraint component.
pub trait Constraint: Component + Clone {
    type Scalar: Float;

    const KIND: ConstraintKind;

    fn state(&self) -> &ConstraintState<Self::Scalar>;

    fn state_mut(&mut self) -> &mut ConstraintState<Self::Scalar>;

    /// Runs before the constraint becomes enabled.
    fn on_enable(
        &mut self,
        _world: &World,
        _entity: EntityId,
        _cx: &EnforceContext<'_, Self::Scalar>,
    ) -> Result<(), PlanError> {
        Ok(())
    }

    /// Runs before the constraint becomes disabled.
    fn on_disable(
        &mut self,
        _world: &World,
        _entity: EntityId,
        _cx: &EnforceContext<'_, Self::Scalar>,
    ) -> Result<(), PlanError> {
        Ok(())
    }

    /// Runs every frame while disabled.
    fn track(
        &mut self,
        _world: &World,
        _entity: EntityId,
        _cx: &EnforceContext<'_, Self::Scalar>,
    ) -> Result<(), PlanError> {
        Ok(())
    }

    /// Apply the force law for one frame.
    fn enforce(
        &self,
        world: &mut World,
        entity: EntityId,
        cx: &EnforceContext<'_, Self::Scalar>,
    ) -> Result<(), PlanError>;
}

fn context_parts<F: Float>(world: &World) -> (SpaceRegistry<F>, SolverConfig<F>) {
    let spaces = world.resource::<SpaceRegistry<F>>().cloned().unwrap_or_default();
    let config = world.resource::<SolverConfig<F>>().copied().unwrap_or_default();
    (spaces, config)
}

/// Enable or disable the `C` constraint on `entity`, running its transition hook.
///
/// Returns whether the state changed; setting the current state again is a no-op.
pub fn set_enabled<C: Constraint>(world: &mut World, entity: EntityId, enabled: bool) -> Result<bool, PlanError> {
    let mut constraint = world.try_get::<C>(entity)?.clone();
    if constraint.state().enabled == enabled {
        return Ok(false);
    }
    let (spaces, config) = context_parts::<C::Scalar>(world);
    let cx = EnforceContext { spaces: &spaces, config: &config };
    if enabled {
        constraint.on_enable(world, entity, &cx)?;
    } else {
        constraint.on_disable(world, entity, &cx)?;
    }
    constraint.state_mut().enabled = enabled;
    *world.try_get_mut::<C>(entity)? = constraint;
    debug!(%entity, kind = %C::KIND, enabled, "constraint toggled");
    Ok(true)
}

pub fn set_tension<C: Constraint>(world: &mut World, entity: EntityId, tension: C::Scalar) -> Result<(), PlanError> {
    world.try_get_mut::<C>(entity)?.state_mut().set_tension(tension)
}

/// `-correction` on the source node, `+correction` on the destination.
fn push_apart<F: Float>(world: &mut World, phys: &PhysEdge<F>, correction: Vec2<F>) -> Result<(), PlanError> {
    world.try_get_mut::<PhysNode<F>>(phys.src)?.add_model_force(-correction);
    world.try_get_mut::<PhysNode<F>>(phys.dst)?.add_model_force(correction);
    Ok(())
}

fn wall_edge<F: Float>(world: &World, entity: EntityId) -> Result<(PhysEdge<F>, MemoEdge<F>), PlanError> {
    let phys = world.try_get::<PhysEdge<F>>(entity)?;
    let edge = phys.edge(world)?;
    Ok((phys.clone(), edge))
}

// --------------------------------------------------------------------------
// Fixed position
// --------------------------------------------------------------------------

/// Pins a set of nodes to stored target positions.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedConstraint<F: Float> {
    pub state: ConstraintState<F>,
    nodes: Vec<EntityId>,
    targets: Vec<Point2<F>>,
}

impl<F: Float> Component for FixedConstraint<F> {}

impl<F: Float> FixedConstraint<F> {
    /// Disabled, tension 1, priority 5.
    pub fn new(nodes: Vec<EntityId>) -> Self {
        FixedConstraint {
            state: ConstraintState {
                enabled: false,
                tension: F::one(),
                priority: 5,
            },
            nodes,
            targets: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[EntityId] {
        &self.nodes
    }

    /// Model-space targets, one per tracked node.
    pub fn targets(&self) -> &[Point2<F>] {
        &self.targets
    }

    pub fn update_targets(&mut self, targets: Vec<Point2<F>>) {
        self.targets = targets;
    }

    pub fn update_target_positions(&mut self, spaces: &SpaceRegistry<F>, targets: &[Position<F>]) {
        self.targets = targets.iter().map(|p| p.get(spaces, SpaceName::MODEL)).collect();
    }

    fn snapshot(&self, world: &World) -> Result<Vec<Point2<F>>, PlanError> {
        self.nodes
            .iter()
            .map(|id| world.try_get::<PhysNode<F>>(*id).map(PhysNode::model_pos))
            .collect()
    }
}

impl<F: Float> Constraint for FixedConstraint<F> {
    type Scalar = F;
    const KIND: ConstraintKind = ConstraintKind::Fixed;

    fn state(&self) -> &ConstraintState<F> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ConstraintState<F> {
        &mut self.state
    }

    fn on_enable(&mut self, world: &World, _entity: EntityId, _cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        self.targets = self.snapshot(world)?;
        Ok(())
    }

    fn enforce(&self, world: &mut World, _entity: EntityId, _cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        let influence = self.state.influence();
        for (id, target) in self.nodes.iter().zip(&self.targets) {
            let node = world.try_get_mut::<PhysNode<F>>(*id)?;
            let pos = node.model_pos();
            let next = pos.lerp(*target, influence);
            if next != pos {
                node.set_model_pos(next);
            }
        }
        Ok(())
    }
}

// --------------------------------------------------------------------------
// Minimum length
// --------------------------------------------------------------------------

/// Keeps a wall from collapsing below a minimum length.
///
/// Stands down while an enabled [`LengthConstraint`] sits on the same entity.
#[derive(Clone, Debug, PartialEq)]
pub struct MinLengthConstraint<F: Float> {
    pub state: ConstraintState<F>,
    /// Overrides the configured minimum wall length.
    pub min_length: Option<F>,
}

impl<F: Float> Component for MinLengthConstraint<F> {}

impl<F: Float> MinLengthConstraint<F> {
    /// Enabled, tension 1.
    pub fn new() -> Self {
        MinLengthConstraint {
            state: ConstraintState {
                enabled: true,
                tension: F::one(),
                priority: 0,
            },
            min_length: None,
        }
    }

    pub fn with_min_length(mut self, min_length: F) -> Self {
        self.min_length = Some(min_length);
        self
    }
}

impl<F: Float> Default for MinLengthConstraint<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Constraint for MinLengthConstraint<F> {
    type Scalar = F;
    const KIND: ConstraintKind = ConstraintKind::MinLength;

    fn state(&self) -> &ConstraintState<F> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ConstraintState<F> {
        &mut self.state
    }

    fn enforce(&self, world: &mut World, entity: EntityId, cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        let overridden = world
            .get::<LengthConstraint<F>>(entity)
            .is_some_and(|c| c.state.enabled());
        if overridden {
            return Ok(());
        }
        let (phys, edge) = wall_edge::<F>(world, entity)?;
        let min_length = self.min_length.unwrap_or(cx.config.min_wall_length);
        let delta = min_length - edge.length();
        if delta < F::zero() {
            return Ok(());
        }
        let correction = edge.tangent().scale(delta * F::half() * self.state.spring_constant(cx.config));
        push_apart(world, &phys, correction)
    }
}

// --------------------------------------------------------------------------
// Target length
// --------------------------------------------------------------------------

/// Springs a wall toward a target length.
#[derive(Clone, Debug, PartialEq)]
pub struct LengthConstraint<F: Float> {
    pub state: ConstraintState<F>,
    target: F,
}

impl<F: Float> Component for LengthConstraint<F> {}

impl<F: Float> LengthConstraint<F> {
    pub fn new() -> Self {
        LengthConstraint {
            state: ConstraintState::new(),
            target: F::zero(),
        }
    }

    /// Target length in model units.
    pub fn target(&self) -> F {
        self.target
    }

    pub fn set_target(&mut self, target: F) {
        self.target = target;
    }

    pub fn status(&self, current: F, tolerance: F) -> ConstraintStatus<F> {
        ConstraintStatus::from_delta(current - self.target, tolerance)
    }
}

impl<F: Float> Default for LengthConstraint<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Constraint for LengthConstraint<F> {
    type Scalar = F;
    const KIND: ConstraintKind = ConstraintKind::Length;

    fn state(&self) -> &ConstraintState<F> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ConstraintState<F> {
        &mut self.state
    }

    fn on_enable(&mut self, world: &World, entity: EntityId, _cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        self.target = wall_edge::<F>(world, entity)?.1.length();
        Ok(())
    }

    fn track(&mut self, world: &World, entity: EntityId, _cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        self.target = wall_edge::<F>(world, entity)?.1.length();
        Ok(())
    }

    fn enforce(&self, world: &mut World, entity: EntityId, cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        let (phys, edge) = wall_edge::<F>(world, entity)?;
        let delta = self.target - edge.length();
        let correction = edge.tangent().scale(delta * F::half() * self.state.spring_constant(cx.config));
        push_apart(world, &phys, correction)
    }
}

// --------------------------------------------------------------------------
// Target angle
// --------------------------------------------------------------------------

/// A vertex and the two arms leaving it, relative to the vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Corner<F: Float> {
    pub center: Point2<F>,
    pub left: Vec2<F>,
    pub right: Vec2<F>,
}

/// Springs the angle between two arms of a corner toward a target.
#[derive(Clone, Debug, PartialEq)]
pub struct AngleConstraint<F: Float> {
    pub state: ConstraintState<F>,
    pub center: EntityId,
    pub left: Option<EntityId>,
    pub right: Option<EntityId>,
    target: Angle<F>,
}

impl<F: Float> Component for AngleConstraint<F> {}

impl<F: Float> AngleConstraint<F> {
    /// Disabled, targeting a right angle.
    pub fn new(center: EntityId) -> Self {
        AngleConstraint {
            state: ConstraintState::new(),
            center,
            left: None,
            right: None,
            target: Angle::of(F::pi() * F::half(), SpaceName::MODEL),
        }
    }

    pub fn target(&self) -> Angle<F> {
        self.target
    }

    pub fn set_target(&mut self, target: Angle<F>) {
        self.target = target;
    }

    /// The corner's geometry in model space, if both neighbours are known.
    pub fn corner(&self, world: &World) -> Result<Option<Corner<F>>, PlanError> {
        let center = world.try_get::<PhysNode<F>>(self.center)?.model_pos();
        let (left, right) = match (self.left, self.right) {
            (Some(left), Some(right)) => (left, right),
            _ => return Ok(None),
        };
        let left = world.try_get::<PhysNode<F>>(left)?.model_pos();
        let right = world.try_get::<PhysNode<F>>(right)?.model_pos();
        Ok(Some(Corner {
            center,
            left: center.to(left),
            right: center.to(right),
        }))
    }

    /// Counter-clockwise angle from the right arm to the left arm, in `[0, τ)`.
    /// Zero when either arm is missing or has no length.
    pub fn current(&self, world: &World) -> Result<Angle<F>, PlanError> {
        Ok(self
            .measure(world)?
            .unwrap_or_else(|| Angle::zero(SpaceName::MODEL)))
    }

    /// The corner's angle, or `None` while it has no two proper arms.
    pub fn measure(&self, world: &World) -> Result<Option<Angle<F>>, PlanError> {
        Ok(match self.corner(world)? {
            Some(corner) if !degenerate(&corner) => Some(Angle::new(
                (corner.left.angle() - corner.right.angle()).normalize(),
                SpaceName::MODEL,
            )),
            _ => None,
        })
    }

    /// Adopt the measured angle as the target. An incomplete corner keeps the
    /// target it has.
    fn retarget(&mut self, world: &World) -> Result<(), PlanError> {
        if let Some(angle) = self.measure(world)? {
            self.target = angle;
        }
        Ok(())
    }
}

fn degenerate<F: Float>(corner: &Corner<F>) -> bool {
    let eps = F::from_f32(1e-20);
    corner.left.length_sq().is_near_zero(eps) || corner.right.length_sq().is_near_zero(eps)
}

impl<F: Float> Constraint for AngleConstraint<F> {
    type Scalar = F;
    const KIND: ConstraintKind = ConstraintKind::Angle;

    fn state(&self) -> &ConstraintState<F> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ConstraintState<F> {
        &mut self.state
    }

    fn on_enable(&mut self, world: &World, _entity: EntityId, _cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        self.retarget(world)
    }

    fn track(&mut self, world: &World, _entity: EntityId, _cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        self.retarget(world)
    }

    fn enforce(&self, world: &mut World, _entity: EntityId, cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        let corner = match self.corner(world)? {
            Some(corner) if !degenerate(&corner) => corner,
            _ => return Ok(()),
        };
        let current = (corner.left.angle() - corner.right.angle()).normalize();
        let target = self.target.get(cx.spaces, SpaceName::MODEL).normalize();
        let turn = (target.0 - current.0) * self.state.spring_constant(cx.config) * F::half();

        let tension = self.state.tension();
        let delta_left = corner.left.rotate(Radians(turn)) - corner.left;
        let delta_right = corner.right.rotate(Radians(-turn)) - corner.right;
        if let (Some(left), Some(right)) = (self.left, self.right) {
            world.try_get_mut::<PhysNode<F>>(left)?.add_model_force(delta_left.scale(tension));
            world.try_get_mut::<PhysNode<F>>(right)?.add_model_force(delta_right.scale(tension));
        }
        Ok(())
    }
}

// --------------------------------------------------------------------------
// Axis alignment
// --------------------------------------------------------------------------

/// Rotates a wall to lie along an axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisConstraint<F: Float> {
    pub state: ConstraintState<F>,
    axis: Vector<F>,
}

impl<F: Float> Component for AxisConstraint<F> {}

impl<F: Float> AxisConstraint<F> {
    /// Disabled, aligned with the screen's horizontal.
    pub fn new() -> Self {
        AxisConstraint {
            state: ConstraintState::new(),
            axis: Vector::of(Vec2::unit_x(), SpaceName::SCREEN),
        }
    }

    pub fn axis(&self) -> Vector<F> {
        self.axis
    }

    pub fn set_axis(&mut self, axis: Vector<F>) {
        self.axis = axis;
    }

    /// Whether the axis is closer to the screen's vertical than its horizontal.
    pub fn is_vertical(&self, spaces: &SpaceRegistry<F>) -> bool {
        let screen = self.axis.get(spaces, SpaceName::SCREEN);
        screen.x.abs() < screen.y.abs()
    }

    pub fn set_vertical(&mut self, vertical: bool) {
        let axis = if vertical { Vec2::unit_y() } else { Vec2::unit_x() };
        self.axis = Vector::of(axis, SpaceName::SCREEN);
    }
}

impl<F: Float> Default for AxisConstraint<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Constraint for AxisConstraint<F> {
    type Scalar = F;
    const KIND: ConstraintKind = ConstraintKind::Axis;

    fn state(&self) -> &ConstraintState<F> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ConstraintState<F> {
        &mut self.state
    }

    /// Snap to whichever screen axis the wall is already closest to.
    fn on_enable(&mut self, world: &World, entity: EntityId, cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        let (_, edge) = wall_edge::<F>(world, entity)?;
        let tangent = edge.tagged_tangent();
        let x = Vector::of(Vec2::unit_x(), SpaceName::SCREEN).to(cx.spaces, tangent.space());
        let y = Vector::of(Vec2::unit_y(), SpaceName::SCREEN).to(cx.spaces, tangent.space());
        self.axis = if tangent.dot(cx.spaces, &x).abs() > tangent.dot(cx.spaces, &y).abs() { x } else { y };
        Ok(())
    }

    fn enforce(&self, world: &mut World, entity: EntityId, cx: &EnforceContext<'_, F>) -> Result<(), PlanError> {
        let (phys, edge) = wall_edge::<F>(world, entity)?;
        let tangent = edge.tangent();
        let axis = self.axis.get(cx.spaces, SpaceName::MODEL).normalize();
        let flip = if axis.dot(tangent) > (-axis).dot(tangent) { F::one() } else { -F::one() };

        let center = edge.midpoint();
        let half = edge.length() * F::half();
        let target_src = center.splus(half, axis.scale(-flip));
        let target_dst = center.splus(half, axis.scale(flip));

        // Only the normal component rotates the wall without stretching it.
        let normal = edge.normal();
        let turn = |delta: Vec2<F>| delta.on_axis(normal).normalize().scale(delta.length());
        let delta_src = turn(edge.src().to(target_src));
        let delta_dst = turn(edge.dst().to(target_dst));

        let k = self.state.spring_constant(cx.config) * F::half();
        world.try_get_mut::<PhysNode<F>>(phys.src)?.add_model_force(delta_src.scale(k));
        world.try_get_mut::<PhysNode<F>>(phys.dst)?.add_model_force(delta_dst.scale(k));
        Ok(())
    }
}

// --------------------------------------------------------------------------
// Status and labels
// --------------------------------------------------------------------------

/// How a measured value compares with its constraint's target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConstraintStatus<F> {
    Satisfied,
    /// The value exceeds the target by this much.
    Over(F),
    /// The value falls short of the target by this much.
    Under(F),
}

impl<F: Float> ConstraintStatus<F> {
    /// Classify `current - target`.
    pub fn from_delta(delta: F, tolerance: F) -> Self {
        if delta.abs() <= tolerance {
            ConstraintStatus::Satisfied
        } else if delta > F::zero() {
            ConstraintStatus::Over(delta)
        } else {
            ConstraintStatus::Under(-delta)
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(self, ConstraintStatus::Satisfied)
    }
}

/// `"12.00"`, or `"12.50 (+0.50)"` when a target is set and missed.
pub fn length_label<F: Float>(current: F, target: Option<F>, tolerance: F) -> String {
    let delta = target.map(|t| current - t).filter(|d| d.abs() > tolerance);
    match delta {
        Some(delta) => format!("{:.2} ({:+.2})", current.to_f64(), delta.to_f64()),
        None => format!("{:.2}", current.to_f64()),
    }
}

/// `"90°"`, or `"92° (+2°)"` when a target is set and missed by a whole degree.
pub fn angle_label<F: Float>(current: Radians<F>, target: Option<Radians<F>>) -> String {
    let degrees = current.to_degrees().round();
    let delta = target
        .map(|t| t.shortest_delta(current).to_degrees().round())
        .filter(|d| !d.is_near_zero(F::from_f32(0.5)));
    match delta {
        Some(delta) => format!("{:.0}° ({:+.0}°)", degrees.to_f64(), delta.to_f64()),
        None => format!("{:.0}°", degrees.to_f64()),
    }
}
