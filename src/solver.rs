//! Per-frame systems: node kinematics and priority-ordered constraint enforcement.

use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::config::SolverConfig;
use crate::constraint::{
    AngleConstraint, AxisConstraint, Constraint, ConstraintKind, EnforceContext, FixedConstraint,
    LengthConstraint, MinLengthConstraint,
};
use crate::ecs::{EntityId, World};
use crate::float::Float;
use crate::node::PhysNode;
use crate::observer::FrameObserver;
use crate::space::SpaceRegistry;
use crate::vec::{Point2, Vec2};

/// What the host tells the solver about the current frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameInput<F: Float> {
    /// Seconds since the previous frame.
    pub dt: F,
    pub kinematics_enabled: bool,
    /// Whether the user is dragging something.
    pub dragging: bool,
}

impl<F: Float> FrameInput<F> {
    pub fn new(dt: F) -> Self {
        FrameInput {
            dt,
            kinematics_enabled: true,
            dragging: false,
        }
    }

    /// Motion is frozen while kinematics are paused or a drag is in progress.
    pub fn is_frozen(&self) -> bool {
        !self.kinematics_enabled || self.dragging
    }
}

impl<F: Float> Default for FrameInput<F> {
    fn default() -> Self {
        Self::new(F::from_f32(1.0 / 60.0))
    }
}

/// Integrate every node, then remove the mean displacement.
///
/// While motion is frozen, pending forces are dropped and nothing moves.
pub fn kinematics_system<F: Float>(world: &mut World, observer: &mut dyn FrameObserver) {
    let frame = world.resource::<FrameInput<F>>().copied().unwrap_or_default();
    let config = world.resource::<SolverConfig<F>>().copied().unwrap_or_default();

    if frame.is_frozen() {
        for (_, node) in world.components_mut::<PhysNode<F>>() {
            node.clear_force();
        }
        return;
    }

    let mut total = Vec2::zero();
    let mut count = 0usize;
    let mut weight = F::zero();
    for (_, node) in world.components_mut::<PhysNode<F>>() {
        let before: Point2<F> = node.model_pos();
        node.update(frame.dt, &config);
        total = total + before.to(node.model_pos());
        count += 1;
        weight = weight + F::one();
    }
    observer.on_integrate(count);

    if !config.drift_correction || count == 0 {
        return;
    }
    let drift = total.scale(F::one() / weight);
    if drift == Vec2::zero() {
        return;
    }
    for (_, node) in world.components_mut::<PhysNode<F>>() {
        let pos = node.model_pos();
        node.set_model_pos(pos - drift);
    }
    trace!(dx = drift.x.to_f64(), dy = drift.y.to_f64(), "drift corrected");
    observer.on_drift_corrected(drift.length().to_f64());
}

#[derive(Copy, Clone, Debug)]
struct Scheduled {
    priority: i32,
    seq: u64,
    kind: ConstraintKind,
    entity: EntityId,
}

fn collect<C: Constraint>(world: &World, frozen: bool, out: &mut Vec<Scheduled>) {
    for (seq, entity, constraint) in world.sequenced::<C>() {
        let state = constraint.state();
        if !state.enabled() || (frozen && state.is_kinematic()) {
            continue;
        }
        out.push(Scheduled {
            priority: state.priority,
            seq,
            kind: C::KIND,
            entity,
        });
    }
}

/// Let every disabled constraint of type `C` re-read its target from the geometry.
fn track_disabled<C: Constraint>(world: &mut World, cx: &EnforceContext<'_, C::Scalar>) {
    let disabled: Vec<EntityId> = world
        .components::<C>()
        .filter(|(_, c)| !c.state().enabled())
        .map(|(id, _)| id)
        .collect();
    for entity in disabled {
        let Some(mut constraint) = world.get::<C>(entity).cloned() else {
            continue;
        };
        if let Err(err) = constraint.track(world, entity, cx) {
            debug!(%entity, kind = %C::KIND, %err, "constraint not tracked");
            continue;
        }
        if let Some(slot) = world.get_mut::<C>(entity) {
            *slot = constraint;
        }
    }
}

fn enforce_one<C: Constraint>(world: &mut World, entity: EntityId, cx: &EnforceContext<'_, C::Scalar>) {
    let Some(constraint) = world.get::<C>(entity).cloned() else {
        return;
    };
    if let Err(err) = constraint.enforce(world, entity, cx) {
        debug!(%entity, kind = %C::KIND, %err, "constraint skipped");
    }
}

/// Enforce every enabled constraint, ascending by priority.
///
/// Ties keep registration order. Since later writes win, the highest priority
/// constraint decides where the plan goes next.
pub fn constraint_system<F: Float>(world: &mut World, observer: &mut dyn FrameObserver) {
    let frame = world.resource::<FrameInput<F>>().copied().unwrap_or_default();
    let config = world.resource::<SolverConfig<F>>().copied().unwrap_or_default();
    let spaces = world.resource::<SpaceRegistry<F>>().cloned().unwrap_or_default();
    let cx = EnforceContext { spaces: &spaces, config: &config };

    track_disabled::<LengthConstraint<F>>(world, &cx);
    track_disabled::<AngleConstraint<F>>(world, &cx);

    let frozen = frame.is_frozen();
    let mut scheduled = Vec::new();
    collect::<FixedConstraint<F>>(world, frozen, &mut scheduled);
    collect::<MinLengthConstraint<F>>(world, frozen, &mut scheduled);
    collect::<LengthConstraint<F>>(world, frozen, &mut scheduled);
    collect::<AngleConstraint<F>>(world, frozen, &mut scheduled);
    collect::<AxisConstraint<F>>(world, frozen, &mut scheduled);
    scheduled.sort_by_key(|s| (s.priority, s.seq));

    for s in &scheduled {
        match s.kind {
            ConstraintKind::Fixed => enforce_one::<FixedConstraint<F>>(world, s.entity, &cx),
            ConstraintKind::MinLength => enforce_one::<MinLengthConstraint<F>>(world, s.entity, &cx),
            ConstraintKind::Length => enforce_one::<LengthConstraint<F>>(world, s.entity, &cx),
            ConstraintKind::Angle => enforce_one::<AngleConstraint<F>>(world, s.entity, &cx),
            ConstraintKind::Axis => enforce_one::<AxisConstraint<F>>(world, s.entity, &cx),
        }
        trace!(entity = %s.entity, kind = %s.kind, priority = s.priority, "constraint applied");
        observer.on_constraint_applied(s.kind, s.entity, s.priority);
    }
}

/// Install the default resources and both systems, kinematics first.
pub fn install<F: Float>(world: &mut World, config: SolverConfig<F>) {
    world.insert_resource(config);
    world.insert_resource(FrameInput::<F>::default());
    if world.resource::<SpaceRegistry<F>>().is_none() {
        world.insert_resource(SpaceRegistry::<F>::new());
    }
    world.register_system(kinematics_system::<F>);
    world.register_system(constraint_system::<F>);
}
