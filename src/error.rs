//! Error types for floor-plan and solver operations.
//!
//! Degenerate geometry is never an error; these cover structural misuse and
//! out-of-range parameters.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur while building or editing a plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Mass must be positive and finite.
    #[error("mass must be positive and finite, got {0}")]
    InvalidMass(f64),
    /// Drag must be non-negative and finite.
    #[error("drag factor must be non-negative and finite, got {0}")]
    InvalidDrag(f64),
    /// Tension must be in [0, 1].
    #[error("tension must be in [0, 1], got {0}")]
    InvalidTension(f64),
    /// Frame axes are collinear, so the frame has no inverse.
    #[error("frame axes are degenerate (determinant {det})")]
    DegenerateFrame { det: f64 },
    /// The entity was never created or has been deleted.
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
    /// The entity exists but lacks a component the operation needs.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },
    /// A room must have at least 3 corners.
    #[error("a room needs at least 3 corners, got {0}")]
    InsufficientCorners(usize),
    /// A wall cannot start and end at the same joint.
    #[error("wall endpoints must differ (joint {0})")]
    SelfLoop(EntityId),
    /// The joint already has a wall on that side.
    #[error("joint {joint} is already joined to wall {wall}")]
    JointOccupied { joint: EntityId, wall: EntityId },
}

impl PlanError {
    pub(crate) fn missing<C>(entity: EntityId) -> Self {
        PlanError::MissingComponent {
            entity,
            component: short_type_name::<C>(),
        }
    }
}

/// `trammel::node::PhysNode<f64>` → `PhysNode`
fn short_type_name<C>() -> &'static str {
    let full = core::any::type_name::<C>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
