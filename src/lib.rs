//! Geometric constraint solving for interactive floor plans.
//!
//! `trammel` keeps the walls and corners of a 2D floor plan as point masses and
//! edges, and relaxes them frame by frame toward the locks a user has set: wall
//! lengths, corner angles, axis alignment and pinned positions. Constraints emit
//! spring forces, a small entity-component runtime schedules them by priority, and
//! explicit Euler integration with drag moves the nodes.
//!
//! # Features
//!
//! - **Coordinate spaces**: named model and screen frames with lazy conversion of
//!   tagged distances, positions, vectors and angles
//! - **Entity-component runtime**: ordered component tables, resources, systems
//! - **Five constraint kinds**: fixed position, minimum length, target length,
//!   target angle, axis alignment
//! - **Deterministic**: ordered storage, stable scheduling and `libm` math
//! - **Observable**: Monitor frames via the `FrameObserver` trait
//! - **`no_std` compatible**: Works in embedded and WASM environments

#![no_std]

extern crate alloc;

pub mod config;
pub mod constraint;
pub mod ecs;
pub mod edge;
pub mod error;
pub mod float;
pub mod frame;
pub mod node;
pub mod observer;
pub mod plan;
pub mod solver;
pub mod space;
pub mod spaced;
pub mod vec;

// Re-export primary API
pub use config::SolverConfig;
pub use constraint::{
    AngleConstraint, AxisConstraint, Constraint, ConstraintKind, ConstraintState, ConstraintStatus,
    FixedConstraint, LengthConstraint, MinLengthConstraint,
};
pub use ecs::{Component, EntityId, World};
pub use edge::{EdgeHit, MemoEdge, PhysEdge};
pub use error::PlanError;
pub use float::Float;
pub use frame::{Frame, Transform};
pub use node::PhysNode;
pub use observer::{FrameObserver, NoOpFrameObserver};
pub use plan::{FloorPlan, Room, Wall, WallJoint};
pub use solver::FrameInput;
pub use space::{Space, SpaceName, SpaceRegistry, Viewport};
pub use spaced::{Angle, Distance, Measure, Position, Spaced, Vector};
pub use vec::{Point2, Radians, Scalar, Vec2};
