//! Frame observer trait for monitoring solver progress.

use crate::constraint::ConstraintKind;
use crate::ecs::EntityId;

/// Trait for observing solver frames.
///
/// Implement this trait to monitor solver progress (e.g., for debugging,
/// visualization, or performance profiling). All methods have default
/// no-op implementations.
pub trait FrameObserver {
    /// Called after all nodes have been integrated.
    fn on_integrate(&mut self, _nodes: usize) {}

    /// Called when the mean node displacement was removed from every node.
    fn on_drift_corrected(&mut self, _drift: f64) {}

    /// Called after a single constraint has been enforced.
    fn on_constraint_applied(&mut self, _kind: ConstraintKind, _entity: EntityId, _priority: i32) {}

    /// Called when every system has run for the frame.
    fn on_frame_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpFrameObserver;

impl FrameObserver for NoOpFrameObserver {}
