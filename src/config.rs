//! Configuration types for the constraint solver.

use crate::float::Float;

/// Tuning for node integration and constraint enforcement.
///
/// # Builder Pattern
/// ```
/// use trammel::config::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::new()
///     .with_spring_scale(2.0)
///     .with_drift_correction(false)
///     .with_min_wall_length(5.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig<F: Float> {
    /// Below this force magnitude a node's velocity is zeroed. Default: 0.1.
    pub rest_force_threshold: F,
    /// Squared displacement below which a node is not moved. Default: 1e-12.
    pub displacement_epsilon: F,
    /// Spring constant per unit of tension. Default: 3.
    pub spring_scale: F,
    /// Minimum wall length in model units. Default: 3.
    pub min_wall_length: F,
    /// Subtract the mean node displacement after integrating. Default: true.
    pub drift_correction: bool,
    /// Frame time clamp. Defaults: 0.01 and 1.0 seconds.
    pub min_dt: F,
    pub max_dt: F,
    /// Mass and drag given to new nodes. Defaults: 1.0 and 0.5.
    pub default_mass: F,
    pub default_drag: F,
    /// Label and status tolerance, in model units or degrees. Default: 0.01.
    pub label_tolerance: F,
}

impl<F: Float> SolverConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        SolverConfig {
            rest_force_threshold: F::from_f32(0.1),
            displacement_epsilon: F::from_f32(1e-12),
            spring_scale: F::from_f32(3.0),
            min_wall_length: F::from_f32(3.0),
            drift_correction: true,
            min_dt: F::from_f32(0.01),
            max_dt: F::one(),
            default_mass: F::one(),
            default_drag: F::half(),
            label_tolerance: F::from_f32(0.01),
        }
    }

    pub fn with_rest_force_threshold(mut self, threshold: F) -> Self {
        self.rest_force_threshold = threshold;
        self
    }

    pub fn with_displacement_epsilon(mut self, epsilon: F) -> Self {
        self.displacement_epsilon = epsilon;
        self
    }

    pub fn with_spring_scale(mut self, scale: F) -> Self {
        self.spring_scale = scale;
        self
    }

    pub fn with_min_wall_length(mut self, length: F) -> Self {
        self.min_wall_length = length;
        self
    }

    pub fn with_drift_correction(mut self, enabled: bool) -> Self {
        self.drift_correction = enabled;
        self
    }

    /// Set the frame time clamp. A reversed range is swapped.
    pub fn with_dt_range(mut self, min_dt: F, max_dt: F) -> Self {
        self.min_dt = min_dt.min(max_dt);
        self.max_dt = max_dt.max(min_dt);
        self
    }

    pub fn with_default_mass(mut self, mass: F) -> Self {
        self.default_mass = mass;
        self
    }

    pub fn with_default_drag(mut self, drag: F) -> Self {
        self.default_drag = drag;
        self
    }

    pub fn with_label_tolerance(mut self, tolerance: F) -> Self {
        self.label_tolerance = tolerance;
        self
    }

    /// Clamp a host-supplied frame time into the configured range.
    pub fn clamp_dt(&self, dt: F) -> F {
        dt.clamp(self.min_dt, self.max_dt)
    }
}

impl<F: Float> Default for SolverConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}
