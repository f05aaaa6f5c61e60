//! # Position loop PID controller
//!
//! This module provides the PID controller used by ArmCtrl, running at a
//! fixed cycle period so the delta-time is supplied explicitly rather than
//! measured. This keeps the loop deterministic and testable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone, Default)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Derivative gain
    k_d: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            integral: 0f64,
            prev_error: None
        }
    }

    /// Clear the integral and derivative accumulations.
    ///
    /// Must be called at the start of every new move so that windup from a
    /// previous setpoint cannot bias the new one.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }

    /// Get the value of the controller for the given error and timestep.
    pub fn get(&mut self, error: f64, dt_s: f64) -> f64 {
        // Accumulate the integral term.
        self.integral += error * dt_s;

        // Calculate the derivative.
        //
        // On the first call after a reset there is no previous error, so we
        // assume no derivative. The other option is to derive against zero
        // and that produces a large spike compared to normal operation, so
        // we don't do this.
        let deriv = match self.prev_error {
            Some(e) => (error - e) / dt_s,
            None => 0f64
        };

        // Calculate the output
        let out =
            self.k_p * error
            + self.k_i * self.integral
            + self.k_d * deriv;

        // Remember the previous error
        self.prev_error = Some(error);

        // Return
        out
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_proportional() {
        let mut pid = PidController::new(2.0, 0.0, 0.0);

        assert_eq!(pid.get(0.5, 0.02), 1.0);
        assert_eq!(pid.get(-0.25, 0.02), -0.5);
        assert_eq!(pid.get(0.0, 0.02), 0.0);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);

        // Constant error of 1.0 integrates linearly with time
        assert!((pid.get(1.0, 0.5) - 0.5).abs() < 1e-12);
        assert!((pid.get(1.0, 0.5) - 1.0).abs() < 1e-12);
        assert!((pid.get(1.0, 0.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_no_spike_after_reset() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);

        // First sample has no previous error, so no derivative term
        assert_eq!(pid.get(1.0, 0.1), 0.0);

        // Second sample sees the error change
        assert!((pid.get(2.0, 0.1) - 10.0).abs() < 1e-12);

        // After a reset the derivative must not spike
        pid.reset();
        assert_eq!(pid.get(5.0, 0.1), 0.0);
    }

    #[test]
    fn test_reset_clears_integral() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);

        pid.get(1.0, 1.0);
        pid.get(1.0, 1.0);
        pid.reset();

        // Integral starts from zero again
        assert!((pid.get(1.0, 0.5) - 0.5).abs() < 1e-12);
    }
}
