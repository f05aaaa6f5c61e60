//! # Safety clamp
//!
//! The clamp rewrites any requested drive demand based on the current sensed
//! position and the tracked side, so the arm can never be driven into its
//! hard stops. It is applied to every drive command issued to the flip
//! motor, whether it originates from manual jogging or from the position
//! loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{ArmSide, Params};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a requested drive demand against the side's travel limits.
///
/// Positive drive moves the reading downwards. Limits are evaluated
/// inclusively, so a reading exactly at a limit cannot be driven further
/// towards it but can still be driven away from it. The function is pure.
pub fn clamp_drive(
    requested: f64,
    reading: f64,
    side: ArmSide,
    params: &Params
) -> f64 {
    let mut allowed = requested;

    match side {
        ArmSide::SideA => {
            if allowed > 0.0 && reading <= params.side_a.upper_limit {
                allowed = 0.0;
            }
            if allowed < 0.0 && reading >= params.side_a.lower_limit {
                allowed = 0.0;
            }
        }
        ArmSide::SideB => {
            if allowed < 0.0 && reading >= params.side_b.upper_limit {
                allowed = 0.0;
            }
            if allowed > 0.0 && reading <= params.side_b.lower_limit {
                allowed = 0.0;
            }
        }
    }

    allowed
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_side_a_limits() {
        let params = Params::default();

        // At or beyond the upper limit positive drive is blocked, negative
        // (pulling back towards rest) passes unchanged
        assert_eq!(clamp_drive(0.5, 0.30, ArmSide::SideA, &params), 0.0);
        assert_eq!(clamp_drive(0.5, 0.25, ArmSide::SideA, &params), 0.0);
        assert_eq!(clamp_drive(-0.5, 0.30, ArmSide::SideA, &params), -0.5);

        // At or beyond the lower limit negative drive is blocked, positive
        // passes unchanged
        assert_eq!(clamp_drive(-0.5, 0.94, ArmSide::SideA, &params), 0.0);
        assert_eq!(clamp_drive(-0.5, 0.99, ArmSide::SideA, &params), 0.0);
        assert_eq!(clamp_drive(0.5, 0.94, ArmSide::SideA, &params), 0.5);

        // Mid travel everything passes
        assert_eq!(clamp_drive(0.7, 0.6, ArmSide::SideA, &params), 0.7);
        assert_eq!(clamp_drive(-0.7, 0.6, ArmSide::SideA, &params), -0.7);
    }

    #[test]
    fn test_side_b_limits() {
        let params = Params::default();

        // At or beyond the upper limit negative drive is blocked
        assert_eq!(clamp_drive(-0.5, 0.70, ArmSide::SideB, &params), 0.0);
        assert_eq!(clamp_drive(-0.5, 0.75, ArmSide::SideB, &params), 0.0);
        assert_eq!(clamp_drive(0.5, 0.70, ArmSide::SideB, &params), 0.5);

        // At or beyond the lower limit positive drive is blocked
        assert_eq!(clamp_drive(0.5, 0.099, ArmSide::SideB, &params), 0.0);
        assert_eq!(clamp_drive(0.5, 0.01, ArmSide::SideB, &params), 0.0);
        assert_eq!(clamp_drive(-0.5, 0.099, ArmSide::SideB, &params), -0.5);

        // Mid travel everything passes
        assert_eq!(clamp_drive(1.0, 0.4, ArmSide::SideB, &params), 1.0);
        assert_eq!(clamp_drive(-1.0, 0.4, ArmSide::SideB, &params), -1.0);
    }

    #[test]
    fn test_zero_drive_passes() {
        let params = Params::default();

        assert_eq!(clamp_drive(0.0, 0.30, ArmSide::SideA, &params), 0.0);
        assert_eq!(clamp_drive(0.0, 0.94, ArmSide::SideA, &params), 0.0);
    }

    #[test]
    fn test_pure() {
        let params = Params::default();

        // Calling twice with the same inputs yields the same output
        let first = clamp_drive(0.3, 0.5, ArmSide::SideA, &params);
        let second = clamp_drive(0.3, 0.5, ArmSide::SideA, &params);
        assert_eq!(first, second);
    }
}
