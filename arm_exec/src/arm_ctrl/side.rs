//! Arm side definitions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One of the two valid operating sides of the flipper arm.
///
/// Each side has its own safe travel limits and named positions. The current
/// side is resolved once at startup from the potentiometer and afterwards
/// changes only when a completed move's target belongs to the opposite side,
/// never mid-move and never from manual jogging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArmSide {
    SideA,
    SideB,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmSide {
    /// Resolve the side a reading belongs to using the given threshold.
    pub fn from_reading(reading: f64, threshold: f64) -> Self {
        if reading > threshold {
            ArmSide::SideA
        }
        else {
            ArmSide::SideB
        }
    }

    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            ArmSide::SideA => ArmSide::SideB,
            ArmSide::SideB => ArmSide::SideA,
        }
    }
}

impl std::fmt::Display for ArmSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArmSide::SideA => write!(f, "SideA"),
            ArmSide::SideB => write!(f, "SideB"),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_reading() {
        assert_eq!(ArmSide::from_reading(0.8, 0.5), ArmSide::SideA);
        assert_eq!(ArmSide::from_reading(0.2, 0.5), ArmSide::SideB);

        // A reading exactly at the threshold belongs to side B
        assert_eq!(ArmSide::from_reading(0.5, 0.5), ArmSide::SideB);
    }

    #[test]
    fn test_opposite() {
        assert_eq!(ArmSide::SideA.opposite(), ArmSide::SideB);
        assert_eq!(ArmSide::SideB.opposite(), ArmSide::SideA);
    }
}
