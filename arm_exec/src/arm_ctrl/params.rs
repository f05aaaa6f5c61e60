//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::ArmSide;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
///
/// All positions are normalised potentiometer readings in `[0, 1]`. The
/// potentiometer is rigged so that positive drive moves the reading
/// downwards: `1.0` is the arm fully lowered on side A, `0.0` fully lowered
/// on side B.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- TIMING ----

    /// Period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Maximum number of cycles an automatic move may run for before it is
    /// declared failed.
    pub move_timeout_cycles: u64,

    // ---- SIDE RESOLUTION ----

    /// Readings above this threshold belong to side A, readings below it to
    /// side B.
    pub side_threshold: f64,

    // ---- SENSOR PLAUSIBILITY ----

    /// Lowest reading considered plausible. Anything below this is a sensor
    /// fault.
    pub min_plausible_reading: f64,

    /// Highest reading considered plausible. Anything above this is a sensor
    /// fault.
    pub max_plausible_reading: f64,

    // ---- POSITION LOOP ----

    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Maximum magnitude of the drive demand output by the loop.
    pub max_drive: f64,

    /// Maximum position error for the loop to be considered on target.
    pub on_target_tolerance: f64,

    /// Maximum correction magnitude for the loop to be considered on target,
    /// which prevents declaring arrival while still actively correcting.
    pub on_target_max_correction: f64,

    // ---- SIDES ----

    /// Limits and named positions for side A
    pub side_a: SideParams,

    /// Limits and named positions for side B
    pub side_b: SideParams,
}

/// Per-side clamp limits and named target positions.
#[derive(Debug, Clone, Deserialize)]
pub struct SideParams {
    /// Reading at the side's lowered hard stop. Drive towards this stop is
    /// forced to zero once the reading reaches it.
    pub lower_limit: f64,

    /// Reading at the limit of travel away from the side's rest position.
    /// Drive past this limit is forced to zero once the reading reaches it.
    pub upper_limit: f64,

    /// Target used by a flip move started from this side. Must lie beyond
    /// the side threshold (i.e. belong to the opposite side) and within this
    /// side's travel so the move can complete and flip the side state.
    pub flip_target: f64,

    /// Target for the scoring position on this side.
    pub scoring_target: f64,

    /// Target for the gamepiece pickup position on this side.
    pub pickup_target: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Get the limits and named positions for the given side.
    pub fn side(&self, side: ArmSide) -> &SideParams {
        match side {
            ArmSide::SideA => &self.side_a,
            ArmSide::SideB => &self.side_b,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Params {
            cycle_period_s: 0.02,
            move_timeout_cycles: 500,
            side_threshold: 0.5,
            min_plausible_reading: -0.05,
            max_plausible_reading: 1.05,
            k_p: 8.0,
            k_i: 0.05,
            k_d: 0.0,
            max_drive: 1.0,
            on_target_tolerance: 0.01,
            on_target_max_correction: 0.05,
            side_a: SideParams {
                lower_limit: 0.94,
                upper_limit: 0.30,
                flip_target: 0.35,
                scoring_target: 0.75,
                pickup_target: 0.92,
            },
            side_b: SideParams {
                lower_limit: 0.099,
                upper_limit: 0.70,
                flip_target: 0.65,
                scoring_target: 0.25,
                pickup_target: 0.12,
            },
        }
    }
}
