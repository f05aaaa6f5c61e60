//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use super::{
    clamp_drive,
    ArmCtrlError, ArmCtrlInitError, ArmSide, Params, PidController};
use util::{maths, module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state.
///
/// Owns the position loop, the safety clamp limits and the side state
/// machine. The side is the only shared mutable piece of arm state and it is
/// mutated exclusively here, through [`ArmCtrl::complete_move`].
pub struct ArmCtrl {
    params: Params,

    /// The position loop controller
    pid: PidController,

    /// True when an automatic move is in progress
    enabled: bool,

    /// Target reading of the automatic move
    setpoint: f64,

    /// Error of the most recent cycle, `INFINITY` before the first cycle of
    /// a move so `on_target` cannot fire early
    last_error: f64,

    /// Correction output of the most recent cycle
    last_correction: f64,

    /// Current side, `None` until resolved from the sensor at startup
    side: Option<ArmSide>,

    report: StatusReport,
}

/// Input data to Arm control.
pub struct ArmInput {
    /// The current normalised potentiometer reading.
    pub reading: f64,

    /// The drive demand for this cycle.
    pub demand: ArmDemand,
}

/// The source of the drive demand for a cycle.
pub enum ArmDemand {
    /// A manual jog demand from the operator, in `[-1, 1]`.
    Manual(f64),

    /// Use the position loop's correction for the current setpoint.
    Auto,
}

/// Output demand from ArmCtrl that must be written to the flip motor.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct ArmOutput {
    /// Drive demand for the flip motor, in `[-1, 1]`.
    pub flip_drive: f64,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the clamp rewrote the requested drive this cycle.
    pub drive_clamped: bool,

    /// True if the position loop is enabled and on target.
    pub on_target: bool,

    /// True if the last cycle saw an implausible sensor reading.
    pub sensor_fault: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ArmCtrl {
    fn default() -> Self {
        Self::from_params(Params::default())
    }
}

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = ArmCtrlInitError;

    type InputData = ArmInput;
    type OutputData = ArmOutput;
    type StatusReport = StatusReport;
    type ProcError = ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        let params: Params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(ArmCtrlInitError::ParamLoadError(e))
        };

        validate_params(&params)?;

        *self = Self::from_params(params);

        Ok(())
    }

    /// Process one cycle of arm control.
    ///
    /// Takes the current reading and the drive demand for this cycle, and
    /// produces the clamped drive to write to the flip motor. The position
    /// loop only contributes when it has been enabled with
    /// [`ArmCtrl::enable`] and the demand is [`ArmDemand::Auto`].
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        // An implausible reading means we cannot trust anything computed
        // from it, so the loop disables itself rather than drive on bad
        // data.
        if input_data.reading < self.params.min_plausible_reading
            || input_data.reading > self.params.max_plausible_reading
        {
            self.disable();
            self.report.sensor_fault = true;
            return Err(ArmCtrlError::SensorFault(
                input_data.reading,
                self.params.min_plausible_reading,
                self.params.max_plausible_reading
            ));
        }

        let side = match self.side {
            Some(s) => s,
            None => return Err(ArmCtrlError::SideNotResolved)
        };

        // Get the requested drive for this cycle
        let requested = match input_data.demand {
            ArmDemand::Manual(d) => maths::clamp(
                &d, &-self.params.max_drive, &self.params.max_drive
            ),
            ArmDemand::Auto => {
                if self.enabled {
                    // Positive drive moves the reading downwards, so the
                    // error is reading - setpoint.
                    let error = input_data.reading - self.setpoint;
                    let correction = self.pid.get(
                        error, self.params.cycle_period_s
                    );

                    self.last_error = error;
                    self.last_correction = correction;

                    maths::clamp(
                        &correction,
                        &-self.params.max_drive,
                        &self.params.max_drive
                    )
                }
                else {
                    0.0
                }
            }
        };

        // Apply the safety clamp
        let allowed = clamp_drive(
            requested, input_data.reading, side, &self.params
        );

        self.report.drive_clamped = allowed != requested;
        self.report.on_target = self.on_target();

        Ok((ArmOutput { flip_drive: allowed }, self.report))
    }
}

impl ArmCtrl {
    /// Create a new instance with validated parameters.
    pub fn with_params(params: Params) -> Result<Self, ArmCtrlInitError> {
        validate_params(&params)?;
        Ok(Self::from_params(params))
    }

    /// Get the module's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Get the most recent status report.
    pub fn report(&self) -> StatusReport {
        self.report
    }

    /// Resolve the arm's side from the given reading.
    ///
    /// Called once at startup, before the first cycle.
    pub fn resolve_side(&mut self, reading: f64) {
        let side = ArmSide::from_reading(reading, self.params.side_threshold);
        info!("Arm side resolved to {} (reading {:.3})", side, reading);
        self.side = Some(side);
    }

    /// Get the arm's current side, or `None` if not yet resolved.
    pub fn side(&self) -> Option<ArmSide> {
        self.side
    }

    /// Begin an automatic move towards the given setpoint.
    ///
    /// Resets the loop's accumulators so windup from a previous move cannot
    /// bias this one.
    pub fn enable(&mut self, setpoint: f64) {
        self.pid.reset();
        self.setpoint = setpoint;
        self.last_error = std::f64::INFINITY;
        self.last_correction = std::f64::INFINITY;
        self.enabled = true;
    }

    /// Stop the automatic move.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// True if an automatic move is in progress.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True when the position loop has settled on its setpoint.
    ///
    /// Requires both a small error and a small correction magnitude, so
    /// arrival is not declared while the loop is still actively correcting.
    pub fn on_target(&self) -> bool {
        self.enabled
            && self.last_error.abs() <= self.params.on_target_tolerance
            && self.last_correction.abs()
                < self.params.on_target_max_correction
    }

    /// Record the completion of a move to the given target.
    ///
    /// If the target belongs to the opposite side the side state flips. This
    /// is the only place the side is ever mutated after startup; manual
    /// jogging never calls it.
    pub fn complete_move(&mut self, target: f64) {
        let side = match self.side {
            Some(s) => s,
            None => {
                warn!("Move completed before the arm side was resolved");
                return
            }
        };

        let target_side = ArmSide::from_reading(
            target, self.params.side_threshold
        );

        if target_side != side {
            info!("Arm side changed: {} -> {}", side, target_side);
            self.side = Some(target_side);
        }
    }

    /// Put the module into a safe state by stopping any automatic move.
    ///
    /// The status report is cleared so a stale fault flag cannot hold the
    /// system in safe mode once the sensor recovers.
    pub fn make_safe(&mut self) {
        self.disable();
        self.report = StatusReport::default();
    }

    /// Build an instance from parameters assumed valid.
    fn from_params(params: Params) -> Self {
        let pid = PidController::new(params.k_p, params.k_i, params.k_d);

        ArmCtrl {
            params,
            pid,
            enabled: false,
            setpoint: 0.0,
            last_error: std::f64::INFINITY,
            last_correction: std::f64::INFINITY,
            side: None,
            report: StatusReport::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that the limit configuration is usable.
///
/// A bad limit set cannot be recovered from at runtime, so any violation
/// here is a fatal init error.
fn validate_params(params: &Params) -> Result<(), ArmCtrlInitError> {
    let a = &params.side_a;
    let b = &params.side_b;

    // Side A readings sit above the threshold and decrease towards the
    // upper limit, side B is mirrored
    if a.upper_limit >= a.lower_limit {
        return Err(ArmCtrlInitError::InvalidLimits(format!(
            "side A upper limit ({}) must be below its lower limit ({})",
            a.upper_limit, a.lower_limit
        )));
    }
    if b.upper_limit <= b.lower_limit {
        return Err(ArmCtrlInitError::InvalidLimits(format!(
            "side B upper limit ({}) must be above its lower limit ({})",
            b.upper_limit, b.lower_limit
        )));
    }

    // Each side's travel must cross the threshold so a flip target on the
    // opposite side remains reachable
    if a.upper_limit >= params.side_threshold {
        return Err(ArmCtrlInitError::InvalidLimits(format!(
            "side A upper limit ({}) must be below the side threshold ({})",
            a.upper_limit, params.side_threshold
        )));
    }
    if b.upper_limit <= params.side_threshold {
        return Err(ArmCtrlInitError::InvalidLimits(format!(
            "side B upper limit ({}) must be above the side threshold ({})",
            b.upper_limit, params.side_threshold
        )));
    }

    // Flip targets must be within the side's own travel and belong to the
    // opposite side
    if a.flip_target < a.upper_limit || a.flip_target > params.side_threshold {
        return Err(ArmCtrlInitError::InvalidLimits(format!(
            "side A flip target ({}) must lie between the side A upper limit \
            and the side threshold",
            a.flip_target
        )));
    }
    if b.flip_target > b.upper_limit || b.flip_target < params.side_threshold {
        return Err(ArmCtrlInitError::InvalidLimits(format!(
            "side B flip target ({}) must lie between the side threshold and \
            the side B upper limit",
            b.flip_target
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
