//! # Module controllers
//!
//! This module provides the closed loop controllers and feedforward models
//! used by each swerve module, all of which run at a fixed cycle period.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::profile::{self, Constraints, ProfileState};
use util::maths::{get_ang_dist, sign};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Time between calls to `calculate`
    period_s: f64,

    /// If true the input is an angle in radians and the error is the
    /// shortest signed distance around the circle.
    continuous_angle: bool,

    /// Most recent setpoint
    setpoint: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

/// A PID controller whose setpoint follows a trapezoidal profile towards
/// the goal rather than jumping to it.
#[derive(Debug, Serialize, Clone)]
pub struct ProfiledPidController {
    pid: PidController,
    constraints: Constraints,
    goal: ProfileState,
    setpoint: ProfileState,
}

/// Feedforward model of a permanent magnet DC motor:
/// `volts = k_s * sign(v) + k_v * v + k_a * a`.
#[derive(Debug, Serialize, Clone, Copy)]
pub struct SimpleMotorFeedforward {
    /// Static friction gain, volts
    pub k_s: f64,

    /// Velocity gain, volts per unit/second
    pub k_v: f64,

    /// Acceleration gain, volts per unit/second^2
    pub k_a: f64,
}

/// Differentiates successive position samples into a rate.
#[derive(Debug, Serialize, Clone, Default)]
pub struct Differentiator {
    /// Last (position, time in seconds) sample
    last: Option<(f64, f64)>,

    /// Last computed rate
    rate: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains, called once every
    /// `period_s` seconds.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, period_s: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            period_s,
            continuous_angle: false,
            setpoint: 0f64,
            prev_error: None,
            integral: 0f64
        }
    }

    /// Treat the input as an angle that wraps between -pi and pi.
    pub fn enable_continuous_angle(&mut self) {
        self.continuous_angle = true;
    }

    /// Whether the input is treated as a wrapping angle.
    pub fn is_continuous_angle(&self) -> bool {
        self.continuous_angle
    }

    /// The most recent setpoint.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// The error computed on the most recent call to `calculate`.
    pub fn error(&self) -> f64 {
        self.prev_error.unwrap_or(0f64)
    }

    /// Compute the error between a measurement and a setpoint, accounting
    /// for angle wrapping if enabled.
    pub fn calc_error(&self, measurement: f64, setpoint: f64) -> f64 {
        if self.continuous_angle {
            get_ang_dist(measurement, setpoint)
        }
        else {
            setpoint - measurement
        }
    }

    /// Get the output of the controller for the given measurement and
    /// setpoint.
    pub fn calculate(&mut self, measurement: f64, setpoint: f64) -> f64 {
        self.setpoint = setpoint;
        let error = self.calc_error(measurement, setpoint);

        self.integral += error * self.period_s;

        // No derivative on the first call after a reset, it would only be a
        // spike.
        let deriv = match self.prev_error {
            Some(e) => (error - e) / self.period_s,
            None => 0f64
        };

        self.prev_error = Some(error);

        self.k_p * error
            + self.k_i * self.integral
            + self.k_d * deriv
    }

    /// Clear the integral and derivative history.
    pub fn reset(&mut self) {
        self.prev_error = None;
        self.integral = 0f64;
    }
}

impl ProfiledPidController {

    pub fn new(pid: PidController, constraints: Constraints) -> Self {
        Self {
            pid,
            constraints,
            goal: ProfileState::default(),
            setpoint: ProfileState::default(),
        }
    }

    /// The current profile setpoint.
    pub fn setpoint(&self) -> ProfileState {
        self.setpoint
    }

    /// The current goal.
    pub fn goal(&self) -> ProfileState {
        self.goal
    }

    /// Advance the profile by one period towards `goal_pos` and return the
    /// controller output for the new setpoint.
    pub fn calculate(&mut self, measurement: f64, goal_pos: f64) -> f64 {
        self.goal = ProfileState { pos: goal_pos, vel: 0f64 };

        // Express the goal and setpoint as the nearest equivalent angles to
        // the measurement so the profile takes the short way round.
        if self.pid.is_continuous_angle() {
            self.goal.pos = measurement + get_ang_dist(measurement, self.goal.pos);
            self.setpoint.pos = measurement + get_ang_dist(measurement, self.setpoint.pos);
        }

        self.setpoint = profile::calculate(
            &self.constraints,
            self.setpoint,
            self.goal,
            self.pid.period_s
        );

        self.pid.calculate(measurement, self.setpoint.pos)
    }

    /// Restart the profile from a stationary measurement.
    pub fn reset(&mut self, measurement: f64) {
        self.pid.reset();
        self.setpoint = ProfileState { pos: measurement, vel: 0f64 };
        self.goal = self.setpoint;
    }
}

impl SimpleMotorFeedforward {

    pub fn new(k_s: f64, k_v: f64, k_a: f64) -> Self {
        Self { k_s, k_v, k_a }
    }

    /// Voltage required to hold `velocity` while accelerating at
    /// `acceleration`.
    pub fn calculate(&self, velocity: f64, acceleration: f64) -> f64 {
        self.k_s * sign(velocity)
            + self.k_v * velocity
            + self.k_a * acceleration
    }
}

impl Differentiator {

    /// Add a position sample taken at `time_s` and return the rate since the
    /// previous sample.
    ///
    /// The first sample after a reset gives a rate of zero. A sample with no
    /// time elapsed keeps the previous rate.
    pub fn update(&mut self, position: f64, time_s: f64) -> f64 {
        if let Some((p0, t0)) = self.last {
            let dt = time_s - t0;
            if dt > 0f64 {
                self.rate = (position - p0) / dt;
            }
        }

        self.last = Some((position, time_s));
        self.rate
    }

    /// Last computed rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.rate = 0f64;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pid_proportional() {
        let mut pid = PidController::new(2.0, 0.0, 0.0, 0.02);
        assert!((pid.calculate(1.0, 1.5) - 1.0).abs() < 1e-12);
        assert!((pid.error() - 0.5).abs() < 1e-12);
        assert_eq!(pid.setpoint(), 1.5);
    }

    #[test]
    fn test_pid_integral_derivative() {
        let mut pid = PidController::new(0.0, 1.0, 0.0, 0.5);
        pid.calculate(0.0, 1.0);
        assert!((pid.calculate(0.0, 1.0) - 1.0).abs() < 1e-12);

        let mut pid = PidController::new(0.0, 0.0, 1.0, 0.5);
        assert_eq!(pid.calculate(0.0, 1.0), 0.0);
        assert!((pid.calculate(0.0, 2.0) - 2.0).abs() < 1e-12);

        pid.reset();
        assert_eq!(pid.calculate(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_pid_continuous_error() {
        let mut pid = PidController::new(1.0, 0.0, 0.0, 0.02);
        pid.enable_continuous_angle();

        let out = pid.calculate((-179f64).to_radians(), 179f64.to_radians());
        assert!((out.abs() - 2f64.to_radians()).abs() < 1e-9);
        assert!(out < 0.0);

        // Without wrapping the error would be 358 degrees
        let mut pid = PidController::new(1.0, 0.0, 0.0, 0.02);
        let out = pid.calculate((-179f64).to_radians(), 179f64.to_radians());
        assert!((out - 358f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_profiled_takes_short_way() {
        let mut pid = PidController::new(3.0, 0.0, 0.0, 0.02);
        pid.enable_continuous_angle();
        let mut ctrl = ProfiledPidController::new(pid, Constraints {
            max_vel: 10.0,
            max_accel: 100.0,
        });

        let meas = (-179f64).to_radians();
        ctrl.reset(meas);
        let out = ctrl.calculate(meas, 179f64.to_radians());

        // Setpoint moved in the negative direction, through -pi, by no more
        // than the 2 degrees needed.
        assert!(out < 0.0);
        let moved = ctrl.setpoint().pos - meas;
        assert!(moved < 0.0);
        assert!(moved.abs() <= 2f64.to_radians() + 1e-9);
    }

    #[test]
    fn test_profiled_limits_step() {
        let pid = PidController::new(1.0, 0.0, 0.0, 0.02);
        let mut ctrl = ProfiledPidController::new(pid, Constraints {
            max_vel: 1.0,
            max_accel: 2.0,
        });
        ctrl.reset(0.0);

        // Setpoint only advances by a * dt^2 / 2 on the first cycle
        let out = ctrl.calculate(0.0, 10.0);
        assert!((ctrl.setpoint().pos - 0.0004).abs() < 1e-12);
        assert!((out - 0.0004).abs() < 1e-12);
        assert_eq!(ctrl.goal().pos, 10.0);
    }

    #[test]
    fn test_feedforward() {
        let ff = SimpleMotorFeedforward::new(0.055, 2.6826, 0.1188);

        assert_eq!(ff.calculate(0.0, 0.0), 0.0);
        assert!((ff.calculate(1.0, 0.0) - (0.055 + 2.6826)).abs() < 1e-12);
        assert!((ff.calculate(-2.0, 0.0) - (-0.055 - 2.0 * 2.6826)).abs() < 1e-12);
        assert!((ff.calculate(0.0, 1.0) - 0.1188).abs() < 1e-12);
    }

    #[test]
    fn test_differentiator() {
        let mut diff = Differentiator::default();

        assert_eq!(diff.update(1.0, 0.0), 0.0);
        assert!((diff.update(1.1, 0.02) - 5.0).abs() < 1e-9);
        assert!((diff.update(1.1, 0.04)).abs() < 1e-9);

        // No time elapsed, keep the previous rate
        diff.update(2.0, 0.04);
        assert!(diff.rate().abs() < 1e-9);

        diff.reset();
        assert_eq!(diff.update(5.0, 1.0), 0.0);
    }
}
