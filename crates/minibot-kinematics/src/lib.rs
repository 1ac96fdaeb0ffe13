#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for differential-drive motion of a two-wheeled robot."]
#![doc = ""]
#![doc = "This crate converts a pair of motor powers into a displacement and heading"]
#![doc = "change in the robot's own frame, and rotates that displacement into the world frame."]

use core::f64::consts::PI;
use core::fmt;
use core::ops::{Add, Sub};
use libm::{cos, fabs, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// Default wheel separation. With this width, full opposite power on both
/// motors turns the robot by 90 degrees in exactly three steps.
pub const DEFAULT_AGENT_WIDTH: f64 = 2.4 / PI;

/// Default distance travelled in one step when both motors run at full power.
pub const DEFAULT_MAX_ACTION_DISTANCE: f64 = 0.2;

/// Tolerance selecting the straight-line and rotate-in-place branches of
/// [`DifferentialDrive::raw_move`]. The general arc formula is singular there.
pub const BRANCH_EPSILON: f64 = 1e-4;

/// Motor powers strictly above this magnitude discretize to full power.
pub const DISCRETIZE_THRESHOLD: f64 = 1.0 / 3.0;

/// A 2-D vector in world units.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    /// x component (east).
    pub x: f64,
    /// y component (north).
    pub y: f64,
}

impl Vector2 {
    /// The zero vector.
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    /// Construct a new vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    /// Rotate the vector counter-clockwise by `angle` radians.
    ///
    /// This is the standard rotation matrix `[[cos, -sin], [sin, cos]]`
    /// applied to the vector as a column.
    pub fn rotated(self, angle: f64) -> Self {
        let (s, c) = (sin(angle), cos(angle));
        Vector2 {
            x: c * self.x - s * self.y,
            y: s * self.x + c * self.y,
        }
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// A 2-D pose `(x, y, θ)` in tile units and radians.
///
/// θ = 0 faces north (increasing y, i.e. decreasing map row) and grows
/// counter-clockwise.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World-frame x position.
    pub x: f64,
    /// World-frame y position.
    pub y: f64,
    /// Heading (rad), normalized to `[-PI, PI)` by [`Pose::advanced`].
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position.
    /// * `y`: World-frame y position.
    /// * `theta`: Heading in radians.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// The position component as a vector.
    pub const fn position(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Same heading, different position.
    pub const fn with_position(&self, position: Vector2) -> Self {
        Pose::new(position.x, position.y, self.theta)
    }

    /// Apply a world-frame motion to this pose. The resulting heading is
    /// normalized to `[-PI, PI)`.
    pub fn advanced(&self, motion: Motion) -> Self {
        Pose {
            x: self.x + motion.displacement.x,
            y: self.y + motion.displacement.y,
            theta: Pose::normalize_angle(self.theta + motion.heading_delta),
        }
    }

    /// Normalize an angle to be within `[-PI, PI)`.
    ///
    /// Angles at `PI` will be normalized to `-PI`.
    pub fn normalize_angle(angle: f64) -> f64 {
        let a = angle % (2.0 * PI);
        if a >= PI {
            a - 2.0 * PI
        } else if a < -PI {
            a + 2.0 * PI
        } else {
            a
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2}, θ: {:.2} rad)", self.x, self.y, self.theta)
    }
}

/// Fractional power on the left and right motor, each within `[-1, 1]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorCommand {
    /// Left motor power.
    pub left: f64,
    /// Right motor power.
    pub right: f64,
}

impl MotorCommand {
    /// Construct a motor command, clamping both powers to `[-1, 1]`.
    pub fn new(left: f64, right: f64) -> Self {
        MotorCommand {
            left: left.clamp(-1.0, 1.0),
            right: right.clamp(-1.0, 1.0),
        }
    }

    /// Snap both powers to `{-1, 0, 1}` using thresholds at `±1/3`
    /// (bang-bang control).
    pub fn discretized(&self) -> Self {
        MotorCommand {
            left: discretize(self.left),
            right: discretize(self.right),
        }
    }
}

fn discretize(power: f64) -> f64 {
    if power > DISCRETIZE_THRESHOLD {
        1.0
    } else if power < -DISCRETIZE_THRESHOLD {
        -1.0
    } else {
        0.0
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(L: {:.2}, R: {:.2})", self.left, self.right)
    }
}

/// Displacement and heading change produced by one motor command.
///
/// Depending on where it came from, `displacement` is expressed either in the
/// robot's own frame ([`DifferentialDrive::raw_move`]) or in the world frame
/// ([`DifferentialDrive::absolute_displacement`]).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    /// Translation of the robot center.
    pub displacement: Vector2,
    /// Change of heading (rad).
    pub heading_delta: f64,
}

/// Differential-drive kinematics helper.
///
/// Encapsulates the geometry of the robot: the separation of its two wheels
/// and the distance a wheel travels in one step at full power.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    agent_width: f64,
    max_action_distance: f64,
}

impl DifferentialDrive {
    /// Construct a new differential-drive helper.
    ///
    /// # Arguments
    ///
    /// * `agent_width`: Separation of the two wheels.
    /// * `max_action_distance`: Distance travelled per step at full power.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidAgentWidth)` if `agent_width` is not positive and finite.
    /// Returns `Err(KinematicsError::InvalidMaxActionDistance)` if `max_action_distance` is not positive and finite.
    pub fn new(agent_width: f64, max_action_distance: f64) -> Result<Self, KinematicsError> {
        if !(agent_width > 0.0 && agent_width.is_finite()) {
            return Err(KinematicsError::InvalidAgentWidth("must be positive and finite"));
        }
        if !(max_action_distance > 0.0 && max_action_distance.is_finite()) {
            return Err(KinematicsError::InvalidMaxActionDistance(
                "must be positive and finite",
            ));
        }
        Ok(DifferentialDrive {
            agent_width,
            max_action_distance,
        })
    }

    /// Returns the wheel separation.
    pub fn agent_width(&self) -> f64 {
        self.agent_width
    }

    /// Returns the full-power travel distance per step.
    pub fn max_action_distance(&self) -> f64 {
        self.max_action_distance
    }

    /// Computes the displacement and heading change of one step in the
    /// robot's own frame, where `(0, 1)` points forward.
    ///
    /// Equal wheel travel is handled as an exact straight line and opposite
    /// wheel travel as an exact rotation in place; only the remaining cases
    /// go through the arc formula around the instantaneous center of rotation.
    pub fn raw_move(&self, command: MotorCommand) -> Motion {
        let al = command.left * self.max_action_distance;
        let ar = command.right * self.max_action_distance;
        let w = self.agent_width;

        if fabs(al - ar) < BRANCH_EPSILON {
            return Motion {
                displacement: Vector2::new(0.0, al),
                heading_delta: 0.0,
            };
        }
        if fabs(al + ar) < BRANCH_EPSILON {
            return Motion {
                displacement: Vector2::ZERO,
                heading_delta: 2.0 * ar / w,
            };
        }

        // Arc around a center on the wheel axis, `r` to the left.
        let r = w * (ar + al) / (2.0 * (ar - al));
        let alpha = (ar + al) / (2.0 * r);
        let center = Vector2::new(-r, 0.0);
        let displacement = (Vector2::ZERO - center).rotated(alpha) + center;

        Motion {
            displacement,
            heading_delta: alpha,
        }
    }

    /// Same as [`DifferentialDrive::raw_move`], with the displacement rotated
    /// into the world frame by the current heading `theta`.
    pub fn absolute_displacement(&self, theta: f64, command: MotorCommand) -> Motion {
        let relative = self.raw_move(command);
        Motion {
            displacement: relative.displacement.rotated(theta),
            heading_delta: relative.heading_delta,
        }
    }

    /// The pose reached from `current_pose` by `command`, ignoring obstacles.
    pub fn propose(&self, current_pose: Pose, command: MotorCommand) -> Pose {
        current_pose.advanced(self.absolute_displacement(current_pose.theta, command))
    }
}

impl Default for DifferentialDrive {
    fn default() -> Self {
        DifferentialDrive {
            agent_width: DEFAULT_AGENT_WIDTH,
            max_action_distance: DEFAULT_MAX_ACTION_DISTANCE,
        }
    }
}

impl fmt::Display for DifferentialDrive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DifferentialDrive (width: {:.3}, max step: {:.3})",
            self.agent_width, self.max_action_distance
        )
    }
}
