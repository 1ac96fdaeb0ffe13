#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! Only construction of a [`crate::DifferentialDrive`] can fail; every motion
//! computation afterwards is total.

use core::fmt;

/// Errors that can occur when configuring the drive geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for invalid agent width.
    /// This variant is returned when the wheel separation is not a positive finite number.
    InvalidAgentWidth(&'static str),
    /// Error for invalid maximal action distance.
    /// This variant is returned when the full-power travel distance is not a positive finite number.
    InvalidMaxActionDistance(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidAgentWidth(msg) => write!(f, "Invalid agent width: {}", msg),
            KinematicsError::InvalidMaxActionDistance(msg) => {
                write!(f, "Invalid max action distance: {}", msg)
            }
        }
    }
}

impl core::error::Error for KinematicsError {}
