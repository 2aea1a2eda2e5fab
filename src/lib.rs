//! Rigid-body rotation algebra.
//!
//! A [`Rotation`] is an orientation in three-dimensional space stored as a
//! unit quaternion. It converts to and from raw quaternion components,
//! direction cosine matrices and angles of any of the twelve intrinsic Euler
//! sequences, and supports composition, inversion, vector rotation and
//! angular distance.

#[macro_use]
mod macros;

pub mod angle;
pub mod config;
pub mod dcm;
pub mod error;
pub mod euler;
pub mod quaternion;
pub mod rotation;

pub use angle::{Angle, AngleUnit, Radians};
pub use config::RotationConfig;
pub use error::{Result, RotationError};
pub use euler::{Axis, EulerAngles, EulerSequence};
pub use rotation::{Applied, Operand, Rotation, ScalarPosition};
