//! Configuration of numerical tolerances.

use crate::error::{Result, RotationError};

/// Configuration parameters for validating rotation input and for deciding
/// when an Euler decomposition is singular.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct RotationConfig {
    /// Largest accepted absolute deviation of `mᵀm` from the identity and of
    /// `det(m)` from one when constructing a rotation from a matrix.
    pub matrix_tolerance: f64,
    /// Distance in radians of the middle Euler angle from its singular value
    /// (±π/2 for Tait-Bryan sequences, 0 or π for proper Euler sequences)
    /// within which the decomposition is treated as gimbal locked.
    pub gimbal_lock_threshold: f64,
    /// Smallest Euclidean norm a raw quaternion may have and still be
    /// normalized. The default, the smallest normal `f64`, rejects only the
    /// zero quaternion and subnormal inputs.
    pub min_quaternion_norm: f64,
}

impl RotationConfig {
    /// Checks that all tolerances are positive and finite.
    ///
    /// # Errors
    /// Returns [`RotationError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("matrix_tolerance", self.matrix_tolerance),
            ("gimbal_lock_threshold", self.gimbal_lock_threshold),
            ("min_quaternion_norm", self.min_quaternion_norm),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RotationError::invalid_argument(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            matrix_tolerance: 1e-6,
            gimbal_lock_threshold: 1e-7,
            min_quaternion_norm: f64::MIN_POSITIVE,
        }
    }
}
