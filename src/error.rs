//! Errors for rotation construction and application.

use thiserror::Error;

/// Errors that can occur when constructing or applying a
/// [`Rotation`](crate::rotation::Rotation).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RotationError {
    /// Input of wrong arity, non-finite input, a zero-norm quaternion, a
    /// matrix that is not a proper rotation matrix or an invalid
    /// configuration value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operand for [`Rotation::apply`](crate::rotation::Rotation::apply)
    /// that is neither a rotation nor a 3-component vector.
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    /// A conversion would have to divide by a near-zero quantity.
    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}

pub type Result<T> = std::result::Result<T, RotationError>;

impl RotationError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn invalid_operand(message: impl Into<String>) -> Self {
        Self::InvalidOperand(message.into())
    }

    pub fn numeric_degeneracy(message: impl Into<String>) -> Self {
        Self::NumericDegeneracy(message.into())
    }
}

/// Returns an [`RotationError::InvalidArgument`] naming the first non-finite
/// value in `values`, if any.
pub(crate) fn ensure_finite(what: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => {
            log::debug!("Rejecting {what}: component {index} is {}", values[index]);
            Err(RotationError::invalid_argument(format!(
                "{what} component {index} is not finite ({})",
                values[index]
            )))
        }
        None => Ok(()),
    }
}

/// Returns an [`RotationError::InvalidArgument`] unless `values` holds exactly
/// `expected` elements.
pub(crate) fn ensure_arity(what: &str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        log::debug!(
            "Rejecting {what}: expected {expected} components, got {}",
            values.len()
        );
        Err(RotationError::invalid_argument(format!(
            "{what} must have exactly {expected} components, got {}",
            values.len()
        )))
    }
}
