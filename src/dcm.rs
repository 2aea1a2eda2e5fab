//! Direction cosine matrices.
//!
//! The direction cosine matrix (DCM) of a rotation `q` is the matrix that
//! transforms the coordinates of a fixed vector from the reference frame into
//! the frame rotated by `q`. It is the transpose of the active rotation matrix
//! returned by [`rotation_matrix`], which rotates a vector within a single
//! frame the same way as [`Rotation::rotate`](crate::rotation::Rotation::rotate).

use crate::error::{Result, RotationError, ensure_finite};
use nalgebra::{Matrix3, Quaternion};

/// Computes the direction cosine matrix of the given unit quaternion.
pub fn direction_cosine_matrix(quaternion: &Quaternion<f64>) -> Matrix3<f64> {
    let d = quaternion.w;
    let a = quaternion.i;
    let b = quaternion.j;
    let c = quaternion.k;

    let dd = d * d;
    let aa = a * a;
    let bb = b * b;
    let cc = c * c;
    let ab = a * b;
    let ac = a * c;
    let ad = a * d;
    let bc = b * c;
    let bd = b * d;
    let cd = c * d;

    #[rustfmt::skip]
    let dcm = Matrix3::new(
        dd + aa - bb - cc, 2.0 * (cd + ab),   2.0 * (ac - bd),
        2.0 * (ab - cd),   dd - aa + bb - cc, 2.0 * (ad + bc),
        2.0 * (bd + ac),   2.0 * (bc - ad),   dd - aa - bb + cc,
    );
    dcm
}

/// Computes the active rotation matrix of the given unit quaternion, i.e. the
/// transpose of its [`direction_cosine_matrix`].
pub fn rotation_matrix(quaternion: &Quaternion<f64>) -> Matrix3<f64> {
    direction_cosine_matrix(quaternion).transpose()
}

/// Checks that the given matrix is a proper rotation matrix: all elements
/// finite, `mᵀm` equal to the identity and `det(m)` equal to one, both to
/// within `tolerance`.
///
/// # Errors
/// Returns [`RotationError::InvalidArgument`] describing the first violated
/// condition.
pub fn validate_rotation_matrix(matrix: &Matrix3<f64>, tolerance: f64) -> Result<()> {
    ensure_finite("matrix", matrix.as_slice())?;

    let orthonormality_error = (matrix.transpose() * matrix - Matrix3::identity()).amax();
    if orthonormality_error > tolerance {
        log::debug!("Rejecting matrix: |mᵀm - I| = {orthonormality_error:e}");
        return Err(RotationError::invalid_argument(format!(
            "matrix is not orthonormal (max deviation of mᵀm from I is {orthonormality_error:e}, \
             tolerance is {tolerance:e})"
        )));
    }

    let determinant = matrix.determinant();
    if (determinant - 1.0).abs() > tolerance {
        log::debug!("Rejecting matrix: det(m) = {determinant}");
        return Err(RotationError::invalid_argument(format!(
            "matrix is not a proper rotation (determinant is {determinant}, expected 1)"
        )));
    }

    Ok(())
}

/// Extracts the quaternion corresponding to the given direction cosine
/// matrix using Shepperd's method.
///
/// The component with the largest magnitude is computed first from the
/// largest of `{trace, m00, m11, m22}`, and the remaining components are
/// obtained by dividing by it, so the divisor is never smaller than 1/2 for
/// a valid rotation matrix. The result is not normalized and its sign is
/// arbitrary.
///
/// # Errors
/// Returns [`RotationError::NumericDegeneracy`] if the pivot component
/// vanishes, which can only happen for a matrix that is not a rotation matrix.
pub fn quaternion_from_direction_cosine_matrix(dcm: &Matrix3<f64>) -> Result<Quaternion<f64>> {
    let m = |row: usize, col: usize| dcm[(row, col)];

    let trace = m(0, 0) + m(1, 1) + m(2, 2);

    let pivot_candidates = [trace, m(0, 0), m(1, 1), m(2, 2)];
    let (pivot, _) = pivot_candidates.iter().enumerate().fold(
        (0, f64::NEG_INFINITY),
        |(best, best_value), (idx, &value)| {
            if value > best_value {
                (idx, value)
            } else {
                (best, best_value)
            }
        },
    );

    let radicand = match pivot {
        0 => 1.0 + trace,
        1 => 1.0 + m(0, 0) - m(1, 1) - m(2, 2),
        2 => 1.0 - m(0, 0) + m(1, 1) - m(2, 2),
        _ => 1.0 - m(0, 0) - m(1, 1) + m(2, 2),
    };

    // `s` is twice the magnitude of the pivot component
    let s = radicand.max(0.0).sqrt();
    if s <= f64::EPSILON {
        return Err(RotationError::numeric_degeneracy(format!(
            "pivot component {pivot} of matrix-to-quaternion extraction is zero"
        )));
    }
    let k = 0.5 / s;

    log::trace!("Extracting quaternion from matrix with pivot {pivot}");

    let (qs, qx, qy, qz) = match pivot {
        0 => (
            0.5 * s,
            (m(1, 2) - m(2, 1)) * k,
            (m(2, 0) - m(0, 2)) * k,
            (m(0, 1) - m(1, 0)) * k,
        ),
        1 => (
            (m(1, 2) - m(2, 1)) * k,
            0.5 * s,
            (m(0, 1) + m(1, 0)) * k,
            (m(0, 2) + m(2, 0)) * k,
        ),
        2 => (
            (m(2, 0) - m(0, 2)) * k,
            (m(0, 1) + m(1, 0)) * k,
            0.5 * s,
            (m(1, 2) + m(2, 1)) * k,
        ),
        _ => (
            (m(0, 1) - m(1, 0)) * k,
            (m(0, 2) + m(2, 0)) * k,
            (m(1, 2) + m(2, 1)) * k,
            0.5 * s,
        ),
    };

    Ok(Quaternion::new(qs, qx, qy, qz))
}
