//! Rotations of three-dimensional space.

use crate::{
    angle::AngleUnit,
    config::RotationConfig,
    dcm,
    error::{Result, RotationError, ensure_arity, ensure_finite},
    euler::{self, EulerAngles, EulerSequence},
    quaternion,
};
use approx::{AbsDiffEq, RelativeEq};
use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

/// A rotation of three-dimensional space, stored as a unit quaternion
/// `qs + qx i + qy j + qz k`.
///
/// A quaternion and its negation represent the same rotation, and no sign is
/// preferred. Equality, including the [`approx`] comparisons, therefore
/// accepts either sign.
#[derive(Clone, Copy, Debug)]
pub struct Rotation {
    inner: Quaternion<f64>,
}

/// Where the scalar component sits in a raw array of four quaternion
/// components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScalarPosition {
    /// `[qs, qx, qy, qz]`
    #[default]
    First,
    /// `[qx, qy, qz, qs]`
    Last,
}

/// Something a [`Rotation`] can be applied to.
#[derive(Clone, Copy, Debug)]
pub enum Operand {
    Rotation(Rotation),
    Vector(Vector3<f64>),
}

/// The result of applying a [`Rotation`] to an [`Operand`].
#[derive(Clone, Copy, Debug)]
pub enum Applied {
    Rotation(Rotation),
    Vector(Vector3<f64>),
}

impl Rotation {
    /// The rotation that leaves every vector unchanged.
    #[inline]
    pub fn identity() -> Self {
        Self {
            inner: Quaternion::identity(),
        }
    }

    /// Creates a rotation from four raw quaternion components, normalizing
    /// them to unit norm.
    ///
    /// # Errors
    /// Returns [`RotationError::InvalidArgument`] if there are not exactly four
    /// components, if any component is not finite or if the norm is too small
    /// to normalize.
    pub fn from_quaternion(components: &[f64], scalar_position: ScalarPosition) -> Result<Self> {
        Self::from_quaternion_with_config(components, scalar_position, &RotationConfig::default())
    }

    /// Like [`Self::from_quaternion`], with the minimum accepted norm taken
    /// from the given configuration.
    ///
    /// # Errors
    /// See [`Self::from_quaternion`].
    pub fn from_quaternion_with_config(
        components: &[f64],
        scalar_position: ScalarPosition,
        config: &RotationConfig,
    ) -> Result<Self> {
        ensure_arity("quaternion", components, 4)?;
        ensure_finite("quaternion", components)?;

        let raw = match scalar_position {
            ScalarPosition::First => Quaternion::new(
                components[0],
                components[1],
                components[2],
                components[3],
            ),
            ScalarPosition::Last => Quaternion::new(
                components[3],
                components[0],
                components[1],
                components[2],
            ),
        };

        Self::normalized_from(raw, config)
    }

    /// Creates a rotation from the three angles of the given intrinsic Euler
    /// sequence, given in sequence order in the given units.
    ///
    /// # Errors
    /// Returns [`RotationError::InvalidArgument`] if any angle is not finite.
    pub fn from_euler_angles(
        first: f64,
        second: f64,
        third: f64,
        sequence: EulerSequence,
        units: AngleUnit,
    ) -> Result<Self> {
        let angles = [first, second, third];
        ensure_finite("Euler angle", &angles)?;

        Ok(Self {
            inner: euler::quaternion_from_euler_angles(
                sequence,
                angles.map(|angle| units.to_radians(angle)),
            ),
        })
    }

    /// Creates a rotation from a slice of three Euler angles.
    ///
    /// # Errors
    /// Returns [`RotationError::InvalidArgument`] if the slice does not hold
    /// exactly three finite angles.
    pub fn from_euler_angle_slice(
        angles: &[f64],
        sequence: EulerSequence,
        units: AngleUnit,
    ) -> Result<Self> {
        ensure_arity("Euler angles", angles, 3)?;
        Self::from_euler_angles(angles[0], angles[1], angles[2], sequence, units)
    }

    /// Creates the rotation whose [`Self::direction_cosine_matrix`] is the
    /// given matrix.
    ///
    /// # Errors
    /// Returns [`RotationError::InvalidArgument`] if the matrix is not a
    /// proper rotation matrix to within the default tolerance.
    pub fn from_direction_cosine_matrix(matrix: &Matrix3<f64>) -> Result<Self> {
        Self::from_direction_cosine_matrix_with_config(matrix, &RotationConfig::default())
    }

    /// Like [`Self::from_direction_cosine_matrix`], with the tolerance taken
    /// from the given configuration.
    ///
    /// # Errors
    /// See [`Self::from_direction_cosine_matrix`].
    pub fn from_direction_cosine_matrix_with_config(
        matrix: &Matrix3<f64>,
        config: &RotationConfig,
    ) -> Result<Self> {
        dcm::validate_rotation_matrix(matrix, config.matrix_tolerance)?;
        let raw = dcm::quaternion_from_direction_cosine_matrix(matrix)?;
        Self::normalized_from(raw, config)
    }

    /// Returns the quaternion components in the given order.
    #[inline]
    pub fn quaternion(&self, scalar_position: ScalarPosition) -> [f64; 4] {
        ordered_components(&self.inner, scalar_position)
    }

    /// Returns the components of the conjugate quaternion, which represents
    /// the inverse rotation, in the given order.
    #[inline]
    pub fn conjugate_quaternion(&self, scalar_position: ScalarPosition) -> [f64; 4] {
        ordered_components(&quaternion::conjugate(&self.inner), scalar_position)
    }

    #[inline]
    pub fn scalar(&self) -> f64 {
        self.inner.w
    }

    #[inline]
    pub fn vector_part(&self) -> Vector3<f64> {
        Vector3::new(self.inner.i, self.inner.j, self.inner.k)
    }

    /// Returns the direction cosine matrix, which transforms the coordinates
    /// of a fixed vector into the rotated frame. See [`dcm`].
    pub fn direction_cosine_matrix(&self) -> Matrix3<f64> {
        dcm::direction_cosine_matrix(&self.inner)
    }

    /// Returns the matrix that rotates vectors the same way as
    /// [`Self::rotate`]. This is the transpose of the direction cosine
    /// matrix.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        dcm::rotation_matrix(&self.inner)
    }

    /// Decomposes the rotation into angles of the given sequence. At a gimbal
    /// lock the third angle is zero.
    pub fn euler_angles(&self, sequence: EulerSequence) -> EulerAngles {
        self.euler_angles_with_config(sequence, &RotationConfig::default())
    }

    pub fn euler_angles_with_config(
        &self,
        sequence: EulerSequence,
        config: &RotationConfig,
    ) -> EulerAngles {
        euler::euler_angles_from_quaternion(&self.inner, sequence, config.gimbal_lock_threshold)
    }

    /// Returns the rotation `self ⊗ other`: rotating by `self` and then by
    /// `other` about the axes produced by `self`. Applied to a vector, `other`
    /// acts first:
    /// `self.compose(&other).rotate(&v) == self.rotate(&other.rotate(&v))`.
    pub fn compose(&self, other: &Self) -> Self {
        Self::renormalized(quaternion::hamilton_product(&self.inner, &other.inner))
    }

    /// Returns the rotation undoing this one.
    pub fn inverse(&self) -> Self {
        let conjugate = quaternion::conjugate(&self.inner);
        Self::renormalized(conjugate / quaternion::norm_squared(&self.inner))
    }

    /// Returns the same rotation represented by the negated quaternion.
    #[inline]
    pub fn negated(&self) -> Self {
        Self { inner: -self.inner }
    }

    /// Rotates the given vector.
    #[inline]
    pub fn rotate(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        quaternion::rotate_vector(&self.inner, vector)
    }

    pub fn rotate_vectors(&self, vectors: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        vectors.iter().map(|vector| self.rotate(vector)).collect()
    }

    /// Rotates every `[x, y, z]` triple in a flat buffer of interleaved
    /// vector components.
    ///
    /// # Errors
    /// Returns [`RotationError::InvalidArgument`] if the buffer length is not
    /// a multiple of three.
    pub fn rotate_flat_vectors(&self, components: &[f64]) -> Result<Vec<f64>> {
        let triples: &[[f64; 3]] = bytemuck::try_cast_slice(components).map_err(|err| {
            RotationError::invalid_argument(format!(
                "vector buffer of length {} does not hold whole xyz triples ({err})",
                components.len()
            ))
        })?;

        Ok(triples
            .iter()
            .flat_map(|&triple| {
                let rotated = self.rotate(&Vector3::from(triple));
                [rotated.x, rotated.y, rotated.z]
            })
            .collect())
    }

    /// Returns the angle in radians, in `[0, π]`, of the rotation taking this
    /// rotation to `other`. The result does not depend on the quaternion
    /// signs.
    pub fn angular_difference(&self, other: &Self) -> f64 {
        let relative =
            quaternion::hamilton_product(&quaternion::conjugate(&self.inner), &other.inner);
        let sin_half = Vector3::new(relative.i, relative.j, relative.k).norm();
        2.0 * sin_half.atan2(relative.w.abs())
    }

    /// Returns the rotation angle in radians, in `[0, π]`.
    pub fn angle(&self) -> f64 {
        self.angular_difference(&Self::identity())
    }

    /// Applies the rotation to the given operand: rotations are composed as
    /// `self ⊗ rotation` and vectors are rotated.
    pub fn apply(&self, operand: &Operand) -> Applied {
        match operand {
            Operand::Rotation(rotation) => Applied::Rotation(self.compose(rotation)),
            Operand::Vector(vector) => Applied::Vector(self.rotate(vector)),
        }
    }

    #[inline]
    pub fn to_unit_quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::new_unchecked(self.inner)
    }

    fn normalized_from(raw: Quaternion<f64>, config: &RotationConfig) -> Result<Self> {
        ensure_finite("quaternion", raw.as_vector().as_slice())?;

        quaternion::normalized(&raw, config.min_quaternion_norm)
            .map(|inner| Self { inner })
            .ok_or_else(|| {
                let norm = quaternion::norm(&raw);
                log::debug!("Rejecting quaternion {raw:?} with norm {norm:e}");
                RotationError::invalid_argument(format!(
                    "quaternion norm {norm:e} is below the minimum {:e}",
                    config.min_quaternion_norm
                ))
            })
    }

    /// Normalizes a quaternion that is a unit quaternion up to round-off.
    fn renormalized(raw: Quaternion<f64>) -> Self {
        let norm = quaternion::norm_squared(&raw).sqrt();
        Self { inner: raw / norm }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<UnitQuaternion<f64>> for Rotation {
    fn from(quaternion: UnitQuaternion<f64>) -> Self {
        Self {
            inner: quaternion.into_inner(),
        }
    }
}

impl_binop!(Mul, mul, Rotation, Rotation, Rotation, |a, b| {
    a.compose(b)
});

impl_binop!(Mul, mul, Rotation, Vector3<f64>, Vector3<f64>, |a, b| {
    a.rotate(b)
});

impl PartialEq for Rotation {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner || self.inner == -other.inner
    }
}

impl_abs_diff_eq!(Rotation, |a, b, epsilon| {
    a.inner.abs_diff_eq(&b.inner, epsilon) || a.inner.abs_diff_eq(&(-b.inner), epsilon)
});

impl_relative_eq!(Rotation, |a, b, epsilon, max_relative| {
    a.inner.relative_eq(&b.inner, epsilon, max_relative)
        || a.inner.relative_eq(&(-b.inner), epsilon, max_relative)
});

impl From<Rotation> for Operand {
    fn from(rotation: Rotation) -> Self {
        Self::Rotation(rotation)
    }
}

impl From<Vector3<f64>> for Operand {
    fn from(vector: Vector3<f64>) -> Self {
        Self::Vector(vector)
    }
}

impl From<[f64; 3]> for Operand {
    fn from(components: [f64; 3]) -> Self {
        Self::Vector(Vector3::from(components))
    }
}

impl TryFrom<&[f64]> for Operand {
    type Error = RotationError;

    fn try_from(components: &[f64]) -> Result<Self> {
        match components {
            &[x, y, z] if components.iter().all(|value| value.is_finite()) => {
                Ok(Self::Vector(Vector3::new(x, y, z)))
            }
            _ => Err(RotationError::invalid_operand(format!(
                "expected a rotation or a vector of 3 finite components, got {components:?}"
            ))),
        }
    }
}

impl Applied {
    pub fn rotation(self) -> Option<Rotation> {
        match self {
            Self::Rotation(rotation) => Some(rotation),
            Self::Vector(_) => None,
        }
    }

    pub fn vector(self) -> Option<Vector3<f64>> {
        match self {
            Self::Vector(vector) => Some(vector),
            Self::Rotation(_) => None,
        }
    }
}

fn ordered_components(q: &Quaternion<f64>, scalar_position: ScalarPosition) -> [f64; 4] {
    match scalar_position {
        ScalarPosition::First => [q.w, q.i, q.j, q.k],
        ScalarPosition::Last => [q.i, q.j, q.k, q.w],
    }
}
