//! Euler angle sequences.
//!
//! All sequences are intrinsic: the angles `(first, second, third)` of the
//! sequence `ABC` describe a rotation by `first` about axis `A`, followed by
//! `second` about the once-rotated axis `B`, followed by `third` about the
//! twice-rotated axis `C`. The corresponding quaternion is the Hamilton
//! product `q_A(first) ⊗ q_B(second) ⊗ q_C(third)` of the elementary
//! half-angle quaternions. `ZYX` is the aerospace yaw-pitch-roll sequence.
//!
//! The `ZYX` and `YZX` sequences have dedicated closed-form half-angle
//! products. Every other sequence goes through one generic routine driven by
//! the axis table of the sequence.

use crate::{
    angle::{Angle, AngleUnit, Radians, wrap_to_pi},
    error::{Result, RotationError},
    quaternion,
};
use nalgebra::Quaternion;
use std::{
    f64::consts::{FRAC_PI_2, PI},
    fmt,
    str::FromStr,
};

/// A coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// An intrinsic Euler angle sequence, named by the axes rotated about in
/// order.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EulerSequence {
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    /// Yaw, pitch, roll.
    ZYX,
    XYX,
    XZX,
    YXY,
    YZY,
    ZXZ,
    ZYZ,
}

/// Angles decomposing a rotation into an [`EulerSequence`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EulerAngles {
    sequence: EulerSequence,
    angles: [Radians; 3],
    gimbal_locked: bool,
}

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The quaternion for a rotation by `angle` radians about this axis.
    pub fn elementary_quaternion(self, angle: f64) -> Quaternion<f64> {
        let (sin, cos) = (0.5 * angle).sin_cos();
        match self {
            Self::X => Quaternion::new(cos, sin, 0.0, 0.0),
            Self::Y => Quaternion::new(cos, 0.0, sin, 0.0),
            Self::Z => Quaternion::new(cos, 0.0, 0.0, sin),
        }
    }
}

impl EulerSequence {
    pub const ALL: [Self; 12] = [
        Self::XYZ,
        Self::XZY,
        Self::YXZ,
        Self::YZX,
        Self::ZXY,
        Self::ZYX,
        Self::XYX,
        Self::XZX,
        Self::YXY,
        Self::YZY,
        Self::ZXZ,
        Self::ZYZ,
    ];

    /// The axes rotated about, in order.
    pub const fn axes(self) -> [Axis; 3] {
        use Axis::{X, Y, Z};
        match self {
            Self::XYZ => [X, Y, Z],
            Self::XZY => [X, Z, Y],
            Self::YXZ => [Y, X, Z],
            Self::YZX => [Y, Z, X],
            Self::ZXY => [Z, X, Y],
            Self::ZYX => [Z, Y, X],
            Self::XYX => [X, Y, X],
            Self::XZX => [X, Z, X],
            Self::YXY => [Y, X, Y],
            Self::YZY => [Y, Z, Y],
            Self::ZXZ => [Z, X, Z],
            Self::ZYZ => [Z, Y, Z],
        }
    }

    /// Whether the first and last axes coincide (a proper Euler sequence, as
    /// opposed to a Tait-Bryan sequence).
    pub const fn is_proper_euler(self) -> bool {
        let [first, _, third] = self.axes();
        first.index() == third.index()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::XYZ => "XYZ",
            Self::XZY => "XZY",
            Self::YXZ => "YXZ",
            Self::YZX => "YZX",
            Self::ZXY => "ZXY",
            Self::ZYX => "ZYX",
            Self::XYX => "XYX",
            Self::XZX => "XZX",
            Self::YXY => "YXY",
            Self::YZY => "YZY",
            Self::ZXZ => "ZXZ",
            Self::ZYZ => "ZYZ",
        }
    }
}

impl fmt::Display for EulerSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EulerSequence {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sequence| sequence.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RotationError::invalid_argument(format!("unknown Euler sequence {s}")))
    }
}

impl EulerAngles {
    pub fn sequence(&self) -> EulerSequence {
        self.sequence
    }

    pub fn first(&self) -> Radians {
        self.angles[0]
    }

    pub fn second(&self) -> Radians {
        self.angles[1]
    }

    pub fn third(&self) -> Radians {
        self.angles[2]
    }

    /// The three angles in radians, in sequence order.
    pub fn radians(&self) -> [f64; 3] {
        self.angles.map(Angle::radians)
    }

    /// The three angles in degrees, in sequence order.
    pub fn degrees(&self) -> [f64; 3] {
        self.angles.map(Angle::degrees)
    }

    pub fn in_units(&self, units: AngleUnit) -> [f64; 3] {
        match units {
            AngleUnit::Radians => self.radians(),
            AngleUnit::Degrees => self.degrees(),
        }
    }

    /// Whether the decomposition was taken at a gimbal-lock singularity, in
    /// which case the third angle was set to zero and the first angle carries
    /// the combined rotation about the aligned first and third axes.
    pub fn is_gimbal_locked(&self) -> bool {
        self.gimbal_locked
    }
}

/// Computes the unit quaternion for the given angles (in radians, in sequence
/// order) of the given sequence.
pub fn quaternion_from_euler_angles(sequence: EulerSequence, angles: [f64; 3]) -> Quaternion<f64> {
    match sequence {
        EulerSequence::ZYX => zyx_half_angle_product(angles),
        EulerSequence::YZX => yzx_half_angle_product(angles),
        _ => generic_half_angle_product(sequence.axes(), angles),
    }
}

/// Decomposes the given unit quaternion into angles of the given sequence.
///
/// First and third angles lie in `[-π, π]`. The second angle lies in
/// `[-π/2, π/2]` for Tait-Bryan sequences and in `[0, π]` for proper Euler
/// sequences. When the second angle is within `gimbal_lock_threshold` of a
/// singular value, the first and third axes are aligned and only their
/// combined angle is determined; the third angle is then set to zero.
pub fn euler_angles_from_quaternion(
    quaternion: &Quaternion<f64>,
    sequence: EulerSequence,
    gimbal_lock_threshold: f64,
) -> EulerAngles {
    let (angles, gimbal_locked) = match sequence {
        EulerSequence::ZYX => zyx_angles(quaternion, gimbal_lock_threshold),
        _ => generic_angles(quaternion, sequence.axes(), gimbal_lock_threshold),
    };

    if gimbal_locked {
        log::debug!(
            "Gimbal lock in {sequence} decomposition (second angle {:.6} rad), setting third angle to zero",
            angles[1]
        );
    }

    EulerAngles {
        sequence,
        angles: angles.map(Radians),
        gimbal_locked,
    }
}

/// Closed-form quaternion for a `ZYX` sequence with angles `[ψ, θ, φ]` about
/// z, y and x.
fn zyx_half_angle_product([z, y, x]: [f64; 3]) -> Quaternion<f64> {
    let (sz, cz) = (0.5 * z).sin_cos();
    let (sy, cy) = (0.5 * y).sin_cos();
    let (sx, cx) = (0.5 * x).sin_cos();

    Quaternion::new(
        cx * cy * cz + sx * sy * sz,
        sx * cy * cz - cx * sy * sz,
        cx * sy * cz + sx * cy * sz,
        cx * cy * sz - sx * sy * cz,
    )
}

/// Closed-form quaternion for a `YZX` sequence with angles `[a, b, c]` about
/// y, z and x.
fn yzx_half_angle_product([y, z, x]: [f64; 3]) -> Quaternion<f64> {
    let (sa, ca) = (0.5 * y).sin_cos();
    let (sb, cb) = (0.5 * z).sin_cos();
    let (sc, cc) = (0.5 * x).sin_cos();

    Quaternion::new(
        ca * cb * cc - sa * sb * sc,
        ca * cb * sc + sa * sb * cc,
        sa * cb * cc + ca * sb * sc,
        ca * sb * cc - sa * cb * sc,
    )
}

/// Composes the elementary half-angle quaternions of the given axes.
fn generic_half_angle_product(axes: [Axis; 3], angles: [f64; 3]) -> Quaternion<f64> {
    let [a, b, c] = axes;
    let ab = quaternion::hamilton_product(
        &a.elementary_quaternion(angles[0]),
        &b.elementary_quaternion(angles[1]),
    );
    quaternion::hamilton_product(&ab, &c.elementary_quaternion(angles[2]))
}

/// Yaw, pitch and roll from the quaternion products, with the `asin`
/// argument clamped against overshoot.
fn zyx_angles(q: &Quaternion<f64>, gimbal_lock_threshold: f64) -> ([f64; 3], bool) {
    let (qs, qx, qy, qz) = (q.w, q.i, q.j, q.k);

    let sin_pitch = (2.0 * (qs * qy - qz * qx)).clamp(-1.0, 1.0);
    let pitch = sin_pitch.asin();

    if FRAC_PI_2 - pitch.abs() <= gimbal_lock_threshold {
        // Only yaw - roll (pitch up) or yaw + roll (pitch down) is determined,
        // and both equal 2 atan2(qz, qs)
        let yaw = wrap_to_pi(2.0 * qz.atan2(qs));
        return ([yaw, FRAC_PI_2.copysign(pitch), 0.0], true);
    }

    let yaw = (2.0 * (qs * qz + qx * qy)).atan2(1.0 - 2.0 * (qy * qy + qz * qz));
    let roll = (2.0 * (qs * qx + qy * qz)).atan2(1.0 - 2.0 * (qx * qx + qy * qy));

    ([yaw, pitch, roll], false)
}

/// Decomposition for any sequence, following Bernardes & Viollet (2022),
/// "Quaternion to Euler angles conversion: A direct, general and
/// computationally efficient method".
///
/// The method is formulated for extrinsic sequences, so the intrinsic
/// sequence is reversed and the first and third angles are swapped.
fn generic_angles(q: &Quaternion<f64>, axes: [Axis; 3], gimbal_lock_threshold: f64) -> ([f64; 3], bool) {
    let i = axes[2].index();
    let j = axes[1].index();
    let proper = axes[0].index() == i;
    let k = if proper { 3 - i - j } else { axes[0].index() };

    // +1 for an even permutation of (x, y, z), -1 for an odd one
    let (ii, jj, kk) = (i as i32, j as i32, k as i32);
    let sign = f64::from((ii - jj) * (jj - kk) * (kk - ii) / 2);

    let v = [q.i, q.j, q.k];
    let (a, b, c, d) = if proper {
        (q.w, v[i], v[j], v[k] * sign)
    } else {
        (q.w - v[j], v[i] + v[k] * sign, v[j] + q.w, v[k] * sign - v[i])
    };

    let mut middle = 2.0 * c.hypot(d).atan2(a.hypot(b));

    let half_sum = b.atan2(a);
    let half_diff = d.atan2(c);

    let (mut first, third, gimbal_locked) = if middle.abs() <= gimbal_lock_threshold {
        (2.0 * half_sum, 0.0, true)
    } else if (middle - PI).abs() <= gimbal_lock_threshold {
        (2.0 * half_diff, 0.0, true)
    } else {
        (half_sum + half_diff, half_sum - half_diff, false)
    };

    if !proper {
        first *= sign;
        middle -= FRAC_PI_2;
    }

    log::trace!("Generic Euler decomposition used permutation sign {sign}");

    ([wrap_to_pi(first), middle, wrap_to_pi(third)], gimbal_locked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{abs_diff_eq, assert_abs_diff_eq};
    use proptest::prelude::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    const EPSILON: f64 = 1e-12;
    const THRESHOLD: f64 = 1e-7;
    const MARGIN: f64 = 1e-2;

    prop_compose! {
        fn angles_strategy(sequence: EulerSequence)(
            first in (-PI + MARGIN)..(PI - MARGIN),
            second in middle_angle_range(sequence),
            third in (-PI + MARGIN)..(PI - MARGIN),
        ) -> [f64; 3] {
            [first, second, third]
        }
    }

    fn middle_angle_range(sequence: EulerSequence) -> std::ops::Range<f64> {
        if sequence.is_proper_euler() {
            MARGIN..(PI - MARGIN)
        } else {
            (-FRAC_PI_2 + MARGIN)..(FRAC_PI_2 - MARGIN)
        }
    }

    fn sequence_and_angles_strategy() -> impl Strategy<Value = (EulerSequence, [f64; 3])> {
        prop::sample::select(EulerSequence::ALL.to_vec())
            .prop_flat_map(|sequence| (Just(sequence), angles_strategy(sequence)))
    }

    fn same_rotation(a: &Quaternion<f64>, b: &Quaternion<f64>, epsilon: f64) -> bool {
        abs_diff_eq!(quaternion::dot(a, b).abs(), 1.0, epsilon = epsilon)
    }

    #[test]
    fn sequence_names_round_trip_through_parsing() {
        for sequence in EulerSequence::ALL {
            assert_eq!(sequence.to_string().parse::<EulerSequence>().unwrap(), sequence);
            assert_eq!(
                sequence.name().to_lowercase().parse::<EulerSequence>().unwrap(),
                sequence
            );
        }
        assert!(matches!(
            "XXY".parse::<EulerSequence>(),
            Err(RotationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn proper_euler_sequences_are_identified() {
        assert!(EulerSequence::ZXZ.is_proper_euler());
        assert!(EulerSequence::YZY.is_proper_euler());
        assert!(!EulerSequence::ZYX.is_proper_euler());
        assert!(!EulerSequence::YZX.is_proper_euler());
    }

    #[test]
    fn zero_angles_give_identity_for_every_sequence() {
        for sequence in EulerSequence::ALL {
            let q = quaternion_from_euler_angles(sequence, [0.0; 3]);
            assert_abs_diff_eq!(q, Quaternion::identity(), epsilon = EPSILON);
        }
    }

    #[test]
    fn zyx_quarter_turn_about_z_has_expected_components() {
        let q = quaternion_from_euler_angles(EulerSequence::ZYX, [FRAC_PI_2, 0.0, 0.0]);
        assert_abs_diff_eq!(q.w, FRAC_1_SQRT_2, epsilon = EPSILON);
        assert_abs_diff_eq!(q.i, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(q.j, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(q.k, FRAC_1_SQRT_2, epsilon = EPSILON);
    }

    #[test]
    fn yzx_closed_form_matches_elementary_rotations() {
        let q = quaternion_from_euler_angles(EulerSequence::YZX, [0.0, 0.0, 0.8]);
        assert_abs_diff_eq!(q, Axis::X.elementary_quaternion(0.8), epsilon = EPSILON);

        let q = quaternion_from_euler_angles(EulerSequence::YZX, [-1.1, 0.0, 0.0]);
        assert_abs_diff_eq!(q, Axis::Y.elementary_quaternion(-1.1), epsilon = EPSILON);
    }

    #[test]
    fn zyx_gimbal_lock_sets_roll_to_zero() {
        let q = quaternion_from_euler_angles(EulerSequence::ZYX, [0.7, FRAC_PI_2, 0.3]);
        let angles = euler_angles_from_quaternion(&q, EulerSequence::ZYX, THRESHOLD);

        assert!(angles.is_gimbal_locked());
        assert_abs_diff_eq!(angles.second(), Radians(FRAC_PI_2), epsilon = 1e-6);
        assert_eq!(angles.third(), Radians(0.0));
        assert_abs_diff_eq!(angles.first(), Radians(0.4), epsilon = 1e-6);

        let reconstructed = quaternion_from_euler_angles(EulerSequence::ZYX, angles.radians());
        assert!(same_rotation(&reconstructed, &q, 1e-9));
    }

    #[test]
    fn zyx_negative_gimbal_lock_sets_roll_to_zero() {
        let q = quaternion_from_euler_angles(EulerSequence::ZYX, [0.7, -FRAC_PI_2, 0.3]);
        let angles = euler_angles_from_quaternion(&q, EulerSequence::ZYX, THRESHOLD);

        assert!(angles.is_gimbal_locked());
        assert_abs_diff_eq!(angles.second().radians(), -FRAC_PI_2, epsilon = 1e-6);
        assert_eq!(angles.third().radians(), 0.0);
        assert_abs_diff_eq!(angles.first().radians(), 1.0, epsilon = 1e-6);
        assert!(angles.radians().iter().all(|angle| angle.is_finite()));
    }

    #[test]
    fn generic_gimbal_lock_reproduces_rotation() {
        for sequence in [EulerSequence::YZX, EulerSequence::XYZ, EulerSequence::ZXZ] {
            let middle = if sequence.is_proper_euler() { 0.0 } else { FRAC_PI_2 };
            let q = quaternion_from_euler_angles(sequence, [0.4, middle, -0.9]);
            let angles = euler_angles_from_quaternion(&q, sequence, THRESHOLD);

            assert!(angles.is_gimbal_locked());
            assert_eq!(angles.third().radians(), 0.0);
            let reconstructed = quaternion_from_euler_angles(sequence, angles.radians());
            assert!(same_rotation(&reconstructed, &q, 1e-9));
        }
    }

    #[test]
    fn euler_angles_report_degrees() {
        let q = quaternion_from_euler_angles(EulerSequence::ZYX, [FRAC_PI_2, 0.0, 0.0]);
        let angles = euler_angles_from_quaternion(&q, EulerSequence::ZYX, THRESHOLD);
        let degrees = angles.in_units(AngleUnit::Degrees);

        assert_eq!(angles.sequence(), EulerSequence::ZYX);
        assert_abs_diff_eq!(degrees[0], 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(degrees[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(degrees[2], 0.0, epsilon = 1e-9);
    }

    proptest! {
        #[test]
        fn euler_quaternions_have_unit_norm((sequence, angles) in sequence_and_angles_strategy()) {
            let q = quaternion_from_euler_angles(sequence, angles);
            prop_assert!(abs_diff_eq!(quaternion::norm_squared(&q), 1.0, epsilon = 1e-12));
        }

        #[test]
        fn zyx_closed_form_matches_generic_product(angles in angles_strategy(EulerSequence::ZYX)) {
            let closed_form = quaternion_from_euler_angles(EulerSequence::ZYX, angles);
            let generic = generic_half_angle_product(EulerSequence::ZYX.axes(), angles);
            prop_assert!(abs_diff_eq!(closed_form, generic, epsilon = EPSILON));
        }

        #[test]
        fn yzx_closed_form_matches_generic_product(angles in angles_strategy(EulerSequence::YZX)) {
            let closed_form = quaternion_from_euler_angles(EulerSequence::YZX, angles);
            let generic = generic_half_angle_product(EulerSequence::YZX.axes(), angles);
            prop_assert!(abs_diff_eq!(closed_form, generic, epsilon = EPSILON));
        }

        #[test]
        fn euler_angles_round_trip((sequence, angles) in sequence_and_angles_strategy()) {
            let q = quaternion_from_euler_angles(sequence, angles);
            let extracted = euler_angles_from_quaternion(&q, sequence, THRESHOLD);

            prop_assert!(!extracted.is_gimbal_locked());
            for (extracted, original) in extracted.radians().iter().zip(angles) {
                prop_assert!(abs_diff_eq!(*extracted, original, epsilon = 1e-6));
            }
        }

        #[test]
        fn zyx_closed_form_extraction_matches_generic(angles in angles_strategy(EulerSequence::ZYX)) {
            let q = quaternion_from_euler_angles(EulerSequence::ZYX, angles);
            let (closed_form, _) = zyx_angles(&q, THRESHOLD);
            let (generic, _) = generic_angles(&q, EulerSequence::ZYX.axes(), THRESHOLD);
            for (a, b) in closed_form.iter().zip(generic) {
                prop_assert!(abs_diff_eq!(*a, b, epsilon = 1e-9));
            }
        }

        #[test]
        fn extraction_is_insensitive_to_quaternion_sign((sequence, angles) in sequence_and_angles_strategy()) {
            let q = quaternion_from_euler_angles(sequence, angles);
            let positive = euler_angles_from_quaternion(&q, sequence, THRESHOLD);
            let negative = euler_angles_from_quaternion(&(-q), sequence, THRESHOLD);
            for (a, b) in positive.radians().iter().zip(negative.radians()) {
                prop_assert!(abs_diff_eq!(*a, b, epsilon = 1e-9));
            }
        }
    }
}
