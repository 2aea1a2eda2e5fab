//! Quaternion arithmetic on raw, not necessarily normalized, quaternions.
//!
//! The scalar part of a [`nalgebra::Quaternion`] is `w` and the vector part is
//! `(i, j, k)`, which corresponds to the `(qs, qx, qy, qz)` notation used
//! throughout the crate.

use nalgebra::{Quaternion, Vector3};

/// Computes the Hamilton product `p ⊗ q`.
#[inline]
pub fn hamilton_product(p: &Quaternion<f64>, q: &Quaternion<f64>) -> Quaternion<f64> {
    let (p_s, p_x, p_y, p_z) = (p.w, p.i, p.j, p.k);
    let (q_s, q_x, q_y, q_z) = (q.w, q.i, q.j, q.k);

    Quaternion::new(
        p_s * q_s - p_x * q_x - p_y * q_y - p_z * q_z,
        p_s * q_x + p_x * q_s + p_y * q_z - p_z * q_y,
        p_s * q_y - p_x * q_z + p_y * q_s + p_z * q_x,
        p_s * q_z + p_x * q_y - p_y * q_x + p_z * q_s,
    )
}

/// Returns the quaternion with its vector part negated.
#[inline]
pub fn conjugate(q: &Quaternion<f64>) -> Quaternion<f64> {
    Quaternion::new(q.w, -q.i, -q.j, -q.k)
}

/// Four-dimensional dot product of two quaternions.
#[inline]
pub fn dot(p: &Quaternion<f64>, q: &Quaternion<f64>) -> f64 {
    p.w * q.w + p.i * q.i + p.j * q.j + p.k * q.k
}

#[inline]
pub fn norm_squared(q: &Quaternion<f64>) -> f64 {
    dot(q, q)
}

/// Euclidean norm, computed on the components scaled by the largest
/// magnitude so that it neither overflows nor underflows for finite
/// components that are far from unity.
pub fn norm(q: &Quaternion<f64>) -> f64 {
    let scale = max_abs_component(q);
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    scale * norm_squared(&scaled(q, scale)).sqrt()
}

/// Divides the quaternion by its Euclidean norm, or returns [`None`] if a
/// component is not finite or the norm is smaller than `min_norm`.
pub fn normalized(q: &Quaternion<f64>, min_norm: f64) -> Option<Quaternion<f64>> {
    let scale = max_abs_component(q);
    if !scale.is_finite() || scale == 0.0 {
        return None;
    }
    let q = scaled(q, scale);
    // The largest scaled component is one, so this lies in [1, 2]
    let scaled_norm = norm_squared(&q).sqrt();
    if scale * scaled_norm < min_norm {
        return None;
    }
    Some(scaled(&q, scaled_norm))
}

fn max_abs_component(q: &Quaternion<f64>) -> f64 {
    // `f64::max` ignores NaN, so it is propagated explicitly
    if [q.w, q.i, q.j, q.k].iter().any(|value| value.is_nan()) {
        return f64::NAN;
    }
    q.w.abs().max(q.i.abs()).max(q.j.abs()).max(q.k.abs())
}

fn scaled(q: &Quaternion<f64>, divisor: f64) -> Quaternion<f64> {
    Quaternion::new(q.w / divisor, q.i / divisor, q.j / divisor, q.k / divisor)
}

/// Rotates a vector by the given unit quaternion as
/// `v + 2 qs (u × v) + 2 u × (u × v)`, where `u` is the vector part, using two
/// cross products and no matrix.
#[inline]
pub fn rotate_vector(q: &Quaternion<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    let u = Vector3::new(q.i, q.j, q.k);
    let t = 2.0 * u.cross(v);
    v + q.w * t + u.cross(&t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::UnitQuaternion;
    use std::f64::consts::FRAC_1_SQRT_2;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn hamilton_product_of_basis_elements_follows_multiplication_table() {
        let i = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        let j = Quaternion::new(0.0, 0.0, 1.0, 0.0);
        let k = Quaternion::new(0.0, 0.0, 0.0, 1.0);

        assert_abs_diff_eq!(hamilton_product(&i, &j), k);
        assert_abs_diff_eq!(hamilton_product(&j, &k), i);
        assert_abs_diff_eq!(hamilton_product(&k, &i), j);
        assert_abs_diff_eq!(hamilton_product(&j, &i), -k);
        assert_abs_diff_eq!(
            hamilton_product(&i, &i),
            Quaternion::new(-1.0, 0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn hamilton_product_matches_nalgebra() {
        let p = Quaternion::new(0.3, -1.2, 0.5, 2.0);
        let q = Quaternion::new(-0.7, 0.1, 0.9, -0.4);
        assert_abs_diff_eq!(hamilton_product(&p, &q), p * q, epsilon = EPSILON);
    }

    #[test]
    fn conjugate_negates_vector_part() {
        let q = Quaternion::new(1.0, 2.0, -3.0, 4.0);
        assert_eq!(conjugate(&q), Quaternion::new(1.0, -2.0, 3.0, -4.0));
    }

    #[test]
    fn product_with_conjugate_is_squared_norm() {
        let q = Quaternion::new(0.1, 0.2, 0.3, 0.4);
        let product = hamilton_product(&q, &conjugate(&q));
        assert_abs_diff_eq!(
            product,
            Quaternion::new(norm_squared(&q), 0.0, 0.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn normalization_gives_unit_norm() {
        let q = normalized(&Quaternion::new(0.1, 0.2, 0.3, 0.4), f64::EPSILON).unwrap();
        assert_abs_diff_eq!(norm_squared(&q), 1.0, epsilon = EPSILON);
        assert_abs_diff_eq!(q.w, 0.1 / 0.3_f64.sqrt(), epsilon = EPSILON);
    }

    #[test]
    fn normalization_of_zero_quaternion_fails() {
        assert!(normalized(&Quaternion::new(0.0, 0.0, 0.0, 0.0), f64::EPSILON).is_none());
    }

    #[test]
    fn normalization_of_non_finite_quaternion_fails() {
        assert!(normalized(&Quaternion::new(f64::NAN, 1.0, 0.0, 0.0), f64::EPSILON).is_none());
        assert!(normalized(&Quaternion::new(1.0, f64::INFINITY, 0.0, 0.0), f64::EPSILON).is_none());
    }

    #[test]
    fn normalization_of_huge_quaternion_works() {
        for magnitude in [1e200, f64::MAX] {
            let q = normalized(&Quaternion::new(magnitude, 0.0, 0.0, magnitude), f64::EPSILON).unwrap();
            assert_abs_diff_eq!(
                q,
                Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2),
                epsilon = EPSILON
            );
        }
    }

    #[test]
    fn normalization_of_tiny_quaternion_works() {
        let q = normalized(&Quaternion::new(0.0, 1e-170, -1e-170, 0.0), f64::MIN_POSITIVE).unwrap();
        assert_abs_diff_eq!(
            q,
            Quaternion::new(0.0, FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn norm_of_extreme_quaternions_is_finite_and_nonzero() {
        assert_abs_diff_eq!(
            norm(&Quaternion::new(3e200, 0.0, 4e200, 0.0)) / 1e200,
            5.0,
            epsilon = EPSILON
        );
        assert_abs_diff_eq!(
            norm(&Quaternion::new(0.0, 3e-200, 0.0, 4e-200)) * 1e200,
            5.0,
            epsilon = EPSILON
        );
        assert_eq!(norm(&Quaternion::new(0.0, 0.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn rotate_vector_matches_nalgebra() {
        let q = normalized(&Quaternion::new(0.9, -0.2, 0.3, 0.1), f64::EPSILON).unwrap();
        let v = Vector3::new(1.5, -2.0, 0.25);
        let expected = UnitQuaternion::new_unchecked(q) * v;
        assert_abs_diff_eq!(rotate_vector(&q, &v), expected, epsilon = EPSILON);
    }
}
