//! Different units for angles.

use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};
use std::{
    f64::consts::{FRAC_1_PI, PI, TAU},
    fmt,
};

/// Represents an angle.
pub trait Angle: Copy {
    /// Returns the value of the angle in degrees.
    fn degrees(self) -> f64;

    /// Returns the value of the angle in radians.
    fn radians(self) -> f64;
}

// An angle in radians.
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Zeroable, Pod)]
pub struct Radians(pub f64);

/// The unit in which raw angle values are given.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl Angle for Radians {
    fn degrees(self) -> f64 {
        radians_to_degrees(self.0)
    }

    fn radians(self) -> f64 {
        self.0
    }
}

impl AngleUnit {
    /// Converts a raw angle value given in this unit to radians.
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            Self::Radians => value,
            Self::Degrees => degrees_to_radians(value),
        }
    }

    /// Converts a raw angle value in radians to this unit.
    pub fn from_radians(self, radians: f64) -> f64 {
        match self {
            Self::Radians => radians,
            Self::Degrees => radians_to_degrees(radians),
        }
    }

    /// Short symbol for the unit.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Radians => "rad",
            Self::Degrees => "deg",
        }
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl_abs_diff_eq!(Radians, |a, b, epsilon| {
    f64::abs_diff_eq(&a.0, &b.0, epsilon)
});

impl_relative_eq!(Radians, |a, b, epsilon, max_relative| {
    f64::relative_eq(&a.0, &b.0, epsilon, max_relative)
});

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * (180.0 * FRAC_1_PI)
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// Maps an angle in radians to the equivalent angle in `[-π, π]`.
pub fn wrap_to_pi(radians: f64) -> f64 {
    if (-PI..=PI).contains(&radians) {
        radians
    } else {
        let wrapped = (radians + PI).rem_euclid(TAU) - PI;
        // `rem_euclid` maps odd multiples of π to -π; keep the sign of the input.
        if wrapped == -PI && radians > 0.0 {
            PI
        } else {
            wrapped
        }
    }
}
