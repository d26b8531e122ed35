#![warn(missing_docs)]

//! Math types for patchspin.
//!
//! Thin wrappers around nalgebra providing the few geometric types the
//! replication pipeline needs: node positions, the three coordinate axes a
//! patch can be spun about, and axis-aligned rigid rotations.

use std::fmt;
use std::str::FromStr;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// Errors raised by the math layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Rotation axis outside `{x, y, z}`.
    #[error("invalid rotation axis '{0}': expected x, y or z")]
    InvalidAxis(String),
}

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Lowercase axis letter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            other => Err(MathError::InvalidAxis(other.to_string())),
        }
    }
}

impl TryFrom<String> for Axis {
    type Error = MathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Axis> for String {
    fn from(axis: Axis) -> Self {
        axis.as_str().to_string()
    }
}

/// A rigid rotation about the origin, stored as a 3x3 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    /// The underlying rotation matrix.
    pub matrix: Matrix3<f64>,
}

impl Rotation {
    /// Identity rotation.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix3::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    ///
    /// `x' = x·cosθ + z·sinθ`, `z' = -x·sinθ + z·cosθ`.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix3::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix3::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Rotation about `axis` by `degrees`.
    ///
    /// A zero angle yields the identity matrix exactly.
    pub fn about(axis: Axis, degrees: f64) -> Self {
        if degrees == 0.0 {
            return Self::identity();
        }
        let angle = degrees.to_radians();
        match axis {
            Axis::X => Self::rotation_x(angle),
            Axis::Y => Self::rotation_y(angle),
            Axis::Z => Self::rotation_z(angle),
        }
    }

    /// Rotate a point about the origin.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        Point3::from(self.matrix * p.coords)
    }
}
