use crate::math::Vector3;
use nalgebra as na;
use std::ops::{Add, Mul};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A 3x3 matrix, used for inertia tensors and rotation matrices
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Matrix3 {
    /// Row-major matrix data
    pub data: [[f32; 3]; 3],
}

impl Matrix3 {
    /// Creates a new matrix from row-major components
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        m00: f32, m01: f32, m02: f32,
        m10: f32, m11: f32, m12: f32,
        m20: f32, m21: f32, m22: f32,
    ) -> Self {
        Self {
            data: [[m00, m01, m02], [m10, m11, m12], [m20, m21, m22]],
        }
    }

    /// Creates an identity matrix
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0)
    }

    /// Creates a zero matrix
    pub fn zero() -> Self {
        Self {
            data: [[0.0; 3]; 3],
        }
    }

    /// Creates a diagonal matrix from the given values
    pub fn from_diagonal(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, 0.0, 0.0, 0.0, y, 0.0, 0.0, 0.0, z)
    }

    /// Returns the transpose of the matrix
    pub fn transpose(&self) -> Self {
        let m = &self.data;
        Self::new(
            m[0][0], m[1][0], m[2][0],
            m[0][1], m[1][1], m[2][1],
            m[0][2], m[1][2], m[2][2],
        )
    }

    /// Multiplies the matrix by a vector
    pub fn multiply_vector(&self, v: Vector3) -> Vector3 {
        let m = &self.data;
        Vector3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Multiplies the matrix by another matrix
    pub fn multiply_matrix(&self, other: &Self) -> Self {
        let mut result = Self::zero();
        for i in 0..3 {
            for j in 0..3 {
                let mut sum = 0.0;
                for (k, row) in other.data.iter().enumerate() {
                    sum += self.data[i][k] * row[j];
                }
                result.data[i][j] = sum;
            }
        }
        result
    }

    /// Returns the inverse of the matrix, or None if it is singular
    pub fn inverse(&self) -> Option<Self> {
        self.to_nalgebra()
            .try_inverse()
            .map(|inv| Self::from_nalgebra(&inv))
    }

    /// Returns whether all components are finite
    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|v| v.is_finite())
    }

    /// Converts to a nalgebra matrix
    pub fn to_nalgebra(&self) -> na::Matrix3<f32> {
        let m = &self.data;
        na::Matrix3::new(
            m[0][0], m[0][1], m[0][2],
            m[1][0], m[1][1], m[1][2],
            m[2][0], m[2][1], m[2][2],
        )
    }

    /// Creates a matrix from a nalgebra matrix
    pub fn from_nalgebra(m: &na::Matrix3<f32>) -> Self {
        Self::new(
            m[(0, 0)], m[(0, 1)], m[(0, 2)],
            m[(1, 0)], m[(1, 1)], m[(1, 2)],
            m[(2, 0)], m[(2, 1)], m[(2, 2)],
        )
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Add for Matrix3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let mut result = Self::zero();
        for i in 0..3 {
            for j in 0..3 {
                result.data[i][j] = self.data[i][j] + other.data[i][j];
            }
        }
        result
    }
}

impl Mul<f32> for Matrix3 {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        let mut result = self;
        for row in result.data.iter_mut() {
            for v in row.iter_mut() {
                *v *= scalar;
            }
        }
        result
    }
}
