//! Tagged scalar/array container with explicit elementwise combination rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{invalid_input, YpError};

/// Shape descriptor for a [`Values`] container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// A single value.
    Scalar,
    /// A one-dimensional sequence of the given length.
    Array(usize),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => write!(f, "scalar"),
            Shape::Array(len) => write!(f, "array[{len}]"),
        }
    }
}

/// Scalar or fixed-length array of real values.
///
/// Binary elementwise operations follow three rules: scalar with scalar gives
/// a scalar, a scalar is broadcast against an array, and two arrays combine
/// only when their lengths match exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Values {
    /// A single value.
    Scalar(f64),
    /// A one-dimensional sequence.
    Array(Vec<f64>),
}

impl Values {
    /// Returns the shape of the container.
    pub fn shape(&self) -> Shape {
        match self {
            Values::Scalar(_) => Shape::Scalar,
            Values::Array(values) => Shape::Array(values.len()),
        }
    }

    /// Number of elements (1 for scalars).
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True for an array with no elements.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// True for the scalar variant.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Values::Scalar(_))
    }

    /// Returns the scalar value, if this is the scalar variant.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Values::Scalar(value) => Some(*value),
            Values::Array(_) => None,
        }
    }

    /// Borrows the elements as a slice.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Values::Scalar(value) => std::slice::from_ref(value),
            Values::Array(values) => values,
        }
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.as_slice().iter().copied()
    }

    /// Copies the elements into a vector.
    pub fn to_vec(&self) -> Vec<f64> {
        self.as_slice().to_vec()
    }

    /// Applies `f` to every element, preserving the variant.
    pub fn map<F>(&self, f: F) -> Values
    where
        F: Fn(f64) -> f64,
    {
        match self {
            Values::Scalar(value) => Values::Scalar(f(*value)),
            Values::Array(values) => Values::Array(values.iter().copied().map(f).collect()),
        }
    }

    /// Combines two containers elementwise under the broadcasting rules.
    pub fn zip_with<F>(&self, other: &Values, f: F) -> Result<Values, YpError>
    where
        F: Fn(f64, f64) -> f64,
    {
        match (self, other) {
            (Values::Scalar(a), Values::Scalar(b)) => Ok(Values::Scalar(f(*a, *b))),
            (Values::Scalar(a), Values::Array(bs)) => {
                Ok(Values::Array(bs.iter().map(|b| f(*a, *b)).collect()))
            }
            (Values::Array(lefts), Values::Scalar(b)) => {
                Ok(Values::Array(lefts.iter().map(|a| f(*a, *b)).collect()))
            }
            (Values::Array(lefts), Values::Array(bs)) => {
                if lefts.len() != bs.len() {
                    return Err(shape_mismatch(self.shape(), other.shape()));
                }
                Ok(Values::Array(
                    lefts.iter().zip(bs.iter()).map(|(a, b)| f(*a, *b)).collect(),
                ))
            }
        }
    }

    /// Resolves the shape produced by combining `self` with `other`.
    pub fn broadcast_shape(&self, other: &Values) -> Result<Shape, YpError> {
        match (self.shape(), other.shape()) {
            (Shape::Scalar, Shape::Scalar) => Ok(Shape::Scalar),
            (Shape::Scalar, shape @ Shape::Array(_)) | (shape @ Shape::Array(_), Shape::Scalar) => {
                Ok(shape)
            }
            (Shape::Array(a), Shape::Array(b)) if a == b => Ok(Shape::Array(a)),
            (left, right) => Err(shape_mismatch(left, right)),
        }
    }

    /// Expands the container to `len` elements, repeating a scalar.
    pub fn expand(&self, len: usize) -> Vec<f64> {
        match self {
            Values::Scalar(value) => vec![*value; len],
            Values::Array(values) => values.clone(),
        }
    }

    /// Arithmetic mean of the elements (NaN when empty).
    pub fn mean(&self) -> f64 {
        crate::stat::mean(self.as_slice())
    }
}

fn shape_mismatch(left: Shape, right: Shape) -> YpError {
    invalid_input(
        "shape-mismatch",
        "shape",
        format!("reference and comparison shapes differ: {left} vs {right}"),
    )
}

impl From<f64> for Values {
    fn from(value: f64) -> Self {
        Values::Scalar(value)
    }
}

impl From<Vec<f64>> for Values {
    fn from(values: Vec<f64>) -> Self {
        Values::Array(values)
    }
}

impl From<&[f64]> for Values {
    fn from(values: &[f64]) -> Self {
        Values::Array(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Values {
    fn from(values: [f64; N]) -> Self {
        Values::Array(values.to_vec())
    }
}
