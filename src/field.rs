//! Names and values accepted by the firm attribute mutator.

use crate::error::FirmError;
use std::{fmt, str::FromStr};

/// Per-firm field of a [`Firms`](crate::firms::Firms) population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Vacancy-free months before a wage cut is allowed.
    Gamma,
    /// Maximum relative wage change per month.
    Delta,
    /// Lower inventory bound as a fraction of last demand.
    IPhiLower,
    /// Upper inventory bound as a fraction of last demand.
    IPhiUpper,
    /// Maximum relative price change per month.
    Nu,
    /// Lower price bound as a fraction of marginal cost.
    PPhiLower,
    /// Upper price bound as a fraction of marginal cost.
    PPhiUpper,
    /// Probability that a proposed price change is accepted.
    Theta,
    /// Output per worker.
    TLambda,
    /// Liquidity.
    M,
    /// Inventory.
    I,
    /// Demand of the previous month.
    D,
    /// Wage.
    W,
    /// Price.
    P,
    /// Employed workers.
    L,
    /// Open vacancies.
    V,
    /// Consecutive months without an open vacancy.
    Nv,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::Gamma,
        Field::Delta,
        Field::IPhiLower,
        Field::IPhiUpper,
        Field::Nu,
        Field::PPhiLower,
        Field::PPhiUpper,
        Field::Theta,
        Field::TLambda,
        Field::M,
        Field::I,
        Field::D,
        Field::W,
        Field::P,
        Field::L,
        Field::V,
        Field::Nv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Gamma => "gamma",
            Field::Delta => "delta",
            Field::IPhiLower => "i_phi_lower",
            Field::IPhiUpper => "i_phi_upper",
            Field::Nu => "nu",
            Field::PPhiLower => "p_phi_lower",
            Field::PPhiUpper => "p_phi_upper",
            Field::Theta => "theta",
            Field::TLambda => "t_lambda",
            Field::M => "m",
            Field::I => "i",
            Field::D => "d",
            Field::W => "w",
            Field::P => "p",
            Field::L => "l",
            Field::V => "v",
            Field::Nv => "nv",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = FirmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| FirmError::UnknownProperty {
                name: s.to_string(),
            })
    }
}

/// Value written by the mutator: one number or one number per firm.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Scalar(val)
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::Scalar(val as f64)
    }
}

impl From<Vec<f64>> for Value {
    fn from(vals: Vec<f64>) -> Self {
        Value::Vector(vals)
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(vals: [f64; N]) -> Self {
        Value::Vector(vals.to_vec())
    }
}

/// Convert a value to a count, rejecting anything that is not a whole number.
pub(crate) fn to_count(field: Field, val: f64) -> Result<u32, FirmError> {
    if val.is_finite() && val >= 0.0 && val.fract() == 0.0 && val <= u32::MAX as f64 {
        Ok(val as u32)
    } else {
        Err(FirmError::NotACount { field, value: val })
    }
}
