use crate::field::Field;
use thiserror::Error;

/// Errors raised by [`Firms`](crate::firms::Firms).
///
/// Mutator failures are name, type or range errors. Rule failures are
/// consistency errors. Nothing is written when an error is returned.
#[derive(Debug, Error, PartialEq)]
pub enum FirmError {
    #[error("firms have no property named {name:?}")]
    UnknownProperty { name: String },

    #[error("{field} needs {expected} values, but got {actual}")]
    SizeMismatch {
        field: Field,
        expected: usize,
        actual: usize,
    },

    #[error("{field} for a single firm needs a scalar value, but got a vector")]
    VectorWithId { field: Field },

    #[error("{field} holds counts, but {value} is not a non-negative whole number")]
    NotACount { field: Field, value: f64 },

    #[error("firm id must be in the range 0..{n_firms}, but is {id}")]
    IdOutOfRange { id: usize, n_firms: usize },

    #[error("firm {id} has an open vacancy (v = {v}) and a vacancy-free streak (nv = {nv})")]
    VacancyConflict { id: usize, v: u32, nv: u32 },
}
