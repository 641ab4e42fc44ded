//! Firm decision rules of the Lengnick (2013) agent-based macroeconomy.
//!
//! [`Firms`] holds a population of firms as aligned per-firm vectors and
//! applies the monthly wage, workforce and price rules to all of them at
//! once. Households, markets and the monthly schedule belong to the caller,
//! which feeds inventory and demand in through [`Firms::set_property`].

pub mod config;
pub mod error;
pub mod field;
pub mod firms;
pub mod manager;

pub use error::FirmError;
pub use field::{Field, Value};
pub use firms::Firms;
