//! Pure result analysis: per-document aggregation and risk classification.

mod aggregate;
mod risk;

pub use aggregate::*;
pub use risk::*;
