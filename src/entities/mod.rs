//! Entity type definitions
//!
//! - [`Inspection`] - one batch inspection: dimensions, sampling run and coating readings

pub mod inspection;

pub use inspection::{CoatingRecord, Inspection, InspectionReport};
