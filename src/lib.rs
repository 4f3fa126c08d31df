//! AQL: acceptance sampling for incoming inspection
//!
//! Resolves ISO 2859-1 sample plans from batch quantities, checks measured
//! dimensions against tolerance bands, and drives the multi-step
//! accept/reject decision. Inspections are stored as plain YAML files.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
