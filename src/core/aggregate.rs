//! Non-conformity aggregation over one step's measurement window

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::measurement::MeasurementSet;
use crate::core::sampling::InspectionStep;
use crate::core::tolerance::{classify, Classification, Dimension};

/// Per-dimension and total counts for a step window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Non-conformities per dimension
    pub per_dimension_counts: BTreeMap<String, usize>,

    /// Sum of all per-dimension non-conformities
    pub total: usize,

    /// Non-empty entries per dimension
    pub per_dimension_checked: BTreeMap<String, usize>,

    /// Whether every slot of the window is filled, per dimension
    pub per_dimension_complete: BTreeMap<String, bool>,
}

impl Aggregate {
    /// Non-empty entries across all dimensions
    pub fn total_checked(&self) -> usize {
        self.per_dimension_checked.values().sum()
    }
}

/// Count non-conformities in one step's window
///
/// Only the slots of `step` are scanned; earlier steps stay in the set but do
/// not contribute. Recomputes from scratch on every call.
pub fn aggregate(
    measurements: &MeasurementSet,
    dimensions: &[Dimension],
    step: InspectionStep,
) -> Aggregate {
    let mut result = Aggregate::default();

    for dimension in dimensions {
        let window = measurements.window(&dimension.code, step);

        let mut non_conforming = 0;
        let mut checked = 0;
        for raw in &window {
            match classify(dimension, raw) {
                Classification::Unmeasured => {}
                c => {
                    checked += 1;
                    if c.is_violation() {
                        non_conforming += 1;
                    }
                }
            }
        }

        result
            .per_dimension_counts
            .insert(dimension.code.clone(), non_conforming);
        result
            .per_dimension_checked
            .insert(dimension.code.clone(), checked);
        result
            .per_dimension_complete
            .insert(dimension.code.clone(), checked == window.len());
        result.total += non_conforming;
    }

    result
}
