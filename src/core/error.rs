//! Inspection engine error taxonomy

use miette::Diagnostic;
use thiserror::Error;

use crate::core::run::InspectionStatus;
use crate::core::sampling::{InspectionStep, SampleLetter};

/// Errors raised by the sampling and acceptance engine
///
/// None of these are ever converted into a default verdict: a lookup miss or a
/// bad quantity must stop evaluation rather than read as a pass.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum InspectionError {
    #[error("Invalid batch quantity: '{0}'")]
    #[diagnostic(
        code(aql::sampling::invalid_quantity),
        help("Batch quantity must be a positive whole number")
    )]
    InvalidBatchQuantity(String),

    #[error("No Ac/Re table entry for sample letter {letter} at the {step} step")]
    #[diagnostic(
        code(aql::table::unknown_entry),
        help("The acceptance table is incomplete; check the configured `acre_table` file")
    )]
    UnknownSamplePlanEntry {
        letter: SampleLetter,
        step: InspectionStep,
    },

    #[error("Inspection already finished with status '{status}'; measurements are frozen")]
    #[diagnostic(code(aql::run::stale_transition), severity(Warning))]
    StaleTransition { status: InspectionStatus },

    #[error("Cannot record into the {requested} step while the inspection is at the {current} step")]
    #[diagnostic(code(aql::run::step_not_reached))]
    StepNotReached {
        requested: InspectionStep,
        current: InspectionStep,
    },

    #[error("The {requested} step is closed; the inspection is at the {current} step")]
    #[diagnostic(
        code(aql::run::step_closed),
        help("Measurements of earlier steps are kept as history and cannot be changed")
    )]
    StepClosed {
        requested: InspectionStep,
        current: InspectionStep,
    },

    #[error("Unknown dimension '{0}'")]
    #[diagnostic(code(aql::run::unknown_dimension))]
    UnknownDimension(String),

    #[error("Sample index {index} is out of range for a sample size of {size}")]
    #[diagnostic(code(aql::run::sample_out_of_range))]
    SampleOutOfRange { index: usize, size: usize },

    #[error("No sample plan has been established")]
    #[diagnostic(
        code(aql::run::no_sample_plan),
        help("Set a batch quantity before recording measurements")
    )]
    NoSamplePlan,

    #[error("Cannot advance from the {step} step: {reason}")]
    #[diagnostic(code(aql::run::advance_not_allowed))]
    AdvanceNotAllowed { step: InspectionStep, reason: String },

    #[error("Inconsistent inspection state: {0}")]
    #[diagnostic(
        code(aql::run::inconsistent),
        help("The stored plan, sample size and measurement rows disagree; fix them with `aql insp edit`")
    )]
    InconsistentRun(String),

    #[error("Invalid dimension '{code}': {reason}")]
    #[diagnostic(code(aql::tolerance::invalid_dimension))]
    InvalidDimension { code: String, reason: String },

    #[error("Invalid Ac/Re table: {0}")]
    #[diagnostic(code(aql::table::invalid))]
    InvalidTable(String),

    #[error("Invalid coating requirements: {0}")]
    #[diagnostic(
        code(aql::coating::invalid_requirements),
        help("Coating requirements need finite, non-negative `mean` and `local` thresholds")
    )]
    InvalidRequirements(String),
}
