//! Acceptance decision for the multiple sampling step machine
//!
//! Given the non-conformity total for the current step and the Ac/Re entry
//! for the sample letter, decide whether the batch passes, fails, or needs
//! the next step. The function is pure: the same inputs always produce the
//! same decision.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::InspectionError;
use crate::core::sampling::{InspectionStep, SampleLetter};
use crate::core::table::{AcReTable, Acceptance};

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "next_step", rename_all = "snake_case")]
pub enum Decision {
    /// Not enough samples checked yet; nothing changes
    Pending,
    /// Continue with the given step
    Advance(InspectionStep),
    /// Batch accepted
    Pass,
    /// Batch rejected
    Reject,
}

impl Decision {
    /// Whether the decision ends the inspection
    pub fn is_terminal(&self) -> bool {
        matches!(self, Decision::Pass | Decision::Reject)
    }

    /// Advisory message for the inspector (`None` while pending)
    pub fn notice(&self) -> Option<String> {
        match self {
            Decision::Pending => None,
            Decision::Advance(next) => Some(format!(
                "Result inconclusive: continue with the {} step",
                next
            )),
            Decision::Pass => Some("Batch accepted: non-conformities within the acceptance number".to_string()),
            Decision::Reject => Some("Batch rejected: non-conformities reached the rejection limit".to_string()),
        }
    }
}

/// Inputs to a single evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub letter: SampleLetter,
    pub step: InspectionStep,
    pub total_non_conformities: usize,
    pub samples_completed: usize,
    pub dimension_count: usize,
}

/// Samples that must be checked before the step can be decided
pub fn min_samples_required(
    table: &AcReTable,
    letter: SampleLetter,
    step: InspectionStep,
    dimension_count: usize,
) -> Result<usize, InspectionError> {
    Ok(table.entry(letter, step)?.size * dimension_count)
}

/// Decide the outcome of a step
pub fn evaluate(table: &AcReTable, input: &Evaluation) -> Result<Decision, InspectionError> {
    let entry = table.entry(input.letter, input.step)?;
    let required = entry.size * input.dimension_count;

    // Nothing to inspect is never an acceptance
    if input.dimension_count == 0 || input.samples_completed < required {
        return Ok(Decision::Pending);
    }

    let total = input.total_non_conformities as u64;
    let next = input.step.next();

    let decision = match entry.ac {
        Acceptance::NoDecision => match next {
            Some(next) => Decision::Advance(next),
            None => Decision::Reject,
        },
        Acceptance::Number(ac) if total <= u64::from(ac) => Decision::Pass,
        Acceptance::Number(_) if total >= u64::from(entry.re) => Decision::Reject,
        Acceptance::Number(_) => match next {
            Some(next) => Decision::Advance(next),
            // No step left to resolve the result
            None => Decision::Reject,
        },
    };

    debug!(
        letter = %input.letter,
        step = %input.step,
        total = input.total_non_conformities,
        completed = input.samples_completed,
        required,
        ac = %entry.ac,
        re = entry.re,
        ?decision,
        "evaluated step"
    );

    Ok(decision)
}
