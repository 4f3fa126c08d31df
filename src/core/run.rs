//! Inspection run state and its reducer
//!
//! [`InspectionRun`] is the single mutable aggregate of an inspection: the
//! dimension list, the sample plan, the measurements and the derived counts
//! and status. It only changes through [`InspectionRun::apply`], and every
//! derived field is recomputed from the stored measurements afterwards, so a
//! run loaded from disk can be handed straight back to the engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::core::aggregate::aggregate;
use crate::core::decision::{evaluate, min_samples_required, Decision, Evaluation};
use crate::core::error::InspectionError;
use crate::core::measurement::MeasurementSet;
use crate::core::sampling::{resolve, InspectionStep, SamplePlan};
use crate::core::table::AcReTable;
use crate::core::tolerance::Dimension;

/// Overall inspection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum InspectionStatus {
    #[default]
    InProgress,
    Pass,
    Reject,
}

impl InspectionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InspectionStatus::Pass | InspectionStatus::Reject)
    }
}

impl std::fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InspectionStatus::InProgress => write!(f, "in_progress"),
            InspectionStatus::Pass => write!(f, "pass"),
            InspectionStatus::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for InspectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_progress" | "inprogress" => Ok(InspectionStatus::InProgress),
            "pass" => Ok(InspectionStatus::Pass),
            "reject" => Ok(InspectionStatus::Reject),
            _ => Err(format!(
                "Invalid inspection status: {}. Use in_progress, pass, or reject",
                s
            )),
        }
    }
}

/// A change requested by the inspector
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Set (or change) the batch quantity; starts the measurements over
    EstablishPlan { batch_quantity: i64 },

    /// Enter one measurement
    Record {
        code: String,
        step: InspectionStep,
        sample: usize,
        raw: String,
    },

    /// Move on to the step named by the last decision
    AdvanceStep,

    /// Re-derive counts and status without changing anything else
    Recompute,
}

/// Mutable state of one inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRun {
    /// Dimensions under inspection
    pub dimensions: Vec<Dimension>,

    /// Batch quantity the plan was resolved from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_quantity: Option<u64>,

    /// Resolved sample plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<SamplePlan>,

    /// Step currently being measured
    #[serde(default)]
    pub current_step: InspectionStep,

    /// Recorded values
    #[serde(default)]
    pub measurements: MeasurementSet,

    /// Non-conformities per dimension in the current step
    #[serde(default)]
    pub dimension_non_conformities: BTreeMap<String, usize>,

    /// Sum of non-conformities in the current step
    #[serde(default)]
    pub total_non_conformities: usize,

    /// Non-empty entries per dimension in the current step
    #[serde(default)]
    pub total_samples_checked: BTreeMap<String, usize>,

    /// Dimensions whose current step window is full
    #[serde(default)]
    pub completed_dimensions: BTreeMap<String, bool>,

    /// Overall status
    #[serde(default)]
    pub inspection_status: InspectionStatus,

    /// Latest decision of the step machine
    #[serde(default = "pending")]
    pub decision: Decision,

    /// Advisory message for the inspector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
}

fn pending() -> Decision {
    Decision::Pending
}

/// Snapshot for status displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub inspection_status: InspectionStatus,
    pub current_step: InspectionStep,
    pub total_non_conformities: usize,
    pub per_dimension_counts: BTreeMap<String, usize>,
    pub per_dimension_complete: BTreeMap<String, bool>,
    pub samples_checked: usize,
    pub samples_required: usize,
    pub notification_message: Option<String>,
}

impl InspectionRun {
    /// Create a run for a set of dimensions (no plan yet)
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self, InspectionError> {
        let mut seen = HashSet::new();
        for dim in &dimensions {
            dim.validate()?;
            if !seen.insert(dim.code.as_str()) {
                return Err(InspectionError::InvalidDimension {
                    code: dim.code.clone(),
                    reason: "duplicate dimension code".to_string(),
                });
            }
        }

        Ok(Self {
            dimensions,
            batch_quantity: None,
            plan: None,
            current_step: InspectionStep::First,
            measurements: MeasurementSet::default(),
            dimension_non_conformities: BTreeMap::new(),
            total_non_conformities: 0,
            total_samples_checked: BTreeMap::new(),
            completed_dimensions: BTreeMap::new(),
            inspection_status: InspectionStatus::InProgress,
            decision: Decision::Pending,
            notification: None,
        })
    }

    /// Look up a dimension by code
    pub fn dimension(&self, code: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.code == code)
    }

    /// Apply an action and recompute; returns the advisory notice
    ///
    /// A failed action (including a failed recompute) leaves the run untouched.
    pub fn apply(
        &mut self,
        action: Action,
        table: &AcReTable,
    ) -> Result<Option<String>, InspectionError> {
        if !matches!(action, Action::Recompute) && self.inspection_status.is_terminal() {
            return Err(InspectionError::StaleTransition {
                status: self.inspection_status,
            });
        }

        let mut next = self.clone();
        next.mutate(action)?;
        next.recompute(table)?;
        *self = next;

        Ok(self.notification.clone())
    }

    fn mutate(&mut self, action: Action) -> Result<(), InspectionError> {
        match action {
            Action::EstablishPlan { batch_quantity } => {
                let plan = resolve(batch_quantity)?;
                info!(
                    batch_quantity,
                    letter = %plan.letter,
                    size = plan.size,
                    "established sample plan"
                );
                self.batch_quantity = Some(batch_quantity as u64);
                self.plan = Some(plan);
                self.measurements =
                    MeasurementSet::new(plan.size, self.dimensions.iter().map(|d| d.code.clone()));
                self.current_step = InspectionStep::First;
            }
            Action::Record {
                code,
                step,
                sample,
                raw,
            } => {
                if self.plan.is_none() {
                    return Err(InspectionError::NoSamplePlan);
                }
                if step > self.current_step {
                    return Err(InspectionError::StepNotReached {
                        requested: step,
                        current: self.current_step,
                    });
                }
                if step < self.current_step {
                    return Err(InspectionError::StepClosed {
                        requested: step,
                        current: self.current_step,
                    });
                }
                if self.dimension(&code).is_none() {
                    return Err(InspectionError::UnknownDimension(code));
                }
                debug!(%code, %step, sample, %raw, "recording measurement");
                self.measurements.set(&code, step, sample, raw)?;
            }
            Action::AdvanceStep => match self.decision {
                Decision::Advance(next) => {
                    info!(from = %self.current_step, to = %next, "advancing inspection step");
                    self.current_step = next;
                    self.measurements.clear_step(next);
                }
                Decision::Pending => {
                    return Err(InspectionError::AdvanceNotAllowed {
                        step: self.current_step,
                        reason: "the step is not complete".to_string(),
                    })
                }
                Decision::Pass | Decision::Reject => {
                    return Err(InspectionError::AdvanceNotAllowed {
                        step: self.current_step,
                        reason: "the step already reached a decision".to_string(),
                    })
                }
            },
            Action::Recompute => {}
        }
        Ok(())
    }

    /// Re-derive counts, completion, decision and status from the measurements
    ///
    /// Safe to call on a run loaded from storage; stored counts are ignored.
    pub fn recompute(&mut self, table: &AcReTable) -> Result<Decision, InspectionError> {
        self.check_shape()?;

        let Some(plan) = self.plan else {
            self.dimension_non_conformities.clear();
            self.total_samples_checked.clear();
            self.completed_dimensions.clear();
            self.total_non_conformities = 0;
            self.decision = Decision::Pending;
            self.inspection_status = InspectionStatus::InProgress;
            self.notification = None;
            return Ok(Decision::Pending);
        };

        let agg = aggregate(&self.measurements, &self.dimensions, self.current_step);
        let decision = evaluate(
            table,
            &Evaluation {
                letter: plan.letter,
                step: self.current_step,
                total_non_conformities: agg.total,
                samples_completed: agg.total_checked(),
                dimension_count: self.dimensions.len(),
            },
        )?;

        self.total_non_conformities = agg.total;
        self.dimension_non_conformities = agg.per_dimension_counts;
        self.total_samples_checked = agg.per_dimension_checked;
        self.completed_dimensions = agg.per_dimension_complete;
        self.decision = decision;
        self.inspection_status = match decision {
            Decision::Pass => InspectionStatus::Pass,
            Decision::Reject => InspectionStatus::Reject,
            Decision::Pending | Decision::Advance(_) => InspectionStatus::InProgress,
        };
        self.notification = decision.notice();

        Ok(decision)
    }

    /// Verify that plan, measurement shape and dimensions agree
    ///
    /// A run whose windows are shorter than the plan's sample size could never
    /// complete a step, so it is refused instead of reported as pending.
    fn check_shape(&self) -> Result<(), InspectionError> {
        let Some(plan) = self.plan else {
            return Ok(());
        };
        let inconsistent = |reason: String| Err(InspectionError::InconsistentRun(reason));

        if plan.size != plan.letter.sample_size() {
            return inconsistent(format!(
                "letter {} draws {} samples per step, but the plan says {}",
                plan.letter,
                plan.letter.sample_size(),
                plan.size
            ));
        }
        if let Some(quantity) = self.batch_quantity {
            let resolved = i64::try_from(quantity)
                .map_err(|_| InspectionError::InvalidBatchQuantity(quantity.to_string()))
                .and_then(resolve)?;
            if resolved.letter != plan.letter {
                return inconsistent(format!(
                    "batch quantity {} resolves to letter {}, but the plan says {}",
                    quantity, resolved.letter, plan.letter
                ));
            }
        }
        if self.measurements.sample_size != plan.size {
            return inconsistent(format!(
                "measurements hold {} samples per step, but the plan draws {}",
                self.measurements.sample_size, plan.size
            ));
        }
        for dim in &self.dimensions {
            if !self.measurements.contains(&dim.code) {
                return inconsistent(format!("no measurement row for dimension '{}'", dim.code));
            }
        }
        for (code, windows) in &self.measurements.values {
            if self.dimension(code).is_none() {
                return inconsistent(format!("measurements for unknown dimension '{}'", code));
            }
            if windows.len() > InspectionStep::COUNT
                || windows.iter().any(|w| w.len() > plan.size)
            {
                return inconsistent(format!(
                    "dimension '{}' holds more slots than {} steps of {} samples",
                    code,
                    InspectionStep::COUNT,
                    plan.size
                ));
            }
        }
        Ok(())
    }

    /// Snapshot for status displays
    pub fn status_view(&self, table: &AcReTable) -> Result<StatusView, InspectionError> {
        let samples_required = match self.plan {
            Some(plan) => min_samples_required(
                table,
                plan.letter,
                self.current_step,
                self.dimensions.len(),
            )?,
            None => 0,
        };

        Ok(StatusView {
            inspection_status: self.inspection_status,
            current_step: self.current_step,
            total_non_conformities: self.total_non_conformities,
            per_dimension_counts: self.dimension_non_conformities.clone(),
            per_dimension_complete: self.completed_dimensions.clone(),
            samples_checked: self.total_samples_checked.values().sum(),
            samples_required,
            notification_message: self.notification.clone(),
        })
    }
}

/// Non-mutating form of [`InspectionRun::apply`]
pub fn reduce(
    state: &InspectionRun,
    action: Action,
    table: &AcReTable,
) -> Result<(InspectionRun, Option<String>), InspectionError> {
    let mut next = state.clone();
    let notice = next.apply(action, table)?;
    Ok((next, notice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampling::SampleLetter;

    fn record(code: &str, step: InspectionStep, sample: usize, raw: &str) -> Action {
        Action::Record {
            code: code.to_string(),
            step,
            sample,
            raw: raw.to_string(),
        }
    }

    fn dims(codes: &[&str]) -> Vec<Dimension> {
        codes
            .iter()
            .map(|c| Dimension::new(*c, 10.0, 0.2, 0.3).unwrap())
            .collect()
    }

    fn planned(codes: &[&str], quantity: i64) -> (InspectionRun, AcReTable) {
        let table = AcReTable::standard();
        let mut run = InspectionRun::new(dims(codes)).unwrap();
        run.apply(Action::EstablishPlan { batch_quantity: quantity }, &table)
            .unwrap();
        (run, table)
    }

    #[test]
    fn test_end_to_end_first_step_advances() {
        let (mut run, table) = planned(&["A", "B"], 100);
        let plan = run.plan.unwrap();
        assert_eq!(plan.size, 2);

        for code in ["A", "B"] {
            for sample in 0..2 {
                run.apply(record(code, InspectionStep::First, sample, "10.05"), &table)
                    .unwrap();
            }
        }

        assert_eq!(run.total_non_conformities, 0);
        assert_eq!(run.inspection_status, InspectionStatus::InProgress);
        assert_eq!(run.decision, Decision::Advance(InspectionStep::Second));
        assert!(run.notification.as_deref().unwrap().contains("second"));
        assert!(run.completed_dimensions.values().all(|c| *c));
    }

    #[test]
    fn test_pass_reject_and_advance_on_g() {
        // 200 -> G, size 3; first step is '#' so move to second
        let (mut run, table) = planned(&["A", "B", "C"], 200);
        assert_eq!(run.plan.unwrap().letter, SampleLetter::G);
        for code in ["A", "B", "C"] {
            for sample in 0..3 {
                run.apply(record(code, InspectionStep::First, sample, "10"), &table)
                    .unwrap();
            }
        }
        run.apply(Action::AdvanceStep, &table).unwrap();
        assert_eq!(run.current_step, InspectionStep::Second);

        let mut one_bad = run.clone();
        let mut two_bad = run.clone();
        let mut all_good = run.clone();

        for code in ["A", "B", "C"] {
            for sample in 0..3 {
                all_good
                    .apply(record(code, InspectionStep::Second, sample, "10"), &table)
                    .unwrap();
                let v1 = if code == "A" && sample == 0 { "11" } else { "10" };
                one_bad
                    .apply(record(code, InspectionStep::Second, sample, v1), &table)
                    .unwrap();
                let v2 = if code == "B" && sample < 2 { "9" } else { "10" };
                two_bad
                    .apply(record(code, InspectionStep::Second, sample, v2), &table)
                    .unwrap();
            }
        }

        assert_eq!(all_good.inspection_status, InspectionStatus::Pass);
        assert_eq!(one_bad.decision, Decision::Advance(InspectionStep::Third));
        assert_eq!(one_bad.inspection_status, InspectionStatus::InProgress);
        assert_eq!(two_bad.total_non_conformities, 2);
        assert_eq!(two_bad.inspection_status, InspectionStatus::Reject);
    }

    #[test]
    fn test_reject_needs_required_samples() {
        let (mut run, table) = planned(&["A"], 200);
        for sample in 0..3 {
            run.apply(record("A", InspectionStep::First, sample, "10"), &table)
                .unwrap();
        }
        run.apply(Action::AdvanceStep, &table).unwrap();
        run.apply(record("A", InspectionStep::Second, 0, "50"), &table).unwrap();
        run.apply(record("A", InspectionStep::Second, 1, "50"), &table).unwrap();
        // two of three samples checked: still pending
        assert_eq!(run.decision, Decision::Pending);
        run.apply(record("A", InspectionStep::Second, 2, "10"), &table).unwrap();
        assert_eq!(run.inspection_status, InspectionStatus::Reject);
    }

    #[test]
    fn test_frozen_after_termination() {
        let (mut run, table) = planned(&["A"], 200);
        for sample in 0..3 {
            run.apply(record("A", InspectionStep::First, sample, "10"), &table)
                .unwrap();
        }
        run.apply(Action::AdvanceStep, &table).unwrap();
        for sample in 0..3 {
            run.apply(record("A", InspectionStep::Second, sample, "10"), &table)
                .unwrap();
        }
        assert_eq!(run.inspection_status, InspectionStatus::Pass);

        let before = run.clone();
        let err = run
            .apply(record("A", InspectionStep::Second, 0, "99"), &table)
            .unwrap_err();
        assert_eq!(
            err,
            InspectionError::StaleTransition {
                status: InspectionStatus::Pass
            }
        );
        assert_eq!(run, before);
        assert!(run
            .apply(Action::EstablishPlan { batch_quantity: 10 }, &table)
            .is_err());
        assert!(run.apply(Action::Recompute, &table).is_ok());
        assert_eq!(run, before);
    }

    #[test]
    fn test_record_validation() {
        let table = AcReTable::standard();
        let mut run = InspectionRun::new(dims(&["A"])).unwrap();
        assert_eq!(
            run.apply(record("A", InspectionStep::First, 0, "10"), &table),
            Err(InspectionError::NoSamplePlan)
        );

        run.apply(Action::EstablishPlan { batch_quantity: 10 }, &table)
            .unwrap();
        assert!(matches!(
            run.apply(record("A", InspectionStep::Third, 0, "10"), &table),
            Err(InspectionError::StepNotReached { .. })
        ));
        assert!(matches!(
            run.apply(record("Z", InspectionStep::First, 0, "10"), &table),
            Err(InspectionError::UnknownDimension(_))
        ));
        assert!(matches!(
            run.apply(record("A", InspectionStep::First, 9, "10"), &table),
            Err(InspectionError::SampleOutOfRange { .. })
        ));
    }

    #[test]
    fn test_history_is_closed_after_advance() {
        let (mut run, table) = planned(&["A"], 10);
        run.apply(record("A", InspectionStep::First, 0, "10"), &table).unwrap();
        run.apply(record("A", InspectionStep::First, 1, "10"), &table).unwrap();
        run.apply(Action::AdvanceStep, &table).unwrap();

        assert!(matches!(
            run.apply(record("A", InspectionStep::First, 0, "11"), &table),
            Err(InspectionError::StepClosed { .. })
        ));
        assert_eq!(
            run.measurements.get("A", InspectionStep::First, 0),
            Some("10")
        );
    }

    #[test]
    fn test_advance_requires_advance_decision() {
        let (mut run, table) = planned(&["A"], 10);
        assert!(matches!(
            run.apply(Action::AdvanceStep, &table),
            Err(InspectionError::AdvanceNotAllowed { .. })
        ));
    }

    #[test]
    fn test_invalid_quantity_leaves_state_untouched() {
        let (mut run, table) = planned(&["A"], 10);
        let before = run.clone();
        assert!(matches!(
            run.apply(Action::EstablishPlan { batch_quantity: 0 }, &table),
            Err(InspectionError::InvalidBatchQuantity(_))
        ));
        assert_eq!(run, before);
    }

    #[test]
    fn test_replanning_resets_measurements() {
        let (mut run, table) = planned(&["A"], 10);
        run.apply(record("A", InspectionStep::First, 0, "10"), &table).unwrap();
        run.apply(Action::EstablishPlan { batch_quantity: 300 }, &table)
            .unwrap();
        assert_eq!(run.plan.unwrap().size, 5);
        assert_eq!(run.measurements.get("A", InspectionStep::First, 0), Some(""));
        assert_eq!(run.total_samples_checked["A"], 0);
    }

    #[test]
    fn test_duplicate_dimension_codes_rejected() {
        assert!(InspectionRun::new(dims(&["A", "A"])).is_err());
    }

    #[test]
    fn test_rehydrated_state_is_recomputed() {
        let (mut run, table) = planned(&["A", "B"], 10);
        run.apply(record("A", InspectionStep::First, 0, "12"), &table).unwrap();

        let yaml = serde_yml::to_string(&run).unwrap();
        let mut loaded: InspectionRun = serde_yml::from_str(&yaml).unwrap();
        // Stale derived fields from storage are not trusted
        loaded.total_non_conformities = 7;
        loaded.inspection_status = InspectionStatus::Pass;
        loaded.recompute(&table).unwrap();

        assert_eq!(loaded.total_non_conformities, 1);
        assert_eq!(loaded.inspection_status, InspectionStatus::InProgress);
        assert_eq!(loaded, run);
    }

    #[test]
    fn test_rehydrated_inconsistent_shape_is_refused() {
        let yaml = r#"
dimensions:
  - code: A
    nominal: 50
    tolerance_plus: 1
    tolerance_minus: 1
batch_quantity: 200
plan: { letter: G, size: 3 }
current_step: second
measurements:
  sample_size: 2
  values:
    A: [["50", "50", "50"], ["60", "60"]]
"#;
        let table = AcReTable::standard();
        let mut loaded: InspectionRun = serde_yml::from_str(yaml).unwrap();
        assert!(matches!(
            loaded.recompute(&table),
            Err(InspectionError::InconsistentRun(_))
        ));

        // Plan size that does not match its letter
        let (run, _) = planned(&["A"], 200);
        let mut bad = run.clone();
        bad.plan = Some(SamplePlan { letter: SampleLetter::G, size: 2 });
        bad.measurements.sample_size = 2;
        assert!(matches!(bad.recompute(&table), Err(InspectionError::InconsistentRun(_))));

        // Dimension without a measurement row
        let mut bad = run.clone();
        bad.measurements.values.clear();
        assert!(matches!(bad.recompute(&table), Err(InspectionError::InconsistentRun(_))));

        // Batch quantity resolving to a different letter
        let mut bad = run.clone();
        bad.batch_quantity = Some(10);
        assert!(matches!(bad.recompute(&table), Err(InspectionError::InconsistentRun(_))));

        // Recompute goes through apply as well, and leaves the run untouched
        let mut bad = run;
        bad.measurements.sample_size = 5;
        let before = bad.clone();
        assert!(bad.apply(Action::Recompute, &table).is_err());
        assert_eq!(bad, before);
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let (run, table) = planned(&["A"], 10);
        let (next, _) = reduce(&run, record("A", InspectionStep::First, 0, "10"), &table).unwrap();
        assert_eq!(run.measurements.get("A", InspectionStep::First, 0), Some(""));
        assert_eq!(next.measurements.get("A", InspectionStep::First, 0), Some("10"));
    }

    #[test]
    fn test_status_view() {
        let (mut run, table) = planned(&["A", "B", "C"], 200);
        run.apply(record("A", InspectionStep::First, 0, "10"), &table).unwrap();
        let view = run.status_view(&table).unwrap();
        assert_eq!(view.samples_checked, 1);
        assert_eq!(view.samples_required, 9);
        assert_eq!(view.current_step, InspectionStep::First);
        assert_eq!(view.notification_message, None);
    }
}
