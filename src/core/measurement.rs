//! Measurement storage keyed by dimension, step and sample

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::InspectionError;
use crate::core::sampling::InspectionStep;

/// Recorded values for every dimension, step and sample slot
///
/// Each dimension holds `InspectionStep::COUNT` windows of `sample_size`
/// entries. An empty string means "not measured yet". The shape is fixed at
/// construction; a new sample plan always builds a new set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSet {
    /// Samples per step
    pub sample_size: usize,

    /// Dimension code -> step -> sample -> raw value
    #[serde(default)]
    pub values: BTreeMap<String, Vec<Vec<String>>>,
}

impl MeasurementSet {
    /// Create an empty set for the given dimension codes
    pub fn new<I, S>(sample_size: usize, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = codes
            .into_iter()
            .map(|code| (code.into(), empty_windows(sample_size)))
            .collect();
        Self {
            sample_size,
            values,
        }
    }

    /// Record a raw value
    pub fn set(
        &mut self,
        code: &str,
        step: InspectionStep,
        sample: usize,
        raw: impl Into<String>,
    ) -> Result<(), InspectionError> {
        let size = self.sample_size;
        if sample >= size {
            return Err(InspectionError::SampleOutOfRange {
                index: sample,
                size,
            });
        }
        let windows = self
            .values
            .get_mut(code)
            .ok_or_else(|| InspectionError::UnknownDimension(code.to_string()))?;
        normalize(windows, size);
        windows[step.index()][sample] = raw.into().trim().to_string();
        Ok(())
    }

    /// Read a raw value (`None` if the slot does not exist)
    pub fn get(&self, code: &str, step: InspectionStep, sample: usize) -> Option<&str> {
        self.values
            .get(code)
            .and_then(|windows| windows.get(step.index()))
            .and_then(|window| window.get(sample))
            .map(String::as_str)
    }

    /// The slots of one step for one dimension
    ///
    /// Always `sample_size` long; missing slots in a rehydrated set read as empty.
    pub fn window(&self, code: &str, step: InspectionStep) -> Vec<&str> {
        let window = self
            .values
            .get(code)
            .and_then(|windows| windows.get(step.index()));
        (0..self.sample_size)
            .map(|i| {
                window
                    .and_then(|w| w.get(i))
                    .map(String::as_str)
                    .unwrap_or("")
            })
            .collect()
    }

    /// Clear one step's slots for every dimension
    pub fn clear_step(&mut self, step: InspectionStep) {
        let size = self.sample_size;
        for windows in self.values.values_mut() {
            normalize(windows, size);
            windows[step.index()] = vec![String::new(); size];
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.values.contains_key(code)
    }

    /// Position of a (step, sample) pair in the flat report layout
    pub fn flat_index(&self, step: InspectionStep, sample: usize) -> usize {
        step.index() * self.sample_size + sample
    }

    /// Flatten to `code -> [value; 5 * sample_size]` for report consumers
    pub fn to_flat(&self) -> BTreeMap<String, Vec<String>> {
        self.values
            .keys()
            .map(|code| {
                let mut flat = vec![String::new(); InspectionStep::COUNT * self.sample_size];
                for step in InspectionStep::ALL {
                    for (sample, raw) in self.window(code, step).into_iter().enumerate() {
                        flat[self.flat_index(step, sample)] = raw.to_string();
                    }
                }
                (code.clone(), flat)
            })
            .collect()
    }
}

fn empty_windows(sample_size: usize) -> Vec<Vec<String>> {
    vec![vec![String::new(); sample_size]; InspectionStep::COUNT]
}

/// Pad a rehydrated dimension to the full shape without touching existing values
fn normalize(windows: &mut Vec<Vec<String>>, sample_size: usize) {
    windows.resize_with(InspectionStep::COUNT, Vec::new);
    for window in windows.iter_mut() {
        window.resize(sample_size, String::new());
    }
}
