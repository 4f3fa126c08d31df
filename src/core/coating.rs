//! Coating-thickness statistics and threshold checks
//!
//! Runs independently of the dimensional step machine: a set of thickness
//! readings is summarised and checked against mean and local minimums.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::InspectionError;
use crate::core::tolerance::parse_measurement;

/// A coating reading as entered (number or text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    /// Parsed value; `None` for empty or unparsable text
    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Number(v) if v.is_finite() => Some(*v),
            Reading::Number(_) => None,
            Reading::Text(s) => parse_measurement(s).and_then(Result::ok),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Reading::Text(s) if s.trim().is_empty())
    }
}

impl From<f64> for Reading {
    fn from(v: f64) -> Self {
        Reading::Number(v)
    }
}

impl From<&str> for Reading {
    fn from(s: &str) -> Self {
        Reading::Text(s.to_string())
    }
}

impl From<String> for Reading {
    fn from(s: String) -> Self {
        Reading::Text(s)
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reading::Number(v) => write!(f, "{}", v),
            Reading::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Descriptive statistics over coating readings
///
/// `readings == 0` means the statistics are not meaningful, not that every
/// reading was zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoatingStats {
    pub readings: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub range: f64,
    /// Population standard deviation (divides by N)
    pub std_deviation: f64,
    pub mean_plus_3sigma: f64,
    pub mean_minus_3sigma: f64,
    /// Coefficient of variation in percent
    pub cv_percent: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Compute statistics over the non-empty readings
pub fn compute(readings: &[Reading]) -> CoatingStats {
    let values: Vec<f64> = readings
        .iter()
        .filter(|r| !r.is_empty())
        .filter_map(|r| {
            let value = r.value();
            if value.is_none() {
                warn!(reading = %r, "skipping unparsable coating reading");
            }
            value
        })
        .collect();

    if values.is_empty() {
        return CoatingStats::default();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    let cv = if mean == 0.0 { 0.0 } else { std_dev / mean * 100.0 };

    CoatingStats {
        readings: values.len(),
        mean: round_to(mean, 2),
        max: round_to(max, 1),
        min: round_to(min, 1),
        range: round_to(max - min, 1),
        std_deviation: round_to(std_dev, 2),
        mean_plus_3sigma: round_to(mean + 3.0 * std_dev, 2),
        mean_minus_3sigma: round_to(mean - 3.0 * std_dev, 2),
        cv_percent: round_to(cv, 1),
    }
}

/// Which threshold a reading is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoatingKind {
    /// Minimum average thickness
    Mean,
    /// Minimum single-point thickness
    Local,
}

impl std::fmt::Display for CoatingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoatingKind::Mean => write!(f, "mean"),
            CoatingKind::Local => write!(f, "local"),
        }
    }
}

/// Minimum coating thickness requirements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoatingRequirements {
    /// Minimum mean thickness
    pub mean: f64,

    /// Minimum local (single reading) thickness
    pub local: f64,
}

impl CoatingRequirements {
    pub fn new(mean: f64, local: f64) -> Result<Self, InspectionError> {
        let req = Self { mean, local };
        req.validate()?;
        Ok(req)
    }

    pub fn validate(&self) -> Result<(), InspectionError> {
        for (name, value) in [("mean", self.mean), ("local", self.local)] {
            if !value.is_finite() || value < 0.0 {
                return Err(InspectionError::InvalidRequirements(format!(
                    "{} must be a finite, non-negative number (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn threshold(&self, kind: CoatingKind) -> f64 {
        match kind {
            CoatingKind::Mean => self.mean,
            CoatingKind::Local => self.local,
        }
    }
}

/// Whether a raw value meets the requirement for `kind`
///
/// Empty values are not yet measured and count as valid; garbled values do not.
pub fn is_coating_value_valid(kind: CoatingKind, raw: &str, requirements: &CoatingRequirements) -> bool {
    match parse_measurement(raw) {
        None => true,
        Some(Ok(value)) => value >= requirements.threshold(kind),
        Some(Err(())) => false,
    }
}

/// Conformity summary of a full reading set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoatingCheck {
    pub stats: CoatingStats,

    /// Mean meets the mean requirement (`None` without readings)
    pub mean_ok: Option<bool>,

    /// Zero-based positions of readings below the local requirement
    pub local_failures: Vec<usize>,
}

impl CoatingCheck {
    pub fn passed(&self) -> bool {
        self.mean_ok == Some(true) && self.local_failures.is_empty()
    }
}

/// Check a reading set against both thresholds
pub fn check(readings: &[Reading], requirements: &CoatingRequirements) -> CoatingCheck {
    let stats = compute(readings);
    let mean_ok = (stats.readings > 0).then(|| stats.mean >= requirements.threshold(CoatingKind::Mean));
    let local_failures = readings
        .iter()
        .enumerate()
        .filter(|(_, r)| !is_coating_value_valid(CoatingKind::Local, &r.to_string(), requirements))
        .map(|(i, _)| i)
        .collect();

    CoatingCheck {
        stats,
        mean_ok,
        local_failures,
    }
}
