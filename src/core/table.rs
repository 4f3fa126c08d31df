//! Acceptance / rejection number table for multiple sampling
//!
//! The table is keyed by sample letter and inspection step. Each entry
//! carries the per-step sample size (a cross-check against
//! [`SampleLetter::sample_size`]), the acceptance number and the rejection
//! number. An acceptance number of `#` means no decision is possible at that
//! step and inspection must continue.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::error::InspectionError;
use crate::core::sampling::{InspectionStep, SampleLetter};

/// Acceptance number of a table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AcceptanceRepr", into = "AcceptanceRepr")]
pub enum Acceptance {
    /// Maximum non-conformities that still pass
    Number(u32),
    /// `#`: acceptance not possible at this step
    NoDecision,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AcceptanceRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<AcceptanceRepr> for Acceptance {
    type Error = String;

    fn try_from(repr: AcceptanceRepr) -> Result<Self, Self::Error> {
        match repr {
            AcceptanceRepr::Number(n) => Ok(Acceptance::Number(n)),
            AcceptanceRepr::Text(s) if s.trim() == "#" => Ok(Acceptance::NoDecision),
            AcceptanceRepr::Text(s) => s
                .trim()
                .parse::<u32>()
                .map(Acceptance::Number)
                .map_err(|_| format!("acceptance number must be a count or '#', got '{}'", s)),
        }
    }
}

impl From<Acceptance> for AcceptanceRepr {
    fn from(ac: Acceptance) -> Self {
        match ac {
            Acceptance::Number(n) => AcceptanceRepr::Number(n),
            Acceptance::NoDecision => AcceptanceRepr::Text("#".to_string()),
        }
    }
}

impl std::fmt::Display for Acceptance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Acceptance::Number(n) => write!(f, "{}", n),
            Acceptance::NoDecision => write!(f, "#"),
        }
    }
}

/// One Ac/Re cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcReEntry {
    /// Samples per step (must match the letter's sample size)
    pub size: usize,

    /// Acceptance number
    pub ac: Acceptance,

    /// Rejection number
    pub re: u32,
}

impl AcReEntry {
    fn new(size: usize, ac: Option<u32>, re: u32) -> Self {
        Self {
            size,
            ac: ac.map(Acceptance::Number).unwrap_or(Acceptance::NoDecision),
            re,
        }
    }
}

/// Ac/Re lookup table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcReTable {
    entries: BTreeMap<SampleLetter, BTreeMap<InspectionStep, AcReEntry>>,
}

/// Built-in rows: (letter, acceptance numbers, rejection numbers) per step.
/// `None` is the `#` sentinel.
const STANDARD_ROWS: &[(SampleLetter, [Option<u32>; 5], [u32; 5])] = &[
    (SampleLetter::A, [None, Some(0), Some(0), Some(1), Some(1)], [2, 2, 2, 2, 2]),
    (SampleLetter::B, [None, Some(0), Some(0), Some(1), Some(1)], [2, 2, 2, 2, 2]),
    (SampleLetter::C, [None, Some(0), Some(0), Some(1), Some(1)], [2, 2, 2, 2, 2]),
    (SampleLetter::D, [None, Some(0), Some(0), Some(1), Some(1)], [2, 2, 2, 2, 2]),
    (SampleLetter::E, [None, Some(0), Some(0), Some(1), Some(1)], [2, 2, 2, 2, 2]),
    (SampleLetter::F, [None, Some(0), Some(0), Some(1), Some(1)], [2, 2, 2, 2, 2]),
    (SampleLetter::G, [None, Some(0), Some(0), Some(1), Some(1)], [2, 2, 3, 3, 3]),
    (SampleLetter::H, [None, Some(0), Some(1), Some(2), Some(3)], [2, 3, 3, 4, 4]),
    (SampleLetter::J, [None, Some(0), Some(1), Some(2), Some(4)], [3, 3, 4, 5, 5]),
    (SampleLetter::K, [None, Some(1), Some(2), Some(3), Some(5)], [4, 5, 6, 6, 6]),
    (SampleLetter::L, [Some(0), Some(1), Some(3), Some(5), Some(7)], [4, 6, 8, 8, 8]),
    (SampleLetter::M, [Some(0), Some(3), Some(6), Some(8), Some(10)], [5, 8, 10, 11, 11]),
    (SampleLetter::N, [Some(1), Some(4), Some(8), Some(12), Some(14)], [7, 10, 13, 15, 15]),
    (SampleLetter::P, [Some(2), Some(7), Some(13), Some(19), Some(25)], [9, 14, 19, 25, 26]),
    (SampleLetter::Q, [Some(4), Some(11), Some(19), Some(27), Some(33)], [12, 19, 27, 34, 34]),
];

impl AcReTable {
    /// The built-in table shipped with the toolkit
    pub fn standard() -> Self {
        let entries = STANDARD_ROWS
            .iter()
            .map(|(letter, acs, res)| {
                let size = letter.sample_size();
                let steps = InspectionStep::ALL
                    .iter()
                    .map(|step| {
                        let i = step.index();
                        (*step, AcReEntry::new(size, acs[i], res[i]))
                    })
                    .collect();
                (*letter, steps)
            })
            .collect();

        Self { entries }
    }

    /// Build a table from explicit entries (validated)
    pub fn from_entries(
        entries: BTreeMap<SampleLetter, BTreeMap<InspectionStep, AcReEntry>>,
    ) -> Result<Self, InspectionError> {
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Load and validate a table from a YAML file
    pub fn load(path: &Path) -> Result<Self, InspectionError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InspectionError::InvalidTable(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a table from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, InspectionError> {
        let table: AcReTable = serde_yml::from_str(content)
            .map_err(|e| InspectionError::InvalidTable(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    /// Look up the entry for a letter and step
    pub fn entry(
        &self,
        letter: SampleLetter,
        step: InspectionStep,
    ) -> Result<&AcReEntry, InspectionError> {
        self.entries
            .get(&letter)
            .and_then(|steps| steps.get(&step))
            .ok_or(InspectionError::UnknownSamplePlanEntry { letter, step })
    }

    /// All entries for a letter, in step order
    pub fn row(&self, letter: SampleLetter) -> Vec<(InspectionStep, &AcReEntry)> {
        self.entries
            .get(&letter)
            .map(|steps| steps.iter().map(|(s, e)| (*s, e)).collect())
            .unwrap_or_default()
    }

    pub fn letters(&self) -> impl Iterator<Item = SampleLetter> + '_ {
        self.entries.keys().copied()
    }

    /// Letter/step combinations with no entry
    ///
    /// A partial table is allowed; lookups into the gaps fail at evaluation.
    pub fn missing(&self) -> Vec<(SampleLetter, InspectionStep)> {
        SampleLetter::ALL
            .iter()
            .flat_map(|&letter| InspectionStep::ALL.iter().map(move |&step| (letter, step)))
            .filter(|(letter, step)| self.entry(*letter, *step).is_err())
            .collect()
    }

    /// Check structural invariants of every entry
    ///
    /// - numeric `ac` requires `re > ac`
    /// - `#` only appears on the first step
    /// - `size` equals the letter's sample size
    pub fn validate(&self) -> Result<(), InspectionError> {
        let mut problems = Vec::new();

        for (letter, steps) in &self.entries {
            for (step, entry) in steps {
                if entry.size != letter.sample_size() {
                    problems.push(format!(
                        "{}/{}: size {} does not match sample size {}",
                        letter,
                        step,
                        entry.size,
                        letter.sample_size()
                    ));
                }
                match entry.ac {
                    Acceptance::Number(ac) if entry.re <= ac => problems.push(format!(
                        "{}/{}: re ({}) must be greater than ac ({})",
                        letter, step, entry.re, ac
                    )),
                    Acceptance::NoDecision if *step != InspectionStep::First => {
                        problems.push(format!(
                            "{}/{}: '#' is only allowed on the first step",
                            letter, step
                        ))
                    }
                    _ => {}
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(InspectionError::InvalidTable(problems.join("; ")))
        }
    }
}

impl Default for AcReTable {
    fn default() -> Self {
        Self::standard()
    }
}
