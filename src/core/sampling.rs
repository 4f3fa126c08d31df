//! Sample plan resolution (ISO 2859-1, general inspection level)
//!
//! Maps a batch quantity to a sample-size code letter and the number of
//! samples drawn per inspection step.

use serde::{Deserialize, Serialize};

use crate::core::error::InspectionError;

/// Sample-size code letter
///
/// The variant order is the table order, so `Ord` compares letters by the
/// size of batch they cover.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SampleLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    J,
    K,
    L,
    M,
    N,
    P,
    Q,
}

/// Inclusive upper batch-quantity bound for each letter (Q is open-ended)
const BREAKPOINTS: &[(u64, SampleLetter)] = &[
    (8, SampleLetter::A),
    (15, SampleLetter::B),
    (25, SampleLetter::C),
    (50, SampleLetter::D),
    (90, SampleLetter::E),
    (150, SampleLetter::F),
    (280, SampleLetter::G),
    (500, SampleLetter::H),
    (1200, SampleLetter::J),
    (3200, SampleLetter::K),
    (10000, SampleLetter::L),
    (35000, SampleLetter::M),
    (150000, SampleLetter::N),
    (500000, SampleLetter::P),
];

impl SampleLetter {
    /// All letters in table order
    pub const ALL: [SampleLetter; 15] = [
        SampleLetter::A,
        SampleLetter::B,
        SampleLetter::C,
        SampleLetter::D,
        SampleLetter::E,
        SampleLetter::F,
        SampleLetter::G,
        SampleLetter::H,
        SampleLetter::J,
        SampleLetter::K,
        SampleLetter::L,
        SampleLetter::M,
        SampleLetter::N,
        SampleLetter::P,
        SampleLetter::Q,
    ];

    /// Number of samples drawn per step for this letter
    pub fn sample_size(&self) -> usize {
        match self {
            SampleLetter::A
            | SampleLetter::B
            | SampleLetter::C
            | SampleLetter::D
            | SampleLetter::E
            | SampleLetter::F => 2,
            SampleLetter::G => 3,
            SampleLetter::H => 5,
            SampleLetter::J => 8,
            SampleLetter::K => 13,
            SampleLetter::L => 20,
            SampleLetter::M => 32,
            SampleLetter::N => 50,
            SampleLetter::P => 80,
            SampleLetter::Q => 125,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SampleLetter::A => "A",
            SampleLetter::B => "B",
            SampleLetter::C => "C",
            SampleLetter::D => "D",
            SampleLetter::E => "E",
            SampleLetter::F => "F",
            SampleLetter::G => "G",
            SampleLetter::H => "H",
            SampleLetter::J => "J",
            SampleLetter::K => "K",
            SampleLetter::L => "L",
            SampleLetter::M => "M",
            SampleLetter::N => "N",
            SampleLetter::P => "P",
            SampleLetter::Q => "Q",
        }
    }
}

impl std::fmt::Display for SampleLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SampleLetter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        SampleLetter::ALL
            .iter()
            .find(|l| l.as_str() == upper)
            .copied()
            .ok_or_else(|| {
                format!(
                    "Invalid sample letter: {}. Use one of A-H, J-N, P, Q",
                    s
                )
            })
    }
}

/// One of the five sequential sampling stages
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum InspectionStep {
    #[default]
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl InspectionStep {
    pub const ALL: [InspectionStep; 5] = [
        InspectionStep::First,
        InspectionStep::Second,
        InspectionStep::Third,
        InspectionStep::Fourth,
        InspectionStep::Fifth,
    ];

    /// Number of steps in a multiple sampling scheme
    pub const COUNT: usize = 5;

    /// Zero-based position of this step
    pub fn index(&self) -> usize {
        match self {
            InspectionStep::First => 0,
            InspectionStep::Second => 1,
            InspectionStep::Third => 2,
            InspectionStep::Fourth => 3,
            InspectionStep::Fifth => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The following step, or `None` at the fifth step
    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }
}

impl std::fmt::Display for InspectionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InspectionStep::First => write!(f, "first"),
            InspectionStep::Second => write!(f, "second"),
            InspectionStep::Third => write!(f, "third"),
            InspectionStep::Fourth => write!(f, "fourth"),
            InspectionStep::Fifth => write!(f, "fifth"),
        }
    }
}

impl std::str::FromStr for InspectionStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" | "1" => Ok(InspectionStep::First),
            "second" | "2" => Ok(InspectionStep::Second),
            "third" | "3" => Ok(InspectionStep::Third),
            "fourth" | "4" => Ok(InspectionStep::Fourth),
            "fifth" | "5" => Ok(InspectionStep::Fifth),
            _ => Err(format!(
                "Invalid step: {}. Use first, second, third, fourth, fifth (or 1-5)",
                s
            )),
        }
    }
}

/// Sample plan derived from a batch quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePlan {
    /// Sample-size code letter
    pub letter: SampleLetter,

    /// Samples per step
    pub size: usize,
}

impl SamplePlan {
    pub fn for_letter(letter: SampleLetter) -> Self {
        Self {
            letter,
            size: letter.sample_size(),
        }
    }
}

/// Resolve the sample plan for a batch quantity
pub fn resolve(quantity: i64) -> Result<SamplePlan, InspectionError> {
    if quantity <= 0 {
        return Err(InspectionError::InvalidBatchQuantity(quantity.to_string()));
    }

    let quantity = quantity as u64;
    let letter = BREAKPOINTS
        .iter()
        .find(|(upper, _)| quantity <= *upper)
        .map(|(_, letter)| *letter)
        .unwrap_or(SampleLetter::Q);

    Ok(SamplePlan::for_letter(letter))
}

/// Resolve the sample plan from user input
///
/// Anything that is not a whole number is rejected rather than coerced.
pub fn resolve_str(input: &str) -> Result<SamplePlan, InspectionError> {
    let trimmed = input.trim();
    let quantity = trimmed
        .parse::<i64>()
        .map_err(|_| InspectionError::InvalidBatchQuantity(trimmed.to_string()))?;
    resolve(quantity)
}
