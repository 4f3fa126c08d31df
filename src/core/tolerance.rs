//! Dimensions and tolerance classification

use serde::{Deserialize, Serialize};

use crate::core::error::InspectionError;

/// Absolute slack applied at the band edges so that decimal inputs such as
/// `10.2` against `10.0 + 0.2` are not rejected by binary rounding.
const BAND_EPSILON: f64 = 1e-9;

/// A single measured characteristic
///
/// Both tolerances are stored as magnitudes; the accepted band is
/// `[nominal - tolerance_minus, nominal + tolerance_plus]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Short identifier, unique within an inspection (e.g. "A", "Ø12")
    pub code: String,

    /// Target value
    pub nominal: f64,

    /// Plus tolerance (stored as positive number)
    pub tolerance_plus: f64,

    /// Minus tolerance (stored as positive number)
    pub tolerance_minus: f64,

    /// Free-text label
    #[serde(default)]
    pub description: String,
}

impl Dimension {
    /// Create a dimension, rejecting negative or non-finite tolerances
    pub fn new(
        code: impl Into<String>,
        nominal: f64,
        tolerance_plus: f64,
        tolerance_minus: f64,
    ) -> Result<Self, InspectionError> {
        let dim = Self {
            code: code.into(),
            nominal,
            tolerance_plus,
            tolerance_minus,
            description: String::new(),
        };
        dim.validate()?;
        Ok(dim)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check the dimension's invariants
    pub fn validate(&self) -> Result<(), InspectionError> {
        let invalid = |reason: &str| InspectionError::InvalidDimension {
            code: self.code.clone(),
            reason: reason.to_string(),
        };

        if self.code.trim().is_empty() {
            return Err(invalid("code must not be empty"));
        }
        if !self.nominal.is_finite() {
            return Err(invalid("nominal must be a finite number"));
        }
        if !self.tolerance_plus.is_finite() || self.tolerance_plus < 0.0 {
            return Err(invalid("plus tolerance must be a non-negative number"));
        }
        if !self.tolerance_minus.is_finite() || self.tolerance_minus < 0.0 {
            return Err(invalid("minus tolerance must be a non-negative number"));
        }
        Ok(())
    }

    /// Upper limit of the acceptable band
    pub fn upper_limit(&self) -> f64 {
        self.nominal + self.tolerance_plus
    }

    /// Lower limit of the acceptable band
    pub fn lower_limit(&self) -> f64 {
        self.nominal - self.tolerance_minus
    }

    /// Inclusive band check on a parsed value
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower_limit() - BAND_EPSILON && value <= self.upper_limit() + BAND_EPSILON
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    /// Parse `CODE:NOMINAL:PLUS:MINUS[:DESCRIPTION]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(5, ':').collect();
        if parts.len() < 4 {
            return Err(format!(
                "Invalid dimension '{}'. Use CODE:NOMINAL:PLUS:MINUS[:DESCRIPTION]",
                s
            ));
        }

        let number = |label: &str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid {} '{}' in dimension '{}'", label, raw, s))
        };

        let dim = Dimension::new(
            parts[0].trim(),
            number("nominal", parts[1])?,
            number("plus tolerance", parts[2])?,
            number("minus tolerance", parts[3])?,
        )
        .map_err(|e| e.to_string())?;

        Ok(match parts.get(4) {
            Some(desc) => dim.with_description(desc.trim()),
            None => dim,
        })
    }
}

/// How a raw measurement entry relates to its dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Nothing entered yet
    Unmeasured,
    /// Inside the tolerance band
    Conforming,
    /// Parsed, but outside the band
    NonConforming,
    /// Entered but not a number
    Unparsable,
}

impl Classification {
    /// Whether the entry counts as a non-conformity
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            Classification::NonConforming | Classification::Unparsable
        )
    }
}

/// Parse a raw measurement entry
///
/// Returns `None` for empty entries and `Some(Err(()))` for garbled ones.
pub(crate) fn parse_measurement(raw: &str) -> Option<Result<f64, ()>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(()),
    )
}

/// Classify a raw measurement against a dimension
pub fn classify(dimension: &Dimension, raw: &str) -> Classification {
    match parse_measurement(raw) {
        None => Classification::Unmeasured,
        Some(Err(())) => Classification::Unparsable,
        Some(Ok(value)) if dimension.contains(value) => Classification::Conforming,
        Some(Ok(_)) => Classification::NonConforming,
    }
}

/// Whether a raw measurement is acceptable
///
/// Unmeasured entries are not violations; entries that cannot be parsed are.
pub fn is_within_tolerance(dimension: &Dimension, raw: &str) -> bool {
    !classify(dimension, raw).is_violation()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim() -> Dimension {
        Dimension::new("A", 10.0, 0.2, 0.3).unwrap()
    }

    #[test]
    fn test_band_is_inclusive() {
        let d = dim();
        assert!(is_within_tolerance(&d, "10.2"));
        assert!(!is_within_tolerance(&d, "10.3"));
        assert!(is_within_tolerance(&d, "9.7"));
        assert!(!is_within_tolerance(&d, "9.69"));
        assert!(is_within_tolerance(&d, "10"));
    }

    #[test]
    fn test_empty_and_garbled_entries() {
        let d = dim();
        assert!(is_within_tolerance(&d, ""));
        assert!(is_within_tolerance(&d, "   "));
        assert!(!is_within_tolerance(&d, "abc"));
        assert_eq!(classify(&d, ""), Classification::Unmeasured);
        assert_eq!(classify(&d, "abc"), Classification::Unparsable);
        assert_eq!(classify(&d, "11"), Classification::NonConforming);
        assert_eq!(classify(&d, "10.1"), Classification::Conforming);
    }

    #[test]
    fn test_decimal_comma_is_accepted() {
        assert!(is_within_tolerance(&dim(), "10,1"));
    }

    #[test]
    fn test_zero_tolerance_accepts_only_nominal() {
        let d = Dimension::new("B", 5.0, 0.0, 0.0).unwrap();
        assert!(is_within_tolerance(&d, "5"));
        assert!(is_within_tolerance(&d, "5.000"));
        assert!(!is_within_tolerance(&d, "5.001"));
        assert!(!is_within_tolerance(&d, "4.999"));
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        assert!(Dimension::new("C", 1.0, -0.1, 0.1).is_err());
        assert!(Dimension::new("C", 1.0, 0.1, -0.1).is_err());
        assert!(Dimension::new("", 1.0, 0.1, 0.1).is_err());
        assert!(Dimension::new("C", f64::NAN, 0.1, 0.1).is_err());
    }

    #[test]
    fn test_parse_dimension_argument() {
        let d: Dimension = "Ø12:12:0.05:0.1:Bore diameter".parse().unwrap();
        assert_eq!(d.code, "Ø12");
        assert_eq!(d.nominal, 12.0);
        assert_eq!(d.tolerance_plus, 0.05);
        assert_eq!(d.tolerance_minus, 0.1);
        assert_eq!(d.description, "Bore diameter");

        assert!("A:10:0.1".parse::<Dimension>().is_err());
        assert!("A:ten:0.1:0.1".parse::<Dimension>().is_err());
        assert!("A:10:-1:0.1".parse::<Dimension>().is_err());
    }
}
