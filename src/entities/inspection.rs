//! INSP entity type - Batch inspection record
//!
//! Holds everything an inspection needs to be resumed from disk: the
//! dimension list, the sampling run (plan, step, measurements, derived
//! counts and status) and the coating readings. All fields are plain data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::coating::Reading;
use crate::core::entity::Entity;
use crate::core::error::InspectionError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::run::InspectionRun;
use crate::core::tolerance::Dimension;

/// Coating readings taken on the batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoatingRecord {
    /// Thickness readings (empty strings are unmeasured slots)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub readings: Vec<Reading>,

    /// Unit of the readings
    #[serde(default = "default_coating_unit")]
    pub unit: String,
}

fn default_coating_unit() -> String {
    "µm".to_string()
}

/// Batch inspection entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    /// Unique identifier (INSP-xxx)
    pub id: EntityId,

    /// Descriptive title
    pub title: String,

    /// User-defined lot / batch number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,

    /// Product or part under inspection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    /// Sampling run (dimensions, plan, measurements, status)
    pub run: InspectionRun,

    /// Coating thickness readings
    #[serde(default)]
    pub coating: CoatingRecord,

    /// Inspection notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Inspector
    pub author: String,

    /// Entity revision number
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for Inspection {
    const PREFIX: EntityPrefix = EntityPrefix::Insp;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> String {
        self.run.inspection_status.to_string()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

/// Read-only view handed to report renderers
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport<'a> {
    pub id: &'a EntityId,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_quantity: Option<u64>,
    pub dimensions: &'a [Dimension],
    /// Dimension code -> flat list of values (step-major), "" for unmeasured
    pub measurements: BTreeMap<String, Vec<String>>,
    pub coating: &'a CoatingRecord,
}

impl Inspection {
    /// Create a new Inspection for the given dimensions
    pub fn new(
        title: String,
        dimensions: Vec<Dimension>,
        author: String,
    ) -> Result<Self, InspectionError> {
        Ok(Self {
            id: EntityId::new(EntityPrefix::Insp),
            title,
            lot_number: None,
            product: None,
            run: InspectionRun::new(dimensions)?,
            coating: CoatingRecord {
                readings: Vec::new(),
                unit: default_coating_unit(),
            },
            notes: None,
            created: Utc::now(),
            author,
            entity_revision: 1,
        })
    }

    /// Plain nested mapping of the measurements plus the dimension list
    pub fn report(&self) -> InspectionReport<'_> {
        InspectionReport {
            id: &self.id,
            title: &self.title,
            lot_number: self.lot_number.as_deref(),
            batch_quantity: self.run.batch_quantity,
            dimensions: &self.run.dimensions,
            measurements: self.run.measurements.to_flat(),
            coating: &self.coating,
        }
    }
}
