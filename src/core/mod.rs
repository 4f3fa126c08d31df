//! Core module - sampling engine and shared infrastructure

pub mod aggregate;
pub mod coating;
pub mod config;
pub mod decision;
pub mod entity;
pub mod error;
pub mod identity;
pub mod loader;
pub mod measurement;
pub mod project;
pub mod run;
pub mod sampling;
pub mod shortid;
pub mod table;
pub mod tolerance;

pub use aggregate::{aggregate, Aggregate};
pub use coating::{CoatingKind, CoatingRequirements, CoatingStats, Reading};
pub use config::Config;
pub use decision::{evaluate, Decision, Evaluation};
pub use entity::Entity;
pub use error::InspectionError;
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use measurement::MeasurementSet;
pub use project::{Project, ProjectError};
pub use run::{reduce, Action, InspectionRun, InspectionStatus, StatusView};
pub use sampling::{resolve, InspectionStep, SampleLetter, SamplePlan};
pub use shortid::ShortIdIndex;
pub use table::{AcReEntry, AcReTable, Acceptance};
pub use tolerance::{classify, is_within_tolerance, Classification, Dimension};
