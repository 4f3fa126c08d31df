//! CLI command implementations

pub mod coating;
pub mod completions;
pub mod init;
pub mod insp;
pub mod plan;
pub mod table;
