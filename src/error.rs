//! Error type shared by ingestion, planning and scheduling.

use thiserror::Error;

/// Failure of a simulation run.
///
/// Every variant aborts the whole run; no partial tables are produced.
#[derive(Debug, Error)]
pub enum SimError {
    /// A return or departure time could not be parsed into an interval.
    #[error("invalid time format: \"{0}\" (expected HH:MM, HH:MM:SS, HH.MM or h:mm AM/PM)")]
    InvalidTimeFormat(String),

    /// A route references a vehicle id missing from the fleet table.
    #[error("route {route_index} references unknown vehicle \"{vehicle_id}\"")]
    UnknownVehicleReference {
        /// Zero-based position of the route in the route table.
        route_index: usize,
        /// The unresolved vehicle id.
        vehicle_id: String,
    },

    /// The baseline load series is empty, so it cannot be repeated.
    #[error("baseline load series is empty; at least one value is required")]
    InsufficientBaselineData,

    /// Two vehicle records share the same id.
    #[error("duplicate vehicle id \"{0}\" in fleet table")]
    DuplicateVehicle(String),

    /// A record failed boundary validation.
    #[error("invalid {table} record at row {row}: {message}")]
    InvalidRecord {
        table: &'static str,
        row: usize,
        message: String,
    },

    /// A CSV table could not be read or written.
    #[error("{table} table: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    /// The result archive could not be written.
    #[error("result archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SimError>;
