//! File boundary: CSV input tables in, CSV result tables or a ZIP archive out.

pub mod export;
pub mod ingest;

pub use export::{
    ARCHIVE_FILE, ENERGY_REQUIREMENTS_FILE, export_archive, export_run, write_archive,
    write_energy_requirements_csv, write_result_csv,
};
pub use ingest::{InputPaths, SimulationInputs, load_inputs, read_base_load, read_routes, read_vehicles};
