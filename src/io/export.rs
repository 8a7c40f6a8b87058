//! CSV export of the energy requirements and per-policy result tables, as
//! loose files or bundled into one ZIP archive.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{Result, SimError};
use crate::fleet::PlannedRoute;
use crate::report::{ResultTable, SimulationReport};

/// File name of the energy requirements table.
pub const ENERGY_REQUIREMENTS_FILE: &str = "energy_requirements.csv";
/// File name of the archive bundling every table of a run.
pub const ARCHIVE_FILE: &str = "simulation_results.zip";

fn csv_error(table: &'static str) -> impl FnOnce(csv::Error) -> SimError {
    move |source| SimError::Csv { table, source }
}

/// Writes one row per route with its resolved window and energy requirement.
///
/// # Errors
///
/// Returns [`SimError::Csv`] if writing fails.
pub fn write_energy_requirements_csv(routes: &[PlannedRoute], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for route in routes {
        wtr.serialize(route).map_err(csv_error("energy_requirements"))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a result table: header row, then one row per interval.
///
/// Output is byte-identical for identical tables.
///
/// # Errors
///
/// Returns [`SimError::Csv`] if writing fails.
pub fn write_result_csv(table: &ResultTable, writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(table.header())
        .map_err(csv_error("results"))?;

    for i in 0..table.len() {
        let Some(cells) = table.row(i) else { break };
        wtr.write_record(cells.iter().map(ToString::to_string))
            .map_err(csv_error("results"))?;
    }

    wtr.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        SimError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot create \"{}\": {e}", path.display()),
        ))
    })?;
    Ok(BufWriter::new(file))
}

/// Writes every table of `report` into `dir`, creating it if needed.
///
/// Produces `energy_requirements.csv` plus one
/// `simulation_results_{with,without}_management.csv` per policy that ran.
/// Existing files are overwritten. Returns the written paths.
///
/// # Errors
///
/// Returns the first I/O or CSV error.
pub fn export_run(report: &SimulationReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(1 + report.policies.len());

    let path = dir.join(ENERGY_REQUIREMENTS_FILE);
    write_energy_requirements_csv(&report.routes, create(&path)?)?;
    info!(path = %path.display(), rows = report.routes.len(), "energy requirements written");
    written.push(path);

    for policy in &report.policies {
        let path = dir.join(format!("{}.csv", policy.policy.results_stem()));
        write_result_csv(&policy.table, create(&path)?)?;
        info!(
            path = %path.display(),
            policy = %policy.policy,
            rows = policy.table.len(),
            "result table written"
        );
        written.push(path);
    }

    Ok(written)
}

/// Writes every table of `report` as entries of one ZIP archive.
///
/// Entry order matches [`export_run`]. Entries carry a fixed timestamp, so
/// identical reports produce identical archives. Returns the inner writer.
///
/// # Errors
///
/// Returns [`SimError::Archive`] if an entry cannot be started or the archive
/// cannot be finished, or the first CSV error.
pub fn write_archive<W: Write + Seek>(report: &SimulationReport, writer: W) -> Result<W> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());
    let mut zip = ZipWriter::new(writer);

    zip.start_file(ENERGY_REQUIREMENTS_FILE, options)?;
    write_energy_requirements_csv(&report.routes, &mut zip)?;

    for policy in &report.policies {
        zip.start_file(format!("{}.csv", policy.policy.results_stem()), options)?;
        write_result_csv(&policy.table, &mut zip)?;
    }

    Ok(zip.finish()?)
}

/// Writes the run archive to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns the first I/O, CSV or archive error.
pub fn export_archive(report: &SimulationReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = write_archive(report, create(path)?)?;
    file.flush()?;
    info!(
        path = %path.display(),
        entries = 1 + report.policies.len(),
        "result archive written"
    );
    Ok(())
}
