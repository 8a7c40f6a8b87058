//! Fleet charging simulator entry point: CLI wiring and config-driven runs.

mod cli;

use std::fmt::Display;
use std::process;

use fleet_charge_sim::config::RunConfig;
use fleet_charge_sim::fleet::SyntheticFleet;
use fleet_charge_sim::io::{ARCHIVE_FILE, export_archive, export_run, load_inputs};
use fleet_charge_sim::logging::init_tracing;
use fleet_charge_sim::report::SimulationReport;
use fleet_charge_sim::sim::Engine;
use tracing::info;

use crate::cli::CliOptions;

fn fail(err: impl Display) -> ! {
    eprintln!("error: {err}");
    process::exit(1);
}

/// Resolves the run configuration: `--config` or `--preset`, then CLI overrides.
fn load_config(opts: &CliOptions) -> RunConfig {
    let loaded = match (&opts.config, &opts.preset) {
        (Some(path), _) => RunConfig::from_toml_file(path),
        (None, Some(name)) => RunConfig::from_preset(name),
        (None, None) => Ok(RunConfig::demo()),
    };
    let mut cfg = loaded.unwrap_or_else(|e| fail(e));

    if let Some(seed) = opts.seed {
        cfg.synthetic.seed = seed;
    }
    if let Some(dir) = &opts.out {
        cfg.output.dir = dir.clone();
    }
    if opts.zip {
        cfg.output.archive = true;
    }
    if opts.vehicles.is_some() {
        cfg.inputs.vehicles = opts.vehicles.clone();
        cfg.inputs.routes = opts.routes.clone();
        cfg.inputs.base_load = opts.base_load.clone();
    }
    cfg
}

fn main() {
    let opts = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });

    init_tracing(opts.log_json);

    let cfg = load_config(&opts);
    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let inputs = match cfg.input_paths() {
        Some(paths) => load_inputs(&paths).unwrap_or_else(|e| fail(e)),
        None => {
            info!(
                seed = cfg.synthetic.seed,
                vehicles = cfg.synthetic.vehicles,
                "generating synthetic fleet"
            );
            SyntheticFleet::generate(&cfg.synthetic)
        }
    };

    let run = Engine::new(&inputs)
        .and_then(|engine| engine.run(&cfg.simulation.policies))
        .unwrap_or_else(|e| fail(e));
    let report = SimulationReport::from_run(&run);

    for policy in &report.policies {
        println!("{}\n", policy.kpi);
    }
    if let Some(cmp) = &report.comparison {
        println!("{cmp}\n");
    }

    let written = export_run(&report, &cfg.output.dir).unwrap_or_else(|e| fail(e));
    println!("Wrote {} files to {}", written.len(), cfg.output.dir.display());

    if cfg.output.archive {
        let path = cfg.output.dir.join(ARCHIVE_FILE);
        export_archive(&report, &path).unwrap_or_else(|e| fail(e));
        println!("Wrote archive {}", path.display());
    }

    if opts.serve {
        serve(report, opts.port);
    }
}

#[cfg(feature = "api")]
fn serve(report: SimulationReport, port: u16) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use fleet_charge_sim::api::{self, AppState};

    let state = Arc::new(AppState { report });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
    if let Err(e) = rt.block_on(api::serve(state, addr)) {
        fail(format!("API server on {addr}: {e}"));
    }
}

#[cfg(not(feature = "api"))]
fn serve(_report: SimulationReport, _port: u16) {
    fail("--serve requires a build with the `api` feature");
}
