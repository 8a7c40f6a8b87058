use std::env;
use std::path::PathBuf;

/// Default API server port.
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub vehicles: Option<PathBuf>,
    pub routes: Option<PathBuf>,
    pub base_load: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub seed: Option<u64>,
    pub zip: bool,
    pub log_json: bool,
    pub serve: bool,
    pub port: u16,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions {
        config: None,
        preset: None,
        vehicles: None,
        routes: None,
        base_load: None,
        out: None,
        seed: None,
        zip: false,
        log_json: false,
        serve: false,
        port: DEFAULT_PORT,
    };

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" | "--preset" | "--vehicles" | "--routes" | "--base-load" | "--out" => {
                i += 1;
                let value = args.next_or_err(i, &format!("missing value for {flag}"))?;
                let replaced = match flag {
                    "--config" => opts.config.replace(PathBuf::from(value)).is_some(),
                    "--preset" => opts.preset.replace(value.to_string()).is_some(),
                    "--vehicles" => opts.vehicles.replace(PathBuf::from(value)).is_some(),
                    "--routes" => opts.routes.replace(PathBuf::from(value)).is_some(),
                    "--base-load" => opts.base_load.replace(PathBuf::from(value)).is_some(),
                    _ => opts.out.replace(PathBuf::from(value)).is_some(),
                };
                if replaced {
                    return Err(format!("{flag} provided more than once"));
                }
            }
            "--seed" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{value}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--port" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = value
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{value}\" is not a valid u16"))?;
            }
            "--zip" => opts.zip = true,
            "--log-json" => opts.log_json = true,
            "--serve" => opts.serve = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    let given = [&opts.vehicles, &opts.routes, &opts.base_load]
        .iter()
        .filter(|p| p.is_some())
        .count();
    if given != 0 && given != 3 {
        return Err(
            "`--vehicles`, `--routes` and `--base-load` must be given together".to_string(),
        );
    }

    if opts.config.is_none() && opts.preset.is_none() {
        opts.preset = Some("demo".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("fleet-charge-sim: depot EV charging simulator");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  fleet-charge-sim [--config <path> | --preset <name>] \
         [--vehicles <csv> --routes <csv> --base-load <csv>] [--out <dir>] [--zip]"
    );
    eprintln!("                   [--seed <u64>] [--log-json] [--serve] [--port <u16>]");
    eprintln!();
    eprintln!("Presets: demo (default), large_fleet, tight_windows");
    eprintln!("Input files replace the synthetic fleet of the chosen config.");
    eprintln!("--zip also bundles the tables into <out>/simulation_results.zip.");
}
