//! TOML-based run configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::io::ingest::InputPaths;
use crate::sim::ChargePolicy;

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults matching the `demo` preset. Load from TOML with
/// [`RunConfig::from_toml_file`] or pick a preset with
/// [`RunConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Input table locations. When unset the synthetic fleet is used.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Export destination.
    #[serde(default)]
    pub output: OutputConfig,
    /// Which policies to run.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Synthetic fleet parameters.
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

/// Paths of the three CSV input tables; give all of them or none.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    pub vehicles: Option<PathBuf>,
    pub routes: Option<PathBuf>,
    pub base_load: Option<PathBuf>,
}

impl InputsConfig {
    fn given(&self) -> usize {
        [&self.vehicles, &self.routes, &self.base_load]
            .iter()
            .filter(|p| p.is_some())
            .count()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory the CSV tables are written to.
    pub dir: PathBuf,
    /// Also bundle the tables into `simulation_results.zip` in `dir`.
    pub archive: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            archive: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Policies in run order: `"spread"` and/or `"frontload"`.
    pub policies: Vec<ChargePolicy>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            policies: ChargePolicy::ALL.to_vec(),
        }
    }
}

/// Synthetic depot parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    /// Master random seed.
    pub seed: u64,
    /// Number of vehicles (must be > 0).
    pub vehicles: usize,
    /// Routes generated per vehicle (must be > 0).
    pub routes_per_vehicle: usize,
    /// Charger ratings vehicles are drawn from (kW).
    pub charge_speeds_kw: Vec<f64>,
    pub efficiency_kwh_km_min: f64,
    pub efficiency_kwh_km_max: f64,
    pub route_km_min: f64,
    pub route_km_max: f64,
    /// Earliest return hour (inclusive).
    pub return_hour_min: u32,
    /// Latest return hour (inclusive).
    pub return_hour_max: u32,
    /// Earliest next-morning departure hour (inclusive).
    pub departure_hour_min: u32,
    /// Latest next-morning departure hour (inclusive).
    pub departure_hour_max: u32,
    /// Mean site load (kW).
    pub base_kw: f64,
    /// Daily sinusoid amplitude (kW).
    pub amp_kw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (kW).
    pub noise_std_kw: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            vehicles: 5,
            routes_per_vehicle: 1,
            charge_speeds_kw: vec![11.0, 22.0, 50.0],
            efficiency_kwh_km_min: 0.8,
            efficiency_kwh_km_max: 1.4,
            route_km_min: 40.0,
            route_km_max: 180.0,
            return_hour_min: 16,
            return_hour_max: 21,
            departure_hour_min: 4,
            departure_hour_max: 8,
            base_kw: 60.0,
            amp_kw: 20.0,
            // evening peak
            phase_rad: std::f64::consts::PI,
            noise_std_kw: 2.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"synthetic.vehicles"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl RunConfig {
    /// Small mixed depot with one overnight route per vehicle.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Forty vehicles on faster chargers against a larger site load.
    pub fn large_fleet() -> Self {
        Self {
            synthetic: SyntheticConfig {
                vehicles: 40,
                charge_speeds_kw: vec![22.0, 50.0, 150.0],
                base_kw: 250.0,
                amp_kw: 80.0,
                noise_std_kw: 6.0,
                ..SyntheticConfig::default()
            },
            ..Self::default()
        }
    }

    /// Late returns, early departures and long routes, so some routes go
    /// unserved.
    pub fn tight_windows() -> Self {
        Self {
            synthetic: SyntheticConfig {
                vehicles: 8,
                charge_speeds_kw: vec![11.0, 22.0],
                route_km_min: 150.0,
                route_km_max: 300.0,
                return_hour_min: 21,
                return_hour_max: 23,
                departure_hour_min: 3,
                departure_hour_max: 5,
                ..SyntheticConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "large_fleet", "tight_windows"];

    /// Loads a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "large_fleet" => Ok(Self::large_fleet()),
            "tight_windows" => Ok(Self::tight_windows()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// Relative input paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;

        if let Some(base) = path.parent() {
            let inputs = &mut cfg.inputs;
            for slot in [&mut inputs.vehicles, &mut inputs.routes, &mut inputs.base_load] {
                if let Some(p) = slot.as_mut().filter(|p| p.is_relative()) {
                    *p = base.join(&*p);
                }
            }
        }
        Ok(cfg)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Input file locations, when all three are configured.
    pub fn input_paths(&self) -> Option<InputPaths> {
        let i = &self.inputs;
        Some(InputPaths {
            vehicles: i.vehicles.clone()?,
            routes: i.routes.clone()?,
            base_load: i.base_load.clone()?,
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let given = self.inputs.given();
        if given != 0 && given != 3 {
            errors.push(ConfigError::new(
                "inputs",
                "vehicles, routes and base_load must be given together",
            ));
        }

        if self.output.dir.as_os_str().is_empty() {
            errors.push(ConfigError::new("output.dir", "must not be empty"));
        }

        let policies = &self.simulation.policies;
        if policies.is_empty() {
            errors.push(ConfigError::new("simulation.policies", "must not be empty"));
        }
        for (i, p) in policies.iter().enumerate() {
            if policies[..i].contains(p) {
                errors.push(ConfigError::new(
                    "simulation.policies",
                    format!("\"{p}\" listed more than once"),
                ));
            }
        }

        let s = &self.synthetic;
        if s.vehicles == 0 {
            errors.push(ConfigError::new("synthetic.vehicles", "must be > 0"));
        }
        if s.routes_per_vehicle == 0 {
            errors.push(ConfigError::new("synthetic.routes_per_vehicle", "must be > 0"));
        }
        if s.charge_speeds_kw.is_empty() {
            errors.push(ConfigError::new("synthetic.charge_speeds_kw", "must not be empty"));
        }
        if s.charge_speeds_kw.iter().any(|kw| !kw.is_finite() || *kw <= 0.0) {
            errors.push(ConfigError::new("synthetic.charge_speeds_kw", "every value must be > 0"));
        }
        for (field, value) in [
            ("synthetic.efficiency_kwh_km_min", s.efficiency_kwh_km_min),
            ("synthetic.efficiency_kwh_km_max", s.efficiency_kwh_km_max),
            ("synthetic.route_km_min", s.route_km_min),
            ("synthetic.route_km_max", s.route_km_max),
            ("synthetic.base_kw", s.base_kw),
            ("synthetic.amp_kw", s.amp_kw),
            ("synthetic.phase_rad", s.phase_rad),
            ("synthetic.noise_std_kw", s.noise_std_kw),
        ] {
            if !value.is_finite() {
                errors.push(ConfigError::new(field, "must be a finite number"));
            }
        }
        if s.efficiency_kwh_km_min < 0.0 {
            errors.push(ConfigError::new("synthetic.efficiency_kwh_km_min", "must be >= 0"));
        }
        if s.efficiency_kwh_km_min > s.efficiency_kwh_km_max {
            errors.push(ConfigError::new(
                "synthetic.efficiency_kwh_km_min",
                "must be <= synthetic.efficiency_kwh_km_max",
            ));
        }
        if s.route_km_min < 0.0 {
            errors.push(ConfigError::new("synthetic.route_km_min", "must be >= 0"));
        }
        if s.route_km_min > s.route_km_max {
            errors.push(ConfigError::new(
                "synthetic.route_km_min",
                "must be <= synthetic.route_km_max",
            ));
        }
        for (field, min, max) in [
            ("synthetic.return_hour", s.return_hour_min, s.return_hour_max),
            ("synthetic.departure_hour", s.departure_hour_min, s.departure_hour_max),
        ] {
            if max >= 24 {
                errors.push(ConfigError::new(&format!("{field}_max"), "must be < 24"));
            }
            if min > max {
                errors.push(ConfigError::new(
                    &format!("{field}_min"),
                    format!("must be <= {field}_max"),
                ));
            }
        }
        if s.noise_std_kw < 0.0 {
            errors.push(ConfigError::new("synthetic.noise_std_kw", "must be >= 0"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_preset_valid() {
        let errors = RunConfig::demo().validate();
        assert!(errors.is_empty(), "demo should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = RunConfig::from_preset("nonexistent");
        assert!(err.as_ref().is_err_and(|e| e.message.contains("unknown preset")));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in RunConfig::PRESETS {
            let cfg = RunConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(RunConfig::validate).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[inputs]
vehicles = "data/vehicles.csv"
routes = "data/routes.csv"
base_load = "data/base_load.csv"

[output]
dir = "results"
archive = true

[simulation]
policies = ["frontload"]

[synthetic]
seed = 7
vehicles = 12
charge_speeds_kw = [22.0]
"#;
        let cfg = RunConfig::from_toml_str(toml).expect("valid TOML should parse");
        assert_eq!(cfg.simulation.policies, vec![ChargePolicy::Frontload]);
        assert_eq!(cfg.output.dir, PathBuf::from("results"));
        assert!(cfg.output.archive);
        assert_eq!(cfg.synthetic.vehicles, 12);
        // untouched fields keep defaults
        assert_eq!(cfg.synthetic.routes_per_vehicle, 1);
        let paths = cfg.input_paths().expect("all three paths given");
        assert_eq!(paths.routes, PathBuf::from("data/routes.csv"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let toml = r#"
[synthetic]
vehicles = 3
bogus_field = true
"#;
        assert!(RunConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let toml = r#"
[simulation]
policies = ["balanced"]
"#;
        assert!(RunConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_inputs_are_rejected() {
        let mut cfg = RunConfig::demo();
        cfg.inputs.vehicles = Some(PathBuf::from("vehicles.csv"));
        assert!(cfg.input_paths().is_none());
        assert!(cfg.validate().iter().any(|e| e.field == "inputs"));
    }

    #[test]
    fn validation_collects_every_error() {
        let mut cfg = RunConfig::demo();
        cfg.synthetic.vehicles = 0;
        cfg.synthetic.return_hour_max = 25;
        cfg.simulation.policies = vec![ChargePolicy::Spread, ChargePolicy::Spread];
        let errors = cfg.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"synthetic.vehicles"));
        assert!(fields.contains(&"synthetic.return_hour_max"));
        assert!(fields.contains(&"simulation.policies"));
    }

    #[test]
    fn non_finite_synthetic_values_are_rejected() {
        let cfg = RunConfig::from_toml_str("[synthetic]\nroute_km_min = nan\n")
            .expect("nan is valid TOML");
        assert!(cfg.validate().iter().any(|e| e.field == "synthetic.route_km_min"));

        let cfg = RunConfig::from_toml_str("[synthetic]\nefficiency_kwh_km_max = inf\n")
            .expect("inf is valid TOML");
        assert!(
            cfg.validate()
                .iter()
                .any(|e| e.field == "synthetic.efficiency_kwh_km_max")
        );

        let mut cfg = RunConfig::demo();
        cfg.synthetic.noise_std_kw = f64::NAN;
        cfg.synthetic.base_kw = f64::INFINITY;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.iter().any(|f| f == "synthetic.noise_std_kw"));
        assert!(fields.iter().any(|f| f == "synthetic.base_kw"));
    }

    #[test]
    fn tight_windows_shortens_windows() {
        let demo = RunConfig::demo();
        let tight = RunConfig::tight_windows();
        assert!(tight.synthetic.return_hour_min > demo.synthetic.return_hour_min);
        assert!(tight.synthetic.departure_hour_max < demo.synthetic.departure_hour_max);
    }

    #[test]
    fn config_file_resolves_relative_inputs() {
        let dir = std::env::temp_dir().join(format!("fleet-charge-config-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("run.toml");
        fs::write(
            &path,
            "[inputs]\nvehicles = \"v.csv\"\nroutes = \"r.csv\"\nbase_load = \"/abs/b.csv\"\n",
        )
        .expect("write config");

        let cfg = RunConfig::from_toml_file(&path).expect("config parses");
        let paths = cfg.input_paths().expect("all three paths given");
        assert_eq!(paths.vehicles, dir.join("v.csv"));
        assert_eq!(paths.base_load, PathBuf::from("/abs/b.csv"));
        fs::remove_dir_all(&dir).ok();
    }
}
