//! Seeded synthetic depot used by presets when no input files are given.

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::route::RouteRecord;
use super::vehicle::Vehicle;
use crate::config::SyntheticConfig;
use crate::io::ingest::SimulationInputs;

/// Hourly resolution of the generated baseline profile.
const BASELINE_POINTS: usize = 24;
/// Minute offsets a generated return or departure time can fall on.
const MINUTE_SLOTS: [u32; 4] = [0, 15, 30, 45];

/// Generator for reproducible fleets, routes and baseline load profiles.
///
/// The baseline is deliberately produced at hourly resolution (24 points) so
/// that it is cyclically stretched across the half-hour grid like a short
/// user-supplied profile would be.
pub struct SyntheticFleet {
    rng: StdRng,
}

impl SyntheticFleet {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates a complete input set from `config`.
    ///
    /// Identical configs always yield identical inputs.
    pub fn generate(config: &SyntheticConfig) -> SimulationInputs {
        let mut generator = Self::new(config.seed);

        let vehicles: Vec<Vehicle> = (0..config.vehicles)
            .map(|i| generator.vehicle(i, config))
            .collect();

        let mut routes = Vec::with_capacity(config.vehicles * config.routes_per_vehicle);
        for vehicle in &vehicles {
            for _ in 0..config.routes_per_vehicle {
                routes.push(generator.route(&vehicle.vehicle_id, config));
            }
        }

        let base_load_kw = generator.baseline_profile(config);

        SimulationInputs {
            vehicles,
            routes,
            base_load_kw,
        }
    }

    fn vehicle(&mut self, index: usize, config: &SyntheticConfig) -> Vehicle {
        let speeds = &config.charge_speeds_kw;
        let max_charge_speed_kw = if speeds.is_empty() {
            0.0
        } else {
            speeds[self.rng.random_range(0..speeds.len())]
        };
        let efficiency = self
            .rng
            .random_range(config.efficiency_kwh_km_min..=config.efficiency_kwh_km_max);

        Vehicle::new((index + 1).to_string(), max_charge_speed_kw, round_to_hundredths(efficiency))
    }

    fn route(&mut self, vehicle_id: &str, config: &SyntheticConfig) -> RouteRecord {
        let length = self
            .rng
            .random_range(config.route_km_min..=config.route_km_max);
        let return_time = self.clock_time(config.return_hour_min, config.return_hour_max);
        let departure_time = self.clock_time(config.departure_hour_min, config.departure_hour_max);

        RouteRecord::new(vehicle_id, length.round(), return_time, departure_time)
    }

    fn clock_time(&mut self, hour_min: u32, hour_max: u32) -> String {
        let hour = self.rng.random_range(hour_min..=hour_max);
        let minute = MINUTE_SLOTS[self.rng.random_range(0..MINUTE_SLOTS.len())];
        format!("{hour:02}:{minute:02}")
    }

    /// Sinusoidal daily load plus Gaussian noise, clamped at zero.
    fn baseline_profile(&mut self, config: &SyntheticConfig) -> Vec<f64> {
        (0..BASELINE_POINTS)
            .map(|hour| {
                let day_pos = hour as f64 / BASELINE_POINTS as f64;
                let angle = 2.0 * std::f64::consts::PI * day_pos + config.phase_rad;
                let noise = gaussian_noise(&mut self.rng, config.noise_std_kw);
                let kw = config.base_kw + config.amp_kw * angle.sin() + noise;
                round_to_hundredths(kw.max(0.0))
            })
            .collect()
    }
}

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
