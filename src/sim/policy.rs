//! Charging policies that choose a route's constant charging rate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::grid::INTERVAL_HOURS;

/// How a route's charging rate is chosen before the greedy fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargePolicy {
    /// Charge management: spread delivery evenly over the whole window.
    Spread,
    /// No management: charge as hard as the rate cap allows.
    Frontload,
}

impl ChargePolicy {
    /// Both policies, managed first.
    pub const ALL: [ChargePolicy; 2] = [ChargePolicy::Spread, ChargePolicy::Frontload];

    /// Constant charging rate (kW) for a route.
    ///
    /// * `Spread`: `min(max_rate, energy / (window_len × 0.5 h))`
    /// * `Frontload`: `min(max_rate, energy)`. The energy figure is used
    ///   directly as a power value; existing result sets depend on this.
    ///
    /// `window_len` must be positive.
    pub fn rate_kw(self, max_rate_kw: f64, energy_required_kwh: f64, window_len: usize) -> f64 {
        match self {
            ChargePolicy::Spread => {
                let hours = window_len as f64 * INTERVAL_HOURS;
                max_rate_kw.min(energy_required_kwh / hours)
            }
            ChargePolicy::Frontload => max_rate_kw.min(energy_required_kwh),
        }
    }

    /// Short config/API name.
    pub fn name(self) -> &'static str {
        match self {
            ChargePolicy::Spread => "spread",
            ChargePolicy::Frontload => "frontload",
        }
    }

    /// Export file stem of the result table produced under this policy.
    pub fn results_stem(self) -> &'static str {
        match self {
            ChargePolicy::Spread => "simulation_results_with_management",
            ChargePolicy::Frontload => "simulation_results_without_management",
        }
    }
}

impl fmt::Display for ChargePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChargePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spread" | "managed" | "with_management" => Ok(ChargePolicy::Spread),
            "frontload" | "unmanaged" | "without_management" => Ok(ChargePolicy::Frontload),
            other => Err(format!(
                "unknown policy \"{other}\", expected \"spread\" or \"frontload\""
            )),
        }
    }
}
