//! Baseline (non-EV) load series resampled onto the interval grid.

use crate::error::{Result, SimError};
use crate::grid::TOTAL_INTERVALS;

/// Externally supplied base load, always exactly [`TOTAL_INTERVALS`] long.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineLoad {
    values_kw: Vec<f64>,
}

impl BaselineLoad {
    /// Fits a raw series to the grid.
    ///
    /// A shorter series is repeated cyclically until it covers the horizon,
    /// then the result is truncated to exactly [`TOTAL_INTERVALS`] values.
    ///
    /// # Examples
    ///
    /// ```
    /// use fleet_charge_sim::baseline::BaselineLoad;
    ///
    /// let hourly: Vec<f64> = (0..24).map(f64::from).collect();
    /// let load = BaselineLoad::resample(&hourly).expect("non-empty series");
    /// assert_eq!(load.as_slice().len(), 96);
    /// assert_eq!(load.kw_at(24), 0.0);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InsufficientBaselineData`] if `raw` is empty.
    pub fn resample(raw: &[f64]) -> Result<Self> {
        if raw.is_empty() {
            return Err(SimError::InsufficientBaselineData);
        }

        let values_kw = raw.iter().copied().cycle().take(TOTAL_INTERVALS).collect();
        Ok(Self { values_kw })
    }

    /// Base load at `interval` in kW.
    ///
    /// # Panics
    ///
    /// Panics if `interval >= TOTAL_INTERVALS`.
    pub fn kw_at(&self, interval: usize) -> f64 {
        self.values_kw[interval]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values_kw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_length_is_copied() {
        let raw: Vec<f64> = (0..TOTAL_INTERVALS).map(|i| i as f64 * 0.5).collect();
        let load = BaselineLoad::resample(&raw).expect("series is non-empty");
        assert_eq!(load.as_slice(), raw.as_slice());
    }

    #[test]
    fn longer_series_is_truncated() {
        let raw = vec![3.0; 150];
        let load = BaselineLoad::resample(&raw).expect("series is non-empty");
        assert_eq!(load.as_slice().len(), TOTAL_INTERVALS);
    }

    #[test]
    fn length_that_does_not_divide_horizon_still_fills_it() {
        let raw: Vec<f64> = (0..50).map(f64::from).collect();
        let load = BaselineLoad::resample(&raw).expect("series is non-empty");
        assert_eq!(load.as_slice().len(), TOTAL_INTERVALS);
        assert_eq!(load.kw_at(49), 49.0);
        assert_eq!(load.kw_at(50), 0.0);
        assert_eq!(load.kw_at(95), 45.0);
    }

    #[test]
    fn empty_series_is_rejected() {
        assert!(matches!(
            BaselineLoad::resample(&[]),
            Err(SimError::InsufficientBaselineData)
        ));
    }
}
