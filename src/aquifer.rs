use serde::{Deserialize, Serialize};

use crate::scenario::AquiferConfig;

const WATER_DENSITY_KG_M3: f64 = 1000.0;
const GRAVITY_M_S2: f64 = 9.81;
const JOULES_PER_KWH: f64 = 3.6e6;

/// Shared aquifer. Extraction accumulates daily; drawdown and pumping head
/// are recalculated once a year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AquiferState {
    pub exploitable_volume_m3: f64,
    pub annual_recharge_m3: f64,
    pub static_head_m: f64,
    pub max_drawdown_m: f64,
    pub cumulative_extraction_m3: f64,
    pub cumulative_recharge_m3: f64,
    pub extraction_this_year_m3: f64,
    pub drawdown_m: f64,
}

impl AquiferState {
    pub fn new(config: &AquiferConfig) -> Self {
        Self {
            exploitable_volume_m3: config.exploitable_volume_m3,
            annual_recharge_m3: config.annual_recharge_m3,
            static_head_m: config.static_head_m,
            max_drawdown_m: config.max_drawdown_m,
            cumulative_extraction_m3: 0.0,
            cumulative_recharge_m3: 0.0,
            extraction_this_year_m3: 0.0,
            drawdown_m: 0.0,
        }
    }

    pub fn record_extraction(&mut self, volume_m3: f64) {
        self.cumulative_extraction_m3 += volume_m3;
        self.extraction_this_year_m3 += volume_m3;
    }

    /// Extraction not yet offset by recharge.
    pub fn net_depletion_m3(&self) -> f64 {
        (self.cumulative_extraction_m3 - self.cumulative_recharge_m3).max(0.0)
    }

    pub fn remaining_volume_m3(&self) -> f64 {
        (self.exploitable_volume_m3 - self.net_depletion_m3()).max(0.0)
    }

    /// Year-end update: credit a year of recharge and recompute drawdown
    /// from the depleted share of the exploitable volume.
    pub fn recalculate_drawdown(&mut self) {
        self.cumulative_recharge_m3 += self.annual_recharge_m3;
        // Recharge cannot bank water ahead of extraction.
        self.cumulative_recharge_m3 = self.cumulative_recharge_m3.min(self.cumulative_extraction_m3);
        self.drawdown_m = if self.exploitable_volume_m3 > 0.0 {
            (self.max_drawdown_m * self.net_depletion_m3() / self.exploitable_volume_m3)
                .min(self.max_drawdown_m)
        } else {
            self.max_drawdown_m
        };
        self.extraction_this_year_m3 = 0.0;
    }

    pub fn effective_head_m(&self) -> f64 {
        self.static_head_m + self.drawdown_m
    }

    /// Pumping energy per m3 lifted: rho * g * h / (3.6e6 * efficiency).
    pub fn pumping_kwh_per_m3(&self, pump_efficiency: f64) -> f64 {
        WATER_DENSITY_KG_M3 * GRAVITY_M_S2 * self.effective_head_m()
            / (JOULES_PER_KWH * pump_efficiency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aquifer() -> AquiferState {
        AquiferState::new(&AquiferConfig {
            exploitable_volume_m3: 1_000_000.0,
            annual_recharge_m3: 10_000.0,
            static_head_m: 40.0,
            max_drawdown_m: 20.0,
        })
    }

    #[test]
    fn test_pumping_energy_at_static_head() {
        let a = aquifer();
        // 1000 * 9.81 * 40 / (3.6e6 * 0.6) = 0.18166...
        assert!((a.pumping_kwh_per_m3(0.6) - 0.181_666).abs() < 1e-5);
    }

    #[test]
    fn test_drawdown_grows_with_depletion() {
        let mut a = aquifer();
        a.record_extraction(110_000.0);
        a.recalculate_drawdown();
        // net depletion 100k of 1M -> 10% of 20 m
        assert!((a.drawdown_m - 2.0).abs() < 1e-9);
        assert!((a.effective_head_m() - 42.0).abs() < 1e-9);
        assert_eq!(a.extraction_this_year_m3, 0.0);
    }

    #[test]
    fn test_recharge_does_not_bank_ahead() {
        let mut a = aquifer();
        a.record_extraction(1_000.0);
        a.recalculate_drawdown();
        assert_eq!(a.net_depletion_m3(), 0.0);
        assert_eq!(a.drawdown_m, 0.0);
    }
}
