//! Output records produced by a run.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::energy::{DispatchResult, EnergyTotals};
use crate::error::SimResult;
use crate::state::FarmLedger;
use crate::types::{ConstraintHit, FarmId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFarmRecord {
    pub date: NaiveDate,
    pub farm_id: FarmId,
    #[serde(flatten)]
    pub totals: FarmLedger,
    pub water_constraint: Option<ConstraintHit>,
    pub water_decision_reason: String,
    pub capital_usd: Decimal,
    pub inventory_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCommunityRecord {
    pub date: NaiveDate,
    pub water_demand_m3: f64,
    pub groundwater_m3: f64,
    pub municipal_m3: f64,
    pub well_capacity_m3: f64,
    pub treatment_capacity_m3: f64,
    pub dispatch: DispatchResult,
    pub energy_decision_reason: String,
    pub aquifer_drawdown_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFarmRecord {
    pub farm_id: FarmId,
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub totals: FarmLedger,
    pub capital_end_usd: Decimal,
    pub reserve_target_usd: Decimal,
    pub liquidating: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyFarmRecord {
    pub farm_id: FarmId,
    pub year: i32,
    pub area_ha: f64,
    #[serde(flatten)]
    pub totals: FarmLedger,
    pub capital_end_usd: Decimal,
    pub inventory_end_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyCommunityRecord {
    pub year: i32,
    pub energy: EnergyTotals,
    pub groundwater_m3: f64,
    pub municipal_m3: f64,
    pub aquifer_drawdown_m: f64,
    pub aquifer_remaining_m3: f64,
    pub battery_capacity_factor: f64,
    pub battery_cumulative_efc: f64,
    pub pv_capacity_factor: f64,
    pub replacement_reserve_usd: Decimal,
    pub debt_outstanding_usd: Decimal,
}

/// Everything a run produces, in simulation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationResults {
    pub scenario_name: String,
    pub daily_farm: Vec<DailyFarmRecord>,
    pub daily_community: Vec<DailyCommunityRecord>,
    pub monthly_farm: Vec<MonthlyFarmRecord>,
    pub yearly_farm: Vec<YearlyFarmRecord>,
    pub yearly_community: Vec<YearlyCommunityRecord>,
}

impl SimulationResults {
    pub fn new(scenario_name: impl Into<String>) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            ..Default::default()
        }
    }

    pub fn days_simulated(&self) -> usize {
        self.daily_community.len()
    }

    pub fn farm_days<'a>(&'a self, farm_id: &'a str) -> impl Iterator<Item = &'a DailyFarmRecord> {
        self.daily_farm.iter().filter(move |r| r.farm_id.0 == farm_id)
    }

    pub fn farm_years<'a>(&'a self, farm_id: &'a str) -> impl Iterator<Item = &'a YearlyFarmRecord> {
        self.yearly_farm.iter().filter(move |r| r.farm_id.0 == farm_id)
    }

    pub fn save_to_file(&self, path: &Path) -> SimResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
