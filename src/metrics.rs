use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::events::Event;
use crate::records::{SimulationResults, YearlyCommunityRecord, YearlyFarmRecord};
use crate::types::to_f64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmMetrics {
    pub farm_id: String,
    pub year: i32,
    /// Share of irrigation met from community groundwater.
    pub water_self_sufficiency: f64,
    pub water_use_m3_per_ha: f64,
    pub yield_kg_per_ha: f64,
    pub revenue_usd: Decimal,
    pub net_income_usd: Decimal,
    pub revenue_per_ha_usd: Decimal,
    /// Share of sold mass that left through forced sales.
    pub forced_sale_share: f64,
    pub capital_end_usd: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityMetrics {
    pub year: i32,
    pub water_self_sufficiency: f64,
    /// Share of energy demand met by PV, wind and battery.
    pub energy_self_sufficiency: f64,
    pub grid_dependence: f64,
    pub total_revenue_usd: Decimal,
    pub total_net_income_usd: Decimal,
    pub revenue_per_ha_usd: Decimal,
    /// Gini coefficient of farm net income per hectare.
    pub income_inequality: f64,
    pub aquifer_drawdown_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub scenario_name: String,
    pub total_days: usize,
    pub farms: Vec<FarmMetrics>,
    pub community: Vec<CommunityMetrics>,
}

pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn calculate_farm_metrics(record: &YearlyFarmRecord) -> FarmMetrics {
        let t = &record.totals;
        let per_ha = |v: f64| if record.area_ha > 0.0 { v / record.area_ha } else { 0.0 };
        let revenue = t.total_revenue();
        let revenue_per_ha = match Decimal::from_f64_retain(record.area_ha) {
            Some(area) if area > Decimal::ZERO => (revenue / area).round_dp(2),
            _ => Decimal::ZERO,
        };
        let sold = t.sold_kg + t.forced_sold_kg;

        FarmMetrics {
            farm_id: record.farm_id.0.clone(),
            year: record.year,
            water_self_sufficiency: ratio(t.groundwater_m3, t.water_demand_m3),
            water_use_m3_per_ha: per_ha(t.water_demand_m3),
            yield_kg_per_ha: per_ha(t.harvest_kg),
            revenue_usd: revenue,
            net_income_usd: t.net_income(),
            revenue_per_ha_usd: revenue_per_ha,
            forced_sale_share: ratio(t.forced_sold_kg, sold),
            capital_end_usd: record.capital_end_usd,
        }
    }

    pub fn calculate_community_metrics(
        record: &YearlyCommunityRecord,
        farms: &[&YearlyFarmRecord],
    ) -> CommunityMetrics {
        let energy = &record.energy;
        let total_area: f64 = farms.iter().map(|f| f.area_ha).sum();
        let total_revenue: Decimal = farms.iter().map(|f| f.totals.total_revenue()).sum();
        let total_net: Decimal = farms.iter().map(|f| f.totals.net_income()).sum();
        let revenue_per_ha = match Decimal::from_f64_retain(total_area) {
            Some(area) if area > Decimal::ZERO => (total_revenue / area).round_dp(2),
            _ => Decimal::ZERO,
        };
        let income_per_ha: Vec<f64> = farms
            .iter()
            .filter(|f| f.area_ha > 0.0)
            .map(|f| to_f64(f.totals.net_income()) / f.area_ha)
            .collect();

        CommunityMetrics {
            year: record.year,
            water_self_sufficiency: ratio(
                record.groundwater_m3,
                record.groundwater_m3 + record.municipal_m3,
            ),
            energy_self_sufficiency: ratio(energy.self_supplied_kwh, energy.demand_kwh),
            grid_dependence: ratio(energy.grid_import_kwh, energy.demand_kwh),
            total_revenue_usd: total_revenue,
            total_net_income_usd: total_net,
            revenue_per_ha_usd: revenue_per_ha,
            income_inequality: Self::calculate_gini_coefficient(&income_per_ha),
            aquifer_drawdown_m: record.aquifer_drawdown_m,
        }
    }

    pub fn calculate_scenario_metrics(results: &SimulationResults) -> ScenarioMetrics {
        let farms = results
            .yearly_farm
            .iter()
            .map(Self::calculate_farm_metrics)
            .collect();
        let community = results
            .yearly_community
            .iter()
            .map(|record| {
                let year_farms: Vec<&YearlyFarmRecord> = results
                    .yearly_farm
                    .iter()
                    .filter(|f| f.year == record.year)
                    .collect();
                Self::calculate_community_metrics(record, &year_farms)
            })
            .collect();

        ScenarioMetrics {
            scenario_name: results.scenario_name.clone(),
            total_days: results.days_simulated(),
            farms,
            community,
        }
    }

    /// How often each decision reason was produced, for audit summaries.
    pub fn count_decision_reasons(events: &[Event]) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for reason in events.iter().filter_map(|e| e.event_type.reason()) {
            *counts.entry(reason.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Gini coefficient. Negative incomes are shifted so the minimum is zero.
    pub fn calculate_gini_coefficient(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let min = sorted[0];
        if min < 0.0 {
            for v in &mut sorted {
                *v -= min;
            }
        }

        let n = sorted.len() as f64;
        let total: f64 = sorted.iter().sum();
        if total == 0.0 {
            return 0.0;
        }

        let mut sum = 0.0;
        for (i, &value) in sorted.iter().enumerate() {
            sum += (i as f64 + 1.0) * value;
        }

        2.0 * sum / (n * total) - (n + 1.0) / n
    }
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole } else { 0.0 }
}

impl std::fmt::Display for FarmMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Farm {} ({}) Metrics:", self.farm_id, self.year)?;
        writeln!(f, "  Net Income: {}", self.net_income_usd)?;
        writeln!(
            f,
            "  - Revenue: {} ({} /ha)",
            self.revenue_usd, self.revenue_per_ha_usd
        )?;
        writeln!(f, "  - Yield: {:.1} kg/ha", self.yield_kg_per_ha)?;
        writeln!(
            f,
            "  - Water: {:.1} m3/ha, {:.1}% groundwater",
            self.water_use_m3_per_ha,
            self.water_self_sufficiency * 100.0
        )?;
        writeln!(
            f,
            "  - Forced sales: {:.1}% of sold mass",
            self.forced_sale_share * 100.0
        )?;
        Ok(())
    }
}

impl std::fmt::Display for ScenarioMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Scenario {} Metrics ({} days):",
            self.scenario_name, self.total_days
        )?;
        for c in &self.community {
            writeln!(f, "  Year {}:", c.year)?;
            writeln!(
                f,
                "    Water self-sufficiency: {:.1}%",
                c.water_self_sufficiency * 100.0
            )?;
            writeln!(
                f,
                "    Energy self-sufficiency: {:.1}%",
                c.energy_self_sufficiency * 100.0
            )?;
            writeln!(f, "    Net income: {}", c.total_net_income_usd)?;
            writeln!(f, "    Income inequality (Gini): {:.3}", c.income_inequality)?;
        }
        writeln!(f, "\nFarm Net Income:")?;
        let mut sorted: Vec<_> = self.farms.iter().collect();
        sorted.sort_by(|a, b| b.net_income_usd.cmp(&a.net_income_usd));
        for m in sorted {
            writeln!(f, "  {} {}: {}", m.farm_id, m.year, m.net_income_usd)?;
        }
        Ok(())
    }
}
