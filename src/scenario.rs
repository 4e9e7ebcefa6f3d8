//! Resolved scenario configuration: community infrastructure, farms, policy
//! selection and named policy parameters.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::error::{SimError, SimResult};
use crate::policies::registry::{PolicySet, energy_policies};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub simulation: SimulationParameters,
    #[serde(default)]
    pub community: CommunityInfrastructure,
    pub farms: Vec<FarmConfig>,
    #[serde(default)]
    pub community_policies: PolicySelection,
    #[serde(default)]
    pub policy_parameters: PolicyParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub growth_stage_fractions: StageFractions,
    /// Spoilage/damage between harvest and processing intake.
    pub handling_loss_fraction: f64,
    pub irrigation_efficiency: f64,
    pub farm_base_load_kwh_per_ha: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            end_date: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap_or(NaiveDate::MIN),
            growth_stage_fractions: StageFractions::default(),
            handling_loss_fraction: 0.05,
            irrigation_efficiency: 0.85,
            farm_base_load_kwh_per_ha: 2.0,
        }
    }
}

/// Share of the season spent in each growth stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageFractions {
    pub initial: f64,
    pub development: f64,
    pub mid_season: f64,
    pub late_season: f64,
}

impl Default for StageFractions {
    fn default() -> Self {
        Self {
            initial: 0.15,
            development: 0.25,
            mid_season: 0.40,
            late_season: 0.20,
        }
    }
}

impl StageFractions {
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.initial,
            self.development,
            self.mid_season,
            self.late_season,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityInfrastructure {
    pub wells: WellConfig,
    pub treatment: TreatmentConfig,
    pub conveyance_kwh_per_m3: f64,
    pub gw_maintenance_per_m3: Decimal,
    pub municipal_tds_ppm: f64,
    pub aquifer: AquiferConfig,
    pub energy: EnergyConfig,
    pub storage_capacity_kg: f64,
    pub processing: ProcessingCapacity,
    pub financing: Vec<DebtConfig>,
    /// Capital cost per subsystem, used for replacement-reserve accrual.
    pub capex: BTreeMap<String, Decimal>,
    pub replacement_reserve_rate: f64,
    pub annual_om_usd: Decimal,
}

impl Default for CommunityInfrastructure {
    fn default() -> Self {
        Self {
            wells: WellConfig::default(),
            treatment: TreatmentConfig::default(),
            conveyance_kwh_per_m3: 0.2,
            gw_maintenance_per_m3: dec!(0.05),
            municipal_tds_ppm: 500.0,
            aquifer: AquiferConfig::default(),
            energy: EnergyConfig::default(),
            storage_capacity_kg: 50_000.0,
            processing: ProcessingCapacity::default(),
            financing: Vec::new(),
            capex: BTreeMap::new(),
            replacement_reserve_rate: 0.02,
            annual_om_usd: dec!(0),
        }
    }
}

impl CommunityInfrastructure {
    pub fn well_capacity_m3_per_day(&self) -> f64 {
        f64::from(self.wells.count) * self.wells.flow_m3_per_day
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WellConfig {
    pub count: u32,
    pub flow_m3_per_day: f64,
    pub pump_efficiency: f64,
}

impl Default for WellConfig {
    fn default() -> Self {
        Self {
            count: 2,
            flow_m3_per_day: 250.0,
            pump_efficiency: 0.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentConfig {
    pub capacity_m3_per_day: f64,
    pub energy_kwh_per_m3: f64,
    /// TDS of treated groundwater as delivered to farms.
    pub output_tds_ppm: f64,
}

impl Default for TreatmentConfig {
    fn default() -> Self {
        Self {
            capacity_m3_per_day: 500.0,
            energy_kwh_per_m3: 1.5,
            output_tds_ppm: 800.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AquiferConfig {
    pub exploitable_volume_m3: f64,
    pub annual_recharge_m3: f64,
    pub static_head_m: f64,
    pub max_drawdown_m: f64,
}

impl Default for AquiferConfig {
    fn default() -> Self {
        Self {
            exploitable_volume_m3: 5_000_000.0,
            annual_recharge_m3: 50_000.0,
            static_head_m: 50.0,
            max_drawdown_m: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub pv_kw: f64,
    pub wind_kw: f64,
    pub pv_degradation_per_year: f64,
    pub battery: BatteryConfig,
    pub generator: GeneratorConfig,
    /// Export credit as a fraction of the import price (1.0 = full net metering).
    pub export_price_fraction: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            pv_kw: 100.0,
            wind_kw: 0.0,
            pv_degradation_per_year: 0.005,
            battery: BatteryConfig::default(),
            generator: GeneratorConfig::default(),
            export_price_fraction: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub capacity_kwh: f64,
    pub hardware_floor_soc: f64,
    pub soc_max: f64,
    pub initial_soc: f64,
    pub charge_efficiency: f64,
    pub discharge_efficiency: f64,
    pub calendar_fade_per_year: f64,
    /// Capacity lost per equivalent full cycle.
    pub cycle_fade_per_efc: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 200.0,
            hardware_floor_soc: 0.10,
            soc_max: 0.95,
            initial_soc: 0.50,
            charge_efficiency: 0.95,
            discharge_efficiency: 0.95,
            calendar_fade_per_year: 0.01,
            cycle_fade_per_efc: 0.00005,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub capacity_kw: f64,
    pub min_load_fraction: f64,
    pub fuel_l_per_kwh: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            capacity_kw: 50.0,
            min_load_fraction: 0.3,
            fuel_l_per_kwh: 0.3,
        }
    }
}

/// Daily intake capacity (kg of fresh input) per processing pathway.
/// `None` means unlimited. The fresh pathway is never capped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingCapacity {
    pub packaged_kg_per_day: Option<f64>,
    pub canned_kg_per_day: Option<f64>,
    pub dried_kg_per_day: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtConfig {
    pub subsystem: String,
    pub principal_usd: Decimal,
    pub annual_interest_rate: f64,
    pub term_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmConfig {
    pub id: String,
    pub area_ha: f64,
    pub initial_capital_usd: Decimal,
    #[serde(default = "default_yield_factor")]
    pub yield_factor: f64,
    pub crops: Vec<CropPlan>,
    #[serde(default)]
    pub policies: PolicyOverrides,
}

fn default_yield_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropPlan {
    pub crop: String,
    pub area_ha: f64,
    /// "MM-DD" entries, repeated every simulated year.
    pub planting_dates: Vec<String>,
}

impl CropPlan {
    pub fn parsed_planting_dates(&self) -> SimResult<Vec<(u32, u32)>> {
        self.planting_dates
            .iter()
            .map(|s| parse_month_day(s))
            .collect()
    }
}

fn parse_month_day(s: &str) -> SimResult<(u32, u32)> {
    let bad = || SimError::Config(format!("planting date '{}' is not MM-DD", s));
    let (m, d) = s.split_once('-').ok_or_else(bad)?;
    let month: u32 = m.trim().parse().map_err(|_| bad())?;
    let day: u32 = d.trim().parse().map_err(|_| bad())?;
    // 2024 is a leap year, so Feb 29 is accepted here and skipped in other years.
    if NaiveDate::from_ymd_opt(2024, month, day).is_none() {
        return Err(bad());
    }
    Ok((month, day))
}

/// Community-wide policy choice per domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySelection {
    pub water: String,
    pub energy: String,
    pub crop: String,
    pub food: String,
    pub market: String,
    pub economic: String,
}

impl Default for PolicySelection {
    fn default() -> Self {
        Self {
            water: "max_groundwater".to_string(),
            energy: "renewable_first".to_string(),
            crop: "fixed_schedule".to_string(),
            food: "all_fresh".to_string(),
            market: "sell_all_immediately".to_string(),
            economic: "balanced".to_string(),
        }
    }
}

/// Per-farm overrides of the community selection. Energy is community-level
/// because the generation and storage assets are shared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverrides {
    pub water: Option<String>,
    pub crop: Option<String>,
    pub food: Option<String>,
    pub market: Option<String>,
    pub economic: Option<String>,
}

/// Named numeric policy parameters keyed `"<policy>.<param>"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyParameters(pub BTreeMap<String, f64>);

impl PolicyParameters {
    pub fn set(&mut self, policy: &str, param: &str, value: f64) {
        self.0.insert(format!("{}.{}", policy, param), value);
    }

    /// Look up a parameter, falling back to `default`. Configured values must
    /// be finite and non-negative.
    pub fn get(&self, policy: &str, param: &str, default: f64) -> SimResult<f64> {
        let key = format!("{}.{}", policy, param);
        match self.0.get(&key) {
            None => Ok(default),
            Some(v) if v.is_finite() && *v >= 0.0 => Ok(*v),
            Some(v) => Err(SimError::Config(format!(
                "policy parameter {} must be finite and non-negative, got {}",
                key, v
            ))),
        }
    }
}

impl Scenario {
    pub fn new(name: String) -> Self {
        Self {
            name,
            description: String::new(),
            simulation: SimulationParameters::default(),
            community: CommunityInfrastructure::default(),
            farms: Vec::new(),
            community_policies: PolicySelection::default(),
            policy_parameters: PolicyParameters::default(),
        }
    }

    pub fn add_farm(&mut self, config: FarmConfig) {
        self.farms.push(config);
    }

    /// Resolve a farm's selection: farm override first, then community default.
    pub fn policies_for(&self, farm: &FarmConfig) -> PolicySelection {
        let base = &self.community_policies;
        let pick = |o: &Option<String>, d: &String| o.clone().unwrap_or_else(|| d.clone());
        PolicySelection {
            water: pick(&farm.policies.water, &base.water),
            energy: base.energy.clone(),
            crop: pick(&farm.policies.crop, &base.crop),
            food: pick(&farm.policies.food, &base.food),
            market: pick(&farm.policies.market, &base.market),
            economic: pick(&farm.policies.economic, &base.economic),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> SimResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from YAML (`.yaml`/`.yml`) or JSON (anything else).
    pub fn load_from_file(path: &Path) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        let scenario = if is_yaml {
            serde_yaml::from_str(&contents)?
        } else {
            serde_json::from_str(&contents)?
        };
        Ok(scenario)
    }

    pub fn validate(&self) -> SimResult<()> {
        let sim = &self.simulation;
        if self.farms.is_empty() {
            return Err(SimError::Config(
                "scenario must have at least one farm".to_string(),
            ));
        }
        if sim.end_date < sim.start_date {
            return Err(SimError::Config(format!(
                "end date {} precedes start date {}",
                sim.end_date, sim.start_date
            )));
        }

        let fractions = sim.growth_stage_fractions.as_array();
        if fractions.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            return Err(SimError::Config(
                "growth stage fractions must all be positive".to_string(),
            ));
        }
        if (fractions.iter().sum::<f64>() - 1.0).abs() > 1e-6 {
            return Err(SimError::Config(format!(
                "growth stage fractions must sum to 1.0, got {:?}",
                fractions
            )));
        }
        check_unit("handling_loss_fraction", sim.handling_loss_fraction)?;
        if !(sim.irrigation_efficiency > 0.0 && sim.irrigation_efficiency <= 1.0) {
            return Err(SimError::Config(
                "irrigation_efficiency must be in (0, 1]".to_string(),
            ));
        }

        let battery = &self.community.energy.battery;
        check_unit("battery.hardware_floor_soc", battery.hardware_floor_soc)?;
        check_unit("battery.soc_max", battery.soc_max)?;
        if battery.hardware_floor_soc >= battery.soc_max {
            return Err(SimError::Config(
                "battery hardware floor must be below soc_max".to_string(),
            ));
        }
        if battery.initial_soc < battery.hardware_floor_soc || battery.initial_soc > battery.soc_max {
            return Err(SimError::Config(format!(
                "battery initial_soc {} outside [{}, {}]",
                battery.initial_soc, battery.hardware_floor_soc, battery.soc_max
            )));
        }
        if battery.charge_efficiency <= 0.0 || battery.discharge_efficiency <= 0.0 {
            return Err(SimError::Config(
                "battery efficiencies must be positive".to_string(),
            ));
        }
        check_unit(
            "generator.min_load_fraction",
            self.community.energy.generator.min_load_fraction,
        )?;
        if !(self.community.wells.pump_efficiency > 0.0 && self.community.wells.pump_efficiency <= 1.0) {
            return Err(SimError::Config("pump efficiency must be in (0, 1]".to_string()));
        }
        self.validate_infrastructure()?;

        let mut seen = HashSet::new();
        for farm in &self.farms {
            if !seen.insert(farm.id.as_str()) {
                return Err(SimError::Config(format!("duplicate farm id {}", farm.id)));
            }
            if !(farm.area_ha > 0.0) {
                return Err(SimError::Config(format!(
                    "farm {} must have a positive area",
                    farm.id
                )));
            }
            check_quantity("yield_factor", farm.yield_factor)?;
            if farm.initial_capital_usd < Decimal::ZERO {
                return Err(SimError::Config(format!(
                    "farm {} has negative initial capital",
                    farm.id
                )));
            }
            let planted: f64 = farm.crops.iter().map(|c| c.area_ha).sum();
            if planted > farm.area_ha + 1e-9 {
                return Err(SimError::Config(format!(
                    "farm {} plants {} ha on {} ha",
                    farm.id, planted, farm.area_ha
                )));
            }
            for crop in &farm.crops {
                if !(crop.area_ha > 0.0) {
                    return Err(SimError::Config(format!(
                        "crop {} on farm {} must have a positive area",
                        crop.crop, farm.id
                    )));
                }
                crop.parsed_planting_dates()?;
            }
            PolicySet::build(&self.policies_for(farm), &self.policy_parameters)?;
        }
        energy_policies().create(&self.community_policies.energy, &self.policy_parameters)?;

        Ok(())
    }

    /// Physical capacities and rates shared by the community. NaN, infinite
    /// or negative values are rejected here rather than mid-run.
    fn validate_infrastructure(&self) -> SimResult<()> {
        let community = &self.community;
        check_quantity("wells.flow_m3_per_day", community.wells.flow_m3_per_day)?;
        check_quantity("treatment.capacity_m3_per_day", community.treatment.capacity_m3_per_day)?;
        check_quantity("treatment.energy_kwh_per_m3", community.treatment.energy_kwh_per_m3)?;
        check_quantity("treatment.output_tds_ppm", community.treatment.output_tds_ppm)?;
        check_quantity("conveyance_kwh_per_m3", community.conveyance_kwh_per_m3)?;
        check_quantity("municipal_tds_ppm", community.municipal_tds_ppm)?;
        check_quantity("storage_capacity_kg", community.storage_capacity_kg)?;
        check_unit("replacement_reserve_rate", community.replacement_reserve_rate)?;

        let processing = &community.processing;
        for (name, cap) in [
            ("processing.packaged_kg_per_day", processing.packaged_kg_per_day),
            ("processing.canned_kg_per_day", processing.canned_kg_per_day),
            ("processing.dried_kg_per_day", processing.dried_kg_per_day),
        ] {
            if let Some(value) = cap {
                check_quantity(name, value)?;
            }
        }

        let aquifer = &community.aquifer;
        if !(aquifer.exploitable_volume_m3.is_finite() && aquifer.exploitable_volume_m3 > 0.0) {
            return Err(SimError::Config(format!(
                "aquifer.exploitable_volume_m3 must be positive, got {}",
                aquifer.exploitable_volume_m3
            )));
        }
        check_quantity("aquifer.annual_recharge_m3", aquifer.annual_recharge_m3)?;
        check_quantity("aquifer.static_head_m", aquifer.static_head_m)?;
        check_quantity("aquifer.max_drawdown_m", aquifer.max_drawdown_m)?;

        let energy = &community.energy;
        check_quantity("energy.pv_kw", energy.pv_kw)?;
        check_quantity("energy.wind_kw", energy.wind_kw)?;
        check_unit("energy.pv_degradation_per_year", energy.pv_degradation_per_year)?;
        check_unit("energy.export_price_fraction", energy.export_price_fraction)?;
        check_quantity("battery.capacity_kwh", energy.battery.capacity_kwh)?;
        check_unit("battery.charge_efficiency", energy.battery.charge_efficiency)?;
        check_unit("battery.discharge_efficiency", energy.battery.discharge_efficiency)?;
        check_unit("battery.calendar_fade_per_year", energy.battery.calendar_fade_per_year)?;
        check_unit("battery.cycle_fade_per_efc", energy.battery.cycle_fade_per_efc)?;
        check_quantity("generator.capacity_kw", energy.generator.capacity_kw)?;
        check_quantity("generator.fuel_l_per_kwh", energy.generator.fuel_l_per_kwh)?;

        for debt in &community.financing {
            check_quantity("financing.annual_interest_rate", debt.annual_interest_rate)?;
            if debt.principal_usd < Decimal::ZERO || debt.term_years == 0 {
                return Err(SimError::Config(format!(
                    "financing for {} needs a non-negative principal and a term",
                    debt.subsystem
                )));
            }
        }
        if community.annual_om_usd < Decimal::ZERO
            || community.gw_maintenance_per_m3 < Decimal::ZERO
            || community.capex.values().any(|v| *v < Decimal::ZERO)
        {
            return Err(SimError::Config(
                "community costs must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_quantity(name: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::Config(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )))
    }
}

fn check_unit(name: &str, value: f64) -> SimResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::Config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {}", self.name)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(
            f,
            "  Period: {} to {}",
            self.simulation.start_date, self.simulation.end_date
        )?;
        writeln!(
            f,
            "  Wells: {} x {} m3/day, treatment {} m3/day",
            self.community.wells.count,
            self.community.wells.flow_m3_per_day,
            self.community.treatment.capacity_m3_per_day
        )?;
        writeln!(
            f,
            "  Energy: {} kW PV, {} kW wind, {} kWh battery, {} kW generator",
            self.community.energy.pv_kw,
            self.community.energy.wind_kw,
            self.community.energy.battery.capacity_kwh,
            self.community.energy.generator.capacity_kw
        )?;
        writeln!(f, "  Energy policy: {}", self.community_policies.energy)?;

        writeln!(f, "\nFarms:")?;
        for farm in &self.farms {
            let policies = self.policies_for(farm);
            writeln!(f, "\n  Farm: {} ({} ha)", farm.id, farm.area_ha)?;
            writeln!(f, "    Initial capital: {}", farm.initial_capital_usd)?;
            for crop in &farm.crops {
                writeln!(
                    f,
                    "    Crop: {} on {} ha, planted {}",
                    crop.crop,
                    crop.area_ha,
                    crop.planting_dates.join(", ")
                )?;
            }
            writeln!(
                f,
                "    Policies: water={} crop={} food={} market={} economic={}",
                policies.water, policies.crop, policies.food, policies.market, policies.economic
            )?;
        }

        Ok(())
    }
}

pub fn create_standard_scenarios() -> HashMap<String, Scenario> {
    let mut scenarios = HashMap::new();

    let mut basic = Scenario::new("two_farm_baseline".to_string());
    basic.description = "Two farms sharing wells, treatment and grid-connected PV".to_string();
    basic.add_farm(FarmConfig {
        id: "farm_a".to_string(),
        area_ha: 10.0,
        initial_capital_usd: dec!(50000),
        yield_factor: 1.0,
        crops: vec![CropPlan {
            crop: "tomato".to_string(),
            area_ha: 5.0,
            planting_dates: vec!["02-01".to_string(), "04-01".to_string()],
        }],
        policies: PolicyOverrides::default(),
    });
    basic.add_farm(FarmConfig {
        id: "farm_b".to_string(),
        area_ha: 8.0,
        initial_capital_usd: dec!(40000),
        yield_factor: 0.9,
        crops: vec![CropPlan {
            crop: "tomato".to_string(),
            area_ha: 4.0,
            planting_dates: vec!["03-01".to_string()],
        }],
        policies: PolicyOverrides {
            water: Some("cheapest_source".to_string()),
            food: Some("balanced".to_string()),
            market: Some("adaptive".to_string()),
            ..Default::default()
        },
    });
    scenarios.insert("baseline".to_string(), basic);

    let mut scarce = Scenario::new("water_scarce".to_string());
    scarce.description = "Single well shared by three farms under a quota".to_string();
    scarce.community.wells.count = 1;
    scarce.community.wells.flow_m3_per_day = 60.0;
    scarce.community_policies.water = "quota_enforced".to_string();
    scarce
        .policy_parameters
        .set("quota_enforced", "annual_quota_m3", 10_000.0);
    for (i, id) in ["north", "south", "east"].iter().enumerate() {
        scarce.add_farm(FarmConfig {
            id: id.to_string(),
            area_ha: 6.0,
            initial_capital_usd: dec!(20000),
            yield_factor: 1.0,
            crops: vec![CropPlan {
                crop: "tomato".to_string(),
                area_ha: 3.0,
                planting_dates: vec![format!("0{}-15", i + 2)],
            }],
            policies: PolicyOverrides::default(),
        });
    }
    scenarios.insert("scarcity".to_string(), scarce);

    scenarios
}
