//! Community energy state and merit-order dispatch.
//!
//! Dispatch is a pure function of today's demand, renewable output, the
//! battery snapshot and the policy-selected flags. The orchestrator applies
//! the returned [`DispatchResult`] to [`EnergyState`] once per day.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::data::WeatherDay;
use crate::scenario::{BatteryConfig, EnergyConfig, GeneratorConfig};
use crate::types::usd;

const HOURS_PER_DAY: f64 = 24.0;

/// Source switches chosen by the energy policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchFlags {
    /// Renewables serve load directly (otherwise all output is surplus).
    pub use_renewables: bool,
    pub use_battery: bool,
    pub grid_import: bool,
    pub grid_export: bool,
    pub use_generator: bool,
    /// Policy SOC floor; the effective floor is the larger of this and the
    /// hardware floor.
    pub battery_reserve_soc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchPrices {
    pub grid_import_per_kwh: Decimal,
    pub grid_export_per_kwh: Decimal,
    pub diesel_per_l: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub demand_kwh: f64,
    pub pv_available_kwh: f64,
    pub wind_available_kwh: f64,
    pub pv_used_kwh: f64,
    pub wind_used_kwh: f64,
    /// Energy delivered to load from the battery (after discharge losses).
    pub battery_discharge_kwh: f64,
    /// Energy drawn from surplus to charge (before charge losses).
    pub battery_charge_kwh: f64,
    pub grid_import_kwh: f64,
    pub grid_export_kwh: f64,
    pub generator_kwh: f64,
    pub generator_fuel_l: f64,
    pub curtailed_kwh: f64,
    pub unmet_kwh: f64,
    pub soc_before: f64,
    pub soc_after: f64,
    pub cost_usd: Decimal,
}

impl DispatchResult {
    /// Demand served from on-site sources.
    pub fn self_supplied_kwh(&self) -> f64 {
        self.pv_used_kwh + self.wind_used_kwh + self.battery_discharge_kwh
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryState {
    pub nominal_capacity_kwh: f64,
    /// Remaining share of nominal capacity after aging.
    pub capacity_factor: f64,
    pub soc: f64,
    pub hardware_floor_soc: f64,
    pub soc_max: f64,
    pub charge_efficiency: f64,
    pub discharge_efficiency: f64,
    pub calendar_fade_per_year: f64,
    pub cycle_fade_per_efc: f64,
    pub charge_throughput_kwh: f64,
    pub discharge_throughput_kwh: f64,
    pub cumulative_efc: f64,
}

impl BatteryState {
    pub fn new(config: &BatteryConfig) -> Self {
        Self {
            nominal_capacity_kwh: config.capacity_kwh,
            capacity_factor: 1.0,
            soc: config.initial_soc,
            hardware_floor_soc: config.hardware_floor_soc,
            soc_max: config.soc_max,
            charge_efficiency: config.charge_efficiency,
            discharge_efficiency: config.discharge_efficiency,
            calendar_fade_per_year: config.calendar_fade_per_year,
            cycle_fade_per_efc: config.cycle_fade_per_efc,
            charge_throughput_kwh: 0.0,
            discharge_throughput_kwh: 0.0,
            cumulative_efc: 0.0,
        }
    }

    pub fn capacity_kwh(&self) -> f64 {
        self.nominal_capacity_kwh * self.capacity_factor
    }

    /// Lowest SOC the battery may be discharged to under `policy_reserve`.
    pub fn discharge_floor(&self, policy_reserve: f64) -> f64 {
        self.hardware_floor_soc.max(policy_reserve)
    }

    /// Deliverable energy: (SOC - floor) x capacity x discharge efficiency.
    pub fn available_discharge_kwh(&self, policy_reserve: f64) -> f64 {
        (self.soc - self.discharge_floor(policy_reserve)).max(0.0)
            * self.capacity_kwh()
            * self.discharge_efficiency
    }

    /// Input energy needed to fill to `soc_max`.
    pub fn available_charge_kwh(&self) -> f64 {
        if self.charge_efficiency <= 0.0 {
            return 0.0;
        }
        (self.soc_max - self.soc).max(0.0) * self.capacity_kwh() / self.charge_efficiency
    }

    /// Equivalent full cycles since the last yearly reset.
    pub fn efc_this_year(&self) -> f64 {
        if self.nominal_capacity_kwh <= 0.0 {
            return 0.0;
        }
        (self.charge_throughput_kwh + self.discharge_throughput_kwh)
            / (2.0 * self.nominal_capacity_kwh)
    }

    /// Year-end aging: calendar fade plus cycle fade from this year's EFC.
    pub fn apply_yearly_degradation(&mut self) {
        let efc = self.efc_this_year();
        let fade = self.calendar_fade_per_year + self.cycle_fade_per_efc * efc;
        self.capacity_factor = (self.capacity_factor - fade).max(0.0);
        self.cumulative_efc += efc;
        self.charge_throughput_kwh = 0.0;
        self.discharge_throughput_kwh = 0.0;
    }
}

/// Yearly energy accumulators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyTotals {
    pub demand_kwh: f64,
    pub pv_generated_kwh: f64,
    pub wind_generated_kwh: f64,
    pub grid_import_kwh: f64,
    pub grid_export_kwh: f64,
    pub generator_kwh: f64,
    pub generator_fuel_l: f64,
    pub curtailed_kwh: f64,
    pub unmet_kwh: f64,
    /// Demand met by PV, wind and battery.
    pub self_supplied_kwh: f64,
    pub cost_usd: Decimal,
}

impl EnergyTotals {
    pub fn add(&mut self, result: &DispatchResult) {
        self.demand_kwh += result.demand_kwh;
        self.pv_generated_kwh += result.pv_available_kwh;
        self.wind_generated_kwh += result.wind_available_kwh;
        self.grid_import_kwh += result.grid_import_kwh;
        self.grid_export_kwh += result.grid_export_kwh;
        self.generator_kwh += result.generator_kwh;
        self.generator_fuel_l += result.generator_fuel_l;
        self.curtailed_kwh += result.curtailed_kwh;
        self.unmet_kwh += result.unmet_kwh;
        self.self_supplied_kwh += result.self_supplied_kwh();
        self.cost_usd += result.cost_usd;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyState {
    pub pv_kw: f64,
    pub wind_kw: f64,
    pub pv_capacity_factor: f64,
    pub pv_degradation_per_year: f64,
    pub battery: BatteryState,
    pub generator: GeneratorConfig,
    pub export_price_fraction: f64,
    pub year: EnergyTotals,
}

impl EnergyState {
    pub fn new(config: &EnergyConfig) -> Self {
        Self {
            pv_kw: config.pv_kw,
            wind_kw: config.wind_kw,
            pv_capacity_factor: 1.0,
            pv_degradation_per_year: config.pv_degradation_per_year,
            battery: BatteryState::new(&config.battery),
            generator: config.generator.clone(),
            export_price_fraction: config.export_price_fraction,
            year: EnergyTotals::default(),
        }
    }

    /// Renewable output for the day as (PV kWh, wind kWh).
    pub fn renewable_output(&self, weather: &WeatherDay) -> (f64, f64) {
        (
            self.pv_kw * self.pv_capacity_factor * weather.pv_kwh_per_kw,
            self.wind_kw * weather.wind_kwh_per_kw,
        )
    }

    pub fn apply(&mut self, result: &DispatchResult) {
        let battery = &mut self.battery;
        battery.soc = result.soc_after;
        battery.charge_throughput_kwh += result.battery_charge_kwh;
        if battery.discharge_efficiency > 0.0 {
            battery.discharge_throughput_kwh +=
                result.battery_discharge_kwh / battery.discharge_efficiency;
        }
        self.year.add(result);
    }

    /// Year-end: battery aging and PV degradation. Returns the closed year's
    /// totals and starts a fresh accumulator.
    pub fn close_year(&mut self) -> EnergyTotals {
        self.battery.apply_yearly_degradation();
        self.pv_capacity_factor = (self.pv_capacity_factor - self.pv_degradation_per_year).max(0.0);
        std::mem::take(&mut self.year)
    }
}

/// Merit-order dispatch for one day.
///
/// Load is served by PV, then wind, then the battery, then either the grid
/// or the generator. Renewable surplus charges the battery, then is exported
/// or curtailed.
pub fn dispatch(
    demand_kwh: f64,
    pv_kwh: f64,
    wind_kwh: f64,
    battery: &BatteryState,
    generator: &GeneratorConfig,
    flags: &DispatchFlags,
    prices: &DispatchPrices,
) -> DispatchResult {
    let mut r = DispatchResult {
        demand_kwh,
        pv_available_kwh: pv_kwh,
        wind_available_kwh: wind_kwh,
        soc_before: battery.soc,
        ..Default::default()
    };
    let capacity = battery.capacity_kwh();
    let mut soc = battery.soc;
    let mut remaining = demand_kwh;

    if flags.use_renewables {
        r.pv_used_kwh = pv_kwh.min(remaining);
        remaining -= r.pv_used_kwh;
        r.wind_used_kwh = wind_kwh.min(remaining);
        remaining -= r.wind_used_kwh;
    }
    let mut surplus = (pv_kwh - r.pv_used_kwh) + (wind_kwh - r.wind_used_kwh);

    if flags.use_battery && remaining > 0.0 && capacity > 0.0 {
        let delivered = battery
            .available_discharge_kwh(flags.battery_reserve_soc)
            .min(remaining);
        if delivered > 0.0 {
            soc = (soc - delivered / battery.discharge_efficiency / capacity)
                .max(battery.discharge_floor(flags.battery_reserve_soc));
            r.battery_discharge_kwh = delivered;
            remaining -= delivered;
        }
    }

    if remaining > 0.0 {
        if flags.grid_import {
            r.grid_import_kwh = remaining;
            remaining = 0.0;
        } else if flags.use_generator && generator.capacity_kw > 0.0 {
            let max_output = generator.capacity_kw * HOURS_PER_DAY;
            let min_output = generator.min_load_fraction * max_output;
            let output = remaining.max(min_output).min(max_output);
            let served = output.min(remaining);
            r.generator_kwh = output;
            r.generator_fuel_l = output * generator.fuel_l_per_kwh;
            r.curtailed_kwh += output - served;
            remaining -= served;
        }
    }
    r.unmet_kwh = remaining.max(0.0);

    if flags.use_battery && surplus > 0.0 && capacity > 0.0 {
        let room = (battery.soc_max - soc).max(0.0) * capacity / battery.charge_efficiency;
        let input = surplus.min(room);
        if input > 0.0 {
            soc = (soc + input * battery.charge_efficiency / capacity).min(battery.soc_max);
            r.battery_charge_kwh = input;
            surplus -= input;
        }
    }
    if flags.grid_export {
        r.grid_export_kwh = surplus;
    } else {
        r.curtailed_kwh += surplus;
    }

    r.soc_after = soc;
    r.cost_usd = usd(r.grid_import_kwh) * prices.grid_import_per_kwh
        + usd(r.generator_fuel_l) * prices.diesel_per_l
        - usd(r.grid_export_kwh) * prices.grid_export_per_kwh;
    r
}
