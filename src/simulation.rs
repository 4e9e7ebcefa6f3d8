//! Daily orchestrator.
//!
//! Each day runs the policy steps in a fixed order, farms in index order:
//!
//! 1. crop state machines and the crop policy produce irrigation demand;
//! 2. every farm states its groundwater request, well and treatment
//!    capacity is water-filled across the farms that asked for any, and the
//!    water policy splits demand between groundwater and municipal supply;
//! 3. the community energy policy selects dispatch flags;
//! 4. harvests are processed into tranches, then the forced-sale sweep runs;
//! 5. the market policy sells from what remains;
//! 6. on the first day of a month, debt service and the economic review.
//!
//! The day is then settled once: merit-order dispatch on the aggregated
//! energy demand, battery and aquifer updates, cost allocation and records.

use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::aquifer::AquiferState;
use crate::crop::{CropState, PlantingOutcome};
use crate::data::{DataProvider, UtilityPrices, WeatherDay};
use crate::energy::{DispatchPrices, EnergyState, dispatch};
use crate::error::{SimError, SimResult};
use crate::events::{COMMUNITY, EventLogger, EventType};
use crate::policies::food::process_harvest;
use crate::policies::registry::energy_policies;
use crate::policies::water::fair_shares;
use crate::policies::{
    CropPolicyContext, EconomicPolicyContext, EnergyDecision, EnergyPolicy, EnergyPolicyContext,
    FoodProcessingContext, MarketPolicyContext, PolicySet, WaterPolicyContext,
};
use crate::records::{
    DailyCommunityRecord, DailyFarmRecord, MonthlyFarmRecord, SimulationResults,
    YearlyCommunityRecord, YearlyFarmRecord,
};
use crate::scenario::{ProcessingCapacity, Scenario};
use crate::state::{EconomicState, FarmLedger, FarmState, allocate_by_weight};
use crate::types::{ConstraintHit, ProductType, usd};

/// Working values for one farm during one day.
#[derive(Debug, Default)]
struct FarmDay {
    ledger: FarmLedger,
    water_energy_kwh: f64,
    processing_energy_kwh: f64,
    base_load_kwh: f64,
    constraint: Option<ConstraintHit>,
    water_reason: String,
}

impl FarmDay {
    fn energy_demand_kwh(&self) -> f64 {
        self.water_energy_kwh + self.processing_energy_kwh + self.base_load_kwh
    }
}

/// A farm's water demand and groundwater request, before shared capacity
/// is divided.
struct FarmWaterPlan {
    ctx: WaterPolicyContext,
    requested_m3: f64,
    crop_demands: Vec<(f64, f64)>,
}

pub struct Simulation<P: DataProvider> {
    scenario: Scenario,
    provider: P,
    farms: Vec<FarmState>,
    policies: Vec<PolicySet>,
    energy_policy: Box<dyn EnergyPolicy>,
    aquifer: AquiferState,
    energy: EnergyState,
    economics: EconomicState,
    events: EventLogger,
    results: SimulationResults,
    current_date: NaiveDate,
    finished: bool,
}

impl<P: DataProvider> Simulation<P> {
    /// Validate the scenario, build every policy and check that the provider
    /// covers the whole run. All of these failures are fatal.
    pub fn new(scenario: Scenario, provider: P) -> SimResult<Self> {
        scenario.validate()?;
        let sim = &scenario.simulation;
        let community = &scenario.community;
        let params = &scenario.policy_parameters;

        let crop_names: Vec<String> = scenario
            .farms
            .iter()
            .flat_map(|f| f.crops.iter().map(|c| c.crop.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        provider.validate_coverage(sim.start_date, sim.end_date, &crop_names)?;
        for crop in &crop_names {
            provider.crop_parameters(crop)?.validate(crop)?;
        }
        for product in ProductType::ALL {
            provider.processing_spec(product)?.validate(product)?;
        }

        let energy_policy = energy_policies().create(&scenario.community_policies.energy, params)?;

        let total_area: f64 = scenario.farms.iter().map(|f| f.area_ha).sum();
        let mut farms = Vec::with_capacity(scenario.farms.len());
        let mut policies = Vec::with_capacity(scenario.farms.len());
        for config in &scenario.farms {
            policies.push(PolicySet::build(&scenario.policies_for(config), params)?);
            let mut crops = Vec::with_capacity(config.crops.len());
            for plan in &config.crops {
                crops.push(CropState::new(
                    plan.crop.clone(),
                    plan.area_ha,
                    provider.crop_parameters(&plan.crop)?,
                    &sim.growth_stage_fractions,
                    plan.parsed_planting_dates()?,
                ));
            }
            let storage = community.storage_capacity_kg * config.area_ha / total_area;
            farms.push(FarmState::new(config, crops, storage));
        }

        let capex_total: Decimal = community.capex.values().copied().sum();
        let economics = EconomicState::new(
            &community.financing,
            capex_total,
            community.replacement_reserve_rate,
            community.annual_om_usd,
        );

        info!(
            "Simulation '{}' ready: {} farms, {} to {}, energy policy {}",
            scenario.name,
            farms.len(),
            sim.start_date,
            sim.end_date,
            energy_policy.name()
        );

        Ok(Self {
            current_date: sim.start_date,
            aquifer: AquiferState::new(&community.aquifer),
            energy: EnergyState::new(&community.energy),
            results: SimulationResults::new(scenario.name.clone()),
            scenario,
            provider,
            farms,
            policies,
            energy_policy,
            economics,
            events: EventLogger::new(),
            finished: false,
        })
    }

    /// Step every remaining day.
    pub fn run(&mut self) -> SimResult<&SimulationResults> {
        while !self.finished {
            self.step_day()?;
        }
        info!(
            "Simulation '{}' finished after {} days",
            self.scenario.name,
            self.results.days_simulated()
        );
        Ok(&self.results)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn farms(&self) -> &[FarmState] {
        &self.farms
    }

    pub fn farm(&self, id: &str) -> Option<&FarmState> {
        self.farms.iter().find(|f| f.id.0 == id)
    }

    pub fn aquifer(&self) -> &AquiferState {
        &self.aquifer
    }

    pub fn energy(&self) -> &EnergyState {
        &self.energy
    }

    pub fn economics(&self) -> &EconomicState {
        &self.economics
    }

    pub fn events(&self) -> &EventLogger {
        &self.events
    }

    pub fn results(&self) -> &SimulationResults {
        &self.results
    }

    pub fn into_results(self) -> (SimulationResults, EventLogger) {
        (self.results, self.events)
    }

    /// Simulate `current_date` and move to the next day.
    pub fn step_day(&mut self) -> SimResult<()> {
        if self.finished {
            return Ok(());
        }
        let date = self.current_date;
        let weather = self.provider.weather(date)?;
        let prices = self.provider.utility_prices(date)?;
        let mut days: Vec<FarmDay> = self.farms.iter().map(|_| FarmDay::default()).collect();

        self.plan_water(date, &weather, &prices, &mut days)?;

        let (pv_kwh, wind_kwh) = self.energy.renewable_output(&weather);
        let expected_demand: f64 = days
            .iter()
            .map(|d| d.water_energy_kwh + d.base_load_kwh)
            .sum();
        let energy_decision = self.energy_policy.select(&EnergyPolicyContext {
            demand_kwh: expected_demand,
            pv_available_kwh: pv_kwh,
            wind_available_kwh: wind_kwh,
            battery_soc: self.energy.battery.soc,
            grid_price_per_kwh: prices.electricity_per_kwh,
            diesel_price_per_l: prices.diesel_per_l,
        })?;

        let mut processing_left = self.scenario.community.processing.clone();
        for (i, day) in days.iter_mut().enumerate() {
            self.process_harvests(i, date, day, &mut processing_left)?;
            self.sell_inventory(i, date, day)?;
        }

        if date.day() == 1 {
            self.monthly_finance(date, &mut days)?;
        }

        self.settle_day(date, &prices, &energy_decision, pv_kwh, wind_kwh, days)?;

        if date >= self.scenario.simulation.end_date {
            self.finished = true;
        } else {
            self.current_date = date
                .succ_opt()
                .ok_or_else(|| SimError::Config(format!("no day after {}", date)))?;
        }
        Ok(())
    }

    /// Steps 1 and 2: crop demand, then water allocation under shared
    /// well and treatment capacity.
    fn plan_water(
        &mut self,
        date: NaiveDate,
        weather: &WeatherDay,
        prices: &UtilityPrices,
        days: &mut [FarmDay],
    ) -> SimResult<()> {
        let sim = &self.scenario.simulation;
        let community = &self.scenario.community;
        let pumping_kwh_per_m3 = self.aquifer.pumping_kwh_per_m3(community.wells.pump_efficiency);
        let mut plans = Vec::with_capacity(self.farms.len());

        for (i, farm) in self.farms.iter_mut().enumerate() {
            let policies = &self.policies[i];
            let farm_id = farm.id.0.clone();

            let mut crop_demands = Vec::with_capacity(farm.crops.len());
            let mut demand_m3 = 0.0;
            for crop in farm.crops.iter_mut() {
                if let Some(from) = crop.start_deferred(date) {
                    info!("{}: deferred {} planting from {} started", farm_id, crop.crop, from);
                    self.events.log(
                        date,
                        &farm_id,
                        EventType::CropPlanted {
                            crop: crop.crop.clone(),
                            deferred_from: Some(from),
                        },
                    );
                }
                if crop.is_planting_day(date) {
                    match crop.plant(date) {
                        PlantingOutcome::Planted => {
                            debug!("{}: planted {}", farm_id, crop.crop);
                            self.events.log(
                                date,
                                &farm_id,
                                EventType::CropPlanted {
                                    crop: crop.crop.clone(),
                                    deferred_from: None,
                                },
                            );
                        }
                        PlantingOutcome::Deferred => {
                            warn!(
                                "{}: {} still in {}, planting deferred",
                                farm_id, crop.crop, crop.stage
                            );
                            self.events.log(
                                date,
                                &farm_id,
                                EventType::PlantingDeferred {
                                    crop: crop.crop.clone(),
                                    queued: crop.deferred_plantings(),
                                },
                            );
                        }
                    }
                }

                if !crop.stage.is_active() {
                    crop_demands.push((0.0, 0.0));
                    continue;
                }
                let base_demand_m3 = self.provider.irrigation_demand_m3_per_ha(
                    date,
                    crop.kc(),
                    sim.irrigation_efficiency,
                )? * crop.area_ha;
                let decision = policies.crop.decide(&CropPolicyContext {
                    crop: crop.crop.clone(),
                    base_demand_m3,
                    stage: crop.stage,
                    days_in_stage: crop.days_in_stage,
                    temperature_c: weather.temperature_c,
                    heat_threshold_c: crop.params().heat_threshold_c,
                })?;
                self.events.log(
                    date,
                    &farm_id,
                    EventType::CropDecision {
                        crop: crop.crop.clone(),
                        stage: crop.stage,
                        base_demand_m3,
                        adjusted_demand_m3: decision.adjusted_demand_m3,
                        reason: decision.decision_reason,
                    },
                );
                crop_demands.push((base_demand_m3, decision.adjusted_demand_m3));
                demand_m3 += decision.adjusted_demand_m3;
            }

            let ctx = WaterPolicyContext {
                demand_m3,
                available_well_m3: 0.0,
                available_treatment_m3: 0.0,
                pumping_kwh_per_m3,
                conveyance_kwh_per_m3: community.conveyance_kwh_per_m3,
                treatment_kwh_per_m3: community.treatment.energy_kwh_per_m3,
                gw_maintenance_per_m3: community.gw_maintenance_per_m3,
                energy_price_per_kwh: prices.electricity_per_kwh,
                municipal_price_per_m3: prices.municipal_water_per_m3,
                groundwater_tds_ppm: community.treatment.output_tds_ppm,
                municipal_tds_ppm: community.municipal_tds_ppm,
                groundwater_used_this_year_m3: farm.groundwater_used_this_year_m3,
                groundwater_used_this_month_m3: farm.groundwater_used_this_month_m3,
            };
            let requested_m3 = policies.water.groundwater_request(&ctx)?;
            plans.push(FarmWaterPlan {
                ctx,
                requested_m3,
                crop_demands,
            });
        }

        // Shared capacity goes only to farms that actually want groundwater.
        let requests: Vec<f64> = plans.iter().map(|p| p.requested_m3).collect();
        let well_shares = fair_shares(&requests, community.well_capacity_m3_per_day());
        let treatment_shares = fair_shares(&requests, community.treatment.capacity_m3_per_day);

        for (i, (farm, plan)) in self.farms.iter_mut().zip(plans).enumerate() {
            let day = &mut days[i];
            let farm_id = farm.id.0.clone();
            let demand_m3 = plan.ctx.demand_m3;
            let crop_demands = plan.crop_demands;
            let allocation = self.policies[i].water.allocate(&WaterPolicyContext {
                available_well_m3: well_shares[i],
                available_treatment_m3: treatment_shares[i],
                ..plan.ctx
            })?;
            farm.record_groundwater(allocation.groundwater_m3);

            // Municipal supply covers any shortfall, so every crop receives
            // its adjusted demand.
            for (crop, (required, delivered)) in farm.crops.iter_mut().zip(&crop_demands) {
                crop.record_water(*required, *delivered);
            }

            day.ledger.water_demand_m3 = demand_m3;
            day.ledger.groundwater_m3 = allocation.groundwater_m3;
            day.ledger.municipal_m3 = allocation.municipal_m3;
            day.ledger.water_cost_usd = usd(allocation.groundwater_m3) * community.gw_maintenance_per_m3
                + usd(allocation.municipal_m3) * prices.municipal_water_per_m3;
            day.water_energy_kwh = allocation.energy_used_kwh;
            day.base_load_kwh = farm.area_ha * sim.farm_base_load_kwh_per_ha;
            day.constraint = allocation.constraint_hit;
            day.water_reason = allocation.decision_reason.clone();

            debug!(
                "{} {}: water {:.2} m3 (gw {:.2}, municipal {:.2}) {}",
                date,
                farm_id,
                demand_m3,
                allocation.groundwater_m3,
                allocation.municipal_m3,
                allocation.decision_reason
            );
            self.events.log(
                date,
                &farm_id,
                EventType::WaterAllocated {
                    demand_m3,
                    groundwater_m3: allocation.groundwater_m3,
                    municipal_m3: allocation.municipal_m3,
                    constraint: allocation.constraint_hit,
                    reason: allocation.decision_reason,
                },
            );
        }
        Ok(())
    }

    /// Step 4 and 4b: advance crops, process any harvest into tranches,
    /// then force-sell expired and overflowing stock.
    fn process_harvests(
        &mut self,
        index: usize,
        date: NaiveDate,
        day: &mut FarmDay,
        processing_left: &mut ProcessingCapacity,
    ) -> SimResult<()> {
        let provider = &self.provider;
        let farm = &mut self.farms[index];
        let policies = &self.policies[index];
        let farm_id = farm.id.0.clone();
        let handling_loss = self.scenario.simulation.handling_loss_fraction;

        let yield_factor = farm.yield_factor;
        let reports: Vec<_> = farm
            .crops
            .iter_mut()
            .filter_map(|crop| crop.advance_day(yield_factor))
            .collect();

        for report in reports {
            info!(
                "{}: harvested {:.1} kg {} (stress factor {:.3})",
                farm_id, report.yield_kg, report.crop, report.water_stress_factor
            );
            self.events.log(
                date,
                &farm_id,
                EventType::Harvest {
                    crop: report.crop.clone(),
                    yield_kg: report.yield_kg,
                    water_stress_factor: report.water_stress_factor,
                },
            );
            day.ledger.harvests += 1;
            day.ledger.harvest_kg += report.yield_kg;

            let intake_kg = report.yield_kg * (1.0 - handling_loss);
            let decision = policies.food.allocate(&FoodProcessingContext {
                crop: report.crop.clone(),
                harvest_kg: intake_kg,
                fresh_price: provider.crop_price(date, &report.crop, ProductType::Fresh)?,
                fresh_reference_price: provider.reference_price(&report.crop, ProductType::Fresh)?,
                capacities: processing_left.clone(),
            })?;

            let outputs = process_harvest(intake_kg, &decision.fractions, |product| {
                provider.processing_spec(product)
            })?;
            for output in &outputs {
                farm.inventory.add(
                    &report.crop,
                    output.product,
                    output.output_kg,
                    date,
                    output.shelf_life_days,
                );
                day.ledger.processed_kg += output.output_kg;
                day.processing_energy_kwh += output.energy_kwh;
                let cap = match output.product {
                    ProductType::Fresh => None,
                    ProductType::Packaged => processing_left.packaged_kg_per_day.as_mut(),
                    ProductType::Canned => processing_left.canned_kg_per_day.as_mut(),
                    ProductType::Dried => processing_left.dried_kg_per_day.as_mut(),
                };
                if let Some(cap) = cap {
                    *cap = (*cap - output.input_kg).max(0.0);
                }
            }
            self.events.log(
                date,
                &farm_id,
                EventType::ProcessingDecision {
                    crop: report.crop,
                    intake_kg,
                    fractions: decision.fractions,
                    capacity_clipped: decision.capacity_clipped,
                    reason: decision.decision_reason,
                },
            );
        }

        for forced in farm.inventory.forced_sales(date, farm.storage_capacity_kg) {
            let sale = forced.sale;
            let price = provider.crop_price(date, &sale.crop, sale.product)?;
            let revenue = usd(sale.quantity_kg) * price;
            warn!(
                "{}: forced sale of {:.1} kg {} {} ({})",
                farm_id, sale.quantity_kg, sale.product, sale.crop, forced.reason
            );
            day.ledger.forced_sold_kg += sale.quantity_kg;
            day.ledger.forced_sale_revenue_usd += revenue;
            self.events.log(
                date,
                &farm_id,
                EventType::ForcedSale {
                    crop: sale.crop,
                    product: sale.product,
                    quantity_kg: sale.quantity_kg,
                    revenue_usd: revenue,
                    reason: forced.reason,
                },
            );
        }
        Ok(())
    }

    /// Step 5: voluntary sales from each bucket, oldest tranche first.
    fn sell_inventory(&mut self, index: usize, date: NaiveDate, day: &mut FarmDay) -> SimResult<()> {
        let provider = &self.provider;
        let farm = &mut self.farms[index];
        let policy = &self.policies[index].market;
        let farm_id = farm.id.0.clone();

        for (crop, product) in farm.inventory.bucket_keys() {
            let price = provider.crop_price(date, &crop, product)?;
            let decision = policy.decide(&MarketPolicyContext {
                crop: crop.clone(),
                product,
                available_kg: farm.inventory.bucket_kg(&crop, product),
                current_price: price,
                reference_price: provider.reference_price(&crop, product)?,
                storage_capacity_kg: farm.storage_capacity_kg,
                stored_total_kg: farm.inventory.total_kg(),
                liquidate: farm.liquidate_inventory,
            })?;

            let sold_kg: f64 = if decision.sell_kg > 0.0 {
                farm.inventory
                    .sell_fifo(&crop, product, decision.sell_kg)
                    .iter()
                    .map(|s| s.quantity_kg)
                    .sum()
            } else {
                0.0
            };
            let revenue = usd(sold_kg) * price;
            day.ledger.sold_kg += sold_kg;
            day.ledger.crop_revenue_usd += revenue;
            self.events.log(
                date,
                &farm_id,
                EventType::MarketDecision {
                    crop,
                    product,
                    sold_kg,
                    stored_kg: decision.store_kg,
                    revenue_usd: revenue,
                    reason: decision.decision_reason,
                },
            );
        }
        Ok(())
    }

    /// Step 6: monthly debt service and O&M, then each farm's economic
    /// review of the month just closed.
    fn monthly_finance(&mut self, date: NaiveDate, days: &mut [FarmDay]) -> SimResult<()> {
        let areas: Vec<f64> = self.farms.iter().map(|f| f.area_ha).collect();
        let debt_shares = allocate_by_weight(self.economics.service_debt(), &areas);
        let om_shares = allocate_by_weight(self.economics.monthly_om_usd, &areas);

        for (i, farm) in self.farms.iter_mut().enumerate() {
            days[i].ledger.debt_service_usd += debt_shares[i];
            days[i].ledger.om_cost_usd += om_shares[i];

            let Some(last_month) = farm.last_month.as_ref() else {
                continue;
            };
            let mut inventory_value = Decimal::ZERO;
            for (crop, product) in farm.inventory.bucket_keys() {
                let price = self.provider.crop_price(date, &crop, product)?;
                inventory_value += usd(farm.inventory.bucket_kg(&crop, product)) * price;
            }
            let decision = self.policies[i].economic.review(&EconomicPolicyContext {
                cash_usd: farm.current_capital_usd,
                // Export credits can push a month's running cost below zero.
                monthly_operating_cost_usd: last_month.operating_cost().max(Decimal::ZERO),
                inventory_value_usd: inventory_value,
                debt_service_usd: debt_shares[i],
            })?;
            if decision.sell_inventory && !farm.liquidate_inventory {
                warn!(
                    "{}: cash {} below reserve target {}, liquidating inventory",
                    farm.id, farm.current_capital_usd, decision.reserve_target_usd
                );
            }
            farm.liquidate_inventory = decision.sell_inventory;
            farm.reserve_target_usd = decision.reserve_target_usd;
            self.events.log(
                date,
                &farm.id.0,
                EventType::EconomicReview {
                    reserve_target_usd: decision.reserve_target_usd,
                    sell_inventory: decision.sell_inventory,
                    reason: decision.decision_reason,
                },
            );
        }
        Ok(())
    }

    /// Dispatch the day's energy, mutate shared state once, allocate costs
    /// and write records.
    fn settle_day(
        &mut self,
        date: NaiveDate,
        prices: &UtilityPrices,
        energy_decision: &EnergyDecision,
        pv_kwh: f64,
        wind_kwh: f64,
        mut days: Vec<FarmDay>,
    ) -> SimResult<()> {
        let demand_kwh: f64 = days.iter().map(FarmDay::energy_demand_kwh).sum();
        let dispatch_prices = DispatchPrices {
            grid_import_per_kwh: prices.electricity_per_kwh,
            grid_export_per_kwh: prices.electricity_per_kwh * usd(self.energy.export_price_fraction),
            diesel_per_l: prices.diesel_per_l,
        };
        let result = dispatch(
            demand_kwh,
            pv_kwh,
            wind_kwh,
            &self.energy.battery,
            &self.energy.generator,
            &energy_decision.flags,
            &dispatch_prices,
        );
        self.energy.apply(&result);
        if result.unmet_kwh > 0.0 {
            warn!("{}: {:.1} kWh of demand unmet", date, result.unmet_kwh);
        }
        self.events.log(
            date,
            COMMUNITY,
            EventType::EnergyDispatched {
                demand_kwh,
                grid_import_kwh: result.grid_import_kwh,
                generator_kwh: result.generator_kwh,
                unmet_kwh: result.unmet_kwh,
                soc_after: result.soc_after,
                reason: energy_decision.decision_reason.clone(),
            },
        );

        let groundwater_m3: f64 = days.iter().map(|d| d.ledger.groundwater_m3).sum();
        self.aquifer.record_extraction(groundwater_m3);

        let areas: Vec<f64> = self.farms.iter().map(|f| f.area_ha).collect();
        let cost_weights: Vec<f64> = if demand_kwh > 0.0 {
            days.iter().map(FarmDay::energy_demand_kwh).collect()
        } else {
            areas.clone()
        };
        let energy_shares = allocate_by_weight(result.cost_usd, &cost_weights);

        let next = date.succ_opt();
        let last_day = date >= self.scenario.simulation.end_date;
        let month_end = last_day || next.is_none_or(|n| n.month() != date.month());
        let year_boundary = next.is_none_or(|n| n.year() != date.year());

        if year_boundary {
            let reserve = allocate_by_weight(self.economics.accrue_reserve(), &areas);
            for (day, share) in days.iter_mut().zip(reserve) {
                day.ledger.reserve_contribution_usd += share;
            }
        }

        let community = &self.scenario.community;
        let mut community_record = DailyCommunityRecord {
            date,
            water_demand_m3: 0.0,
            groundwater_m3,
            municipal_m3: 0.0,
            well_capacity_m3: community.well_capacity_m3_per_day(),
            treatment_capacity_m3: community.treatment.capacity_m3_per_day,
            dispatch: result,
            energy_decision_reason: energy_decision.decision_reason.clone(),
            aquifer_drawdown_m: self.aquifer.drawdown_m,
        };

        for ((farm, mut day), energy_cost) in self.farms.iter_mut().zip(days).zip(energy_shares) {
            day.ledger.energy_demand_kwh = day.energy_demand_kwh();
            day.ledger.energy_cost_usd = energy_cost;
            farm.post(&day.ledger);

            community_record.water_demand_m3 += day.ledger.water_demand_m3;
            community_record.municipal_m3 += day.ledger.municipal_m3;
            self.results.daily_farm.push(DailyFarmRecord {
                date,
                farm_id: farm.id.clone(),
                totals: day.ledger,
                water_constraint: day.constraint,
                water_decision_reason: day.water_reason,
                capital_usd: farm.current_capital_usd,
                inventory_kg: farm.inventory.total_kg(),
            });
        }
        debug!(
            "{}: water {:.1} m3, energy {:.1} kWh, SOC {:.3}",
            date,
            community_record.water_demand_m3,
            demand_kwh,
            community_record.dispatch.soc_after
        );
        self.results.daily_community.push(community_record);

        if month_end {
            for farm in &mut self.farms {
                let totals = farm.close_month();
                self.results.monthly_farm.push(MonthlyFarmRecord {
                    farm_id: farm.id.clone(),
                    year: date.year(),
                    month: date.month(),
                    totals,
                    capital_end_usd: farm.current_capital_usd,
                    reserve_target_usd: farm.reserve_target_usd,
                    liquidating: farm.liquidate_inventory,
                });
            }
        }
        if year_boundary || last_day {
            self.close_year(date, year_boundary);
        }
        Ok(())
    }

    /// Year-end snapshot. Aging and drawdown only apply at a real calendar
    /// boundary, not when the run stops mid-year.
    fn close_year(&mut self, date: NaiveDate, calendar_boundary: bool) {
        let year = date.year();
        let groundwater_m3: f64 = self.farms.iter().map(|f| f.year.groundwater_m3).sum();
        let municipal_m3: f64 = self.farms.iter().map(|f| f.year.municipal_m3).sum();

        for farm in &mut self.farms {
            let totals = farm.close_year();
            info!(
                "{} year {}: net income {}, capital {}",
                farm.id,
                year,
                totals.net_income(),
                farm.current_capital_usd
            );
            self.events.log(
                date,
                &farm.id.0,
                EventType::YearEndSnapshot {
                    year,
                    capital_usd: farm.current_capital_usd,
                    net_income_usd: totals.net_income(),
                    inventory_kg: farm.inventory.total_kg(),
                },
            );
            self.results.yearly_farm.push(YearlyFarmRecord {
                farm_id: farm.id.clone(),
                year,
                area_ha: farm.area_ha,
                totals,
                capital_end_usd: farm.current_capital_usd,
                inventory_end_kg: farm.inventory.total_kg(),
            });
        }

        let energy = if calendar_boundary {
            self.aquifer.recalculate_drawdown();
            self.energy.close_year()
        } else {
            std::mem::take(&mut self.energy.year)
        };
        info!(
            "Year {} closed: groundwater {:.0} m3, drawdown {:.2} m, battery capacity {:.3}",
            year, groundwater_m3, self.aquifer.drawdown_m, self.energy.battery.capacity_factor
        );
        self.results.yearly_community.push(YearlyCommunityRecord {
            year,
            energy,
            groundwater_m3,
            municipal_m3,
            aquifer_drawdown_m: self.aquifer.drawdown_m,
            aquifer_remaining_m3: self.aquifer.remaining_volume_m3(),
            battery_capacity_factor: self.energy.battery.capacity_factor,
            battery_cumulative_efc: self.energy.battery.cumulative_efc,
            pv_capacity_factor: self.energy.pv_capacity_factor,
            replacement_reserve_usd: self.economics.replacement_reserve_usd,
            debt_outstanding_usd: self.economics.debt_outstanding_usd(),
        });
    }
}
