//! Name → constructor lookup for every policy domain.
//!
//! Scenario files select policies by name. Unknown names are a configuration
//! error listing what is available; there is no silent default.

use std::collections::BTreeMap;

use super::crop::{self, CropPolicy};
use super::economic::{self, EconomicPolicy};
use super::energy::{self, EnergyPolicy};
use super::food::{self, FoodProcessingPolicy};
use super::market::{self, MarketPolicy};
use super::water::{self, WaterPolicy};
use crate::error::{SimError, SimResult};
use crate::scenario::{PolicyParameters, PolicySelection};

pub type Constructor<T> = fn(&PolicyParameters) -> SimResult<Box<T>>;

pub struct PolicyRegistry<T: ?Sized> {
    domain: &'static str,
    constructors: BTreeMap<&'static str, Constructor<T>>,
}

impl<T: ?Sized> PolicyRegistry<T> {
    pub fn new(domain: &'static str) -> Self {
        Self {
            domain,
            constructors: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, constructor: Constructor<T>) -> &mut Self {
        self.constructors.insert(name, constructor);
        self
    }

    pub fn domain(&self) -> &'static str {
        self.domain
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.constructors.keys().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name.to_lowercase().as_str())
    }

    /// Build a policy by name. Names are case-insensitive.
    pub fn create(&self, name: &str, params: &PolicyParameters) -> SimResult<Box<T>> {
        match self.constructors.get(name.to_lowercase().as_str()) {
            Some(constructor) => constructor(params),
            None => Err(SimError::UnknownPolicy {
                domain: self.domain,
                name: name.to_string(),
                available: self.names().join(", "),
            }),
        }
    }
}

macro_rules! constructor {
    ($trait:ident, $ty:ty) => {{
        fn build(params: &PolicyParameters) -> SimResult<Box<dyn $trait>> {
            Ok(Box::new(<$ty>::from_params(params)?))
        }
        build as Constructor<dyn $trait>
    }};
}

pub fn water_policies() -> PolicyRegistry<dyn WaterPolicy> {
    let mut registry = PolicyRegistry::new("water");
    registry
        .register("max_groundwater", constructor!(WaterPolicy, water::MaxGroundwater))
        .register("max_municipal", constructor!(WaterPolicy, water::MaxMunicipal))
        .register("min_water_quality", constructor!(WaterPolicy, water::MinWaterQuality))
        .register("cheapest_source", constructor!(WaterPolicy, water::CheapestSource))
        .register(
            "conserve_groundwater",
            constructor!(WaterPolicy, water::ConserveGroundwater),
        )
        .register("quota_enforced", constructor!(WaterPolicy, water::QuotaEnforced));
    registry
}

pub fn energy_policies() -> PolicyRegistry<dyn EnergyPolicy> {
    let mut registry = PolicyRegistry::new("energy");
    registry
        .register("microgrid", constructor!(EnergyPolicy, energy::Microgrid))
        .register("renewable_first", constructor!(EnergyPolicy, energy::RenewableFirst))
        .register("all_grid", constructor!(EnergyPolicy, energy::AllGrid));
    registry
}

pub fn crop_policies() -> PolicyRegistry<dyn CropPolicy> {
    let mut registry = PolicyRegistry::new("crop");
    registry
        .register("fixed_schedule", constructor!(CropPolicy, crop::FixedSchedule))
        .register("deficit_irrigation", constructor!(CropPolicy, crop::DeficitIrrigation))
        .register("weather_adaptive", constructor!(CropPolicy, crop::WeatherAdaptive));
    registry
}

pub fn food_policies() -> PolicyRegistry<dyn FoodProcessingPolicy> {
    let mut registry = PolicyRegistry::new("food");
    registry
        .register("all_fresh", constructor!(FoodProcessingPolicy, food::AllFresh))
        .register(
            "maximize_storage",
            constructor!(FoodProcessingPolicy, food::MaximizeStorage),
        )
        .register("balanced", constructor!(FoodProcessingPolicy, food::Balanced))
        .register(
            "market_responsive",
            constructor!(FoodProcessingPolicy, food::MarketResponsive),
        );
    registry
}

pub fn market_policies() -> PolicyRegistry<dyn MarketPolicy> {
    let mut registry = PolicyRegistry::new("market");
    registry
        .register(
            "sell_all_immediately",
            constructor!(MarketPolicy, market::SellAllImmediately),
        )
        .register("hold_for_peak", constructor!(MarketPolicy, market::HoldForPeak))
        .register("adaptive", constructor!(MarketPolicy, market::Adaptive));
    registry
}

pub fn economic_policies() -> PolicyRegistry<dyn EconomicPolicy> {
    let mut registry = PolicyRegistry::new("economic");
    registry
        .register("balanced", constructor!(EconomicPolicy, economic::Balanced))
        .register(
            "aggressive_growth",
            constructor!(EconomicPolicy, economic::AggressiveGrowth),
        )
        .register("conservative", constructor!(EconomicPolicy, economic::Conservative))
        .register("risk_averse", constructor!(EconomicPolicy, economic::RiskAverse));
    registry
}

/// The per-farm policies, one per farm-level domain.
pub struct PolicySet {
    pub water: Box<dyn WaterPolicy>,
    pub crop: Box<dyn CropPolicy>,
    pub food: Box<dyn FoodProcessingPolicy>,
    pub market: Box<dyn MarketPolicy>,
    pub economic: Box<dyn EconomicPolicy>,
}

impl PolicySet {
    pub fn build(selection: &PolicySelection, params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            water: water_policies().create(&selection.water, params)?,
            crop: crop_policies().create(&selection.crop, params)?,
            food: food_policies().create(&selection.food, params)?,
            market: market_policies().create(&selection.market, params)?,
            economic: economic_policies().create(&selection.economic, params)?,
        })
    }
}

impl std::fmt::Debug for PolicySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicySet")
            .field("water", &self.water.name())
            .field("crop", &self.crop.name())
            .field("food", &self.food.name())
            .field("market", &self.market.name())
            .field("economic", &self.economic.name())
            .finish()
    }
}
