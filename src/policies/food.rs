//! Food processing: split a day's harvest across the four pathways.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{price_ratio, validate_money};
use crate::data::ProcessingSpec;
use crate::error::{SimResult, validate_quantity};
use crate::scenario::{PolicyParameters, ProcessingCapacity};
use crate::types::{ProductType, ZERO_DEMAND};

/// Share of intake sent to each pathway. Always sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingFractions {
    pub fresh: f64,
    pub packaged: f64,
    pub canned: f64,
    pub dried: f64,
}

impl ProcessingFractions {
    pub const ALL_FRESH: Self = Self::new(1.0, 0.0, 0.0, 0.0);

    pub const fn new(fresh: f64, packaged: f64, canned: f64, dried: f64) -> Self {
        Self {
            fresh,
            packaged,
            canned,
            dried,
        }
    }

    pub fn get(&self, product: ProductType) -> f64 {
        match product {
            ProductType::Fresh => self.fresh,
            ProductType::Packaged => self.packaged,
            ProductType::Canned => self.canned,
            ProductType::Dried => self.dried,
        }
    }

    pub fn total(&self) -> f64 {
        self.fresh + self.packaged + self.canned + self.dried
    }

    /// Move any capped pathway's overflow into fresh. Returns the clipped
    /// fractions and whether any clipping happened.
    pub fn clip_to_capacity(&self, harvest_kg: f64, capacity: &ProcessingCapacity) -> (Self, bool) {
        if harvest_kg <= 0.0 {
            return (*self, false);
        }
        let mut out = *self;
        let mut clipped = false;
        let caps = [
            (&mut out.packaged, capacity.packaged_kg_per_day),
            (&mut out.canned, capacity.canned_kg_per_day),
            (&mut out.dried, capacity.dried_kg_per_day),
        ];
        let mut overflow = 0.0;
        for (fraction, cap) in caps {
            if let Some(cap) = cap {
                let max_fraction = (cap / harvest_kg).max(0.0);
                if *fraction > max_fraction {
                    overflow += *fraction - max_fraction;
                    *fraction = max_fraction;
                    clipped = true;
                }
            }
        }
        out.fresh += overflow;
        (out, clipped)
    }
}

#[derive(Debug, Clone)]
pub struct FoodProcessingContext {
    pub crop: String,
    /// Intake after handling loss.
    pub harvest_kg: f64,
    pub fresh_price: Decimal,
    pub fresh_reference_price: Decimal,
    pub capacities: ProcessingCapacity,
}

impl FoodProcessingContext {
    fn validate(&self) -> SimResult<()> {
        validate_quantity("harvest_kg", self.harvest_kg)?;
        validate_money("fresh_price", self.fresh_price)?;
        validate_money("fresh_reference_price", self.fresh_reference_price)?;
        for cap in [
            self.capacities.packaged_kg_per_day,
            self.capacities.canned_kg_per_day,
            self.capacities.dried_kg_per_day,
        ]
        .into_iter()
        .flatten()
        {
            validate_quantity("processing_capacity_kg_per_day", cap)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingDecision {
    pub fractions: ProcessingFractions,
    pub decision_reason: String,
    pub capacity_clipped: bool,
}

impl ProcessingDecision {
    pub fn zero_demand() -> Self {
        Self {
            fractions: ProcessingFractions::ALL_FRESH,
            decision_reason: ZERO_DEMAND.to_string(),
            capacity_clipped: false,
        }
    }
}

pub trait FoodProcessingPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Target split before capacity clipping.
    fn target_fractions(&self, ctx: &FoodProcessingContext) -> (ProcessingFractions, &'static str);

    fn allocate(&self, ctx: &FoodProcessingContext) -> SimResult<ProcessingDecision> {
        ctx.validate()?;
        if ctx.harvest_kg == 0.0 {
            return Ok(ProcessingDecision::zero_demand());
        }
        let (target, reason) = self.target_fractions(ctx);
        let (fractions, capacity_clipped) = target.clip_to_capacity(ctx.harvest_kg, &ctx.capacities);
        Ok(ProcessingDecision {
            fractions,
            decision_reason: reason.to_string(),
            capacity_clipped,
        })
    }
}

/// One pathway's share of a processed harvest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedOutput {
    pub product: ProductType,
    pub input_kg: f64,
    pub output_kg: f64,
    pub energy_kwh: f64,
    pub shelf_life_days: u32,
}

/// Apply weight retention and processing energy to each non-empty pathway.
pub fn process_harvest<F>(
    intake_kg: f64,
    fractions: &ProcessingFractions,
    mut spec_for: F,
) -> SimResult<Vec<ProcessedOutput>>
where
    F: FnMut(ProductType) -> SimResult<ProcessingSpec>,
{
    let mut outputs = Vec::new();
    for product in ProductType::ALL {
        let input_kg = intake_kg * fractions.get(product);
        if input_kg <= 0.0 {
            continue;
        }
        let spec = spec_for(product)?;
        outputs.push(ProcessedOutput {
            product,
            input_kg,
            output_kg: input_kg * spec.weight_retention,
            energy_kwh: input_kg * spec.energy_kwh_per_kg,
            shelf_life_days: spec.shelf_life_days,
        });
    }
    Ok(outputs)
}

#[derive(Debug, Clone, Default)]
pub struct AllFresh;

impl AllFresh {
    pub fn from_params(_params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl FoodProcessingPolicy for AllFresh {
    fn name(&self) -> &str {
        "all_fresh"
    }

    fn target_fractions(&self, _ctx: &FoodProcessingContext) -> (ProcessingFractions, &'static str) {
        (ProcessingFractions::ALL_FRESH, "all_fresh")
    }
}

/// Favour long shelf-life products.
#[derive(Debug, Clone, Default)]
pub struct MaximizeStorage;

impl MaximizeStorage {
    pub fn from_params(_params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl FoodProcessingPolicy for MaximizeStorage {
    fn name(&self) -> &str {
        "maximize_storage"
    }

    fn target_fractions(&self, _ctx: &FoodProcessingContext) -> (ProcessingFractions, &'static str) {
        (ProcessingFractions::new(0.2, 0.1, 0.3, 0.4), "maximize_storage")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Balanced;

impl Balanced {
    pub const FRACTIONS: ProcessingFractions = ProcessingFractions::new(0.5, 0.2, 0.15, 0.15);

    pub fn from_params(_params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl FoodProcessingPolicy for Balanced {
    fn name(&self) -> &str {
        "balanced"
    }

    fn target_fractions(&self, _ctx: &FoodProcessingContext) -> (ProcessingFractions, &'static str) {
        (Self::FRACTIONS, "balanced_mix")
    }
}

/// Balanced mix, shifted towards processing when fresh prices are depressed.
#[derive(Debug, Clone)]
pub struct MarketResponsive {
    pub price_threshold: f64,
}

impl MarketResponsive {
    pub const LOW_PRICE_FRACTIONS: ProcessingFractions =
        ProcessingFractions::new(0.3, 0.2, 0.25, 0.25);

    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            price_threshold: params.get("market_responsive", "price_threshold", 0.8)?,
        })
    }
}

impl FoodProcessingPolicy for MarketResponsive {
    fn name(&self) -> &str {
        "market_responsive"
    }

    fn target_fractions(&self, ctx: &FoodProcessingContext) -> (ProcessingFractions, &'static str) {
        let ratio = price_ratio(ctx.fresh_price, ctx.fresh_reference_price);
        if ratio < self.price_threshold {
            (Self::LOW_PRICE_FRACTIONS, "low_fresh_price")
        } else {
            (Balanced::FRACTIONS, "normal_fresh_price")
        }
    }
}
