//! Market timing: how much of a bucket's remaining inventory to sell today.
//!
//! Runs after the forced-sale sweep, so it only ever sees stock that is
//! neither expired nor overflowing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{price_ratio, validate_money};
use crate::error::{SimResult, validate_quantity};
use crate::scenario::PolicyParameters;
use crate::types::{ProductType, ZERO_DEMAND};

#[derive(Debug, Clone)]
pub struct MarketPolicyContext {
    pub crop: String,
    pub product: ProductType,
    /// Stock in this bucket.
    pub available_kg: f64,
    pub current_price: Decimal,
    pub reference_price: Decimal,
    pub storage_capacity_kg: f64,
    /// Stock across all buckets, this one included.
    pub stored_total_kg: f64,
    /// Economic policy asked to liquidate inventory.
    pub liquidate: bool,
}

impl MarketPolicyContext {
    fn validate(&self) -> SimResult<()> {
        validate_quantity("available_kg", self.available_kg)?;
        validate_quantity("storage_capacity_kg", self.storage_capacity_kg)?;
        validate_quantity("stored_total_kg", self.stored_total_kg)?;
        validate_money("current_price", self.current_price)?;
        validate_money("reference_price", self.reference_price)?;
        Ok(())
    }

    /// Most of this bucket that may stay in storage.
    pub fn max_hold_kg(&self) -> f64 {
        let other = (self.stored_total_kg - self.available_kg).max(0.0);
        (self.storage_capacity_kg - other).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDecision {
    pub sell_kg: f64,
    pub store_kg: f64,
    pub sell_fraction: f64,
    pub decision_reason: String,
    /// Storage room forced more to be sold than the policy wanted.
    pub storage_capped: bool,
}

impl MarketDecision {
    pub fn zero_demand() -> Self {
        Self {
            sell_kg: 0.0,
            store_kg: 0.0,
            sell_fraction: 0.0,
            decision_reason: ZERO_DEMAND.to_string(),
            storage_capped: false,
        }
    }
}

pub trait MarketPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Fraction of the bucket to sell, with the reason.
    fn sell_fraction(&self, ctx: &MarketPolicyContext) -> (f64, &'static str);

    fn decide(&self, ctx: &MarketPolicyContext) -> SimResult<MarketDecision> {
        ctx.validate()?;
        if ctx.available_kg == 0.0 {
            return Ok(MarketDecision::zero_demand());
        }
        let (fraction, reason) = if ctx.liquidate {
            (1.0, "economic_liquidation")
        } else {
            self.sell_fraction(ctx)
        };
        let fraction = fraction.clamp(0.0, 1.0);

        let wanted_store = ctx.available_kg * (1.0 - fraction);
        let store_kg = wanted_store.min(ctx.max_hold_kg());
        let sell_kg = ctx.available_kg - store_kg;
        Ok(MarketDecision {
            sell_kg,
            store_kg,
            sell_fraction: sell_kg / ctx.available_kg,
            decision_reason: reason.to_string(),
            storage_capped: store_kg < wanted_store,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SellAllImmediately;

impl SellAllImmediately {
    pub fn from_params(_params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl MarketPolicy for SellAllImmediately {
    fn name(&self) -> &str {
        "sell_all_immediately"
    }

    fn sell_fraction(&self, _ctx: &MarketPolicyContext) -> (f64, &'static str) {
        (1.0, "sell_all")
    }
}

/// Hold stock until the price reaches a multiple of the reference.
#[derive(Debug, Clone)]
pub struct HoldForPeak {
    pub price_threshold_multiplier: f64,
}

impl HoldForPeak {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            price_threshold_multiplier: params.get(
                "hold_for_peak",
                "price_threshold_multiplier",
                1.2,
            )?,
        })
    }
}

impl MarketPolicy for HoldForPeak {
    fn name(&self) -> &str {
        "hold_for_peak"
    }

    fn sell_fraction(&self, ctx: &MarketPolicyContext) -> (f64, &'static str) {
        if price_ratio(ctx.current_price, ctx.reference_price) >= self.price_threshold_multiplier {
            (1.0, "peak_price_reached")
        } else {
            (0.0, "holding_for_peak")
        }
    }
}

/// Sell fraction rises smoothly with the price ratio.
#[derive(Debug, Clone)]
pub struct Adaptive {
    pub steepness: f64,
    pub min_sell: f64,
    pub max_sell: f64,
}

impl Adaptive {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        let min_sell = params.get("adaptive", "min_sell", 0.2)?.min(1.0);
        let max_sell = params.get("adaptive", "max_sell", 1.0)?.clamp(min_sell, 1.0);
        Ok(Self {
            steepness: params.get("adaptive", "steepness", 5.0)?,
            min_sell,
            max_sell,
        })
    }

    /// `min + (max - min) / (1 + exp(-k (ratio - 1)))`
    pub fn fraction_for_ratio(&self, ratio: f64) -> f64 {
        let sigmoid = 1.0 / (1.0 + (-self.steepness * (ratio - 1.0)).exp());
        self.min_sell + (self.max_sell - self.min_sell) * sigmoid
    }
}

impl MarketPolicy for Adaptive {
    fn name(&self) -> &str {
        "adaptive"
    }

    fn sell_fraction(&self, ctx: &MarketPolicyContext) -> (f64, &'static str) {
        let ratio = price_ratio(ctx.current_price, ctx.reference_price);
        let reason = if ratio >= 1.0 {
            "price_above_reference"
        } else {
            "price_below_reference"
        };
        (self.fraction_for_ratio(ratio), reason)
    }
}
