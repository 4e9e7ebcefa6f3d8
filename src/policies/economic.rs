//! Monthly reserve management.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validate_money;
use crate::error::SimResult;
use crate::scenario::PolicyParameters;
use crate::types::{ZERO_DEMAND, usd};

#[derive(Debug, Clone)]
pub struct EconomicPolicyContext {
    pub cash_usd: Decimal,
    /// Operating cost of the month under review.
    pub monthly_operating_cost_usd: Decimal,
    pub inventory_value_usd: Decimal,
    pub debt_service_usd: Decimal,
}

impl EconomicPolicyContext {
    fn validate(&self) -> SimResult<()> {
        // Cash may legitimately be negative (overdraft); costs may not.
        validate_money("monthly_operating_cost_usd", self.monthly_operating_cost_usd)?;
        validate_money("inventory_value_usd", self.inventory_value_usd)?;
        validate_money("debt_service_usd", self.debt_service_usd)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicDecision {
    pub reserve_target_months: f64,
    pub reserve_target_usd: Decimal,
    pub sell_inventory: bool,
    pub decision_reason: String,
}

impl EconomicDecision {
    pub fn zero_demand(reserve_target_months: f64) -> Self {
        Self {
            reserve_target_months,
            reserve_target_usd: Decimal::ZERO,
            sell_inventory: false,
            decision_reason: ZERO_DEMAND.to_string(),
        }
    }
}

pub trait EconomicPolicy: Send + Sync {
    fn name(&self) -> &str;

    fn reserve_months(&self) -> f64;

    /// Cash level below which inventory is liquidated, or `None` to never
    /// liquidate.
    fn liquidation_threshold(&self, reserve_target_usd: Decimal) -> Option<Decimal>;

    fn review(&self, ctx: &EconomicPolicyContext) -> SimResult<EconomicDecision> {
        ctx.validate()?;
        let months = self.reserve_months();
        if ctx.monthly_operating_cost_usd == Decimal::ZERO {
            return Ok(EconomicDecision::zero_demand(months));
        }
        let target = (ctx.monthly_operating_cost_usd + ctx.debt_service_usd) * usd(months);
        let (sell_inventory, reason) = match self.liquidation_threshold(target) {
            None => (false, "growth_no_liquidation"),
            Some(threshold) if ctx.cash_usd < threshold => {
                if ctx.inventory_value_usd > Decimal::ZERO {
                    (true, "below_reserve_liquidate")
                } else {
                    (false, "below_reserve_no_inventory")
                }
            }
            Some(_) => (false, "reserve_adequate"),
        };
        Ok(EconomicDecision {
            reserve_target_months: months,
            reserve_target_usd: target,
            sell_inventory,
            decision_reason: reason.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Balanced {
    pub reserve_months: f64,
}

impl Balanced {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            reserve_months: params.get("balanced", "reserve_months", 3.0)?,
        })
    }
}

impl EconomicPolicy for Balanced {
    fn name(&self) -> &str {
        "balanced"
    }

    fn reserve_months(&self) -> f64 {
        self.reserve_months
    }

    fn liquidation_threshold(&self, reserve_target_usd: Decimal) -> Option<Decimal> {
        Some(reserve_target_usd)
    }
}

/// Thin reserve; inventory is never liquidated for cash.
#[derive(Debug, Clone)]
pub struct AggressiveGrowth {
    pub reserve_months: f64,
}

impl AggressiveGrowth {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            reserve_months: params.get("aggressive_growth", "reserve_months", 1.0)?,
        })
    }
}

impl EconomicPolicy for AggressiveGrowth {
    fn name(&self) -> &str {
        "aggressive_growth"
    }

    fn reserve_months(&self) -> f64 {
        self.reserve_months
    }

    fn liquidation_threshold(&self, _reserve_target_usd: Decimal) -> Option<Decimal> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Conservative {
    pub reserve_months: f64,
}

impl Conservative {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            reserve_months: params.get("conservative", "reserve_months", 6.0)?,
        })
    }
}

impl EconomicPolicy for Conservative {
    fn name(&self) -> &str {
        "conservative"
    }

    fn reserve_months(&self) -> f64 {
        self.reserve_months
    }

    fn liquidation_threshold(&self, reserve_target_usd: Decimal) -> Option<Decimal> {
        Some(reserve_target_usd)
    }
}

/// Deep reserve with an early liquidation trigger.
#[derive(Debug, Clone)]
pub struct RiskAverse {
    pub reserve_months: f64,
    pub liquidation_multiplier: f64,
}

impl RiskAverse {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            reserve_months: params.get("risk_averse", "reserve_months", 9.0)?,
            liquidation_multiplier: params.get("risk_averse", "liquidation_multiplier", 1.5)?,
        })
    }
}

impl EconomicPolicy for RiskAverse {
    fn name(&self) -> &str {
        "risk_averse"
    }

    fn reserve_months(&self) -> f64 {
        self.reserve_months
    }

    fn liquidation_threshold(&self, reserve_target_usd: Decimal) -> Option<Decimal> {
        Some(reserve_target_usd * usd(self.liquidation_multiplier))
    }
}
