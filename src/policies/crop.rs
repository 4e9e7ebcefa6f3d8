//! Crop policies turn the day's base irrigation requirement into the demand
//! actually sent to the water policy.

use serde::{Deserialize, Serialize};

use crate::crop::GrowthStage;
use crate::error::{SimError, SimResult, validate_quantity};
use crate::scenario::PolicyParameters;
use crate::types::ZERO_DEMAND;

#[derive(Debug, Clone)]
pub struct CropPolicyContext {
    pub crop: String,
    pub base_demand_m3: f64,
    pub stage: GrowthStage,
    pub days_in_stage: u32,
    pub temperature_c: f64,
    pub heat_threshold_c: f64,
}

impl CropPolicyContext {
    fn validate(&self) -> SimResult<()> {
        validate_quantity("base_demand_m3", self.base_demand_m3)?;
        if !self.temperature_c.is_finite() {
            return Err(SimError::InvalidInput {
                field: "temperature_c",
                value: self.temperature_c,
                reason: "value is not finite",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropDecision {
    pub adjusted_demand_m3: f64,
    pub demand_multiplier: f64,
    pub decision_reason: String,
}

impl CropDecision {
    pub fn zero_demand() -> Self {
        Self {
            adjusted_demand_m3: 0.0,
            demand_multiplier: 0.0,
            decision_reason: ZERO_DEMAND.to_string(),
        }
    }
}

pub trait CropPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Demand multiplier for a non-zero base demand, with the reason.
    fn multiplier(&self, ctx: &CropPolicyContext) -> (f64, &'static str);

    fn decide(&self, ctx: &CropPolicyContext) -> SimResult<CropDecision> {
        ctx.validate()?;
        if ctx.base_demand_m3 == 0.0 {
            return Ok(CropDecision::zero_demand());
        }
        let (multiplier, reason) = self.multiplier(ctx);
        let multiplier = multiplier.max(0.0);
        Ok(CropDecision {
            adjusted_demand_m3: ctx.base_demand_m3 * multiplier,
            demand_multiplier: multiplier,
            decision_reason: reason.to_string(),
        })
    }
}

/// Irrigate exactly the computed requirement.
#[derive(Debug, Clone, Default)]
pub struct FixedSchedule;

impl FixedSchedule {
    pub fn from_params(_params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl CropPolicy for FixedSchedule {
    fn name(&self) -> &str {
        "fixed_schedule"
    }

    fn multiplier(&self, _ctx: &CropPolicyContext) -> (f64, &'static str) {
        (1.0, "full_schedule")
    }
}

/// Regulated deficit: cut water outside the yield-sensitive mid season.
#[derive(Debug, Clone)]
pub struct DeficitIrrigation {
    pub deficit_fraction: f64,
}

impl DeficitIrrigation {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            deficit_fraction: params
                .get("deficit_irrigation", "deficit_fraction", 0.2)?
                .min(1.0),
        })
    }
}

impl CropPolicy for DeficitIrrigation {
    fn name(&self) -> &str {
        "deficit_irrigation"
    }

    fn multiplier(&self, ctx: &CropPolicyContext) -> (f64, &'static str) {
        if ctx.stage == GrowthStage::MidSeason {
            (1.0, "mid_season_full")
        } else {
            (1.0 - self.deficit_fraction, "deficit_applied")
        }
    }
}

/// Scale irrigation with the day's temperature.
#[derive(Debug, Clone)]
pub struct WeatherAdaptive {
    pub heat_boost: f64,
    pub cool_reduction: f64,
    pub cool_threshold_c: f64,
}

impl WeatherAdaptive {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            heat_boost: params.get("weather_adaptive", "heat_boost", 0.15)?,
            cool_reduction: params
                .get("weather_adaptive", "cool_reduction", 0.15)?
                .min(1.0),
            cool_threshold_c: params.get("weather_adaptive", "cool_threshold_c", 15.0)?,
        })
    }
}

impl CropPolicy for WeatherAdaptive {
    fn name(&self) -> &str {
        "weather_adaptive"
    }

    fn multiplier(&self, ctx: &CropPolicyContext) -> (f64, &'static str) {
        if ctx.temperature_c > ctx.heat_threshold_c {
            (1.0 + self.heat_boost, "heat_boost")
        } else if ctx.temperature_c < self.cool_threshold_c {
            (1.0 - self.cool_reduction, "cool_reduction")
        } else {
            (1.0, "normal_weather")
        }
    }
}
