//! Water allocation: groundwater (wells + treatment) versus municipal supply.
//!
//! The variants differ only in how much groundwater they request. Clipping to
//! physical capacity, the municipal fallback and the cost/energy accounting
//! are shared in [`WaterPolicy::allocate`].
//!
//! Conveyance energy is reported here, as part of groundwater energy, and is
//! not added again anywhere else in the energy balance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validate_money;
use crate::error::{SimResult, validate_quantity};
use crate::scenario::PolicyParameters;
use crate::types::{ConstraintHit, ZERO_DEMAND, usd};

/// Read-only view a water policy decides against.
#[derive(Debug, Clone)]
pub struct WaterPolicyContext {
    pub demand_m3: f64,
    /// This farm's fair share of today's well capacity.
    pub available_well_m3: f64,
    /// This farm's fair share of today's treatment throughput.
    pub available_treatment_m3: f64,
    pub pumping_kwh_per_m3: f64,
    pub conveyance_kwh_per_m3: f64,
    pub treatment_kwh_per_m3: f64,
    pub gw_maintenance_per_m3: Decimal,
    pub energy_price_per_kwh: Decimal,
    pub municipal_price_per_m3: Decimal,
    /// TDS of treated groundwater as delivered.
    pub groundwater_tds_ppm: f64,
    pub municipal_tds_ppm: f64,
    pub groundwater_used_this_year_m3: f64,
    pub groundwater_used_this_month_m3: f64,
}

impl WaterPolicyContext {
    /// Pumping + conveyance + treatment energy per m3 of groundwater.
    pub fn gw_energy_kwh_per_m3(&self) -> f64 {
        self.pumping_kwh_per_m3 + self.conveyance_kwh_per_m3 + self.treatment_kwh_per_m3
    }

    /// `gw_energy_kwh_per_m3 x energy_price + maintenance_per_m3`
    pub fn gw_cost_per_m3(&self) -> Decimal {
        usd(self.gw_energy_kwh_per_m3()) * self.energy_price_per_kwh + self.gw_maintenance_per_m3
    }

    fn validate(&self) -> SimResult<()> {
        validate_quantity("demand_m3", self.demand_m3)?;
        validate_quantity("available_well_m3", self.available_well_m3)?;
        validate_quantity("available_treatment_m3", self.available_treatment_m3)?;
        validate_quantity("pumping_kwh_per_m3", self.pumping_kwh_per_m3)?;
        validate_quantity("conveyance_kwh_per_m3", self.conveyance_kwh_per_m3)?;
        validate_quantity("treatment_kwh_per_m3", self.treatment_kwh_per_m3)?;
        validate_quantity("groundwater_tds_ppm", self.groundwater_tds_ppm)?;
        validate_quantity("municipal_tds_ppm", self.municipal_tds_ppm)?;
        validate_quantity(
            "groundwater_used_this_year_m3",
            self.groundwater_used_this_year_m3,
        )?;
        validate_quantity(
            "groundwater_used_this_month_m3",
            self.groundwater_used_this_month_m3,
        )?;
        validate_money("gw_maintenance_per_m3", self.gw_maintenance_per_m3)?;
        validate_money("energy_price_per_kwh", self.energy_price_per_kwh)?;
        validate_money("municipal_price_per_m3", self.municipal_price_per_m3)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterAllocation {
    pub groundwater_m3: f64,
    pub municipal_m3: f64,
    /// Groundwater asked for before physical clipping.
    pub requested_groundwater_m3: f64,
    pub energy_used_kwh: f64,
    pub cost_usd: Decimal,
    pub gw_cost_per_m3: Decimal,
    pub decision_reason: String,
    pub constraint_hit: Option<ConstraintHit>,
}

impl WaterAllocation {
    pub fn zero_demand() -> Self {
        Self {
            groundwater_m3: 0.0,
            municipal_m3: 0.0,
            requested_groundwater_m3: 0.0,
            energy_used_kwh: 0.0,
            cost_usd: Decimal::ZERO,
            gw_cost_per_m3: Decimal::ZERO,
            decision_reason: ZERO_DEMAND.to_string(),
            constraint_hit: None,
        }
    }
}

/// Clip a groundwater request to the tighter of well and treatment capacity.
pub fn clip_groundwater(
    requested_m3: f64,
    available_well_m3: f64,
    available_treatment_m3: f64,
) -> (f64, Option<ConstraintHit>) {
    let limit = available_well_m3.min(available_treatment_m3);
    if requested_m3 <= limit {
        return (requested_m3, None);
    }
    let hit = if available_well_m3 <= available_treatment_m3 {
        ConstraintHit::WellLimit
    } else {
        ConstraintHit::TreatmentLimit
    };
    (limit, Some(hit))
}

/// Water-filling split of `capacity_m3` across groundwater requests.
///
/// Farms asking for less than an equal share keep their full request and the
/// rest is shared among the larger requests. Farms requesting nothing get 0.
pub fn fair_shares(requests_m3: &[f64], capacity_m3: f64) -> Vec<f64> {
    let mut order: Vec<usize> = (0..requests_m3.len())
        .filter(|&i| requests_m3[i] > 0.0)
        .collect();
    order.sort_by(|&a, &b| requests_m3[a].total_cmp(&requests_m3[b]).then(a.cmp(&b)));

    let mut shares = vec![0.0; requests_m3.len()];
    let mut left = capacity_m3.max(0.0);
    let mut waiting = order.len();
    for i in order {
        let share = requests_m3[i].min(left / waiting as f64);
        shares[i] = share;
        left = (left - share).max(0.0);
        waiting -= 1;
    }
    shares
}

/// Split `demand_m3` so that `groundwater + municipal == demand` holds
/// exactly in floating point.
pub fn split_demand(demand_m3: f64, groundwater_m3: f64) -> (f64, f64) {
    let municipal = demand_m3 - groundwater_m3;
    if groundwater_m3 < demand_m3 / 2.0 {
        // municipal >= demand / 2, so this subtraction is exact.
        (demand_m3 - municipal, municipal)
    } else {
        (groundwater_m3, municipal)
    }
}

pub trait WaterPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Groundwater this variant wants for a non-zero demand, with the reason.
    fn request_groundwater(&self, ctx: &WaterPolicyContext) -> (f64, &'static str);

    /// Groundwater wanted before any capacity clipping, bounded by demand.
    fn groundwater_request(&self, ctx: &WaterPolicyContext) -> SimResult<f64> {
        ctx.validate()?;
        if ctx.demand_m3 == 0.0 {
            return Ok(0.0);
        }
        Ok(self.request_groundwater(ctx).0.clamp(0.0, ctx.demand_m3))
    }

    fn allocate(&self, ctx: &WaterPolicyContext) -> SimResult<WaterAllocation> {
        ctx.validate()?;
        if ctx.demand_m3 == 0.0 {
            return Ok(WaterAllocation::zero_demand());
        }

        let (requested, reason) = self.request_groundwater(ctx);
        let requested = requested.clamp(0.0, ctx.demand_m3);
        let (groundwater, constraint_hit) =
            clip_groundwater(requested, ctx.available_well_m3, ctx.available_treatment_m3);
        let (groundwater, municipal) = split_demand(ctx.demand_m3, groundwater);

        let gw_cost_per_m3 = ctx.gw_cost_per_m3();
        Ok(WaterAllocation {
            groundwater_m3: groundwater,
            municipal_m3: municipal,
            requested_groundwater_m3: requested,
            energy_used_kwh: groundwater * ctx.gw_energy_kwh_per_m3(),
            cost_usd: usd(groundwater) * gw_cost_per_m3 + usd(municipal) * ctx.municipal_price_per_m3,
            gw_cost_per_m3,
            decision_reason: reason.to_string(),
            constraint_hit,
        })
    }
}

/// Take as much groundwater as capacity allows.
#[derive(Debug, Clone, Default)]
pub struct MaxGroundwater;

impl MaxGroundwater {
    pub fn from_params(_params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl WaterPolicy for MaxGroundwater {
    fn name(&self) -> &str {
        "max_groundwater"
    }

    fn request_groundwater(&self, ctx: &WaterPolicyContext) -> (f64, &'static str) {
        (ctx.demand_m3, "gw_preferred")
    }
}

/// Buy everything from the municipal network.
#[derive(Debug, Clone, Default)]
pub struct MaxMunicipal;

impl MaxMunicipal {
    pub fn from_params(_params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl WaterPolicy for MaxMunicipal {
    fn name(&self) -> &str {
        "max_municipal"
    }

    fn request_groundwater(&self, _ctx: &WaterPolicyContext) -> (f64, &'static str) {
        (0.0, "municipal_only")
    }
}

/// Blend treated groundwater with municipal water to stay under a TDS target.
#[derive(Debug, Clone)]
pub struct MinWaterQuality {
    pub target_tds_ppm: f64,
}

impl MinWaterQuality {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            target_tds_ppm: params.get("min_water_quality", "target_tds_ppm", 1500.0)?,
        })
    }

    /// Largest groundwater share whose blend meets the target.
    pub fn groundwater_fraction(&self, gw_tds: f64, municipal_tds: f64) -> f64 {
        if gw_tds <= self.target_tds_ppm {
            return 1.0;
        }
        if gw_tds <= municipal_tds {
            // Municipal water is no better; blending cannot help.
            return 1.0;
        }
        ((self.target_tds_ppm - municipal_tds) / (gw_tds - municipal_tds)).clamp(0.0, 1.0)
    }
}

impl WaterPolicy for MinWaterQuality {
    fn name(&self) -> &str {
        "min_water_quality"
    }

    fn request_groundwater(&self, ctx: &WaterPolicyContext) -> (f64, &'static str) {
        let fraction = self.groundwater_fraction(ctx.groundwater_tds_ppm, ctx.municipal_tds_ppm);
        let reason = if fraction >= 1.0 {
            "gw_meets_quality"
        } else {
            "quality_blend"
        };
        (ctx.demand_m3 * fraction, reason)
    }
}

/// Pick whichever source is cheaper per m3 today.
#[derive(Debug, Clone, Default)]
pub struct CheapestSource;

impl CheapestSource {
    pub fn from_params(_params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl WaterPolicy for CheapestSource {
    fn name(&self) -> &str {
        "cheapest_source"
    }

    fn request_groundwater(&self, ctx: &WaterPolicyContext) -> (f64, &'static str) {
        if ctx.gw_cost_per_m3() < ctx.municipal_price_per_m3 {
            (ctx.demand_m3, "gw_cheaper")
        } else {
            (0.0, "municipal_cheaper")
        }
    }
}

/// Prefer municipal water; pump a capped share only when municipal water is
/// much more expensive than groundwater.
#[derive(Debug, Clone)]
pub struct ConserveGroundwater {
    pub price_threshold_multiplier: f64,
    pub max_gw_ratio: f64,
}

impl ConserveGroundwater {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            price_threshold_multiplier: params.get(
                "conserve_groundwater",
                "price_threshold_multiplier",
                1.5,
            )?,
            max_gw_ratio: params
                .get("conserve_groundwater", "max_gw_ratio", 0.3)?
                .min(1.0),
        })
    }
}

impl WaterPolicy for ConserveGroundwater {
    fn name(&self) -> &str {
        "conserve_groundwater"
    }

    fn request_groundwater(&self, ctx: &WaterPolicyContext) -> (f64, &'static str) {
        let threshold = ctx.gw_cost_per_m3() * usd(self.price_threshold_multiplier);
        if ctx.municipal_price_per_m3 > threshold {
            (ctx.demand_m3 * self.max_gw_ratio, "price_threshold_exceeded")
        } else {
            (0.0, "conserving")
        }
    }
}

/// Groundwater limited by an annual quota, spread over months with some
/// allowed variance.
#[derive(Debug, Clone)]
pub struct QuotaEnforced {
    pub annual_quota_m3: f64,
    pub monthly_variance_pct: f64,
}

impl QuotaEnforced {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            annual_quota_m3: params.get("quota_enforced", "annual_quota_m3", 50_000.0)?,
            monthly_variance_pct: params.get("quota_enforced", "monthly_variance_pct", 0.15)?,
        })
    }

    pub fn remaining_quota_m3(&self, used_this_year: f64, used_this_month: f64) -> f64 {
        let annual_left = (self.annual_quota_m3 - used_this_year).max(0.0);
        let monthly_cap = self.annual_quota_m3 / 12.0 * (1.0 + self.monthly_variance_pct);
        let monthly_left = (monthly_cap - used_this_month).max(0.0);
        annual_left.min(monthly_left)
    }
}

impl WaterPolicy for QuotaEnforced {
    fn name(&self) -> &str {
        "quota_enforced"
    }

    fn request_groundwater(&self, ctx: &WaterPolicyContext) -> (f64, &'static str) {
        let remaining = self.remaining_quota_m3(
            ctx.groundwater_used_this_year_m3,
            ctx.groundwater_used_this_month_m3,
        );
        if remaining <= 0.0 {
            (0.0, "quota_exhausted")
        } else if remaining < ctx.demand_m3 {
            (remaining, "quota_limited")
        } else {
            (ctx.demand_m3, "within_quota")
        }
    }
}
