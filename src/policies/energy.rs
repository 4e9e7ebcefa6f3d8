//! Energy policies choose which sources the merit-order dispatch may use.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validate_money;
use crate::energy::DispatchFlags;
use crate::error::{SimResult, validate_fraction, validate_quantity};
use crate::scenario::PolicyParameters;
use crate::types::ZERO_DEMAND;

#[derive(Debug, Clone)]
pub struct EnergyPolicyContext {
    pub demand_kwh: f64,
    pub pv_available_kwh: f64,
    pub wind_available_kwh: f64,
    pub battery_soc: f64,
    pub grid_price_per_kwh: Decimal,
    pub diesel_price_per_l: Decimal,
}

impl EnergyPolicyContext {
    fn validate(&self) -> SimResult<()> {
        validate_quantity("demand_kwh", self.demand_kwh)?;
        validate_quantity("pv_available_kwh", self.pv_available_kwh)?;
        validate_quantity("wind_available_kwh", self.wind_available_kwh)?;
        validate_fraction("battery_soc", self.battery_soc)?;
        validate_money("grid_price_per_kwh", self.grid_price_per_kwh)?;
        validate_money("diesel_price_per_l", self.diesel_price_per_l)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyDecision {
    pub flags: DispatchFlags,
    pub decision_reason: String,
}

pub trait EnergyPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Source switches for this policy.
    fn flags(&self) -> DispatchFlags;

    /// Reason recorded when there is demand to serve.
    fn reason(&self) -> &'static str;

    /// With zero demand the flags still govern charging and export of
    /// renewable output, so they are returned unchanged under `zero_demand`.
    fn select(&self, ctx: &EnergyPolicyContext) -> SimResult<EnergyDecision> {
        ctx.validate()?;
        let reason = if ctx.demand_kwh == 0.0 {
            ZERO_DEMAND
        } else {
            self.reason()
        };
        Ok(EnergyDecision {
            flags: self.flags(),
            decision_reason: reason.to_string(),
        })
    }
}

/// Off-grid: PV, wind, battery, then the diesel generator.
#[derive(Debug, Clone)]
pub struct Microgrid {
    pub battery_reserve_pct: f64,
}

impl Microgrid {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            battery_reserve_pct: params.get("microgrid", "battery_reserve_pct", 0.20)?.min(1.0),
        })
    }
}

impl EnergyPolicy for Microgrid {
    fn name(&self) -> &str {
        "microgrid"
    }

    fn flags(&self) -> DispatchFlags {
        DispatchFlags {
            use_renewables: true,
            use_battery: true,
            grid_import: false,
            grid_export: false,
            use_generator: true,
            battery_reserve_soc: self.battery_reserve_pct,
        }
    }

    fn reason(&self) -> &'static str {
        "off_grid_merit_order"
    }
}

/// Grid-connected: PV, wind, battery, then grid import; surplus exported.
#[derive(Debug, Clone)]
pub struct RenewableFirst {
    pub battery_reserve_pct: f64,
}

impl RenewableFirst {
    pub fn from_params(params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self {
            battery_reserve_pct: params
                .get("renewable_first", "battery_reserve_pct", 0.20)?
                .min(1.0),
        })
    }
}

impl EnergyPolicy for RenewableFirst {
    fn name(&self) -> &str {
        "renewable_first"
    }

    fn flags(&self) -> DispatchFlags {
        DispatchFlags {
            use_renewables: true,
            use_battery: true,
            grid_import: true,
            grid_export: true,
            use_generator: false,
            battery_reserve_soc: self.battery_reserve_pct,
        }
    }

    fn reason(&self) -> &'static str {
        "renewables_then_grid"
    }
}

/// Grid serves all demand; all renewable output is net-metered as export.
#[derive(Debug, Clone, Default)]
pub struct AllGrid;

impl AllGrid {
    pub fn from_params(_params: &PolicyParameters) -> SimResult<Self> {
        Ok(Self)
    }
}

impl EnergyPolicy for AllGrid {
    fn name(&self) -> &str {
        "all_grid"
    }

    fn flags(&self) -> DispatchFlags {
        DispatchFlags {
            use_renewables: false,
            use_battery: false,
            grid_import: true,
            grid_export: true,
            use_generator: false,
            battery_reserve_soc: 0.0,
        }
    }

    fn reason(&self) -> &'static str {
        "grid_net_metering"
    }
}
