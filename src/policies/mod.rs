//! Policy families for the six decision domains.
//!
//! Every policy is a pure mapping from a read-only context to a decision.
//! Policies hold only constructor-time parameters; the orchestrator owns all
//! state and applies decisions.
//!
//! # Shared contract
//!
//! - Zero demand returns a zero decision tagged [`ZERO_DEMAND`] before any
//!   cost or constraint computation.
//! - NaN, infinite or negative inputs fail with [`SimError::InvalidInput`].
//! - Exceeding a physical capacity is never an error: the request is clipped
//!   and the binding constraint recorded.
//!
//! [`ZERO_DEMAND`]: crate::types::ZERO_DEMAND
//! [`SimError::InvalidInput`]: crate::error::SimError::InvalidInput

pub mod crop;
pub mod economic;
pub mod energy;
pub mod food;
pub mod market;
pub mod registry;
pub mod water;

pub use crop::{CropDecision, CropPolicy, CropPolicyContext};
pub use economic::{EconomicDecision, EconomicPolicy, EconomicPolicyContext};
pub use energy::{EnergyDecision, EnergyPolicy, EnergyPolicyContext};
pub use food::{FoodProcessingContext, FoodProcessingPolicy, ProcessingDecision, ProcessingFractions};
pub use market::{MarketDecision, MarketPolicy, MarketPolicyContext};
pub use registry::{PolicyRegistry, PolicySet};
pub use water::{WaterAllocation, WaterPolicy, WaterPolicyContext};

use rust_decimal::Decimal;

use crate::error::{SimError, SimResult};
use crate::types::to_f64;

/// Reject negative monetary inputs.
pub(crate) fn validate_money(field: &'static str, value: Decimal) -> SimResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(SimError::InvalidInput {
            field,
            value: to_f64(value),
            reason: "value is negative",
        });
    }
    Ok(value)
}

/// Guarded ratio for price comparisons; a zero reference means "no signal".
pub(crate) fn price_ratio(price: Decimal, reference: Decimal) -> f64 {
    if reference <= Decimal::ZERO {
        1.0
    } else {
        to_f64(price / reference)
    }
}
