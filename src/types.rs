use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Food product pathways a harvest can be split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Fresh,
    Packaged,
    Canned,
    Dried,
}

impl ProductType {
    pub const ALL: [ProductType; 4] = [
        ProductType::Fresh,
        ProductType::Packaged,
        ProductType::Canned,
        ProductType::Dried,
    ];

    /// Get the string identifier used in data tables and records
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Fresh => "fresh",
            ProductType::Packaged => "packaged",
            ProductType::Canned => "canned",
            ProductType::Dried => "dried",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<ProductType> {
        match s {
            "fresh" => Some(ProductType::Fresh),
            "packaged" => Some(ProductType::Packaged),
            "canned" => Some(ProductType::Canned),
            "dried" => Some(ProductType::Dried),
            _ => None,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier for a farm
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FarmId(pub String);

impl FarmId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for FarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physical constraint that clipped a groundwater request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintHit {
    WellLimit,
    TreatmentLimit,
}

impl ConstraintHit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintHit::WellLimit => "well_limit",
            ConstraintHit::TreatmentLimit => "treatment_limit",
        }
    }
}

impl fmt::Display for ConstraintHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason tag shared by every policy when asked to decide on nothing.
pub const ZERO_DEMAND: &str = "zero_demand";

/// Convert a physical-unit product (already validated as finite) into USD.
pub fn usd(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(6)
}

/// Decimal to f64 for ratios and exponentials.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
