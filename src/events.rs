use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::crop::GrowthStage;
use crate::error::SimResult;
use crate::inventory::ForcedSaleReason;
use crate::policies::ProcessingFractions;
use crate::types::{ConstraintHit, ProductType};

/// Farm id used for community-level events.
pub const COMMUNITY: &str = "community";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub date: NaiveDate,
    pub farm_id: String,
    pub event_type: EventType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    CropPlanted {
        crop: String,
        /// Original planting date when a deferred planting starts late.
        deferred_from: Option<NaiveDate>,
    },
    PlantingDeferred {
        crop: String,
        queued: usize,
    },
    CropDecision {
        crop: String,
        stage: GrowthStage,
        base_demand_m3: f64,
        adjusted_demand_m3: f64,
        reason: String,
    },
    WaterAllocated {
        demand_m3: f64,
        groundwater_m3: f64,
        municipal_m3: f64,
        constraint: Option<ConstraintHit>,
        reason: String,
    },
    EnergyDispatched {
        demand_kwh: f64,
        grid_import_kwh: f64,
        generator_kwh: f64,
        unmet_kwh: f64,
        soc_after: f64,
        reason: String,
    },
    Harvest {
        crop: String,
        yield_kg: f64,
        water_stress_factor: f64,
    },
    ProcessingDecision {
        crop: String,
        intake_kg: f64,
        fractions: ProcessingFractions,
        capacity_clipped: bool,
        reason: String,
    },
    ForcedSale {
        crop: String,
        product: ProductType,
        quantity_kg: f64,
        revenue_usd: Decimal,
        reason: ForcedSaleReason,
    },
    MarketDecision {
        crop: String,
        product: ProductType,
        sold_kg: f64,
        stored_kg: f64,
        revenue_usd: Decimal,
        reason: String,
    },
    EconomicReview {
        reserve_target_usd: Decimal,
        sell_inventory: bool,
        reason: String,
    },
    YearEndSnapshot {
        year: i32,
        capital_usd: Decimal,
        net_income_usd: Decimal,
        inventory_kg: f64,
    },
}

impl EventType {
    /// Decision reason carried by policy events.
    pub fn reason(&self) -> Option<&str> {
        match self {
            EventType::CropDecision { reason, .. }
            | EventType::WaterAllocated { reason, .. }
            | EventType::EnergyDispatched { reason, .. }
            | EventType::ProcessingDecision { reason, .. }
            | EventType::MarketDecision { reason, .. }
            | EventType::EconomicReview { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] Farm {}: ", self.date, self.farm_id)?;

        match &self.event_type {
            EventType::CropPlanted {
                crop,
                deferred_from,
            } => match deferred_from {
                Some(from) => write!(f, "Planted {} (deferred from {})", crop, from),
                None => write!(f, "Planted {}", crop),
            },
            EventType::PlantingDeferred { crop, queued } => {
                write!(f, "Deferred {} planting ({} queued)", crop, queued)
            }
            EventType::CropDecision {
                crop,
                stage,
                base_demand_m3,
                adjusted_demand_m3,
                reason,
            } => {
                write!(
                    f,
                    "{} {} irrigation {:.2} -> {:.2} m3 ({})",
                    crop, stage, base_demand_m3, adjusted_demand_m3, reason
                )
            }
            EventType::WaterAllocated {
                demand_m3,
                groundwater_m3,
                municipal_m3,
                constraint,
                reason,
            } => {
                write!(
                    f,
                    "Water {:.2} m3 = GW {:.2} + municipal {:.2} ({})",
                    demand_m3, groundwater_m3, municipal_m3, reason
                )?;
                if let Some(hit) = constraint {
                    write!(f, " [{}]", hit)?;
                }
                Ok(())
            }
            EventType::EnergyDispatched {
                demand_kwh,
                grid_import_kwh,
                generator_kwh,
                unmet_kwh,
                soc_after,
                reason,
            } => {
                write!(
                    f,
                    "Energy {:.1} kWh - grid {:.1} gen {:.1} unmet {:.1} SOC {:.3} ({})",
                    demand_kwh, grid_import_kwh, generator_kwh, unmet_kwh, soc_after, reason
                )
            }
            EventType::Harvest {
                crop,
                yield_kg,
                water_stress_factor,
            } => {
                write!(
                    f,
                    "Harvested {:.1} kg {} (stress factor {:.3})",
                    yield_kg, crop, water_stress_factor
                )
            }
            EventType::ProcessingDecision {
                crop,
                intake_kg,
                fractions,
                capacity_clipped,
                reason,
            } => {
                write!(
                    f,
                    "Processed {:.1} kg {} - F:{:.2} P:{:.2} C:{:.2} D:{:.2} ({})",
                    intake_kg,
                    crop,
                    fractions.fresh,
                    fractions.packaged,
                    fractions.canned,
                    fractions.dried,
                    reason
                )?;
                if *capacity_clipped {
                    f.write_str(" [capacity clipped]")?;
                }
                Ok(())
            }
            EventType::ForcedSale {
                crop,
                product,
                quantity_kg,
                revenue_usd,
                reason,
            } => {
                write!(
                    f,
                    "Forced sale of {:.1} kg {} {} for {} ({})",
                    quantity_kg, product, crop, revenue_usd, reason
                )
            }
            EventType::MarketDecision {
                crop,
                product,
                sold_kg,
                stored_kg,
                revenue_usd,
                reason,
            } => {
                write!(
                    f,
                    "Sold {:.1} kg {} {} for {}, stored {:.1} kg ({})",
                    sold_kg, product, crop, revenue_usd, stored_kg, reason
                )
            }
            EventType::EconomicReview {
                reserve_target_usd,
                sell_inventory,
                reason,
            } => {
                write!(
                    f,
                    "Reserve target {} liquidate={} ({})",
                    reserve_target_usd, sell_inventory, reason
                )
            }
            EventType::YearEndSnapshot {
                year,
                capital_usd,
                net_income_usd,
                inventory_kg,
            } => {
                write!(
                    f,
                    "Year {} - Capital:{} Net:{} Inventory:{:.1} kg",
                    year, capital_usd, net_income_usd, inventory_kg
                )
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct EventLogger {
    events: Vec<Event>,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, date: NaiveDate, farm_id: &str, event_type: EventType) {
        self.events.push(Event {
            date,
            farm_id: farm_id.to_string(),
            event_type,
        });
    }

    pub fn get_events(&self) -> &[Event] {
        &self.events
    }

    pub fn for_farm<'a>(&'a self, farm_id: &'a str) -> impl Iterator<Item = &'a Event> {
        self.events.iter().filter(move |e| e.farm_id == farm_id)
    }

    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.date == date)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn save_to_file(&self, path: &Path) -> SimResult<()> {
        let json = serde_json::to_string_pretty(&self.events)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let events: Vec<Event> = serde_json::from_str(&json)?;
        Ok(Self { events })
    }
}
