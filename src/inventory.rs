//! FIFO food inventory made of dated tranches.
//!
//! Tranches are grouped into `(crop, product)` buckets and always leave a
//! bucket oldest-first. Forced sales (expiry, storage overflow) are taken
//! before any voluntary market decision sees the inventory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::types::ProductType;

const EPSILON_KG: f64 = 1e-9;

pub type BucketKey = (String, ProductType);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageTranche {
    pub id: u64,
    pub crop: String,
    pub product: ProductType,
    pub quantity_kg: f64,
    pub entry_date: NaiveDate,
    pub shelf_life_days: u32,
}

impl StorageTranche {
    pub fn age_days(&self, date: NaiveDate) -> i64 {
        (date - self.entry_date).num_days()
    }

    pub fn is_expired(&self, date: NaiveDate) -> bool {
        self.age_days(date) > i64::from(self.shelf_life_days)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedSaleReason {
    Expired,
    StorageOverflow,
}

impl fmt::Display for ForcedSaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForcedSaleReason::Expired => f.write_str("expired"),
            ForcedSaleReason::StorageOverflow => f.write_str("storage_overflow"),
        }
    }
}

/// A quantity removed from one tranche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheSale {
    pub tranche_id: u64,
    pub crop: String,
    pub product: ProductType,
    pub entry_date: NaiveDate,
    pub quantity_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcedSale {
    pub sale: TrancheSale,
    pub reason: ForcedSaleReason,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    buckets: BTreeMap<BucketKey, VecDeque<StorageTranche>>,
    next_id: u64,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new tranche. Returns its id, or `None` for an empty quantity.
    pub fn add(
        &mut self,
        crop: &str,
        product: ProductType,
        quantity_kg: f64,
        entry_date: NaiveDate,
        shelf_life_days: u32,
    ) -> Option<u64> {
        if quantity_kg <= EPSILON_KG {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        let bucket = self
            .buckets
            .entry((crop.to_string(), product))
            .or_default();
        // Keep entry-date order even if a back-dated tranche is inserted.
        let pos = bucket
            .iter()
            .position(|t| t.entry_date > entry_date)
            .unwrap_or(bucket.len());
        bucket.insert(
            pos,
            StorageTranche {
                id,
                crop: crop.to_string(),
                product,
                quantity_kg,
                entry_date,
                shelf_life_days,
            },
        );
        Some(id)
    }

    pub fn total_kg(&self) -> f64 {
        self.buckets
            .values()
            .flat_map(|b| b.iter())
            .map(|t| t.quantity_kg)
            .sum()
    }

    pub fn bucket_kg(&self, crop: &str, product: ProductType) -> f64 {
        self.buckets
            .get(&(crop.to_string(), product))
            .map(|b| b.iter().map(|t| t.quantity_kg).sum())
            .unwrap_or(0.0)
    }

    pub fn bucket_keys(&self) -> Vec<BucketKey> {
        self.buckets
            .iter()
            .filter(|(_, b)| !b.is_empty())
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn tranches(&self) -> impl Iterator<Item = &StorageTranche> {
        self.buckets.values().flat_map(|b| b.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|b| b.is_empty())
    }

    /// Remove up to `quantity_kg` from a bucket, oldest tranche first.
    pub fn sell_fifo(&mut self, crop: &str, product: ProductType, quantity_kg: f64) -> Vec<TrancheSale> {
        let mut sales = Vec::new();
        let Some(bucket) = self.buckets.get_mut(&(crop.to_string(), product)) else {
            return sales;
        };
        let mut remaining = quantity_kg;
        while remaining > EPSILON_KG {
            let Some(front) = bucket.front_mut() else {
                break;
            };
            let take = front.quantity_kg.min(remaining);
            front.quantity_kg -= take;
            remaining -= take;
            sales.push(TrancheSale {
                tranche_id: front.id,
                crop: front.crop.clone(),
                product: front.product,
                entry_date: front.entry_date,
                quantity_kg: take,
            });
            if front.quantity_kg <= EPSILON_KG {
                bucket.pop_front();
            }
        }
        sales
    }

    /// The umbrella rule: sell every expired tranche, then sell the oldest
    /// stock across all buckets until the inventory fits `capacity_kg`.
    pub fn forced_sales(&mut self, date: NaiveDate, capacity_kg: f64) -> Vec<ForcedSale> {
        let mut sales = Vec::new();

        for bucket in self.buckets.values_mut() {
            bucket.retain(|t| {
                if t.is_expired(date) {
                    sales.push(ForcedSale {
                        sale: TrancheSale {
                            tranche_id: t.id,
                            crop: t.crop.clone(),
                            product: t.product,
                            entry_date: t.entry_date,
                            quantity_kg: t.quantity_kg,
                        },
                        reason: ForcedSaleReason::Expired,
                    });
                    false
                } else {
                    true
                }
            });
        }

        let mut overflow = self.total_kg() - capacity_kg.max(0.0);
        while overflow > EPSILON_KG {
            let oldest = self
                .buckets
                .iter()
                .filter_map(|(k, b)| b.front().map(|t| (t.entry_date, t.id, k.clone())))
                .min();
            let Some((_, _, key)) = oldest else {
                break;
            };
            let take = self
                .buckets
                .get(&key)
                .and_then(|b| b.front())
                .map_or(0.0, |t| t.quantity_kg.min(overflow));
            for sale in self.sell_fifo(&key.0, key.1, take) {
                sales.push(ForcedSale {
                    sale,
                    reason: ForcedSaleReason::StorageOverflow,
                });
            }
            overflow -= take;
        }

        sales
    }
}
