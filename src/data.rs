//! Precomputed input data: weather, crop tables, prices and processing
//! equipment specs.
//!
//! The simulation core only reads through [`DataProvider`]. Every lookup it
//! needs for the simulated range must succeed; a gap is reported as
//! [`SimError::MissingData`] and treated as fatal at startup.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{SimError, SimResult};
use crate::types::ProductType;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherDay {
    pub temperature_c: f64,
    /// Reference evapotranspiration (mm/day).
    pub et0_mm: f64,
    /// PV yield per kW of nameplate for the day.
    pub pv_kwh_per_kw: f64,
    pub wind_kwh_per_kw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropParameters {
    pub season_days: u32,
    pub kc_initial: f64,
    pub kc_mid: f64,
    pub kc_end: f64,
    /// Yield response factor.
    pub ky: f64,
    pub potential_yield_kg_per_ha: f64,
    #[serde(default = "default_heat_threshold")]
    pub heat_threshold_c: f64,
}

fn default_heat_threshold() -> f64 {
    35.0
}

impl CropParameters {
    /// A season needs at least one day per growth stage.
    pub const MIN_SEASON_DAYS: u32 = 4;

    pub fn validate(&self, crop: &str) -> SimResult<()> {
        if self.season_days < Self::MIN_SEASON_DAYS {
            return Err(SimError::Config(format!(
                "crop {} season of {} days is shorter than {} stages",
                crop,
                self.season_days,
                Self::MIN_SEASON_DAYS
            )));
        }
        for (field, value) in [
            ("kc_initial", self.kc_initial),
            ("kc_mid", self.kc_mid),
            ("kc_end", self.kc_end),
            ("ky", self.ky),
            ("potential_yield_kg_per_ha", self.potential_yield_kg_per_ha),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::Config(format!(
                    "crop {} {} must be a finite non-negative number, got {}",
                    crop, field, value
                )));
            }
        }
        if !self.heat_threshold_c.is_finite() {
            return Err(SimError::Config(format!(
                "crop {} heat_threshold_c must be finite",
                crop
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSpec {
    /// Output mass per kg of input (drying removes most of it).
    pub weight_retention: f64,
    pub energy_kwh_per_kg: f64,
    pub shelf_life_days: u32,
}

impl ProcessingSpec {
    pub fn validate(&self, product: ProductType) -> SimResult<()> {
        if !(self.weight_retention > 0.0 && self.weight_retention <= 1.0) {
            return Err(SimError::Config(format!(
                "{} weight_retention must be in (0, 1], got {}",
                product, self.weight_retention
            )));
        }
        if !(self.energy_kwh_per_kg.is_finite() && self.energy_kwh_per_kg >= 0.0) {
            return Err(SimError::Config(format!(
                "{} energy_kwh_per_kg must be a finite non-negative number, got {}",
                product, self.energy_kwh_per_kg
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilityPrices {
    pub electricity_per_kwh: Decimal,
    pub municipal_water_per_m3: Decimal,
    pub diesel_per_l: Decimal,
}

/// Read-only daily lookups consumed by the simulation core.
pub trait DataProvider {
    fn weather(&self, date: NaiveDate) -> SimResult<WeatherDay>;

    fn crop_parameters(&self, crop: &str) -> SimResult<CropParameters>;

    /// Farm-gate price per kg of `product` made from `crop`.
    fn crop_price(&self, date: NaiveDate, crop: &str, product: ProductType) -> SimResult<Decimal>;

    /// Long-run reference price the market policies compare against.
    fn reference_price(&self, crop: &str, product: ProductType) -> SimResult<Decimal>;

    fn utility_prices(&self, date: NaiveDate) -> SimResult<UtilityPrices>;

    fn processing_spec(&self, product: ProductType) -> SimResult<ProcessingSpec>;

    /// Irrigation requirement per hectare: ET0 x Kc, converted from mm to
    /// m3/ha and grossed up for delivery losses.
    fn irrigation_demand_m3_per_ha(
        &self,
        date: NaiveDate,
        kc: f64,
        irrigation_efficiency: f64,
    ) -> SimResult<f64> {
        let weather = self.weather(date)?;
        Ok(weather.et0_mm * kc * 10.0 / irrigation_efficiency)
    }

    /// Check every lookup the run will make, failing on the first gap.
    fn validate_coverage(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        crops: &[String],
    ) -> SimResult<()> {
        for product in ProductType::ALL {
            self.processing_spec(product)?;
        }
        for crop in crops {
            self.crop_parameters(crop)?;
            for product in ProductType::ALL {
                self.reference_price(crop, product)?;
            }
        }
        for date in start.iter_days().take_while(|d| *d <= end) {
            self.weather(date)?;
            self.utility_prices(date)?;
            for crop in crops {
                for product in ProductType::ALL {
                    self.crop_price(date, crop, product)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropPriceSeries {
    pub crop: String,
    pub product: ProductType,
    pub prices: BTreeMap<NaiveDate, Decimal>,
}

/// Serializable bundle of all precomputed series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSet {
    pub weather: BTreeMap<NaiveDate, WeatherDay>,
    pub utility_prices: BTreeMap<NaiveDate, UtilityPrices>,
    pub crops: HashMap<String, CropParameters>,
    pub crop_prices: Vec<CropPriceSeries>,
    pub processing: HashMap<ProductType, ProcessingSpec>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_weather(&mut self, start: NaiveDate, end: NaiveDate, day: WeatherDay) -> &mut Self {
        for date in start.iter_days().take_while(|d| *d <= end) {
            self.weather.insert(date, day);
        }
        self
    }

    pub fn fill_utility_prices(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        prices: UtilityPrices,
    ) -> &mut Self {
        for date in start.iter_days().take_while(|d| *d <= end) {
            self.utility_prices.insert(date, prices);
        }
        self
    }

    pub fn add_crop(&mut self, name: &str, params: CropParameters) -> &mut Self {
        self.crops.insert(name.to_string(), params);
        self
    }

    pub fn fill_crop_price(
        &mut self,
        crop: &str,
        product: ProductType,
        start: NaiveDate,
        end: NaiveDate,
        price: Decimal,
    ) -> &mut Self {
        let idx = match self
            .crop_prices
            .iter()
            .position(|s| s.crop == crop && s.product == product)
        {
            Some(i) => i,
            None => {
                self.crop_prices.push(CropPriceSeries {
                    crop: crop.to_string(),
                    product,
                    prices: BTreeMap::new(),
                });
                self.crop_prices.len() - 1
            }
        };
        let series = &mut self.crop_prices[idx].prices;
        for date in start.iter_days().take_while(|d| *d <= end) {
            series.insert(date, price);
        }
        self
    }

    pub fn set_processing(&mut self, product: ProductType, spec: ProcessingSpec) -> &mut Self {
        self.processing.insert(product, spec);
        self
    }

    /// Typical smallholder processing equipment.
    pub fn with_default_processing(&mut self) -> &mut Self {
        self.set_processing(
            ProductType::Fresh,
            ProcessingSpec {
                weight_retention: 1.0,
                energy_kwh_per_kg: 0.0,
                shelf_life_days: 7,
            },
        )
        .set_processing(
            ProductType::Packaged,
            ProcessingSpec {
                weight_retention: 0.97,
                energy_kwh_per_kg: 0.05,
                shelf_life_days: 21,
            },
        )
        .set_processing(
            ProductType::Canned,
            ProcessingSpec {
                weight_retention: 0.85,
                energy_kwh_per_kg: 0.3,
                shelf_life_days: 365,
            },
        )
        .set_processing(
            ProductType::Dried,
            ProcessingSpec {
                weight_retention: 0.12,
                energy_kwh_per_kg: 0.8,
                shelf_life_days: 180,
            },
        )
    }
}

/// [`DataProvider`] backed by fully loaded in-memory series.
#[derive(Debug, Clone)]
pub struct InMemoryDataProvider {
    data: DataSet,
    price_index: HashMap<(String, ProductType), usize>,
    reference_prices: HashMap<(String, ProductType), Decimal>,
}

impl InMemoryDataProvider {
    pub fn new(data: DataSet) -> Self {
        let mut price_index = HashMap::new();
        let mut reference_prices = HashMap::new();
        for (i, series) in data.crop_prices.iter().enumerate() {
            let key = (series.crop.clone(), series.product);
            price_index.insert(key.clone(), i);
            if !series.prices.is_empty() {
                let total: Decimal = series.prices.values().copied().sum();
                reference_prices.insert(key, total / Decimal::from(series.prices.len()));
            }
        }
        Self {
            data,
            price_index,
            reference_prices,
        }
    }

    pub fn load_from_file(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let data: DataSet = serde_json::from_str(&json)?;
        Ok(Self::new(data))
    }

    pub fn data(&self) -> &DataSet {
        &self.data
    }
}

impl DataProvider for InMemoryDataProvider {
    fn weather(&self, date: NaiveDate) -> SimResult<WeatherDay> {
        self.data
            .weather
            .get(&date)
            .copied()
            .ok_or_else(|| SimError::MissingData(format!("weather for {}", date)))
    }

    fn crop_parameters(&self, crop: &str) -> SimResult<CropParameters> {
        self.data
            .crops
            .get(crop)
            .copied()
            .ok_or_else(|| SimError::MissingData(format!("crop parameters for '{}'", crop)))
    }

    fn crop_price(&self, date: NaiveDate, crop: &str, product: ProductType) -> SimResult<Decimal> {
        self.price_index
            .get(&(crop.to_string(), product))
            .and_then(|i| self.data.crop_prices[*i].prices.get(&date))
            .copied()
            .ok_or_else(|| {
                SimError::MissingData(format!("{} {} price for {}", crop, product, date))
            })
    }

    fn reference_price(&self, crop: &str, product: ProductType) -> SimResult<Decimal> {
        self.reference_prices
            .get(&(crop.to_string(), product))
            .copied()
            .ok_or_else(|| {
                SimError::MissingData(format!("{} {} reference price", crop, product))
            })
    }

    fn utility_prices(&self, date: NaiveDate) -> SimResult<UtilityPrices> {
        self.data
            .utility_prices
            .get(&date)
            .copied()
            .ok_or_else(|| SimError::MissingData(format!("utility prices for {}", date)))
    }

    fn processing_spec(&self, product: ProductType) -> SimResult<ProcessingSpec> {
        self.data
            .processing
            .get(&product)
            .copied()
            .ok_or_else(|| SimError::MissingData(format!("processing spec for {}", product)))
    }
}
