//! Crop growth state machine.
//!
//! `Dormant -> Initial -> Development -> MidSeason -> LateSeason -> (harvest) -> Dormant`
//!
//! Each crop on a farm has at most one active cycle. A planting date that
//! arrives while a cycle is active is queued and started once the crop is
//! dormant again.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::data::CropParameters;
use crate::scenario::StageFractions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrowthStage {
    Dormant,
    Initial,
    Development,
    MidSeason,
    LateSeason,
}

impl GrowthStage {
    fn index(self) -> Option<usize> {
        match self {
            GrowthStage::Dormant => None,
            GrowthStage::Initial => Some(0),
            GrowthStage::Development => Some(1),
            GrowthStage::MidSeason => Some(2),
            GrowthStage::LateSeason => Some(3),
        }
    }

    fn next(self) -> GrowthStage {
        match self {
            GrowthStage::Dormant => GrowthStage::Initial,
            GrowthStage::Initial => GrowthStage::Development,
            GrowthStage::Development => GrowthStage::MidSeason,
            GrowthStage::MidSeason => GrowthStage::LateSeason,
            GrowthStage::LateSeason => GrowthStage::Dormant,
        }
    }

    pub fn is_active(self) -> bool {
        self != GrowthStage::Dormant
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GrowthStage::Dormant => "DORMANT",
            GrowthStage::Initial => "INITIAL",
            GrowthStage::Development => "DEVELOPMENT",
            GrowthStage::MidSeason => "MID_SEASON",
            GrowthStage::LateSeason => "LATE_SEASON",
        };
        f.write_str(s)
    }
}

/// Days spent in each of the four active stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDurations(pub [u32; 4]);

impl StageDurations {
    /// Split a season by cumulative rounded boundaries so the stages always
    /// add up to `season_days`. Every stage gets at least one day when the
    /// season is long enough.
    pub fn from_season(season_days: u32, fractions: &StageFractions) -> Self {
        let season = season_days.max(4);
        let mut days = [0u32; 4];
        let mut cumulative = 0.0;
        let mut previous = 0u32;
        for (i, fraction) in fractions.as_array().iter().enumerate() {
            cumulative += fraction;
            let boundary = if i == 3 {
                season
            } else {
                ((f64::from(season) * cumulative).round() as u32).min(season)
            };
            days[i] = boundary.saturating_sub(previous);
            previous = boundary.max(previous);
        }
        while let Some(empty) = days.iter().position(|d| *d == 0) {
            let (largest, _) = days
                .iter()
                .enumerate()
                .max_by_key(|(_, d)| **d)
                .unwrap_or((0, &0));
            days[largest] -= 1;
            days[empty] += 1;
        }
        Self(days)
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Outcome of a planting date being reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantingOutcome {
    Planted,
    Deferred,
}

/// Summary of a completed cycle, produced on the harvest trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestReport {
    pub crop: String,
    pub cycle_start: NaiveDate,
    pub water_received_m3: f64,
    pub water_required_m3: f64,
    pub water_stress_factor: f64,
    pub yield_kg: f64,
}

/// One crop on one farm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropState {
    pub crop: String,
    pub area_ha: f64,
    pub stage: GrowthStage,
    pub days_in_stage: u32,
    pub cumulative_water_m3: f64,
    /// Season water requirement accrued so far; equals the full-season
    /// requirement when the harvest triggers.
    pub expected_water_m3: f64,
    pub cycle_start: Option<NaiveDate>,
    pub completed_cycles: u32,
    params: CropParameters,
    durations: StageDurations,
    planting_dates: Vec<(u32, u32)>,
    deferred: VecDeque<NaiveDate>,
}

impl CropState {
    pub fn new(
        crop: impl Into<String>,
        area_ha: f64,
        params: CropParameters,
        fractions: &StageFractions,
        planting_dates: Vec<(u32, u32)>,
    ) -> Self {
        Self {
            crop: crop.into(),
            area_ha,
            stage: GrowthStage::Dormant,
            days_in_stage: 0,
            cumulative_water_m3: 0.0,
            expected_water_m3: 0.0,
            cycle_start: None,
            completed_cycles: 0,
            params,
            durations: StageDurations::from_season(params.season_days, fractions),
            planting_dates,
            deferred: VecDeque::new(),
        }
    }

    pub fn params(&self) -> &CropParameters {
        &self.params
    }

    pub fn durations(&self) -> StageDurations {
        self.durations
    }

    pub fn deferred_plantings(&self) -> usize {
        self.deferred.len()
    }

    pub fn is_planting_day(&self, date: NaiveDate) -> bool {
        self.planting_dates
            .iter()
            .any(|(m, d)| date.month() == *m && date.day() == *d)
    }

    /// Start a deferred cycle if the crop is dormant and one is queued.
    /// Returns the planting date that was deferred.
    pub fn start_deferred(&mut self, date: NaiveDate) -> Option<NaiveDate> {
        if self.stage.is_active() {
            return None;
        }
        let queued = self.deferred.pop_front()?;
        self.start_cycle(date);
        Some(queued)
    }

    /// A planting date was reached: plant now, or queue behind the active cycle.
    pub fn plant(&mut self, date: NaiveDate) -> PlantingOutcome {
        if self.stage.is_active() {
            self.deferred.push_back(date);
            PlantingOutcome::Deferred
        } else {
            self.start_cycle(date);
            PlantingOutcome::Planted
        }
    }

    fn start_cycle(&mut self, date: NaiveDate) {
        self.stage = GrowthStage::Initial;
        self.days_in_stage = 0;
        self.cumulative_water_m3 = 0.0;
        self.expected_water_m3 = 0.0;
        self.cycle_start = Some(date);
    }

    fn stage_duration(&self) -> u32 {
        self.stage.index().map_or(0, |i| self.durations.0[i])
    }

    /// Crop coefficient for the current day: flat in INITIAL and MID_SEASON,
    /// linearly interpolated through DEVELOPMENT and LATE_SEASON.
    pub fn kc(&self) -> f64 {
        let p = &self.params;
        let progress = || f64::from(self.days_in_stage) / f64::from(self.stage_duration().max(1));
        match self.stage {
            GrowthStage::Dormant => 0.0,
            GrowthStage::Initial => p.kc_initial,
            GrowthStage::Development => p.kc_initial + (p.kc_mid - p.kc_initial) * progress(),
            GrowthStage::MidSeason => p.kc_mid,
            GrowthStage::LateSeason => p.kc_mid + (p.kc_end - p.kc_mid) * progress(),
        }
    }

    /// Account one day's irrigation: the unadjusted requirement and what was
    /// actually delivered.
    pub fn record_water(&mut self, required_m3: f64, delivered_m3: f64) {
        if self.stage.is_active() {
            self.expected_water_m3 += required_m3;
            self.cumulative_water_m3 += delivered_m3;
        }
    }

    /// Close out the day. Returns a harvest report exactly when LATE_SEASON
    /// completes; the crop is dormant afterwards.
    pub fn advance_day(&mut self, yield_factor: f64) -> Option<HarvestReport> {
        if !self.stage.is_active() {
            return None;
        }
        self.days_in_stage += 1;
        if self.days_in_stage < self.stage_duration() {
            return None;
        }
        let finished = self.stage;
        self.stage = finished.next();
        self.days_in_stage = 0;
        if finished != GrowthStage::LateSeason {
            return None;
        }

        let stress = water_stress_factor(
            self.cumulative_water_m3,
            self.expected_water_m3,
            self.params.ky,
        );
        let report = HarvestReport {
            crop: self.crop.clone(),
            cycle_start: self.cycle_start.unwrap_or(NaiveDate::MIN),
            water_received_m3: self.cumulative_water_m3,
            water_required_m3: self.expected_water_m3,
            water_stress_factor: stress,
            yield_kg: self.params.potential_yield_kg_per_ha * self.area_ha * stress * yield_factor,
        };
        self.completed_cycles += 1;
        self.cycle_start = None;
        self.cumulative_water_m3 = 0.0;
        self.expected_water_m3 = 0.0;
        Some(report)
    }
}

/// FAO-33 style relative yield: `1 - Ky * (1 - ET_actual/ET_required)`,
/// using delivered vs required water as the ratio.
pub fn water_stress_factor(received_m3: f64, required_m3: f64, ky: f64) -> f64 {
    if required_m3 <= 0.0 {
        return 1.0;
    }
    let ratio = (received_m3 / required_m3).min(1.0);
    (1.0 - ky * (1.0 - ratio)).clamp(0.0, 1.0)
}
