//! Per-farm and community economic state.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::crop::CropState;
use crate::inventory::Inventory;
use crate::scenario::{DebtConfig, FarmConfig};
use crate::types::{FarmId, usd};

/// Flow accumulator used at daily, monthly, yearly and lifetime granularity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmLedger {
    pub water_demand_m3: f64,
    pub groundwater_m3: f64,
    pub municipal_m3: f64,
    pub energy_demand_kwh: f64,
    pub harvests: u32,
    pub harvest_kg: f64,
    /// Product mass put into storage after processing.
    pub processed_kg: f64,
    pub sold_kg: f64,
    pub forced_sold_kg: f64,
    pub crop_revenue_usd: Decimal,
    pub forced_sale_revenue_usd: Decimal,
    /// Groundwater maintenance plus municipal purchases. Groundwater energy
    /// is billed through `energy_cost_usd`.
    pub water_cost_usd: Decimal,
    pub energy_cost_usd: Decimal,
    pub om_cost_usd: Decimal,
    pub debt_service_usd: Decimal,
    pub reserve_contribution_usd: Decimal,
}

impl FarmLedger {
    pub fn add(&mut self, other: &FarmLedger) {
        self.water_demand_m3 += other.water_demand_m3;
        self.groundwater_m3 += other.groundwater_m3;
        self.municipal_m3 += other.municipal_m3;
        self.energy_demand_kwh += other.energy_demand_kwh;
        self.harvests += other.harvests;
        self.harvest_kg += other.harvest_kg;
        self.processed_kg += other.processed_kg;
        self.sold_kg += other.sold_kg;
        self.forced_sold_kg += other.forced_sold_kg;
        self.crop_revenue_usd += other.crop_revenue_usd;
        self.forced_sale_revenue_usd += other.forced_sale_revenue_usd;
        self.water_cost_usd += other.water_cost_usd;
        self.energy_cost_usd += other.energy_cost_usd;
        self.om_cost_usd += other.om_cost_usd;
        self.debt_service_usd += other.debt_service_usd;
        self.reserve_contribution_usd += other.reserve_contribution_usd;
    }

    pub fn total_revenue(&self) -> Decimal {
        self.crop_revenue_usd + self.forced_sale_revenue_usd
    }

    /// Running costs: water, energy and O&M.
    pub fn operating_cost(&self) -> Decimal {
        self.water_cost_usd + self.energy_cost_usd + self.om_cost_usd
    }

    pub fn total_cost(&self) -> Decimal {
        self.operating_cost() + self.debt_service_usd + self.reserve_contribution_usd
    }

    pub fn net_income(&self) -> Decimal {
        self.total_revenue() - self.total_cost()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmState {
    pub id: FarmId,
    pub area_ha: f64,
    pub yield_factor: f64,
    pub current_capital_usd: Decimal,
    pub crops: Vec<CropState>,
    pub inventory: Inventory,
    pub storage_capacity_kg: f64,
    pub groundwater_used_this_year_m3: f64,
    pub groundwater_used_this_month_m3: f64,
    /// Set by the monthly economic review; read by the market step.
    pub liquidate_inventory: bool,
    pub reserve_target_usd: Decimal,
    pub month: FarmLedger,
    pub year: FarmLedger,
    pub lifetime: FarmLedger,
    /// The most recently closed month, reviewed by the economic policy.
    pub last_month: Option<FarmLedger>,
}

impl FarmState {
    pub fn new(config: &FarmConfig, crops: Vec<CropState>, storage_capacity_kg: f64) -> Self {
        Self {
            id: FarmId::new(config.id.clone()),
            area_ha: config.area_ha,
            yield_factor: config.yield_factor,
            current_capital_usd: config.initial_capital_usd,
            crops,
            inventory: Inventory::new(),
            storage_capacity_kg,
            groundwater_used_this_year_m3: 0.0,
            groundwater_used_this_month_m3: 0.0,
            liquidate_inventory: false,
            reserve_target_usd: Decimal::ZERO,
            month: FarmLedger::default(),
            year: FarmLedger::default(),
            lifetime: FarmLedger::default(),
            last_month: None,
        }
    }

    pub fn record_groundwater(&mut self, volume_m3: f64) {
        self.groundwater_used_this_year_m3 += volume_m3;
        self.groundwater_used_this_month_m3 += volume_m3;
    }

    /// Book a settled day into every accumulator and move cash.
    pub fn post(&mut self, day: &FarmLedger) {
        self.month.add(day);
        self.year.add(day);
        self.lifetime.add(day);
        self.current_capital_usd += day.net_income();
    }

    pub fn close_month(&mut self) -> FarmLedger {
        let closed = std::mem::take(&mut self.month);
        self.groundwater_used_this_month_m3 = 0.0;
        self.last_month = Some(closed.clone());
        closed
    }

    pub fn close_year(&mut self) -> FarmLedger {
        self.groundwater_used_this_year_m3 = 0.0;
        std::mem::take(&mut self.year)
    }
}

/// Level-payment amortisation of one financed subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtSchedule {
    pub subsystem: String,
    pub principal_usd: Decimal,
    pub monthly_rate: Decimal,
    pub monthly_payment_usd: Decimal,
    pub balance_usd: Decimal,
    pub payments_remaining: u32,
}

/// One month's payment split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtPayment {
    pub interest_usd: Decimal,
    pub principal_usd: Decimal,
}

impl DebtPayment {
    pub fn total(&self) -> Decimal {
        self.interest_usd + self.principal_usd
    }
}

impl DebtSchedule {
    pub fn new(config: &DebtConfig) -> Self {
        let n = config.term_years * 12;
        let r = config.annual_interest_rate / 12.0;
        let principal = config.principal_usd;
        let payment = if n == 0 {
            principal
        } else if r == 0.0 {
            principal / Decimal::from(n)
        } else {
            // P r / (1 - (1 + r)^-n)
            let factor = r / (1.0 - (1.0 + r).powi(-(n as i32)));
            (principal * usd(factor)).round_dp(2)
        };
        Self {
            subsystem: config.subsystem.clone(),
            principal_usd: principal,
            monthly_rate: usd(r),
            monthly_payment_usd: payment,
            balance_usd: principal,
            payments_remaining: n.max(1),
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.payments_remaining == 0 || self.balance_usd <= Decimal::ZERO
    }

    /// Make this month's payment. The final payment clears the balance.
    pub fn pay_month(&mut self) -> DebtPayment {
        if self.is_paid_off() {
            return DebtPayment::default();
        }
        let interest = (self.balance_usd * self.monthly_rate).round_dp(2);
        let mut principal = self.monthly_payment_usd - interest;
        self.payments_remaining -= 1;
        if self.payments_remaining == 0 || principal > self.balance_usd {
            principal = self.balance_usd;
            self.payments_remaining = 0;
        }
        self.balance_usd -= principal;
        DebtPayment {
            interest_usd: interest,
            principal_usd: principal,
        }
    }
}

/// Community-level finance: shared debt, O&M and the replacement reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicState {
    pub debts: Vec<DebtSchedule>,
    pub replacement_reserve_usd: Decimal,
    pub annual_reserve_accrual_usd: Decimal,
    pub monthly_om_usd: Decimal,
    pub debt_service_paid_usd: Decimal,
    pub interest_paid_usd: Decimal,
}

impl EconomicState {
    pub fn new(
        financing: &[DebtConfig],
        capex_total_usd: Decimal,
        replacement_reserve_rate: f64,
        annual_om_usd: Decimal,
    ) -> Self {
        Self {
            debts: financing.iter().map(DebtSchedule::new).collect(),
            replacement_reserve_usd: Decimal::ZERO,
            annual_reserve_accrual_usd: (capex_total_usd * usd(replacement_reserve_rate)).round_dp(2),
            monthly_om_usd: (annual_om_usd / dec!(12)).round_dp(2),
            debt_service_paid_usd: Decimal::ZERO,
            interest_paid_usd: Decimal::ZERO,
        }
    }

    /// Pay every schedule for the month; returns the total paid.
    pub fn service_debt(&mut self) -> Decimal {
        let mut total = Decimal::ZERO;
        for debt in &mut self.debts {
            let payment = debt.pay_month();
            self.interest_paid_usd += payment.interest_usd;
            total += payment.total();
        }
        self.debt_service_paid_usd += total;
        total
    }

    /// Year-end set-aside for equipment replacement.
    pub fn accrue_reserve(&mut self) -> Decimal {
        self.replacement_reserve_usd += self.annual_reserve_accrual_usd;
        self.annual_reserve_accrual_usd
    }

    pub fn debt_outstanding_usd(&self) -> Decimal {
        self.debts.iter().map(|d| d.balance_usd).sum()
    }
}

/// Split `amount` across weights; the last share absorbs rounding so the
/// parts always sum to `amount`.
pub fn allocate_by_weight(amount: Decimal, weights: &[f64]) -> Vec<Decimal> {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() {
        return Vec::new();
    }
    let mut shares = Vec::with_capacity(weights.len());
    let mut allocated = Decimal::ZERO;
    for (i, w) in weights.iter().enumerate() {
        let share = if i + 1 == weights.len() {
            amount - allocated
        } else if total > 0.0 {
            (amount * usd(w / total)).round_dp(6)
        } else {
            (amount / Decimal::from(weights.len())).round_dp(6)
        };
        allocated += share;
        shares.push(share);
    }
    shares
}
