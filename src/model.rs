//! Lifetime value estimation from weekly buckets

use std::collections::BTreeMap;

use serde::Serialize;

use crate::weekly::{WeeklyBuckets, WeeklyMetrics};

/// Extrapolation parameters for the LTV estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LtvConfig {
    /// Weeks in a year used to annualize average weekly spend
    pub weeks_per_year: u32,
    /// Customer lifespan in years
    pub years_horizon: u32,
}

impl Default for LtvConfig {
    fn default() -> Self {
        Self {
            weeks_per_year: 52,
            years_horizon: 10,
        }
    }
}

impl LtvConfig {
    /// Total number of weeks the average weekly spend is extrapolated over
    pub fn horizon_weeks(&self) -> f64 {
        f64::from(self.weeks_per_year) * f64::from(self.years_horizon)
    }
}

/// Running totals and LTV estimate for one customer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerLtv {
    pub ltv: f64,
    pub total_site_visits: u64,
    pub total_orders: u64,
    pub total_order_amount: f64,
    pub total_weeks: u64,
    pub avg_spend_per_visit: f64,
}

impl CustomerLtv {
    /// Fold one weekly bucket into the running totals.
    ///
    /// The LTV is recomputed from the totals including this bucket, so after
    /// the last fold it equals `total_order_amount / total_weeks * horizon`
    /// whatever order the buckets arrived in.
    pub fn fold(&mut self, week: &WeeklyMetrics, config: &LtvConfig) {
        self.ltv = (self.total_order_amount + week.order_amount)
            / (self.total_weeks + 1) as f64
            * config.horizon_weeks();

        self.total_site_visits += week.site_visits;
        self.total_orders += week.orders;
        self.total_order_amount += week.order_amount;
        self.avg_spend_per_visit = if self.total_site_visits > 0 {
            self.total_order_amount / self.total_site_visits as f64
        } else {
            0.0
        };
        self.total_weeks += 1;
    }

    /// Average spend per tracked week
    pub fn avg_weekly_spend(&self) -> f64 {
        if self.total_weeks == 0 {
            0.0
        } else {
            self.total_order_amount / self.total_weeks as f64
        }
    }
}

/// Fold every weekly bucket into per-customer totals.
///
/// Buckets are visited in (customer, year, week) order.
pub fn estimate_ltv(buckets: &WeeklyBuckets, config: &LtvConfig) -> BTreeMap<String, CustomerLtv> {
    let mut customers: BTreeMap<String, CustomerLtv> = BTreeMap::new();
    for (key, week) in buckets.iter() {
        match customers.get_mut(&key.customer_id) {
            Some(totals) => totals.fold(week, config),
            None => {
                let mut totals = CustomerLtv::default();
                totals.fold(week, config);
                customers.insert(key.customer_id.clone(), totals);
            }
        }
    }
    customers
}
