//! Weekly per-customer aggregation and gap filling

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::calendar::{YearWeek, YearWeekTracker};
use crate::event::{EventType, Field, NormalizedEvent};

/// Customer id for events whose owner cannot be determined
pub const UNKNOWN_CUSTOMER: &str = "UNKNOWN";

/// Bucket key. Ordering is customer, then year, then week.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    pub customer_id: String,
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    pub fn new(customer_id: impl Into<String>, at: YearWeek) -> Self {
        Self {
            customer_id: customer_id.into(),
            year: at.year,
            week: at.week,
        }
    }
}

/// Activity of one customer in one calendar week
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeeklyMetrics {
    pub site_visits: u64,
    pub orders: u64,
    pub order_amount: f64,
    pub spend_per_visit: f64,
}

impl WeeklyMetrics {
    fn refresh_spend_per_visit(&mut self) {
        self.spend_per_visit = if self.site_visits > 0 {
            self.order_amount / self.site_visits as f64
        } else {
            0.0
        };
    }
}

/// Owner of an event.
///
/// A `CUSTOMER` event is keyed by its own `key`; other typed events by
/// `customer_id`. Untyped events and missing ids map to [`UNKNOWN_CUSTOMER`].
pub fn resolve_customer(event: &NormalizedEvent) -> String {
    let id = match event.event_type() {
        None => None,
        Some(EventType::Customer) => event.identifier(Field::Key),
        Some(_) => event.identifier(Field::CustomerId),
    };
    id.unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string())
}

/// Parse the numeric leading token of `"<decimal> <currency>"`.
///
/// Returns `None` when the token is missing, not a number, negative or not finite.
pub fn parse_order_amount(raw: &str) -> Option<f64> {
    let token = raw.split_whitespace().next()?;
    let amount: f64 = token.parse().ok()?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

/// Weekly buckets for every customer seen in the dataset
#[derive(Debug, Clone, Default)]
pub struct WeeklyBuckets {
    buckets: BTreeMap<WeekKey, WeeklyMetrics>,
    customers: BTreeSet<String>,
}

impl WeeklyBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate one event into its bucket, creating the bucket on first touch.
    ///
    /// `order_amount` is only added for `ORDER` events.
    pub fn record(
        &mut self,
        customer_id: &str,
        at: YearWeek,
        event_type: Option<&EventType>,
        order_amount: f64,
    ) -> &WeeklyMetrics {
        if !self.customers.contains(customer_id) {
            self.customers.insert(customer_id.to_string());
        }

        let metrics = self
            .buckets
            .entry(WeekKey::new(customer_id, at))
            .or_default();

        match event_type {
            Some(EventType::SiteVisit) => metrics.site_visits += 1,
            Some(EventType::Order) => {
                metrics.orders += 1;
                metrics.order_amount += order_amount;
            }
            _ => {}
        }
        metrics.refresh_spend_per_visit();
        metrics
    }

    /// Insert zero buckets so every customer covers every tracked week.
    ///
    /// The window is the dataset-wide range per year, applied to all customers
    /// alike, including years in which a customer had no activity at all.
    /// Returns the number of buckets inserted.
    pub fn fill_gaps(&mut self, tracker: &YearWeekTracker) -> usize {
        let mut inserted = 0;
        for customer_id in &self.customers {
            for at in tracker.partitions() {
                let key = WeekKey::new(customer_id.as_str(), at);
                if let Entry::Vacant(slot) = self.buckets.entry(key) {
                    slot.insert(WeeklyMetrics::default());
                    inserted += 1;
                }
            }
        }
        inserted
    }

    pub fn get(&self, key: &WeekKey) -> Option<&WeeklyMetrics> {
        self.buckets.get(key)
    }

    /// Buckets in (customer, year, week) order
    pub fn iter(&self) -> impl Iterator<Item = (&WeekKey, &WeeklyMetrics)> {
        self.buckets.iter()
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
