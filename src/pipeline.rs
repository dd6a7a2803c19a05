//! End-to-end LTV run: ingest events, fill gaps, estimate and rank
//!
//! All accumulation state lives in an [`LtvRun`] owned by the caller. Events
//! are consumed in a single pass; [`LtvRun::finish`] then gap-fills the weekly
//! buckets and folds them into per-customer estimates.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::calendar::{year_week, YearWeekTracker};
use crate::error::LtvError;
use crate::event::{normalize_value, EventType, Field, NormalizedEvent};
use crate::model::{estimate_ltv, CustomerLtv, LtvConfig};
use crate::select::top_n;
use crate::weekly::{parse_order_amount, resolve_customer, WeeklyBuckets};

/// Counters describing one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Records offered to the run
    pub records: usize,
    /// Records dropped because they carry no `event_time`
    pub skipped_no_time: usize,
    pub customers: usize,
    /// Weekly buckets after gap filling
    pub buckets: usize,
    /// Zero buckets inserted by gap filling
    pub gap_filled: usize,
}

/// Mutable state of a run while events are being consumed
#[derive(Debug, Default)]
pub struct LtvRun {
    config: LtvConfig,
    tracker: YearWeekTracker,
    buckets: WeeklyBuckets,
    records: usize,
    skipped_no_time: usize,
}

impl LtvRun {
    pub fn new(config: LtvConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Consume one normalized event.
    ///
    /// Events without `event_time` are skipped silently. A malformed
    /// timestamp or order amount fails the event before any state changes.
    pub fn ingest(&mut self, event: &NormalizedEvent) -> Result<(), LtvError> {
        let index = self.records;
        self.records += 1;

        let Some(raw_time) = event.text(Field::EventTime, index)? else {
            self.skipped_no_time += 1;
            debug!(record = %event.record_id(index), "skipping event without event_time");
            return Ok(());
        };

        let at = year_week(raw_time).map_err(|_| LtvError::MalformedEventTime {
            record: event.record_id(index),
            value: raw_time.to_string(),
        })?;

        let event_type = event.event_type();
        let order_amount = match &event_type {
            Some(EventType::Order) => match event.text(Field::TotalAmount, index)? {
                Some(raw) => parse_order_amount(raw).ok_or_else(|| LtvError::MalformedAmount {
                    record: event.record_id(index),
                    value: raw.to_string(),
                })?,
                None => 0.0,
            },
            _ => 0.0,
        };

        let customer_id = resolve_customer(event);
        self.tracker.observe(at);
        self.buckets.record(&customer_id, at, event_type.as_ref(), order_amount);
        Ok(())
    }

    /// Normalize and consume a raw JSON record
    pub fn ingest_value(&mut self, record: &Value) -> Result<(), LtvError> {
        let event = normalize_value(self.records, record)?;
        self.ingest(&event)
    }

    pub fn tracker(&self) -> &YearWeekTracker {
        &self.tracker
    }

    pub fn buckets(&self) -> &WeeklyBuckets {
        &self.buckets
    }

    /// Fill inactive weeks and fold every bucket into per-customer estimates
    pub fn finish(mut self) -> LtvReport {
        let gap_filled = self.buckets.fill_gaps(&self.tracker);
        info!(
            customers = self.buckets.customer_count(),
            buckets = self.buckets.len(),
            gap_filled,
            years = self.tracker.len(),
            "weekly buckets gap-filled"
        );

        let customers = estimate_ltv(&self.buckets, &self.config);
        info!(customers = customers.len(), "lifetime values estimated");

        let stats = RunStats {
            records: self.records,
            skipped_no_time: self.skipped_no_time,
            customers: customers.len(),
            buckets: self.buckets.len(),
            gap_filled,
        };

        LtvReport {
            tracker: self.tracker,
            buckets: self.buckets,
            customers,
            stats,
        }
    }
}

/// Completed run: gap-filled buckets and per-customer estimates
#[derive(Debug)]
pub struct LtvReport {
    pub tracker: YearWeekTracker,
    pub buckets: WeeklyBuckets,
    pub customers: BTreeMap<String, CustomerLtv>,
    pub stats: RunStats,
}

impl LtvReport {
    /// Highest-LTV customers, longest first
    pub fn top_n(&self, requested: i64) -> Vec<(&str, &CustomerLtv)> {
        let ranked = top_n(requested, &self.customers);
        info!(requested, selected = ranked.len(), "top customers selected");
        ranked
    }
}

/// Run the whole pipeline over raw records and return the ranked customers
pub fn top_ltv_customers(
    requested: i64,
    records: &[Value],
    config: LtvConfig,
) -> Result<Vec<(String, CustomerLtv)>, LtvError> {
    let mut run = LtvRun::new(config);
    for record in records {
        run.ingest_value(record)?;
    }
    let report = run.finish();
    Ok(report
        .top_n(requested)
        .into_iter()
        .map(|(id, totals)| (id.to_string(), totals.clone()))
        .collect())
}
