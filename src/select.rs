//! Heap-based top-N selection of customers by LTV

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use crate::model::CustomerLtv;

/// Upper bound on the number of customers returned
pub const MAX_TOP_N: usize = 500;

/// Clamp a requested count to `[0, min(customers, MAX_TOP_N)]`
pub fn clamp_top_n(requested: i64, customers: usize) -> usize {
    let limit = customers.min(MAX_TOP_N);
    usize::try_from(requested).map_or(0, |n| n.min(limit))
}

/// Heap entry ordered by LTV, then by reversed customer id so that among
/// equal LTVs the smaller id ranks higher.
struct Ranked<'a> {
    customer_id: &'a str,
    totals: &'a CustomerLtv,
}

impl PartialEq for Ranked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked<'_> {}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.totals
            .ltv
            .total_cmp(&other.totals.ltv)
            .then_with(|| other.customer_id.cmp(self.customer_id))
    }
}

/// Return the `requested` customers with the highest LTV, highest first.
///
/// Keeps a min-heap of at most `n` entries while scanning, so the cost is
/// `O(customers * log n)` rather than a full sort of every customer.
pub fn top_n<'a>(
    requested: i64,
    customers: &'a BTreeMap<String, CustomerLtv>,
) -> Vec<(&'a str, &'a CustomerLtv)> {
    let n = clamp_top_n(requested, customers.len());
    if n == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Ranked<'a>>> = BinaryHeap::with_capacity(n + 1);
    for (customer_id, totals) in customers {
        let entry = Ranked {
            customer_id: customer_id.as_str(),
            totals,
        };
        if heap.len() < n {
            heap.push(Reverse(entry));
        } else if heap.peek().is_some_and(|Reverse(smallest)| entry > *smallest) {
            heap.pop();
            heap.push(Reverse(entry));
        }
    }

    // ascending order of Reverse is descending order of LTV
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(entry)| (entry.customer_id, entry.totals))
        .collect()
}
