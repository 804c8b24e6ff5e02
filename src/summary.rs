use serde::Serialize;

use crate::entities::{BidRecord, Status};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidSummary {
    pub total: usize,
    /// Submitted, viewed, under review and shortlisted.
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub counter_offers: usize,
    pub withdrawn: usize,
    pub expired: usize,
    /// Mean over every bid in the collection, 0 when it is empty.
    pub average_bid_amount: f64,
}

pub fn summarize<'a, I>(bids: I) -> BidSummary
where
    I: IntoIterator<Item = &'a BidRecord>,
{
    let mut summary = BidSummary::default();
    let mut amount_total = 0.0;

    for bid in bids {
        summary.total += 1;
        amount_total += bid.bid_amount;

        match bid.status {
            status if status.is_pending_like() => summary.pending += 1,
            Status::CounterOffered => summary.counter_offers += 1,
            Status::Accepted => summary.accepted += 1,
            Status::Rejected => summary.rejected += 1,
            Status::Withdrawn => summary.withdrawn += 1,
            Status::Expired => summary.expired += 1,
            _ => (),
        }
    }

    if summary.total > 0 {
        summary.average_bid_amount = amount_total / summary.total as f64;
    }

    summary
}
