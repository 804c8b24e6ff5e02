//! Builders and a recording bid service for unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use parking_lot::Mutex;

use crate::api::{BidAPI, BidPage, BidQuery, Envelope, Pagination};
use crate::entities::{
    ActionKind, BidRecord, CounterOffer, Currency, Status, VehicleDetails, VehicleType,
};
use crate::error::Error;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

pub fn bid(id: &str, status: Status, amount: f64, created_at: DateTime<Utc>) -> BidRecord {
    BidRecord {
        id: id.to_string(),
        load_id: format!("load-{}", id),
        load: None,
        status,
        bid_amount: amount,
        currency: Currency::Kes,
        proposed_pickup_date: created_at + ChronoDuration::days(1),
        proposed_delivery_date: created_at + ChronoDuration::days(2),
        message: None,
        cover_letter: None,
        vehicle_details: VehicleDetails {
            vehicle_type: VehicleType::MediumTruck,
            capacity: 10.0,
        },
        counter_offer: None,
        created_at,
        updated_at: created_at,
        viewed_at: None,
        accepted_at: None,
        rejected_at: None,
        expires_at: None,
    }
}

pub fn counter_offered_bid(id: &str, amount: f64, counter_amount: f64) -> BidRecord {
    let mut record = bid(id, Status::CounterOffered, amount, t0());
    record.counter_offer = Some(CounterOffer {
        amount: counter_amount,
        message: Some("Can you do it for less?".into()),
        proposed_pickup_date: None,
        created_at: t0() + ChronoDuration::hours(1),
    });
    record
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub action: ActionKind,
    pub bid_id: String,
    pub token: String,
    pub reason: Option<String>,
}

/// Records every call, optionally sleeps, and answers from a queue of
/// canned responses (an empty success envelope once the queue is empty).
#[derive(Default)]
pub struct MockBidAPI {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<Result<Envelope, Error>>>,
    bids: Mutex<Vec<BidRecord>>,
    list_calls: Mutex<usize>,
    delay: Option<Duration>,
}

impl MockBidAPI {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_bids(self, bids: Vec<BidRecord>) -> Self {
        self.set_bids(bids);
        self
    }

    pub fn set_bids(&self, bids: Vec<BidRecord>) {
        *self.bids.lock() = bids;
    }

    pub fn push_response(&self, response: Result<Envelope, Error>) {
        self.responses.lock().push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock()
    }

    async fn record(
        &self,
        action: ActionKind,
        token: &str,
        bid_id: &str,
        reason: Option<&str>,
    ) -> Result<Envelope, Error> {
        self.calls.lock().push(Call {
            action,
            bid_id: bid_id.to_string(),
            token: token.to_string(),
            reason: reason.map(String::from),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.responses.lock().pop_front();
        response.unwrap_or_else(|| Ok(Envelope::default()))
    }
}

#[async_trait]
impl BidAPI for MockBidAPI {
    async fn accept_bid(&self, token: &str, bid_id: &str) -> Result<Envelope, Error> {
        self.record(ActionKind::Accept, token, bid_id, None).await
    }

    async fn reject_bid(
        &self,
        token: &str,
        bid_id: &str,
        reason: &str,
    ) -> Result<Envelope, Error> {
        self.record(ActionKind::Reject, token, bid_id, Some(reason))
            .await
    }

    async fn withdraw_bid(&self, token: &str, bid_id: &str) -> Result<Envelope, Error> {
        self.record(ActionKind::Withdraw, token, bid_id, None).await
    }

    async fn accept_counter_offer(&self, token: &str, bid_id: &str) -> Result<Envelope, Error> {
        self.record(ActionKind::AcceptCounter, token, bid_id, None)
            .await
    }

    async fn decline_counter_offer(
        &self,
        token: &str,
        bid_id: &str,
        reason: Option<&str>,
    ) -> Result<Envelope, Error> {
        self.record(ActionKind::DeclineCounter, token, bid_id, reason)
            .await
    }

    async fn list_bids(&self, _token: &str, query: &BidQuery) -> Result<BidPage, Error> {
        *self.list_calls.lock() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let bids = self.bids.lock().clone();
        let total = bids.len() as u64;

        Ok(BidPage {
            bids,
            pagination: Pagination {
                page: query.page,
                limit: query.limit,
                total,
                total_pages: 1,
            },
        })
    }
}
