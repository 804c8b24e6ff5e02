use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Currency, LoadSummary, VehicleDetails};
use crate::error::{invalid_transition_error, validation_error, Error};

pub const MAX_MESSAGE_LEN: usize = 1000;
pub const MAX_COVER_LETTER_LEN: usize = 2000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub load_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadSummary>,
    pub status: Status,
    pub bid_amount: f64,
    #[serde(default)]
    pub currency: Currency,
    pub proposed_pickup_date: DateTime<Utc>,
    pub proposed_delivery_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub vehicle_details: VehicleDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_offer: Option<CounterOffer>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterOffer {
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_pickup_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[serde(alias = "pending")]
    Submitted,
    Viewed,
    UnderReview,
    Shortlisted,
    CounterOffered,
    Accepted,
    Rejected,
    Withdrawn,
    Expired,
}

impl Status {
    pub const ALL: [Status; 9] = [
        Status::Submitted,
        Status::Viewed,
        Status::UnderReview,
        Status::Shortlisted,
        Status::CounterOffered,
        Status::Accepted,
        Status::Rejected,
        Status::Withdrawn,
        Status::Expired,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Viewed => "viewed",
            Self::UnderReview => "under_review",
            Self::Shortlisted => "shortlisted",
            Self::CounterOffered => "counter_offered",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
            Self::Expired => "expired",
        }
    }

    /// Awaiting a decision from the cargo owner.
    pub fn is_pending_like(&self) -> bool {
        matches!(
            self,
            Self::Submitted | Self::Viewed | Self::UnderReview | Self::Shortlisted
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Accepted | Self::Rejected | Self::Withdrawn | Self::Expired
        )
    }
}

impl BidRecord {
    /// Fresh from the driver and not yet looked at; these head the review queue.
    pub fn is_awaiting_review(&self) -> bool {
        self.status == Status::Submitted
    }

    #[tracing::instrument(skip(self), fields(bid_id = %self.id))]
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.bid_amount.is_finite() && self.bid_amount > 0.0) {
            return Err(validation_error("bid amount must be positive"));
        }

        if self.proposed_delivery_date <= self.proposed_pickup_date {
            return Err(validation_error(
                "proposed delivery date must be after pickup date",
            ));
        }

        if let Some(message) = &self.message {
            if message.chars().count() > MAX_MESSAGE_LEN {
                return Err(validation_error(format!(
                    "message exceeds {} characters",
                    MAX_MESSAGE_LEN
                )));
            }
        }

        if let Some(cover_letter) = &self.cover_letter {
            if cover_letter.chars().count() > MAX_COVER_LETTER_LEN {
                return Err(validation_error(format!(
                    "cover letter exceeds {} characters",
                    MAX_COVER_LETTER_LEN
                )));
            }
        }

        if !(self.vehicle_details.capacity.is_finite() && self.vehicle_details.capacity > 0.0) {
            return Err(validation_error("vehicle capacity must be positive"));
        }

        match (&self.status, &self.counter_offer) {
            (Status::CounterOffered, None) => {
                Err(validation_error("counter offered bid is missing its counter offer"))
            }
            (Status::CounterOffered, Some(counter)) => {
                if counter.amount.is_finite() && counter.amount > 0.0 {
                    Ok(())
                } else {
                    Err(validation_error("counter offer amount must be positive"))
                }
            }
            (_, Some(_)) => Err(validation_error(format!(
                "{} bid must not carry a counter offer",
                self.status.name()
            ))),
            (_, None) => Ok(()),
        }
    }

    #[tracing::instrument(skip(self), fields(bid_id = %self.id))]
    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        self.ensure_pending_like("accept")?;

        self.status = Status::Accepted;
        self.accepted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(bid_id = %self.id))]
    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        self.ensure_pending_like("reject")?;

        self.status = Status::Rejected;
        self.rejected_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(bid_id = %self.id))]
    pub fn withdraw(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        self.ensure_pending_like("withdraw")?;

        self.status = Status::Withdrawn;
        self.updated_at = now;
        Ok(())
    }

    /// Accepts at the counter-offered terms rather than the original bid.
    #[tracing::instrument(skip(self), fields(bid_id = %self.id))]
    pub fn accept_counter(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        let counter = match (&self.status, self.counter_offer.take()) {
            (Status::CounterOffered, Some(counter)) => counter,
            (_, counter) => {
                self.counter_offer = counter;
                return Err(self.transition_error("accept counter offer on"));
            }
        };

        self.bid_amount = counter.amount;
        if let Some(pickup) = counter
            .proposed_pickup_date
            .filter(|pickup| *pickup < self.proposed_delivery_date)
        {
            self.proposed_pickup_date = pickup;
        }

        self.status = Status::Accepted;
        self.accepted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(bid_id = %self.id))]
    pub fn decline_counter(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        if self.status != Status::CounterOffered {
            return Err(self.transition_error("decline counter offer on"));
        }

        self.counter_offer = None;
        self.status = Status::Rejected;
        self.rejected_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    fn ensure_pending_like(&self, verb: &str) -> Result<(), Error> {
        match self.status.is_pending_like() {
            true => Ok(()),
            false => Err(self.transition_error(verb)),
        }
    }

    fn transition_error(&self, verb: &str) -> Error {
        invalid_transition_error(format!(
            "cannot {} a {} bid",
            verb,
            self.status.name()
        ))
    }
}

impl AsRef<BidRecord> for BidRecord {
    fn as_ref(&self) -> &BidRecord {
        self
    }
}
