use chrono::Utc;
use tokio::time::timeout;

use super::helpers::resolve;
use super::Dispatcher;

use crate::{
    api::{BidPage, BidQuery, Envelope},
    entities::{normalize_reason, Action, BidRecord, DEFAULT_REJECTION_REASON},
    error::Error,
};

impl Dispatcher {
    pub async fn accept(&self, bid: &BidRecord) -> Result<BidRecord, Error> {
        self.dispatch(bid, Action::Accept).await
    }

    pub async fn reject(&self, bid: &BidRecord, reason: Option<&str>) -> Result<BidRecord, Error> {
        let reason = normalize_reason(reason);
        self.dispatch(bid, Action::Reject { reason }).await
    }

    pub async fn withdraw(&self, bid: &BidRecord) -> Result<BidRecord, Error> {
        self.dispatch(bid, Action::Withdraw).await
    }

    pub async fn accept_counter(&self, bid: &BidRecord) -> Result<BidRecord, Error> {
        self.dispatch(bid, Action::AcceptCounter).await
    }

    pub async fn decline_counter(
        &self,
        bid: &BidRecord,
        reason: Option<&str>,
    ) -> Result<BidRecord, Error> {
        let reason = normalize_reason(reason);
        self.dispatch(bid, Action::DeclineCounter { reason }).await
    }

    /// Validates `action` against the local copy of the bid, sends it, and
    /// returns the bid as it stands afterwards.
    #[tracing::instrument(skip(self, bid, action), fields(bid_id = %bid.id, action = action.kind().name()))]
    pub async fn dispatch(&self, bid: &BidRecord, action: Action) -> Result<BidRecord, Error> {
        let _in_flight = self.begin(&bid.id)?;

        self.ensure_allowed(bid, action.kind())?;
        self.ensure_consistent(bid)?;
        let token = self.token()?;

        let envelope = self
            .send(&token, &bid.id, &action)
            .await
            .map_err(|err| self.observe(err))?;

        let updated = resolve(bid, &action, &envelope, Utc::now())?;

        tracing::info!(status = updated.status.name(), "bid updated");

        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_bids(&self, query: &BidQuery) -> Result<BidPage, Error> {
        let token = self.token()?;

        let mut page = timeout(self.timeout, self.api.list_bids(&token, query))
            .await
            .map_err(Error::from)
            .and_then(|result| result)
            .map_err(|err| self.observe(err))?;

        let received = page.bids.len();
        page.bids.retain(|bid| match bid.validate() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(bid_id = %bid.id, message = ?err.message, "dropping invalid bid");
                false
            }
        });

        tracing::info!(received, kept = page.bids.len(), "fetched bids");

        Ok(page)
    }

    async fn send(&self, token: &str, bid_id: &str, action: &Action) -> Result<Envelope, Error> {
        let api = &self.api;

        let call = async {
            match action {
                Action::Accept => api.accept_bid(token, bid_id).await,
                Action::Reject { reason } => {
                    let reason = reason.as_deref().unwrap_or(DEFAULT_REJECTION_REASON);
                    api.reject_bid(token, bid_id, reason).await
                }
                Action::Withdraw => api.withdraw_bid(token, bid_id).await,
                Action::AcceptCounter => api.accept_counter_offer(token, bid_id).await,
                Action::DeclineCounter { reason } => {
                    api.decline_counter_offer(token, bid_id, reason.as_deref())
                        .await
                }
            }
        };

        timeout(self.timeout, call).await?
    }
}
