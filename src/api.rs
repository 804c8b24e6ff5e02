use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::entities::{BidRecord, Status};
use crate::error::Error;

/// The `{status, message, data?}` wrapper every bid mutation answers with.
///
/// Fields of an unexpected JSON type read as absent rather than failing the
/// whole envelope, so `data` survives a `"status": 200` or similar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn is_error(&self) -> bool {
        if self.success == Some(false) {
            return true;
        }

        matches!(
            self.status.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("error") | Some("fail") | Some("failed")
        )
    }

    /// The updated bid, if the server sent one back as `data` or `data.bid`.
    pub fn bid(&self) -> Option<BidRecord> {
        let data = self.data.as_ref()?;
        let candidate = data.get("bid").unwrap_or(data);

        serde_json::from_value(candidate.clone()).ok()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value.as_str().map(String::from)))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value.as_bool()))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BidQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    pub page: u32,
    pub limit: u32,
}

impl Default for BidQuery {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            limit: 20,
        }
    }
}

impl BidQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(status) = self.status {
            pairs.push(("status", status.name().to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default, alias = "pages")]
    pub total_pages: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BidPage {
    pub bids: Vec<BidRecord>,
    pub pagination: Pagination,
}

/// Remote bid service. Implementations classify failures at the network
/// boundary; callers never inspect message text.
#[async_trait]
pub trait BidAPI {
    async fn accept_bid(&self, token: &str, bid_id: &str) -> Result<Envelope, Error>;

    async fn reject_bid(&self, token: &str, bid_id: &str, reason: &str)
        -> Result<Envelope, Error>;

    async fn withdraw_bid(&self, token: &str, bid_id: &str) -> Result<Envelope, Error>;

    async fn accept_counter_offer(&self, token: &str, bid_id: &str) -> Result<Envelope, Error>;

    async fn decline_counter_offer(
        &self,
        token: &str,
        bid_id: &str,
        reason: Option<&str>,
    ) -> Result<Envelope, Error>;

    async fn list_bids(&self, token: &str, query: &BidQuery) -> Result<BidPage, Error>;
}

pub type DynBidAPI = Arc<dyn BidAPI + Send + Sync>;
