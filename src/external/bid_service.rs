use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    api::{BidAPI, BidPage, BidQuery, Envelope, Pagination},
    config::Config,
    entities::BidRecord,
    error::{status_error, unknown_server_error, validation_error, Error},
};

/// `BidAPI` over the marketplace REST API.
#[derive(Clone, Debug)]
pub struct HttpBidAPI {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct ListResponse {
    data: ListData,
}

#[derive(Deserialize)]
struct ListData {
    bids: Vec<serde_json::Value>,
    #[serde(default)]
    pagination: Pagination,
}

impl HttpBidAPI {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(not_a_base(&base_url));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| not_a_base(&self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .bearer_auth(token)
            .header("x-request-id", Uuid::new_v4().to_string())
    }

    #[tracing::instrument(skip(self, token, body))]
    async fn post_action(
        &self,
        token: &str,
        bid_id: &str,
        action: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Envelope, Error> {
        let url = self.url(&["bids", bid_id, action])?;

        let mut req = self.authorized(self.client.post(url), token);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let res = req.send().await?;

        read_envelope(res).await
    }
}

fn not_a_base(url: &Url) -> Error {
    validation_error(format!("{} cannot be used as a base URL", url))
}

fn refusal(status_code: StatusCode, text: &str) -> Error {
    let message = serde_json::from_str::<Envelope>(text)
        .ok()
        .and_then(|envelope| envelope.message);
    tracing::warn!(status = status_code.as_u16(), ?message, "bid service refused request");

    status_error(status_code.as_u16(), message)
}

async fn read_envelope(res: Response) -> Result<Envelope, Error> {
    let status_code = res.status();
    let text = res.text().await?;

    if !status_code.is_success() {
        return Err(refusal(status_code, &text));
    }

    let envelope = match serde_json::from_str::<Envelope>(&text) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(%err, "malformed success body, treating as success");
            Envelope::default()
        }
    };

    if envelope.is_error() {
        return Err(unknown_server_error(envelope.message));
    }

    Ok(envelope)
}

#[async_trait]
impl BidAPI for HttpBidAPI {
    async fn accept_bid(&self, token: &str, bid_id: &str) -> Result<Envelope, Error> {
        self.post_action(token, bid_id, "accept", None).await
    }

    async fn reject_bid(
        &self,
        token: &str,
        bid_id: &str,
        reason: &str,
    ) -> Result<Envelope, Error> {
        self.post_action(token, bid_id, "reject", Some(json!({ "reason": reason })))
            .await
    }

    async fn withdraw_bid(&self, token: &str, bid_id: &str) -> Result<Envelope, Error> {
        self.post_action(token, bid_id, "withdraw", None).await
    }

    async fn accept_counter_offer(&self, token: &str, bid_id: &str) -> Result<Envelope, Error> {
        self.post_action(token, bid_id, "accept-counter", None)
            .await
    }

    async fn decline_counter_offer(
        &self,
        token: &str,
        bid_id: &str,
        reason: Option<&str>,
    ) -> Result<Envelope, Error> {
        let body = reason.map(|reason| json!({ "reason": reason }));
        self.post_action(token, bid_id, "decline-counter", body)
            .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn list_bids(&self, token: &str, query: &BidQuery) -> Result<BidPage, Error> {
        let res = self
            .authorized(self.client.get(self.url(&["bids"])?), token)
            .query(&query.query_pairs())
            .send()
            .await?;

        let status_code = res.status();
        let text = res.text().await?;

        if !status_code.is_success() {
            return Err(refusal(status_code, &text));
        }

        let ListResponse { data } = serde_json::from_str(&text)
            .map_err(|err| validation_error(format!("malformed bid list: {}", err)))?;

        let bids = data
            .bids
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<BidRecord>(value) {
                Ok(bid) => Some(bid),
                Err(err) => {
                    tracing::warn!(%err, "skipping unreadable bid");
                    None
                }
            })
            .collect();

        Ok(BidPage {
            bids,
            pagination: data.pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpBidAPI {
        HttpBidAPI::new(Url::parse(base).unwrap(), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn endpoints_extend_the_base_path() {
        let url = api("https://api.example.com/api/").url(&["bids", "b1", "accept"]);
        assert_eq!(url.unwrap().as_str(), "https://api.example.com/api/bids/b1/accept");

        let url = api("https://api.example.com/api").url(&["bids"]);
        assert_eq!(url.unwrap().as_str(), "https://api.example.com/api/bids");

        let url = api("http://localhost:5000").url(&["bids"]);
        assert_eq!(url.unwrap().as_str(), "http://localhost:5000/bids");
    }

    #[test]
    fn bid_ids_are_percent_encoded() {
        let url = api("https://api.example.com/api").url(&["bids", "b 1/../x?y", "withdraw"]);

        assert_eq!(
            url.unwrap().as_str(),
            "https://api.example.com/api/bids/b%201%2F..%2Fx%3Fy/withdraw"
        );
    }

    #[test]
    fn opaque_urls_are_refused() {
        let base = Url::parse("mailto:ops@example.com").unwrap();

        let err = HttpBidAPI::new(base, Duration::from_secs(1)).unwrap_err();

        assert_eq!(err.kind, crate::error::ErrorKind::ValidationFailed);
    }
}
