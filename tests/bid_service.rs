use std::time::Duration;

use reqwest::Url;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_json, header, header_exists, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use infinite_cargo::api::{BidAPI, BidQuery};
use infinite_cargo::entities::Status;
use infinite_cargo::error::ErrorKind;
use infinite_cargo::external::HttpBidAPI;

const TOKEN: &str = "token-123";

fn bid_json(id: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "loadId": "load-1",
        "status": status,
        "bidAmount": 5000,
        "currency": "KES",
        "proposedPickupDate": "2024-03-02T08:00:00Z",
        "proposedDeliveryDate": "2024-03-03T08:00:00Z",
        "vehicleDetails": { "type": "small_truck", "capacity": 3.5 },
        "createdAt": "2024-03-01T08:00:00Z",
        "updatedAt": "2024-03-01T08:00:00Z"
    })
}

async fn client(server: &MockServer) -> HttpBidAPI {
    let base = Url::parse(&server.uri()).unwrap();
    HttpBidAPI::new(base, Duration::from_secs(10)).unwrap()
}

#[tokio::test]
async fn accept_posts_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bids/b1/accept"))
        .and(header("authorization", "Bearer token-123"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Bid accepted successfully",
            "data": { "bid": bid_json("b1", "accepted") }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = client(&server).await.accept_bid(TOKEN, "b1").await.unwrap();

    assert_eq!(envelope.message.as_deref(), Some("Bid accepted successfully"));
    assert_eq!(envelope.bid().unwrap().status, Status::Accepted);
}

#[tokio::test]
async fn reject_sends_reason_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bids/b1/reject"))
        .and(body_json(json!({ "reason": "No reason provided" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = client(&server)
        .await
        .reject_bid(TOKEN, "b1", "No reason provided")
        .await
        .unwrap();

    assert!(envelope.data.is_none());
}

#[tokio::test]
async fn counter_offer_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bids/b1/accept-counter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bids/b2/decline-counter"))
        .and(body_json(json!({ "reason": "Too low" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server).await;

    assert!(api.accept_counter_offer(TOKEN, "b1").await.is_ok());
    assert!(api
        .decline_counter_offer(TOKEN, "b2", Some("Too low"))
        .await
        .is_ok());
}

#[tokio::test]
async fn http_failures_are_classified() {
    let server = MockServer::start().await;
    for (bid_id, code) in [
        ("b401", 401u16),
        ("b403", 403),
        ("b404", 404),
        ("b409", 409),
        ("b500", 500),
    ] {
        Mock::given(method("POST"))
            .and(path(format!("/bids/{}/withdraw", bid_id)))
            .respond_with(
                ResponseTemplate::new(code)
                    .set_body_json(json!({ "status": "error", "message": format!("failed with {}", code) })),
            )
            .mount(&server)
            .await;
    }

    let api = client(&server).await;

    let expectations = [
        ("b401", ErrorKind::SessionExpired),
        ("b403", ErrorKind::PermissionDenied),
        ("b404", ErrorKind::NotFound),
        ("b409", ErrorKind::Conflict),
        ("b500", ErrorKind::UnknownServerError),
    ];
    for (bid_id, kind) in expectations {
        let err = api.withdraw_bid(TOKEN, bid_id).await.unwrap_err();
        assert_eq!(err.kind, kind, "{}", bid_id);
        assert!(err.message.unwrap().starts_with("failed with"));
    }
}

#[tokio::test]
async fn malformed_success_body_is_still_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bids/b1/withdraw"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let envelope = client(&server).await.withdraw_bid(TOKEN, "b1").await.unwrap();

    assert!(envelope.bid().is_none());
}

#[tokio::test]
async fn error_envelope_under_ok_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bids/b1/accept"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "error", "message": "Load already assigned" })),
        )
        .mount(&server)
        .await;

    let err = client(&server).await.accept_bid(TOKEN, "b1").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::UnknownServerError);
    assert_eq!(err.message.as_deref(), Some("Load already assigned"));
}

#[tokio::test]
async fn list_bids_passes_query_and_skips_unreadable_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bids"))
        .and(query_param("status", "shortlisted"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "bids": [bid_json("b1", "shortlisted"), { "_id": "broken" }],
                "pagination": { "page": 2, "limit": 5, "total": 6, "totalPages": 2 }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = BidQuery {
        status: Some(Status::Shortlisted),
        page: 2,
        limit: 5,
    };
    let page = client(&server).await.list_bids(TOKEN, &query).await.unwrap();

    assert_eq!(page.bids.len(), 1);
    assert_eq!(page.bids[0].id, "b1");
    assert_eq!(page.pagination.total, 6);
    assert_eq!(page.pagination.total_pages, 2);
}

#[tokio::test]
async fn malformed_list_is_a_validation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "bids": "nope" })))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .list_bids(TOKEN, &BidQuery::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::ValidationFailed);
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bids/b1/accept"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "success" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let base = Url::parse(&server.uri()).unwrap();
    let api = HttpBidAPI::new(base, Duration::from_millis(100)).unwrap();
    let err = api.accept_bid(TOKEN, "b1").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Timeout);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // nothing listens on port 1
    let base = Url::parse("http://127.0.0.1:1").unwrap();
    let api = HttpBidAPI::new(base, Duration::from_secs(2)).unwrap();
    let err = api.accept_bid(TOKEN, "b1").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::NetworkError);
}
