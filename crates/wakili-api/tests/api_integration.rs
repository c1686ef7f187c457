//! HTTP-level tests over the full wired state.

use axum_test::TestServer;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use wakili_api::{build_state, create_router, AppState};
use wakili_types::{UserId, WakiliConfig};

fn test_server() -> (TestServer, AppState) {
    let state = build_state(WakiliConfig::default()).unwrap();
    let server = TestServer::new(create_router(state.clone())).unwrap();
    (server, state)
}

/// Register a provider over HTTP and mark them online. Returns
/// (user id, provider id).
async fn online_provider(server: &TestServer, name: &str) -> (Uuid, Uuid) {
    let user_id = Uuid::now_v7();
    let response = server
        .post("/provider/register")
        .json(&json!({"user_id": user_id, "display_name": name}))
        .await;
    response.assert_status_ok();
    let provider: Value = response.json();
    let provider_id: Uuid = serde_json::from_value(provider["provider_id"].clone()).unwrap();

    server
        .post("/provider/status")
        .json(&json!({"provider_id": user_id, "is_online": true}))
        .await
        .assert_status_ok();
    (user_id, provider_id)
}

async fn dispatch(server: &TestServer, case_type: &str) -> Value {
    let response = server
        .post("/dispatch/request")
        .json(&json!({"client_id": Uuid::now_v7(), "case_type": case_type}))
        .await;
    response.assert_status_ok();
    response.json()
}

#[derive(Debug, Deserialize)]
struct WalletBody {
    balance: Decimal,
}

#[tokio::test]
async fn health_reports_service() {
    let (server, _) = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Wakili");
}

#[tokio::test]
async fn dispatch_with_no_providers_yields_empty_offered() {
    let (server, _) = test_server();
    let body = dispatch(&server, "family").await;
    assert_eq!(body["offered"].as_array().unwrap().len(), 0);
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn dispatch_requires_client_and_case_type() {
    let (server, _) = test_server();

    let response = server
        .post("/dispatch/request")
        .json(&json!({"case_type": "family"}))
        .await;
    response.assert_status_bad_request();

    let response = server
        .post("/dispatch/request")
        .json(&json!({"client_id": Uuid::now_v7(), "case_type": "  "}))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn dispatch_offers_online_providers_only() {
    let (server, _) = test_server();
    let (online_user, online_provider_id) = online_provider(&server, "Online").await;
    let (offline_user, _) = online_provider(&server, "Offline").await;
    server
        .post("/provider/status")
        .json(&json!({"provider_id": offline_user, "is_online": false}))
        .await
        .assert_status_ok();
    let _ = online_user;

    let body = dispatch(&server, "family").await;
    let offered = body["offered"].as_array().unwrap();
    assert_eq!(offered.len(), 1);
    assert_eq!(
        offered[0]["provider_id"],
        json!(online_provider_id.to_string())
    );
}

#[tokio::test]
async fn provider_list_ranked_by_rating() {
    let (server, state) = test_server();
    let (_, low_id) = online_provider(&server, "Low").await;
    let (_, high_id) = online_provider(&server, "High").await;

    // Rate through the registry-backed endpoint.
    for stars in [5, 5] {
        server
            .post("/rate")
            .json(&json!({
                "user_id": Uuid::now_v7(),
                "provider_id": high_id,
                "stars": stars,
            }))
            .await
            .assert_status_ok();
    }
    server
        .post("/rate")
        .json(&json!({
            "user_id": Uuid::now_v7(),
            "provider_id": low_id,
            "stars": 2,
        }))
        .await
        .assert_status_ok();

    let response = server.get("/provider/list").await;
    response.assert_status_ok();
    let list: Vec<Value> = response.json();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["provider_id"], json!(high_id.to_string()));
    let _ = state;
}

#[tokio::test]
async fn accept_flow_first_wins_second_conflicts() {
    let (server, _) = test_server();
    let (winner_user, winner_id) = online_provider(&server, "Winner").await;
    let (loser_user, _) = online_provider(&server, "Loser").await;

    let body = dispatch(&server, "land").await;
    let request_id = body["request_id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/dispatch/{request_id}/accept"))
        .json(&json!({"provider_user_id": winner_user}))
        .await;
    response.assert_status_ok();
    let win: Value = response.json();
    assert_eq!(win["status"], "accepted");
    assert_eq!(win["provider_id"], json!(winner_id.to_string()));

    let response = server
        .post(&format!("/dispatch/{request_id}/accept"))
        .json(&json!({"provider_user_id": loser_user}))
        .await;
    response.assert_status_ok();
    let lose: Value = response.json();
    assert_eq!(lose["status"], "already_assigned");
    assert_eq!(
        lose["provider_id"],
        json!(winner_id.to_string()),
        "loser sees the actual assignee"
    );

    // Case view reflects the assignment.
    let response = server.get(&format!("/dispatch/{request_id}")).await;
    response.assert_status_ok();
    let case: Value = response.json();
    assert_eq!(case["status"], "accepted");
}

#[tokio::test]
async fn accept_unknown_provider_is_404_missing_field_400() {
    let (server, _) = test_server();
    let body = dispatch(&server, "family").await;
    let request_id = body["request_id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/dispatch/{request_id}/accept"))
        .json(&json!({"provider_user_id": Uuid::now_v7()}))
        .await;
    response.assert_status_not_found();

    let response = server
        .post(&format!("/dispatch/{request_id}/accept"))
        .json(&json!({}))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn complete_splits_and_credits_wallets() {
    let (server, state) = test_server();
    let (provider_user, _) = online_provider(&server, "Amina").await;
    let body = dispatch(&server, "family").await;
    let request_id = body["request_id"].as_str().unwrap().to_string();
    server
        .post(&format!("/dispatch/{request_id}/accept"))
        .json(&json!({"provider_user_id": provider_user}))
        .await
        .assert_status_ok();

    let response = server
        .post("/case/complete")
        .json(&json!({
            "case_id": request_id,
            "amount": "1000",
            "provider_id": provider_user,
        }))
        .await;
    response.assert_status_ok();
    let receipt: Value = response.json();
    let commission: Decimal =
        serde_json::from_value(receipt["commission"].clone()).unwrap();
    let payout: Decimal = serde_json::from_value(receipt["payout"].clone()).unwrap();
    assert_eq!(commission, Decimal::new(200, 0));
    assert_eq!(payout, Decimal::new(800, 0));

    // Provider wallet over HTTP.
    let response = server.get(&format!("/wallet/{provider_user}")).await;
    response.assert_status_ok();
    let wallet: WalletBody = response.json();
    assert_eq!(wallet.balance, Decimal::new(800, 0));

    // Platform wallet via state (no HTTP identity for it).
    let platform = state.ledger.wallet_of(state.platform_user).unwrap();
    assert_eq!(platform.balance, Decimal::new(200, 0));

    // Transaction listing.
    let response = server
        .get(&format!("/wallet/{provider_user}/transactions"))
        .await;
    response.assert_status_ok();
    let transactions: Vec<Value> = response.json();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["kind"], "payout");

    // Double completion: conflict, no double credit.
    let response = server
        .post("/case/complete")
        .json(&json!({
            "case_id": request_id,
            "amount": "1000",
            "provider_id": provider_user,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    let response = server.get(&format!("/wallet/{provider_user}")).await;
    let wallet: WalletBody = response.json();
    assert_eq!(wallet.balance, Decimal::new(800, 0));
}

#[tokio::test]
async fn rating_mean_is_exact_over_http() {
    let (server, _) = test_server();
    let (_, provider_id) = online_provider(&server, "Rated").await;

    let mut last = Value::Null;
    for stars in [5, 3, 4] {
        let response = server
            .post("/rate")
            .json(&json!({
                "user_id": Uuid::now_v7(),
                "provider_id": provider_id,
                "stars": stars,
                "comment": "thorough",
            }))
            .await;
        response.assert_status_ok();
        last = response.json();
    }
    let rating: Decimal = serde_json::from_value(last["rating"].clone()).unwrap();
    assert_eq!(rating, Decimal::new(4, 0), "mean of 5,3,4 is exactly 4");

    // Out-of-range stars: 400. Unknown provider: 404.
    server
        .post("/rate")
        .json(&json!({"user_id": Uuid::now_v7(), "provider_id": provider_id, "stars": 6}))
        .await
        .assert_status_bad_request();
    server
        .post("/rate")
        .json(&json!({"user_id": Uuid::now_v7(), "provider_id": Uuid::now_v7(), "stars": 3}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn unknown_wallet_is_404() {
    let (server, _) = test_server();
    let response = server.get(&format!("/wallet/{}", Uuid::now_v7())).await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn webhook_always_acks_and_audits_garbage() {
    let (server, state) = test_server();

    let response = server.post("/payments/webhook").text("not json at all").await;
    response.assert_status_ok();
    let ack: Value = response.json();
    assert_eq!(ack["received"], true);
    assert_eq!(state.audit.len(), 1, "garbage still audited");

    // A well-formed but unknown callback is audited too, credits nothing.
    let callback = json!({
        "Body": {
            "stkCallback": {
                "MerchantRequestID": "m-1",
                "CheckoutRequestID": "ws_CO_unknown",
                "ResultCode": 0,
                "ResultDesc": "ok",
                "CallbackMetadata": {"Item": [{"Name": "Amount", "Value": 500}]}
            }
        }
    });
    server
        .post("/payments/webhook")
        .json(&callback)
        .await
        .assert_status_ok();
    assert_eq!(state.audit.len(), 2);
}

#[tokio::test]
async fn webhook_credits_tracked_push() {
    let (server, state) = test_server();
    let client = UserId::new();
    state.pending_pushes.track("ws_CO_42", client.to_string());

    let callback = json!({
        "Body": {
            "stkCallback": {
                "MerchantRequestID": "m-42",
                "CheckoutRequestID": "ws_CO_42",
                "ResultCode": 0,
                "ResultDesc": "ok",
                "CallbackMetadata": {"Item": [{"Name": "Amount", "Value": 750}]}
            }
        }
    });
    server
        .post("/payments/webhook")
        .json(&callback)
        .await
        .assert_status_ok();

    let wallet = state.ledger.wallet_of(client).unwrap();
    assert_eq!(wallet.balance, Decimal::new(750, 0));

    // Replaying the same callback does not credit again: the pending
    // entry was consumed.
    server
        .post("/payments/webhook")
        .json(&callback)
        .await
        .assert_status_ok();
    assert_eq!(state.ledger.wallet_of(client).unwrap().balance, Decimal::new(750, 0));
}

#[tokio::test]
async fn payments_push_without_credentials_is_gateway_error() {
    let (server, _) = test_server();
    let response = server
        .post("/payments/push")
        .json(&json!({
            "phone": "254712345678",
            "amount": "100",
            "account_ref": Uuid::now_v7(),
            "desc": "deposit"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn payments_push_missing_fields_is_400() {
    let (server, _) = test_server();
    let response = server
        .post("/payments/push")
        .json(&json!({"amount": "100"}))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn double_provider_registration_conflicts() {
    let (server, _) = test_server();
    let user_id = Uuid::now_v7();
    server
        .post("/provider/register")
        .json(&json!({"user_id": user_id, "display_name": "Amina"}))
        .await
        .assert_status_ok();
    let response = server
        .post("/provider/register")
        .json(&json!({"user_id": user_id, "display_name": "Amina Again"}))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}
