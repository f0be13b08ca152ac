use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lead_capture::config::CrmConfig;
use lead_capture::crm::{CrmClient, CrmError, CrmGateway};
use lead_capture::workflows::lead_capture::{Lead, LeadFormState};
use chrono::NaiveDate;
use serde_json::{json, Value};

type CapturedBody = Arc<Mutex<Option<Value>>>;

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server runs");
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str) -> CrmClient {
    let config = CrmConfig::new(base_url).expect("valid base url");
    CrmClient::new(&config)
}

fn sample_payload() -> Lead {
    let today = NaiveDate::from_ymd_opt(2024, 5, 15).expect("valid date");
    let mut form = LeadFormState::new(today);
    form.first_name = "Jane".to_string();
    form.postcode = "2000".to_string();
    form.create_payload(chrono::Utc::now())
}

#[tokio::test]
async fn save_lead_posts_payload_to_crm_path() {
    let captured: CapturedBody = Arc::new(Mutex::new(None));

    async fn handler(State(captured): State<CapturedBody>, Json(body): Json<Value>) -> Json<Value> {
        *captured.lock().expect("lock") = Some(body);
        Json(json!({ "done": true, "data": { "id": 7 } }))
    }

    let app = Router::new()
        .route("/crm/flk/save-lead/", post(handler))
        .with_state(captured.clone());
    let base_url = spawn_server(app).await;

    let client = client_for(&base_url);
    let response = client
        .save_lead(&sample_payload())
        .await
        .expect("save succeeds");

    assert!(response.done);
    assert_eq!(response.data, Some(json!({ "id": 7 })));

    let body = captured.lock().expect("lock").clone().expect("body captured");
    assert_eq!(body["tenant"]["firstName"], json!("Jane"));
    assert_eq!(body["address"]["postCode"], json!(2000));
    assert_eq!(body["renewal"], json!(false));
}

#[tokio::test]
async fn autocomplete_sends_query_parameter() {
    async fn handler(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let query = params.get("query").cloned().unwrap_or_default();
        Json(json!([
            {
                "display_name": format!("{query} — 100 Queen St, Melbourne VIC 3000"),
                "address": { "road": "Queen St", "city": "Melbourne", "state": "Victoria" }
            }
        ]))
    }

    let app = Router::new().route("/crm/address-autocomplete/", get(handler));
    let base_url = spawn_server(app).await;

    let client = client_for(&base_url);
    let suggestions = client
        .address_autocomplete("100 Queen")
        .await
        .expect("lookup succeeds");

    assert_eq!(suggestions.len(), 1);
    assert!(suggestions[0].display_name.starts_with("100 Queen"));
    assert_eq!(suggestions[0].address.road.as_deref(), Some("Queen St"));
    assert_eq!(suggestions[0].address.city.as_deref(), Some("Melbourne"));
}

#[tokio::test]
async fn non_success_status_becomes_rejected_error_with_body() {
    async fn handler() -> (StatusCode, &'static str) {
        (StatusCode::BAD_REQUEST, "invalid lead")
    }

    let app = Router::new().route("/crm/flk/save-lead/", post(handler));
    let base_url = spawn_server(app).await;

    let client = client_for(&base_url);
    let result = client.save_lead(&sample_payload()).await;

    match result {
        Err(CrmError::Rejected { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid lead"));
            assert!(
                CrmError::Rejected { status, body }.user_detail().contains("invalid lead")
            );
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_failure_surfaces_as_transport_error() {
    // Bind a listener to reserve a port, then drop it so nothing answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = client_for(&format!("http://{addr}"));
    let result = client.address_autocomplete("100 Queen").await;

    assert!(matches!(result, Err(CrmError::Transport(_))));
}
