//! HTTP surface tests against the in-memory backend
//!
//! Each request goes through the real router, so status mapping (409 for
//! conflicts, 400 for bad input) is exercised along with the handlers.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use desk_server::providers::{MemoryProviders, Providers};
use desk_server::{AppState, Config};
use shared::models::{
    HotelSettings, Membership, Room, RoomStatus, Stay, StayStatus, TouristClass,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_app() -> (Arc<MemoryProviders>, Router) {
    let backend = Arc::new(MemoryProviders::new(HotelSettings {
        service_tax_rate: 6.0,
        tourism_tax_rate: 10.0,
        room_card_deposit: 50.0,
        check_out_time: "12:00".to_string(),
    }));

    backend.insert_room(Room {
        id: 1,
        room_number: "101".to_string(),
        list_price: 120.0,
        status: RoomStatus::Occupied,
    });
    backend.insert_stay(Stay {
        id: 1,
        stay_number: "BK-0001".to_string(),
        guest_id: 10,
        guest_name: "Guest 1".to_string(),
        room_id: 1,
        room_number: "101".to_string(),
        check_in_date: date(2025, 3, 10),
        check_out_date: date(2025, 3, 12),
        nightly_rate: 100.0,
        total_amount: 200.0,
        status: StayStatus::CheckedIn,
        tourist_class: TouristClass::Foreign,
        membership: Membership::Member,
        tourism_tax_amount: None,
        extra_bed_charge: None,
        company_id: None,
        company_name: None,
        payment_method: Some("card".to_string()),
        source: Some("walk_in".to_string()),
        is_posted: false,
        posted_date: None,
        created_at: chrono::Utc::now(),
    });

    let providers = Providers::in_memory(backend.clone());
    let state = AppState::new(Config::from_env(), providers);
    (backend, desk_server::api::router(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (_backend, app) = build_app();
    let (status, body) = send(&app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn checkout_preview_returns_breakdown() {
    let (_backend, app) = build_app();
    let (status, body) = send(&app, get("/api/checkout/1/preview")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    let data = &body["data"];
    assert_eq!(data["breakdown"]["room_charge"], 188.68);
    assert_eq!(data["breakdown"]["service_tax"], 11.32);
    assert_eq!(data["breakdown"]["tourism_tax"], 20.0);
    // Member stay: deposit waived and therefore settled
    assert_eq!(data["deposit_required"], 0.0);
    assert_eq!(data["deposit_settled"], true);
}

#[tokio::test]
async fn checkout_preview_unknown_stay_is_404() {
    let (_backend, app) = build_app();
    let (status, _body) = send(&app, get("/api/checkout/999/preview")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn complete_checkout_flips_states() {
    let (backend, app) = build_app();
    let (status, body) = send(&app, post("/api/checkout/1/complete", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "completed");

    assert_eq!(backend.stay_by_id(1).unwrap().status, StayStatus::CheckedOut);
    assert_eq!(backend.room_by_id(1).unwrap().status, RoomStatus::Dirty);
}

#[tokio::test]
async fn penalty_on_non_late_checkout_is_rejected() {
    let (_backend, app) = build_app();
    let (status, _body) = send(
        &app,
        post("/api/checkout/1/complete", json!({"penalty": 30.0})),
    )
    .await;

    // Stay checked out on 2025-03-12; today it is long overdue, not late
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deposit_refund_conflicts_on_second_call() {
    let (backend, app) = build_app();

    // Non-member stay owing the deposit
    let mut stay = backend.stay_by_id(1).unwrap();
    stay.id = 2;
    stay.stay_number = "BK-0002".to_string();
    stay.membership = Membership::NonMember;
    backend.insert_stay(stay);

    let (status, body) = send(
        &app,
        post("/api/checkout/2/deposit-refund", json!({"method": "cash"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "refunded");
    assert_eq!(body["data"]["is_deposit"], true);

    let (status, _body) = send(
        &app,
        post("/api/checkout/2/deposit-refund", json!({"method": "cash"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn night_audit_run_then_duplicate_conflicts() {
    let (_backend, app) = build_app();

    let (status, body) = send(&app, get("/api/night-audit/preview?date=2025-03-12")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["can_run"], true);
    assert_eq!(body["data"]["total_unposted"], 1);

    let (status, body) = send(
        &app,
        post(
            "/api/night-audit/run",
            json!({"audit_date": "2025-03-12", "notes": "smoke", "run_by": "tester"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_bookings_posted"], 1);

    let (status, _body) = send(
        &app,
        post("/api/night-audit/run", json!({"audit_date": "2025-03-12"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // History and detail endpoints see exactly one run
    let (status, body) = send(&app, get("/api/night-audit/?limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let id = body["data"][0]["id"].as_i64().unwrap();
    let (status, body) = send(&app, get(&format!("/api/night-audit/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["posted_stays"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn night_audit_bad_date_is_400() {
    let (_backend, app) = build_app();
    let (status, _body) = send(
        &app,
        post("/api/night-audit/run", json!({"audit_date": "12/03/2025"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
