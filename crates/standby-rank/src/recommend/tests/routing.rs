use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::recommend::recommendation_router;

#[tokio::test]
async fn recommend_route_returns_ranked_payload() {
    let (service, _, _) = build_service(
        MemoryEmpties::with_flights(vec![outbound("UA100", 5, 30)]),
        MemorySchedule::with_flights(vec![return_flight("R1", 500)]),
    );
    let router = recommendation_router(Arc::new(service));

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/recommend")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&recommend_request()).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["request_id"], json!("req-1"));
    assert_eq!(payload["seats_required"], json!(2));
    assert_eq!(payload["required_return_buffer_minutes"], json!(120));
    assert_eq!(payload["fallback_used"], json!(true));
    assert_eq!(
        payload["recommendations"][0]["outbound"]["flight_id"],
        json!("UA100")
    );
    assert!(payload["recommendations"][0]["reason_codes"]
        .as_array()
        .expect("codes array")
        .contains(&json!("FALLBACK_BASELINE_USED")));
    assert!(payload["timing_ms"]["total"].is_u64());
}

#[tokio::test]
async fn recommend_handler_returns_unprocessable_for_invalid_window() {
    let (service, _, _) = build_service(MemoryEmpties::default(), MemorySchedule::default());
    let mut request = recommend_request();
    request.return_window.latest = request.return_window.earliest;

    let response = crate::recommend::router::recommend_handler::<MemoryEmpties, MemorySchedule>(
        State(Arc::new(service)),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("must be after earliest"));
}

#[tokio::test]
async fn recommend_handler_returns_unavailable_when_budget_runs_out() {
    let (service, _, _) = build_service(
        MemoryEmpties::with_flights(vec![outbound("UA100", 5, 30)]),
        MemorySchedule::with_flights(vec![return_flight("R1", 500)]),
    );
    let service = service.with_budget(Duration::ZERO);

    let response = crate::recommend::router::recommend_handler::<MemoryEmpties, MemorySchedule>(
        State(Arc::new(service)),
        axum::Json(recommend_request()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn lookahead_defaults_when_omitted() {
    let (service, empties, _) = build_service(
        MemoryEmpties::with_flights(Vec::new()),
        MemorySchedule::with_flights(Vec::new()),
    );
    let router = recommendation_router(Arc::new(service));
    let mut body = serde_json::to_value(recommend_request()).unwrap();
    body.as_object_mut().unwrap().remove("lookahead_minutes");

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/recommend")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        empties.queries.lock().expect("lock")[0].lookahead_minutes,
        60
    );
}
