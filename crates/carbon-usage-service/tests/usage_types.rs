//! Usage type endpoint integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

fn result_ids(body: &serde_json::Value) -> Vec<i64> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn list_without_auth_fails() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/usage_types").await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn list_with_garbage_token_fails() {
    let harness = TestHarness::new().await;

    harness
        .server
        .get("/usage_types")
        .add_header("authorization", "Bearer not-a-jwt")
        .await
        .assert_status_unauthorized();
}

// ============================================================================
// Seeded data
// ============================================================================

#[tokio::test]
async fn list_returns_seeded_types() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types")
        .add_header("authorization", harness.auth_header(1))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 5);
    assert!(body["next"].is_null());
    assert!(body["previous"].is_null());
    assert_eq!(result_ids(&body), vec![100, 101, 102, 103, 104]);

    let electricity = &body["results"][0];
    assert_eq!(electricity["name"], "electricity");
    assert_eq!(electricity["unit"], "kwh");
    assert_eq!(electricity["factor"], 1.5);
}

#[tokio::test]
async fn retrieve_seeded_type() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types/101")
        .add_header("authorization", harness.auth_header(1))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], 101);
    assert_eq!(body["name"], "water");
    assert_eq!(body["unit"], "kg");
    assert_eq!(body["factor"], 26.93);
}

#[tokio::test]
async fn retrieve_missing_type_is_404() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types/999")
        .add_header("authorization", harness.auth_header(1))
        .await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

// ============================================================================
// Filtering and ordering
// ============================================================================

#[tokio::test]
async fn filter_by_min_factor() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types?min_factor=8")
        .add_header("authorization", harness.auth_header(1))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 3);
    assert_eq!(result_ids(&body), vec![101, 103, 104]);
}

#[tokio::test]
async fn filter_by_name() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types?name=heating")
        .add_header("authorization", harness.auth_header(1))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(result_ids(&body), vec![102, 103, 104]);
}

#[tokio::test]
async fn filter_by_unit_and_max_factor() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types?unit=kwh&max_factor=2")
        .add_header("authorization", harness.auth_header(1))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(result_ids(&body), vec![100]);
}

#[tokio::test]
async fn order_by_factor_both_directions() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types?ordering=factor")
        .add_header("authorization", harness.auth_header(1))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(result_ids(&body), vec![100, 102, 103, 104, 101]);

    let response = harness
        .server
        .get("/usage_types?ordering=-factor")
        .add_header("authorization", harness.auth_header(1))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(result_ids(&body), vec![101, 104, 103, 102, 100]);
}

#[tokio::test]
async fn invalid_filter_value_is_a_field_error() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types?min_factor=heavy")
        .add_header("authorization", harness.auth_header(1))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["details"]["min_factor"].is_array());
}

#[tokio::test]
async fn unknown_query_params_are_ignored() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types?colour=green&ordering=nonsense")
        .add_header("authorization", harness.auth_header(1))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 5);
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn pagination_envelope_links() {
    let harness = TestHarness::with_page_size(2).await;

    let response = harness
        .server
        .get("/usage_types")
        .add_header("authorization", harness.auth_header(1))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 5);
    assert_eq!(result_ids(&body), vec![100, 101]);
    assert_eq!(body["next"], "/usage_types?page=2");
    assert!(body["previous"].is_null());

    let response = harness
        .server
        .get("/usage_types?page=2")
        .add_header("authorization", harness.auth_header(1))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(result_ids(&body), vec![102, 103]);
    assert_eq!(body["next"], "/usage_types?page=3");
    assert_eq!(body["previous"], "/usage_types?page=1");

    let response = harness
        .server
        .get("/usage_types?page=3")
        .add_header("authorization", harness.auth_header(1))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(result_ids(&body), vec![104]);
    assert!(body["next"].is_null());
}

#[tokio::test]
async fn page_past_the_end_is_404() {
    let harness = TestHarness::new().await;

    harness
        .server
        .get("/usage_types?page=99")
        .add_header("authorization", harness.auth_header(1))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn invalid_page_is_a_field_error() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/usage_types?page=last")
        .add_header("authorization", harness.auth_header(1))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert!(body["error"]["details"]["page"].is_array());
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn create_assigns_next_id_after_seed() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/usage_types")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({"name": "gas", "unit": "m3", "factor": 2.1}))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], 105);
    assert_eq!(body["name"], "gas");
    assert_eq!(body["unit"], "m3");
    assert_eq!(body["factor"], 2.1);
}

#[tokio::test]
async fn create_with_missing_fields_lists_each_one() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/usage_types")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    let details = &body["error"]["details"];
    for field in ["name", "unit", "factor"] {
        assert_eq!(details[field][0], "this field is required", "{field}");
    }
}

#[tokio::test]
async fn create_with_overlong_unit_fails() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/usage_types")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({"name": "gas", "unit": "a".repeat(16), "factor": 2.1}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert!(body["error"]["details"]["unit"].is_array());
}

#[tokio::test]
async fn create_with_wrongly_typed_field_names_the_field() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/usage_types")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({"name": "gas", "unit": "m3", "factor": "lots"}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(
        body["error"]["details"]["factor"][0],
        "a valid number is required"
    );
}

#[tokio::test]
async fn create_reports_wrong_types_and_missing_fields_together() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/usage_types")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({"factor": "lots"}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    let details = &body["error"]["details"];
    assert_eq!(details["factor"][0], "a valid number is required");
    assert_eq!(details["name"][0], "this field is required");
    assert_eq!(details["unit"][0], "this field is required");
}

#[tokio::test]
async fn create_with_non_object_body_fails() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/usage_types")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!([1, 2, 3]))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn partial_update_with_wrongly_typed_name_fails() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .patch("/usage_types/100")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({"name": 7}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(
        body["error"]["details"]["name"][0],
        "a valid string is required"
    );
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn full_update_replaces_every_field() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .put("/usage_types/100")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({"name": "electricity", "unit": "mwh", "factor": 1500.0}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], 100);
    assert_eq!(body["unit"], "mwh");
    assert_eq!(body["factor"], 1500.0);
}

#[tokio::test]
async fn full_update_requires_every_field() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .put("/usage_types/100")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({"factor": 2.0}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["details"]["name"][0], "this field is required");
}

#[tokio::test]
async fn partial_update_keeps_absent_fields() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .patch("/usage_types/100")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({"factor": 1.6}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "electricity");
    assert_eq!(body["unit"], "kwh");
    assert_eq!(body["factor"], 1.6);
}

#[tokio::test]
async fn update_missing_type_is_404() {
    let harness = TestHarness::new().await;

    harness
        .server
        .put("/usage_types/999")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({"name": "gas", "unit": "m3", "factor": 2.1}))
        .await
        .assert_status_not_found();
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn delete_then_retrieve_is_404() {
    let harness = TestHarness::new().await;

    harness
        .server
        .delete("/usage_types/104")
        .add_header("authorization", harness.auth_header(1))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    harness
        .server
        .get("/usage_types/104")
        .add_header("authorization", harness.auth_header(1))
        .await
        .assert_status_not_found();

    // A second delete has nothing to remove
    harness
        .server
        .delete("/usage_types/104")
        .add_header("authorization", harness.auth_header(1))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn delete_cascades_to_usages() {
    let harness = TestHarness::new().await;

    harness
        .server
        .post("/usage")
        .add_header("authorization", harness.auth_header(1))
        .json(&json!({
            "user": 1,
            "usage_type": 100,
            "usage_at": "2020-10-10 10:10",
            "amount": 12.5
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    harness
        .server
        .delete("/usage_types/100")
        .add_header("authorization", harness.auth_header(1))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = harness
        .server
        .get("/usage")
        .add_header("authorization", harness.auth_header(1))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 0);
}
