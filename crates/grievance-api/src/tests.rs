//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use grievance_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

fn payload(title: &str, category: &str) -> Value {
  json!({
    "complainantName": "Samuel",
    "email": "SamuelFojas@Example.com",
    "phoneNumber": "0432123456",
    "title": title,
    "description": "Stock not replenished.",
    "category": category,
    "assignedTo": "Nikko Fojas",
  })
}

async fn create(app: &Router, title: &str, category: &str) -> String {
  let (status, body) =
    send(app, "POST", "/complaints", Some(payload(title, category))).await;
  assert_eq!(status, StatusCode::CREATED);
  body["id"].as_str().unwrap().to_owned()
}

// ── Create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_201_with_defaults() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/complaints",
    Some(json!({
      "complainantName": "Samuel",
      "email": "SAMUEL@example.com",
      "phoneNumber": "0432123456",
      "title": "Ipad not allowed",
      "description": "Confiscated at entry",
    })),
  )
  .await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["email"], "samuel@example.com");
  assert_eq!(body["category"], "Low");
  assert_eq!(body["assignedTo"], "");
  assert_eq!(body["status"], "Open");
  assert_eq!(body["completionDate"], Value::Null);
  assert_eq!(body["resolutionNotes"], json!([]));
}

#[tokio::test]
async fn create_with_missing_fields_returns_400() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/complaints",
    Some(json!({ "complainantName": "", "email": "not-a-valid-email" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["message"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn malformed_json_returns_400() {
  let app = app().await;
  let req = Request::builder()
    .method("POST")
    .uri("/complaints")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── List ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_filters_by_status_newest_first() {
  let app = app().await;
  let a = create(&app, "A", "Low").await;
  create(&app, "B", "High").await;
  let c = create(&app, "C", "Medium").await;

  for id in [&a, &c] {
    let (status, _) = send(
      &app,
      "PATCH",
      &format!("/complaints/{id}/status"),
      Some(json!({ "status": "Resolved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  let (status, body) = send(&app, "GET", "/complaints?status=Resolved", None).await;
  assert_eq!(status, StatusCode::OK);
  let items = body.as_array().unwrap();
  assert_eq!(items.len(), 2);
  assert!(items.iter().all(|c| c["status"] == "Resolved"));
  assert_eq!(items[0]["id"], c.as_str());
  assert_eq!(items[1]["id"], a.as_str());
}

#[tokio::test]
async fn list_filters_by_category_and_label_with_spaces() {
  let app = app().await;
  let id = create(&app, "A", "High").await;
  create(&app, "B", "Low").await;
  send(
    &app,
    "PATCH",
    &format!("/complaints/{id}/status"),
    Some(json!({ "status": "In Progress" })),
  )
  .await;

  let (status, body) = send(
    &app,
    "GET",
    "/complaints?status=In%20Progress&category=High",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["id"], id.as_str());
}

#[tokio::test]
async fn list_with_invalid_filter_returns_400() {
  let app = app().await;
  let (status, _) = send(&app, "GET", "/complaints?category=Urgent", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Details ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_updates_details_and_ignores_status() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;

  let (status, body) = send(
    &app,
    "PUT",
    &format!("/complaints/{id}"),
    Some(json!({
      "title": "Chocolates are not enough.",
      "category": "Medium",
      "assignedTo": "Hannah Fojas",
      "status": "Resolved",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["title"], "Chocolates are not enough.");
  assert_eq!(body["category"], "Medium");
  assert_eq!(body["assignedTo"], "Hannah Fojas");
  assert_eq!(body["status"], "Open");
  assert_eq!(body["completionDate"], Value::Null);
}

#[tokio::test]
async fn put_missing_complaint_returns_404() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "PUT",
    &format!("/complaints/{}", Uuid::new_v4()),
    Some(json!({ "title": "No complaints" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["message"].as_str().unwrap().contains("Complaint not found"));
}

#[tokio::test]
async fn put_with_empty_title_returns_400() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;
  let (status, _) = send(
    &app,
    "PUT",
    &format!("/complaints/{id}"),
    Some(json!({ "title": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Status ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn status_transition_sets_and_clears_completion_date() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;
  let uri = format!("/complaints/{id}/status");

  let (_, closed) =
    send(&app, "PATCH", &uri, Some(json!({ "status": "Closed - No Resolution" }))).await;
  assert_eq!(closed["status"], "Closed - No Resolution");
  assert!(closed["completionDate"].is_string());

  let (status, reopened) =
    send(&app, "PATCH", &uri, Some(json!({ "status": "Open" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(reopened["completionDate"], Value::Null);
}

#[tokio::test]
async fn unknown_status_returns_400() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;
  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/complaints/{id}/status"),
    Some(json!({ "status": "Bogus" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["message"].as_str().unwrap().contains("Invalid status"));
}

#[tokio::test]
async fn status_on_missing_complaint_returns_404() {
  let app = app().await;
  let (status, _) = send(
    &app,
    "PATCH",
    &format!("/complaints/{}/status", Uuid::new_v4()),
    Some(json!({ "status": "Open" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_on_write_returns_400() {
  let app = app().await;
  let (status, _) = send(
    &app,
    "PATCH",
    "/complaints/nope/status",
    Some(json!({ "status": "Open" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_id_on_read_returns_500() {
  let app = app().await;
  let (status, _) = send(&app, "GET", "/complaints/nope", None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ── Close without resolution ─────────────────────────────────────────────────

#[tokio::test]
async fn close_no_resolution_is_idempotent() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;
  let uri = format!("/complaints/{id}/close-no-resolution");

  let (status, first) = send(&app, "PATCH", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(first["status"], "Closed - No Resolution");

  let (status, second) = send(&app, "PATCH", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(second["completionDate"], first["completionDate"]);
}

#[tokio::test]
async fn close_no_resolution_missing_returns_404() {
  let app = app().await;
  let (status, _) = send(
    &app,
    "PATCH",
    &format!("/complaints/{}/close-no-resolution", Uuid::new_v4()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Notes ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn note_without_text_returns_400() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;
  let (status, body) = send(
    &app,
    "POST",
    &format!("/complaints/{id}/notes"),
    Some(json!({ "text": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Note text is required");
}

#[tokio::test]
async fn note_on_open_complaint_returns_400() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;
  let (status, body) = send(
    &app,
    "POST",
    &format!("/complaints/{id}/notes"),
    Some(json!({ "text": "Trying to add too early" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "Allowed only when complaint is completed");

  let (_, stored) = send(&app, "GET", &format!("/complaints/{id}"), None).await;
  assert_eq!(stored["resolutionNotes"], json!([]));
}

#[tokio::test]
async fn note_on_resolved_complaint_is_appended() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;
  send(
    &app,
    "PATCH",
    &format!("/complaints/{id}/status"),
    Some(json!({ "status": "Resolved" })),
  )
  .await;

  let (status, body) = send(
    &app,
    "POST",
    &format!("/complaints/{id}/notes"),
    Some(json!({ "text": "  All good now ", "author": "Staff" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let notes = body["resolutionNotes"].as_array().unwrap();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0]["text"], "All good now");
  assert_eq!(notes[0]["author"], "Staff");
  assert!(notes[0]["createdAt"].is_string());
}

#[tokio::test]
async fn note_on_missing_complaint_returns_404() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    &format!("/complaints/{}/notes", Uuid::new_v4()),
    Some(json!({ "text": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["message"].as_str().unwrap().to_lowercase().contains("not found"));
}

#[tokio::test]
async fn close_with_note_applies_both_changes() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;

  let (status, body) = send(
    &app,
    "POST",
    &format!("/complaints/{id}/close-with-note"),
    Some(json!({ "text": "Customer stopped responding" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "Closed - No Resolution");
  assert!(body["completionDate"].is_string());
  assert_eq!(body["resolutionNotes"][0]["author"], "Staff");
}

#[tokio::test]
async fn close_with_blank_note_leaves_complaint_open() {
  let app = app().await;
  let id = create(&app, "A", "Low").await;

  let (status, _) = send(
    &app,
    "POST",
    &format!("/complaints/{id}/close-with-note"),
    Some(json!({ "text": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, stored) = send(&app, "GET", &format!("/complaints/{id}"), None).await;
  assert_eq!(stored["status"], "Open");
}
