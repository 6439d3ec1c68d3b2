//! Handlers for `/complaints` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/complaints` | Body: [`ComplaintInput`]; returns 201 + stored complaint |
//! | `GET`   | `/complaints` | Optional `?status=` and `?category=` equality filters |
//! | `GET`   | `/complaints/:id` | 404 if not found |
//! | `PUT`   | `/complaints/:id` | Body: [`DetailsInput`]; lifecycle fields are ignored |
//! | `PATCH` | `/complaints/:id/status` | Body: `{"status":"..."}` |
//! | `PATCH` | `/complaints/:id/close-no-resolution` | Idempotent |
//! | `POST`  | `/complaints/:id/notes` | Body: `{"text":"...","author":"..."}` |
//! | `POST`  | `/complaints/:id/close-with-note` | Body as for notes; one write |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use grievance_core::{
  complaint::{Complaint, ComplaintInput, DetailsInput},
  service::ComplaintService,
  store::ComplaintStore,
};
use serde::Deserialize;

use crate::{error::ApiError, extract::ApiJson};

type Service<S> = State<Arc<ComplaintService<S>>>;

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /complaints`: returns 201 + the stored [`Complaint`].
pub async fn create<S>(
  State(service): Service<S>,
  ApiJson(body): ApiJson<ComplaintInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore,
{
  let complaint = service.create(body).await.map_err(ApiError::write)?;
  Ok((StatusCode::CREATED, Json(complaint)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status:   Option<String>,
  pub category: Option<String>,
}

/// `GET /complaints[?status=<status>][&category=<category>]`
pub async fn list<S>(
  State(service): Service<S>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Complaint>>, ApiError>
where
  S: ComplaintStore,
{
  let complaints = service
    .list(params.status.as_deref(), params.category.as_deref())
    .await
    .map_err(ApiError::read)?;
  Ok(Json(complaints))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /complaints/:id`
pub async fn get_one<S>(
  State(service): Service<S>,
  Path(id): Path<String>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore,
{
  let complaint = service.get(&id).await.map_err(ApiError::read)?;
  Ok(Json(complaint))
}

// ─── Details ──────────────────────────────────────────────────────────────────

/// `PUT /complaints/:id`: partial update of the non-lifecycle fields.
pub async fn update_details<S>(
  State(service): Service<S>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<DetailsInput>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore,
{
  let complaint = service.update_details(&id, body).await.map_err(ApiError::write)?;
  Ok(Json(complaint))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `PATCH /complaints/:id/status`: body: `{"status":"Resolved"}`.
pub async fn transition<S>(
  State(service): Service<S>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore,
{
  let complaint = service
    .transition(&id, &body.status)
    .await
    .map_err(ApiError::write)?;
  Ok(Json(complaint))
}

/// `PATCH /complaints/:id/close-no-resolution`
pub async fn close_no_resolution<S>(
  State(service): Service<S>,
  Path(id): Path<String>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore,
{
  let complaint = service
    .close_without_resolution(&id)
    .await
    .map_err(ApiError::write)?;
  Ok(Json(complaint))
}

// ─── Notes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NoteBody {
  #[serde(default)]
  pub text:   Option<String>,
  #[serde(default)]
  pub author: Option<String>,
}

/// `POST /complaints/:id/notes`: body: `{"text":"...","author":"..."}`.
pub async fn add_note<S>(
  State(service): Service<S>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<NoteBody>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore,
{
  let complaint = service
    .append_note(&id, body.text.as_deref(), body.author.as_deref())
    .await
    .map_err(ApiError::write)?;
  Ok(Json(complaint))
}

/// `POST /complaints/:id/close-with-note`: close (unless already completed)
/// and append the note in one write.
pub async fn close_with_note<S>(
  State(service): Service<S>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<NoteBody>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore,
{
  let complaint = service
    .close_with_note(&id, body.text.as_deref(), body.author.as_deref())
    .await
    .map_err(ApiError::write)?;
  Ok(Json(complaint))
}
