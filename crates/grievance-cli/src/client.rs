//! Async HTTP client wrapping the Grievance JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use grievance_core::complaint::{Complaint, ComplaintInput, DetailsInput, Status};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

/// Connection settings for the Grievance API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Total tries for a listing, the first one included.
  pub attempts: u32,
  /// Delay before the first retry; doubled for each one after.
  pub backoff:  Duration,
}

/// Async HTTP client for the Grievance REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self.client.request(method, self.url(path))
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// `GET /complaints[?status=..][&category=..]`, retried with exponential
  /// backoff on connection failures and 5xx responses.
  pub async fn list(
    &self,
    status: Option<&str>,
    category: Option<&str>,
  ) -> Result<Vec<Complaint>> {
    let mut query = Vec::new();
    if let Some(s) = status {
      query.push(("status", s));
    }
    if let Some(c) = category {
      query.push(("category", c));
    }

    let mut attempt = 0;
    loop {
      attempt += 1;
      let outcome = self
        .request(Method::GET, "/complaints")
        .query(&query)
        .send()
        .await;

      let retryable = match &outcome {
        Ok(resp) => resp.status().is_server_error(),
        Err(e) => e.is_connect() || e.is_timeout(),
      };
      if !retryable || attempt >= self.config.attempts {
        let resp = outcome.context("GET /complaints failed")?;
        return decode("GET /complaints", resp).await;
      }

      let delay = backoff_delay(self.config.backoff, attempt - 1);
      tracing::warn!(attempt, ?delay, "listing failed, retrying");
      tokio::time::sleep(delay).await;
    }
  }

  /// `GET /complaints/:id`
  pub async fn get(&self, id: &str) -> Result<Complaint> {
    let path = format!("/complaints/{id}");
    let resp = self
      .request(Method::GET, &path)
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    decode(&format!("GET {path}"), resp).await
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// `POST /complaints`
  pub async fn create(&self, input: &ComplaintInput) -> Result<Complaint> {
    let resp = self
      .request(Method::POST, "/complaints")
      .json(input)
      .send()
      .await
      .context("POST /complaints failed")?;
    decode("POST /complaints", resp).await
  }

  /// `PUT /complaints/:id`
  pub async fn update(&self, id: &str, input: &DetailsInput) -> Result<Complaint> {
    self.send_json(Method::PUT, &format!("/complaints/{id}"), input).await
  }

  /// `PATCH /complaints/:id/status`
  pub async fn set_status(&self, id: &str, status: Status) -> Result<Complaint> {
    self
      .send_json(
        Method::PATCH,
        &format!("/complaints/{id}/status"),
        &json!({ "status": status }),
      )
      .await
  }

  /// `PATCH /complaints/:id/close-no-resolution`
  pub async fn close_no_resolution(&self, id: &str) -> Result<Complaint> {
    let path = format!("/complaints/{id}/close-no-resolution");
    let resp = self
      .request(Method::PATCH, &path)
      .send()
      .await
      .with_context(|| format!("PATCH {path} failed"))?;
    decode(&format!("PATCH {path}"), resp).await
  }

  /// `POST /complaints/:id/notes`
  pub async fn add_note(
    &self,
    id: &str,
    text: &str,
    author: Option<&str>,
  ) -> Result<Complaint> {
    self
      .send_json(
        Method::POST,
        &format!("/complaints/{id}/notes"),
        &json!({ "text": text, "author": author }),
      )
      .await
  }

  /// `POST /complaints/:id/close-with-note`
  pub async fn close_with_note(
    &self,
    id: &str,
    text: &str,
    author: Option<&str>,
  ) -> Result<Complaint> {
    self
      .send_json(
        Method::POST,
        &format!("/complaints/{id}/close-with-note"),
        &json!({ "text": text, "author": author }),
      )
      .await
  }

  async fn send_json(
    &self,
    method: Method,
    path: &str,
    body: &impl Serialize,
  ) -> Result<Complaint> {
    let label = format!("{method} {path}");
    let resp = self
      .request(method, path)
      .json(body)
      .send()
      .await
      .with_context(|| format!("{label} failed"))?;
    decode(&label, resp).await
  }
}

/// Deserialise a success body, or turn the server's `{"message"}` into an
/// error.
async fn decode<T: DeserializeOwned>(label: &str, resp: Response) -> Result<T> {
  let status = resp.status();
  if status.is_success() {
    return resp.json().await.with_context(|| format!("deserialising {label}"));
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
    .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_owned());
  Err(anyhow!("{label} → {}: {message}", status.as_u16()))
}

/// `base * 2^attempt`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
  base.saturating_mul(2u32.saturating_pow(attempt))
}
