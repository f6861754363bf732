//! pos-client
//!
//! The REST boundary to the order backend. Screens only see [`OrderApi`];
//! [`HttpOrderApi`] is the reqwest implementation and `pos-testkit` carries
//! an in-memory one for tests.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use pos_schemas::{AnalyticsReport, NewOrder, Order, OrderStatus, QueueStats};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Response bodies longer than this are cut in error messages.
const ERROR_BODY_LIMIT: usize = 512;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, timeout, or similar.
    Transport(String),
    /// The backend answered with a non-2xx status.
    Status { code: u16, body: String },
    /// A 2xx body that does not match the expected shape.
    Decode(String),
    /// The client could not be built (bad base URL, TLS setup).
    Config(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { code: 404, .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Status { code, body } if body.is_empty() => {
                write!(f, "backend returned http {code}")
            }
            ApiError::Status { code, body } => write!(f, "backend returned http {code}: {body}"),
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
            ApiError::Config(msg) => write!(f, "client config error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Every call the screens make against the backend.
///
/// Object-safe, so screens hold an `Arc<dyn OrderApi>`.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// `GET /api/orders`
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// `GET /api/queue-stats`
    async fn queue_stats(&self) -> Result<QueueStats, ApiError>;

    /// `PATCH /api/orders/{id}/status?status=<STATE>`
    async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<Order, ApiError>;

    /// `POST /api/orders`
    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError>;

    /// `GET /api/analytics`
    async fn analytics(&self) -> Result<AnalyticsReport, ApiError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpOrderApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpOrderApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base url must start with http:// or https://, got '{base_url}'"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        what: &'static str,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{what}: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("{what}: reading body: {e}")))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        debug!(call = what, status = status.as_u16(), bytes = body.len(), "backend call ok");
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{what}: {e}")))
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.send("list_orders", self.http.get(self.url("/api/orders")))
            .await
    }

    async fn queue_stats(&self) -> Result<QueueStats, ApiError> {
        self.send("queue_stats", self.http.get(self.url("/api/queue-stats")))
            .await
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<Order, ApiError> {
        let req = self
            .http
            .patch(self.url(&format!("/api/orders/{order_id}/status")))
            .query(&[("status", status.as_str())]);
        self.send("update_status", req).await
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let req = self.http.post(self.url("/api/orders")).json(order);
        self.send("create_order", req).await
    }

    async fn analytics(&self) -> Result<AnalyticsReport, ApiError> {
        self.send("analytics", self.http.get(self.url("/api/analytics")))
            .await
    }
}

fn truncate(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        return s.to_string();
    }
    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

// -----------------
// Tests (no network)
// -----------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base_url() {
        let err = HttpOrderApi::new("localhost:8000", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HttpOrderApi::new(" http://pos.local:8000/ ", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://pos.local:8000");
        assert_eq!(api.url("/api/orders"), "http://pos.local:8000/api/orders");
    }

    #[test]
    fn not_found_helper() {
        let e = ApiError::Status {
            code: 404,
            body: "{\"detail\":\"Order not found\"}".to_string(),
        };
        assert!(e.is_not_found());
        assert!(!ApiError::Transport("x".into()).is_not_found());
        assert_eq!(
            ApiError::Status { code: 500, body: String::new() }.to_string(),
            "backend returned http 500"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "₡".repeat(10);
        let cut = truncate(&s, 4);
        assert_eq!(cut, "₡…");
        assert_eq!(truncate("short", 10), "short");
    }
}
