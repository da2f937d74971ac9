//! Remote-call adapter
//!
//! `RemoteSchools` implements the same `SchoolQueries` contract as the
//! in-memory backend by forwarding every operation to an engine behind the
//! REST surface in `api_server`. One operation is one GET request: optional
//! parameters travel as query parameters (absent or empty ones are left out),
//! the school id as a path segment.
//!
//! The wire itself sits behind `Transport`:
//! - `HttpTransport`: hyper client against a base URL
//! - `InProcessTransport`: drives an axum `Router` directly (tests, embedding)

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, Uri};
use axum::Router;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use std::future::Future;
use tower::ServiceExt;

use crate::error::{QueryError, QueryResult};
use crate::facade::SchoolQueries;
use crate::repository::{ListSchoolsParams, SchoolQuery};
use crate::types::{
    DistrictComparison, DistrictSummary, OverviewStats, SchoolDetail, SchoolPage, TopSchool,
};

/// Response bodies are small JSON documents; anything larger is refused
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Status + raw body of one GET
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

pub trait Transport: Send + Sync {
    /// Issue a GET for `path_and_query` (e.g. `/api/schools?limit=10`)
    fn get(&self, path_and_query: &str)
        -> impl Future<Output = QueryResult<TransportResponse>> + Send;
}

fn unavailable(err: impl std::fmt::Display) -> QueryError {
    QueryError::Unavailable(err.to_string())
}

// ============================================================================
// Transports
// ============================================================================

/// HTTP/1 transport to a remote engine
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client<HttpConnector, String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    async fn get(&self, path_and_query: &str) -> QueryResult<TransportResponse> {
        let uri: Uri = format!("{}{}", self.base_url, path_and_query)
            .parse()
            .map_err(unavailable)?;

        tracing::debug!("GET {}", uri);
        let request = Request::get(uri).body(String::new()).map_err(unavailable)?;
        let response = self.client.request(request).await.map_err(unavailable)?;

        let status = response.status();
        let incoming: hyper::body::Incoming = response.into_body();
        let body = axum::body::to_bytes(Body::new(incoming), MAX_BODY_BYTES)
            .await
            .map_err(unavailable)?;

        Ok(TransportResponse { status, body })
    }
}

/// Serves requests with an axum `Router` in the same process
#[derive(Clone)]
pub struct InProcessTransport {
    router: Router,
}

impl InProcessTransport {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

impl Transport for InProcessTransport {
    async fn get(&self, path_and_query: &str) -> QueryResult<TransportResponse> {
        let request = Request::get(path_and_query)
            .body(Body::empty())
            .map_err(unavailable)?;

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(unavailable)?;

        Ok(TransportResponse { status, body })
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// `path?k=v&...` with percent-encoded values; no `?` without parameters
fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let query: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect();

    format!("{}?{}", path, query.join("&"))
}

pub struct RemoteSchools<T> {
    transport: T,
}

impl<T: Transport> RemoteSchools<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    async fn fetch<R: DeserializeOwned>(&self, path_and_query: &str) -> QueryResult<R> {
        let response = self.transport.get(path_and_query).await?;

        if !response.status.is_success() {
            tracing::warn!("Remote engine answered {} for {}", response.status, path_and_query);
            return Err(QueryError::Unavailable(format!(
                "HTTP error! status: {}",
                response.status.as_u16()
            )));
        }

        serde_json::from_slice(&response.body).map_err(unavailable)
    }
}

impl<T: Transport> SchoolQueries for RemoteSchools<T> {
    async fn overview_stats(&self) -> QueryResult<OverviewStats> {
        self.fetch("/api/stats/overview").await
    }

    async fn districts(&self) -> QueryResult<Vec<DistrictSummary>> {
        self.fetch("/api/districts").await
    }

    async fn district_comparison(&self) -> QueryResult<Vec<DistrictComparison>> {
        self.fetch("/api/analysis/district-comparison").await
    }

    async fn list_schools(&self, query: SchoolQuery) -> QueryResult<SchoolPage> {
        let params = ListSchoolsParams::from_query(&query);
        let path = with_query("/api/schools", &params.to_pairs());
        self.fetch(&path).await
    }

    async fn school_detail(&self, id: u32) -> QueryResult<SchoolDetail> {
        let path = format!("/api/schools/{}", id);
        let response = self.transport.get(&path).await?;

        if response.status == StatusCode::NOT_FOUND {
            return Err(QueryError::NotFound(id));
        }
        if !response.status.is_success() {
            return Err(QueryError::Unavailable(format!(
                "HTTP error! status: {}",
                response.status.as_u16()
            )));
        }

        serde_json::from_slice(&response.body).map_err(unavailable)
    }

    async fn top_schools(&self, limit: Option<usize>) -> QueryResult<Vec<TopSchool>> {
        let limit = limit.filter(|&n| n > 0).map(|n| n.to_string());
        let params: Vec<(&str, &str)> = limit
            .as_deref()
            .map(|l| vec![("limit", l)])
            .unwrap_or_default();

        self.fetch(&with_query("/api/analysis/top-schools", &params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_encoding() {
        assert_eq!(with_query("/api/schools", &[]), "/api/schools");
        assert_eq!(
            with_query("/api/schools", &[("school_name", "Вук К"), ("limit", "10")]),
            "/api/schools?school_name=%D0%92%D1%83%D0%BA%20%D0%9A&limit=10"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let transport = HttpTransport::new("http://127.0.0.1:5000/");
        assert_eq!(transport.base_url(), "http://127.0.0.1:5000");
    }
}
