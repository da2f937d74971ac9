//! Query Façade
//!
//! `SchoolQueries` is the single contract presentation code talks to. It has
//! two interchangeable implementations chosen when the backend is built:
//! - `InMemorySchools`: runs the engine over a loaded `SchoolRepository`
//! - `remote::RemoteSchools` (feature `api`): forwards each call to a remote
//!   engine exposing the same operations over HTTP
//!
//! Callers are generic over the trait, so the backend choice never leaks into
//! call sites.

use crate::aggregation::{StatsEngine, DEFAULT_TOP_SCHOOLS};
use crate::error::QueryResult;
use crate::repository::{SchoolQuery, SchoolRepository};
use crate::types::{
    DistrictComparison, DistrictSummary, OverviewStats, SchoolDetail, SchoolPage, SchoolRow,
    TopSchool,
};
use std::future::Future;
use std::sync::Arc;

pub trait SchoolQueries: Send + Sync {
    fn overview_stats(&self) -> impl Future<Output = QueryResult<OverviewStats>> + Send;

    /// District rollups, best average first
    fn districts(&self) -> impl Future<Output = QueryResult<Vec<DistrictSummary>>> + Send;

    fn district_comparison(&self)
        -> impl Future<Output = QueryResult<Vec<DistrictComparison>>> + Send;

    /// Filtered, sorted, paginated listing
    fn list_schools(&self, query: SchoolQuery)
        -> impl Future<Output = QueryResult<SchoolPage>> + Send;

    /// Fails with `QueryError::NotFound` for an unknown id
    fn school_detail(&self, id: u32) -> impl Future<Output = QueryResult<SchoolDetail>> + Send;

    /// `None` means the default of 10
    fn top_schools(&self, limit: Option<usize>)
        -> impl Future<Output = QueryResult<Vec<TopSchool>>> + Send;
}

/// In-process backend over an immutable, shared record set
#[derive(Clone)]
pub struct InMemorySchools {
    repo: Arc<SchoolRepository>,
}

impl InMemorySchools {
    pub fn new(repo: SchoolRepository) -> Self {
        Self { repo: Arc::new(repo) }
    }

    pub fn from_shared(repo: Arc<SchoolRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &SchoolRepository {
        &self.repo
    }

    fn engine(&self) -> StatsEngine<'_> {
        StatsEngine::new(&self.repo)
    }

    /// Synchronous listing, shared by the async façade and the HTTP handler
    pub fn list_schools_now(&self, query: &SchoolQuery) -> SchoolPage {
        let page = self.repo.query(&query.filter, &query.sort, query.page);
        tracing::debug!(
            "listing: {} matches, returning {} from offset {}",
            page.total_count,
            page.records.len(),
            page.page.offset()
        );

        SchoolPage {
            has_more: page.has_more(),
            total_count: page.total_count,
            schools: page.records.into_iter().map(SchoolRow::from).collect(),
        }
    }
}

impl SchoolQueries for InMemorySchools {
    async fn overview_stats(&self) -> QueryResult<OverviewStats> {
        Ok(self.engine().overview_stats())
    }

    async fn districts(&self) -> QueryResult<Vec<DistrictSummary>> {
        Ok(self.engine().district_summaries())
    }

    async fn district_comparison(&self) -> QueryResult<Vec<DistrictComparison>> {
        Ok(self.engine().district_comparison())
    }

    async fn list_schools(&self, query: SchoolQuery) -> QueryResult<SchoolPage> {
        Ok(self.list_schools_now(&query))
    }

    async fn school_detail(&self, id: u32) -> QueryResult<SchoolDetail> {
        self.engine().school_detail(id)
    }

    async fn top_schools(&self, limit: Option<usize>) -> QueryResult<Vec<TopSchool>> {
        let limit = limit.filter(|&n| n > 0).unwrap_or(DEFAULT_TOP_SCHOOLS);
        Ok(self.engine().top_schools(limit))
    }
}
