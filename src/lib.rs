//! School Statistics Engine
//!
//! Overview statistics, district rollups, rankings and filtered listings over
//! the Serbian primary-school dataset (final-exam points, Vukova diplomas,
//! grade averages).
//!
//! Module layout:
//! - `utils/`: Latin → Cyrillic transliteration and presentation rounding
//! - `data`: source rows and the normalized `SchoolRecord`
//! - `repository`: filter / sort / paginate / group primitives
//! - `aggregation`: overview, districts, top-list, school detail
//! - `facade`: the `SchoolQueries` contract and its in-memory backend
//! - `api_server`, `remote` (feature `api`): REST surface and remote backend

pub mod utils;
pub mod data;
pub mod error;
pub mod types;
pub mod repository;
pub mod aggregation;
pub mod facade;
pub mod config;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod remote;

// Re-export commonly used types
pub use aggregation::StatsEngine;
pub use config::{Backend, ServiceConfig};
pub use data::{RawSchool, SchoolRecord};
pub use error::{QueryError, QueryResult};
pub use facade::{InMemorySchools, SchoolQueries};
pub use repository::{
    ListSchoolsParams, Page, SchoolFilter, SchoolQuery, SchoolRepository, Sort, SortField,
    SortOrder,
};
pub use types::*;

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
#[cfg(feature = "api")]
pub use remote::{HttpTransport, InProcessTransport, RemoteSchools, Transport};
