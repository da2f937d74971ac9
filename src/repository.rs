//! Record Repository
//!
//! Holds the normalized school records for the lifetime of the process and
//! provides the filtering, sorting and grouping primitives the aggregates and
//! the listing endpoint are built on.
//!
//! Records are loaded once and never mutated, so the repository is shared
//! behind an `Arc` and read concurrently without locking.

use crate::data::{self, RawSchool, SchoolRecord};
use crate::utils::transliteration::NameMatcher;
use anyhow::Result;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::path::Path;

/// Page size when the caller does not give one (API level)
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Page size of the paginated school list view
pub const LIST_VIEW_PAGE_LIMIT: usize = 25;

// ============================================================================
// Query parameters
// ============================================================================

/// Conjunctive record filter. Every `None` field is inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchoolFilter {
    /// Case- and script-insensitive substring of the school name
    pub name_contains: Option<String>,
    pub district: Option<String>,
    pub municipality: Option<String>,
    /// Inclusive lower bound on total points
    pub min_points: Option<f64>,
    /// Inclusive upper bound on total points
    pub max_points: Option<f64>,
}

/// Field a listing can be ordered by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    District,
    Municipality,
    TotalPoints,
    StudentsCount,
    FinishedStudents,
    VukovaDiploma,
    Grade6Avg,
    Grade7Avg,
    Grade8Avg,
    TotalGradeAvg,
    TestPointsAvg,
    Address,
    Website,
    Email,
    /// Not a record field; every record gets the key 0
    Unknown(String),
}

impl SortField {
    /// Blank names select the default field (total points)
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "" | "total_points" => SortField::TotalPoints,
            "id" => SortField::Id,
            "name" | "school_name" => SortField::Name,
            "district" | "district_name" => SortField::District,
            "municipality" | "municipality_name" => SortField::Municipality,
            "students_count" => SortField::StudentsCount,
            "finished_students" => SortField::FinishedStudents,
            "vukova_diploma" => SortField::VukovaDiploma,
            "grade_6_avg" => SortField::Grade6Avg,
            "grade_7_avg" => SortField::Grade7Avg,
            "grade_8_avg" => SortField::Grade8Avg,
            "total_grade_avg" => SortField::TotalGradeAvg,
            "test_points_avg" => SortField::TestPointsAvg,
            "address" => SortField::Address,
            "website" => SortField::Website,
            "email" => SortField::Email,
            other => SortField::Unknown(other.to_string()),
        }
    }

    /// Wire name, the inverse of `parse`
    pub fn as_str(&self) -> &str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::District => "district",
            SortField::Municipality => "municipality",
            SortField::TotalPoints => "total_points",
            SortField::StudentsCount => "students_count",
            SortField::FinishedStudents => "finished_students",
            SortField::VukovaDiploma => "vukova_diploma",
            SortField::Grade6Avg => "grade_6_avg",
            SortField::Grade7Avg => "grade_7_avg",
            SortField::Grade8Avg => "grade_8_avg",
            SortField::TotalGradeAvg => "total_grade_avg",
            SortField::TestPointsAvg => "test_points_avg",
            SortField::Address => "address",
            SortField::Website => "website",
            SortField::Email => "email",
            SortField::Unknown(name) => name,
        }
    }

    fn text_key<'a>(&self, record: &'a SchoolRecord) -> Option<&'a str> {
        match self {
            SortField::Name => Some(&record.name),
            SortField::District => Some(&record.district),
            SortField::Municipality => Some(&record.municipality),
            SortField::Address => Some(record.address.as_deref().unwrap_or("")),
            SortField::Website => Some(record.website.as_deref().unwrap_or("")),
            SortField::Email => Some(record.email.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    /// Numeric sort key; absent values and unknown fields read as 0
    fn numeric_key(&self, record: &SchoolRecord) -> f64 {
        match self {
            SortField::Id => f64::from(record.id),
            SortField::TotalPoints => record.total_points,
            SortField::StudentsCount => f64::from(record.students_count),
            SortField::FinishedStudents => f64::from(record.finished_students),
            SortField::VukovaDiploma => f64::from(record.vukova_diploma_count),
            SortField::Grade6Avg => record.grade6_avg.unwrap_or(0.0),
            SortField::Grade7Avg => record.grade7_avg.unwrap_or(0.0),
            SortField::Grade8Avg => record.grade8_avg.unwrap_or(0.0),
            SortField::TotalGradeAvg => record.total_grade_avg.unwrap_or(0.0),
            SortField::TestPointsAvg => record.test_points_avg.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Ascending comparison of two records on this field
    pub fn compare(&self, a: &SchoolRecord, b: &SchoolRecord) -> Ordering {
        match (self.text_key(a), self.text_key(b)) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => self.numeric_key(a).total_cmp(&self.numeric_key(b)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `asc` in any case is ascending, anything else descending
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::TotalPoints,
            order: SortOrder::Desc,
        }
    }
}

impl Sort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Ties compare `Equal` in both directions, so a stable sort keeps the
    /// original collection order for them.
    pub fn compare(&self, a: &SchoolRecord, b: &SchoolRecord) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Pagination window. The limit is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: usize,
    offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// A zero limit is not a valid page size and falls back to the default
    pub fn new(limit: usize, offset: usize) -> Self {
        let limit = if limit == 0 { DEFAULT_PAGE_LIMIT } else { limit };
        Self { limit, offset }
    }

    /// Zero-based page of the list view
    pub fn list_view(page_index: usize) -> Self {
        Self::new(
            LIST_VIEW_PAGE_LIMIT,
            page_index.saturating_mul(LIST_VIEW_PAGE_LIMIT),
        )
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether matches remain past this window
    pub fn has_more(&self, total_count: usize) -> bool {
        self.offset.saturating_add(self.limit) < total_count
    }
}

/// Complete listing request: filter + sort + window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchoolQuery {
    pub filter: SchoolFilter,
    pub sort: Sort,
    pub page: Page,
}

/// Listing parameters as they arrive over the wire (all optional strings).
///
/// Unparsable numbers, non-positive limits and negative offsets are treated as
/// absent instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSchoolsParams {
    pub school_name: Option<String>,
    pub district: Option<String>,
    pub municipality: Option<String>,
    pub min_points: Option<String>,
    pub max_points: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn parse_bound(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strictly positive integer, else `None`
pub fn parse_limit(value: Option<&str>) -> Option<usize> {
    value?
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

fn parse_offset(value: Option<&str>) -> Option<usize> {
    value?
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| usize::try_from(n).ok())
}

impl ListSchoolsParams {
    pub fn into_query(self) -> SchoolQuery {
        let filter = SchoolFilter {
            name_contains: non_empty(self.school_name),
            district: non_empty(self.district),
            municipality: non_empty(self.municipality),
            min_points: parse_bound(self.min_points.as_deref()),
            max_points: parse_bound(self.max_points.as_deref()),
        };

        let sort = Sort {
            field: self
                .sort_by
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(SortField::parse)
                .unwrap_or(SortField::TotalPoints),
            order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or(SortOrder::Desc),
        };

        let page = Page::new(
            parse_limit(self.limit.as_deref()).unwrap_or(DEFAULT_PAGE_LIMIT),
            parse_offset(self.offset.as_deref()).unwrap_or(0),
        );

        SchoolQuery { filter, sort, page }
    }

    /// Wire form of a typed query (used by the remote adapter)
    pub fn from_query(query: &SchoolQuery) -> Self {
        let filter = &query.filter;
        Self {
            school_name: filter.name_contains.clone(),
            district: filter.district.clone(),
            municipality: filter.municipality.clone(),
            min_points: filter.min_points.map(|v| v.to_string()),
            max_points: filter.max_points.map(|v| v.to_string()),
            sort_by: Some(query.sort.field.as_str().to_string()),
            sort_order: Some(query.sort.order.as_str().to_string()),
            limit: Some(query.page.limit().to_string()),
            offset: Some(query.page.offset().to_string()),
        }
    }

    /// Present, non-empty parameters as `(name, value)` pairs. Empty values
    /// are left out so they are never mistaken for an active filter.
    pub fn to_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("school_name", &self.school_name),
            ("district", &self.district),
            ("municipality", &self.municipality),
            ("min_points", &self.min_points),
            ("max_points", &self.max_points),
            ("sort_by", &self.sort_by),
            ("sort_order", &self.sort_order),
            ("limit", &self.limit),
            ("offset", &self.offset),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (name, v))
        })
        .collect()
    }
}

// ============================================================================
// Repository
// ============================================================================

/// One page of matching records plus the pre-pagination match count
#[derive(Debug)]
pub struct QueryPage<'a> {
    pub records: Vec<&'a SchoolRecord>,
    pub total_count: usize,
    pub page: Page,
}

impl QueryPage<'_> {
    pub fn has_more(&self) -> bool {
        self.page.has_more(self.total_count)
    }
}

/// Records sharing a district string, in first-appearance order
#[derive(Debug)]
pub struct DistrictGroup<'a> {
    pub name: &'a str,
    pub members: Vec<&'a SchoolRecord>,
}

pub struct SchoolRepository {
    records: Vec<SchoolRecord>,
    /// Lowercased names, parallel to `records`
    names_lower: Vec<String>,
    by_id: FxHashMap<u32, usize>,
}

impl SchoolRepository {
    /// Normalize raw rows. Schools without a graduating cohort are dropped
    /// silently; they take part in no query or aggregate.
    pub fn load(raw: Vec<RawSchool>) -> Self {
        Self::normalize(raw, 0)
    }

    /// Load untyped source rows. Rows that do not have the source shape are
    /// dropped along with the zero-cohort ones; loading itself never fails.
    pub fn load_rows(rows: Vec<Value>) -> Self {
        let row_count = rows.len();
        let raw: Vec<RawSchool> = rows
            .into_par_iter()
            .filter_map(data::raw_school_from_row)
            .collect();
        let malformed = row_count - raw.len();

        Self::normalize(raw, malformed)
    }

    fn normalize(raw: Vec<RawSchool>, malformed: usize) -> Self {
        let raw_count = raw.len();
        let records: Vec<SchoolRecord> = raw
            .into_par_iter()
            .filter_map(SchoolRecord::from_raw)
            .collect();

        tracing::info!(
            "Loaded {} schools ({} rows without an 8th-grade cohort, {} malformed rows dropped)",
            records.len(),
            raw_count - records.len(),
            malformed
        );

        Self::from_records(records)
    }

    /// Build from already-normalized records (zero-cohort records are still dropped)
    pub fn from_records(records: Vec<SchoolRecord>) -> Self {
        let records: Vec<SchoolRecord> = records
            .into_iter()
            .filter(|r| r.students_count > 0)
            .collect();

        let inconsistent = records.iter().filter(|r| r.has_inconsistent_counts()).count();
        if inconsistent > 0 {
            tracing::warn!(
                "{} schools report more finishers than students or more diplomas than finishers; kept as-is",
                inconsistent
            );
        }

        let names_lower = records.par_iter().map(|r| r.name.to_lowercase()).collect();

        let mut by_id = FxHashMap::default();
        for (idx, record) in records.iter().enumerate() {
            // first record wins on duplicate ids
            by_id.entry(record.id).or_insert(idx);
        }

        Self {
            records,
            names_lower,
            by_id,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::load_rows(data::parse_raw_rows(json)?))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading school dataset from {:?}", path);
        Ok(Self::load_rows(data::read_raw_rows(path)?))
    }

    /// The sample dataset compiled into the crate
    pub fn bundled() -> Result<Self> {
        tracing::info!("Loading bundled school dataset");
        Self::from_json_str(data::BUNDLED_DATASET)
    }

    pub fn records(&self) -> &[SchoolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&SchoolRecord> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    /// Indices of records passing every active filter, in collection order
    pub fn filter_indices(&self, filter: &SchoolFilter) -> Vec<usize> {
        let matcher = filter
            .name_contains
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(NameMatcher::new);

        self.records
            .iter()
            .enumerate()
            .filter(|(idx, record)| {
                if let Some(ref m) = matcher {
                    if !m.matches(&self.names_lower[*idx]) {
                        return false;
                    }
                }
                if let Some(ref d) = filter.district {
                    if &record.district != d {
                        return false;
                    }
                }
                if let Some(ref m) = filter.municipality {
                    if &record.municipality != m {
                        return false;
                    }
                }
                if let Some(min) = filter.min_points {
                    if record.total_points < min {
                        return false;
                    }
                }
                if let Some(max) = filter.max_points {
                    if record.total_points > max {
                        return false;
                    }
                }
                true
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Filter, stable-sort, then slice one page
    pub fn query(&self, filter: &SchoolFilter, sort: &Sort, page: Page) -> QueryPage<'_> {
        let page = Page::new(page.limit, page.offset);
        let mut matched = self.filter_indices(filter);
        matched.sort_by(|&a, &b| sort.compare(&self.records[a], &self.records[b]));

        let total_count = matched.len();
        let records = matched
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .map(|idx| &self.records[idx])
            .collect();

        QueryPage {
            records,
            total_count,
            page,
        }
    }

    /// All records, highest points first; ties keep collection order
    pub fn ranked_by_points(&self) -> Vec<&SchoolRecord> {
        let mut ranked: Vec<&SchoolRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));
        ranked
    }

    /// Group records by exact district string, groups in first-appearance order
    pub fn districts(&self) -> Vec<DistrictGroup<'_>> {
        let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
        let mut groups: Vec<DistrictGroup<'_>> = Vec::new();

        for record in &self.records {
            let pos = *positions.entry(record.district.as_str()).or_insert_with(|| {
                groups.push(DistrictGroup {
                    name: record.district.as_str(),
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[pos].members.push(record);
        }

        groups
    }
}
