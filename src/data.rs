//! Data Loading
//!
//! Raw school rows as published in the source JSON, and the normalized
//! `SchoolRecord` the engine works on.
//!
//! Source shape (one element per school):
//! `{ school_name, district_name, municipality_name, statistics: { id, eighthGradeStudentsCount, ... } }`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Sample dataset compiled into the crate, used when no data path is configured.
pub const BUNDLED_DATASET: &str = include_str!("../data/sample_schools.json");

/// One school exactly as it appears in the source file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSchool {
    pub school_name: String,
    pub district_name: String,
    pub municipality_name: String,
    pub statistics: RawStatistics,
}

/// Per-school statistics block (camelCase in the source)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatistics {
    pub id: u32,
    pub eighth_grade_students_count: Option<u32>,
    pub finished_school_students_count: Option<u32>,
    pub has_vukova_diploma_students_count: Option<u32>,
    pub total_points: Option<f64>,
    pub sixth_grade_average: Option<f64>,
    pub seventh_grade_average: Option<f64>,
    pub eighth_grade_average: Option<f64>,
    pub total_average_grade: Option<f64>,
    pub total_test_points_average: Option<f64>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
}

/// Normalized school record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolRecord {
    pub id: u32,
    pub name: String,
    pub district: String,
    pub municipality: String,
    pub total_points: f64,
    /// 8th-grade cohort size, always > 0 for loaded records
    pub students_count: u32,
    pub finished_students: u32,
    pub vukova_diploma_count: u32,
    pub grade6_avg: Option<f64>,
    pub grade7_avg: Option<f64>,
    pub grade8_avg: Option<f64>,
    pub total_grade_avg: Option<f64>,
    pub test_points_avg: Option<f64>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
}

impl SchoolRecord {
    /// Normalize a raw row. Returns `None` for schools without a graduating
    /// cohort (`eighthGradeStudentsCount` zero or missing).
    pub fn from_raw(raw: RawSchool) -> Option<Self> {
        let stats = raw.statistics;
        let students_count = stats.eighth_grade_students_count.filter(|&n| n > 0)?;

        Some(Self {
            id: stats.id,
            name: raw.school_name,
            district: raw.district_name,
            municipality: raw.municipality_name,
            total_points: stats.total_points.unwrap_or(0.0),
            students_count,
            finished_students: stats.finished_school_students_count.unwrap_or(0),
            vukova_diploma_count: stats.has_vukova_diploma_students_count.unwrap_or(0),
            grade6_avg: stats.sixth_grade_average,
            grade7_avg: stats.seventh_grade_average,
            grade8_avg: stats.eighth_grade_average,
            total_grade_avg: stats.total_average_grade,
            test_points_avg: stats.total_test_points_average,
            address: stats.address,
            website: stats.website,
            email: stats.email,
        })
    }

    /// Counts that contradict each other (more finishers than students, more
    /// diplomas than finishers). Tolerated, only reported.
    pub fn has_inconsistent_counts(&self) -> bool {
        self.finished_students > self.students_count
            || self.vukova_diploma_count > self.finished_students
    }
}

/// Parse the dataset into untyped rows. Only a document that is not a JSON
/// array fails; individual rows are checked later by `raw_school_from_row`.
pub fn parse_raw_rows(json: &str) -> Result<Vec<Value>> {
    serde_json::from_str(json).with_context(|| "Failed to parse school dataset JSON")
}

/// Read untyped rows from a JSON file
pub fn read_raw_rows(path: &Path) -> Result<Vec<Value>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read school dataset: {:?}", path))?;

    parse_raw_rows(&contents)
        .with_context(|| format!("Invalid school dataset: {:?}", path))
}

/// Typed view of one row; `None` when the row does not have the source shape
/// (negative counts, null names, missing statistics block, ...)
pub fn raw_school_from_row(row: Value) -> Option<RawSchool> {
    match serde_json::from_value(row) {
        Ok(raw) => Some(raw),
        Err(e) => {
            tracing::debug!("Skipping malformed school row: {}", e);
            None
        }
    }
}
