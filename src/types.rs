//! Response types shared by every backend.
//!
//! Field names on the wire are snake_case and match the school statistics
//! service (`total_schools`, `avg_points`, `has_more`, ...). All numbers here
//! are already rounded for presentation.

use crate::data::SchoolRecord;
use crate::utils::rounding::{round2, round2_opt};
use serde::{Deserialize, Serialize};

/// Dashboard headline numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    #[serde(rename = "total_schools")]
    pub school_count: usize,
    #[serde(rename = "total_students")]
    pub student_count: u64,
    pub avg_points: f64,
    /// Upper median: element `n / 2` of the ascending points
    pub median_points: f64,
    /// Sample standard deviation; `None` below two schools
    pub std_points: Option<f64>,
}

/// Per-district rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictSummary {
    pub name: String,
    pub school_count: usize,
    pub total_students: u64,
    pub total_vukova: u64,
    pub avg_points: f64,
}

/// Per-district totals for cross-district charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictComparison {
    pub district: String,
    pub avg_points: f64,
    pub total_students: u64,
    pub total_vukova: u64,
}

/// One row of the school listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolRow {
    pub id: u32,
    pub name: String,
    pub district: String,
    pub municipality: String,
    pub total_points: f64,
    pub students_count: u32,
    pub finished_students: u32,
    pub vukova_diploma: u32,
    pub grade_6_avg: Option<f64>,
    pub grade_7_avg: Option<f64>,
    pub grade_8_avg: Option<f64>,
    pub total_grade_avg: Option<f64>,
    pub test_points_avg: Option<f64>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
}

impl From<&SchoolRecord> for SchoolRow {
    fn from(record: &SchoolRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            district: record.district.clone(),
            municipality: record.municipality.clone(),
            total_points: round2(record.total_points),
            students_count: record.students_count,
            finished_students: record.finished_students,
            vukova_diploma: record.vukova_diploma_count,
            grade_6_avg: round2_opt(record.grade6_avg),
            grade_7_avg: round2_opt(record.grade7_avg),
            grade_8_avg: round2_opt(record.grade8_avg),
            total_grade_avg: round2_opt(record.total_grade_avg),
            test_points_avg: round2_opt(record.test_points_avg),
            address: record.address.clone(),
            website: record.website.clone(),
            email: record.email.clone(),
        }
    }
}

/// Paginated listing result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolPage {
    pub schools: Vec<SchoolRow>,
    /// Matches after filtering, before pagination
    pub total_count: usize,
    pub has_more: bool,
}

/// Top-list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSchool {
    pub id: u32,
    pub name: String,
    pub municipality: String,
    pub total_points: f64,
    pub students_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeAverages {
    pub grade_6: Option<f64>,
    pub grade_7: Option<f64>,
    pub grade_8: Option<f64>,
    pub total_avg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub address: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
}

/// Single school enriched with its standing among all schools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolDetail {
    pub id: u32,
    pub name: String,
    pub district: String,
    pub municipality: String,
    pub total_points: f64,
    /// Share of schools with strictly lower points, in percent (1 decimal)
    pub percentile: f64,
    pub students_count: u32,
    pub finished_students: u32,
    pub vukova_diploma: u32,
    /// Diplomas per finisher, in percent (1 decimal); 0 with no finishers
    pub vukova_percentage: f64,
    pub grades: GradeAverages,
    pub test_points_avg: Option<f64>,
    pub contact: Contact,
}
