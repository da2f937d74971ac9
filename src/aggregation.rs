//! Aggregation Engine
//!
//! Overview statistics, district rollups, rankings and the percentile-enriched
//! school detail. Every operation is a pure function of the loaded records and
//! its arguments; nothing is cached between calls.
//!
//! Means and sums are always taken over unrounded values, and each reported
//! number is rounded exactly once on the way out.

use crate::data::SchoolRecord;
use crate::error::{QueryError, QueryResult};
use crate::repository::{DistrictGroup, SchoolRepository};
use crate::types::{
    Contact, DistrictComparison, DistrictSummary, GradeAverages, OverviewStats, SchoolDetail,
    TopSchool,
};
use crate::utils::rounding::{round1, round2, round2_opt};

/// Length of the top-list when the caller does not ask for one
pub const DEFAULT_TOP_SCHOOLS: usize = 10;

/// Unrounded district accumulator
struct DistrictTotals<'a> {
    name: &'a str,
    school_count: usize,
    total_students: u64,
    total_vukova: u64,
    mean_points: f64,
}

impl<'a> DistrictTotals<'a> {
    fn from_group(group: &DistrictGroup<'a>) -> Self {
        let school_count = group.members.len();
        let points_sum: f64 = group.members.iter().map(|r| r.total_points).sum();

        Self {
            name: group.name,
            school_count,
            total_students: group.members.iter().map(|r| u64::from(r.students_count)).sum(),
            total_vukova: group.members.iter().map(|r| u64::from(r.vukova_diploma_count)).sum(),
            mean_points: points_sum / school_count as f64,
        }
    }
}

pub struct StatsEngine<'a> {
    repo: &'a SchoolRepository,
}

impl<'a> StatsEngine<'a> {
    pub fn new(repo: &'a SchoolRepository) -> Self {
        Self { repo }
    }

    /// School/student counts plus mean, upper median and spread of total points
    pub fn overview_stats(&self) -> OverviewStats {
        let records = self.repo.records();
        let n = records.len();
        let student_count = records.iter().map(|r| u64::from(r.students_count)).sum();

        if n == 0 {
            return OverviewStats {
                school_count: 0,
                student_count,
                avg_points: 0.0,
                median_points: 0.0,
                std_points: None,
            };
        }

        let mut points: Vec<f64> = records.iter().map(|r| r.total_points).collect();
        points.sort_by(f64::total_cmp);

        let mean = points.iter().sum::<f64>() / n as f64;
        // Element n/2, not the averaged median
        let median = points[n / 2];

        let std = (n > 1).then(|| {
            let squares: f64 = points.iter().map(|p| (p - mean).powi(2)).sum();
            (squares / (n - 1) as f64).sqrt()
        });

        OverviewStats {
            school_count: n,
            student_count,
            avg_points: round2(mean),
            median_points: round2(median),
            std_points: std.map(round2),
        }
    }

    /// District totals, best average first. Ties keep first-appearance order.
    fn ranked_districts(&self) -> Vec<DistrictTotals<'a>> {
        let mut totals: Vec<DistrictTotals<'a>> = self
            .repo
            .districts()
            .iter()
            .map(DistrictTotals::from_group)
            .collect();

        totals.sort_by(|a, b| b.mean_points.total_cmp(&a.mean_points));
        totals
    }

    pub fn district_summaries(&self) -> Vec<DistrictSummary> {
        self.ranked_districts()
            .into_iter()
            .map(|d| DistrictSummary {
                name: d.name.to_string(),
                school_count: d.school_count,
                total_students: d.total_students,
                total_vukova: d.total_vukova,
                avg_points: round2(d.mean_points),
            })
            .collect()
    }

    pub fn district_comparison(&self) -> Vec<DistrictComparison> {
        self.ranked_districts()
            .into_iter()
            .map(|d| DistrictComparison {
                district: d.name.to_string(),
                avg_points: round2(d.mean_points),
                total_students: d.total_students,
                total_vukova: d.total_vukova,
            })
            .collect()
    }

    /// Highest-scoring `limit` schools; ties keep collection order
    pub fn top_schools(&self, limit: usize) -> Vec<TopSchool> {
        self.repo
            .ranked_by_points()
            .into_iter()
            .take(limit)
            .map(|r| TopSchool {
                id: r.id,
                name: r.name.clone(),
                municipality: r.municipality.clone(),
                total_points: round2(r.total_points),
                students_count: r.students_count,
            })
            .collect()
    }

    pub fn school_detail(&self, id: u32) -> QueryResult<SchoolDetail> {
        let school = self.repo.get(id).ok_or(QueryError::NotFound(id))?;

        Ok(SchoolDetail {
            id: school.id,
            name: school.name.clone(),
            district: school.district.clone(),
            municipality: school.municipality.clone(),
            total_points: round2(school.total_points),
            percentile: round1(self.percentile_of(school.total_points)),
            students_count: school.students_count,
            finished_students: school.finished_students,
            vukova_diploma: school.vukova_diploma_count,
            vukova_percentage: round1(vukova_percentage(school)),
            grades: GradeAverages {
                grade_6: round2_opt(school.grade6_avg),
                grade_7: round2_opt(school.grade7_avg),
                grade_8: round2_opt(school.grade8_avg),
                total_avg: round2_opt(school.total_grade_avg),
            },
            test_points_avg: round2_opt(school.test_points_avg),
            contact: Contact {
                address: school.address.clone(),
                website: school.website.clone(),
                email: school.email.clone(),
            },
        })
    }

    /// Percent of schools scoring strictly below `points` (ties not counted)
    fn percentile_of(&self, points: f64) -> f64 {
        let records = self.repo.records();
        if records.is_empty() {
            return 0.0;
        }
        let below = records.iter().filter(|r| r.total_points < points).count();
        below as f64 / records.len() as f64 * 100.0
    }
}

/// Diplomas per finisher in percent; no finishers reads as 0
fn vukova_percentage(school: &SchoolRecord) -> f64 {
    if school.finished_students == 0 {
        return 0.0;
    }
    f64::from(school.vukova_diploma_count) / f64::from(school.finished_students) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::record;
    use approx::assert_relative_eq;

    fn repo_with_points(points: &[f64]) -> SchoolRepository {
        SchoolRepository::from_records(
            points
                .iter()
                .enumerate()
                .map(|(i, &p)| record(i as u32 + 1, &format!("ОШ {}", i + 1), "Београд", p))
                .collect(),
        )
    }

    #[test]
    fn test_upper_median() {
        let repo = repo_with_points(&[40.0, 10.0, 30.0, 20.0]);
        let stats = StatsEngine::new(&repo).overview_stats();
        assert_relative_eq!(stats.median_points, 30.0);
        assert_relative_eq!(stats.avg_points, 25.0);
        assert_eq!(stats.school_count, 4);
        assert_eq!(stats.student_count, 80);
    }

    #[test]
    fn test_overview_rounding_and_spread() {
        let repo = repo_with_points(&[70.004, 70.0, 71.0]);
        let stats = StatsEngine::new(&repo).overview_stats();
        assert_relative_eq!(stats.avg_points, 70.33, epsilon = 1e-9);
        assert_relative_eq!(stats.median_points, 70.0, epsilon = 1e-9);
        // sample sd of [70, 70.004, 71] ≈ 0.5762
        assert_relative_eq!(stats.std_points.unwrap(), 0.58, epsilon = 1e-9);
    }

    #[test]
    fn test_overview_empty_and_single() {
        let repo = repo_with_points(&[]);
        let stats = StatsEngine::new(&repo).overview_stats();
        assert_eq!(stats.school_count, 0);
        assert_eq!(stats.avg_points, 0.0);
        assert_eq!(stats.std_points, None);

        let repo = repo_with_points(&[64.5]);
        let stats = StatsEngine::new(&repo).overview_stats();
        assert_relative_eq!(stats.median_points, 64.5);
        assert_eq!(stats.std_points, None);
    }

    #[test]
    fn test_percentile_strictly_below() {
        let repo = repo_with_points(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
        let engine = StatsEngine::new(&repo);
        assert_relative_eq!(engine.school_detail(1).unwrap().percentile, 0.0);
        // 5 of 6 below → 83.333.. → 83.3
        assert_relative_eq!(engine.school_detail(6).unwrap().percentile, 83.3, epsilon = 1e-9);

        let repo = repo_with_points(&[50.0, 50.0, 10.0]);
        let engine = StatsEngine::new(&repo);
        // equal scores are not counted as below
        assert_relative_eq!(engine.school_detail(1).unwrap().percentile, 33.3, epsilon = 1e-9);
    }

    #[test]
    fn test_vukova_percentage() {
        let mut school = record(1, "ОШ", "Београд", 60.0);
        school.finished_students = 0;
        school.vukova_diploma_count = 3;
        let mut other = record(2, "ОШ 2", "Београд", 60.0);
        other.finished_students = 57;
        other.vukova_diploma_count = 9;
        let repo = SchoolRepository::from_records(vec![school, other]);
        let engine = StatsEngine::new(&repo);

        assert_eq!(engine.school_detail(1).unwrap().vukova_percentage, 0.0);
        // 9 / 57 = 15.789..
        assert_relative_eq!(engine.school_detail(2).unwrap().vukova_percentage, 15.8, epsilon = 1e-9);
    }

    #[test]
    fn test_detail_not_found() {
        let repo = repo_with_points(&[10.0]);
        assert_eq!(
            StatsEngine::new(&repo).school_detail(404),
            Err(QueryError::NotFound(404))
        );
    }

    #[test]
    fn test_detail_rounds_optional_averages() {
        let mut school = record(1, "ОШ", "Београд", 71.4249);
        school.grade6_avg = Some(4.6123);
        school.test_points_avg = Some(22.1049);
        let repo = SchoolRepository::from_records(vec![school]);
        let detail = StatsEngine::new(&repo).school_detail(1).unwrap();
        assert_eq!(detail.total_points, 71.42);
        assert_eq!(detail.grades.grade_6, Some(4.61));
        assert_eq!(detail.grades.grade_7, None);
        assert_eq!(detail.test_points_avg, Some(22.1));
    }

    #[test]
    fn test_district_order_and_ties() {
        let repo = SchoolRepository::from_records(vec![
            record(1, "A", "Први", 60.0),
            record(2, "B", "Други", 80.0),
            record(3, "C", "Трећи", 60.0),
            record(4, "D", "Први", 60.0),
        ]);
        let summaries = StatsEngine::new(&repo).district_summaries();
        let names: Vec<&str> = summaries.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Други", "Први", "Трећи"]);
        assert_eq!(summaries[1].school_count, 2);
        assert_eq!(summaries[1].total_students, 40);
        assert_eq!(summaries[1].total_vukova, 4);
    }

    #[test]
    fn test_district_mean_rounded_once() {
        let repo = SchoolRepository::from_records(vec![
            record(1, "A", "Први", 70.005),
            record(2, "B", "Први", 70.005),
            record(3, "C", "Први", 70.0),
        ]);
        let comparison = StatsEngine::new(&repo).district_comparison();
        assert_eq!(comparison.len(), 1);
        // mean 70.00333.. → 70.0, not the mean of already-rounded values
        assert_relative_eq!(comparison[0].avg_points, 70.0, epsilon = 1e-9);
        assert_eq!(comparison[0].total_students, 60);
    }

    #[test]
    fn test_top_schools_truncates_stably() {
        let repo = repo_with_points(&[50.0, 90.0, 70.0, 90.0]);
        let top = StatsEngine::new(&repo).top_schools(3);
        let ids: Vec<u32> = top.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 4, 3]);
        assert_eq!(StatsEngine::new(&repo).top_schools(DEFAULT_TOP_SCHOOLS).len(), 4);
    }
}
