// Engine property tests over the bundled dataset
//
// Run with: cargo test --test engine_properties

use school_stats::{
    InMemorySchools, Page, QueryError, SchoolFilter, SchoolQueries, SchoolQuery,
    SchoolRepository, Sort, SortField, SortOrder,
};
use approx::assert_relative_eq;

fn schools() -> InMemorySchools {
    InMemorySchools::new(SchoolRepository::bundled().expect("bundled dataset must load"))
}

fn query(filter: SchoolFilter, sort: Sort, page: Page) -> SchoolQuery {
    SchoolQuery { filter, sort, page }
}

async fn listed_ids<Q: SchoolQueries>(schools: &Q, q: SchoolQuery) -> Vec<u32> {
    schools
        .list_schools(q)
        .await
        .unwrap()
        .schools
        .iter()
        .map(|s| s.id)
        .collect()
}

// =========================================================================
// Section 1: Loading
// =========================================================================

#[tokio::test]
async fn test_schools_without_cohort_never_appear() {
    let schools = schools();

    let page = schools.list_schools(SchoolQuery::default()).await.unwrap();
    assert_eq!(page.total_count, 12);
    assert!(page.schools.iter().all(|s| s.id != 4 && s.id != 10));

    let top = schools.top_schools(Some(100)).await.unwrap();
    assert_eq!(top.len(), 12);

    assert_eq!(schools.school_detail(4).await, Err(QueryError::NotFound(4)));
    assert_eq!(schools.school_detail(10).await, Err(QueryError::NotFound(10)));

    let overview = schools.overview_stats().await.unwrap();
    assert_eq!(overview.school_count, 12);
    assert_eq!(overview.student_count, 718);
}

// =========================================================================
// Section 2: Aggregates
// =========================================================================

#[tokio::test]
async fn test_overview_numbers() {
    let overview = schools().overview_stats().await.unwrap();
    // ascending points, element 12 / 2 = 6
    assert_relative_eq!(overview.median_points, 69.8, epsilon = 1e-9);
    assert_relative_eq!(overview.avg_points, 67.015, epsilon = 0.006);
    assert!(overview.std_points.unwrap() > 0.0);
}

#[tokio::test]
async fn test_district_counts_match_filtered_listing() {
    let schools = schools();
    let districts = schools.districts().await.unwrap();
    assert_eq!(districts.len(), 4);

    for district in &districts {
        let filter = SchoolFilter {
            district: Some(district.name.clone()),
            ..Default::default()
        };
        let page = schools
            .list_schools(query(filter, Sort::default(), Page::new(100, 0)))
            .await
            .unwrap();
        assert_eq!(page.total_count, district.school_count, "{}", district.name);

        let students: u64 = page.schools.iter().map(|s| u64::from(s.students_count)).sum();
        assert_eq!(students, district.total_students);
    }
}

#[tokio::test]
async fn test_districts_ordered_by_average() {
    let districts = schools().districts().await.unwrap();
    let names: Vec<&str> = districts.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Град Београд",
            "Златиборски управни округ",
            "Моравички управни округ",
            "Колубарски управни округ",
        ]
    );
    assert_relative_eq!(districts[0].avg_points, 74.09, epsilon = 1e-9);
    assert_eq!(districts[0].total_vukova, 63);
}

#[tokio::test]
async fn test_district_comparison_matches_summaries() {
    let schools = schools();
    let summaries = schools.districts().await.unwrap();
    let comparison = schools.district_comparison().await.unwrap();

    assert_eq!(summaries.len(), comparison.len());
    for (s, c) in summaries.iter().zip(&comparison) {
        assert_eq!(s.name, c.district);
        assert_eq!(s.avg_points, c.avg_points);
        assert_eq!(s.total_students, c.total_students);
        assert_eq!(s.total_vukova, c.total_vukova);
    }
}

#[tokio::test]
async fn test_detail_enrichment() {
    let schools = schools();

    let best = schools.school_detail(1).await.unwrap();
    // 11 of 12 schools score lower
    assert_relative_eq!(best.percentile, 91.7, epsilon = 1e-9);
    assert_relative_eq!(best.vukova_percentage, 25.0, epsilon = 1e-9);
    assert_eq!(best.grades.grade_6, Some(4.61));
    assert_eq!(best.test_points_avg, Some(22.1));

    let lowest = schools.school_detail(13).await.unwrap();
    assert_eq!(lowest.percentile, 0.0);

    // shared score 69.8: the tie is not counted as below
    let tied_a = schools.school_detail(3).await.unwrap();
    let tied_b = schools.school_detail(6).await.unwrap();
    assert_relative_eq!(tied_a.percentile, 50.0, epsilon = 1e-9);
    assert_eq!(tied_a.percentile, tied_b.percentile);

    let no_grades = schools.school_detail(11).await.unwrap();
    assert_eq!(no_grades.grades.total_avg, None);
    assert_eq!(no_grades.test_points_avg, None);
}

#[tokio::test]
async fn test_top_schools_default_and_limit() {
    let schools = schools();
    let top = schools.top_schools(None).await.unwrap();
    assert_eq!(top.len(), 10);
    assert_eq!(top[0].id, 1);
    assert!(top.windows(2).all(|w| w[0].total_points >= w[1].total_points));

    let top3: Vec<u32> = schools
        .top_schools(Some(3))
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(top3, vec![1, 2, 9]);
}

// =========================================================================
// Section 3: Listing
// =========================================================================

#[tokio::test]
async fn test_latin_search_finds_cyrillic_names() {
    let schools = schools();

    let by_name = |name: &str| SchoolFilter {
        name_contains: Some(name.to_string()),
        ..Default::default()
    };

    let ids = listed_ids(&schools, query(by_name("Cacak"), Sort::default(), Page::default())).await;
    assert_eq!(ids, vec![14]);

    let ids = listed_ids(&schools, query(by_name("karadžić"), Sort::default(), Page::default())).await;
    assert_eq!(ids, vec![1]);

    let ids = listed_ids(&schools, query(by_name("Sveti Sava"), Sort::default(), Page::default())).await;
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn test_consecutive_pages_partition_the_listing() {
    let schools = schools();
    let sort = Sort::new(SortField::TotalPoints, SortOrder::Desc);

    let first = listed_ids(&schools, query(SchoolFilter::default(), sort.clone(), Page::new(5, 0))).await;
    let second = listed_ids(&schools, query(SchoolFilter::default(), sort.clone(), Page::new(5, 5))).await;
    let both = listed_ids(&schools, query(SchoolFilter::default(), sort, Page::new(10, 0))).await;

    assert!(first.iter().all(|id| !second.contains(id)));
    let joined: Vec<u32> = first.into_iter().chain(second).collect();
    assert_eq!(joined, both);
}

#[tokio::test]
async fn test_has_more_flag() {
    let schools = schools();
    let page = schools
        .list_schools(query(SchoolFilter::default(), Sort::default(), Page::new(5, 5)))
        .await
        .unwrap();
    assert!(page.has_more);

    let page = schools
        .list_schools(query(SchoolFilter::default(), Sort::default(), Page::new(5, 10)))
        .await
        .unwrap();
    assert_eq!(page.schools.len(), 2);
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_toggled_sort_reverses_non_tied_elements() {
    let schools = schools();
    let repo = SchoolRepository::bundled().unwrap();
    let points_of = |id: u32| repo.get(id).unwrap().total_points;

    for field in [SortField::TotalPoints, SortField::Name, SortField::StudentsCount] {
        let asc = listed_ids(
            &schools,
            query(SchoolFilter::default(), Sort::new(field.clone(), SortOrder::Asc), Page::new(100, 0)),
        )
        .await;
        let desc = listed_ids(
            &schools,
            query(SchoolFilter::default(), Sort::new(field.clone(), SortOrder::Asc.toggled()), Page::new(100, 0)),
        )
        .await;

        if field == SortField::TotalPoints {
            // 3 and 6 share 69.8 and keep collection order both ways
            let pos = |list: &[u32], id: u32| list.iter().position(|&x| x == id).unwrap();
            for (i, &a) in asc.iter().enumerate() {
                for &b in &asc[i + 1..] {
                    if points_of(a) != points_of(b) {
                        assert!(pos(&desc, a) > pos(&desc, b));
                    }
                }
            }
            assert!(pos(&asc, 3) < pos(&asc, 6));
            assert!(pos(&desc, 3) < pos(&desc, 6));
        } else {
            let reversed: Vec<u32> = desc.into_iter().rev().collect();
            assert_eq!(asc, reversed, "{:?}", field);
        }
    }
}

#[tokio::test]
async fn test_points_bounds_are_inclusive() {
    let schools = schools();
    let filter = SchoolFilter {
        min_points: Some(69.8),
        max_points: Some(73.64),
        ..Default::default()
    };
    let sort = Sort::new(SortField::Id, SortOrder::Asc);
    let ids = listed_ids(&schools, query(filter, sort, Page::default())).await;
    assert_eq!(ids, vec![3, 5, 6, 9]);
}
