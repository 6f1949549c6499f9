//! Facet Aggregator
//!
//! Per-dimension value counts for the filter UI, computed with the
//! facet-exclusion pattern: a dimension's counts apply every active filter
//! except that dimension's own, so selecting a facet value never makes its
//! own count disappear and the UI can show "how many more results if I
//! also select X". All computation is read-only over the candidate
//! snapshot shared with the scoring engine.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::Candidate;
use crate::services::normalizer::{location_bucket, SearchQuery};
use crate::services::scoring::{passes_filters, FilterDimension};

/// Number of tag facets returned, most frequent first.
const TOP_TAGS: usize = 20;

/// Salary band edges (inclusive lower bound of each bucket after the first).
const SALARY_BANDS: [(i64, &str); 5] = [
    (0, "under_50k"),
    (50_000, "50k_100k"),
    (100_000, "100k_150k"),
    (150_000, "150k_200k"),
    (200_000, "200k_plus"),
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// Facet panel payload.
#[derive(Debug, Clone, Serialize)]
pub struct Facets {
    pub experience_levels: Vec<FacetCount>,
    pub remote_preferences: Vec<FacetCount>,
    pub availability: Vec<FacetCount>,
    pub locations: Vec<FacetCount>,
    pub tags: Vec<FacetCount>,
    pub salary_ranges: Vec<FacetCount>,
}

/// Compute every facet dimension over the candidate snapshot.
pub fn aggregate(query: &SearchQuery, candidates: &[Candidate]) -> Facets {
    Facets {
        experience_levels: count_dimension(query, candidates, FilterDimension::Experience, |c| {
            vec![c.profile.experience_level.as_str().to_string()]
        }),
        remote_preferences: count_dimension(query, candidates, FilterDimension::Remote, |c| {
            vec![c.profile.remote_preference.as_str().to_string()]
        }),
        availability: count_dimension(query, candidates, FilterDimension::Availability, |c| {
            vec![c.profile.availability.as_str().to_string()]
        }),
        locations: count_dimension(query, candidates, FilterDimension::Location, |c| {
            c.profile
                .location
                .as_deref()
                .map(location_bucket)
                .filter(|b| !b.is_empty())
                .into_iter()
                .collect()
        }),
        tags: {
            let mut tags =
                count_dimension(query, candidates, FilterDimension::Tags, |c| {
                    c.tags.iter().map(|t| t.name.clone()).collect()
                });
            tags.truncate(TOP_TAGS);
            tags
        },
        salary_ranges: count_dimension(query, candidates, FilterDimension::Salary, |c| {
            salary_band(&c.profile.salary_max.or(c.profile.salary_min))
                .into_iter()
                .collect()
        }),
    }
}

/// Count values of one dimension over candidates passing every *other*
/// filter. Output is sorted by count descending, then value ascending, so
/// facet panels render deterministically.
fn count_dimension<F>(
    query: &SearchQuery,
    candidates: &[Candidate],
    dimension: FilterDimension,
    values: F,
) -> Vec<FacetCount>
where
    F: Fn(&Candidate) -> Vec<String>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for candidate in candidates {
        if !passes_filters(candidate, query, Some(dimension)) {
            continue;
        }
        for value in values(candidate) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let mut out: Vec<FacetCount> = counts
        .into_iter()
        .map(|(value, count)| FacetCount { value, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    out
}

/// Bucket a salary figure into its display band. Candidates without any
/// salary data contribute to no band.
fn salary_band(salary: &Option<i64>) -> Option<String> {
    let amount = (*salary)?;
    let mut band = SALARY_BANDS[0].1;
    for (lower, name) in SALARY_BANDS {
        if amount >= lower {
            band = name;
        }
    }
    Some(band.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::CandidateBuilder;
    use crate::types::{ExperienceLevel, TagCategory};
    use uuid::Uuid;

    fn count_of(facet: &[FacetCount], value: &str) -> u64 {
        facet
            .iter()
            .find(|f| f.value == value)
            .map(|f| f.count)
            .unwrap_or(0)
    }

    fn sample() -> Vec<Candidate> {
        let esg = Uuid::new_v4();
        vec![
            CandidateBuilder::new("A")
                .level(ExperienceLevel::Senior)
                .location("London, UK")
                .salary(Some(90_000), Some(120_000))
                .tag(esg, "ESG", TagCategory::Skill)
                .build(),
            CandidateBuilder::new("B")
                .level(ExperienceLevel::Executive)
                .location("London")
                .salary(Some(150_000), Some(220_000))
                .build(),
            CandidateBuilder::new("C")
                .level(ExperienceLevel::Mid)
                .location("Berlin, DE")
                .salary(Some(60_000), Some(80_000))
                .build(),
        ]
    }

    #[test]
    fn counts_reflect_all_candidates_without_filters() {
        let facets = aggregate(&SearchQuery::default(), &sample());
        assert_eq!(count_of(&facets.experience_levels, "senior"), 1);
        assert_eq!(count_of(&facets.experience_levels, "executive"), 1);
        assert_eq!(count_of(&facets.locations, "london"), 2);
        assert_eq!(count_of(&facets.locations, "berlin"), 1);
        assert_eq!(count_of(&facets.salary_ranges, "100k_150k"), 1);
        assert_eq!(count_of(&facets.salary_ranges, "200k_plus"), 1);
        assert_eq!(count_of(&facets.tags, "ESG"), 1);
    }

    #[test]
    fn selecting_a_facet_value_does_not_zero_its_own_dimension() {
        let candidates = sample();
        let query = SearchQuery {
            experience_levels: vec![ExperienceLevel::Senior],
            ..Default::default()
        };
        let facets = aggregate(&query, &candidates);
        // The experience facet ignores the experience filter itself, so the
        // other bands remain visible with their "would add N results" counts.
        assert_eq!(count_of(&facets.experience_levels, "senior"), 1);
        assert_eq!(count_of(&facets.experience_levels, "executive"), 1);
        // Other dimensions DO apply the experience filter.
        assert_eq!(count_of(&facets.locations, "london"), 1);
        assert_eq!(count_of(&facets.locations, "berlin"), 0);
    }

    #[test]
    fn facet_exclusion_counts_are_monotone() {
        let candidates = sample();
        let unfiltered = aggregate(&SearchQuery::default(), &candidates);

        let query = SearchQuery {
            locations: vec!["london".to_string()],
            ..Default::default()
        };
        let filtered = aggregate(&query, &candidates);

        // Clearing a filter on D never lowers D's own counts, and shrinks
        // or preserves every other dimension's counts.
        for f in &filtered.experience_levels {
            assert!(count_of(&unfiltered.experience_levels, &f.value) >= f.count);
        }
        for f in &filtered.locations {
            assert!(count_of(&unfiltered.locations, &f.value) >= f.count);
        }
    }

    #[test]
    fn inactive_candidates_never_contribute() {
        let mut candidates = sample();
        candidates.push(CandidateBuilder::new("Gone").inactive().build());
        let facets = aggregate(&SearchQuery::default(), &candidates);
        let total: u64 = facets.experience_levels.iter().map(|f| f.count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn salary_bands_bucket_correctly() {
        assert_eq!(salary_band(&Some(30_000)).as_deref(), Some("under_50k"));
        assert_eq!(salary_band(&Some(50_000)).as_deref(), Some("50k_100k"));
        assert_eq!(salary_band(&Some(199_999)).as_deref(), Some("150k_200k"));
        assert_eq!(salary_band(&Some(200_000)).as_deref(), Some("200k_plus"));
        assert_eq!(salary_band(&None), None);
    }

    #[test]
    fn tag_facet_is_capped_and_sorted_by_count() {
        let shared = Uuid::new_v4();
        let mut candidates = Vec::new();
        for i in 0..3 {
            let mut b = CandidateBuilder::new(&format!("T{}", i))
                .tag(shared, "Governance", TagCategory::Skill);
            for j in 0..10 {
                b = b.tag(Uuid::new_v4(), &format!("Niche {}-{}", i, j), TagCategory::Skill);
            }
            candidates.push(b.build());
        }
        let facets = aggregate(&SearchQuery::default(), &candidates);
        assert_eq!(facets.tags.len(), TOP_TAGS);
        assert_eq!(facets.tags[0].value, "Governance");
        assert_eq!(facets.tags[0].count, 3);
    }
}
