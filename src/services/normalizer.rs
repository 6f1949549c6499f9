//! Query Normalizer
//!
//! Turns raw, untrusted filter input into a canonical, bounded
//! [`SearchQuery`] — or a structured validation failure listing every
//! invalid field at once, never just the first. All string input is
//! trimmed and length-capped here so downstream cost stays bounded.

use std::str::FromStr;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::FieldError;
use crate::types::{Availability, ExperienceLevel, RemotePreference, SortKey};

/// Page size bounds. Out-of-range values are clamped, not rejected.
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 50;
pub const DEFAULT_LIMIT: u32 = 10;

/// Tag list caps, applied after deduplication. Exceeding a cap is a
/// validation error, never a silent truncation.
pub const MAX_REQUIRED_TAGS: usize = 10;
pub const MAX_OPTIONAL_TAGS: usize = 10;
pub const MAX_EXCLUDED_TAGS: usize = 5;

pub const MAX_TEXT_LEN: usize = 500;
pub const MAX_LOCATION_LEN: usize = 100;

/// Raw filter input, exactly as the caller sent it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchRequest {
    /// Free-text query over title, summary and tag names.
    pub query: Option<String>,

    /// Tag ids (UUID strings). Required tags are hard filters despite the
    /// name: a candidate missing any of them is excluded outright.
    pub required_tags: Option<Vec<String>>,
    pub optional_tags: Option<Vec<String>>,
    pub excluded_tags: Option<Vec<String>>,

    pub experience_levels: Option<Vec<String>>,
    pub remote_preferences: Option<Vec<String>>,
    pub availability: Option<Vec<String>>,

    /// Free-text locations, bucketed for filtering.
    pub locations: Option<Vec<String>>,

    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,

    pub page: Option<u32>,
    pub limit: Option<u32>,

    pub sort: Option<String>,
}

/// Canonical, bounded search query. Ephemeral — never persisted.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub required_tags: Vec<Uuid>,
    pub optional_tags: Vec<Uuid>,
    pub excluded_tags: Vec<Uuid>,
    pub experience_levels: Vec<ExperienceLevel>,
    pub remote_preferences: Vec<RemotePreference>,
    pub availability: Vec<Availability>,
    /// Normalized location buckets.
    pub locations: Vec<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub page: u32,
    pub limit: u32,
    pub sort: SortKey,
}

/// Normalize a free-text location into its region bucket: lowercase,
/// whitespace-collapsed, primary segment only ("London, UK" -> "london").
pub fn location_bucket(raw: &str) -> String {
    let primary = raw.split(',').next().unwrap_or("");
    primary
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Validate and canonicalize raw filter input.
///
/// Every invalid field produces its own [`FieldError`]; the caller gets the
/// complete list in one response.
pub fn normalize(raw: &RawSearchRequest) -> Result<SearchQuery, Vec<FieldError>> {
    let mut errors = Vec::new();

    let text = match &raw.query {
        Some(q) => {
            let trimmed = q.trim();
            if trimmed.chars().count() > MAX_TEXT_LEN {
                errors.push(FieldError::new(
                    "query",
                    format!("must be at most {} characters", MAX_TEXT_LEN),
                ));
                None
            } else if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_lowercase())
            }
        }
        None => None,
    };

    let required_tags = parse_tag_list(
        raw.required_tags.as_deref(),
        "required_tags",
        MAX_REQUIRED_TAGS,
        &mut errors,
    );
    let optional_tags = parse_tag_list(
        raw.optional_tags.as_deref(),
        "optional_tags",
        MAX_OPTIONAL_TAGS,
        &mut errors,
    );
    let excluded_tags = parse_tag_list(
        raw.excluded_tags.as_deref(),
        "excluded_tags",
        MAX_EXCLUDED_TAGS,
        &mut errors,
    );

    let experience_levels = parse_enum_list::<ExperienceLevel>(
        raw.experience_levels.as_deref(),
        "experience_levels",
        &mut errors,
    );
    let remote_preferences = parse_enum_list::<RemotePreference>(
        raw.remote_preferences.as_deref(),
        "remote_preferences",
        &mut errors,
    );
    let availability =
        parse_enum_list::<Availability>(raw.availability.as_deref(), "availability", &mut errors);

    let mut locations = Vec::new();
    for loc in raw.locations.as_deref().unwrap_or_default() {
        let trimmed = loc.trim();
        if trimmed.chars().count() > MAX_LOCATION_LEN {
            errors.push(FieldError::new(
                "locations",
                format!("each location must be at most {} characters", MAX_LOCATION_LEN),
            ));
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        let bucket = location_bucket(trimmed);
        if !locations.contains(&bucket) {
            locations.push(bucket);
        }
    }

    if let Some(min) = raw.salary_min {
        if min < 0 {
            errors.push(FieldError::new("salary_min", "must not be negative"));
        }
    }
    if let Some(max) = raw.salary_max {
        if max < 0 {
            errors.push(FieldError::new("salary_max", "must not be negative"));
        }
    }
    if let (Some(min), Some(max)) = (raw.salary_min, raw.salary_max) {
        if min > max {
            errors.push(FieldError::new(
                "salary_min",
                "must not be greater than salary_max",
            ));
        }
    }

    let sort = match &raw.sort {
        Some(s) => match SortKey::from_str(s.trim()) {
            Ok(key) => key,
            Err(msg) => {
                errors.push(FieldError::new("sort", msg));
                SortKey::default()
            }
        },
        None => SortKey::default(),
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(SearchQuery {
        text,
        required_tags,
        optional_tags,
        excluded_tags,
        experience_levels,
        remote_preferences,
        availability,
        locations,
        salary_min: raw.salary_min,
        salary_max: raw.salary_max,
        page: raw.page.unwrap_or(1).max(1),
        limit: raw
            .limit
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(MIN_LIMIT, MAX_LIMIT),
        sort,
    })
}

/// Parse a tag-id list: dedupe preserving order, then enforce the cap.
fn parse_tag_list(
    raw: Option<&[String]>,
    field: &str,
    cap: usize,
    errors: &mut Vec<FieldError>,
) -> Vec<Uuid> {
    let mut out = Vec::new();
    for entry in raw.unwrap_or_default() {
        match Uuid::parse_str(entry.trim()) {
            Ok(id) => {
                if !out.contains(&id) {
                    out.push(id);
                }
            }
            Err(_) => {
                errors.push(FieldError::new(
                    field,
                    format!("'{}' is not a valid tag id", entry),
                ));
            }
        }
    }
    if out.len() > cap {
        errors.push(FieldError::new(
            field,
            format!("at most {} distinct tags allowed", cap),
        ));
    }
    out
}

fn parse_enum_list<T>(raw: Option<&[String]>, field: &str, errors: &mut Vec<FieldError>) -> Vec<T>
where
    T: FromStr<Err = String> + PartialEq,
{
    let mut out = Vec::new();
    for entry in raw.unwrap_or_default() {
        match T::from_str(entry.trim()) {
            Ok(value) => {
                if !out.contains(&value) {
                    out.push(value);
                }
            }
            Err(msg) => errors.push(FieldError::new(field, msg)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let query = normalize(&RawSearchRequest::default()).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.sort, SortKey::Relevance);
        assert!(query.text.is_none());
    }

    #[test]
    fn limit_and_page_are_clamped() {
        let raw = RawSearchRequest {
            limit: Some(500),
            page: Some(0),
            ..Default::default()
        };
        let query = normalize(&raw).unwrap();
        assert_eq!(query.limit, MAX_LIMIT);
        assert_eq!(query.page, 1);

        let raw = RawSearchRequest {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(normalize(&raw).unwrap().limit, MIN_LIMIT);
    }

    #[test]
    fn collects_every_error_not_just_the_first() {
        let raw = RawSearchRequest {
            query: Some("x".repeat(501)),
            experience_levels: Some(vec!["senior".into(), "principal".into()]),
            availability: Some(vec!["someday".into()]),
            salary_min: Some(200_000),
            salary_max: Some(100_000),
            sort: Some("best_match".into()),
            ..Default::default()
        };
        let errors = normalize(&raw).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"query"));
        assert!(fields.contains(&"experience_levels"));
        assert!(fields.contains(&"availability"));
        assert!(fields.contains(&"salary_min"));
        assert!(fields.contains(&"sort"));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn tag_lists_dedupe_then_cap() {
        let id = Uuid::new_v4().to_string();
        // 11 entries but only one distinct id: dedup brings it under cap.
        let raw = RawSearchRequest {
            required_tags: Some(vec![id.clone(); 11]),
            ..Default::default()
        };
        let query = normalize(&raw).unwrap();
        assert_eq!(query.required_tags.len(), 1);

        // 6 distinct excluded tags exceed the cap of 5: rejected.
        let raw = RawSearchRequest {
            excluded_tags: Some((0..6).map(|_| Uuid::new_v4().to_string()).collect()),
            ..Default::default()
        };
        let errors = normalize(&raw).unwrap_err();
        assert_eq!(errors[0].field, "excluded_tags");
    }

    #[test]
    fn invalid_tag_id_is_an_error() {
        let raw = RawSearchRequest {
            required_tags: Some(vec!["not-a-uuid".into()]),
            ..Default::default()
        };
        let errors = normalize(&raw).unwrap_err();
        assert_eq!(errors[0].field, "required_tags");
    }

    #[test]
    fn salary_inversion_rejected_only_when_both_given() {
        let raw = RawSearchRequest {
            salary_min: Some(150_000),
            ..Default::default()
        };
        assert!(normalize(&raw).is_ok());

        let raw = RawSearchRequest {
            salary_min: Some(150_000),
            salary_max: Some(100_000),
            ..Default::default()
        };
        assert!(normalize(&raw).is_err());
    }

    #[test]
    fn location_buckets_normalize_and_dedupe() {
        assert_eq!(location_bucket("  London,  UK "), "london");
        assert_eq!(location_bucket("New   York, NY"), "new york");

        let raw = RawSearchRequest {
            locations: Some(vec!["London, UK".into(), "  london ".into()]),
            ..Default::default()
        };
        let query = normalize(&raw).unwrap();
        assert_eq!(query.locations, vec!["london".to_string()]);
    }

    #[test]
    fn free_text_is_trimmed_and_lowercased() {
        let raw = RawSearchRequest {
            query: Some("  Digital Transformation  ".into()),
            ..Default::default()
        };
        let query = normalize(&raw).unwrap();
        assert_eq!(query.text.as_deref(), Some("digital transformation"));

        let raw = RawSearchRequest {
            query: Some("   ".into()),
            ..Default::default()
        };
        assert!(normalize(&raw).unwrap().text.is_none());
    }
}
