//! Services Module
//!
//! Business logic of the search and unlock core:
//! - `normalizer`: raw filter input -> canonical bounded query
//! - `scoring`: hard filters, weighted relevance, deterministic ordering
//! - `facets`: per-dimension counts with the facet-exclusion pattern
//! - `unlock`: credit-gated access control and PII redaction

pub mod facets;
pub mod normalizer;
pub mod scoring;
pub mod unlock;

pub use normalizer::{RawSearchRequest, SearchQuery};
pub use scoring::{RankedHit, RankedPage};
pub use unlock::{CandidatePreview, UnlockOutcome, Viewer};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::db::{Candidate, CandidateProfile, CandidateTag};
    use crate::types::{Availability, ExperienceLevel, RemotePreference, TagCategory};

    /// Test candidate builder. Defaults: active, not anonymized, senior,
    /// flexible remote, immediately available, PII fields populated.
    pub struct CandidateBuilder {
        candidate: Candidate,
    }

    impl CandidateBuilder {
        pub fn new(title: &str) -> Self {
            let id = Uuid::new_v4();
            Self {
                candidate: Candidate {
                    profile: CandidateProfile {
                        id,
                        user_id: Uuid::new_v4(),
                        name: Some("Jane Doe".to_string()),
                        email: Some("jane@example.com".to_string()),
                        phone: Some("+44 20 0000 0000".to_string()),
                        linkedin_url: Some("https://linkedin.com/in/jane".to_string()),
                        github_url: None,
                        portfolio_url: None,
                        image_url: Some("https://cdn.example.com/jane.jpg".to_string()),
                        title: title.to_string(),
                        summary: Some("Seasoned board director.".to_string()),
                        experience_level: ExperienceLevel::Senior,
                        location: Some("London, UK".to_string()),
                        remote_preference: RemotePreference::Flexible,
                        availability: Availability::Immediate,
                        salary_min: Some(90_000),
                        salary_max: Some(140_000),
                        currency: Some("GBP".to_string()),
                        is_anonymized: false,
                        is_active: true,
                        updated_at: Utc::now(),
                    },
                    tags: Vec::new(),
                },
            }
        }

        pub fn id(mut self, id: Uuid) -> Self {
            self.candidate.profile.id = id;
            self
        }

        pub fn user_id(mut self, user_id: Uuid) -> Self {
            self.candidate.profile.user_id = user_id;
            self
        }

        pub fn anonymized(mut self) -> Self {
            self.candidate.profile.is_anonymized = true;
            self
        }

        pub fn inactive(mut self) -> Self {
            self.candidate.profile.is_active = false;
            self
        }

        pub fn level(mut self, level: ExperienceLevel) -> Self {
            self.candidate.profile.experience_level = level;
            self
        }

        pub fn remote(mut self, pref: RemotePreference) -> Self {
            self.candidate.profile.remote_preference = pref;
            self
        }

        pub fn availability(mut self, availability: Availability) -> Self {
            self.candidate.profile.availability = availability;
            self
        }

        pub fn location(mut self, location: &str) -> Self {
            self.candidate.profile.location = Some(location.to_string());
            self
        }

        pub fn salary(mut self, min: Option<i64>, max: Option<i64>) -> Self {
            self.candidate.profile.salary_min = min;
            self.candidate.profile.salary_max = max;
            self
        }

        pub fn summary(mut self, summary: &str) -> Self {
            self.candidate.profile.summary = Some(summary.to_string());
            self
        }

        pub fn updated_days_ago(mut self, days: i64) -> Self {
            self.candidate.profile.updated_at = Utc::now() - Duration::days(days);
            self
        }

        pub fn tag(mut self, tag_id: Uuid, name: &str, category: TagCategory) -> Self {
            self.candidate.tags.push(CandidateTag {
                candidate_id: self.candidate.profile.id,
                tag_id,
                name: name.to_string(),
                category,
                proficiency: None,
                years_experience: None,
                is_verified: false,
            });
            self
        }

        pub fn build(mut self) -> Candidate {
            // tag() may run before id(); keep associations pointed at the
            // final profile id.
            let id = self.candidate.profile.id;
            for tag in &mut self.candidate.tags {
                tag.candidate_id = id;
            }
            self.candidate
        }
    }
}
