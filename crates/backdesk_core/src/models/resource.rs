//! Typed row models for each admin screen, parameterizing the generic list
//! controller.
//!
//! Each admin screen is one instantiation of `ListController<R>`; the trait
//! carries the per-resource endpoint, filter vocabulary, and default ordering
//! so the screens cannot drift apart in behavior.

use crate::models::query::{SortDirection, SortSpec};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One managed resource type of the back office.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Collection path segment under the API base, e.g. `"media"`.
    const BASE_PATH: &'static str;
    /// Filter keys this screen exposes.
    const FILTER_KEYS: &'static [&'static str];
    /// Human-readable name used in messages.
    const DISPLAY_NAME: &'static str;

    fn id(&self) -> &str;
    /// Primary label shown in the list column.
    fn label(&self) -> &str;
    fn status(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;

    /// Initial sort for the screen, commonly newest first.
    fn default_sort() -> SortSpec {
        SortSpec::new("createdAt", SortDirection::Desc)
    }
}

/// Press/media article managed from the media screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaArticle {
    pub id: String,
    pub title: String,
    pub category: String,
    pub status: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Resource for MediaArticle {
    const BASE_PATH: &'static str = "media";
    const FILTER_KEYS: &'static [&'static str] = &["status", "category"];
    const DISPLAY_NAME: &'static str = "media article";

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.title
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Scientific publication entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub journal: String,
    pub category: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Resource for Publication {
    const BASE_PATH: &'static str = "publications";
    const FILTER_KEYS: &'static [&'static str] = &["status", "category"];
    const DISPLAY_NAME: &'static str = "publication";

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.title
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Open job posting on the careers screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub department: String,
    pub location: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Resource for JobPosting {
    const BASE_PATH: &'static str = "careers";
    const FILTER_KEYS: &'static [&'static str] = &["status", "department", "location"];
    const DISPLAY_NAME: &'static str = "job posting";

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.title
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Contact-form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Resource for ContactSubmission {
    const BASE_PATH: &'static str = "contacts";
    const FILTER_KEYS: &'static [&'static str] = &["status"];
    const DISPLAY_NAME: &'static str = "contact submission";

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.subject
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Application received for a job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: String,
    pub applicant_name: String,
    pub email: String,
    pub position: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Resource for JobApplication {
    const BASE_PATH: &'static str = "applications";
    const FILTER_KEYS: &'static [&'static str] = &["status", "position"];
    const DISPLAY_NAME: &'static str = "job application";

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.applicant_name
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Partner hospital listed on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalPartner {
    pub id: String,
    pub name: String,
    pub city: String,
    pub region: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Resource for HospitalPartner {
    const BASE_PATH: &'static str = "hospitals";
    const FILTER_KEYS: &'static [&'static str] = &["status", "city", "region"];
    const DISPLAY_NAME: &'static str = "hospital partner";

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Employee referral of a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeReferral {
    pub id: String,
    pub referrer_name: String,
    pub candidate_name: String,
    pub position: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Resource for EmployeeReferral {
    const BASE_PATH: &'static str = "referrals";
    const FILTER_KEYS: &'static [&'static str] = &["status", "position"];
    const DISPLAY_NAME: &'static str = "employee referral";

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.candidate_name
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_article_decodes_camel_case_payload() {
        let article: MediaArticle = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "title": "Trial results announced",
            "category": "press",
            "status": "published",
            "publishedAt": "2025-04-01T08:00:00Z",
            "createdAt": "2025-03-30T12:00:00Z"
        }))
        .expect("decode media article");
        assert_eq!(article.id(), "m1");
        assert_eq!(article.status(), "published");
        assert!(article.published_at.is_some());
    }

    #[test]
    fn default_sort_is_newest_first() {
        let sort = MediaArticle::default_sort();
        assert_eq!(sort.field, "createdAt");
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn filter_keys_always_include_status() {
        assert!(MediaArticle::FILTER_KEYS.contains(&"status"));
        assert!(Publication::FILTER_KEYS.contains(&"status"));
        assert!(JobPosting::FILTER_KEYS.contains(&"status"));
        assert!(ContactSubmission::FILTER_KEYS.contains(&"status"));
        assert!(JobApplication::FILTER_KEYS.contains(&"status"));
        assert!(HospitalPartner::FILTER_KEYS.contains(&"status"));
        assert!(EmployeeReferral::FILTER_KEYS.contains(&"status"));
    }
}
