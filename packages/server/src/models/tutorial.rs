use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::CategoryResponse;
use super::shared::{Pagination, double_option, validate_ids, validate_name, validate_slug};
use super::tag::TagResponse;
use crate::entity::{Difficulty, TutorialStatus, category, tutorial};
use crate::error::AppError;

/// Upper bound on tags attached to a single tutorial.
pub const MAX_TAGS_PER_TUTORIAL: usize = 50;

/// One worked example from the problem statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Reference solution in one programming language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Solution {
    pub code: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "O(n)")]
    pub time_complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "O(1)")]
    pub space_complexity: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateTutorialRequest {
    #[schema(example = "Two Sum")]
    pub title: Option<String>,
    #[schema(example = "two-sum")]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    /// Defaults to `medium`.
    pub difficulty: Option<Difficulty>,
    pub problem_statement: Option<String>,
    pub input_format: Option<String>,
    pub output_format: Option<String>,
    pub constraints: Option<String>,
    pub examples: Option<Vec<Example>>,
    /// Keyed by language name, e.g. `python`, `cpp`.
    pub solutions: Option<BTreeMap<String, Solution>>,
    pub approach: Option<String>,
    pub time_complexity: Option<String>,
    pub space_complexity: Option<String>,
    pub featured_image_url: Option<String>,
    /// Defaults to `draft`.
    pub status: Option<TutorialStatus>,
    pub published_at: Option<DateTime<Utc>>,
    /// Complete tag set for the new tutorial.
    pub tag_ids: Option<Vec<i32>>,
}

/// Partial update. Absent fields are left untouched; nullable fields accept `null`.
#[derive(Debug, Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateTutorialRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub category_id: Option<Option<i32>>,
    pub difficulty: Option<Difficulty>,
    pub problem_statement: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub input_format: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub output_format: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub constraints: Option<Option<String>>,
    pub examples: Option<Vec<Example>>,
    pub solutions: Option<BTreeMap<String, Solution>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub approach: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub time_complexity: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub space_complexity: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub featured_image_url: Option<Option<String>>,
    pub status: Option<TutorialStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub published_at: Option<Option<DateTime<Utc>>>,
    /// Replaces the tutorial's tag set when present.
    pub tag_ids: Option<Vec<i32>>,
}

/// Query parameters accepted by the problem listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProblemListQuery {
    /// Case-insensitive substring matched against title and description.
    pub q: Option<String>,
    /// Comma-separated difficulty levels, e.g. `easy,medium`.
    pub difficulty: Option<String>,
    /// Comma-separated category slugs.
    pub category: Option<String>,
    /// Comma-separated tag slugs; a tutorial matches if it has any of them.
    pub topic: Option<String>,
    /// 1-based page number. Missing or malformed values mean page 1.
    pub page: Option<String>,
}

/// Tutorial as shown in listings. Long-form content is omitted.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TutorialSummary {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub status: TutorialStatus,
    pub views: i64,
    pub category: Option<CategoryResponse>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<(tutorial::Model, Option<category::Model>)> for TutorialSummary {
    fn from((t, c): (tutorial::Model, Option<category::Model>)) -> Self {
        Self {
            id: t.id,
            title: t.title,
            slug: t.slug,
            description: t.description,
            difficulty: t.difficulty,
            status: t.status,
            views: t.views,
            category: c.map(Into::into),
            published_at: t.published_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Full tutorial with its category and tags.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TutorialResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub category: Option<CategoryResponse>,
    pub difficulty: Difficulty,
    pub problem_statement: String,
    pub input_format: Option<String>,
    pub output_format: Option<String>,
    pub constraints: Option<String>,
    #[schema(value_type = Vec<Example>)]
    pub examples: serde_json::Value,
    #[schema(value_type = BTreeMap<String, Solution>)]
    pub solutions: serde_json::Value,
    pub approach: Option<String>,
    pub time_complexity: Option<String>,
    pub space_complexity: Option<String>,
    pub featured_image_url: Option<String>,
    pub views: i64,
    pub status: TutorialStatus,
    pub tags: Vec<TagResponse>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TutorialResponse {
    pub fn new(t: tutorial::Model, category: Option<category::Model>, tags: Vec<TagResponse>) -> Self {
        Self {
            id: t.id,
            title: t.title,
            slug: t.slug,
            description: t.description,
            category_id: t.category_id,
            category: category.map(Into::into),
            difficulty: t.difficulty,
            problem_statement: t.problem_statement,
            input_format: t.input_format,
            output_format: t.output_format,
            constraints: t.constraints,
            examples: t.examples,
            solutions: t.solutions,
            approach: t.approach,
            time_complexity: t.time_complexity,
            space_complexity: t.space_complexity,
            featured_image_url: t.featured_image_url,
            views: t.views,
            status: t.status,
            tags,
            published_at: t.published_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Number of published tutorials at each difficulty level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct DifficultyCounts {
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
}

impl DifficultyCounts {
    pub fn add(&mut self, difficulty: Difficulty, count: u64) {
        match difficulty {
            Difficulty::Easy => self.easy += count,
            Difficulty::Medium => self.medium += count,
            Difficulty::Hard => self.hard += count,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProblemListResponse {
    pub data: Vec<TutorialSummary>,
    pub pagination: Pagination,
    pub difficulty_counts: DifficultyCounts,
}

pub fn validate_create_tutorial(req: &CreateTutorialRequest) -> Result<(String, String), AppError> {
    let (Some(title), Some(slug)) = (
        req.title.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Missing required fields (title, slug)".into(),
        ));
    };
    validate_name(title, "Title")?;
    validate_slug(slug)?;
    if let Some(ref ids) = req.tag_ids {
        validate_ids(ids, "tag", MAX_TAGS_PER_TUTORIAL)?;
    }
    Ok((title.to_string(), slug.to_string()))
}

pub fn validate_update_tutorial(req: &UpdateTutorialRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_name(title, "Title")?;
    }
    if let Some(ref slug) = req.slug {
        validate_slug(slug.trim())?;
    }
    if let Some(ref ids) = req.tag_ids {
        validate_ids(ids, "tag", MAX_TAGS_PER_TUTORIAL)?;
    }
    Ok(())
}
