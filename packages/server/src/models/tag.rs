use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{validate_name, validate_slug};
use super::tutorial::TutorialSummary;
use crate::entity::tag;
use crate::error::AppError;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateTagRequest {
    #[schema(example = "Two Pointers")]
    pub name: Option<String>,
    #[schema(example = "two-pointers")]
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub tutorial_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<tag::Model> for TagResponse {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            tutorial_count: m.tutorial_count,
            created_at: m.created_at,
        }
    }
}

/// A topic page: the tag and its published tutorials.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TagDetail {
    pub tag: TagResponse,
    pub tutorials: Vec<TutorialSummary>,
}

pub fn validate_create_tag(req: &CreateTagRequest) -> Result<(String, String), AppError> {
    let (Some(name), Some(slug)) = (
        req.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        req.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Missing required fields (name, slug)".into(),
        ));
    };
    validate_name(name, "Name")?;
    validate_slug(slug)?;
    Ok((name.to_string(), slug.to_string()))
}

pub fn validate_update_tag(req: &UpdateTagRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Name")?;
    }
    if let Some(ref slug) = req.slug {
        validate_slug(slug.trim())?;
    }
    Ok(())
}
