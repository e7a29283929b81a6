use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_name, validate_slug};
use super::tutorial::TutorialSummary;
use crate::entity::category;
use crate::error::AppError;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    #[schema(example = "Arrays & Strings")]
    pub name: Option<String>,
    #[schema(example = "arrays-strings")]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub icon: Option<Option<String>>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub tutorial_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            icon: m.icon,
            display_order: m.display_order,
            tutorial_count: m.tutorial_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A category page: the category and its published tutorials.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CategoryDetail {
    pub category: CategoryResponse,
    pub tutorials: Vec<TutorialSummary>,
}

pub fn validate_create_category(req: &CreateCategoryRequest) -> Result<(String, String), AppError> {
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

pub fn validate_update_category(req: &UpdateCategoryRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Name")?;
    }
    if let Some(ref slug) = req.slug {
        validate_slug(slug.trim())?;
    }
    Ok(())
}
