use serde::{Deserialize, Serialize};

use super::category::CategoryResponse;
use super::shared::Pagination;
use super::tutorial::{DifficultyCounts, TutorialSummary};
use crate::entity::Difficulty;

/// Site-wide totals shown on the home page.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SiteTotals {
    pub tutorials: u64,
    pub categories: u64,
    pub tags: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HomeResponse {
    /// Most viewed published tutorials.
    pub popular: Vec<TutorialSummary>,
    /// Most recently published tutorials.
    pub recent: Vec<TutorialSummary>,
    pub categories: Vec<CategoryResponse>,
    pub totals: SiteTotals,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number. Missing or malformed values mean page 1.
    pub page: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LevelResponse {
    pub level: Difficulty,
    pub data: Vec<TutorialSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Text matched against title, description and problem statement.
    pub q: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub data: Vec<TutorialSummary>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminTutorialListQuery {
    /// Case-insensitive title search.
    pub search: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminTutorialListResponse {
    pub data: Vec<TutorialSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminStats {
    pub total_tutorials: u64,
    pub published_tutorials: u64,
    pub draft_tutorials: u64,
    pub total_categories: u64,
    pub total_tags: u64,
    pub total_views: i64,
    pub difficulty_counts: DifficultyCounts,
    /// Most recently created tutorials of any status.
    pub recent: Vec<TutorialSummary>,
}
