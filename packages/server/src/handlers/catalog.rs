use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{Difficulty, TutorialStatus, category, tag, tutorial};
use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::models::DataResponse;
use crate::models::catalog::*;
use crate::models::category::CategoryResponse;
use crate::models::shared::parse_page;
use crate::models::tutorial::{DifficultyCounts, TutorialSummary};
use crate::state::AppState;
use crate::utils::filter::{published_difficulty_counts, text_search};
use crate::utils::tutorial::{paginate_summaries, top_published};

const HOME_POPULAR: u64 = 3;
const HOME_RECENT: u64 = 6;
const HOME_CATEGORIES: u64 = 8;
const SEARCH_LIMIT: u64 = 20;

#[utoipa::path(
    get,
    path = "/",
    tag = "Catalog",
    operation_id = "getHome",
    summary = "Home page content",
    description = "Most viewed and most recent published tutorials, the first categories by display order, and site totals.",
    responses(
        (status = 200, description = "Home page content", body = DataResponse<HomeResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn get_home(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<HomeResponse>>, AppError> {
    let popular = top_published(&state.db, tutorial::Column::Views, HOME_POPULAR).await?;
    let recent = top_published(&state.db, tutorial::Column::PublishedAt, HOME_RECENT).await?;

    let categories = category::Entity::find()
        .order_by_asc(category::Column::DisplayOrder)
        .order_by_asc(category::Column::Name)
        .limit(Some(HOME_CATEGORIES))
        .all(&state.db)
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    let totals = SiteTotals {
        tutorials: tutorial::Entity::find()
            .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
            .count(&state.db)
            .await?,
        categories: category::Entity::find().count(&state.db).await?,
        tags: tag::Entity::find().count(&state.db).await?,
    };

    Ok(Json(DataResponse::new(HomeResponse {
        popular,
        recent,
        categories,
        totals,
    })))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Catalog",
    operation_id = "listLevels",
    summary = "Published tutorial counts per difficulty",
    responses(
        (status = 200, description = "Counts per level", body = DataResponse<DifficultyCounts>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_levels(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<DifficultyCounts>>, AppError> {
    let counts = published_difficulty_counts(&state.db).await?;
    Ok(Json(DataResponse::new(counts)))
}

#[utoipa::path(
    get,
    path = "/{level}",
    tag = "Catalog",
    operation_id = "getLevel",
    summary = "Published tutorials of one difficulty",
    params(
        ("level" = String, Path, description = "easy, medium or hard"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "One page of tutorials", body = LevelResponse),
        (status = 404, description = "Unknown level", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(level = %level))]
pub async fn get_level(
    State(state): State<AppState>,
    Path(level): Path<String>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<LevelResponse>, AppError> {
    let difficulty: Difficulty = level
        .parse()
        .map_err(|_| AppError::NotFound(format!("Level '{level}' not found")))?;

    let select = tutorial::Entity::find()
        .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
        .filter(tutorial::Column::Difficulty.eq(difficulty));
    let (data, pagination) = paginate_summaries(
        &state.db,
        select,
        tutorial::Column::PublishedAt,
        parse_page(query.page.as_deref()),
        Ord::max(state.config.listing.page_size, 1),
    )
    .await?;

    Ok(Json(LevelResponse {
        level: difficulty,
        data,
        pagination,
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Catalog",
    operation_id = "search",
    summary = "Search published tutorials",
    description = "Case-insensitive substring match on title, description and problem statement. \
                   Most viewed first, at most 20 results. A blank query returns nothing.",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching tutorials", body = SearchResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn search(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Ok(Json(SearchResponse {
            query: String::new(),
            data: Vec::new(),
        }));
    }

    let data = tutorial::Entity::find()
        .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
        .filter(text_search(
            state.db.get_database_backend(),
            term,
            &[
                tutorial::Column::Title,
                tutorial::Column::Description,
                tutorial::Column::ProblemStatement,
            ],
        ))
        .order_by_desc(tutorial::Column::Views)
        .order_by_desc(tutorial::Column::Id)
        .find_also_related(category::Entity)
        .limit(Some(SEARCH_LIMIT))
        .all(&state.db)
        .await?
        .into_iter()
        .map(TutorialSummary::from)
        .collect();

    Ok(Json(SearchResponse {
        query: term.to_string(),
        data,
    }))
}
