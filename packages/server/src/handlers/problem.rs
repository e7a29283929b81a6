use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{Difficulty, tutorial, tutorial_tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::api_key::ApiKeyAuth;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::shared::Pagination;
use crate::models::tutorial::*;
use crate::models::{DataResponse, MessageResponse};
use crate::state::AppState;
use crate::utils::counts::{distinct_ids, refresh_category_counts, refresh_tag_counts};
use crate::utils::filter::{ProblemFilter, compose, published_difficulty_counts};
use crate::utils::tags::{sync_tutorial_tags, tag_ids_for};
use crate::utils::tutorial::{
    ensure_category_exists, ensure_slug_available, find_by_slug_for_update,
    find_published_by_slug, increment_views, load_detail, paginate_summaries,
    resolve_published_at,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "Problems",
    operation_id = "listProblems",
    summary = "List published problems",
    description = "Returns one page of published tutorials, newest first. All filters are optional and combine with AND. `difficulty`, `category` and `topic` take comma-separated lists; a tutorial matches `topic` if it carries any of the listed tags. Unknown category or topic slugs yield an empty page.",
    params(ProblemListQuery),
    responses(
        (status = 200, description = "Page of tutorials", body = ProblemListResponse),
        (status = 400, description = "Unknown difficulty value", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_problems(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProblemListQuery>,
) -> Result<Json<ProblemListResponse>, AppError> {
    let filter = ProblemFilter::from_query(&query)?;
    tracing::debug!(filtered = !filter.is_empty(), page = filter.page, "Listing problems");
    let per_page = Ord::max(state.config.listing.page_size, 1);

    let (data, pagination) = match compose(&state.db, &filter).await? {
        Some(cond) => {
            paginate_summaries(
                &state.db,
                tutorial::Entity::find().filter(cond),
                tutorial::Column::PublishedAt,
                filter.page,
                per_page,
            )
            .await?
        }
        None => (Vec::new(), Pagination::new(filter.page, per_page, 0)),
    };

    let difficulty_counts = published_difficulty_counts(&state.db).await?;

    Ok(Json(ProblemListResponse {
        data,
        pagination,
        difficulty_counts,
    }))
}

#[utoipa::path(
    get,
    path = "/{slug}",
    tag = "Problems",
    operation_id = "getProblem",
    summary = "Get a published problem by slug",
    description = "Returns the tutorial with its category and tags, then adds one to its view counter. The returned `views` is the value before this read.",
    params(("slug" = String, Path, description = "Tutorial slug")),
    responses(
        (status = 200, description = "Tutorial details", body = DataResponse<TutorialResponse>),
        (status = 404, description = "No published tutorial with this slug", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(slug = %slug))]
pub async fn get_problem(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<DataResponse<TutorialResponse>>, AppError> {
    let model = find_published_by_slug(&state.db, &slug).await?;
    let id = model.id;
    let detail = load_detail(&state.db, model).await?;

    if let Err(e) = increment_views(&state.db, id).await {
        tracing::warn!(tutorial_id = id, "Failed to increment views: {}", e);
    }

    Ok(Json(DataResponse::new(detail)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Problems",
    operation_id = "createProblem",
    summary = "Create a tutorial",
    description = "Creates a tutorial. `title` and `slug` are required. Publishing without `published_at` stamps the current time. `tag_ids`, when present, sets the tutorial's tags.",
    request_body = CreateTutorialRequest,
    responses(
        (status = 201, description = "Tutorial created", body = DataResponse<TutorialResponse>),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 409, description = "Slug already in use", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth, payload), fields(slug = ?payload.slug, key_id = auth.key_id))]
pub async fn create_problem(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTutorialRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (title, slug) = validate_create_tutorial(&payload)?;
    let examples = to_json(payload.examples.unwrap_or_default())?;
    let solutions = to_json(payload.solutions.unwrap_or_default())?;

    let txn = state.db.begin().await?;

    ensure_slug_available(&txn, &slug).await?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&txn, category_id).await?;
    }

    let now = Utc::now();
    let status = payload.status.unwrap_or_default();
    let model = tutorial::ActiveModel {
        title: Set(title),
        slug: Set(slug),
        description: Set(payload.description),
        category_id: Set(payload.category_id),
        difficulty: Set(payload.difficulty.unwrap_or(Difficulty::Medium)),
        problem_statement: Set(payload.problem_statement.unwrap_or_default()),
        input_format: Set(payload.input_format),
        output_format: Set(payload.output_format),
        constraints: Set(payload.constraints),
        examples: Set(examples),
        solutions: Set(solutions),
        approach: Set(payload.approach),
        time_complexity: Set(payload.time_complexity),
        space_complexity: Set(payload.space_complexity),
        featured_image_url: Set(payload.featured_image_url),
        views: Set(0),
        status: Set(status),
        published_at: Set(resolve_published_at(status, payload.published_at, now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let touched_tags = match payload.tag_ids {
        Some(ref ids) => sync_tutorial_tags(&txn, model.id, ids).await?,
        None => Vec::new(),
    };
    refresh_tag_counts(&txn, &touched_tags).await?;
    refresh_category_counts(&txn, &distinct_ids([model.category_id])).await?;

    let detail = load_detail(&txn, model).await?;
    txn.commit().await?;

    tracing::info!(tutorial_id = detail.id, "Tutorial created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(detail))))
}

#[utoipa::path(
    put,
    path = "/{slug}",
    tag = "Problems",
    operation_id = "updateProblem",
    summary = "Update a tutorial",
    description = "Partially updates a tutorial of any status. Only provided fields change; nullable fields accept `null`. `tag_ids`, when present, replaces the tag set in the same transaction.",
    params(("slug" = String, Path, description = "Tutorial slug")),
    request_body = UpdateTutorialRequest,
    responses(
        (status = 200, description = "Tutorial updated", body = DataResponse<TutorialResponse>),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "Tutorial not found", body = ErrorBody),
        (status = 409, description = "New slug already in use", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth, payload), fields(slug = %slug, key_id = auth.key_id))]
pub async fn update_problem(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<UpdateTutorialRequest>,
) -> Result<Json<DataResponse<TutorialResponse>>, AppError> {
    validate_update_tutorial(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_by_slug_for_update(&txn, &slug).await?;

    if payload == UpdateTutorialRequest::default() {
        let detail = load_detail(&txn, existing).await?;
        txn.commit().await?;
        return Ok(Json(DataResponse::new(detail)));
    }

    if let Some(ref new_slug) = payload.slug {
        let new_slug = new_slug.trim();
        if new_slug != existing.slug {
            ensure_slug_available(&txn, new_slug).await?;
        }
    }
    if let Some(Some(category_id)) = payload.category_id {
        ensure_category_exists(&txn, category_id).await?;
    }

    let old_category = existing.category_id;
    let status = payload.status.unwrap_or(existing.status);
    let published_at = match payload.published_at {
        Some(at) => at,
        None => existing.published_at,
    };

    let mut active: tutorial::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(ref new_slug) = payload.slug {
        active.slug = Set(new_slug.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(difficulty) = payload.difficulty {
        active.difficulty = Set(difficulty);
    }
    if let Some(statement) = payload.problem_statement {
        active.problem_statement = Set(statement);
    }
    if let Some(input_format) = payload.input_format {
        active.input_format = Set(input_format);
    }
    if let Some(output_format) = payload.output_format {
        active.output_format = Set(output_format);
    }
    if let Some(constraints) = payload.constraints {
        active.constraints = Set(constraints);
    }
    if let Some(examples) = payload.examples {
        active.examples = Set(to_json(examples)?);
    }
    if let Some(solutions) = payload.solutions {
        active.solutions = Set(to_json(solutions)?);
    }
    if let Some(approach) = payload.approach {
        active.approach = Set(approach);
    }
    if let Some(tc) = payload.time_complexity {
        active.time_complexity = Set(tc);
    }
    if let Some(sc) = payload.space_complexity {
        active.space_complexity = Set(sc);
    }
    if let Some(url) = payload.featured_image_url {
        active.featured_image_url = Set(url);
    }
    let now = Utc::now();
    active.status = Set(status);
    active.published_at = Set(resolve_published_at(status, published_at, now));
    active.updated_at = Set(now);

    let model = active.update(&txn).await?;

    let touched_tags = match payload.tag_ids {
        Some(ref ids) => sync_tutorial_tags(&txn, model.id, ids).await?,
        None => tag_ids_for(&txn, model.id).await?,
    };
    refresh_tag_counts(&txn, &touched_tags).await?;
    refresh_category_counts(&txn, &distinct_ids([old_category, model.category_id])).await?;

    let detail = load_detail(&txn, model).await?;
    txn.commit().await?;

    Ok(Json(DataResponse::new(detail)))
}

#[utoipa::path(
    delete,
    path = "/{slug}",
    tag = "Problems",
    operation_id = "deleteProblem",
    summary = "Delete a tutorial",
    description = "Deletes a tutorial of any status together with its tag links.",
    params(("slug" = String, Path, description = "Tutorial slug")),
    responses(
        (status = 200, description = "Tutorial deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "Tutorial not found", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth), fields(slug = %slug, key_id = auth.key_id))]
pub async fn delete_problem(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_by_slug_for_update(&txn, &slug).await?;
    let tag_ids = tag_ids_for(&txn, existing.id).await?;

    tutorial_tag::Entity::delete_many()
        .filter(tutorial_tag::Column::TutorialId.eq(existing.id))
        .exec(&txn)
        .await?;
    tutorial::Entity::delete_by_id(existing.id).exec(&txn).await?;

    refresh_tag_counts(&txn, &tag_ids).await?;
    refresh_category_counts(&txn, &distinct_ids([existing.category_id])).await?;

    txn.commit().await?;

    tracing::info!(tutorial_id = existing.id, "Tutorial deleted");
    Ok(Json(MessageResponse::deleted()))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}
