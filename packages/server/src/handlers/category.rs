use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{TutorialStatus, category, tutorial};
use crate::error::{AppError, ErrorBody};
use crate::extractors::api_key::ApiKeyAuth;
use crate::extractors::json::AppJson;
use crate::models::category::*;
use crate::models::tutorial::TutorialSummary;
use crate::models::{DataResponse, MessageResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    description = "Returns every category ordered by `display_order`, then name.",
    responses(
        (status = 200, description = "All categories", body = DataResponse<Vec<CategoryResponse>>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<CategoryResponse>>>, AppError> {
    let data = category::Entity::find()
        .order_by_asc(category::Column::DisplayOrder)
        .order_by_asc(category::Column::Name)
        .all(&state.db)
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(Json(DataResponse::new(data)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    operation_id = "getCategory",
    summary = "Get a category page by slug",
    description = "Returns the category whose slug is given in the path segment, with its published tutorials, newest first.",
    params(("id" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category with tutorials", body = DataResponse<CategoryDetail>),
        (status = 404, description = "Category not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(slug = %slug))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<DataResponse<CategoryDetail>>, AppError> {
    let model = category::Entity::find()
        .filter(category::Column::Slug.eq(slug.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category '{slug}' not found")))?;

    let tutorials = tutorial::Entity::find()
        .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
        .filter(tutorial::Column::CategoryId.eq(model.id))
        .order_by_desc(tutorial::Column::PublishedAt)
        .order_by_desc(tutorial::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|t| TutorialSummary::from((t, Some(model.clone()))))
        .collect();

    Ok(Json(DataResponse::new(CategoryDetail {
        category: model.into(),
        tutorials,
    })))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = DataResponse<CategoryResponse>),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 409, description = "Slug already in use", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth, payload), fields(slug = ?payload.slug, key_id = auth.key_id))]
pub async fn create_category(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (name, slug) = validate_create_category(&payload)?;
    ensure_slug_available(&state.db, &slug).await?;

    let now = Utc::now();
    let model = category::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description),
        icon: Set(payload.icon),
        display_order: Set(payload.display_order.unwrap_or(0)),
        tutorial_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(CategoryResponse::from(model))),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Update a category",
    description = "Partially updates a category. Only provided fields change.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = DataResponse<CategoryResponse>),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody),
        (status = 409, description = "New slug already in use", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth, payload), fields(key_id = auth.key_id))]
pub async fn update_category(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> Result<Json<DataResponse<CategoryResponse>>, AppError> {
    validate_update_category(&payload)?;

    let existing = find_category(&state.db, id).await?;
    if payload == UpdateCategoryRequest::default() {
        return Ok(Json(DataResponse::new(existing.into())));
    }

    if let Some(ref slug) = payload.slug {
        let slug = slug.trim();
        if slug != existing.slug {
            ensure_slug_available(&state.db, slug).await?;
        }
    }

    let mut active: category::ActiveModel = existing.into();
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref slug) = payload.slug {
        active.slug = Set(slug.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(icon) = payload.icon {
        active.icon = Set(icon);
    }
    if let Some(order) = payload.display_order {
        active.display_order = Set(order);
    }
    active.updated_at = Set(Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(DataResponse::new(model.into())))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category",
    description = "Deletes a category. Its tutorials are kept and become uncategorised.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth), fields(key_id = auth.key_id))]
pub async fn delete_category(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let txn = state.db.begin().await?;
    find_category(&txn, id).await?;

    let detached = tutorial::Entity::update_many()
        .col_expr(tutorial::Column::CategoryId, Expr::value(Option::<i32>::None))
        .filter(tutorial::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    category::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        category_id = id,
        detached = detached.rows_affected,
        "Category deleted"
    );
    Ok(Json(MessageResponse::deleted()))
}

async fn find_category<C: ConnectionTrait>(db: &C, id: i32) -> Result<category::Model, AppError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))
}

async fn ensure_slug_available<C: ConnectionTrait>(db: &C, slug: &str) -> Result<(), AppError> {
    let taken = category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict(format!(
            "Category slug '{slug}' already exists"
        )));
    }
    Ok(())
}
