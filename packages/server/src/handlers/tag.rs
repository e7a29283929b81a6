use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{TutorialStatus, category, tag, tutorial, tutorial_tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::api_key::ApiKeyAuth;
use crate::extractors::json::AppJson;
use crate::models::tag::*;
use crate::models::tutorial::TutorialSummary;
use crate::models::{DataResponse, MessageResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Tags",
    operation_id = "listTags",
    summary = "List tags",
    description = "Returns every tag, most used first.",
    responses(
        (status = 200, description = "All tags", body = DataResponse<Vec<TagResponse>>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<TagResponse>>>, AppError> {
    let data = tag::Entity::find()
        .order_by_desc(tag::Column::TutorialCount)
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();

    Ok(Json(DataResponse::new(data)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Tags",
    operation_id = "getTag",
    summary = "Get a topic page by slug",
    description = "Returns the tag whose slug is given in the path segment, with its published tutorials, newest first.",
    params(("id" = String, Path, description = "Tag slug")),
    responses(
        (status = 200, description = "Tag with tutorials", body = DataResponse<TagDetail>),
        (status = 404, description = "Tag not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(slug = %slug))]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<DataResponse<TagDetail>>, AppError> {
    let model = tag::Entity::find()
        .filter(tag::Column::Slug.eq(slug.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag '{slug}' not found")))?;

    let tutorials = tutorial::Entity::find()
        .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
        .filter(
            tutorial::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(tutorial_tag::Column::TutorialId)
                    .from(tutorial_tag::Entity)
                    .and_where(tutorial_tag::Column::TagId.eq(model.id))
                    .to_owned(),
            ),
        )
        .order_by_desc(tutorial::Column::PublishedAt)
        .order_by_desc(tutorial::Column::Id)
        .find_also_related(category::Entity)
        .all(&state.db)
        .await?
        .into_iter()
        .map(TutorialSummary::from)
        .collect();

    Ok(Json(DataResponse::new(TagDetail {
        tag: model.into(),
        tutorials,
    })))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Tags",
    operation_id = "createTag",
    summary = "Create a tag",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = DataResponse<TagResponse>),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 409, description = "Slug already in use", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth, payload), fields(slug = ?payload.slug, key_id = auth.key_id))]
pub async fn create_tag(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (name, slug) = validate_create_tag(&payload)?;
    ensure_slug_available(&state.db, &slug).await?;

    let model = tag::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        tutorial_count: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(TagResponse::from(model))),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Tags",
    operation_id = "updateTag",
    summary = "Update a tag",
    params(("id" = i32, Path, description = "Tag ID")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated", body = DataResponse<TagResponse>),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "Tag not found", body = ErrorBody),
        (status = 409, description = "New slug already in use", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth, payload), fields(key_id = auth.key_id))]
pub async fn update_tag(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTagRequest>,
) -> Result<Json<DataResponse<TagResponse>>, AppError> {
    validate_update_tag(&payload)?;

    let existing = find_tag(&state.db, id).await?;
    if payload == UpdateTagRequest::default() {
        return Ok(Json(DataResponse::new(existing.into())));
    }

    if let Some(ref slug) = payload.slug {
        let slug = slug.trim();
        if slug != existing.slug {
            ensure_slug_available(&state.db, slug).await?;
        }
    }

    let mut active: tag::ActiveModel = existing.into();
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref slug) = payload.slug {
        active.slug = Set(slug.trim().to_string());
    }

    let model = active.update(&state.db).await?;
    Ok(Json(DataResponse::new(model.into())))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Tags",
    operation_id = "deleteTag",
    summary = "Delete a tag",
    description = "Deletes a tag and detaches it from every tutorial.",
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 404, description = "Tag not found", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth), fields(key_id = auth.key_id))]
pub async fn delete_tag(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let txn = state.db.begin().await?;
    find_tag(&txn, id).await?;

    let unlinked = tutorial_tag::Entity::delete_many()
        .filter(tutorial_tag::Column::TagId.eq(id))
        .exec(&txn)
        .await?;
    tag::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        tag_id = id,
        unlinked = unlinked.rows_affected,
        "Tag deleted"
    );
    Ok(Json(MessageResponse::deleted()))
}

async fn find_tag<C: ConnectionTrait>(db: &C, id: i32) -> Result<tag::Model, AppError> {
    tag::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".into()))
}

async fn ensure_slug_available<C: ConnectionTrait>(db: &C, slug: &str) -> Result<(), AppError> {
    let taken = tag::Entity::find()
        .filter(tag::Column::Slug.eq(slug))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict(format!("Tag slug '{slug}' already exists")));
    }
    Ok(())
}
