use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::ExprTrait;
use sea_orm::*;

use crate::entity::{TutorialStatus, category, tag, tutorial};
use crate::error::AppError;
use crate::models::shared::Pagination;
use crate::models::tag::TagResponse;
use crate::models::tutorial::{TutorialResponse, TutorialSummary};
use crate::utils::tags::tag_ids_for;

/// Find a tutorial by slug and lock its row for the rest of the transaction.
pub async fn find_by_slug_for_update(
    txn: &DatabaseTransaction,
    slug: &str,
) -> Result<tutorial::Model, AppError> {
    use sea_orm::sea_query::LockType;
    tutorial::Entity::find()
        .filter(tutorial::Column::Slug.eq(slug))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tutorial '{slug}' not found")))
}

/// Fail with a conflict if another tutorial already uses `slug`.
pub async fn ensure_slug_available<C: ConnectionTrait>(db: &C, slug: &str) -> Result<(), AppError> {
    let taken = tutorial::Entity::find()
        .filter(tutorial::Column::Slug.eq(slug))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict(format!(
            "Tutorial slug '{slug}' already exists"
        )));
    }
    Ok(())
}

/// Publish time after a write: an explicit value wins, and a published
/// tutorial without one is stamped with `now`.
pub fn resolve_published_at(
    status: TutorialStatus,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (status, published_at) {
        (TutorialStatus::Published, None) => Some(now),
        (_, at) => at,
    }
}

/// Find a published tutorial by slug. Drafts are reported as not found.
pub async fn find_published_by_slug<C: ConnectionTrait>(
    db: &C,
    slug: &str,
) -> Result<tutorial::Model, AppError> {
    tutorial::Entity::find()
        .filter(tutorial::Column::Slug.eq(slug))
        .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tutorial '{slug}' not found")))
}

/// Fail with a validation error unless `category_id` names an existing category.
pub async fn ensure_category_exists<C: ConnectionTrait>(
    db: &C,
    category_id: i32,
) -> Result<(), AppError> {
    let found = category::Entity::find_by_id(category_id).count(db).await?;
    if found == 0 {
        return Err(AppError::Validation(format!(
            "Unknown category id: {category_id}"
        )));
    }
    Ok(())
}

/// Attach category and tags to a tutorial.
pub async fn load_detail<C: ConnectionTrait>(
    db: &C,
    model: tutorial::Model,
) -> Result<TutorialResponse, AppError> {
    let category = match model.category_id {
        Some(id) => category::Entity::find_by_id(id).one(db).await?,
        None => None,
    };

    let tag_ids = tag_ids_for(db, model.id).await?;
    let tags = if tag_ids.is_empty() {
        Vec::new()
    } else {
        tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids))
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(TagResponse::from)
            .collect()
    };

    Ok(TutorialResponse::new(model, category, tags))
}

/// Fetch one page of `select` with categories joined.
///
/// `select` must already carry its filters but no ordering; results are
/// ordered by `order` then id, both descending, so pages never overlap.
pub async fn paginate_summaries<C: ConnectionTrait>(
    db: &C,
    select: Select<tutorial::Entity>,
    order: tutorial::Column,
    page: u64,
    per_page: u64,
) -> Result<(Vec<TutorialSummary>, Pagination), DbErr> {
    let total = select.clone().paginate(db, per_page).num_items().await?;

    let data = select
        .order_by_desc(order)
        .order_by_desc(tutorial::Column::Id)
        .find_also_related(category::Entity)
        .offset(Some(Pagination::offset(page, per_page)))
        .limit(Some(per_page))
        .all(db)
        .await?
        .into_iter()
        .map(TutorialSummary::from)
        .collect();

    Ok((data, Pagination::new(page, per_page, total)))
}

/// Fetch up to `limit` published tutorials ordered by `order` descending.
pub async fn top_published<C: ConnectionTrait>(
    db: &C,
    order: tutorial::Column,
    limit: u64,
) -> Result<Vec<TutorialSummary>, DbErr> {
    Ok(tutorial::Entity::find()
        .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
        .order_by_desc(order)
        .order_by_desc(tutorial::Column::Id)
        .find_also_related(category::Entity)
        .limit(Some(limit))
        .all(db)
        .await?
        .into_iter()
        .map(TutorialSummary::from)
        .collect())
}

/// Add one to a tutorial's view counter in a single statement.
pub async fn increment_views<C: ConnectionTrait>(db: &C, tutorial_id: i32) -> Result<(), DbErr> {
    tutorial::Entity::update_many()
        .col_expr(
            tutorial::Column::Views,
            Expr::col(tutorial::Column::Views).add(1),
        )
        .filter(tutorial::Column::Id.eq(tutorial_id))
        .exec(db)
        .await?;
    Ok(())
}
