use axum::Json;
use axum::extract::State;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{Difficulty, TutorialStatus, category, tag, tutorial};
use crate::error::{AppError, ErrorBody};
use crate::extractors::api_key::ApiKeyAuth;
use crate::extractors::query::AppQuery;
use crate::models::DataResponse;
use crate::models::catalog::*;
use crate::models::shared::{non_blank, parse_page};
use crate::models::tutorial::DifficultyCounts;
use crate::state::AppState;
use crate::utils::filter::text_search;
use crate::utils::tutorial::paginate_summaries;

const ADMIN_PAGE_SIZE: u64 = 10;
const RECENT_LIMIT: u64 = 5;

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Admin",
    operation_id = "getAdminStats",
    summary = "Dashboard statistics",
    description = "Totals across every tutorial regardless of status, plus the most recently created ones.",
    responses(
        (status = 200, description = "Dashboard statistics", body = DataResponse<AdminStats>),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth), fields(key_id = auth.key_id))]
pub async fn get_stats(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
) -> Result<Json<DataResponse<AdminStats>>, AppError> {
    let total_tutorials = tutorial::Entity::find().count(&state.db).await?;
    let published_tutorials = tutorial::Entity::find()
        .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
        .count(&state.db)
        .await?;

    let mut difficulty_counts = DifficultyCounts::default();
    for &difficulty in Difficulty::ALL {
        let n = tutorial::Entity::find()
            .filter(tutorial::Column::Difficulty.eq(difficulty))
            .count(&state.db)
            .await?;
        difficulty_counts.add(difficulty, n);
    }

    let total_views = tutorial::Entity::find()
        .select_only()
        .column_as(
            Expr::cust("CAST(COALESCE(SUM(\"views\"), 0) AS BIGINT)"),
            "total_views",
        )
        .into_tuple::<i64>()
        .one(&state.db)
        .await?
        .unwrap_or_default();

    let recent = tutorial::Entity::find()
        .order_by_desc(tutorial::Column::CreatedAt)
        .order_by_desc(tutorial::Column::Id)
        .find_also_related(category::Entity)
        .limit(Some(RECENT_LIMIT))
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(DataResponse::new(AdminStats {
        total_tutorials,
        published_tutorials,
        draft_tutorials: total_tutorials.saturating_sub(published_tutorials),
        total_categories: category::Entity::find().count(&state.db).await?,
        total_tags: tag::Entity::find().count(&state.db).await?,
        total_views,
        difficulty_counts,
        recent,
    })))
}

#[utoipa::path(
    get,
    path = "/problems",
    tag = "Admin",
    operation_id = "listAdminProblems",
    summary = "List all tutorials",
    description = "Every tutorial including drafts, newest created first, 10 per page. \
                   `search` matches titles case-insensitively.",
    params(AdminTutorialListQuery),
    responses(
        (status = 200, description = "One page of tutorials", body = AdminTutorialListResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
    ),
    security(("api_key" = [])),
)]
#[instrument(skip(state, auth, query), fields(key_id = auth.key_id))]
pub async fn list_problems(
    auth: ApiKeyAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AdminTutorialListQuery>,
) -> Result<Json<AdminTutorialListResponse>, AppError> {
    let mut select = tutorial::Entity::find();
    if let Some(term) = non_blank(query.search.as_deref()) {
        select = select.filter(text_search(
            state.db.get_database_backend(),
            &term,
            &[tutorial::Column::Title],
        ));
    }

    let (data, pagination) = paginate_summaries(
        &state.db,
        select,
        tutorial::Column::CreatedAt,
        parse_page(query.page.as_deref()),
        ADMIN_PAGE_SIZE,
    )
    .await?;

    Ok(Json(AdminTutorialListResponse { data, pagination }))
}
