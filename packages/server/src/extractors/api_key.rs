use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::prelude::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entity::api_key;
use crate::error::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Caller authenticated by an active key in the `x-api-key` header.
///
/// Add this as a handler parameter to gate a write endpoint.
#[derive(Debug)]
pub struct ApiKeyAuth {
    pub key_id: i32,
}

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let record = api_key::Entity::find()
            .filter(api_key::Column::Key.eq(key))
            .filter(api_key::Column::IsActive.eq(true))
            .one(&state.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        touch_last_used(state.db.clone(), record.id);

        Ok(ApiKeyAuth { key_id: record.id })
    }
}

/// Record key usage without holding up the request.
fn touch_last_used(db: DatabaseConnection, key_id: i32) {
    tokio::spawn(async move {
        let result = api_key::Entity::update_many()
            .col_expr(api_key::Column::LastUsedAt, Expr::value(chrono::Utc::now()))
            .filter(api_key::Column::Id.eq(key_id))
            .exec(&db)
            .await;
        if let Err(e) = result {
            tracing::warn!(key_id, "Failed to update api key last_used_at: {}", e);
        }
    });
}
