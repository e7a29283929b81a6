use chrono::Utc;
use sea_orm::sea_query::{
    Index, IndexCreateStatement, OnConflict, PostgresQueryBuilder, SqliteQueryBuilder,
};
use sea_orm::*;
use tracing::info;

use crate::entity::{api_key, tutorial, tutorial_tag};
use crate::utils::api_key::generate_api_key;

const BOOTSTRAP_KEY_NAME: &str = "bootstrap";

/// Ensure required database indexes exist.
///
/// Schema-sync only creates single-column unique indexes, so the listing
/// indexes are created here on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Public listings: WHERE status = 'published' ORDER BY published_at DESC
    let listing = Index::create()
        .if_not_exists()
        .name("idx_tutorial_status_published")
        .table(tutorial::Entity)
        .col(tutorial::Column::Status)
        .col(tutorial::Column::PublishedAt)
        .to_owned();

    // Topic filter and tag pages look links up by tag.
    let by_tag = Index::create()
        .if_not_exists()
        .name("idx_tutorial_tag_tag")
        .table(tutorial_tag::Entity)
        .col(tutorial_tag::Column::TagId)
        .to_owned();

    let by_category = Index::create()
        .if_not_exists()
        .name("idx_tutorial_category")
        .table(tutorial::Entity)
        .col(tutorial::Column::CategoryId)
        .to_owned();

    for (name, stmt) in [
        ("idx_tutorial_status_published", listing),
        ("idx_tutorial_tag_tag", by_tag),
        ("idx_tutorial_category", by_category),
    ] {
        let sql = index_sql(db.get_database_backend(), &stmt);
        match db.execute_unprepared(&sql).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}

fn index_sql(backend: DbBackend, stmt: &IndexCreateStatement) -> String {
    if backend == DbBackend::Sqlite {
        stmt.to_string(SqliteQueryBuilder)
    } else {
        stmt.to_string(PostgresQueryBuilder)
    }
}

/// Make sure at least one API key can write.
///
/// A configured bootstrap key is inserted, or re-activated if it already
/// exists. Without one, a key is generated and logged only when no active
/// key is present.
pub async fn ensure_api_key(
    db: &DatabaseConnection,
    bootstrap: Option<&str>,
) -> Result<(), DbErr> {
    if let Some(key) = bootstrap.map(str::trim).filter(|k| !k.is_empty()) {
        let model = api_key::ActiveModel {
            name: Set(BOOTSTRAP_KEY_NAME.to_string()),
            key: Set(key.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        api_key::Entity::insert(model)
            .on_conflict(
                OnConflict::column(api_key::Column::Key)
                    .update_column(api_key::Column::IsActive)
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        info!("Bootstrap API key is active");
        return Ok(());
    }

    let active = api_key::Entity::find()
        .filter(api_key::Column::IsActive.eq(true))
        .count(db)
        .await?;
    if active > 0 {
        return Ok(());
    }

    let key = generate_api_key();
    api_key::ActiveModel {
        name: Set(BOOTSTRAP_KEY_NAME.to_string()),
        key: Set(key.clone()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::warn!(
        key = %key,
        "No active API key found; generated one. Set auth.bootstrap_api_key to pin it"
    );
    Ok(())
}
