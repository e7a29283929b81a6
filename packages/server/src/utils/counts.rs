use sea_orm::prelude::Expr;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;

use crate::entity::{TutorialStatus, category, tag, tutorial, tutorial_tag};

/// Recompute `tag.tutorial_count` (published tutorials only) for the given tags.
pub async fn refresh_tag_counts<C: ConnectionTrait>(db: &C, tag_ids: &[i32]) -> Result<(), DbErr> {
    for &tag_id in tag_ids {
        let count = tutorial::Entity::find()
            .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
            .filter(
                tutorial::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(tutorial_tag::Column::TutorialId)
                        .from(tutorial_tag::Entity)
                        .and_where(tutorial_tag::Column::TagId.eq(tag_id))
                        .to_owned(),
                ),
            )
            .count(db)
            .await?;

        tag::Entity::update_many()
            .col_expr(tag::Column::TutorialCount, Expr::value(saturating_i32(count)))
            .filter(tag::Column::Id.eq(tag_id))
            .exec(db)
            .await?;
    }
    Ok(())
}

/// Recompute `category.tutorial_count` (published tutorials only) for the given categories.
pub async fn refresh_category_counts<C: ConnectionTrait>(
    db: &C,
    category_ids: &[i32],
) -> Result<(), DbErr> {
    for &category_id in category_ids {
        let count = tutorial::Entity::find()
            .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
            .filter(tutorial::Column::CategoryId.eq(category_id))
            .count(db)
            .await?;

        category::Entity::update_many()
            .col_expr(
                category::Column::TutorialCount,
                Expr::value(saturating_i32(count)),
            )
            .filter(category::Column::Id.eq(category_id))
            .exec(db)
            .await?;
    }
    Ok(())
}

fn saturating_i32(n: u64) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Collect the distinct, present ids from a list of optional ids.
pub fn distinct_ids(ids: impl IntoIterator<Item = Option<i32>>) -> Vec<i32> {
    let mut out: Vec<i32> = ids.into_iter().flatten().collect();
    out.sort_unstable();
    out.dedup();
    out
}
