//! Problem listing filters.
//!
//! Each dimension (search text, difficulty, category, topic) is optional and
//! independent. Active dimensions are AND-ed together and restricted to
//! published tutorials. A dimension whose slugs match nothing forces the whole
//! result empty instead of being ignored.

use std::collections::BTreeSet;

use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;

use crate::entity::{Difficulty, TutorialStatus, category, tag, tutorial, tutorial_tag};
use crate::error::AppError;
use crate::models::shared::{escape_like, parse_page};
use crate::models::tutorial::{DifficultyCounts, ProblemListQuery};

/// Parsed listing request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProblemFilter {
    pub search: Option<String>,
    pub difficulties: Vec<Difficulty>,
    pub category_slugs: Vec<String>,
    pub topic_slugs: Vec<String>,
    pub page: u64,
}

impl ProblemFilter {
    pub fn from_query(query: &ProblemListQuery) -> Result<Self, AppError> {
        let difficulties = split_list(query.difficulty.as_deref())
            .iter()
            .map(|d| d.parse::<Difficulty>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| AppError::Validation(e.to_string()))?
            .into_iter()
            .collect();

        Ok(Self {
            search: query
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            difficulties,
            category_slugs: split_list(query.category.as_deref()),
            topic_slugs: split_list(query.topic.as_deref()),
            page: parse_page(query.page.as_deref()),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.difficulties.is_empty()
            && self.category_slugs.is_empty()
            && self.topic_slugs.is_empty()
    }
}

/// Split a comma-separated query value into trimmed, de-duplicated entries.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Lowercase `term` the way the backend's `LOWER()` does. SQLite only folds
/// ASCII letters.
pub fn fold_case(backend: DbBackend, term: &str) -> String {
    match backend {
        DbBackend::Sqlite => term.to_ascii_lowercase(),
        _ => term.to_lowercase(),
    }
}

/// Case-insensitive substring match on any of `columns`.
pub fn text_search(backend: DbBackend, term: &str, columns: &[tutorial::Column]) -> Condition {
    let pattern = format!("%{}%", fold_case(backend, &escape_like(term)));
    columns.iter().fold(Condition::any(), |cond, &col| {
        cond.add(
            Expr::expr(Func::lower(Expr::col((tutorial::Entity, col))))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

/// Resolve the filter into a single condition over `tutorial`.
///
/// Returns `None` when a topic or category dimension matched nothing, which
/// means the listing is empty regardless of the other dimensions.
pub async fn compose<C: ConnectionTrait>(
    db: &C,
    filter: &ProblemFilter,
) -> Result<Option<Condition>, DbErr> {
    let mut cond =
        Condition::all().add(tutorial::Column::Status.eq(TutorialStatus::Published));

    if !filter.topic_slugs.is_empty() {
        let tag_ids: Vec<i32> = tag::Entity::find()
            .filter(tag::Column::Slug.is_in(filter.topic_slugs.clone()))
            .select_only()
            .column(tag::Column::Id)
            .into_tuple::<i32>()
            .all(db)
            .await?;
        if tag_ids.is_empty() {
            return Ok(None);
        }

        let tutorial_ids: BTreeSet<i32> = tutorial_tag::Entity::find()
            .filter(tutorial_tag::Column::TagId.is_in(tag_ids))
            .select_only()
            .column(tutorial_tag::Column::TutorialId)
            .into_tuple::<i32>()
            .all(db)
            .await?
            .into_iter()
            .collect();
        if tutorial_ids.is_empty() {
            return Ok(None);
        }
        cond = cond.add(tutorial::Column::Id.is_in(tutorial_ids));
    }

    if !filter.category_slugs.is_empty() {
        let category_ids: Vec<i32> = category::Entity::find()
            .filter(category::Column::Slug.is_in(filter.category_slugs.clone()))
            .select_only()
            .column(category::Column::Id)
            .into_tuple::<i32>()
            .all(db)
            .await?;
        if category_ids.is_empty() {
            return Ok(None);
        }
        cond = cond.add(tutorial::Column::CategoryId.is_in(category_ids));
    }

    if let Some(ref search) = filter.search {
        cond = cond.add(text_search(
            db.get_database_backend(),
            search,
            &[tutorial::Column::Title, tutorial::Column::Description],
        ));
    }

    if !filter.difficulties.is_empty() {
        cond = cond.add(tutorial::Column::Difficulty.is_in(filter.difficulties.clone()));
    }

    Ok(Some(cond))
}

/// Count published tutorials at each difficulty level.
pub async fn published_difficulty_counts<C: ConnectionTrait>(
    db: &C,
) -> Result<DifficultyCounts, DbErr> {
    let mut counts = DifficultyCounts::default();
    for &difficulty in Difficulty::ALL {
        let n = tutorial::Entity::find()
            .filter(tutorial::Column::Status.eq(TutorialStatus::Published))
            .filter(tutorial::Column::Difficulty.eq(difficulty))
            .count(db)
            .await?;
        counts.add(difficulty, n);
    }
    Ok(counts)
}
