use std::collections::BTreeSet;

use sea_orm::*;

use crate::entity::{tag, tutorial_tag};
use crate::error::AppError;

/// Difference between a tutorial's current and desired tag sets.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub to_add: Vec<i32>,
    pub to_remove: Vec<i32>,
}

impl TagDiff {
    pub fn between(current: &[i32], desired: &[i32]) -> Self {
        let current: BTreeSet<i32> = current.iter().copied().collect();
        let desired: BTreeSet<i32> = desired.iter().copied().collect();
        Self {
            to_add: desired.difference(&current).copied().collect(),
            to_remove: current.difference(&desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Tag ids currently linked to a tutorial.
pub async fn tag_ids_for<C: ConnectionTrait>(db: &C, tutorial_id: i32) -> Result<Vec<i32>, DbErr> {
    tutorial_tag::Entity::find()
        .filter(tutorial_tag::Column::TutorialId.eq(tutorial_id))
        .select_only()
        .column(tutorial_tag::Column::TagId)
        .into_tuple::<i32>()
        .all(db)
        .await
}

/// Fail with a validation error unless every id names an existing tag.
pub async fn ensure_tags_exist<C: ConnectionTrait>(db: &C, tag_ids: &[i32]) -> Result<(), AppError> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    let found: BTreeSet<i32> = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids.to_vec()))
        .select_only()
        .column(tag::Column::Id)
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let missing: Vec<String> = tag_ids
        .iter()
        .filter(|id| !found.contains(id))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Unknown tag ids: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Make a tutorial's tag links equal `desired`, touching only the rows that change.
///
/// Run inside the caller's transaction. Returns every tag id whose membership
/// may have changed, so counters can be refreshed.
pub async fn sync_tutorial_tags<C: ConnectionTrait>(
    db: &C,
    tutorial_id: i32,
    desired: &[i32],
) -> Result<Vec<i32>, AppError> {
    ensure_tags_exist(db, desired).await?;

    let current = tag_ids_for(db, tutorial_id).await?;
    let diff = TagDiff::between(&current, desired);

    if !diff.to_remove.is_empty() {
        tutorial_tag::Entity::delete_many()
            .filter(tutorial_tag::Column::TutorialId.eq(tutorial_id))
            .filter(tutorial_tag::Column::TagId.is_in(diff.to_remove.clone()))
            .exec(db)
            .await?;
    }

    if !diff.to_add.is_empty() {
        let links = diff.to_add.iter().map(|&tag_id| tutorial_tag::ActiveModel {
            tutorial_id: Set(tutorial_id),
            tag_id: Set(tag_id),
        });
        tutorial_tag::Entity::insert_many(links)
            .exec_without_returning(db)
            .await?;
    }

    if !diff.is_empty() {
        tracing::debug!(
            tutorial_id,
            added = diff.to_add.len(),
            removed = diff.to_remove.len(),
            "Synced tutorial tags"
        );
    }

    let mut affected: BTreeSet<i32> = current.into_iter().collect();
    affected.extend(desired.iter().copied());
    Ok(affected.into_iter().collect())
}
