use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::info;

use crate::content::kind::ContentRef;
use crate::content::repo::is_unique_violation;
use crate::content::validate::{require, ValidationError};
use crate::error::{CoreError, Result};

use super::model::{
    Section, SectionItem, SectionItemRow, SectionRow, SectionType, SelectionStrategy,
};

const SECTION_COLUMNS: &str =
    "id, name, section_type, position, strategy, auto_genre_id, settings";

/// Position assignments for a submitted id order: ids not in `valid`
/// (stale, deleted, or belonging elsewhere) and repeats are skipped;
/// survivors get strictly increasing positions from 0 in submitted order.
pub(crate) fn position_assignments(
    submitted: &[i64],
    valid: &HashSet<i64>,
) -> Vec<(i64, i32)> {
    let mut seen = HashSet::new();
    let mut assignments = Vec::new();
    for &id in submitted {
        if valid.contains(&id) && seen.insert(id) {
            assignments.push((id, assignments.len() as i32));
        }
    }
    assignments
}

/// Fields accepted when creating a section.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSection {
    pub name: String,
    pub section_type: String,
    #[serde(default)]
    pub strategy: Option<SelectionStrategy>,
    #[serde(default)]
    pub auto_genre_id: Option<i64>,
    #[serde(default)]
    pub settings: Option<Map<String, Value>>,
}

/// Partial update; omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub section_type: Option<String>,
    #[serde(default)]
    pub strategy: Option<SelectionStrategy>,
    #[serde(default)]
    pub auto_genre_id: Option<i64>,
    #[serde(default)]
    pub settings: Option<Map<String, Value>>,
}

/// PostgreSQL-backed access to sections and their manual items.
#[derive(Debug, Clone)]
pub struct SectionRepo {
    pool: PgPool,
}

impl SectionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Section>> {
        let rows = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections ORDER BY position"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Section::try_from).collect()
    }

    /// Sections with their manual item counts, for the admin list view.
    pub async fn list_with_item_counts(&self) -> Result<Vec<(Section, i64)>> {
        let sections = self.list().await?;
        let counts: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT section_id, COUNT(*) FROM section_items GROUP BY section_id",
        )
        .fetch_all(&self.pool)
        .await?;
        let counts: std::collections::HashMap<i64, i64> = counts.into_iter().collect();
        Ok(sections
            .into_iter()
            .map(|s| {
                let count = counts.get(&s.id).copied().unwrap_or(0);
                (s, count)
            })
            .collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Section>> {
        let row = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Section::try_from).transpose()
    }

    /// Create a section at the end of the global ordering space.
    pub async fn create(&self, input: &CreateSection) -> Result<Section> {
        require("name", &input.name)?;
        require("section_type", &input.section_type)?;
        let section_type = SectionType::parse(input.section_type.trim()).ok_or_else(|| {
            ValidationError::InvalidField("section_type", input.section_type.clone())
        })?;
        let strategy = input.strategy.unwrap_or(SelectionStrategy::Manual);
        let settings = input.settings.clone().unwrap_or_default();

        let mut tx = self.pool.begin().await?;

        let auto_genre_id = match strategy {
            SelectionStrategy::Manual => None,
            SelectionStrategy::Automatic => {
                self.resolvable_genre(&mut tx, input.auto_genre_id).await?
            }
        };

        let position: i32 =
            sqlx::query_scalar("SELECT COALESCE(MAX(position) + 1, 0) FROM sections")
                .fetch_one(&mut *tx)
                .await?;

        let row = sqlx::query_as::<_, SectionRow>(&format!(
            "INSERT INTO sections (name, section_type, position, strategy, auto_genre_id, settings) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {SECTION_COLUMNS}"
        ))
        .bind(input.name.trim())
        .bind(section_type.as_str())
        .bind(position)
        .bind(strategy.as_str())
        .bind(auto_genre_id)
        .bind(Value::Object(settings))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let section = Section::try_from(row)?;
        info!(section_id = section.id, name = %section.name, "created section");
        Ok(section)
    }

    /// Apply a partial update. Switching the strategy to manual clears the
    /// genre filter; switching to automatic stores the genre only when the
    /// id resolves, otherwise leaves it unset.
    pub async fn update(&self, id: i64, input: &UpdateSection) -> Result<Section> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::not_found("section", id))?;
        let current = Section::try_from(current)?;

        let name = match &input.name {
            Some(name) => {
                require("name", name)?;
                name.trim().to_string()
            }
            None => current.name.clone(),
        };
        let section_type = match &input.section_type {
            Some(tag) => SectionType::parse(tag.trim())
                .ok_or_else(|| ValidationError::InvalidField("section_type", tag.clone()))?,
            None => current.section_type,
        };
        let strategy = input.strategy.unwrap_or(current.strategy);
        let auto_genre_id = match strategy {
            SelectionStrategy::Manual => None,
            SelectionStrategy::Automatic => match input.auto_genre_id {
                Some(_) => self.resolvable_genre(&mut tx, input.auto_genre_id).await?,
                None if current.strategy == SelectionStrategy::Automatic => {
                    current.auto_genre_id
                }
                None => None,
            },
        };
        let settings = input.settings.clone().unwrap_or(current.settings);

        let row = sqlx::query_as::<_, SectionRow>(&format!(
            "UPDATE sections SET name = $2, section_type = $3, strategy = $4, \
                    auto_genre_id = $5, settings = $6 \
             WHERE id = $1 \
             RETURNING {SECTION_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(section_type.as_str())
        .bind(strategy.as_str())
        .bind(auto_genre_id)
        .bind(Value::Object(settings))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Section::try_from(row)
    }

    /// Items and landing-page associations go with it via FK cascade.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("section", id));
        }
        info!(section_id = id, "deleted section");
        Ok(())
    }

    // -- manual items ----------------------------------------------------

    pub async fn items(&self, section_id: i64) -> Result<Vec<SectionItem>> {
        let rows = sqlx::query_as::<_, SectionItemRow>(
            "SELECT id, section_id, position, content_kind, content_id \
             FROM section_items WHERE section_id = $1 ORDER BY position",
        )
        .bind(section_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SectionItem::try_from).collect()
    }

    /// Append a content reference to a section's manual list. The target
    /// must exist at insert time; it may still vanish later, which the
    /// resolver tolerates.
    pub async fn add_item(&self, section_id: i64, content_ref: ContentRef) -> Result<SectionItem> {
        let mut tx = self.pool.begin().await?;

        // Lock the section row so concurrent appends serialize and the
        // max-position read stays unique within the section.
        let section_exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM sections WHERE id = $1 FOR UPDATE")
                .bind(section_id)
                .fetch_optional(&mut *tx)
                .await?;
        if section_exists.is_none() {
            return Err(CoreError::not_found("section", section_id));
        }

        let content_exists: Option<i32> = sqlx::query_scalar(&format!(
            "SELECT 1 FROM {} WHERE id = $1",
            content_ref.kind.table()
        ))
        .bind(content_ref.id)
        .fetch_optional(&mut *tx)
        .await?;
        if content_exists.is_none() {
            return Err(CoreError::not_found(content_ref.kind.as_str(), content_ref.id));
        }

        let position: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM section_items WHERE section_id = $1",
        )
        .bind(section_id)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, SectionItemRow>(
            "INSERT INTO section_items (section_id, position, content_kind, content_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, section_id, position, content_kind, content_id",
        )
        .bind(section_id)
        .bind(position)
        .bind(content_ref.kind.as_str())
        .bind(content_ref.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::Conflict(format!(
                    "{} {} is already in section {section_id}",
                    content_ref.kind, content_ref.id
                ))
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        SectionItem::try_from(row)
    }

    pub async fn remove_item(&self, section_id: i64, item_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM section_items WHERE id = $1 AND section_id = $2")
            .bind(item_id)
            .bind(section_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("section item", item_id));
        }
        Ok(())
    }

    /// Assign positions 0..n following the submitted item id order, in one
    /// transaction. Ids that no longer exist in the section are skipped.
    pub async fn reorder_items(&self, section_id: i64, item_ids: &[i64]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let existing: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM section_items WHERE section_id = $1 FOR UPDATE")
                .bind(section_id)
                .fetch_all(&mut *tx)
                .await?;
        let existing: HashSet<i64> = existing.into_iter().collect();

        for (item_id, position) in position_assignments(item_ids, &existing) {
            sqlx::query("UPDATE section_items SET position = $1 WHERE id = $2")
                .bind(position)
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // -- internals -------------------------------------------------------

    /// A genre filter is stored only when the id resolves; anything else
    /// leaves the filter unset rather than dangling.
    async fn resolvable_genre(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        genre_id: Option<i64>,
    ) -> Result<Option<i64>> {
        let Some(genre_id) = genre_id else {
            return Ok(None);
        };
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM genres WHERE id = $1")
            .bind(genre_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(found.map(|_| genre_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn assignments_follow_submitted_order() {
        let assignments = position_assignments(&[3, 1, 2], &valid(&[1, 2, 3]));
        assert_eq!(assignments, vec![(3, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn stale_ids_are_skipped_without_gaps() {
        // Id 99 was deleted by another actor; survivors still get
        // strictly increasing positions matching their submitted order.
        let assignments = position_assignments(&[3, 99, 1], &valid(&[1, 2, 3]));
        assert_eq!(assignments, vec![(3, 0), (1, 1)]);
    }

    #[test]
    fn repeated_ids_are_assigned_once() {
        let assignments = position_assignments(&[2, 2, 1], &valid(&[1, 2]));
        assert_eq!(assignments, vec![(2, 0), (1, 1)]);
    }

    #[test]
    fn empty_submission_moves_nothing() {
        assert!(position_assignments(&[], &valid(&[1, 2])).is_empty());
    }

    #[test]
    fn all_stale_submission_moves_nothing() {
        assert!(position_assignments(&[7, 8], &valid(&[1, 2])).is_empty());
    }
}
