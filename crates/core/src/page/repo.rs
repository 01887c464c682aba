use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use tracing::info;

use crate::content::repo::is_unique_violation;
use crate::content::validate::require;
use crate::error::{CoreError, Result};
use crate::section::model::{Section, SectionRow};
use crate::section::repo::position_assignments;

use super::model::{LandingPage, LandingPageSection};

const PAGE_COLUMNS: &str = "id, name, is_active, created_at, updated_at";
const DEFAULT_PAGE_NAME: &str = "Default Landing Page";

/// PostgreSQL-backed access to landing pages and their section ordering.
#[derive(Debug, Clone)]
pub struct PageRepo {
    pool: PgPool,
}

impl PageRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<LandingPage>> {
        let pages = sqlx::query_as::<_, LandingPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(pages)
    }

    pub async fn get(&self, id: i64) -> Result<Option<LandingPage>> {
        let page = sqlx::query_as::<_, LandingPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(page)
    }

    pub async fn create(&self, name: &str) -> Result<LandingPage> {
        require("name", name)?;
        let page = sqlx::query_as::<_, LandingPage>(&format!(
            "INSERT INTO landing_pages (name) VALUES ($1) RETURNING {PAGE_COLUMNS}"
        ))
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await?;
        info!(page_id = page.id, name = %page.name, "created landing page");
        Ok(page)
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<LandingPage> {
        require("name", name)?;
        let page = sqlx::query_as::<_, LandingPage>(&format!(
            "UPDATE landing_pages SET name = $2, updated_at = now() \
             WHERE id = $1 RETURNING {PAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::not_found("landing page", id))?;
        Ok(page)
    }

    /// The unique active page, materializing a default when none exists.
    ///
    /// The insert races against concurrent callers; the partial unique
    /// index on `is_active` lets exactly one of them win and the rest
    /// re-read the winner's row.
    pub async fn get_or_create_active(&self) -> Result<LandingPage> {
        if let Some(page) = self.active().await? {
            return Ok(page);
        }

        sqlx::query(
            "INSERT INTO landing_pages (name, is_active) VALUES ($1, TRUE) \
             ON CONFLICT (is_active) WHERE is_active DO NOTHING",
        )
        .bind(DEFAULT_PAGE_NAME)
        .execute(&self.pool)
        .await?;

        self.active().await?.ok_or_else(|| {
            CoreError::Internal("no active landing page after default creation".into())
        })
    }

    /// Make this page the single active one. Deactivate-all then
    /// activate-one inside one transaction, so no reader ever observes
    /// zero or two active pages.
    pub async fn activate(&self, id: i64) -> Result<LandingPage> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE landing_pages SET is_active = FALSE WHERE is_active AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let page = sqlx::query_as::<_, LandingPage>(&format!(
            "UPDATE landing_pages SET is_active = TRUE, updated_at = now() \
             WHERE id = $1 RETURNING {PAGE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::not_found("landing page", id))?;

        tx.commit().await?;
        info!(page_id = id, "activated landing page");
        Ok(page)
    }

    /// Deleting the active page would leave the client with nothing to
    /// render, so it is refused until another page is activated.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let is_active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM landing_pages WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        match is_active {
            None => return Err(CoreError::not_found("landing page", id)),
            Some(true) => {
                return Err(CoreError::InvariantViolation(
                    "cannot delete the active landing page".into(),
                ))
            }
            Some(false) => {}
        }

        sqlx::query("DELETE FROM landing_pages WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(page_id = id, "deleted landing page");
        Ok(())
    }

    // -- section ordering ------------------------------------------------

    /// The page's sections in ascending association position order.
    pub async fn sections_of(&self, page_id: i64) -> Result<Vec<(LandingPageSection, Section)>> {
        let links = sqlx::query_as::<_, LandingPageSection>(
            "SELECT id, landing_page_id, section_id, position \
             FROM landing_page_sections WHERE landing_page_id = $1 ORDER BY position",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        if links.is_empty() {
            return Ok(Vec::new());
        }

        let section_ids: Vec<i64> = links.iter().map(|l| l.section_id).collect();
        let rows = sqlx::query_as::<_, SectionRow>(
            "SELECT id, name, section_type, position, strategy, auto_genre_id, settings \
             FROM sections WHERE id = ANY($1)",
        )
        .bind(&section_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut sections: HashMap<i64, Section> = HashMap::new();
        for row in rows {
            let section = Section::try_from(row)?;
            sections.insert(section.id, section);
        }

        Ok(links
            .into_iter()
            .filter_map(|link| {
                let section = sections.remove(&link.section_id)?;
                Some((link, section))
            })
            .collect())
    }

    /// Place a section at the end of the page. A section may appear at
    /// most once per page.
    pub async fn add_section(&self, page_id: i64, section_id: i64) -> Result<LandingPageSection> {
        let mut tx = self.pool.begin().await?;

        // Lock the page row so concurrent placements serialize and the
        // max-position read stays unique within the page.
        let page_exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM landing_pages WHERE id = $1 FOR UPDATE")
                .bind(page_id)
                .fetch_optional(&mut *tx)
                .await?;
        if page_exists.is_none() {
            return Err(CoreError::not_found("landing page", page_id));
        }

        let section_exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM sections WHERE id = $1")
                .bind(section_id)
                .fetch_optional(&mut *tx)
                .await?;
        if section_exists.is_none() {
            return Err(CoreError::not_found("section", section_id));
        }

        let position: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM landing_page_sections \
             WHERE landing_page_id = $1",
        )
        .bind(page_id)
        .fetch_one(&mut *tx)
        .await?;

        let link = sqlx::query_as::<_, LandingPageSection>(
            "INSERT INTO landing_page_sections (landing_page_id, section_id, position) \
             VALUES ($1, $2, $3) \
             RETURNING id, landing_page_id, section_id, position",
        )
        .bind(page_id)
        .bind(section_id)
        .bind(position)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::Conflict(format!(
                    "section {section_id} is already on landing page {page_id}"
                ))
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        Ok(link)
    }

    pub async fn remove_section(&self, page_id: i64, section_id: i64) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM landing_page_sections WHERE landing_page_id = $1 AND section_id = $2",
        )
        .bind(page_id)
        .bind(section_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("section", section_id));
        }
        Ok(())
    }

    /// Assign positions 0..n following the submitted section id order, in
    /// one transaction. Ids not on the page are skipped.
    pub async fn reorder_sections(&self, page_id: i64, section_ids: &[i64]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let placed: Vec<i64> = sqlx::query_scalar(
            "SELECT section_id FROM landing_page_sections \
             WHERE landing_page_id = $1 FOR UPDATE",
        )
        .bind(page_id)
        .fetch_all(&mut *tx)
        .await?;
        let placed: HashSet<i64> = placed.into_iter().collect();

        for (section_id, position) in position_assignments(section_ids, &placed) {
            sqlx::query(
                "UPDATE landing_page_sections SET position = $1 \
                 WHERE landing_page_id = $2 AND section_id = $3",
            )
            .bind(position)
            .bind(page_id)
            .bind(section_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn active(&self) -> Result<Option<LandingPage>> {
        let page = sqlx::query_as::<_, LandingPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages WHERE is_active"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(page)
    }
}
