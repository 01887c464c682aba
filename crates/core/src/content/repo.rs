use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;

use crate::error::{CoreError, Result};

use super::kind::{ContentKind, ContentRef};
use super::model::{
    Content, Genre, Movie, MovieInput, MovieWithGenres, Series, SeriesInput, SeriesWithGenres,
};
use super::validate::{link_or_default, require, validate_content_fields};

/// PostgreSQL-backed access to movies, series, and genres.
#[derive(Debug, Clone)]
pub struct ContentRepo {
    pool: PgPool,
}

/// True when the error is a unique-constraint violation we want to
/// surface as a conflict rather than a server fault.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
        .unwrap_or(false)
}

impl ContentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // -- movies ----------------------------------------------------------

    pub async fn list_movies(&self) -> Result<Vec<MovieWithGenres>> {
        let movies = sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, poster_url, background_url, link, \
                    duration_minutes, release_year, created_at \
             FROM movies ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut names = self.genre_names("movie_genres", "movie_id").await?;
        Ok(movies
            .into_iter()
            .map(|movie| {
                let genres = names.remove(&movie.id).unwrap_or_default();
                MovieWithGenres { movie, genres }
            })
            .collect())
    }

    pub async fn get_movie(&self, id: i64) -> Result<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, poster_url, background_url, link, \
                    duration_minutes, release_year, created_at \
             FROM movies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(movie)
    }

    pub async fn create_movie(&self, input: &MovieInput) -> Result<Movie> {
        validate_content_fields(
            &input.title,
            &input.description,
            &input.poster_url,
            &input.background_url,
        )?;

        let movie = sqlx::query_as::<_, Movie>(
            "INSERT INTO movies (title, description, poster_url, background_url, link, \
                                 duration_minutes, release_year) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, title, description, poster_url, background_url, link, \
                       duration_minutes, release_year, created_at",
        )
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.poster_url.trim())
        .bind(input.background_url.trim())
        .bind(link_or_default(input.link.as_deref()))
        .bind(input.duration_minutes)
        .bind(input.release_year)
        .fetch_one(&self.pool)
        .await?;

        info!(movie_id = movie.id, title = %movie.title, "created movie");
        Ok(movie)
    }

    pub async fn update_movie(&self, id: i64, input: &MovieInput) -> Result<Movie> {
        validate_content_fields(
            &input.title,
            &input.description,
            &input.poster_url,
            &input.background_url,
        )?;

        let movie = sqlx::query_as::<_, Movie>(
            "UPDATE movies SET title = $2, description = $3, poster_url = $4, \
                    background_url = $5, link = $6, duration_minutes = $7, release_year = $8 \
             WHERE id = $1 \
             RETURNING id, title, description, poster_url, background_url, link, \
                       duration_minutes, release_year, created_at",
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.poster_url.trim())
        .bind(input.background_url.trim())
        .bind(link_or_default(input.link.as_deref()))
        .bind(input.duration_minutes)
        .bind(input.release_year)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::not_found("movie", id))?;

        Ok(movie)
    }

    /// Delete a movie along with every section item that points at it.
    /// Section items hold weak references, so the cleanup is ours to do.
    pub async fn delete_movie(&self, id: i64) -> Result<()> {
        self.delete_content(ContentRef::new(ContentKind::Movie, id))
            .await
    }

    pub async fn set_movie_genres(&self, id: i64, genre_ids: &[i64]) -> Result<()> {
        if self.get_movie(id).await?.is_none() {
            return Err(CoreError::not_found("movie", id));
        }
        self.replace_tags("movie_genres", "movie_id", id, genre_ids)
            .await
    }

    // -- series ----------------------------------------------------------

    pub async fn list_series(&self) -> Result<Vec<SeriesWithGenres>> {
        let series = sqlx::query_as::<_, Series>(
            "SELECT id, title, description, poster_url, background_url, link, \
                    seasons, episodes, release_year, created_at \
             FROM series ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut names = self.genre_names("series_genres", "series_id").await?;
        Ok(series
            .into_iter()
            .map(|series| {
                let genres = names.remove(&series.id).unwrap_or_default();
                SeriesWithGenres { series, genres }
            })
            .collect())
    }

    pub async fn get_series(&self, id: i64) -> Result<Option<Series>> {
        let series = sqlx::query_as::<_, Series>(
            "SELECT id, title, description, poster_url, background_url, link, \
                    seasons, episodes, release_year, created_at \
             FROM series WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(series)
    }

    pub async fn create_series(&self, input: &SeriesInput) -> Result<Series> {
        validate_content_fields(
            &input.title,
            &input.description,
            &input.poster_url,
            &input.background_url,
        )?;

        let series = sqlx::query_as::<_, Series>(
            "INSERT INTO series (title, description, poster_url, background_url, link, \
                                 seasons, episodes, release_year) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, title, description, poster_url, background_url, link, \
                       seasons, episodes, release_year, created_at",
        )
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.poster_url.trim())
        .bind(input.background_url.trim())
        .bind(link_or_default(input.link.as_deref()))
        .bind(input.seasons)
        .bind(input.episodes)
        .bind(input.release_year)
        .fetch_one(&self.pool)
        .await?;

        info!(series_id = series.id, title = %series.title, "created series");
        Ok(series)
    }

    pub async fn update_series(&self, id: i64, input: &SeriesInput) -> Result<Series> {
        validate_content_fields(
            &input.title,
            &input.description,
            &input.poster_url,
            &input.background_url,
        )?;

        let series = sqlx::query_as::<_, Series>(
            "UPDATE series SET title = $2, description = $3, poster_url = $4, \
                    background_url = $5, link = $6, seasons = $7, episodes = $8, \
                    release_year = $9 \
             WHERE id = $1 \
             RETURNING id, title, description, poster_url, background_url, link, \
                       seasons, episodes, release_year, created_at",
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.poster_url.trim())
        .bind(input.background_url.trim())
        .bind(link_or_default(input.link.as_deref()))
        .bind(input.seasons)
        .bind(input.episodes)
        .bind(input.release_year)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::not_found("series", id))?;

        Ok(series)
    }

    pub async fn delete_series(&self, id: i64) -> Result<()> {
        self.delete_content(ContentRef::new(ContentKind::Series, id))
            .await
    }

    pub async fn set_series_genres(&self, id: i64, genre_ids: &[i64]) -> Result<()> {
        if self.get_series(id).await?.is_none() {
            return Err(CoreError::not_found("series", id));
        }
        self.replace_tags("series_genres", "series_id", id, genre_ids)
            .await
    }

    // -- genres ----------------------------------------------------------

    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    pub async fn get_genre(&self, id: i64) -> Result<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    pub async fn create_genre(&self, name: &str) -> Result<Genre> {
        require("name", name)?;
        let genre = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::Conflict(format!("genre '{}' already exists", name.trim()))
            } else {
                e.into()
            }
        })?;
        Ok(genre)
    }

    /// Tagging rows cascade away with the genre; sections filtering on it
    /// have their `auto_genre_id` nulled by the schema.
    pub async fn delete_genre(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("genre", id));
        }
        Ok(())
    }

    // -- resolution ------------------------------------------------------

    /// Batch-resolve a set of weak references. Missing targets are simply
    /// absent from the returned map; the caller decides what absence means.
    pub async fn resolve_refs(
        &self,
        refs: &[ContentRef],
    ) -> Result<HashMap<ContentRef, Content>> {
        let movie_ids: Vec<i64> = refs
            .iter()
            .filter(|r| r.kind == ContentKind::Movie)
            .map(|r| r.id)
            .collect();
        let series_ids: Vec<i64> = refs
            .iter()
            .filter(|r| r.kind == ContentKind::Series)
            .map(|r| r.id)
            .collect();

        let mut resolved = HashMap::new();

        if !movie_ids.is_empty() {
            let movies = sqlx::query_as::<_, Movie>(
                "SELECT id, title, description, poster_url, background_url, link, \
                        duration_minutes, release_year, created_at \
                 FROM movies WHERE id = ANY($1)",
            )
            .bind(&movie_ids)
            .fetch_all(&self.pool)
            .await?;
            for movie in movies {
                resolved.insert(
                    ContentRef::new(ContentKind::Movie, movie.id),
                    Content::Movie(movie),
                );
            }
        }

        if !series_ids.is_empty() {
            let series = sqlx::query_as::<_, Series>(
                "SELECT id, title, description, poster_url, background_url, link, \
                        seasons, episodes, release_year, created_at \
                 FROM series WHERE id = ANY($1)",
            )
            .bind(&series_ids)
            .fetch_all(&self.pool)
            .await?;
            for series in series {
                resolved.insert(
                    ContentRef::new(ContentKind::Series, series.id),
                    Content::Series(series),
                );
            }
        }

        Ok(resolved)
    }

    pub async fn movies_by_genre(&self, genre_id: i64) -> Result<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            "SELECT m.id, m.title, m.description, m.poster_url, m.background_url, m.link, \
                    m.duration_minutes, m.release_year, m.created_at \
             FROM movies m \
             JOIN movie_genres mg ON mg.movie_id = m.id \
             WHERE mg.genre_id = $1 \
             ORDER BY m.created_at DESC",
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    pub async fn series_by_genre(&self, genre_id: i64) -> Result<Vec<Series>> {
        let series = sqlx::query_as::<_, Series>(
            "SELECT s.id, s.title, s.description, s.poster_url, s.background_url, s.link, \
                    s.seasons, s.episodes, s.release_year, s.created_at \
             FROM series s \
             JOIN series_genres sg ON sg.series_id = s.id \
             WHERE sg.genre_id = $1 \
             ORDER BY s.created_at DESC",
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(series)
    }

    // -- internals -------------------------------------------------------

    async fn delete_content(&self, content_ref: ContentRef) -> Result<()> {
        let table = content_ref.kind.table();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM section_items WHERE content_kind = $1 AND content_id = $2")
            .bind(content_ref.kind.as_str())
            .bind(content_ref.id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(content_ref.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(content_ref.kind.as_str(), content_ref.id));
        }

        tx.commit().await?;
        info!(kind = %content_ref.kind, id = content_ref.id, "deleted content");
        Ok(())
    }

    async fn replace_tags(
        &self,
        table: &str,
        column: &str,
        content_id: i64,
        genre_ids: &[i64],
    ) -> Result<()> {
        let mut ids = genre_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {table} WHERE {column} = $1"))
            .bind(content_id)
            .execute(&mut *tx)
            .await?;

        for genre_id in &ids {
            let result = sqlx::query(&format!(
                "INSERT INTO {table} ({column}, genre_id) \
                 SELECT $1, id FROM genres WHERE id = $2 \
                 ON CONFLICT DO NOTHING"
            ))
            .bind(content_id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(CoreError::not_found("genre", *genre_id));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn genre_names(&self, table: &str, column: &str) -> Result<HashMap<i64, Vec<String>>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(&format!(
            "SELECT t.{column}, g.name FROM {table} t \
             JOIN genres g ON g.id = t.genre_id \
             ORDER BY g.name"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut names: HashMap<i64, Vec<String>> = HashMap::new();
        for (id, name) in rows {
            names.entry(id).or_default().push(name);
        }
        Ok(names)
    }
}
