use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::{ContentKind, ContentRef};

/// A movie row. Maps to the `movies` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub poster_url: String,
    pub background_url: String,
    pub link: String,
    pub duration_minutes: Option<i32>,
    pub release_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// A series row. Maps to the `series` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Series {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub poster_url: String,
    pub background_url: String,
    pub link: String,
    pub seasons: Option<i32>,
    pub episodes: Option<i32>,
    pub release_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Either content kind behind one abstraction. The resolver and the page
/// assembler only ever deal in `Content`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Content {
    Movie(Movie),
    Series(Series),
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Movie(_) => ContentKind::Movie,
            Content::Series(_) => ContentKind::Series,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Content::Movie(m) => m.id,
            Content::Series(s) => s.id,
        }
    }

    pub fn content_ref(&self) -> ContentRef {
        ContentRef::new(self.kind(), self.id())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Content::Movie(m) => m.created_at,
            Content::Series(s) => s.created_at,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Content::Movie(m) => &m.title,
            Content::Series(s) => &s.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Content::Movie(m) => &m.description,
            Content::Series(s) => &s.description,
        }
    }

    pub fn poster_url(&self) -> &str {
        match self {
            Content::Movie(m) => &m.poster_url,
            Content::Series(s) => &s.poster_url,
        }
    }

    pub fn background_url(&self) -> &str {
        match self {
            Content::Movie(m) => &m.background_url,
            Content::Series(s) => &s.background_url,
        }
    }

    pub fn link(&self) -> &str {
        match self {
            Content::Movie(m) => &m.link,
            Content::Series(s) => &s.link,
        }
    }
}

/// Fields accepted when creating or updating a movie.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieInput {
    pub title: String,
    pub description: String,
    pub poster_url: String,
    pub background_url: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub release_year: Option<i32>,
}

/// Fields accepted when creating or updating a series.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesInput {
    pub title: String,
    pub description: String,
    pub poster_url: String,
    pub background_url: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub seasons: Option<i32>,
    #[serde(default)]
    pub episodes: Option<i32>,
    #[serde(default)]
    pub release_year: Option<i32>,
}

/// A content row together with the names of its genres, as returned by
/// the admin list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct MovieWithGenres {
    #[serde(flatten)]
    pub movie: Movie,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesWithGenres {
    #[serde(flatten)]
    pub series: Series,
    pub genres: Vec<String>,
}
