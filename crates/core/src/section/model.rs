use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::kind::{ContentKind, ContentRef};
use crate::error::CoreError;

/// Closed set of presentational section types. Only `hero` changes
/// behavior anywhere (single-item projection in the assembler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Hero,
    Carousel,
    Grid,
    Featured,
}

impl SectionType {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "hero" => Some(SectionType::Hero),
            "carousel" => Some(SectionType::Carousel),
            "grid" => Some(SectionType::Grid),
            "featured" => Some(SectionType::Featured),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Hero => "hero",
            SectionType::Carousel => "carousel",
            SectionType::Grid => "grid",
            SectionType::Featured => "featured",
        }
    }
}

/// How a section picks its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    Manual,
    Automatic,
}

impl SelectionStrategy {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "manual" => Some(SelectionStrategy::Manual),
            "automatic" => Some(SelectionStrategy::Automatic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::Manual => "manual",
            SelectionStrategy::Automatic => "automatic",
        }
    }
}

/// A named, positioned content container.
///
/// `auto_genre_id` is only meaningful when `strategy` is automatic; an
/// automatic section without a genre resolves to nothing.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub section_type: SectionType,
    pub position: i32,
    pub strategy: SelectionStrategy,
    pub auto_genre_id: Option<i64>,
    pub settings: Map<String, Value>,
}

/// One manual entry in a section, holding a weak reference to content.
#[derive(Debug, Clone, Serialize)]
pub struct SectionItem {
    pub id: i64,
    pub section_id: i64,
    pub position: i32,
    pub content_kind: ContentKind,
    pub content_id: i64,
}

impl SectionItem {
    pub fn content_ref(&self) -> ContentRef {
        ContentRef::new(self.content_kind, self.content_id)
    }
}

/// Raw `section_items` row before the kind tag is parsed.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SectionItemRow {
    pub id: i64,
    pub section_id: i64,
    pub position: i32,
    pub content_kind: String,
    pub content_id: i64,
}

impl TryFrom<SectionItemRow> for SectionItem {
    type Error = CoreError;

    fn try_from(row: SectionItemRow) -> Result<Self, CoreError> {
        let content_kind = ContentKind::parse(&row.content_kind).ok_or_else(|| {
            CoreError::Internal(format!("unknown content kind '{}'", row.content_kind))
        })?;
        Ok(SectionItem {
            id: row.id,
            section_id: row.section_id,
            position: row.position,
            content_kind,
            content_id: row.content_id,
        })
    }
}

/// Raw `sections` row before the tag columns are parsed.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SectionRow {
    pub id: i64,
    pub name: String,
    pub section_type: String,
    pub position: i32,
    pub strategy: String,
    pub auto_genre_id: Option<i64>,
    pub settings: Value,
}

impl TryFrom<SectionRow> for Section {
    type Error = CoreError;

    fn try_from(row: SectionRow) -> Result<Self, CoreError> {
        let section_type = SectionType::parse(&row.section_type).ok_or_else(|| {
            CoreError::Internal(format!("unknown section type '{}'", row.section_type))
        })?;
        let strategy = SelectionStrategy::parse(&row.strategy).ok_or_else(|| {
            CoreError::Internal(format!("unknown selection strategy '{}'", row.strategy))
        })?;
        let settings = match row.settings {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(CoreError::Internal(format!(
                    "section {} settings is not an object: {other}",
                    row.id
                )))
            }
        };
        Ok(Section {
            id: row.id,
            name: row.name,
            section_type,
            position: row.position,
            strategy,
            auto_genre_id: row.auto_genre_id,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_type_tags() {
        for tag in ["hero", "carousel", "grid", "featured"] {
            assert_eq!(SectionType::parse(tag).map(|t| t.as_str()), Some(tag));
        }
        assert_eq!(SectionType::parse("banner"), None);
    }

    #[test]
    fn strategy_tags() {
        assert_eq!(SelectionStrategy::parse("manual"), Some(SelectionStrategy::Manual));
        assert_eq!(
            SelectionStrategy::parse("automatic"),
            Some(SelectionStrategy::Automatic)
        );
        assert_eq!(SelectionStrategy::parse("auto"), None);
    }

    #[test]
    fn row_conversion_rejects_bad_tags() {
        let row = SectionRow {
            id: 1,
            name: "Trending".into(),
            section_type: "marquee".into(),
            position: 0,
            strategy: "manual".into(),
            auto_genre_id: None,
            settings: Value::Object(Map::new()),
        };
        assert!(Section::try_from(row).is_err());
    }
}
