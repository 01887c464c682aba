/// The two concrete content kinds and the weak polymorphic reference.
///
/// Section items point at content through `(kind, id)` rather than a
/// foreign key, so the referenced row may disappear underneath them. The
/// resolver treats a reference that no longer resolves as an omission.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
}

impl ContentKind {
    /// Parse a kind tag as stored in `section_items.content_kind`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "movie" => Some(ContentKind::Movie),
            "series" => Some(ContentKind::Series),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Series => "series",
        }
    }

    /// Node type tag used for card children in the page document.
    pub fn card_type(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie-card",
            ContentKind::Series => "series-card",
        }
    }

    /// Dispatch table from kind tag to backing table. Adding a content
    /// kind means adding a variant here, never reflection.
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movies",
            ContentKind::Series => "series",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weak reference to a movie or series. Equal iff kind and id both match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub kind: ContentKind,
    pub id: i64,
}

impl ContentRef {
    pub fn new(kind: ContentKind, id: i64) -> Self {
        Self { kind, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_tags() {
        assert_eq!(ContentKind::parse("movie"), Some(ContentKind::Movie));
        assert_eq!(ContentKind::parse("series"), Some(ContentKind::Series));
        assert_eq!(ContentKind::parse("episode"), None);
        assert_eq!(ContentKind::parse(""), None);
    }

    #[test]
    fn tag_round_trip() {
        for kind in [ContentKind::Movie, ContentKind::Series] {
            assert_eq!(ContentKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn card_types() {
        assert_eq!(ContentKind::Movie.card_type(), "movie-card");
        assert_eq!(ContentKind::Series.card_type(), "series-card");
    }

    #[test]
    fn ref_equality_requires_both_fields() {
        let a = ContentRef::new(ContentKind::Movie, 1);
        assert_eq!(a, ContentRef::new(ContentKind::Movie, 1));
        assert_ne!(a, ContentRef::new(ContentKind::Series, 1));
        assert_ne!(a, ContentRef::new(ContentKind::Movie, 2));
    }
}
