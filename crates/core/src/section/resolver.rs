//! Section content resolution.
//!
//! Turns a section's configuration into an ordered, existence-checked
//! sequence of content. Dangling references and unset genre filters are
//! never errors here; the output just shrinks.

use std::collections::HashMap;

use serde::Serialize;

use crate::content::kind::{ContentKind, ContentRef};
use crate::content::model::Content;
use crate::content::repo::ContentRepo;
use crate::error::Result;

use super::model::{Section, SectionItem, SelectionStrategy};
use super::repo::SectionRepo;

/// One resolved entry: the content plus its kind tag, ready for
/// projection by the page assembler.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedEntry {
    pub kind: ContentKind,
    #[serde(flatten)]
    pub content: Content,
}

impl ResolvedEntry {
    pub fn new(content: Content) -> Self {
        Self {
            kind: content.kind(),
            content,
        }
    }
}

/// Resolve a manual section: items in position order, each looked up via
/// its weak reference. References that no longer resolve are skipped and
/// the survivors keep their relative order.
pub fn resolve_manual(
    items: &[SectionItem],
    lookup: &HashMap<ContentRef, Content>,
) -> Vec<ResolvedEntry> {
    items
        .iter()
        .filter_map(|item| lookup.get(&item.content_ref()).cloned())
        .map(ResolvedEntry::new)
        .collect()
}

/// Order the combined result of an automatic section: newest first, ties
/// broken by kind (movies before series) and then by id, so the result is
/// deterministic regardless of fetch interleaving.
pub fn order_automatic(mut entries: Vec<Content>) -> Vec<ResolvedEntry> {
    entries.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.kind().as_str().cmp(b.kind().as_str()))
            .then_with(|| a.id().cmp(&b.id()))
    });
    entries.into_iter().map(ResolvedEntry::new).collect()
}

/// Resolve a section's content according to its selection strategy.
pub async fn resolve_section(
    content: &ContentRepo,
    sections: &SectionRepo,
    section: &Section,
) -> Result<Vec<ResolvedEntry>> {
    match section.strategy {
        SelectionStrategy::Manual => {
            let items = sections.items(section.id).await?;
            let refs: Vec<ContentRef> = items.iter().map(SectionItem::content_ref).collect();
            let lookup = content.resolve_refs(&refs).await?;
            Ok(resolve_manual(&items, &lookup))
        }
        SelectionStrategy::Automatic => {
            let Some(genre_id) = section.auto_genre_id else {
                return Ok(Vec::new());
            };
            let movies = content.movies_by_genre(genre_id).await?;
            let series = content.series_by_genre(genre_id).await?;
            let combined: Vec<Content> = movies
                .into_iter()
                .map(Content::Movie)
                .chain(series.into_iter().map(Content::Series))
                .collect();
            Ok(order_automatic(combined))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::{Movie, Series};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    fn movie(id: i64, created_at: DateTime<Utc>) -> Content {
        Content::Movie(Movie {
            id,
            title: format!("Movie {id}"),
            description: "desc".into(),
            poster_url: "poster".into(),
            background_url: "bg".into(),
            link: "#".into(),
            duration_minutes: Some(120),
            release_year: Some(2024),
            created_at,
        })
    }

    fn series(id: i64, created_at: DateTime<Utc>) -> Content {
        Content::Series(Series {
            id,
            title: format!("Series {id}"),
            description: "desc".into(),
            poster_url: "poster".into(),
            background_url: "bg".into(),
            link: "#".into(),
            seasons: Some(2),
            episodes: Some(16),
            release_year: Some(2024),
            created_at,
        })
    }

    fn item(id: i64, position: i32, kind: ContentKind, content_id: i64) -> SectionItem {
        SectionItem {
            id,
            section_id: 1,
            position,
            content_kind: kind,
            content_id,
        }
    }

    #[test]
    fn manual_skips_dangling_and_keeps_order() {
        let m1 = movie(1, at(0));
        let s1 = series(1, at(1));
        // Item for movie 2 dangles: the movie was deleted.
        let items = vec![
            item(10, 0, ContentKind::Movie, 1),
            item(11, 1, ContentKind::Series, 1),
            item(12, 2, ContentKind::Movie, 2),
        ];
        let mut lookup = HashMap::new();
        lookup.insert(m1.content_ref(), m1);
        lookup.insert(s1.content_ref(), s1);

        let resolved = resolve_manual(&items, &lookup);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].kind, ContentKind::Movie);
        assert_eq!(resolved[0].content.id(), 1);
        assert_eq!(resolved[1].kind, ContentKind::Series);
        assert_eq!(resolved[1].content.id(), 1);
    }

    #[test]
    fn manual_with_no_surviving_refs_is_empty() {
        let items = vec![item(10, 0, ContentKind::Movie, 7)];
        let resolved = resolve_manual(&items, &HashMap::new());
        assert!(resolved.is_empty());
    }

    #[test]
    fn automatic_sorts_newest_first() {
        let older = movie(1, at(1));
        let newer = series(9, at(5));
        let resolved = order_automatic(vec![older, newer]);
        assert_eq!(resolved[0].content.id(), 9);
        assert_eq!(resolved[0].kind, ContentKind::Series);
        assert_eq!(resolved[1].content.id(), 1);
    }

    #[test]
    fn automatic_ties_break_by_kind_then_id() {
        let t = at(3);
        let entries = vec![series(2, t), movie(5, t), series(1, t), movie(3, t)];
        let resolved = order_automatic(entries);
        let order: Vec<(ContentKind, i64)> =
            resolved.iter().map(|e| (e.kind, e.content.id())).collect();
        assert_eq!(
            order,
            vec![
                (ContentKind::Movie, 3),
                (ContentKind::Movie, 5),
                (ContentKind::Series, 1),
                (ContentKind::Series, 2),
            ]
        );
    }
}
