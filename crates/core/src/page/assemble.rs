//! Page assembly: projecting a landing page's resolved sections into the
//! JSON document consumed by the presentation client.
//!
//! Hero sections take only the first resolved entry, and that truncation
//! lives here and nowhere else; the resolver always returns the full
//! sequence.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::content::model::Content;
use crate::section::model::{Section, SectionType};
use crate::section::resolver::ResolvedEntry;

pub const CTA_TEXT: &str = "Watch Now";

/// Root of the page document: `{"type": "page", "children": [...]}`.
#[derive(Debug, Serialize)]
pub struct PageDocument {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub children: Vec<SectionNode>,
}

#[derive(Debug, Serialize)]
pub struct SectionNode {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ContentNode>>,
}

#[derive(Debug, Serialize)]
pub struct ContentNode {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub attributes: Map<String, Value>,
}

/// Assemble the document from sections in page order, each paired with
/// its resolved content.
pub fn assemble(sections: &[(Section, Vec<ResolvedEntry>)]) -> PageDocument {
    let children = sections
        .iter()
        .filter_map(|(section, entries)| section_node(section, entries))
        .collect();
    PageDocument {
        node_type: "page",
        children,
    }
}

/// Project one section. Returns `None` for a non-hero section with no
/// resolvable content; hero sections are always emitted, with the
/// content-derived attributes simply missing when there is nothing to
/// feature.
pub fn section_node(section: &Section, entries: &[ResolvedEntry]) -> Option<SectionNode> {
    let mut attributes = Map::new();

    // Title comes from the settings override when present, else the
    // section's own name.
    let title = match section.settings.get("title") {
        Some(Value::String(title)) => title.clone(),
        _ => section.name.clone(),
    };
    attributes.insert("title".to_string(), Value::String(title));

    // Remaining settings pass through, winning on collision.
    for (key, value) in &section.settings {
        if key != "title" {
            attributes.insert(key.clone(), value.clone());
        }
    }

    if section.section_type == SectionType::Hero {
        if let Some(entry) = entries.first() {
            project_hero(&mut attributes, &entry.content);
        }
        return Some(SectionNode {
            node_type: section.section_type.as_str(),
            attributes,
            children: None,
        });
    }

    if entries.is_empty() {
        return None;
    }

    let children = entries.iter().map(card_node).collect();
    Some(SectionNode {
        node_type: section.section_type.as_str(),
        attributes,
        children: Some(children),
    })
}

fn project_hero(attributes: &mut Map<String, Value>, content: &Content) {
    attributes.insert(
        "backgroundImage".to_string(),
        Value::String(content.background_url().to_string()),
    );
    attributes.insert(
        "title".to_string(),
        Value::String(content.title().to_string()),
    );
    attributes.insert(
        "description".to_string(),
        Value::String(content.description().to_string()),
    );
    attributes.insert(
        "contentKind".to_string(),
        Value::String(content.kind().as_str().to_string()),
    );
    attributes.insert(
        "cta".to_string(),
        json!({ "text": CTA_TEXT, "link": content.link() }),
    );
}

fn card_node(entry: &ResolvedEntry) -> ContentNode {
    let content = &entry.content;
    let mut attributes = Map::new();
    attributes.insert(
        "title".to_string(),
        Value::String(content.title().to_string()),
    );
    attributes.insert(
        "poster".to_string(),
        Value::String(content.poster_url().to_string()),
    );
    attributes.insert(
        "link".to_string(),
        Value::String(content.link().to_string()),
    );
    attributes.insert(
        "contentKind".to_string(),
        Value::String(content.kind().as_str().to_string()),
    );

    match content {
        Content::Movie(movie) => {
            if let Some(duration) = movie.duration_minutes {
                attributes.insert("duration".to_string(), json!(duration));
            }
            if let Some(year) = movie.release_year {
                attributes.insert("releaseYear".to_string(), json!(year));
            }
        }
        Content::Series(series) => {
            if let Some(seasons) = series.seasons {
                attributes.insert("seasons".to_string(), json!(seasons));
            }
            if let Some(episodes) = series.episodes {
                attributes.insert("episodes".to_string(), json!(episodes));
            }
            if let Some(year) = series.release_year {
                attributes.insert("releaseYear".to_string(), json!(year));
            }
        }
    }

    ContentNode {
        node_type: content.kind().card_type(),
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::{Movie, Series};
    use crate::section::model::SelectionStrategy;
    use chrono::{TimeZone, Utc};

    fn movie(id: i64, title: &str) -> Content {
        Content::Movie(Movie {
            id,
            title: title.into(),
            description: format!("About {title}"),
            poster_url: format!("/posters/{id}.jpg"),
            background_url: format!("/backgrounds/{id}.jpg"),
            link: format!("/watch/{id}"),
            duration_minutes: Some(128),
            release_year: Some(2023),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        })
    }

    fn series(id: i64, title: &str) -> Content {
        Content::Series(Series {
            id,
            title: title.into(),
            description: format!("About {title}"),
            poster_url: format!("/posters/s{id}.jpg"),
            background_url: format!("/backgrounds/s{id}.jpg"),
            link: format!("/watch/s{id}"),
            seasons: Some(3),
            episodes: Some(24),
            release_year: Some(2022),
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
        })
    }

    fn section(id: i64, name: &str, section_type: SectionType) -> Section {
        Section {
            id,
            name: name.into(),
            section_type,
            position: 0,
            strategy: SelectionStrategy::Manual,
            auto_genre_id: None,
            settings: Map::new(),
        }
    }

    fn entry(content: Content) -> ResolvedEntry {
        ResolvedEntry::new(content)
    }

    #[test]
    fn hero_projects_first_entry_only() {
        let hero = section(1, "Hero", SectionType::Hero);
        let entries = vec![entry(movie(1, "Dune")), entry(movie(2, "Arrival"))];

        let node = section_node(&hero, &entries).unwrap();
        assert_eq!(node.node_type, "hero");
        assert!(node.children.is_none());
        assert_eq!(node.attributes["title"], json!("Dune"));
        assert_eq!(node.attributes["backgroundImage"], json!("/backgrounds/1.jpg"));
        assert_eq!(node.attributes["contentKind"], json!("movie"));
        assert_eq!(
            node.attributes["cta"],
            json!({ "text": "Watch Now", "link": "/watch/1" })
        );
    }

    #[test]
    fn empty_hero_is_kept_without_content_fields() {
        let hero = section(1, "Hero", SectionType::Hero);
        let node = section_node(&hero, &[]).unwrap();
        assert_eq!(node.attributes["title"], json!("Hero"));
        assert!(!node.attributes.contains_key("backgroundImage"));
        assert!(!node.attributes.contains_key("cta"));
    }

    #[test]
    fn empty_carousel_is_omitted() {
        let carousel = section(2, "Trending", SectionType::Carousel);
        assert!(section_node(&carousel, &[]).is_none());
    }

    #[test]
    fn cards_carry_kind_specific_fields() {
        let grid = section(3, "All", SectionType::Grid);
        let entries = vec![entry(movie(1, "Dune")), entry(series(2, "Dark"))];

        let node = section_node(&grid, &entries).unwrap();
        let children = node.children.unwrap();
        assert_eq!(children.len(), 2);

        assert_eq!(children[0].node_type, "movie-card");
        assert_eq!(children[0].attributes["duration"], json!(128));
        assert_eq!(children[0].attributes["releaseYear"], json!(2023));
        assert!(!children[0].attributes.contains_key("seasons"));

        assert_eq!(children[1].node_type, "series-card");
        assert_eq!(children[1].attributes["seasons"], json!(3));
        assert_eq!(children[1].attributes["episodes"], json!(24));
        assert_eq!(children[1].attributes["poster"], json!("/posters/s2.jpg"));
    }

    #[test]
    fn settings_title_overrides_section_name() {
        let mut carousel = section(4, "carousel-4", SectionType::Carousel);
        carousel
            .settings
            .insert("title".into(), json!("Staff Picks"));
        carousel.settings.insert("layout".into(), json!("wide"));

        let node = section_node(&carousel, &[entry(movie(1, "Dune"))]).unwrap();
        assert_eq!(node.attributes["title"], json!("Staff Picks"));
        assert_eq!(node.attributes["layout"], json!("wide"));
    }

    #[test]
    fn non_string_title_setting_falls_back_to_name() {
        let mut grid = section(5, "Catalog", SectionType::Grid);
        grid.settings.insert("title".into(), json!(7));

        let node = section_node(&grid, &[entry(movie(1, "Dune"))]).unwrap();
        assert_eq!(node.attributes["title"], json!("Catalog"));
    }

    #[test]
    fn document_orders_sections_and_drops_empty_ones() {
        let hero = section(1, "Hero", SectionType::Hero);
        let empty = section(2, "Empty", SectionType::Carousel);
        let grid = section(3, "All", SectionType::Grid);

        let doc = assemble(&[
            (hero, vec![entry(movie(1, "Dune"))]),
            (empty, vec![]),
            (grid, vec![entry(series(2, "Dark"))]),
        ]);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["type"], json!("page"));
        assert_eq!(value["children"].as_array().unwrap().len(), 2);
        assert_eq!(value["children"][0]["type"], json!("hero"));
        assert_eq!(value["children"][1]["type"], json!("grid"));
    }
}
