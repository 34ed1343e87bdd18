//! Markdown rendering of a [`TrendingPage`].
//!
//! Each story gets a heading with its representative headline, a line with
//! category, outlet count and freshness, the representative's summary, and a
//! bullet list of the supporting coverage. Headings link back to their anchors
//! from a short table of contents at the top.

use crate::models::{TrendingPage, TrendingStory};
use crate::utils::{format_timestamp, slugify_title, upcase};

/// Escape brackets so text cannot close a `[...](...)` link early.
fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

fn story_heading(rank: usize, story: &TrendingStory) -> String {
    format!("{}. {}", rank, story.representative.title)
}

fn render_story(rank: usize, story: &TrendingStory) -> String {
    let rep = &story.representative;
    let mut md = format!("## {}\n\n", story_heading(rank, story));

    let category = story.category.as_deref().unwrap_or("Uncategorized");
    md.push_str(&format!(
        "*{}* · {} outlets · last update {}\n\n",
        category,
        story.distinct_source_count,
        format_timestamp(story.newest_ms)
    ));

    if let Some(image) = rep.image.as_deref().filter(|s| !s.trim().is_empty()) {
        md.push_str(&format!("![]({})\n\n", image));
    }
    if let Some(summary) = rep.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        md.push_str(&format!("{}\n\n", summary.trim()));
    }

    md.push_str(&format!(
        "- **{}**: [{}]({}) <small>{}</small>\n",
        rep.source,
        escape_link_text(&rep.title),
        rep.link,
        format_timestamp(rep.published_at_ms)
    ));
    for s in &story.supporting {
        md.push_str(&format!(
            "- {}: [{}]({}) <small>{}</small>\n",
            s.source,
            escape_link_text(&s.title),
            s.link,
            format_timestamp(s.published_at_ms)
        ));
    }
    md.push('\n');
    md
}

/// Render a full trending edition.
pub fn trending_page_to_markdown(page: &TrendingPage) -> String {
    let mut md = format!(
        "# Trending stories: {} edition, {}\n\n",
        upcase(&page.time_of_day),
        page.local_date
    );

    if page.stories.is_empty() {
        md.push_str("_No story is being covered by enough outlets right now._\n");
        return md;
    }

    for (i, story) in page.stories.iter().enumerate() {
        let heading = story_heading(i + 1, story);
        md.push_str(&format!("- [{}](#{})\n", escape_link_text(&heading), slugify_title(&heading)));
    }
    md.push('\n');

    for (i, story) in page.stories.iter().enumerate() {
        md.push_str(&render_story(i + 1, story));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalRecord, SupportingRecord};
    use std::collections::BTreeSet;

    fn story() -> TrendingStory {
        TrendingStory {
            representative: CanonicalRecord {
                title: "Fire breaks out downtown".to_string(),
                link: "https://a.example/fire".to_string(),
                source: "A".to_string(),
                summary: Some("Crews responded overnight.".to_string()),
                image: None,
                link_key: "a.example/a/fire".to_string(),
                keywords: BTreeSet::new(),
                published_at_ms: 1_746_532_800_000,
                category: Some("Environment & Disasters".to_string()),
            },
            supporting: vec![SupportingRecord {
                source: "B".to_string(),
                title: "Downtown fire reported".to_string(),
                link: "https://b.example/fire".to_string(),
                published_at_ms: 1_746_532_740_000,
            }],
            distinct_source_count: 2,
            newest_ms: 1_746_532_800_000,
            category: Some("Environment & Disasters".to_string()),
            keywords: BTreeSet::new(),
        }
    }

    fn page(stories: Vec<TrendingStory>) -> TrendingPage {
        TrendingPage {
            local_date: "2025-05-06".to_string(),
            time_of_day: "afternoon".to_string(),
            local_time: "12:00:00".to_string(),
            generated_at_ms: 1_746_532_800_000,
            stories,
        }
    }

    #[test]
    fn test_markdown_contains_story_and_supporting() {
        let md = trending_page_to_markdown(&page(vec![story()]));
        assert!(md.starts_with("# Trending stories: Afternoon edition, 2025-05-06"));
        assert!(md.contains("- [1. Fire breaks out downtown](#1-fire-breaks-out-downtown)"));
        assert!(md.contains("## 1. Fire breaks out downtown"));
        assert!(md.contains("*Environment & Disasters* · 2 outlets · last update 2025-05-06 12:00 UTC"));
        assert!(md.contains("Crews responded overnight."));
        assert!(md.contains("- B: [Downtown fire reported](https://b.example/fire)"));
    }

    #[test]
    fn test_markdown_escapes_brackets_in_link_text() {
        let mut s = story();
        s.representative.title = "Mayor [video] responds to fire".to_string();
        s.supporting[0].title = "Fire update]".to_string();
        let md = trending_page_to_markdown(&page(vec![s]));
        assert!(md.contains("- [1. Mayor \\[video\\] responds to fire](#1-mayor-video-responds-to-fire)"));
        assert!(md.contains("[Mayor \\[video\\] responds to fire](https://a.example/fire)"));
        assert!(md.contains("- B: [Fire update\\]](https://b.example/fire)"));
        assert!(md.contains("## 1. Mayor [video] responds to fire"));
    }

    #[test]
    fn test_markdown_empty_page() {
        let md = trending_page_to_markdown(&page(vec![]));
        assert!(md.contains("No story is being covered"));
    }
}
