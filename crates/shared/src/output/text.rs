use chrono::Utc;
use std::collections::BTreeMap;

use super::Renderer;
use crate::models::Summary;

/// Renders the digest as plain text, suitable for terminals and email
/// bodies.
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, summaries: &[Summary], title: &str) -> String {
        let today = Utc::now().format("%Y-%m-%d");
        let title_line = format!("{title} – {today}");
        let bar = "=".repeat(title_line.chars().count());

        if summaries.is_empty() {
            return format!("{bar}\n{title_line}\n{bar}\n\nNo articles found for this period.\n");
        }

        let mut by_source: BTreeMap<&str, Vec<&Summary>> = BTreeMap::new();
        for summary in summaries {
            by_source.entry(&summary.source).or_default().push(summary);
        }

        let mut out = String::new();
        out.push_str(&format!("{bar}\n{title_line}\n{bar}\n\n"));
        out.push_str(&format!(
            "Total: {} articles from {} sources\n\n",
            summaries.len(),
            by_source.len()
        ));

        for (source, source_summaries) in &by_source {
            out.push_str(&format!("{source}\n{}\n\n", "-".repeat(source.chars().count())));

            for (i, summary) in source_summaries.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, summary.title));
                out.push_str(&format!("   {}\n", summary.url));
                if let Some(published) = summary.published {
                    out.push_str(&format!(
                        "   Published: {}\n",
                        published.format("%Y-%m-%d %H:%M")
                    ));
                }
                out.push('\n');
                out.push_str(&format!("   {}\n", summary.summary));
                if !summary.keywords.is_empty() {
                    out.push_str(&format!("   Keywords: {}\n", summary.keywords.join(", ")));
                }
                out.push('\n');
            }
        }

        out.push_str(&format!(
            "Generated on {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ));

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use chrono::Utc;

    #[test]
    fn test_structure() {
        let article = Article::new(
            "A Post",
            "https://example.com/a-post",
            Utc::now(),
            "Body",
            "Example Blog",
        );
        let summaries = vec![Summary::for_article(&article, "The summary.", vec![])];
        let rendered = TextRenderer.render(&summaries, "Engineering Daily Digest");

        assert!(rendered.contains("Engineering Daily Digest"));
        assert!(rendered.contains("====="));
        assert!(rendered.contains("Example Blog"));
        assert!(rendered.contains("1. A Post"));
        assert!(rendered.contains("https://example.com/a-post"));
        assert!(rendered.contains("The summary."));
    }

    #[test]
    fn test_empty_digest_message() {
        let rendered = TextRenderer.render(&[], "Engineering Daily Digest");
        assert!(rendered.contains("No articles found for this period."));
    }
}
