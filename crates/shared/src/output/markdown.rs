use chrono::Utc;
use std::collections::BTreeMap;

use super::Renderer;
use crate::models::Summary;

/// Renders the digest as Markdown, grouped by source.
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, summaries: &[Summary], title: &str) -> String {
        let today = Utc::now().format("%Y-%m-%d");

        if summaries.is_empty() {
            return format!(
                "# {title} – {today}\n\nNo articles found for this period.\n\n\
                 *Generated on {}*\n",
                Utc::now().format("%Y-%m-%d %H:%M:%S")
            );
        }

        // BTreeMap keeps sources in sorted order.
        let mut by_source: BTreeMap<&str, Vec<&Summary>> = BTreeMap::new();
        for summary in summaries {
            by_source.entry(&summary.source).or_default().push(summary);
        }

        let mut lines: Vec<String> = Vec::new();
        lines.push(format!("# {title} – {today}"));
        lines.push(String::new());
        lines.push(format!(
            "**Total Articles:** {} from {} sources",
            summaries.len(),
            by_source.len()
        ));
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());

        for (source, source_summaries) in &by_source {
            lines.push(format!("## {source}"));
            lines.push(String::new());

            for (i, summary) in source_summaries.iter().enumerate() {
                lines.push(format!("### {}. {}", i + 1, summary.title));
                lines.push(String::new());
                lines.push(format!("**URL:** {}", summary.url));
                lines.push(String::new());

                if let Some(published) = summary.published {
                    lines.push(format!(
                        "**Published:** {}",
                        published.format("%Y-%m-%d %H:%M")
                    ));
                    lines.push(String::new());
                }

                lines.push("**Summary:**".to_string());
                lines.push(String::new());
                lines.push(summary.summary.clone());
                lines.push(String::new());

                if !summary.keywords.is_empty() {
                    lines.push(format!("**Keywords:** {}", summary.keywords.join(", ")));
                    lines.push(String::new());
                }

                if i + 1 < source_summaries.len() {
                    lines.push("---".to_string());
                    lines.push(String::new());
                }
            }
        }

        lines.push("---".to_string());
        lines.push(String::new());
        lines.push(format!(
            "*Generated on {}*",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ));

        lines.join("\n")
    }
}
