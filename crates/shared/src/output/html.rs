use chrono::Utc;
use std::collections::BTreeMap;

use super::Renderer;
use crate::models::Summary;

/// Renders the digest as a self-contained static HTML page.
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, summaries: &[Summary], title: &str) -> String {
        let today = Utc::now().format("%Y-%m-%d");
        let page_title = format!("{title} – {today}");

        let mut body = String::new();
        body.push_str(&format!("<h1>{}</h1>\n", escape_html(&page_title)));

        if summaries.is_empty() {
            body.push_str("<p>No articles found for this period.</p>\n");
        } else {
            let mut by_source: BTreeMap<&str, Vec<&Summary>> = BTreeMap::new();
            for summary in summaries {
                by_source.entry(&summary.source).or_default().push(summary);
            }

            body.push_str(&format!(
                "<p class=\"stats\">{} articles from {} sources</p>\n",
                summaries.len(),
                by_source.len()
            ));

            for (source, source_summaries) in &by_source {
                body.push_str(&format!("<h2>{}</h2>\n", escape_html(source)));

                for summary in source_summaries {
                    body.push_str("<article>\n");
                    body.push_str(&format!(
                        "<h3><a href=\"{}\">{}</a></h3>\n",
                        escape_html(&summary.url),
                        escape_html(&summary.title)
                    ));
                    if let Some(published) = summary.published {
                        body.push_str(&format!(
                            "<p class=\"published\">{}</p>\n",
                            published.format("%Y-%m-%d %H:%M")
                        ));
                    }
                    body.push_str(&format!("<p>{}</p>\n", escape_html(&summary.summary)));
                    if !summary.keywords.is_empty() {
                        body.push_str(&format!(
                            "<p class=\"keywords\"><em>{}</em></p>\n",
                            escape_html(&summary.keywords.join(", "))
                        ));
                    }
                    body.push_str("</article>\n");
                }
            }
        }

        body.push_str(&format!(
            "<footer>Generated on {}</footer>\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ));

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_html(&page_title),
            body
        )
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use chrono::Utc;

    // ==================== HTML Escaping Tests ====================

    #[test]
    fn test_escape_html_ampersand() {
        assert_eq!(escape_html("A & B"), "A &amp; B");
    }

    #[test]
    fn test_escape_html_angle_brackets() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
    }

    #[test]
    fn test_escape_html_quotes() {
        assert_eq!(escape_html("He said \"hello\""), "He said &quot;hello&quot;");
    }

    #[test]
    fn test_escape_html_single_quotes() {
        assert_eq!(escape_html("It's here"), "It&#39;s here");
    }

    #[test]
    fn test_escape_html_combined() {
        assert_eq!(
            escape_html("<a href=\"test\">Click & Go</a>"),
            "&lt;a href=&quot;test&quot;&gt;Click &amp; Go&lt;/a&gt;"
        );
    }

    // ==================== Rendering Tests ====================

    #[test]
    fn test_page_structure_and_escaping() {
        let article = Article::new(
            "Traits & Objects",
            "https://example.com/traits?a=1&b=2",
            Utc::now(),
            "Body",
            "Example Blog",
        );
        let summaries = vec![Summary::for_article(&article, "Summary <text>.", vec![])];
        let rendered = HtmlRenderer.render(&summaries, "Engineering Daily Digest");

        assert!(rendered.starts_with("<!DOCTYPE html>"));
        assert!(rendered.contains("Traits &amp; Objects"));
        assert!(rendered.contains("https://example.com/traits?a=1&amp;b=2"));
        assert!(rendered.contains("Summary &lt;text&gt;."));
        assert!(!rendered.contains("<script>"));
    }

    #[test]
    fn test_empty_digest_message() {
        let rendered = HtmlRenderer.render(&[], "Engineering Daily Digest");
        assert!(rendered.contains("No articles found for this period."));
    }
}
