//! Digest output renderers.

use serde::{Deserialize, Serialize};

use crate::models::Summary;

mod html;
mod markdown;
mod rss;
mod text;

pub use html::HtmlRenderer;
pub use markdown::MarkdownRenderer;
pub use rss::RssRenderer;
pub use text::TextRenderer;

pub const DEFAULT_DIGEST_TITLE: &str = "Engineering Daily Digest";

/// An output strategy: summaries in, a complete rendered document out.
/// Renderers never fail; an empty digest renders an empty-digest message.
pub trait Renderer {
    fn render(&self, summaries: &[Summary], title: &str) -> String;
}

/// Which renderer to use, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Html,
    Text,
    Rss,
}

impl OutputFormat {
    pub fn create(self) -> Box<dyn Renderer> {
        match self {
            OutputFormat::Markdown => Box::new(MarkdownRenderer),
            OutputFormat::Html => Box::new(HtmlRenderer),
            OutputFormat::Text => Box::new(TextRenderer),
            OutputFormat::Rss => Box::new(RssRenderer::new()),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Text => "txt",
            OutputFormat::Rss => "xml",
        }
    }
}
