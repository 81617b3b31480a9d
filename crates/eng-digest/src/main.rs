use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use shared::{
    io, ArticleDatabase, ArticleFilter, Config, ContentExtractor, DigestData, FeedFetcher,
    KeywordExtractor, OutputFormat, SummaryMethod, DEFAULT_DIGEST_TITLE,
};
use std::fs;
use std::path::PathBuf;

/// History older than this is pruned at the end of each run.
const HISTORY_RETENTION_DAYS: i64 = 90;

#[derive(Parser)]
#[command(name = "eng-digest")]
#[command(about = "Fetch, summarize and render a digest of engineering blog posts")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured summarization method (first_paragraph, textrank)
    #[arg(short, long)]
    method: Option<String>,

    /// Override the configured output format (markdown, html, text, rss)
    #[arg(short, long)]
    format: Option<String>,

    /// Override the lookback window in hours
    #[arg(long)]
    lookback_hours: Option<i64>,

    /// Path to the history database
    #[arg(long)]
    db: Option<PathBuf>,

    /// Skip history entirely: no deduplication, nothing recorded
    #[arg(long)]
    no_db: bool,
}

fn parse_method(raw: &str) -> Result<SummaryMethod> {
    match raw {
        "first_paragraph" => Ok(SummaryMethod::FirstParagraph),
        "textrank" => Ok(SummaryMethod::TextRank),
        _ => anyhow::bail!("Unknown method: {raw}. Use 'first_paragraph' or 'textrank'"),
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat> {
    match raw {
        "markdown" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        "text" => Ok(OutputFormat::Text),
        "rss" => Ok(OutputFormat::Rss),
        _ => anyhow::bail!("Unknown format: {raw}. Use 'markdown', 'html', 'text' or 'rss'"),
    }
}

fn default_db_path() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("eng-digest");
    fs::create_dir_all(&dir).context("Failed to create data directory")?;
    Ok(dir.join("history.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(method) = args.method.as_deref() {
        config.summary.method = parse_method(method)?;
    }
    if let Some(format) = args.format.as_deref() {
        config.output.format = parse_format(format)?;
    }
    if let Some(hours) = args.lookback_hours {
        config.fetch.lookback_hours = hours;
    }

    let enabled = config.blogs.iter().filter(|b| b.enabled).count();
    println!("📚 Fetching articles from {} blogs...", enabled);

    let fetcher = FeedFetcher::new()?;
    let articles = fetcher.fetch_all(&config.blogs).await;
    println!("✓ Fetched {} articles", articles.len());

    if articles.is_empty() {
        println!("No articles found for the configured sources.");
        return Ok(());
    }

    let database = if args.no_db {
        None
    } else {
        let path = match args.db.clone() {
            Some(path) => path,
            None => default_db_path()?,
        };
        Some(ArticleDatabase::open(&path)?)
    };

    let fresh = match &database {
        Some(db) => {
            let mut fresh = Vec::new();
            for article in articles {
                if !db.contains(&article.url)? {
                    fresh.push(article);
                }
            }
            fresh
        }
        None => articles,
    };
    println!("✓ {} articles after deduplication", fresh.len());

    if fresh.is_empty() {
        println!("Nothing new since the last digest.");
        return Ok(());
    }

    let filter = ArticleFilter::new(
        config.fetch.lookback_hours,
        config.fetch.max_posts_per_blog,
        config.fetch.max_total_posts,
    );
    let filtered = filter.filter(fresh);
    println!("✓ {} articles after filtering", filtered.len());

    if filtered.is_empty() {
        println!("No articles match the filter criteria.");
        return Ok(());
    }

    println!("🌐 Fetching full content for stub entries...");
    let extractor = ContentExtractor::new()?;
    let enriched = extractor.enrich_articles(filtered).await;

    println!("📝 Summarizing articles...");
    let summarizer = config.summary.method.create(config.summary.sentences);
    let mut summaries = summarizer.summarize_batch(&enriched);

    // The extractive path leaves keywords empty; fill them with a TF-IDF
    // pass over the whole batch. Fallback summaries of empty articles get
    // an empty list back, which is what downstream expects.
    if summaries.iter().any(|s| s.keywords.is_empty()) {
        let texts: Vec<&str> = enriched.iter().map(|a| a.content.as_str()).collect();
        let keyword_lists = KeywordExtractor::new().extract_batch(&texts);
        for (summary, keywords) in summaries.iter_mut().zip(keyword_lists) {
            if summary.keywords.is_empty() {
                summary.keywords = keywords;
            }
        }
    }

    println!("🖋  Rendering digest...");
    let renderer = config.output.format.create();
    let digest = renderer.render(&summaries, DEFAULT_DIGEST_TITLE);

    let now = Utc::now();
    let output_dir = io::ensure_output_dir(&config.output.path)?;
    let digest_path = io::save_digest(&output_dir, config.output.format, now, &digest)?;
    io::save_digest_data(&output_dir, now, &DigestData::new(summaries.clone()))?;

    if let Some(db) = &database {
        for (article, summary) in enriched.iter().zip(summaries.iter()) {
            db.insert_article(article, Some(summary))?;
        }
        let pruned = db.prune(HISTORY_RETENTION_DAYS)?;
        if pruned > 0 {
            println!("✓ Pruned {} old history entries", pruned);
        }
    }

    println!("✅ Digest saved to {}", digest_path.display());

    Ok(())
}
