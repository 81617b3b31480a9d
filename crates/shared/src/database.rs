use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::models::{Article, Summary};

/// SQLite-backed article history. Its main job is deduplication: an
/// article URL seen in a previous run never re-enters a digest.
pub struct ArticleDatabase {
    conn: Connection,
}

impl ArticleDatabase {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Self::init(conn)
    }

    /// In-memory database, used by tests and `--no-db` dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT UNIQUE NOT NULL,
                url_hash TEXT UNIQUE NOT NULL,
                title TEXT NOT NULL,
                summary TEXT,
                source TEXT NOT NULL,
                published TEXT,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_url_hash ON articles(url_hash);
            CREATE INDEX IF NOT EXISTS idx_source ON articles(source);
            CREATE INDEX IF NOT EXISTS idx_published ON articles(published DESC);",
        )
        .context("Failed to initialize database schema")?;

        Ok(Self { conn })
    }

    /// Insert an article, returning false when its URL was already
    /// recorded.
    pub fn insert_article(&self, article: &Article, summary: Option<&Summary>) -> Result<bool> {
        let url_hash = hash_url(&article.url);
        let summary_text = summary.map(|s| s.summary.as_str());

        let result = self.conn.execute(
            "INSERT INTO articles (url, url_hash, title, summary, source, published)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                article.url,
                url_hash,
                article.title,
                summary_text,
                article.source,
                article.published.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(false)
            }
            Err(e) => Err(e).context("Failed to insert article"),
        }
    }

    pub fn contains(&self, url: &str) -> Result<bool> {
        let url_hash = hash_url(url);
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM articles WHERE url_hash = ?1")
            .context("Failed to prepare lookup")?;
        let exists = stmt
            .exists(params![url_hash])
            .context("Failed to query article")?;
        Ok(exists)
    }

    /// Titles and sources of the most recently recorded articles, newest
    /// first.
    pub fn recent(&self, limit: usize) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT title, source FROM articles
                 ORDER BY created_at DESC, id DESC LIMIT ?1",
            )
            .context("Failed to prepare recent query")?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .context("Failed to query recent articles")?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.context("Failed to read row")?);
        }
        Ok(results)
    }

    /// Delete history older than the retention window. Returns the number
    /// of rows removed.
    pub fn prune(&self, retention_days: i64) -> Result<usize> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM articles
                 WHERE created_at < datetime('now', ?1)",
                params![format!("-{retention_days} days")],
            )
            .context("Failed to prune history")?;
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))
            .context("Failed to count articles")?;
        Ok(count as usize)
    }
}

fn hash_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}
