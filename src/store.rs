use std::path::Path;

use anyhow::Context;
use rusqlite::{params, Connection};

use crate::ir::TranslationPair;

/// SQLite-backed store for translation pairs. Duplicate pairs are rejected at
/// the database level via a UNIQUE constraint over all four fields, making
/// inserts idempotent.
pub struct TranslationStore {
    conn: Connection,
}

impl TranslationStore {
    /// Open (or create) the store at `path`, creating the parent directory
    /// when missing.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create data dir: {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open store: {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store, used in tests.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory store")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a pair unless an identical one is already stored. Returns
    /// whether a row was actually inserted.
    pub fn insert_if_absent(&self, pair: &TranslationPair) -> anyhow::Result<bool> {
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO translation_pairs
                 (source_language, target_language, sentence, translation)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    pair.source_language,
                    pair.target_language,
                    pair.sentence,
                    pair.translation
                ],
            )
            .context("insert translation pair")?;
        Ok(inserted > 0)
    }

    /// All pairs for a language pair, in insertion order. The ranker's
    /// tie-break preserves this order, so it must be deterministic.
    pub fn fetch(
        &self,
        source_language: &str,
        target_language: &str,
    ) -> anyhow::Result<Vec<TranslationPair>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT source_language, target_language, sentence, translation
                 FROM translation_pairs
                 WHERE source_language = ?1 AND target_language = ?2
                 ORDER BY id",
            )
            .context("prepare fetch")?;
        let rows = stmt
            .query_map(params![source_language, target_language], |row| {
                Ok(TranslationPair {
                    source_language: row.get(0)?,
                    target_language: row.get(1)?,
                    sentence: row.get(2)?,
                    translation: row.get(3)?,
                })
            })
            .context("fetch translation pairs")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("read translation pair row")?);
        }
        Ok(out)
    }

    pub fn count(&self) -> anyhow::Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM translation_pairs", [], |row| {
                row.get(0)
            })
            .context("count translation pairs")?;
        Ok(n as u64)
    }
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS translation_pairs (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             source_language TEXT NOT NULL,
             target_language TEXT NOT NULL,
             sentence TEXT NOT NULL,
             translation TEXT NOT NULL,
             UNIQUE(source_language, target_language, sentence, translation)
         )",
    )
    .context("init store schema")?;
    Ok(())
}
