use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::parser::record::PlayerRecord;

pub const DEFAULT_DB_PATH: &str = "data/liquiscrape.sqlite";

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating database directory {}", dir.display()))?;
    }
    let conn = Connection::open(path).with_context(|| format!("opening database {}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS page_cache (
            kind       TEXT NOT NULL,
            key        TEXT NOT NULL,
            body       TEXT NOT NULL,
            fetched_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (kind, key)
        );

        CREATE TABLE IF NOT EXISTS records (
            id            TEXT PRIMARY KEY,
            json          TEXT NOT NULL,
            empty_history BOOLEAN NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS failures (
            id        TEXT PRIMARY KEY,
            reason    TEXT NOT NULL,
            failed_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

// ── Records ──

/// Ids that already have a stored record.
pub fn processed_ids(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT id FROM records")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(ids)
}

/// Store a finished record, clearing any earlier failure for the same id.
pub fn save_record(conn: &Connection, record: &PlayerRecord) -> Result<()> {
    let json = serde_json::to_string(record)?;
    let tx = conn.unchecked_transaction()?;
    {
        let mut insert = tx.prepare_cached(
            "INSERT OR REPLACE INTO records (id, json, empty_history) VALUES (?1, ?2, ?3)",
        )?;
        insert.execute(rusqlite::params![
            record.id,
            json,
            record.history_teams.is_empty()
        ])?;
        let mut clear = tx.prepare_cached("DELETE FROM failures WHERE id = ?1")?;
        clear.execute([&record.id])?;
    }
    tx.commit()?;
    Ok(())
}

pub fn save_failure(conn: &Connection, id: &str, reason: &str) -> Result<()> {
    let mut stmt =
        conn.prepare_cached("INSERT OR REPLACE INTO failures (id, reason) VALUES (?1, ?2)")?;
    stmt.execute([id, reason])?;
    Ok(())
}

/// Stored records in insertion order.
pub fn fetch_records(conn: &Connection) -> Result<Vec<PlayerRecord>> {
    let mut stmt = conn.prepare("SELECT id, json FROM records ORDER BY rowid")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter()
        .map(|(id, json)| {
            serde_json::from_str(&json).with_context(|| format!("decoding stored record {}", id))
        })
        .collect()
}

pub fn fetch_failures(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT id, reason FROM failures ORDER BY failed_at, id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub records: usize,
    pub failures: usize,
    pub cached_pages: usize,
    pub empty_history: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let records: usize = conn.query_row("SELECT COUNT(*) FROM records", [], |r| r.get(0))?;
    let failures: usize = conn.query_row("SELECT COUNT(*) FROM failures", [], |r| r.get(0))?;
    let cached_pages: usize =
        conn.query_row("SELECT COUNT(*) FROM page_cache", [], |r| r.get(0))?;
    let empty_history: usize = conn.query_row(
        "SELECT COUNT(*) FROM records WHERE empty_history = 1",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats {
        records,
        failures,
        cached_pages,
        empty_history,
    })
}

// ── Tests ──
