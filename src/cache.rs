use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::db;
use crate::source::PageKind;

/// Raw API bodies keyed by (kind, title). Owned by the caller and handed to a
/// [`crate::source::CachedSource`]; nothing here is process-global.
pub struct PageCache {
    conn: Connection,
}

impl PageCache {
    pub fn open(path: &str) -> Result<Self> {
        let conn = db::connect(path)?;
        db::init_schema(&conn)?;
        Ok(Self::new(conn))
    }

    /// Wrap a connection whose schema is already initialized.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, kind: PageKind, key: &str) -> Result<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM page_cache WHERE kind = ?1 AND key = ?2",
                rusqlite::params![kind.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body)
    }

    pub fn put(&self, kind: PageKind, key: &str, body: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO page_cache (kind, key, body) VALUES (?1, ?2, ?3)",
            rusqlite::params![kind.as_str(), key, body],
        )?;
        Ok(())
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> PageCache {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        PageCache::new(conn)
    }

    #[test]
    fn get_put_by_kind() {
        let c = cache();
        assert_eq!(c.get(PageKind::Template, "Ana").unwrap(), None);
        c.put(PageKind::Template, "Ana", "wikitext").unwrap();
        c.put(PageKind::Rendered, "Ana", "<html>").unwrap();
        assert_eq!(c.get(PageKind::Template, "Ana").unwrap().as_deref(), Some("wikitext"));
        assert_eq!(c.get(PageKind::Rendered, "Ana").unwrap().as_deref(), Some("<html>"));
        assert_eq!(db::get_stats(&c.conn).unwrap().cached_pages, 2);
    }

    #[test]
    fn put_replaces() {
        let c = cache();
        c.put(PageKind::Results, "Ana", "old").unwrap();
        c.put(PageKind::Results, "Ana", "new").unwrap();
        assert_eq!(c.get(PageKind::Results, "Ana").unwrap().as_deref(), Some("new"));
        assert_eq!(db::get_stats(&c.conn).unwrap().cached_pages, 1);
    }
}
