use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::PageCache;
use crate::mediawiki;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page not found: {0}")]
    NotFound(String),

    #[error("fetching {title} failed: {reason}")]
    Failed { title: String, reason: String },
}

impl FetchError {
    pub fn failed(title: &str, reason: impl ToString) -> Self {
        FetchError::Failed {
            title: title.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Turn `NotFound` into `None`, keeping hard failures as errors.
pub fn optional(result: Result<String, FetchError>) -> Result<Option<String>, FetchError> {
    match result {
        Ok(body) => Ok(Some(body)),
        Err(FetchError::NotFound(title)) => {
            debug!(%title, "not found");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Where raw page markup comes from. Retries and rate limiting belong to the
/// implementation; callers only see a body, `NotFound`, or a final failure.
pub trait PageSource {
    /// Wikitext of a page.
    fn fetch_template_markup(&self, title: &str) -> Result<String, FetchError>;
    /// Rendered HTML of a page.
    fn fetch_rendered_markup(&self, title: &str) -> Result<String, FetchError>;
    /// Rendered HTML of the page's `/Results` sub-page.
    fn fetch_results_markup(&self, title: &str) -> Result<String, FetchError>;
    /// Wikitext produced by expanding `{{name|args..}}`.
    fn expand_named_template(&self, name: &str, args: &[&str]) -> Result<String, FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Template,
    Rendered,
    Results,
    Expanded,
}

impl PageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Template => "template",
            PageKind::Rendered => "rendered",
            PageKind::Results => "results",
            PageKind::Expanded => "expanded",
        }
    }
}

pub fn results_title(title: &str) -> String {
    format!("{}/Results", title)
}

pub fn template_call(name: &str, args: &[&str]) -> String {
    let mut call = format!("{{{{{}", name);
    for arg in args {
        call.push('|');
        call.push_str(arg);
    }
    call.push_str("}}");
    call
}

// ── Saved API responses ──

/// Reads MediaWiki API responses saved as JSON files:
/// `query/<title>.json` (revisions), `parse/<title>.json` (rendered text) and
/// `expand/<call>.json` (expandtemplates).
pub struct DumpSource {
    root: PathBuf,
}

impl DumpSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, dir: &str, key: &str) -> Result<String, FetchError> {
        let path = self.root.join(dir).join(format!("{}.json", file_stem(key)));
        read_file(&path, key)
    }

    fn parse_page(&self, title: &str) -> Result<String, FetchError> {
        let body = self.read("parse", title)?;
        mediawiki::html_from_parse(&body)
            .map_err(|e| FetchError::failed(title, e))?
            .ok_or_else(|| FetchError::NotFound(title.to_string()))
    }
}

impl PageSource for DumpSource {
    fn fetch_template_markup(&self, title: &str) -> Result<String, FetchError> {
        let body = self.read("query", title)?;
        mediawiki::wikitext_from_query(&body)
            .map_err(|e| FetchError::failed(title, e))?
            .ok_or_else(|| FetchError::NotFound(title.to_string()))
    }

    fn fetch_rendered_markup(&self, title: &str) -> Result<String, FetchError> {
        self.parse_page(title)
    }

    fn fetch_results_markup(&self, title: &str) -> Result<String, FetchError> {
        self.parse_page(&results_title(title))
    }

    fn expand_named_template(&self, name: &str, args: &[&str]) -> Result<String, FetchError> {
        let call = template_call(name, args);
        let body = self.read("expand", &call)?;
        mediawiki::wikitext_from_expand(&body)
            .map_err(|e| FetchError::failed(&call, e))?
            .ok_or_else(|| FetchError::NotFound(call))
    }
}

fn read_file(path: &Path, key: &str) -> Result<String, FetchError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FetchError::NotFound(key.to_string()),
        _ => FetchError::failed(key, format!("{}: {}", path.display(), e)),
    })
}

/// Filesystem-safe name for a title or template call.
pub fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '.' | '(' | ')' | '\'') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ── Caching wrapper ──

/// Serves bodies from a [`PageCache`] and stores every successful fetch of the
/// wrapped source. Misses are never cached.
pub struct CachedSource<S> {
    inner: S,
    cache: PageCache,
}

impl<S: PageSource> CachedSource<S> {
    pub fn new(inner: S, cache: PageCache) -> Self {
        Self { inner, cache }
    }

    fn cached(
        &self,
        kind: PageKind,
        key: &str,
        fetch: impl FnOnce() -> Result<String, FetchError>,
    ) -> Result<String, FetchError> {
        match self.cache.get(kind, key) {
            Ok(Some(body)) => {
                debug!(kind = kind.as_str(), key, "cache hit");
                return Ok(body);
            }
            Ok(None) => {}
            Err(e) => warn!(kind = kind.as_str(), key, "cache read failed: {:#}", e),
        }

        let body = fetch()?;
        if let Err(e) = self.cache.put(kind, key, &body) {
            warn!(kind = kind.as_str(), key, "cache write failed: {:#}", e);
        }
        Ok(body)
    }
}

impl<S: PageSource> PageSource for CachedSource<S> {
    fn fetch_template_markup(&self, title: &str) -> Result<String, FetchError> {
        self.cached(PageKind::Template, title, || self.inner.fetch_template_markup(title))
    }

    fn fetch_rendered_markup(&self, title: &str) -> Result<String, FetchError> {
        self.cached(PageKind::Rendered, title, || self.inner.fetch_rendered_markup(title))
    }

    fn fetch_results_markup(&self, title: &str) -> Result<String, FetchError> {
        self.cached(PageKind::Results, title, || self.inner.fetch_results_markup(title))
    }

    fn expand_named_template(&self, name: &str, args: &[&str]) -> Result<String, FetchError> {
        let call = template_call(name, args);
        self.cached(PageKind::Expanded, &call, || {
            self.inner.expand_named_template(name, args)
        })
    }
}

// ── In-memory source for tests ──

#[cfg(test)]
pub mod testing {
    use std::cell::Cell;
    use std::collections::HashMap;

    use super::*;

    /// Pages keyed by (kind, title or template call). Titles listed in `broken`
    /// fail hard for every kind.
    #[derive(Default)]
    pub struct MemorySource {
        pages: HashMap<(&'static str, String), String>,
        broken: Vec<String>,
        pub calls: Cell<usize>,
    }

    impl MemorySource {
        pub fn with(mut self, kind: PageKind, key: &str, body: &str) -> Self {
            self.pages
                .insert((kind.as_str(), key.to_string()), body.to_string());
            self
        }

        /// Make every fetch whose key contains `key` fail hard.
        pub fn failing(mut self, key: &str) -> Self {
            self.broken.push(key.to_string());
            self
        }

        fn get(&self, kind: PageKind, key: &str) -> Result<String, FetchError> {
            self.calls.set(self.calls.get() + 1);
            if self.broken.iter().any(|b| key.contains(b.as_str())) {
                return Err(FetchError::failed(key, "HTTP 503 after retries"));
            }
            self.pages
                .get(&(kind.as_str(), key.to_string()))
                .cloned()
                .ok_or_else(|| FetchError::NotFound(key.to_string()))
        }
    }

    impl PageSource for MemorySource {
        fn fetch_template_markup(&self, title: &str) -> Result<String, FetchError> {
            self.get(PageKind::Template, title)
        }

        fn fetch_rendered_markup(&self, title: &str) -> Result<String, FetchError> {
            self.get(PageKind::Rendered, title)
        }

        fn fetch_results_markup(&self, title: &str) -> Result<String, FetchError> {
            self.get(PageKind::Results, title)
        }

        fn expand_named_template(&self, name: &str, args: &[&str]) -> Result<String, FetchError> {
            self.get(PageKind::Expanded, &template_call(name, args))
        }
    }
}

// ── Tests ──
