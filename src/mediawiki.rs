//! Shapes of the MediaWiki API responses the extractor consumes
//! (`action=query&prop=revisions`, `action=parse&prop=text`,
//! `action=expandtemplates&prop=wikitext`). `Ok(None)` means the API reported the
//! page as missing.

use std::collections::BTreeMap;

use serde::Deserialize;

const MISSING_PAGE_ID: &str = "-1";

#[derive(Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Deserialize)]
struct Query {
    #[serde(default)]
    pages: BTreeMap<String, QueryPage>,
}

#[derive(Deserialize)]
struct QueryPage {
    missing: Option<serde_json::Value>,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Deserialize)]
struct Revision {
    #[serde(rename = "*")]
    content: Option<String>,
    slots: Option<Slots>,
}

#[derive(Deserialize)]
struct Slots {
    main: Star,
}

#[derive(Deserialize)]
struct Star {
    #[serde(rename = "*")]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ParseResponse {
    parse: Option<Parse>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Parse {
    text: Star,
}

#[derive(Deserialize)]
struct ExpandResponse {
    expandtemplates: Option<Expand>,
}

#[derive(Deserialize)]
struct Expand {
    wikitext: Option<String>,
}

/// Wikitext of the first page in a revisions query.
pub fn wikitext_from_query(body: &str) -> serde_json::Result<Option<String>> {
    let resp: QueryResponse = serde_json::from_str(body)?;
    let Some((page_id, page)) = resp.query.and_then(|q| q.pages.into_iter().next()) else {
        return Ok(None);
    };
    if page_id == MISSING_PAGE_ID || page.missing.is_some() {
        return Ok(None);
    }
    Ok(page.revisions.into_iter().next().and_then(|rev| {
        rev.content
            .or_else(|| rev.slots.and_then(|s| s.main.content))
    }))
}

/// Rendered HTML of a parse response; an `error` object counts as missing.
pub fn html_from_parse(body: &str) -> serde_json::Result<Option<String>> {
    let resp: ParseResponse = serde_json::from_str(body)?;
    if resp.error.is_some() {
        return Ok(None);
    }
    Ok(resp.parse.and_then(|p| p.text.content))
}

pub fn wikitext_from_expand(body: &str) -> serde_json::Result<Option<String>> {
    let resp: ExpandResponse = serde_json::from_str(body)?;
    Ok(resp.expandtemplates.and_then(|e| e.wikitext))
}
