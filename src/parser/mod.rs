pub mod age;
pub mod dom;
pub mod extract;
pub mod infobox;
pub mod placement;
pub mod record;
pub mod results;
pub mod series;
pub mod wikitext;

use chrono::NaiveDate;
use scraper::Html;
use tracing::{debug, warn};

use crate::source::{optional, FetchError, PageSource};
use extract::PageContext;
use record::PlayerRecord;
use series::SeriesMatcher;

/// Fetch one player's pages and build the record.
///
/// Missing pages only leave fields empty. A hard fetch failure aborts the player
/// so no partial record is produced.
pub fn assemble_player(
    id: &str,
    source: &dyn PageSource,
    matcher: &SeriesMatcher,
    as_of: NaiveDate,
) -> Result<PlayerRecord, FetchError> {
    let wikitext = optional(source.fetch_template_markup(id))?;
    let rendered = optional(source.fetch_rendered_markup(id))?;
    if wikitext.is_none() && rendered.is_none() {
        warn!(id, "no player page found");
    }
    let html = rendered.as_deref().map(Html::parse_document);

    let ctx = PageContext {
        title: id,
        wikitext: wikitext.as_deref(),
        html: html.as_ref(),
        source,
        as_of,
    };
    let fields = extract::extract_all(&ctx)?;

    let rows = optional(source.fetch_results_markup(id))?
        .map(|body| results::parse_results_table(&body))
        .unwrap_or_default();
    let series = matcher.scan(&rows);
    debug!(id, rows = rows.len(), editions = series.participations, "series scanned");

    let age = fields
        .birth_date
        .as_deref()
        .and_then(|d| age::compute_age(d, as_of));

    Ok(record::assemble(id, fields, series, age))
}

// ── Tests ──
