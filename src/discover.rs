//! Player list discovery from the yearly `Portal:Statistics/<year>` pages.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::parser::dom::{text_of, LINK_SEL};
use crate::source::{optional, FetchError, PageSource};

static WIKITABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.wikitable").unwrap());
static TH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static WRAPPER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.block-players-wrapper").unwrap());

const WIKI_PREFIX: &str = "/dota2/";
const PLAYER_SUFFIX: &str = "_(player)";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntry {
    pub name: String,
    pub href: String,
    /// Number of statistics pages listing the player.
    pub count: u32,
}

impl PlayerEntry {
    /// `name:href:count`, the line format `run` reads back.
    pub fn to_line(&self) -> String {
        format!("{}:{}:{}", self.name, self.href, self.count)
    }
}

pub fn statistics_title(year: i32) -> String {
    format!("Portal:Statistics/{}", year)
}

/// Page id from a wiki link: `/dota2/Ana_(player)` gives `Ana`.
pub fn player_id_from_href(href: &str) -> String {
    let path = href.rsplit_once(WIKI_PREFIX).map_or(href, |(_, p)| p);
    path.replace(PLAYER_SUFFIX, "")
}

/// `(name, href)` of every player on one statistics page.
///
/// Reads the first `wikitable` whose headers mention both players and earnings.
/// Pages without one fall back to the `block-players-wrapper` cards.
pub fn parse_statistics_page(html: &str) -> Vec<(String, String)> {
    let doc = Html::parse_document(html);
    match earnings_table(&doc) {
        Some(table) => table_players(table),
        None => wrapper_players(&doc),
    }
}

fn earnings_table(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&WIKITABLE_SEL).find(|table| {
        let headers: Vec<String> = table
            .select(&TH_SEL)
            .map(|th| text_of(th).to_lowercase())
            .collect();
        headers.iter().any(|h| h.contains("player")) && headers.iter().any(|h| h.contains("earnings"))
    })
}

fn table_players(table: ElementRef) -> Vec<(String, String)> {
    table
        .select(&TR_SEL)
        .skip(1)
        .filter_map(|row| {
            row.select(&TD_SEL)
                .find_map(|td| td.select(&LINK_SEL).next())
                .and_then(link_entry)
        })
        .collect()
}

fn wrapper_players(doc: &Html) -> Vec<(String, String)> {
    doc.select(&WRAPPER_SEL)
        .filter_map(|wrapper| wrapper.select(&LINK_SEL).next())
        .filter_map(link_entry)
        .collect()
}

fn link_entry(a: ElementRef) -> Option<(String, String)> {
    let href = a.value().attr("href")?.trim();
    let name = text_of(a);
    if name.is_empty() || !href.starts_with(WIKI_PREFIX) {
        return None;
    }
    Some((name, href.to_string()))
}

/// Count how many of the given years list each player.
///
/// Result is sorted by count, highest first; equal counts keep first-seen order.
/// A missing year page is skipped, a hard fetch failure aborts.
pub fn discover(
    source: &dyn PageSource,
    years: impl IntoIterator<Item = i32>,
) -> Result<Vec<PlayerEntry>, FetchError> {
    let mut entries: Vec<PlayerEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for year in years {
        let title = statistics_title(year);
        let Some(html) = optional(source.fetch_rendered_markup(&title))? else {
            warn!(year, "no statistics page");
            continue;
        };
        let players = parse_statistics_page(&html);
        debug!(year, players = players.len(), "statistics page parsed");

        let mut seen_this_year: Vec<String> = Vec::new();
        for (name, href) in players {
            let id = player_id_from_href(&href);
            if id.is_empty() || seen_this_year.contains(&id) {
                continue;
            }
            seen_this_year.push(id.clone());
            match index.get(&id) {
                Some(&i) => entries[i].count += 1,
                None => {
                    index.insert(id, entries.len());
                    entries.push(PlayerEntry { name, href, count: 1 });
                }
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    info!(players = entries.len(), "discovery finished");
    Ok(entries)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MemorySource;
    use crate::source::PageKind;

    fn stats_page(rows: &[(&str, &str)]) -> String {
        let mut html = String::from(
            r#"<table class="wikitable"><tr><th>#</th><th>Team</th></tr></table>
<table class="wikitable sortable"><tr><th>#</th><th>Player</th><th>Earnings</th></tr>"#,
        );
        for (i, (name, href)) in rows.iter().enumerate() {
            html.push_str(&format!(
                r#"<tr><td>{}</td><td><span class="flag"></span><a href="{}">{}</a></td><td>$1,000</td></tr>"#,
                i + 1,
                href,
                name
            ));
        }
        html.push_str("</table>");
        html
    }

    #[test]
    fn ids_from_hrefs() {
        assert_eq!(player_id_from_href("/dota2/SumaiL"), "SumaiL");
        assert_eq!(player_id_from_href("/dota2/Ana_(player)"), "Ana");
        assert_eq!(player_id_from_href("Miracle-"), "Miracle-");
    }

    #[test]
    fn earnings_table_rows() {
        let html = stats_page(&[("N0tail", "/dota2/N0tail"), ("Ana", "/dota2/Ana_(player)")]);
        assert_eq!(
            parse_statistics_page(&html),
            vec![
                ("N0tail".to_string(), "/dota2/N0tail".to_string()),
                ("Ana".to_string(), "/dota2/Ana_(player)".to_string()),
            ]
        );
    }

    #[test]
    fn wrapper_fallback() {
        let html = r#"
<div class="block-players-wrapper"><a href="/dota2/Dendi">Dendi</a><a href="/dota2/Na%27Vi">Na'Vi</a></div>
<div class="block-players-wrapper"><a href="https://example.org/x">elsewhere</a></div>
<div class="block-players-wrapper"><a href="/dota2/Puppey">Puppey</a></div>"#;
        assert_eq!(
            parse_statistics_page(html),
            vec![
                ("Dendi".to_string(), "/dota2/Dendi".to_string()),
                ("Puppey".to_string(), "/dota2/Puppey".to_string()),
            ]
        );
        assert!(parse_statistics_page("<p>nothing here</p>").is_empty());
    }

    #[test]
    fn counts_across_years() {
        let src = MemorySource::default()
            .with(
                PageKind::Rendered,
                "Portal:Statistics/2018",
                &stats_page(&[("Ana", "/dota2/Ana_(player)"), ("Ceb", "/dota2/Ceb")]),
            )
            .with(
                PageKind::Rendered,
                "Portal:Statistics/2019",
                &stats_page(&[("Topson", "/dota2/Topson"), ("Ana", "/dota2/Ana_(player)")]),
            );

        let entries = discover(&src, 2017..=2019).unwrap();
        let lines: Vec<String> = entries.iter().map(PlayerEntry::to_line).collect();
        assert_eq!(
            lines,
            vec!["Ana:/dota2/Ana_(player):2", "Ceb:/dota2/Ceb:1", "Topson:/dota2/Topson:1"]
        );
        assert_eq!(player_id_from_href(&entries[0].href), "Ana");
    }

    #[test]
    fn repeated_row_counts_once_per_year() {
        let src = MemorySource::default().with(
            PageKind::Rendered,
            "Portal:Statistics/2015",
            &stats_page(&[("SumaiL", "/dota2/SumaiL"), ("SumaiL", "/dota2/SumaiL")]),
        );
        let entries = discover(&src, [2015]).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].count, 1);
    }

    #[test]
    fn hard_failure_stops_discovery() {
        let src = MemorySource::default().failing("Portal:Statistics/2020");
        let err = discover(&src, [2020]).unwrap_err();
        assert!(matches!(err, FetchError::Failed { .. }));
    }
}
