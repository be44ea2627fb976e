use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::dom::{has_class, text_of, LINK_SEL};

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.wikitable").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static PLACEMENT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("b.placement-text").unwrap());

const HIGHLIGHT_CLASS: &str = "tournament-highlighted-bg";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultCell {
    pub text: String,
    /// Text of the first link in the cell, if it has a non-empty one.
    pub link_text: Option<String>,
    /// Text of a `<b class="placement-text">` badge, if present.
    pub placement_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    pub cells: Vec<ResultCell>,
    pub highlighted: bool,
}

/// Rows of the first `wikitable` on a player's results page, header row included.
/// A page without such a table yields no rows.
pub fn parse_results_table(html: &str) -> Vec<ResultRow> {
    let doc = Html::parse_document(html);
    let Some(table) = doc.select(&TABLE_SEL).next() else {
        return Vec::new();
    };

    table
        .select(&ROW_SEL)
        .map(|row| ResultRow {
            cells: row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| c.value().name() == "td")
                .map(parse_cell)
                .collect(),
            highlighted: has_class(row, HIGHLIGHT_CLASS),
        })
        .collect()
}

fn parse_cell(cell: ElementRef) -> ResultCell {
    let link_text = cell
        .select(&LINK_SEL)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty());
    let placement_text = cell.select(&PLACEMENT_SEL).next().map(text_of);

    ResultCell {
        text: text_of(cell),
        link_text,
        placement_text,
    }
}

// ── Tests ──
