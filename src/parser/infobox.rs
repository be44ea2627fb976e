//! Landmark lookups in a rendered player page.
//!
//! Liquipedia renders the infobox as label/value `div` pairs
//! (`<div>Nationality:</div><div>...</div>`), so most fields are "find the label,
//! take its next sibling". Team history sits in a table under a `History` label.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::dom::{has_class, link_texts, link_titles, next_element_sibling, split_list, text_of};

static DIV_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());
static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static INACTIVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)inactive").unwrap());
static INFOBOX_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.fo-nttax-infobox-wrapper, div.fo-nttax-infobox").unwrap());
static LEAD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

const HISTORY_LABEL: &str = "History";
const HISTORY_TABLE_CLASS: &str = "infobox-center";
const TEAM_MARKER: &str = "Team:";

/// Value cell next to the first text-only `div` whose text starts with `label`.
pub fn label_sibling<'a>(doc: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    doc.select(&DIV_SEL)
        .filter(|div| is_text_only(*div))
        .find(|div| text_of(*div).starts_with(label))
        .and_then(next_element_sibling)
}

/// Whole text of a labelled value cell.
pub fn label_text(doc: &Html, label: &str) -> Vec<String> {
    label_sibling(doc, label)
        .map(text_of)
        .filter(|t| !t.is_empty())
        .into_iter()
        .collect()
}

/// Link texts of a labelled value cell, falling back to its comma separated text.
pub fn label_links(doc: &Html, label: &str) -> Vec<String> {
    let Some(cell) = label_sibling(doc, label) else {
        return Vec::new();
    };
    let links: Vec<String> = link_texts(cell).into_iter().filter(|t| !t.is_empty()).collect();
    if links.is_empty() {
        split_list(&text_of(cell))
    } else {
        links
    }
}

/// Like [`label_links`] but reads link `title` attributes, which is where hero
/// icons keep the hero name.
pub fn label_link_titles(doc: &Html, label: &str) -> Vec<String> {
    let Some(cell) = label_sibling(doc, label) else {
        return Vec::new();
    };
    let titles: Vec<String> = link_titles(cell).into_iter().filter(|t| !t.is_empty()).collect();
    if titles.is_empty() {
        split_list(&text_of(cell))
    } else {
        titles
    }
}

/// Team links in the first `infobox-center` table following the `History` label.
pub fn history_table_teams(doc: &Html) -> Vec<String> {
    let mut seen_label = false;
    for el in doc.root_element().descendants().filter_map(ElementRef::wrap) {
        if el.value().name() != "div" {
            continue;
        }
        if !seen_label {
            seen_label = is_text_only(el) && text_of(el) == HISTORY_LABEL;
            continue;
        }
        if has_class(el, HISTORY_TABLE_CLASS) {
            return el
                .select(&TABLE_SEL)
                .next()
                .map(link_texts)
                .unwrap_or_default();
        }
    }
    Vec::new()
}

/// Text of the first link after a `Team:` text node.
pub fn team_landmark(doc: &Html) -> Option<String> {
    let mut seen_marker = false;
    for node in doc.root_element().descendants() {
        if !seen_marker {
            seen_marker = node.value().as_text().is_some_and(|t| t.contains(TEAM_MARKER));
            continue;
        }
        if let Some(el) = ElementRef::wrap(node) {
            if el.value().name() == "a" {
                return Some(text_of(el));
            }
        }
    }
    None
}

/// Whether the infobox or the lead paragraph mentions being inactive.
/// Navboxes and result tables further down are not consulted.
pub fn has_inactive_marker(doc: &Html) -> bool {
    doc.select(&INFOBOX_SEL)
        .chain(doc.select(&LEAD_SEL).next())
        .flat_map(|el| el.text())
        .any(|t| INACTIVE_RE.is_match(t))
}

fn is_text_only(el: ElementRef) -> bool {
    el.children().all(|c| c.value().is_text())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="fo-nttax-infobox-wrapper">
  <div class="fo-nttax-infobox">
    <div class="infobox-cell-2 infobox-description">Name:</div><div style="width:50%">Syed Sumail Hassan</div>
    <div class="infobox-cell-2 infobox-description">Romanized Name:</div><div>Sumail Hassan</div>
    <div class="infobox-cell-2 infobox-description">Nationality:</div>
    <div><span class="flag"><a href="/dota2/Category:Pakistan" title="Pakistan">Pakistan</a></span> <a href="/dota2/Category:United_States">United States</a></div>
    <div class="infobox-cell-2 infobox-description">Born:</div><div>February 13, 1999 (age 25)</div>
    <div class="infobox-cell-2 infobox-description">Current Role:</div><div>Mid, Carry</div>
    <div class="infobox-cell-2 infobox-description">Signature Heroes:</div>
    <div><a href="/dota2/Storm_Spirit" title="Storm Spirit"><img/></a><a href="/dota2/Earth_Spirit" title="Earth Spirit"><img/></a></div>
    <div class="infobox-cell-2 infobox-description">Team:</div><div><span><a href="/dota2/Team_Falcons">Team Falcons</a></span></div>
    <div class="infobox-header">History</div>
    <div class="infobox-center"><table>
      <tr><td>2014 — 2019</td><td><a href="/dota2/EG">Evil Geniuses</a></td></tr>
      <tr><td>2019 — 2020</td><td><a href="/dota2/OG">OG</a></td></tr>
    </table></div>
  </div>
</div>"#;

    fn doc() -> Html {
        Html::parse_document(PAGE)
    }

    #[test]
    fn label_text_values() {
        let d = doc();
        assert_eq!(label_text(&d, "Name:"), vec!["Syed Sumail Hassan"]);
        assert_eq!(label_text(&d, "Romanized Name:"), vec!["Sumail Hassan"]);
        assert_eq!(label_text(&d, "Born:"), vec!["February 13, 1999 (age 25)"]);
        assert!(label_text(&d, "Alternate IDs:").is_empty());
    }

    #[test]
    fn wrapper_divs_are_not_labels() {
        // The wrapper's text also starts with "Name:" but it has element children.
        let d = doc();
        let cell = label_sibling(&d, "Name:").unwrap();
        assert_eq!(text_of(cell), "Syed Sumail Hassan");
    }

    #[test]
    fn links_and_list_fallback() {
        let d = doc();
        assert_eq!(label_links(&d, "Nationality:"), vec!["Pakistan", "United States"]);
        assert_eq!(label_links(&d, "Current Role:"), vec!["Mid", "Carry"]);
        assert_eq!(
            label_link_titles(&d, "Signature Hero"),
            vec!["Storm Spirit", "Earth Spirit"]
        );
    }

    #[test]
    fn history_table() {
        assert_eq!(history_table_teams(&doc()), vec!["Evil Geniuses", "OG"]);
        assert!(history_table_teams(&Html::parse_document("<div>History</div>")).is_empty());
    }

    #[test]
    fn team_after_marker() {
        assert_eq!(team_landmark(&doc()).as_deref(), Some("Team Falcons"));
        assert_eq!(team_landmark(&Html::parse_document("<a>Nope</a>")), None);
    }

    #[test]
    fn inactive_marker() {
        assert!(!has_inactive_marker(&doc()));
        let d = Html::parse_document("<p>This player is currently <b>Inactive</b>.</p>");
        assert!(has_inactive_marker(&d));
        let boxed = PAGE.replace("Team Falcons</a></span>", "Team Falcons</a></span> (inactive)");
        assert!(has_inactive_marker(&Html::parse_document(&boxed)));
    }

    #[test]
    fn inactive_outside_infobox_and_lead_is_ignored() {
        let page = format!(
            r#"{}
<p>Syed Sumail Hassan is a Pakistani-American player.</p>
<p>He once played for an inactive roster.</p>
<div class="navbox"><table><tr><td>Inactive players</td><td><a>Dendi</a></td></tr></table></div>"#,
            PAGE
        );
        assert!(!has_inactive_marker(&Html::parse_document(&page)));
    }
}
