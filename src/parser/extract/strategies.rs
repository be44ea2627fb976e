use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use super::{is_placeholder, PageContext};
use crate::parser::dom::split_list;
use crate::parser::{infobox, wikitext};
use crate::source::FetchError;

type Found = Result<Vec<String>, FetchError>;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

const BIRTH_KEYS: &[&str] = &["birth_date", "birth", "birthdate", "born"];
const HISTORY_SECTION: &str = "Dota 2";
const ACTIVE_WINDOW_YEARS: i32 = 2;
/// Also matches the `Years Active (Player):` variant.
const YEARS_ACTIVE_LABEL: &str = "Years Active";

pub const ACTIVE: &str = "Active";
pub const INACTIVE: &str = "Inactive";

fn tpl_single(ctx: &PageContext, key: &str) -> Found {
    Ok(ctx
        .wikitext
        .and_then(|t| wikitext::template_value(t, key))
        .into_iter()
        .collect())
}

fn tpl_multi(ctx: &PageContext, key: &str) -> Found {
    Ok(ctx
        .wikitext
        .map(|t| wikitext::template_values(t, key))
        .unwrap_or_default())
}

fn html_with(ctx: &PageContext, f: impl FnOnce(&scraper::Html) -> Vec<String>) -> Found {
    Ok(ctx.html.map(f).unwrap_or_default())
}

// ── Template markup ──

pub fn tpl_name(ctx: &PageContext) -> Found {
    tpl_single(ctx, "name")
}

pub fn tpl_romanized_name(ctx: &PageContext) -> Found {
    tpl_single(ctx, "romanized_name")
}

pub fn tpl_country(ctx: &PageContext) -> Found {
    tpl_multi(ctx, "country")
}

/// First birth key carrying a real value.
pub fn tpl_birth(ctx: &PageContext) -> Found {
    let Some(text) = ctx.wikitext else {
        return Ok(Vec::new());
    };
    Ok(BIRTH_KEYS
        .iter()
        .filter_map(|key| wikitext::template_value(text, key))
        .find(|v| !is_placeholder(v))
        .into_iter()
        .collect())
}

pub fn tpl_role(ctx: &PageContext) -> Found {
    tpl_multi(ctx, "role")
}

pub fn tpl_hero(ctx: &PageContext) -> Found {
    tpl_multi(ctx, "hero")
}

pub fn tpl_team(ctx: &PageContext) -> Found {
    tpl_single(ctx, "team")
}

pub fn tpl_history(ctx: &PageContext) -> Found {
    Ok(ctx
        .wikitext
        .and_then(|t| wikitext::field_block(t, "history"))
        .map(wikitext::th_teams)
        .unwrap_or_default())
}

pub fn section_history(ctx: &PageContext) -> Found {
    Ok(ctx
        .wikitext
        .and_then(|t| wikitext::bold_section(t, HISTORY_SECTION))
        .map(wikitext::th_teams)
        .unwrap_or_default())
}

pub fn tpl_ids(ctx: &PageContext) -> Found {
    Ok(ctx
        .wikitext
        .and_then(|t| wikitext::template_value(t, "ids"))
        .map(|ids| split_list(&ids))
        .unwrap_or_default())
}

pub fn tpl_region(ctx: &PageContext) -> Found {
    tpl_single(ctx, "region")
}

pub fn tpl_years_active(ctx: &PageContext) -> Found {
    tpl_single(ctx, "years_active")
}

pub fn tpl_earnings(ctx: &PageContext) -> Found {
    tpl_single(ctx, "earnings")
}

pub fn tpl_status(ctx: &PageContext) -> Found {
    let raw = ctx
        .wikitext
        .and_then(|t| wikitext::template_value(t, "status"))
        .unwrap_or_default();
    let status = match raw.to_lowercase().as_str() {
        "active" => Some(ACTIVE),
        "inactive" | "retired" | "banned" | "deceased" => Some(INACTIVE),
        _ => None,
    };
    Ok(status.map(str::to_string).into_iter().collect())
}

// ── Rendered markup ──

pub fn html_name(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_text(d, "Name:"))
}

pub fn html_romanized_name(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_text(d, "Romanized Name:"))
}

pub fn html_nationality(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_links(d, "Nationality:"))
}

pub fn html_born(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_text(d, "Born:"))
}

pub fn html_current_role(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_links(d, "Current Role:"))
}

pub fn html_role(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_links(d, "Role:"))
}

pub fn html_heroes(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_link_titles(d, "Signature Hero"))
}

pub fn html_team(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::team_landmark(d).into_iter().collect())
}

pub fn html_history(ctx: &PageContext) -> Found {
    html_with(ctx, infobox::history_table_teams)
}

pub fn html_alternate_ids(ctx: &PageContext) -> Found {
    html_with(ctx, |d| {
        infobox::label_text(d, "Alternate IDs:")
            .iter()
            .flat_map(|ids| split_list(ids))
            .collect()
    })
}

pub fn html_region(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_text(d, "Region:"))
}

pub fn html_years_active_span(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_text(d, YEARS_ACTIVE_LABEL))
}

pub fn html_total_winnings(ctx: &PageContext) -> Found {
    html_with(ctx, |d| infobox::label_text(d, "Total Winnings:"))
}

pub fn html_inactive(ctx: &PageContext) -> Found {
    html_with(ctx, |d| {
        if infobox::has_inactive_marker(d) {
            vec![INACTIVE.to_string()]
        } else {
            Vec::new()
        }
    })
}

/// Active when the span runs to "Present" or ends within the last two years.
pub fn html_years_active(ctx: &PageContext) -> Found {
    let cutoff = ctx.as_of.year() - ACTIVE_WINDOW_YEARS;
    html_with(ctx, |d| {
        let Some(span) = infobox::label_text(d, YEARS_ACTIVE_LABEL).into_iter().next() else {
            return Vec::new();
        };
        let recent = span.contains("Present")
            || YEAR_RE
                .captures_iter(&span)
                .filter_map(|c| c[1].parse::<i32>().ok())
                .any(|y| y >= cutoff);
        vec![if recent { ACTIVE } else { INACTIVE }.to_string()]
    })
}

// ── Template expansion ──

fn expand(ctx: &PageContext, name: &str) -> Result<Option<String>, FetchError> {
    crate::source::optional(ctx.source.expand_named_template(name, &[ctx.title]))
}

/// First real `team=` value of the expanded `PlayerTeamAuto` template.
pub fn expand_player_team(ctx: &PageContext) -> Found {
    Ok(expand(ctx, "PlayerTeamAuto")?
        .and_then(|text| {
            wikitext::team_keys(&text)
                .into_iter()
                .find(|team| !is_placeholder(team))
        })
        .into_iter()
        .collect())
}

/// Teams of the expanded `THA` history template: `team=` keys, else `TH` rows.
pub fn expand_history(ctx: &PageContext) -> Found {
    let Some(text) = expand(ctx, "THA")? else {
        return Ok(Vec::new());
    };
    let teams = wikitext::team_keys(&text);
    if teams.is_empty() {
        Ok(wikitext::th_teams(&text))
    } else {
        Ok(teams)
    }
}
