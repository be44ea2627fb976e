//! Per-field extraction plans.
//!
//! Every field has an ordered list of stages, each holding one or more
//! strategies. Strategies in a stage accumulate into one de-duplicated list; the
//! first stage that yields a usable value wins and later stages are never run.

mod strategies;

use chrono::NaiveDate;
use scraper::Html;
use tracing::debug;

use crate::source::{FetchError, PageSource};
use strategies::*;

pub use strategies::{ACTIVE, INACTIVE};

/// Values that stand in for "unknown" on the wiki.
pub const PLACEHOLDERS: &[&str] = &["", "...", "TBD"];

pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDERS.contains(&value.trim())
}

/// Everything a strategy may look at for one player.
pub struct PageContext<'a> {
    pub title: &'a str,
    pub wikitext: Option<&'a str>,
    pub html: Option<&'a Html>,
    pub source: &'a dyn PageSource,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    RomanizedName,
    Nationality,
    BirthDate,
    Role,
    SignatureHeroes,
    CurrentTeam,
    HistoryTeams,
    Status,
    AlternateIds,
    Region,
    YearsActive,
    TotalWinnings,
}

pub type StrategyFn = fn(&PageContext) -> Result<Vec<String>, FetchError>;

pub struct Strategy {
    pub name: &'static str,
    pub run: StrategyFn,
}

pub struct FieldPlan {
    pub field: Field,
    pub stages: &'static [&'static [Strategy]],
}

macro_rules! strategy {
    ($name:literal, $run:path) => {
        Strategy {
            name: $name,
            run: $run,
        }
    };
}

pub static PLANS: &[FieldPlan] = &[
    FieldPlan {
        field: Field::Name,
        stages: &[
            &[strategy!("template name", tpl_name)],
            &[strategy!("infobox Name", html_name)],
        ],
    },
    FieldPlan {
        field: Field::RomanizedName,
        stages: &[
            &[strategy!("template romanized_name", tpl_romanized_name)],
            &[strategy!("infobox Romanized Name", html_romanized_name)],
        ],
    },
    FieldPlan {
        field: Field::Nationality,
        stages: &[
            &[strategy!("template country", tpl_country)],
            &[strategy!("infobox Nationality", html_nationality)],
        ],
    },
    FieldPlan {
        field: Field::BirthDate,
        stages: &[
            &[strategy!("template birth", tpl_birth)],
            &[strategy!("infobox Born", html_born)],
        ],
    },
    FieldPlan {
        field: Field::Role,
        stages: &[
            &[strategy!("template role", tpl_role)],
            &[strategy!("infobox Current Role", html_current_role)],
            &[strategy!("infobox Role", html_role)],
        ],
    },
    FieldPlan {
        field: Field::SignatureHeroes,
        stages: &[
            &[strategy!("template hero", tpl_hero)],
            &[strategy!("infobox Signature Hero", html_heroes)],
        ],
    },
    FieldPlan {
        field: Field::CurrentTeam,
        stages: &[
            &[strategy!("template team", tpl_team)],
            &[strategy!("rendered Team landmark", html_team)],
            &[strategy!("expand PlayerTeamAuto", expand_player_team)],
        ],
    },
    FieldPlan {
        field: Field::HistoryTeams,
        stages: &[
            &[
                strategy!("template history", tpl_history),
                strategy!("section Dota 2", section_history),
            ],
            &[strategy!("rendered History table", html_history)],
            &[strategy!("expand THA", expand_history)],
        ],
    },
    FieldPlan {
        field: Field::Status,
        stages: &[
            &[strategy!("template status", tpl_status)],
            &[strategy!("page inactive marker", html_inactive)],
            &[strategy!("infobox Years Active", html_years_active)],
        ],
    },
    FieldPlan {
        field: Field::AlternateIds,
        stages: &[
            &[strategy!("template ids", tpl_ids)],
            &[strategy!("infobox Alternate IDs", html_alternate_ids)],
        ],
    },
    FieldPlan {
        field: Field::Region,
        stages: &[
            &[strategy!("template region", tpl_region)],
            &[strategy!("infobox Region", html_region)],
        ],
    },
    FieldPlan {
        field: Field::YearsActive,
        stages: &[
            &[strategy!("template years_active", tpl_years_active)],
            &[strategy!("infobox Years Active span", html_years_active_span)],
        ],
    },
    FieldPlan {
        field: Field::TotalWinnings,
        stages: &[
            &[strategy!("template earnings", tpl_earnings)],
            &[strategy!("infobox Total Winnings", html_total_winnings)],
        ],
    },
];

/// `PLANS` is laid out in `Field` declaration order.
pub fn plan(field: Field) -> &'static FieldPlan {
    &PLANS[field as usize]
}

/// Run a field's plan. `NotFound` from a strategy counts as "nothing found";
/// any other fetch error aborts the player.
pub fn extract_field(ctx: &PageContext, field: Field) -> Result<Vec<String>, FetchError> {
    let plan = plan(field);
    for stage in plan.stages {
        let mut values: Vec<String> = Vec::new();
        let mut winners: Vec<&str> = Vec::new();
        for strategy in stage.iter() {
            let found = match (strategy.run)(ctx) {
                Ok(found) => found,
                Err(FetchError::NotFound(what)) => {
                    debug!(title = ctx.title, strategy = strategy.name, %what, "not found");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let before = values.len();
            for value in found {
                push_unique(&mut values, value);
            }
            if values.len() > before {
                winners.push(strategy.name);
            }
        }
        if !values.is_empty() {
            debug!(title = ctx.title, field = ?plan.field, strategies = ?winners, count = values.len(), "field extracted");
            return Ok(values);
        }
    }
    Ok(Vec::new())
}

/// Append a trimmed value unless it is a placeholder or already present.
pub fn push_unique(values: &mut Vec<String>, value: String) {
    let value = value.trim();
    if is_placeholder(value) || values.iter().any(|v| v == value) {
        return;
    }
    values.push(value.to_string());
}

/// Raw field values before record assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub name: Option<String>,
    pub romanized_name: Option<String>,
    pub nationality: Vec<String>,
    pub birth_date: Option<String>,
    pub role: Vec<String>,
    pub signature_heroes: Vec<String>,
    pub current_team: Option<String>,
    pub history_teams: Vec<String>,
    pub status: Option<String>,
    pub alternate_ids: Vec<String>,
    pub region: Option<String>,
    pub years_active: Option<String>,
    pub total_winnings: Option<String>,
}

pub fn extract_all(ctx: &PageContext) -> Result<Extracted, FetchError> {
    let first = |field| -> Result<Option<String>, FetchError> {
        Ok(extract_field(ctx, field)?.into_iter().next())
    };

    Ok(Extracted {
        name: first(Field::Name)?,
        romanized_name: first(Field::RomanizedName)?,
        nationality: extract_field(ctx, Field::Nationality)?,
        birth_date: first(Field::BirthDate)?,
        role: extract_field(ctx, Field::Role)?,
        signature_heroes: extract_field(ctx, Field::SignatureHeroes)?,
        current_team: first(Field::CurrentTeam)?,
        history_teams: extract_field(ctx, Field::HistoryTeams)?,
        status: first(Field::Status)?,
        alternate_ids: extract_field(ctx, Field::AlternateIds)?,
        region: first(Field::Region)?,
        years_active: first(Field::YearsActive)?,
        total_winnings: first(Field::TotalWinnings)?,
    })
}

// ── Tests ──
