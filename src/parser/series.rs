use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::placement::is_better;
use super::results::ResultRow;

pub const DEFAULT_SERIES: &str = "The International";
pub const MIN_COLUMNS: usize = 8;

const QUALIFIER_MARKERS: &[&str] = &["Qualifier", "Preliminary"];

const DATE_COL: usize = 0;
const PLACE_COL: usize = 1;
const TOURNAMENT_COL: usize = 4;
const TEAM_COL: usize = 5;
const PRIZE_COL: usize = 7;

/// One counted edition of the tracked series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    pub year: String,
    pub date: String,
    pub place: String,
    pub team: String,
    pub prize: String,
    pub is_highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPlacement {
    pub year: String,
    pub place: String,
    pub prize: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStats {
    pub participations: u32,
    /// Sorted ascending by year.
    pub editions: Vec<Edition>,
    pub best: Option<BestPlacement>,
}

pub struct SeriesMatcher {
    pattern: Regex,
    min_columns: usize,
}

impl SeriesMatcher {
    pub fn new(series: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"{}\s+(\d{{4}})\b", regex::escape(series.trim())))?;
        Ok(Self {
            pattern,
            min_columns: MIN_COLUMNS,
        })
    }

    /// Rows with fewer cells than this are treated as malformed. Never below the
    /// highest column the matcher reads.
    pub fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns.max(PRIZE_COL + 1);
        self
    }

    /// Edition year of a tournament name, or `None` for other events and qualifiers.
    pub fn edition_year(&self, tournament: &str) -> Option<String> {
        if QUALIFIER_MARKERS.iter().any(|m| tournament.contains(m)) {
            return None;
        }
        self.pattern
            .captures(tournament)
            .map(|c| c[1].to_string())
    }

    /// Count editions and find the best placement across a results table.
    ///
    /// The first row for a year supplies that edition's details. Every matching
    /// row, repeats included, competes for the best placement; ties keep the
    /// earlier row.
    pub fn scan(&self, rows: &[ResultRow]) -> SeriesStats {
        let mut stats = SeriesStats::default();
        let mut seen_years: HashSet<String> = HashSet::new();

        // First row is the table header.
        for (idx, row) in rows.iter().enumerate().skip(1) {
            if row.cells.len() < self.min_columns {
                debug!(row = idx, cells = row.cells.len(), "skipping short results row");
                continue;
            }
            let Some(tournament) = row.cells[TOURNAMENT_COL].link_text.as_deref() else {
                warn!(row = idx, "results row has no tournament link");
                continue;
            };
            let Some(year) = self.edition_year(tournament) else {
                continue;
            };

            let place_cell = &row.cells[PLACE_COL];
            let place = place_cell
                .placement_text
                .clone()
                .unwrap_or_else(|| place_cell.text.clone());
            let prize = row.cells[PRIZE_COL].text.clone();

            let improves = stats
                .best
                .as_ref()
                .map_or(true, |best| is_better(&place, &best.place));
            if improves {
                stats.best = Some(BestPlacement {
                    year: year.clone(),
                    place: place.clone(),
                    prize: prize.clone(),
                });
            }

            if !seen_years.insert(year.clone()) {
                debug!(%year, %place, "repeat row for counted edition");
                continue;
            }
            stats.participations += 1;
            stats.editions.push(Edition {
                year,
                date: row.cells[DATE_COL].text.clone(),
                place,
                team: row.cells[TEAM_COL].text.clone(),
                prize,
                is_highlighted: row.highlighted,
            });
        }

        stats.editions.sort_by(|a, b| a.year.cmp(&b.year));
        stats
    }
}

// ── Tests ──
