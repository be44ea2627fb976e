use std::sync::LazyLock;

use regex::Regex;

static LEADING_PLACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:st|nd|rd|th)?").unwrap());

/// Ordinal rank parsed from a placement label. `Unranked` sorts after every place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    Place(u32),
    Unranked,
}

/// Leading integer of a placement label ("1st" → 1, "9-12th" → 9), else `Unranked`.
pub fn rank(label: &str) -> Rank {
    LEADING_PLACE_RE
        .captures(label.trim())
        .and_then(|c| c[1].parse::<u32>().ok())
        .map(Rank::Place)
        .unwrap_or(Rank::Unranked)
}

pub fn is_better(a: &str, b: &str) -> bool {
    rank(a) < rank(b)
}

// ── Tests ──
