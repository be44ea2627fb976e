use serde::{Deserialize, Serialize};

use super::extract::{Extracted, ACTIVE, INACTIVE};
use super::series::{BestPlacement, Edition, SeriesStats};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Active,
    Inactive,
    #[default]
    Unknown,
}

impl Status {
    fn from_label(label: Option<&str>) -> Self {
        match label {
            Some(ACTIVE) => Status::Active,
            Some(INACTIVE) => Status::Inactive,
            _ => Status::Unknown,
        }
    }
}

/// One normalized player. Built once by [`assemble`] and never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: String,
    pub names: Vec<String>,
    pub alternate_ids: Vec<String>,
    pub nationality: Vec<String>,
    pub region: Option<String>,
    pub birth_date: Option<String>,
    pub age: Option<u32>,
    pub current_team: Option<String>,
    pub history_teams: Vec<String>,
    pub role: Vec<String>,
    pub signature_heroes: Vec<String>,
    pub years_active: Option<String>,
    pub total_winnings: Option<String>,
    pub series_participation_count: u32,
    pub series_editions: Vec<Edition>,
    pub best_placement: Option<BestPlacement>,
    pub status: Status,
}

pub fn assemble(id: &str, fields: Extracted, series: SeriesStats, age: Option<u32>) -> PlayerRecord {
    let mut names: Vec<String> = Vec::new();
    for name in [fields.name, fields.romanized_name].into_iter().flatten() {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    PlayerRecord {
        id: id.to_string(),
        names,
        alternate_ids: fields.alternate_ids,
        nationality: fields.nationality,
        region: fields.region,
        birth_date: fields.birth_date,
        age,
        current_team: fields.current_team,
        history_teams: fields.history_teams,
        role: fields.role,
        signature_heroes: fields.signature_heroes,
        years_active: fields.years_active,
        total_winnings: fields.total_winnings,
        series_participation_count: series.participations,
        series_editions: series.editions,
        best_placement: series.best,
        status: Status::from_label(fields.status.as_deref()),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, romanized: &str) -> Extracted {
        Extracted {
            name: Some(name.into()),
            romanized_name: Some(romanized.into()),
            ..Default::default()
        }
    }

    #[test]
    fn identical_names_collapse() {
        let rec = assemble("Puppey", named("Clement Ivanov", "Clement Ivanov"), SeriesStats::default(), None);
        assert_eq!(rec.names, vec!["Clement Ivanov"]);
    }

    #[test]
    fn distinct_names_keep_primary_first() {
        let rec = assemble("Ame", named("萧瑟", "Xiao Se"), SeriesStats::default(), None);
        assert_eq!(rec.names, vec!["萧瑟", "Xiao Se"]);
    }

    #[test]
    fn missing_name_parts() {
        let fields = Extracted {
            romanized_name: Some("Only Romanized".into()),
            ..Default::default()
        };
        let rec = assemble("x", fields, SeriesStats::default(), None);
        assert_eq!(rec.names, vec!["Only Romanized"]);
        assert_eq!(rec.status, Status::Unknown);
    }

    #[test]
    fn status_labels() {
        assert_eq!(Status::from_label(Some("Active")), Status::Active);
        assert_eq!(Status::from_label(Some("Inactive")), Status::Inactive);
        assert_eq!(Status::from_label(None), Status::Unknown);
    }

    #[test]
    fn serializes_camel_case() {
        let series = SeriesStats {
            participations: 1,
            editions: vec![Edition {
                year: "2015".into(),
                date: "2015-08-08".into(),
                place: "1st".into(),
                team: "Evil Geniuses".into(),
                prize: "$6,634,661".into(),
                is_highlighted: true,
            }],
            best: Some(BestPlacement {
                year: "2015".into(),
                place: "1st".into(),
                prize: "$6,634,661".into(),
            }),
        };
        let rec = assemble("SumaiL", named("Syed Sumail Hassan", "Sumail Hassan"), series, Some(25));
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["seriesParticipationCount"], 1);
        assert_eq!(json["seriesEditions"][0]["isHighlighted"], true);
        assert_eq!(json["bestPlacement"]["place"], "1st");
        assert_eq!(json["birthDate"], serde_json::Value::Null);
        assert_eq!(json["status"], "Unknown");
        assert_eq!(json["age"], 25);
        assert_eq!(json["alternateIds"], serde_json::json!([]));
        assert_eq!(json["totalWinnings"], serde_json::Value::Null);
    }
}
