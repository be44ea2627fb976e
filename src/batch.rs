use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db;
use crate::discover;
use crate::parser::{self, series::SeriesMatcher};
use crate::source::PageSource;

#[derive(Debug, Default, PartialEq)]
pub struct BatchStats {
    pub queued: usize,
    pub saved: usize,
    pub failed: usize,
    /// Ids skipped because a record already exists or they repeat in the list.
    pub skipped: usize,
    pub empty_history: usize,
}

/// Lines of a player list file, trimmed. Blank lines are dropped. Each line is
/// either a bare id or a `name:href:count` entry from `discover`.
pub fn read_player_list(path: &str) -> Result<Vec<String>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading player list {}", path))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Process players one at a time. Each record is stored as soon as it is
/// assembled; a failing player is logged to `failures` and the batch moves on.
pub fn run_batch(
    conn: &Connection,
    source: &dyn PageSource,
    matcher: &SeriesMatcher,
    players: &[String],
    as_of: NaiveDate,
    limit: Option<usize>,
) -> Result<BatchStats> {
    let done = db::processed_ids(conn)?;
    let mut stats = BatchStats::default();
    let mut queued: HashSet<String> = HashSet::new();
    let mut todo: Vec<String> = Vec::new();

    for raw in players {
        let id = player_id_from_line(raw);
        if id.is_empty() {
            continue;
        }
        if done.contains(&id) || !queued.insert(id.clone()) {
            stats.skipped += 1;
            continue;
        }
        todo.push(id);
    }
    if let Some(n) = limit {
        todo.truncate(n);
    }
    stats.queued = todo.len();
    info!(queued = todo.len(), skipped = stats.skipped, "starting batch");

    let pb = ProgressBar::new(todo.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    for id in &todo {
        pb.set_message(id.clone());
        match parser::assemble_player(id, source, matcher, as_of) {
            Ok(record) => {
                if record.history_teams.is_empty() {
                    warn!(%id, "no team history found");
                    stats.empty_history += 1;
                }
                db::save_record(conn, &record)?;
                stats.saved += 1;
            }
            Err(e) => {
                warn!(%id, "player failed: {}", e);
                db::save_failure(conn, id, &e.to_string())?;
                stats.failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(saved = stats.saved, failed = stats.failed, "batch finished");
    Ok(stats)
}

/// Decode `%XX` escapes. Bytes that are not valid UTF-8 become U+FFFD.
pub fn percent_decode(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

/// Player id of a list line. Lines written by `discover` look like
/// `name:/dota2/Id:count`; anything else is taken as the id itself.
pub fn player_id_from_line(line: &str) -> String {
    let line = line.trim();
    let entry = line
        .rsplit_once(':')
        .filter(|(_, count)| count.parse::<u32>().is_ok())
        .and_then(|(rest, _)| rest.split_once(":/"));
    match entry {
        Some((_, href)) => percent_decode(&discover::player_id_from_href(&format!("/{}", href))),
        None => percent_decode(line),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::series::DEFAULT_SERIES;
    use crate::source::testing::MemorySource;
    use crate::source::PageKind;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 8).unwrap()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn decodes_percent_escapes() {
        assert_eq!(percent_decode("Miracle-"), "Miracle-");
        assert_eq!(percent_decode("Ame%28Chinese_player%29"), "Ame(Chinese_player)");
        assert_eq!(percent_decode("%E8%90%A7%E7%91%9F"), "萧瑟");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("a%zzb"), "a%zzb");
        assert_eq!(percent_decode("bad%FFbyte"), "bad\u{FFFD}byte");
    }

    #[test]
    fn list_lines_from_discover() {
        assert_eq!(player_id_from_line("SumaiL:/dota2/SumaiL:7"), "SumaiL");
        assert_eq!(player_id_from_line("Ana:/dota2/Ana_(player):3"), "Ana");
        assert_eq!(player_id_from_line("萧瑟:/dota2/Ame%28Chinese_player%29:2"), "Ame(Chinese_player)");
        assert_eq!(player_id_from_line("  N0tail  "), "N0tail");
        assert_eq!(player_id_from_line("Ame%28Chinese_player%29"), "Ame(Chinese_player)");
        // Trailing part is not a count.
        assert_eq!(player_id_from_line("Team:Secret"), "Team:Secret");
    }

    #[test]
    fn discovered_lines_run_under_their_id() {
        let conn = memory_db();
        let src = MemorySource::default()
            .with(PageKind::Template, "SumaiL", "|name=Syed Sumail Hassan\n");
        let matcher = SeriesMatcher::new(DEFAULT_SERIES).unwrap();

        let list = ids(&["SumaiL:/dota2/SumaiL:7", "SumaiL"]);
        let stats = run_batch(&conn, &src, &matcher, &list, as_of(), None).unwrap();
        assert_eq!((stats.saved, stats.skipped), (1, 1));
        let records = db::fetch_records(&conn).unwrap();
        assert_eq!(records[0].id, "SumaiL");
        assert_eq!(records[0].names, vec!["Syed Sumail Hassan"]);
    }

    #[test]
    fn failures_are_isolated() {
        let conn = memory_db();
        let src = MemorySource::default()
            .failing("Broken")
            .with(PageKind::Template, "Ana", "|name=Anathan Pham\n|history=\n{{TH|2017|OG}}\n")
            .with(PageKind::Template, "Ceb", "|name=Sébastien Debs\n");
        let matcher = SeriesMatcher::new(DEFAULT_SERIES).unwrap();

        let stats = run_batch(
            &conn,
            &src,
            &matcher,
            &ids(&["Ana", "Broken", "", "Ceb", "Ana"]),
            as_of(),
            None,
        )
        .unwrap();

        assert_eq!(
            stats,
            BatchStats {
                queued: 3,
                saved: 2,
                failed: 1,
                skipped: 1,
                empty_history: 1,
            }
        );
        let failures = db::fetch_failures(&conn).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "Broken");
        let records = db::fetch_records(&conn).unwrap();
        assert_eq!(records[0].history_teams, vec!["OG"]);
    }

    #[test]
    fn processed_ids_are_skipped_and_limit_applies() {
        let conn = memory_db();
        let src = MemorySource::default();
        let matcher = SeriesMatcher::new(DEFAULT_SERIES).unwrap();

        let first = run_batch(&conn, &src, &matcher, &ids(&["a", "b", "c"]), as_of(), Some(2)).unwrap();
        assert_eq!((first.queued, first.saved), (2, 2));

        let second = run_batch(&conn, &src, &matcher, &ids(&["a", "b", "c"]), as_of(), None).unwrap();
        assert_eq!((second.queued, second.saved, second.skipped), (1, 1, 2));
        assert_eq!(db::get_stats(&conn).unwrap().records, 3);
    }

    #[test]
    fn player_list_skips_blank_lines() {
        let path = std::env::temp_dir().join(format!("liquiscrape-players-{}.txt", std::process::id()));
        std::fs::write(&path, "Miracle-\n\n  N0tail  \nSumaiL:/dota2/SumaiL:7\n").unwrap();
        let list = read_player_list(path.to_str().unwrap()).unwrap();
        assert_eq!(list, vec!["Miracle-", "N0tail", "SumaiL:/dota2/SumaiL:7"]);
        let ids: Vec<String> = list.iter().map(|l| player_id_from_line(l)).collect();
        assert_eq!(ids, vec!["Miracle-", "N0tail", "SumaiL"]);
        let _ = std::fs::remove_file(&path);
    }
}
