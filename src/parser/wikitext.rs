use std::sync::LazyLock;

use regex::Regex;

static TH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{TH\|[^|]*\|([^|}]+)").unwrap());
static TEAM_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"team\d*\s*=\s*([^\n|}]*)").unwrap());
static PIPED_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\]|]*\|([^\]]*)\]\]").unwrap());
static PLAIN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]*)\]\]").unwrap());

/// Value of `|key=` in template markup.
pub fn template_value(text: &str, key: &str) -> Option<String> {
    let re = key_regex(key);
    let m = re.find(text)?;
    Some(read_value(&text[m.end()..]))
}

/// Values of `|key=`, `|key2=`, `|key3=` ... ordered by suffix, unsuffixed first.
pub fn template_values(text: &str, key: &str) -> Vec<String> {
    let re = Regex::new(&format!(r"\|\s*{}(\d*)\s*=", regex::escape(key))).unwrap();
    let mut found: Vec<(u32, usize, String)> = re
        .captures_iter(text)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let suffix = match c.get(1).map(|s| s.as_str()) {
                None | Some("") => 1,
                Some(n) => n.parse::<u32>().ok()?,
            };
            Some((suffix, whole.start(), read_value(&text[whole.end()..])))
        })
        .collect();
    found.sort_by_key(|(suffix, pos, _)| (*suffix, *pos));
    found.into_iter().map(|(_, _, v)| v).collect()
}

/// Raw body of a multi-line template field such as `|history=`, up to the next
/// `|key` line or the template's closing braces.
pub fn field_block<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let start = key_regex(key).find(text)?.end();
    let rest = &text[start..];
    let mut end = rest.len();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if offset > 0 && (trimmed.starts_with('|') || trimmed.starts_with("}}")) {
            end = offset;
            break;
        }
        offset += line.len();
    }
    Some(&rest[..end])
}

/// Free text after a bold header like `'''Dota 2''':`, up to the next bold marker.
pub fn bold_section<'a>(text: &'a str, header: &str) -> Option<&'a str> {
    let marker = format!("'''{}''':", header);
    let start = text.find(&marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find("'''").unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Team names from `{{TH|dates|Team}}` history templates, in order.
pub fn th_teams(text: &str) -> Vec<String> {
    TH_RE
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .collect()
}

/// Team names from `team=` / `teamN=` pairs in an expanded template.
pub fn team_keys(text: &str) -> Vec<String> {
    TEAM_KEY_RE
        .captures_iter(text)
        .map(|c| clean_value(&c[1]))
        .collect()
}

fn key_regex(key: &str) -> Regex {
    Regex::new(&format!(r"\|\s*{}\s*=", regex::escape(key))).unwrap()
}

/// Read a value up to the end of line or the next top-level `|`, keeping pipes
/// that sit inside `[[...]]` or `{{...}}`.
fn read_value(rest: &str) -> String {
    let mut depth = 0usize;
    let mut end = rest.len();
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                end = i;
                break;
            }
            b'[' | b'{' if bytes.get(i + 1) == Some(&bytes[i]) => {
                depth += 1;
                i += 1;
            }
            b']' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                if depth == 0 {
                    end = i;
                    break;
                }
                depth -= 1;
                i += 1;
            }
            b'|' if depth == 0 => {
                end = i;
                break;
            }
            _ => {}
        }
        i += 1;
    }
    clean_value(&rest[..end])
}

/// Drop wiki link brackets and bold/italic quotes: `[[Peru|PE]]` → `PE`.
fn clean_value(raw: &str) -> String {
    let v = PIPED_LINK_RE.replace_all(raw, "$1");
    let v = PLAIN_LINK_RE.replace_all(&v, "$1");
    v.replace("'''", "").replace("''", "").trim().to_string()
}

// ── Tests ──
