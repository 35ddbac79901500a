use std::sync::LazyLock;

use regex::Regex;

/// Display metadata derived from a track's filename.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackMeta {
    pub id: Option<String>,
    pub book: String,
    pub chapter: String,
    pub title: String,
}

// <letter><digits> SEP <chapter digits> SEP <book> [SEP...]
static STRICT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\p{L}[0-9]+)[_\- ]+([0-9]+)[_\- ]+(.*?\p{L}.*?)[_\- ]*$")
        .expect("static filename pattern")
});

fn is_separator(c: char) -> bool {
    matches!(c, '_' | '-' | ' ')
}

/// Last path segment of `name` (handles `/`, `\` and URL query strings).
fn last_segment(name: &str) -> &str {
    let name = name.split(['?', '#']).next().unwrap_or(name);
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Strip a trailing `.ext`; dotfiles keep their name.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => &name[..i],
        _ => name,
    }
}

fn normalize_book(raw: &str) -> String {
    raw.split(is_separator)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_strict(stem: &str) -> Option<TrackMeta> {
    let caps = STRICT_NAME.captures(stem)?;
    let chapter: u32 = caps[2].parse().ok()?;
    let book = normalize_book(&caps[3]);
    if book.is_empty() {
        return None;
    }
    Some(TrackMeta {
        id: Some(caps[1].to_string()),
        title: format!("{book} {chapter}"),
        chapter: chapter.to_string(),
        book,
    })
}

fn parse_tokens(stem: &str) -> TrackMeta {
    let tokens: Vec<&str> = stem.split(is_separator).filter(|s| !s.is_empty()).collect();
    match tokens.as_slice() {
        [first, second] => TrackMeta {
            id: None,
            book: first.to_string(),
            chapter: second.to_string(),
            title: format!("{first} {second}"),
        },
        [id, chapter, rest @ ..] => {
            let book = rest.join(" ");
            TrackMeta {
                id: Some(id.to_string()),
                chapter: chapter.to_string(),
                title: book.clone(),
                book,
            }
        }
        _ => TrackMeta {
            id: None,
            book: stem.to_string(),
            chapter: String::new(),
            title: stem.to_string(),
        },
    }
}

/// Parse a filename (or path/URL) into track metadata.
///
/// Tries the structured `A01_03_Genesis` convention first, then falls back
/// to splitting on `_`, `-` and spaces. Never fails; the order of attempts
/// decides what the UI shows, so keep it stable.
pub fn parse_filename(name: &str) -> TrackMeta {
    let stem = strip_extension(last_segment(name));
    parse_strict(stem).unwrap_or_else(|| parse_tokens(stem))
}
