use std::fmt;
use std::ops::Deref;

/// Length of every YouTube video ID
pub const VIDEO_ID_LEN: usize = 11;

/// A validated 11-character YouTube video ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Validate a candidate segment. Returns `None` unless it is exactly
    /// 11 characters from the `[A-Za-z0-9_-]` alphabet.
    pub fn parse(candidate: &str) -> Option<Self> {
        if candidate.chars().count() != VIDEO_ID_LEN {
            return None;
        }
        if !candidate.chars().all(is_id_char) {
            return None;
        }
        Some(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for VideoId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// One recognized URL shape
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// `<marker><id>`
    Prefix(&'static str),
    /// `<marker><segment>/<id>`
    PrefixSkipSegment(&'static str),
    /// `watch?...v=<id>`
    WatchQuery,
}

/// Tried in order; the first rule that yields a candidate wins.
const RULES: &[Rule] = &[
    Rule::Prefix("youtu.be/"),
    Rule::Prefix("/v/"),
    Rule::PrefixSkipSegment("/u/"),
    Rule::Prefix("/embed/"),
    Rule::Prefix("/shorts/"),
    Rule::WatchQuery,
];

impl Rule {
    fn candidate<'a>(&self, input: &'a str) -> Option<&'a str> {
        match *self {
            Rule::Prefix(marker) => {
                let (_, rest) = input.split_once(marker)?;
                Some(until_delimiter(rest))
            }
            Rule::PrefixSkipSegment(marker) => {
                let (_, rest) = input.split_once(marker)?;
                let (segment, rest) = rest.split_once('/')?;
                if segment.is_empty() || segment.contains(['?', '&', '#']) {
                    return None;
                }
                Some(until_delimiter(rest))
            }
            Rule::WatchQuery => {
                let (_, query) = input.split_once("watch?")?;
                let query = query.split('#').next().unwrap_or_default();
                query
                    .split(['&', '?'])
                    .find_map(|pair| pair.strip_prefix("v="))
            }
        }
    }
}

fn until_delimiter(s: &str) -> &str {
    s.split(['#', '&', '?']).next().unwrap_or_default()
}

/// Extract video ID from the supported YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();
    let candidate = RULES.iter().find_map(|rule| rule.candidate(input))?;
    VideoId::parse(candidate)
}
