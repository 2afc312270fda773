use once_cell::sync::Lazy;
use regex_lite::Regex;

/// The fields extracted from a raw release title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRelease {
    /// Title with technical tags stripped, usable as a search query.
    /// Empty when the input had no usable text.
    pub clean_name: String,
    /// Four-digit year, if one was found between separators.
    pub year: Option<String>,
    /// Whether the title carries a documentary marker.
    pub is_documentary: bool,
}

static DOCUMENTARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(doc|docu|documentary|documentaire)\b").unwrap());

/// Year between dot/space separators, 1900-2099.
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.\s](19\d{2}|20\d{2})[.\s]").unwrap());

static LANGUAGE_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(MULTi|FRENCH|TRUEFRENCH|VFF|VF2|VOSTFR)\b").unwrap());

static SOURCE_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(1080p|720p|2160p|4K|UHD|HDR|DV|BluRay|WEB|WEBRip|HDTV)\b").unwrap()
});

static CODEC_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(x264|x265|H264|H265|HEVC)\b").unwrap());

static AUDIO_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(AC3|DTS|EAC3|ATMOS|AAC|DD|DDP)\b").unwrap());

/// Audio channel layouts like 5.1 or 7.1.
static AUDIO_CHANNELS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,2}\.\d\b").unwrap());

/// Release group suffix, e.g. `-GRP` at the end of the title.
static GROUP_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)-[A-Z0-9]+$").unwrap());

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.\s]+").unwrap());

/// Parse a raw release title into its searchable parts.
///
/// A title with no recognizable year still yields a clean name; an empty
/// title yields an empty clean name, which downstream consumers treat as
/// non-matchable.
pub fn parse(title: &str) -> ParsedRelease {
    let is_documentary = DOCUMENTARY.is_match(title);

    let year = YEAR
        .captures(title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let mut clean = LANGUAGE_TAGS.replace_all(title, "").into_owned();
    clean = SOURCE_TAGS.replace_all(&clean, "").into_owned();
    clean = CODEC_TAGS.replace_all(&clean, "").into_owned();
    clean = AUDIO_TAGS.replace_all(&clean, "").into_owned();
    clean = AUDIO_CHANNELS.replace_all(&clean, "").into_owned();
    clean = GROUP_SUFFIX.replace_all(&clean, "").into_owned();
    clean = SEPARATORS.replace_all(&clean, " ").trim().to_string();

    // Everything from the year onward is tag residue, not title.
    if let Some(ref year) = year {
        if let Some(idx) = clean.find(year.as_str()) {
            clean.truncate(idx);
            clean = clean.trim().to_string();
        }
    }

    ParsedRelease {
        clean_name: clean,
        year,
        is_documentary,
    }
}
