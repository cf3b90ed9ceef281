// src/question/ner.rs
//! Rule-based named-entity extraction.
//!
//! Two sources of entities:
//! - gazetteer patterns from `*.json` files in `NER_CONFIG_DIR` (or
//!   `config/ner/` under the current directory). The file stem names the
//!   category and each file holds `{ "patterns": [{ "regex", "keyword"? }] }`;
//! - built-in rules over capitalized spans (honorifics, organization words,
//!   a country/city list, event words).
//!
//! Gazetteer matches win over built-in rules where they overlap. Entities are
//! deduplicated by text and returned in order of first appearance.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::summarize::{is_abbreviation, STOP_WORDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Person,
    Organization,
    Place,
    Event,
    Product,
    CreativeWork,
    Misc,
}

impl EntityCategory {
    /// Categories preferred when picking an entity for a question.
    pub fn is_salient(self) -> bool {
        !matches!(self, Self::Misc)
    }

    /// Category for a gazetteer file stem.
    pub fn from_stem(stem: &str) -> Self {
        match stem.to_lowercase().as_str() {
            "person" | "people" | "persons" => Self::Person,
            "organization" | "organisation" | "organizations" | "org" | "orgs" => {
                Self::Organization
            }
            "place" | "places" | "location" | "locations" | "gpe" => Self::Place,
            "event" | "events" => Self::Event,
            "product" | "products" => Self::Product,
            "work_of_art" | "creative_work" | "works" => Self::CreativeWork,
            _ => Self::Misc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Text exactly as it appears in the source.
    pub text: String,
    pub category: EntityCategory,
    /// Gazetteer keyword, when the entity came from a pattern file.
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Pattern {
    regex: String,
    #[serde(default)]
    keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PatternFile {
    #[serde(default)]
    patterns: Vec<Pattern>,
}

struct Rule {
    category: EntityCategory,
    re: Regex,
    keyword: Option<String>,
}

/// Compiled gazetteer patterns.
#[derive(Default)]
pub struct Gazetteer {
    rules: Vec<Rule>,
}

/// `NER_CONFIG_DIR`, else `<cwd>/config/ner`.
pub fn ner_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NER_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config")
        .join("ner")
}

impl Gazetteer {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from [`ner_config_dir`]. A missing directory yields an empty gazetteer.
    pub fn load_default() -> Self {
        Self::from_dir(&ner_config_dir())
    }

    /// Load every `*.json` in `dir`; unreadable files and bad regexes are skipped.
    pub fn from_dir(dir: &Path) -> Self {
        let mut rules = Vec::new();
        let Ok(read_dir) = fs::read_dir(dir) else {
            return Self { rules };
        };

        let mut paths: Vec<PathBuf> = read_dir
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();

        for path in paths {
            let category = EntityCategory::from_stem(
                path.file_stem().and_then(|s| s.to_str()).unwrap_or("misc"),
            );
            let parsed = fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|raw| Ok(serde_json::from_str::<PatternFile>(&raw)?));
            let file = match parsed {
                Ok(f) => f,
                Err(e) => {
                    tracing::warn!(target: "question", path = %path.display(), error = %e, "skipping gazetteer file");
                    continue;
                }
            };
            for pat in file.patterns {
                match Regex::new(&pat.regex) {
                    Ok(re) => rules.push(Rule {
                        category,
                        re,
                        keyword: pat.keyword,
                    }),
                    Err(e) => {
                        tracing::warn!(target: "question", regex = %pat.regex, error = %e, "bad gazetteer regex")
                    }
                }
            }
        }
        tracing::debug!(target: "question", dir = %dir.display(), rules = rules.len(), "gazetteer loaded");
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All entities in `text`: gazetteer hits first claim their ranges, then
    /// built-in rules fill in the rest.
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        let mut found: Vec<(usize, usize, Entity)> = Vec::new();

        for rule in &self.rules {
            for m in rule.re.find_iter(text) {
                if m.as_str().trim().is_empty() {
                    continue;
                }
                found.push((
                    m.start(),
                    m.end(),
                    Entity {
                        text: m.as_str().to_string(),
                        category: rule.category,
                        keyword: rule.keyword.clone(),
                    },
                ));
            }
        }

        for (start, end, category) in builtin_spans(text) {
            let overlaps = found.iter().any(|(s, e, _)| start < *e && *s < end);
            if overlaps {
                continue;
            }
            found.push((
                start,
                end,
                Entity {
                    text: text[start..end].to_string(),
                    category,
                    keyword: None,
                },
            ));
        }

        found.sort_by_key(|(s, _, _)| *s);
        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter(|(_, _, e)| seen.insert(e.text.clone()))
            .map(|(_, _, e)| e)
            .collect()
    }
}

/// Entities from built-in rules only.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    Gazetteer::empty().extract(text)
}

const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "prof", "professor", "sir", "dame", "lady", "lord",
    "president", "senator", "sen", "rep", "representative", "gov", "governor", "mayor",
    "minister", "chancellor", "judge", "justice", "general", "gen", "col", "capt", "captain",
    "king", "queen", "prince", "princess", "pope", "ceo", "chairman", "secretary",
];

const ORG_WORDS: &[&str] = &[
    "inc", "corp", "corporation", "ltd", "llc", "plc", "group", "company", "co", "holdings",
    "university", "college", "institute", "agency", "association", "bank", "ministry",
    "department", "council", "commission", "committee", "foundation", "party", "union",
    "federation", "authority", "organization", "organisation", "bureau", "reserve",
    "nations", "airlines", "motors", "technologies", "labs", "laboratories", "news", "times",
    "post", "journal", "court", "parliament", "congress", "senate", "police", "army", "navy",
];

const EVENT_WORDS: &[&str] = &[
    "olympics", "olympic", "games", "summit", "election", "elections", "cup", "championship",
    "championships", "conference", "festival", "war", "crisis", "expo", "marathon",
    "forum", "referendum", "tournament", "prix", "revolution", "awards", "oscars", "bowl",
    "open", "pandemic", "hurricane", "storm", "earthquake",
];

/// Words that are capitalized but never entities on their own.
const CALENDAR: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "january",
    "february", "march", "april", "may", "june", "july", "august", "september", "october",
    "november", "december", "i",
];

/// Lowercased countries, regions and major cities.
static PLACES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "afghanistan", "africa", "argentina", "asia", "australia", "austria", "belgium",
        "brazil", "britain", "canada", "chile", "china", "colombia", "cuba", "czechia",
        "denmark", "egypt", "england", "ethiopia", "europe", "finland", "france", "germany",
        "greece", "hungary", "india", "indonesia", "iran", "iraq", "ireland", "israel",
        "italy", "japan", "kenya", "korea", "north korea", "south korea", "lebanon", "mexico",
        "netherlands", "new zealand", "nigeria", "norway", "pakistan", "palestine", "peru",
        "philippines", "poland", "portugal", "qatar", "romania", "russia", "saudi arabia",
        "scotland", "singapore", "south africa", "spain", "sweden", "switzerland", "syria",
        "taiwan", "thailand", "turkey", "ukraine", "united kingdom", "united states",
        "united states of america", "america", "us", "u.s", "u.s.", "usa", "uk", "u.k",
        "u.k.", "venezuela", "vietnam", "wales", "yemen", "gaza", "arctic", "antarctica",
        "amsterdam", "athens", "atlanta", "bangkok", "beijing", "berlin", "boston",
        "brussels", "buenos aires", "cairo", "chicago", "delhi", "new delhi", "dubai",
        "dublin", "geneva", "hong kong", "houston", "istanbul", "jakarta", "jerusalem",
        "kyiv", "kiev", "lagos", "lisbon", "london", "los angeles", "madrid", "manila",
        "melbourne", "mexico city", "miami", "milan", "moscow", "mumbai", "nairobi",
        "new york", "new york city", "paris", "prague", "rome", "san francisco", "seattle",
        "seoul", "shanghai", "stockholm", "sydney", "tehran", "tel aviv", "tokyo", "toronto",
        "vienna", "warsaw", "washington", "zurich", "california", "texas", "florida",
    ]
    .into_iter()
    .collect()
});

/// Lowercase words allowed inside a capitalized span ("Bank of England").
const CONNECTORS: &[&str] = &["of", "the", "for", "de", "&"];

#[derive(Debug)]
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    /// Raw token was followed by punctuation that closes a phrase.
    closes: bool,
    sentence_start: bool,
}

impl Word<'_> {
    fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }

    fn is_acronym(&self) -> bool {
        let letters: Vec<char> = self.text.chars().filter(|c| c.is_alphabetic()).collect();
        letters.len() >= 2
            && letters.iter().all(|c| c.is_uppercase())
            && self.text.chars().all(|c| c.is_alphabetic() || c == '.' || c == '&')
    }
}

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("token regex"));

fn words(text: &str) -> Vec<Word<'_>> {
    const LEAD: &[char] = &['"', '\'', '(', '[', '\u{201C}', '\u{2018}'];
    const TRAIL: &[char] = &[
        ',', ';', ':', '!', '?', '.', '"', '\'', ')', ']', '\u{201D}', '\u{2019}',
    ];

    let mut out: Vec<Word<'_>> = Vec::new();
    let mut next_starts_sentence = true;

    for m in RE_TOKEN.find_iter(text) {
        let raw = m.as_str();
        let lead = raw.len() - raw.trim_start_matches(LEAD).len();
        let mut core = raw[lead..].trim_end_matches(TRAIL);
        // keep the final dot of dotted abbreviations ("U.S.")
        let mut core_len = core.len();
        if core.contains('.') && raw[lead + core_len..].starts_with('.') {
            core_len += 1;
        }
        for suffix in ["'s", "\u{2019}s"] {
            if let Some(stripped) = core.strip_suffix(suffix) {
                core = stripped;
                core_len = core.len();
            }
        }
        let tail = &raw[lead + core_len..];
        let text_slice = &raw[lead..lead + core_len];
        let sentence_start = next_starts_sentence;

        let next_word = text[m.end()..].split_whitespace().next();
        let period_is_abbrev = tail.starts_with('.') && is_abbreviation(core, next_word);
        let ends_sentence =
            tail.contains(['!', '?']) || (tail.contains('.') && !period_is_abbrev);
        if text_slice.is_empty() {
            // stray punctuation token
            next_starts_sentence |= ends_sentence;
            continue;
        }
        next_starts_sentence = ends_sentence;
        let closes = ends_sentence || tail.contains([',', ';', ':', '"', ')', ']', '\u{201D}']);
        let start = m.start() + lead;
        out.push(Word {
            text: text_slice,
            start,
            end: start + text_slice.len(),
            closes,
            sentence_start,
        });
    }
    out
}

/// Maximal runs of capitalized words, allowing lowercase connectors between
/// capitalized words. Leading stop-words ("The") are dropped.
fn capitalized_spans<'w, 'a>(ws: &'w [Word<'a>]) -> Vec<&'w [Word<'a>]> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < ws.len() {
        if !ws[i].is_capitalized() {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i + 1;
        while end < ws.len() && !ws[end - 1].closes {
            if ws[end].is_capitalized() && !ws[end].sentence_start {
                end += 1;
            } else if CONNECTORS.contains(&ws[end].text)
                && !ws[end].closes
                && ws.get(end + 1).is_some_and(|n| n.is_capitalized())
            {
                end += 2;
            } else {
                break;
            }
        }
        let mut span = &ws[start..end];
        while span
            .first()
            .is_some_and(|w| STOP_WORDS.contains(w.lower().as_str()))
        {
            span = &span[1..];
        }
        if !span.is_empty() {
            spans.push(span);
        }
        i = end;
    }
    spans
}

fn classify(span: &[Word<'_>], text: &str) -> Option<EntityCategory> {
    let first = span.first()?;
    let last = span.last()?;
    let lowered: Vec<String> = span.iter().map(Word::lower).collect();
    let phrase = text[first.start..last.end].to_lowercase();
    let any_in = |list: &[&str]| lowered.iter().any(|w| list.contains(&w.trim_end_matches('.')));

    if span.len() >= 2 && HONORIFICS.contains(&lowered[0].trim_end_matches('.')) {
        return Some(EntityCategory::Person);
    }
    if any_in(EVENT_WORDS) && span.len() >= 2 {
        return Some(EntityCategory::Event);
    }
    if PLACES.contains(phrase.as_str()) {
        return Some(EntityCategory::Place);
    }
    if span.len() >= 2 && any_in(ORG_WORDS) {
        return Some(EntityCategory::Organization);
    }
    if span.len() == 1 {
        if first.is_acronym() {
            return Some(EntityCategory::Organization);
        }
        if first.sentence_start || CALENDAR.contains(&lowered[0].as_str()) {
            return None;
        }
        return Some(EntityCategory::Misc);
    }
    Some(EntityCategory::Misc)
}

fn builtin_spans(text: &str) -> Vec<(usize, usize, EntityCategory)> {
    let ws = words(text);
    capitalized_spans(&ws)
        .into_iter()
        .filter_map(|span| {
            let cat = classify(span, text)?;
            let (first, last) = (span.first()?, span.last()?);
            Some((first.start, last.end, cat))
        })
        .collect()
}
