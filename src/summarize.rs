// src/summarize.rs
//! Frequency-based extractive summarizer.
//!
//! Sentences are scored by the mean corpus frequency of their content words
//! (lowercase alphanumeric tokens that are not stop-words). The best ones are
//! kept and re-emitted in document order.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_MAX_SENTENCES: usize = 3;
pub const DEFAULT_MIN_SENTENCES: usize = 1;

/// Sentences with fewer content words than this are never selected.
const MIN_CONTENT_WORDS: usize = 3;

/// English stop-words (NLTK list).
pub(crate) static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
        "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him",
        "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its",
        "itself", "they", "them", "their", "theirs", "themselves", "what", "which", "who",
        "whom", "this", "that", "that'll", "these", "those", "am", "is", "are", "was", "were",
        "be", "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing",
        "a", "an", "the", "and", "but", "if", "or", "because", "as", "until", "while", "of",
        "at", "by", "for", "with", "about", "against", "between", "into", "through",
        "during", "before", "after", "above", "below", "to", "from", "up", "down", "in",
        "out", "on", "off", "over", "under", "again", "further", "then", "once", "here",
        "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
        "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so",
        "than", "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should",
        "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't",
        "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn",
        "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn",
        "mustn't", "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn",
        "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
    ]
    .into_iter()
    .collect()
});

/// Lowercase abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "ft", "inc", "ltd", "corp",
    "vs", "etc", "gen", "gov", "sen", "rep", "col", "lt", "sgt", "capt", "jan", "feb",
    "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "approx",
    "dept",
];

/// Abbreviations only when a number follows ("No. 5", "Fig. 2", "est. 1890");
/// otherwise they are ordinary words that may end a sentence.
const NUMERIC_ABBREVIATIONS: &[&str] = &["no", "nos", "fig", "figs", "est", "vol", "pp"];

/// Matched case-sensitively: "Acme Co. said" but not "... and co."
const CASED_ABBREVIATIONS: &[&str] = &["Co", "CO"];

const OPENERS: &[char] = &['"', '\'', '(', '[', '\u{201C}'];

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '…')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}

/// `Dr`, `Inc`, single initials (`J`) and dotted forms (`U.S`, `e.g`).
/// `next` is the token after the period; "No", "Fig" and the like only count
/// when it starts with a digit.
pub(crate) fn is_abbreviation(word: &str, next: Option<&str>) -> bool {
    let word = word.trim_start_matches(OPENERS);
    let mut chars = word.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_uppercase();
    }
    if word.contains('.') {
        return word
            .split('.')
            .all(|p| p.chars().count() == 1 && p.chars().all(char::is_alphabetic));
    }
    if CASED_ABBREVIATIONS.contains(&word) {
        return true;
    }
    let lower = word.to_lowercase();
    if NUMERIC_ABBREVIATIONS.contains(&lower.as_str()) {
        return next.is_some_and(|n| {
            n.trim_start_matches(OPENERS)
                .starts_with(|c: char| c.is_ascii_digit())
        });
    }
    ABBREVIATIONS.contains(&lower.as_str())
}

/// Split `text` into sentences (trimmed slices of the input).
///
/// A boundary is a run of `.`/`!`/`?`/`…`, plus any closing quotes or
/// brackets, followed by whitespace or end of text. A lone `.` after an
/// abbreviation or initial is not a boundary; decimals never are because the
/// period is not followed by whitespace.
pub fn sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (at, c) = chars[i];
        if !is_terminator(c) {
            i += 1;
            continue;
        }
        let mut j = i;
        while j < chars.len() && is_terminator(chars[j].1) {
            j += 1;
        }
        let single_period = c == '.' && j == i + 1;
        while j < chars.len() && is_closer(chars[j].1) {
            j += 1;
        }
        let at_break = j >= chars.len() || chars[j].1.is_whitespace();
        let end = chars.get(j).map_or(text.len(), |&(b, _)| b);

        if at_break {
            let last_word = text[start..at].split_whitespace().last().unwrap_or("");
            let next_word = text[end..].split_whitespace().next();
            let abbreviated = single_period && is_abbreviation(last_word, next_word);
            if !abbreviated {
                let s = text[start..end].trim();
                if !s.is_empty() {
                    out.push(s);
                }
                start = end;
            }
        }
        i = j;
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

/// Lowercased alphanumeric tokens that are not stop-words.
pub(crate) fn content_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summarizer {
    max_sentences: usize,
    min_sentences: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SENTENCES, DEFAULT_MIN_SENTENCES)
    }
}

impl Summarizer {
    pub fn new(max_sentences: usize, min_sentences: usize) -> Self {
        let (max_sentences, min_sentences) = clamp_bounds(max_sentences, min_sentences);
        Self {
            max_sentences,
            min_sentences,
        }
    }

    pub fn max_sentences(&self) -> usize {
        self.max_sentences
    }

    /// Summarize with the configured bounds.
    pub fn summarize_default(&self, text: &str) -> String {
        Self::summarize(text, self.max_sentences, self.min_sentences)
    }

    /// Extractive summary of `text` holding at most `max_sentences` sentences.
    ///
    /// Bounds are clamped first: `max_sentences == 0` is treated as 1 and
    /// `min_sentences` is kept within `1..=max_sentences`, so a request for zero
    /// sentences still yields one.
    /// Texts with no more than `min_sentences` sentences come back unchanged.
    /// When no sentence has enough content words the first `min_sentences`
    /// sentences are returned verbatim.
    pub fn summarize(text: &str, max_sentences: usize, min_sentences: usize) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let (max_n, min_n) = clamp_bounds(max_sentences, min_sentences);

        let sents = sentences(text);
        if sents.len() <= min_n {
            return text.to_string();
        }

        let mut freq: HashMap<String, u32> = HashMap::new();
        for w in content_words(text) {
            *freq.entry(w).or_insert(0) += 1;
        }

        let mut scored: Vec<(usize, f64)> = sents
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                let words: Vec<String> = content_words(s).collect();
                if words.len() < MIN_CONTENT_WORDS {
                    return None;
                }
                let total: u32 = words.iter().map(|w| freq.get(w).copied().unwrap_or(0)).sum();
                Some((i, f64::from(total) / words.len() as f64))
            })
            .collect();

        if scored.is_empty() {
            tracing::debug!(target: "summarize", sentences = sents.len(), "no scorable sentence, using leading sentences");
            return sents[..min_n.min(sents.len())].join(" ");
        }

        let num = max_n.min(min_n.max(sents.len() / 4));
        // stable: equal scores keep document order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(num);
        scored.sort_by_key(|&(i, _)| i);

        tracing::debug!(target: "summarize", total = sents.len(), kept = scored.len(), "summarized");
        scored
            .into_iter()
            .map(|(i, _)| sents[i])
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `max >= 1` and `1 <= min <= max`.
fn clamp_bounds(max_sentences: usize, min_sentences: usize) -> (usize, usize) {
    let max_n = max_sentences.max(1);
    (max_n, min_sentences.clamp(1, max_n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminators_with_whitespace() {
        let s = sentences("One here. Two there! Three? Four");
        assert_eq!(s, vec!["One here.", "Two there!", "Three?", "Four"]);
    }

    #[test]
    fn abbreviations_initials_and_decimals_do_not_split() {
        let s = sentences("Dr. Smith met J. Doe at Acme Inc. today. Prices rose 3.5 percent.");
        assert_eq!(s, vec!["Dr. Smith met J. Doe at Acme Inc. today.", "Prices rose 3.5 percent."]);
        let s = sentences("Troops left the U.S. base. Talks resume.");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn numeric_abbreviations_need_a_number() {
        let s = sentences("Voters said no. Officials will meet again tomorrow.");
        assert_eq!(s, vec!["Voters said no.", "Officials will meet again tomorrow."]);
        let s = sentences("Rule No. 5 applies, see Fig. 2 for details. The firm was est. 1890 in Ohio.");
        assert_eq!(s.len(), 2);
        let s = sentences("Profits fell at Acme Co. last year. Shares slid.");
        assert_eq!(s.len(), 2);
        let s = sentences("They met friends and co. Later they left.");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn summary_after_no_respects_max() {
        let text = "Voters said no. Officials will meet again tomorrow. Markets were calm.";
        let out = Summarizer::summarize(text, 1, 1);
        assert_eq!(sentences(&out).len(), 1);
    }

    #[test]
    fn zero_max_is_treated_as_one() {
        let text = "Parliament passed the budget bill today. Ministers praised the budget bill. \
                    Critics attacked the budget bill.";
        assert_eq!(sentences(&Summarizer::summarize(text, 0, 0)).len(), 1);
    }

    #[test]
    fn closing_quotes_stay_attached() {
        let s = sentences(r#"He said "It is over." Then he left."#);
        assert_eq!(s, vec![r#"He said "It is over.""#, "Then he left."]);
    }

    #[test]
    fn ellipsis_and_runs() {
        let s = sentences("Wait... What?! Fine.");
        assert_eq!(s, vec!["Wait...", "What?!", "Fine."]);
    }

    #[test]
    fn content_words_drop_stop_words_and_punctuation() {
        let w: Vec<String> = content_words("The Fox, and THE dog's bone!").collect();
        assert_eq!(w, vec!["fox", "dog", "bone"]);
    }

    #[test]
    fn fox_scenario_keeps_first_sentence() {
        let text = "The quick brown fox jumps over the lazy dog. It was a sunny day. Everyone was happy.";
        let out = Summarizer::summarize(text, 2, 1);
        assert_eq!(out, "The quick brown fox jumps over the lazy dog.");
    }

    #[test]
    fn short_text_returned_unchanged() {
        let text = "  Only one sentence here.  ";
        assert_eq!(Summarizer::summarize(text, 3, 1), text);
    }

    #[test]
    fn empty_text_gives_empty_summary() {
        assert_eq!(Summarizer::summarize("", 3, 1), "");
        assert_eq!(Summarizer::summarize("   ", 3, 1), "");
    }

    #[test]
    fn unscorable_text_falls_back_to_leading_sentences() {
        assert_eq!(Summarizer::summarize("Go now. Run fast. Stop it.", 3, 1), "Go now.");
    }

    #[test]
    fn selection_is_in_document_order() {
        let text = "Markets rallied strongly today. Weather stayed calm overall. \
                    Markets closed higher as markets cheered. Analysts expect markets gains. \
                    Local bakery opened downtown. Markets watchers remain upbeat about markets. \
                    Parking fees rose slightly. Gardens bloom early spring.";
        let out = Summarizer::summarize(text, 3, 1);
        let picked = sentences(&out);
        assert_eq!(picked.len(), 2);
        let positions: Vec<usize> = picked.iter().map(|p| text.find(p).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(out.contains("Markets watchers remain upbeat about markets."));
    }

    #[test]
    fn bounds_are_clamped() {
        let s = Summarizer::new(0, 5);
        assert_eq!(s.max_sentences(), 1);
        assert_eq!(s, Summarizer::new(1, 1));
    }
}
