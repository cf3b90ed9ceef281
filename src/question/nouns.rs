// src/question/nouns.rs
//! Heuristic common-noun extraction (no tagger): lowercase content words
//! minus a closed list of frequent verbs, adjectives and adverbs.

use std::collections::HashSet;

use crate::summarize::STOP_WORDS;

const MIN_LEN: usize = 3;

const NOMINAL_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "ity", "ance", "ence", "ship", "ism", "ist", "er", "or",
    "age", "ure",
];

/// Words ending in "ed" that are nouns anyway.
const ED_NOUNS: &[&str] = &[
    "need", "seed", "speed", "feed", "greed", "creed", "breed", "shed", "bed", "weed",
];

const NOT_NOUNS: &[&str] = &[
    // verbs
    "said", "says", "say", "make", "made", "makes", "take", "took", "taken", "takes", "get",
    "got", "gets", "give", "gave", "given", "go", "goes", "went", "gone", "come", "came",
    "comes", "see", "saw", "seen", "know", "knew", "known", "think", "thought", "tell",
    "told", "find", "found", "become", "became", "show", "shows", "shown", "leave", "left",
    "feel", "felt", "put", "bring", "brought", "begin", "began", "keep", "kept", "hold",
    "held", "write", "wrote", "stand", "stood", "hear", "heard", "let", "mean", "meant",
    "set", "meet", "met", "run", "ran", "pay", "paid", "sit", "sat", "speak", "spoke",
    "lie", "lead", "led", "read", "grow", "grew", "lose", "lost", "fall", "fell", "send",
    "sent", "build", "built", "stay", "reach", "remain", "remains", "seem", "seems", "help",
    "jumps", "jump", "rose", "rise", "rises", "would", "could", "might", "must", "shall",
    "may", "also", "use", "uses", "want", "wants", "try", "tries", "ask", "asks", "call",
    "calls", "work", "works", "look", "looks", "expect", "expects", "urge", "urges",
    "include", "includes", "including", "according", "amid", "across", "among",
    "within", "without", "toward", "towards", "upon", "via", "per", "despite", "since",
    // adjectives
    "new", "old", "good", "bad", "great", "big", "small", "large", "little", "long",
    "short", "high", "low", "young", "early", "late", "major", "minor", "important",
    "public", "private", "able", "possible", "likely", "unlikely", "real", "best", "better",
    "worse", "worst", "sure", "clear", "full", "free", "whole", "last", "next", "first",
    "second", "third", "many", "much", "several", "every", "another", "quick", "slow",
    "brown", "red", "blue", "green", "black", "white", "lazy", "sunny", "happy", "sad",
    "hot", "cold", "warm", "true", "false", "global", "local", "national", "international",
    "political", "economic", "social", "recent", "current", "former", "significant",
    "strong", "weak", "hard", "easy", "fast", "huge", "key", "top", "main", "same",
    "different", "certain", "various", "unprecedented", "nearly", "almost", "even", "still",
    "yet", "already", "ever", "never", "always", "often", "away", "back", "well", "far",
    "however", "though", "although", "whether", "everyone", "everything",
    "someone", "something", "anyone", "anything", "nobody", "nothing", "one", "two",
    "three", "four", "five", "six", "seven", "eight", "nine", "ten", "hundred", "thousand",
    "million", "billion",
];

fn is_candidate(w: &str, not_nouns: &HashSet<&str>) -> bool {
    w.chars().count() >= MIN_LEN
        && w.chars().all(|c| c.is_ascii_lowercase())
        && !STOP_WORDS.contains(w)
        && !not_nouns.contains(w)
        && !w.ends_with("ly")
        && (!w.ends_with("ed") || ED_NOUNS.contains(&w))
}

fn has_nominal_suffix(w: &str) -> bool {
    NOMINAL_SUFFIXES
        .iter()
        .any(|s| w.len() > s.len() + 2 && w.ends_with(s))
}

/// Likely common nouns, verbatim and deduplicated, in text order. When some
/// candidates carry a nominal suffix ("-tion", "-ment", ...) only those are
/// returned.
pub fn extract_nouns(text: &str) -> Vec<String> {
    let not_nouns: HashSet<&str> = NOT_NOUNS.iter().copied().collect();
    let mut seen = HashSet::new();
    let candidates: Vec<&str> = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| is_candidate(w, &not_nouns))
        .filter(|w| seen.insert(*w))
        .collect();

    let preferred: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|w| has_nominal_suffix(w))
        .collect();
    let chosen = if preferred.is_empty() { candidates } else { preferred };
    chosen.into_iter().map(str::to_string).collect()
}
