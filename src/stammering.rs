use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word regex"));

// Thresholds for the individual heuristics.
const CHAR_FLOOD_MIN_RUN: usize = 6;
const TOKEN_RUN_MIN: usize = 4;
const TRIGRAM_MIN_COUNT: usize = 3;
const DIVERSITY_MIN_TOKENS: usize = 8;
const DIVERSITY_MIN_RATIO: f64 = 0.4;

/// Detect stammering artifacts in a translated sentence.
///
/// Four independent heuristics, combined by logical OR:
/// - character flooding (e.g. "sooooo good")
/// - token-run amplification relative to the source
/// - repeated multi-word phrases (trigrams)
/// - low lexical diversity in long outputs
///
/// Total over all string inputs; an empty translation is never flagged.
#[must_use]
pub fn detect_stammering(source_sentence: &str, translated_sentence: &str) -> bool {
    let src_words = normalize_tokens(source_sentence);
    let tgt_words = normalize_tokens(translated_sentence);

    if tgt_words.is_empty() {
        return false;
    }

    if has_char_flood(&translated_sentence.to_lowercase()) {
        return true;
    }

    let src_run = longest_token_run(&src_words);
    let tgt_run = longest_token_run(&tgt_words);
    if tgt_run >= TOKEN_RUN_MIN && tgt_run > src_run {
        return true;
    }

    if has_repeated_trigram(&tgt_words) {
        return true;
    }

    let distinct: HashSet<&str> = tgt_words.iter().map(String::as_str).collect();
    let unique_ratio = distinct.len() as f64 / tgt_words.len() as f64;
    if tgt_words.len() >= DIVERSITY_MIN_TOKENS && unique_ratio < DIVERSITY_MIN_RATIO {
        return true;
    }

    false
}

/// Lowercase, strip characters that are neither word characters nor
/// whitespace, and split on whitespace.
fn normalize_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lower, "");
    stripped.split_whitespace().map(str::to_string).collect()
}

/// Longest run of identical consecutive tokens (0 for an empty sequence).
fn longest_token_run(words: &[String]) -> usize {
    let mut best = 0usize;
    let mut run = 0usize;
    let mut prev: Option<&str> = None;
    for w in words {
        if prev == Some(w.as_str()) {
            run += 1;
        } else {
            run = 1;
            prev = Some(w.as_str());
        }
        best = best.max(run);
    }
    best
}

/// Any single character repeated `CHAR_FLOOD_MIN_RUN` or more times in a row.
/// Newline runs are exempt to match the usual `(.)\1{5,}` regex, where `.`
/// never matches a newline.
fn has_char_flood(text: &str) -> bool {
    let mut run = 0usize;
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if prev == Some(ch) {
            run += 1;
        } else {
            run = 1;
            prev = Some(ch);
        }
        if run >= CHAR_FLOOD_MIN_RUN && ch != '\n' {
            return true;
        }
    }
    false
}

/// Some trigram occurs `TRIGRAM_MIN_COUNT` or more times and contains more
/// than one distinct token. Degenerate single-token trigrams are excluded;
/// those runs are already covered by the amplification check.
fn has_repeated_trigram(words: &[String]) -> bool {
    if words.len() < 3 {
        return false;
    }
    let mut counts: HashMap<(&str, &str, &str), usize> = HashMap::new();
    for w in words.windows(3) {
        *counts
            .entry((w[0].as_str(), w[1].as_str(), w[2].as_str()))
            .or_insert(0) += 1;
    }
    counts
        .iter()
        .any(|(&(a, b, c), &count)| count >= TRIGRAM_MIN_COUNT && !(a == b && b == c))
}

#[cfg(test)]
mod tests {
    use super::detect_stammering;

    #[test]
    fn empty_translation_is_never_flagged() {
        assert!(!detect_stammering("", ""));
        assert!(!detect_stammering("hello there", "   "));
        assert!(!detect_stammering("hello there", "?!"));
    }

    #[test]
    fn character_flooding_is_flagged() {
        assert!(detect_stammering("so good", "sooooooo good"));
        assert!(detect_stammering("", "aaaaaa"));
        // Runs shorter than six stay below the threshold.
        assert!(!detect_stammering("so good", "soooo good"));
    }

    #[test]
    fn newline_runs_are_not_character_flooding() {
        assert!(!detect_stammering("x", "word \n\n\n\n\n\n\n word"));
    }

    #[test]
    fn amplified_token_runs_are_flagged() {
        assert!(detect_stammering("the cat sat", "the the the the cat sat"));
    }

    #[test]
    fn token_run_present_in_source_is_not_amplification() {
        // Source already carries an equal run; translation adds nothing.
        assert!(!detect_stammering(
            "no no no no said the clerk",
            "no no no no said the clerk"
        ));
    }

    #[test]
    fn repeated_trigrams_are_flagged() {
        assert!(detect_stammering(
            "irrelevant",
            "the cat ate the cat ate the cat ate"
        ));
    }

    #[test]
    fn single_token_trigrams_are_excluded() {
        // Five identical tokens produce three identical trigrams, but the
        // source carries a longer run, so neither heuristic fires.
        assert!(!detect_stammering("go go go go go go", "go go go go go"));
    }

    #[test]
    fn low_lexical_diversity_is_flagged() {
        assert!(detect_stammering("anything", "a b a b a b a b"));
    }

    #[test]
    fn short_output_is_exempt_from_diversity() {
        // 6 tokens, ratio 1/3 < 0.4, but below the 8-token minimum.
        assert!(!detect_stammering("anything", "ab cd ab cd ab cd"));
    }

    #[test]
    fn clean_translation_is_not_flagged() {
        assert!(!detect_stammering("hello there", "hi there"));
        assert!(!detect_stammering(
            "the quick brown fox",
            "le rapide renard brun"
        ));
    }

    #[test]
    fn punctuation_is_stripped_before_token_checks() {
        // "the, the. the! the?" normalizes to four identical tokens.
        assert!(detect_stammering("the cat sat", "the, the. the! the? cat sat"));
    }
}
