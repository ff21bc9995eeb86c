use crate::ir::{PromptQuery, TranslationPair};
use crate::ranking::rank_candidates;

/// Render the final prompt text for a query against a set of candidate pairs.
///
/// The layout is a compatibility contract: downstream models are fed these
/// exact bytes. Lines are joined with a single `\n` and no trailing newline is
/// appended.
#[must_use]
pub fn build_prompt(query: &PromptQuery, pairs: &[TranslationPair]) -> String {
    let ranked = rank_candidates(&query.query_sentence, pairs, query.max_examples);
    if ranked.is_empty() {
        return fallback_prompt(query);
    }

    let src = &query.source_language;
    let tgt = &query.target_language;

    let mut lines: Vec<String> = vec![
        format!("Translate the following sentence from {src} to {tgt}."),
        String::new(),
        "Examples:".to_string(),
    ];
    for scored in &ranked {
        lines.push(format!("{src}: {}", scored.pair.sentence));
        lines.push(format!("{tgt}: {}", scored.pair.translation));
        lines.push(String::new());
    }
    lines.push("Sentence to translate:".to_string());
    lines.push(format!("{src}: {}", query.query_sentence));

    lines.join("\n")
}

/// Used when no candidates exist or none score above 0.
fn fallback_prompt(query: &PromptQuery) -> String {
    format!(
        "Translate the following sentence from {src} to {tgt}:\n{src}: {query}",
        src = query.source_language,
        tgt = query.target_language,
        query = query.query_sentence,
    )
}

#[cfg(test)]
mod tests {
    use super::build_prompt;
    use crate::ir::{PromptQuery, TranslationPair};

    fn pair(sentence: &str, translation: &str) -> TranslationPair {
        TranslationPair {
            source_language: "en".to_string(),
            target_language: "fr".to_string(),
            sentence: sentence.to_string(),
            translation: translation.to_string(),
        }
    }

    #[test]
    fn empty_candidates_use_fallback_form_exactly() {
        let query = PromptQuery::new("good morning", "en", "fr");
        let prompt = build_prompt(&query, &[]);
        assert_eq!(
            prompt,
            "Translate the following sentence from en to fr:\nen: good morning"
        );
    }

    #[test]
    fn zero_similarity_candidates_use_fallback() {
        let query = PromptQuery::new("good morning", "en", "fr");
        let pairs = vec![pair("completely unrelated words", "mots sans rapport")];
        let prompt = build_prompt(&query, &pairs);
        assert_eq!(
            prompt,
            "Translate the following sentence from en to fr:\nen: good morning"
        );
    }

    #[test]
    fn few_shot_form_is_byte_exact() {
        let query = PromptQuery::new("good morning friend", "en", "fr");
        let pairs = vec![pair("good morning", "bonjour")];
        let prompt = build_prompt(&query, &pairs);
        let expected = "Translate the following sentence from en to fr.\n\
                        \n\
                        Examples:\n\
                        en: good morning\n\
                        fr: bonjour\n\
                        \n\
                        Sentence to translate:\n\
                        en: good morning friend";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn no_trailing_newline() {
        let query = PromptQuery::new("good morning", "en", "fr");
        let pairs = vec![pair("good morning", "bonjour")];
        let prompt = build_prompt(&query, &pairs);
        assert!(!prompt.ends_with('\n'));
    }

    #[test]
    fn max_examples_caps_rendered_examples() {
        let query = PromptQuery::new("good morning", "en", "fr").with_max_examples(1);
        let pairs = vec![
            pair("good morning", "bonjour"),
            pair("good morning all", "bonjour à tous"),
        ];
        let prompt = build_prompt(&query, &pairs);
        assert_eq!(prompt.matches("en: good").count(), 2); // one example + the query line
        assert!(prompt.contains("fr: bonjour"));
        assert!(!prompt.contains("bonjour à tous"));
    }
}
