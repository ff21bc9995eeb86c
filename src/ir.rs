use serde::{Deserialize, Serialize};

/// Default cap on the number of examples included in a few-shot prompt.
pub const DEFAULT_MAX_EXAMPLES: usize = 4;

/// One stored translation example. Equality is structural over all four
/// fields; the store's UNIQUE constraint uses the same 4-tuple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranslationPair {
    pub source_language: String,
    pub target_language: String,
    pub sentence: String,
    pub translation: String,
}

/// A prompt request: the sentence to translate, its language pair, and the
/// example cap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptQuery {
    pub query_sentence: String,
    pub source_language: String,
    pub target_language: String,
    pub max_examples: usize,
}

/// Boundary output shape for prompt requests: `{"prompt": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResponse {
    pub prompt: String,
}

/// Boundary output shape for stammering checks: `{"has_stammer": bool}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StammeringResponse {
    pub has_stammer: bool,
}

impl PromptQuery {
    #[must_use]
    pub fn new(
        query_sentence: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            query_sentence: query_sentence.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            max_examples: DEFAULT_MAX_EXAMPLES,
        }
    }

    /// Override the example cap. Clamped to at least 1.
    #[must_use]
    pub fn with_max_examples(mut self, max_examples: usize) -> Self {
        self.max_examples = max_examples.max(1);
        self
    }
}
