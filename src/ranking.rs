use crate::ir::TranslationPair;
use crate::vectorize::vectorize;

/// A candidate example paired with its similarity to the query. Lives only for
/// the duration of one ranking call.
#[derive(Clone, Debug)]
pub struct ScoredPair<'a> {
    pub pair: &'a TranslationPair,
    pub score: f64,
}

/// Cosine similarity of two equal-length vectors, defined as 0 when either
/// vector has zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Rank candidate pairs against a query sentence.
///
/// The query is appended to the candidate sentences and the whole corpus is
/// vectorized in one pass, so query and candidates share a single vocabulary
/// and idf table. Vectorizing the query on its own would make the scores
/// incomparable.
///
/// The result is sorted by descending score (ties keep input order), keeps
/// only scores strictly above 0, and is capped at `max_examples`.
#[must_use]
pub fn rank_candidates<'a>(
    query_sentence: &str,
    pairs: &'a [TranslationPair],
    max_examples: usize,
) -> Vec<ScoredPair<'a>> {
    if pairs.is_empty() {
        return Vec::new();
    }

    let mut corpus: Vec<&str> = pairs.iter().map(|p| p.sentence.as_str()).collect();
    corpus.push(query_sentence);
    let vectors = vectorize(&corpus);

    let Some((query_vec, candidate_vecs)) = vectors.split_last() else {
        return Vec::new();
    };

    let mut scored: Vec<ScoredPair<'a>> = pairs
        .iter()
        .zip(candidate_vecs)
        .map(|(pair, vec)| ScoredPair {
            pair,
            score: cosine_similarity(query_vec, vec),
        })
        .collect();

    // sort_by is stable, so equal scores retain their original input order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.retain(|s| s.score > 0.0);
    scored.truncate(max_examples);
    scored
}
