use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

// Maximal runs of word characters (letters, digits, underscore) of length >= 2.
// Punctuation and single-character tokens are dropped entirely.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w\w+").expect("token regex"));

/// Lowercase and tokenize one sentence. No stemming, no stop-word removal.
#[must_use]
pub fn tokenize(sentence: &str) -> Vec<String> {
    let lower = sentence.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Smoothed-idf TF-IDF vectors for a corpus, one vector per sentence, all over
/// a vocabulary built from that corpus only.
///
/// Weights are `tf(t, d) * idf(t)` with `idf(t) = ln((1 + N) / (1 + df(t))) + 1`,
/// then L2-normalized per sentence. A sentence with no tokens yields a zero
/// vector (and cosine similarity 0 with everything).
#[must_use]
pub fn vectorize(corpus: &[&str]) -> Vec<Vec<f64>> {
    let docs: Vec<Vec<String>> = corpus.iter().map(|s| tokenize(s)).collect();

    let mut vocab: HashMap<&str, usize> = HashMap::new();
    for doc in &docs {
        for tok in doc {
            if !vocab.contains_key(tok.as_str()) {
                let next = vocab.len();
                vocab.insert(tok.as_str(), next);
            }
        }
    }

    // df(t) counts sentences containing t at least once.
    let mut df = vec![0usize; vocab.len()];
    for doc in &docs {
        let mut seen = vec![false; vocab.len()];
        for tok in doc {
            seen[vocab[tok.as_str()]] = true;
        }
        for (idx, hit) in seen.iter().enumerate() {
            if *hit {
                df[idx] += 1;
            }
        }
    }

    let n = docs.len() as f64;
    let idf: Vec<f64> = df
        .iter()
        .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
        .collect();

    docs.iter()
        .map(|doc| {
            let mut weights = vec![0.0f64; idf.len()];
            for tok in doc {
                weights[vocab[tok.as_str()]] += 1.0;
            }
            for (w, scale) in weights.iter_mut().zip(&idf) {
                *w *= scale;
            }
            let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for w in &mut weights {
                    *w /= norm;
                }
            }
            weights
        })
        .collect()
}
