//! JSONL batch drivers: bulk import of translation pairs, bulk prompt
//! generation, and bulk stammering checks. One JSON object per line;
//! malformed lines are reported with their line number and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::ir::{PromptQuery, PromptResponse, StammeringResponse, TranslationPair};
use crate::prompt::build_prompt;
use crate::stammering::detect_stammering;
use crate::store::TranslationStore;

/// One line of a prompt-requests file.
#[derive(Clone, Debug, Deserialize)]
pub struct PromptRequest {
    pub source_language: String,
    pub target_language: String,
    pub query_sentence: String,
}

/// One line of a stammering-tests file. `expected_output` is optional and,
/// when present, is compared against the detector's verdict.
#[derive(Clone, Debug, Deserialize)]
pub struct StammeringTest {
    pub source_sentence: String,
    pub translated_sentence: String,
    #[serde(default)]
    pub expected_output: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StammeringSummary {
    pub total: usize,
    pub flagged: usize,
    pub mismatched: usize,
    pub skipped: usize,
}

/// Import translation pairs from a JSONL file into the store.
pub fn import_pairs(store: &TranslationStore, path: &Path) -> anyhow::Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for (line_number, line) in read_lines(path)? {
        match serde_json::from_str::<TranslationPair>(&line) {
            Ok(pair) => {
                if store.insert_if_absent(&pair)? {
                    summary.inserted += 1;
                } else {
                    summary.duplicates += 1;
                }
            }
            Err(err) => {
                log::warn!("{}:{line_number}: skipping malformed pair: {err}", path.display());
                summary.skipped += 1;
            }
        }
    }
    log::info!(
        "imported {} pairs from {} ({} duplicates, {} skipped)",
        summary.inserted,
        path.display(),
        summary.duplicates,
        summary.skipped
    );
    Ok(summary)
}

/// Build a prompt for every request line, writing one `{"prompt": …}` JSON
/// object per line to `out`. Returns the number of prompts rendered.
pub fn run_prompt_requests(
    store: &TranslationStore,
    path: &Path,
    max_examples: usize,
    out: &mut dyn Write,
) -> anyhow::Result<usize> {
    let mut rendered = 0usize;
    for (line_number, line) in read_lines(path)? {
        let request: PromptRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(err) => {
                log::warn!(
                    "{}:{line_number}: skipping malformed request: {err}",
                    path.display()
                );
                continue;
            }
        };
        let pairs = store.fetch(&request.source_language, &request.target_language)?;
        let query = PromptQuery::new(
            request.query_sentence,
            request.source_language,
            request.target_language,
        )
        .with_max_examples(max_examples);
        let response = PromptResponse {
            prompt: build_prompt(&query, &pairs),
        };
        let json = serde_json::to_string(&response).context("serialize prompt response")?;
        writeln!(out, "{json}").context("write prompt response")?;
        rendered += 1;
    }
    Ok(rendered)
}

/// Run the stammering detector over every test line, writing one
/// `{"has_stammer": …}` JSON object per line to `out`. Lines carrying an
/// `expected_output` that disagrees with the verdict are counted and logged.
pub fn run_stammering_tests(path: &Path, out: &mut dyn Write) -> anyhow::Result<StammeringSummary> {
    let mut summary = StammeringSummary::default();
    for (line_number, line) in read_lines(path)? {
        let test: StammeringTest = match serde_json::from_str(&line) {
            Ok(t) => t,
            Err(err) => {
                log::warn!(
                    "{}:{line_number}: skipping malformed test: {err}",
                    path.display()
                );
                summary.skipped += 1;
                continue;
            }
        };
        let has_stammer = detect_stammering(&test.source_sentence, &test.translated_sentence);
        summary.total += 1;
        if has_stammer {
            summary.flagged += 1;
        }
        if let Some(expected) = test.expected_output {
            if expected != has_stammer {
                summary.mismatched += 1;
                log::warn!(
                    "{}:{line_number}: verdict {has_stammer} but expected {expected}",
                    path.display()
                );
            }
        }
        let json = serde_json::to_string(&StammeringResponse { has_stammer })
            .context("serialize stammering response")?;
        writeln!(out, "{json}").context("write stammering response")?;
    }
    Ok(summary)
}

/// Non-blank lines of a file, with 1-based line numbers.
fn read_lines(path: &Path) -> anyhow::Result<Vec<(usize, String)>> {
    let file = File::open(path).with_context(|| format!("open jsonl: {}", path.display()))?;
    let mut out = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read jsonl: {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        out.push((idx + 1, line));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{import_pairs, run_prompt_requests, run_stammering_tests};
    use crate::store::TranslationStore;
    use std::io::Write;

    fn write_jsonl(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        for line in lines {
            writeln!(file, "{line}").expect("write line");
        }
        file
    }

    #[test]
    fn import_counts_inserts_duplicates_and_malformed_lines() {
        let store = TranslationStore::open_in_memory().expect("open store");
        let file = write_jsonl(&[
            r#"{"source_language":"en","target_language":"fr","sentence":"good morning","translation":"bonjour"}"#,
            r#"{"source_language":"en","target_language":"fr","sentence":"good morning","translation":"bonjour"}"#,
            "not json",
            "",
            r#"{"source_language":"en","target_language":"fr","sentence":"good night","translation":"bonne nuit"}"#,
        ]);
        let summary = import_pairs(&store, file.path()).expect("import");
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(store.count().expect("count"), 2);
    }

    #[test]
    fn prompt_requests_emit_one_json_object_per_line() {
        let store = TranslationStore::open_in_memory().expect("open store");
        let file = write_jsonl(&[
            r#"{"source_language":"en","target_language":"fr","query_sentence":"good morning"}"#,
        ]);
        let mut out = Vec::new();
        let rendered = run_prompt_requests(&store, file.path(), 4, &mut out).expect("run");
        assert_eq!(rendered, 1);
        let text = String::from_utf8(out).expect("utf8");
        let value: serde_json::Value = serde_json::from_str(text.trim()).expect("json");
        assert_eq!(
            value["prompt"],
            "Translate the following sentence from en to fr:\nen: good morning"
        );
    }

    #[test]
    fn stammering_tests_track_expected_mismatches() {
        let file = write_jsonl(&[
            r#"{"source_sentence":"hello there","translated_sentence":"hi there","expected_output":false}"#,
            r#"{"source_sentence":"the cat sat","translated_sentence":"the the the the cat sat","expected_output":false}"#,
            r#"{"source_sentence":"x","translated_sentence":"sooooooo good"}"#,
        ]);
        let mut out = Vec::new();
        let summary = run_stammering_tests(file.path(), &mut out).expect("run");
        assert_eq!(summary.total, 3);
        assert_eq!(summary.flagged, 2);
        assert_eq!(summary.mismatched, 1);
        assert_eq!(summary.skipped, 0);

        let text = String::from_utf8(out).expect("utf8");
        let verdicts: Vec<bool> = text
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).expect("json");
                v["has_stammer"].as_bool().expect("bool")
            })
            .collect();
        assert_eq!(verdicts, vec![false, true, true]);
    }
}
