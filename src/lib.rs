//! Few-shot translation prompting with a local translation memory.
//!
//! Two deterministic engines: TF-IDF retrieval over stored translation pairs
//! rendered into an exact few-shot prompt, and a stammering detector that
//! flags repetition artifacts in translated sentences. Around them, a SQLite
//! store, a TOML config layer, and JSONL batch drivers.

pub mod batch;
pub mod config;
pub mod ir;
pub mod prompt;
pub mod ranking;
pub mod stammering;
pub mod store;
pub mod vectorize;

pub use ir::{PromptQuery, TranslationPair, DEFAULT_MAX_EXAMPLES};
pub use prompt::build_prompt;
pub use stammering::detect_stammering;
pub use store::TranslationStore;
