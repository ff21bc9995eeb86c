use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{ensure, Context};
use clap::{Parser, Subcommand};

use recall_translator::batch::{import_pairs, run_prompt_requests, run_stammering_tests};
use recall_translator::config::{init_default_config, resolve_config};
use recall_translator::ir::{PromptResponse, StammeringResponse, TranslationPair};
use recall_translator::{build_prompt, detect_stammering, PromptQuery, TranslationStore};

#[derive(Parser, Debug)]
#[command(name = "recall-translator")]
#[command(about = "Few-shot translation prompts from a local translation memory", long_about = None)]
struct Args {
    /// Config file path (default: search for recall-translator.toml upwards)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the config)
    #[arg(long, global = true, value_name = "DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a default config file, then exit
    InitConfig {
        /// Directory to write the config file (default: current directory)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Store a translation pair (duplicates are ignored)
    Add {
        #[arg(long)]
        source_language: String,
        #[arg(long)]
        target_language: String,
        #[arg(long)]
        sentence: String,
        #[arg(long)]
        translation: String,
    },

    /// Build a few-shot translation prompt from the stored examples
    Prompt {
        #[arg(long)]
        source_language: String,
        #[arg(long)]
        target_language: String,
        #[arg(long)]
        query_sentence: String,

        /// Cap on the number of examples in the prompt (default from config)
        #[arg(long)]
        max_examples: Option<usize>,
    },

    /// Check a translated sentence for stammering artifacts
    Stammering {
        #[arg(long)]
        source_sentence: String,
        #[arg(long)]
        translated_sentence: String,
    },

    /// Bulk-import translation pairs from a JSONL file
    Import {
        #[arg(value_name = "JSONL")]
        input: PathBuf,
    },

    /// Build prompts for a JSONL file of prompt requests
    RunPrompts {
        #[arg(value_name = "JSONL")]
        input: PathBuf,
    },

    /// Run stammering checks for a JSONL file of test cases
    CheckStammering {
        #[arg(value_name = "JSONL")]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Command::InitConfig { dir, force } = &args.command {
        let dir = dir
            .clone()
            .map_or_else(std::env::current_dir, Ok)
            .context("resolve config dir")?;
        let cfg_path = init_default_config(&dir, *force)?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    let cfg = resolve_config(args.config.clone())?;
    let db_path = args.db.clone().unwrap_or_else(|| cfg.db_path());
    let store = TranslationStore::open(&db_path)?;
    let stdout = io::stdout();

    match args.command {
        Command::InitConfig { .. } => unreachable!("handled above"),

        Command::Add {
            source_language,
            target_language,
            sentence,
            translation,
        } => {
            let pair = TranslationPair {
                source_language,
                target_language,
                sentence,
                translation,
            };
            store.insert_if_absent(&pair)?;
            print_json(&serde_json::json!({ "status": "ok" }))?;
        }

        Command::Prompt {
            source_language,
            target_language,
            query_sentence,
            max_examples,
        } => {
            let max_examples = max_examples.unwrap_or_else(|| cfg.max_examples());
            ensure!(max_examples >= 1, "--max-examples must be at least 1");
            let pairs = store.fetch(&source_language, &target_language)?;
            let query = PromptQuery::new(query_sentence, source_language, target_language)
                .with_max_examples(max_examples);
            let response = PromptResponse {
                prompt: build_prompt(&query, &pairs),
            };
            print_json(&response)?;
        }

        Command::Stammering {
            source_sentence,
            translated_sentence,
        } => {
            let response = StammeringResponse {
                has_stammer: detect_stammering(&source_sentence, &translated_sentence),
            };
            print_json(&response)?;
        }

        Command::Import { input } => {
            let summary = import_pairs(&store, &input)?;
            print_json(&serde_json::json!({
                "status": "ok",
                "inserted": summary.inserted,
                "duplicates": summary.duplicates,
                "skipped": summary.skipped,
            }))?;
        }

        Command::RunPrompts { input } => {
            let mut out = stdout.lock();
            run_prompt_requests(&store, &input, cfg.max_examples(), &mut out)?;
        }

        Command::CheckStammering { input } => {
            let mut out = stdout.lock();
            let summary = run_stammering_tests(&input, &mut out)?;
            ensure!(
                summary.mismatched == 0,
                "{} of {} stammering verdicts disagreed with expected_output",
                summary.mismatched,
                summary.total
            );
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string(value).context("serialize response")?;
    let mut out = io::stdout().lock();
    writeln!(out, "{json}").context("write response")?;
    Ok(())
}
