//! cipher-complete CLI: interactive encrypted autocomplete.
//!
//! Thin wrapper over the `cipher-complete` library crate. The index only ever
//! sees sealed payloads; this binary plays both the index host and the client
//! that opens suggestions and reports the chosen word.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use cipher_complete::{
    Client, DEFAULT_VOCABULARY, IndexConfig, KeyedOpener, KeyedSealer, OpeningKey, SealedIndex,
    load_word_list,
};
use clap::Parser;
use log::info;

/// Encrypted autocomplete: suggests sealed words ranked by how often they are chosen.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Vocabulary file, one word per line. Default: built-in word list.
    #[arg(long)]
    words: Option<PathBuf>,

    /// Maximum suggestions shown per prefix (0 = no limit).
    #[arg(long, default_value_t = 0)]
    limit: usize,
}

/// What the next input line means.
enum Awaiting {
    Prefix,
    Selection(Vec<String>),
}

fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit")
}

/// Resolve a selection line to one of the shown words: the word itself or
/// its 1-based position.
fn pick<'a>(line: &str, suggestions: &'a [String]) -> Option<&'a str> {
    if let Some(word) = suggestions.iter().find(|w| w.as_str() == line) {
        return Some(word.as_str());
    }
    line.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| suggestions.get(i))
        .map(String::as_str)
}

fn main() -> cipher_complete::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();

    // The index host gets the public half only.
    let opening = OpeningKey::generate();
    let sealing = opening.sealing_key();
    info!("sealing to {sealing}");

    let config = IndexConfig {
        max_suggestions: (args.limit > 0).then_some(args.limit),
    };
    let mut index = SealedIndex::with_config(KeyedSealer::new(sealing), config);
    let client = Client::new(KeyedOpener::new(opening));

    match args.words {
        Some(ref path) => {
            info!("loading vocabulary from {}", path.display());
            let words = load_word_list(path)?;
            index.insert_keys(&words)?;
        }
        None => {
            index.insert_keys(DEFAULT_VOCABULARY.iter().copied())?;
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    writeln!(stdout, "{} words indexed.", index.len())?;

    let mut awaiting = Awaiting::Prefix;
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if is_exit(trimmed) {
            break;
        }

        awaiting = match awaiting {
            Awaiting::Prefix if trimmed.is_empty() => Awaiting::Prefix,
            Awaiting::Prefix => {
                let suggestions = client.decrypt_suggestions(&index.rank(trimmed))?;
                if suggestions.is_empty() {
                    writeln!(stdout, "No suggestions found for prefix '{trimmed}'")?;
                    Awaiting::Prefix
                } else {
                    writeln!(
                        stdout,
                        "Suggestions for '{trimmed}': {}",
                        suggestions.join(", ")
                    )?;
                    Awaiting::Selection(suggestions)
                }
            }
            Awaiting::Selection(suggestions) => {
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                    writeln!(stdout, "Skipped.")?;
                } else if let Some(word) = pick(trimmed, &suggestions) {
                    index.record_selection(word);
                    writeln!(stdout, "Selected '{word}'.")?;
                } else {
                    writeln!(stdout, "'{trimmed}' is not among the suggestions.")?;
                }
                Awaiting::Prefix
            }
        };
        stdout.flush()?;
    }

    Ok(())
}
