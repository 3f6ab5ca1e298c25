//! # babbler
//!
//! Command line for the babbler chat brain: train from files, learn text,
//! generate replies, and move brains through their binary file formats.

#![deny(unsafe_code)]

mod loaders;

use std::io::{self, BufRead as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};

use babbler_codec::BrainFileFormat;
use babbler_reply::{ConstantSurprise, ReplyOptions};
use babbler_store::{BrainStore, ListCategory, MapCategory};
use tracing::info;

/// Canned response when generation comes back empty.
const EMPTY_REPLY: &str = "I don't know enough to answer you yet!";

/// Trainable Markov-chain chat brain.
#[derive(Parser, Debug)]
#[command(name = "babbler", about = "Trainable Markov-chain chat brain")]
struct Cli {
    /// Path to the `SQLite` brain database (default: ~/.babbler/brains.db,
    /// overridable via BABBLER_DB).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Minimum log level when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a brain from a text file, one sentence per line.
    Train {
        /// Brain name, created on first use.
        name: String,
        /// Training corpus; `#` lines are comments.
        file: PathBuf,
    },

    /// Learn text without replying. Reads stdin lines when no text is given.
    Learn {
        /// Brain name, created on first use.
        name: String,
        /// Text to learn.
        text: Option<String>,
    },

    /// Learn text and reply to it. Reads stdin lines when no text is given.
    Hal {
        /// Brain name, created on first use.
        name: String,
        /// Text to respond to.
        text: Option<String>,
        /// Wall-clock budget for reply generation, in milliseconds.
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,
    },

    /// Load or save binary brain files and their word lists.
    Brain {
        #[command(subcommand)]
        action: BrainAction,
    },
}

#[derive(Subcommand, Debug)]
enum BrainAction {
    /// Load <prefix>.{aux,ban,grt,swp} and <prefix>.brn into a brain.
    Load {
        /// Brain name, created on first use.
        name: String,
        /// Filename prefix of the brain fileset.
        prefix: String,
    },

    /// Save a brain to <prefix>.brn.
    Save {
        /// Brain name; must exist.
        name: String,
        /// Filename prefix of the brain file.
        prefix: String,
        /// On-disk format to write.
        #[arg(long, value_enum, default_value_t = FormatArg::Compact)]
        format: FormatArg,
    },
}

/// CLI-facing spelling of [`BrainFileFormat`].
#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    /// Fixed-width legacy format.
    Legacy,
    /// Bit-packed compact format.
    Compact,
}

impl From<FormatArg> for BrainFileFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Legacy => Self::Legacy,
            FormatArg::Compact => Self::Compact,
        }
    }
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("BABBLER_DB") {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_owned());
    PathBuf::from(home).join(".babbler").join("brains.db")
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Initialize the global tracing subscriber with stderr output.
fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();
    let _ = subscriber.try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_subscriber(&cli.log_level);

    let db_path = cli.db_path.unwrap_or_else(default_db_path);
    ensure_parent_dir(&db_path)?;
    let store = BrainStore::open(&db_path)
        .with_context(|| format!("failed to open brain store at {}", db_path.display()))?;

    match cli.command {
        Command::Train { name, file } => run_train(&store, &name, &file),
        Command::Learn { name, text } => run_learn(&store, &name, text.as_deref()),
        Command::Hal {
            name,
            text,
            timeout_ms,
        } => run_hal(&store, &name, text.as_deref(), timeout_ms),
        Command::Brain { action } => match action {
            BrainAction::Load { name, prefix } => run_brain_load(&store, &name, &prefix),
            BrainAction::Save {
                name,
                prefix,
                format,
            } => run_brain_save(&store, &name, &prefix, format.into()),
        },
    }
}

/// Run `f` for the given text, or for every non-empty stdin line.
fn for_each_line(text: Option<&str>, mut f: impl FnMut(&str) -> Result<()>) -> Result<()> {
    if let Some(text) = text {
        if !text.is_empty() {
            f(text)?;
        }
        return Ok(());
    }
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        f(line)?;
    }
    Ok(())
}

fn run_train(store: &BrainStore, name: &str, file: &Path) -> Result<()> {
    store.with_transaction(|store| {
        let brain = store.brain(name)?;
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read training file {}", file.display()))?;

        let mut sentences = 0u64;
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            babbler_reply::learn_text(store, brain, line)?;
            sentences += 1;
        }
        info!(sentences, brain = name, "training complete");
        Ok(())
    })
}

fn run_learn(store: &BrainStore, name: &str, text: Option<&str>) -> Result<()> {
    for_each_line(text, |line| {
        store.with_transaction(|store| {
            let brain = store.brain(name)?;
            babbler_reply::learn_text(store, brain, line)?;
            Ok(())
        })
    })
}

fn run_hal(store: &BrainStore, name: &str, text: Option<&str>, timeout_ms: u64) -> Result<()> {
    let options = ReplyOptions {
        timeout: Duration::from_millis(timeout_ms),
    };
    let surprise = ConstantSurprise::default();

    for_each_line(text, |line| {
        let response = store.with_transaction(|store| {
            let brain = store.brain(name)?;
            babbler_reply::learn_text(store, brain, line)?;
            Ok::<_, anyhow::Error>(babbler_reply::reply_text(
                store, brain, line, &surprise, &options,
            )?)
        })?;
        println!("{}", response.unwrap_or_else(|| EMPTY_REPLY.to_owned()));
        Ok(())
    })
}

fn prefixed(prefix: &str, extension: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}.{extension}"))
}

fn run_brain_load(store: &BrainStore, name: &str, prefix: &str) -> Result<()> {
    store.with_transaction(|store| {
        let brain = store.brain(name)?;

        for category in [ListCategory::Aux, ListCategory::Ban, ListCategory::Greet] {
            let path = prefixed(prefix, category.extension());
            loaders::load_list(store, brain, category, &path)?;
        }
        let swap = prefixed(prefix, MapCategory::Swap.extension());
        loaders::load_map(store, brain, MapCategory::Swap, &swap)?;

        let path = prefixed(prefix, "brn");
        let format = babbler_codec::load_brain(store, brain, &path)?;
        info!(brain = name, ?format, "brain fileset loaded");
        Ok(())
    })
}

fn run_brain_save(
    store: &BrainStore,
    name: &str,
    prefix: &str,
    format: BrainFileFormat,
) -> Result<()> {
    store.with_transaction(|store| {
        let brain = store
            .find_brain(name)?
            .with_context(|| format!("no such brain: {name}"))?;
        let path = prefixed(prefix, "brn");
        babbler_codec::save_brain(store, brain, format, &path)?;
        info!(brain = name, ?format, "brain saved");
        Ok(())
    })
}
