use anyhow::{Context, Result};
use clap::Args;
use phrases_core::PhraseStore;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const BUILTIN_PHRASES: [&str; 6] = [
    "The greatest sources of suffering are the lies we tell ourselves",
    "Don't see obstacles as threats but as challenges",
    "One of the hardest things about traumatized people is to confront their shame about how they behaved during the traumatic episode",
    "I think this man is suffering from memories",
    "The goal is not a life Full of excitement is life full of peace.",
    "El mayor miedo es que una empresa triunfe sin ti",
];

const PREVIEW_CHARS: usize = 50;

#[derive(Args)]
pub struct SeedArgs {
    /// File with one phrase per line; the built-in list is used when omitted
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Pause between requests, in milliseconds
    #[arg(long, default_value_t = 300)]
    pub delay_ms: u64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub added: usize,
    pub failed: usize,
}

pub fn read_phrases(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading phrases from {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Create each phrase in order. Failures are reported and skipped.
pub async fn seed<S, W>(
    store: &S,
    phrases: &[String],
    delay: Duration,
    out: &mut W,
) -> Result<SeedReport>
where
    S: PhraseStore + ?Sized,
    W: Write,
{
    let total = phrases.len();
    writeln!(out, "Adding {total} phrases...")?;
    let mut report = SeedReport::default();
    for (i, text) in phrases.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        writeln!(out, "[{}/{}] Adding: \"{}...\"", i + 1, total, preview(text))?;
        match store.create(text).await {
            Ok(_) => {
                report.added += 1;
                writeln!(out, "✓ Success!")?;
            }
            Err(err) => {
                report.failed += 1;
                warn!(target: "phrases::cli", index = i + 1, error = %err, "seed item failed");
                writeln!(out, "✗ Error: {err}")?;
            }
        }
    }
    writeln!(out, "Done: {} added, {} failed.", report.added, report.failed)?;
    Ok(report)
}

pub async fn run<S, W>(store: &S, args: SeedArgs, out: &mut W) -> Result<SeedReport>
where
    S: PhraseStore + ?Sized,
    W: Write,
{
    let phrases = match &args.file {
        Some(path) => read_phrases(path)?,
        None => BUILTIN_PHRASES.iter().map(|s| s.to_string()).collect(),
    };
    seed(store, &phrases, Duration::from_millis(args.delay_ms), out).await
}
