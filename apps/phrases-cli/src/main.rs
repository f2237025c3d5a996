use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use phrases_client::{FacadeStore, PhraseBook, PhraseScreen};
use phrases_core::{NotionStore, PhraseStore, PhrasesConfig};
use std::io::{self, Write};
use std::sync::Arc;

mod commands;

use commands::phrases::LineConfirm;
use commands::{InspectArgs, SeedArgs};

#[derive(Parser)]
#[command(name = "phrases", version, about = "Manage the phrases collection")]
struct Cli {
    /// Talk to a running facade (e.g. http://localhost:3001/api/phrases)
    /// instead of Notion directly
    #[arg(long, global = true, env = "PHRASES_API")]
    api: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create one phrase and print its id
    Add {
        text: String,
    },
    /// Create many phrases in order with a pause between requests
    Seed(SeedArgs),
    /// Print the database columns and their types
    Inspect(InspectArgs),
    /// Print the collection, newest first
    List,
    /// Replace the text of a phrase
    Edit {
        id: String,
        text: String,
    },
    /// Archive a phrase after confirmation
    Archive {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn notion_store() -> Result<NotionStore> {
    let config = PhrasesConfig::from_env().context("loading notion config")?;
    NotionStore::new(config).context("building notion client")
}

fn open_store(api: Option<&str>) -> Result<Arc<dyn PhraseStore>> {
    match api {
        Some(url) => {
            tracing::debug!(target: "phrases::cli", %url, "using facade store");
            Ok(Arc::new(FacadeStore::new(url).context("building facade client")?))
        }
        None => Ok(Arc::new(notion_store()?)),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Inspect(args) => {
            if cli.api.is_some() {
                bail!("inspect talks to Notion directly; drop --api");
            }
            let inspection = notion_store()?.inspect().await?;
            commands::inspect::render(&inspection, args.json, &mut out)?;
        }
        Commands::Seed(args) => {
            let store = open_store(cli.api.as_deref())?;
            let report = commands::seed::run(store.as_ref(), args, &mut out).await?;
            if report.added == 0 && report.failed > 0 {
                bail!("no phrases were added");
            }
        }
        Commands::Add { text } => {
            let mut book = PhraseBook::new(open_store(cli.api.as_deref())?);
            commands::phrases::add(&mut book, &text, &mut out).await?;
        }
        Commands::List => {
            let mut screen = PhraseScreen::new(PhraseBook::new(open_store(cli.api.as_deref())?));
            commands::phrases::list(&mut screen, &mut out).await?;
        }
        Commands::Edit { id, text } => {
            let mut screen = PhraseScreen::new(PhraseBook::new(open_store(cli.api.as_deref())?));
            commands::phrases::edit(&mut screen, &id, &text, &mut out).await?;
        }
        Commands::Archive { id, yes } => {
            let mut screen = PhraseScreen::new(PhraseBook::new(open_store(cli.api.as_deref())?));
            if yes {
                let mut always = |_: &str| true;
                commands::phrases::archive(&mut screen, &id, &mut always, &mut out).await?;
            } else {
                let mut confirm = LineConfirm::new(io::stdin().lock(), io::stderr());
                commands::phrases::archive(&mut screen, &id, &mut confirm, &mut out).await?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    phrases_otel::init_stderr();
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
