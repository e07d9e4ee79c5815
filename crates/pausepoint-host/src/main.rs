//! Pausepoint host CLI: run detection and the decision prompt over saved pages.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use pausepoint::{
    classify, extract, DomSnapshot, HtmlSnapshot, MonitorConfig, PromptChoice, PromptOutcome,
};
use pausepoint_host::config::resolve_profile_path;
use pausepoint_host::{render_prompt, HostSession, ProfileStore};

#[derive(Parser)]
#[command(
    name = "pausepoint",
    about = "Detect product prices and pause purchases against your savings target",
    version
)]
struct Cli {
    /// Path to the savings profile JSON.
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract price and product name from a saved page.
    Detect {
        /// HTML file.
        html: PathBuf,

        /// Address the page was saved from.
        #[arg(long)]
        url: String,
    },

    /// Click an element on a saved page and show the decision prompt.
    Click {
        /// HTML file.
        html: PathBuf,

        /// Address the page was saved from.
        #[arg(long)]
        url: String,

        /// CSS selector of the element to click.
        #[arg(long)]
        selector: String,

        /// Answer the prompt non-interactively.
        #[arg(long, value_enum)]
        choice: Option<ChoiceArg>,
    },

    /// Replay a page load followed by DOM mutations.
    ///
    /// The first file is the page at load; each later file is the page after
    /// one mutation batch.
    Replay {
        /// Address the pages were saved from.
        #[arg(long)]
        url: String,

        /// Minimum price a mutation-time detection must exceed.
        #[arg(long, default_value_t = pausepoint::monitor::DEFAULT_MATERIALITY_THRESHOLD)]
        threshold: f64,

        /// HTML files, in order.
        #[arg(required = true)]
        htmls: Vec<PathBuf>,
    },

    /// Show or change the savings profile.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   pausepoint completions bash > ~/.local/share/bash-completion/completions/pausepoint
    ///   pausepoint completions zsh > ~/.zfunc/_pausepoint
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the current profile.
    Show,

    /// Update one or both figures.
    Set {
        #[arg(long)]
        target: Option<f64>,

        #[arg(long)]
        current: Option<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChoiceArg {
    Continue,
    Cancel,
}

impl From<ChoiceArg> for PromptChoice {
    fn from(choice: ChoiceArg) -> Self {
        match choice {
            ChoiceArg::Continue => PromptChoice::Continue,
            ChoiceArg::Cancel => PromptChoice::Cancel,
        }
    }
}

fn read_page(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let profiles = ProfileStore::new(resolve_profile_path(cli.profile.as_deref()));

    match cli.command {
        Commands::Detect { html, url } => {
            let snapshot = HtmlSnapshot::parse(&read_page(&html)?, &url)?;
            let variant = classify(snapshot.url());
            match extract(&snapshot, variant).into_detection(snapshot.url().as_str(), variant) {
                Some(detection) if cli.json => {
                    println!("{}", serde_json::to_string_pretty(&detection)?);
                }
                Some(detection) => {
                    println!("Product: {}", detection.product_name);
                    println!("Price:   ${:.2}", detection.price);
                    println!("Rules:   {}", detection.origin);
                }
                None if cli.json => println!("null"),
                None => println!("No price found."),
            }
        }

        Commands::Click {
            html,
            url,
            selector,
            choice,
        } => {
            let page = read_page(&html)?;
            let profile = profiles.load_or_seed()?;
            let session = HostSession::start(&url, MonitorConfig::default(), true)?;
            session.load(&page);
            let action = session.click(&page, &selector)?;
            if !action.suppressed() {
                println!("Click on {selector} was not held; the page handles it.");
                return Ok(());
            }

            let Some(prompt) = session.finish(&profile).await? else {
                println!("Nothing detected.");
                return Ok(());
            };
            if cli.json {
                let out = serde_json::json!({
                    "record": prompt.record(),
                    "summary": prompt.summary(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", render_prompt(&prompt));
            }

            if let Some(choice) = choice {
                match prompt.choose(choice.into()) {
                    PromptOutcome::NavigateTo(target) => println!("Continue: {target}"),
                    PromptOutcome::Dismiss => println!("Cancelled."),
                }
            }
        }

        Commands::Replay {
            url,
            threshold,
            htmls,
        } => {
            let config = MonitorConfig {
                materiality_threshold: threshold,
            };
            let session = HostSession::start(&url, config, true)?;
            let (first, rest) = htmls
                .split_first()
                .context("replay needs at least one HTML file")?;
            session.load(&read_page(first)?);
            let renders = rest
                .iter()
                .map(|path| read_page(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            for (path, detection) in rest.iter().zip(session.replay(&renders).await) {
                if let Some(detection) = detection {
                    tracing::info!("{}: ${:.2}", path.display(), detection.price);
                }
            }

            let store = session.store().clone();
            let prompt = session.finish(&profiles.load()?).await?;
            let writes = store.write_count();
            match prompt {
                Some(prompt) if cli.json => {
                    println!("{}", serde_json::to_string_pretty(prompt.record())?);
                }
                Some(prompt) => {
                    let record = prompt.record();
                    println!("Latest record: {} at ${:.2}", record.product_name, record.detected_price);
                    println!("Store writes:  {writes}");
                }
                None if cli.json => println!("null"),
                None => println!("No record stored."),
            }
        }

        Commands::Profile { action } => match action {
            ProfileAction::Show => {
                let profile = profiles.load()?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&profile)?);
                } else {
                    println!("Profile:        {}", profiles.path().display());
                    println!("Savings target: ${}", profile.target);
                    println!("Current:        ${}", profile.current);
                }
            }
            ProfileAction::Set { target, current } => {
                let mut profile = profiles.load()?;
                if let Some(target) = target {
                    profile.target = target;
                }
                if let Some(current) = current {
                    profile.current = current;
                }
                profiles.save(&profile)?;
                tracing::info!("Saved profile: {}", profiles.path().display());
            }
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pausepoint", &mut std::io::stdout());
        }
    }

    Ok(())
}
