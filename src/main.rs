//! Binary entrypoint: terminal front end for the artwork gallery.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use artwork_gallery::app::App;
use artwork_gallery::config::Configuration;
use artwork_gallery::events::UserCommand;
use artwork_gallery::input::{HELP, Parsed, Prefill, parse_line};
use artwork_gallery::query::Media;
use artwork_gallery::surface::TerminalSurface;

#[derive(Debug, Parser)]
#[command(
    name = "artwork-gallery",
    version,
    about = "Search a media API for artwork and rotate it through a 5x4 grid"
)]
struct Cli {
    /// Path to YAML config (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Prefill for the query field
    #[arg(long, value_name = "TERM")]
    term: Option<String>,

    /// Initial media selection (music, movie, podcast, musicVideo)
    #[arg(long, value_name = "MEDIA")]
    media: Option<Media>,

    /// Deterministic RNG seed for slideshow slot/image choices
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Run the prefilled search immediately
    #[arg(long)]
    search_on_start: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(format!("artwork_gallery={level}").parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper_util=warn".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        config,
        term,
        media,
        seed,
        search_on_start,
        verbose,
    } = Cli::parse();
    init_tracing(verbose)?;

    let cfg = match &config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    }
    .validated()
    .context("invalid configuration values")?;
    debug!(?cfg, "configuration");

    let prefill = Prefill {
        term: term.unwrap_or_else(|| cfg.default_term.clone()),
        media: media.unwrap_or(cfg.default_media),
    };

    let (app, events) = App::from_config(&cfg, seed, TerminalSurface::stdout())
        .context("failed to set up gallery")?;
    let (cmd_tx, cmd_rx) = mpsc::channel::<UserCommand>(16);
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; shutting down");
            cancel.cancel();
        });
    }

    println!("Query: {:?}  Media: {}\n{HELP}", prefill.term, prefill.media);
    if search_on_start {
        cmd_tx
            .send(UserCommand::Search {
                term: prefill.term.clone(),
                media: prefill.media,
            })
            .await
            .context("ui loop closed before start")?;
    }

    // Plain thread: a blocked stdin read must not hold up runtime shutdown.
    std::thread::spawn(move || read_commands(prefill, cmd_tx));

    app.run(events, cmd_rx, cancel.clone()).await?;
    cancel.cancel();
    Ok(())
}

fn read_commands(mut prefill: Prefill, commands: mpsc::Sender<UserCommand>) {
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("stdin read failed: {err}");
                break;
            }
        };
        match parse_line(&line, &mut prefill) {
            Ok(Parsed::Command(cmd)) => {
                if commands.blocking_send(cmd).is_err() {
                    return;
                }
            }
            Ok(Parsed::Help) => println!("{HELP}"),
            Ok(Parsed::Updated) => {
                println!("Query: {:?}  Media: {}", prefill.term, prefill.media)
            }
            Ok(Parsed::Empty) => {}
            Err(msg) => eprintln!("{msg}"),
        }
    }
    info!("stdin closed; shutting down");
}
