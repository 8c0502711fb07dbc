//! `pokedex` - identify Pokémon in images from the terminal.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use pokedex_vision::{render, Pokedex, PokedexConfig, PokedexError, Session, SpeciesRecord};

/// Identify Pokémon from images with a vision model and PokéAPI.
#[derive(Debug, Parser)]
#[command(name = "pokedex", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print records as JSON instead of a text card
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Identify the Pokémon in an image file
    Identify {
        /// Path to a JPEG, PNG, GIF or WebP image
        image: PathBuf,
    },
    /// Look up a Pokémon by name (no classifier call)
    Lookup {
        /// Name in any spelling, e.g. "Mr. Mime"
        name: String,
    },
    /// Interactive session reading commands from stdin
    Session,
}

#[repr(u8)]
enum Exit {
    Success = 0,
    PipelineError = 1,
    ConfigError = 2,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            Exit::PipelineError.into()
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Exit> {
    let requires_key = !matches!(cli.command, Command::Lookup { .. });
    let config = match load_config(requires_key) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", render::render_error(&e));
            return Ok(Exit::ConfigError);
        }
    };
    let dex = Pokedex::lookup_only(config);

    match cli.command {
        Command::Identify { image } => {
            let outcome = dex.identify_file(&image).await;
            if let Ok(found) = &outcome {
                tracing::info!(guess = %found.guess, key = %found.key, "classifier guess");
            }
            print_outcome(outcome.map(|found| found.record), cli.json)
        }
        Command::Lookup { name } => print_outcome(dex.lookup(&name).await, cli.json),
        Command::Session => run_session(&dex, cli.json).await,
    }
}

fn load_config(requires_key: bool) -> Result<PokedexConfig, PokedexError> {
    let config = if requires_key {
        PokedexConfig::from_env()?
    } else {
        // Still honour .env for endpoint overrides.
        pokedex_vision::config::load_dotenv();
        PokedexConfig::from_vars_without_credential(|name| std::env::var(name).ok())?
    };
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn print_outcome(outcome: Result<SpeciesRecord, PokedexError>, json: bool) -> anyhow::Result<Exit> {
    match outcome {
        Ok(record) => {
            print_record(&record, json)?;
            Ok(Exit::Success)
        }
        Err(e) => {
            eprintln!("{}", render::render_error(&e));
            Ok(Exit::PipelineError)
        }
    }
}

fn print_record(record: &SpeciesRecord, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", render::render_json(record).context("serializing record")?);
    } else {
        print!("{}", render::render_record(record));
    }
    Ok(())
}

const SESSION_HELP: &str = "commands: identify <path> | lookup <name> | show | reset | help | quit";

async fn run_session(dex: &Pokedex, json: bool) -> anyhow::Result<Exit> {
    let mut session = Session::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("{}", SESSION_HELP);
    loop {
        stdout.write_all(b"pokedex> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        let line = line.trim();
        let (cmd, arg) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));

        match cmd {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("{}", SESSION_HELP),
            "reset" => {
                session.reset();
                println!("Session cleared.");
            }
            "show" => match (session.current(), session.last_error()) {
                (_, Some(err)) => println!("Last attempt failed: {}", err),
                (Some(record), None) => print_record(record, json)?,
                (None, None) => println!("Nothing identified yet."),
            },
            "identify" if !arg.is_empty() => {
                let outcome = dex
                    .identify_file(std::path::Path::new(arg))
                    .await
                    .map(|found| found.record);
                show_session_outcome(session.record(outcome), json)?;
            }
            "lookup" if !arg.is_empty() => {
                let outcome = dex.lookup(arg).await;
                show_session_outcome(session.record(outcome), json)?;
            }
            _ => println!("{}", SESSION_HELP),
        }
    }

    Ok(if session.failed() {
        Exit::PipelineError
    } else {
        Exit::Success
    })
}

fn show_session_outcome(outcome: Result<SpeciesRecord, PokedexError>, json: bool) -> anyhow::Result<()> {
    match outcome {
        Ok(record) => print_record(&record, json),
        Err(e) => {
            println!("{}", render::render_error(&e));
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("pokedex_vision=info,warn"),
        _ => EnvFilter::new("pokedex_vision=debug,pokedex=debug,info"),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbose >= 2))
        .init();
}
