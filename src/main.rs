#![forbid(unsafe_code)]

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, error, info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use notify_prefs::commands::{Request, parse_line};
use notify_prefs::config::{AppConfig, OutputFormat};
use notify_prefs::view::{item_detail, page_view};
use notify_prefs::{ApplicationArea, Catalog, Mutation, PreferenceStore};

/// Notification settings page in the terminal
#[derive(Debug, Parser)]
#[command(name = "notify-prefs", version, about)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Application area shown first
    #[arg(long, global = true)]
    area: Option<ApplicationArea>,

    /// Output format for rendered pages
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the selected area once
    Show,
    /// Read commands from stdin and re-render after each one (default)
    Repl,
    /// Apply every command in a file, then render
    Run { script: PathBuf },
    /// Print the active catalog as JSON
    Catalog,
    /// Write a config file with default values
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

fn log_level(configured: &str) -> TraceLevel {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| configured.to_string());
    match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

/// One interactive or scripted session over a store
struct Session {
    store: PreferenceStore,
    format: OutputFormat,
}

impl Session {
    fn open(catalog: Catalog, format: OutputFormat, area: ApplicationArea) -> Self {
        let mut store = PreferenceStore::new(catalog);
        match store.select_area(area) {
            Mutation::Rejected(reason) => warn!(%area, %reason, "Start area not selected"),
            Mutation::Applied | Mutation::Unchanged => debug!(%area, "Start area selected"),
        }
        Self { store, format }
    }

    fn show(&self, out: &mut impl Write) -> Result<()> {
        let page = page_view(&self.store);
        match self.format {
            OutputFormat::Text => writeln!(out, "{page}")?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&page)?)?,
        }
        Ok(())
    }

    fn report(&self, outcome: &Mutation, out: &mut impl Write) -> Result<()> {
        match (self.format, outcome) {
            (OutputFormat::Text, Mutation::Applied) => self.show(out)?,
            (OutputFormat::Text, Mutation::Unchanged) => writeln!(out, "unchanged")?,
            (OutputFormat::Text, Mutation::Rejected(reason)) => writeln!(out, "ignored: {reason}")?,
            (OutputFormat::Json, Mutation::Applied) => {
                let value = json!({ "outcome": "applied", "page": page_view(&self.store) });
                writeln!(out, "{value}")?;
            }
            (OutputFormat::Json, Mutation::Unchanged) => {
                writeln!(out, "{}", json!({ "outcome": "unchanged" }))?;
            }
            (OutputFormat::Json, Mutation::Rejected(reason)) => {
                let value = json!({ "outcome": "rejected", "reason": reason.to_string() });
                writeln!(out, "{value}")?;
            }
        }
        Ok(())
    }

    /// Handle one request; returns false once the session should end
    fn handle(&mut self, request: Request, out: &mut impl Write, echo: bool) -> Result<bool> {
        match request {
            Request::Command(command) => {
                debug!(command = ?command, "Applying command");
                let outcome = command.apply(&mut self.store);
                if echo {
                    self.report(&outcome, out)?;
                }
            }
            Request::Show => self.show(out)?,
            Request::Detail(key) => match item_detail(&self.store, &key) {
                Some(detail) => match self.format {
                    OutputFormat::Text => write!(out, "{detail}")?,
                    OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&detail)?)?,
                },
                None => writeln!(out, "no detail view for '{key}'")?,
            },
            Request::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn repl(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        self.show(out)?;
        for line in input.lines() {
            let line = line.context("Failed to read command from stdin")?;
            match parse_line(&line) {
                Ok(Some(request)) => {
                    if !self.handle(request, out, true)? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => writeln!(out, "{e}")?,
            }
            out.flush()?;
        }
        Ok(())
    }

    fn run_script(&mut self, script: &str, out: &mut impl Write) -> Result<()> {
        for (number, line) in script.lines().enumerate() {
            let request = parse_line(line).with_context(|| format!("line {}", number + 1))?;
            if let Some(request) = request {
                if !self.handle(request, out, false)? {
                    break;
                }
            }
        }
        self.show(out)
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);

    if let Some(Command::InitConfig { force }) = &cli.command {
        if config_path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", config_path.display());
        }
        return AppConfig::default().save(&config_path);
    }

    let config = AppConfig::load(&config_path)?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config.log_level))
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    debug!("config={:#?}", config);

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };
    info!(categories = catalog.categories.len(), "Catalog ready");

    let mut session = Session::open(
        catalog,
        cli.format.unwrap_or(config.output),
        cli.area.unwrap_or(config.start_area),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Command::Repl) {
        Command::Show => session.show(&mut out),
        Command::Repl => session.repl(io::stdin().lock(), &mut out),
        Command::Run { script } => {
            let contents = fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {:?}", script))?;
            session.run_script(&contents, &mut out)
        }
        Command::Catalog => {
            writeln!(out, "{}", serde_json::to_string_pretty(session.store.catalog())?)?;
            Ok(())
        }
        Command::InitConfig { .. } => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!("fatal: {err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
