//! CLI entrypoint for compend
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use compend_application::{AuthError, AuthGateUseCase, GateDecision, SessionClient};
use compend_domain::OutputFormat;
use compend_infrastructure::{
    ConfigError, ConfigLoader, FileConfig, FileSessionStore, HttpBackend,
};
use compend_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, EventPresenter, ProgressReporter, ProgressSink,
    RowsDisplay, SimpleProgress, chat::read_upload, formatter_for, prompt_line,
    set_color_enabled,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting compend");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let mut config = load_config(&cli)?;
    set_color_enabled(config.output.color);

    let Some(command) = cli.command.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // === Access gate ===
    let session_path = config
        .auth
        .session_path()
        .or_else(ConfigLoader::default_session_path)
        .context("Cannot determine where to store the session")?;
    let auth = Arc::new(AuthGateUseCase::new(
        Arc::new(FileSessionStore::new(session_path)),
        config.auth.gate(),
    ));

    match &command {
        Command::Login { key } => return login(&auth, key.clone()),
        Command::Logout => {
            auth.logout()?;
            println!("{}", ConsoleFormatter::success("Logged out"));
            return Ok(());
        }
        _ => {}
    }

    if !command.bypasses_gate() && auth.check() == GateDecision::Login {
        bail!("Not logged in. Run `compend login` first.");
    }

    // === Backend ===
    if let Some(url) = &cli.api_url {
        config.api.base_url = Some(url.clone());
    }
    match config.ensure_usable() {
        Ok(warnings) => {
            for issue in warnings {
                warn!("{}", issue.message);
            }
        }
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    }

    let backend = Arc::new(HttpBackend::from_config(&config.api)?);
    info!(base_url = %backend.base_url(), "Using backend");

    let (tx, rx) = mpsc::unbounded_channel();
    let client = SessionClient::new(backend.clone(), backend, config.client_settings(), tx);

    let output_flag = match &command {
        Command::List { output } => output.map(OutputFormat::from),
        _ => None,
    };
    let output_format = config.output.format_for(output_flag);

    let show_progress =
        !cli.quiet && (command != Command::Chat || config.repl.show_progress);
    let sink: Box<dyn ProgressSink> = if show_progress {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };
    let rows_display = match command {
        Command::Watch => RowsDisplay::Table,
        Command::Chat => RowsDisplay::Changes,
        _ => RowsDisplay::Hidden,
    };
    let presenter = tokio::spawn(
        EventPresenter::new(sink, rows_display)
            .with_answers(output_format == OutputFormat::Text)
            .run(rx),
    );

    // === Dispatch ===
    let result = match command {
        Command::List { .. } => list(&client, output_format).await,
        Command::Upload(args) => upload(&client, &args.paths).await,
        Command::Delete { names } => delete(&client, &names).await,
        Command::Ask { question } => ask(&client, &question.join(" "), output_format).await,
        Command::Watch => watch(&client).await,
        Command::Chat => {
            let history = config
                .repl
                .history_path()
                .or_else(ConfigLoader::default_history_path);
            chat(&client, auth.clone(), history).await
        }
        Command::Login { .. } | Command::Logout => Ok(()),
    };

    finish(client, presenter).await;
    result
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Initialize logging based on verbosity level
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
        return Ok(None);
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();
    Ok(Some(guard))
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let loaded = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
    };
    Ok(loaded.map_err(ConfigError::from)?)
}

fn login(auth: &AuthGateUseCase, key: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => prompt_line("Access key: ").context("Failed to read access key")?,
    };
    match auth.login(&key) {
        Ok(_) => {
            println!("{}", ConsoleFormatter::success("Logged in"));
            Ok(())
        }
        Err(AuthError::InvalidKey) => bail!("Invalid access key"),
        Err(e) => Err(e.into()),
    }
}

async fn list(client: &SessionClient, format: OutputFormat) -> Result<()> {
    let rows = client.refresh().await?;
    println!("{}", formatter_for(format).format_rows(&rows));
    Ok(())
}

/// Uploads run one after another; the client refuses overlapping uploads.
async fn upload(client: &SessionClient, paths: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    for path in paths {
        let (name, bytes) = match read_upload(path).await {
            Ok(file) => file,
            Err(message) => {
                eprintln!("{}", ConsoleFormatter::error(&message));
                failed += 1;
                continue;
            }
        };
        if client.upload(&name, bytes).await.is_err() {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{} of {} uploads failed", failed, paths.len());
    }
    Ok(())
}

/// Deletes run concurrently, one pending marker per name.
async fn delete(client: &SessionClient, names: &[String]) -> Result<()> {
    let results = futures::future::join_all(names.iter().map(|name| client.delete(name))).await;
    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        bail!("{} of {} deletes failed", failed, names.len());
    }
    Ok(())
}

async fn ask(client: &SessionClient, question: &str, format: OutputFormat) -> Result<()> {
    let answer = client.ask(question).await?;
    if format == OutputFormat::Json {
        println!("{}", formatter_for(format).format_answer(question, &answer));
    }
    Ok(())
}

async fn watch(client: &SessionClient) -> Result<()> {
    client.wait_until_ready().await?;
    let poller = client.start_polling();
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    poller.stop().await;
    Ok(())
}

async fn chat(
    client: &SessionClient,
    auth: Arc<AuthGateUseCase>,
    history: Option<PathBuf>,
) -> Result<()> {
    client.wait_until_ready().await?;
    let poller = client.start_polling();
    let result = ChatRepl::new(client.clone(), auth)
        .with_history_path(history)
        .run()
        .await;
    poller.stop().await;
    result.context("Chat session failed")
}

/// Let the presenter drain what was emitted, then stop it.
///
/// Background flows started from the REPL may still hold the event sender;
/// detaching silences them and the presenter gets a short grace period.
async fn finish(client: SessionClient, presenter: JoinHandle<()>) {
    let background = client.uploading().is_some() || !client.pending_deletes().is_empty();
    if background {
        client.detach();
    }
    drop(client);
    if tokio::time::timeout(Duration::from_secs(1), presenter)
        .await
        .is_err()
    {
        warn!("Event presenter did not finish in time");
    }
}
