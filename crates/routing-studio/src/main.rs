use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_flags::env_flags;
use once_cell::sync::OnceCell;
use tokio::io::BufReader;

use routing_studio::bridge::{self, BridgeSession};
use routing_studio::config::{self, UserConfig};
use routing_studio::document::{starter_document, to_json_text};
use routing_studio::editor::{LoadOptions, RoutingEditor};
use routing_studio::schema::parse_document;
use routing_studio::suggest::{ClassRule, suggest_models_for_class};
use routing_studio::uiconfig::FileUiConfigStore;
use routing_studio::validate::{IssueStatus, validate_routing};

/// Validate, format and suggest models for routing documents.
#[derive(Parser, Debug)]
#[command(name = "routing-studio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and validate a routing document.
    Validate {
        file: PathBuf,
        /// Print issues as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Suggest an ordered model list from class or ad-hoc rules.
    Suggest {
        file: PathBuf,
        /// Use the rules configured for this class.
        #[arg(long, conflicts_with_all = ["tag", "metric"])]
        class: Option<String>,
        /// Require a model tag (repeatable).
        #[arg(long)]
        tag: Vec<String>,
        /// Metric rule such as `reasoning>=0.8` (repeatable).
        #[arg(long)]
        metric: Vec<String>,
    },
    /// Rewrite a document in canonical form.
    Fmt {
        file: PathBuf,
        /// Write back to the file instead of stdout.
        #[arg(long)]
        write: bool,
    },
    /// Print or write the starter document.
    New {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve the host bridge over stdin/stdout.
    Bridge,
}

env_flags! {
    /// Tracing filter, e.g. "info", "debug", or targets format.
    RUST_LOG: &str = "warn";
    /// Preferred filter env (alias). If set, overrides RUST_LOG.
    TRACING_FILTER: &str = "";
    /// Pretty formatting for logs (ignored if TRACING_JSON=true).
    TRACING_PRETTY: bool = false;
    /// Compact single-line formatting for logs (ignored if TRACING_JSON=true)
    TRACING_COMPACT: bool = true;
    /// JSON formatting for logs
    TRACING_JSON: bool = false;
    /// Also log to a daily file under <ROUTING_STUDIO_HOME>/logs or LOG_DIR
    LOG_TO_FILE: bool = false;
    /// Optional explicit log directory. Defaults to <ROUTING_STUDIO_HOME>/logs
    LOG_DIR: &str = "";
    /// Home directory. Defaults to $HOME/.routing-studio
    ROUTING_STUDIO_HOME: &str = "";
}

fn init_tracing(home: &Path, user_cfg: Option<&UserConfig>) {
    use tracing_subscriber::{EnvFilter, Layer, Registry, prelude::*};

    let env_set = |k: &str| std::env::var_os(k).is_some();

    let mut rust_log = if !(*TRACING_FILTER).is_empty() {
        (*TRACING_FILTER).to_string()
    } else {
        (*RUST_LOG).to_string()
    };
    let mut tracing_json = *TRACING_JSON;
    let mut tracing_compact = *TRACING_COMPACT;
    let mut tracing_pretty = *TRACING_PRETTY;
    let mut log_to_file = *LOG_TO_FILE;
    let mut log_dir: Option<PathBuf> = if !(*LOG_DIR).is_empty() {
        Some(config::expand_home(*LOG_DIR))
    } else {
        None
    };

    if let Some(cfg) = user_cfg.and_then(|c| c.logging.as_ref()) {
        if !(env_set("TRACING_FILTER") || env_set("RUST_LOG"))
            && let Some(level) = cfg.level.as_ref()
        {
            rust_log = level.clone();
        }
        if !env_set("TRACING_JSON")
            && let Some(v) = cfg.json
        {
            tracing_json = v;
        }
        if !env_set("TRACING_COMPACT")
            && let Some(v) = cfg.compact
        {
            tracing_compact = v;
        }
        if !env_set("TRACING_PRETTY")
            && let Some(v) = cfg.pretty
        {
            tracing_pretty = v;
        }
        if !env_set("LOG_TO_FILE")
            && let Some(v) = cfg.to_file
        {
            log_to_file = v;
        }
        if !env_set("LOG_DIR")
            && let Some(dir) = cfg.dir.as_ref()
        {
            log_dir = Some(config::expand_home(dir));
        }
    }

    let filter = EnvFilter::try_new(rust_log).unwrap_or_else(|_| EnvFilter::new("warn"));

    // stderr only: stdout carries bridge messages and command output.
    let stderr = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(true)
        .with_writer(std::io::stderr);
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    layers.push(if tracing_json {
        stderr.json().boxed()
    } else if tracing_pretty && !tracing_compact {
        stderr.pretty().boxed()
    } else {
        stderr.compact().boxed()
    });

    static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
    let mut dir_error = None;
    if log_to_file {
        let dir = log_dir.unwrap_or_else(|| home.join("logs"));
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(&dir, "routing-studio.log");
                let (nb, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                let file = tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(nb);
                layers.push(if tracing_json {
                    file.json().boxed()
                } else {
                    file.boxed()
                });
            }
            Err(e) => dir_error = Some((dir, e)),
        }
    }

    if let Err(e) = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
    {
        eprintln!("tracing already set: {e:?}");
    }
    if let Some((dir, e)) = dir_error {
        tracing::warn!("failed to create log dir {}: {}", dir.display(), e);
    }
}

fn ui_config_store(home: &Path, user_cfg: Option<&UserConfig>) -> FileUiConfigStore {
    let dir = user_cfg
        .and_then(UserConfig::ui_config_dir)
        .unwrap_or_else(|| home.to_path_buf());
    FileUiConfigStore::new(dir)
}

fn read_document_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn validate_cmd(file: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let text = read_document_text(file)?;
    let doc = match parse_document(&text) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{}: {}", file.display(), e.detailed());
            return Ok(ExitCode::FAILURE);
        }
    };
    let issues = validate_routing(&doc);
    let status = IssueStatus::of(&issues);
    if json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
    } else {
        for issue in &issues {
            println!("{:<7} {}: {}", issue.severity, issue.path, issue.message);
        }
        println!(
            "{}: {} error(s), {} warning(s)",
            file.display(),
            status.errors,
            status.warnings
        );
    }
    Ok(if status.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn suggest_cmd(
    file: &Path,
    class: Option<String>,
    tags: Vec<String>,
    metrics: Vec<String>,
    store: FileUiConfigStore,
) -> anyhow::Result<ExitCode> {
    let text = read_document_text(file)?;
    let ids = if let Some(class) = class {
        let mut editor = RoutingEditor::new(Box::new(store));
        let name = file.file_name().and_then(|n| n.to_str());
        editor.load_from_text(&text, name, LoadOptions::default())?;
        if editor.ui_config().rules_for(&class).is_empty() {
            eprintln!("class '{class}' has no suggestion rules configured");
            return Ok(ExitCode::FAILURE);
        }
        editor.suggestions_for_class(&class)
    } else {
        let doc = parse_document(&text)?;
        let mut rules: Vec<ClassRule> = tags.into_iter().map(ClassRule::tag).collect();
        for expr in &metrics {
            rules.push(
                expr.parse::<ClassRule>()
                    .with_context(|| format!("metric rule '{expr}'"))?,
            );
        }
        if rules.is_empty() {
            anyhow::bail!("provide --class or at least one --tag/--metric rule");
        }
        suggest_models_for_class(&doc, &rules)
    };
    for id in ids {
        println!("{id}");
    }
    Ok(ExitCode::SUCCESS)
}

fn fmt_cmd(file: &Path, write: bool) -> anyhow::Result<ExitCode> {
    let text = read_document_text(file)?;
    let doc = parse_document(&text)?;
    let out = to_json_text(&doc);
    if write {
        if out != text {
            std::fs::write(file, &out).with_context(|| format!("write {}", file.display()))?;
            tracing::info!("formatted {}", file.display());
        }
    } else {
        print!("{out}");
    }
    Ok(ExitCode::SUCCESS)
}

fn new_cmd(out: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let text = to_json_text(&starter_document());
    match out {
        Some(path) => {
            std::fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(ExitCode::SUCCESS)
}

async fn bridge_cmd(store: FileUiConfigStore, debounce: Duration) -> anyhow::Result<ExitCode> {
    tracing::info!(
        "starting bridge (ui config at {})",
        store.path().display()
    );
    let editor = RoutingEditor::new(Box::new(store));
    let mut session = BridgeSession::new(editor);
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    bridge::run(&mut session, stdin, stdout, debounce).await?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let home = config::resolve_home(*ROUTING_STUDIO_HOME);
    let user_cfg = match config::load_user_config(&home) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ignoring {}/config.toml: {e:#}", home.display());
            None
        }
    };
    init_tracing(&home, user_cfg.as_ref());

    let store = ui_config_store(&home, user_cfg.as_ref());
    match cli.command {
        Commands::Validate { file, json } => validate_cmd(&file, json),
        Commands::Suggest {
            file,
            class,
            tag,
            metric,
        } => suggest_cmd(&file, class, tag, metric, store),
        Commands::Fmt { file, write } => fmt_cmd(&file, write),
        Commands::New { out } => new_cmd(out),
        Commands::Bridge => {
            let debounce_ms = user_cfg
                .as_ref()
                .map_or(config::DEFAULT_DEBOUNCE_MS, UserConfig::debounce_ms);
            bridge_cmd(store, Duration::from_millis(debounce_ms)).await
        }
    }
}
