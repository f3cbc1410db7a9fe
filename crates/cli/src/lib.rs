use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use mindverse_guidance::{GuidanceEngine, GuidanceService};
use mindverse_protocol::{serialize_json, serialize_json_pretty};
use mindverse_store::{seed_corpus, Store, WisdomSource};
use serde_json::json;
use std::io;
use std::path::PathBuf;

use crate::config::Config;

mod config;
mod http_api;
mod server_security;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "mindverse")]
#[command(about = "Guidance from the world's wisdom traditions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML config file
    #[arg(long, global = true, env = "MINDVERSE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the store (overrides config and MINDVERSE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON API over HTTP
    ServeHttp(ServeArgs),

    /// Analyze a problem description and print the guidance as JSON
    Analyze(AnalyzeArgs),

    /// Load the built-in wisdom corpus into the store
    Seed(SeedArgs),

    /// Print store counts as JSON
    Health,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:5000
    #[arg(long)]
    bind: Option<String>,

    /// Allow binding to non-loopback addresses
    #[arg(long)]
    public: bool,

    /// Only allow this browser origin (default: any)
    #[arg(long)]
    cors_origin: Option<String>,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Problem description
    #[arg(long)]
    text: String,

    /// Restrict retrieval to these wisdom texts (repeatable), e.g. bhagavad_gita
    #[arg(long = "book", value_parser = parse_book)]
    books: Vec<WisdomSource>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct SeedArgs {
    /// Replace an existing corpus
    #[arg(long)]
    force: bool,
}

fn parse_book(raw: &str) -> std::result::Result<WisdomSource, String> {
    WisdomSource::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = WisdomSource::ALL.iter().map(|s| s.as_str()).collect();
        format!("unknown wisdom text '{raw}' (expected one of: {})", known.join(", "))
    })
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::ServeHttp(args) => serve_http(args, config).await?,
        Commands::Analyze(args) => run_analyze(args, &config).await?,
        Commands::Seed(args) => run_seed(args, &config).await?,
        Commands::Health => run_health(&config).await?,
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<Store> {
    let path = config.store_path();
    let store = Store::open(&path)
        .await
        .with_context(|| format!("Failed to open store at {}", path.display()))?;
    Ok(store
        .with_password_cost(config.password_cost)
        .with_session_ttl(config.session_ttl()))
}

async fn run_analyze(args: AnalyzeArgs, config: &Config) -> Result<()> {
    if args.text.trim().is_empty() {
        anyhow::bail!("--text must not be empty");
    }
    let store = open_store(config).await?;
    if store.wisdom_count().await == 0 {
        log::warn!("Store has no wisdom texts; run `mindverse seed` first");
    }

    let outcome = GuidanceEngine::new()
        .analyze_user_input(&store, args.text.trim(), &args.books)
        .await;
    let rendered = if args.pretty {
        serialize_json_pretty(&outcome)?
    } else {
        serialize_json(&outcome)?
    };
    print_stdout(&rendered)
}

async fn run_seed(args: SeedArgs, config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let existing = store.wisdom_count().await;
    if existing > 0 && !args.force {
        anyhow::bail!(
            "Store already holds {existing} wisdom texts; pass --force to replace them"
        );
    }

    let corpus = seed_corpus().context("Built-in corpus is invalid")?;
    let seeded = store.replace_wisdom_corpus(corpus).await?;
    log::info!("Seeded {seeded} wisdom texts (replaced {existing})");
    print_stdout(&serialize_json(&json!({
        "seeded": seeded,
        "replaced": existing,
        "path": config.store_path(),
    }))?)
}

async fn run_health(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    print_stdout(&serialize_json(&store.corpus_summary().await)?)
}

async fn serve_http(args: ServeArgs, config: Config) -> Result<()> {
    let bind = args.bind.unwrap_or_else(|| config.bind.clone());
    let addrs = server_security::resolve_guarded_bind_addrs(&bind, args.public).await?;
    let cors_origin = args.cors_origin.or_else(|| config.cors_origin.clone());

    let store = open_store(&config).await?;
    if store.wisdom_count().await == 0 {
        log::warn!("Store has no wisdom texts; run `mindverse seed` first");
    }
    let service = GuidanceService::new(std::sync::Arc::new(store), config.settings());
    let app = http_api::router(http_api::AppState::new(service), cors_origin.as_deref())?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    print_stdout(&format!("Serving MindVerse API: {base_url}/api"))?;
    if args.public {
        let addrs = addrs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        print_stdout(&format!(
            "Public bind enabled (--public). Resolved addresses: {addrs}"
        ))?;
    }
    print_stdout(&format!("Try: curl {base_url}/api/health"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
}
