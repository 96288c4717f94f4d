//! IPMI exporter binary.
//!
//! Serves BMC metrics gathered through FreeIPMI over HTTP, or runs a
//! one-shot scrape from the command line.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ipmi_exporter::{
    start_web_server, ExporterConfig, FreeipmiExecutor, SafeConfig, ScrapeSettings, Scraper,
    WebConfig, DEFAULT_MODULE, DEFAULT_WEB_PORT,
};
use ipmi_exporter::config::DEFAULT_SDR_CACHE_DIR;
use std::path::{Path, PathBuf};
use tracing::{info, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "ipmi_exporter")]
#[command(about = "Prometheus exporter for BMCs, backed by FreeIPMI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Scrapes local and remote BMCs with the FreeIPMI tools and exposes the readings as Prometheus metrics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Modules file (TOML)
    #[arg(long = "config-file")]
    config_file: Option<PathBuf>,

    /// Directory containing the FreeIPMI executables (default: $PATH)
    #[arg(long = "freeipmi-path")]
    freeipmi_path: Option<PathBuf>,

    /// Directory of the FreeIPMI SDR cache
    #[arg(long = "sdr-cache-dir", default_value = DEFAULT_SDR_CACHE_DIR)]
    sdr_cache_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (default)
    Serve(ServeArgs),

    /// Validate the modules file and list its modules
    CheckConfig,

    /// Scrape one BMC and print the metrics
    Scrape(ScrapeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Web server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_WEB_PORT,
        }
    }
}

#[derive(Args)]
struct ScrapeArgs {
    /// BMC host name or address; omit for the local BMC
    #[arg(short, long, default_value = "")]
    target: String,

    /// Module to scrape with
    #[arg(short, long, default_value = DEFAULT_MODULE)]
    module: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Serve(args)) => serve_command(&cli, args).await,
        Some(Commands::CheckConfig) => check_config_command(&cli),
        Some(Commands::Scrape(args)) => scrape_command(&cli, args).await,
        None => serve_command(&cli, &ServeArgs::default()).await,
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing::subscriber::set_global_default(build_subscriber(level, &directives))?;

    Ok(())
}

/// Compact subscriber logging at `level` unless `directives` (`RUST_LOG`
/// syntax) say otherwise.
fn build_subscriber(level: Level, directives: &str) -> impl Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives);

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish()
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ExporterConfig> {
    match path {
        Some(path) => ExporterConfig::load(path)
            .with_context(|| format!("failed to load config file {}", path.display())),
        None => {
            info!("No config file given, using FreeIPMI defaults");
            let mut config = ExporterConfig::default();
            config.apply_env_credentials(|name| std::env::var(name).ok());
            Ok(config)
        }
    }
}

fn build_scraper(cli: &Cli) -> anyhow::Result<Scraper<FreeipmiExecutor>> {
    let config = load_config(cli.config_file.as_deref())?;
    let settings = ScrapeSettings::default()
        .with_executables_path(cli.freeipmi_path.clone().unwrap_or_default())
        .with_sdr_cache_dir(&cli.sdr_cache_dir);
    Ok(Scraper::new(FreeipmiExecutor, settings, SafeConfig::new(config)))
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    info!("Starting IPMI exporter {}", env!("CARGO_PKG_VERSION"));
    let scraper = build_scraper(cli)?;

    let web_config = WebConfig::new(&args.host, args.port).with_config_file(cli.config_file.clone());
    info!("Web server configuration:");
    info!("  - Bind address: {}", web_config.bind_address());
    if let Some(path) = &cli.freeipmi_path {
        info!("  - FreeIPMI path: {}", path.display());
    }
    info!("  - SDR cache dir: {}", cli.sdr_cache_dir.display());

    start_web_server(web_config, scraper)
        .await
        .context("web server failed")?;
    Ok(())
}

fn check_config_command(cli: &Cli) -> anyhow::Result<()> {
    let path = cli
        .config_file
        .as_deref()
        .context("--config-file is required for check-config")?;
    let config = load_config(Some(path))?;

    let mut names: Vec<&String> = config.modules.keys().collect();
    names.sort();
    println!("{}: OK, {} module(s)", path.display(), names.len());
    for name in names {
        let module = &config.modules[name];
        let collectors: Vec<&str> = module.collectors.iter().map(|c| c.as_str()).collect();
        let user = if module.user.is_empty() { "-" } else { module.user.as_str() };
        println!("  {}: user={} collectors={}", name, user, collectors.join(","));
    }
    Ok(())
}

async fn scrape_command(cli: &Cli, args: &ScrapeArgs) -> anyhow::Result<()> {
    let scraper = build_scraper(cli)?;
    let text = scraper
        .scrape_text(&args.target, &args.module)
        .await
        .context("failed to encode metrics")?;
    print!("{}", text);
    Ok(())
}
