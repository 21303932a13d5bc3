//! CallTrack CLI and API server binary
//!
//! `start` serves the HTTP API; `compare` runs a single comparison from the
//! terminal; `keepalive` pings a deployed API so it stays warm.

use anyhow::{Context, Result};
use cli::{Cli, Commands, CompareMode};
use comparator::api::{api_routes, ApiState};
use comparator::OptionsComparator;
use config::{
    generate_default_config, load_config, load_or_default, save_config, validate_config,
    CallTrackConfig, ProviderConfig, ValidationReport,
};
use market_data::{MarketDataProvider, OptionSide, YahooConfig, YahooProvider};
use observability::{init_logging, init_metrics, LogFormat, ServerMetrics};
use server::{
    run_until_shutdown, validate_port_available, HealthClient, HttpLayers, HttpServer,
    ServerConfig, ServerExt, ShutdownController,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const KEEPALIVE_USER_AGENT: &str = "CallTrack-KeepAlive/1.0";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start { config, port } => start_api(cli.log_format.as_deref(), config, port).await,
        Commands::Validate { config } => {
            init_cli_logging(cli.log_format.as_deref(), "info")?;
            validate_command(config)
        }
        Commands::Init { output } => {
            init_cli_logging(cli.log_format.as_deref(), "info")?;
            init_command(output)
        }
        Commands::Compare {
            ticker,
            mode,
            date,
            strike,
            option_type,
            config,
        } => {
            init_cli_logging(cli.log_format.as_deref(), "warn")?;
            compare_command(&ticker, mode, &date, strike, &option_type, config).await
        }
        Commands::Keepalive {
            url,
            interval_secs,
            warm_ticker,
            timeout_secs,
            once,
        } => {
            init_cli_logging(cli.log_format.as_deref(), "info")?;
            keepalive_command(&url, interval_secs, &warm_ticker, timeout_secs, once).await
        }
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat> {
    LogFormat::parse(value)
        .with_context(|| format!("Invalid log format: {} (expected pretty, json or compact)", value))
}

fn init_cli_logging(format: Option<&str>, directive: &str) -> Result<()> {
    let format = format.map(parse_log_format).transpose()?.unwrap_or_default();
    init_logging("calltrack", format, directive)
}

fn build_provider(provider: &ProviderConfig) -> Result<Arc<dyn MarketDataProvider>> {
    let yahoo = YahooProvider::new(YahooConfig {
        base_url: provider.base_url.clone(),
        cookie_url: provider.cookie_url.clone(),
        crumb_url: provider.crumb_url.clone(),
        user_agent: provider.user_agent.clone(),
        timeout: Duration::from_secs(provider.timeout_seconds),
    })
    .context("Failed to create market data provider")?;
    Ok(Arc::new(yahoo))
}

fn log_report(report: &ValidationReport) {
    for default in &report.defaults_applied {
        debug!(field = %default.field, value = %default.value, "Default applied");
    }
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }
    for err in &report.errors {
        error!("{}", err);
    }
}

async fn start_api(log_format: Option<&str>, config_path: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let mut config = load_or_default(config_path.as_deref())?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let format = parse_log_format(log_format.unwrap_or(config.logging.format.as_str()))?;
    let level = match config.logging.level.trim() {
        "" => "info",
        level => level,
    };
    init_logging(&config.service.name, format, level)?;

    let report = validate_config(&config);
    log_report(&report);
    if !report.is_valid() {
        error!(error_count = report.errors.len(), "Configuration validation failed");
        anyhow::bail!("Cannot start API due to configuration errors");
    }

    info!(
        host = %config.server.host,
        port = config.server.port,
        config = ?config_path,
        "Starting CallTrack API"
    );
    serve(&config).await
}

async fn serve(config: &CallTrackConfig) -> Result<()> {
    let mut layers = HttpLayers::new();
    if config.server.cors_permissive {
        layers = layers.with_permissive_cors();
    }

    if config.metrics.enabled {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics.port));
        init_metrics(addr)?;
        layers = layers.with_metrics(ServerMetrics::new("api"));
    }

    let provider = build_provider(&config.provider)?;
    let state = Arc::new(
        ApiState::new(provider)
            .with_service_name(config.service.name.clone())
            .with_chain_band(config.comparator.chain_band),
    );

    let server_config = ServerConfig::new(config.server.host.clone(), config.server.port);
    validate_port_available(&server_config).await?;

    HttpServer::new(server_config, api_routes(state))
        .with_name("api")
        .with_layers(&layers)
        .run_with_ctrl_c()
        .await?;

    info!("CallTrack API stopped");
    Ok(())
}

fn validate_command(config_path: PathBuf) -> Result<()> {
    info!(path = ?config_path, "Validating configuration");

    let config = load_config(&config_path)?;
    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Service: {}", config.service.name);
    println!("Listen: {}:{}", config.server.host, config.server.port);
    println!("Provider: {}", config.provider.base_url);
    println!("Chain band: +/-{:.0}%", config.comparator.chain_band * 100.0);
    if config.metrics.enabled {
        println!("Metrics: port {}", config.metrics.port);
    }

    Ok(())
}

fn init_command(output_path: PathBuf) -> Result<()> {
    info!(?output_path, "Initializing new configuration file");

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&generate_default_config(), &output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file (provider URLs, port, chain band)");
    println!("  2. Run 'calltrack validate --config {:?}' to check it", output_path);
    println!("  3. Run 'calltrack start --config {:?}' to serve the API", output_path);

    Ok(())
}

async fn compare_command(
    ticker: &str,
    mode: CompareMode,
    date: &str,
    strike: f64,
    option_type: &str,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_or_default(config_path.as_deref())?;
    let side = OptionSide::parse(option_type)
        .with_context(|| format!("Invalid option_type: {} (expected calls or puts)", option_type))?;

    let provider = build_provider(&config.provider)?;
    let comparator = OptionsComparator::new(provider, ticker);
    debug!(ticker = %comparator.ticker(), mode = mode.as_str(), date, strike, "Running comparison");

    let comparison = match mode {
        CompareMode::Date => comparator.compare_by_date(date, strike, side).await,
        CompareMode::Strike => comparator.compare_by_strike(date, strike, side).await,
    }?;

    println!("{}", serde_json::to_string_pretty(&comparison)?);
    Ok(())
}

async fn keepalive_command(
    base_url: &str,
    interval_secs: u64,
    warm_ticker: &str,
    timeout_secs: u64,
    once: bool,
) -> Result<()> {
    let client = HealthClient::new(Duration::from_secs(timeout_secs.max(1)), KEEPALIVE_USER_AGENT)?;
    let base_url = base_url.trim_end_matches('/');

    if once {
        if keepalive_round(&client, base_url, warm_ticker).await {
            return Ok(());
        }
        anyhow::bail!("API at {} is not healthy", base_url);
    }

    info!(url = base_url, interval_secs, "Starting keep-alive loop");
    let shutdown = ShutdownController::with_ctrl_c();
    let token = shutdown.child_token();
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    while run_until_shutdown(&token, interval.tick()).await.is_some() {
        keepalive_round(&client, base_url, warm_ticker).await;
    }

    info!("Keep-alive stopped");
    Ok(())
}

/// One health ping plus one price warm-up. Returns whether health passed.
async fn keepalive_round(client: &HealthClient, base_url: &str, warm_ticker: &str) -> bool {
    let health = client.check("health", &format!("{}/api/health", base_url)).await;
    if health.connected {
        info!(status = ?health.status_code, latency_ms = health.latency_ms, "Health ping ok");
    } else {
        warn!(
            status = ?health.status_code,
            error = health.error.as_deref().unwrap_or(""),
            "Health ping failed"
        );
    }

    let warm = client
        .check("price", &format!("{}/api/price/{}", base_url, warm_ticker))
        .await;
    if warm.connected {
        info!(ticker = warm_ticker, latency_ms = warm.latency_ms, "Price endpoint warmed");
    } else {
        warn!(
            ticker = warm_ticker,
            status = ?warm.status_code,
            error = warm.error.as_deref().unwrap_or(""),
            "Price warm-up failed"
        );
    }

    health.connected
}
