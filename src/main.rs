mod cli;

use edlskip::{
    config,
    host::{CommandSink, JellyfinHost, SessionSource},
    scheduler::PollScheduler,
    skip::SkipEngine,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

async fn start_service(config: config::Config) -> Result<()> {
    tracing::info!("Starting edlskip");
    tracing::info!(
        "Polling Jellyfin at {} every {} ms",
        config.jellyfin.url,
        config.scan.interval_ms
    );

    let host = Arc::new(JellyfinHost::new(&config.jellyfin));
    match host.test_connection().await {
        Ok(true) => tracing::info!("Connected to Jellyfin"),
        Ok(false) => tracing::warn!("Jellyfin rejected the connection test, check the API key"),
        Err(e) => tracing::warn!("Jellyfin not reachable yet: {}", e),
    }

    let source: Arc<dyn SessionSource> = host.clone();
    let sink: Arc<dyn CommandSink> = host;
    let engine = SkipEngine::new(source, sink).with_reissue_after(config.scan.reissue_after());

    let mut scheduler = PollScheduler::new(Arc::new(engine), config.scan.interval());
    scheduler.start();

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down...");
    scheduler.stop().await;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "edlskip=trace,edlskip_edl=trace".to_string()
        } else {
            "edlskip=debug,edlskip_edl=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { interval_ms } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;

            if let Some(interval_ms) = interval_ms {
                if interval_ms == 0 {
                    anyhow::bail!("Scan interval cannot be 0");
                }
                config.scan.interval_ms = interval_ms;
            }
            config::require_jellyfin(&config.jellyfin)?;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_service(config))
        }
        Commands::Inspect { media, json } => inspect_media(&media, json),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("edlskip {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn inspect_media(media: &str, json: bool) -> Result<()> {
    let edl_path = edlskip_edl::resolve_edl_path(media);
    let exists = edl_path.exists();
    let ranges = edlskip_edl::load_skip_ranges(&edl_path)?;

    if json {
        let ranges: Vec<_> = ranges
            .iter()
            .map(|r| serde_json::json!({ "start": r.start.as_secs(), "end": r.end.as_secs() }))
            .collect();
        let output = serde_json::json!({
            "media": media,
            "edl": edl_path.display().to_string(),
            "exists": exists,
            "ranges": ranges,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Media: {}", media);
    println!("EDL: {}", edl_path.display());

    if !exists {
        println!("No EDL file found, nothing will be skipped.");
        return Ok(());
    }

    println!("\nSkip ranges: {}", ranges.len());
    for (i, range) in ranges.iter().enumerate() {
        let start = range.start.as_secs();
        let end = range.end.as_secs();
        print!("  [{}] {} -> {}", i, format_timestamp(start), format_timestamp(end));
        if start >= end {
            print!(" [empty, never matches]");
        }
        println!();
    }

    Ok(())
}

fn format_timestamp(secs: u64) -> String {
    let mins = secs / 60;
    let hours = mins / 60;
    format!("{:02}:{:02}:{:02}", hours, mins % 60, secs % 60)
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Scan interval: {} ms", config.scan.interval_ms);
            match config.scan.reissue_after_ms {
                Some(ms) => println!("  Re-issue after: {} ms", ms),
                None => println!("  Re-issue after: never"),
            }
            println!("  Jellyfin: {}", config.jellyfin.url);
            println!(
                "  API key: {}",
                if config.jellyfin.api_key.is_empty() {
                    "missing"
                } else {
                    "set"
                }
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Scan interval: {} ms", config.scan.interval_ms);
            println!("  Jellyfin: {}", config.jellyfin.url);
        }
    }

    Ok(())
}
